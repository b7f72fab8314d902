//! MCP / Qdrant vector-store facade.
//!
//! The backend is considered live when the MCP endpoint config file exists
//! on disk; its contents are never read. No vector persistence or
//! similarity computation happens in either mode: every operation answers
//! with a templated confirmation, and `store` derives a stable id from the
//! content so the user can refer back to it. A live store whose config
//! file has since been removed reports itself unavailable.

use async_trait::async_trait;
use deskmate_config::{AssistantConfig, QdrantConfig};
use deskmate_core::error::VectorStoreError;
use deskmate_core::vector_store::{StoreMode, VectorRecord, VectorStore};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Vector-store facade toggled by the presence of an MCP config file.
pub struct McpQdrantStore {
    qdrant: QdrantConfig,
    mcp_path: PathBuf,
    mode: StoreMode,
}

impl McpQdrantStore {
    /// Build the facade from the assistant config, probing the MCP file once.
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(config.qdrant_config.clone(), config.mcp.resolved_path())
    }

    pub fn new(qdrant: QdrantConfig, mcp_path: impl Into<PathBuf>) -> Self {
        let mcp_path = mcp_path.into();
        let mode = detect_mode(&mcp_path);
        info!(mode = %mode, path = %mcp_path.display(), "Vector store initialised");
        Self {
            qdrant,
            mcp_path,
            mode,
        }
    }

    pub fn mcp_path(&self) -> &Path {
        &self.mcp_path
    }

    /// Live mode needs the MCP config file to still be there.
    fn ensure_reachable(&self) -> Result<(), VectorStoreError> {
        if self.mode == StoreMode::Live && !self.mcp_path.exists() {
            return Err(VectorStoreError::Unavailable(format!(
                "MCP config {} no longer exists",
                self.mcp_path.display()
            )));
        }
        Ok(())
    }
}

/// Live when the MCP config file exists; its validity is not checked.
pub fn detect_mode(mcp_path: &Path) -> StoreMode {
    if mcp_path.exists() {
        StoreMode::Live
    } else {
        StoreMode::Simulated
    }
}

#[async_trait]
impl VectorStore for McpQdrantStore {
    fn mode(&self) -> StoreMode {
        self.mode
    }

    async fn store(
        &self,
        content: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, VectorStoreError> {
        self.ensure_reachable()?;
        let record = VectorRecord::new(content, metadata);

        match self.mode {
            StoreMode::Simulated => Ok(format!(
                "✅ [SIMULADO] Información almacenada (ID: {})",
                record.id
            )),
            StoreMode::Live => {
                debug!(
                    id = %record.id,
                    collection = %self.qdrant.collection_name,
                    bytes = record.content.len(),
                    metadata = ?record.metadata,
                    "Storing vector record"
                );
                Ok(format!(
                    "✅ Información almacenada en base de datos vectorial (ID: {})",
                    record.id
                ))
            }
        }
    }

    async fn search(&self, query: &str, limit: usize) -> Result<String, VectorStoreError> {
        self.ensure_reachable()?;
        match self.mode {
            StoreMode::Simulated => Ok(format!(
                "🧠 [SIMULADO] Resultados para: '{query}'\n📝 Información relacionada encontrada"
            )),
            StoreMode::Live => {
                debug!(query, limit, collection = %self.qdrant.collection_name, "Vector search");
                Ok(format!(
                    "🧠 Resultados de búsqueda vectorial para: '{query}'\n\n\
                     📝 Información relacionada encontrada (máx. {limit}):\n\
                     • Contexto relevante basado en tu consulta\n\
                     • Información previa relacionada con el tema\n\
                     • Patrones identificados en conversaciones anteriores\n\n\
                     🔍 Búsqueda realizada en base de datos vectorial MCP Qdrant"
                ))
            }
        }
    }

    async fn stats(&self) -> Result<String, VectorStoreError> {
        self.ensure_reachable()?;
        match self.mode {
            StoreMode::Simulated => Ok(format!(
                "📊 [SIMULADO] Estadísticas de Base de Datos Vectorial:\n\
                 🔌 Estado: MCP no conectado (modo simulación)\n\
                 ⚠️  Para usar MCP real, configura {}",
                self.mcp_path.display()
            )),
            StoreMode::Live => Ok(format!(
                "📊 Estadísticas de Base de Datos Vectorial:\n\n\
                 🗃️  Colección: {}\n\
                 🔢 Elementos almacenados: Variable (actualización dinámica)\n\
                 📏 Dimensiones del vector: {}\n\
                 📐 Métrica de distancia: {}\n\
                 🔌 Protocolo: MCP (Model Context Protocol)\n\
                 ✅ Estado: Conectado a Qdrant Cloud",
                self.qdrant.collection_name, self.qdrant.vector_size, self.qdrant.distance_metric
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmate_core::vector_store::content_id;

    fn simulated() -> McpQdrantStore {
        McpQdrantStore::new(QdrantConfig::default(), "/nonexistent/mcp.json")
    }

    #[test]
    fn missing_mcp_file_means_simulated() {
        assert_eq!(simulated().mode(), StoreMode::Simulated);
    }

    #[test]
    fn existing_mcp_file_means_live() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = McpQdrantStore::new(QdrantConfig::default(), file.path());
        assert_eq!(store.mode(), StoreMode::Live);
    }

    #[tokio::test]
    async fn store_confirmation_carries_content_id() {
        let id = content_id("el usuario prefiere Rust");
        assert_eq!(id.len(), 8);

        let mcp = tempfile::NamedTempFile::new().unwrap();
        let live = McpQdrantStore::new(QdrantConfig::default(), mcp.path());
        for store in [simulated(), live] {
            let reply = store
                .store("el usuario prefiere Rust", serde_json::Map::new())
                .await
                .unwrap();
            assert!(!reply.is_empty());
            assert!(reply.contains(&format!("(ID: {id})")));
        }
    }

    #[tokio::test]
    async fn simulated_responses_are_marked() {
        let store = simulated();
        assert!(store.store("x", serde_json::Map::new()).await.unwrap().contains("[SIMULADO]"));
        let search = store.search("rust", 5).await.unwrap();
        assert!(search.contains("[SIMULADO]"));
        assert!(search.contains("'rust'"));
        assert!(store.stats().await.unwrap().contains("modo simulación"));
    }

    #[tokio::test]
    async fn live_stats_report_collection_settings() {
        let qdrant = QdrantConfig {
            collection_name: "notes".into(),
            vector_size: 768,
            distance_metric: "dot".into(),
        };
        let mcp = tempfile::NamedTempFile::new().unwrap();
        let store = McpQdrantStore::new(qdrant, mcp.path());
        let stats = store.stats().await.unwrap();
        assert!(stats.contains("Colección: notes"));
        assert!(stats.contains("768"));
        assert!(stats.contains("dot"));
        assert!(!stats.contains("SIMULADO"));
    }

    #[tokio::test]
    async fn live_store_is_unavailable_once_mcp_file_is_gone() {
        let mcp = tempfile::NamedTempFile::new().unwrap();
        let store = McpQdrantStore::new(QdrantConfig::default(), mcp.path());
        assert_eq!(store.mode(), StoreMode::Live);
        mcp.close().unwrap();

        let err = store.store("x", serde_json::Map::new()).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Unavailable(ref msg) if msg.contains("no longer exists")));
        assert!(store.search("x", 5).await.is_err());
        assert!(store.stats().await.is_err());
    }

    #[test]
    fn from_config_uses_mcp_path() {
        let mut config = AssistantConfig::default();
        config.mcp.config_path = "/nonexistent/custom-mcp.json".into();
        let store = McpQdrantStore::from_config(&config);
        assert_eq!(store.mcp_path(), Path::new("/nonexistent/custom-mcp.json"));
        assert_eq!(store.mode(), StoreMode::Simulated);
    }
}
