//! Vector memory tools: store, search and stats over the shared
//! [`VectorStore`] handle.

use async_trait::async_trait;
use deskmate_core::error::{ToolError, VectorStoreError};
use deskmate_core::tool::{Tool, ToolResult, required_str};
use deskmate_core::vector_store::VectorStore;
use std::sync::Arc;

const DEFAULT_SEARCH_LIMIT: usize = 5;

fn store_failure(tool_name: &str, e: VectorStoreError) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.into(),
        reason: e.to_string(),
    }
}

pub struct VectorStoreTool {
    store: Arc<dyn VectorStore>,
}

impl VectorStoreTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for VectorStoreTool {
    fn name(&self) -> &str {
        "vector_store"
    }

    fn description(&self) -> &str {
        "Almacena información en la memoria vectorial"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "Text to remember" },
                "metadata": { "type": "object", "description": "Extra fields stored with the record" }
            },
            "required": ["content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let content = required_str(&arguments, "content")?;
        let metadata = match arguments.get("metadata") {
            None | Some(serde_json::Value::Null) => serde_json::Map::new(),
            Some(serde_json::Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(ToolError::InvalidArguments(
                    "'metadata' must be an object".into(),
                ));
            }
        };

        let confirmation = self
            .store
            .store(content, metadata)
            .await
            .map_err(|e| store_failure(self.name(), e))?;
        Ok(ToolResult::text(confirmation))
    }
}

pub struct VectorSearchTool {
    store: Arc<dyn VectorStore>,
}

impl VectorSearchTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for VectorSearchTool {
    fn name(&self) -> &str {
        "vector_search"
    }

    fn description(&self) -> &str {
        "Busca información relacionada en la memoria vectorial"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "limit": { "type": "integer", "minimum": 1, "default": DEFAULT_SEARCH_LIMIT }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;
        let limit = arguments
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|n| n.max(1) as usize)
            .unwrap_or(DEFAULT_SEARCH_LIMIT);

        let results = self
            .store
            .search(query, limit)
            .await
            .map_err(|e| store_failure(self.name(), e))?;
        Ok(ToolResult::text(results))
    }
}

pub struct VectorStatsTool {
    store: Arc<dyn VectorStore>,
}

impl VectorStatsTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for VectorStatsTool {
    fn name(&self) -> &str {
        "vector_stats"
    }

    fn description(&self) -> &str {
        "Muestra estadísticas de la memoria vectorial"
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let stats = self
            .store
            .stats()
            .await
            .map_err(|e| store_failure(self.name(), e))?;
        let mut result = ToolResult::text(stats);
        result.data = Some(serde_json::json!({ "mode": self.store.mode().to_string() }));
        Ok(result)
    }
}
