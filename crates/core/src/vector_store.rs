//! VectorStore trait: the facade over the external vector database.
//!
//! The assistant only ever needs three operations: store a piece of text,
//! search for related text, and report backend statistics. Each returns the
//! human-readable string shown to the user.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::VectorStoreError;

/// Whether the facade believes a live backend is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Live,
    Simulated,
}

impl std::fmt::Display for StoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// A record handed to the backend on `store`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// First 8 hex chars of the content's MD5 digest
    pub id: String,

    pub content: String,

    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    pub timestamp: DateTime<Utc>,
}

impl VectorRecord {
    pub fn new(content: impl Into<String>, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        let content = content.into();
        Self {
            id: content_id(&content),
            content,
            metadata,
            timestamp: Utc::now(),
        }
    }
}

/// Stable 8-character identifier derived from content.
pub fn content_id(content: &str) -> String {
    let digest = format!("{:x}", md5::compute(content.as_bytes()));
    digest[..8].to_string()
}

/// The core VectorStore trait.
///
/// Implementations: the MCP/Qdrant facade, and recording fakes in tests.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The current backend mode.
    fn mode(&self) -> StoreMode;

    /// Store content; returns a confirmation containing the record id.
    async fn store(
        &self,
        content: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<String, VectorStoreError>;

    /// Search for content related to `query`.
    async fn search(&self, query: &str, limit: usize) -> std::result::Result<String, VectorStoreError>;

    /// Report backend statistics.
    async fn stats(&self) -> std::result::Result<String, VectorStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_is_stable_md5_prefix() {
        // md5("hello") = 5d41402abc4b2a76b9719d911017c592
        assert_eq!(content_id("hello"), "5d41402a");
        assert_eq!(content_id("hello"), content_id("hello"));
        assert_ne!(content_id("hello"), content_id("hello!"));
    }

    #[test]
    fn record_carries_content_id() {
        let record = VectorRecord::new("hello", serde_json::Map::new());
        assert_eq!(record.id, "5d41402a");
        assert_eq!(record.content, "hello");
    }

    #[test]
    fn store_mode_display() {
        assert_eq!(StoreMode::Simulated.to_string(), "simulated");
        assert_eq!(StoreMode::Live.to_string(), "live");
    }
}
