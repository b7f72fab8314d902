//! Vector-store implementations for Deskmate.

pub mod mcp_qdrant;

pub use mcp_qdrant::{McpQdrantStore, detect_mode};
