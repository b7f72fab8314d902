//! # Deskmate Core
//!
//! Domain types, traits, and error definitions for the Deskmate chat assistant.
//! Every collaborator the session loop talks to (the LLM provider, the tools,
//! the vector store) is defined as a trait here so the binary can wire real
//! implementations and tests can wire fakes.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod vector_store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ErrorKind, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
pub use vector_store::{StoreMode, VectorRecord, VectorStore};
