//! Built-in tools for Deskmate.
//!
//! Every intent the classifier can produce maps to one tool here: host
//! introspection (OS, clock, RAM), the arithmetic evaluator, the vector
//! memory operations and the LLM fallback.

pub mod ask_llm;
pub mod calculator;
pub mod clock;
pub mod memory_usage;
pub mod system_info;
pub mod vector_ops;

use deskmate_config::AssistantConfig;
use deskmate_core::provider::Provider;
use deskmate_core::tool::ToolRegistry;
use deskmate_core::vector_store::VectorStore;
use std::sync::Arc;

pub use ask_llm::{AskLlmTool, SystemContext, provider_failure_message};

/// Create the registry of every built-in tool.
///
/// The provider and store handles are shared with the caller, which keeps
/// them for health checks and history archival.
pub fn default_registry(
    provider: Arc<dyn Provider>,
    store: Arc<dyn VectorStore>,
    config: &AssistantConfig,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(system_info::SystemInfoTool));
    registry.register(Box::new(clock::TimeTool));
    registry.register(Box::new(memory_usage::MemoryUsageTool));
    registry.register(Box::new(calculator::CalculatorTool));
    registry.register(Box::new(vector_ops::VectorStoreTool::new(store.clone())));
    registry.register(Box::new(vector_ops::VectorSearchTool::new(store.clone())));
    registry.register(Box::new(vector_ops::VectorStatsTool::new(store.clone())));
    registry.register(Box::new(ask_llm::AskLlmTool::new(provider, config, store)));
    registry
}
