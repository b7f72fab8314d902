//! LLM-forward tool. Sends the query, with recent history as context, to
//! the hosted chat endpoint.
//!
//! The system prompt is rebuilt for every call from the assistant config:
//! description, version, active features, enabled capabilities and, when
//! vector memory is on, whatever the vector store returns for the query.

use async_trait::async_trait;
use deskmate_config::{AssistantConfig, ResponseTemplates};
use deskmate_core::error::{ProviderError, ToolError};
use deskmate_core::message::{Message, Role};
use deskmate_core::provider::{Provider, ProviderRequest};
use deskmate_core::tool::{Tool, ToolResult, required_str};
use deskmate_core::vector_store::VectorStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds the system prompt sent ahead of every LLM call.
pub struct SystemContext {
    config: AssistantConfig,
    store: Arc<dyn VectorStore>,
}

impl SystemContext {
    pub fn new(config: AssistantConfig, store: Arc<dyn VectorStore>) -> Self {
        Self { config, store }
    }

    pub async fn build(&self, query: &str) -> String {
        let meta = &self.config.assistant_config;
        let on_off = |flag: bool, on: &'static str, off: &'static str| if flag { on } else { off };

        let mut context = format!(
            "{}\n\n{}\n\nCONFIGURACIÓN DINÁMICA:\n\
             - Versión: {}\n\
             - Memoria vectorial: {}\n\
             - Aprendizaje en tiempo real: {}\n\n\
             CAPACIDADES DISPONIBLES:",
            self.config.llm.system_prompt,
            meta.description,
            meta.version,
            on_off(meta.features.vector_memory, "Activa", "Inactiva"),
            on_off(meta.features.real_time_learning, "Activo", "Inactivo"),
        );

        for capability in self.config.capabilities.iter().filter(|c| c.enabled) {
            context.push_str(&format!("\n- {}: {}", capability.name, capability.description));
        }

        if !query.is_empty() && meta.features.vector_memory {
            context.push_str(&format!("\n\nCONSULTA ACTUAL: {query}"));
            match self.store.search(query, 5).await {
                Ok(relevant) => {
                    context.push_str(&format!("\n\nCONTEXTO RELEVANTE:\n{relevant}"));
                }
                Err(e) => warn!(error = %e, "Vector search for system context failed"),
            }
        }

        context
    }
}

pub struct AskLlmTool {
    provider: Arc<dyn Provider>,
    context: SystemContext,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl AskLlmTool {
    pub fn new(provider: Arc<dyn Provider>, config: &AssistantConfig, store: Arc<dyn VectorStore>) -> Self {
        Self {
            provider,
            context: SystemContext::new(config.clone(), store),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }

    /// Turn `"user:..."` / `"assistant:..."` history lines into messages.
    /// Lines without a known role prefix are replayed as user text.
    pub fn history_messages(lines: &[String]) -> Vec<Message> {
        lines
            .iter()
            .map(|line| match line.split_once(':') {
                Some((role, text)) => match role.parse::<Role>() {
                    Ok(role) => Message::new(role, text),
                    Err(_) => Message::user(line.as_str()),
                },
                None => Message::user(line.as_str()),
            })
            .collect()
    }
}

/// The user-facing message for a failed LLM call.
///
/// Quota exhaustion and a rejected API key get their own templates; every
/// other failure gets the generic retry prompt.
pub fn provider_failure_message(err: &ProviderError, templates: &ResponseTemplates) -> String {
    match err {
        ProviderError::QuotaExceeded(_) => templates.get("quota_exceeded"),
        ProviderError::InvalidApiKey(_) => templates.get("invalid_api_key"),
        _ => templates.get("llm_failure"),
    }
}

#[async_trait]
impl Tool for AskLlmTool {
    fn name(&self) -> &str {
        "ask_llm"
    }

    fn description(&self) -> &str {
        "Consulta al modelo de lenguaje para responder preguntas generales"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The user's question" },
                "context": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Recent history lines, oldest first"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;
        let history: Vec<String> = match arguments.get("context") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())
                .map_err(|e| ToolError::InvalidArguments(format!("'context' must be a list of strings: {e}")))?,
            _ => Vec::new(),
        };

        let mut messages = vec![Message::system(self.context.build(query).await)];
        messages.extend(Self::history_messages(&history));
        messages.push(Message::user(query));

        debug!(
            provider = self.provider.name(),
            history = history.len(),
            "Forwarding query to LLM"
        );

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;
        let mut result = ToolResult::text(response.message.content);
        result.data = Some(serde_json::json!({
            "model": response.model,
            "total_tokens": response.usage.map(|u| u.total_tokens),
        }));
        Ok(result)
    }
}
