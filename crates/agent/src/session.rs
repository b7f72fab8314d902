//! The per-turn session handler.
//!
//! [`Assistant`] owns the classifier, the tool registry and the vector
//! store handle; [`SessionState`] is owned by the caller's loop and
//! borrowed mutably for each turn. Turns never fail: every error is turned
//! into a user-facing message chosen by its [`ErrorKind`].

use crate::history::ConversationHistory;
use crate::intent::IntentClassifier;
use deskmate_config::AssistantConfig;
use deskmate_core::error::{Error, ErrorKind, ToolError};
use deskmate_core::provider::Provider;
use deskmate_core::tool::{ToolCall, ToolRegistry};
use deskmate_core::vector_store::VectorStore;
use deskmate_tools::provider_failure_message;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mutable state of one interactive session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Names of the tools available this session
    pub tools: Vec<String>,
    pub current_input: String,
    pub current_response: Option<String>,
    pub history: ConversationHistory,
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Response(String),
    Failed { kind: ErrorKind, message: String },
}

impl TurnOutcome {
    /// The text shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Response(text) => text,
            Self::Failed { message, .. } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// The assistant: classification, dispatch and history upkeep.
pub struct Assistant {
    config: AssistantConfig,
    classifier: IntentClassifier,
    tools: ToolRegistry,
    store: Arc<dyn VectorStore>,
}

impl Assistant {
    /// Wire the built-in tools around the given provider and store. The
    /// store also receives history archives.
    pub fn new(
        config: AssistantConfig,
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::from_config(&config),
            tools: deskmate_tools::default_registry(provider, store.clone(), &config),
            config,
            store,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn new_session(&self) -> SessionState {
        SessionState {
            tools: self.tools.names().into_iter().map(String::from).collect(),
            current_input: String::new(),
            current_response: None,
            history: ConversationHistory::new(self.config.context_window()),
        }
    }

    /// Classify `input`, run the selected tool and record the turn.
    pub async fn process_turn(&self, state: &mut SessionState, input: &str) -> TurnOutcome {
        state.current_input = input.to_string();

        let intent = self.classifier.classify(input, state.history.lines());
        let call = ToolCall::new(intent.tool, intent.arguments);
        let outcome = self.dispatch(&call).await;

        state.current_response = Some(outcome.message().to_string());
        if let Some(overflow) = state.history.record_turn(input, outcome.message()) {
            self.archive(overflow).await;
        }
        outcome
    }

    /// Run a tool directly, outside the classifier (menu shortcuts).
    /// History is left untouched.
    pub async fn run_tool(&self, name: &str) -> TurnOutcome {
        self.dispatch(&ToolCall::new(name, serde_json::json!({}))).await
    }

    async fn dispatch(&self, call: &ToolCall) -> TurnOutcome {
        debug!(tool = %call.name, "Dispatching tool call");
        match self.tools.execute(call).await {
            Ok(result) => TurnOutcome::Response(result.output),
            Err(e) => {
                let err = Error::from(e);
                warn!(tool = %call.name, error = %err, "Tool call failed");
                TurnOutcome::Failed {
                    kind: err.kind(),
                    message: self.failure_message(&err),
                }
            }
        }
    }

    fn failure_message(&self, err: &Error) -> String {
        let templates = &self.config.response_templates;
        match err {
            Error::Provider(e) | Error::Tool(ToolError::Provider(e)) => {
                provider_failure_message(e, templates)
            }
            Error::Tool(ToolError::ExecutionFailed { .. }) => templates.get("turn_failure"),
            other => templates.get(other.kind().template_key()),
        }
    }

    async fn archive(&self, overflow: String) {
        if !self.config.should_store_interaction() {
            debug!("Interaction archival disabled; dropping evicted history");
            return;
        }

        let mut metadata = serde_json::Map::new();
        metadata.insert("type".into(), "conversation_archive".into());
        match self.store.store(&overflow, metadata).await {
            Ok(confirmation) => info!(%confirmation, "Archived evicted history"),
            Err(e) => warn!(error = %e, "Failed to archive evicted history"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmate_core::testing::{RecordingStore, ScriptedProvider};
    use deskmate_core::error::ProviderError;

    fn assistant_with(
        config: AssistantConfig,
        provider: ScriptedProvider,
    ) -> (Assistant, Arc<ScriptedProvider>, Arc<RecordingStore>) {
        let provider = Arc::new(provider);
        let store = Arc::new(RecordingStore::default());
        let assistant = Assistant::new(config, provider.clone(), store.clone());
        (assistant, provider, store)
    }

    #[tokio::test]
    async fn system_question_never_reaches_llm() {
        let (assistant, provider, _) =
            assistant_with(AssistantConfig::default(), ScriptedProvider::replying("llm"));
        let mut state = assistant.new_session();

        let outcome = assistant.process_turn(&mut state, "¿qué sistema tengo?").await;
        assert!(outcome.message().starts_with("Tu sistema es"));
        assert_eq!(provider.calls(), 0);
        assert_eq!(state.current_input, "¿qué sistema tengo?");
        assert_eq!(state.current_response.as_deref(), Some(outcome.message()));
    }

    #[tokio::test]
    async fn calculation_turn() {
        let (assistant, _, _) =
            assistant_with(AssistantConfig::default(), ScriptedProvider::replying("llm"));
        let mut state = assistant.new_session();
        let outcome = assistant.process_turn(&mut state, "calcula 2+2").await;
        assert_eq!(outcome, TurnOutcome::Response("El resultado es: 4".into()));
    }

    #[tokio::test]
    async fn bad_expression_is_validation_failure() {
        let (assistant, _, _) =
            assistant_with(AssistantConfig::default(), ScriptedProvider::replying("llm"));
        let mut state = assistant.new_session();
        let outcome = assistant
            .process_turn(&mut state, "calcula __import__('os')")
            .await;
        match outcome {
            TurnOutcome::Failed { kind, message } => {
                assert_eq!(kind, ErrorKind::Validation);
                assert!(message.contains("expresión"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        // Failed turns are still recorded.
        assert_eq!(state.history.len(), 2);
    }

    #[tokio::test]
    async fn unmatched_input_goes_to_llm() {
        let (assistant, provider, _) =
            assistant_with(AssistantConfig::default(), ScriptedProvider::replying("¡Claro!"));
        let mut state = assistant.new_session();
        let outcome = assistant.process_turn(&mut state, "cuéntame un chiste").await;
        assert_eq!(outcome.message(), "¡Claro!");
        assert_eq!(provider.calls(), 1);
        assert_eq!(state.history.lines()[1], "assistant:¡Claro!");
    }

    #[tokio::test]
    async fn invalid_api_key_uses_configured_message() {
        let mut config = AssistantConfig::default();
        config
            .response_templates
            .0
            .insert("invalid_api_key".into(), "revisa tu clave".into());
        let (assistant, _, _) = assistant_with(
            config,
            ScriptedProvider::failing(ProviderError::InvalidApiKey("bad key".into())),
        );
        let mut state = assistant.new_session();
        let outcome = assistant.process_turn(&mut state, "hola").await;
        assert_eq!(
            outcome,
            TurnOutcome::Failed {
                kind: ErrorKind::Config,
                message: "revisa tu clave".into()
            }
        );
    }

    #[tokio::test]
    async fn quota_and_generic_provider_failures() {
        let (assistant, _, _) = assistant_with(
            AssistantConfig::default(),
            ScriptedProvider::failing(ProviderError::QuotaExceeded("quota".into())),
        );
        let mut state = assistant.new_session();
        assert!(assistant.process_turn(&mut state, "hola").await.message().contains("cuota"));

        let (assistant, _, _) = assistant_with(
            AssistantConfig::default(),
            ScriptedProvider::failing(ProviderError::Timeout("120s".into())),
        );
        let outcome = assistant.process_turn(&mut state, "hola").await;
        assert!(outcome.is_failure());
        assert!(outcome.message().contains("intentarlo de nuevo"));
    }

    #[tokio::test]
    async fn overflow_is_archived_once_per_eviction() {
        let mut config = AssistantConfig::default();
        config.learning_settings.context_window = 1;
        let (assistant, _, store) = assistant_with(config, ScriptedProvider::replying("ok"));
        let mut state = assistant.new_session();

        assistant.process_turn(&mut state, "hola").await;
        assert!(store.stored().is_empty());
        assistant.process_turn(&mut state, "adiós").await;

        let stored = store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, "user:hola\nassistant:ok");
        assert_eq!(stored[0].1["type"], "conversation_archive");
        assert_eq!(state.history.len(), 2);
    }

    #[tokio::test]
    async fn archival_disabled_still_evicts() {
        let mut config = AssistantConfig::default();
        config.learning_settings.context_window = 1;
        config.learning_settings.auto_store_interactions = false;
        let (assistant, _, store) = assistant_with(config, ScriptedProvider::replying("ok"));
        let mut state = assistant.new_session();

        for input in ["uno", "dos", "tres"] {
            assistant.process_turn(&mut state, input).await;
        }
        assert!(store.stored().is_empty());
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history.lines()[0], "user:tres");
    }

    #[tokio::test]
    async fn archive_failure_is_not_surfaced() {
        let mut config = AssistantConfig::default();
        config.learning_settings.context_window = 1;
        let provider = Arc::new(ScriptedProvider::replying("ok"));
        let store = Arc::new(RecordingStore::failing());
        let assistant = Assistant::new(config, provider, store);
        let mut state = assistant.new_session();

        assistant.process_turn(&mut state, "hola").await;
        let outcome = assistant.process_turn(&mut state, "otra vez").await;
        assert_eq!(outcome, TurnOutcome::Response("ok".into()));
        assert_eq!(state.history.len(), 2);
    }

    #[tokio::test]
    async fn new_session_lists_registered_tools() {
        let (assistant, _, _) =
            assistant_with(AssistantConfig::default(), ScriptedProvider::replying("ok"));
        let state = assistant.new_session();
        assert_eq!(state.tools.len(), 8);
        assert!(state.tools.contains(&"ask_llm".to_string()));
        assert!(state.history.is_empty());
        assert!(state.current_response.is_none());
    }

    #[tokio::test]
    async fn run_tool_skips_history() {
        let (assistant, _, _) =
            assistant_with(AssistantConfig::default(), ScriptedProvider::replying("ok"));
        let outcome = assistant.run_tool("get_time").await;
        assert!(outcome.message().starts_with("Son las "));

        let outcome = assistant.run_tool("no_such_tool").await;
        assert!(matches!(outcome, TurnOutcome::Failed { kind: ErrorKind::Config, .. }));
    }
}
