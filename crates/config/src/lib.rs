//! Configuration loading, validation, and management for Deskmate.
//!
//! Loads the assistant document from `config.json` (or a `.toml` file) with
//! environment variable overrides. Every section falls back to built-in
//! defaults, so a missing file yields a fully working configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// API key, resolved from the environment; never read from or written to the file
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Assistant metadata and feature flags
    #[serde(default)]
    pub assistant_config: AssistantMeta,

    /// Capabilities advertised in the system context
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<Capability>,

    /// Keyword lists per intent category
    #[serde(default)]
    pub intent_patterns: IntentPatterns,

    /// User-facing message templates
    #[serde(default)]
    pub response_templates: ResponseTemplates,

    /// History window and archival settings
    #[serde(default)]
    pub learning_settings: LearningSettings,

    /// Vector collection settings reported by `stats`
    #[serde(default)]
    pub qdrant_config: QdrantConfig,

    /// MCP endpoint detection
    #[serde(default)]
    pub mcp: McpConfig,

    /// Hosted chat-completion settings
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &redact(&self.api_key))
            .field("assistant_config", &self.assistant_config)
            .field("capabilities", &self.capabilities)
            .field("intent_patterns", &self.intent_patterns)
            .field("response_templates", &self.response_templates)
            .field("learning_settings", &self.learning_settings)
            .field("qdrant_config", &self.qdrant_config)
            .field("mcp", &self.mcp)
            .field("llm", &self.llm)
            .finish()
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMeta {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default)]
    pub features: Features,
}

fn default_name() -> String {
    "Deskmate".into()
}
fn default_version() -> String {
    "1.0.0".into()
}
fn default_description() -> String {
    "Asistente IA dinámico".into()
}

impl Default for AssistantMeta {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            description: default_description(),
            features: Features::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    #[serde(default = "default_true")]
    pub vector_memory: bool,

    #[serde(default = "default_true")]
    pub real_time_learning: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            vector_memory: true,
            real_time_learning: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub enabled: bool,
}

fn default_capabilities() -> Vec<Capability> {
    let cap = |name: &str, description: &str| Capability {
        name: name.into(),
        description: description.into(),
        enabled: true,
    };
    vec![
        cap("system_info", "Información del sistema operativo y la arquitectura"),
        cap("get_time", "Hora actual"),
        cap("memory_usage", "Uso de memoria RAM"),
        cap("calculator", "Cálculos matemáticos"),
        cap("vector_memory", "Memoria a largo plazo en base de datos vectorial"),
    ]
}

/// Keyword lists per intent category, tested in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentPatterns {
    #[serde(default = "default_system_keywords")]
    pub system: Vec<String>,

    #[serde(default = "default_time_keywords")]
    pub time: Vec<String>,

    #[serde(default = "default_memory_keywords")]
    pub memory: Vec<String>,

    #[serde(default = "default_calculation_keywords")]
    pub calculation: Vec<String>,

    #[serde(default = "default_store_keywords")]
    pub store: Vec<String>,

    #[serde(default = "default_search_keywords")]
    pub search: Vec<String>,

    #[serde(default = "default_stats_keywords")]
    pub stats: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn default_system_keywords() -> Vec<String> {
    words(&["sistema", "computadora", "pc", "ordenador", "specs"])
}
fn default_time_keywords() -> Vec<String> {
    words(&["hora", "tiempo", "reloj"])
}
fn default_memory_keywords() -> Vec<String> {
    words(&["memoria", "ram"])
}
fn default_calculation_keywords() -> Vec<String> {
    words(&["calcula", "cuánto es", "cuanto es", "resultado de"])
}
fn default_store_keywords() -> Vec<String> {
    words(&["recuerda que", "recuerda", "guarda", "almacena"])
}
fn default_search_keywords() -> Vec<String> {
    words(&["busca", "qué sabes de", "que sabes de"])
}
fn default_stats_keywords() -> Vec<String> {
    words(&["estadísticas", "estadisticas", "stats"])
}

impl Default for IntentPatterns {
    fn default() -> Self {
        Self {
            system: default_system_keywords(),
            time: default_time_keywords(),
            memory: default_memory_keywords(),
            calculation: default_calculation_keywords(),
            store: default_store_keywords(),
            search: default_search_keywords(),
            stats: default_stats_keywords(),
        }
    }
}

/// User-facing templates, keyed by name. Unknown keys are kept so a config
/// file can add its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseTemplates(pub BTreeMap<String, String>);

impl ResponseTemplates {
    /// Look up a template, falling back to the built-in default, then to
    /// a neutral placeholder.
    pub fn get(&self, name: &str) -> String {
        self.0
            .get(name)
            .cloned()
            .or_else(|| default_template(name).map(String::from))
            .unwrap_or_else(|| "Procesando...".into())
    }
}

fn default_template(name: &str) -> Option<&'static str> {
    Some(match name {
        "greeting" => "👋 ¡Hola! Soy tu asistente virtual.\nPuedes preguntarme cualquier cosa y haré lo mejor para ayudarte.\nPara salir, escribe 'salir' o presiona Ctrl+C",
        "farewell" => "¡Hasta pronto! 👋",
        "empty_input" => "Por favor, dime algo.",
        "quota_exceeded" => "Lo siento, he excedido mi cuota de uso. ¿Podrías intentarlo más tarde?",
        "invalid_api_key" => "Parece que hay un problema con mi configuración. ¿Podrías verificar la API key?",
        "llm_failure" => "Lo siento, tuve un problema al procesar tu pregunta. ¿Podrías intentarlo de nuevo?",
        "turn_failure" => "Lo siento, tuve un problema al procesar tu mensaje. ¿Podrías intentarlo de nuevo?",
        "validation_error" => "No pude entender esa expresión. ¿Podrías revisarla?",
        "config_error" => "Parece que hay un problema con mi configuración.",
        "network_error" => "No pude conectarme al servicio. ¿Podrías intentarlo de nuevo?",
        _ => return None,
    })
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningSettings {
    #[serde(default = "default_true")]
    pub auto_store_interactions: bool,

    /// Number of recent turns kept in active memory
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

fn default_context_window() -> usize {
    10
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            auto_store_interactions: true,
            context_window: default_context_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    #[serde(default = "default_collection")]
    pub collection_name: String,

    #[serde(default = "default_vector_size")]
    pub vector_size: u32,

    #[serde(default = "default_distance")]
    pub distance_metric: String,
}

fn default_collection() -> String {
    "assistant_memory".into()
}
fn default_vector_size() -> u32 {
    384
}
fn default_distance() -> String {
    "cosine".into()
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            collection_name: default_collection(),
            vector_size: default_vector_size(),
            distance_metric: default_distance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// File whose existence switches the vector store to live mode
    #[serde(default = "default_mcp_path")]
    pub config_path: String,
}

fn default_mcp_path() -> String {
    "~/.cursor/mcp.json".into()
}

impl McpConfig {
    /// The config path with a leading `~` expanded to the home directory.
    pub fn resolved_path(&self) -> PathBuf {
        expand_tilde(&self.config_path)
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            config_path: default_mcp_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_system_prompt() -> String {
    "Eres un asistente amigable y servicial. Proporciona respuestas claras y útiles.".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl AssistantConfig {
    /// Load configuration from `path` (or `./config.json`) and apply
    /// environment overrides:
    /// - the API key from `llm.api_key_env` (default `OPENAI_API_KEY`)
    /// - `DESKMATE_MODEL`
    /// - `DESKMATE_BASE_URL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let config: Self = if is_toml {
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.api_key = lookup(&self.llm.api_key_env).filter(|k| !k.trim().is_empty());

        if let Some(model) = lookup("DESKMATE_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("DESKMATE_BASE_URL") {
            self.llm.base_url = url;
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.learning_settings.context_window == 0 {
            return Err(ConfigError::ValidationError(
                "learning_settings.context_window must be at least 1".into(),
            ));
        }

        if self.qdrant_config.vector_size == 0 {
            return Err(ConfigError::ValidationError(
                "qdrant_config.vector_size must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The configured history window.
    pub fn context_window(&self) -> usize {
        self.learning_settings.context_window
    }

    /// Whether evicted history should be archived to the vector store.
    pub fn should_store_interaction(&self) -> bool {
        self.learning_settings.auto_store_interactions
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_config: AssistantMeta::default(),
            capabilities: default_capabilities(),
            intent_patterns: IntentPatterns::default(),
            response_templates: ResponseTemplates::default(),
            learning_settings: LearningSettings::default(),
            qdrant_config: QdrantConfig::default(),
            mcp: McpConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs_home().join(rest),
        None if path == "~" => dirs_home(),
        None => PathBuf::from(path),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AssistantConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.context_window(), 10);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert!(config.intent_patterns.system.contains(&"pc".to_string()));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AssistantConfig::load_from(Path::new("/nonexistent/config.json")).unwrap();
        assert_eq!(config.qdrant_config.collection_name, "assistant_memory");
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_sections() {
        let json = r#"{
            "learning_settings": { "context_window": 3 },
            "intent_patterns": { "time": ["clock"] },
            "response_templates": { "farewell": "bye" }
        }"#;
        let config: AssistantConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.context_window(), 3);
        assert!(config.should_store_interaction());
        assert_eq!(config.intent_patterns.time, vec!["clock".to_string()]);
        assert_eq!(config.intent_patterns.memory, default_memory_keywords());
        assert_eq!(config.response_templates.get("farewell"), "bye");
        assert!(config.response_templates.get("empty_input").contains("dime algo"));
    }

    #[test]
    fn unknown_template_falls_back() {
        let templates = ResponseTemplates::default();
        assert_eq!(templates.get("no_such_template"), "Procesando...");
    }

    #[test]
    fn load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"assistant_config": {{"name": "Ada", "version": "2.0.0"}}}}"#).unwrap();
        let config = AssistantConfig::load_from(file.path()).unwrap();
        assert_eq!(config.assistant_config.name, "Ada");
        assert_eq!(config.assistant_config.version, "2.0.0");
        assert!(config.assistant_config.features.vector_memory);
    }

    #[test]
    fn load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "[llm]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        let config = AssistantConfig::load_from(file.path()).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = AssistantConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = AssistantConfig::default();
        config.learning_settings.context_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AssistantConfig::default();
        config.llm.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_temperature_rejected() {
        let mut config = AssistantConfig::default();
        config.llm.temperature = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.llm.temperature = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides() {
        let mut config = AssistantConfig::default();
        config.apply_env(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".into()),
            "DESKMATE_MODEL" => Some("gpt-4o".into()),
            _ => None,
        });
        assert!(config.has_api_key());
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, default_base_url());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut config = AssistantConfig::default();
        config.apply_env(|_| Some("   ".into()));
        assert!(!config.has_api_key());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AssistantConfig::default();
        config.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn tilde_expansion() {
        let path = expand_tilde("~/.cursor/mcp.json");
        assert!(path.ends_with(".cursor/mcp.json"));
        assert!(!path.to_string_lossy().starts_with('~'));
        assert_eq!(expand_tilde("/etc/mcp.json"), PathBuf::from("/etc/mcp.json"));
    }
}
