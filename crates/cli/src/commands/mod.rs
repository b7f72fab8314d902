//! Subcommand implementations and the startup sequence they share.

pub mod ask;
pub mod chat;
pub mod doctor;
pub mod status;

use deskmate_agent::Assistant;
use deskmate_config::AssistantConfig;
use deskmate_core::error::{Error, ErrorKind, ProviderError};
use deskmate_core::provider::Provider;
use deskmate_core::vector_store::VectorStore;
use deskmate_memory::McpQdrantStore;
use deskmate_providers::OpenAiCompatProvider;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub fn load_config(path: Option<&Path>) -> deskmate_core::Result<AssistantConfig> {
    AssistantConfig::load(path).map_err(|e| Error::Config {
        message: format!("Failed to load config: {e}"),
    })
}

/// Print what the user can do about a startup failure.
fn print_remediation(err: &Error, config: &AssistantConfig) {
    let var = &config.llm.api_key_env;
    eprintln!();
    match err.kind() {
        ErrorKind::Config if !config.has_api_key() => {
            eprintln!("❌ No se encontró la API key ({var}). Por favor:");
            eprintln!("  1. Ve a https://platform.openai.com/api-keys");
            eprintln!("  2. Crea una API key si no tienes una");
            eprintln!("  3. Expórtala en tu shell:  export {var}=tu-api-key");
        }
        ErrorKind::Config => {
            eprintln!("❌ El servicio rechazó la API key: {err}");
            eprintln!("  Revisa el valor de {var} o genera una nueva en https://platform.openai.com/api-keys");
        }
        ErrorKind::Network | ErrorKind::Validation => {
            eprintln!("❌ Error al conectar con el servicio: {err}");
            eprintln!("Asegúrate de:");
            eprintln!("  1. Tener una API key válida");
            eprintln!("  2. Tener saldo disponible en tu cuenta");
            eprintln!("  3. Tener una conexión a internet estable");
        }
    }
    eprintln!();
}

/// Check credentials and connectivity, then wire the assistant.
///
/// Every failure here is fatal: remediation is printed to stderr and the
/// caller should exit non-zero on `Err`.
pub async fn start_assistant(config: AssistantConfig) -> deskmate_core::Result<Assistant> {
    let provider = match connect(&config).await {
        Ok(provider) => provider,
        Err(e) => {
            print_remediation(&e, &config);
            return Err(e);
        }
    };
    eprintln!("✅ Asistente listo para ayudarte!");

    let store = Arc::new(McpQdrantStore::from_config(&config));
    info!(mode = %store.mode(), "Assistant ready");
    Ok(Assistant::new(config, Arc::new(provider), store))
}

async fn connect(config: &AssistantConfig) -> deskmate_core::Result<OpenAiCompatProvider> {
    if !config.has_api_key() {
        return Err(Error::Config {
            message: format!("{} is not set", config.llm.api_key_env),
        });
    }

    let provider = deskmate_providers::build_from_config(config)?;
    debug!(provider = provider.name(), model = %config.llm.model, "Starting assistant");
    eprintln!("Verificando conexión con {}...", provider.base_url());

    if provider.health_check().await? {
        Ok(provider)
    } else {
        Err(ProviderError::Network("the chat endpoint reported itself unhealthy".into()).into())
    }
}
