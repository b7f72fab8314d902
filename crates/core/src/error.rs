//! Error types for the Deskmate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant, and every error can be
//! reduced to an [`ErrorKind`] so the session loop can pick a user-facing
//! message without inspecting error text.

use thiserror::Error;

/// The top-level error type for all Deskmate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failure.
///
/// `Config` failures need the user to fix credentials or settings;
/// `Network` and `Validation` failures are recoverable within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or rejected credentials, bad configuration.
    Config,
    /// The remote service could not be reached or refused the request.
    Network,
    /// The user's input could not be interpreted.
    Validation,
}

impl ErrorKind {
    /// Template key used to look up the user-facing message for this kind.
    pub fn template_key(&self) -> &'static str {
        match self {
            Self::Config => "config_error",
            Self::Network => "network_error",
            Self::Validation => "validation_error",
        }
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider(e) => e.kind(),
            Self::Tool(e) => e.kind(),
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Usage quota exhausted (insufficient_quota): {0}")]
    QuotaExceeded(String),

    #[error("API key rejected (invalid_api_key): {0}")]
    InvalidApiKey(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidApiKey(_) | Self::AuthenticationFailed(_) | Self::NotConfigured(_) => {
                ErrorKind::Config
            }
            Self::ApiError { status_code, .. } if *status_code == 400 => ErrorKind::Validation,
            _ => ErrorKind::Network,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("LLM call failed: {0}")]
    Provider(#[from] ProviderError),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) | Self::InvalidExpression(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::Config,
            Self::ExecutionFailed { .. } => ErrorKind::Network,
            Self::Provider(e) => e.kind(),
        }
    }
}

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn quota_and_key_errors_mention_provider_codes() {
        let quota = ProviderError::QuotaExceeded("billing".into());
        let key = ProviderError::InvalidApiKey("sk-***".into());
        assert!(quota.to_string().contains("insufficient_quota"));
        assert!(key.to_string().contains("invalid_api_key"));
    }

    #[test]
    fn error_kinds() {
        assert_eq!(
            Error::from(ProviderError::InvalidApiKey(String::new())).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            Error::from(ProviderError::Network("refused".into())).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            Error::from(ToolError::InvalidExpression("x".into())).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::from(ToolError::Provider(ProviderError::QuotaExceeded(String::new()))).kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn config_and_rejected_key_errors_classify_as_config() {
        assert_eq!(Error::Config { message: "missing key".into() }.kind(), ErrorKind::Config);
        assert_eq!(
            Error::from(ProviderError::NotConfigured("OPENAI_API_KEY".into())).kind(),
            ErrorKind::Config
        );
        assert_eq!(Error::from(ProviderError::Timeout("30s".into())).kind(), ErrorKind::Network);
    }

    #[test]
    fn template_keys() {
        assert_eq!(ErrorKind::Validation.template_key(), "validation_error");
        assert_eq!(ErrorKind::Network.template_key(), "network_error");
    }
}
