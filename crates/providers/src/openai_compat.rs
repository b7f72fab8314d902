//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI and any endpoint exposing `/v1/chat/completions` and
//! `/v1/models` (OpenRouter, Ollama, vLLM, ...).
//!
//! Error bodies are inspected so the two provider codes the assistant reacts
//! to, `insufficient_quota` and `invalid_api_key`, surface as their own
//! [`ProviderError`] variants.

use async_trait::async_trait;
use deskmate_core::error::ProviderError;
use deskmate_core::message::{Message, Role};
use deskmate_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: Some(m.content.clone()),
            })
            .collect()
    }
}

/// Map a non-success HTTP response to a [`ProviderError`].
///
/// The provider's `error.code` / `error.type` fields win; the raw body is
/// searched for the known codes when it is not the usual JSON envelope.
pub fn classify_error(status: u16, body: &str) -> ProviderError {
    let envelope: Option<ApiErrorEnvelope> = serde_json::from_str(body).ok();
    let (code, message) = match envelope {
        Some(env) => (
            env.error.code.or(env.error.r#type).unwrap_or_default(),
            env.error.message.unwrap_or_else(|| body.to_string()),
        ),
        None => (String::new(), body.to_string()),
    };

    if code == "insufficient_quota" || body.contains("insufficient_quota") {
        return ProviderError::QuotaExceeded(message);
    }
    if code == "invalid_api_key" || body.contains("invalid_api_key") {
        return ProviderError::InvalidApiKey(message);
    }

    match status {
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        429 => ProviderError::RateLimited {
            retry_after_secs: 5,
        },
        _ => ProviderError::ApiError {
            status_code: status,
            message,
        },
    }
}

fn network_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[async_trait]
impl deskmate_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(classify_error(status, &error_body));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        let message = Message::new(
            Role::Assistant,
            choice.message.content.unwrap_or_default(),
        );

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message,
            usage,
            model: api_response.model,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        if status == 200 {
            return Ok(true);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &error_body))
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    r#type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_trimmed() {
        let provider = OpenAiCompatProvider::new("custom", "http://localhost:8080/v1/", "k");
        assert_eq!(provider.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn message_conversion() {
        let messages = vec![
            Message::system("Eres un asistente"),
            Message::user("Hola"),
            Message::assistant("¡Hola!"),
        ];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 3);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
        assert_eq!(api_messages[2].role, "assistant");
    }

    #[test]
    fn classify_insufficient_quota() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        assert!(matches!(
            classify_error(429, body),
            ProviderError::QuotaExceeded(msg) if msg.contains("quota")
        ));
    }

    #[test]
    fn classify_invalid_api_key() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert!(matches!(
            classify_error(401, body),
            ProviderError::InvalidApiKey(_)
        ));
    }

    #[test]
    fn classify_substring_in_plain_body() {
        assert!(matches!(
            classify_error(500, "upstream said: invalid_api_key"),
            ProviderError::InvalidApiKey(_)
        ));
    }

    #[test]
    fn classify_generic_statuses() {
        assert!(matches!(
            classify_error(401, "{}"),
            ProviderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            classify_error(429, r#"{"error":{"code":"rate_limit_exceeded"}}"#),
            ProviderError::RateLimited { .. }
        ));
        assert!(matches!(
            classify_error(503, "overloaded"),
            ProviderError::ApiError { status_code: 503, .. }
        ));
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "model": "gpt-3.5-turbo-0125",
            "choices": [{"message": {"role": "assistant", "content": "Hola"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "gpt-3.5-turbo-0125");
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hola"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 15);
    }
}
