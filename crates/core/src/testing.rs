//! Fakes for the [`Provider`] and [`VectorStore`] seams.
//!
//! Compiled for this crate's own tests and, through the `test-utils`
//! feature, for the dev-dependencies of every other workspace crate.

use crate::error::{ProviderError, VectorStoreError};
use crate::message::Message;
use crate::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use crate::vector_store::{StoreMode, VectorStore, content_id};
use async_trait::async_trait;
use std::sync::Mutex;

/// A provider that answers from a script and keeps every request.
///
/// Call `n` gets the `n`-th scripted result; once the script runs out the
/// last entry repeats. An empty script panics on the first call.
pub struct ScriptedProvider {
    script: Vec<Result<String, ProviderError>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with `text`.
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    /// Fails every call with `err`.
    pub fn failing(err: ProviderError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// Answers with each of `replies` in turn.
    pub fn sequence(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[index].clone()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        let reply = self
            .script
            .get(index)
            .or(self.script.last())
            .unwrap_or_else(|| panic!("ScriptedProvider has no script for call #{index}"));
        let text = reply.clone()?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }
}

pub type StoredRecord = (String, serde_json::Map<String, serde_json::Value>);

/// A vector store that keeps every `store` call and search limit in memory.
#[derive(Default)]
pub struct RecordingStore {
    fail: bool,
    stored: Mutex<Vec<StoredRecord>>,
    limits: Mutex<Vec<usize>>,
}

impl RecordingStore {
    /// Every operation fails with [`VectorStoreError::Unavailable`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn stored(&self) -> Vec<StoredRecord> {
        self.stored.lock().unwrap().clone()
    }

    pub fn search_limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }

    pub fn searches(&self) -> usize {
        self.limits.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), VectorStoreError> {
        if self.fail {
            return Err(VectorStoreError::Unavailable("store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Simulated
    }

    async fn store(
        &self,
        content: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, VectorStoreError> {
        self.check()?;
        self.stored.lock().unwrap().push((content.to_string(), metadata));
        Ok(format!("stored (ID: {})", content_id(content)))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<String, VectorStoreError> {
        self.check()?;
        self.limits.lock().unwrap().push(limit);
        Ok(format!("results for '{query}'"))
    }

    async fn stats(&self) -> Result<String, VectorStoreError> {
        self.check()?;
        Ok(format!("{} records", self.stored.lock().unwrap().len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "m".into(),
            messages: vec![Message::user("hola")],
            temperature: 0.7,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn script_plays_in_order_then_repeats_last() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::Timeout("30s".into())),
            Ok("uno".into()),
        ]);
        assert!(provider.complete(request()).await.is_err());
        assert_eq!(provider.complete(request()).await.unwrap().message.content, "uno");
        assert_eq!(provider.complete(request()).await.unwrap().message.content, "uno");
        assert_eq!(provider.calls(), 3);
        assert_eq!(provider.last_request().unwrap().messages[0].content, "hola");
    }

    #[tokio::test]
    async fn failing_store_reports_unavailable() {
        let store = RecordingStore::failing();
        let err = store.stats().await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Unavailable(_)));
        assert!(store.stored().is_empty());
    }
}
