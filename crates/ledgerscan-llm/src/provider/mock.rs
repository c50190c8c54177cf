//! Mock LLM provider for testing

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::LLMProvider;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock LLM provider returning a fixed response or a fixed failure
pub struct MockProvider {
    name: String,
    response: std::result::Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockProvider {
    /// Create a new mock provider that answers with an empty JSON array
    pub fn new() -> Self {
        Self::with_response("[]".to_string())
    }

    /// Create with custom response text
    pub fn with_response(response: String) -> Self {
        Self {
            name: "mock".to_string(),
            response: Ok(response),
            delay: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Create a provider whose every call fails with `ApiCallFailed(message)`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            ..Self::new()
        }
    }

    /// Sleep before answering, to simulate a slow network call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(request.prompt.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.response {
            Ok(content) => Ok(LLMResponse::new(content.clone(), request.model)
                .with_tokens(10)
                .with_finish_reason("stop".to_string())),
            Err(message) => Err(LLMError::ApiCallFailed(message.clone())),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LLMProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "Mock"
    }
}
