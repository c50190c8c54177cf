//! LLM response caching

use crate::client::{LLMRequest, LLMResponse};
use async_trait::async_trait;
use dashmap::DashMap;

/// LLM cache trait
#[async_trait]
pub trait LLMCache: Send + Sync {
    /// Get a cached response
    async fn get(&self, request: &LLMRequest) -> Option<LLMResponse>;

    /// Store a response in cache
    async fn set(&self, request: LLMRequest, response: LLMResponse);

    /// Clear the cache
    async fn clear(&self);
}

/// In-memory LLM cache keyed by model, prompt and sampling parameters
#[derive(Default)]
pub struct InMemoryLLMCache {
    entries: DashMap<String, LLMResponse>,
}

impl InMemoryLLMCache {
    /// Create a new in-memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached responses
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cache_key(request: &LLMRequest) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            request.model,
            request.system.as_deref().unwrap_or(""),
            request.prompt,
            request.max_tokens.unwrap_or(0),
            request.temperature.unwrap_or(0.0),
            request.json_output
        )
    }
}

#[async_trait]
impl LLMCache for InMemoryLLMCache {
    async fn get(&self, request: &LLMRequest) -> Option<LLMResponse> {
        self.entries
            .get(&Self::cache_key(request))
            .map(|entry| entry.value().clone())
    }

    async fn set(&self, request: LLMRequest, response: LLMResponse) {
        self.entries.insert(Self::cache_key(&request), response);
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}
