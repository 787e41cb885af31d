//! Glimpse LLM Provider Layer
//!
//! Pluggable language model providers for semantic classification and
//! extraction.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `glimpse-domain`. Providers are synchronous; the classifier and extractors
//! call them from a blocking worker so the batch loop stays responsive.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use glimpse_llm::MockProvider;
//! use glimpse_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"contentType": "music", "confidence": 0.9}"#);
//! let result = provider.generate("test prompt").unwrap();
//! assert!(result.contains("music"));
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod reply;

use glimpse_domain::traits::LlmProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use glimpse_domain::LlmError;
pub use ollama::OllamaProvider;
pub use reply::extract_json;

type Reply = Result<String, LlmError>;

#[derive(Debug, Default)]
struct MockState {
    exact: HashMap<String, Reply>,
    containing: Vec<(String, Reply)>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Replies are resolved in this order: an exact-prompt match, then the first
/// registered substring rule the prompt contains, then the default reply.
///
/// # Examples
///
/// ```
/// use glimpse_llm::{LlmError, MockProvider};
/// use glimpse_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.when_contains("Spotify", Ok("music reply".to_string()));
/// provider.when_contains("explicit", Err(LlmError::SafetyRefusal));
///
/// assert_eq!(provider.generate("prompt1").unwrap(), "response1");
/// assert_eq!(provider.generate("Now playing on Spotify").unwrap(), "music reply");
/// assert_eq!(provider.generate("explicit lyrics"), Err(LlmError::SafetyRefusal));
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: Reply,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_reply: Ok(response.into()),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a MockProvider that fails every unmatched prompt with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            default_reply: Err(error),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.lock().exact.insert(prompt.into(), Ok(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>, error: LlmError) {
        self.lock().exact.insert(prompt.into(), Err(error));
    }

    /// Reply with `reply` whenever the prompt contains `needle`
    pub fn when_contains(&mut self, needle: impl Into<String>, reply: Result<String, LlmError>) {
        self.lock().containing.push((needle.into(), reply));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Every prompt received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// Reset the recorded prompts
    pub fn reset_call_count(&self) {
        self.lock().prompts.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not poison the mock for the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn reply_for(&self, prompt: &str) -> Reply {
        let mut state = self.lock();
        state.prompts.push(prompt.to_string());

        if let Some(reply) = state.exact.get(prompt) {
            return reply.clone();
        }
        if let Some((_, reply)) = state
            .containing
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
        {
            return reply.clone();
        }
        self.default_reply.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.reply_for(prompt)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, LlmError> {
        self.reply_for(prompt)
    }
}
