//! Inference client abstraction.
//!
//! A blocking `generate` call against an Ollama-style `/api/generate`
//! endpoint, plus a fake client for tests. Every failure is a typed
//! `InferenceError` so the dispatcher can pick the matching apology.

use crate::config::InferenceConfig;
use crate::session::lock;
use anyhow::Result;
use std::sync::Mutex;
use std::time::Duration;

/// Inference errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("inference is disabled in configuration")]
    Disabled,

    #[error("inference endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("inference endpoint returned HTTP {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("inference returned no text field")]
    EmptyResponse,
}

impl InferenceError {
    /// What the user hears instead of an answer
    pub fn apology(&self) -> &'static str {
        match self {
            InferenceError::Disabled => {
                "My language model is switched off, so I can only handle commands and quick questions right now."
            }
            InferenceError::Unreachable(_) => "I can't reach my language model. Is the inference service running?",
            InferenceError::Timeout(_) => "That took too long to think about. Try asking again.",
            InferenceError::Status(_) | InferenceError::InvalidResponse(_) => {
                "My language model returned an error. Give it a moment and try again."
            }
            InferenceError::EmptyResponse => crate::phrases::LISTENING,
        }
    }
}

/// Text generation backend
pub trait InferenceClient: Send + Sync {
    /// Generate a completion for `prompt`, at most `max_tokens` long,
    /// cut at the first stop sequence
    fn generate(&self, prompt: &str, max_tokens: u32, stop: &[&str]) -> Result<String, InferenceError>;
}

/// Ollama HTTP client
pub struct OllamaClient {
    config: InferenceConfig,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.effective_timeout()))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    fn request_body(&self, prompt: &str, max_tokens: u32, stop: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "repeat_penalty": self.config.repeat_penalty,
                "num_predict": max_tokens,
                "stop": stop,
            },
        })
    }
}

impl InferenceClient for OllamaClient {
    fn generate(&self, prompt: &str, max_tokens: u32, stop: &[&str]) -> Result<String, InferenceError> {
        if !self.config.enabled {
            return Err(InferenceError::Disabled);
        }

        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(prompt, max_tokens, stop))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout(self.config.effective_timeout())
                } else {
                    InferenceError::Unreachable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(InferenceError::Status(response.status().as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| InferenceError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = json
            .get("response")
            .and_then(|v| v.as_str())
            .ok_or(InferenceError::EmptyResponse)?;

        tracing::debug!(
            model = %self.config.model,
            max_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "inference complete"
        );
        Ok(text.trim().to_string())
    }
}

/// Fake client for testing
pub struct FakeInferenceClient {
    responses: Mutex<Vec<Result<String, InferenceError>>>,
    prompts: Mutex<Vec<(String, u32)>>,
    call_count: Mutex<usize>,
}

impl FakeInferenceClient {
    /// Responses are handed out in order; the last one repeats
    pub fn new(responses: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn always_error(error: InferenceError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Prompts received with their token budgets
    pub fn prompts(&self) -> Vec<(String, u32)> {
        lock(&self.prompts).clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().map(|(p, _)| p.clone())
    }
}

impl InferenceClient for FakeInferenceClient {
    fn generate(&self, prompt: &str, max_tokens: u32, _stop: &[&str]) -> Result<String, InferenceError> {
        *lock(&self.call_count) += 1;
        lock(&self.prompts).push((prompt.to_string(), max_tokens));

        let mut responses = lock(&self.responses);
        match responses.len() {
            0 => Err(InferenceError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}
