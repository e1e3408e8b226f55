//! Generative fallback: the inference client and the prompt it is sent.

pub mod client;
pub mod prompt;

pub use client::{FakeInferenceClient, InferenceClient, InferenceError, OllamaClient};
pub use prompt::{assemble, stop_sequences, Budget, PromptParts};
