//! Language-model access.

pub mod gemini;

pub use gemini::{DEFAULT_MODEL, GeminiClient, ModelClient};
