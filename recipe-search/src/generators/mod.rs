//! Generative-text backend implementations.

pub mod gemini;

pub use gemini::{GeminiConfig, GeminiGenerator};
