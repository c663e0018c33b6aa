//! Core session types, text similarity, and configuration

mod config;
mod similarity;
mod types;

pub use config::{Config, SummarizerConfig};
pub use similarity::{jaccard, tokenize_terms};
pub use types::{now_ms, payload_text, CompressedEvent, Observation, Session};
