//! Session record types shared across the pipeline

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Current wall clock as epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Derive display text from a raw vision payload.
///
/// String payloads are used verbatim; anything else is serialized to its
/// JSON string form.
pub fn payload_text(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One timestamped result from the vision collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Epoch milliseconds at capture time
    pub timestamp: i64,
    /// Raw result payload, usually a plain string
    pub payload: Value,
}

impl Observation {
    pub fn new(timestamp: i64, payload: Value) -> Self {
        Self { timestamp, payload }
    }

    /// Display text for this observation
    pub fn text(&self) -> String {
        payload_text(&self.payload)
    }
}

/// A maximal run of consecutive near-duplicate observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedEvent {
    pub description: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_seconds: f64,
    pub occurrence_count: usize,
}

/// One complete start-to-stop capture plus its derived artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub started_at: i64,
    pub ended_at: i64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_observations: Option<Vec<Observation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_log: Option<Vec<CompressedEvent>>,
}

impl Session {
    /// Recording window length in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.ended_at - self.started_at
    }
}
