//! Cosine ranking over term-frequency vectors.
//!
//! Distinct from the Jaccard scorer used by compression: sessions are
//! scored with L2-normalized term-frequency vectors, not token sets.

use hindsight_core::{tokenize_terms, Session};
use std::collections::HashMap;

/// Ranks sessions against free-text queries
#[derive(Debug, Clone)]
pub struct SessionRanker {
    /// Compressed-log descriptions included in searchable text
    log_prefix: usize,
}

impl SessionRanker {
    pub fn new(log_prefix: usize) -> Self {
        Self { log_prefix }
    }

    /// Score every session against the query, session id -> score in [0, 1].
    ///
    /// An empty query (no tokens survive normalization) yields no scores.
    pub fn rank(&self, sessions: &[Session], query: &str) -> HashMap<String, f64> {
        let query_vec = term_vector(query);
        if query_vec.is_empty() {
            return HashMap::new();
        }
        sessions
            .iter()
            .map(|session| (session.id.clone(), self.score(session, &query_vec)))
            .collect()
    }

    /// Highest-scoring session id; ties keep the first one encountered.
    /// A query that overlaps nothing returns None.
    pub fn best_match(&self, sessions: &[Session], query: &str) -> Option<String> {
        let query_vec = term_vector(query);
        if query_vec.is_empty() {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for session in sessions {
            let score = self.score(session, &query_vec);
            let replace = match best {
                None => score > 0.0,
                Some((_, top)) => score > top,
            };
            if replace {
                best = Some((&session.id, score));
            }
        }
        best.map(|(id, _)| id.to_string())
    }

    fn score(&self, session: &Session, query_vec: &HashMap<String, f64>) -> f64 {
        let session_vec = term_vector(&self.searchable_text(session));
        cosine(query_vec, &session_vec)
    }

    /// Concatenated searchable text: title, description, highlights, and a
    /// bounded prefix of compressed-log descriptions.
    fn searchable_text(&self, session: &Session) -> String {
        let mut parts: Vec<&str> = vec![&session.title];
        if let Some(description) = &session.description {
            parts.push(description);
        }
        parts.extend(session.highlights.iter().map(String::as_str));
        if let Some(log) = &session.compressed_log {
            parts.extend(
                log.iter()
                    .take(self.log_prefix)
                    .map(|event| event.description.as_str()),
            );
        }
        parts.join(" ")
    }
}

/// Term -> frequency, L2-normalized to unit length
fn term_vector(text: &str) -> HashMap<String, f64> {
    let mut counts: HashMap<String, f64> = HashMap::new();
    for token in tokenize_terms(text) {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }

    let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in counts.values_mut() {
            *value /= norm;
        }
    }
    counts
}

/// Dot product of two unit vectors, iterating the smaller one
fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, v)| large.get(term).map(|w| v * w))
        .sum();
    dot.clamp(0.0, 1.0)
}
