//! Highlight generation via the hosted summarization collaborator

use hindsight_core::{CompressedEvent, SummarizerConfig};
use regex::Regex;
use std::sync::OnceLock;

/// Highlights kept per session
pub const MAX_HIGHLIGHTS: usize = 3;

const MIN_HIGHLIGHT_CHARS: usize = 6;
const API_KEY_ENV: &str = "HINDSIGHT_API_KEY";

static MARKER_RE: OnceLock<Regex> = OnceLock::new();

/// Render the compressed log into the summarization prompt, one
/// `[Ns]: description` line per streak event.
pub fn build_summary_prompt(log: &[CompressedEvent]) -> String {
    let mut lines = String::new();
    for event in log {
        lines.push_str(&format!(
            "[{}s]: {}\n",
            event.duration_seconds, event.description
        ));
    }
    format!(
        "Below is an activity log from a recorded screen session. Each line \
         is one streak of similar activity with its duration.\n\n{}\n\
         Summarize the session into at most {} short highlight bullets.",
        lines, MAX_HIGHLIGHTS
    )
}

/// Extract highlight bullets from free-text model output.
///
/// Splits into lines, strips leading bullet/number markers, drops lines
/// shorter than 6 characters, and keeps at most the first 3.
pub fn parse_highlights(content: &str) -> Vec<String> {
    let re = MARKER_RE.get_or_init(|| Regex::new(r"^(?:[-*•]+|\d+[.)])\s*").unwrap());
    content
        .lines()
        .map(|line| re.replace(line.trim(), "").trim().to_string())
        .filter(|line| line.chars().count() >= MIN_HIGHLIGHT_CHARS)
        .take(MAX_HIGHLIGHTS)
        .collect()
}

/// Fixed highlight set used when summarization is unavailable
pub fn fallback_highlights() -> Vec<String> {
    vec![
        "Session recorded successfully".to_string(),
        "Activity log captured for review".to_string(),
        "Highlights unavailable - summarizer offline".to_string(),
    ]
}

/// Ask the summarization endpoint for highlights.
///
/// Chat-completions style request with a bearer credential; errors out on
/// transport failure or when no usable highlight line comes back.
pub async fn summarize_via_api(
    log: &[CompressedEvent],
    config: &SummarizerConfig,
    api_key: &str,
) -> anyhow::Result<Vec<String>> {
    let client = reqwest::Client::new();
    let prompt = build_summary_prompt(log);

    let response = client
        .post(&config.endpoint)
        .bearer_auth(api_key)
        .json(&serde_json::json!({
            "model": config.model,
            "max_tokens": config.max_tokens,
            "messages": [{"role": "user", "content": prompt}]
        }))
        .send()
        .await?;

    let body: serde_json::Value = response.json().await?;
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("");

    let highlights = parse_highlights(content);
    if highlights.is_empty() {
        anyhow::bail!("summarizer returned no usable highlight lines");
    }
    Ok(highlights)
}

/// Blocking entry point for synchronous callers.
///
/// A missing credential, transport failure, or unparseable response all
/// resolve to the fixed fallback set; summarization is never fatal.
pub fn summarize_or_fallback(log: &[CompressedEvent], config: &SummarizerConfig) -> Vec<String> {
    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => key,
        _ => return fallback_highlights(),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return fallback_highlights(),
    };

    runtime
        .block_on(summarize_via_api(log, config, &api_key))
        .unwrap_or_else(|_| fallback_highlights())
}
