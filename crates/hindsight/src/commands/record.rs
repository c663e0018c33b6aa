use anyhow::Context;
use chrono::Utc;
use hindsight_capture::{
    CaptureController, CaptureError, CaptureStatus, MediaPort, SourceRouter, StreamHandle,
    VisionPort, VisionRequest,
};
use hindsight_core::{now_ms, Config, Session};
use hindsight_store::{Paths, SessionDb};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

/// One line of the replay script
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// A vision result, as the collaborator would deliver it
    Observation { payload: serde_json::Value },
    /// A connection failure, as the collaborator would report it
    Error { message: String },
}

/// Local stand-ins for the browser-side collaborators. The state machine
/// itself cannot tell these apart from the real thing.
struct ReplayMedia;

impl MediaPort for ReplayMedia {
    fn acquire_stream(&mut self) -> Result<StreamHandle, CaptureError> {
        Ok(StreamHandle("replay-display".to_string()))
    }

    fn release_stream(&mut self, _stream: StreamHandle) {}
}

struct ReplayRouter;

impl SourceRouter for ReplayRouter {
    fn install(&mut self, _stream: &StreamHandle) {}
    fn restore(&mut self) {}
}

struct ReplayVision;

impl VisionPort for ReplayVision {
    fn connect(&mut self, _request: &VisionRequest) -> Result<(), CaptureError> {
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// Read script events from a JSONL file, skipping malformed lines
fn read_script(path: &Path) -> anyhow::Result<Vec<ScriptEvent>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open event script {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(event) => events.push(event),
            Err(err) => tracing::warn!("skipping malformed script line: {err}"),
        }
    }
    Ok(events)
}

/// Drive the capture state machine through the scripted events and build the
/// finished session record.
fn record_session(
    events: Vec<ScriptEvent>,
    config: &Config,
    title: Option<&str>,
    tags: Option<&str>,
) -> anyhow::Result<Session> {
    let mut controller = CaptureController::new(
        config.clone(),
        Box::new(ReplayMedia),
        Box::new(ReplayRouter),
        Box::new(ReplayVision),
    );

    let started_at = now_ms();
    if !controller.start() {
        anyhow::bail!("failed to start capture session");
    }

    for event in events {
        match event {
            ScriptEvent::Observation { payload } => controller.handle_observation(payload),
            ScriptEvent::Error { message } => {
                controller.handle_error(&message);
                if let Some(retry) = controller.take_pending_retry() {
                    std::thread::sleep(Duration::from_millis(retry.delay_ms));
                    controller.fire_retry(retry.generation);
                }
                if controller.status() == CaptureStatus::ConnectionLost {
                    tracing::warn!(
                        "{}",
                        controller.status_message().unwrap_or("connection lost")
                    );
                    break;
                }
            }
        }
    }

    let observations = controller.stop();
    let ended_at = now_ms();

    let compressed_log =
        hindsight_compress::compress(&observations, config.similarity_threshold);
    let highlights =
        hindsight_compress::summarize_or_fallback(&compressed_log, &config.summarizer);

    let tags: BTreeSet<String> = tags
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Session {
        id: format!("sess-{ended_at:x}"),
        title: title
            .map(str::to_string)
            .unwrap_or_else(|| format!("Session {}", Utc::now().format("%Y-%m-%d %H:%M"))),
        description: None,
        started_at,
        ended_at,
        tags,
        highlights,
        raw_observations: Some(observations),
        compressed_log: Some(compressed_log),
    })
}

pub fn run(input: &str, title: Option<&str>, tags: Option<&str>) -> anyhow::Result<()> {
    let events = read_script(Path::new(input))?;
    if events.is_empty() {
        println!("Event script is empty; nothing to record.");
        return Ok(());
    }

    let config = Config::new();
    let session = record_session(events, &config, title, tags)?;

    let paths = Paths::new()?;
    paths.ensure_data_dir()?;
    let db = SessionDb::new(&paths.sessions_db())?;
    db.insert(&session)?;

    let raw_count = session.raw_observations.as_ref().map_or(0, Vec::len);
    let log_count = session.compressed_log.as_ref().map_or(0, Vec::len);

    println!("Recorded session {}", session.id);
    println!("=================");
    println!("Title: {}", session.title);
    println!("Observations: {} raw -> {} compressed", raw_count, log_count);
    println!("Highlights:");
    for highlight in &session.highlights {
        println!("  - {}", highlight);
    }
    Ok(())
}
