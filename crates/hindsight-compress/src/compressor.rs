//! Streak-based compression of raw observation logs

use hindsight_core::{jaccard, payload_text, CompressedEvent, Observation};

/// Default streak extension threshold
pub const DEFAULT_THRESHOLD: f64 = 0.6;

struct Streak {
    description: String,
    start_time: i64,
    end_time: i64,
    occurrence_count: usize,
}

impl Streak {
    fn open(description: String, timestamp: i64) -> Self {
        Self {
            description,
            start_time: timestamp,
            end_time: timestamp,
            occurrence_count: 1,
        }
    }

    fn into_event(self) -> CompressedEvent {
        CompressedEvent {
            duration_seconds: (self.end_time - self.start_time) as f64 / 1000.0,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            occurrence_count: self.occurrence_count,
        }
    }
}

/// Collapse consecutive near-duplicate observations into streak events.
///
/// Single forward pass; the caller guarantees non-decreasing timestamps.
/// A streak's description stays anchored to its first member's text, so
/// later members only extend the time window and count.
pub fn compress(observations: &[Observation], threshold: f64) -> Vec<CompressedEvent> {
    let mut events = Vec::new();
    let mut current: Option<Streak> = None;

    for obs in observations {
        let text = payload_text(&obs.payload);
        match current.take() {
            None => current = Some(Streak::open(text, obs.timestamp)),
            Some(mut streak) => {
                if jaccard(&streak.description, &text) >= threshold {
                    streak.end_time = obs.timestamp;
                    streak.occurrence_count += 1;
                    current = Some(streak);
                } else {
                    events.push(streak.into_event());
                    current = Some(Streak::open(text, obs.timestamp));
                }
            }
        }
    }

    if let Some(streak) = current {
        events.push(streak.into_event());
    }
    events
}
