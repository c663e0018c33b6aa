use chrono::DateTime;
use hindsight_core::Session;
use hindsight_store::{Paths, SessionDb};

fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn format_line(session: &Session) -> String {
    let tags = if session.tags.is_empty() {
        String::new()
    } else {
        format!(
            " [{}]",
            session.tags.iter().cloned().collect::<Vec<_>>().join(", ")
        )
    };
    format!(
        "  {} | {} | {}{}",
        session.id,
        format_timestamp(session.started_at),
        session.title,
        tags
    )
}

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    if !paths.sessions_db().exists() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    let db = SessionDb::new(&paths.sessions_db())?;
    let sessions = db.list()?;

    if sessions.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    println!("Sessions: {}", sessions.len());
    println!("=========");
    for session in &sessions {
        println!("{}", format_line(session));
    }
    Ok(())
}
