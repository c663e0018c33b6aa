use hindsight_store::{Paths, SessionDb};

pub fn run(id: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    if !paths.sessions_db().exists() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    let db = SessionDb::new(&paths.sessions_db())?;
    let Some(session) = db.get_by_id(id)? else {
        println!("No session with id {id}");
        return Ok(());
    };

    println!("{}", session.title);
    println!("=========");
    if let Some(description) = &session.description {
        println!("{description}");
    }
    println!(
        "Window: {} -> {} ({:.0}s)",
        session.started_at,
        session.ended_at,
        session.duration_ms() as f64 / 1000.0
    );
    if !session.tags.is_empty() {
        println!(
            "Tags: {}",
            session.tags.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }

    println!("\nHighlights:");
    for highlight in &session.highlights {
        println!("  - {highlight}");
    }

    if let Some(log) = &session.compressed_log {
        println!("\nActivity log ({} streaks):", log.len());
        for event in log {
            println!(
                "  [{}s] x{} {}",
                event.duration_seconds, event.occurrence_count, event.description
            );
        }
    }
    Ok(())
}
