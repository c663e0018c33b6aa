use hindsight_core::{Config, Session};
use hindsight_index::SessionRanker;
use hindsight_store::{Paths, SessionDb};

fn scored_lines(sessions: &[Session], query: &str, log_prefix: usize) -> Vec<String> {
    let ranker = SessionRanker::new(log_prefix);
    let scores = ranker.rank(sessions, query);

    let mut scored: Vec<(&Session, f64)> = sessions
        .iter()
        .filter_map(|s| scores.get(&s.id).map(|&score| (s, score)))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .map(|(session, score)| format!("  {:.3}  {} | {}", score, session.id, session.title))
        .collect()
}

pub fn run(query: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    if !paths.sessions_db().exists() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    let db = SessionDb::new(&paths.sessions_db())?;
    let sessions = db.list()?;
    let config = Config::new();

    let lines = scored_lines(&sessions, query, config.search_log_prefix);
    if lines.is_empty() {
        println!("No matches for \"{query}\"");
        return Ok(());
    }

    println!("Matches for \"{query}\"");
    println!("=================");
    for line in &lines {
        println!("{line}");
    }

    let ranker = SessionRanker::new(config.search_log_prefix);
    if let Some(best) = ranker.best_match(&sessions, query) {
        println!("\nBest match: {best}");
    }
    Ok(())
}
