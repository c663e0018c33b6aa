use hindsight_store::{Paths, SessionDb};

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;

    println!("hindsight status");
    println!("================");
    println!("Data dir: {}", paths.data_dir.display());

    if paths.sessions_db().exists() {
        let db = SessionDb::new(&paths.sessions_db())?;
        println!("Archive: {} sessions", db.count()?);
    } else {
        println!("Archive: not created yet");
    }

    let summarizer = if std::env::var("HINDSIGHT_API_KEY")
        .map(|k| !k.is_empty())
        .unwrap_or(false)
    {
        "configured"
    } else {
        "not configured (fallback highlights)"
    };
    println!("Summarizer credential: {summarizer}");
    Ok(())
}
