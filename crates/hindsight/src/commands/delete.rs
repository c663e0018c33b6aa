use hindsight_store::{Paths, SessionDb};

pub fn run(id: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    if !paths.sessions_db().exists() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    let db = SessionDb::new(&paths.sessions_db())?;
    if db.delete(id)? {
        println!("Deleted session {id}");
    } else {
        println!("No session with id {id}");
    }
    Ok(())
}
