//! SQLite-backed session archive

use anyhow::Result;
use hindsight_core::Session;
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SessionDb {
    conn: Connection,
}

impl SessionDb {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                started_at INTEGER NOT NULL,
                ended_at INTEGER NOT NULL,
                tags TEXT NOT NULL,
                highlights TEXT NOT NULL,
                raw_observations TEXT,
                compressed_log TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_started_at ON sessions(started_at);
            ",
        )?;
        Ok(())
    }

    pub fn insert(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                session.id,
                session.title,
                session.description,
                session.started_at,
                session.ended_at,
                serde_json::to_string(&session.tags)?,
                serde_json::to_string(&session.highlights)?,
                session
                    .raw_observations
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                session
                    .compressed_log
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
            ],
        )?;
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare("SELECT * FROM sessions WHERE id = ?")?;
        let mut rows = stmt.query(params![id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_session(row)?))
        } else {
            Ok(None)
        }
    }

    /// All sessions, newest first
    pub fn list(&self) -> Result<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM sessions ORDER BY started_at DESC")?;
        let rows = stmt.query_map([], |row| {
            Self::row_to_session(row).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        e.to_string(),
                    )),
                )
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete by id; returns whether a row was removed
    pub fn delete(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_session(row: &rusqlite::Row) -> Result<Session> {
        let raw_observations: Option<String> = row.get(7)?;
        let compressed_log: Option<String> = row.get(8)?;
        Ok(Session {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            started_at: row.get(3)?,
            ended_at: row.get(4)?,
            tags: serde_json::from_str(&row.get::<_, String>(5)?)?,
            highlights: serde_json::from_str(&row.get::<_, String>(6)?)?,
            raw_observations: raw_observations
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            compressed_log: compressed_log
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
        })
    }
}
