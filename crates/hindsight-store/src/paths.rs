//! Data-directory resolution

use std::path::PathBuf;

/// Resolves where session data lives on disk
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
}

impl Paths {
    pub fn new() -> std::io::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self {
            data_dir: home.join(".hindsight"),
        })
    }

    /// Session archive database path
    pub fn sessions_db(&self) -> PathBuf {
        self.data_dir.join("sessions.db")
    }

    /// Ensure the data directory exists
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
