//! In-memory session collection

use hindsight_core::Session;

/// Insertion-ordered session collection held for the process lifetime
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    /// Add a session; an existing session with the same id is replaced in place
    pub fn add(&mut self, session: Session) {
        if let Some(slot) = self.sessions.iter_mut().find(|s| s.id == session.id) {
            *slot = session;
        } else {
            self.sessions.push(session);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Delete by id; returns whether a session was removed
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.sessions.len() < before
    }

    /// Sessions in insertion order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
