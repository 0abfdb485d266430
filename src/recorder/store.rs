//! Lock-guarded session store
//!
//! Multi-step operations (create then configure then start, or compute
//! eligible ids then delete them) take one [`StoreGuard`] and do all their
//! work through it, so concurrent callers wait instead of interleaving.

use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;

use super::session::RecordingSession;
use crate::types::RecordingId;

type SessionMap = HashMap<RecordingId, RecordingSession>;

/// In-memory mapping from recording id to session record
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<SessionMap>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the exclusive lock for the duration of one logical operation
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            sessions: self.sessions.lock(),
        }
    }

    pub fn put(&self, session: RecordingSession) -> Option<RecordingSession> {
        self.lock().put(session)
    }

    pub fn remove(&self, id: RecordingId) -> Option<RecordingSession> {
        self.lock().remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: RecordingId) -> bool {
        self.lock().get(id).is_some()
    }

    /// Ids currently stored, ascending
    #[must_use]
    pub fn ids(&self) -> Vec<RecordingId> {
        self.lock().ids()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to the store
pub struct StoreGuard<'a> {
    sessions: MutexGuard<'a, SessionMap>,
}

impl StoreGuard<'_> {
    /// Insert a session keyed by its recording id, returning any record it displaced
    pub fn put(&mut self, session: RecordingSession) -> Option<RecordingSession> {
        self.sessions.insert(session.id(), session)
    }

    #[must_use]
    pub fn get(&self, id: RecordingId) -> Option<&RecordingSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: RecordingId) -> Option<&mut RecordingSession> {
        self.sessions.get_mut(&id)
    }

    pub fn remove(&mut self, id: RecordingId) -> Option<RecordingSession> {
        self.sessions.remove(&id)
    }

    pub fn values(&self) -> impl Iterator<Item = &RecordingSession> {
        self.sessions.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut RecordingSession> {
        self.sessions.values_mut()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<RecordingId> {
        let mut ids: Vec<RecordingId> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
