//! In-memory session store for intake results.
//!
//! The store is the only shared mutable state in the service. Everything
//! happens under one mutex; no await ever runs while it is held.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::models::candidate::CandidateRecord;

/// One intake batch: ranked results plus the operator's shortlist.
pub struct Session {
    pub results: Vec<CandidateRecord>,
    /// Candidate names the operator is tracking. Intended to be a subset of
    /// the names in `results`, but membership is not enforced.
    pub shortlist: HashSet<String>,
    pub created_at: DateTime<Utc>,
}

struct Inner {
    sessions: HashMap<String, Session>,
    /// Numeric value of the most recently issued id.
    last_id: i64,
}

/// TTL-evicting map from session id to `Session`.
///
/// Ids are epoch milliseconds, bumped past the previous id when two intakes
/// land in the same millisecond, so they are strictly increasing. Expired
/// sessions are invisible to reads and swept on every insert, which bounds
/// memory growth without a background task.
pub struct SessionStore {
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                last_id: 0,
            }),
        }
    }

    /// Stores a ranked result list under a fresh id and returns the id.
    pub fn create(&self, results: Vec<CandidateRecord>) -> String {
        let now = Utc::now();
        let mut inner = self.lock();

        let ttl = self.ttl;
        inner.sessions.retain(|_, s| now - s.created_at <= ttl);

        let id_value = now.timestamp_millis().max(inner.last_id + 1);
        inner.last_id = id_value;

        let id = id_value.to_string();
        inner.sessions.insert(
            id.clone(),
            Session {
                results,
                shortlist: HashSet::new(),
                created_at: now,
            },
        );
        id
    }

    /// Returns the ranked results for a live session, or `None` if the id is
    /// unknown or the session has expired.
    pub fn results(&self, id: &str) -> Option<Vec<CandidateRecord>> {
        let now = Utc::now();
        let inner = self.lock();
        inner
            .sessions
            .get(id)
            .filter(|s| now - s.created_at <= self.ttl)
            .map(|s| s.results.clone())
    }

    /// Adds a candidate name to a session's shortlist. Returns false if the
    /// session is unknown or expired.
    #[allow(dead_code)]
    pub fn add_to_shortlist(&self, id: &str, name: &str) -> bool {
        let now = Utc::now();
        let mut inner = self.lock();
        match inner.sessions.get_mut(id) {
            Some(s) if now - s.created_at <= self.ttl => s.shortlist.insert(name.to_string()),
            _ => false,
        }
    }

    /// Removes a candidate name from a session's shortlist. Returns whether
    /// the name was present.
    pub fn remove_from_shortlist(&self, id: &str, name: &str) -> bool {
        let mut inner = self.lock();
        match inner.sessions.get_mut(id) {
            Some(s) => s.shortlist.remove(name),
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("session store mutex poisoned")
    }

    #[cfg(test)]
    fn backdate(&self, id: &str, by: Duration) {
        let mut inner = self.lock();
        if let Some(s) = inner.sessions.get_mut(id) {
            s.created_at = s.created_at - by;
        }
    }
}
