use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::session::{Session, SessionStore};
use crate::utils::token::generate_session_id;

pub const DEFAULT_CAPACITY: usize = 10_000;

struct Entry {
    session: Session,
    touched: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drops the least recently used anonymous session, or the least recently
    /// used one overall when every session is logged in.
    fn evict_one(&mut self) {
        let victim = self
            .entries
            .iter()
            .filter(|(_, e)| !e.session.is_authenticated())
            .min_by_key(|(_, e)| e.touched)
            .or_else(|| self.entries.iter().min_by_key(|(_, e)| e.touched))
            .map(|(id, _)| id.clone());
        if let Some(id) = victim {
            self.entries.remove(&id);
        }
    }
}

/// Sessions held in process memory; the cookie only carries a random id.
/// Everything is lost on restart. At most `capacity` sessions are kept, so
/// clients that never send their cookie back cannot grow the map forever.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<Sessions>>,
    capacity: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, token: Option<&str>) -> Session {
        let Some(id) = token else {
            return Session::default();
        };
        let mut sessions = self.lock();
        let touched = sessions.tick();
        match sessions.entries.get_mut(id) {
            Some(entry) => {
                entry.touched = touched;
                entry.session.clone()
            }
            None => Session::default(),
        }
    }

    fn save(&self, token: Option<&str>, session: &Session) -> Result<String> {
        let mut sessions = self.lock();
        // Ids the store never issued are not adopted.
        let id = match token {
            Some(id) if sessions.entries.contains_key(id) => id.to_string(),
            _ => {
                while sessions.entries.len() >= self.capacity {
                    sessions.evict_one();
                }
                generate_session_id()
            }
        };
        let touched = sessions.tick();
        sessions.entries.insert(
            id.clone(),
            Entry {
                session: session.clone(),
                touched,
            },
        );
        Ok(id)
    }

    fn destroy(&self, token: &str) {
        self.lock().entries.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FlashLevel;

    fn authenticated() -> Session {
        Session {
            user_id: Some(1),
            user_email: Some("a@b.c".into()),
            flashes: Vec::new(),
        }
    }

    fn notice() -> Session {
        let mut session = Session::default();
        session.flash(FlashLevel::Warning, "Please login first.");
        session
    }

    #[test]
    fn save_then_load() {
        let store = MemorySessionStore::new();
        let id = store.save(None, &authenticated()).unwrap();
        assert_eq!(store.load(Some(&id)), authenticated());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn existing_ids_are_reused_unknown_ones_replaced() {
        let store = MemorySessionStore::new();
        let id = store.save(None, &authenticated()).unwrap();
        assert_eq!(store.save(Some(&id), &Session::default()).unwrap(), id);
        let fresh = store.save(Some("attacker-chosen"), &authenticated()).unwrap();
        assert_ne!(fresh, "attacker-chosen");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn destroy_forgets_the_session() {
        let store = MemorySessionStore::new();
        let id = store.save(None, &authenticated()).unwrap();
        store.destroy(&id);
        assert!(store.load(Some(&id)).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn never_holds_more_than_its_capacity() {
        let store = MemorySessionStore::with_capacity(16);
        for _ in 0..1000 {
            store.save(None, &notice()).unwrap();
        }
        assert_eq!(store.len(), 16);
    }

    #[test]
    fn anonymous_sessions_are_evicted_before_logged_in_ones() {
        let store = MemorySessionStore::with_capacity(4);
        let member = store.save(None, &authenticated()).unwrap();
        for _ in 0..100 {
            store.save(None, &notice()).unwrap();
        }
        assert_eq!(store.len(), 4);
        assert_eq!(store.load(Some(&member)), authenticated());
    }

    #[test]
    fn least_recently_used_goes_first() {
        let store = MemorySessionStore::with_capacity(2);
        let old = store.save(None, &authenticated()).unwrap();
        let newer = store.save(None, &authenticated()).unwrap();
        store.load(Some(&old));
        store.save(None, &authenticated()).unwrap();
        assert_eq!(store.load(Some(&old)), authenticated());
        assert!(store.load(Some(&newer)).is_empty());
    }

    #[test]
    fn rewriting_an_existing_id_does_not_evict() {
        let store = MemorySessionStore::with_capacity(1);
        let id = store.save(None, &authenticated()).unwrap();
        for _ in 0..10 {
            assert_eq!(store.save(Some(&id), &authenticated()).unwrap(), id);
        }
        assert_eq!(store.len(), 1);
    }
}
