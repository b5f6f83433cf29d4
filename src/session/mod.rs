//! Server-recognised login state plus one-shot flash notices.
//!
//! A [`Session`] travels between requests through a [`SessionStore`]. The
//! store decides what the browser actually holds: the whole signed session
//! ([`SignedCookieStore`]) or an opaque id into server memory
//! ([`MemorySessionStore`]).

pub mod cookie_store;
pub mod memory_store;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::user::User;

pub use cookie_store::SignedCookieStore;
pub use memory_store::MemorySessionStore;

/// Pending notices kept per session; older ones are dropped first.
pub const MAX_FLASHES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl Session {
    pub fn login(&mut self, user: &User) {
        self.user_id = Some(user.id);
        self.user_email = Some(user.email.clone());
    }

    /// Drops identity and any pending notices.
    pub fn clear(&mut self) {
        *self = Session::default();
    }

    /// Queues a notice. A notice already pending is not queued twice.
    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        let flash = Flash {
            level,
            message: message.into(),
        };
        if self.flashes.contains(&flash) {
            return;
        }
        if self.flashes.len() >= MAX_FLASHES {
            self.flashes.remove(0);
        }
        self.flashes.push(flash);
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.user_email.is_none() && self.flashes.is_empty()
    }
}

/// Where sessions live between requests.
///
/// `token` is the raw value of the session cookie, if the browser sent one.
/// Loading never fails: an unknown, expired or tampered token is an empty
/// session.
pub trait SessionStore: Send + Sync + 'static {
    fn load(&self, token: Option<&str>) -> Session;

    /// Persists `session` and returns the cookie value to hand back.
    /// Passing `None` forces a fresh token.
    fn save(&self, token: Option<&str>, session: &Session) -> Result<String>;

    fn destroy(&self, token: &str);
}
