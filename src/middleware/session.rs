use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::error::Error;
use crate::models::user::User;
use crate::session::{Flash, FlashLevel, Session};
use crate::AppState;

pub const SESSION_COOKIE: &str = "session";

struct SessionSlot {
    session: Session,
    dirty: bool,
    renew: bool,
}

/// Request-scoped access to the session loaded by [`session_middleware`].
#[derive(Clone)]
pub struct SessionHandle {
    slot: Arc<Mutex<SessionSlot>>,
}

impl SessionHandle {
    fn new(session: Session) -> Self {
        Self {
            slot: Arc::new(Mutex::new(SessionSlot {
                session,
                dirty: false,
                renew: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the session as authenticated for `user` and asks for a new token.
    pub fn login(&self, user: &User) {
        let mut slot = self.lock();
        slot.session.login(user);
        slot.dirty = true;
        slot.renew = true;
    }

    /// Forgets the user; the next token handed out is a new one.
    pub fn clear(&self) {
        let mut slot = self.lock();
        slot.session.clear();
        slot.dirty = true;
        slot.renew = true;
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let mut slot = self.lock();
        slot.session.flash(level, message);
        slot.dirty = true;
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        let mut slot = self.lock();
        let flashes = slot.session.take_flashes();
        if !flashes.is_empty() {
            slot.dirty = true;
        }
        flashes
    }

    pub fn user_id(&self) -> Option<i64> {
        self.lock().session.user_id
    }

    pub fn user_email(&self) -> Option<String> {
        self.lock().session.user_email.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated()
    }

    fn finish(&self) -> Option<(Session, bool)> {
        let slot = self.lock();
        slot.dirty.then(|| (slot.session.clone(), slot.renew))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or_else(|| Error::Session("session layer is not installed".into()))
    }
}

/// Loads the session once per request and writes it back only when it changed.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = read_cookie(req.headers(), SESSION_COOKIE);
    let store = state.session_store.clone();
    let handle = SessionHandle::new(store.load(token.as_deref()));
    req.extensions_mut().insert(handle.clone());

    let mut response = next.run(req).await;

    let Some((session, renew)) = handle.finish() else {
        return response;
    };

    if session.is_empty() {
        if let Some(token) = token.as_deref() {
            store.destroy(token);
            append_cookie(&mut response, expired_cookie());
        }
        return response;
    }

    let reuse = if renew {
        if let Some(token) = token.as_deref() {
            store.destroy(token);
        }
        None
    } else {
        token.as_deref()
    };

    match store.save(reuse, &session) {
        Ok(value) => append_cookie(&mut response, session_cookie(&value)),
        Err(e) => tracing::error!(error = %e, "failed to persist session"),
    }
    response
}

fn session_cookie(value: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, value
    )
}

fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

fn append_cookie(response: &mut Response, cookie: String) {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "session cookie is not a valid header value"),
    }
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc.def; lang=en"),
        );
        assert_eq!(read_cookie(&headers, "session").as_deref(), Some("abc.def"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(read_cookie(&headers, "session"), None);
    }

    #[test]
    fn handle_tracks_changes() {
        let handle = SessionHandle::new(Session::default());
        assert!(handle.finish().is_none());
        assert!(handle.take_flashes().is_empty());
        assert!(handle.finish().is_none());
        handle.flash(FlashLevel::Warning, "Please login first.");
        let (session, renew) = handle.finish().unwrap();
        assert_eq!(session.flashes.len(), 1);
        assert!(!renew);
    }
}
