use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::middleware::session::SessionHandle;
use crate::session::FlashLevel;

pub const LOGIN_REQUIRED: &str = "Please login first.";

/// Sends anonymous visitors to the login page instead of running the handler.
pub async fn require_login(session: SessionHandle, req: Request, next: Next) -> Response {
    if !session.is_authenticated() {
        session.flash(FlashLevel::Warning, LOGIN_REQUIRED);
        return Redirect::to("/login").into_response();
    }
    next.run(req).await
}
