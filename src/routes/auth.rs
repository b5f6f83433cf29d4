use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};

use crate::{
    dto::auth_dto::{LoginForm, RegisterForm},
    error::{Error, Result},
    middleware::session::SessionHandle,
    session::FlashLevel,
    views, AppState,
};

pub const REGISTER_INVALID: &str = "Please fill fields and ensure passwords match.";
pub const EMAIL_TAKEN: &str = "Email already registered. Please login.";
pub const ACCOUNT_CREATED: &str = "Account created — please login.";
pub const LOGIN_OK: &str = "Login successful.";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
pub const LOGGED_OUT: &str = "Logged out.";

#[axum::debug_handler]
pub async fn register_page(session: SessionHandle) -> Html<String> {
    Html(views::register(&session.take_flashes()))
}

#[axum::debug_handler]
pub async fn register_submit(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect> {
    match state.auth_service.register(form).await {
        Ok(_) => {
            session.flash(FlashLevel::Success, ACCOUNT_CREATED);
            Ok(Redirect::to("/login"))
        }
        Err(Error::Validation(_)) => {
            session.flash(FlashLevel::Danger, REGISTER_INVALID);
            Ok(Redirect::to("/register"))
        }
        Err(Error::EmailTaken(_)) => {
            session.flash(FlashLevel::Warning, EMAIL_TAKEN);
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e),
    }
}

#[axum::debug_handler]
pub async fn login_page(session: SessionHandle) -> Html<String> {
    Html(views::login(&session.take_flashes()))
}

#[axum::debug_handler]
pub async fn login_submit(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    match state.auth_service.authenticate(form).await {
        Ok(user) => {
            session.login(&user);
            session.flash(FlashLevel::Success, LOGIN_OK);
            Ok(Redirect::to("/dashboard"))
        }
        Err(Error::InvalidCredentials) => {
            session.flash(FlashLevel::Danger, INVALID_CREDENTIALS);
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e),
    }
}

#[axum::debug_handler]
pub async fn logout(session: SessionHandle) -> Redirect {
    if let Some(user_id) = session.user_id() {
        tracing::info!(user_id, "user logged out");
    }
    session.clear();
    session.flash(FlashLevel::Info, LOGGED_OUT);
    Redirect::to("/")
}
