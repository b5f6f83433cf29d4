use axum::response::Html;

use crate::{middleware::session::SessionHandle, views};

#[axum::debug_handler]
pub async fn index(session: SessionHandle) -> Html<String> {
    let flashes = session.take_flashes();
    Html(views::index(&flashes, session.user_email().as_deref()))
}
