pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod utils;
pub mod views;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::AnyPool;
use tower_http::trace::TraceLayer;

use crate::config::{Config, SessionBackend};
use crate::database::{create_pool, schema, Backend};
use crate::error::Result;
use crate::middleware::{auth::require_login, session::session_middleware};
use crate::services::{auth_service::AuthService, patient_service::PatientService};
use crate::session::{MemorySessionStore, SessionStore, SignedCookieStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: AnyPool,
    pub backend: Backend,
    pub auth_service: AuthService,
    pub patient_service: PatientService,
    pub session_store: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(pool: AnyPool, backend: Backend, session_store: Arc<dyn SessionStore>) -> Self {
        let auth_service = AuthService::new(pool.clone());
        let patient_service = PatientService::new(pool.clone());

        Self {
            pool,
            backend,
            auth_service,
            patient_service,
            session_store,
        }
    }

    /// Opens the pool, creates missing tables and picks the session store.
    pub async fn init(config: &Config) -> Result<Self> {
        let (pool, backend) = create_pool(config).await?;
        schema::create_all(&pool, backend).await?;

        let session_store: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Cookie => Arc::new(SignedCookieStore::new(&config.secret_key)),
            SessionBackend::Memory => {
                Arc::new(MemorySessionStore::with_capacity(config.memory_session_capacity))
            }
        };

        Ok(Self::new(pool, backend, session_store))
    }
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(routes::pages::index))
        .route(
            "/register",
            get(routes::auth::register_page).post(routes::auth::register_submit),
        )
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login_submit),
        )
        .route("/logout", get(routes::auth::logout))
        .route("/health", get(routes::health::health));

    let protected = Router::new()
        .route("/dashboard", get(routes::patient::dashboard))
        .route(
            "/patient/add",
            get(routes::patient::add_patient_page).post(routes::patient::add_patient),
        )
        .route(
            "/patient/edit/:id",
            get(routes::patient::edit_patient_page).post(routes::patient::edit_patient),
        )
        .route(
            "/patient/delete/:id",
            post(routes::patient::delete_patient),
        )
        .route_layer(axum::middleware::from_fn(require_login));

    public
        .merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
