#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use patient_records::{
    build_router,
    config::{Config, LogFormat, SessionBackend},
    AppState,
};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";

pub fn test_config(session_backend: SessionBackend) -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        secret_key: "test_secret_key".into(),
        session_backend,
        memory_session_capacity: 10_000,
        db_max_connections: 1,
        log_format: LogFormat::Pretty,
    }
}

pub async fn setup_state(session_backend: SessionBackend) -> AppState {
    AppState::init(&test_config(session_backend))
        .await
        .expect("init state")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Drives the router like a browser: remembers the session cookie.
pub struct TestClient {
    app: Router,
    pub cookie: Option<String>,
}

impl TestClient {
    pub fn new(state: AppState) -> Self {
        Self {
            app: build_router(state),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(fields)))
            .unwrap();
        self.send(req).await
    }

    pub async fn register(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[
                ("email", email),
                ("password", password),
                ("confirm-password", password),
                ("role", "doctor"),
                ("practice-name", "Oak Clinic"),
            ],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(value) => builder.header(header::COOKIE, format!("session={}", value)),
            None => builder,
        }
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp = self.app.clone().oneshot(req).await.unwrap();
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let (pair, attrs) = raw.split_once(';').unwrap_or((raw, ""));
            let Some(v) = pair.strip_prefix("session=") else {
                continue;
            };
            self.cookie = if attrs.contains("Max-Age=0") || v.is_empty() {
                None
            } else {
                Some(v.to_string())
            };
        }
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|l| l.to_str().unwrap().to_string());
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

/// A client that has registered and logged in as `doc@example.com`.
pub async fn logged_in_client(state: AppState) -> TestClient {
    let mut client = TestClient::new(state);
    client.register("doc@example.com", PASSWORD).await;
    let resp = client.login("doc@example.com", PASSWORD).await;
    assert_eq!(resp.location.as_deref(), Some("/dashboard"));
    client
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
