use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://patients.db?mode=rwc";
const DEFAULT_SECRET_KEY: &str = "change-this-secret-in-prod";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MEMORY_SESSION_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Cookie,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub secret_key: String,
    pub session_backend: SessionBackend,
    pub memory_session_capacity: usize,
    pub db_max_connections: u32,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let server_address = match env::var("SERVER_ADDRESS") {
            Ok(addr) => addr,
            Err(_) => {
                let port: u16 = get_env_parse_or("PORT", DEFAULT_PORT)?;
                format!("0.0.0.0:{}", port)
            }
        };

        let database_url = env::var("DATABASE_URL")
            .map(|url| normalize_database_url(&url))
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let secret_key = env::var("SECRET_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string());

        Ok(Self {
            server_address,
            database_url,
            secret_key,
            session_backend: parse_session_backend(env::var("SESSION_BACKEND").ok().as_deref())?,
            memory_session_capacity: get_env_parse_or(
                "MEMORY_SESSION_CAPACITY",
                DEFAULT_MEMORY_SESSION_CAPACITY,
            )?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 5)?,
            log_format: parse_log_format(env::var("LOG_FORMAT").ok().as_deref())?,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// Rewrites the legacy `postgres://` scheme to `postgresql://`, once.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{}", rest),
        None => url.to_string(),
    }
}

fn parse_session_backend(raw: Option<&str>) -> Result<SessionBackend> {
    match raw.map(str::trim) {
        None | Some("") => Ok(SessionBackend::Cookie),
        Some(v) if v.eq_ignore_ascii_case("cookie") => Ok(SessionBackend::Cookie),
        Some(v) if v.eq_ignore_ascii_case("memory") => Ok(SessionBackend::Memory),
        Some(other) => Err(Error::Config(format!(
            "Invalid value for SESSION_BACKEND: {}",
            other
        ))),
    }
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat> {
    match raw.map(str::trim) {
        None | Some("") => Ok(LogFormat::Pretty),
        Some(v) if v.eq_ignore_ascii_case("pretty") => Ok(LogFormat::Pretty),
        Some(v) if v.eq_ignore_ascii_case("json") => Ok(LogFormat::Json),
        Some(other) => Err(Error::Config(format!("Invalid value for LOG_FORMAT: {}", other))),
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_legacy_postgres_scheme() {
        assert_eq!(
            normalize_database_url("postgres://u:p@db:5432/clinic"),
            "postgresql://u:p@db:5432/clinic"
        );
    }

    #[test]
    fn leaves_other_urls_alone() {
        assert_eq!(
            normalize_database_url("postgresql://u@db/clinic"),
            "postgresql://u@db/clinic"
        );
        assert_eq!(normalize_database_url("sqlite://x.db"), "sqlite://x.db");
    }

    #[test]
    fn only_the_prefix_is_rewritten() {
        assert_eq!(
            normalize_database_url("postgres://host/postgres://odd"),
            "postgresql://host/postgres://odd"
        );
    }

    #[test]
    fn session_backend_parsing() {
        assert_eq!(parse_session_backend(None).unwrap(), SessionBackend::Cookie);
        assert_eq!(
            parse_session_backend(Some("Memory")).unwrap(),
            SessionBackend::Memory
        );
        assert!(parse_session_backend(Some("redis")).is_err());
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(parse_log_format(Some("json")).unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format(Some("")).unwrap(), LogFormat::Pretty);
        assert!(parse_log_format(Some("xml")).is_err());
    }
}
