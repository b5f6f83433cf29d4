use crate::database::Backend;
use crate::error::Result;
use sqlx::AnyPool;

const SQLITE_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT,
        practice_name TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS patients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT,
        name TEXT NOT NULL,
        age INTEGER,
        gender TEXT,
        condition TEXT,
        last_visit TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

const POSTGRES_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(180) NOT NULL UNIQUE,
        password_hash VARCHAR(256) NOT NULL,
        role VARCHAR(80),
        practice_name VARCHAR(200),
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS patients (
        id BIGSERIAL PRIMARY KEY,
        external_id VARCHAR(50),
        name VARCHAR(200) NOT NULL,
        age BIGINT,
        gender VARCHAR(20),
        condition VARCHAR(300),
        last_visit TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

/// Creates the `users` and `patients` tables when they do not exist yet.
pub async fn create_all(pool: &AnyPool, backend: Backend) -> Result<()> {
    let statements = match backend {
        Backend::Sqlite => SQLITE_SCHEMA,
        Backend::Postgres => POSTGRES_SCHEMA,
    };
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
