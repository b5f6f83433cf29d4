use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::{Error, Result};
use crate::utils::time;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Option<String>,
    pub practice_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub practice_name: Option<String>,
    pub created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
            practice_name: row.practice_name,
            created_at: time::from_storage(&row.created_at)?,
        })
    }
}
