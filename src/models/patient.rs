use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::{Error, Result};
use crate::utils::time;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub id: i64,
    pub external_id: Option<String>,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub condition: Option<String>,
    pub last_visit: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct PatientRow {
    pub id: i64,
    pub external_id: Option<String>,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub condition: Option<String>,
    pub last_visit: Option<String>,
    pub created_at: String,
}

impl TryFrom<PatientRow> for Patient {
    type Error = Error;

    fn try_from(row: PatientRow) -> Result<Self> {
        let age = row
            .age
            .map(i32::try_from)
            .transpose()
            .map_err(|_| Error::Internal(format!("patient {} has an out of range age", row.id)))?;

        Ok(Self {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            age,
            gender: row.gender,
            condition: row.condition,
            // Rows written by other tools may hold free text here.
            last_visit: row.last_visit.as_deref().and_then(time::parse_date),
            created_at: time::from_storage(&row.created_at)?,
        })
    }
}
