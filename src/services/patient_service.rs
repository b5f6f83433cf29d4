use sqlx::AnyPool;

use crate::dto::patient_dto::{NewPatient, PatientChanges};
use crate::error::{Error, Result};
use crate::models::patient::{Patient, PatientRow};
use crate::utils::time;

const PATIENT_COLUMNS: &str =
    "id, external_id, name, age, gender, condition, last_visit, created_at";

#[derive(Clone)]
pub struct PatientService {
    pool: AnyPool,
}

impl PatientService {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Every patient, most recently created first.
    pub async fn list(&self) -> Result<Vec<Patient>> {
        let query = format!(
            "SELECT {} FROM patients ORDER BY created_at DESC, id DESC",
            PATIENT_COLUMNS
        );
        sqlx::query_as::<_, PatientRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Patient::try_from)
            .collect()
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Patient> {
        let query = format!("SELECT {} FROM patients WHERE id = $1", PATIENT_COLUMNS);
        let row = sqlx::query_as::<_, PatientRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))?;
        Patient::try_from(row)
    }

    pub async fn create(&self, payload: NewPatient) -> Result<Patient> {
        let query = format!(
            "INSERT INTO patients (external_id, name, age, gender, condition, last_visit, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            PATIENT_COLUMNS
        );
        let row = sqlx::query_as::<_, PatientRow>(&query)
            .bind(payload.external_id)
            .bind(payload.name)
            .bind(payload.age.map(i64::from))
            .bind(payload.gender)
            .bind(payload.condition)
            .bind(payload.last_visit.map(time::format_date))
            .bind(time::to_storage(time::now()))
            .fetch_one(&self.pool)
            .await?;

        let patient = Patient::try_from(row)?;
        tracing::info!(patient_id = patient.id, "created patient");
        Ok(patient)
    }

    pub async fn update(&self, id: i64, changes: PatientChanges) -> Result<Patient> {
        let query = format!(
            "UPDATE patients
             SET
                external_id = COALESCE($2, external_id),
                name = COALESCE($3, name),
                age = COALESCE($4, age),
                gender = COALESCE($5, gender),
                condition = COALESCE($6, condition),
                last_visit = COALESCE($7, last_visit)
             WHERE id = $1
             RETURNING {}",
            PATIENT_COLUMNS
        );
        let row = sqlx::query_as::<_, PatientRow>(&query)
            .bind(id)
            .bind(changes.external_id)
            .bind(changes.name)
            .bind(changes.age.map(i64::from))
            .bind(changes.gender)
            .bind(changes.condition)
            .bind(changes.last_visit.map(time::format_date))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(patient_id = id, "updated patient");
        Patient::try_from(row)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(not_found(id));
        }
        tracing::info!(patient_id = id, "deleted patient");
        Ok(())
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Patient {} not found", id))
}
