use sqlx::AnyPool;
use validator::Validate;

use crate::dto::auth_dto::{normalize_email, LoginForm, RegisterForm};
use crate::error::{Error, Result};
use crate::models::user::{User, UserRow};
use crate::utils::{crypto, time};

const USER_COLUMNS: &str = "id, email, password_hash, role, practice_name, created_at";

#[derive(Clone)]
pub struct AuthService {
    pool: AnyPool,
}

impl AuthService {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, form: RegisterForm) -> Result<User> {
        let form = form.normalized();
        form.validate()?;

        if self.find_by_email(&form.email).await?.is_some() {
            return Err(Error::EmailTaken(form.email));
        }

        let password = form.password.clone();
        let password_hash = blocking(move || crypto::hash_password(&password)).await?;
        let user = self.insert_user(&form, &password_hash).await?;
        tracing::info!(user_id = user.id, "registered user");
        Ok(user)
    }

    /// Writes the user row. A unique-index hit on `email` is `Error::EmailTaken`,
    /// which covers two registrations racing past the lookup in `register`.
    pub async fn insert_user(&self, form: &RegisterForm, password_hash: &str) -> Result<User> {
        let query = format!(
            "INSERT INTO users (email, password_hash, role, practice_name, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&form.email)
            .bind(password_hash)
            .bind(&form.role)
            .bind(&form.practice_name)
            .bind(time::to_storage(time::now()))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::EmailTaken(form.email.clone())
                }
                other => other.into(),
            })?;

        User::try_from(row)
    }

    /// Unknown email and wrong password both yield `Error::InvalidCredentials`,
    /// and both pay for one Argon2 verify.
    pub async fn authenticate(&self, form: LoginForm) -> Result<User> {
        let email = normalize_email(&form.email);
        let user = self.find_by_email(&email).await?;

        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let password = form.password;
        let verified =
            blocking(move || crypto::verify_or_dummy(&password, stored.as_deref())).await;

        match (user, verified) {
            (Some(user), Ok(true)) => {
                tracing::info!(user_id = user.id, "user logged in");
                Ok(user)
            }
            (Some(user), Err(e)) => {
                tracing::warn!(user_id = user.id, error = %e, "stored password hash is unreadable");
                Err(Error::InvalidCredentials)
            }
            _ => {
                tracing::debug!("login rejected");
                Err(Error::InvalidCredentials)
            }
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub async fn count_users(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(format!("password task failed: {}", e)))?
}
