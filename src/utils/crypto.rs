use std::sync::OnceLock;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::Result;

/// Stands in for the stored hash when no account matches, so a missing
/// account costs the same Argon2 verify as a wrong password.
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Hashes `plain` with Argon2id and a fresh random salt, returning a PHC string.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

/// Returns `Ok(false)` on mismatch; only an unparseable stored hash is an error.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(stored)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Verifies against `stored`, or against the dummy hash when there is none.
/// A missing hash never matches.
pub fn verify_or_dummy(plain: &str, stored: Option<&str>) -> Result<bool> {
    match stored {
        Some(stored) => verify_password(plain, stored),
        None => {
            let _ = verify_password(plain, dummy_hash());
            Ok(false)
        }
    }
}

fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| {
        // Argon2 with default params only fails on a malformed salt.
        hash_password("no account has this password").unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_never_the_plaintext_and_verifies() {
        let hash = hash_password("s3cret!").unwrap();
        assert_ne!(hash, "s3cret!");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("repeat").unwrap();
        let b = hash_password("repeat").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn missing_hash_still_runs_a_real_verify() {
        assert!(!verify_or_dummy("no account has this password", None).unwrap());
        let dummy = DUMMY_HASH.get().expect("dummy hash computed on first miss");
        assert!(dummy.starts_with("$argon2id$"));
        // Parses as a PHC string, so the miss went through Argon2 rather than
        // failing fast on a parse error.
        assert!(PasswordHash::new(dummy).is_ok());
        assert!(!verify_password("guess", dummy).unwrap());
    }

    #[test]
    fn stored_hash_is_used_when_present() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_or_dummy("s3cret!", Some(&hash)).unwrap());
        assert!(!verify_or_dummy("nope", Some(&hash)).unwrap());
    }
}
