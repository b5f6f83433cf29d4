use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(rename = "confirm-password")]
    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
    pub role: Option<String>,
    #[serde(rename = "practice-name")]
    pub practice_name: Option<String>,
}

impl RegisterForm {
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self.role = self.role.filter(|r| !r.is_empty());
        self.practice_name = self.practice_name.filter(|p| !p.is_empty());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
            ..Default::default()
        }
    }

    #[test]
    fn normalizes_email_and_blank_optionals() {
        let f = RegisterForm {
            role: Some(String::new()),
            practice_name: Some("Oak Clinic".into()),
            ..form("  Dr.Who@Example.COM ", "pw", "pw")
        }
        .normalized();
        assert_eq!(f.email, "dr.who@example.com");
        assert_eq!(f.role, None);
        assert_eq!(f.practice_name.as_deref(), Some("Oak Clinic"));
    }

    #[test]
    fn rejects_missing_fields_and_mismatch() {
        assert!(form("a@b.c", "pw", "pw").validate().is_ok());
        assert!(form("", "pw", "pw").validate().is_err());
        assert!(form("a@b.c", "", "").validate().is_err());
        assert!(form("a@b.c", "pw", "pW").validate().is_err());
    }

    #[test]
    fn whitespace_only_email_is_empty_after_normalizing() {
        assert!(form("   ", "pw", "pw").normalized().validate().is_err());
    }
}
