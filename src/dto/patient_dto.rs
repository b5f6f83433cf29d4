use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::utils::time;

pub const NAME_REQUIRED: &str = "Name is required.";
pub const AGE_NOT_A_NUMBER: &str = "Age must be a whole number.";

/// Raw add/edit form submission. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub external_id: String,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub condition: String,
    pub last_visit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub external_id: Option<String>,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub condition: Option<String>,
    pub last_visit: Option<NaiveDate>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientChanges {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub condition: Option<String>,
    pub last_visit: Option<NaiveDate>,
}

impl PatientForm {
    /// Empty optional fields become absent; an unparseable date is dropped.
    pub fn into_new_patient(self) -> Result<NewPatient> {
        if self.name.is_empty() {
            return Err(Error::BadRequest(NAME_REQUIRED.into()));
        }
        Ok(NewPatient {
            age: parse_age(&self.age)?,
            last_visit: time::parse_date(&self.last_visit),
            external_id: non_empty(self.external_id),
            name: self.name,
            gender: non_empty(self.gender),
            condition: non_empty(self.condition),
        })
    }

    /// Empty fields and an unparseable date leave the stored value untouched.
    pub fn into_changes(self) -> Result<PatientChanges> {
        Ok(PatientChanges {
            age: parse_age(&self.age)?,
            last_visit: time::parse_date(&self.last_visit),
            external_id: non_empty(self.external_id),
            name: non_empty(self.name),
            gender: non_empty(self.gender),
            condition: non_empty(self.condition),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_age(raw: &str) -> Result<Option<i32>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.trim()
        .parse::<i32>()
        .map(Some)
        .map_err(|_| Error::BadRequest(AGE_NOT_A_NUMBER.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PatientForm {
        PatientForm {
            name: "Ada".into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_stores_empty_fields_as_absent() {
        let new = form().into_new_patient().unwrap();
        assert_eq!(
            new,
            NewPatient {
                external_id: None,
                name: "Ada".into(),
                age: None,
                gender: None,
                condition: None,
                last_visit: None,
            }
        );
    }

    #[test]
    fn create_parses_age_and_date() {
        let new = PatientForm {
            age: "45".into(),
            last_visit: "2024-05-01".into(),
            gender: "F".into(),
            ..form()
        }
        .into_new_patient()
        .unwrap();
        assert_eq!(new.age, Some(45));
        assert_eq!(new.last_visit, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(new.gender.as_deref(), Some("F"));
    }

    #[test]
    fn create_silently_drops_bad_dates() {
        let new = PatientForm {
            last_visit: "yesterday".into(),
            ..form()
        }
        .into_new_patient()
        .unwrap();
        assert_eq!(new.last_visit, None);
    }

    #[test]
    fn create_requires_name() {
        let err = PatientForm::default().into_new_patient().unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == NAME_REQUIRED));
    }

    #[test]
    fn non_numeric_age_is_rejected() {
        let err = PatientForm {
            age: "forty".into(),
            ..form()
        }
        .into_new_patient()
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == AGE_NOT_A_NUMBER));
    }

    #[test]
    fn changes_keep_everything_for_an_empty_form() {
        let changes = PatientForm::default().into_changes().unwrap();
        assert_eq!(changes, PatientChanges::default());
    }

    #[test]
    fn changes_ignore_bad_dates() {
        let changes = PatientForm {
            name: "X".into(),
            last_visit: "2024/01/01".into(),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.name.as_deref(), Some("X"));
        assert_eq!(changes.last_visit, None);
    }
}
