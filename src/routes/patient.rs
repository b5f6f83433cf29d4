use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};

use crate::{
    dto::patient_dto::PatientForm,
    error::{Error, Result},
    middleware::session::SessionHandle,
    session::FlashLevel,
    views, AppState,
};

pub const PATIENT_ADDED: &str = "Patient added.";
pub const PATIENT_UPDATED: &str = "Patient updated.";
pub const PATIENT_REMOVED: &str = "Patient removed.";

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>> {
    let patients = state.patient_service.list().await?;
    Ok(Html(views::dashboard(
        &session.take_flashes(),
        session.user_email().as_deref(),
        &patients,
    )))
}

#[axum::debug_handler]
pub async fn add_patient_page(session: SessionHandle) -> Html<String> {
    Html(views::patient_add(
        &session.take_flashes(),
        session.user_email().as_deref(),
    ))
}

#[axum::debug_handler]
pub async fn add_patient(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<PatientForm>,
) -> Result<Redirect> {
    let payload = match form.into_new_patient() {
        Ok(payload) => payload,
        Err(Error::BadRequest(msg)) => {
            session.flash(FlashLevel::Danger, msg);
            return Ok(Redirect::to("/patient/add"));
        }
        Err(e) => return Err(e),
    };
    state.patient_service.create(payload).await?;
    session.flash(FlashLevel::Success, PATIENT_ADDED);
    Ok(Redirect::to("/dashboard"))
}

#[axum::debug_handler]
pub async fn edit_patient_page(
    State(state): State<AppState>,
    session: SessionHandle,
    Path(raw_id): Path<String>,
) -> Result<Html<String>> {
    let id = patient_id(&raw_id)?;
    let patient = state.patient_service.get_by_id(id).await?;
    Ok(Html(views::patient_edit(
        &session.take_flashes(),
        session.user_email().as_deref(),
        &patient,
    )))
}

#[axum::debug_handler]
pub async fn edit_patient(
    State(state): State<AppState>,
    session: SessionHandle,
    Path(raw_id): Path<String>,
    Form(form): Form<PatientForm>,
) -> Result<Redirect> {
    let id = patient_id(&raw_id)?;
    state.patient_service.get_by_id(id).await?;
    let changes = match form.into_changes() {
        Ok(changes) => changes,
        Err(Error::BadRequest(msg)) => {
            session.flash(FlashLevel::Danger, msg);
            return Ok(Redirect::to(&format!("/patient/edit/{}", id)));
        }
        Err(e) => return Err(e),
    };
    state.patient_service.update(id, changes).await?;
    session.flash(FlashLevel::Success, PATIENT_UPDATED);
    Ok(Redirect::to("/dashboard"))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    session: SessionHandle,
    Path(raw_id): Path<String>,
) -> Result<Redirect> {
    let id = patient_id(&raw_id)?;
    state.patient_service.delete(id).await?;
    session.flash(FlashLevel::Info, PATIENT_REMOVED);
    Ok(Redirect::to("/dashboard"))
}

/// A path segment that is not an integer names no patient.
fn patient_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| Error::NotFound(format!("Patient {} not found", raw)))
}
