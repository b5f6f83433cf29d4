//! HTML pages. Handlers hand over plain data; nothing here touches the store.

use axum::http::StatusCode;

use crate::models::patient::Patient;
use crate::session::Flash;
use crate::utils::time;

pub fn index(flashes: &[Flash], user_email: Option<&str>) -> String {
    let body = match user_email {
        Some(_) => r#"<h1>Patient Records</h1>
<p><a href="/dashboard">Go to your dashboard</a></p>"#
            .to_string(),
        None => r#"<h1>Patient Records</h1>
<p>Keep track of your practice's patients.</p>
<p><a href="/login">Login</a> or <a href="/register">create an account</a>.</p>"#
            .to_string(),
    };
    layout("Patient Records", flashes, user_email, &body)
}

pub fn register(flashes: &[Flash]) -> String {
    let body = r#"<h1>Create account</h1>
<form method="post" action="/register">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <label>Confirm password <input type="password" name="confirm-password" required></label>
  <label>Role <input type="text" name="role" placeholder="doctor"></label>
  <label>Practice name <input type="text" name="practice-name"></label>
  <button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Login</a></p>"#;
    layout("Register", flashes, None, body)
}

pub fn login(flashes: &[Flash]) -> String {
    let body = r#"<h1>Login</h1>
<form method="post" action="/login">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Login</button>
</form>
<p>No account? <a href="/register">Register</a></p>"#;
    layout("Login", flashes, None, body)
}

pub fn dashboard(flashes: &[Flash], user_email: Option<&str>, patients: &[Patient]) -> String {
    let rows: String = patients.iter().map(patient_row).collect();
    let table = if patients.is_empty() {
        "<p>No patients yet.</p>".to_string()
    } else {
        format!(
            r#"<table>
<thead><tr><th>ID</th><th>Name</th><th>Age</th><th>Gender</th><th>Condition</th><th>Last visit</th><th></th></tr></thead>
<tbody>
{}</tbody>
</table>"#,
            rows
        )
    };
    let body = format!(
        r#"<h1>Patients</h1>
<p><a href="/patient/add">Add patient</a></p>
{}"#,
        table
    );
    layout("Dashboard", flashes, user_email, &body)
}

fn patient_row(p: &Patient) -> String {
    format!(
        r#"<tr><td>{external_id}</td><td>{name}</td><td>{age}</td><td>{gender}</td><td>{condition}</td><td>{last_visit}</td><td><a href="/patient/edit/{id}">Edit</a> <form method="post" action="/patient/delete/{id}" onsubmit="return confirm('Delete this patient?')"><button type="submit">Delete</button></form></td></tr>
"#,
        id = p.id,
        external_id = escape(p.external_id.as_deref().unwrap_or("")),
        name = escape(&p.name),
        age = p.age.map(|a| a.to_string()).unwrap_or_default(),
        gender = escape(p.gender.as_deref().unwrap_or("")),
        condition = escape(p.condition.as_deref().unwrap_or("")),
        last_visit = p.last_visit.map(time::format_date).unwrap_or_default(),
    )
}

pub fn patient_add(flashes: &[Flash], user_email: Option<&str>) -> String {
    let body = format!(
        "<h1>Add patient</h1>\n{}",
        patient_form("/patient/add", None, "Add")
    );
    layout("Add patient", flashes, user_email, &body)
}

pub fn patient_edit(flashes: &[Flash], user_email: Option<&str>, patient: &Patient) -> String {
    let body = format!(
        "<h1>Edit {}</h1>\n{}",
        escape(&patient.name),
        patient_form(
            &format!("/patient/edit/{}", patient.id),
            Some(patient),
            "Save"
        )
    );
    layout("Edit patient", flashes, user_email, &body)
}

fn patient_form(action: &str, patient: Option<&Patient>, submit: &str) -> String {
    let text = |f: fn(&Patient) -> Option<String>| {
        escape(&patient.and_then(f).unwrap_or_default())
    };
    format!(
        r#"<form method="post" action="{action}">
  <label>External ID <input type="text" name="external_id" value="{external_id}"></label>
  <label>Name <input type="text" name="name" value="{name}"{required}></label>
  <label>Age <input type="number" name="age" min="0" value="{age}"></label>
  <label>Gender <input type="text" name="gender" value="{gender}"></label>
  <label>Condition <textarea name="condition">{condition}</textarea></label>
  <label>Last visit <input type="date" name="last_visit" value="{last_visit}"></label>
  <button type="submit">{submit}</button>
</form>
<p><a href="/dashboard">Back</a></p>"#,
        action = escape(action),
        external_id = text(|p| p.external_id.clone()),
        name = text(|p| Some(p.name.clone())),
        required = if patient.is_none() { " required" } else { "" },
        age = text(|p| p.age.map(|a| a.to_string())),
        gender = text(|p| p.gender.clone()),
        condition = text(|p| p.condition.clone()),
        last_visit = text(|p| p.last_visit.map(time::format_date)),
        submit = submit,
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<h1>{}</h1>
<p>{}</p>
<p><a href="/">Home</a></p>"#,
        status,
        escape(message)
    );
    layout(status.canonical_reason().unwrap_or("Error"), &[], None, &body)
}

fn layout(title: &str, flashes: &[Flash], user_email: Option<&str>, body: &str) -> String {
    let nav = match user_email {
        Some(email) => format!(
            r#"<span>{}</span> <a href="/dashboard">Dashboard</a> <a href="/logout">Logout</a>"#,
            escape(email)
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
    };
    let notices: String = flashes
        .iter()
        .map(|f| {
            format!(
                "<div class=\"flash flash-{}\">{}</div>\n",
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
</head>
<body>
<nav><a href="/">Home</a> {nav}</nav>
{notices}<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav,
        notices = notices,
        body = body,
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
