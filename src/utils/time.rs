use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Fixed-width RFC 3339 so that stored timestamps sort lexically in time order.
pub fn to_storage(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn from_storage(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
