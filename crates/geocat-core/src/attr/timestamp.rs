//! Timestamp parsing and formatting.
//!
//! The service sends instants as `YYYY-MM-DDTHH:MM:SS[.fffffffff]Z`. Values
//! are kept at microsecond precision; extra digits are truncated, never
//! rounded.

use crate::{Error, Result, Value};

use chrono::{DateTime, NaiveDateTime, SubsecRound, Timelike, Utc};
use serde_json::Value as Json;

/// Parses an ISO-8601 instant. A timezone designator is required.
pub fn parse(text: &str) -> Result<DateTime<Utc>> {
    let instant = DateTime::parse_from_rfc3339(text).map_err(|_| {
        Error::attribute_validation(format!(
            "{text} is not a valid value for a DateTime attribute. \
             Value must match format '%Y-%m-%dT%H:%M:%S.%fZ'"
        ))
    })?;

    Ok(instant.with_timezone(&Utc).trunc_subsecs(6))
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS[.ffffff]Z`.
pub fn format(instant: &DateTime<Utc>) -> String {
    if instant.nanosecond() == 0 {
        instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        instant.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

/// Formats an instant without timezone; no designator is appended.
pub fn format_naive(instant: &NaiveDateTime) -> String {
    if instant.nanosecond() == 0 {
        instant.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        instant.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

pub(crate) fn serialize(value: &Value) -> Result<Json> {
    match value {
        Value::DateTime(instant) => Ok(Json::String(format(instant))),
        Value::NaiveDateTime(instant) => Ok(Json::String(format_naive(instant))),
        other => other.to_json(),
    }
}

pub(crate) fn deserialize(value: Value, validate: bool) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::DateTime(instant) => Ok(Value::DateTime(instant.trunc_subsecs(6))),
        Value::NaiveDateTime(instant) if validate => {
            Ok(Value::DateTime(instant.and_utc().trunc_subsecs(6)))
        }
        Value::NaiveDateTime(instant) => Ok(Value::NaiveDateTime(instant)),
        Value::String(text) => match parse(&text) {
            Ok(instant) => Ok(Value::DateTime(instant)),
            Err(err) if validate => Err(err),
            Err(_) => Ok(Value::String(text)),
        },
        other if validate => Err(Error::attribute_validation(format!(
            "{} is not a valid value for a DateTime attribute",
            other.kind_name()
        ))),
        other => Ok(other),
    }
}
