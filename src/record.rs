//! # Submission Records
//!
//! Data model for the design-details pipeline.
//!
//! A [`SubmissionRecord`] is created exactly once per accepted request and is
//! never updated or deleted afterwards. The `id` is a fresh UUID v4 per write,
//! so the store never sees two writes to the same key. `createdAt` is the
//! server wall clock at the time of the write call, ISO-8601 with millisecond
//! precision.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl SubmissionRecord {
    pub fn new(details: DesignDetails) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: details.name,
            email: details.email,
            created_at: now_iso(),
        }
    }
}

/// Validated, trimmed request payload for the design-details endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct DesignDetails {
    pub name: String,
    pub email: String,
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Checks that `value` is an object whose `name` and `email` are strings,
/// both non-blank after trimming. Pure function, same verdict every call.
pub fn validate_body(value: &Value) -> Result<DesignDetails, AppError> {
    let name = trimmed_field(value, "name")?;
    let email = trimmed_field(value, "email")?;

    Ok(DesignDetails { name, email })
}

fn trimmed_field(value: &Value, field: &str) -> Result<String, AppError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(AppError::InvalidBody)
}
