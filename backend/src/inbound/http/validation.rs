//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose `details` name the
//! offending field and a stable code, e.g.
//! `{"field": "targetId", "value": "x", "code": "invalid_uuid"}`.

use std::fmt::Display;
use std::str::FromStr;

use serde_json::json;
use uuid::Uuid;

use crate::domain::{ContentKind, ContentRef, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Attach a field to a domain validation failure.
pub(crate) fn invalid_field(field: FieldName, error: impl Display) -> Error {
    ValidationError::new(field.as_str(), error.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a value through its `FromStr` implementation.
pub(crate) fn parse_value<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|error| {
        ValidationError::new(field.as_str(), error.to_string())
            .with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn parse_optional_value<T>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|raw| parse_value(raw, field)).transpose()
}

/// Require a present, non-blank string.
pub(crate) fn required<'a>(value: Option<&'a str>, field: FieldName) -> Result<&'a str, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Parse a `(targetType, targetId)` pair into a content reference.
pub(crate) fn parse_content_ref(kind: &str, id: &str) -> Result<ContentRef, Error> {
    let kind: ContentKind = parse_value(kind, FieldName::new("targetType"))?;
    let id = parse_uuid(id, FieldName::new("targetId"))?;
    Ok(ContentRef::from_parts(kind, id))
}
