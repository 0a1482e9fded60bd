//! Canonical user schema: validation of loosely typed records.
//!
//! Records arrive as JSON objects from HTTP bodies and leave the record store
//! as JSON objects whose optional columns use `null` for "no value". This
//! module is the single place that turns those shapes into validated
//! [`User`] and [`UserFields`] values.
//!
//! Call [`normalize_absent`] before parsing. The parsers treat `null` on an
//! optional field as a type error so un-normalised store output is caught
//! rather than silently accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::user::{
    EmailAddress, Location, PhoneNumber, User, UserFields, UserId, UserName, UserValidationError,
};

/// Record key holding the store-assigned identifier.
pub const FIELD_ID: &str = "id";
/// Record key holding the display name.
pub const FIELD_NAME: &str = "name";
/// Record key holding the contact phone number.
pub const FIELD_PHONE_NUMBER: &str = "phoneNumber";
/// Record key holding the optional, unique email address.
pub const FIELD_EMAIL: &str = "email";
/// Record key holding the optional free-text location.
pub const FIELD_LOCATION: &str = "location";

const OPTIONAL_FIELDS: [&str; 2] = [FIELD_EMAIL, FIELD_LOCATION];

/// A user record prior to schema validation.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_directory::domain::{RawUser, normalize_absent, parse_for_create};
///
/// let raw = RawUser::new()
///     .with("name", json!("Ann Lee"))
///     .with("phoneNumber", json!("555-0100"))
///     .with("location", json!(""));
/// let fields = parse_for_create(&normalize_absent(raw)).expect("valid record");
/// assert!(fields.location().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawUser(Map<String, Value>);

impl RawUser {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record in the record store's shape: every column present and
    /// absent optional values written as `null`.
    pub fn from_stored(
        id: Uuid,
        name: impl Into<String>,
        phone_number: impl Into<String>,
        email: Option<String>,
        location: Option<String>,
    ) -> Self {
        let nullable = |value: Option<String>| value.map_or(Value::Null, Value::String);
        Self::new()
            .with(FIELD_ID, Value::String(id.to_string()))
            .with(FIELD_NAME, Value::String(name.into()))
            .with(FIELD_PHONE_NUMBER, Value::String(phone_number.into()))
            .with(FIELD_EMAIL, nullable(email))
            .with(FIELD_LOCATION, nullable(location))
    }

    /// Set `key` to `value`, returning the updated record.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Look up a raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawUser {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl From<&UserFields> for RawUser {
    fn from(fields: &UserFields) -> Self {
        let mut raw = Self::new()
            .with(FIELD_NAME, Value::String(fields.name().to_string()))
            .with(
                FIELD_PHONE_NUMBER,
                Value::String(fields.phone_number().to_string()),
            );
        if let Some(email) = fields.email() {
            raw = raw.with(FIELD_EMAIL, Value::String(email.to_string()));
        }
        if let Some(location) = fields.location() {
            raw = raw.with(FIELD_LOCATION, Value::String(location.to_string()));
        }
        raw
    }
}

/// A single failing field reported by the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Record key that failed, e.g. `phoneNumber`.
    pub field: String,
    /// Machine-readable reason such as `required` or `invalid_email`.
    pub code: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            code: code.to_owned(),
            message: message.into(),
        }
    }

    fn rejected(field: &str, err: UserValidationError) -> Self {
        Self::new(field, err.code(), err.to_string())
    }
}

/// Raised when a raw record does not satisfy the user schema.
///
/// Carries one [`FieldIssue`] per failing field, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user record failed validation ({} issue(s))", issues.len())]
pub struct UserSchemaError {
    issues: Vec<FieldIssue>,
}

impl UserSchemaError {
    /// Every failing field, in schema order.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }
}

/// Remove optional fields whose value is `null` or blank text.
///
/// This is the one conversion between "missing", "explicitly null" and
/// "explicitly empty"; after it runs, an optional field is either absent or
/// holds a value the parsers inspect. Non-string values are left in place so
/// the parsers report them.
pub fn normalize_absent(mut raw: RawUser) -> RawUser {
    for field in OPTIONAL_FIELDS {
        let absent = match raw.get(field) {
            Some(Value::Null) => true,
            Some(Value::String(text)) => text.trim().is_empty(),
            _ => false,
        };
        if absent {
            raw.remove(field);
        }
    }
    raw
}

/// Validate a complete record, including its identifier.
pub fn parse_full(raw: &RawUser) -> Result<User, UserSchemaError> {
    let mut issues = Vec::new();
    let id = collect(&mut issues, required(raw, FIELD_ID, UserId::new));
    let fields = collect_fields(raw, &mut issues);

    match (id, fields) {
        (Some(id), Some(fields)) if issues.is_empty() => Ok(User::new(id, fields)),
        _ => Err(UserSchemaError { issues }),
    }
}

/// Validate a record for creation or update. Any `id` is ignored.
pub fn parse_for_create(raw: &RawUser) -> Result<UserFields, UserSchemaError> {
    let mut issues = Vec::new();
    match collect_fields(raw, &mut issues) {
        Some(fields) if issues.is_empty() => Ok(fields),
        _ => Err(UserSchemaError { issues }),
    }
}

fn collect_fields(raw: &RawUser, issues: &mut Vec<FieldIssue>) -> Option<UserFields> {
    let name = collect(issues, required(raw, FIELD_NAME, UserName::new));
    let phone = collect(issues, required(raw, FIELD_PHONE_NUMBER, PhoneNumber::new));
    let email = collect(issues, optional(raw, FIELD_EMAIL, EmailAddress::new));
    let location = collect(issues, optional(raw, FIELD_LOCATION, Location::new));

    Some(UserFields::new(name?, phone?, email?, location?))
}

fn collect<T>(issues: &mut Vec<FieldIssue>, result: Result<T, FieldIssue>) -> Option<T> {
    result.map_err(|issue| issues.push(issue)).ok()
}

fn required<T>(
    raw: &RawUser,
    field: &str,
    build: impl FnOnce(String) -> Result<T, UserValidationError>,
) -> Result<T, FieldIssue> {
    match raw.get(field) {
        None => Err(FieldIssue::new(field, "required", format!("{field} is required"))),
        Some(Value::String(text)) => {
            build(text.clone()).map_err(|err| FieldIssue::rejected(field, err))
        }
        Some(_) => Err(FieldIssue::new(
            field,
            "invalid_type",
            format!("{field} must be a string"),
        )),
    }
}

fn optional<T>(
    raw: &RawUser,
    field: &str,
    build: impl FnOnce(String) -> Result<T, UserValidationError>,
) -> Result<Option<T>, FieldIssue> {
    match raw.get(field) {
        None => Ok(None),
        Some(Value::String(text)) => build(text.clone())
            .map(Some)
            .map_err(|err| FieldIssue::rejected(field, err)),
        Some(_) => Err(FieldIssue::new(
            field,
            "invalid_type",
            format!("{field} must be a string when present"),
        )),
    }
}

#[cfg(test)]
#[path = "user_schema_tests.rs"]
mod tests;
