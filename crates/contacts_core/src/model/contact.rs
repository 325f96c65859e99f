//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical persisted contact record.
//! - Provide the schema-level validation applied before every write.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `created_at` is set once at insert time and never mutated.
//! - `email` is unique across all contacts.

use crate::model::rules::{is_email, is_phone_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of a contact row.
pub type ContactId = i64;

/// Canonical persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Serialized as an RFC 3339 UTC timestamp.
    pub created_at: DateTime<Utc>,
}

/// Mutable contact fields, already checked by an input contract.
///
/// Used as the write payload for both insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validation failure carrying every failed field rule, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactValidationError {
    pub errors: Vec<FieldError>,
}

impl ContactValidationError {
    /// Returns `Ok(())` when no rule failed.
    pub(crate) fn check(errors: Vec<FieldError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { errors })
        }
    }

    /// Flattens field errors into their user-facing messages.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|error| error.message.clone())
            .collect()
    }
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "contact validation failed: {fields}")
    }
}

impl Error for ContactValidationError {}

impl ContactFields {
    /// Checks schema rules for a writable field set.
    ///
    /// # Errors
    /// - Returns every failed rule, not only the first one.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        ContactValidationError::check(schema_errors(
            &self.name,
            &self.email,
            self.phone.as_deref(),
        ))
    }
}

impl Contact {
    /// Checks schema rules on a full record, e.g. after merging an update.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        ContactValidationError::check(schema_errors(
            &self.name,
            &self.email,
            self.phone.as_deref(),
        ))
    }

    /// Overwrites the mutable fields, keeping `id` and `created_at`.
    pub fn apply(&mut self, fields: ContactFields) {
        self.name = fields.name;
        self.email = fields.email;
        self.phone = fields.phone;
    }

    /// Returns the mutable part of this record.
    pub fn fields(&self) -> ContactFields {
        ContactFields {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

fn schema_errors(name: &str, email: &str, phone: Option<&str>) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_email(email) {
        errors.push(FieldError::new("email", "Email must be a valid email address"));
    }
    if let Some(phone) = phone {
        if !is_phone_number(phone) {
            errors.push(FieldError::new("phone", "Phone number is invalid"));
        }
    }
    errors
}
