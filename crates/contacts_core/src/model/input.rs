//! Create/update request contracts.
//!
//! # Responsibility
//! - Describe the closed JSON shapes accepted by write endpoints.
//! - Turn raw input into `ContactFields` or a per-field error list.
//!
//! # Invariants
//! - Unknown fields are rejected at deserialization time.
//! - `name` and `email` are required on both create and update.
//! - An absent `phone` on update clears the stored phone.

use crate::model::contact::{ContactFields, ContactValidationError, FieldError};
use crate::model::rules::{is_email, is_phone_number};
use serde::Deserialize;

/// Request body for creating a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateContactInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for replacing a contact's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateContactInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CreateContactInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            phone: phone.map(str::to_string),
        }
    }

    /// Validates the request and returns normalized write fields.
    pub fn validate(&self) -> Result<ContactFields, ContactValidationError> {
        let mut errors = Vec::new();
        let name = required_text(&self.name, "name", "Name is required", &mut errors);
        let email = checked_email(&self.email, &mut errors);
        checked_phone(&self.phone, &mut errors);
        ContactValidationError::check(errors)?;

        Ok(ContactFields {
            name,
            email,
            phone: self.phone.clone(),
        })
    }
}

impl UpdateContactInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            phone: phone.map(str::to_string),
        }
    }

    /// Validates the request and returns the full replacement field set.
    pub fn validate(&self) -> Result<ContactFields, ContactValidationError> {
        let mut errors = Vec::new();
        let name = required_text(&self.name, "name", "Name cannot be empty", &mut errors);
        let email = checked_email(&self.email, &mut errors);
        checked_phone(&self.phone, &mut errors);
        ContactValidationError::check(errors)?;

        Ok(ContactFields {
            name,
            email,
            phone: self.phone.clone(),
        })
    }
}

fn required_text(
    value: &Option<String>,
    field: &'static str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, message));
    }
    trimmed.to_string()
}

fn checked_email(value: &Option<String>, errors: &mut Vec<FieldError>) -> String {
    let email = required_text(value, "email", "Email is required", errors);
    if !email.is_empty() && !is_email(&email) {
        errors.push(FieldError::new("email", "Email is invalid"));
    }
    email
}

fn checked_phone(value: &Option<String>, errors: &mut Vec<FieldError>) {
    if let Some(phone) = value {
        if !is_phone_number(phone) {
            errors.push(FieldError::new("phone", "Phone number is invalid"));
        }
    }
}
