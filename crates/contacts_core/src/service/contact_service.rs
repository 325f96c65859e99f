//! Contact use-case service.
//!
//! # Responsibility
//! - Provide one entry point per contact use case.
//! - Run existence and email-uniqueness checks before repository writes.
//! - Translate repository failures into the service error taxonomy.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Persistence failures never leak storage details to callers; they are
//!   logged here and replaced by a generic message.
//! - Uniqueness is check-then-act; the storage unique index is the backstop.

use crate::model::contact::{Contact, ContactId, FieldError};
use crate::model::input::{CreateContactInput, UpdateContactInput};
use crate::repo::contact_repo::{ContactRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;

pub type ServiceResult<T> = Result<T, ServiceError>;

const INVALID_ID_MESSAGE: &str = "ID must be a positive number";
const QUERY_FAILED: &str = "Database query failed";
const CREATE_FAILED: &str = "Failed to create contact";
const UPDATE_FAILED: &str = "Failed to update contact";
const DELETE_FAILED: &str = "Failed to delete contact";

/// Tagged failure returned by every contact use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Input or merged record broke one or more field rules.
    Validation(Vec<FieldError>),
    /// No contact with the requested id.
    NotFound(ContactId),
    /// Email already belongs to another contact.
    Conflict(String),
    /// Id is not a positive integer.
    BadInput(String),
    /// Unexpected store failure; message is safe to show.
    Persistence(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => {
                let messages = errors
                    .iter()
                    .map(|error| error.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Validation failed: {messages}")
            }
            Self::NotFound(id) => write!(f, "Contact with ID {id} not found"),
            Self::Conflict(_) => write!(f, "Email already in use"),
            Self::BadInput(message) => write!(f, "{message}"),
            Self::Persistence(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ServiceError {}

/// Parses a raw path id into a positive `ContactId`.
///
/// # Errors
/// - `BadInput` for non-numeric, zero or negative values.
/// - `BadInput` naming the limit for positive values above `ContactId::MAX`.
pub fn parse_contact_id(raw: &str) -> ServiceResult<ContactId> {
    match raw.trim().parse::<ContactId>() {
        Ok(id) if id > 0 => Ok(id),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Err(ServiceError::BadInput(
            format!("ID must not exceed {}", ContactId::MAX),
        )),
        _ => Err(ServiceError::BadInput(INVALID_ID_MESSAGE.to_string())),
    }
}

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists contacts newest first, optionally filtered by a substring of
    /// name, email or phone.
    pub fn list(&self, search: Option<&str>) -> ServiceResult<Vec<Contact>> {
        self.repo
            .find_all(search)
            .map_err(|err| read_failure("contact_list", err))
    }

    /// Gets one contact by id.
    pub fn get(&self, id: ContactId) -> ServiceResult<Contact> {
        ensure_positive(id)?;
        self.load("contact_get", id)
    }

    /// Looks up a contact by exact email; absence is not an error.
    pub fn find_by_email(&self, email: &str) -> ServiceResult<Option<Contact>> {
        self.repo
            .find_by_email(email)
            .map_err(|err| read_failure("contact_find_by_email", err))
    }

    /// Creates a contact after validating input and email uniqueness.
    pub fn create(&self, input: &CreateContactInput) -> ServiceResult<Contact> {
        let fields = input
            .validate()
            .map_err(|err| ServiceError::Validation(err.errors))?;

        if self.find_by_email(&fields.email)?.is_some() {
            warn!("event=contact_create module=service status=rejected error_code=email_conflict");
            return Err(ServiceError::Conflict(fields.email));
        }

        let contact = self
            .repo
            .insert(&fields)
            .map_err(|err| write_failure("contact_create", CREATE_FAILED, err))?;
        info!(
            "event=contact_create module=service status=ok id={}",
            contact.id
        );
        Ok(contact)
    }

    /// Replaces name, email and phone of an existing contact.
    ///
    /// # Contract
    /// - Email is re-checked for uniqueness only when it changes.
    /// - The merged record is validated against the contact schema before
    ///   it is written.
    pub fn update(&self, id: ContactId, input: &UpdateContactInput) -> ServiceResult<Contact> {
        ensure_positive(id)?;
        let fields = input
            .validate()
            .map_err(|err| ServiceError::Validation(err.errors))?;

        let mut contact = self.load("contact_update", id)?;
        if fields.email != contact.email {
            if let Some(owner) = self.find_by_email(&fields.email)? {
                if owner.id != id {
                    warn!(
                        "event=contact_update module=service status=rejected id={id} error_code=email_conflict"
                    );
                    return Err(ServiceError::Conflict(fields.email));
                }
            }
        }

        contact.apply(fields);
        contact
            .validate()
            .map_err(|err| ServiceError::Validation(err.errors))?;

        let updated = self
            .repo
            .update_by_id(id, &contact.fields())
            .map_err(|err| write_failure("contact_update", UPDATE_FAILED, err))?;
        info!("event=contact_update module=service status=ok id={id}");
        Ok(updated)
    }

    /// Deletes a contact permanently and returns its last stored state.
    pub fn delete(&self, id: ContactId) -> ServiceResult<Contact> {
        ensure_positive(id)?;
        let contact = self.load("contact_delete", id)?;

        let affected = self
            .repo
            .delete_by_id(id)
            .map_err(|err| write_failure("contact_delete", DELETE_FAILED, err))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(id));
        }

        info!("event=contact_delete module=service status=ok id={id}");
        Ok(contact)
    }

    fn load(&self, event: &str, id: ContactId) -> ServiceResult<Contact> {
        self.repo
            .find_by_id(id)
            .map_err(|err| read_failure(event, err))?
            .ok_or(ServiceError::NotFound(id))
    }
}

fn ensure_positive(id: ContactId) -> ServiceResult<()> {
    if id > 0 {
        Ok(())
    } else {
        Err(ServiceError::BadInput(INVALID_ID_MESSAGE.to_string()))
    }
}

fn read_failure(event: &str, err: RepoError) -> ServiceError {
    error!("event={event} module=service status=error error_code=query_failed error={err}");
    ServiceError::Persistence(QUERY_FAILED)
}

fn write_failure(event: &str, message: &'static str, err: RepoError) -> ServiceError {
    match err {
        RepoError::NotFound(id) => ServiceError::NotFound(id),
        RepoError::Conflict(email) => {
            warn!("event={event} module=service status=rejected error_code=email_unique_index");
            ServiceError::Conflict(email)
        }
        RepoError::Validation(err) => ServiceError::Validation(err.errors),
        other => {
            error!("event={event} module=service status=error error_code=write_failed error={other}");
            ServiceError::Persistence(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_contact_id, ServiceError};

    #[test]
    fn parse_contact_id_accepts_positive_integers() {
        assert_eq!(parse_contact_id("42"), Ok(42));
        assert_eq!(parse_contact_id(" 7 "), Ok(7));
    }

    #[test]
    fn parse_contact_id_rejects_other_values() {
        for raw in ["0", "-3", "abc", "", "1.5", "-99999999999999999999"] {
            assert!(
                matches!(parse_contact_id(raw), Err(ServiceError::BadInput(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn parse_contact_id_names_the_upper_limit() {
        assert_eq!(
            parse_contact_id("99999999999999999999"),
            Err(ServiceError::BadInput(
                "ID must not exceed 9223372036854775807".to_string()
            ))
        );
        assert_eq!(parse_contact_id("9223372036854775807"), Ok(i64::MAX));
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(
            ServiceError::NotFound(12).to_string(),
            "Contact with ID 12 not found"
        );
    }
}
