//! Core domain logic for the contacts API.
//! This crate is the single source of truth for contact invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactFields, ContactId, ContactValidationError, FieldError};
pub use model::input::{CreateContactInput, UpdateContactInput};
pub use model::rules::{is_email, is_phone_number};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_service::{parse_contact_id, ContactService, ServiceError, ServiceResult};

