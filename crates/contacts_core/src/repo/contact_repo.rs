//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD and search APIs over the `contacts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `ContactFields::validate()` before SQL mutations.
//! - Read paths reject structurally broken rows (unreadable timestamps)
//!   but return field values as stored; field rules apply on write only.
//! - Listings are ordered by `created_at DESC, id DESC`.

use crate::model::contact::{Contact, ContactFields, ContactId, ContactValidationError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    phone,
    created_at
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(rusqlite::Error),
    NotFound(ContactId),
    /// Storage-level uniqueness constraint on `email` fired.
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::Conflict(email) => write!(f, "email already stored: {email}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value)
    }
}

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    /// Lists contacts, newest first; `search` filters by substring of
    /// name, email or phone.
    fn find_all(&self, search: Option<&str>) -> RepoResult<Vec<Contact>>;
    fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Contact>>;
    /// Persists a new contact and returns the stored row.
    fn insert(&self, fields: &ContactFields) -> RepoResult<Contact>;
    /// Overwrites mutable fields of an existing row and returns it.
    fn update_by_id(&self, id: ContactId, fields: &ContactFields) -> RepoResult<Contact>;
    /// Removes a row and returns the affected count.
    fn delete_by_id(&self, id: ContactId) -> RepoResult<usize>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_back(&self, id: ContactId) -> RepoResult<Contact> {
        self.find_by_id(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("contact {id} missing in read-back after write"))
        })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn find_all(&self, search: Option<&str>) -> RepoResult<Vec<Contact>> {
        let term = search.filter(|term| !term.is_empty());
        // instr() keeps matching case-sensitive and treats `%`/`_` literally.
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             WHERE ?1 IS NULL
                OR instr(name, ?1) > 0
                OR instr(email, ?1) > 0
                OR instr(phone, ?1) > 0
             ORDER BY created_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query(params![term])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }

        Ok(None)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Contact>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM contacts WHERE email = ?1;",
                params![email],
                |row| row.get::<_, ContactId>(0),
            )
            .optional()?;

        match id {
            Some(id) => self.find_by_id(id),
            None => Ok(None),
        }
    }

    fn insert(&self, fields: &ContactFields) -> RepoResult<Contact> {
        fields.validate()?;

        let created_at = Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO contacts (name, email, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    fields.name.as_str(),
                    fields.email.as_str(),
                    fields.phone.as_deref(),
                    created_at,
                ],
            )
            .map_err(|err| map_write_error(err, &fields.email))?;

        self.read_back(self.conn.last_insert_rowid())
    }

    fn update_by_id(&self, id: ContactId, fields: &ContactFields) -> RepoResult<Contact> {
        fields.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE contacts
                 SET
                    name = ?1,
                    email = ?2,
                    phone = ?3
                 WHERE id = ?4;",
                params![
                    fields.name.as_str(),
                    fields.email.as_str(),
                    fields.phone.as_deref(),
                    id,
                ],
            )
            .map_err(|err| map_write_error(err, &fields.email))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.read_back(id)
    }

    fn delete_by_id(&self, id: ContactId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", params![id])?;
        Ok(changed)
    }
}

fn map_write_error(err: rusqlite::Error, email: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::Conflict(email.to_string())
        }
        _ => err.into(),
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;
    let created_at_ms: i64 = row.get("created_at")?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_at_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid created_at value `{created_at_ms}` in contacts.created_at for id {id}"
        ))
    })?;

    Ok(Contact {
        id,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        created_at,
    })
}
