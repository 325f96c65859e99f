//! Contact store bootstrap.
//!
//! # Invariants
//! - A store handed out by `open_db`/`open_db_in_memory` is at the schema
//!   version this build ships, never half-migrated.
//! - A store written by a newer build is refused, not downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use migrations::SchemaStep;
pub use open::{open_db, open_db_in_memory};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while opening or migrating the contact store.
#[derive(Debug)]
pub enum StoreError {
    /// Connection-level SQLite failure (open, pragma, transaction).
    Sqlite(rusqlite::Error),
    /// The file carries a schema newer than this build understands.
    SchemaTooNew { found: u32, supported: u32 },
    /// One schema step failed; the store keeps its previous version.
    StepFailed {
        step: SchemaStep,
        source: rusqlite::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "contact store error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "contact store schema v{found} was written by a newer build; this build supports up to v{supported}"
            ),
            Self::StepFailed { step, source } => {
                write!(f, "contact store schema step {step} failed: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::StepFailed { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
