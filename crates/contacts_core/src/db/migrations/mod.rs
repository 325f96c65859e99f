//! Contact store schema steps.
//!
//! # Invariants
//! - Step versions are strictly increasing; `PRAGMA user_version` records
//!   the last step applied.
//! - All pending steps commit together or not at all.

use crate::db::{StoreError, StoreResult};
use log::info;
use rusqlite::Connection;
use std::fmt::{Display, Formatter};

/// One schema change shipped with this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStep {
    pub version: u32,
    pub name: &'static str,
    sql: &'static str,
}

impl Display for SchemaStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{} ({})", self.version, self.name)
    }
}

const SCHEMA_STEPS: [SchemaStep; 2] = [
    SchemaStep {
        version: 1,
        name: "contacts_table",
        sql: include_str!("0001_contacts.sql"),
    },
    SchemaStep {
        version: 2,
        name: "unique_email",
        sql: include_str!("0002_unique_email.sql"),
    },
];

/// Schema version this build migrates stores to.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS[SCHEMA_STEPS.len() - 1].version
}

/// Reads the schema version recorded in the store.
pub fn schema_version(conn: &Connection) -> StoreResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the store up to `latest_version()`.
///
/// Returns the steps applied by this call; empty when the store was
/// already current.
///
/// # Errors
/// - `SchemaTooNew` when the store is ahead of this build.
/// - `StepFailed` naming the step whose SQL failed, e.g. `unique_email`
///   on a legacy store that already holds duplicate emails.
pub fn apply_migrations(conn: &mut Connection) -> StoreResult<Vec<SchemaStep>> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(StoreError::SchemaTooNew { found, supported });
    }

    let pending = SCHEMA_STEPS
        .iter()
        .copied()
        .filter(|step| step.version > found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(pending);
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| StoreError::StepFailed {
                step: *step,
                source,
            })?;
    }
    tx.commit()?;

    for step in &pending {
        info!(
            "event=db_migrate module=db status=ok step={} version={}",
            step.name, step.version
        );
    }
    Ok(pending)
}
