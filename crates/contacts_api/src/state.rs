//! Shared request state and the blocking bridge to the contact service.
//!
//! # Invariants
//! - One SQLite connection is shared by all requests; each use case holds
//!   the connection lock for its whole duration.
//! - Use cases run on the blocking pool, never on async worker threads.
//! - A panic inside a use case is re-raised on the request task so the
//!   panic layer renders it.

use contacts_core::{ContactService, ServiceError, ServiceResult, SqliteContactRepository};
use log::{error, warn};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a migrated connection from `contacts_core::db`.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs one use case against a service bound to the shared connection.
    pub async fn run<T, F>(&self, use_case: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&ContactService<SqliteContactRepository<'c>>) -> ServiceResult<T>
            + Send
            + 'static,
    {
        let db = Arc::clone(&self.db);
        let joined = tokio::task::spawn_blocking(move || {
            let conn = db.lock().unwrap_or_else(|poisoned| {
                warn!("event=db_lock module=http status=recovered error_code=lock_poisoned");
                poisoned.into_inner()
            });
            let service = ContactService::new(SqliteContactRepository::new(&conn));
            use_case(&service)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                error!("event=use_case module=http status=error error_code=task_cancelled error={err}");
                Err(ServiceError::Persistence("Database query failed"))
            }
        }
    }
}
