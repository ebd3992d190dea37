//! SQLite storage bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections for staffbook core.
//! - Own the connection options shared by every repository.
//!
//! # Invariants
//! - Repositories never open connections themselves; a configured
//!   `Connection` is always injected by the caller.
//! - Table DDL is owned by each entity mapper, not by this module.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Default busy timeout applied to every opened connection.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Connection options applied during bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbOptions {
    /// Turns on `PRAGMA foreign_keys`.
    ///
    /// Off by default: `reviews.employee_id` is declared as a foreign key but
    /// the `employees` table is owned by another module and may be absent.
    pub enforce_foreign_keys: bool,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            enforce_foreign_keys: false,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}
