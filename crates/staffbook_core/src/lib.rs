//! Core persistence logic for staffbook records.
//! Maps in-memory records onto SQLite rows through identity-mapped sessions.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbOptions, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::review::{EmployeeId, Review, ReviewId, SharedReview};
pub use repo::identity_map::IdentityMap;
pub use repo::review_repo::{
    RepoError, RepoResult, ReviewRepository, ReviewRow, SqliteReviewRepository,
};
pub use service::review_service::{ReviewPatch, ReviewService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
