//! Repository layer: row mappers and their session caches.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `NotPersisted`) in
//!   addition to DB transport errors.
//! - Identity maps are owned by repository values, never process-global.

pub mod identity_map;
pub mod review_repo;
