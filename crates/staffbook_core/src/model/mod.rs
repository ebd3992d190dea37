//! Domain model for staff records.
//!
//! # Responsibility
//! - Define the in-memory structures mapped onto relational rows.
//!
//! # Invariants
//! - Persisted identity is the integer primary key assigned by storage.

pub mod review;
