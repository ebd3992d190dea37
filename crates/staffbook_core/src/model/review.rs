//! Review domain model.
//!
//! # Responsibility
//! - Define the in-memory shape of one performance review.
//! - Provide the shared handle type used for identity-mapped instances.
//!
//! # Invariants
//! - `id == None` means the review has never been persisted, or was
//!   detached by a delete.
//! - Constructors never touch storage and never validate field ranges.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Primary key of a persisted review row.
pub type ReviewId = i64;

/// Primary key of the `employees` row a review belongs to.
pub type EmployeeId = i64;

/// Shared, mutable review instance handed out by the identity map.
///
/// Two handles refer to the same persisted row exactly when
/// `Rc::ptr_eq` holds.
pub type SharedReview = Rc<RefCell<Review>>;

/// One performance review for one employee and one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Storage-assigned key. `None` until saved.
    pub id: Option<ReviewId>,
    /// Review period.
    pub year: i64,
    /// Free-form review text.
    pub summary: String,
    /// Foreign key into `employees.id`.
    pub employee_id: EmployeeId,
}

impl Review {
    /// Creates an unpersisted review.
    pub fn new(year: i64, summary: impl Into<String>, employee_id: EmployeeId) -> Self {
        Self {
            id: None,
            year,
            summary: summary.into(),
            employee_id,
        }
    }

    /// Creates a review carrying a caller-provided id.
    ///
    /// Used when materializing rows. The id is not checked against storage.
    pub fn with_id(
        id: Option<ReviewId>,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> Self {
        Self {
            id,
            ..Self::new(year, summary, employee_id)
        }
    }

    /// Returns whether this review currently maps to a stored row.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Wraps this review into a shareable handle.
    pub fn into_shared(self) -> SharedReview {
        Rc::new(RefCell::new(self))
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Review {id}: ")?,
            None => write!(f, "<Review None: ")?,
        }
        write!(
            f,
            "{}, {}, Employee: {}>",
            self.year, self.summary, self.employee_id
        )
    }
}
