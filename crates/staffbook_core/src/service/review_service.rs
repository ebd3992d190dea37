//! Review use-case service.
//!
//! # Responsibility
//! - Provide id-based entry points for CLI callers.
//! - Delegate persistence and identity mapping to the repository.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Unknown ids surface as `RepoError::NotFound`.

use crate::model::review::{EmployeeId, ReviewId, SharedReview};
use crate::repo::review_repo::{RepoError, RepoResult, ReviewRepository};

/// Partial field update for an existing review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub year: Option<i64>,
    pub summary: Option<String>,
    pub employee_id: Option<EmployeeId>,
}

impl ReviewPatch {
    /// Returns whether the patch would leave every field untouched.
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.summary.is_none() && self.employee_id.is_none()
    }
}

/// Use-case service wrapper for review records.
pub struct ReviewService<R: ReviewRepository> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Makes sure the `reviews` table exists.
    pub fn ensure_schema(&self) -> RepoResult<()> {
        self.repo.create_table()
    }

    /// Drops the `reviews` table and forgets every cached handle.
    pub fn drop_schema(&mut self) -> RepoResult<()> {
        self.repo.drop_table()?;
        self.repo.clear_identity_map();
        Ok(())
    }

    /// Drops and recreates the `reviews` table, discarding cached handles.
    pub fn reset_schema(&mut self) -> RepoResult<()> {
        self.drop_schema()?;
        self.repo.create_table()
    }

    /// Persists a new review and returns its handle.
    pub fn record_review(
        &mut self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<SharedReview> {
        self.repo.create(year, summary, employee_id)
    }

    pub fn get_review(&mut self, id: ReviewId) -> RepoResult<Option<SharedReview>> {
        self.repo.find_by_id(id)
    }

    pub fn list_reviews(&mut self) -> RepoResult<Vec<SharedReview>> {
        self.repo.get_all()
    }

    pub fn list_reviews_for_employee(
        &mut self,
        employee_id: EmployeeId,
    ) -> RepoResult<Vec<SharedReview>> {
        self.repo.find_by_employee(employee_id)
    }

    /// Applies `patch` to the review with `id` and writes it back.
    ///
    /// An empty patch still checks that the review exists.
    pub fn revise_review(&mut self, id: ReviewId, patch: ReviewPatch) -> RepoResult<SharedReview> {
        let review = self.require(id)?;
        if patch.is_empty() {
            return Ok(review);
        }

        {
            let mut current = review.borrow_mut();
            if let Some(year) = patch.year {
                current.year = year;
            }
            if let Some(summary) = patch.summary {
                current.summary = summary;
            }
            if let Some(employee_id) = patch.employee_id {
                current.employee_id = employee_id;
            }
        }

        self.repo.update(&review)?;
        Ok(review)
    }

    /// Deletes the review with `id` and returns the detached handle.
    pub fn remove_review(&mut self, id: ReviewId) -> RepoResult<SharedReview> {
        let review = self.require(id)?;
        self.repo.delete(&review)?;
        Ok(review)
    }

    /// Hands the repository (and its identity map) back to the caller.
    pub fn into_repository(self) -> R {
        self.repo
    }

    fn require(&mut self, id: ReviewId) -> RepoResult<SharedReview> {
        self.repo.find_by_id(id)?.ok_or(RepoError::NotFound(id))
    }
}
