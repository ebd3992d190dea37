//! Review mapper contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the `reviews` table DDL and CRUD statements.
//! - Map rows onto identity-mapped `Review` handles.
//!
//! # Invariants
//! - One statement per operation, auto-committed by SQLite.
//! - Every row read through the mapper yields the cached handle for its id
//!   when one exists. Cached field values win over row values; use
//!   `reload` to pull fresh values into a cached instance.
//! - `update`/`delete` report `NotFound` when no row matched.

use crate::db::DbError;
use crate::model::review::{EmployeeId, Review, ReviewId, SharedReview};
use crate::repo::identity_map::IdentityMap;
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

const REVIEW_SELECT_SQL: &str = "SELECT
    id,
    year,
    summary,
    employee_id
FROM reviews";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from review mapper operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite error, passed through unchanged.
    Db(DbError),
    /// Operation needs a persisted review but `id` is `None`.
    NotPersisted,
    /// No `reviews` row matched the id.
    NotFound(ReviewId),
    /// The id is not cached in this session, or is cached for another handle.
    NotTracked(ReviewId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotPersisted => write!(f, "review has not been persisted"),
            Self::NotFound(id) => write!(f, "review not found: {id}"),
            Self::NotTracked(id) => write!(f, "review is not tracked by this session: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotPersisted => None,
            Self::NotFound(_) => None,
            Self::NotTracked(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw `reviews` row in column order `(id, year, summary, employee_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub year: i64,
    pub summary: String,
    pub employee_id: EmployeeId,
}

impl ReviewRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            year: row.get("year")?,
            summary: row.get("summary")?,
            employee_id: row.get("employee_id")?,
        })
    }

    fn into_review(self) -> Review {
        Review::with_id(Some(self.id), self.year, self.summary, self.employee_id)
    }
}

impl From<(ReviewId, i64, String, EmployeeId)> for ReviewRow {
    fn from((id, year, summary, employee_id): (ReviewId, i64, String, EmployeeId)) -> Self {
        Self {
            id,
            year,
            summary,
            employee_id,
        }
    }
}

/// Mapper interface between `Review` handles and `reviews` rows.
pub trait ReviewRepository {
    /// Creates the `reviews` table when missing.
    fn create_table(&self) -> RepoResult<()>;
    /// Drops the `reviews` table when present.
    fn drop_table(&self) -> RepoResult<()>;
    /// Inserts a row for `review`, assigns its id and caches the handle.
    fn save(&mut self, review: &SharedReview) -> RepoResult<ReviewId>;
    /// Materializes a row, reusing the cached handle for its id.
    fn instance_from_db(&mut self, row: Option<ReviewRow>) -> Option<SharedReview>;
    /// Loads one review by primary key.
    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<SharedReview>>;
    /// Loads every review written for one employee, in insertion order.
    fn find_by_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<SharedReview>>;
    /// Writes current field values to the row matching the review id.
    fn update(&self, review: &SharedReview) -> RepoResult<()>;
    /// Deletes the row, evicts the handle and detaches the review.
    fn delete(&mut self, review: &SharedReview) -> RepoResult<()>;
    /// Loads every review in insertion order.
    fn get_all(&mut self) -> RepoResult<Vec<SharedReview>>;
    /// Overwrites the in-memory fields of `review` with its stored row.
    fn reload(&self, review: &SharedReview) -> RepoResult<()>;
    /// Number of handles cached by this session.
    fn identity_map_len(&self) -> usize;
    /// Forgets every cached handle.
    fn clear_identity_map(&mut self);

    /// Constructs and saves a review in one step.
    fn create(
        &mut self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<SharedReview> {
        let review = Review::new(year, summary, employee_id).into_shared();
        self.save(&review)?;
        Ok(review)
    }
}

/// SQLite-backed review mapper. One value is one session: its identity map
/// is released when the repository is dropped.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
    identity_map: IdentityMap<Review>,
}

impl<'conn> SqliteReviewRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            identity_map: IdentityMap::new(),
        }
    }

    fn load_row(&self, id: ReviewId) -> RepoResult<Option<ReviewRow>> {
        let row = self
            .conn
            .query_row(
                &format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"),
                [id],
                ReviewRow::from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn load_rows(&self, sql: &str, employee_id: Option<EmployeeId>) -> RepoResult<Vec<ReviewRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match employee_id {
            Some(employee_id) => stmt.query_map([employee_id], ReviewRow::from_row)?,
            None => stmt.query_map([], ReviewRow::from_row)?,
        };
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn materialize(&mut self, rows: Vec<ReviewRow>) -> Vec<SharedReview> {
        rows.into_iter()
            .filter_map(|row| self.instance_from_db(Some(row)))
            .collect()
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn create_table(&self) -> RepoResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                year INT,
                summary TEXT,
                employee_id INTEGER,
                FOREIGN KEY (employee_id) REFERENCES employees(id)
            );",
        )?;
        info!("event=review_create_table module=repo status=ok");
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS reviews;")?;
        info!("event=review_drop_table module=repo status=ok");
        Ok(())
    }

    fn save(&mut self, review: &SharedReview) -> RepoResult<ReviewId> {
        let previous_id = {
            let current = review.borrow();
            if let Some(previous_id) = current.id {
                warn!(
                    "event=review_save module=repo status=duplicate previous_id={previous_id}"
                );
            }
            self.conn.execute(
                "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3);",
                params![current.year, current.summary.as_str(), current.employee_id],
            )?;
            current.id
        };

        let id = self.conn.last_insert_rowid();
        // The handle now maps to the new row; its old key must not point at it.
        if let Some(previous_id) = previous_id {
            if self
                .identity_map
                .get(previous_id)
                .is_some_and(|cached| Rc::ptr_eq(&cached, review))
            {
                self.identity_map.evict(previous_id);
            }
        }
        review.borrow_mut().id = Some(id);
        self.identity_map.insert(id, Rc::clone(review));
        info!("event=review_save module=repo status=ok review_id={id}");
        Ok(id)
    }

    fn instance_from_db(&mut self, row: Option<ReviewRow>) -> Option<SharedReview> {
        let row = row?;
        if let Some(cached) = self.identity_map.get(row.id) {
            return Some(cached);
        }

        let id = row.id;
        let review = row.into_review().into_shared();
        self.identity_map.insert(id, Rc::clone(&review));
        debug!("event=review_cache_fill module=repo status=ok review_id={id}");
        Some(review)
    }

    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<SharedReview>> {
        let row = self.load_row(id)?;
        Ok(self.instance_from_db(row))
    }

    fn find_by_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<SharedReview>> {
        let rows = self.load_rows(
            &format!("{REVIEW_SELECT_SQL} WHERE employee_id = ?1 ORDER BY id ASC;"),
            Some(employee_id),
        )?;
        Ok(self.materialize(rows))
    }

    fn update(&self, review: &SharedReview) -> RepoResult<()> {
        let current = review.borrow();
        let id = current.id.ok_or(RepoError::NotPersisted)?;

        let changed = self.conn.execute(
            "UPDATE reviews
             SET year = ?1, summary = ?2, employee_id = ?3
             WHERE id = ?4;",
            params![
                current.year,
                current.summary.as_str(),
                current.employee_id,
                id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=review_update module=repo status=ok review_id={id}");
        Ok(())
    }

    fn delete(&mut self, review: &SharedReview) -> RepoResult<()> {
        let id = review.borrow().id.ok_or(RepoError::NotPersisted)?;
        let tracked = self
            .identity_map
            .get(id)
            .is_some_and(|cached| Rc::ptr_eq(&cached, review));
        if !tracked {
            return Err(RepoError::NotTracked(id));
        }

        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.identity_map.evict(id);
        review.borrow_mut().id = None;
        info!("event=review_delete module=repo status=ok review_id={id}");
        Ok(())
    }

    fn get_all(&mut self) -> RepoResult<Vec<SharedReview>> {
        let rows = self.load_rows(&format!("{REVIEW_SELECT_SQL} ORDER BY id ASC;"), None)?;
        Ok(self.materialize(rows))
    }

    fn reload(&self, review: &SharedReview) -> RepoResult<()> {
        let id = review.borrow().id.ok_or(RepoError::NotPersisted)?;
        let row = self.load_row(id)?.ok_or(RepoError::NotFound(id))?;

        let mut current = review.borrow_mut();
        current.year = row.year;
        current.summary = row.summary;
        current.employee_id = row.employee_id;
        debug!("event=review_reload module=repo status=ok review_id={id}");
        Ok(())
    }

    fn identity_map_len(&self) -> usize {
        self.identity_map.len()
    }

    fn clear_identity_map(&mut self) {
        let evicted = self.identity_map.len();
        self.identity_map.clear();
        debug!("event=review_cache_clear module=repo status=ok evicted={evicted}");
    }
}
