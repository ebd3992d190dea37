use staffbook_core::{
    open_db_in_memory, DbOptions, RepoError, ReviewPatch, ReviewRepository, ReviewService,
    SqliteReviewRepository,
};
use std::rc::Rc;

#[test]
fn service_records_lists_and_finds_reviews() {
    let conn = open_db_in_memory(&DbOptions::default()).unwrap();
    let mut service = ReviewService::new(SqliteReviewRepository::new(&conn));
    service.ensure_schema().unwrap();

    let first = service.record_review(2021, "Ramp-up year", 5).unwrap();
    let second = service.record_review(2022, "Led migration", 5).unwrap();
    service.record_review(2022, "Other team", 6).unwrap();

    let id = first.borrow().id.unwrap();
    let found = service.get_review(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&found, &first));

    assert_eq!(service.list_reviews().unwrap().len(), 3);
    let for_employee = service.list_reviews_for_employee(5).unwrap();
    assert_eq!(for_employee.len(), 2);
    assert!(Rc::ptr_eq(&for_employee[1], &second));
}

#[test]
fn revise_review_applies_only_patched_fields() {
    let conn = open_db_in_memory(&DbOptions::default()).unwrap();
    let mut service = ReviewService::new(SqliteReviewRepository::new(&conn));
    service.ensure_schema().unwrap();

    let review = service.record_review(2023, "Good performance", 5).unwrap();
    let id = review.borrow().id.unwrap();

    let patch = ReviewPatch {
        summary: Some("Great performance".to_string()),
        ..ReviewPatch::default()
    };
    let revised = service.revise_review(id, patch).unwrap();
    assert!(Rc::ptr_eq(&revised, &review));

    let mut repo = service.into_repository();
    repo.clear_identity_map();
    let stored = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(stored.borrow().year, 2023);
    assert_eq!(stored.borrow().summary, "Great performance");
    assert_eq!(stored.borrow().employee_id, 5);
}

#[test]
fn revise_and_remove_unknown_id_return_not_found() {
    let conn = open_db_in_memory(&DbOptions::default()).unwrap();
    let mut service = ReviewService::new(SqliteReviewRepository::new(&conn));
    service.ensure_schema().unwrap();

    let err = service.revise_review(404, ReviewPatch::default()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
    let err = service.remove_review(404).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
}

#[test]
fn remove_review_detaches_handle() {
    let conn = open_db_in_memory(&DbOptions::default()).unwrap();
    let mut service = ReviewService::new(SqliteReviewRepository::new(&conn));
    service.ensure_schema().unwrap();

    let review = service.record_review(2023, "Leaving", 5).unwrap();
    let id = review.borrow().id.unwrap();
    let removed = service.remove_review(id).unwrap();

    assert!(Rc::ptr_eq(&removed, &review));
    assert_eq!(review.borrow().id, None);
    assert!(service.get_review(id).unwrap().is_none());
}

#[test]
fn reset_schema_empties_table_and_cache() {
    let conn = open_db_in_memory(&DbOptions::default()).unwrap();
    let mut service = ReviewService::new(SqliteReviewRepository::new(&conn));
    service.ensure_schema().unwrap();
    service.record_review(2023, "Gone after reset", 5).unwrap();

    service.reset_schema().unwrap();
    assert!(service.list_reviews().unwrap().is_empty());

    let repo = service.into_repository();
    assert_eq!(repo.identity_map_len(), 0);
}
