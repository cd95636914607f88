//! Storage layer tests for the intake server.

use intake_core::db::unix_timestamp;
use intake_core::{Inquiry, InquiryStatus};

use super::db::IntakeDatabase;
use super::{DatabaseError, InquiryFilter, InquiryStore, MAX_PAGE_SIZE};

async fn test_db() -> IntakeDatabase {
    IntakeDatabase::open_in_memory().await.unwrap()
}

fn inquiry(id: &str, submitted_at: i64) -> Inquiry {
    Inquiry {
        id: id.to_string(),
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        subject: "Quote".to_string(),
        message: "Need a quote for a screw conveyor.".to_string(),
        phone: Some("+91 98765 43210".to_string()),
        company: None,
        submitted_at,
        status: InquiryStatus::Received,
    }
}

// === Insert / get ===

#[tokio::test]
async fn insert_and_get_inquiry() {
    let db = test_db().await;
    let original = inquiry("i1", unix_timestamp());
    db.insert_inquiry(&original).await.unwrap();

    let stored = db.get_inquiry("i1").await.unwrap().unwrap();
    assert_eq!(stored, original);
    assert_eq!(stored.status, InquiryStatus::Received);
    assert_eq!(stored.company, None);
}

#[tokio::test]
async fn get_unknown_inquiry_is_none() {
    let db = test_db().await;
    assert!(db.get_inquiry("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_id_is_rejected_without_overwrite() {
    let db = test_db().await;
    db.insert_inquiry(&inquiry("i1", 100)).await.unwrap();

    let mut other = inquiry("i1", 200);
    other.name = "Someone Else".to_string();
    assert!(db.insert_inquiry(&other).await.is_err());

    let stored = db.get_inquiry("i1").await.unwrap().unwrap();
    assert_eq!(stored.name, "Jane Doe");
}

#[tokio::test]
async fn blank_required_column_is_rejected_by_schema() {
    let db = test_db().await;
    let mut bad = inquiry("i1", 100);
    bad.message = "   ".to_string();

    assert!(db.insert_inquiry(&bad).await.is_err());
    assert!(db.get_inquiry("i1").await.unwrap().is_none());
}

// === Status transitions ===

#[tokio::test]
async fn status_moves_out_of_received_once() {
    let db = test_db().await;
    db.insert_inquiry(&inquiry("i1", 100)).await.unwrap();

    assert!(
        db.update_inquiry_status("i1", InquiryStatus::FailedNotification)
            .await
            .unwrap()
    );
    assert!(
        !db.update_inquiry_status("i1", InquiryStatus::Notified)
            .await
            .unwrap()
    );

    let stored = db.get_inquiry("i1").await.unwrap().unwrap();
    assert_eq!(stored.status, InquiryStatus::FailedNotification);
}

#[tokio::test]
async fn status_cannot_be_reset_to_received() {
    let db = test_db().await;
    db.insert_inquiry(&inquiry("i1", 100)).await.unwrap();
    db.update_inquiry_status("i1", InquiryStatus::Notified)
        .await
        .unwrap();

    assert!(
        !db.update_inquiry_status("i1", InquiryStatus::Received)
            .await
            .unwrap()
    );
    let stored = db.get_inquiry("i1").await.unwrap().unwrap();
    assert_eq!(stored.status, InquiryStatus::Notified);
}

#[tokio::test]
async fn status_update_on_unknown_id_is_noop() {
    let db = test_db().await;
    assert!(
        !db.update_inquiry_status("ghost", InquiryStatus::Notified)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn status_update_leaves_other_columns_alone() {
    let db = test_db().await;
    let original = inquiry("i1", 100);
    db.insert_inquiry(&original).await.unwrap();
    db.update_inquiry_status("i1", InquiryStatus::Notified)
        .await
        .unwrap();

    let stored = db.get_inquiry("i1").await.unwrap().unwrap();
    assert_eq!(
        stored,
        Inquiry {
            status: InquiryStatus::Notified,
            ..original
        }
    );
}

// === Listing ===

#[tokio::test]
async fn list_is_newest_first() {
    let db = test_db().await;
    db.insert_inquiry(&inquiry("old", 100)).await.unwrap();
    db.insert_inquiry(&inquiry("new", 300)).await.unwrap();
    db.insert_inquiry(&inquiry("mid", 200)).await.unwrap();

    let ids: Vec<String> = db
        .list_inquiries(&InquiryFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn list_same_second_falls_back_to_insertion_order() {
    let db = test_db().await;
    db.insert_inquiry(&inquiry("first", 100)).await.unwrap();
    db.insert_inquiry(&inquiry("second", 100)).await.unwrap();

    let list = db.list_inquiries(&InquiryFilter::default()).await.unwrap();
    assert_eq!(list[0].id, "second");
    assert_eq!(list[1].id, "first");
}

#[tokio::test]
async fn list_filters_by_status() {
    let db = test_db().await;
    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        db.insert_inquiry(&inquiry(id, 100 + i64::try_from(i).unwrap()))
            .await
            .unwrap();
    }
    db.update_inquiry_status("b", InquiryStatus::FailedNotification)
        .await
        .unwrap();

    let failed = db
        .list_inquiries(&InquiryFilter {
            status: Some(InquiryStatus::FailedNotification),
            ..InquiryFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, "b");

    let received = db
        .list_inquiries(&InquiryFilter {
            status: Some(InquiryStatus::Received),
            ..InquiryFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(received.len(), 2);
}

#[tokio::test]
async fn list_paginates() {
    let db = test_db().await;
    for n in 0..5 {
        db.insert_inquiry(&inquiry(&format!("i{n}"), 100 + n))
            .await
            .unwrap();
    }

    let page = db
        .list_inquiries(&InquiryFilter {
            status: None,
            limit: 2,
            offset: 2,
        })
        .await
        .unwrap();
    let ids: Vec<&str> = page.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["i2", "i1"]);
}

#[test]
fn filter_limit_is_clamped() {
    let zero = InquiryFilter {
        limit: 0,
        ..InquiryFilter::default()
    };
    assert_eq!(zero.clamped().limit, 1);

    let huge = InquiryFilter {
        limit: 10_000,
        ..InquiryFilter::default()
    };
    assert_eq!(huge.clamped().limit, MAX_PAGE_SIZE);
}

// === Trait surface / availability ===

#[tokio::test]
async fn store_trait_round_trips_through_dyn() {
    let db = test_db().await;
    let store: &dyn InquiryStore = &db;

    store.ping().await.unwrap();
    store.insert(&inquiry("i1", 100)).await.unwrap();
    assert!(store.update_status("i1", InquiryStatus::Notified).await.unwrap());
    assert_eq!(
        store.get("i1").await.unwrap().unwrap().status,
        InquiryStatus::Notified
    );
    assert_eq!(store.list(&InquiryFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn closed_database_reports_connection_error() {
    let db = test_db().await;
    db.close().await;

    let err = db.insert_inquiry(&inquiry("i1", 100)).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Connection(_)), "{err}");
    assert!(db.ping().await.is_err());
}

#[tokio::test]
async fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intake.db");

    let db = IntakeDatabase::open(&path).await.unwrap();
    db.insert_inquiry(&inquiry("i1", 100)).await.unwrap();
    db.close().await;

    let reopened = IntakeDatabase::open(&path).await.unwrap();
    assert!(reopened.get_inquiry("i1").await.unwrap().is_some());
}
