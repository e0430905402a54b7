//! Cancellation and deadline behaviour of `RequestContext`.
//!
//! Run with: cargo test --test request_context_test

use std::future::pending;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use sensor_service::error::StorageError;
use sensor_service::sensors::RequestContext;

#[tokio::test]
async fn background_context_passes_results_through() {
    let cx = RequestContext::background();

    let ok = cx.run(async { Ok::<_, DbErr>(7) }).await.unwrap();
    assert_eq!(ok, 7);

    let err = cx
        .run(async { Err::<(), _>(DbErr::Custom("boom".to_string())) })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Database(DbErr::Custom(_))));
}

#[tokio::test]
async fn deadline_interrupts_a_stalled_call() {
    let cx = RequestContext::with_timeout(Duration::from_millis(20));

    let err = cx
        .run(pending::<Result<(), StorageError>>())
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::DeadlineExceeded));
}

#[tokio::test]
async fn cancellation_interrupts_a_stalled_call() {
    let token = CancellationToken::new();
    let cx = RequestContext::with_cancellation(token.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    let err = cx
        .run(pending::<Result<(), StorageError>>())
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Cancelled));
}

#[tokio::test]
async fn clones_share_cancellation() {
    let cx = RequestContext::background();
    let clone = cx.clone();

    clone.cancel();

    assert!(cx.is_cancelled());
    let err = cx.run(async { Ok::<_, DbErr>(()) }).await.unwrap_err();
    assert!(matches!(err, StorageError::Cancelled));
}

#[test]
fn and_deadline_keeps_the_earlier_deadline() {
    let now = Instant::now();
    let early = now + Duration::from_secs(1);
    let late = now + Duration::from_secs(60);

    let cx = RequestContext::with_deadline(early).and_deadline(late);
    assert_eq!(cx.deadline(), Some(early));

    let cx = RequestContext::with_cancellation(CancellationToken::new()).and_deadline(late);
    assert_eq!(cx.deadline(), Some(late));
}
