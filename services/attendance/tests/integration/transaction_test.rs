use std::time::Duration;

use sea_orm::TransactionTrait;

use rollcall_attendance::domain::{NewStudentNote, UserKey};
use rollcall_attendance::{StoreError, TransactionFailure, TransactionOptions};
use rollcall_domain::query::FindMany;

use crate::helpers::{db, new_class, new_student, new_teacher};

#[tokio::test]
async fn should_commit_every_write_of_the_body() {
    let db = db().await;

    let (teacher_id, note_id) = db
        .transaction(None, |tx| {
            Box::pin(async move {
                let teacher = tx.users().create(new_teacher("t@school.edu")).await?;
                tx.classes()
                    .create(new_class("Algebra I", teacher.id))
                    .await?;
                let ann = tx.students().create(new_student("Ann", "Lee")).await?;
                let note = tx
                    .student_notes()
                    .create(NewStudentNote {
                        content: "Joined mid-term".into(),
                        student_id: ann.id,
                        author_id: teacher.id,
                    })
                    .await?;
                Ok((teacher.id, note.id))
            })
        })
        .await
        .unwrap();

    let teacher = db
        .users()
        .find_unique(&UserKey::Id(teacher_id))
        .await
        .unwrap();
    assert!(teacher.is_some());
    assert_eq!(db.classes().count(None).await.unwrap(), 1);
    let notes = db.student_notes().find_many(FindMany::new()).await.unwrap();
    assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), [note_id]);
}

#[tokio::test]
async fn should_roll_back_when_body_fails() {
    let db = db().await;

    let err = db
        .transaction(None, |tx| {
            Box::pin(async move {
                tx.users().create(new_teacher("t@school.edu")).await?;
                // Second insert trips the unique email constraint.
                tx.users().create(new_teacher("t@school.edu")).await?;
                Ok(())
            })
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "CONSTRAINT_VIOLATION");
    assert_eq!(db.users().count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn should_roll_back_on_domain_error() {
    let db = db().await;

    let err = db
        .transaction(None, |tx| {
            Box::pin(async move {
                tx.students().create(new_student("Ann", "Lee")).await?;
                Err::<(), _>(StoreError::not_found("class"))
            })
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { entity: "class" }));
    assert_eq!(db.students().count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn should_roll_back_when_body_exceeds_timeout() {
    let db = db().await;
    let options = TransactionOptions::default().timeout(Duration::from_millis(50));

    let err = db
        .transaction(Some(options), |tx| {
            Box::pin(async move {
                tx.students().create(new_student("Ann", "Lee")).await?;
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(())
            })
        })
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            StoreError::Transaction(TransactionFailure::Timeout { timeout_ms: 50 })
        ),
        "got {err:?}"
    );
    assert_eq!(err.kind(), "TRANSACTION");
    assert_eq!(db.students().count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn should_give_up_when_no_connection_frees_in_time() {
    let db = db().await;
    // The test pool has a single connection; holding it open starves the next begin.
    let held = db.connection().begin().await.unwrap();
    let options = TransactionOptions::default().max_wait(Duration::from_millis(50));

    let err = db
        .transaction(Some(options), |tx| {
            Box::pin(async move { tx.users().count(None).await })
        })
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            StoreError::Transaction(TransactionFailure::MaxWaitExceeded { .. })
        ),
        "got {err:?}"
    );

    held.rollback().await.unwrap();
    let count = db
        .transaction(None, |tx| Box::pin(async move { tx.users().count(None).await }))
        .await
        .unwrap();
    assert_eq!(count, 0);
}
