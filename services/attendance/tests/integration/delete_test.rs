use rollcall_attendance::domain::{
    ClassKey, NewAttendanceData, NewStudentNote, StudentField, StudentKey, UserKey,
};
use rollcall_attendance::{ConstraintKind, StoreError};
use rollcall_domain::filter::Filter;
use rollcall_domain::id::StudentId;
use rollcall_domain::status::AttendanceStatus;

use crate::helpers::{class, day, db, mark, roster, student, teacher};

#[tokio::test]
async fn should_return_deleted_record() {
    let db = db().await;
    let ann = student(&db, "Ann", "Lee").await;

    let deleted = db.students().delete(&StudentKey::Id(ann.id)).await.unwrap();
    assert_eq!(deleted, ann);
    assert!(db
        .students()
        .find_unique(&StudentKey::Id(ann.id))
        .await
        .unwrap()
        .is_none());

    let err = db
        .students()
        .delete(&StudentKey::Id(StudentId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "student" }), "got {err:?}");
}

#[tokio::test]
async fn should_delete_many_up_to_limit() {
    let db = db().await;
    for (first, last) in [("Ann", "Lee"), ("Bo", "Lee"), ("Cy", "Lee"), ("Di", "Kim")] {
        student(&db, first, last).await;
    }

    let none = db
        .students()
        .delete_many(Some(Filter::eq(StudentField::LastName, "Park")), None)
        .await
        .unwrap();
    assert_eq!(none, 0);

    let two = db
        .students()
        .delete_many(Some(Filter::eq(StudentField::LastName, "Lee")), Some(2))
        .await
        .unwrap();
    assert_eq!(two, 2);
    assert_eq!(db.students().count(None).await.unwrap(), 2);

    let rest = db.students().delete_many(None, None).await.unwrap();
    assert_eq!(rest, 2);
}

#[tokio::test]
async fn should_cascade_class_delete_to_enrollments_and_attendance() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee"), ("Bo", "Kim")]).await;
    mark(&db, day(2024, 3, 1), r.class.id, r.students[0].id, AttendanceStatus::Present).await;

    db.classes().delete(&ClassKey::Id(r.class.id)).await.unwrap();

    assert_eq!(db.class_students().count(None).await.unwrap(), 0);
    assert_eq!(db.attendance().count(None).await.unwrap(), 0);
    assert_eq!(db.students().count(None).await.unwrap(), 2);
}

#[tokio::test]
async fn should_cascade_student_delete_to_notes_and_attendance() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee")]).await;
    let ann = &r.students[0];
    mark(&db, day(2024, 3, 1), r.class.id, ann.id, AttendanceStatus::Late).await;
    db.student_notes()
        .create(NewStudentNote {
            content: "Needs a seat near the front".into(),
            student_id: ann.id,
            author_id: r.teacher.id,
        })
        .await
        .unwrap();

    db.students().delete(&StudentKey::Id(ann.id)).await.unwrap();

    assert_eq!(db.student_notes().count(None).await.unwrap(), 0);
    assert_eq!(db.attendance().count(None).await.unwrap(), 0);
    assert_eq!(db.class_students().count(None).await.unwrap(), 0);
    assert_eq!(db.classes().count(None).await.unwrap(), 1);
}

#[tokio::test]
async fn should_refuse_to_delete_teacher_with_classes_or_notes() {
    let db = db().await;
    let t = teacher(&db, "t@school.edu").await;
    let algebra = class(&db, "Algebra I", t.id).await;

    let err = db.users().delete(&UserKey::Id(t.id)).await.unwrap_err();
    assert!(err.is_constraint(ConstraintKind::ForeignKey), "got {err:?}");

    db.classes().delete(&ClassKey::Id(algebra.id)).await.unwrap();
    let ann = student(&db, "Ann", "Lee").await;
    db.student_notes()
        .create(NewStudentNote {
            content: "Transferred in".into(),
            student_id: ann.id,
            author_id: t.id,
        })
        .await
        .unwrap();

    let err = db.users().delete(&UserKey::Id(t.id)).await.unwrap_err();
    assert!(err.is_constraint(ConstraintKind::ForeignKey), "got {err:?}");
    assert!(db
        .users()
        .find_unique(&UserKey::Id(t.id))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn should_cascade_user_delete_to_tallies() {
    let db = db().await;
    let t = teacher(&db, "t@school.edu").await;
    db.attendance_data()
        .create(NewAttendanceData {
            date: day(2024, 3, 1),
            present: 20,
            absent: 1,
            late: 2,
            excused: 0,
            user_id: t.id,
        })
        .await
        .unwrap();

    db.users().delete(&UserKey::Email("t@school.edu".into())).await.unwrap();

    assert_eq!(db.attendance_data().count(None).await.unwrap(), 0);
}
