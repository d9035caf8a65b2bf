use std::time::Duration;

use rollcall_attendance::domain::{
    AttendanceKey, AttendancePatch, ClassKey, ClassPatch, ClassStudentKey, NewClassStudent,
    StudentField, StudentKey, StudentPatch, UserKey, UserPatch,
};
use rollcall_attendance::{AttendanceDb, ConstraintKind, StoreError};
use rollcall_domain::filter::Filter;
use rollcall_domain::id::{ClassId, StudentId, UserId};
use rollcall_domain::role::Role;
use rollcall_domain::status::AttendanceStatus;
use rollcall_testing::FileTestDb;

use crate::helpers::{
    class, day, db, enroll, mark, new_mark, new_student, new_teacher, roster, student, teacher,
};

// ── create / find_unique ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_find_created_user_by_id_and_email() {
    let db = db().await;
    let created = db.users().create(new_teacher("t@school.edu")).await.unwrap();

    assert_eq!(created.email, "t@school.edu");
    assert_eq!(created.role, Role::Teacher);
    assert_eq!(created.created_at, created.updated_at);

    let by_id = db
        .users()
        .find_unique(&UserKey::Id(created.id))
        .await
        .unwrap();
    assert_eq!(by_id.as_ref(), Some(&created));

    let by_email = db
        .users()
        .find_unique(&UserKey::Email("t@school.edu".into()))
        .await
        .unwrap();
    assert_eq!(by_email, Some(created));
}

#[tokio::test]
async fn should_round_trip_every_student_column() {
    let db = db().await;
    let mut input = new_student("Ann", "Lee");
    input.email = Some("ann@school.edu".into());
    input.phone = Some("555-0100".into());
    input.guardian_name = Some("Mia Lee".into());
    input.guardian_email = Some("mia@home.net".into());

    let created = db.students().create(input.clone()).await.unwrap();
    let found = db
        .students()
        .find_unique_or_throw(&StudentKey::GuardianEmail("mia@home.net".into()))
        .await
        .unwrap();

    assert_eq!(found, created);
    assert_eq!(found.first_name, input.first_name);
    assert_eq!(found.date_of_birth, input.date_of_birth);
    assert_eq!(found.enrollment_date, input.enrollment_date);
    assert_eq!(found.phone.as_deref(), Some("555-0100"));
    assert_eq!(found.address, None);
}

#[tokio::test]
async fn should_return_none_for_unknown_key() {
    let db = db().await;
    let found = db
        .students()
        .find_unique(&StudentKey::Id(StudentId::new()))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn should_raise_not_found_from_or_throw_variant() {
    let db = db().await;
    let err = db
        .classes()
        .find_unique_or_throw(&ClassKey::Id(ClassId::new()))
        .await
        .err();
    assert!(
        matches!(err, Some(StoreError::NotFound { entity: "class" })),
        "expected NotFound, got {err:?}"
    );
}

#[tokio::test]
async fn should_keep_caller_supplied_id() {
    let db = db().await;
    let id = UserId::new();
    let user = db
        .users()
        .create_with_id(id, new_teacher("t@school.edu"))
        .await
        .unwrap();
    assert_eq!(user.id, id);
}

// ── unique constraints ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_duplicate_user_email() {
    let db = db().await;
    teacher(&db, "t@school.edu").await;

    let err = db
        .users()
        .create(new_teacher("t@school.edu"))
        .await
        .unwrap_err();
    assert!(err.is_constraint(ConstraintKind::Unique), "got {err:?}");
    assert_eq!(err.kind(), "CONSTRAINT_VIOLATION");
}

#[tokio::test]
async fn should_reject_duplicate_student_and_guardian_emails() {
    let db = db().await;
    let mut first = new_student("Ann", "Lee");
    first.email = Some("ann@school.edu".into());
    first.guardian_email = Some("mia@home.net".into());
    db.students().create(first).await.unwrap();

    let mut same_email = new_student("Ann", "Other");
    same_email.email = Some("ann@school.edu".into());
    let err = db.students().create(same_email).await.unwrap_err();
    assert!(err.is_constraint(ConstraintKind::Unique), "got {err:?}");

    let mut same_guardian = new_student("Bo", "Lee");
    same_guardian.guardian_email = Some("mia@home.net".into());
    let err = db.students().create(same_guardian).await.unwrap_err();
    assert!(err.is_constraint(ConstraintKind::Unique), "got {err:?}");
}

#[tokio::test]
async fn should_allow_many_students_without_email() {
    let db = db().await;
    student(&db, "Ann", "Lee").await;
    student(&db, "Bo", "Kim").await;
    assert_eq!(db.students().count(None).await.unwrap(), 2);
}

#[tokio::test]
async fn should_reject_duplicate_enrollment() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee")]).await;

    let err = db
        .class_students()
        .create(NewClassStudent::new(r.class.id, r.students[0].id))
        .await
        .unwrap_err();
    assert!(err.is_constraint(ConstraintKind::Unique), "got {err:?}");

    let found = db
        .class_students()
        .find_unique(&ClassStudentKey::ClassStudent {
            class_id: r.class.id,
            student_id: r.students[0].id,
        })
        .await
        .unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn should_reject_dangling_foreign_key() {
    let db = db().await;
    let err = db
        .classes()
        .create(crate::helpers::new_class("Ghost", UserId::new()))
        .await
        .unwrap_err();
    assert!(err.is_constraint(ConstraintKind::ForeignKey), "got {err:?}");
}

// ── create_many ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_skip_duplicates_in_batch_when_asked() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee"), ("Bo", "Kim")]).await;
    let d = day(2024, 3, 1);
    mark(&db, d, r.class.id, r.students[0].id, AttendanceStatus::Present).await;

    let inserted = db
        .attendance()
        .create_many(
            vec![
                new_mark(d, r.class.id, r.students[0].id, AttendanceStatus::Absent),
                new_mark(d, r.class.id, r.students[1].id, AttendanceStatus::Late),
            ],
            true,
        )
        .await
        .unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(db.attendance().count(None).await.unwrap(), 2);
}

#[tokio::test]
async fn should_insert_nothing_when_batch_conflicts() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee"), ("Bo", "Kim")]).await;
    let d = day(2024, 3, 1);
    mark(&db, d, r.class.id, r.students[0].id, AttendanceStatus::Present).await;

    let err = db
        .attendance()
        .create_many(
            vec![
                new_mark(d, r.class.id, r.students[1].id, AttendanceStatus::Late),
                new_mark(d, r.class.id, r.students[0].id, AttendanceStatus::Absent),
            ],
            false,
        )
        .await
        .unwrap_err();

    assert!(err.is_constraint(ConstraintKind::Unique), "got {err:?}");
    assert_eq!(db.attendance().count(None).await.unwrap(), 1);
}

#[tokio::test]
async fn should_accept_empty_batch() {
    let db = db().await;
    let inserted = db.students().create_many(vec![], false).await.unwrap();
    assert_eq!(inserted, 0);
}

// ── update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_update_listed_fields_only_and_refresh_updated_at() {
    let db = db().await;
    let user = teacher(&db, "t@school.edu").await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = db
        .users()
        .update(
            &UserKey::Id(user.id),
            UserPatch {
                name: Some("Renamed".into()),
                role: Some(Role::Admin),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.created_at, user.created_at);
    assert!(updated.updated_at > user.updated_at);
}

#[tokio::test]
async fn should_clear_nullable_column() {
    let db = db().await;
    let t = teacher(&db, "t@school.edu").await;
    let c = class(&db, "Algebra I", t.id).await;

    let described = db
        .classes()
        .update(
            &ClassKey::Id(c.id),
            ClassPatch {
                description: Some(Some("Period 2".into())),
                end_date: Some(Some(day(2024, 6, 14))),
                ..ClassPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(described.description.as_deref(), Some("Period 2"));

    let cleared = db
        .classes()
        .update(
            &ClassKey::Id(c.id),
            ClassPatch {
                description: Some(None),
                ..ClassPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.end_date, Some(day(2024, 6, 14)));
}

#[tokio::test]
async fn should_fail_update_of_missing_row() {
    let db = db().await;
    let err = db
        .students()
        .update(
            &StudentKey::Id(StudentId::new()),
            StudentPatch {
                phone: Some(Some("555".into())),
                ..StudentPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

#[tokio::test]
async fn should_update_many_up_to_limit() {
    let db = db().await;
    for (first, last) in [("Ann", "Lee"), ("Bo", "Lee"), ("Cy", "Lee"), ("Di", "Kim")] {
        student(&db, first, last).await;
    }
    let patch = StudentPatch {
        address: Some(Some("1 Main St".into())),
        ..StudentPatch::default()
    };

    let limited = db
        .students()
        .update_many(Some(Filter::eq(StudentField::LastName, "Lee")), patch.clone(), Some(2))
        .await
        .unwrap();
    assert_eq!(limited, 2);

    let all = db
        .students()
        .update_many(Some(Filter::eq(StudentField::LastName, "Lee")), patch, None)
        .await
        .unwrap();
    assert_eq!(all, 3);

    let with_address = db
        .students()
        .count(Some(Filter::is_not_null(StudentField::Address)))
        .await
        .unwrap();
    assert_eq!(with_address, 3);
}

// ── upsert ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_then_update_through_upsert() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee")]).await;
    let d = day(2024, 3, 1);
    let key = AttendanceKey::DateClassStudent {
        date: d,
        class_id: r.class.id,
        student_id: r.students[0].id,
    };

    let first = db
        .attendance()
        .upsert(
            &key,
            new_mark(d, r.class.id, r.students[0].id, AttendanceStatus::Present),
            AttendancePatch::status(AttendanceStatus::Late),
        )
        .await
        .unwrap();
    assert_eq!(first.status, AttendanceStatus::Present);

    let second = db
        .attendance()
        .upsert(
            &key,
            new_mark(d, r.class.id, r.students[0].id, AttendanceStatus::Present),
            AttendancePatch::status(AttendanceStatus::Late),
        )
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.status, AttendanceStatus::Late);
    assert_eq!(db.attendance().count(None).await.unwrap(), 1);
}

#[tokio::test]
async fn should_leave_row_untouched_on_empty_upsert_patch() {
    let db = db().await;
    let user = teacher(&db, "t@school.edu").await;

    let same = db
        .users()
        .upsert(
            &UserKey::Email("t@school.edu".into()),
            new_teacher("t@school.edu"),
            UserPatch::default(),
        )
        .await
        .unwrap();
    assert_eq!(same, user);
}

#[tokio::test]
async fn should_create_exactly_one_row_from_concurrent_upserts() {
    let db = db().await;
    let t = teacher(&db, "t@school.edu").await;
    let c = class(&db, "Algebra I", t.id).await;
    let s = student(&db, "Ann", "Lee").await;
    enroll(&db, c.id, s.id).await;
    let d = day(2024, 3, 1);
    let key = AttendanceKey::DateClassStudent {
        date: d,
        class_id: c.id,
        student_id: s.id,
    };

    let table = db.attendance();
    let attempts = (0..4).map(|_| {
        table.upsert(
            &key,
            new_mark(d, c.id, s.id, AttendanceStatus::Present),
            AttendancePatch::status(AttendanceStatus::Present),
        )
    });
    let results = futures::future::join_all(attempts).await;

    let ids: Vec<_> = results.into_iter().map(|r| r.unwrap().id).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(db.attendance().count(None).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_create_exactly_one_row_from_upserts_on_separate_connections() {
    let file = FileTestDb::open(4).await;
    let db = AttendanceDb::from_connection(file.connection());
    let t = teacher(&db, "t@school.edu").await;
    let c = class(&db, "Algebra I", t.id).await;
    let s = student(&db, "Ann", "Lee").await;
    enroll(&db, c.id, s.id).await;
    let d = day(2024, 3, 1);
    let key = AttendanceKey::DateClassStudent {
        date: d,
        class_id: c.id,
        student_id: s.id,
    };

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let db = db.clone();
            let status = if i % 2 == 0 {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Late
            };
            tokio::spawn(async move {
                db.attendance()
                    .upsert(
                        &key,
                        new_mark(d, c.id, s.id, status),
                        AttendancePatch::status(status),
                    )
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in futures::future::join_all(tasks).await {
        ids.push(task.unwrap().unwrap().id);
    }
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(db.attendance().count(None).await.unwrap(), 1);
}
