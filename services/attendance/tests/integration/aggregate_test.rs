use rollcall_attendance::AttendanceDb;
use rollcall_attendance::StoreError;
use rollcall_attendance::domain::{AttendanceDataField, AttendanceField, NewAttendanceData, User};
use rollcall_domain::FieldValue;
use rollcall_domain::ValidationError;
use rollcall_domain::aggregate::{AggregateArgs, Aggregates, GroupBy};
use rollcall_domain::filter::Filter;
use rollcall_domain::order::OrderBy;
use rollcall_domain::status::AttendanceStatus;

use crate::helpers::{class, day, db, enroll, mark, roster, student, teacher};

async fn tallies(db: &AttendanceDb, user: &User, rows: &[(u32, i32, i32)]) {
    for (d, present, absent) in rows {
        db.attendance_data()
            .create(NewAttendanceData {
                date: day(2024, 3, *d),
                present: *present,
                absent: *absent,
                late: 0,
                excused: 0,
                user_id: user.id,
            })
            .await
            .unwrap();
    }
}

// ── aggregate ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_aggregate_tally_columns() {
    let db = db().await;
    let t = teacher(&db, "t@school.edu").await;
    tallies(&db, &t, &[(1, 10, 1), (2, 12, 0), (3, 8, 2)]).await;

    let result = db
        .attendance_data()
        .aggregate(AggregateArgs::new(
            Aggregates::count()
                .count_of(AttendanceDataField::Present)
                .sum(AttendanceDataField::Present)
                .avg(AttendanceDataField::Present)
                .max(AttendanceDataField::Present)
                .min(AttendanceDataField::Date)
                .sum(AttendanceDataField::Absent),
        ))
        .await
        .unwrap();

    assert_eq!(result.count, Some(3));
    assert_eq!(result.count_fields[&AttendanceDataField::Present], 3);
    assert_eq!(result.sum[&AttendanceDataField::Present], Some(30));
    assert_eq!(result.sum[&AttendanceDataField::Absent], Some(3));
    assert_eq!(result.avg[&AttendanceDataField::Present], Some(10.0));
    assert_eq!(
        result.max[&AttendanceDataField::Present],
        FieldValue::Int(12)
    );
    assert_eq!(
        result.min[&AttendanceDataField::Date],
        FieldValue::Date(day(2024, 3, 1))
    );
}

#[tokio::test]
async fn should_aggregate_empty_set_to_zero_and_nulls() {
    let db = db().await;
    let t = teacher(&db, "t@school.edu").await;
    tallies(&db, &t, &[(1, 10, 1)]).await;

    let result = db
        .attendance_data()
        .aggregate(
            AggregateArgs::new(
                Aggregates::count()
                    .sum(AttendanceDataField::Present)
                    .avg(AttendanceDataField::Present)
                    .min(AttendanceDataField::Date),
            )
            .filter(Filter::gt(AttendanceDataField::Date, day(2024, 4, 1))),
        )
        .await
        .unwrap();

    assert_eq!(result.count, Some(0));
    assert_eq!(result.sum[&AttendanceDataField::Present], None);
    assert_eq!(result.avg[&AttendanceDataField::Present], None);
    assert_eq!(result.min[&AttendanceDataField::Date], FieldValue::Null);
}

#[tokio::test]
async fn should_reject_sum_of_non_integer_field() {
    let db = db().await;
    let err = db
        .attendance_data()
        .aggregate(AggregateArgs::new(
            Aggregates::default().sum(AttendanceDataField::Date),
        ))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            StoreError::Validation(ValidationError::UnsupportedOperator { op: "sum", .. })
        ),
        "got {err:?}"
    );
}

// ── group_by ─────────────────────────────────────────────────────────────────

async fn marked_class(db: &AttendanceDb) -> rollcall_attendance::domain::Class {
    let r = roster(db, &[("Ann", "Lee"), ("Bo", "Kim"), ("Cy", "Park"), ("Di", "Ng")]).await;
    let d = day(2024, 3, 1);
    let statuses = [
        AttendanceStatus::Present,
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
    ];
    for (s, status) in r.students.iter().zip(statuses) {
        mark(db, d, r.class.id, s.id, status).await;
    }
    r.class
}

fn status_of(group: &rollcall_domain::aggregate::Group<AttendanceField>) -> AttendanceStatus {
    match group.value(AttendanceField::Status) {
        Some(FieldValue::Status(status)) => *status,
        other => panic!("unexpected group key {other:?}"),
    }
}

#[tokio::test]
async fn should_count_attendance_per_status() {
    let db = db().await;
    let c = marked_class(&db).await;

    let groups = db
        .attendance()
        .group_by(
            GroupBy::new([AttendanceField::Status])
                .filter(Filter::eq(AttendanceField::ClassId, c.id)),
        )
        .await
        .unwrap();

    let counts: Vec<_> = groups.iter().map(|g| (status_of(g), g.count())).collect();
    assert_eq!(
        counts,
        [
            (AttendanceStatus::Absent, 1),
            (AttendanceStatus::Late, 1),
            (AttendanceStatus::Present, 2),
        ]
    );
}

#[tokio::test]
async fn should_filter_groups_with_having_and_order_them() {
    let db = db().await;
    marked_class(&db).await;

    let groups = db
        .attendance()
        .group_by(
            GroupBy::new([AttendanceField::Status])
                .having(Filter::is_in(
                    AttendanceField::Status,
                    [AttendanceStatus::Present, AttendanceStatus::Late],
                ))
                .order_by(OrderBy::desc(AttendanceField::Status)),
        )
        .await
        .unwrap();
    let statuses: Vec<_> = groups.iter().map(status_of).collect();
    assert_eq!(statuses, [AttendanceStatus::Present, AttendanceStatus::Late]);

    let first = db
        .attendance()
        .group_by(
            GroupBy::new([AttendanceField::Status])
                .order_by(OrderBy::asc(AttendanceField::Status))
                .skip(1)
                .take(1),
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(status_of(&first[0]), AttendanceStatus::Late);
}

#[tokio::test]
async fn should_skip_groups_without_take() {
    let db = db().await;
    marked_class(&db).await;

    let rest = db
        .attendance()
        .group_by(
            GroupBy::new([AttendanceField::Status])
                .order_by(OrderBy::asc(AttendanceField::Status))
                .skip(1),
        )
        .await
        .unwrap();
    let statuses: Vec<_> = rest.iter().map(status_of).collect();
    assert_eq!(statuses, [AttendanceStatus::Late, AttendanceStatus::Present]);
}

#[tokio::test]
async fn should_group_by_several_fields() {
    let db = db().await;
    let t = teacher(&db, "t@school.edu").await;
    let algebra = class(&db, "Algebra I", t.id).await;
    let biology = class(&db, "Biology", t.id).await;
    let ann = student(&db, "Ann", "Lee").await;
    enroll(&db, algebra.id, ann.id).await;
    enroll(&db, biology.id, ann.id).await;
    for d in [1, 2] {
        mark(&db, day(2024, 3, d), algebra.id, ann.id, AttendanceStatus::Present).await;
    }
    mark(&db, day(2024, 3, 1), biology.id, ann.id, AttendanceStatus::Absent).await;

    let groups = db
        .attendance()
        .group_by(GroupBy::new([AttendanceField::ClassId, AttendanceField::Status]))
        .await
        .unwrap();

    assert_eq!(groups.len(), 2);
    let algebra_present = groups
        .iter()
        .find(|g| g.value(AttendanceField::ClassId) == Some(&FieldValue::Uuid(algebra.id.into())))
        .unwrap();
    assert_eq!(status_of(algebra_present), AttendanceStatus::Present);
    assert_eq!(algebra_present.count(), 2);
}

#[tokio::test]
async fn should_sum_per_group() {
    let db = db().await;
    let a = teacher(&db, "a@school.edu").await;
    let b = teacher(&db, "b@school.edu").await;
    tallies(&db, &a, &[(1, 10, 1), (2, 12, 0)]).await;
    tallies(&db, &b, &[(1, 7, 3)]).await;

    let groups = db
        .attendance_data()
        .group_by(
            GroupBy::new([AttendanceDataField::UserId]).aggregates(
                Aggregates::count()
                    .sum(AttendanceDataField::Present)
                    .avg(AttendanceDataField::Absent),
            ),
        )
        .await
        .unwrap();

    let of = |user: &User| {
        groups
            .iter()
            .find(|g| g.value(AttendanceDataField::UserId) == Some(&FieldValue::Uuid(user.id.into())))
            .unwrap()
    };
    assert_eq!(of(&a).aggregates.sum[&AttendanceDataField::Present], Some(22));
    assert_eq!(of(&a).aggregates.avg[&AttendanceDataField::Absent], Some(0.5));
    assert_eq!(of(&b).count(), 1);
}

#[tokio::test]
async fn should_reject_having_outside_group() {
    let db = db().await;
    let err = db
        .attendance()
        .group_by(
            GroupBy::new([AttendanceField::Status])
                .having(Filter::eq(AttendanceField::Date, day(2024, 3, 1))),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            StoreError::Validation(ValidationError::HavingOutsideGroup("date"))
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn should_reject_empty_group_list_and_foreign_ordering() {
    let db = db().await;
    let err = db
        .attendance()
        .group_by(GroupBy::new([]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyGroupBy)
    ));

    let err = db
        .attendance()
        .group_by(
            GroupBy::new([AttendanceField::Status]).order_by(OrderBy::asc(AttendanceField::Date)),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::OrderOutsideGroup("date"))
    ));
}
