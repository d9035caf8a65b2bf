use std::collections::HashMap;

use rollcall_attendance::domain::{AttendanceField, AttendanceKey, AttendancePatch};
use rollcall_attendance::usecase::roll_call::{
    GetDailyTallyUseCase, RecordRollCallUseCase, RollCallInput,
};
use rollcall_attendance::usecase::summary::{SummaryQuery, StudentAttendanceSummaryUseCase};
use rollcall_attendance::{ConstraintKind, StoreError};
use rollcall_domain::aggregate::GroupBy;
use rollcall_domain::filter::Filter;
use rollcall_domain::id::StudentId;
use rollcall_domain::query::FindMany;
use rollcall_domain::status::AttendanceStatus;

use crate::helpers::{class, day, db, enroll, mark, new_mark, roster, student};

#[tokio::test]
async fn should_record_and_read_back_a_day_of_attendance() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee")]).await;
    let ann = &r.students[0];
    let d = day(2024, 3, 1);
    mark(&db, d, r.class.id, ann.id, AttendanceStatus::Present).await;

    let rows = db
        .attendance()
        .find_many(FindMany::new().filter(Filter::eq(AttendanceField::StudentId, ann.id)))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, AttendanceStatus::Present);
    assert_eq!(rows[0].date, d);

    let err = db
        .attendance()
        .create(new_mark(d, r.class.id, ann.id, AttendanceStatus::Absent))
        .await
        .unwrap_err();
    assert!(err.is_constraint(ConstraintKind::Unique), "got {err:?}");

    let key = AttendanceKey::Id(rows[0].id);
    db.attendance()
        .update(&key, AttendancePatch::status(AttendanceStatus::Absent))
        .await
        .unwrap();
    let found = db.attendance().find_unique(&key).await.unwrap().unwrap();
    assert_eq!(found.status, AttendanceStatus::Absent);

    let by_triple = db
        .attendance()
        .find_unique(&AttendanceKey::DateClassStudent {
            date: d,
            class_id: r.class.id,
            student_id: ann.id,
        })
        .await
        .unwrap();
    assert_eq!(by_triple.map(|a| a.id), Some(found.id));
}

#[tokio::test]
async fn should_record_roll_call_with_default_status() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee"), ("Bo", "Kim"), ("Cy", "Park")]).await;
    let d = day(2024, 3, 1);
    let use_case = RecordRollCallUseCase { db: db.clone() };

    let roll_call = use_case
        .execute(RollCallInput {
            class_id: r.class.id,
            date: d,
            statuses: HashMap::from([(r.students[1].id, AttendanceStatus::Late)]),
            default_status: AttendanceStatus::Present,
        })
        .await
        .unwrap();

    assert_eq!(roll_call.attendance.len(), 3);
    assert_eq!(roll_call.tally.user_id, r.teacher.id);
    assert_eq!(roll_call.tally.present, 2);
    assert_eq!(roll_call.tally.late, 1);
    assert_eq!(roll_call.tally.absent, 0);

    let groups = db
        .attendance()
        .group_by(GroupBy::new([AttendanceField::Status]))
        .await
        .unwrap();
    assert_eq!(groups.len(), 2);
}

#[tokio::test]
async fn should_update_same_tally_when_roll_call_is_repeated() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee"), ("Bo", "Kim")]).await;
    let d = day(2024, 3, 1);
    let use_case = RecordRollCallUseCase { db: db.clone() };
    let input = |statuses: HashMap<StudentId, AttendanceStatus>| RollCallInput {
        class_id: r.class.id,
        date: d,
        statuses,
        default_status: AttendanceStatus::Present,
    };

    let first = use_case.execute(input(HashMap::new())).await.unwrap();
    let second = use_case
        .execute(input(HashMap::from([(
            r.students[0].id,
            AttendanceStatus::Absent,
        )])))
        .await
        .unwrap();

    assert_eq!(first.tally.id, second.tally.id);
    assert_eq!(second.tally.present, 1);
    assert_eq!(second.tally.absent, 1);
    assert_eq!(db.attendance().count(None).await.unwrap(), 2);
    assert_eq!(db.attendance_data().count(None).await.unwrap(), 1);

    let stored = GetDailyTallyUseCase { db: db.clone() }
        .execute(r.teacher.id, d)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, second.tally);
}

#[tokio::test]
async fn should_tally_across_all_classes_of_the_teacher() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee")]).await;
    let biology = class(&db, "Biology", r.teacher.id).await;
    let bo = student(&db, "Bo", "Kim").await;
    enroll(&db, biology.id, bo.id).await;
    let d = day(2024, 3, 1);
    mark(&db, d, biology.id, bo.id, AttendanceStatus::Excused).await;

    let roll_call = RecordRollCallUseCase { db: db.clone() }
        .execute(RollCallInput {
            class_id: r.class.id,
            date: d,
            statuses: HashMap::new(),
            default_status: AttendanceStatus::Present,
        })
        .await
        .unwrap();

    assert_eq!(roll_call.tally.present, 1);
    assert_eq!(roll_call.tally.excused, 1);
}

#[tokio::test]
async fn should_write_nothing_when_roll_call_names_unknown_student() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee")]).await;
    let outsider = student(&db, "Zed", "Out").await;

    let err = RecordRollCallUseCase { db: db.clone() }
        .execute(RollCallInput {
            class_id: r.class.id,
            date: day(2024, 3, 1),
            statuses: HashMap::from([(outsider.id, AttendanceStatus::Present)]),
            default_status: AttendanceStatus::Present,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: "class_student"
        }
    ));
    assert_eq!(db.attendance().count(None).await.unwrap(), 0);
    assert_eq!(db.attendance_data().count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn should_summarize_student_attendance_within_range() {
    let db = db().await;
    let r = roster(&db, &[("Ann", "Lee")]).await;
    let ann = &r.students[0];
    let marks = [
        (1, AttendanceStatus::Present),
        (2, AttendanceStatus::Late),
        (3, AttendanceStatus::Present),
        (4, AttendanceStatus::Absent),
    ];
    for (d, status) in marks {
        mark(&db, day(2024, 3, d), r.class.id, ann.id, status).await;
    }
    let use_case = StudentAttendanceSummaryUseCase { db: db.clone() };

    let all = use_case
        .execute(ann.id, SummaryQuery::default())
        .await
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(
        all.dates(AttendanceStatus::Present),
        [day(2024, 3, 1), day(2024, 3, 3)]
    );

    let ranged = use_case
        .execute(
            ann.id,
            SummaryQuery {
                class_id: Some(r.class.id),
                from: Some(day(2024, 3, 2)),
                to: Some(day(2024, 3, 3)),
            },
        )
        .await
        .unwrap();
    assert_eq!(ranged.total, 2);
    assert_eq!(ranged.count(AttendanceStatus::Late), 1);
    assert_eq!(ranged.count(AttendanceStatus::Absent), 0);

    let err = use_case
        .execute(StudentId::new(), SummaryQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}
