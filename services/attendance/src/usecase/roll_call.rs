use std::collections::HashMap;

use anyhow::Context as _;
use chrono::NaiveDate;
use tracing::info;

use rollcall_domain::aggregate::GroupBy;
use rollcall_domain::filter::Filter;
use rollcall_domain::id::{ClassId, StudentId, UserId};
use rollcall_domain::order::OrderBy;
use rollcall_domain::query::FindMany;
use rollcall_domain::status::AttendanceStatus;
use rollcall_domain::FieldValue;

use crate::domain::{
    Attendance, AttendanceData, AttendanceDataField, AttendanceDataKey, AttendanceDataPatch,
    AttendanceField, AttendanceKey, AttendancePatch, ClassField, ClassKey, ClassStudentField,
    NewAttendance, NewAttendanceData,
};
use crate::error::StoreError;
use crate::infra::{AttendanceDb, Tables};

/// Counts per status for one teacher and day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub present: i32,
    pub absent: i32,
    pub late: i32,
    pub excused: i32,
}

impl StatusCounts {
    fn add(&mut self, status: AttendanceStatus, n: i32) {
        match status {
            AttendanceStatus::Present => self.present += n,
            AttendanceStatus::Absent => self.absent += n,
            AttendanceStatus::Late => self.late += n,
            AttendanceStatus::Excused => self.excused += n,
        }
    }

    pub fn total(&self) -> i32 {
        self.present + self.absent + self.late + self.excused
    }
}

/// Tally counts for `teacher_id` on `date`, across every class they teach.
pub async fn count_statuses<C: sea_orm::ConnectionTrait>(
    tables: Tables<'_, C>,
    teacher_id: UserId,
    date: NaiveDate,
) -> Result<StatusCounts, StoreError> {
    let class_ids: Vec<_> = tables
        .classes()
        .find_many(FindMany::new().filter(Filter::eq(ClassField::TeacherId, teacher_id)))
        .await?
        .into_iter()
        .map(|class| class.id)
        .collect();

    let groups = tables
        .attendance()
        .group_by(GroupBy::new([AttendanceField::Status]).filter(Filter::all([
            Filter::is_in(AttendanceField::ClassId, class_ids),
            Filter::eq(AttendanceField::Date, date),
        ])))
        .await?;

    let mut counts = StatusCounts::default();
    for group in groups {
        if let Some(FieldValue::Status(status)) = group.value(AttendanceField::Status) {
            let n = i32::try_from(group.count()).context("status count out of range")?;
            counts.add(*status, n);
        }
    }
    Ok(counts)
}

/// Write `counts` as the teacher's tally for `date`, updating the earliest existing one.
pub async fn store_tally<C: sea_orm::ConnectionTrait>(
    tables: Tables<'_, C>,
    teacher_id: UserId,
    date: NaiveDate,
    counts: StatusCounts,
) -> Result<AttendanceData, StoreError> {
    let existing = tables
        .attendance_data()
        .find_first(
            FindMany::new()
                .filter(
                    Filter::eq(AttendanceDataField::UserId, teacher_id)
                        .and(Filter::eq(AttendanceDataField::Date, date)),
                )
                .order_by(OrderBy::asc(AttendanceDataField::CreatedAt)),
        )
        .await?;

    match existing {
        Some(tally) => {
            let patch = AttendanceDataPatch {
                present: Some(counts.present),
                absent: Some(counts.absent),
                late: Some(counts.late),
                excused: Some(counts.excused),
                ..AttendanceDataPatch::default()
            };
            tables
                .attendance_data()
                .update(&AttendanceDataKey::Id(tally.id), patch)
                .await
        }
        None => {
            tables
                .attendance_data()
                .create(NewAttendanceData {
                    date,
                    present: counts.present,
                    absent: counts.absent,
                    late: counts.late,
                    excused: counts.excused,
                    user_id: teacher_id,
                })
                .await
        }
    }
}

// ── RecordRollCall ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RollCallInput {
    pub class_id: ClassId,
    pub date: NaiveDate,
    /// Explicit statuses. Every student listed must be enrolled in the class.
    pub statuses: HashMap<StudentId, AttendanceStatus>,
    /// Status recorded for enrolled students not listed in `statuses`.
    pub default_status: AttendanceStatus,
}

#[derive(Debug, Clone)]
pub struct RollCall {
    pub attendance: Vec<Attendance>,
    pub tally: AttendanceData,
}

pub struct RecordRollCallUseCase {
    pub db: AttendanceDb,
}

impl RecordRollCallUseCase {
    pub async fn execute(&self, input: RollCallInput) -> Result<RollCall, StoreError> {
        let roll_call = self
            .db
            .transaction(None, move |tx| {
                Box::pin(async move {
                    let class = tx
                        .classes()
                        .find_unique_or_throw(&ClassKey::Id(input.class_id))
                        .await?;
                    let enrolled: Vec<StudentId> = tx
                        .class_students()
                        .find_many(
                            FindMany::new()
                                .filter(Filter::eq(ClassStudentField::ClassId, class.id))
                                .order_by(OrderBy::asc(ClassStudentField::JoinedAt)),
                        )
                        .await?
                        .into_iter()
                        .map(|e| e.student_id)
                        .collect();

                    if input.statuses.keys().any(|s| !enrolled.contains(s)) {
                        return Err(StoreError::not_found("class_student"));
                    }

                    let mut attendance = Vec::with_capacity(enrolled.len());
                    for student_id in enrolled {
                        let status = input
                            .statuses
                            .get(&student_id)
                            .copied()
                            .unwrap_or(input.default_status);
                        let key = AttendanceKey::DateClassStudent {
                            date: input.date,
                            class_id: class.id,
                            student_id,
                        };
                        let create = NewAttendance {
                            date: input.date,
                            status,
                            notes: None,
                            class_id: class.id,
                            student_id,
                        };
                        attendance.push(
                            tx.attendance()
                                .upsert(&key, create, AttendancePatch::status(status))
                                .await?,
                        );
                    }

                    let counts = count_statuses(tx, class.teacher_id, input.date).await?;
                    let tally = store_tally(tx, class.teacher_id, input.date, counts).await?;
                    Ok(RollCall { attendance, tally })
                })
            })
            .await?;

        info!(
            marked = roll_call.attendance.len(),
            present = roll_call.tally.present,
            absent = roll_call.tally.absent,
            "roll call recorded"
        );
        Ok(roll_call)
    }
}

// ── GetDailyTally ────────────────────────────────────────────────────────────

pub struct GetDailyTallyUseCase {
    pub db: AttendanceDb,
}

impl GetDailyTallyUseCase {
    pub async fn execute(
        &self,
        teacher_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceData>, StoreError> {
        self.db
            .attendance_data()
            .find_first(
                FindMany::new()
                    .filter(
                        Filter::eq(AttendanceDataField::UserId, teacher_id)
                            .and(Filter::eq(AttendanceDataField::Date, date)),
                    )
                    .order_by(OrderBy::asc(AttendanceDataField::CreatedAt)),
            )
            .await
    }
}
