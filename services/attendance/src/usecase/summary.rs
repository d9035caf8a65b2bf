use chrono::NaiveDate;
use serde::Serialize;

use rollcall_domain::filter::Filter;
use rollcall_domain::id::{ClassId, StudentId};
use rollcall_domain::order::OrderBy;
use rollcall_domain::query::FindMany;
use rollcall_domain::status::AttendanceStatus;

use crate::domain::{Attendance, AttendanceField, Student, StudentKey};
use crate::error::StoreError;
use crate::infra::AttendanceDb;

#[derive(Debug, Clone, Default)]
pub struct SummaryQuery {
    pub class_id: Option<ClassId>,
    /// Inclusive lower bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to: Option<NaiveDate>,
}

/// Dates a student was marked with each status, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub student: Student,
    pub total: usize,
    pub present: Vec<NaiveDate>,
    pub absent: Vec<NaiveDate>,
    pub late: Vec<NaiveDate>,
    pub excused: Vec<NaiveDate>,
}

impl AttendanceSummary {
    fn new(student: Student, rows: &[Attendance]) -> Self {
        let mut summary = Self {
            student,
            total: rows.len(),
            present: Vec::new(),
            absent: Vec::new(),
            late: Vec::new(),
            excused: Vec::new(),
        };
        for row in rows {
            summary.dates_mut(row.status).push(row.date);
        }
        summary
    }

    fn dates_mut(&mut self, status: AttendanceStatus) -> &mut Vec<NaiveDate> {
        match status {
            AttendanceStatus::Present => &mut self.present,
            AttendanceStatus::Absent => &mut self.absent,
            AttendanceStatus::Late => &mut self.late,
            AttendanceStatus::Excused => &mut self.excused,
        }
    }

    pub fn dates(&self, status: AttendanceStatus) -> &[NaiveDate] {
        match status {
            AttendanceStatus::Present => &self.present,
            AttendanceStatus::Absent => &self.absent,
            AttendanceStatus::Late => &self.late,
            AttendanceStatus::Excused => &self.excused,
        }
    }

    pub fn count(&self, status: AttendanceStatus) -> usize {
        self.dates(status).len()
    }
}

// ── StudentAttendanceSummary ─────────────────────────────────────────────────

pub struct StudentAttendanceSummaryUseCase {
    pub db: AttendanceDb,
}

impl StudentAttendanceSummaryUseCase {
    pub async fn execute(
        &self,
        student_id: StudentId,
        query: SummaryQuery,
    ) -> Result<AttendanceSummary, StoreError> {
        let student = self
            .db
            .students()
            .find_unique_or_throw(&StudentKey::Id(student_id))
            .await?;

        let mut filter = Filter::eq(AttendanceField::StudentId, student_id);
        if let Some(class_id) = query.class_id {
            filter = filter.and(Filter::eq(AttendanceField::ClassId, class_id));
        }
        if let Some(from) = query.from {
            filter = filter.and(Filter::gte(AttendanceField::Date, from));
        }
        if let Some(to) = query.to {
            filter = filter.and(Filter::lte(AttendanceField::Date, to));
        }
        let rows = self
            .db
            .attendance()
            .find_many(
                FindMany::new()
                    .filter(filter)
                    .order_by(OrderBy::asc(AttendanceField::Date)),
            )
            .await?;

        Ok(AttendanceSummary::new(student, &rows))
    }
}
