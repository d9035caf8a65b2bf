use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use rollcall_domain::id::{AttendanceId, ClassId, StudentId};
use rollcall_domain::status::AttendanceStatus;
use rollcall_domain::{FieldValue, Patch, Record, UniqueKey};

use super::class::Class;
use super::student::Student;

/// One student's status in one class on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: AttendanceId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub class_id: ClassId,
    pub student_id: StudentId,
}

entity_fields!(AttendanceField {
    Id => ("id", Uuid, false),
    Date => ("date", Date, false),
    Status => ("status", Status, false),
    Notes => ("notes", Text, true),
    CreatedAt => ("createdAt", Timestamp, false),
    UpdatedAt => ("updatedAt", Timestamp, false),
    ClassId => ("classId", Uuid, false),
    StudentId => ("studentId", Uuid, false),
});

impl Record for Attendance {
    type Field = AttendanceField;

    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }

    fn get(&self, field: AttendanceField) -> FieldValue {
        match field {
            AttendanceField::Id => self.id.into(),
            AttendanceField::Date => self.date.into(),
            AttendanceField::Status => self.status.into(),
            AttendanceField::Notes => self.notes.clone().into(),
            AttendanceField::CreatedAt => self.created_at.into(),
            AttendanceField::UpdatedAt => self.updated_at.into(),
            AttendanceField::ClassId => self.class_id.into(),
            AttendanceField::StudentId => self.student_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub class_id: ClassId,
    pub student_id: StudentId,
}

#[derive(Debug, Clone, Default)]
pub struct AttendancePatch {
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<Option<String>>,
    pub class_id: Option<ClassId>,
    pub student_id: Option<StudentId>,
}

impl AttendancePatch {
    pub fn status(status: AttendanceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Patch for AttendancePatch {
    type Field = AttendanceField;

    fn assignments(&self) -> Vec<(AttendanceField, FieldValue)> {
        let mut out = Vec::new();
        push_set!(out,
            AttendanceField::Date => &self.date,
            AttendanceField::Status => &self.status,
            AttendanceField::Notes => &self.notes,
            AttendanceField::ClassId => &self.class_id,
            AttendanceField::StudentId => &self.student_id,
        );
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceKey {
    Id(AttendanceId),
    DateClassStudent {
        date: NaiveDate,
        class_id: ClassId,
        student_id: StudentId,
    },
}

impl UniqueKey for AttendanceKey {
    type Field = AttendanceField;

    fn parts(&self) -> Vec<(AttendanceField, FieldValue)> {
        match self {
            Self::Id(id) => vec![(AttendanceField::Id, (*id).into())],
            Self::DateClassStudent {
                date,
                class_id,
                student_id,
            } => vec![
                (AttendanceField::Date, (*date).into()),
                (AttendanceField::ClassId, (*class_id).into()),
                (AttendanceField::StudentId, (*student_id).into()),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceInclude {
    pub class: bool,
    pub student: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWith {
    #[serde(flatten)]
    pub attendance: Attendance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Class>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}
