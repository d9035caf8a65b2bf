use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use rollcall_domain::id::{ClassId, UserId};
use rollcall_domain::query::FindMany;
use rollcall_domain::{FieldValue, Patch, Record, UniqueKey};

use super::attendance::{Attendance, AttendanceField};
use super::class_student::{ClassStudent, ClassStudentField};
use super::user::User;

/// A course section taught by one teacher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub teacher_id: UserId,
}

entity_fields!(ClassField {
    Id => ("id", Uuid, false),
    Name => ("name", Text, false),
    Description => ("description", Text, true),
    StartDate => ("startDate", Date, false),
    EndDate => ("endDate", Date, true),
    CreatedAt => ("createdAt", Timestamp, false),
    UpdatedAt => ("updatedAt", Timestamp, false),
    TeacherId => ("teacherId", Uuid, false),
});

impl Record for Class {
    type Field = ClassField;

    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }

    fn get(&self, field: ClassField) -> FieldValue {
        match field {
            ClassField::Id => self.id.into(),
            ClassField::Name => self.name.clone().into(),
            ClassField::Description => self.description.clone().into(),
            ClassField::StartDate => self.start_date.into(),
            ClassField::EndDate => self.end_date.into(),
            ClassField::CreatedAt => self.created_at.into(),
            ClassField::UpdatedAt => self.updated_at.into(),
            ClassField::TeacherId => self.teacher_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub teacher_id: UserId,
}

/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct ClassPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub teacher_id: Option<UserId>,
}

impl Patch for ClassPatch {
    type Field = ClassField;

    fn assignments(&self) -> Vec<(ClassField, FieldValue)> {
        let mut out = Vec::new();
        push_set!(out,
            ClassField::Name => &self.name,
            ClassField::Description => &self.description,
            ClassField::StartDate => &self.start_date,
            ClassField::EndDate => &self.end_date,
            ClassField::TeacherId => &self.teacher_id,
        );
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKey {
    Id(ClassId),
}

impl UniqueKey for ClassKey {
    type Field = ClassField;

    fn parts(&self) -> Vec<(ClassField, FieldValue)> {
        match self {
            Self::Id(id) => vec![(ClassField::Id, (*id).into())],
        }
    }
}

/// Relations to load alongside classes.
#[derive(Debug, Clone, Default)]
pub struct ClassInclude {
    pub teacher: bool,
    pub students: Option<FindMany<ClassStudentField>>,
    pub attendance: Option<FindMany<AttendanceField>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassWith {
    #[serde(flatten)]
    pub class: Class,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<User>,
    /// Enrollment rows of the class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<ClassStudent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Vec<Attendance>>,
}
