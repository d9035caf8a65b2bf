use chrono::{DateTime, Utc};
use serde::Serialize;

use rollcall_domain::id::{StudentId, StudentNoteId, UserId};
use rollcall_domain::{FieldValue, Patch, Record, UniqueKey};

use super::student::Student;
use super::user::User;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentNote {
    pub id: StudentNoteId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub student_id: StudentId,
    pub author_id: UserId,
}

entity_fields!(StudentNoteField {
    Id => ("id", Uuid, false),
    Content => ("content", Text, false),
    CreatedAt => ("createdAt", Timestamp, false),
    UpdatedAt => ("updatedAt", Timestamp, false),
    StudentId => ("studentId", Uuid, false),
    AuthorId => ("authorId", Uuid, false),
});

impl Record for StudentNote {
    type Field = StudentNoteField;

    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }

    fn get(&self, field: StudentNoteField) -> FieldValue {
        match field {
            StudentNoteField::Id => self.id.into(),
            StudentNoteField::Content => self.content.clone().into(),
            StudentNoteField::CreatedAt => self.created_at.into(),
            StudentNoteField::UpdatedAt => self.updated_at.into(),
            StudentNoteField::StudentId => self.student_id.into(),
            StudentNoteField::AuthorId => self.author_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStudentNote {
    pub content: String,
    pub student_id: StudentId,
    pub author_id: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct StudentNotePatch {
    pub content: Option<String>,
    pub student_id: Option<StudentId>,
    pub author_id: Option<UserId>,
}

impl Patch for StudentNotePatch {
    type Field = StudentNoteField;

    fn assignments(&self) -> Vec<(StudentNoteField, FieldValue)> {
        let mut out = Vec::new();
        push_set!(out,
            StudentNoteField::Content => &self.content,
            StudentNoteField::StudentId => &self.student_id,
            StudentNoteField::AuthorId => &self.author_id,
        );
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentNoteKey {
    Id(StudentNoteId),
}

impl UniqueKey for StudentNoteKey {
    type Field = StudentNoteField;

    fn parts(&self) -> Vec<(StudentNoteField, FieldValue)> {
        match self {
            Self::Id(id) => vec![(StudentNoteField::Id, (*id).into())],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StudentNoteInclude {
    pub student: bool,
    pub author: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentNoteWith {
    #[serde(flatten)]
    pub note: StudentNote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}
