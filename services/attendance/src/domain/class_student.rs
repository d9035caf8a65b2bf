use chrono::{DateTime, Utc};
use serde::Serialize;

use rollcall_domain::id::{ClassId, ClassStudentId, StudentId};
use rollcall_domain::{FieldValue, Patch, Record, UniqueKey};

use super::class::Class;
use super::student::Student;

/// Enrollment of one student in one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStudent {
    pub id: ClassStudentId,
    pub joined_at: DateTime<Utc>,
    pub class_id: ClassId,
    pub student_id: StudentId,
}

entity_fields!(ClassStudentField {
    Id => ("id", Uuid, false),
    JoinedAt => ("joinedAt", Timestamp, false),
    ClassId => ("classId", Uuid, false),
    StudentId => ("studentId", Uuid, false),
});

impl Record for ClassStudent {
    type Field = ClassStudentField;

    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }

    fn get(&self, field: ClassStudentField) -> FieldValue {
        match field {
            ClassStudentField::Id => self.id.into(),
            ClassStudentField::JoinedAt => self.joined_at.into(),
            ClassStudentField::ClassId => self.class_id.into(),
            ClassStudentField::StudentId => self.student_id.into(),
        }
    }
}

/// `joined_at` defaults to the insert time.
#[derive(Debug, Clone)]
pub struct NewClassStudent {
    pub class_id: ClassId,
    pub student_id: StudentId,
    pub joined_at: Option<DateTime<Utc>>,
}

impl NewClassStudent {
    pub fn new(class_id: ClassId, student_id: StudentId) -> Self {
        Self {
            class_id,
            student_id,
            joined_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassStudentPatch {
    pub joined_at: Option<DateTime<Utc>>,
    pub class_id: Option<ClassId>,
    pub student_id: Option<StudentId>,
}

impl Patch for ClassStudentPatch {
    type Field = ClassStudentField;

    fn assignments(&self) -> Vec<(ClassStudentField, FieldValue)> {
        let mut out = Vec::new();
        push_set!(out,
            ClassStudentField::JoinedAt => &self.joined_at,
            ClassStudentField::ClassId => &self.class_id,
            ClassStudentField::StudentId => &self.student_id,
        );
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassStudentKey {
    Id(ClassStudentId),
    ClassStudent {
        class_id: ClassId,
        student_id: StudentId,
    },
}

impl UniqueKey for ClassStudentKey {
    type Field = ClassStudentField;

    fn parts(&self) -> Vec<(ClassStudentField, FieldValue)> {
        match self {
            Self::Id(id) => vec![(ClassStudentField::Id, (*id).into())],
            Self::ClassStudent {
                class_id,
                student_id,
            } => vec![
                (ClassStudentField::ClassId, (*class_id).into()),
                (ClassStudentField::StudentId, (*student_id).into()),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassStudentInclude {
    pub class: bool,
    pub student: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStudentWith {
    #[serde(flatten)]
    pub enrollment: ClassStudent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Class>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}
