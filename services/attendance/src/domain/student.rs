use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use rollcall_domain::id::StudentId;
use rollcall_domain::query::FindMany;
use rollcall_domain::{FieldValue, Patch, Record, UniqueKey};

use super::attendance::{Attendance, AttendanceField};
use super::class_student::{ClassStudent, ClassStudentField};
use super::student_note::{StudentNote, StudentNoteField};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub date_of_birth: NaiveDate,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub enrollment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity_fields!(StudentField {
    Id => ("id", Uuid, false),
    FirstName => ("firstName", Text, false),
    LastName => ("lastName", Text, false),
    Email => ("email", Text, true),
    DateOfBirth => ("dateOfBirth", Date, false),
    Address => ("address", Text, true),
    Phone => ("phone", Text, true),
    GuardianName => ("guardianName", Text, true),
    GuardianPhone => ("guardianPhone", Text, true),
    GuardianEmail => ("guardianEmail", Text, true),
    EnrollmentDate => ("enrollmentDate", Date, false),
    CreatedAt => ("createdAt", Timestamp, false),
    UpdatedAt => ("updatedAt", Timestamp, false),
});

impl Record for Student {
    type Field = StudentField;

    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }

    fn get(&self, field: StudentField) -> FieldValue {
        match field {
            StudentField::Id => self.id.into(),
            StudentField::FirstName => self.first_name.clone().into(),
            StudentField::LastName => self.last_name.clone().into(),
            StudentField::Email => self.email.clone().into(),
            StudentField::DateOfBirth => self.date_of_birth.into(),
            StudentField::Address => self.address.clone().into(),
            StudentField::Phone => self.phone.clone().into(),
            StudentField::GuardianName => self.guardian_name.clone().into(),
            StudentField::GuardianPhone => self.guardian_phone.clone().into(),
            StudentField::GuardianEmail => self.guardian_email.clone().into(),
            StudentField::EnrollmentDate => self.enrollment_date.into(),
            StudentField::CreatedAt => self.created_at.into(),
            StudentField::UpdatedAt => self.updated_at.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub date_of_birth: NaiveDate,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub enrollment_date: NaiveDate,
}

impl NewStudent {
    /// A student with only the required columns set.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        enrollment_date: NaiveDate,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            date_of_birth,
            address: None,
            phone: None,
            guardian_name: None,
            guardian_phone: None,
            guardian_email: None,
            enrollment_date,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Option<String>>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub guardian_name: Option<Option<String>>,
    pub guardian_phone: Option<Option<String>>,
    pub guardian_email: Option<Option<String>>,
    pub enrollment_date: Option<NaiveDate>,
}

impl Patch for StudentPatch {
    type Field = StudentField;

    fn assignments(&self) -> Vec<(StudentField, FieldValue)> {
        let mut out = Vec::new();
        push_set!(out,
            StudentField::FirstName => &self.first_name,
            StudentField::LastName => &self.last_name,
            StudentField::Email => &self.email,
            StudentField::DateOfBirth => &self.date_of_birth,
            StudentField::Address => &self.address,
            StudentField::Phone => &self.phone,
            StudentField::GuardianName => &self.guardian_name,
            StudentField::GuardianPhone => &self.guardian_phone,
            StudentField::GuardianEmail => &self.guardian_email,
            StudentField::EnrollmentDate => &self.enrollment_date,
        );
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StudentKey {
    Id(StudentId),
    Email(String),
    GuardianEmail(String),
}

impl UniqueKey for StudentKey {
    type Field = StudentField;

    fn parts(&self) -> Vec<(StudentField, FieldValue)> {
        match self {
            Self::Id(id) => vec![(StudentField::Id, (*id).into())],
            Self::Email(email) => vec![(StudentField::Email, email.clone().into())],
            Self::GuardianEmail(email) => {
                vec![(StudentField::GuardianEmail, email.clone().into())]
            }
        }
    }
}

/// Relations to load alongside students.
#[derive(Debug, Clone, Default)]
pub struct StudentInclude {
    pub classes: Option<FindMany<ClassStudentField>>,
    pub attendance: Option<FindMany<AttendanceField>>,
    pub notes: Option<FindMany<StudentNoteField>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWith {
    #[serde(flatten)]
    pub student: Student,
    /// Enrollment rows of the student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<ClassStudent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Vec<Attendance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<StudentNote>>,
}
