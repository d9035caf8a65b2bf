use chrono::{DateTime, Utc};
use serde::Serialize;

use rollcall_domain::id::UserId;
use rollcall_domain::query::FindMany;
use rollcall_domain::role::Role;
use rollcall_domain::{FieldValue, Patch, Record, UniqueKey};

use super::attendance_data::{AttendanceData, AttendanceDataField};
use super::class::{Class, ClassField};
use super::student_note::{StudentNote, StudentNoteField};

/// A teacher or admin account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Password hash. Hashing happens before the value reaches this layer.
    pub password: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity_fields!(UserField {
    Id => ("id", Uuid, false),
    Email => ("email", Text, false),
    Password => ("password", Text, false),
    Name => ("name", Text, false),
    Role => ("role", Role, false),
    CreatedAt => ("createdAt", Timestamp, false),
    UpdatedAt => ("updatedAt", Timestamp, false),
});

impl Record for User {
    type Field = UserField;

    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }

    fn get(&self, field: UserField) -> FieldValue {
        match field {
            UserField::Id => self.id.into(),
            UserField::Email => self.email.clone().into(),
            UserField::Password => self.password.clone().into(),
            UserField::Name => self.name.clone().into(),
            UserField::Role => self.role.into(),
            UserField::CreatedAt => self.created_at.into(),
            UserField::UpdatedAt => self.updated_at.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
}

impl Patch for UserPatch {
    type Field = UserField;

    fn assignments(&self) -> Vec<(UserField, FieldValue)> {
        let mut out = Vec::new();
        push_set!(out,
            UserField::Email => &self.email,
            UserField::Password => &self.password,
            UserField::Name => &self.name,
            UserField::Role => &self.role,
        );
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserKey {
    Id(UserId),
    Email(String),
}

impl UniqueKey for UserKey {
    type Field = UserField;

    fn parts(&self) -> Vec<(UserField, FieldValue)> {
        match self {
            Self::Id(id) => vec![(UserField::Id, (*id).into())],
            Self::Email(email) => vec![(UserField::Email, email.clone().into())],
        }
    }
}

/// Relations to load alongside users.
#[derive(Debug, Clone, Default)]
pub struct UserInclude {
    pub classes: Option<FindMany<ClassField>>,
    pub student_notes: Option<FindMany<StudentNoteField>>,
    pub attendance_data: Option<FindMany<AttendanceDataField>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWith {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<Class>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_notes: Option<Vec<StudentNote>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_data: Option<Vec<AttendanceData>>,
}
