use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use rollcall_domain::id::{AttendanceDataId, UserId};
use rollcall_domain::status::AttendanceStatus;
use rollcall_domain::{FieldValue, Patch, Record, UniqueKey};

use super::user::User;

/// A user's attendance tally for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceData {
    pub id: AttendanceDataId,
    pub date: NaiveDate,
    pub present: i32,
    pub absent: i32,
    pub late: i32,
    pub excused: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: UserId,
}

entity_fields!(AttendanceDataField {
    Id => ("id", Uuid, false),
    Date => ("date", Date, false),
    Present => ("present", Int, false),
    Absent => ("absent", Int, false),
    Late => ("late", Int, false),
    Excused => ("excused", Int, false),
    CreatedAt => ("createdAt", Timestamp, false),
    UpdatedAt => ("updatedAt", Timestamp, false),
    UserId => ("userId", Uuid, false),
});

impl AttendanceDataField {
    /// The tally column counting `status`.
    pub fn for_status(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => Self::Present,
            AttendanceStatus::Absent => Self::Absent,
            AttendanceStatus::Late => Self::Late,
            AttendanceStatus::Excused => Self::Excused,
        }
    }
}

impl Record for AttendanceData {
    type Field = AttendanceDataField;

    fn id(&self) -> uuid::Uuid {
        self.id.as_uuid()
    }

    fn get(&self, field: AttendanceDataField) -> FieldValue {
        match field {
            AttendanceDataField::Id => self.id.into(),
            AttendanceDataField::Date => self.date.into(),
            AttendanceDataField::Present => self.present.into(),
            AttendanceDataField::Absent => self.absent.into(),
            AttendanceDataField::Late => self.late.into(),
            AttendanceDataField::Excused => self.excused.into(),
            AttendanceDataField::CreatedAt => self.created_at.into(),
            AttendanceDataField::UpdatedAt => self.updated_at.into(),
            AttendanceDataField::UserId => self.user_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendanceData {
    pub date: NaiveDate,
    pub present: i32,
    pub absent: i32,
    pub late: i32,
    pub excused: i32,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceDataPatch {
    pub date: Option<NaiveDate>,
    pub present: Option<i32>,
    pub absent: Option<i32>,
    pub late: Option<i32>,
    pub excused: Option<i32>,
    pub user_id: Option<UserId>,
}

impl Patch for AttendanceDataPatch {
    type Field = AttendanceDataField;

    fn assignments(&self) -> Vec<(AttendanceDataField, FieldValue)> {
        let mut out = Vec::new();
        push_set!(out,
            AttendanceDataField::Date => &self.date,
            AttendanceDataField::Present => &self.present,
            AttendanceDataField::Absent => &self.absent,
            AttendanceDataField::Late => &self.late,
            AttendanceDataField::Excused => &self.excused,
            AttendanceDataField::UserId => &self.user_id,
        );
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceDataKey {
    Id(AttendanceDataId),
}

impl UniqueKey for AttendanceDataKey {
    type Field = AttendanceDataField;

    fn parts(&self) -> Vec<(AttendanceDataField, FieldValue)> {
        match self {
            Self::Id(id) => vec![(AttendanceDataField::Id, (*id).into())],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceDataInclude {
    pub user: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDataWith {
    #[serde(flatten)]
    pub tally: AttendanceData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}
