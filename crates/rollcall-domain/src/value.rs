//! Column kinds and dynamically typed column values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::role::Role;
use crate::status::AttendanceStatus;

/// Storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Uuid,
    Text,
    Int,
    Date,
    Timestamp,
    Role,
    Status,
}

impl FieldKind {
    /// Kinds with a meaningful total order for range predicates and min/max.
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Text | Self::Int | Self::Date | Self::Timestamp)
    }
}

/// A single column value, used in filters, patches, cursors and aggregate results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Uuid(Uuid),
    Text(String),
    Int(i32),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Role(Role),
    Status(AttendanceStatus),
}

impl FieldValue {
    /// Kind of the value, `None` for `Null`.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Null => None,
            Self::Uuid(_) => Some(FieldKind::Uuid),
            Self::Text(_) => Some(FieldKind::Text),
            Self::Int(_) => Some(FieldKind::Int),
            Self::Date(_) => Some(FieldKind::Date),
            Self::Timestamp(_) => Some(FieldKind::Timestamp),
            Self::Role(_) => Some(FieldKind::Role),
            Self::Status(_) => Some(FieldKind::Status),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Role> for FieldValue {
    fn from(v: Role) -> Self {
        Self::Role(v)
    }
}

impl From<AttendanceStatus> for FieldValue {
    fn from(v: AttendanceStatus) -> Self {
        Self::Status(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
