//! Newtype wrappers for row identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::FieldValue;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<$name> for FieldValue {
            fn from(id: $name) -> Self {
                FieldValue::Uuid(id.0)
            }
        }
    };
}

row_id!(
    /// Identifies a teacher or admin account.
    UserId
);
row_id!(
    /// Identifies a class (course section).
    ClassId
);
row_id!(
    /// Identifies a student.
    StudentId
);
row_id!(
    /// Identifies an enrollment of a student in a class.
    ClassStudentId
);
row_id!(
    /// Identifies one attendance record.
    AttendanceId
);
row_id!(
    /// Identifies a note written about a student.
    StudentNoteId
);
row_id!(
    /// Identifies a daily attendance tally.
    AttendanceDataId
);
