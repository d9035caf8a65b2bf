//! Records, columns, inputs and relation selections of the seven entities.

/// Declare a column enum and its `Field` impl from `(api name, kind, nullable)` rows.
/// The first variant must be `Id`.
macro_rules! entity_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($api:literal, $kind:ident, $nullable:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl rollcall_domain::Field for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const ID: Self = Self::Id;

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $api),+
                }
            }

            fn kind(self) -> rollcall_domain::FieldKind {
                match self {
                    $(Self::$variant => rollcall_domain::FieldKind::$kind),+
                }
            }

            fn nullable(self) -> bool {
                match self {
                    $(Self::$variant => $nullable),+
                }
            }
        }
    };
}

/// Push `(field, value)` for every patch member that is set.
macro_rules! push_set {
    ($out:ident, $($field:expr => $value:expr),+ $(,)?) => {
        $(
            if let Some(value) = $value {
                $out.push(($field, rollcall_domain::FieldValue::from(value.clone())));
            }
        )+
    };
}

pub mod attendance;
pub mod attendance_data;
pub mod class;
pub mod class_student;
pub mod student;
pub mod student_note;
pub mod user;

pub use attendance::{
    Attendance, AttendanceField, AttendanceInclude, AttendanceKey, AttendancePatch,
    AttendanceWith, NewAttendance,
};
pub use attendance_data::{
    AttendanceData, AttendanceDataField, AttendanceDataInclude, AttendanceDataKey,
    AttendanceDataPatch, AttendanceDataWith, NewAttendanceData,
};
pub use class::{Class, ClassField, ClassInclude, ClassKey, ClassPatch, ClassWith, NewClass};
pub use class_student::{
    ClassStudent, ClassStudentField, ClassStudentInclude, ClassStudentKey, ClassStudentPatch,
    ClassStudentWith, NewClassStudent,
};
pub use student::{
    NewStudent, Student, StudentField, StudentInclude, StudentKey, StudentPatch, StudentWith,
};
pub use student_note::{
    NewStudentNote, StudentNote, StudentNoteField, StudentNoteInclude, StudentNoteKey,
    StudentNotePatch, StudentNoteWith,
};
pub use user::{NewUser, User, UserField, UserInclude, UserKey, UserPatch, UserWith};
