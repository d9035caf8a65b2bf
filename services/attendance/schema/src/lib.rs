//! sea-orm entities of the attendance schema.
//!
//! `role` and `status` are stored as text; the access layer converts them to the
//! closed enums of `rollcall-domain`.

pub mod attendance;
pub mod attendance_data;
pub mod class_students;
pub mod classes;
pub mod student_notes;
pub mod students;
pub mod users;
