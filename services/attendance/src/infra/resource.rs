//! Binding of each domain record to its sea-orm entity.

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue::Set, EntityTrait, FromQueryResult,
    IntoActiveModel, ModelTrait,
};
use serde::Serialize;
use uuid::Uuid;

use rollcall_domain::{Field, Patch, Record, UniqueKey};
use rollcall_schema::{
    attendance, attendance_data, class_students, classes, student_notes, students, users,
};

use crate::domain::{
    Attendance, AttendanceData, AttendanceDataField, AttendanceDataKey, AttendanceDataPatch,
    AttendanceField, AttendanceKey, AttendancePatch, Class, ClassField, ClassKey, ClassPatch,
    ClassStudent, ClassStudentField, ClassStudentKey, ClassStudentPatch, NewAttendance,
    NewAttendanceData, NewClass, NewClassStudent, NewStudent, NewStudentNote, NewUser, Student,
    StudentField, StudentKey, StudentNote, StudentNoteField, StudentNoteKey, StudentNotePatch,
    StudentPatch, User, UserField, UserKey, UserPatch,
};
use crate::error::StoreError;

/// Ties a domain record type to the sea-orm entity that stores it.
///
/// Every query in [`Table`](super::table::Table) is written once against this trait.
pub trait Resource: Sized + Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, ActiveModel = Self::ActiveModel>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + From<Self::Model>
        + Send
        + Sync;
    type Record: Record<Field = Self::Field> + Serialize;
    type Field: Field;
    type Create: Send + Sync;
    type Patch: Patch<Field = Self::Field> + Send + Sync;
    type Key: UniqueKey<Field = Self::Field> + Send + Sync;

    /// Name used in errors and log fields.
    const ENTITY: &'static str;
    /// Column refreshed on every update, if the entity tracks one.
    const UPDATED_AT: Option<Self::Field>;

    fn column(field: Self::Field) -> <Self::Entity as EntityTrait>::Column;
    fn from_model(model: Self::Model) -> Result<Self::Record, StoreError>;
    fn new_model(id: Uuid, input: &Self::Create, now: DateTime<Utc>) -> Self::ActiveModel;
}

// ── User ─────────────────────────────────────────────────────────────────────

pub struct Users;

impl Resource for Users {
    type Entity = users::Entity;
    type Model = users::Model;
    type ActiveModel = users::ActiveModel;
    type Record = User;
    type Field = UserField;
    type Create = NewUser;
    type Patch = UserPatch;
    type Key = UserKey;

    const ENTITY: &'static str = "user";
    const UPDATED_AT: Option<UserField> = Some(UserField::UpdatedAt);

    fn column(field: UserField) -> users::Column {
        match field {
            UserField::Id => users::Column::Id,
            UserField::Email => users::Column::Email,
            UserField::Password => users::Column::Password,
            UserField::Name => users::Column::Name,
            UserField::Role => users::Column::Role,
            UserField::CreatedAt => users::Column::CreatedAt,
            UserField::UpdatedAt => users::Column::UpdatedAt,
        }
    }

    fn from_model(model: users::Model) -> Result<User, StoreError> {
        Ok(User {
            id: model.id.into(),
            role: model.role.parse().context("decode users.role")?,
            email: model.email,
            password: model.password,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    fn new_model(id: Uuid, input: &NewUser, now: DateTime<Utc>) -> users::ActiveModel {
        users::ActiveModel {
            id: Set(id),
            email: Set(input.email.clone()),
            password: Set(input.password.clone()),
            name: Set(input.name.clone()),
            role: Set(input.role.as_str().to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

// ── Class ────────────────────────────────────────────────────────────────────

pub struct Classes;

impl Resource for Classes {
    type Entity = classes::Entity;
    type Model = classes::Model;
    type ActiveModel = classes::ActiveModel;
    type Record = Class;
    type Field = ClassField;
    type Create = NewClass;
    type Patch = ClassPatch;
    type Key = ClassKey;

    const ENTITY: &'static str = "class";
    const UPDATED_AT: Option<ClassField> = Some(ClassField::UpdatedAt);

    fn column(field: ClassField) -> classes::Column {
        match field {
            ClassField::Id => classes::Column::Id,
            ClassField::Name => classes::Column::Name,
            ClassField::Description => classes::Column::Description,
            ClassField::StartDate => classes::Column::StartDate,
            ClassField::EndDate => classes::Column::EndDate,
            ClassField::CreatedAt => classes::Column::CreatedAt,
            ClassField::UpdatedAt => classes::Column::UpdatedAt,
            ClassField::TeacherId => classes::Column::TeacherId,
        }
    }

    fn from_model(model: classes::Model) -> Result<Class, StoreError> {
        Ok(Class {
            id: model.id.into(),
            name: model.name,
            description: model.description,
            start_date: model.start_date,
            end_date: model.end_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
            teacher_id: model.teacher_id.into(),
        })
    }

    fn new_model(id: Uuid, input: &NewClass, now: DateTime<Utc>) -> classes::ActiveModel {
        classes::ActiveModel {
            id: Set(id),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            created_at: Set(now),
            updated_at: Set(now),
            teacher_id: Set(input.teacher_id.as_uuid()),
        }
    }
}

// ── Student ──────────────────────────────────────────────────────────────────

pub struct Students;

impl Resource for Students {
    type Entity = students::Entity;
    type Model = students::Model;
    type ActiveModel = students::ActiveModel;
    type Record = Student;
    type Field = StudentField;
    type Create = NewStudent;
    type Patch = StudentPatch;
    type Key = StudentKey;

    const ENTITY: &'static str = "student";
    const UPDATED_AT: Option<StudentField> = Some(StudentField::UpdatedAt);

    fn column(field: StudentField) -> students::Column {
        match field {
            StudentField::Id => students::Column::Id,
            StudentField::FirstName => students::Column::FirstName,
            StudentField::LastName => students::Column::LastName,
            StudentField::Email => students::Column::Email,
            StudentField::DateOfBirth => students::Column::DateOfBirth,
            StudentField::Address => students::Column::Address,
            StudentField::Phone => students::Column::Phone,
            StudentField::GuardianName => students::Column::GuardianName,
            StudentField::GuardianPhone => students::Column::GuardianPhone,
            StudentField::GuardianEmail => students::Column::GuardianEmail,
            StudentField::EnrollmentDate => students::Column::EnrollmentDate,
            StudentField::CreatedAt => students::Column::CreatedAt,
            StudentField::UpdatedAt => students::Column::UpdatedAt,
        }
    }

    fn from_model(model: students::Model) -> Result<Student, StoreError> {
        Ok(Student {
            id: model.id.into(),
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            date_of_birth: model.date_of_birth,
            address: model.address,
            phone: model.phone,
            guardian_name: model.guardian_name,
            guardian_phone: model.guardian_phone,
            guardian_email: model.guardian_email,
            enrollment_date: model.enrollment_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    fn new_model(id: Uuid, input: &NewStudent, now: DateTime<Utc>) -> students::ActiveModel {
        students::ActiveModel {
            id: Set(id),
            first_name: Set(input.first_name.clone()),
            last_name: Set(input.last_name.clone()),
            email: Set(input.email.clone()),
            date_of_birth: Set(input.date_of_birth),
            address: Set(input.address.clone()),
            phone: Set(input.phone.clone()),
            guardian_name: Set(input.guardian_name.clone()),
            guardian_phone: Set(input.guardian_phone.clone()),
            guardian_email: Set(input.guardian_email.clone()),
            enrollment_date: Set(input.enrollment_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

// ── ClassStudent ─────────────────────────────────────────────────────────────

pub struct ClassStudents;

impl Resource for ClassStudents {
    type Entity = class_students::Entity;
    type Model = class_students::Model;
    type ActiveModel = class_students::ActiveModel;
    type Record = ClassStudent;
    type Field = ClassStudentField;
    type Create = NewClassStudent;
    type Patch = ClassStudentPatch;
    type Key = ClassStudentKey;

    const ENTITY: &'static str = "class_student";
    const UPDATED_AT: Option<ClassStudentField> = None;

    fn column(field: ClassStudentField) -> class_students::Column {
        match field {
            ClassStudentField::Id => class_students::Column::Id,
            ClassStudentField::JoinedAt => class_students::Column::JoinedAt,
            ClassStudentField::ClassId => class_students::Column::ClassId,
            ClassStudentField::StudentId => class_students::Column::StudentId,
        }
    }

    fn from_model(model: class_students::Model) -> Result<ClassStudent, StoreError> {
        Ok(ClassStudent {
            id: model.id.into(),
            joined_at: model.joined_at,
            class_id: model.class_id.into(),
            student_id: model.student_id.into(),
        })
    }

    fn new_model(
        id: Uuid,
        input: &NewClassStudent,
        now: DateTime<Utc>,
    ) -> class_students::ActiveModel {
        class_students::ActiveModel {
            id: Set(id),
            joined_at: Set(input.joined_at.unwrap_or(now)),
            class_id: Set(input.class_id.as_uuid()),
            student_id: Set(input.student_id.as_uuid()),
        }
    }
}

// ── Attendance ───────────────────────────────────────────────────────────────

pub struct Attendances;

impl Resource for Attendances {
    type Entity = attendance::Entity;
    type Model = attendance::Model;
    type ActiveModel = attendance::ActiveModel;
    type Record = Attendance;
    type Field = AttendanceField;
    type Create = NewAttendance;
    type Patch = AttendancePatch;
    type Key = AttendanceKey;

    const ENTITY: &'static str = "attendance";
    const UPDATED_AT: Option<AttendanceField> = Some(AttendanceField::UpdatedAt);

    fn column(field: AttendanceField) -> attendance::Column {
        match field {
            AttendanceField::Id => attendance::Column::Id,
            AttendanceField::Date => attendance::Column::Date,
            AttendanceField::Status => attendance::Column::Status,
            AttendanceField::Notes => attendance::Column::Notes,
            AttendanceField::CreatedAt => attendance::Column::CreatedAt,
            AttendanceField::UpdatedAt => attendance::Column::UpdatedAt,
            AttendanceField::ClassId => attendance::Column::ClassId,
            AttendanceField::StudentId => attendance::Column::StudentId,
        }
    }

    fn from_model(model: attendance::Model) -> Result<Attendance, StoreError> {
        Ok(Attendance {
            id: model.id.into(),
            date: model.date,
            status: model.status.parse().context("decode attendance.status")?,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            class_id: model.class_id.into(),
            student_id: model.student_id.into(),
        })
    }

    fn new_model(id: Uuid, input: &NewAttendance, now: DateTime<Utc>) -> attendance::ActiveModel {
        attendance::ActiveModel {
            id: Set(id),
            date: Set(input.date),
            status: Set(input.status.as_str().to_owned()),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            class_id: Set(input.class_id.as_uuid()),
            student_id: Set(input.student_id.as_uuid()),
        }
    }
}

// ── StudentNote ──────────────────────────────────────────────────────────────

pub struct StudentNotes;

impl Resource for StudentNotes {
    type Entity = student_notes::Entity;
    type Model = student_notes::Model;
    type ActiveModel = student_notes::ActiveModel;
    type Record = StudentNote;
    type Field = StudentNoteField;
    type Create = NewStudentNote;
    type Patch = StudentNotePatch;
    type Key = StudentNoteKey;

    const ENTITY: &'static str = "student_note";
    const UPDATED_AT: Option<StudentNoteField> = Some(StudentNoteField::UpdatedAt);

    fn column(field: StudentNoteField) -> student_notes::Column {
        match field {
            StudentNoteField::Id => student_notes::Column::Id,
            StudentNoteField::Content => student_notes::Column::Content,
            StudentNoteField::CreatedAt => student_notes::Column::CreatedAt,
            StudentNoteField::UpdatedAt => student_notes::Column::UpdatedAt,
            StudentNoteField::StudentId => student_notes::Column::StudentId,
            StudentNoteField::AuthorId => student_notes::Column::AuthorId,
        }
    }

    fn from_model(model: student_notes::Model) -> Result<StudentNote, StoreError> {
        Ok(StudentNote {
            id: model.id.into(),
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
            student_id: model.student_id.into(),
            author_id: model.author_id.into(),
        })
    }

    fn new_model(
        id: Uuid,
        input: &NewStudentNote,
        now: DateTime<Utc>,
    ) -> student_notes::ActiveModel {
        student_notes::ActiveModel {
            id: Set(id),
            content: Set(input.content.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            student_id: Set(input.student_id.as_uuid()),
            author_id: Set(input.author_id.as_uuid()),
        }
    }
}

// ── AttendanceData ───────────────────────────────────────────────────────────

pub struct AttendanceTallies;

impl Resource for AttendanceTallies {
    type Entity = attendance_data::Entity;
    type Model = attendance_data::Model;
    type ActiveModel = attendance_data::ActiveModel;
    type Record = AttendanceData;
    type Field = AttendanceDataField;
    type Create = NewAttendanceData;
    type Patch = AttendanceDataPatch;
    type Key = AttendanceDataKey;

    const ENTITY: &'static str = "attendance_data";
    const UPDATED_AT: Option<AttendanceDataField> = Some(AttendanceDataField::UpdatedAt);

    fn column(field: AttendanceDataField) -> attendance_data::Column {
        match field {
            AttendanceDataField::Id => attendance_data::Column::Id,
            AttendanceDataField::Date => attendance_data::Column::Date,
            AttendanceDataField::Present => attendance_data::Column::Present,
            AttendanceDataField::Absent => attendance_data::Column::Absent,
            AttendanceDataField::Late => attendance_data::Column::Late,
            AttendanceDataField::Excused => attendance_data::Column::Excused,
            AttendanceDataField::CreatedAt => attendance_data::Column::CreatedAt,
            AttendanceDataField::UpdatedAt => attendance_data::Column::UpdatedAt,
            AttendanceDataField::UserId => attendance_data::Column::UserId,
        }
    }

    fn from_model(model: attendance_data::Model) -> Result<AttendanceData, StoreError> {
        Ok(AttendanceData {
            id: model.id.into(),
            date: model.date,
            present: model.present,
            absent: model.absent,
            late: model.late,
            excused: model.excused,
            created_at: model.created_at,
            updated_at: model.updated_at,
            user_id: model.user_id.into(),
        })
    }

    fn new_model(
        id: Uuid,
        input: &NewAttendanceData,
        now: DateTime<Utc>,
    ) -> attendance_data::ActiveModel {
        attendance_data::ActiveModel {
            id: Set(id),
            date: Set(input.date),
            present: Set(input.present),
            absent: Set(input.absent),
            late: Set(input.late),
            excused: Set(input.excused),
            created_at: Set(now),
            updated_at: Set(now),
            user_id: Set(input.user_id.as_uuid()),
        }
    }
}
