//! Relation loading and result shaping.
//!
//! Relations are fetched with one extra query per relation, never per parent row.
#![allow(async_fn_in_trait)]

use std::collections::HashMap;

use anyhow::Context as _;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use serde_json::Value as Json;
use uuid::Uuid;

use rollcall_domain::filter::Filter;
use rollcall_domain::query::{FindMany, Shape};
use rollcall_domain::{Field, Record, ValidationError};

use super::resource::{
    AttendanceTallies, Attendances, ClassStudents, Classes, Resource, StudentNotes, Students,
    Users,
};
use super::table::Table;
use crate::domain::{
    AttendanceDataField, AttendanceDataInclude, AttendanceDataWith, AttendanceField,
    AttendanceInclude, AttendanceWith, ClassField, ClassInclude, ClassStudentField,
    ClassStudentInclude, ClassStudentWith, ClassWith, StudentInclude, StudentNoteField,
    StudentNoteInclude, StudentNoteWith, StudentWith, UserInclude, UserWith,
};
use crate::error::StoreError;

/// An entity whose records can carry related records.
pub trait Includes: Resource {
    type Include: Send + Sync;
    type With: Serialize + Send;

    fn validate_include(include: &Self::Include) -> Result<(), ValidationError>;

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &Self::Include,
    ) -> Result<Vec<Self::With>, StoreError>;
}

type Children<T> = Option<HashMap<Uuid, Vec<T>>>;

/// Children of every parent in `parent_ids`, keyed by the foreign key value.
///
/// The nested filter and ordering run in the database; skip and take apply per parent.
async fn load_children<R, C>(
    conn: &C,
    fk: R::Field,
    parent_ids: &[Uuid],
    nested: Option<&FindMany<R::Field>>,
) -> Result<Children<R::Record>, StoreError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let Some(nested) = nested else {
        return Ok(None);
    };
    if parent_ids.is_empty() {
        return Ok(Some(HashMap::new()));
    }
    let mut filter = Filter::is_in(fk, parent_ids.iter().copied());
    if let Some(extra) = &nested.filter {
        filter = filter.and(extra.clone());
    }
    let args = FindMany {
        filter: Some(filter),
        order_by: nested.order_by.clone(),
        ..FindMany::default()
    };
    let rows = Table::<R, C>::new(conn).find_many(args).await?;

    let mut grouped: HashMap<Uuid, Vec<R::Record>> = HashMap::new();
    for row in rows {
        if let Some(parent) = row.get(fk).as_uuid() {
            grouped.entry(parent).or_default().push(row);
        }
    }
    let skip = usize::try_from(nested.skip).unwrap_or(usize::MAX);
    for children in grouped.values_mut() {
        let take = nested
            .take
            .map_or(usize::MAX, |t| usize::try_from(t).unwrap_or(usize::MAX));
        *children = children.drain(..).skip(skip).take(take).collect();
    }
    Ok(Some(grouped))
}

/// Parents referenced by `ids`, keyed by primary key.
async fn load_parents<R, C>(
    conn: &C,
    wanted: bool,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<Option<HashMap<Uuid, R::Record>>, StoreError>
where
    R: Resource,
    C: ConnectionTrait,
{
    if !wanted {
        return Ok(None);
    }
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(Some(HashMap::new()));
    }
    let rows = Table::<R, C>::new(conn)
        .find_many(FindMany::new().filter(Filter::is_in(R::Field::ID, ids)))
        .await?;
    Ok(Some(rows.into_iter().map(|r| (r.id(), r)).collect()))
}

fn take_children<T>(children: &mut Children<T>, id: Uuid) -> Option<Vec<T>> {
    children
        .as_mut()
        .map(|map| map.remove(&id).unwrap_or_default())
}

fn parent<T: Clone>(parents: &Option<HashMap<Uuid, T>>, id: Uuid) -> Option<T> {
    parents.as_ref().and_then(|map| map.get(&id).cloned())
}

fn validate_nested<F: Field>(nested: &Option<FindMany<F>>) -> Result<(), ValidationError> {
    nested.as_ref().map_or(Ok(()), FindMany::validate_nested)
}

fn ids<T: Record>(rows: &[T]) -> Vec<Uuid> {
    rows.iter().map(Record::id).collect()
}

// ── User ─────────────────────────────────────────────────────────────────────

impl Includes for Users {
    type Include = UserInclude;
    type With = UserWith;

    fn validate_include(include: &UserInclude) -> Result<(), ValidationError> {
        validate_nested(&include.classes)?;
        validate_nested(&include.student_notes)?;
        validate_nested(&include.attendance_data)
    }

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &UserInclude,
    ) -> Result<Vec<UserWith>, StoreError> {
        let ids = ids(&rows);
        let mut classes =
            load_children::<Classes, C>(conn, ClassField::TeacherId, &ids, include.classes.as_ref())
                .await?;
        let mut notes = load_children::<StudentNotes, C>(
            conn,
            StudentNoteField::AuthorId,
            &ids,
            include.student_notes.as_ref(),
        )
        .await?;
        let mut tallies = load_children::<AttendanceTallies, C>(
            conn,
            AttendanceDataField::UserId,
            &ids,
            include.attendance_data.as_ref(),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|user| {
                let id = user.id();
                UserWith {
                    classes: take_children(&mut classes, id),
                    student_notes: take_children(&mut notes, id),
                    attendance_data: take_children(&mut tallies, id),
                    user,
                }
            })
            .collect())
    }
}

// ── Class ────────────────────────────────────────────────────────────────────

impl Includes for Classes {
    type Include = ClassInclude;
    type With = ClassWith;

    fn validate_include(include: &ClassInclude) -> Result<(), ValidationError> {
        validate_nested(&include.students)?;
        validate_nested(&include.attendance)
    }

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &ClassInclude,
    ) -> Result<Vec<ClassWith>, StoreError> {
        let ids = ids(&rows);
        let teachers = load_parents::<Users, C>(
            conn,
            include.teacher,
            rows.iter().map(|c| c.teacher_id.as_uuid()),
        )
        .await?;
        let mut students = load_children::<ClassStudents, C>(
            conn,
            ClassStudentField::ClassId,
            &ids,
            include.students.as_ref(),
        )
        .await?;
        let mut attendance = load_children::<Attendances, C>(
            conn,
            AttendanceField::ClassId,
            &ids,
            include.attendance.as_ref(),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|class| {
                let id = class.id();
                ClassWith {
                    teacher: parent(&teachers, class.teacher_id.as_uuid()),
                    students: take_children(&mut students, id),
                    attendance: take_children(&mut attendance, id),
                    class,
                }
            })
            .collect())
    }
}

// ── Student ──────────────────────────────────────────────────────────────────

impl Includes for Students {
    type Include = StudentInclude;
    type With = StudentWith;

    fn validate_include(include: &StudentInclude) -> Result<(), ValidationError> {
        validate_nested(&include.classes)?;
        validate_nested(&include.attendance)?;
        validate_nested(&include.notes)
    }

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &StudentInclude,
    ) -> Result<Vec<StudentWith>, StoreError> {
        let ids = ids(&rows);
        let mut classes = load_children::<ClassStudents, C>(
            conn,
            ClassStudentField::StudentId,
            &ids,
            include.classes.as_ref(),
        )
        .await?;
        let mut attendance = load_children::<Attendances, C>(
            conn,
            AttendanceField::StudentId,
            &ids,
            include.attendance.as_ref(),
        )
        .await?;
        let mut notes = load_children::<StudentNotes, C>(
            conn,
            StudentNoteField::StudentId,
            &ids,
            include.notes.as_ref(),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|student| {
                let id = student.id();
                StudentWith {
                    classes: take_children(&mut classes, id),
                    attendance: take_children(&mut attendance, id),
                    notes: take_children(&mut notes, id),
                    student,
                }
            })
            .collect())
    }
}

// ── ClassStudent ─────────────────────────────────────────────────────────────

impl Includes for ClassStudents {
    type Include = ClassStudentInclude;
    type With = ClassStudentWith;

    fn validate_include(_: &ClassStudentInclude) -> Result<(), ValidationError> {
        Ok(())
    }

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &ClassStudentInclude,
    ) -> Result<Vec<ClassStudentWith>, StoreError> {
        let classes = load_parents::<Classes, C>(
            conn,
            include.class,
            rows.iter().map(|e| e.class_id.as_uuid()),
        )
        .await?;
        let students = load_parents::<Students, C>(
            conn,
            include.student,
            rows.iter().map(|e| e.student_id.as_uuid()),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|enrollment| ClassStudentWith {
                class: parent(&classes, enrollment.class_id.as_uuid()),
                student: parent(&students, enrollment.student_id.as_uuid()),
                enrollment,
            })
            .collect())
    }
}

// ── Attendance ───────────────────────────────────────────────────────────────

impl Includes for Attendances {
    type Include = AttendanceInclude;
    type With = AttendanceWith;

    fn validate_include(_: &AttendanceInclude) -> Result<(), ValidationError> {
        Ok(())
    }

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &AttendanceInclude,
    ) -> Result<Vec<AttendanceWith>, StoreError> {
        let classes = load_parents::<Classes, C>(
            conn,
            include.class,
            rows.iter().map(|a| a.class_id.as_uuid()),
        )
        .await?;
        let students = load_parents::<Students, C>(
            conn,
            include.student,
            rows.iter().map(|a| a.student_id.as_uuid()),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|attendance| AttendanceWith {
                class: parent(&classes, attendance.class_id.as_uuid()),
                student: parent(&students, attendance.student_id.as_uuid()),
                attendance,
            })
            .collect())
    }
}

// ── StudentNote ──────────────────────────────────────────────────────────────

impl Includes for StudentNotes {
    type Include = StudentNoteInclude;
    type With = StudentNoteWith;

    fn validate_include(_: &StudentNoteInclude) -> Result<(), ValidationError> {
        Ok(())
    }

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &StudentNoteInclude,
    ) -> Result<Vec<StudentNoteWith>, StoreError> {
        let students = load_parents::<Students, C>(
            conn,
            include.student,
            rows.iter().map(|n| n.student_id.as_uuid()),
        )
        .await?;
        let authors = load_parents::<Users, C>(
            conn,
            include.author,
            rows.iter().map(|n| n.author_id.as_uuid()),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|note| StudentNoteWith {
                student: parent(&students, note.student_id.as_uuid()),
                author: parent(&authors, note.author_id.as_uuid()),
                note,
            })
            .collect())
    }
}

// ── AttendanceData ───────────────────────────────────────────────────────────

impl Includes for AttendanceTallies {
    type Include = AttendanceDataInclude;
    type With = AttendanceDataWith;

    fn validate_include(_: &AttendanceDataInclude) -> Result<(), ValidationError> {
        Ok(())
    }

    async fn attach<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<Self::Record>,
        include: &AttendanceDataInclude,
    ) -> Result<Vec<AttendanceDataWith>, StoreError> {
        let users = load_parents::<Users, C>(
            conn,
            include.user,
            rows.iter().map(|t| t.user_id.as_uuid()),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|tally| AttendanceDataWith {
                user: parent(&users, tally.user_id.as_uuid()),
                tally,
            })
            .collect())
    }
}

// ── Table surface ────────────────────────────────────────────────────────────

impl<R, C> Table<'_, R, C>
where
    R: Includes,
    C: ConnectionTrait,
{
    pub async fn find_many_including(
        &self,
        args: FindMany<R::Field>,
        include: &R::Include,
    ) -> Result<Vec<R::With>, StoreError> {
        R::validate_include(include)?;
        let rows = self.find_many(args).await?;
        R::attach(self.conn, rows, include).await
    }

    pub async fn find_unique_including(
        &self,
        key: &R::Key,
        include: &R::Include,
    ) -> Result<Option<R::With>, StoreError> {
        R::validate_include(include)?;
        let Some(row) = self.find_unique(key).await? else {
            return Ok(None);
        };
        Ok(R::attach(self.conn, vec![row], include).await?.pop())
    }

    /// Records as JSON objects restricted to the selected columns, or all columns minus
    /// the omitted ones, with any included relations nested under their names.
    pub async fn find_many_shaped(
        &self,
        args: FindMany<R::Field>,
        shape: &Shape<R::Field, R::Include>,
    ) -> Result<Vec<Json>, StoreError> {
        shape.validate()?;
        let mut values = match &shape.include {
            Some(include) => self
                .find_many_including(args, include)
                .await?
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>(),
            None => self
                .find_many(args)
                .await?
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>(),
        }
        .context("serialize shaped record")?;

        let dropped: Vec<&str> = R::Field::ALL
            .iter()
            .filter(|f| !shape.keeps(**f))
            .map(|f| f.name())
            .collect();
        for value in &mut values {
            if let Json::Object(map) = value {
                for name in &dropped {
                    map.remove(*name);
                }
            }
        }
        Ok(values)
    }
}
