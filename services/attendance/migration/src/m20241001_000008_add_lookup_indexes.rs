use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Classes::Table)
                    .col(Classes::TeacherId)
                    .name("idx_classes_teacher_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(ClassStudents::Table)
                    .col(ClassStudents::StudentId)
                    .name("idx_class_students_student_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Attendance::Table)
                    .col(Attendance::ClassId)
                    .col(Attendance::Date)
                    .name("idx_attendance_class_id_date")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Attendance::Table)
                    .col(Attendance::StudentId)
                    .name("idx_attendance_student_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(StudentNotes::Table)
                    .col(StudentNotes::StudentId)
                    .name("idx_student_notes_student_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(AttendanceData::Table)
                    .col(AttendanceData::UserId)
                    .col(AttendanceData::Date)
                    .name("idx_attendance_data_user_id_date")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_attendance_data_user_id_date",
            "idx_student_notes_student_id",
            "idx_attendance_student_id",
            "idx_attendance_class_id_date",
            "idx_class_students_student_id",
            "idx_classes_teacher_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Classes {
    Table,
    TeacherId,
}

#[derive(Iden)]
enum ClassStudents {
    Table,
    StudentId,
}

#[derive(Iden)]
enum Attendance {
    Table,
    ClassId,
    Date,
    StudentId,
}

#[derive(Iden)]
enum StudentNotes {
    Table,
    StudentId,
}

#[derive(Iden)]
enum AttendanceData {
    Table,
    UserId,
    Date,
}
