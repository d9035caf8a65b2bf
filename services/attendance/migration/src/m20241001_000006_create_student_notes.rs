use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StudentNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentNotes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StudentNotes::Content).text().not_null())
                    .col(
                        ColumnDef::new(StudentNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(StudentNotes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(StudentNotes::StudentId).uuid().not_null())
                    .col(ColumnDef::new(StudentNotes::AuthorId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_notes_student_id")
                            .from(StudentNotes::Table, StudentNotes::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Authored notes keep their author; remove the notes first.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_notes_author_id")
                            .from(StudentNotes::Table, StudentNotes::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentNotes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StudentNotes {
    Table,
    Id,
    Content,
    CreatedAt,
    UpdatedAt,
    StudentId,
    AuthorId,
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
