use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceData::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceData::Date).date().not_null())
                    .col(
                        ColumnDef::new(AttendanceData::Present)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceData::Absent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceData::Late)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceData::Excused)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceData::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AttendanceData::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AttendanceData::UserId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_data_user_id")
                            .from(AttendanceData::Table, AttendanceData::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceData::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AttendanceData {
    Table,
    Id,
    Date,
    Present,
    Absent,
    Late,
    Excused,
    CreatedAt,
    UpdatedAt,
    UserId,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
