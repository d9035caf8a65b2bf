use sea_orm::entity::prelude::*;

/// Teacher or admin account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub name: String,
    /// `ADMIN` or `TEACHER`.
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classes::Entity")]
    Classes,
    #[sea_orm(has_many = "super::student_notes::Entity")]
    StudentNotes,
    #[sea_orm(has_many = "super::attendance_data::Entity")]
    AttendanceData,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classes.def()
    }
}

impl Related<super::student_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentNotes.def()
    }
}

impl Related<super::attendance_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceData.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
