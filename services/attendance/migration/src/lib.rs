use sea_orm_migration::prelude::*;

mod m20241001_000001_create_users;
mod m20241001_000002_create_classes;
mod m20241001_000003_create_students;
mod m20241001_000004_create_class_students;
mod m20241001_000005_create_attendance;
mod m20241001_000006_create_student_notes;
mod m20241001_000007_create_attendance_data;
mod m20241001_000008_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_users::Migration),
            Box::new(m20241001_000002_create_classes::Migration),
            Box::new(m20241001_000003_create_students::Migration),
            Box::new(m20241001_000004_create_class_students::Migration),
            Box::new(m20241001_000005_create_attendance::Migration),
            Box::new(m20241001_000006_create_student_notes::Migration),
            Box::new(m20241001_000007_create_attendance_data::Migration),
            Box::new(m20241001_000008_add_lookup_indexes::Migration),
        ]
    }
}
