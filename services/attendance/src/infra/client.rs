use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use super::resource::{
    AttendanceTallies, Attendances, ClassStudents, Classes, StudentNotes, Students, Users,
};
use super::table::Table;
use super::transaction::TransactionOptions;
use crate::config::StoreConfig;
use crate::error::{DbResultExt, StoreError};

/// Entry point to the attendance store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct AttendanceDb {
    pub(crate) conn: DatabaseConnection,
    pub(crate) tx_defaults: TransactionOptions,
}

impl AttendanceDb {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .acquire_timeout(config.acquire_timeout)
            .sqlx_logging(config.sql_logging);
        let conn = Database::connect(options)
            .await
            .context_db("database", "connect")?;
        info!(
            backend = ?conn.get_database_backend(),
            max_connections = config.max_connections,
            "connected to database"
        );
        Ok(Self {
            conn,
            tx_defaults: TransactionOptions::from_config(config),
        })
    }

    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            tx_defaults: TransactionOptions::default(),
        }
    }

    pub fn with_transaction_defaults(mut self, options: TransactionOptions) -> Self {
        self.tx_defaults = options;
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.conn.ping().await.context_db("database", "ping")
    }

    pub async fn close(self) -> Result<(), StoreError> {
        self.conn.close().await.context_db("database", "close")
    }

    pub fn tables(&self) -> Tables<'_, DatabaseConnection> {
        Tables::new(&self.conn)
    }

    pub fn users(&self) -> Table<'_, Users, DatabaseConnection> {
        Table::new(&self.conn)
    }

    pub fn classes(&self) -> Table<'_, Classes, DatabaseConnection> {
        Table::new(&self.conn)
    }

    pub fn students(&self) -> Table<'_, Students, DatabaseConnection> {
        Table::new(&self.conn)
    }

    pub fn class_students(&self) -> Table<'_, ClassStudents, DatabaseConnection> {
        Table::new(&self.conn)
    }

    pub fn attendance(&self) -> Table<'_, Attendances, DatabaseConnection> {
        Table::new(&self.conn)
    }

    pub fn student_notes(&self) -> Table<'_, StudentNotes, DatabaseConnection> {
        Table::new(&self.conn)
    }

    pub fn attendance_data(&self) -> Table<'_, AttendanceTallies, DatabaseConnection> {
        Table::new(&self.conn)
    }
}

/// All seven tables over one connection or transaction.
pub struct Tables<'c, C> {
    conn: &'c C,
}

impl<C> Clone for Tables<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Tables<'_, C> {}

impl<'c, C: ConnectionTrait> Tables<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> Table<'c, Users, C> {
        Table::new(self.conn)
    }

    pub fn classes(&self) -> Table<'c, Classes, C> {
        Table::new(self.conn)
    }

    pub fn students(&self) -> Table<'c, Students, C> {
        Table::new(self.conn)
    }

    pub fn class_students(&self) -> Table<'c, ClassStudents, C> {
        Table::new(self.conn)
    }

    pub fn attendance(&self) -> Table<'c, Attendances, C> {
        Table::new(self.conn)
    }

    pub fn student_notes(&self) -> Table<'c, StudentNotes, C> {
        Table::new(self.conn)
    }

    pub fn attendance_data(&self) -> Table<'c, AttendanceTallies, C> {
        Table::new(self.conn)
    }
}
