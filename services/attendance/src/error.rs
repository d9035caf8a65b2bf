use std::fmt;

use sea_orm::{DbErr, RuntimeErr, SqlErr};

use rollcall_domain::ValidationError;

/// Which kind of schema constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    /// Closed enum domains (`role`, `status`).
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
            Self::Check => "check",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionFailure {
    #[error("could not start a transaction within {waited_ms}ms")]
    MaxWaitExceeded { waited_ms: u64 },
    #[error("transaction exceeded its {timeout_ms}ms timeout and was rolled back")]
    Timeout { timeout_ms: u64 },
    #[error("commit failed: {0}")]
    Commit(String),
}

/// Errors surfaced by the data access layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{kind} constraint violated: {constraint}")]
    ConstraintViolation {
        kind: ConstraintKind,
        /// Constraint name or column list, as reported by the database.
        constraint: String,
    },
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("database unreachable: {0}")]
    Connectivity(String),
    #[error("transaction failed: {0}")]
    Transaction(#[from] TransactionFailure),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            Self::Validation(_) => "VALIDATION",
            Self::Connectivity(_) => "CONNECTIVITY",
            Self::Transaction(_) => "TRANSACTION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn is_constraint(&self, kind: ConstraintKind) -> bool {
        matches!(self, Self::ConstraintViolation { kind: k, .. } if *k == kind)
    }

    /// Classify a database error raised while running `op` against `entity`.
    pub fn from_db(err: DbErr, entity: &'static str, op: &'static str) -> Self {
        if let Some(sql_err) = err.sql_err() {
            return match sql_err {
                SqlErr::UniqueConstraintViolation(msg) => Self::ConstraintViolation {
                    kind: ConstraintKind::Unique,
                    constraint: constraint_name(&msg),
                },
                SqlErr::ForeignKeyConstraintViolation(msg) => Self::ConstraintViolation {
                    kind: ConstraintKind::ForeignKey,
                    constraint: constraint_name(&msg),
                },
                _ => Self::Internal(anyhow::Error::new(err).context(format!("{op} {entity}"))),
            };
        }
        let msg = err.to_string();
        if let Some(kind) = constraint_kind_from_message(&msg) {
            return Self::ConstraintViolation {
                kind,
                constraint: constraint_name(&msg),
            };
        }
        match err {
            DbErr::Conn(RuntimeErr::SqlxError(e)) | DbErr::Exec(RuntimeErr::SqlxError(e))
                if is_io(&e) =>
            {
                Self::Connectivity(e.to_string())
            }
            DbErr::Conn(e) => Self::Connectivity(e.to_string()),
            DbErr::ConnectionAcquire(e) => Self::Connectivity(e.to_string()),
            other => Self::Internal(anyhow::Error::new(other).context(format!("{op} {entity}"))),
        }
    }
}

fn is_io(err: &sea_orm::sqlx::Error) -> bool {
    matches!(
        err,
        sea_orm::sqlx::Error::Io(_)
            | sea_orm::sqlx::Error::PoolTimedOut
            | sea_orm::sqlx::Error::PoolClosed
            | sea_orm::sqlx::Error::Tls(_)
    )
}

/// Drivers that do not expose a structured code still name the constraint family in
/// the message (SQLite `CHECK constraint failed`, Postgres `violates check constraint`).
fn constraint_kind_from_message(msg: &str) -> Option<ConstraintKind> {
    let lower = msg.to_ascii_lowercase();
    if lower.contains("check constraint") {
        Some(ConstraintKind::Check)
    } else if lower.contains("foreign key constraint") {
        Some(ConstraintKind::ForeignKey)
    } else if lower.contains("unique constraint") || lower.contains("duplicate key") {
        Some(ConstraintKind::Unique)
    } else {
        None
    }
}

/// Postgres quotes the constraint name; SQLite appends `table.column` after a colon.
fn constraint_name(msg: &str) -> String {
    if let Some((_, tail)) = msg.split_once("constraint \"") {
        if let Some((name, _)) = tail.split_once('"') {
            return name.to_owned();
        }
    }
    match msg.rsplit_once("failed: ") {
        Some((_, tail)) => tail.trim().to_owned(),
        None => msg.trim().to_owned(),
    }
}

/// Attach entity and operation context to a sea-orm result, mirroring `anyhow::Context`.
pub trait DbResultExt<T> {
    fn context_db(self, entity: &'static str, op: &'static str) -> Result<T, StoreError>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn context_db(self, entity: &'static str, op: &'static str) -> Result<T, StoreError> {
        self.map_err(|err| StoreError::from_db(err, entity, op))
    }
}
