//! Typed, asynchronous data access for the attendance schema.

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod usecase;

pub use config::StoreConfig;
pub use error::{ConstraintKind, StoreError, TransactionFailure};
pub use infra::{AttendanceDb, Table, Tables, TransactionOptions};
