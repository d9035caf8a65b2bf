//! Domain types shared across the rollcall workspace.
//!
//! This crate contains only pure types with no database dependencies: identifiers,
//! the closed enums of the attendance schema, and the query vocabulary (filters,
//! ordering, pagination, aggregates) that the data access layer compiles into SQL.

pub mod aggregate;
pub mod field;
pub mod filter;
pub mod id;
pub mod order;
pub mod query;
pub mod role;
pub mod status;
pub mod validation;
pub mod value;


pub use field::{Field, Patch, Record, UniqueKey};
pub use validation::ValidationError;
pub use value::{FieldKind, FieldValue};
