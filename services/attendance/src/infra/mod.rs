pub mod aggregate;
pub mod client;
pub mod filter;
pub mod include;
pub mod resource;
pub mod table;
pub mod transaction;
pub mod value;

pub use client::{AttendanceDb, Tables};
pub use include::Includes;
pub use resource::{
    AttendanceTallies, Attendances, ClassStudents, Classes, Resource, StudentNotes, Students,
    Users,
};
pub use table::Table;
pub use transaction::{TransactionOptions, TxFuture};
