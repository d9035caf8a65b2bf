pub mod roll_call;
pub mod summary;
