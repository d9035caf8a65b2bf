//! Cross-cutting helpers shared by the rollcall crates: tracing setup, environment
//! lookups and sea-query extensions.

pub mod config;
pub mod sea_ext;
pub mod tracing;
