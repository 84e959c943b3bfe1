//! SQLite backend for the Acta record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Uniqueness of natural keys,
//! transaction codes, and party edges is enforced by the schema itself;
//! constraint violations are translated back into the core error taxonomy.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
