//! Core types and trait definitions for the Acta notarial record store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod blob;
pub mod customer;
pub mod document;
pub mod error;
pub mod file;
pub mod link;
pub mod page;
pub mod signing;
pub mod store;

pub use error::{Error, ErrorKind, Result};
