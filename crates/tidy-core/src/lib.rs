//! Core types and trait definitions for the signal registry.
//!
//! This crate is free of database and file-format dependencies. The storage
//! backend (`tidy-store-sqlite`) and the flat-file codecs (`tidy-io`) build on
//! the types defined here.

pub mod error;
pub mod schema;
pub mod signal;
pub mod store;

pub use error::{Error, Result};
