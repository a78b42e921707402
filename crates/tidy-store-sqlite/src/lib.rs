//! SQLite backend for the signal registry.
//!
//! Every public operation opens its own connection, runs one transaction,
//! commits and closes. Nothing is held open between calls.

mod encode;
mod schema;
mod store;
mod transfer;

pub mod error;

pub use error::{Error, Result};
pub use store::{RegistryOptions, SqliteRegistry};
pub use tidy_core::store::SignalStore;
pub use tidy_io::Format;
pub use transfer::ImportSummary;
