//! Error types for `tidy-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Column names are spliced into SQL as identifiers and must be plain.
  #[error("invalid column name: {0:?}")]
  InvalidIdentifier(String),

  /// Names are compared ASCII case-insensitively, as SQLite does.
  #[error("duplicate column name: {0:?}")]
  DuplicateColumn(String),

  /// `rowid` and its aliases name the implicit row key.
  #[error("reserved column name: {0:?}")]
  ReservedColumn(String),

  #[error("the last column must be {expected:?}, found {found:?}")]
  MissingVersionColumn { expected: &'static str, found: Option<String> },

  #[error("expected {expected} attribute values, got {actual}")]
  Arity { expected: usize, actual: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
