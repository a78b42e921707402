//! Error type for `tidy-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tidy_core::Error),

  #[error("codec error: {0}")]
  Codec(#[from] tidy_io::Error),

  /// Raised by the engine: malformed statements, constraint violations,
  /// unreadable database files.
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("cannot access {}: {source}", path.display())]
  FileAccess {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
