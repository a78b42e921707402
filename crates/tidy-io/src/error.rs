//! Error types for the tidy-io codecs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("YAML error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("missing column {0:?}")]
  MissingColumn(String),

  /// Document cells must be strings, numbers, booleans or null.
  #[error("non-scalar value for key {0:?}")]
  NonScalarValue(String),

  #[error("unknown format {0:?} (expected csv, yaml or json)")]
  UnknownFormat(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
