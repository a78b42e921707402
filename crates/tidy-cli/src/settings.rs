//! Layered configuration: defaults, then the TOML file, then `TIDY_*`
//! environment variables. Command-line flags are applied by the caller.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tidy_core::schema::{DEFAULT_ATTRIBUTES, VersionSchema};
use tidy_store_sqlite::{RegistryOptions, SqliteRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite database file.
  pub database:             PathBuf,
  /// Attribute columns of the version table, between `signal_uuid` and
  /// `software_version`.
  pub columns:              Vec<String>,
  /// `name_column` and `enforce_foreign_keys`, read from the top level.
  #[serde(flatten)]
  pub options:              RegistryOptions,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database:             PathBuf::from("signals.db"),
      columns:              DEFAULT_ATTRIBUTES.iter().map(|c| (*c).to_owned()).collect(),
      options:              RegistryOptions::default(),
    }
  }
}

impl Settings {
  /// Read `path` (optional) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TIDY")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("columns"),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn registry(&self) -> anyhow::Result<SqliteRegistry> {
    let schema = VersionSchema::with_attributes(self.columns.iter().cloned())
      .context("invalid column configuration")?;
    Ok(SqliteRegistry::with_options(&self.database, self.options.clone()).with_schema(schema))
  }
}
