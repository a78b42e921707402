//! SQL for the signal registry tables.
//!
//! The `signals` table is fixed. Statements touching `signal_versions` are
//! generated from a [`VersionSchema`], whose column names have already been
//! validated as plain identifiers; values are always bound as parameters.

use tidy_core::schema::{ColumnKind, VersionSchema};

/// Identity table DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const IDENTITY_TABLE: &str = "
CREATE TABLE IF NOT EXISTS signals (
    uuid                TEXT PRIMARY KEY,
    latest_display_name TEXT,
    creation_info       TEXT,
    creation_date       TEXT   -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS signals_name_idx ON signals(latest_display_name);
";

pub const DROP_VERSION_TABLE: &str = "DROP TABLE IF EXISTS signal_versions";

/// `signal_versions` DDL for `schema`. Only column zero carries a constraint.
pub fn version_table(schema: &VersionSchema) -> String {
  let columns = schema
    .columns()
    .iter()
    .map(|c| match c.kind {
      ColumnKind::IdentityRef => format!("    {} TEXT REFERENCES signals(uuid)", c.quoted()),
      ColumnKind::Attribute | ColumnKind::SoftwareVersion => format!("    {} TEXT", c.quoted()),
    })
    .collect::<Vec<_>>()
    .join(",\n");

  let version = version_column(schema);
  format!(
    "CREATE TABLE IF NOT EXISTS signal_versions (\n{columns}\n);\n\
     CREATE INDEX IF NOT EXISTS signal_versions_version_idx ON signal_versions({version});\n"
  )
}

pub fn insert_version(schema: &VersionSchema) -> String {
  let names = schema.columns().iter().map(|c| c.quoted()).collect::<Vec<_>>();
  let params = (1..=names.len()).map(|i| format!("?{i}")).collect::<Vec<_>>();
  format!(
    "INSERT INTO signal_versions ({}) VALUES ({})",
    names.join(", "),
    params.join(", ")
  )
}

/// Join identities with their version rows, projecting the configured columns
/// in schema order. With `filtered`, `?1` binds the software version.
pub fn select_versions(schema: &VersionSchema, filtered: bool) -> String {
  let projection = schema
    .columns()
    .iter()
    .map(|c| format!("sv.{}", c.quoted()))
    .collect::<Vec<_>>()
    .join(", ");
  let identity = schema.columns()[0].quoted();
  let filter = if filtered {
    format!("WHERE sv.{} = ?1", version_column(schema))
  } else {
    String::new()
  };

  format!(
    "SELECT {projection}
     FROM signals s
     INNER JOIN signal_versions sv ON s.uuid = sv.{identity}
     {filter}
     ORDER BY sv.rowid"
  )
}

pub fn select_software_versions(schema: &VersionSchema) -> String {
  let version = version_column(schema);
  format!(
    "SELECT {version} FROM signal_versions
     GROUP BY {version}
     ORDER BY MIN(rowid)"
  )
}

fn version_column(schema: &VersionSchema) -> String {
  schema.columns()[schema.columns().len() - 1].quoted()
}
