//! [`SqliteRegistry`]: the SQLite implementation of [`SignalStore`].

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, Transaction};
use serde::Deserialize;
use tidy_core::{
  schema::VersionSchema,
  signal::{Provenance, SignalIdentity, VersionRecord},
  store::SignalStore,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawIdentity, RawVersion, cell, decode_uuid, encode_dt, encode_uuid},
  schema,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Behaviour knobs that do not affect the table layout.
///
/// Deserialisable so that configuration files can carry the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
  /// Turn on `PRAGMA foreign_keys` for every connection, so a version row
  /// naming an unknown identity is rejected by the engine.
  pub enforce_foreign_keys: bool,
  /// Column of an import file that supplies each new identity's display name.
  pub name_column:          String,
}

impl Default for RegistryOptions {
  fn default() -> Self {
    Self { enforce_foreign_keys: true, name_column: "signal_name".to_owned() }
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// A signal registry backed by a single SQLite file.
///
/// Holds only the path, the column layout and options; each operation opens
/// and closes its own connection.
#[derive(Debug, Clone)]
pub struct SqliteRegistry {
  path:    PathBuf,
  schema:  VersionSchema,
  options: RegistryOptions,
}

impl SqliteRegistry {
  /// A registry with the default column layout. Touches nothing on disk.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self::with_options(path, RegistryOptions::default())
  }

  pub fn with_options(path: impl Into<PathBuf>, options: RegistryOptions) -> Self {
    Self { path: path.into(), schema: VersionSchema::default(), options }
  }

  /// Create (if needed) the database at `path` and both tables.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let registry = Self::new(path);
    registry.initialize()?;
    Ok(registry)
  }

  /// The same database under a different column layout.
  ///
  /// An existing `signal_versions` table is not altered; call
  /// [`rebuild_version_table`](Self::rebuild_version_table) to recreate it.
  pub fn with_schema(self, schema: VersionSchema) -> Self { Self { schema, ..self } }

  pub fn options(&self) -> &RegistryOptions { &self.options }

  /// Open a connection, run `op` inside one transaction, commit and close.
  ///
  /// On any error the transaction rolls back and the connection is dropped
  /// before returning.
  pub(crate) fn with_tx<T>(
    &self,
    op: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
  ) -> Result<T> {
    let mut conn = Connection::open(&self.path)?;
    conn.pragma_update(None, "foreign_keys", self.options.enforce_foreign_keys)?;

    let tx = conn.transaction()?;
    let out = op(&tx)?;
    tx.commit()?;

    conn.close().map_err(|(_, e)| e)?;
    Ok(out)
  }

  /// Drop `signal_versions`. Identities are left in place.
  pub fn drop_version_table(&self) -> Result<()> {
    self.with_tx(|tx| tx.execute_batch(schema::DROP_VERSION_TABLE))?;
    info!(path = %self.path.display(), "dropped signal_versions table");
    Ok(())
  }

  /// Drop and recreate `signal_versions` under the current column layout.
  ///
  /// All version rows are lost.
  pub fn rebuild_version_table(&self) -> Result<()> {
    self.drop_version_table()?;
    self.initialize()
  }
}

// ─── SignalStore impl ────────────────────────────────────────────────────────

impl SignalStore for SqliteRegistry {
  type Error = crate::Error;

  fn schema(&self) -> &VersionSchema { &self.schema }

  fn initialize(&self) -> Result<()> {
    let versions_ddl = schema::version_table(&self.schema);
    self.with_tx(|tx| {
      tx.execute_batch(schema::IDENTITY_TABLE)?;
      tx.execute_batch(&versions_ddl)
    })?;
    info!(
      path = %self.path.display(),
      columns = self.schema.columns().len(),
      "signal registry initialised"
    );
    Ok(())
  }

  // ── Identities ────────────────────────────────────────────────────────────

  fn allocate_identity(
    &self,
    display_name: &str,
    provenance: Provenance,
  ) -> Result<SignalIdentity> {
    let identity = SignalIdentity {
      uuid:                Uuid::new_v4(),
      latest_display_name: display_name.to_owned(),
      creation_info:       provenance,
      creation_date:       Utc::now(),
    };

    let id_str   = encode_uuid(identity.uuid);
    let info_str = identity.creation_info.to_string();
    let at_str   = encode_dt(identity.creation_date);

    self.with_tx(|tx| {
      tx.execute(
        "INSERT INTO signals (uuid, latest_display_name, creation_info, creation_date)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id_str, identity.latest_display_name, info_str, at_str],
      )
    })?;

    info!(
      uuid = %identity.uuid,
      name = %identity.latest_display_name,
      provenance = %identity.creation_info,
      "allocated signal identity"
    );
    Ok(identity)
  }

  fn get_identity(&self, uuid: Uuid) -> Result<Option<SignalIdentity>> {
    let id_str = encode_uuid(uuid);
    let sql = format!("SELECT {} FROM signals WHERE uuid = ?1", RawIdentity::COLUMNS);

    let raw = self.with_tx(|tx| {
      tx.query_row(&sql, rusqlite::params![id_str], RawIdentity::from_row)
        .optional()
    })?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  fn list_identities(&self) -> Result<Vec<SignalIdentity>> {
    let sql = format!("SELECT {} FROM signals ORDER BY rowid", RawIdentity::COLUMNS);

    let raws = self.with_tx(|tx| {
      let mut stmt = tx.prepare(&sql)?;
      let rows = stmt
        .query_map([], RawIdentity::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })?;

    raws.into_iter().map(RawIdentity::into_identity).collect()
  }

  fn find_identity_by_display_name(&self, name: &str) -> Result<Option<Uuid>> {
    let found: Option<String> = self.with_tx(|tx| {
      tx.query_row(
        "SELECT uuid FROM signals
         WHERE latest_display_name = ?1
         ORDER BY rowid DESC
         LIMIT 1",
        rusqlite::params![name],
        |row| cell(row, 0),
      )
      .optional()
    })?;

    found.as_deref().map(decode_uuid).transpose()
  }

  // ── Version records ───────────────────────────────────────────────────────

  fn append_version(&self, record: &VersionRecord) -> Result<()> {
    self.schema.check_arity(record.values.len())?;

    let sql = schema::insert_version(&self.schema);
    let cells = record.cells();

    self.with_tx(|tx| tx.execute(&sql, rusqlite::params_from_iter(cells.iter())))?;

    debug!(
      uuid = %record.signal_uuid,
      software_version = %record.software_version,
      "appended version record"
    );
    Ok(())
  }

  fn version_rows(&self, software_version: Option<&str>) -> Result<Vec<VersionRecord>> {
    let sql = schema::select_versions(&self.schema, software_version.is_some());
    let width = self.schema.columns().len();

    let raws = self.with_tx(|tx| {
      let read = |row: &rusqlite::Row<'_>| RawVersion::from_row(row, width);
      let mut stmt = tx.prepare(&sql)?;
      let rows = match software_version {
        Some(v) => stmt.query_map(rusqlite::params![v], read)?,
        None => stmt.query_map([], read)?,
      };
      let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })?;

    raws.into_iter().map(RawVersion::into_record).collect()
  }

  fn list_software_versions(&self) -> Result<Vec<String>> {
    let sql = schema::select_software_versions(&self.schema);
    let versions = self.with_tx(|tx| {
      let mut stmt = tx.prepare(&sql)?;
      let rows = stmt
        .query_map([], |row| cell(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })?;
    Ok(versions)
  }
}
