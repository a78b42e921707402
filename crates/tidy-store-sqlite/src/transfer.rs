//! Bulk import from flat files and export of the joined projection.
//!
//! Import allocates one fresh identity per row and appends its version record
//! right after. Each of those is its own transaction, so a failure part-way
//! through leaves the rows already written in place.

use std::{fs, path::Path};

use tidy_core::{
  signal::{Provenance, VersionRecord},
  store::SignalStore,
};
use tidy_io::{Format, Table};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Error, Result, SqliteRegistry};

/// What an import wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
  pub software_version: String,
  /// Newly allocated identities, one per imported row, in file order.
  pub identities:       Vec<Uuid>,
}

impl ImportSummary {
  pub fn rows(&self) -> usize { self.identities.len() }
}

impl SqliteRegistry {
  // ── Import ────────────────────────────────────────────────────────────────

  /// Import a header-driven CSV file under `software_version`.
  ///
  /// The configured name column supplies each identity's display name. The
  /// version record takes every column of the row in file order, so the file
  /// must have exactly as many columns as the schema has attributes.
  pub fn import_from_delimited_file(
    &self,
    path: impl AsRef<Path>,
    software_version: &str,
  ) -> Result<ImportSummary> {
    let path = path.as_ref();
    let table = read_file(path, Format::Csv)?;

    let name_idx = table.column_index(&self.options().name_column)?;
    self.schema().check_arity(table.headers.len())?;

    let rows = table
      .rows
      .iter()
      .map(|row| (row[name_idx].as_str(), row.clone()));
    self.import_rows(path, software_version, rows)
  }

  /// Import a YAML or JSON document of mappings, such as one written by
  /// [`export_version`](Self::export_version).
  ///
  /// Attribute values are looked up by column name, so key order does not
  /// matter; the identity and version keys of the document are ignored.
  pub fn import_from_document(
    &self,
    path: impl AsRef<Path>,
    software_version: &str,
  ) -> Result<ImportSummary> {
    let path = path.as_ref();
    let format = Format::from_path(path)
      .filter(|f| f.is_document())
      .unwrap_or(Format::Yaml);
    let table = read_file(path, format)?;

    let name_column = &self.options().name_column;
    let mut rows = Vec::with_capacity(table.rows.len());
    for record in table.records() {
      let name = record
        .get(name_column)
        .ok_or_else(|| tidy_io::Error::MissingColumn(name_column.clone()))?;
      let values = self
        .schema()
        .attributes()
        .iter()
        .map(|c| {
          record
            .get(&c.name)
            .map(str::to_owned)
            .ok_or_else(|| tidy_io::Error::MissingColumn(c.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
      rows.push((name, values));
    }

    self.import_rows(path, software_version, rows)
  }

  fn import_rows<'a>(
    &self,
    path: &Path,
    software_version: &str,
    rows: impl IntoIterator<Item = (&'a str, Vec<String>)>,
  ) -> Result<ImportSummary> {
    let source = path.display().to_string();
    let mut identities = Vec::new();

    for (name, values) in rows {
      let identity =
        self.allocate_identity(name, Provenance::imported(&source, software_version))?;
      self.append_version(&VersionRecord::new(identity.uuid, values, software_version))?;
      identities.push(identity.uuid);
    }

    info!(
      source = %source,
      software_version,
      rows = identities.len(),
      "import complete"
    );
    Ok(ImportSummary {
      software_version: software_version.to_owned(),
      identities,
    })
  }

  // ── Export ────────────────────────────────────────────────────────────────

  /// The joined projection as a table whose header is the configured column
  /// list. `None` selects every version.
  pub fn version_table(&self, software_version: Option<&str>) -> Result<Table> {
    let headers = self.schema().column_names().map(str::to_owned).collect();
    let mut table = Table::new(headers);
    table.rows = self
      .version_rows(software_version)?
      .iter()
      .map(VersionRecord::cells)
      .collect();
    Ok(table)
  }

  /// Write the records of one software version to `destination`.
  ///
  /// Returns the number of records written. A version with no records still
  /// produces a well-formed, empty file.
  pub fn export_version(
    &self,
    software_version: &str,
    destination: impl AsRef<Path>,
    format: Format,
  ) -> Result<usize> {
    let table = self.version_table(Some(software_version))?;
    if table.rows.is_empty() {
      warn!(software_version, "no records for software version");
    }
    write_file(destination.as_ref(), format, &table)?;
    info!(
      destination = %destination.as_ref().display(),
      software_version,
      %format,
      rows = table.rows.len(),
      "export complete"
    );
    Ok(table.rows.len())
  }

  /// Write every version record to `destination`.
  pub fn export_all(&self, destination: impl AsRef<Path>, format: Format) -> Result<usize> {
    let table = self.version_table(None)?;
    write_file(destination.as_ref(), format, &table)?;
    info!(
      destination = %destination.as_ref().display(),
      %format,
      rows = table.rows.len(),
      "full export complete"
    );
    Ok(table.rows.len())
  }
}

// ─── Files ───────────────────────────────────────────────────────────────────

fn file_access(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
  move |source| Error::FileAccess { path: path.to_path_buf(), source }
}

/// The whole file is read before decoding, so every filesystem failure is a
/// [`Error::FileAccess`] and every decode failure is a [`Error::Codec`].
fn read_file(path: &Path, format: Format) -> Result<Table> {
  let bytes = fs::read(path).map_err(file_access(path))?;
  Ok(tidy_io::read(bytes.as_slice(), format)?)
}

/// Encodes in memory first; nothing is written if encoding fails.
fn write_file(path: &Path, format: Format, table: &Table) -> Result<()> {
  let mut buf = Vec::new();
  tidy_io::write(&mut buf, format, table)?;
  fs::write(path, buf).map_err(file_access(path))
}
