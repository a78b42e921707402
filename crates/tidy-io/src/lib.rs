//! Flat-file codecs for signal import and export.
//!
//! Two shapes are supported: a delimited table (header row plus data rows) and
//! a structured document (a sequence of mappings, one per record). Pure
//! synchronous code over `Read`/`Write`; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use tidy_io::{Format, Table};
//!
//! let table = Table::new(vec!["signal_name".into(), "unit".into()]);
//! tidy_io::write(std::io::stdout(), Format::Yaml, &table).unwrap();
//! ```

mod delimited;
mod document;
pub mod error;

use std::{fmt, io, path::Path, str::FromStr};

pub use error::{Error, Result};

// ─── Format ──────────────────────────────────────────────────────────────────

/// Output or input encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  /// Comma-separated table with a header row.
  Csv,
  /// YAML sequence of mappings.
  Yaml,
  /// JSON array of objects.
  Json,
}

impl Format {
  /// Guess the format from a file extension.
  pub fn from_path(path: &Path) -> Option<Self> {
    path
      .extension()
      .and_then(|e| e.to_str())
      .and_then(|e| e.parse().ok())
  }

  /// `true` for the mapping-per-record formats.
  pub fn is_document(self) -> bool { !matches!(self, Self::Csv) }
}

impl FromStr for Format {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "csv" => Ok(Self::Csv),
      "yaml" | "yml" => Ok(Self::Yaml),
      "json" => Ok(Self::Json),
      _ => Err(Error::UnknownFormat(s.to_owned())),
    }
  }
}

impl fmt::Display for Format {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Csv => "csv",
      Self::Yaml => "yaml",
      Self::Json => "json",
    })
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// Rows of string cells under a shared header.
///
/// Every row has exactly `headers.len()` cells when produced by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<String>>,
}

impl Table {
  pub fn new(headers: Vec<String>) -> Self { Self { headers, rows: Vec::new() } }

  /// Position of `name` in the header row.
  pub fn column_index(&self, name: &str) -> Result<usize> {
    self
      .headers
      .iter()
      .position(|h| h == name)
      .ok_or_else(|| Error::MissingColumn(name.to_owned()))
  }

  /// Iterate rows as `(header, cell)` pairs.
  pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
    self.rows.iter().map(|row| Record { headers: &self.headers, cells: row })
  }
}

/// A borrowed view of one row with its headers.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
  headers: &'a [String],
  cells:   &'a [String],
}

impl<'a> Record<'a> {
  /// The cell under `name`, if the header exists.
  pub fn get(&self, name: &str) -> Option<&'a str> {
    self
      .headers
      .iter()
      .position(|h| h == name)
      .and_then(|i| self.cells.get(i))
      .map(String::as_str)
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Serialise `table` to `writer` in `format`.
///
/// An empty table still produces well-formed output: a header-only CSV or an
/// empty sequence.
pub fn write<W: io::Write>(writer: W, format: Format, table: &Table) -> Result<()> {
  match format {
    Format::Csv => delimited::write(writer, table),
    Format::Yaml => document::write_yaml(writer, table),
    Format::Json => document::write_json(writer, table),
  }
}

/// Parse a table from `reader`.
///
/// For documents the header row is the union of all mapping keys in
/// first-seen order. A mapping lacking one of those keys is rejected with
/// [`Error::MissingColumn`], as a short CSV row is.
pub fn read<R: io::Read>(reader: R, format: Format) -> Result<Table> {
  match format {
    Format::Csv => delimited::read(reader),
    Format::Yaml => document::read_yaml(reader),
    Format::Json => document::read_json(reader),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn format_from_extension() {
    assert_eq!(Format::from_path(Path::new("out/signals.csv")), Some(Format::Csv));
    assert_eq!(Format::from_path(Path::new("signals.YML")), Some(Format::Yaml));
    assert_eq!(Format::from_path(Path::new("signals.json")), Some(Format::Json));
    assert_eq!(Format::from_path(Path::new("signals.txt")), None);
    assert_eq!(Format::from_path(Path::new("signals")), None);
  }

  #[test]
  fn unknown_format_name() {
    let err = "xml".parse::<Format>().unwrap_err();
    assert!(matches!(err, Error::UnknownFormat(ref s) if s == "xml"));
  }

  #[test]
  fn record_lookup_by_header() {
    let table = Table {
      headers: vec!["signal_name".into(), "unit".into()],
      rows:    vec![vec!["speed".into(), "kph".into()]],
    };
    let rec = table.records().next().unwrap();
    assert_eq!(rec.get("unit"), Some("kph"));
    assert_eq!(rec.get("size"), None);
    assert_eq!(table.column_index("signal_name").unwrap(), 0);
    assert!(matches!(table.column_index("size"), Err(Error::MissingColumn(_))));
  }
}
