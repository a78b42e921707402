//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with nanosecond precision. UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Row, types::ValueRef};
use tidy_core::signal::{Provenance, SignalIdentity, VersionRecord};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Cells ───────────────────────────────────────────────────────────────────

/// Read column `idx` as text whatever its storage class. NULL becomes the
/// empty string.
pub fn cell(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
  Ok(match row.get_ref(idx)? {
    ValueRef::Null => String::new(),
    ValueRef::Integer(i) => i.to_string(),
    ValueRef::Real(f) => f.to_string(),
    ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `signals` row.
pub struct RawIdentity {
  pub uuid:                String,
  pub latest_display_name: String,
  pub creation_info:       String,
  pub creation_date:       String,
}

impl RawIdentity {
  pub const COLUMNS: &'static str = "uuid, latest_display_name, creation_info, creation_date";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      uuid:                cell(row, 0)?,
      latest_display_name: cell(row, 1)?,
      creation_info:       cell(row, 2)?,
      creation_date:       cell(row, 3)?,
    })
  }

  pub fn into_identity(self) -> Result<SignalIdentity> {
    Ok(SignalIdentity {
      uuid:                decode_uuid(&self.uuid)?,
      latest_display_name: self.latest_display_name,
      creation_info:       Provenance::parse(&self.creation_info),
      creation_date:       decode_dt(&self.creation_date)?,
    })
  }
}

/// All cells of one `signal_versions` row, in schema order.
pub struct RawVersion {
  pub cells: Vec<String>,
}

impl RawVersion {
  pub fn from_row(row: &Row<'_>, width: usize) -> rusqlite::Result<Self> {
    let cells = (0..width).map(|i| cell(row, i)).collect::<rusqlite::Result<_>>()?;
    Ok(Self { cells })
  }

  pub fn into_record(mut self) -> Result<VersionRecord> {
    let software_version = self.cells.pop().unwrap_or_default();
    let mut cells = self.cells.into_iter();
    let signal_uuid = decode_uuid(&cells.next().unwrap_or_default())?;
    Ok(VersionRecord { signal_uuid, values: cells.collect(), software_version })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let dt = DateTime::parse_from_rfc3339("2024-03-01T10:00:00.5Z")
      .unwrap()
      .with_timezone(&Utc);
    assert_eq!(encode_dt(dt), "2024-03-01T10:00:00.500000000Z");
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn naive_python_timestamp_rejected() {
    assert!(matches!(decode_dt("2024-03-01 10:00:00.123456"), Err(Error::DateParse(_))));
  }

  #[test]
  fn raw_version_splits_fixed_columns() {
    let id = Uuid::new_v4();
    let raw = RawVersion {
      cells: vec![encode_uuid(id), "speed".into(), "kph".into(), "1.0.0".into()],
    };
    let rec = raw.into_record().unwrap();
    assert_eq!(rec.signal_uuid, id);
    assert_eq!(rec.values, ["speed", "kph"]);
    assert_eq!(rec.software_version, "1.0.0");
  }
}
