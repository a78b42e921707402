//! Signal identities and their per-version snapshots.
//!
//! An identity owns the permanent UUID of one logical signal. Everything that
//! can change between releases lives in [`VersionRecord`]s keyed by that UUID
//! and a software version tag.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Provenance ──────────────────────────────────────────────────────────────

const MANUAL_TEXT: &str = "Manually created";
const IMPORTED_PREFIX: &str = "Imported from file ";
const VERSION_INFIX: &str = " with version ";

/// How an identity came to exist. Stored as free text in `creation_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
  /// Allocated directly by a caller.
  Manual,
  /// Allocated as a side effect of a bulk import.
  Imported {
    /// Path of the file the row came from, as given to the importer.
    source:           String,
    software_version: String,
  },
  /// Text written by something other than this crate.
  Other { text: String },
}

impl Provenance {
  pub fn imported(source: impl Into<String>, software_version: impl Into<String>) -> Self {
    Self::Imported { source: source.into(), software_version: software_version.into() }
  }

  /// Recover a provenance from stored text. Never fails; unrecognised text is
  /// kept verbatim as [`Provenance::Other`].
  pub fn parse(text: &str) -> Self {
    if text == MANUAL_TEXT {
      return Self::Manual;
    }
    if let Some(rest) = text.strip_prefix(IMPORTED_PREFIX)
      && let Some((source, version)) = rest.rsplit_once(VERSION_INFIX)
    {
      return Self::imported(source, version);
    }
    Self::Other { text: text.to_owned() }
  }
}

impl fmt::Display for Provenance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Manual => f.write_str(MANUAL_TEXT),
      Self::Imported { source, software_version } => {
        write!(f, "{IMPORTED_PREFIX}{source}{VERSION_INFIX}{software_version}")
      }
      Self::Other { text } => f.write_str(text),
    }
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// One row of the `signals` table. Never updated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalIdentity {
  pub uuid:                Uuid,
  /// The name given at allocation time; not refreshed by later versions.
  pub latest_display_name: String,
  pub creation_info:       Provenance,
  pub creation_date:       DateTime<Utc>,
}

// ─── Version records ─────────────────────────────────────────────────────────

/// One row of the `signal_versions` table.
///
/// `values` holds the attribute columns in schema order, excluding the
/// identity reference and the version tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
  pub signal_uuid:      Uuid,
  pub values:           Vec<String>,
  pub software_version: String,
}

impl VersionRecord {
  pub fn new<I, S>(signal_uuid: Uuid, values: I, software_version: impl Into<String>) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      signal_uuid,
      values: values.into_iter().map(Into::into).collect(),
      software_version: software_version.into(),
    }
  }

  /// Every column value in table order, identity first and version last.
  pub fn cells(&self) -> Vec<String> {
    let mut cells = Vec::with_capacity(self.values.len() + 2);
    cells.push(self.signal_uuid.hyphenated().to_string());
    cells.extend(self.values.iter().cloned());
    cells.push(self.software_version.clone());
    cells
  }
}
