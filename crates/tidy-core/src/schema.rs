//! Column layout of the `signal_versions` table.
//!
//! A [`VersionSchema`] is an immutable, validated list of column descriptors.
//! The first column is always the identity reference and the last is always the
//! software version tag; attribute columns sit between them in caller order.
//! Reconfiguration goes through [`SchemaBuilder`], which produces a new schema
//! and leaves the old one untouched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of column zero, the reference to `signals(uuid)`.
pub const IDENTITY_COLUMN: &str = "signal_uuid";

/// Name of the trailing software version column.
pub const VERSION_COLUMN: &str = "software_version";

/// Attribute columns used when the caller does not configure any.
pub const DEFAULT_ATTRIBUTES: [&str; 4] = ["signal_name", "unit", "default_value", "size"];

/// SQLite's names for the implicit row key; a column by one of these names
/// would shadow insertion order.
const RESERVED: [&str; 3] = ["rowid", "oid", "_rowid_"];

// ─── Descriptors ─────────────────────────────────────────────────────────────

/// The role a column plays in a version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
  IdentityRef,
  Attribute,
  SoftwareVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
  pub name: String,
  pub kind: ColumnKind,
}

impl ColumnDescriptor {
  /// The column name wrapped in double quotes, safe to splice into SQL once
  /// the name has passed [`is_identifier`].
  pub fn quoted(&self) -> String { format!("\"{}\"", self.name) }
}

/// Returns `true` if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// Built only through [`SchemaBuilder`] or [`Default`], so the positional
/// invariants always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSchema {
  columns: Vec<ColumnDescriptor>,
}

impl VersionSchema {
  /// Start a new column list containing only the identity reference.
  pub fn builder() -> SchemaBuilder { SchemaBuilder::reset() }

  /// Build a schema from attribute names, adding the fixed first and last
  /// columns around them.
  pub fn with_attributes<I, S>(attributes: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    attributes
      .into_iter()
      .fold(SchemaBuilder::reset(), SchemaBuilder::add_column)
      .add_column(VERSION_COLUMN)
      .build()
  }

  pub fn columns(&self) -> &[ColumnDescriptor] { &self.columns }

  pub fn column_names(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|c| c.name.as_str())
  }

  /// Columns between the identity reference and the version tag.
  pub fn attributes(&self) -> &[ColumnDescriptor] {
    &self.columns[1..self.columns.len() - 1]
  }

  pub fn attribute_count(&self) -> usize { self.columns.len() - 2 }

  /// Fail unless `actual` attribute values fit this layout exactly.
  pub fn check_arity(&self, actual: usize) -> Result<()> {
    let expected = self.attribute_count();
    if actual != expected {
      return Err(Error::Arity { expected, actual });
    }
    Ok(())
  }
}

impl Default for VersionSchema {
  fn default() -> Self {
    let mut columns = Vec::with_capacity(DEFAULT_ATTRIBUTES.len() + 2);
    columns.push(ColumnDescriptor {
      name: IDENTITY_COLUMN.to_owned(),
      kind: ColumnKind::IdentityRef,
    });
    columns.extend(DEFAULT_ATTRIBUTES.iter().map(|name| ColumnDescriptor {
      name: (*name).to_owned(),
      kind: ColumnKind::Attribute,
    }));
    columns.push(ColumnDescriptor {
      name: VERSION_COLUMN.to_owned(),
      kind: ColumnKind::SoftwareVersion,
    });
    Self { columns }
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Accumulates column names; the caller appends [`VERSION_COLUMN`] last.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
  names: Vec<String>,
}

impl SchemaBuilder {
  /// A column list holding only the identity reference.
  pub fn reset() -> Self { Self { names: vec![IDENTITY_COLUMN.to_owned()] } }

  pub fn add_column(mut self, name: impl Into<String>) -> Self {
    self.names.push(name.into());
    self
  }

  /// Validate the accumulated names and freeze them into a schema.
  pub fn build(self) -> Result<VersionSchema> {
    let mut seen = HashSet::new();
    for name in &self.names {
      if !is_identifier(name) {
        return Err(Error::InvalidIdentifier(name.clone()));
      }
      let folded = name.to_ascii_lowercase();
      if RESERVED.contains(&folded.as_str()) {
        return Err(Error::ReservedColumn(name.clone()));
      }
      if !seen.insert(folded) {
        return Err(Error::DuplicateColumn(name.clone()));
      }
    }

    let last = self.names.len() - 1;
    if last == 0 || self.names[last] != VERSION_COLUMN {
      return Err(Error::MissingVersionColumn {
        expected: VERSION_COLUMN,
        found:    (last > 0).then(|| self.names[last].clone()),
      });
    }

    let columns = self
      .names
      .into_iter()
      .enumerate()
      .map(|(i, name)| {
        let kind = match i {
          0 => ColumnKind::IdentityRef,
          i if i == last => ColumnKind::SoftwareVersion,
          _ => ColumnKind::Attribute,
        };
        ColumnDescriptor { name, kind }
      })
      .collect();

    Ok(VersionSchema { columns })
  }
}
