//! The `SignalStore` trait.
//!
//! Implemented by storage backends (e.g. `tidy-store-sqlite`). Import and
//! export layers depend on this abstraction for the table operations and add
//! file handling on top.

use uuid::Uuid;

use crate::{
  schema::VersionSchema,
  signal::{Provenance, SignalIdentity, VersionRecord},
};

/// Abstraction over a signal registry backend.
///
/// Identities are insert-only and version records are append-only; there are
/// no update or delete operations. Each method is its own unit of work: no
/// transaction spans two calls.
pub trait SignalStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The column layout used for every version-table statement.
  fn schema(&self) -> &VersionSchema;

  /// Create both tables if they do not exist yet. Safe to call repeatedly.
  fn initialize(&self) -> Result<(), Self::Error>;

  // ── Identities ────────────────────────────────────────────────────────

  /// Persist a fresh identity with a random UUID and the current time.
  fn allocate_identity(
    &self,
    display_name: &str,
    provenance: Provenance,
  ) -> Result<SignalIdentity, Self::Error>;

  /// Retrieve an identity by UUID. Returns `None` if not found.
  fn get_identity(&self, uuid: Uuid) -> Result<Option<SignalIdentity>, Self::Error>;

  /// All identities in allocation order.
  fn list_identities(&self) -> Result<Vec<SignalIdentity>, Self::Error>;

  /// The most recently allocated identity whose display name equals `name`.
  ///
  /// Names are neither unique nor kept current, so this is best-effort.
  fn find_identity_by_display_name(&self, name: &str) -> Result<Option<Uuid>, Self::Error>;

  // ── Version records ───────────────────────────────────────────────────

  /// Append one version record. Fails if `record.values` does not match the
  /// schema's attribute count.
  fn append_version(&self, record: &VersionRecord) -> Result<(), Self::Error>;

  /// Version records joined against their identities, in insertion order.
  /// `software_version = None` returns every version.
  fn version_rows(&self, software_version: Option<&str>)
  -> Result<Vec<VersionRecord>, Self::Error>;

  /// Distinct version tags in the order they first appeared.
  fn list_software_versions(&self) -> Result<Vec<String>, Self::Error>;
}
