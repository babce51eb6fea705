//! Location-keyed permission data store.
//!
//! Each install location may carry a list of permission strings, plus one
//! process-wide default record addressed by `None`. [`FilePermissionStore`]
//! keeps one versioned file per record and replaces files atomically, so a
//! reader sees either the previous record or the new one, never a mix.

mod error;
mod record;
mod store;

pub use error::StorageError;
pub use record::PERMISSION_DATA_VERSION;
pub use store::FilePermissionStore;

/// Result type for permission storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Permission data keyed by install location.
///
/// A `None` location addresses the default record. Missing records are
/// `Ok(None)`; only storage failures are errors.
pub trait PermissionStore {
	/// Returns the permission data for `location`.
	fn get(&self, location: Option<&str>) -> Result<Option<Vec<String>>>;

	/// Stores `data` for `location`; `None` data deletes the record.
	fn set(&self, location: Option<&str>, data: Option<&[String]>) -> Result<()>;

	/// Returns the locations holding data, or `None` when there are none.
	///
	/// The default record is not a location and never appears here.
	fn locations(&self) -> Result<Option<Vec<String>>>;
}
