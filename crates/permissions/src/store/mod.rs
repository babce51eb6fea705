//! File-backed permission store.
//!
//! # Layout
//!
//! One file per record under the store directory. The default record lives in
//! [`DEFAULT_FILE`]; location records get a generated `perm*` name and carry
//! their location inside the file, so the directory can be rescanned on open.
//!
//! # Invariants
//!
//! - Writes go to a sibling temp file that is synced and renamed over the
//!   target. Temp files left by a crash are skipped on rescan.
//! - The in-memory location map only references files whose write completed.
//! - A record name reserved for a failed write is removed again.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::TempPath;

use crate::error::StorageError;
use crate::record::PermissionRecord;
use crate::{PermissionStore, Result};

/// File holding the default (location-less) record.
pub(crate) const DEFAULT_FILE: &str = ".default";
/// Prefix of in-flight temp files.
pub(crate) const TEMP_PREFIX: &str = ".tmp-perm";
/// Prefix of location record files.
const RECORD_PREFIX: &str = "perm";

/// Permission store keeping one versioned file per record.
#[derive(Debug)]
pub struct FilePermissionStore {
	dir: PathBuf,
	default_path: PathBuf,
	/// location => record file
	files: Mutex<BTreeMap<String, PathBuf>>,
}

impl FilePermissionStore {
	/// Opens (creating if needed) the store rooted at `dir` and indexes its records.
	///
	/// Unreadable or undecodable record files are skipped with a warning.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
		let dir = dir.into();
		std::fs::create_dir_all(&dir).map_err(StorageError::io(&dir))?;
		let files = scan_locations(&dir)?;
		tracing::debug!(dir = %dir.display(), locations = files.len(), "opened permission store");
		Ok(Self {
			default_path: dir.join(DEFAULT_FILE),
			dir,
			files: Mutex::new(files),
		})
	}

	/// Root directory of the store.
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Reserves a fresh, unique record file name.
	///
	/// The reservation is deleted on drop unless kept.
	fn reserve_record_path(&self) -> Result<TempPath> {
		let reserved = tempfile::Builder::new()
			.prefix(RECORD_PREFIX)
			.tempfile_in(&self.dir)
			.map_err(StorageError::io(&self.dir))?;
		Ok(reserved.into_temp_path())
	}

	/// Writes `record` under a newly reserved name, keeping the name only once
	/// the write has landed.
	fn write_new_record(&self, record: &PermissionRecord) -> Result<PathBuf> {
		let reserved = self.reserve_record_path()?;
		self.write_atomic(&reserved, record)?;
		reserved.keep().map_err(|e| StorageError::io(e.path.to_path_buf())(e.error))
	}

	fn write_atomic(&self, target: &Path, record: &PermissionRecord) -> Result<()> {
		let bytes = record.encode()?;
		let mut tmp = tempfile::Builder::new()
			.prefix(TEMP_PREFIX)
			.tempfile_in(&self.dir)
			.map_err(StorageError::io(&self.dir))?;
		tmp.write_all(&bytes).map_err(StorageError::io(tmp.path()))?;
		tmp.as_file().sync_all().map_err(StorageError::io(tmp.path()))?;
		tmp.persist(target).map_err(|e| StorageError::Persist {
			path: target.to_path_buf(),
			source: e.error,
		})?;
		Ok(())
	}
}

impl PermissionStore for FilePermissionStore {
	fn get(&self, location: Option<&str>) -> Result<Option<Vec<String>>> {
		let files = self.files.lock();
		let path = match location {
			None => &self.default_path,
			Some(location) => match files.get(location) {
				Some(path) => path,
				None => return Ok(None),
			},
		};
		Ok(read_record(path)?.map(|record| record.data))
	}

	fn set(&self, location: Option<&str>, data: Option<&[String]>) -> Result<()> {
		let mut files = self.files.lock();
		match (location, data) {
			(None, None) => remove_file(&self.default_path)?,
			(None, Some(data)) => {
				let record = PermissionRecord {
					location: None,
					data: data.to_vec(),
				};
				self.write_atomic(&self.default_path, &record)?;
			}
			(Some(location), None) => {
				if let Some(path) = files.remove(location) {
					remove_file(&path)?;
					tracing::debug!(location, "removed permission data");
				}
			}
			(Some(location), Some(data)) => {
				let record = PermissionRecord {
					location: Some(location.to_string()),
					data: data.to_vec(),
				};
				let path = match files.get(location) {
					Some(path) => {
						self.write_atomic(path, &record)?;
						path.clone()
					}
					None => self.write_new_record(&record)?,
				};
				tracing::debug!(location, path = %path.display(), entries = data.len(), "stored permission data");
				files.insert(location.to_string(), path);
			}
		}
		Ok(())
	}

	fn locations(&self) -> Result<Option<Vec<String>>> {
		let files = self.files.lock();
		if files.is_empty() {
			return Ok(None);
		}
		Ok(Some(files.keys().cloned().collect()))
	}
}

/// Indexes location record files under `dir`.
fn scan_locations(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
	let mut files = BTreeMap::new();
	for entry in std::fs::read_dir(dir).map_err(StorageError::io(dir))? {
		let entry = entry.map_err(StorageError::io(dir))?;
		let name = entry.file_name();
		let Some(name) = name.to_str() else {
			continue;
		};
		if name == DEFAULT_FILE || name.starts_with(TEMP_PREFIX) {
			continue;
		}

		let path = entry.path();
		match read_record(&path) {
			Ok(Some(PermissionRecord {
				location: Some(location),
				..
			})) => {
				files.insert(location, path);
			}
			Ok(_) => {}
			Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable permission record"),
		}
	}
	Ok(files)
}

/// Reads a record, mapping a missing file to `None`.
fn read_record(path: &Path) -> Result<Option<PermissionRecord>> {
	match std::fs::read(path) {
		Ok(bytes) => PermissionRecord::decode(path, &bytes).map(Some),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
		Err(e) => Err(StorageError::io(path)(e)),
	}
}

/// Deletes a file; a missing file is not an error.
fn remove_file(path: &Path) -> Result<()> {
	match std::fs::remove_file(path) {
		Ok(()) => Ok(()),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
		Err(e) => Err(StorageError::io(path)(e)),
	}
}

#[cfg(test)]
mod tests;
