//! On-disk permission record format.
//!
//! A record file is a postcard-encoded `u32` version followed by the body
//! for that version. Only version 1 exists.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Current permission data format version.
pub const PERMISSION_DATA_VERSION: u32 = 1;

/// Version 1 record body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PermissionRecord {
	/// `None` for the default record.
	pub location: Option<String>,
	pub data: Vec<String>,
}

impl PermissionRecord {
	pub(crate) fn encode(&self) -> Result<Vec<u8>, StorageError> {
		postcard::to_allocvec(&(PERMISSION_DATA_VERSION, self)).map_err(StorageError::Encode)
	}

	pub(crate) fn decode(path: &Path, bytes: &[u8]) -> Result<Self, StorageError> {
		let decode_err = |source| StorageError::Decode {
			path: path.to_path_buf(),
			source,
		};
		let (version, body) = postcard::take_from_bytes::<u32>(bytes).map_err(decode_err)?;
		match version {
			PERMISSION_DATA_VERSION => postcard::from_bytes(body).map_err(decode_err),
			version => Err(StorageError::UnsupportedVersion {
				path: path.to_path_buf(),
				version,
			}),
		}
	}
}
