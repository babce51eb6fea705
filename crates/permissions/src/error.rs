use std::path::PathBuf;

/// Permission storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("permission storage I/O failed at {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to decode permission record {}: {source}", .path.display())]
	Decode {
		path: PathBuf,
		#[source]
		source: postcard::Error,
	},
	#[error("failed to encode permission record: {0}")]
	Encode(#[source] postcard::Error),
	#[error("unsupported permission data version {version} in {}", .path.display())]
	UnsupportedVersion { path: PathBuf, version: u32 },
	#[error("failed to replace permission record {}: {source}", .path.display())]
	Persist {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl StorageError {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |source| Self::Io { path, source }
	}
}
