/// Failures building or combining identifier lists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChildrenError {
	/// Raw buffer is too short to hold the two count words.
	#[error("raw children truncated: {len} words, need at least 2")]
	Truncated { len: usize },
	/// Raw buffer length disagrees with its declared counts.
	#[error("raw children length mismatch: points={points} extensions={extensions} payload={payload}")]
	LengthMismatch {
		points: u32,
		extensions: u32,
		payload: usize,
	},
	/// A run would exceed the `u32` count range.
	#[error("{run} count overflow: {len} identifiers")]
	CountOverflow { run: &'static str, len: usize },
}

/// Registry-level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("children error: {0}")]
	Children(#[from] ChildrenError),

	/// The record was built against another registry's resolver.
	#[error("contribution {contributor:?} belongs to a different registry")]
	ForeignContext { contributor: String },
}
