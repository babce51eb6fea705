use serde::{Deserialize, Serialize};

/// Identifier of an extension-point or extension object.
///
/// Assigned by the owning registry; the index only stores and orders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
	/// Returns the raw identifier value.
	#[inline]
	pub const fn as_u32(self) -> u32 {
		self.0
	}
}

impl From<u32> for ElementId {
	fn from(raw: u32) -> Self {
		Self(raw)
	}
}

impl From<ElementId> for u32 {
	fn from(id: ElementId) -> Self {
		id.0
	}
}

impl core::fmt::Display for ElementId {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "#{}", self.0)
	}
}
