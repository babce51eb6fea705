//! Identifier runs owned by a single contribution.
//!
//! # Role
//!
//! [`PackedIdList`] keeps the extension-point ids and the extension ids of a
//! contribution as two explicit runs. The flat cache layout
//! `[n_points, n_extensions, points.., extensions..]` only exists at the
//! [`PackedIdList::to_raw`] / [`PackedIdList::from_raw`] boundary.
//!
//! # Invariants
//!
//! - There is exactly one empty shape: both runs empty. No absent state.
//! - Runs are never mutated after construction; combining lists allocates new runs.

use std::sync::Arc;

use crate::error::ChildrenError;
use crate::ids::ElementId;

/// Index of the extension-point count word in the raw layout.
const EXTENSION_POINT: usize = 0;
/// Index of the extension count word in the raw layout.
const EXTENSION: usize = 1;
/// Number of count words preceding the payload.
const HEADER_LEN: usize = 2;

/// Two ordered identifier runs: extension-points, then extensions.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PackedIdList {
	extension_points: Arc<[ElementId]>,
	extensions: Arc<[ElementId]>,
}

impl PackedIdList {
	/// Builds a list from the two runs, preserving their order.
	pub fn new(
		extension_points: impl IntoIterator<Item = ElementId>,
		extensions: impl IntoIterator<Item = ElementId>,
	) -> Self {
		Self {
			extension_points: extension_points.into_iter().collect(),
			extensions: extensions.into_iter().collect(),
		}
	}

	/// Returns the canonical empty list.
	pub fn empty() -> Self {
		Self {
			extension_points: Arc::from(Vec::new()),
			extensions: Arc::from(Vec::new()),
		}
	}

	/// Returns true when both runs are empty.
	pub fn is_empty(&self) -> bool {
		self.extension_points.is_empty() && self.extensions.is_empty()
	}

	pub fn extension_point_count(&self) -> usize {
		self.extension_points.len()
	}

	pub fn extension_count(&self) -> usize {
		self.extensions.len()
	}

	/// Returns a fresh copy of the extension-point run.
	pub fn extension_points(&self) -> Vec<ElementId> {
		self.extension_points.to_vec()
	}

	/// Returns a fresh copy of the extension run.
	pub fn extensions(&self) -> Vec<ElementId> {
		self.extensions.to_vec()
	}

	/// Length of the raw encoding: two count words plus both runs.
	pub fn raw_len(&self) -> usize {
		HEADER_LEN + self.extension_points.len() + self.extensions.len()
	}

	/// Concatenates `other` after `self`, run by run.
	///
	/// The result holds `self.points ++ other.points` and
	/// `self.extensions ++ other.extensions`. Neither input is touched.
	pub fn concat(&self, other: &PackedIdList) -> Result<PackedIdList, ChildrenError> {
		let points = self.extension_points.len() + other.extension_points.len();
		let extensions = self.extensions.len() + other.extensions.len();
		checked_count("extension point", points)?;
		checked_count("extension", extensions)?;

		let mut merged_points = Vec::with_capacity(points);
		merged_points.extend_from_slice(&self.extension_points);
		merged_points.extend_from_slice(&other.extension_points);

		let mut merged_extensions = Vec::with_capacity(extensions);
		merged_extensions.extend_from_slice(&self.extensions);
		merged_extensions.extend_from_slice(&other.extensions);

		Ok(Self {
			extension_points: Arc::from(merged_points),
			extensions: Arc::from(merged_extensions),
		})
	}

	/// Encodes the list in the flat cache layout.
	pub fn to_raw(&self) -> Result<Vec<u32>, ChildrenError> {
		let mut raw = vec![0; HEADER_LEN];
		raw[EXTENSION_POINT] = checked_count("extension point", self.extension_points.len())?;
		raw[EXTENSION] = checked_count("extension", self.extensions.len())?;
		raw.reserve(self.extension_points.len() + self.extensions.len());
		raw.extend(self.extension_points.iter().map(|id| id.as_u32()));
		raw.extend(self.extensions.iter().map(|id| id.as_u32()));
		Ok(raw)
	}

	/// Decodes a list from the flat cache layout.
	pub fn from_raw(raw: &[u32]) -> Result<Self, ChildrenError> {
		let [points, extensions, payload @ ..] = raw else {
			return Err(ChildrenError::Truncated { len: raw.len() });
		};
		let (points, extensions) = (*points, *extensions);
		let expected = (points as usize).checked_add(extensions as usize);
		if expected != Some(payload.len()) {
			return Err(ChildrenError::LengthMismatch {
				points,
				extensions,
				payload: payload.len(),
			});
		}

		let (point_words, extension_words) = payload.split_at(points as usize);
		Ok(Self {
			extension_points: point_words.iter().copied().map(ElementId).collect(),
			extensions: extension_words.iter().copied().map(ElementId).collect(),
		})
	}
}

impl Default for PackedIdList {
	fn default() -> Self {
		Self::empty()
	}
}

impl core::fmt::Debug for PackedIdList {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("PackedIdList")
			.field("extension_points", &&*self.extension_points)
			.field("extensions", &&*self.extensions)
			.finish()
	}
}

fn checked_count(run: &'static str, len: usize) -> Result<u32, ChildrenError> {
	u32::try_from(len).map_err(|_| ChildrenError::CountOverflow { run, len })
}
