//! Per-contributor bookkeeping.
//!
//! # Role
//!
//! A [`ContributionRecord`] tracks, for one contributor, the extension-points
//! and extensions it registered. It is mainly consulted on removal so the
//! owning registry can find everything the contributor brought in.
//!
//! # Invariants
//!
//! - `contributor_id` never changes; equality and hashing use it alone.
//! - `children` is replaced wholesale. A snapshot returned by
//!   [`ContributionRecord::children`] never observes a later merge.
//! - The namespace owner id is resolved at most once per record. Later graph
//!   changes are not picked up; replacing the record is the only way to
//!   refresh it. Startup paths ask for it many times per contributor while
//!   the graph is stable.

use std::sync::{Arc, OnceLock};

use crate::children::PackedIdList;
use crate::error::ChildrenError;
use crate::ids::ElementId;
use crate::keyed::{KeyedElement, KeyedElementExt};
use crate::namespace::NamespaceResolver;

/// Extension-points and extensions registered by one contributor.
#[derive(Clone)]
pub struct ContributionRecord {
	contributor_id: Box<str>,
	/// One-shot cache; empty until a resolution succeeds.
	namespace_owner_id: OnceLock<String>,
	is_dynamic: bool,
	children: Arc<PackedIdList>,
	/// Owning registry context; shared by every record the registry builds.
	resolver: Arc<dyn NamespaceResolver>,
}

impl ContributionRecord {
	/// Creates a record for `contributor_id` holding `children`.
	pub fn new(
		contributor_id: impl Into<Box<str>>,
		is_dynamic: bool,
		children: PackedIdList,
		resolver: Arc<dyn NamespaceResolver>,
	) -> Self {
		Self {
			contributor_id: contributor_id.into(),
			namespace_owner_id: OnceLock::new(),
			is_dynamic,
			children: Arc::new(children),
			resolver,
		}
	}

	/// Creates a record with no children.
	pub fn empty(contributor_id: impl Into<Box<str>>, is_dynamic: bool, resolver: Arc<dyn NamespaceResolver>) -> Self {
		Self::new(contributor_id, is_dynamic, PackedIdList::empty(), resolver)
	}

	pub fn contributor_id(&self) -> &str {
		&self.contributor_id
	}

	/// Returns true if the contribution can be withdrawn without a registry reload.
	pub fn is_dynamic(&self) -> bool {
		self.is_dynamic
	}

	/// Appends `other`'s children after this record's, run by run.
	///
	/// The result is dynamic only if both inputs are. On error the record is
	/// left unchanged.
	///
	/// # Panics
	///
	/// Panics if `other` belongs to a different contributor or a different
	/// registry. Callers must never merge across either boundary.
	pub fn merge(&mut self, other: &ContributionRecord) -> Result<(), ChildrenError> {
		assert_eq!(
			self.contributor_id, other.contributor_id,
			"merge across contributors"
		);
		assert!(self.same_context(other), "merge across registries");

		let merged = self.children.concat(&other.children)?;
		self.is_dynamic = self.is_dynamic && other.is_dynamic;
		self.children = Arc::new(merged);

		tracing::debug!(
			contributor = %self.contributor_id,
			points = self.children.extension_point_count(),
			extensions = self.children.extension_count(),
			dynamic = self.is_dynamic,
			"merged contribution"
		);
		Ok(())
	}

	/// Replaces the children outright.
	pub fn set_children(&mut self, children: PackedIdList) {
		self.children = Arc::new(children);
	}

	/// Returns a snapshot of the current children.
	pub fn children(&self) -> Arc<PackedIdList> {
		Arc::clone(&self.children)
	}

	/// Returns a fresh copy of the extension ids.
	pub fn extension_ids(&self) -> Vec<ElementId> {
		self.children.extensions()
	}

	/// Returns a fresh copy of the extension-point ids.
	pub fn extension_point_ids(&self) -> Vec<ElementId> {
		self.children.extension_points()
	}

	/// Resolves the contributor's namespace. Not cached.
	pub fn namespace(&self) -> Option<String> {
		self.resolver.namespace(&self.contributor_id)
	}

	/// Returns the id of the namespace owner, resolving it on first success.
	///
	/// Unknown contributors yield `None` and leave the cache empty, so a later
	/// call resolves again.
	pub fn namespace_owner_id(&self) -> Option<String> {
		if let Some(cached) = self.namespace_owner_id.get() {
			return Some(cached.clone());
		}
		let resolved = self.resolver.namespace_owner_id(&self.contributor_id)?;
		tracing::trace!(contributor = %self.contributor_id, owner = %resolved, "cached namespace owner");
		Some(self.namespace_owner_id.get_or_init(|| resolved).clone())
	}

	/// Returns the cached namespace owner id without resolving.
	pub fn cached_namespace_owner_id(&self) -> Option<&str> {
		self.namespace_owner_id.get().map(String::as_str)
	}

	/// Returns true if both records were built by the same registry.
	pub fn same_context(&self, other: &ContributionRecord) -> bool {
		self.uses_resolver(&other.resolver)
	}

	pub(crate) fn uses_resolver(&self, resolver: &Arc<dyn NamespaceResolver>) -> bool {
		Arc::ptr_eq(&self.resolver, resolver)
	}
}

impl KeyedElement for ContributionRecord {
	type Key = str;

	fn key(&self) -> &str {
		&self.contributor_id
	}
}

impl PartialEq for ContributionRecord {
	fn eq(&self, other: &Self) -> bool {
		self.equals_by_key(other)
	}
}

impl Eq for ContributionRecord {}

impl std::hash::Hash for ContributionRecord {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.contributor_id.hash(state);
	}
}

impl core::fmt::Debug for ContributionRecord {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ContributionRecord")
			.field("contributor_id", &self.contributor_id)
			.field("is_dynamic", &self.is_dynamic)
			.field("children", &self.children)
			.field("namespace_owner_id", &self.namespace_owner_id.get())
			.finish_non_exhaustive()
	}
}

impl core::fmt::Display for ContributionRecord {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self.namespace() {
			Some(ns) => write!(f, "Contribution: {} in namespace {}", self.contributor_id, ns),
			None => write!(f, "Contribution: {} in namespace <none>", self.contributor_id),
		}
	}
}

#[cfg(test)]
mod tests;
