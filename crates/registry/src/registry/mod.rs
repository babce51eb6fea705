//! Owning registry for contribution records.
//!
//! # Role
//!
//! [`ContributionRegistry`] keeps one [`KeyedIndex`] of [`ContributionRecord`]s
//! keyed by contributor id. Installs add or merge records, uninstalls remove
//! them and hand back the identifiers that need cascading cleanup.
//!
//! # Concurrency
//!
//! - **Writes:** serialized by one `RwLock`; a merge completes before the lock is released.
//! - **Reads:** return owned copies or `Arc` snapshots, never references into the index.
//!
//! # Invariants
//!
//! - One logical record per contributor id (see `invariants::test_single_entry_per_contributor`).
//! - Every indexed record shares this registry's resolver.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::children::PackedIdList;
use crate::config::{ConflictPolicy, IndexConfig, RegistryConfig};
use crate::contribution::ContributionRecord;
use crate::error::RegistryError;
use crate::ids::ElementId;
use crate::keyed::KeyedIndex;
use crate::namespace::NamespaceResolver;

/// Result of [`ContributionRegistry::add_contribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
	/// No record existed for the contributor.
	Inserted,
	/// Children were appended to the existing record.
	Merged,
	/// The existing record was dropped in favour of the new one.
	Replaced,
}

/// Identifiers released by [`ContributionRegistry::remove_contribution`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedContribution {
	pub contributor_id: String,
	pub extension_points: Vec<ElementId>,
	pub extensions: Vec<ElementId>,
	pub is_dynamic: bool,
}

/// Owned view of a record at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionSnapshot {
	pub contributor_id: String,
	pub is_dynamic: bool,
	pub children: Arc<PackedIdList>,
}

impl ContributionSnapshot {
	fn of(record: &ContributionRecord) -> Self {
		Self {
			contributor_id: record.contributor_id().to_owned(),
			is_dynamic: record.is_dynamic(),
			children: record.children(),
		}
	}
}

/// Registry of per-contributor records.
pub struct ContributionRegistry {
	config: IndexConfig,
	resolver: Arc<dyn NamespaceResolver>,
	contributions: RwLock<KeyedIndex<ContributionRecord>>,
}

impl ContributionRegistry {
	/// Creates an empty registry resolving namespaces through `resolver`.
	pub fn new(config: &RegistryConfig, resolver: Arc<dyn NamespaceResolver>) -> Self {
		Self {
			config: config.index.clone(),
			resolver,
			contributions: RwLock::new(KeyedIndex::with_capacity(config.index.initial_capacity)),
		}
	}

	pub fn resolver(&self) -> &Arc<dyn NamespaceResolver> {
		&self.resolver
	}

	pub fn conflict_policy(&self) -> ConflictPolicy {
		self.config.conflict
	}

	/// Builds a record bound to this registry.
	pub fn record(
		&self,
		contributor_id: impl Into<Box<str>>,
		is_dynamic: bool,
		children: PackedIdList,
	) -> ContributionRecord {
		ContributionRecord::new(contributor_id, is_dynamic, children, Arc::clone(&self.resolver))
	}

	/// Adds `record`, resolving an existing record per the conflict policy.
	pub fn add_contribution(&self, record: ContributionRecord) -> Result<AddOutcome, RegistryError> {
		let contributor = record.contributor_id().to_owned();
		if !record.uses_resolver(&self.resolver) {
			return Err(RegistryError::ForeignContext { contributor });
		}

		let mut index = self.contributions.write();
		let outcome = match self.config.conflict {
			ConflictPolicy::Merge => match index.get_mut(&contributor) {
				Some(existing) => {
					existing.merge(&record)?;
					AddOutcome::Merged
				}
				None => {
					index.insert(record);
					AddOutcome::Inserted
				}
			},
			ConflictPolicy::Replace => match index.insert(record) {
				Some(_) => AddOutcome::Replaced,
				None => AddOutcome::Inserted,
			},
		};

		tracing::debug!(contributor = %contributor, ?outcome, total = index.len(), "added contribution");
		Ok(outcome)
	}

	/// Convenience for [`Self::record`] followed by [`Self::add_contribution`].
	pub fn contribute(
		&self,
		contributor_id: &str,
		is_dynamic: bool,
		children: PackedIdList,
	) -> Result<AddOutcome, RegistryError> {
		self.add_contribution(self.record(contributor_id, is_dynamic, children))
	}

	/// Removes the contributor's record and returns its identifiers.
	pub fn remove_contribution(&self, contributor_id: &str) -> Option<RemovedContribution> {
		let removed = self.contributions.write().remove_by_key(contributor_id)?;
		let released = RemovedContribution {
			contributor_id: removed.contributor_id().to_owned(),
			extension_points: removed.extension_point_ids(),
			extensions: removed.extension_ids(),
			is_dynamic: removed.is_dynamic(),
		};
		tracing::debug!(
			contributor = %contributor_id,
			points = released.extension_points.len(),
			extensions = released.extensions.len(),
			"removed contribution"
		);
		Some(released)
	}

	/// Replaces the children of an existing record. Returns false if absent.
	pub fn set_children(&self, contributor_id: &str, children: PackedIdList) -> bool {
		match self.contributions.write().get_mut(contributor_id) {
			Some(record) => {
				record.set_children(children);
				true
			}
			None => false,
		}
	}

	pub fn get(&self, contributor_id: &str) -> Option<ContributionSnapshot> {
		self.contributions.read().get(contributor_id).map(ContributionSnapshot::of)
	}

	pub fn contains(&self, contributor_id: &str) -> bool {
		self.contributions.read().contains_key(contributor_id)
	}

	/// Namespace owner of a registered contributor, memoized on its record.
	pub fn namespace_owner_id(&self, contributor_id: &str) -> Option<String> {
		self.contributions
			.read()
			.get(contributor_id)?
			.namespace_owner_id()
	}

	pub fn len(&self) -> usize {
		self.contributions.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.contributions.read().is_empty()
	}

	/// Registered contributor ids, sorted.
	pub fn contributor_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self
			.contributions
			.read()
			.iter()
			.map(|r| r.contributor_id().to_owned())
			.collect();
		ids.sort_unstable();
		ids
	}

	/// Snapshots of every record, sorted by contributor id.
	pub fn snapshots(&self) -> Vec<ContributionSnapshot> {
		let mut all: Vec<ContributionSnapshot> = self
			.contributions
			.read()
			.iter()
			.map(ContributionSnapshot::of)
			.collect();
		all.sort_unstable_by(|a, b| a.contributor_id.cmp(&b.contributor_id));
		all
	}

	/// Raw encodings of non-dynamic records, sorted by contributor id.
	///
	/// Dynamic contributions are rebuilt by their contributors and never cached.
	pub fn persistable(&self) -> Result<Vec<(String, Vec<u32>)>, RegistryError> {
		let mut entries = self
			.contributions
			.read()
			.iter()
			.filter(|r| !r.is_dynamic())
			.map(|r| -> Result<_, RegistryError> {
				Ok((r.contributor_id().to_owned(), r.children().to_raw()?))
			})
			.collect::<Result<Vec<_>, _>>()?;
		entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
		Ok(entries)
	}

	/// Rebuilds static records from [`Self::persistable`] output.
	///
	/// Every entry is decoded before any is applied, so a malformed entry
	/// leaves the registry untouched. Returns the number of entries applied.
	pub fn restore<I, S>(&self, entries: I) -> Result<usize, RegistryError>
	where
		I: IntoIterator<Item = (S, Vec<u32>)>,
		S: Into<Box<str>>,
	{
		let decoded = entries
			.into_iter()
			.map(|(contributor_id, raw)| -> Result<_, RegistryError> {
				Ok((contributor_id, PackedIdList::from_raw(&raw)?))
			})
			.collect::<Result<Vec<_>, _>>()?;

		let applied = decoded.len();
		for (contributor_id, children) in decoded {
			self.add_contribution(self.record(contributor_id, false, children))?;
		}
		tracing::debug!(applied, "restored cached contributions");
		Ok(applied)
	}
}

impl core::fmt::Debug for ContributionRegistry {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ContributionRegistry")
			.field("config", &self.config)
			.field("contributions", &self.len())
			.finish_non_exhaustive()
	}
}
