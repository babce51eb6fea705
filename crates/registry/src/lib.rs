//! Contributor-scoped registry index.
//!
//! Tracks, per contributor, which extension-points and extensions it has
//! registered, and merges partial registrations from one contributor into a
//! single record.
//!
//! # Mental Model
//!
//! 1. **Children:** [`PackedIdList`] holds the two identifier runs of a
//!    contribution (extension-points first, then extensions).
//! 2. **Records:** [`ContributionRecord`] binds a list to a contributor id, a
//!    dynamic flag and the owning registry's [`NamespaceResolver`].
//! 3. **Index:** [`KeyedIndex`] stores any [`KeyedElement`] by key; records
//!    are keyed by contributor id.
//! 4. **Registry:** [`ContributionRegistry`] owns one index and applies the
//!    merge-on-conflict policy as contributors are installed and removed.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`ElementId`] | Identifier of an extension-point or extension object. |
//! | [`PackedIdList`] | Two ordered identifier runs with a single empty shape. |
//! | [`ContributionRecord`] | Per-contributor bookkeeping with merge. |
//! | [`KeyedIndex`] | Hash-keyed set of keyed elements. |
//! | [`ContributionRegistry`] | Owning registry with writer serialization. |
//! | [`RegistryConfig`] | TOML-backed index configuration. |
//!
//! # Invariants
//!
//! - Raw length law: `to_raw().len() == 2 + points + extensions`.
//!   - Enforced in: [`PackedIdList::to_raw`], [`PackedIdList::from_raw`].
//!   - Tested by: `invariants::test_raw_length_law`
//! - Merge concatenates each run, existing items first.
//!   - Enforced in: [`PackedIdList::concat`].
//!   - Tested by: `invariants::test_merge_concatenation`
//! - Snapshots returned before a merge never observe it.
//!   - Enforced in: [`ContributionRecord::merge`] (swaps a fresh `Arc`).
//!   - Tested by: `invariants::test_snapshot_isolation_across_merge`
//! - One logical entry per contributor id.
//!   - Enforced in: [`ContributionRegistry::add_contribution`].
//!   - Tested by: `invariants::test_single_entry_per_contributor`

mod children;
mod config;
mod contribution;
mod error;
mod ids;
mod keyed;
mod namespace;
mod registry;

#[cfg(any(test, doc))]
pub(crate) mod invariants;

pub use children::PackedIdList;
pub use config::{ConfigError, ConflictPolicy, IndexConfig, RegistryConfig};
pub use contribution::ContributionRecord;
pub use error::{ChildrenError, RegistryError};
pub use ids::ElementId;
pub use keyed::{KeyedElement, KeyedElementExt, KeyedIndex, hash_key};
pub use namespace::{NamespaceResolver, StaticNamespaces};
pub use registry::{AddOutcome, ContributionRegistry, ContributionSnapshot, RemovedContribution};
