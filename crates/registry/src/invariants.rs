#![allow(dead_code)]

use std::sync::Arc;

use crate::{
	ContributionRecord, ContributionRegistry, ElementId, NamespaceResolver, PackedIdList, RegistryConfig,
	StaticNamespaces,
};

fn ids(raw: &[u32]) -> Vec<ElementId> {
	raw.iter().copied().map(ElementId).collect()
}

fn context() -> Arc<dyn NamespaceResolver> {
	Arc::new(StaticNamespaces::new())
}

/// Invariant: the raw encoding is two count words followed by both runs.
pub(crate) fn inv_raw_length_law() {
	for (points, extensions) in [(&[][..], &[][..]), (&[1][..], &[][..]), (&[1, 2][..], &[3, 4, 5][..])] {
		let list = PackedIdList::new(ids(points), ids(extensions));
		let raw = list.to_raw().unwrap();

		assert_eq!(raw.len(), 2 + points.len() + extensions.len());
		assert_eq!(raw.len(), list.raw_len());
		assert_eq!(raw[0] as usize, list.extension_point_count());
		assert_eq!(raw[1] as usize, list.extension_count());
		assert_eq!(PackedIdList::from_raw(&raw).unwrap(), list);
	}
}

#[cfg_attr(test, test)]
pub(crate) fn test_raw_length_law() {
	inv_raw_length_law()
}

/// Invariant: merging concatenates each run with existing items first.
pub(crate) fn inv_merge_concatenation() {
	let ctx = context();
	let mut existing = ContributionRecord::new("c", true, PackedIdList::new(ids(&[1, 2]), ids(&[10])), Arc::clone(&ctx));
	let added = ContributionRecord::new("c", true, PackedIdList::new(ids(&[3]), ids(&[11, 12])), ctx);

	existing.merge(&added).unwrap();

	assert_eq!(existing.extension_point_ids(), ids(&[1, 2, 3]));
	assert_eq!(existing.extension_ids(), ids(&[10, 11, 12]));
	assert_eq!(existing.children().raw_len(), 2 + 3 + 3);
}

#[cfg_attr(test, test)]
pub(crate) fn test_merge_concatenation() {
	inv_merge_concatenation()
}

/// Invariant: a children snapshot taken before a merge never observes it.
///
/// Readers holding a snapshot across a writer's merge keep the old runs.
pub(crate) fn inv_snapshot_isolation_across_merge() {
	let ctx = context();
	let mut record = ContributionRecord::new("c", true, PackedIdList::new(ids(&[1]), ids(&[2])), Arc::clone(&ctx));
	let snapshot = record.children();
	let copied = record.extension_ids();

	record
		.merge(&ContributionRecord::new("c", true, PackedIdList::new(ids(&[3]), ids(&[4])), ctx))
		.unwrap();

	assert!(!Arc::ptr_eq(&snapshot, &record.children()));
	assert_eq!(snapshot.extension_points(), ids(&[1]));
	assert_eq!(snapshot.extensions(), ids(&[2]));
	assert_eq!(copied, ids(&[2]));
}

#[cfg_attr(test, test)]
pub(crate) fn test_snapshot_isolation_across_merge() {
	inv_snapshot_isolation_across_merge()
}

/// Invariant: two registrations under one contributor id leave one entry.
pub(crate) fn inv_single_entry_per_contributor() {
	let registry = ContributionRegistry::new(&RegistryConfig::default(), context());
	registry
		.contribute("p1", true, PackedIdList::new(ids(&[10]), ids(&[])))
		.unwrap();
	registry
		.contribute("p1", true, PackedIdList::new(ids(&[]), ids(&[20, 21])))
		.unwrap();

	assert_eq!(registry.len(), 1);
	assert_eq!(registry.contributor_ids(), vec!["p1".to_string()]);
	let snap = registry.get("p1").unwrap();
	assert_eq!(snap.children.extension_points(), ids(&[10]));
	assert_eq!(snap.children.extensions(), ids(&[20, 21]));
	assert!(snap.is_dynamic);
}

#[cfg_attr(test, test)]
pub(crate) fn test_single_entry_per_contributor() {
	inv_single_entry_per_contributor()
}
