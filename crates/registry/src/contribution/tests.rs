use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::namespace::StaticNamespaces;

fn ids(raw: &[u32]) -> Vec<ElementId> {
	raw.iter().copied().map(ElementId).collect()
}

fn resolver() -> Arc<dyn NamespaceResolver> {
	Arc::new(
		StaticNamespaces::new()
			.with_contributor("p1", "org.example")
			.with_owner("org.example", "org.example.host"),
	)
}

fn record(ctx: &Arc<dyn NamespaceResolver>, dynamic: bool, points: &[u32], extensions: &[u32]) -> ContributionRecord {
	ContributionRecord::new("p1", dynamic, PackedIdList::new(ids(points), ids(extensions)), Arc::clone(ctx))
}

#[test]
fn extension_points_then_extensions_merge() {
	let ctx = resolver();
	let mut first = record(&ctx, true, &[10], &[]);
	let second = record(&ctx, true, &[], &[20, 21]);

	first.merge(&second).unwrap();

	assert_eq!(first.extension_point_ids(), ids(&[10]));
	assert_eq!(first.extension_ids(), ids(&[20, 21]));
	assert!(first.is_dynamic());
}

#[rstest]
#[case(false, false, false)]
#[case(false, true, false)]
#[case(true, false, false)]
#[case(true, true, true)]
fn merge_dynamic_flag_is_logical_and(#[case] existing: bool, #[case] added: bool, #[case] expected: bool) {
	let ctx = resolver();
	let mut a = record(&ctx, existing, &[1], &[2]);
	a.merge(&record(&ctx, added, &[3], &[4])).unwrap();
	assert_eq!(a.is_dynamic(), expected);
}

#[test]
fn empty_record_reads_empty() {
	let r = ContributionRecord::empty("p1", false, resolver());
	assert!(r.extension_ids().is_empty());
	assert!(r.extension_point_ids().is_empty());
	assert!(r.children().is_empty());
}

#[test]
fn merging_empty_is_identity_on_content() {
	let ctx = resolver();
	let r = record(&ctx, false, &[1, 2], &[3]);

	let mut left = ContributionRecord::empty("p1", true, Arc::clone(&ctx));
	left.merge(&r).unwrap();
	assert_eq!(*left.children(), *r.children());

	let mut right = r.clone();
	right.merge(&ContributionRecord::empty("p1", true, Arc::clone(&ctx))).unwrap();
	assert_eq!(*right.children(), *r.children());
}

#[test]
fn snapshot_survives_merge() {
	let ctx = resolver();
	let mut r = record(&ctx, true, &[1], &[2]);
	let before = r.children();
	let points_before = r.extension_point_ids();

	r.merge(&record(&ctx, true, &[3], &[4])).unwrap();

	assert_eq!(before.extension_points(), ids(&[1]));
	assert_eq!(before.extensions(), ids(&[2]));
	assert_eq!(points_before, ids(&[1]));
	assert_eq!(r.extension_point_ids(), ids(&[1, 3]));
}

#[test]
fn set_children_replaces_everything() {
	let ctx = resolver();
	let mut r = record(&ctx, true, &[1], &[2]);
	r.set_children(PackedIdList::new(ids(&[9]), ids(&[])));
	assert_eq!(r.extension_point_ids(), ids(&[9]));
	assert!(r.extension_ids().is_empty());
}

#[test]
#[should_panic(expected = "merge across contributors")]
fn merge_across_contributors_panics() {
	let ctx = resolver();
	let mut a = record(&ctx, true, &[], &[]);
	let b = ContributionRecord::empty("p2", true, Arc::clone(&ctx));
	let _ = a.merge(&b);
}

#[test]
#[should_panic(expected = "merge across registries")]
fn merge_across_registries_panics() {
	let mut a = record(&resolver(), true, &[], &[]);
	let b = record(&resolver(), true, &[], &[]);
	let _ = a.merge(&b);
}

#[test]
fn equality_and_key_use_contributor_id_only() {
	let ctx = resolver();
	let a = record(&ctx, true, &[1], &[]);
	let b = record(&ctx, false, &[], &[5, 6]);
	let c = ContributionRecord::empty("p2", true, Arc::clone(&ctx));

	assert_eq!(a, b);
	assert!(a.equals_by_key(&b));
	assert_eq!(a.key_hash(), b.key_hash());
	assert_eq!(a.key(), "p1");
	assert_ne!(a, c);
	assert!(!a.equals_by_key(&c));
}

#[test]
fn namespace_owner_is_resolved_once() {
	let ns = Arc::new(
		StaticNamespaces::new()
			.with_contributor("p1", "org.example")
			.with_owner("org.example", "org.example.host"),
	);
	let ctx: Arc<dyn NamespaceResolver> = ns.clone();
	let r = ContributionRecord::empty("p1", true, ctx);

	assert_eq!(r.cached_namespace_owner_id(), None);
	assert_eq!(r.namespace_owner_id().as_deref(), Some("org.example.host"));
	assert_eq!(r.namespace_owner_id().as_deref(), Some("org.example.host"));
	assert_eq!(ns.owner_lookups(), 1);

	// graph change is not observed by the cached value
	ns.set_owner("org.example", "org.example.other");
	assert_eq!(r.namespace_owner_id().as_deref(), Some("org.example.host"));
	assert_eq!(ns.owner_lookups(), 1);
}

#[test]
fn unresolved_namespace_owner_is_retried() {
	let ns = Arc::new(StaticNamespaces::new().with_contributor("p1", "org.example"));
	let ctx: Arc<dyn NamespaceResolver> = ns.clone();
	let r = ContributionRecord::empty("p1", true, ctx);

	assert_eq!(r.namespace_owner_id(), None);
	assert_eq!(r.cached_namespace_owner_id(), None);

	ns.set_owner("org.example", "org.example.host");
	assert_eq!(r.namespace_owner_id().as_deref(), Some("org.example.host"));
	assert_eq!(ns.owner_lookups(), 2);
}

#[test]
fn namespace_is_resolved_each_call() {
	let ns = Arc::new(StaticNamespaces::new().with_contributor("p1", "first"));
	let ctx: Arc<dyn NamespaceResolver> = ns.clone();
	let r = ContributionRecord::empty("p1", true, ctx);

	assert_eq!(r.namespace().as_deref(), Some("first"));
	ns.set_contributor("p1", "second");
	assert_eq!(r.namespace().as_deref(), Some("second"));
}

#[test]
fn display_names_contributor_and_namespace() {
	let ctx = resolver();
	assert_eq!(
		record(&ctx, true, &[], &[]).to_string(),
		"Contribution: p1 in namespace org.example"
	);
	assert_eq!(
		ContributionRecord::empty("ghost", true, ctx).to_string(),
		"Contribution: ghost in namespace <none>"
	);
}

fn arb_run() -> impl Strategy<Value = Vec<u32>> {
	prop::collection::vec(any::<u32>(), 0..16)
}

proptest! {
	/// Merged runs are the concatenation of the inputs' runs.
	#[test]
	fn prop_merge_concatenates(
		ap in arb_run(), ae in arb_run(), bp in arb_run(), be in arb_run(),
		ad in any::<bool>(), bd in any::<bool>()
	) {
		let ctx = resolver();
		let mut a = record(&ctx, ad, &ap, &ae);
		let b = record(&ctx, bd, &bp, &be);
		a.merge(&b).unwrap();

		let expected_points: Vec<u32> = ap.iter().chain(&bp).copied().collect();
		let expected_extensions: Vec<u32> = ae.iter().chain(&be).copied().collect();
		prop_assert_eq!(a.extension_point_ids(), ids(&expected_points));
		prop_assert_eq!(a.extension_ids(), ids(&expected_extensions));
		prop_assert_eq!(a.is_dynamic(), ad && bd);
	}

	/// `merge(merge(a, b), c)` and `merge(a, merge(b, c))` flatten identically.
	#[test]
	fn prop_merge_is_associative(
		runs in prop::collection::vec((arb_run(), arb_run(), any::<bool>()), 3)
	) {
		let ctx = resolver();
		let make = |i: usize| record(&ctx, runs[i].2, &runs[i].0, &runs[i].1);

		let mut left = make(0);
		left.merge(&make(1)).unwrap();
		left.merge(&make(2)).unwrap();

		let mut tail = make(1);
		tail.merge(&make(2)).unwrap();
		let mut right = make(0);
		right.merge(&tail).unwrap();

		prop_assert_eq!(left.extension_point_ids(), right.extension_point_ids());
		prop_assert_eq!(left.extension_ids(), right.extension_ids());
		prop_assert_eq!(left.is_dynamic(), right.is_dynamic());
	}

	/// Reading back a freshly built record yields the input runs.
	#[test]
	fn prop_construction_round_trip(points in arb_run(), extensions in arb_run()) {
		let r = record(&resolver(), false, &points, &extensions);
		prop_assert_eq!(r.extension_point_ids(), ids(&points));
		prop_assert_eq!(r.extension_ids(), ids(&extensions));
		prop_assert_eq!(r.children().raw_len(), 2 + points.len() + extensions.len());
	}
}
