//! Namespace resolution seam.
//!
//! The index never resolves namespaces itself. The owning registry supplies a
//! [`NamespaceResolver`] and every record built by that registry shares it.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Resolves namespace metadata for contributors.
///
/// Both calls are functions of the current contributor graph and may be
/// expensive. `None` means the contributor is unknown to the graph; it is
/// not an error.
pub trait NamespaceResolver: Send + Sync {
	/// Returns the namespace the contributor's extension-points live under.
	fn namespace(&self, contributor_id: &str) -> Option<String>;

	/// Returns the id of the contributor that owns the contributor's namespace.
	fn namespace_owner_id(&self, contributor_id: &str) -> Option<String>;
}

#[derive(Default)]
struct Graph {
	namespaces: FxHashMap<String, String>,
	owners: FxHashMap<String, String>,
}

/// In-memory resolver over a fixed contributor graph.
///
/// Maps contributor ids to namespaces and namespaces to their owning
/// contributor. Counts owner lookups.
#[derive(Default)]
pub struct StaticNamespaces {
	graph: RwLock<Graph>,
	owner_lookups: AtomicUsize,
}

impl StaticNamespaces {
	pub fn new() -> Self {
		Self::default()
	}

	/// Places `contributor_id` under `namespace`.
	pub fn with_contributor(self, contributor_id: impl Into<String>, namespace: impl Into<String>) -> Self {
		self.set_contributor(contributor_id, namespace);
		self
	}

	/// Declares `owner_id` as the owner of `namespace`.
	pub fn with_owner(self, namespace: impl Into<String>, owner_id: impl Into<String>) -> Self {
		self.set_owner(namespace, owner_id);
		self
	}

	pub fn set_contributor(&self, contributor_id: impl Into<String>, namespace: impl Into<String>) {
		self.graph
			.write()
			.namespaces
			.insert(contributor_id.into(), namespace.into());
	}

	pub fn set_owner(&self, namespace: impl Into<String>, owner_id: impl Into<String>) {
		self.graph.write().owners.insert(namespace.into(), owner_id.into());
	}

	/// Number of [`NamespaceResolver::namespace_owner_id`] calls served so far.
	pub fn owner_lookups(&self) -> usize {
		self.owner_lookups.load(Ordering::Relaxed)
	}
}

impl NamespaceResolver for StaticNamespaces {
	fn namespace(&self, contributor_id: &str) -> Option<String> {
		self.graph.read().namespaces.get(contributor_id).cloned()
	}

	fn namespace_owner_id(&self, contributor_id: &str) -> Option<String> {
		self.owner_lookups.fetch_add(1, Ordering::Relaxed);
		let graph = self.graph.read();
		let namespace = graph.namespaces.get(contributor_id)?;
		graph.owners.get(namespace).cloned()
	}
}
