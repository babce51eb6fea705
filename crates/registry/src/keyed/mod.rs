//! Hash-keyed set of keyed elements.
//!
//! # Role
//!
//! [`KeyedIndex`] stores values that carry their own key. Elements are bucketed
//! by [`KeyedElement::hash_of`] and told apart inside a bucket by
//! [`KeyedElement::key_eq`], so the index never needs a separate key copy.
//!
//! # Invariants
//!
//! - Insertion and lookup by key use the same hash and the same equality, so
//!   an inserted element is always reachable through its own key.
//! - At most one element per key; inserting an equal key replaces.
//! - `len()` equals the number of elements reachable through `iter()`.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;

/// Capability set an element needs to live in a [`KeyedIndex`].
///
/// Hashing and equality are defined on bare keys. [`KeyedElementExt`] derives
/// the element-level `key_hash`/`equals_by_key` from them.
pub trait KeyedElement {
	/// Key type, borrowed from the element.
	type Key: ?Sized + Eq + Hash;

	/// Returns the element's key. Must not change while the element is indexed.
	fn key(&self) -> &Self::Key;

	/// Hashes a bare key. Keys equal under [`Self::key_eq`] must hash equally.
	fn hash_of(key: &Self::Key) -> u64 {
		hash_key(key)
	}

	/// Key equality used for deduplication and lookup.
	fn key_eq(a: &Self::Key, b: &Self::Key) -> bool {
		a == b
	}
}

/// Element-level hash and equality, derived from [`KeyedElement`].
///
/// Blanket-implemented, so the derived forms cannot drift from the key hooks.
pub trait KeyedElementExt: KeyedElement {
	/// Hash of [`KeyedElement::key`].
	fn key_hash(&self) -> u64 {
		Self::hash_of(self.key())
	}

	/// Key equality, independent of any other field.
	fn equals_by_key(&self, other: &Self) -> bool {
		Self::key_eq(self.key(), other.key())
	}
}

impl<E: KeyedElement + ?Sized> KeyedElementExt for E {}

/// Default key hash used by [`KeyedElement::hash_of`].
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> u64 {
	let mut hasher = FxHasher::default();
	key.hash(&mut hasher);
	hasher.finish()
}

type Bucket<E> = SmallVec<[E; 1]>;

/// Hash-keyed set of [`KeyedElement`]s.
pub struct KeyedIndex<E: KeyedElement> {
	buckets: FxHashMap<u64, Bucket<E>>,
	len: usize,
}

impl<E: KeyedElement> KeyedIndex<E> {
	pub fn new() -> Self {
		Self {
			buckets: FxHashMap::default(),
			len: 0,
		}
	}

	/// Creates an index sized for `capacity` elements.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			buckets: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
			len: 0,
		}
	}

	/// Inserts `element`, returning the element it replaced, if any.
	pub fn insert(&mut self, element: E) -> Option<E> {
		let bucket = self.buckets.entry(E::hash_of(element.key())).or_default();
		if let Some(slot) = bucket.iter_mut().find(|e| e.equals_by_key(&element)) {
			return Some(std::mem::replace(slot, element));
		}
		bucket.push(element);
		self.len += 1;
		None
	}

	/// Removes and returns the element stored under `key`.
	pub fn remove_by_key(&mut self, key: &E::Key) -> Option<E> {
		let hash = E::hash_of(key);
		let bucket = self.buckets.get_mut(&hash)?;
		let pos = bucket.iter().position(|e| E::key_eq(e.key(), key))?;
		let removed = bucket.swap_remove(pos);
		if bucket.is_empty() {
			self.buckets.remove(&hash);
		}
		self.len -= 1;
		Some(removed)
	}

	/// Looks up the element stored under `key`.
	pub fn get(&self, key: &E::Key) -> Option<&E> {
		self.buckets
			.get(&E::hash_of(key))?
			.iter()
			.find(|e| E::key_eq(e.key(), key))
	}

	/// Mutable lookup. Callers must not change the element's key.
	pub fn get_mut(&mut self, key: &E::Key) -> Option<&mut E> {
		self.buckets
			.get_mut(&E::hash_of(key))?
			.iter_mut()
			.find(|e| E::key_eq(e.key(), key))
	}

	pub fn contains_key(&self, key: &E::Key) -> bool {
		self.get(key).is_some()
	}

	/// Iterates over all elements in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
		self.buckets.values().flat_map(|bucket| bucket.iter())
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Removes every element.
	pub fn clear(&mut self) {
		self.buckets.clear();
		self.len = 0;
	}
}

impl<E: KeyedElement> Default for KeyedIndex<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: KeyedElement> Extend<E> for KeyedIndex<E> {
	fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
		for element in iter {
			self.insert(element);
		}
	}
}

impl<E: KeyedElement> FromIterator<E> for KeyedIndex<E> {
	fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
		let mut index = Self::new();
		index.extend(iter);
		index
	}
}

impl<E: KeyedElement + core::fmt::Debug> core::fmt::Debug for KeyedIndex<E> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}
