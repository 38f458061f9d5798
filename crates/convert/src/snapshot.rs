//! Immutable registry snapshots.
//!
//! # Role
//!
//! Pure data views of the converters registered at one instant. A write never
//! mutates a published snapshot; it builds a successor with `with_*` and the
//! registry swaps the reference.
//!
//! # Invariants
//!
//! - Buckets and lists preserve insertion order; selection relies on it for
//!   first-registered tie-breaking.
//! - A typed successor copies only the bucket for the inserted pair; every other
//!   bucket is shared with the predecessor by `Arc`.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::converter::TypedConverter;
use crate::types::TypeKey;

/// Exact `(from, to)` key of a typed converter bucket.
pub type TypePair = (TypeKey, TypeKey);

/// Snapshot of the typed registry: one insertion-ordered bucket per type pair.
pub struct TypedSnapshot {
	pub(crate) buckets: FxHashMap<TypePair, Arc<[Arc<dyn TypedConverter>]>>,
	pub(crate) len: usize,
}

impl TypedSnapshot {
	pub fn empty() -> Self {
		Self {
			buckets: FxHashMap::default(),
			len: 0,
		}
	}

	/// Candidates registered for exactly `pair`, in registration order.
	#[inline]
	pub fn bucket(&self, pair: &TypePair) -> &[Arc<dyn TypedConverter>] {
		self.buckets.get(pair).map_or(&[], |b| &b[..])
	}

	/// Shared handle to the bucket for `pair`, used to check structural sharing.
	pub fn bucket_arc(&self, pair: &TypePair) -> Option<Arc<[Arc<dyn TypedConverter>]>> {
		self.buckets.get(pair).cloned()
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn pairs(&self) -> impl Iterator<Item = &TypePair> {
		self.buckets.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TypedConverter>> {
		self.buckets.values().flat_map(|b| b.iter())
	}

	/// Builds the successor snapshot containing `converter` appended to its bucket.
	pub(crate) fn with_converter(&self, converter: Arc<dyn TypedConverter>) -> Self {
		let pair = (converter.from_type(), converter.to_type());
		let mut buckets = self.buckets.clone();
		let bucket: Arc<[Arc<dyn TypedConverter>]> = match self.buckets.get(&pair) {
			Some(old) => old.iter().cloned().chain(std::iter::once(converter)).collect(),
			None => Arc::from([converter]),
		};
		buckets.insert(pair, bucket);
		Self {
			buckets,
			len: self.len + 1,
		}
	}
}

impl Default for TypedSnapshot {
	fn default() -> Self {
		Self::empty()
	}
}

/// Snapshot of a flat registry (fallback or set-method), in registration order.
pub struct ListSnapshot<C: ?Sized> {
	pub(crate) items: Arc<[Arc<C>]>,
}

impl<C: ?Sized> ListSnapshot<C> {
	pub fn empty() -> Self {
		Self { items: Arc::from([]) }
	}

	#[inline]
	pub fn as_slice(&self) -> &[Arc<C>] {
		&self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub(crate) fn with_converter(&self, converter: Arc<C>) -> Self {
		Self {
			items: self.items.iter().cloned().chain(std::iter::once(converter)).collect(),
		}
	}
}

impl<C: ?Sized> Clone for ListSnapshot<C> {
	fn clone(&self) -> Self {
		Self {
			items: self.items.clone(),
		}
	}
}

impl<C: ?Sized> Default for ListSnapshot<C> {
	fn default() -> Self {
		Self::empty()
	}
}
