//! Copy-on-write converter registries.
//!
//! # Role
//!
//! A [`ConverterRegistry`] owns one atomically replaceable snapshot reference.
//! Writers are serialized by a mutex and publish a fully built successor with a
//! single store. Readers perform one lock-free load and never block.
//!
//! The registry is generic over a [`RegistryKind`], which names the snapshot
//! layout, the lookup query and the selection rule for one converter kind.
//!
//! # Invariants
//!
//! - A reader observes either the pre-write or the post-write snapshot, never a
//!   partially applied registration (see `tests::concurrent_readers_never_see_torn_snapshot`).
//! - Selection returns the strictly highest affinity above zero; equal scores
//!   resolve to the first registered (see `tests::equal_affinity_first_registered_wins`).
//! - Converters are never removed.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::converter::{ConverterKind, FallbackConverter, SetMethodConverter, TypedConverter};
use crate::snapshot::{ListSnapshot, TypePair, TypedSnapshot};
use crate::types::TypeKey;


/// Snapshot layout and selection rule for one converter kind.
pub trait RegistryKind: Send + Sync + 'static {
	type Converter: ?Sized + Send + Sync + 'static;
	type Snapshot: Default + Send + Sync + 'static;
	type Query: Copy;

	const KIND: ConverterKind;

	/// Builds the successor of `snap` with `converter` appended.
	fn insert(snap: &Self::Snapshot, converter: Arc<Self::Converter>) -> Self::Snapshot;

	fn select(snap: &Self::Snapshot, query: Self::Query) -> Option<Arc<Self::Converter>>;

	fn all(snap: &Self::Snapshot) -> Vec<Arc<Self::Converter>>;

	fn len(snap: &Self::Snapshot) -> usize;
}

/// Returns the first candidate with the strictly highest score above zero.
fn select_best<'a, C: ?Sized>(candidates: &'a [Arc<C>], score: impl Fn(&C) -> i32) -> Option<&'a Arc<C>> {
	let mut best: Option<(&Arc<C>, i32)> = None;
	for candidate in candidates {
		let s = score(&**candidate);
		if s <= 0 {
			continue;
		}
		if best.is_none_or(|(_, top)| s > top) {
			best = Some((candidate, s));
		}
	}
	best.map(|(c, _)| c)
}

/// Exact-pair converters.
pub struct TypedKind;

impl RegistryKind for TypedKind {
	type Converter = dyn TypedConverter;
	type Snapshot = TypedSnapshot;
	type Query = TypePair;

	const KIND: ConverterKind = ConverterKind::Typed;

	fn insert(snap: &TypedSnapshot, converter: Arc<dyn TypedConverter>) -> TypedSnapshot {
		snap.with_converter(converter)
	}

	fn select(snap: &TypedSnapshot, pair: TypePair) -> Option<Arc<dyn TypedConverter>> {
		select_best(snap.bucket(&pair), |c| c.affinity()).cloned()
	}

	fn all(snap: &TypedSnapshot) -> Vec<Arc<dyn TypedConverter>> {
		snap.iter().cloned().collect()
	}

	fn len(snap: &TypedSnapshot) -> usize {
		snap.len()
	}
}

/// Runtime-scored converters.
pub struct FallbackKind;

impl RegistryKind for FallbackKind {
	type Converter = dyn FallbackConverter;
	type Snapshot = ListSnapshot<dyn FallbackConverter>;
	type Query = TypePair;

	const KIND: ConverterKind = ConverterKind::Fallback;

	fn insert(snap: &Self::Snapshot, converter: Arc<dyn FallbackConverter>) -> Self::Snapshot {
		snap.with_converter(converter)
	}

	fn select(snap: &Self::Snapshot, (from, to): TypePair) -> Option<Arc<dyn FallbackConverter>> {
		select_best(snap.as_slice(), |c| c.affinity(from, to)).cloned()
	}

	fn all(snap: &Self::Snapshot) -> Vec<Arc<dyn FallbackConverter>> {
		snap.as_slice().to_vec()
	}

	fn len(snap: &Self::Snapshot) -> usize {
		snap.len()
	}
}

/// Set-method converters; both query types may be unknown.
pub struct SetMethodKind;

impl RegistryKind for SetMethodKind {
	type Converter = dyn SetMethodConverter;
	type Snapshot = ListSnapshot<dyn SetMethodConverter>;
	type Query = (Option<TypeKey>, Option<TypeKey>);

	const KIND: ConverterKind = ConverterKind::SetMethod;

	fn insert(snap: &Self::Snapshot, converter: Arc<dyn SetMethodConverter>) -> Self::Snapshot {
		snap.with_converter(converter)
	}

	fn select(snap: &Self::Snapshot, (from, to): Self::Query) -> Option<Arc<dyn SetMethodConverter>> {
		select_best(snap.as_slice(), |c| c.affinity(from, to)).cloned()
	}

	fn all(snap: &Self::Snapshot) -> Vec<Arc<dyn SetMethodConverter>> {
		snap.as_slice().to_vec()
	}

	fn len(snap: &Self::Snapshot) -> usize {
		snap.len()
	}
}

pub type TypedRegistry = ConverterRegistry<TypedKind>;
pub type FallbackRegistry = ConverterRegistry<FallbackKind>;
pub type SetMethodRegistry = ConverterRegistry<SetMethodKind>;

/// Registry with lock-free reads and mutex-serialized copy-on-write writes.
pub struct ConverterRegistry<K: RegistryKind> {
	/// `None` until the first registration; treated as empty.
	snap: ArcSwapOption<K::Snapshot>,
	write: Mutex<()>,
}

impl<K: RegistryKind> ConverterRegistry<K> {
	pub fn new() -> Self {
		Self {
			snap: ArcSwapOption::empty(),
			write: Mutex::new(()),
		}
	}

	/// Registers a converter and publishes the successor snapshot.
	pub fn register(&self, converter: Arc<K::Converter>) {
		let _write = self.write.lock();
		let cur = self.snap.load_full().unwrap_or_default();
		let next = K::insert(&cur, converter);
		let count = K::len(&next);
		self.snap.store(Some(Arc::new(next)));
		tracing::debug!(registry = K::KIND.as_str(), count, "registered converter");
	}

	/// Registers a batch under one write lock with a single publication.
	pub fn register_many<I>(&self, converters: I)
	where
		I: IntoIterator<Item = Arc<K::Converter>>,
	{
		let _write = self.write.lock();
		let cur = self.snap.load_full().unwrap_or_default();
		let before = K::len(&cur);
		let mut next: Option<K::Snapshot> = None;
		for converter in converters {
			next = Some(K::insert(next.as_ref().unwrap_or(&*cur), converter));
		}
		let Some(next) = next else {
			return;
		};
		let count = K::len(&next);
		self.snap.store(Some(Arc::new(next)));
		tracing::debug!(
			registry = K::KIND.as_str(),
			added = count - before,
			count,
			"registered converters"
		);
	}

	/// Returns the best converter for `query`, or `None` on a resolution miss.
	#[inline]
	pub fn try_get_converter(&self, query: K::Query) -> Option<Arc<K::Converter>> {
		let snap = self.snap.load();
		K::select(snap.as_deref()?, query)
	}

	/// Point-in-time copy of every registered converter.
	pub fn get_all_converters(&self) -> Vec<Arc<K::Converter>> {
		match self.snap.load().as_deref() {
			Some(snap) => K::all(snap),
			None => Vec::new(),
		}
	}

	/// Pins the current snapshot for repeated lookups against one view.
	pub fn snapshot(&self) -> Arc<K::Snapshot> {
		self.snap.load_full().unwrap_or_default()
	}

	/// Returns false until the first registration.
	pub fn is_initialized(&self) -> bool {
		self.snap.load().is_some()
	}

	pub fn len(&self) -> usize {
		self.snap.load().as_deref().map_or(0, K::len)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<K: RegistryKind> Default for ConverterRegistry<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: RegistryKind> std::fmt::Debug for ConverterRegistry<K> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConverterRegistry")
			.field("kind", &K::KIND)
			.field("len", &self.len())
			.finish()
	}
}
