//! Combine-latest: fuse N sources into one stream of selector results.
//!
//! # Role
//!
//! Every subscription to a combined observable builds one `LatestCore`
//! holding the latest value per source, the downstream observer and the
//! upstream subscription handles. Fixed arities `combine_latest2` through
//! `combine_latest8` accept heterogeneous element types; [`combine_latest_all`]
//! takes any number of homogeneous boxed sources.
//!
//! # Invariants
//!
//! - No emission until every source has produced at least one value (see
//!   `tests::waits_for_every_source`).
//! - The first upstream error is forwarded exactly once, after which the
//!   downstream observer is detached and upstreams released (see
//!   `tests::error_forwarded_once_then_silent`).
//! - Upstream completion is swallowed.
//! - Dispose is idempotent and thread-safe; the observer is detached by one
//!   atomic swap.
//! - Emission is serialized by a reentrant gate, so a downstream observer that
//!   synchronously pushes into an upstream on the same thread re-enters
//!   instead of deadlocking (see `tests::reentrant_emission_does_not_deadlock`).
//!   The selector itself must not re-enter.

use std::cell::RefCell;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::ReentrantMutex;

use crate::error::ReactiveError;
use crate::observable::{BoxedObservable, Observable, create};
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{CompositeSubscription, Disposable, Subscription};


/// Per-subscription state shared by every combine-latest arity.
///
/// `S` is the slot storage, `C` turns a full set of slots into a result.
struct LatestCore<S, C, R, E> {
	gate: ReentrantMutex<RefCell<S>>,
	combine: C,
	/// `None` once disposed or terminated.
	downstream: ArcSwapOption<ObserverRef<R, E>>,
	upstream: CompositeSubscription,
	sources: usize,
}

impl<S, C, R, E> LatestCore<S, C, R, E>
where
	S: Send + 'static,
	C: Fn(&S) -> Option<R> + Send + Sync + 'static,
	R: 'static,
	E: 'static,
{
	fn new(slots: S, combine: C, downstream: ObserverRef<R, E>, sources: usize) -> Arc<Self> {
		Arc::new(Self {
			gate: ReentrantMutex::new(RefCell::new(slots)),
			combine,
			downstream: ArcSwapOption::from_pointee(downstream),
			upstream: CompositeSubscription::new(),
			sources,
		})
	}

	fn is_terminated(&self) -> bool {
		self.downstream.load().is_none()
	}

	/// Observer that writes into one slot via `store`.
	fn slot_observer<T, St>(self: &Arc<Self>, store: St) -> ObserverRef<T, E>
	where
		T: 'static,
		St: Fn(&mut S, T) + Send + Sync + 'static,
	{
		Arc::new(SlotObserver {
			core: Arc::clone(self),
			store,
		})
	}

	/// Subscribes `source` unless an earlier source already terminated us.
	fn attach<T>(self: &Arc<Self>, source: &(impl Observable<T, E> + ?Sized), store: impl Fn(&mut S, T) + Send + Sync + 'static)
	where
		T: 'static,
	{
		if self.is_terminated() {
			return;
		}
		let sub = source.subscribe(self.slot_observer(store));
		self.upstream.add(sub);
	}

	fn push(&self, store: impl FnOnce(&mut S)) {
		if self.is_terminated() {
			return;
		}
		let gate = self.gate.lock();
		let combined = {
			let mut slots = gate.borrow_mut();
			store(&mut slots);
			(self.combine)(&slots)
		};
		if let Some(value) = combined
			&& let Some(downstream) = self.downstream.load_full()
		{
			downstream.on_next(value);
		}
	}

	fn fail(&self, error: E) {
		{
			let _gate = self.gate.lock();
			if let Some(downstream) = self.downstream.swap(None) {
				tracing::debug!(sources = self.sources, "combine_latest terminated by upstream error");
				downstream.on_error(error);
			}
		}
		self.upstream.dispose();
	}
}

impl<S, C, R, E> Disposable for LatestCore<S, C, R, E>
where
	S: Send,
	C: Send + Sync,
{
	fn dispose(&self) {
		self.downstream.swap(None);
		self.upstream.dispose();
	}
}

struct SlotObserver<S, C, R, E, St> {
	core: Arc<LatestCore<S, C, R, E>>,
	store: St,
}

impl<T, S, C, R, E, St> Observer<T, E> for SlotObserver<S, C, R, E, St>
where
	S: Send + 'static,
	C: Fn(&S) -> Option<R> + Send + Sync + 'static,
	R: 'static,
	E: 'static,
	St: Fn(&mut S, T) + Send + Sync,
{
	fn on_next(&self, value: T) {
		self.core.push(|slots| (self.store)(slots, value));
	}

	fn on_error(&self, error: E) {
		self.core.fail(error);
	}

	fn on_completed(&self) {}
}

macro_rules! combine_latest {
	($(#[$meta:meta])* $name:ident, $count:literal; $($src:ident: $ty:ident => $idx:tt),+) => {
		$(#[$meta])*
		#[allow(clippy::too_many_arguments)]
		pub fn $name<$($ty,)+ R, Err, Sel>(
			$($src: impl Observable<$ty, Err> + 'static,)+
			selector: Sel,
		) -> impl Observable<R, Err>
		where
			$($ty: Send + 'static,)+
			R: 'static,
			Err: 'static,
			Sel: Fn($(&$ty),+) -> R + Send + Sync + 'static,
		{
			let selector = Arc::new(selector);
			create(move |observer: ObserverRef<R, Err>| {
				let selector = Arc::clone(&selector);
				let core = LatestCore::new(
					<($(Option<$ty>,)+)>::default(),
					move |slots: &($(Option<$ty>,)+)| Some(selector($(slots.$idx.as_ref()?),+)),
					observer,
					$count,
				);
				$(core.attach::<$ty>(&$src, |slots, value| slots.$idx = Some(value));)+
				Subscription::new(core)
			})
		}
	};
}

combine_latest!(
	/// Combines two sources; see the [module docs](self).
	combine_latest2, 2; a: A => 0, b: B => 1
);
combine_latest!(
	/// Combines three sources; see the [module docs](self).
	combine_latest3, 3; a: A => 0, b: B => 1, c: C => 2
);
combine_latest!(
	/// Combines four sources; see the [module docs](self).
	combine_latest4, 4; a: A => 0, b: B => 1, c: C => 2, d: D => 3
);
combine_latest!(
	/// Combines five sources; see the [module docs](self).
	combine_latest5, 5; a: A => 0, b: B => 1, c: C => 2, d: D => 3, e: E => 4
);
combine_latest!(
	/// Combines six sources; see the [module docs](self).
	combine_latest6, 6; a: A => 0, b: B => 1, c: C => 2, d: D => 3, e: E => 4, f: F => 5
);
combine_latest!(
	/// Combines seven sources; see the [module docs](self).
	combine_latest7, 7; a: A => 0, b: B => 1, c: C => 2, d: D => 3, e: E => 4, f: F => 5, g: G => 6
);
combine_latest!(
	/// Combines eight sources; see the [module docs](self).
	combine_latest8, 8; a: A => 0, b: B => 1, c: C => 2, d: D => 3, e: E => 4, f: F => 5, g: G => 6, h: H => 7
);

/// Combines any number of sources of the same element type.
///
/// The selector receives the latest value of every source, in source order.
/// Returns [`ReactiveError::NoSources`] when `sources` is empty.
pub fn combine_latest_all<T, R, E, F>(sources: Vec<BoxedObservable<T, E>>, selector: F) -> Result<impl Observable<R, E>, ReactiveError>
where
	T: Send + 'static,
	R: 'static,
	E: 'static,
	F: Fn(&[&T]) -> R + Send + Sync + 'static,
{
	if sources.is_empty() {
		return Err(ReactiveError::NoSources);
	}
	let selector = Arc::new(selector);
	Ok(create(move |observer: ObserverRef<R, E>| {
		let selector = Arc::clone(&selector);
		let slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(sources.len()).collect();
		let core = LatestCore::new(
			slots,
			move |slots: &Vec<Option<T>>| {
				let latest: Vec<&T> = slots.iter().map(Option::as_ref).collect::<Option<_>>()?;
				Some(selector(&latest))
			},
			observer,
			sources.len(),
		);
		for (index, source) in sources.iter().enumerate() {
			core.attach::<T>(&**source, move |slots: &mut Vec<Option<T>>, value| slots[index] = Some(value));
		}
		Subscription::new(core)
	}))
}
