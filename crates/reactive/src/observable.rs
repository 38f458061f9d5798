use std::marker::PhantomData;
use std::sync::Arc;

use crate::observer::{ObserverRef, observer_fn};
use crate::subscription::Subscription;

/// A push-based stream of `T` that may fail with `E`.
///
/// Each call to [`subscribe`](Self::subscribe) creates independent
/// per-subscription state; nothing is shared between subscribers unless the
/// source itself is shared (as with [`Subject`](crate::Subject)).
pub trait Observable<T, E>: Send + Sync {
	fn subscribe(&self, observer: ObserverRef<T, E>) -> Subscription;
}

pub type BoxedObservable<T, E> = Arc<dyn Observable<T, E>>;

impl<T, E, O> Observable<T, E> for Arc<O>
where
	O: Observable<T, E> + ?Sized,
{
	fn subscribe(&self, observer: ObserverRef<T, E>) -> Subscription {
		(**self).subscribe(observer)
	}
}

/// Observable whose subscribe logic is a closure.
pub struct Create<F, T, E> {
	subscribe: F,
	_marker: PhantomData<fn() -> (T, E)>,
}

/// Builds an observable from a subscribe closure, called once per subscriber.
pub fn create<T, E, F>(subscribe: F) -> Create<F, T, E>
where
	F: Fn(ObserverRef<T, E>) -> Subscription + Send + Sync,
{
	Create {
		subscribe,
		_marker: PhantomData,
	}
}

impl<T, E, F> Observable<T, E> for Create<F, T, E>
where
	F: Fn(ObserverRef<T, E>) -> Subscription + Send + Sync,
{
	fn subscribe(&self, observer: ObserverRef<T, E>) -> Subscription {
		(self.subscribe)(observer)
	}
}

/// Closure conveniences for any [`Observable`].
pub trait ObservableExt<T, E>: Observable<T, E> {
	/// Subscribes to values only; errors and completion are ignored.
	fn subscribe_fn(&self, next: impl Fn(T) + Send + Sync + 'static) -> Subscription
	where
		T: 'static,
		E: 'static,
	{
		self.subscribe(observer_fn(next, |_| {}, || {}))
	}

	fn subscribe_all(
		&self,
		next: impl Fn(T) + Send + Sync + 'static,
		error: impl Fn(E) + Send + Sync + 'static,
		completed: impl Fn() + Send + Sync + 'static,
	) -> Subscription
	where
		T: 'static,
		E: 'static,
	{
		self.subscribe(observer_fn(next, error, completed))
	}

	fn boxed(self) -> BoxedObservable<T, E>
	where
		Self: Sized + 'static,
	{
		Arc::new(self)
	}
}

impl<T, E, O> ObservableExt<T, E> for O where O: Observable<T, E> + ?Sized {}
