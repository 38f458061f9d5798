use std::marker::PhantomData;
use std::sync::Arc;

/// Receives notifications from an [`Observable`](crate::Observable).
///
/// Callbacks may arrive on any thread.
pub trait Observer<T, E>: Send + Sync {
	fn on_next(&self, value: T);
	fn on_error(&self, error: E);
	fn on_completed(&self);
}

pub type ObserverRef<T, E> = Arc<dyn Observer<T, E>>;

/// Observer assembled from three closures.
pub struct FnObserver<T, E, N, Er, C> {
	next: N,
	error: Er,
	completed: C,
	_marker: PhantomData<fn(T, E)>,
}

impl<T, E, N, Er, C> FnObserver<T, E, N, Er, C>
where
	N: Fn(T) + Send + Sync,
	Er: Fn(E) + Send + Sync,
	C: Fn() + Send + Sync,
{
	pub fn new(next: N, error: Er, completed: C) -> Self {
		Self {
			next,
			error,
			completed,
			_marker: PhantomData,
		}
	}
}

impl<T, E, N, Er, C> Observer<T, E> for FnObserver<T, E, N, Er, C>
where
	N: Fn(T) + Send + Sync,
	Er: Fn(E) + Send + Sync,
	C: Fn() + Send + Sync,
{
	fn on_next(&self, value: T) {
		(self.next)(value)
	}

	fn on_error(&self, error: E) {
		(self.error)(error)
	}

	fn on_completed(&self) {
		(self.completed)()
	}
}

/// Boxes three closures into an [`ObserverRef`].
pub fn observer_fn<T, E>(
	next: impl Fn(T) + Send + Sync + 'static,
	error: impl Fn(E) + Send + Sync + 'static,
	completed: impl Fn() + Send + Sync + 'static,
) -> ObserverRef<T, E>
where
	T: 'static,
	E: 'static,
{
	Arc::new(FnObserver::new(next, error, completed))
}
