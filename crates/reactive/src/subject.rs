//! Multicast source.
//!
//! A [`Subject`] is both an [`Observer`] and an [`Observable`]: notifications
//! pushed into it are fanned out to every current subscriber. Adapters use it
//! to expose callback-driven sources as observables.
//!
//! # Invariants
//!
//! - Observers are notified outside the state lock, so an observer may
//!   subscribe, dispose or push into the same subject re-entrantly.
//! - After the first terminal notification, every observer is detached and
//!   later pushes are ignored.
//! - Subscribing to a terminated subject replays the terminal notification
//!   and returns an empty [`Subscription`].

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{Disposable, Subscription};

#[derive(Clone)]
enum Terminal<E> {
	Error(E),
	Completed,
}

struct SubjectState<T, E> {
	observers: Vec<(u64, ObserverRef<T, E>)>,
	terminal: Option<Terminal<E>>,
}

struct SubjectInner<T, E> {
	state: Mutex<SubjectState<T, E>>,
	next_id: AtomicU64,
}

impl<T, E> SubjectInner<T, E> {
	fn remove(&self, id: u64) {
		let mut state = self.state.lock();
		if let Some(pos) = state.observers.iter().position(|(other, _)| *other == id) {
			state.observers.remove(pos);
		}
	}
}

/// Thread-safe multicast subject. Clones share the same subscriber list.
pub struct Subject<T, E> {
	inner: Arc<SubjectInner<T, E>>,
}

impl<T, E> Subject<T, E> {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(SubjectInner {
				state: Mutex::new(SubjectState {
					observers: Vec::new(),
					terminal: None,
				}),
				next_id: AtomicU64::new(0),
			}),
		}
	}

	/// Number of currently attached observers.
	pub fn observer_count(&self) -> usize {
		self.inner.state.lock().observers.len()
	}

	pub fn is_terminated(&self) -> bool {
		self.inner.state.lock().terminal.is_some()
	}

	fn terminate(&self, terminal: Terminal<E>) -> Vec<ObserverRef<T, E>>
	where
		E: Clone,
	{
		let mut state = self.inner.state.lock();
		if state.terminal.is_some() {
			return Vec::new();
		}
		state.terminal = Some(terminal);
		state.observers.drain(..).map(|(_, observer)| observer).collect()
	}
}

impl<T, E> Default for Subject<T, E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T, E> Clone for Subject<T, E> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T, E> fmt::Debug for Subject<T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Subject")
			.field("observers", &state.observers.len())
			.field("terminated", &state.terminal.is_some())
			.finish()
	}
}

impl<T, E> Observer<T, E> for Subject<T, E>
where
	T: Clone + Send,
	E: Clone + Send,
{
	fn on_next(&self, value: T) {
		let observers: Vec<ObserverRef<T, E>> = {
			let state = self.inner.state.lock();
			if state.terminal.is_some() {
				return;
			}
			state.observers.iter().map(|(_, observer)| Arc::clone(observer)).collect()
		};
		for observer in observers {
			observer.on_next(value.clone());
		}
	}

	fn on_error(&self, error: E) {
		for observer in self.terminate(Terminal::Error(error.clone())) {
			observer.on_error(error.clone());
		}
	}

	fn on_completed(&self) {
		for observer in self.terminate(Terminal::Completed) {
			observer.on_completed();
		}
	}
}

impl<T, E> Observable<T, E> for Subject<T, E>
where
	T: Send + 'static,
	E: Clone + Send + 'static,
{
	fn subscribe(&self, observer: ObserverRef<T, E>) -> Subscription {
		let mut state = self.inner.state.lock();
		if let Some(terminal) = state.terminal.clone() {
			drop(state);
			match terminal {
				Terminal::Error(error) => observer.on_error(error),
				Terminal::Completed => observer.on_completed(),
			}
			return Subscription::empty();
		}

		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		state.observers.push((id, observer));
		drop(state);

		Subscription::new(Arc::new(SubjectSubscription {
			inner: Arc::downgrade(&self.inner),
			id,
			disposed: AtomicBool::new(false),
		}))
	}
}

struct SubjectSubscription<T, E> {
	inner: Weak<SubjectInner<T, E>>,
	id: u64,
	disposed: AtomicBool,
}

impl<T, E> Disposable for SubjectSubscription<T, E>
where
	T: Send,
	E: Send,
{
	fn dispose(&self) {
		if self.disposed.swap(true, Ordering::AcqRel) {
			return;
		}
		if let Some(inner) = self.inner.upgrade() {
			inner.remove(self.id);
		}
	}
}
