//! Disposal handles.
//!
//! Every `dispose` in this crate is idempotent and safe to call from several
//! threads at once: the underlying teardown runs exactly once.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Something that can be torn down.
pub trait Disposable: Send + Sync {
	/// Tears down. Calls after the first are no-ops.
	fn dispose(&self);
}

/// RAII handle to an active subscription.
///
/// Dropping the handle disposes it, the same as calling [`dispose`](Self::dispose).
/// Use [`forget`](Self::forget) to keep the subscription alive without a handle.
#[must_use = "dropping a Subscription disposes it immediately"]
pub struct Subscription {
	inner: Option<Arc<dyn Disposable>>,
}

impl Subscription {
	pub fn new(disposable: Arc<dyn Disposable>) -> Self {
		Self { inner: Some(disposable) }
	}

	/// A handle with nothing to tear down.
	pub fn empty() -> Self {
		Self { inner: None }
	}

	/// Runs `teardown` once, on the first disposal.
	pub fn from_fn(teardown: impl FnOnce() + Send + 'static) -> Self {
		Self::new(Arc::new(FnDisposable {
			teardown: Mutex::new(Some(Box::new(teardown))),
		}))
	}

	pub fn dispose(&self) {
		if let Some(inner) = &self.inner {
			inner.dispose();
		}
	}

	/// Drops the handle without disposing.
	pub fn forget(mut self) {
		self.inner = None;
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(inner) = self.inner.take() {
			inner.dispose();
		}
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("empty", &self.inner.is_none()).finish()
	}
}

type Teardown = Box<dyn FnOnce() + Send>;

struct FnDisposable {
	teardown: Mutex<Option<Teardown>>,
}

impl Disposable for FnDisposable {
	fn dispose(&self) {
		let teardown = self.teardown.lock().take();
		if let Some(teardown) = teardown {
			teardown();
		}
	}
}

/// A group of subscriptions disposed together.
///
/// Subscriptions added after disposal are disposed immediately.
pub struct CompositeSubscription {
	/// `None` once disposed.
	subs: Mutex<Option<Vec<Subscription>>>,
}

impl CompositeSubscription {
	pub fn new() -> Self {
		Self {
			subs: Mutex::new(Some(Vec::new())),
		}
	}

	pub fn add(&self, sub: Subscription) {
		let mut guard = self.subs.lock();
		if let Some(subs) = guard.as_mut() {
			subs.push(sub);
			return;
		}
		drop(guard);
		sub.dispose();
	}

	pub fn is_disposed(&self) -> bool {
		self.subs.lock().is_none()
	}

	pub fn len(&self) -> usize {
		self.subs.lock().as_ref().map_or(0, Vec::len)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for CompositeSubscription {
	fn default() -> Self {
		Self::new()
	}
}

impl Disposable for CompositeSubscription {
	fn dispose(&self) {
		// Teardown runs outside the lock; a child may re-enter `add`.
		let subs = self.subs.lock().take();
		for sub in subs.into_iter().flatten() {
			sub.dispose();
		}
	}
}
