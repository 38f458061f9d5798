//! Property-changing notifications as an observable.
//!
//! # Role
//!
//! [`observe_property_changing`] fuses "read the current value" with "re-read
//! whenever the property is about to change" into one primitive. Sources expose
//! change notifications through the narrow [`NotifyPropertyChanging`] trait;
//! [`PropertyChangingEvent`] is a ready-made handler list to embed.
//!
//! # Invariants
//!
//! - Subscribing emits the current value synchronously before any handler is
//!   attached (see `tests::emits_current_value_on_subscribe`).
//! - A notification naming no property, or an empty one, affects every
//!   property.
//! - Repeated equal values are emitted; there is no distinct filtering.
//! - The handler is detached exactly once, by the first of any number of
//!   possibly concurrent disposals (see `tests::concurrent_dispose_detaches_once`).

use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::ReactiveError;
use crate::observable::Observable;
use crate::observer::ObserverRef;
use crate::subscription::{Disposable, Subscription};

#[cfg(test)]
mod tests;

/// Arguments of a before-change notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyChanging {
	property_name: Option<Arc<str>>,
}

impl PropertyChanging {
	pub fn new(property_name: impl Into<Arc<str>>) -> Self {
		Self {
			property_name: Some(property_name.into()),
		}
	}

	/// Notification that any property may change.
	pub fn all() -> Self {
		Self::default()
	}

	pub fn property_name(&self) -> Option<&str> {
		self.property_name.as_deref()
	}

	/// Whether this notification concerns `property`.
	pub fn affects(&self, property: &str) -> bool {
		match self.property_name.as_deref() {
			None | Some("") => true,
			Some(name) => name == property,
		}
	}
}

pub type PropertyChangingHandler = Arc<dyn Fn(&PropertyChanging) + Send + Sync>;

/// Identifies an attached handler for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerToken(NonZeroU64);

impl HandlerToken {
	/// Wraps an adapter-issued id. Ids must be unique per source while attached.
	pub const fn new(id: NonZeroU64) -> Self {
		Self(id)
	}

	pub fn get(self) -> u64 {
		self.0.get()
	}
}

/// A source that announces property changes before they happen.
pub trait NotifyPropertyChanging: Send + Sync {
	fn add_property_changing_handler(&self, handler: PropertyChangingHandler) -> HandlerToken;

	/// Removing an unknown or already removed token is a no-op.
	fn remove_property_changing_handler(&self, token: HandlerToken);
}

/// Thread-safe handler list for implementing [`NotifyPropertyChanging`].
///
/// Handlers run outside the internal lock, so a handler may add or remove
/// handlers while being notified.
pub struct PropertyChangingEvent {
	handlers: Mutex<Vec<(HandlerToken, PropertyChangingHandler)>>,
	issued: AtomicU64,
}

impl PropertyChangingEvent {
	pub fn new() -> Self {
		Self {
			handlers: Mutex::new(Vec::new()),
			issued: AtomicU64::new(0),
		}
	}

	pub fn add(&self, handler: PropertyChangingHandler) -> HandlerToken {
		let token = HandlerToken(NonZeroU64::MIN.saturating_add(self.issued.fetch_add(1, Ordering::Relaxed)));
		self.handlers.lock().push((token, handler));
		token
	}

	pub fn remove(&self, token: HandlerToken) {
		let mut handlers = self.handlers.lock();
		if let Some(pos) = handlers.iter().position(|(t, _)| *t == token) {
			handlers.remove(pos);
		}
	}

	pub fn raise(&self, args: &PropertyChanging) {
		let handlers: Vec<PropertyChangingHandler> = self.handlers.lock().iter().map(|(_, h)| Arc::clone(h)).collect();
		for handler in handlers {
			handler(args);
		}
	}

	/// Announces a change to `property`.
	pub fn raise_property(&self, property: impl Into<Arc<str>>) {
		self.raise(&PropertyChanging::new(property));
	}

	/// Announces that any property may change.
	pub fn raise_all(&self) {
		self.raise(&PropertyChanging::all());
	}

	pub fn handler_count(&self) -> usize {
		self.handlers.lock().len()
	}
}

impl Default for PropertyChangingEvent {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for PropertyChangingEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PropertyChangingEvent").field("handlers", &self.handler_count()).finish()
	}
}

impl NotifyPropertyChanging for PropertyChangingEvent {
	fn add_property_changing_handler(&self, handler: PropertyChangingHandler) -> HandlerToken {
		self.add(handler)
	}

	fn remove_property_changing_handler(&self, token: HandlerToken) {
		self.remove(token)
	}
}

/// Emits `read(&source)` on subscribe and again before every change to
/// `property`. See [`observe_property_changing`].
pub struct PropertyChangingObservable<S, F, T, E> {
	source: Arc<S>,
	property: Arc<str>,
	read: Arc<F>,
	_marker: PhantomData<fn() -> (T, E)>,
}

/// Observes `property` on `source`, reading the value with `read`.
///
/// The returned observable never errors or completes; `E` only aligns it with
/// the sources it is combined with.
pub fn observe_property_changing<S, F, T, E>(
	source: Arc<S>,
	property: impl Into<Arc<str>>,
	read: F,
) -> Result<PropertyChangingObservable<S, F, T, E>, ReactiveError>
where
	S: NotifyPropertyChanging + 'static,
	F: Fn(&S) -> T + Send + Sync + 'static,
{
	let property = property.into();
	if property.is_empty() {
		return Err(ReactiveError::EmptyPropertyName);
	}
	Ok(PropertyChangingObservable {
		source,
		property,
		read: Arc::new(read),
		_marker: PhantomData,
	})
}

impl<S, F, T, E> PropertyChangingObservable<S, F, T, E> {
	pub fn property(&self) -> &str {
		&self.property
	}
}

impl<S, F, T, E> Observable<T, E> for PropertyChangingObservable<S, F, T, E>
where
	S: NotifyPropertyChanging + 'static,
	F: Fn(&S) -> T + Send + Sync + 'static,
	T: 'static,
	E: 'static,
{
	fn subscribe(&self, observer: ObserverRef<T, E>) -> Subscription {
		observer.on_next((self.read)(&self.source));

		let live = Arc::new(AtomicBool::new(true));
		let handler: PropertyChangingHandler = {
			let live = Arc::clone(&live);
			let source = Arc::downgrade(&self.source);
			let property = Arc::clone(&self.property);
			let read = Arc::clone(&self.read);
			Arc::new(move |args: &PropertyChanging| {
				if !live.load(Ordering::Acquire) || !args.affects(&property) {
					return;
				}
				if let Some(source) = source.upgrade() {
					observer.on_next(read(&source));
				}
			})
		};

		let token = self.source.add_property_changing_handler(handler);
		tracing::trace!(property = %self.property, token = token.get(), "property changing handler attached");
		Subscription::new(Arc::new(Binding {
			source: Arc::downgrade(&self.source),
			token,
			live,
		}))
	}
}

impl<S, F, T, E> fmt::Debug for PropertyChangingObservable<S, F, T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PropertyChangingObservable").field("property", &self.property).finish_non_exhaustive()
	}
}

/// Links one subscription to its attached handler.
struct Binding<S> {
	source: Weak<S>,
	token: HandlerToken,
	/// Shared with the handler; cleared on the first dispose.
	live: Arc<AtomicBool>,
}

impl<S: NotifyPropertyChanging> Disposable for Binding<S> {
	fn dispose(&self) {
		if !self.live.swap(false, Ordering::AcqRel) {
			return;
		}
		if let Some(source) = self.source.upgrade() {
			source.remove_property_changing_handler(self.token);
			tracing::trace!(token = self.token.get(), "property changing handler detached");
		}
	}
}
