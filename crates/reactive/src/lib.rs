//! Push-based reactive primitives for binding sources.
//!
//! The crate provides the small observable core the binding engine needs
//! ([`Observable`], [`Observer`], [`Subscription`], [`Subject`]) and two
//! fused operators built on it:
//!
//! - [`combine_latest2`] through [`combine_latest8`] and [`combine_latest_all`]
//!   merge several sources into one stream of selector results.
//! - [`observe_property_changing`] turns a [`NotifyPropertyChanging`] source
//!   into a stream of property values.
//!
//! ```
//! use std::sync::Arc;
//!
//! use bindery_reactive::{Observer, ObservableExt, Subject, combine_latest2};
//! use parking_lot::Mutex;
//!
//! let width = Subject::<u32, ()>::new();
//! let height = Subject::<u32, ()>::new();
//! let area = combine_latest2(width.clone(), height.clone(), |w: &u32, h: &u32| w * h);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let _sub = area.subscribe_fn(move |a| sink.lock().push(a));
//!
//! width.on_next(3);
//! height.on_next(4);
//! width.on_next(5);
//! assert_eq!(*seen.lock(), vec![12, 20]);
//! ```
//!
//! # Threading
//!
//! Nothing here owns a thread. Notifications run on the thread that produced
//! them, and every `dispose` is idempotent and safe to race.

pub mod combine;
pub mod error;
pub mod observable;
pub mod observer;
pub mod property;
pub mod subject;
pub mod subscription;

pub use combine::{
	combine_latest2, combine_latest3, combine_latest4, combine_latest5, combine_latest6, combine_latest7, combine_latest8, combine_latest_all,
};
pub use error::ReactiveError;
pub use observable::{BoxedObservable, Create, Observable, ObservableExt, create};
pub use observer::{FnObserver, Observer, ObserverRef, observer_fn};
pub use property::{
	HandlerToken, NotifyPropertyChanging, PropertyChanging, PropertyChangingEvent, PropertyChangingHandler, PropertyChangingObservable,
	observe_property_changing,
};
pub use subject::Subject;
pub use subscription::{CompositeSubscription, Disposable, Subscription};
