//! Runtime converter resolution.
//!
//! Converters come in three kinds (see [`converter`]) and live in one
//! copy-on-write [`ConverterRegistry`] per kind. [`ConverterService`] ties the
//! registries together and resolves a type pair in two phases: exact typed
//! matches first, runtime-scored fallbacks second.
//!
//! ```
//! use bindery_convert::{ConverterService, TypeKey, TypedFn};
//!
//! let service = ConverterService::new();
//! service.register_typed(TypedFn::new(2, |v: &i32, _| Some(v.to_string())));
//! service.register_typed(TypedFn::new(5, |v: &i32, _| Some(format!("{v:+}"))));
//!
//! let resolved = service.resolve_converter(TypeKey::of::<i32>(), TypeKey::of::<String>()).unwrap();
//! assert_eq!(resolved.affinity(), 5);
//! assert_eq!(service.convert::<i32, String>(3, None).ok().as_deref(), Some("+3"));
//! ```
//!
//! # Concurrency
//!
//! Registration may happen from any thread and is serialized per registry.
//! Resolution never takes a lock: it loads the current snapshot once and scans
//! it, so a resolve that races a registration sees either the old or the new
//! snapshot in full.

pub mod builtins;
pub mod config;
pub mod converter;
pub mod error;
pub mod registry;
pub mod service;
pub mod snapshot;
pub mod types;

pub use builtins::{BuiltinSet, IdentityConverter};
pub use config::{AffinityConfig, ServiceConfig};
pub use converter::{
	Converter, ConverterKind, FallbackConverter, FallbackFn, SetMethodConverter, SetMethodFn, TypedConverter, TypedFn,
};
pub use error::ConfigError;
pub use registry::{
	ConverterRegistry, FallbackKind, FallbackRegistry, RegistryKind, SetMethodKind, SetMethodRegistry, TypedKind,
	TypedRegistry,
};
pub use service::{ConvertOutcome, ConverterService, ResolvedConverter};
pub use snapshot::{ListSnapshot, TypePair, TypedSnapshot};
pub use types::{Hint, TypeKey, Value, downcast_ref, hint_as, wrap};
