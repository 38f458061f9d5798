//! Converter resolution service.
//!
//! [`ConverterService`] owns one registry per converter kind and resolves in two
//! fixed phases: exact type-pair matches first, runtime-scored fallbacks second.
//! Affinity only breaks ties within a phase; a typed match always beats any
//! fallback, whatever the scores.
//!
//! The service is plain configuration state. Build it once per application
//! configuration and pass it as `Arc<ConverterService>` to whatever needs it.

use std::any::Any;
use std::sync::Arc;

use crate::builtins::BuiltinSet;
use crate::config::{AffinityConfig, ServiceConfig};
use crate::converter::{Converter, ConverterKind, FallbackConverter, SetMethodConverter, TypedConverter};
use crate::error::ConfigError;
use crate::registry::{FallbackRegistry, SetMethodRegistry, TypedRegistry};
use crate::types::{Hint, TypeKey, Value, wrap};


/// Converter returned by [`ConverterService::resolve_converter`].
#[derive(Clone)]
pub enum ResolvedConverter {
	Typed(Arc<dyn TypedConverter>),
	/// A fallback bound to the pair it was resolved for.
	Fallback {
		converter: Arc<dyn FallbackConverter>,
		from: TypeKey,
		to: TypeKey,
	},
}

impl ResolvedConverter {
	/// The resolution phase that produced this converter.
	pub fn kind(&self) -> ConverterKind {
		match self {
			Self::Typed(_) => ConverterKind::Typed,
			Self::Fallback { .. } => ConverterKind::Fallback,
		}
	}

	pub fn affinity(&self) -> i32 {
		match self {
			Self::Typed(c) => c.affinity(),
			Self::Fallback { converter, from, to } => converter.affinity(*from, *to),
		}
	}

	/// Converts `value`; `None` means the converter could not convert this value.
	pub fn convert(&self, value: &Value, hint: Hint<'_>) -> Option<Value> {
		match self {
			Self::Typed(c) => c.try_convert(value, hint),
			Self::Fallback { converter, from, to } => converter.try_convert(*from, value, *to, hint),
		}
	}

	pub fn as_typed(&self) -> Option<&Arc<dyn TypedConverter>> {
		match self {
			Self::Typed(c) => Some(c),
			Self::Fallback { .. } => None,
		}
	}

	pub fn as_fallback(&self) -> Option<&Arc<dyn FallbackConverter>> {
		match self {
			Self::Typed(_) => None,
			Self::Fallback { converter, .. } => Some(converter),
		}
	}
}

impl std::fmt::Debug for ResolvedConverter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResolvedConverter")
			.field("kind", &self.kind())
			.field("affinity", &self.affinity())
			.finish()
	}
}

/// Result of [`ConverterService::convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome<T> {
	Converted(T),
	/// No converter is registered for the pair.
	NoConverter,
	/// A converter was found but rejected this value.
	Failed,
}

impl<T> ConvertOutcome<T> {
	pub fn ok(self) -> Option<T> {
		match self {
			Self::Converted(v) => Some(v),
			Self::NoConverter | Self::Failed => None,
		}
	}
}

/// Typed, fallback and set-method registries behind one resolution entry point.
#[derive(Debug, Default)]
pub struct ConverterService {
	typed: TypedRegistry,
	fallback: FallbackRegistry,
	set_method: SetMethodRegistry,
}

impl ConverterService {
	/// Creates a service with no converters.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a service with every builtin set at default affinities.
	pub fn with_builtins() -> Self {
		let service = Self::new();
		service.install_builtins(&BuiltinSet::ALL, &AffinityConfig::default());
		service
	}

	pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
		let sets = config.builtin_sets()?;
		let service = Self::new();
		service.install_builtins(&sets, &config.affinity);
		Ok(service)
	}

	/// Registers the converters of `sets`, one publication per registry.
	pub fn install_builtins(&self, sets: &[BuiltinSet], affinity: &AffinityConfig) {
		let mut typed = Vec::new();
		let mut fallback = Vec::new();
		let mut set_method = Vec::new();
		for set in sets {
			for converter in set.converters(affinity) {
				match converter {
					Converter::Typed(c) => typed.push(c),
					Converter::Fallback(c) => fallback.push(c),
					Converter::SetMethod(c) => set_method.push(c),
				}
			}
		}
		tracing::debug!(
			sets = ?sets.iter().map(|s| s.name()).collect::<Vec<_>>(),
			typed = typed.len(),
			fallback = fallback.len(),
			"installing builtin converters"
		);
		self.typed.register_many(typed);
		self.fallback.register_many(fallback);
		self.set_method.register_many(set_method);
	}

	/// Routes `converter` to the registry of its kind.
	pub fn register(&self, converter: Converter) {
		match converter {
			Converter::Typed(c) => self.typed.register(c),
			Converter::Fallback(c) => self.fallback.register(c),
			Converter::SetMethod(c) => self.set_method.register(c),
		}
	}

	pub fn register_typed(&self, converter: impl TypedConverter) {
		self.typed.register(Arc::new(converter));
	}

	pub fn register_fallback(&self, converter: impl FallbackConverter) {
		self.fallback.register(Arc::new(converter));
	}

	pub fn register_set_method(&self, converter: impl SetMethodConverter) {
		self.set_method.register(Arc::new(converter));
	}

	/// Resolves the converter for `from -> to`: exact pair first, fallback second.
	pub fn resolve_converter(&self, from: TypeKey, to: TypeKey) -> Option<ResolvedConverter> {
		if let Some(c) = self.typed.try_get_converter((from, to)) {
			tracing::trace!(%from, %to, phase = "typed", "resolved converter");
			return Some(ResolvedConverter::Typed(c));
		}
		match self.fallback.try_get_converter((from, to)) {
			Some(converter) => {
				tracing::trace!(%from, %to, phase = "fallback", "resolved converter");
				Some(ResolvedConverter::Fallback { converter, from, to })
			}
			None => {
				tracing::trace!(%from, %to, "no converter");
				None
			}
		}
	}

	/// Resolves a set-method converter; either type may be unknown.
	pub fn resolve_set_method_converter(&self, from: Option<TypeKey>, to: Option<TypeKey>) -> Option<Arc<dyn SetMethodConverter>> {
		self.set_method.try_get_converter((from, to))
	}

	/// Resolves and converts `value` from `From` to `To` in one call.
	pub fn convert<From, To>(&self, value: From, hint: Hint<'_>) -> ConvertOutcome<To>
	where
		From: Any + Send + Sync,
		To: Any + Send + Sync + Clone,
	{
		self.convert_value(TypeKey::of::<From>(), &wrap(value), hint)
	}

	/// Like [`convert`](Self::convert) for an already wrapped value of type `from`.
	pub fn convert_value<To>(&self, from: TypeKey, value: &Value, hint: Hint<'_>) -> ConvertOutcome<To>
	where
		To: Any + Send + Sync + Clone,
	{
		let Some(converter) = self.resolve_converter(from, TypeKey::of::<To>()) else {
			return ConvertOutcome::NoConverter;
		};
		match converter.convert(value, hint).map(|v| v.downcast::<To>()) {
			Some(Ok(out)) => ConvertOutcome::Converted(Arc::unwrap_or_clone(out)),
			Some(Err(_)) | None => ConvertOutcome::Failed,
		}
	}

	pub fn typed(&self) -> &TypedRegistry {
		&self.typed
	}

	pub fn fallback(&self) -> &FallbackRegistry {
		&self.fallback
	}

	pub fn set_method(&self) -> &SetMethodRegistry {
		&self.set_method
	}
}
