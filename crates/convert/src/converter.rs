//! Converter capabilities.
//!
//! Three kinds of converter exist, and each is a capability trait rather than
//! a level in a class hierarchy:
//!
//! - [`TypedConverter`]: keyed by an exact `(from, to)` pair with a static affinity.
//! - [`FallbackConverter`]: matches many pairs and scores them at runtime.
//! - [`SetMethodConverter`]: applies a conversion as a side-effecting set; either
//!   type may be unknown.
//!
//! [`Converter`] is the closed tagged set used by registration entry points.
//!
//! # Affinity
//!
//! Affinity is a score for a type pair. Higher wins. A score of zero or below
//! means the converter cannot handle the pair and it is never selected.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::types::{Hint, TypeKey, Value, downcast_ref, wrap};

/// Converter keyed by an exact type pair.
pub trait TypedConverter: Send + Sync + 'static {
	fn from_type(&self) -> TypeKey;
	fn to_type(&self) -> TypeKey;

	/// Static affinity for [`from_type`](Self::from_type) → [`to_type`](Self::to_type).
	fn affinity(&self) -> i32;

	/// Converts `value`; `None` means this particular value could not be converted.
	fn try_convert(&self, value: &Value, hint: Hint<'_>) -> Option<Value>;
}

/// Converter that scores type pairs at runtime.
pub trait FallbackConverter: Send + Sync + 'static {
	fn affinity(&self, from: TypeKey, to: TypeKey) -> i32;

	fn try_convert(&self, from: TypeKey, value: &Value, to: TypeKey, hint: Hint<'_>) -> Option<Value>;
}

/// Converter that writes into a target instead of returning a new value.
///
/// Used by bindings that have no statically known conversion types, so both
/// sides of the affinity query may be `None`.
pub trait SetMethodConverter: Send + Sync + 'static {
	fn affinity(&self, from: Option<TypeKey>, to: Option<TypeKey>) -> i32;

	/// Applies `value` to `target`. Returns false if the set could not be performed.
	fn perform_set(&self, target: &mut dyn Any, value: Option<&Value>, arguments: &[Value]) -> bool;
}

/// Discriminant of [`Converter`], used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverterKind {
	Typed,
	Fallback,
	SetMethod,
}

impl ConverterKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Typed => "typed",
			Self::Fallback => "fallback",
			Self::SetMethod => "set-method",
		}
	}
}

impl fmt::Display for ConverterKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A converter of any kind.
#[derive(Clone)]
pub enum Converter {
	Typed(Arc<dyn TypedConverter>),
	Fallback(Arc<dyn FallbackConverter>),
	SetMethod(Arc<dyn SetMethodConverter>),
}

impl Converter {
	pub fn kind(&self) -> ConverterKind {
		match self {
			Self::Typed(_) => ConverterKind::Typed,
			Self::Fallback(_) => ConverterKind::Fallback,
			Self::SetMethod(_) => ConverterKind::SetMethod,
		}
	}

	pub fn typed(converter: impl TypedConverter) -> Self {
		Self::Typed(Arc::new(converter))
	}

	pub fn fallback(converter: impl FallbackConverter) -> Self {
		Self::Fallback(Arc::new(converter))
	}

	pub fn set_method(converter: impl SetMethodConverter) -> Self {
		Self::SetMethod(Arc::new(converter))
	}
}

impl fmt::Debug for Converter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Typed(c) => f
				.debug_struct("Typed")
				.field("from", &c.from_type())
				.field("to", &c.to_type())
				.field("affinity", &c.affinity())
				.finish(),
			Self::Fallback(_) => f.write_str("Fallback"),
			Self::SetMethod(_) => f.write_str("SetMethod"),
		}
	}
}

/// [`TypedConverter`] backed by a closure over concrete types.
///
/// ```
/// use bindery_convert::{TypedConverter, TypedFn, wrap};
///
/// let c = TypedFn::new(2, |v: &i32, _| Some(v.to_string()));
/// let out = c.try_convert(&wrap(7_i32), None).unwrap();
/// assert_eq!(out.downcast_ref::<String>().map(String::as_str), Some("7"));
/// ```
pub struct TypedFn<From, To, F> {
	affinity: i32,
	f: F,
	_types: PhantomData<fn(&From) -> To>,
}

impl<From, To, F> TypedFn<From, To, F>
where
	From: Any + Send + Sync,
	To: Any + Send + Sync,
	F: Fn(&From, Hint<'_>) -> Option<To> + Send + Sync + 'static,
{
	pub fn new(affinity: i32, f: F) -> Self {
		Self {
			affinity,
			f,
			_types: PhantomData,
		}
	}
}

impl<From, To, F> TypedConverter for TypedFn<From, To, F>
where
	From: Any + Send + Sync,
	To: Any + Send + Sync,
	F: Fn(&From, Hint<'_>) -> Option<To> + Send + Sync + 'static,
{
	fn from_type(&self) -> TypeKey {
		TypeKey::of::<From>()
	}

	fn to_type(&self) -> TypeKey {
		TypeKey::of::<To>()
	}

	fn affinity(&self) -> i32 {
		self.affinity
	}

	fn try_convert(&self, value: &Value, hint: Hint<'_>) -> Option<Value> {
		let from = downcast_ref::<From>(value)?;
		(self.f)(from, hint).map(wrap)
	}
}

/// [`FallbackConverter`] backed by an affinity closure and a conversion closure.
pub struct FallbackFn<A, F> {
	affinity: A,
	convert: F,
}

impl<A, F> FallbackFn<A, F>
where
	A: Fn(TypeKey, TypeKey) -> i32 + Send + Sync + 'static,
	F: Fn(TypeKey, &Value, TypeKey, Hint<'_>) -> Option<Value> + Send + Sync + 'static,
{
	pub fn new(affinity: A, convert: F) -> Self {
		Self { affinity, convert }
	}
}

impl<A, F> FallbackConverter for FallbackFn<A, F>
where
	A: Fn(TypeKey, TypeKey) -> i32 + Send + Sync + 'static,
	F: Fn(TypeKey, &Value, TypeKey, Hint<'_>) -> Option<Value> + Send + Sync + 'static,
{
	fn affinity(&self, from: TypeKey, to: TypeKey) -> i32 {
		(self.affinity)(from, to)
	}

	fn try_convert(&self, from: TypeKey, value: &Value, to: TypeKey, hint: Hint<'_>) -> Option<Value> {
		(self.convert)(from, value, to, hint)
	}
}

/// [`SetMethodConverter`] backed by closures.
pub struct SetMethodFn<A, F> {
	affinity: A,
	set: F,
}

impl<A, F> SetMethodFn<A, F>
where
	A: Fn(Option<TypeKey>, Option<TypeKey>) -> i32 + Send + Sync + 'static,
	F: Fn(&mut dyn Any, Option<&Value>, &[Value]) -> bool + Send + Sync + 'static,
{
	pub fn new(affinity: A, set: F) -> Self {
		Self { affinity, set }
	}
}

impl<A, F> SetMethodConverter for SetMethodFn<A, F>
where
	A: Fn(Option<TypeKey>, Option<TypeKey>) -> i32 + Send + Sync + 'static,
	F: Fn(&mut dyn Any, Option<&Value>, &[Value]) -> bool + Send + Sync + 'static,
{
	fn affinity(&self, from: Option<TypeKey>, to: Option<TypeKey>) -> i32 {
		(self.affinity)(from, to)
	}

	fn perform_set(&self, target: &mut dyn Any, value: Option<&Value>, arguments: &[Value]) -> bool {
		(self.set)(target, value, arguments)
	}
}
