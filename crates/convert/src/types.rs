//! Runtime type identity and dynamically typed values.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a Rust type used as a registry key.
///
/// Equality and hashing only consider the [`TypeId`]; the type name is kept
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// Returns the key for `T`.
	#[inline]
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	#[inline]
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Fully qualified type name, as reported by [`std::any::type_name`].
	#[inline]
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Returns true if `value` holds an instance of this type.
	#[inline]
	pub fn matches(&self, value: &Value) -> bool {
		(**value).type_id() == self.id
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Dynamically typed value passed into and out of converters.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Optional conversion hint (format string, precision, ...), opaque to the registry.
pub type Hint<'a> = Option<&'a (dyn Any + Send + Sync)>;

/// Wraps a concrete value.
#[inline]
pub fn wrap<T: Any + Send + Sync>(value: T) -> Value {
	Arc::new(value)
}

/// Borrows the concrete value inside `value` if it is a `T`.
#[inline]
pub fn downcast_ref<T: Any>(value: &Value) -> Option<&T> {
	(**value).downcast_ref::<T>()
}

/// Reads a hint as `T`.
#[inline]
pub fn hint_as<'a, T: Any>(hint: Hint<'a>) -> Option<&'a T> {
	hint.and_then(|h| h.downcast_ref::<T>())
}
