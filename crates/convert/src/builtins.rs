//! Builtin converter sets.
//!
//! Conversion rules here are deliberately plain: text goes through
//! [`str::parse`] after trimming and values go through [`ToString`].

use std::fmt;

use crate::config::AffinityConfig;
use crate::converter::{Converter, FallbackConverter, TypedFn};
use crate::types::{Hint, TypeKey, Value, hint_as};

macro_rules! integer_text {
	($out:ident, $affinity:expr; $($ty:ty),+) => {$(
		$out.push(Converter::typed(TypedFn::new($affinity, |v: &$ty, _| Some(v.to_string()))));
		$out.push(Converter::typed(TypedFn::new($affinity, |s: &String, _| s.trim().parse::<$ty>().ok())));
	)+};
}

macro_rules! float_text {
	($out:ident, $affinity:expr; $($ty:ty),+) => {$(
		$out.push(Converter::typed(TypedFn::new($affinity, |v: &$ty, hint| Some(format_float(v, hint)))));
		$out.push(Converter::typed(TypedFn::new($affinity, |s: &String, _| s.trim().parse::<$ty>().ok())));
	)+};
}

/// A named group of builtin converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinSet {
	/// `String` to and from the integer and float primitives.
	NumericText,
	/// `bool` to and from `String`.
	BoolText,
	/// Fallback that hands back the same value when source and target types match.
	Identity,
}

impl BuiltinSet {
	pub const ALL: [BuiltinSet; 3] = [Self::NumericText, Self::BoolText, Self::Identity];

	pub const fn name(self) -> &'static str {
		match self {
			Self::NumericText => "numeric-text",
			Self::BoolText => "bool-text",
			Self::Identity => "identity",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|s| s.name() == name)
	}

	/// Builds the converters of this set.
	pub fn converters(self, affinity: &AffinityConfig) -> Vec<Converter> {
		let mut out = Vec::new();
		match self {
			Self::NumericText => {
				integer_text!(out, affinity.typed; i32, i64, u32, u64);
				float_text!(out, affinity.typed; f32, f64);
			}
			Self::BoolText => {
				out.push(Converter::typed(TypedFn::new(affinity.typed, |v: &bool, _| Some(v.to_string()))));
				out.push(Converter::typed(TypedFn::new(affinity.typed, |s: &String, _| {
					s.trim().parse::<bool>().ok()
				})));
			}
			Self::Identity => out.push(Converter::fallback(IdentityConverter::new(affinity.identity))),
		}
		out
	}
}

impl fmt::Display for BuiltinSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Longest precision a float hint may request; enough digits to round-trip an `f64`.
const MAX_PRECISION: usize = 17;

/// Formats with the precision carried by the hint (`usize` or a numeric `&str`), if any.
fn format_float<T: fmt::Display>(v: &T, hint: Hint<'_>) -> String {
	let precision = hint_as::<usize>(hint)
		.copied()
		.or_else(|| hint_as::<&str>(hint).and_then(|s| s.parse().ok()))
		.map(|p: usize| p.min(MAX_PRECISION));
	match precision {
		Some(p) => format!("{v:.p$}"),
		None => v.to_string(),
	}
}

/// Fallback that returns the input unchanged when `from == to`.
pub struct IdentityConverter {
	affinity: i32,
}

impl IdentityConverter {
	pub fn new(affinity: i32) -> Self {
		Self { affinity }
	}
}

impl FallbackConverter for IdentityConverter {
	fn affinity(&self, from: TypeKey, to: TypeKey) -> i32 {
		if from == to { self.affinity } else { 0 }
	}

	fn try_convert(&self, _from: TypeKey, value: &Value, to: TypeKey, _hint: Hint<'_>) -> Option<Value> {
		to.matches(value).then(|| value.clone())
	}
}

#[cfg(test)]
mod tests {
	use std::any::Any;
	use std::sync::Arc;

	use super::*;
	use crate::types::{downcast_ref, wrap};

	fn typed_for<From: Any, To: Any>(set: BuiltinSet) -> Arc<dyn crate::TypedConverter> {
		set.converters(&AffinityConfig::default())
			.into_iter()
			.find_map(|c| match c {
				Converter::Typed(t) if t.from_type() == TypeKey::of::<From>() && t.to_type() == TypeKey::of::<To>() => Some(t),
				_ => None,
			})
			.expect("builtin pair present")
	}

	#[test]
	fn names_round_trip() {
		for set in BuiltinSet::ALL {
			assert_eq!(BuiltinSet::from_name(set.name()), Some(set));
		}
		assert_eq!(BuiltinSet::from_name("nope"), None);
	}

	#[test]
	fn integer_text_parses_and_rejects() {
		let parse = typed_for::<String, i64>(BuiltinSet::NumericText);
		let out = parse.try_convert(&wrap(String::from(" 42 ")), None).unwrap();
		assert_eq!(downcast_ref::<i64>(&out), Some(&42));
		assert!(parse.try_convert(&wrap(String::from("4x2")), None).is_none());
	}

	#[test]
	fn float_text_honours_precision_hint() {
		let fmt = typed_for::<f64, String>(BuiltinSet::NumericText);
		let hint: &(dyn Any + Send + Sync) = &2_usize;
		let out = fmt.try_convert(&wrap(1.23456_f64), Some(hint)).unwrap();
		assert_eq!(downcast_ref::<String>(&out).map(String::as_str), Some("1.23"));

		let hint: &(dyn Any + Send + Sync) = &"1";
		let out = fmt.try_convert(&wrap(2.26_f64), Some(hint)).unwrap();
		assert_eq!(downcast_ref::<String>(&out).map(String::as_str), Some("2.3"));

		let out = fmt.try_convert(&wrap(0.5_f64), None).unwrap();
		assert_eq!(downcast_ref::<String>(&out).map(String::as_str), Some("0.5"));

		let fmt32 = typed_for::<f32, String>(BuiltinSet::NumericText);
		let out = fmt32.try_convert(&wrap(0.1_f32), None).unwrap();
		assert_eq!(downcast_ref::<String>(&out).map(String::as_str), Some("0.1"));
		let hint: &(dyn Any + Send + Sync) = &"3";
		let out = fmt32.try_convert(&wrap(0.1_f32), Some(hint)).unwrap();
		assert_eq!(downcast_ref::<String>(&out).map(String::as_str), Some("0.100"));
	}

	#[test]
	fn float_precision_hint_is_clamped() {
		let fmt = typed_for::<f64, String>(BuiltinSet::NumericText);
		let hint: &(dyn Any + Send + Sync) = &"1000000000000";
		let out = fmt.try_convert(&wrap(1.5_f64), Some(hint)).unwrap();
		assert_eq!(downcast_ref::<String>(&out).map(String::as_str), Some("1.50000000000000000"));

		let hint: &(dyn Any + Send + Sync) = &usize::MAX;
		let out = fmt.try_convert(&wrap(1.5_f64), Some(hint)).unwrap();
		assert_eq!(downcast_ref::<String>(&out).map(String::len), Some(2 + MAX_PRECISION));
	}

	#[test]
	fn bool_text_uses_configured_affinity() {
		let cfg = AffinityConfig { typed: 9, ..Default::default() };
		for c in BuiltinSet::BoolText.converters(&cfg) {
			let Converter::Typed(t) = c else {
				panic!("bool-text is typed only");
			};
			assert_eq!(t.affinity(), 9);
		}
	}

	#[test]
	fn identity_only_matches_equal_types() {
		let id = IdentityConverter::new(100);
		let i32_key = TypeKey::of::<i32>();
		assert_eq!(id.affinity(i32_key, i32_key), 100);
		assert_eq!(id.affinity(i32_key, TypeKey::of::<u32>()), 0);

		let v = wrap(3_i32);
		let out = id.try_convert(i32_key, &v, i32_key, None).unwrap();
		assert!(Arc::ptr_eq(&v, &out));
		assert!(id.try_convert(i32_key, &v, TypeKey::of::<String>(), None).is_none());
	}
}
