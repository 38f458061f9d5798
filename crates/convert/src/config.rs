//! Service configuration.
//!
//! ```toml
//! builtins = ["numeric-text", "bool-text", "identity"]
//!
//! [affinity]
//! typed = 2
//! identity = 100
//! ```
//!
//! Omitting `builtins` installs every builtin set; an empty list installs none.

use serde::Deserialize;

use crate::builtins::BuiltinSet;
use crate::error::ConfigError;

/// Configuration for [`ConverterService::from_config`](crate::ConverterService::from_config).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
	/// Builtin sets to install, by name. `None` means all of them.
	pub builtins: Option<Vec<String>>,
	pub affinity: AffinityConfig,
}

/// Affinities reported by the builtin converters.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AffinityConfig {
	/// Affinity of every builtin typed converter.
	pub typed: i32,
	/// Affinity the identity fallback reports for equal types.
	pub identity: i32,
}

impl AffinityConfig {
	pub const DEFAULT_TYPED: i32 = 2;
	pub const DEFAULT_IDENTITY: i32 = 100;
}

impl Default for AffinityConfig {
	fn default() -> Self {
		Self {
			typed: Self::DEFAULT_TYPED,
			identity: Self::DEFAULT_IDENTITY,
		}
	}
}

impl ServiceConfig {
	pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(s)?)
	}

	/// Resolves builtin names and checks affinities.
	pub fn builtin_sets(&self) -> Result<Vec<BuiltinSet>, ConfigError> {
		for (set, affinity) in [("typed", self.affinity.typed), ("identity", self.affinity.identity)] {
			if affinity <= 0 {
				return Err(ConfigError::InvalidAffinity { set, affinity });
			}
		}

		let Some(names) = &self.builtins else {
			return Ok(BuiltinSet::ALL.to_vec());
		};

		let mut sets = Vec::with_capacity(names.len());
		for name in names {
			let set = BuiltinSet::from_name(name).ok_or_else(|| ConfigError::UnknownBuiltin(name.clone()))?;
			if !sets.contains(&set) {
				sets.push(set);
			}
		}
		Ok(sets)
	}
}
