/// Errors raised while building a [`ConverterService`](crate::ConverterService) from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid service config: {0}")]
	Parse(#[from] toml::de::Error),

	/// A builtin set name that does not exist.
	#[error("unknown builtin converter set: {0:?}")]
	UnknownBuiltin(String),

	/// Builtin affinities must be positive or the builtins could never be selected.
	#[error("affinity for {set} must be positive, got {affinity}")]
	InvalidAffinity { set: &'static str, affinity: i32 },
}
