use thiserror::Error;

/// Invalid-argument failures raised synchronously by combinator constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
	#[error("combine_latest_all requires at least one source")]
	NoSources,
	#[error("property name must not be empty")]
	EmptyPropertyName,
}
