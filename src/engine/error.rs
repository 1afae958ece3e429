use thiserror::Error;

/// Failure to decode a graph description at the host boundary.
///
/// Structural problems inside a well-formed document (dangling references,
/// missing clusters, duplicate ids) are normalized instead and show up in the
/// [`LoadReport`](super::graph::LoadReport).
#[derive(Debug, Error)]
pub enum GraphLoadError {
	/// Not JSON, or a field with an unusable shape.
	#[error("could not decode graph description: {0}")]
	Json(#[from] serde_json::Error),
}

/// Failure to decode an [`EngineConfig`](super::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Not JSON, or a value of the wrong type.
	#[error("invalid engine configuration: {0}")]
	Json(#[from] serde_json::Error),
	/// Well-formed but unusable, such as an inverted zoom range.
	#[error("invalid engine configuration: {0}")]
	Invalid(String),
}
