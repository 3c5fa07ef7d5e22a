use thiserror::Error;

/// Errors returned synchronously by registry mutations.
///
/// Only argument validation fails loudly. Query-side anomalies (undocumented
/// points, validator rejections, renamed points) are logged and degrade to an
/// empty result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	/// A required argument was missing or malformed.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),
}

impl RegistryError {
	pub(crate) fn missing_point(operation: &str) -> Self {
		Self::InvalidArgument(format!(
			"extension point name is required to {operation}"
		))
	}
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
