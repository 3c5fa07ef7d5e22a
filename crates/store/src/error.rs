use tessera_registry::RegistryError;
use thiserror::Error;

/// Errors raised while registering store extensions or patching state.
#[derive(Error, Debug)]
pub enum StoreError {
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// An action payload did not have the shape its reducer expects.
	#[error("malformed payload for {kind}: {source}")]
	Payload {
		kind: String,
		#[source]
		source: serde_json::Error,
	},
	/// A state path walked into a value that is neither an object nor null.
	#[error("cannot descend into non-object at '{path}'")]
	NotAnObject { path: String },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
