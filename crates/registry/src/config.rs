//! Registry configuration.
//!
//! Hosts usually embed this in their own configuration file; every field has a
//! default so a partial table deserializes.

use std::num::NonZeroUsize;

use serde::Deserialize;

/// Tunables for an [`ExtensionRegistry`](crate::ExtensionRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RegistryConfig {
	/// Label attached to every log event emitted by the registry.
	pub label: String,
	/// Warn the first time an undocumented point is queried.
	pub warn_undocumented: bool,
	/// Warn whenever a validator hides a point's extensions.
	pub warn_rejections: bool,
	/// Warn the first time a legacy point name is queried after its alias
	/// was introduced.
	pub warn_renames: bool,
	/// Most recently used point names and name sets kept in the query cache.
	pub cache_capacity: usize,
}

impl RegistryConfig {
	/// Default configuration with a custom label.
	pub fn named(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			..Self::default()
		}
	}

	/// Disables every notice. Useful for headless hosts and benchmarks.
	pub fn quiet(mut self) -> Self {
		self.warn_undocumented = false;
		self.warn_rejections = false;
		self.warn_renames = false;
		self
	}

	/// Query cache capacity; zero is treated as one.
	pub(crate) fn capacity(&self) -> NonZeroUsize {
		NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
	}
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			label: "extensions".to_string(),
			warn_undocumented: true,
			warn_rejections: true,
			warn_renames: true,
			cache_capacity: 1024,
		}
	}
}
