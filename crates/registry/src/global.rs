//! Process-wide default registry.
//!
//! Modules loaded independently of each other meet here: one registers under a
//! point, another queries it. Payloads are type-erased; consumers downcast to
//! the shape documented for the point.
//!
//! Tests that need isolation should build their own [`ExtensionRegistry`]
//! instead, or call [`clear`] before each case.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use crate::cache::ExtensionMap;
use crate::catalog::{DocOptions, PointDocumentation};
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::registry::ExtensionRegistry;
use crate::store::ExtensionId;

/// Type-erased extension payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

static REGISTRY: LazyLock<ExtensionRegistry<Payload>> =
	LazyLock::new(|| ExtensionRegistry::with_config(RegistryConfig::named("global")));

/// Returns the process-wide registry.
pub fn registry() -> &'static ExtensionRegistry<Payload> {
	&REGISTRY
}

/// Wraps `value` as a [`Payload`].
pub fn payload<T: Any + Send + Sync>(value: T) -> Payload {
	Arc::new(value)
}

/// Borrows a payload as `T` if that is its concrete type.
pub fn downcast<T: Any>(payload: &Payload) -> Option<&T> {
	payload.downcast_ref::<T>()
}

pub fn register_extension(point: &str, payload: Payload) -> Result<ExtensionId> {
	REGISTRY.register_extension(point, payload)
}

pub fn unregister_extension(id: ExtensionId) {
	REGISTRY.unregister_extension(id);
}

pub fn document_extension_point(
	point: &str,
	description: impl Into<String>,
	validator: impl Fn(&Payload) -> bool + Send + Sync + 'static,
	options: impl Into<DocOptions>,
) -> Result<()> {
	REGISTRY.document_extension_point(point, description, validator, options)
}

pub fn extensions_for_point(point: &str) -> Arc<[Payload]> {
	REGISTRY.extensions_for_point(point)
}

pub fn extensions_for_points<I, S>(points: I) -> Arc<ExtensionMap<Payload>>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	REGISTRY.extensions_for_points(points)
}

pub fn extension_point_documentation() -> BTreeMap<String, PointDocumentation> {
	REGISTRY.extension_point_documentation()
}

/// Resets the process-wide registry to empty.
pub fn clear() {
	REGISTRY.clear();
}
