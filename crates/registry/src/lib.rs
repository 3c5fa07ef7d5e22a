//! Extension points and the extensions contributed to them.
//!
//! Independently loaded modules register payloads ("extensions") under named
//! extension points; other modules query them. Each point is documented with a
//! description and a validator that gates whether its extensions are exposed.
//! Renamed points keep working through legacy-name aliases, and query results
//! are cached by identity so an unchanged registry hands back the same `Arc`.
//!
//! # Mental Model
//!
//! 1. **Register:** [`ExtensionRegistry::register_extension`] appends to a
//!    point's entries and returns an [`ExtensionId`] for later removal.
//! 2. **Document:** [`ExtensionRegistry::document_extension_point`] installs the
//!    point's validator, optional URL and optional legacy name.
//! 3. **Query:** [`ExtensionRegistry::extensions_for_point`] and
//!    [`ExtensionRegistry::extensions_for_points`] merge aliased entries by
//!    registration order, apply the validator and memoize the result.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`ExtensionRegistry`] | Constructible, resettable registry. |
//! | [`RegistryStore`] | Entries per point, in registration order. |
//! | [`ValidatorCatalog`] | Docs and validators per point. |
//! | [`AliasResolver`] | Legacy to canonical point names. |
//! | [`global`] | Process-wide default instance with type-erased payloads. |
//!
//! # Soft failures
//!
//! Only an empty point name is an error. Undocumented points, validator
//! rejections and renamed points are reported through `tracing` warnings and
//! produce empty or merged results instead.

mod alias;
mod cache;
mod catalog;
mod config;
mod error;
pub mod global;
mod registry;
mod store;

pub use alias::{AliasResolver, Members};
pub use cache::ExtensionMap;
pub use catalog::{DocOptions, ExtensionPointDoc, PointDocumentation, Validator, ValidatorCatalog};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use global::Payload;
pub use registry::ExtensionRegistry;
pub use store::{ExtensionEntry, ExtensionId, RegistryStore};
