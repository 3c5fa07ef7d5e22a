//! Extension point documentation and validators.
//!
//! Each documented point carries a description for help surfaces, a validator
//! gating whether the point's entries are exposed, and optionally an external
//! documentation URL and the legacy name the point was renamed from.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::alias::AliasResolver;

/// Predicate gating a point's entries.
pub type Validator<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;

/// Optional documentation fields.
///
/// A bare string converts into the URL field, so
/// `registry.document_extension_point(p, d, v, "https://...")` keeps working.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocOptions {
	pub url: Option<String>,
	pub legacy_name: Option<String>,
}

impl DocOptions {
	pub fn url(url: impl Into<String>) -> Self {
		Self {
			url: Some(url.into()),
			legacy_name: None,
		}
	}

	pub fn legacy_name(name: impl Into<String>) -> Self {
		Self {
			url: None,
			legacy_name: Some(name.into()),
		}
	}

	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	pub fn with_legacy_name(mut self, name: impl Into<String>) -> Self {
		self.legacy_name = Some(name.into());
		self
	}
}

impl From<&str> for DocOptions {
	fn from(url: &str) -> Self {
		Self::url(url)
	}
}

impl From<String> for DocOptions {
	fn from(url: String) -> Self {
		Self::url(url)
	}
}

/// Documentation of one extension point.
pub struct ExtensionPointDoc<P> {
	pub name: Arc<str>,
	pub description: String,
	pub validator: Validator<P>,
	pub external_documentation_url: Option<String>,
	pub legacy_name: Option<Arc<str>>,
	/// Registry clock value when this doc was written.
	pub(crate) generation: u64,
}

impl<P> ExtensionPointDoc<P> {
	pub(crate) fn new(
		name: &str,
		description: impl Into<String>,
		validator: Validator<P>,
		url: Option<String>,
		legacy_name: Option<&str>,
		generation: u64,
	) -> Self {
		Self {
			name: Arc::from(name),
			description: description.into(),
			validator,
			external_documentation_url: url,
			legacy_name: legacy_name.map(Arc::from),
			generation,
		}
	}

	/// Runs the validator against one payload.
	pub fn validate(&self, payload: &P) -> bool {
		(self.validator)(payload)
	}

	pub fn documentation(&self) -> PointDocumentation {
		PointDocumentation {
			description: self.description.clone(),
			external_documentation_url: self.external_documentation_url.clone(),
			legacy_name: self.legacy_name.as_deref().map(str::to_string),
		}
	}
}

impl<P> fmt::Debug for ExtensionPointDoc<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExtensionPointDoc")
			.field("name", &self.name)
			.field("description", &self.description)
			.field("external_documentation_url", &self.external_documentation_url)
			.field("legacy_name", &self.legacy_name)
			.field("generation", &self.generation)
			.finish_non_exhaustive()
	}
}

/// Introspection view of a documented point, as shown by help surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDocumentation {
	pub description: String,
	pub external_documentation_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub legacy_name: Option<String>,
}

/// Docs keyed by point name, plus the alias links derived from them.
pub struct ValidatorCatalog<P> {
	docs: FxHashMap<Arc<str>, Arc<ExtensionPointDoc<P>>>,
	aliases: AliasResolver,
}

impl<P> Clone for ValidatorCatalog<P> {
	fn clone(&self) -> Self {
		Self {
			docs: self.docs.clone(),
			aliases: self.aliases.clone(),
		}
	}
}

impl<P> Default for ValidatorCatalog<P> {
	fn default() -> Self {
		Self {
			docs: FxHashMap::default(),
			aliases: AliasResolver::default(),
		}
	}
}

impl<P> ValidatorCatalog<P> {
	/// Stores `doc`, replacing any previous doc of the same name.
	pub(crate) fn document(&mut self, doc: ExtensionPointDoc<P>) {
		let relink = doc.legacy_name.is_some();
		let doc = Arc::new(doc);
		let previous = self.docs.insert(Arc::clone(&doc.name), doc);
		let unlinked = previous.is_some_and(|prev| prev.legacy_name.is_some());
		if relink || unlinked {
			self.aliases = AliasResolver::rebuild(self.docs.values().map(|doc| &**doc));
		}
	}

	pub(crate) fn clear(&mut self) {
		self.docs.clear();
		self.aliases = AliasResolver::default();
	}

	pub fn lookup(&self, point: &str) -> Option<&Arc<ExtensionPointDoc<P>>> {
		self.docs.get(point)
	}

	/// Doc generation of `point`, zero when undocumented.
	pub fn generation(&self, point: &str) -> u64 {
		self.docs.get(point).map_or(0, |doc| doc.generation)
	}

	pub fn aliases(&self) -> &AliasResolver {
		&self.aliases
	}

	/// All documented points, sorted by name.
	pub fn all_docs(&self) -> BTreeMap<String, PointDocumentation> {
		self.docs
			.iter()
			.map(|(name, doc)| (name.to_string(), doc.documentation()))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn always(_: &u32) -> bool {
		true
	}

	fn doc(name: &str, options: DocOptions, generation: u64) -> ExtensionPointDoc<u32> {
		ExtensionPointDoc::new(
			name,
			"desc",
			Arc::new(always),
			options.url,
			options.legacy_name.as_deref(),
			generation,
		)
	}

	#[test]
	fn bare_string_is_a_url() {
		let options = DocOptions::from("http://www.example.com");
		assert_eq!(options.url.as_deref(), Some("http://www.example.com"));
		assert!(options.legacy_name.is_none());
	}

	#[test]
	fn later_doc_overwrites_earlier() {
		let mut catalog = ValidatorCatalog::default();
		catalog.document(doc("a", DocOptions::url("http://one"), 1));
		catalog.document(doc("a", DocOptions::url("http://two"), 2));

		assert_eq!(catalog.len(), 1);
		assert_eq!(catalog.generation("a"), 2);
		assert_eq!(
			catalog.all_docs()["a"].external_documentation_url.as_deref(),
			Some("http://two")
		);
	}

	#[test]
	fn dropping_a_legacy_name_unlinks_it() {
		let mut catalog = ValidatorCatalog::default();
		catalog.document(doc("a-2", DocOptions::legacy_name("a-1"), 1));
		assert_eq!(catalog.aliases().canonical_of("a-1"), "a-2");

		catalog.document(doc("a-2", DocOptions::default(), 2));
		assert_eq!(catalog.aliases().canonical_of("a-1"), "a-1");
		assert!(catalog.aliases().is_empty());
	}

	#[test]
	fn documentation_serializes_for_help_surfaces() {
		let mut catalog = ValidatorCatalog::default();
		catalog.document(doc(
			"a",
			DocOptions::url("http://www.example.com").with_legacy_name("old-a"),
			1,
		));
		catalog.document(doc("b", DocOptions::default(), 2));

		let json = serde_json::to_value(catalog.all_docs()).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"a": {
					"description": "desc",
					"externalDocumentationUrl": "http://www.example.com",
					"legacyName": "old-a",
				},
				"b": {
					"description": "desc",
					"externalDocumentationUrl": null,
				},
			})
		);
	}
}
