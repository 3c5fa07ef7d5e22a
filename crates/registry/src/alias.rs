//! Legacy point names.
//!
//! Links are derived from the `legacy_name` of documented points and rebuilt
//! whenever such a doc is added or overwritten. Nothing is migrated: queries
//! join the canonical and legacy entry lists on demand.
//!
//! Aliases are one hop. A legacy name resolves to exactly one canonical name;
//! when several docs claim the same legacy name, the most recently documented
//! claim wins. A name is never both legacy and canonical: a newer claim that
//! would chain or cycle two links drops the older link it collides with.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::catalog::ExtensionPointDoc;

/// Derived `legacy -> canonical` relation.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
	canonical_by_legacy: FxHashMap<Arc<str>, Arc<str>>,
	legacy_by_canonical: FxHashMap<Arc<str>, Arc<str>>,
}

/// Underlying point names whose entries answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Members<'a> {
	pub canonical: &'a str,
	pub legacy: Option<&'a str>,
}

impl<'a> Members<'a> {
	pub fn iter(self) -> impl Iterator<Item = &'a str> {
		std::iter::once(self.canonical).chain(self.legacy)
	}
}

impl AliasResolver {
	pub(crate) fn rebuild<'a, P: 'a>(
		docs: impl IntoIterator<Item = &'a ExtensionPointDoc<P>>,
	) -> Self {
		let mut claims: Vec<_> = docs
			.into_iter()
			.filter_map(|doc| {
				let legacy = doc.legacy_name.clone()?;
				Some((doc.generation, legacy, Arc::clone(&doc.name)))
			})
			.collect();
		claims.sort_unstable_by_key(|(generation, ..)| *generation);

		let mut resolver = Self::default();
		for (_, legacy, canonical) in claims {
			// `canonical` was itself claimed as a legacy name.
			if let Some(target) = resolver.canonical_by_legacy.remove(&canonical) {
				resolver.legacy_by_canonical.remove(&target);
			}
			// `legacy` is itself the canonical name of an older link.
			if let Some(older) = resolver.legacy_by_canonical.remove(&legacy) {
				resolver.canonical_by_legacy.remove(&older);
			}
			if let Some(previous) = resolver
				.canonical_by_legacy
				.insert(Arc::clone(&legacy), Arc::clone(&canonical))
			{
				resolver.legacy_by_canonical.remove(&previous);
			}
			resolver.legacy_by_canonical.insert(canonical, legacy);
		}
		resolver
	}

	/// Current `(legacy, canonical)` links, in no particular order.
	pub(crate) fn links(&self) -> impl Iterator<Item = (&str, &str)> {
		self.canonical_by_legacy
			.iter()
			.map(|(legacy, canonical)| (&**legacy, &**canonical))
	}

	/// Canonical name for `name`; identity when no alias applies.
	pub fn canonical_of<'a>(&'a self, name: &'a str) -> &'a str {
		self.canonical_by_legacy
			.get(name)
			.map_or(name, |canonical| &**canonical)
	}

	/// Legacy name currently linked to `canonical`.
	pub fn legacy_of(&self, canonical: &str) -> Option<&str> {
		self.legacy_by_canonical.get(canonical).map(|legacy| &**legacy)
	}

	/// Returns true if `name` is a legacy alias of some other point.
	pub fn is_legacy(&self, name: &str) -> bool {
		self.canonical_by_legacy.contains_key(name)
	}

	/// Point names merged to answer a query against `canonical` or its legacy name.
	pub fn merged_members<'a>(&'a self, canonical: &'a str) -> Members<'a> {
		Members {
			canonical,
			legacy: self.legacy_of(canonical),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.canonical_by_legacy.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::ExtensionPointDoc;

	fn doc(name: &str, legacy: Option<&str>, generation: u64) -> ExtensionPointDoc<()> {
		ExtensionPointDoc::new(name, "desc", Arc::new(|_: &()| true), None, legacy, generation)
	}

	#[test]
	fn unlinked_names_resolve_to_themselves() {
		let resolver = AliasResolver::rebuild([&doc("a", None, 1)]);
		assert!(resolver.is_empty());
		assert_eq!(resolver.canonical_of("a"), "a");
		assert_eq!(resolver.merged_members("a").iter().collect::<Vec<_>>(), ["a"]);
	}

	#[test]
	fn legacy_name_resolves_to_canonical() {
		let resolver = AliasResolver::rebuild([&doc("a-2", Some("a-1"), 1)]);
		assert_eq!(resolver.canonical_of("a-1"), "a-2");
		assert_eq!(resolver.canonical_of("a-2"), "a-2");
		assert!(resolver.is_legacy("a-1"));
		assert_eq!(
			resolver.merged_members("a-2").iter().collect::<Vec<_>>(),
			["a-2", "a-1"]
		);
	}

	#[test]
	fn latest_claim_on_a_legacy_name_wins() {
		let older = doc("b", Some("old"), 1);
		let newer = doc("c", Some("old"), 2);
		let resolver = AliasResolver::rebuild([&newer, &older]);

		assert_eq!(resolver.canonical_of("old"), "c");
		assert_eq!(resolver.legacy_of("c"), Some("old"));
		assert_eq!(resolver.legacy_of("b"), None);
	}

	#[test]
	fn mutual_claims_keep_only_the_newer_link() {
		let a = doc("a", Some("b"), 1);
		let b = doc("b", Some("a"), 2);
		let resolver = AliasResolver::rebuild([&a, &b]);

		assert_eq!(resolver.canonical_of("a"), "b");
		assert_eq!(resolver.canonical_of("b"), "b");
		assert_eq!(resolver.legacy_of("a"), None);
		assert_eq!(resolver.links().collect::<Vec<_>>(), [("a", "b")]);
	}

	#[test]
	fn chained_claims_stay_one_hop() {
		let older = doc("b", Some("a"), 1);
		let newer = doc("c", Some("b"), 2);
		let resolver = AliasResolver::rebuild([&older, &newer]);

		assert_eq!(resolver.canonical_of("b"), "c");
		assert_eq!(resolver.canonical_of("a"), "a");
		assert!(!resolver.is_legacy("a"));
	}
}
