//! Memoized query results.
//!
//! # Role
//!
//! Queries return `Arc`s, and consumers compare those `Arc`s by pointer to skip
//! work. This module decides when a previously returned `Arc` is still valid.
//!
//! # Invariants
//!
//! - A single-point result is reused while its [`Fingerprint`] is unchanged.
//!   The fingerprint covers the canonical name, the generation of every merged
//!   member point, and the doc generation of the canonical point. Mutations to
//!   other points never touch it.
//! - An empty recomputation replacing an empty cached result keeps the cached
//!   `Arc`.
//! - A multi-point mapping is keyed by the sorted, deduplicated name set and is
//!   reused while every per-key `Arc` is pointer-equal to the ones it was
//!   assembled from. Argument order is irrelevant.
//! - Both memo tables are bounded; stability holds for the most recently used
//!   names within the configured capacity.
//! - A cached rejection keeps its verdict so every query of the point can
//!   report it.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use itertools::Itertools;
use lru::LruCache;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::registry::RegistryState;

/// Per-point results of a multi-point query.
pub type ExtensionMap<P> = BTreeMap<String, Arc<[P]>>;

/// Everything a single-point result depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fingerprint {
	canonical: Box<str>,
	members: SmallVec<[u64; 2]>,
	doc: u64,
}

impl Fingerprint {
	pub(crate) fn of<P>(state: &RegistryState<P>, point: &str) -> Self {
		let aliases = state.catalog.aliases();
		let canonical = aliases.canonical_of(point);
		Self {
			canonical: canonical.into(),
			members: aliases
				.merged_members(canonical)
				.iter()
				.map(|member| state.store.generation(member))
				.collect(),
			doc: state.catalog.generation(canonical),
		}
	}

	pub(crate) fn canonical(&self) -> &str {
		&self.canonical
	}
}

/// Outcome of gathering a point's candidates and running its validator.
pub(crate) enum Gathered<P> {
	/// No doc, hence no validator: the point is empty.
	Undocumented,
	/// The validator rejected at least one candidate: the point is empty.
	Rejected(Rejection),
	Accepted(Vec<P>),
}

/// Collects the entries of `canonical` and its legacy name merged by sequence
/// number, then applies the point-level validator gate.
pub(crate) fn gather<P: Clone>(state: &RegistryState<P>, canonical: &str) -> Gathered<P> {
	let Some(doc) = state.catalog.lookup(canonical) else {
		return Gathered::Undocumented;
	};

	let candidates: Vec<_> = state
		.catalog
		.aliases()
		.merged_members(canonical)
		.iter()
		.map(|member| state.store.entries(member).iter())
		.kmerge_by(|a, b| a.seq < b.seq)
		.collect();

	let rejected = candidates
		.iter()
		.filter(|entry| !doc.validate(&entry.payload))
		.count();
	if rejected > 0 {
		return Gathered::Rejected(Rejection {
			rejected,
			total: candidates.len(),
		});
	}

	Gathered::Accepted(
		candidates
			.into_iter()
			.map(|entry| entry.payload.clone())
			.collect(),
	)
}

struct CachedPoint<P> {
	fingerprint: Fingerprint,
	value: Arc<[P]>,
	rejection: Option<Rejection>,
}

struct CachedSet<P> {
	parts: Vec<Arc<[P]>>,
	value: Arc<ExtensionMap<P>>,
}

/// Validator verdict recorded with an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rejection {
	pub(crate) rejected: usize,
	pub(crate) total: usize,
}

/// A single-point result as served to callers.
pub(crate) struct Served<P> {
	pub(crate) value: Arc<[P]>,
	pub(crate) rejection: Option<Rejection>,
}

/// One-time notice bookkeeping.
#[derive(Default)]
pub(crate) struct Notices {
	undocumented: FxHashSet<Box<str>>,
	renamed: FxHashSet<(Box<str>, Box<str>)>,
}

impl Notices {
	/// Returns true the first time `point` is reported as undocumented.
	pub(crate) fn first_undocumented(&mut self, point: &str) -> bool {
		if self.undocumented.contains(point) {
			return false;
		}
		self.undocumented.insert(point.into())
	}

	/// Returns true the first time the `legacy -> canonical` rename is reported.
	pub(crate) fn first_rename(&mut self, legacy: &str, canonical: &str) -> bool {
		self.renamed.insert((legacy.into(), canonical.into()))
	}

	/// Re-arms the rename notice of a link that no longer exists.
	pub(crate) fn forget_rename(&mut self, legacy: &str, canonical: &str) {
		self.renamed.remove(&(Box::from(legacy), Box::from(canonical)));
	}
}

/// Bounded memo of single-point and name-set results.
///
/// Both maps evict least recently used entries once `capacity` is reached. An
/// evicted point is recomputed on its next query and gets a fresh `Arc`.
pub(crate) struct QueryCache<P> {
	points: LruCache<Box<str>, CachedPoint<P>>,
	sets: LruCache<Box<[Box<str>]>, CachedSet<P>>,
	pub(crate) notices: Notices,
}

impl<P> QueryCache<P> {
	pub(crate) fn new(capacity: NonZeroUsize) -> Self {
		Self {
			points: LruCache::new(capacity),
			sets: LruCache::new(capacity),
			notices: Notices::default(),
		}
	}

	/// Cached result for `point` if it was computed under `fingerprint`.
	pub(crate) fn point(&mut self, point: &str, fingerprint: &Fingerprint) -> Option<Served<P>> {
		self.points
			.get(point)
			.filter(|cached| cached.fingerprint == *fingerprint)
			.map(|cached| Served {
				value: Arc::clone(&cached.value),
				rejection: cached.rejection,
			})
	}

	/// Installs a freshly computed result and returns the `Arc` callers should see.
	pub(crate) fn install_point(
		&mut self,
		point: &str,
		fingerprint: Fingerprint,
		served: Served<P>,
	) -> Arc<[P]> {
		let Served { value, rejection } = served;
		let value = match self.points.peek(point) {
			Some(cached) if cached.fingerprint == fingerprint => Arc::clone(&cached.value),
			Some(cached) if cached.value.is_empty() && value.is_empty() => {
				Arc::clone(&cached.value)
			}
			_ => value,
		};
		self.points.put(
			point.into(),
			CachedPoint {
				fingerprint,
				value: Arc::clone(&value),
				rejection,
			},
		);
		value
	}

	/// Cached mapping for `keys` if it was assembled from exactly `parts`.
	fn set(
		&mut self,
		keys: &[Box<str>],
		parts: &[Arc<[P]>],
	) -> Option<Arc<ExtensionMap<P>>> {
		let cached = self.sets.get(keys)?;
		let unchanged = cached.parts.len() == parts.len()
			&& cached
				.parts
				.iter()
				.zip(parts)
				.all(|(old, new)| Arc::ptr_eq(old, new));
		unchanged.then(|| Arc::clone(&cached.value))
	}

	/// Returns the mapping for `keys`, reusing the cached one when `parts` match.
	pub(crate) fn install_set(
		&mut self,
		keys: Box<[Box<str>]>,
		parts: Vec<Arc<[P]>>,
	) -> Arc<ExtensionMap<P>> {
		if let Some(existing) = self.set(&keys, &parts) {
			return existing;
		}
		let value: Arc<ExtensionMap<P>> = Arc::new(
			keys.iter()
				.zip(&parts)
				.map(|(key, part)| (key.to_string(), Arc::clone(part)))
				.collect(),
		);
		self.sets.put(
			keys,
			CachedSet {
				parts,
				value: Arc::clone(&value),
			},
		);
		value
	}

	pub(crate) fn clear(&mut self) {
		self.points.clear();
		self.sets.clear();
		self.notices = Notices::default();
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> (usize, usize) {
		(self.points.len(), self.sets.len())
	}
}
