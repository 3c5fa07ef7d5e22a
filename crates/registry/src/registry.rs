//! The extension registry.
//!
//! # Role
//!
//! [`ExtensionRegistry`] composes the entry store, the validator catalog and the
//! query cache into one constructible, resettable object. Independent
//! registries can coexist (tests build their own); production code normally
//! uses the process-wide instance in [`crate::global`].
//!
//! # Concurrency
//!
//! The registry expects a single logical thread of control, but is `Sync` so
//! it can live in a `static`:
//!
//! - Store and catalog form one immutable [`RegistryState`] published through
//!   `ArcSwap`. Writers clone, mutate and compare-and-swap in a retry loop.
//! - The query cache sits behind a mutex that is never held while a validator
//!   runs, so validators may call back into the registry.
//!
//! # Invariants
//!
//! - Every mutation is visible to the next query.
//! - Every mutation of a point stamps it with a fresh value of the registry
//!   clock. The clock survives [`ExtensionRegistry::clear`], so a stamp is
//!   never reused.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{self, ExtensionMap, Fingerprint, Gathered, QueryCache, Rejection, Served};
use crate::catalog::{
	DocOptions, ExtensionPointDoc, PointDocumentation, Validator, ValidatorCatalog,
};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::store::{ExtensionId, RegistryStore};

/// Immutable registry contents: entries plus docs.
pub(crate) struct RegistryState<P> {
	pub(crate) store: RegistryStore<P>,
	pub(crate) catalog: ValidatorCatalog<P>,
	clock: u64,
}

impl<P> Default for RegistryState<P> {
	fn default() -> Self {
		Self {
			store: RegistryStore::default(),
			catalog: ValidatorCatalog::default(),
			clock: 0,
		}
	}
}

impl<P: Clone> Clone for RegistryState<P> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			catalog: self.catalog.clone(),
			clock: self.clock,
		}
	}
}

impl<P> RegistryState<P> {
	fn tick(&mut self) -> u64 {
		self.clock += 1;
		self.clock
	}
}

/// Process-local registry of extensions contributed under named points.
pub struct ExtensionRegistry<P> {
	config: RegistryConfig,
	state: ArcSwap<RegistryState<P>>,
	cache: Mutex<QueryCache<P>>,
}

impl<P> Default for ExtensionRegistry<P>
where
	P: Clone + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<P> ExtensionRegistry<P>
where
	P: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self::with_config(RegistryConfig::default())
	}

	pub fn with_config(config: RegistryConfig) -> Self {
		let cache = Mutex::new(QueryCache::new(config.capacity()));
		Self {
			config,
			state: ArcSwap::from_pointee(RegistryState::default()),
			cache,
		}
	}

	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	/// Registers `payload` under `point` and returns its handle.
	///
	/// Fails with [`RegistryError::InvalidArgument`] if `point` is empty.
	pub fn register_extension(&self, point: &str, payload: P) -> Result<ExtensionId> {
		if point.is_empty() {
			return Err(RegistryError::missing_point("register an extension"));
		}

		let id = ExtensionId::new();
		let seq = self.update(|state| {
			let generation = state.tick();
			state.store.insert(point, id, payload.clone(), generation)
		});
		debug!(registry = %self.config.label, point, %id, seq, "registered extension");
		Ok(id)
	}

	/// Removes the extension registered as `id`.
	///
	/// Unknown ids are ignored so teardown may unregister twice. Returns whether
	/// an entry was removed.
	pub fn unregister_extension(&self, id: ExtensionId) -> bool {
		if !self.state.load().store.contains(id) {
			return false;
		}

		let removed = self.update(|state| {
			let generation = state.tick();
			state.store.remove(id, generation)
		});
		match removed {
			Some(point) => {
				debug!(registry = %self.config.label, point = &*point, %id, "unregistered extension");
				true
			}
			None => false,
		}
	}

	/// Documents `point`, replacing any previous documentation.
	///
	/// `options` accepts a [`DocOptions`] or a bare URL string. A legacy name
	/// links the old point name to `point`: queries against either name see
	/// the merged entries of both.
	pub fn document_extension_point(
		&self,
		point: &str,
		description: impl Into<String>,
		validator: impl Fn(&P) -> bool + Send + Sync + 'static,
		options: impl Into<DocOptions>,
	) -> Result<()> {
		if point.is_empty() {
			return Err(RegistryError::missing_point("document an extension point"));
		}
		let DocOptions { url, legacy_name } = options.into();
		let legacy_name = legacy_name.filter(|legacy| !legacy.is_empty());
		if legacy_name.as_deref() == Some(point) {
			return Err(RegistryError::InvalidArgument(format!(
				"extension point {point} cannot be its own legacy name"
			)));
		}

		let description = description.into();
		let validator: Validator<P> = Arc::new(validator);
		let unlinked = self.update(|state| {
			let before = state.catalog.aliases().clone();
			let generation = state.tick();
			state.catalog.document(ExtensionPointDoc::new(
				point,
				description.clone(),
				Arc::clone(&validator),
				url.clone(),
				legacy_name.as_deref(),
				generation,
			));
			let after = state.catalog.aliases();
			before
				.links()
				.filter(|&(legacy, canonical)| after.canonical_of(legacy) != canonical)
				.map(|(legacy, canonical)| (Box::<str>::from(legacy), Box::<str>::from(canonical)))
				.collect::<Vec<_>>()
		});
		if !unlinked.is_empty() {
			let mut cache = self.cache.lock();
			for (legacy, canonical) in &unlinked {
				cache.notices.forget_rename(legacy, canonical);
			}
		}
		debug!(
			registry = %self.config.label,
			point,
			legacy = legacy_name.as_deref(),
			"documented extension point"
		);
		Ok(())
	}

	/// Validated extensions of `point`, in registration order.
	///
	/// Repeated calls return the same `Arc` until `point` (or its alias) is
	/// mutated or documented.
	pub fn extensions_for_point(&self, point: &str) -> Arc<[P]> {
		let state = self.state.load_full();
		self.resolve(&state, point)
	}

	/// Validated extensions for several points at once.
	///
	/// The returned mapping is cached by the set of names, so asking for the
	/// same names in any order yields the same `Arc` while none of them changed.
	pub fn extensions_for_points<I, S>(&self, points: I) -> Arc<ExtensionMap<P>>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let state = self.state.load_full();
		let mut keys: Vec<Box<str>> = points
			.into_iter()
			.map(|point| Box::from(point.as_ref()))
			.collect();
		keys.sort_unstable();
		keys.dedup();

		let parts: Vec<Arc<[P]>> = keys.iter().map(|key| self.resolve(&state, key)).collect();
		self.cache.lock().install_set(keys.into_boxed_slice(), parts)
	}

	/// Description and URL of every documented point.
	pub fn extension_point_documentation(&self) -> BTreeMap<String, PointDocumentation> {
		self.state.load().catalog.all_docs()
	}

	/// Full documentation of one point, validator included.
	pub fn documentation(&self, point: &str) -> Option<Arc<ExtensionPointDoc<P>>> {
		self.state.load().catalog.lookup(point).cloned()
	}

	/// Drops every entry, doc, cached result and notice.
	pub fn clear(&self) {
		self.update(|state| {
			state.tick();
			state.store.clear();
			state.catalog.clear();
		});
		self.cache.lock().clear();
		debug!(registry = %self.config.label, "cleared extension registry");
	}

	/// Runs `f` against the current store and catalog.
	pub fn with_state<R>(
		&self,
		f: impl FnOnce(&RegistryStore<P>, &ValidatorCatalog<P>) -> R,
	) -> R {
		let state = self.state.load();
		f(&state.store, &state.catalog)
	}

	/// Points holding at least one entry, sorted.
	pub fn points(&self) -> Vec<String> {
		self.with_state(|store, _| store.points().into_iter().map(str::to_string).collect())
	}

	/// Number of registered entries across all points.
	pub fn len(&self) -> usize {
		self.state.load().store.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn update<R>(&self, mut f: impl FnMut(&mut RegistryState<P>) -> R) -> R {
		loop {
			let cur = self.state.load_full();
			let mut next = (*cur).clone();
			let out = f(&mut next);

			let prev = self.state.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&*prev, &cur) {
				return out;
			}
		}
	}

	fn resolve(&self, state: &RegistryState<P>, point: &str) -> Arc<[P]> {
		let fingerprint = Fingerprint::of(state, point);
		let cached = self.cache.lock().point(point, &fingerprint);
		match cached {
			Some(hit) => {
				self.report_rejection(fingerprint.canonical(), hit.rejection);
				hit.value
			}
			None => {
				let served = self.compute(state, point, fingerprint.canonical());
				self.report_rejection(fingerprint.canonical(), served.rejection);
				self.cache.lock().install_point(point, fingerprint, served)
			}
		}
	}

	/// Rejections are reported on every query, cached or not.
	fn report_rejection(&self, canonical: &str, rejection: Option<Rejection>) {
		let Some(Rejection { rejected, total }) = rejection else {
			return;
		};
		if self.config.warn_rejections {
			warn!(
				registry = %self.config.label,
				point = canonical,
				rejected,
				total,
				"validator for extension point {canonical} rejected {rejected} of {total} extensions; none are exposed"
			);
		}
	}

	fn compute(&self, state: &RegistryState<P>, point: &str, canonical: &str) -> Served<P> {
		let label = &self.config.label;
		if point != canonical
			&& self.config.warn_renames
			&& self.cache.lock().notices.first_rename(point, canonical)
		{
			warn!(
				registry = %label,
				legacy = point,
				canonical,
				"extension point renamed from {point} to {canonical}"
			);
		}

		let (value, rejection) = match cache::gather(state, canonical) {
			Gathered::Accepted(payloads) => (Arc::from(payloads), None),
			Gathered::Undocumented => {
				if self.config.warn_undocumented
					&& self.cache.lock().notices.first_undocumented(canonical)
				{
					warn!(
						registry = %label,
						point = canonical,
						"extension point {canonical} is not documented; its extensions stay hidden until it is"
					);
				}
				(Arc::from(Vec::new()), None)
			}
			Gathered::Rejected(rejection) => (Arc::from(Vec::new()), Some(rejection)),
		};
		Served { value, rejection }
	}
}
