//! Registered extension entries, grouped by extension point.
//!
//! # Role
//!
//! The store is the source of truth for *what* was registered and *in which
//! order*. It lives inside an immutable registry state; writers clone the state,
//! mutate the clone and publish it. Per-point entry lists sit behind an `Arc` so
//! a clone only copies the list of the point being touched.
//!
//! # Invariants
//!
//! - Entries of a point are sorted by `seq` ascending (appends only).
//! - `seq` is registry-wide and never reused, so entries of different points
//!   are totally ordered as well.
//! - A point without entries is absent; its generation reads as zero.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Opaque handle returned by registration and consumed by unregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId(Uuid);

impl ExtensionId {
	pub(crate) fn new() -> Self {
		Self(Uuid::new_v4())
	}

	/// Returns the underlying UUID.
	pub fn as_uuid(&self) -> Uuid {
		self.0
	}
}

impl fmt::Display for ExtensionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// One contributed payload plus its registration identity and order.
#[derive(Debug, Clone)]
pub struct ExtensionEntry<P> {
	pub id: ExtensionId,
	pub payload: P,
	pub seq: u64,
}

#[derive(Debug, Clone)]
struct PointEntries<P> {
	entries: Arc<Vec<ExtensionEntry<P>>>,
	generation: u64,
}

/// Ordered entries per extension point.
#[derive(Debug, Clone)]
pub struct RegistryStore<P> {
	points: FxHashMap<Arc<str>, PointEntries<P>>,
	owners: FxHashMap<ExtensionId, Arc<str>>,
	next_seq: u64,
}

impl<P> Default for RegistryStore<P> {
	fn default() -> Self {
		Self {
			points: FxHashMap::default(),
			owners: FxHashMap::default(),
			next_seq: 0,
		}
	}
}

impl<P: Clone> RegistryStore<P> {
	/// Appends an entry to `point`, creating the point if needed.
	///
	/// Returns the sequence number assigned to the entry.
	pub(crate) fn insert(
		&mut self,
		point: &str,
		id: ExtensionId,
		payload: P,
		generation: u64,
	) -> u64 {
		let seq = self.next_seq;
		self.next_seq += 1;

		let name = match self.points.get_key_value(point) {
			Some((name, _)) => Arc::clone(name),
			None => Arc::from(point),
		};
		let slot = self
			.points
			.entry(Arc::clone(&name))
			.or_insert_with(|| PointEntries {
				entries: Arc::new(Vec::new()),
				generation,
			});
		Arc::make_mut(&mut slot.entries).push(ExtensionEntry { id, payload, seq });
		slot.generation = generation;
		self.owners.insert(id, name);
		seq
	}

	/// Removes the entry with `id` from whichever point holds it.
	///
	/// Returns the point the entry was removed from, or `None` for unknown ids.
	pub(crate) fn remove(&mut self, id: ExtensionId, generation: u64) -> Option<Arc<str>> {
		let name = self.owners.remove(&id)?;
		let slot = self.points.get_mut(&*name)?;
		Arc::make_mut(&mut slot.entries).retain(|entry| entry.id != id);
		slot.generation = generation;
		if slot.entries.is_empty() {
			self.points.remove(&*name);
		}
		Some(name)
	}
}

impl<P> RegistryStore<P> {
	/// Drops every point and entry. The sequence counter keeps counting.
	pub(crate) fn clear(&mut self) {
		self.points.clear();
		self.owners.clear();
	}

	/// Entries registered directly under `point`, in registration order.
	pub fn entries(&self, point: &str) -> &[ExtensionEntry<P>] {
		self.points
			.get(point)
			.map(|slot| slot.entries.as_slice())
			.unwrap_or_default()
	}

	/// Generation stamp of the last mutation to `point`, zero when absent.
	pub fn generation(&self, point: &str) -> u64 {
		self.points.get(point).map_or(0, |slot| slot.generation)
	}

	/// Returns true if `id` is currently registered.
	pub fn contains(&self, id: ExtensionId) -> bool {
		self.owners.contains_key(&id)
	}

	/// Returns the point `id` is registered under.
	pub fn point_of(&self, id: ExtensionId) -> Option<&str> {
		self.owners.get(&id).map(|name| &**name)
	}

	/// Names of all points holding at least one entry, sorted.
	pub fn points(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.points.keys().map(|name| &**name).collect();
		names.sort_unstable();
		names
	}

	/// Total number of registered entries.
	pub fn len(&self) -> usize {
		self.owners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.owners.is_empty()
	}
}
