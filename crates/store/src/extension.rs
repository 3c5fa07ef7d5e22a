//! Store reducers contributed through the registry.
//!
//! # Role
//!
//! Each [`StoreExtension`] owns one top-level key of the application state.
//! [`reduce`] folds an action through every exposed extension in registration
//! order; [`undo_action_for`] finds how to reverse and replay an action.
//!
//! # Invariants
//!
//! - An extension only sees and replaces `state[key]`.
//! - When the store point is hidden (undocumented or rejected by its
//!   validator) no reducer runs and the state passes through unchanged.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tessera_registry::{DocOptions, ExtensionId, ExtensionRegistry, Payload};
use tracing::debug;

use crate::action::Action;
use crate::error::Result;

/// Extension point that store extensions are registered under.
pub const STORE_EXTENSION_POINT: &str = "org.visallo.store";

/// Reduces the slice of state owned by one extension.
pub type Reducer = Arc<dyn Fn(&Value, &Action) -> Value + Send + Sync>;

/// Builds an action from the undo payload recorded for an earlier action.
pub type ActionBuilder = fn(&Value) -> Result<Action>;

/// How to reverse and replay one action type.
#[derive(Clone, Copy)]
pub struct UndoAction {
	pub undo: ActionBuilder,
	pub redo: ActionBuilder,
}

impl fmt::Debug for UndoAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UndoAction").finish_non_exhaustive()
	}
}

/// A reducer for one state key plus its undo actions.
#[derive(Clone)]
pub struct StoreExtension {
	key: String,
	reducer: Reducer,
	undo_actions: FxHashMap<String, UndoAction>,
}

impl StoreExtension {
	pub fn new(
		key: impl Into<String>,
		reducer: impl Fn(&Value, &Action) -> Value + Send + Sync + 'static,
	) -> Self {
		Self {
			key: key.into(),
			reducer: Arc::new(reducer),
			undo_actions: FxHashMap::default(),
		}
	}

	/// Adds the undo/redo builders for actions of type `kind`.
	pub fn with_undo(mut self, kind: impl Into<String>, undo: UndoAction) -> Self {
		self.undo_actions.insert(kind.into(), undo);
		self
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn undo_action(&self, kind: &str) -> Option<UndoAction> {
		self.undo_actions.get(kind).copied()
	}

	pub fn reduce(&self, state: &Value, action: &Action) -> Value {
		(self.reducer)(state, action)
	}
}

impl fmt::Debug for StoreExtension {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut kinds: Vec<&str> = self.undo_actions.keys().map(String::as_str).collect();
		kinds.sort_unstable();
		f.debug_struct("StoreExtension")
			.field("key", &self.key)
			.field("undo_actions", &kinds)
			.finish_non_exhaustive()
	}
}

/// Documents [`STORE_EXTENSION_POINT`].
///
/// The validator exposes the point only while every registered payload is a
/// [`StoreExtension`] with a non-empty key.
pub fn document_store_point(registry: &ExtensionRegistry<Payload>) -> Result<()> {
	registry.document_extension_point(
		STORE_EXTENSION_POINT,
		"Add reducers and undo actions to the application store",
		|payload: &Payload| {
			payload
				.downcast_ref::<StoreExtension>()
				.is_some_and(|extension| !extension.key.is_empty())
		},
		DocOptions::default(),
	)?;
	Ok(())
}

pub fn register_store_extension(
	registry: &ExtensionRegistry<Payload>,
	extension: StoreExtension,
) -> Result<ExtensionId> {
	let key = extension.key.clone();
	let id = registry.register_extension(STORE_EXTENSION_POINT, Arc::new(extension))?;
	debug!(%key, %id, "registered store extension");
	Ok(id)
}

/// Exposed store extensions, in registration order.
pub fn store_extensions(registry: &ExtensionRegistry<Payload>) -> Vec<Arc<StoreExtension>> {
	registry
		.extensions_for_point(STORE_EXTENSION_POINT)
		.iter()
		.filter_map(|payload| Arc::clone(payload).downcast::<StoreExtension>().ok())
		.collect()
}

/// Folds `action` through every exposed store extension.
///
/// A reducer that yields null for a key the state never had leaves the key
/// absent.
pub fn reduce(registry: &ExtensionRegistry<Payload>, state: &Value, action: &Action) -> Value {
	let mut next = match state {
		Value::Object(map) => map.clone(),
		_ => Map::new(),
	};
	for extension in store_extensions(registry) {
		let current = next.get(&extension.key).cloned().unwrap_or(Value::Null);
		let reduced = extension.reduce(&current, action);
		if reduced.is_null() && !next.contains_key(&extension.key) {
			continue;
		}
		next.insert(extension.key.clone(), reduced);
	}
	Value::Object(next)
}

/// Undo/redo builders for `kind`, from the first extension that declares them.
pub fn undo_action_for(registry: &ExtensionRegistry<Payload>, kind: &str) -> Option<UndoAction> {
	store_extensions(registry)
		.iter()
		.find_map(|extension| extension.undo_action(kind))
}
