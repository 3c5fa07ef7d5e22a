//! Map product store extension.
//!
//! Owns the `product` state key, shaped as
//! `workspaces.<workspace>.products.<product>.extendedData.vertices`, where
//! each vertex id maps to its position on the map. Adding and removing
//! vertices are undoable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_registry::{ExtensionId, ExtensionRegistry, Payload};
use tracing::warn;

use crate::action::Action;
use crate::error::{Result, StoreError};
use crate::extension::{self, StoreExtension, UndoAction};
use crate::patch::{omit_by, update_in};

/// State key owned by the map product reducer.
pub const KEY: &str = "product";
pub const ADD_ELEMENTS: &str = "PRODUCT_MAP_ADD_ELEMENTS";
pub const REMOVE_ELEMENTS: &str = "PRODUCT_MAP_REMOVE_ELEMENTS";

/// Vertices to place on a product, keyed by vertex id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddElements {
	pub workspace_id: String,
	pub product_id: String,
	pub vertices: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveElements {
	pub workspace_id: String,
	pub product_id: String,
	pub vertex_ids: Vec<String>,
}

impl AddElements {
	fn removal(&self) -> RemoveElements {
		RemoveElements {
			workspace_id: self.workspace_id.clone(),
			product_id: self.product_id.clone(),
			vertex_ids: self.vertices.keys().cloned().collect(),
		}
	}
}

pub fn add_elements(payload: &AddElements) -> Result<Action> {
	Action::from_payload(ADD_ELEMENTS, payload)
}

pub fn remove_elements(payload: &RemoveElements) -> Result<Action> {
	Action::from_payload(REMOVE_ELEMENTS, payload)
}

/// Puts previously removed vertices back at their recorded positions.
pub fn drop_elements(payload: &AddElements) -> Result<Action> {
	add_elements(payload)
}

/// Undo payload for `remove`: the positions the vertices had in `state`.
///
/// Vertices that are not on the product are left out.
pub fn removed_elements(state: &Value, remove: &RemoveElements) -> AddElements {
	let placed = product(state, &remove.workspace_id, &remove.product_id)
		.and_then(|product| product.pointer("/extendedData/vertices"))
		.and_then(Value::as_object);
	let vertices = remove
		.vertex_ids
		.iter()
		.filter_map(|id| Some((id.clone(), placed?.get(id)?.clone())))
		.collect();
	AddElements {
		workspace_id: remove.workspace_id.clone(),
		product_id: remove.product_id.clone(),
		vertices,
	}
}

/// Reducer for the `product` key.
///
/// Unknown actions, actions against products that do not exist, additions to
/// products without a vertex map and malformed payloads leave the state
/// unchanged.
pub fn reducer(state: &Value, action: &Action) -> Value {
	let next = match action.kind.as_str() {
		ADD_ELEMENTS => action.decode::<AddElements>().and_then(|add| apply_add(state, &add)),
		REMOVE_ELEMENTS => action
			.decode::<RemoveElements>()
			.and_then(|remove| apply_remove(state, &remove)),
		_ => return state.clone(),
	};
	next.unwrap_or_else(|err| {
		warn!(action = %action.kind, error = %err, "ignoring map product action");
		state.clone()
	})
}

/// Registers the map product reducer and its undo actions.
pub fn register_map_product(registry: &ExtensionRegistry<Payload>) -> Result<ExtensionId> {
	let extension = StoreExtension::new(KEY, reducer)
		.with_undo(
			ADD_ELEMENTS,
			UndoAction {
				undo: undo_add,
				redo: redo_add,
			},
		)
		.with_undo(
			REMOVE_ELEMENTS,
			UndoAction {
				undo: undo_remove,
				redo: redo_remove,
			},
		);
	extension::register_store_extension(registry, extension)
}

fn product<'a>(state: &'a Value, workspace_id: &str, product_id: &str) -> Option<&'a Value> {
	state
		.get("workspaces")?
		.get(workspace_id)?
		.get("products")?
		.get(product_id)
		.filter(|product| product.is_object())
}

fn vertices_path<'a>(workspace_id: &'a str, product_id: &'a str) -> [&'a str; 6] {
	["workspaces", workspace_id, "products", product_id, "extendedData", "vertices"]
}

/// Only products that already carry a vertex map accept new vertices.
fn apply_add(state: &Value, add: &AddElements) -> Result<Value> {
	let placed = product(state, &add.workspace_id, &add.product_id)
		.and_then(|product| product.pointer("/extendedData/vertices"))
		.is_some_and(Value::is_object);
	if !placed {
		return Ok(state.clone());
	}
	update_in(
		state.clone(),
		&vertices_path(&add.workspace_id, &add.product_id),
		|vertices| {
			let mut vertices = match vertices {
				Value::Object(map) => map,
				_ => Map::new(),
			};
			vertices.extend(add.vertices.clone());
			Value::Object(vertices)
		},
	)
}

fn apply_remove(state: &Value, remove: &RemoveElements) -> Result<Value> {
	if product(state, &remove.workspace_id, &remove.product_id).is_none() {
		return Ok(state.clone());
	}
	update_in(
		state.clone(),
		&vertices_path(&remove.workspace_id, &remove.product_id),
		|vertices| {
			omit_by(vertices, |id, _| {
				remove.vertex_ids.iter().any(|removed| removed == id)
			})
		},
	)
}

fn decode<T: DeserializeOwned>(kind: &str, undo: &Value) -> Result<T> {
	T::deserialize(undo).map_err(|source| StoreError::Payload {
		kind: kind.to_string(),
		source,
	})
}

fn undo_add(undo: &Value) -> Result<Action> {
	let added: AddElements = decode(ADD_ELEMENTS, undo)?;
	remove_elements(&added.removal())
}

fn redo_add(undo: &Value) -> Result<Action> {
	add_elements(&decode(ADD_ELEMENTS, undo)?)
}

fn undo_remove(undo: &Value) -> Result<Action> {
	drop_elements(&decode(REMOVE_ELEMENTS, undo)?)
}

fn redo_remove(undo: &Value) -> Result<Action> {
	let removed: AddElements = decode(REMOVE_ELEMENTS, undo)?;
	remove_elements(&removed.removal())
}
