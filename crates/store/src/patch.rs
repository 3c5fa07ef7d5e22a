//! Whole-value updates over `serde_json` state trees.
//!
//! Reducers own the state they are handed, so "immutable" updates take the
//! tree by value, patch one path in place and hand it back. Callers that keep
//! the previous state clone it before reducing.

use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// Replaces the value at `path` with `f(current)`.
///
/// Missing or null intermediate segments become empty objects; the leaf is
/// `Value::Null` when absent. An empty path applies `f` to the root.
pub fn update_in(mut state: Value, path: &[&str], f: impl FnOnce(Value) -> Value) -> Result<Value> {
	let mut node = &mut state;
	for (depth, segment) in path.iter().enumerate() {
		if node.is_null() {
			*node = Value::Object(Map::new());
		}
		let Some(map) = node.as_object_mut() else {
			return Err(StoreError::NotAnObject {
				path: path[..depth].join("."),
			});
		};
		node = map.entry(*segment).or_insert(Value::Null);
	}
	*node = f(node.take());
	Ok(state)
}

/// Drops the object members for which `predicate(key, value)` holds.
///
/// Non-object values pass through untouched.
pub fn omit_by(value: Value, predicate: impl Fn(&str, &Value) -> bool) -> Value {
	match value {
		Value::Object(map) => Value::Object(
			map.into_iter()
				.filter(|(key, member)| !predicate(key, member))
				.collect(),
		),
		other => other,
	}
}
