//! Application store assembled from registry extensions.
//!
//! Modules contribute a [`StoreExtension`] under [`STORE_EXTENSION_POINT`]:
//! a reducer for one top-level state key plus the undo and redo builders for
//! the actions it handles. [`reduce`] runs an action through all of them.
//!
//! [`map_product`] is the built-in extension that places vertices on map
//! products.

mod action;
mod error;
mod extension;
pub mod map_product;
pub mod patch;

pub use action::Action;
pub use error::{Result, StoreError};
pub use extension::{
	ActionBuilder, Reducer, STORE_EXTENSION_POINT, StoreExtension, UndoAction,
	document_store_point, reduce, register_store_extension, store_extensions, undo_action_for,
};
