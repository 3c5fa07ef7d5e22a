use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoreError};

/// A dispatched store action: a type tag plus a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub payload: Value,
}

impl Action {
	pub fn new(kind: impl Into<String>, payload: Value) -> Self {
		Self {
			kind: kind.into(),
			payload,
		}
	}

	/// Builds an action whose payload is `payload` serialized.
	pub fn from_payload<T: Serialize>(kind: impl Into<String>, payload: &T) -> Result<Self> {
		let kind = kind.into();
		match serde_json::to_value(payload) {
			Ok(payload) => Ok(Self { kind, payload }),
			Err(source) => Err(StoreError::Payload { kind, source }),
		}
	}

	/// Decodes the payload as `T`.
	pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
		T::deserialize(&self.payload).map_err(|source| StoreError::Payload {
			kind: self.kind.clone(),
			source,
		})
	}
}
