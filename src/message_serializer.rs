//! Payload serialization traits and implementations.
//!
//! Handlers decode the raw payload of a [`Request`](crate::Request) with
//! [`Request::decode`](crate::Request::decode).

use std::error::Error;

use bincode::{Decode, Encode};

/// Trait for serializing and deserializing MQTT message payloads.
///
/// Errors implement `std::error::Error`, so a handler can use `?` on a
/// decode result.
pub trait MessageSerializer<T>:
	Default + Clone + Send + Sync + 'static
{
	/// Error type for serialization failures
	type SerializeError: Error + Send + Sync + 'static;
	/// Error type for deserialization failures
	type DeserializeError: Error + Send + Sync + 'static;

	/// Convert data to bytes for MQTT transmission
	fn serialize(&self, data: &T) -> Result<Vec<u8>, Self::SerializeError>;
	/// Convert bytes from MQTT into typed data
	fn deserialize(&self, bytes: &[u8]) -> Result<T, Self::DeserializeError>;
}

/// Default serializer using bincode format.
///
/// Requires types to implement `bincode::Encode` and `bincode::Decode`.
#[derive(Clone, Default)]
pub struct BincodeSerializer {
	config: bincode::config::Configuration,
}

impl BincodeSerializer {
	/// Creates a new serializer with default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a serializer with custom bincode configuration.
	pub fn with_config(config: bincode::config::Configuration) -> Self {
		Self { config }
	}
}

impl<T> MessageSerializer<T> for BincodeSerializer
where T: Encode + Decode<()> + 'static
{
	type SerializeError = bincode::error::EncodeError;
	type DeserializeError = bincode::error::DecodeError;

	fn serialize(&self, data: &T) -> Result<Vec<u8>, Self::SerializeError> {
		bincode::encode_to_vec(data, self.config)
	}

	fn deserialize(&self, bytes: &[u8]) -> Result<T, Self::DeserializeError> {
		bincode::decode_from_slice(bytes, self.config).map(|(value, _)| value)
	}
}

/// JSON serializer backed by `serde_json`.
#[cfg(feature = "json")]
#[derive(Clone, Default)]
pub struct JsonSerializer;

#[cfg(feature = "json")]
impl<T> MessageSerializer<T> for JsonSerializer
where T: serde::Serialize + serde::de::DeserializeOwned + 'static
{
	type SerializeError = serde_json::Error;
	type DeserializeError = serde_json::Error;

	fn serialize(&self, data: &T) -> Result<Vec<u8>, Self::SerializeError> {
		serde_json::to_vec(data)
	}

	fn deserialize(&self, bytes: &[u8]) -> Result<T, Self::DeserializeError> {
		serde_json::from_slice(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Request;

	#[derive(Encode, Decode, Debug, PartialEq)]
	struct Reading {
		celsius: i32,
		sensor: String,
	}

	#[test]
	fn test_bincode_payload_decodes_from_request() {
		let serializer = BincodeSerializer::new();
		let reading = Reading {
			celsius: 21,
			sensor: "kitchen".to_string(),
		};
		let bytes = serializer.serialize(&reading).unwrap();

		let request = Request::new("sensors/kitchen/temp", bytes);
		let decoded: Reading = request.decode(&serializer).unwrap();
		assert_eq!(decoded, reading);
	}

	#[test]
	fn test_bincode_garbage_is_an_error() {
		let request = Request::new("t", vec![0xff]);
		let decoded: Result<Reading, _> =
			request.decode(&BincodeSerializer::new());
		assert!(decoded.is_err());
	}

	#[cfg(feature = "json")]
	#[test]
	fn test_json_payload_decodes_from_request() {
		#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
		struct Temp {
			value: f64,
		}

		let request = Request::new("t", r#"{"value": 21.5}"#);
		let temp: Temp = request.decode(&JsonSerializer).unwrap();
		assert_eq!(temp, Temp { value: 21.5 });
	}
}
