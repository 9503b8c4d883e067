//! Configuration for the MQTT transport that drives a router

use rumqttc::{MqttOptions, OptionError, QoS};

/// Client-level behavior settings
#[derive(Debug, Clone)]
pub struct ClientSettings {
	/// Capacity of the rumqttc request channel
	pub event_loop_capacity: usize,
	/// How long to wait for the broker's CONNACK
	pub connection_timeout_millis: u64,
	/// QoS used for every route subscription
	pub subscription_qos: QoS,
}

impl Default for ClientSettings {
	fn default() -> Self {
		Self {
			event_loop_capacity: 10,
			connection_timeout_millis: 5_000,
			subscription_qos: QoS::AtLeastOnce,
		}
	}
}

/// Configuration for [`MqttRouterClient`](super::MqttRouterClient) creation
#[derive(Debug, Clone)]
pub struct MqttRouterClientConfig {
	/// Underlying MQTT connection options (from rumqttc)
	pub connection: MqttOptions,
	/// Client-level behavior settings
	pub settings: ClientSettings,
}

impl MqttRouterClientConfig {
	/// Create config with default settings
	pub fn new(client_id: &str, host: &str, port: u16) -> Self {
		Self {
			connection: MqttOptions::new(client_id, host, port),
			settings: ClientSettings::default(),
		}
	}

	/// Parse configuration from MQTT URL
	///
	/// Supports: tcp://, mqtt://, ssl://, mqtts://, ws://, wss://
	pub fn from_url(url: &str) -> Result<Self, OptionError> {
		Ok(Self {
			connection: MqttOptions::parse_url(url)?,
			settings: ClientSettings::default(),
		})
	}

	/// Create config for localhost:1883
	pub fn localhost(client_id: &str) -> Self {
		Self::new(client_id, "localhost", 1883)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_url_keeps_default_settings() {
		let config =
			MqttRouterClientConfig::from_url("mqtt://localhost:1883?client_id=router")
				.unwrap();
		assert_eq!(config.connection.client_id(), "router");
		assert_eq!(config.connection.broker_address(), ("localhost".to_string(), 1883));
		assert_eq!(config.settings.subscription_qos, QoS::AtLeastOnce);
	}

	#[test]
	fn test_from_url_requires_client_id() {
		assert!(MqttRouterClientConfig::from_url("mqtt://localhost:1883").is_err());
	}

	#[test]
	fn test_localhost() {
		let config = MqttRouterClientConfig::localhost("router");
		assert_eq!(config.connection.broker_address().1, 1883);
		assert_eq!(config.settings.event_loop_capacity, 10);
	}
}
