use rumqttc::{ClientError, OptionError};

use crate::routing::RouteConfigError;

/// Failures while bringing the connection up
#[derive(Debug, thiserror::Error)]
pub enum ConnectionEstablishmentError {
	/// Network connection failed
	#[error("Network connection failed: {0}")]
	Network(#[from] rumqttc::ConnectionError),

	/// Broker answered CONNACK with an error code
	#[error("Broker rejected connection: {code:?}")]
	BrokerRejected {
		/// Return code sent by the broker
		code: rumqttc::ConnectReturnCode,
	},

	/// No CONNACK in time
	#[error("Connection establishment timed out after {timeout_millis}ms")]
	Timeout {
		/// Configured timeout
		timeout_millis: u64,
	},
}

/// Errors that can occur in router client operations
#[derive(Debug, thiserror::Error)]
pub enum MqttRouterClientError {
	/// Request to the rumqttc client failed
	#[error("Client operation failed: {0}")]
	ClientOperation(#[from] ClientError),

	/// Configuration errors when parsing MQTT options
	#[error("Configuration error: {0}")]
	Configuration(#[from] OptionError),

	/// Invalid configuration parameter values
	#[error("Invalid configuration value: {0}")]
	ConfigurationValue(String),

	/// Route registration or activation failed
	#[error("Route error: {0}")]
	Route(#[from] RouteConfigError),

	/// Connection establishment failed
	#[error("Failed to establish connection: {0}")]
	ConnectionEstablishment(#[from] ConnectionEstablishmentError),
}
