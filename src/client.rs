//! MQTT transport driver
//!
//! Connects a rumqttc client, subscribes the router's topics and feeds every
//! inbound publish into the router.

/// Asynchronous client that drives a router
pub mod async_client;
pub mod config;
/// Client error types
pub mod error;

pub use async_client::MqttRouterClient;
pub use config::{ClientSettings, MqttRouterClientConfig};
pub use error::{ConnectionEstablishmentError, MqttRouterClientError};
