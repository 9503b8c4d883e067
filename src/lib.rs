//! # MQTT Topic Router
//!
//! Express-style routing for MQTT messages: handlers are registered against
//! topic patterns and every inbound message travels through them in order.
//!
//! ## Features
//!
//! - **Named and positional captures**: `sensors/:room/temp`, `a/+/b`, `logs/#`
//! - **Middleware flow**: handlers pass on, fail, or stop the dispatch
//! - **Error handlers**: failures skip normal handlers until one recovers
//! - **Panic containment**: a panicking handler becomes a routed error
//! - **Subscription bookkeeping**: auto routes are subscribed on connect,
//!   manual routes when activated
//! - **Message Serialization**: Pluggable payload decoding (Bincode included)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mqtt_topic_router::{Flow, Handler, MqttRouter, MqttRouterClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = MqttRouter::new();
//!     router
//!         .auto("sensors/:room/temp", Handler::normal(|req| {
//!             println!("{} -> {:?}", req.param("room").unwrap_or("?"), req.payload());
//!             Ok(Flow::Stop)
//!         }))?
//!         .auto("#", Handler::error(|err, req| {
//!             eprintln!("{}: {err}", req.topic());
//!             Ok(Flow::Stop)
//!         }))?;
//!
//!     let (_client, connection) = MqttRouterClient::connect(
//!         "mqtt://broker.hivemq.com:1883?client_id=my_router",
//!         router,
//!     ).await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     connection.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pattern Syntax
//!
//! - `+` matches one level, captured by position
//! - `:name` matches one level, captured by name
//! - `#` matches the remaining levels (zero or more), captured by position;
//!   it must be the last segment
//!
//! Patterns are subscribed with `:name` rewritten to `+`.

#![warn(missing_docs)]

// Core modules
pub mod client;
pub mod connection;
pub mod message_serializer;
pub mod router;
pub mod routing;
pub mod topic;

// === Core Public API ===
pub use client::{MqttRouterClient, MqttRouterClientConfig, MqttRouterClientError};
pub use connection::RouterConnection;
pub use router::MqttRouter;

// Handlers and dispatch
pub use routing::{DispatchError, DispatchOutcome, Flow, Handler, HandlerResult, Request};

// Message serialization
#[cfg(feature = "json")]
pub use message_serializer::JsonSerializer;
pub use message_serializer::{BincodeSerializer, MessageSerializer};

// Essential external types
pub use rumqttc::QoS;

// === Advanced API ===
pub use routing::{Layer, Stack};
pub use topic::{CacheStrategy, MatchOptions, Params, TopicPatternPath};

/// Result type alias for operations that may fail with MqttRouterClientError
pub type Result<T> = std::result::Result<T, MqttRouterClientError>;

/// Prelude module for convenient imports
///
/// ```rust
/// use mqtt_topic_router::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most routed MQTT applications

	pub use crate::{
		BincodeSerializer, DispatchError, Flow, Handler, HandlerResult,
		MessageSerializer, MqttRouter, MqttRouterClient, MqttRouterClientConfig,
		MqttRouterClientError, QoS, Request, Result, RouterConnection,
	};
}

/// Advanced types for driving a stack without a broker, custom matching
/// options and pattern inspection
///
/// ```rust
/// use mqtt_topic_router::advanced::*;
/// ```
pub mod advanced {
	//! Advanced types for complex use cases

	pub use crate::client::ClientSettings;
	pub use crate::routing::{BoxError, DispatchOutcome, Layer, Stack};
	// Topic utilities
	pub use crate::topic::{
		CacheStrategy, MatchOptions, ParamKey, Params, TopicPath,
		TopicPatternItem, TopicPatternPath, limits, validation,
	};
}

/// Error types used throughout the library
///
/// ```rust
/// use mqtt_topic_router::errors::*;
/// ```
pub mod errors {
	//! All error types used in the library

	pub use crate::client::ConnectionEstablishmentError;
	pub use crate::routing::{BoxError, DispatchError, RouteConfigError};
	pub use crate::topic::{TopicMatchError, TopicPatternError};
	pub use crate::MqttRouterClientError;
}
