//! Connection lifecycle for a routed MQTT session
//!
//! Kept apart from [`MqttRouterClient`](crate::MqttRouterClient) so that
//! route activation and shutdown do not share a handle.

use std::sync::{Arc, RwLock};

use rumqttc::AsyncClient;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::client::async_client::read_router;
use crate::router::MqttRouter;

/// Handle that owns the event loop task of a routed session.
///
/// Keep it alive for the duration of the session and call
/// [`RouterConnection::shutdown`] when done.
pub struct RouterConnection {
	client: AsyncClient,
	router: Option<Arc<RwLock<MqttRouter>>>,
	event_loop_handle: Option<JoinHandle<()>>,
}

impl RouterConnection {
	pub(crate) fn new(
		client: AsyncClient,
		router: Arc<RwLock<MqttRouter>>,
		event_loop_handle: JoinHandle<()>,
	) -> Self {
		Self {
			client,
			router: Some(router),
			event_loop_handle: Some(event_loop_handle),
		}
	}

	/// Gracefully shutdown the session:
	/// 1. Unsubscribe every route topic
	/// 2. Send MQTT Disconnect (the event loop stops on it)
	/// 3. Wait for the event loop task
	pub async fn shutdown(mut self) -> Result<(), crate::MqttRouterClientError> {
		if let Some(router) = self.router.take() {
			let topics = read_router(&router).active_topics();
			for topic in topics {
				debug!(topic = %topic, "Unsubscribing route topic");
				if let Err(e) = self.client.unsubscribe(topic.as_str()).await {
					warn!(topic = %topic, error = %e, "Failed to unsubscribe");
				}
			}
		}

		if let Err(e) = self.client.disconnect().await {
			warn!(error = %e, "Failed to disconnect MQTT client");
		}

		if let Some(handle) = self.event_loop_handle.take() {
			if let Err(e) = handle.await {
				warn!(error = %e, "Event loop task failed");
			}
		} else {
			warn!("No event loop handle available to await");
		}

		Ok(())
	}
}

impl Drop for RouterConnection {
	fn drop(&mut self) {
		if self.event_loop_handle.is_some() {
			error!(
				"RouterConnection dropped without calling shutdown(). Please \
				 call shutdown() and await its completion before dropping."
			);
		}
	}
}
