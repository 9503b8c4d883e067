use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use arcstr::ArcStr;
use rumqttc::Packet::{self, Disconnect, Publish};
use rumqttc::{AsyncClient, ConnAck, ConnectReturnCode, EventLoop, QoS};
use rumqttc::{Event::Incoming, Event::Outgoing};
use tokio::time;
use tracing::{debug, error, info, warn};

use super::config::MqttRouterClientConfig;
use super::error::{ConnectionEstablishmentError, MqttRouterClientError};
use crate::connection::RouterConnection;
use crate::router::MqttRouter;

/// Drives an [`MqttRouter`] from a live MQTT connection.
///
/// Every inbound publish is dispatched through the router inside the event
/// loop task, one message at a time. Connection lifecycle is managed
/// separately via [`RouterConnection`].
#[derive(Clone, Debug)]
pub struct MqttRouterClient {
	client: AsyncClient,
	router: Arc<RwLock<MqttRouter>>,
	qos: QoS,
}

pub(crate) fn read_router(
	router: &RwLock<MqttRouter>,
) -> RwLockReadGuard<'_, MqttRouter> {
	router.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_router(router: &RwLock<MqttRouter>) -> RwLockWriteGuard<'_, MqttRouter> {
	router.write().unwrap_or_else(PoisonError::into_inner)
}

impl MqttRouterClient {
	/// Connect with default settings and start routing.
	///
	/// Returns both client and connection handle. Keep connection alive
	/// for the session duration, call `connection.shutdown()` when done.
	pub async fn connect(
		url: &str,
		router: MqttRouter,
	) -> Result<(Self, RouterConnection), MqttRouterClientError> {
		let config = MqttRouterClientConfig::from_url(url)?;
		Self::connect_with_config(config, router).await
	}

	/// Connect with custom configuration and start routing.
	///
	/// Waits for the broker's CONNACK, starts the event loop, then subscribes
	/// every auto route of `router`.
	pub async fn connect_with_config(
		config: MqttRouterClientConfig,
		router: MqttRouter,
	) -> Result<(Self, RouterConnection), MqttRouterClientError> {
		if config.settings.event_loop_capacity == 0 {
			return Err(MqttRouterClientError::ConfigurationValue(
				"event_loop_capacity must be greater than 0".to_string(),
			));
		}
		let (client, new_event_loop) = AsyncClient::new(
			config.connection,
			config.settings.event_loop_capacity,
		);

		let timeout_millis = config.settings.connection_timeout_millis;
		let connection_timeout = Duration::from_millis(timeout_millis);
		let connected_event_loop = tokio::time::timeout(
			connection_timeout,
			Self::establish_connection(new_event_loop),
		)
		.await
		.map_err(|_| ConnectionEstablishmentError::Timeout { timeout_millis })?
		.map_err(MqttRouterClientError::ConnectionEstablishment)?;

		let router = Arc::new(RwLock::new(router));
		let qos = config.settings.subscription_qos;

		// The event loop must run before subscribing: requests are only
		// flushed to the broker while it is being polled.
		let event_loop_handle = tokio::spawn(Self::run(
			connected_event_loop,
			client.clone(),
			Arc::clone(&router),
			qos,
		));

		let fresh_client = Self {
			client: client.clone(),
			router: Arc::clone(&router),
			qos,
		};
		let connection = RouterConnection::new(client, router, event_loop_handle);

		if let Err(err) = fresh_client.subscribe_all().await {
			error!(error = %err, "Initial subscription failed, shutting down");
			if let Err(shutdown_err) = connection.shutdown().await {
				warn!(error = %shutdown_err, "Shutdown after failed subscription also failed");
			}
			return Err(err);
		}
		Ok((fresh_client, connection))
	}

	async fn establish_connection(
		mut event_loop: EventLoop,
	) -> Result<EventLoop, ConnectionEstablishmentError> {
		loop {
			match event_loop.poll().await {
				| Ok(Incoming(Packet::ConnAck(ConnAck { code, .. }))) => {
					if code == ConnectReturnCode::Success {
						debug!("MQTT connection established successfully");
						return Ok(event_loop);
					} else {
						debug!(code = ?code, "MQTT connection rejected by broker");
						return Err(
							ConnectionEstablishmentError::BrokerRejected {
								code,
							},
						);
					}
				}
				| Ok(notification) => {
					debug!(notification = ?notification, "Bootstrap phase notification");
				}
				| Err(connection_err) => {
					debug!(error = %connection_err, "MQTT connection error during bootstrap phase");
					return Err(ConnectionEstablishmentError::Network(
						connection_err,
					));
				}
			}
		}
	}

	async fn subscribe_all(&self) -> Result<(), MqttRouterClientError> {
		let topics = read_router(&self.router).active_topics();
		for topic in topics {
			debug!(topic = %topic, qos = ?self.qos, "Subscribing route topic");
			self.client.subscribe(topic.as_str(), self.qos).await?;
		}
		Ok(())
	}

	/// Activates a manual route and subscribes its topic.
	pub async fn activate(
		&self,
		alias: &str,
	) -> Result<ArcStr, MqttRouterClientError> {
		let topic = {
			let mut router = write_router(&self.router);
			router.activate(alias)?
		};
		self.client.subscribe(topic.as_str(), self.qos).await?;
		Ok(topic)
	}

	/// Publishes a raw payload with the configured QoS, not retained.
	pub async fn publish(
		&self,
		topic: &str,
		payload: impl Into<Vec<u8>>,
	) -> Result<(), MqttRouterClientError> {
		self.client
			.publish(topic, self.qos, false, payload)
			.await
			.map_err(MqttRouterClientError::ClientOperation)
	}

	/// Topics currently subscribed on behalf of the router.
	pub fn active_topics(&self) -> Vec<ArcStr> {
		read_router(&self.router).active_topics()
	}

	/// Main event loop: dispatches publishes and handles graceful shutdown.
	/// The loop terminates when a Disconnect packet is seen in either
	/// direction.
	async fn run(
		mut event_loop: EventLoop,
		client: AsyncClient,
		router: Arc<RwLock<MqttRouter>>,
		qos: QoS,
	) {
		let mut error_count = 0;
		const MAX_CONSECUTIVE_ERRORS: u32 = 10;
		const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);
		const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

		loop {
			match event_loop.poll().await {
				| Ok(Incoming(Packet::ConnAck(ConnAck {
					session_present: false,
					code: ConnectReturnCode::Success,
				}))) => {
					info!(
						"MQTT reconnected without session, resubscribing to \
						 all topics"
					);
					Self::resubscribe(&client, &router, qos);
				}
				| Ok(Incoming(Packet::ConnAck(ConnAck {
					session_present: true,
					code: ConnectReturnCode::Success,
				}))) => {
					info!(
						"MQTT reconnected with session preserved, \
						 subscriptions maintained by broker"
					);
				}
				| Ok(Incoming(Publish(p))) => {
					error_count = 0;
					debug!(topic = %p.topic, payload_size = p.payload.len(), "Received MQTT message");

					let outcome = read_router(&router).dispatch(p.topic, p.payload);
					debug!(outcome = ?outcome, "Dispatch finished");
				}
				| Ok(Incoming(Disconnect)) => {
					info!("Received MQTT Disconnect packet from server");
					break;
				}
				| Ok(Outgoing(rumqttc::Outgoing::Disconnect)) => {
					info!("Sent MQTT Disconnect packet to server");
					break;
				}
				| Ok(notification) => {
					error_count = 0;
					debug!(notification = ?notification, "Received OTHER MQTT notification");
				}
				| Err(err) => {
					error_count += 1;
					error!(error_count = error_count, error = %err, "MQTT event loop error");

					if error_count >= MAX_CONSECUTIVE_ERRORS {
						error!(
							error_count = error_count,
							max_errors = MAX_CONSECUTIVE_ERRORS,
							"Too many consecutive errors, terminating event \
							 loop"
						);
						break;
					}

					let delay = INITIAL_RETRY_DELAY
						* 2_u32.pow((error_count - 1).min(10));
					let delay = delay.min(MAX_RETRY_DELAY);

					warn!(delay = ?delay, error_count = error_count, "Retrying MQTT connection");
					time::sleep(delay).await;
				}
			}
		}
		info!("MQTT event loop terminated");
	}

	/// Queues subscriptions without awaiting: this runs inside the event loop,
	/// which is the only thing draining the request channel.
	fn resubscribe(client: &AsyncClient, router: &RwLock<MqttRouter>, qos: QoS) {
		for topic in read_router(router).active_topics() {
			if let Err(err) = client.try_subscribe(topic.as_str(), qos) {
				error!(topic = %topic, error = ?err, "Failed to resubscribe to topic");
			}
		}
	}
}
