//! # Sensor Router
//!
//! Routes sensor traffic through a small middleware stack:
//! - `sensors/#` logs every message and passes it on
//! - `sensors/:room/temp` decodes a bincode reading and stops
//! - `sensors/:room/alarm` is a manual route, activated after connecting
//! - `#` error handler reports anything that failed on the way
//!
//! Run with `RUST_LOG=debug cargo run --example sensor_router` to watch the
//! dispatch decisions.

mod shared;

use std::time::Duration;

use bincode::{Decode, Encode};
use mqtt_topic_router::{
	BincodeSerializer, Flow, Handler, MqttRouter, MqttRouterClient,
};

#[derive(Encode, Decode, Debug)]
struct Reading {
	celsius: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	shared::tracing::setup(None);

	// === 1. ROUTES ===
	let mut router = MqttRouter::new();
	router
		.auto(
			"sensors/#",
			Handler::normal(|req| {
				println!("[log] {} ({} bytes)", req.topic(), req.payload().len());
				Ok(Flow::Next)
			}),
		)?
		.auto(
			"sensors/:room/temp",
			Handler::normal(|req| {
				let reading: Reading = req.decode(&BincodeSerializer::new())?;
				println!(
					"[temp] {}: {:.1}°C",
					req.param("room").unwrap_or("?"),
					reading.celsius
				);
				Ok(Flow::Stop)
			}),
		)?
		.manual(
			"sensors/:room/alarm",
			Handler::normal(|req| {
				println!("[alarm] {}: {}", req.param("room").unwrap_or("?"), req.payload_str()?);
				Ok(Flow::Stop)
			}),
			Some("alarms"),
		)?
		.auto(
			"#",
			Handler::error(|err, req| {
				eprintln!("[error] {}: {err}", req.topic());
				Ok(Flow::Stop)
			}),
		)?
		.default_handler(|err, req| {
			if err.is_none() {
				println!("[unrouted] {}", req.topic());
			}
		})?;

	// === 2. CONNECTION ===
	let url = shared::config::build_url("sensor_router");
	println!("Connecting to MQTT broker: {url}");
	let (client, connection) = MqttRouterClient::connect(&url, router).await?;

	let topic = client.activate("alarms").await?;
	println!("Subscribed: {:?} (alarms on {topic})", client.active_topics());

	// === 3. TRAFFIC ===
	tokio::time::sleep(Duration::from_millis(300)).await;
	let reading = bincode::encode_to_vec(
		Reading { celsius: 21.5 },
		bincode::config::standard(),
	)?;
	client.publish("sensors/kitchen/temp", reading).await?;
	client.publish("sensors/hall/temp", vec![0xff]).await?;
	client.publish("sensors/garage/alarm", "door open").await?;
	tokio::time::sleep(Duration::from_secs(1)).await;

	// === 4. SHUTDOWN ===
	connection.shutdown().await?;
	println!("Disconnected");
	Ok(())
}
