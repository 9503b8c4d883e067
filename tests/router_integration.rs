//! End-to-end routing through the public API
//!
//! The dispatch tests drive the router directly. The broker test connects to
//! `localhost:1883` and only checks the full publish/route cycle when a
//! broker is actually running there.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bincode::{Decode, Encode};
use mqtt_topic_router::{
	BincodeSerializer, DispatchOutcome, Flow, Handler, MqttRouter,
	MqttRouterClient, Request,
};

#[derive(Encode, Decode, Debug, Clone, PartialEq)]
struct Reading {
	celsius: f32,
	sensor: String,
}

type Log = Arc<Mutex<Vec<String>>>;

fn sensor_router(log: &Log) -> MqttRouter {
	let mut router = MqttRouter::new();

	let audit = Arc::clone(log);
	let readings = Arc::clone(log);
	let alerts = Arc::clone(log);
	let fallback = Arc::clone(log);

	router
		.auto(
			"sensors/#",
			Handler::normal(move |req| {
				audit.lock().unwrap().push(format!("audit {}", req.topic()));
				Ok(Flow::Next)
			}),
		)
		.unwrap()
		.auto(
			"sensors/:room/temp",
			Handler::normal(move |req| {
				let reading: Reading = req.decode(&BincodeSerializer::new())?;
				let room = req.param("room").unwrap_or_default().to_string();
				readings
					.lock()
					.unwrap()
					.push(format!("{room} {} {}", reading.sensor, reading.celsius));
				Ok(Flow::Stop)
			}),
		)
		.unwrap()
		.auto(
			"#",
			Handler::error(move |err, req: &mut Request| {
				alerts
					.lock()
					.unwrap()
					.push(format!("alert {} [{}]", req.topic(), err));
				Ok(Flow::Stop)
			}),
		)
		.unwrap()
		.default_handler(move |err, req| {
			assert!(err.is_none());
			fallback
				.lock()
				.unwrap()
				.push(format!("unrouted {}", req.topic()));
		})
		.unwrap();
	router
}

fn encode(reading: &Reading) -> Vec<u8> {
	bincode::encode_to_vec(reading, bincode::config::standard()).unwrap()
}

#[test]
fn test_typed_reading_is_routed_with_room_param() {
	let log = Log::default();
	let router = sensor_router(&log);
	let reading = Reading {
		celsius: 21.5,
		sensor: "t-1".to_string(),
	};

	let outcome = router.dispatch("sensors/kitchen/temp", encode(&reading));

	assert!(matches!(outcome, DispatchOutcome::Stopped { .. }));
	assert_eq!(*log.lock().unwrap(), [
		"audit sensors/kitchen/temp",
		"kitchen t-1 21.5"
	]);
}

#[test]
fn test_undecodable_payload_reaches_error_handler() {
	let log = Log::default();
	let router = sensor_router(&log);

	router.dispatch("sensors/hall/temp", vec![0xff]);

	let log = log.lock().unwrap();
	assert_eq!(log.len(), 2);
	assert_eq!(log[0], "audit sensors/hall/temp");
	assert!(log[1].starts_with("alert sensors/hall/temp [Handler for 'sensors/:room/temp' failed"));
}

#[test]
fn test_unmatched_topic_reaches_default_handler() {
	let log = Log::default();
	let router = sensor_router(&log);

	let outcome = router.dispatch("lights/kitchen", "on");

	assert!(matches!(outcome, DispatchOutcome::Completed));
	assert_eq!(*log.lock().unwrap(), ["unrouted lights/kitchen"]);
}

#[test]
fn test_subscription_topics_replace_named_params() {
	let router = sensor_router(&Log::default());
	assert_eq!(router.subscription_topics(), ["sensors/#", "sensors/+/temp", "#"]);
}

#[tokio::test]
async fn test_connect_without_broker_fails_cleanly() {
	let result = MqttRouterClient::connect(
		"mqtt://127.0.0.1:1?client_id=router_no_broker",
		MqttRouter::new(),
	)
	.await;
	assert!(result.is_err());
}

#[tokio::test]
async fn test_broker_round_trip_when_available() {
	let log = Log::default();
	let url = "mqtt://localhost:1883?client_id=router_integration_test";

	match MqttRouterClient::connect(url, sensor_router(&log)).await {
		| Ok((client, connection)) => {
			tokio::time::sleep(Duration::from_millis(200)).await;

			let reading = Reading {
				celsius: 19.0,
				sensor: "t-2".to_string(),
			};
			if client.publish("sensors/office/temp", encode(&reading)).await.is_ok() {
				tokio::time::sleep(Duration::from_millis(500)).await;
				let seen = log.lock().unwrap().clone();
				if seen.is_empty() {
					println!("⚠️ No message routed (broker might be slow)");
				} else {
					assert!(seen.contains(&"office t-2 19".to_string()));
				}
			}

			connection.shutdown().await.unwrap();
		}
		| Err(e) => {
			println!("⚠️ No broker on localhost:1883, skipping: {e}");
		}
	}
}
