use std::env;

use uuid::Uuid;

/// MQTT broker URL from `MQTT_BROKER`, after loading `demos/.env` and the
/// untracked `demos/.env.local`.
///
/// Defaults to `mqtt://localhost:1883`.
pub fn broker_url() -> String {
	dotenv::dotenv().ok();
	dotenv::from_filename("demos/.env").ok();
	if std::path::Path::new("demos/.env.local").exists() {
		dotenv::from_filename("demos/.env.local").ok();
	}

	env::var("MQTT_BROKER").unwrap_or_else(|_| "mqtt://localhost:1883".to_string())
}

/// Broker URL with a unique `client_id` such as `sensor_router_a1b2c3d4`.
pub fn build_url(client_id_prefix: &str) -> String {
	let base_url = broker_url();
	let uuid = Uuid::new_v4().to_string();
	let client_id = format!("{client_id_prefix}_{}", &uuid[.. 8]);

	if base_url.contains('?') {
		format!("{base_url}&client_id={client_id}")
	} else {
		format!("{base_url}?client_id={client_id}")
	}
}
