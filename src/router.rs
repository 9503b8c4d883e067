//! Outer registration API over a [`Stack`].
//!
//! Routes are either *auto* (part of the stack right away and subscribed when
//! a client wraps the router) or *manual* (compiled now, parked under an alias
//! and only added to the stack on [`MqttRouter::activate`]).

use std::collections::HashMap;

use arcstr::ArcStr;
use bytes::Bytes;
use tracing::debug;

use crate::routing::{
	DispatchError, DispatchOutcome, Handler, Layer, RouteConfigError, Request,
	Stack,
};
use crate::topic::MatchOptions;

/// Topic router: a [`Stack`] plus subscription bookkeeping.
#[derive(Debug, Default)]
pub struct MqttRouter {
	stack: Stack,
	/// Auto routes, in registration order, in broker subscription form
	subscribe: Vec<ArcStr>,
	/// Every pattern registered, auto or manual
	paths: Vec<ArcStr>,
	/// Manual routes waiting for activation, by alias
	inactive: HashMap<ArcStr, Layer>,
	/// Broker topics of manual routes already activated
	activated: Vec<ArcStr>,
}

impl MqttRouter {
	/// Creates an empty router with default match options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty router whose routes use `options`.
	pub fn with_options(options: MatchOptions) -> Self {
		Self {
			stack: Stack::with_options(options),
			..Self::default()
		}
	}

	/// Adds a route that is subscribed automatically when a client wraps the
	/// router.
	pub fn auto(
		&mut self,
		pattern: impl Into<ArcStr>,
		handler: Handler,
	) -> Result<&mut Self, RouteConfigError> {
		let layer = Layer::new(pattern, handler, self.stack.options())?;
		let topic = layer.pattern().mqtt_pattern();
		self.paths.push(layer.pattern().topic_pattern());
		if !self.subscribe.contains(&topic) {
			self.subscribe.push(topic);
		}
		self.stack.push(layer);
		Ok(self)
	}

	/// Compiles a route and parks it under `alias` (the pattern itself when
	/// `None`) until [`MqttRouter::activate`] is called.
	pub fn manual(
		&mut self,
		pattern: impl Into<ArcStr>,
		handler: Handler,
		alias: Option<&str>,
	) -> Result<&mut Self, RouteConfigError> {
		let layer = Layer::new(pattern, handler, self.stack.options())?;
		let alias = match alias {
			| Some(alias) => ArcStr::from(alias),
			| None => layer.pattern().topic_pattern(),
		};
		if self.inactive.contains_key(&alias) {
			return Err(RouteConfigError::duplicate_alias(alias.as_str()));
		}
		debug!(alias = %alias, pattern = %layer.pattern(), "Manual route parked");
		self.paths.push(layer.pattern().topic_pattern());
		self.inactive.insert(alias, layer);
		Ok(self)
	}

	/// Moves the manual route parked under `alias` into the stack.
	///
	/// Returns the topic the transport must subscribe to.
	pub fn activate(&mut self, alias: &str) -> Result<ArcStr, RouteConfigError> {
		let layer = self
			.inactive
			.remove(alias)
			.ok_or_else(|| RouteConfigError::unknown_alias(alias))?;
		let topic = layer.pattern().mqtt_pattern();
		debug!(alias = %alias, topic = %topic, "Manual route activated");
		self.stack.push(layer);
		if !self.activated.contains(&topic) {
			self.activated.push(topic.clone());
		}
		Ok(topic)
	}

	/// True while a manual route is parked under `alias`.
	pub fn is_pending(&self, alias: &str) -> bool {
		self.inactive.contains_key(alias)
	}

	/// Registers the end-of-stack handler. Only one may be registered.
	pub fn default_handler<F>(&mut self, f: F) -> Result<&mut Self, RouteConfigError>
	where F: Fn(Option<DispatchError>, &Request) + Send + Sync + 'static {
		self.stack.set_default_handler(f)?;
		Ok(self)
	}

	/// Broker topics for the auto routes, deduplicated, in registration order.
	pub fn subscription_topics(&self) -> &[ArcStr] {
		&self.subscribe
	}

	/// Auto topics followed by activated manual topics, without duplicates.
	pub fn active_topics(&self) -> Vec<ArcStr> {
		let mut topics = self.subscribe.clone();
		for topic in &self.activated {
			if !topics.contains(topic) {
				topics.push(topic.clone());
			}
		}
		topics
	}

	/// Every pattern registered so far, auto or manual.
	pub fn paths(&self) -> &[ArcStr] {
		&self.paths
	}

	/// The underlying stack.
	pub fn stack(&self) -> &Stack {
		&self.stack
	}

	/// Runs one inbound message through the routes.
	pub fn dispatch(
		&self,
		topic: impl Into<ArcStr>,
		payload: impl Into<Bytes>,
	) -> DispatchOutcome {
		self.stack.dispatch(topic, payload)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use super::*;
	use crate::routing::Flow;

	fn noop() -> Handler {
		Handler::normal(|_| Ok(Flow::Next))
	}

	#[test]
	fn test_auto_routes_are_subscribed_with_plus() {
		let mut router = MqttRouter::new();
		router
			.auto("/all/hello", noop())
			.unwrap()
			.auto("/:channel/#", noop())
			.unwrap()
			.auto("/:stuff/specific", noop())
			.unwrap()
			.auto("/+/specific", noop())
			.unwrap();

		assert_eq!(router.subscription_topics(), [
			"/all/hello",
			"/+/#",
			"/+/specific"
		]);
		assert_eq!(router.stack().len(), 4);
	}

	#[test]
	fn test_manual_routes_wait_for_activation() {
		let hits = Arc::new(Mutex::new(0));
		let counter = Arc::clone(&hits);
		let mut router = MqttRouter::new();
		router
			.manual(
				"/all/hello/:who",
				Handler::normal(move |_| {
					*counter.lock().unwrap() += 1;
					Ok(Flow::Stop)
				}),
				Some("greeting"),
			)
			.unwrap();

		assert!(router.subscription_topics().is_empty());
		assert_eq!(router.paths(), ["/all/hello/:who"]);
		assert!(router.is_pending("greeting"));

		router.dispatch("/all/hello/bob", "");
		assert_eq!(*hits.lock().unwrap(), 0);

		let topic = router.activate("greeting").unwrap();
		assert_eq!(topic, "/all/hello/+");
		assert!(!router.is_pending("greeting"));

		router.dispatch("/all/hello/bob", "");
		assert_eq!(*hits.lock().unwrap(), 1);
	}

	#[test]
	fn test_manual_alias_defaults_to_pattern() {
		let mut router = MqttRouter::new();
		router.manual("/all/hello/message", noop(), None).unwrap();

		assert!(router.is_pending("/all/hello/message"));
		assert_eq!(router.activate("/all/hello/message").unwrap(), "/all/hello/message");
	}

	#[test]
	fn test_alias_errors() {
		let mut router = MqttRouter::new();
		router.manual("a/b", noop(), Some("x")).unwrap();

		assert_eq!(
			router.manual("c/d", noop(), Some("x")).unwrap_err(),
			RouteConfigError::duplicate_alias("x")
		);
		assert_eq!(
			router.activate("missing").unwrap_err(),
			RouteConfigError::unknown_alias("missing")
		);

		router.activate("x").unwrap();
		assert_eq!(
			router.activate("x").unwrap_err(),
			RouteConfigError::unknown_alias("x")
		);
	}

	#[test]
	fn test_active_topics_include_activated_manual_routes() {
		let mut router = MqttRouter::new();
		router
			.auto("devices/:id/state", noop())
			.unwrap()
			.manual("devices/+/state", noop(), Some("dup"))
			.unwrap()
			.manual("alerts/#", noop(), Some("alerts"))
			.unwrap();

		assert_eq!(router.active_topics(), ["devices/+/state"]);

		router.activate("alerts").unwrap();
		router.activate("dup").unwrap();
		assert_eq!(router.active_topics(), ["devices/+/state", "alerts/#"]);
	}

	#[test]
	fn test_invalid_pattern_is_not_recorded() {
		let mut router = MqttRouter::new();
		assert!(router.auto("a/#/b", noop()).is_err());
		assert!(router.manual("a/:", noop(), None).is_err());

		assert!(router.paths().is_empty());
		assert!(router.subscription_topics().is_empty());
		assert!(router.stack().is_empty());
	}

	#[test]
	fn test_single_default_handler() {
		let mut router = MqttRouter::new();
		router.default_handler(|_, _| {}).unwrap();
		assert_eq!(
			router.default_handler(|_, _| {}).unwrap_err(),
			RouteConfigError::DuplicateDefaultHandler
		);
	}
}
