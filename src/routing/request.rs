//! Per-message context handed from one route to the next.

use std::sync::Arc;

use arcstr::ArcStr;
use bytes::Bytes;

use crate::message_serializer::MessageSerializer;
use crate::topic::{Params, TopicPath};

/// Per-message context handed down the handler chain.
///
/// The topic never changes. The payload may be replaced by a handler for the
/// handlers after it. `params` holds the captures of the route currently
/// running and is replaced on every match.
#[derive(Debug, Clone)]
pub struct Request {
	topic: Arc<TopicPath>,
	payload: Bytes,
	params: Params,
	path: Option<ArcStr>,
}

impl Request {
	/// Creates a request for an inbound message.
	pub fn new(topic: impl Into<ArcStr>, payload: impl Into<Bytes>) -> Self {
		Self::from_topic_path(Arc::new(TopicPath::new(topic)), payload.into())
	}

	pub(crate) fn from_topic_path(topic: Arc<TopicPath>, payload: Bytes) -> Self {
		Self {
			topic,
			payload,
			params: Params::new(),
			path: None,
		}
	}

	/// Topic the message was published on.
	pub fn topic(&self) -> &str {
		self.topic.as_str()
	}

	/// Topic split into levels.
	pub fn topic_path(&self) -> &TopicPath {
		&self.topic
	}

	/// Current payload.
	pub fn payload(&self) -> &Bytes {
		&self.payload
	}

	/// Payload as UTF-8 text.
	pub fn payload_str(&self) -> Result<&str, std::str::Utf8Error> {
		std::str::from_utf8(&self.payload)
	}

	/// Replaces the payload seen by later handlers.
	pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
		self.payload = payload.into();
	}

	/// Decodes the payload with the given serializer.
	pub fn decode<T, S>(&self, serializer: &S) -> Result<T, S::DeserializeError>
	where S: MessageSerializer<T> {
		serializer.deserialize(&self.payload)
	}

	/// Parameters captured by the running route.
	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Shorthand for `params().get(name)`.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name)
	}

	pub(crate) fn set_params(&mut self, params: Params) {
		self.params = params;
	}

	/// Pattern of the route currently (or last) running.
	pub fn path(&self) -> Option<&str> {
		self.path.as_deref()
	}

	pub(crate) fn set_path(&mut self, path: ArcStr) {
		self.path = Some(path);
	}
}
