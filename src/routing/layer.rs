//! A single route: one compiled pattern bound to one handler.

use std::panic::{AssertUnwindSafe, catch_unwind};

use arcstr::ArcStr;
use tracing::trace;

use super::error::DispatchError;
use super::handler::{Flow, Handler};
use super::request::Request;
use crate::topic::{
	MatchOptions, Params, TopicMatchError, TopicPath, TopicPatternError,
	TopicPatternPath,
};

/// One registered route.
///
/// Layers are immutable once built. Captures are returned from
/// [`Layer::matches`] rather than stored, so a layer can serve any number of
/// concurrent dispatches.
#[derive(Debug, Clone)]
pub struct Layer {
	pattern: TopicPatternPath,
	handler: Handler,
}

impl Layer {
	/// Compiles `pattern` and binds it to `handler`.
	pub fn new(
		pattern: impl Into<ArcStr>,
		handler: Handler,
		options: MatchOptions,
	) -> Result<Self, TopicPatternError> {
		let pattern = TopicPatternPath::new_from_string(pattern, options)?;
		Ok(Self { pattern, handler })
	}

	/// The compiled pattern.
	pub fn pattern(&self) -> &TopicPatternPath {
		&self.pattern
	}

	/// True when the handler only runs while an error is pending.
	pub fn is_error_handler(&self) -> bool {
		self.handler.is_error_handler()
	}

	/// Tests `topic` against this route.
	///
	/// The bare `#` route accepts everything without inspecting the topic.
	/// `Err` means the topic itself is malformed.
	pub fn matches(
		&self,
		topic: &TopicPath,
	) -> Result<Option<Params>, TopicMatchError> {
		if self.pattern.is_catch_all() {
			return Ok(Some(Params::new()));
		}
		self.pattern.matches(topic)
	}

	/// Runs the handler inside a failure boundary.
	///
	/// `pending` must be `Some` exactly when this is an error handler. Errors
	/// and panics coming out of the handler turn into [`Flow::Fail`]; the
	/// layer never decides on its own to continue.
	pub fn invoke(
		&self,
		request: &mut Request,
		pending: Option<DispatchError>,
	) -> Flow {
		let pattern = self.pattern.topic_pattern();
		trace!(pattern = %pattern, topic = %request.topic(), "Invoking route handler");

		let outcome = match (&self.handler, pending) {
			| (Handler::Normal(handler), None) => {
				catch_unwind(AssertUnwindSafe(|| handler(request)))
			}
			| (Handler::Error(handler), Some(err)) => {
				catch_unwind(AssertUnwindSafe(|| handler(err, request)))
			}
			| (Handler::Normal(_), Some(err)) => {
				// not eligible while an error is pending
				return Flow::Fail(err);
			}
			| (Handler::Error(_), None) => return Flow::Next,
		};

		match outcome {
			| Ok(Ok(flow)) => flow,
			| Ok(Err(source)) => {
				Flow::Fail(DispatchError::Handler { pattern, source })
			}
			| Err(payload) => {
				Flow::Fail(DispatchError::from_panic(pattern, payload))
			}
		}
	}
}
