//! Ordered route stack and the dispatch loop.
//!
//! Each inbound message walks the layers in registration order:
//!
//! 1. Layers are tried from a cursor that only moves forward, so every layer
//!    is examined at most once per dispatch.
//! 2. With no error pending only normal handlers are eligible; with an error
//!    pending only error handlers are.
//! 3. The first eligible match runs and its [`Flow`] decides how to resume.
//! 4. Reaching the end hands the request (and any pending error) to the
//!    default handler.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use arcstr::ArcStr;
use bytes::Bytes;
use tracing::{Level, debug, error, span, trace};

use super::error::{DispatchError, RouteConfigError, panic_message};
use super::handler::{DefaultHandlerFn, Flow, Handler};
use super::layer::Layer;
use super::request::Request;
use crate::topic::{MatchOptions, Params, TopicPath};

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
	/// A handler returned [`Flow::Stop`]
	Stopped {
		/// Route that stopped the chain
		pattern: ArcStr,
	},
	/// End of stack reached with no error pending
	Completed,
	/// End of stack reached with an error nobody handled
	Unhandled,
}

/// Ordered collection of routes plus an optional default handler.
#[derive(Clone, Default)]
pub struct Stack {
	layers: Vec<Layer>,
	default_handler: Option<Arc<DefaultHandlerFn>>,
	options: MatchOptions,
}

impl Stack {
	/// Creates an empty stack with default match options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty stack whose layers use `options`.
	pub fn with_options(options: MatchOptions) -> Self {
		Self {
			layers: Vec::new(),
			default_handler: None,
			options,
		}
	}

	/// Options shared by every layer of this stack.
	pub fn options(&self) -> MatchOptions {
		self.options
	}

	/// Compiles `pattern` and appends a route.
	pub fn add(
		&mut self,
		pattern: impl Into<ArcStr>,
		handler: Handler,
	) -> Result<(), RouteConfigError> {
		let layer = Layer::new(pattern, handler, self.options)?;
		self.push(layer);
		Ok(())
	}

	/// Appends an already compiled layer.
	pub fn push(&mut self, layer: Layer) {
		debug!(
			pattern = %layer.pattern(),
			error_handler = layer.is_error_handler(),
			position = self.layers.len(),
			"Route added"
		);
		self.layers.push(layer);
	}

	/// Registers the end-of-stack handler. Only one may be registered.
	pub fn set_default_handler<F>(&mut self, f: F) -> Result<(), RouteConfigError>
	where F: Fn(Option<DispatchError>, &Request) + Send + Sync + 'static {
		if self.default_handler.is_some() {
			return Err(RouteConfigError::DuplicateDefaultHandler);
		}
		self.default_handler = Some(Arc::new(f));
		Ok(())
	}

	/// True once a default handler is registered.
	pub fn has_default_handler(&self) -> bool {
		self.default_handler.is_some()
	}

	/// Registered layers in match order.
	pub fn layers(&self) -> &[Layer] {
		&self.layers
	}

	/// Number of registered layers.
	pub fn len(&self) -> usize {
		self.layers.len()
	}

	/// True when no routes are registered.
	pub fn is_empty(&self) -> bool {
		self.layers.is_empty()
	}

	/// Runs one inbound message through the stack.
	pub fn dispatch(
		&self,
		topic: impl Into<ArcStr>,
		payload: impl Into<Bytes>,
	) -> DispatchOutcome {
		let topic = Arc::new(TopicPath::new(topic));
		let span = span!(Level::DEBUG, "dispatch", topic = %topic);
		let _enter = span.enter();

		let mut request =
			Request::from_topic_path(Arc::clone(&topic), payload.into());
		let mut cursor = 0;
		let mut pending: Option<DispatchError> = None;

		loop {
			let Some((index, params)) =
				self.next_eligible(&topic, &mut cursor, &mut pending)
			else {
				return self.finish(request, pending);
			};

			let layer = &self.layers[index];
			let pattern = layer.pattern().topic_pattern();
			request.set_path(pattern.clone());
			request.set_params(params);

			match layer.invoke(&mut request, pending.take()) {
				| Flow::Next => {}
				| Flow::Fail(err) => {
					debug!(pattern = %pattern, error = %err, "Route failed, looking for an error handler");
					pending = Some(err);
				}
				| Flow::Stop => {
					trace!(pattern = %pattern, "Route stopped dispatch");
					return DispatchOutcome::Stopped { pattern };
				}
			}
		}
	}

	/// Scans forward from `cursor` for the next layer that matches and is
	/// eligible under the current error state.
	fn next_eligible(
		&self,
		topic: &TopicPath,
		cursor: &mut usize,
		pending: &mut Option<DispatchError>,
	) -> Option<(usize, Params)> {
		while *cursor < self.layers.len() {
			let index = *cursor;
			*cursor += 1;
			let layer = &self.layers[index];

			match layer.matches(topic) {
				| Ok(Some(params)) => {
					if layer.is_error_handler() == pending.is_some() {
						return Some((index, params));
					}
					trace!(pattern = %layer.pattern(), "Skipping ineligible route");
				}
				| Ok(None) => {}
				| Err(source) => {
					debug!(pattern = %layer.pattern(), error = %source, "Match failed");
					if pending.is_none() {
						*pending = Some(DispatchError::Match {
							pattern: layer.pattern().topic_pattern(),
							source,
						});
					}
				}
			}
		}
		None
	}

	fn finish(
		&self,
		request: Request,
		pending: Option<DispatchError>,
	) -> DispatchOutcome {
		let outcome = if pending.is_some() {
			DispatchOutcome::Unhandled
		} else {
			DispatchOutcome::Completed
		};

		match &self.default_handler {
			| Some(handler) => {
				let result =
					catch_unwind(AssertUnwindSafe(|| handler(pending, &request)));
				if let Err(payload) = result {
					error!(
						topic = %request.topic(),
						panic = %panic_message(payload.as_ref()),
						"Default handler panicked"
					);
				}
			}
			| None => match pending {
				| Some(err) => {
					error!(topic = %request.topic(), error = %err, "Unhandled error in route stack");
				}
				| None => {
					debug!(topic = %request.topic(), "Reached end of the stack, no default handler");
				}
			},
		}
		outcome
	}
}

impl fmt::Debug for Stack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Stack")
			.field("layers", &self.layers)
			.field("has_default_handler", &self.default_handler.is_some())
			.field("options", &self.options)
			.finish()
	}
}
