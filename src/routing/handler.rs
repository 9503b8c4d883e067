//! Handler shapes and the control-flow value they return.

use std::fmt;
use std::sync::Arc;

use super::error::{BoxError, DispatchError};
use super::request::Request;

/// What the stack should do after a handler ran.
#[derive(Debug)]
pub enum Flow {
	/// Continue with the next matching route; clears any pending error.
	Next,
	/// Continue, but only error handlers are eligible until one of them
	/// returns [`Flow::Next`].
	Fail(DispatchError),
	/// End the dispatch here.
	Stop,
}

impl Flow {
	/// Shorthand for `Flow::Fail(DispatchError::custom(err))`.
	pub fn fail(err: impl Into<BoxError>) -> Self {
		Flow::Fail(DispatchError::custom(err))
	}
}

/// Value returned by handler bodies. `Err` is forwarded as a failure of the
/// route, exactly like [`Flow::Fail`].
pub type HandlerResult = Result<Flow, BoxError>;

/// Handler for ordinary messages
pub type NormalHandlerFn =
	dyn Fn(&mut Request) -> HandlerResult + Send + Sync + 'static;

/// Handler invoked while an error is pending; takes ownership of the error
pub type ErrorHandlerFn =
	dyn Fn(DispatchError, &mut Request) -> HandlerResult + Send + Sync + 'static;

/// End-of-stack handler: receives the unhandled error, if any
pub type DefaultHandlerFn =
	dyn Fn(Option<DispatchError>, &Request) + Send + Sync + 'static;

/// A route handler, tagged with its kind at registration.
#[derive(Clone)]
pub enum Handler {
	/// Runs when no error is pending
	Normal(Arc<NormalHandlerFn>),
	/// Runs only while an error is pending
	Error(Arc<ErrorHandlerFn>),
}

impl Handler {
	/// Wraps a normal handler.
	pub fn normal<F>(f: F) -> Self
	where F: Fn(&mut Request) -> HandlerResult + Send + Sync + 'static {
		Handler::Normal(Arc::new(f))
	}

	/// Wraps an error handler.
	pub fn error<F>(f: F) -> Self
	where F: Fn(DispatchError, &mut Request) -> HandlerResult
			+ Send
			+ Sync
			+ 'static {
		Handler::Error(Arc::new(f))
	}

	/// True for error handlers.
	pub fn is_error_handler(&self) -> bool {
		matches!(self, Handler::Error(_))
	}
}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			| Handler::Normal(_) => f.write_str("Handler::Normal"),
			| Handler::Error(_) => f.write_str("Handler::Error"),
		}
	}
}
