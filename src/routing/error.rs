//! Route configuration errors and errors carried through a dispatch.

use arcstr::ArcStr;
use thiserror::Error;

use crate::topic::{TopicMatchError, TopicPatternError};

/// Error type handler bodies return; any `std::error::Error` converts into it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while registering routes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteConfigError {
	/// Route pattern failed to compile
	#[error("Invalid route pattern: {0}")]
	InvalidPattern(#[from] TopicPatternError),
	/// A default handler is already registered
	#[error("Only one default handler can be registered")]
	DuplicateDefaultHandler,
	/// A manual route with this alias is already waiting for activation
	#[error("Alias '{alias}' is already in use")]
	DuplicateAlias {
		/// The repeated alias
		alias: String,
	},
	/// No manual route is registered under this alias
	#[error("Unknown alias: {alias}")]
	UnknownAlias {
		/// The alias that was asked for
		alias: String,
	},
}

impl RouteConfigError {
	/// Creates a new DuplicateAlias error
	pub fn duplicate_alias(alias: impl Into<String>) -> Self {
		Self::DuplicateAlias {
			alias: alias.into(),
		}
	}

	/// Creates a new UnknownAlias error
	pub fn unknown_alias(alias: impl Into<String>) -> Self {
		Self::UnknownAlias {
			alias: alias.into(),
		}
	}
}

/// Errors carried along the handler chain during one dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
	/// The topic could not be matched against a route
	#[error("Route '{pattern}' failed to match: {source}")]
	Match {
		/// Route whose matcher failed
		pattern: ArcStr,
		/// Underlying match failure
		#[source]
		source: TopicMatchError,
	},
	/// A handler returned an error
	#[error("Handler for '{pattern}' failed: {source}")]
	Handler {
		/// Route whose handler failed
		pattern: ArcStr,
		/// Error returned by the handler
		#[source]
		source: BoxError,
	},
	/// A handler panicked
	#[error("Handler for '{pattern}' panicked: {message}")]
	Panicked {
		/// Route whose handler panicked
		pattern: ArcStr,
		/// Panic payload, when it was a string
		message: String,
	},
	/// Error raised explicitly by a handler through `Flow::Fail`
	#[error("{0}")]
	Custom(#[source] BoxError),
}

impl DispatchError {
	/// Wraps any error so a handler can pass it down the chain.
	pub fn custom(source: impl Into<BoxError>) -> Self {
		Self::Custom(source.into())
	}

	/// Route the error originated from, if known.
	pub fn pattern(&self) -> Option<&str> {
		match self {
			| Self::Match { pattern, .. }
			| Self::Handler { pattern, .. }
			| Self::Panicked { pattern, .. } => Some(pattern.as_str()),
			| Self::Custom(_) => None,
		}
	}

	pub(crate) fn from_panic(
		pattern: ArcStr,
		payload: Box<dyn std::any::Any + Send>,
	) -> Self {
		Self::Panicked {
			pattern,
			message: panic_message(payload.as_ref()),
		}
	}
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"non-string panic payload".to_string()
	}
}
