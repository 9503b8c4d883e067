//! MQTT topic pattern item types and functionality

use std::convert::TryFrom;

use arcstr::Substr;
use thiserror::Error;

/// Error types for topic pattern parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicPatternError {
	/// Hash wildcard (#) used not at the end of the pattern
	#[error(
		"Invalid topic pattern '{pattern}': # wildcard can only be the last \
		 segment"
	)]
	HashPosition {
		/// The invalid pattern
		pattern: String,
	},

	/// Wildcard characters (+ or #) used incorrectly
	#[error("Invalid wildcard usage: {usage}")]
	WildcardUsage {
		/// Description of invalid usage
		usage: String,
	},

	/// Named parameter segment with an empty or illegal name
	#[error(
		"Invalid parameter name in segment '{segment}': names use \
		 [A-Za-z0-9_] only"
	)]
	InvalidParameterName {
		/// The offending segment
		segment: String,
	},

	/// The same parameter name appears twice in one pattern
	#[error("Duplicate parameter '{name}' in topic pattern '{pattern}'")]
	DuplicateParameter {
		/// Repeated parameter name
		name: String,
		/// The pattern containing it
		pattern: String,
	},

	/// Empty topic is not valid
	#[error("Topic pattern cannot be empty")]
	EmptyTopic,
}

impl TopicPatternError {
	/// Creates a new HashPosition error
	pub fn hash_position(pattern: impl Into<String>) -> Self {
		Self::HashPosition {
			pattern: pattern.into(),
		}
	}

	/// Creates a new WildcardUsage error
	pub fn wildcard_usage(usage: impl Into<String>) -> Self {
		Self::WildcardUsage {
			usage: usage.into(),
		}
	}

	/// Creates a new InvalidParameterName error
	pub fn invalid_parameter_name(segment: impl Into<String>) -> Self {
		Self::InvalidParameterName {
			segment: segment.into(),
		}
	}

	/// Creates a new DuplicateParameter error
	pub fn duplicate_parameter(
		name: impl Into<String>,
		pattern: impl Into<String>,
	) -> Self {
		Self::DuplicateParameter {
			name: name.into(),
			pattern: pattern.into(),
		}
	}
}

/// Route pattern segment: literal string or wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPatternItem {
	/// Literal string segment
	Str(Substr),
	/// Single-level wildcard `+` or named `:param`
	Plus(Option<Substr>),
	/// Multi-level wildcard `#`
	Hash,
}

impl TopicPatternItem {
	/// Returns the MQTT subscription form of the item.
	///
	/// Named parameters collapse to `+`, which is what the broker expects.
	pub fn as_str(&self) -> &str {
		match self {
			| TopicPatternItem::Str(s) => s,
			| TopicPatternItem::Plus(_) => "+",
			| TopicPatternItem::Hash => "#",
		}
	}

	/// Returns parameter name for named wildcards.
	pub fn param_name(&self) -> Option<Substr> {
		match self {
			| TopicPatternItem::Plus(Some(name)) => Some(name.clone()),
			| _ => None,
		}
	}
}

/// Writes the item as it appears in the route pattern (`:name`, not `+`).
impl std::fmt::Display for TopicPatternItem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			| TopicPatternItem::Plus(Some(name)) => write!(f, ":{name}"),
			| other => f.write_str(other.as_str()),
		}
	}
}

fn is_param_name(name: &str) -> bool {
	!name.is_empty()
		&& name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl TryFrom<Substr> for TopicPatternItem {
	type Error = TopicPatternError;
	fn try_from(item: Substr) -> Result<Self, Self::Error> {
		let res = match item.as_str() {
			| "+" => TopicPatternItem::Plus(None),
			| "#" => TopicPatternItem::Hash,
			| _ if item.starts_with(':') => {
				let name = &item.as_str()[1 ..];
				if !is_param_name(name) {
					return Err(TopicPatternError::invalid_parameter_name(
						item.as_str(),
					));
				}
				TopicPatternItem::Plus(Some(item.substr_from(name)))
			}
			| _ if item.contains(['+', '#']) => {
				return Err(TopicPatternError::wildcard_usage(item.as_str()));
			}
			| _ => TopicPatternItem::Str(item),
		};
		Ok(res)
	}
}
