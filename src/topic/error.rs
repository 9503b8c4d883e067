//! Topic limits and validation shared by the topic module
//!
//! Error types live next to the code that raises them:
//! [`TopicPatternError`] for patterns, [`TopicMatchError`] for topics.

use super::topic_match::TopicMatchError;
use super::topic_pattern_item::TopicPatternError;

/// Topic processing limits and constants
pub mod limits {
	/// Maximum number of levels in a route pattern
	pub const MAX_PATTERN_DEPTH: usize = 32;

	/// Maximum encoded length of an MQTT topic name (two-byte length prefix)
	pub const MAX_TOPIC_LENGTH: usize = 65_535;
}

/// Validation utilities for topic operations
pub mod validation {
	use super::limits::*;
	use super::{TopicMatchError, TopicPatternError};

	/// Validates a concrete (published) topic before it is matched.
	///
	/// Only what MQTT itself forbids is rejected: an empty topic, a topic
	/// over [`MAX_TOPIC_LENGTH`] bytes, a null byte, and wildcard characters.
	/// Depth and level length are unrestricted.
	pub fn validate_topic_path(path: &str) -> Result<(), TopicMatchError> {
		if path.is_empty() {
			return Err(TopicMatchError::invalid_topic(path, "topic is empty"));
		}

		if path.len() > MAX_TOPIC_LENGTH {
			return Err(TopicMatchError::invalid_topic(
				path,
				format!(
					"topic too long: {} > {}",
					path.len(),
					MAX_TOPIC_LENGTH
				),
			));
		}

		for (index, segment) in path.split('/').enumerate() {
			if segment.contains('\0') {
				return Err(TopicMatchError::invalid_topic(
					path,
					format!("null byte in segment {index}"),
				));
			}

			if segment.contains(['+', '#']) {
				return Err(TopicMatchError::invalid_topic(
					path,
					format!("wildcard character in segment {index}"),
				));
			}
		}

		Ok(())
	}

	/// Validates topic pattern for subscription constraints
	pub fn validate_pattern_for_subscription(
		pattern: &str,
	) -> Result<(), TopicPatternError> {
		if pattern.is_empty() || pattern.trim().is_empty() {
			return Err(TopicPatternError::EmptyTopic);
		}

		let segments = pattern.split('/').count();
		if segments > MAX_PATTERN_DEPTH {
			return Err(TopicPatternError::wildcard_usage(format!(
				"Pattern too deep: {segments} segments > {MAX_PATTERN_DEPTH}"
			)));
		}

		Ok(())
	}
}
