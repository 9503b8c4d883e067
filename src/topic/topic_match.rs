//! Incoming topic paths and the parameters captured from them.

use std::fmt;

use arcstr::{ArcStr, Substr};
use smallvec::SmallVec;
use thiserror::Error;

/// A concrete topic split into its `/`-separated levels.
///
/// Built once per inbound message and shared by every layer that tries to
/// match it.
#[derive(Debug, Clone)]
pub struct TopicPath {
	/// The topic exactly as received
	pub path: ArcStr,
	/// Levels of `path`, borrowed from the same allocation
	pub segments: Vec<Substr>,
}

impl TopicPath {
	/// Splits `path` into levels.
	pub fn new(path: impl Into<ArcStr>) -> Self {
		let path = path.into();
		let segments: Vec<Substr> =
			path.split('/').map(|s| path.substr_from(s)).collect();
		Self { path, segments }
	}

	/// Returns the original topic string.
	pub fn path(&self) -> ArcStr {
		self.path.clone()
	}

	/// Returns the original topic as `&str`.
	pub fn as_str(&self) -> &str {
		&self.path
	}

	/// Returns the substring covering `segments[range]`, slashes included.
	///
	/// An empty range yields an empty string.
	pub(crate) fn join_segments(&self, range: std::ops::Range<usize>) -> Substr {
		if range.is_empty() {
			self.path.substr(0 .. 0)
		} else if range.len() == 1 {
			self.segments[range.start].clone()
		} else {
			let start_segment = &self.segments[range.start];
			let end_segment = &self.segments[range.end - 1];
			let start_pos = start_segment.range().start;
			let end_pos = end_segment.range().end;
			self.path.substr(start_pos .. end_pos)
		}
	}
}

impl fmt::Display for TopicPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.path)
	}
}

/// Why a topic did not match a pattern.
///
/// Only [`TopicMatchError::InvalidTopic`] is a real failure; every other
/// variant describes an ordinary non-match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicMatchError {
	/// Topic has more levels than the pattern
	#[error("Topic is longer than the pattern")]
	UnexpectedEndOfPattern,
	/// Topic has fewer levels than the pattern
	#[error("Topic is shorter than the pattern")]
	UnexpectedEndOfTopic,
	/// A literal level differs
	#[error(
		"Segment mismatch at position {position}: expected '{expected}', \
		 found '{found}'"
	)]
	SegmentMismatch {
		/// Literal from the pattern
		expected: String,
		/// Level from the topic
		found: String,
		/// Zero-based level index
		position: usize,
	},
	/// The topic itself is malformed and cannot be matched at all
	#[error("Topic '{topic}' cannot be matched: {reason}")]
	InvalidTopic {
		/// The offending topic
		topic: String,
		/// What is wrong with it
		reason: String,
	},
}

impl TopicMatchError {
	/// Creates a new InvalidTopic error
	pub fn invalid_topic(
		topic: impl Into<String>,
		reason: impl Into<String>,
	) -> Self {
		Self::InvalidTopic {
			topic: topic.into(),
			reason: reason.into(),
		}
	}

	/// True for the variants that only mean "this pattern does not apply".
	pub fn is_mismatch(&self) -> bool {
		!matches!(self, Self::InvalidTopic { .. })
	}
}

/// Key of a captured value: a parameter name or a positional index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
	/// Captured by `:name`
	Named(Substr),
	/// Captured by an unnamed `+` or `#`, numbered from zero
	Index(usize),
}

impl fmt::Display for ParamKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			| ParamKey::Named(name) => write!(f, "{name}"),
			| ParamKey::Index(index) => write!(f, "{index}"),
		}
	}
}

/// Values captured by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
	entries: SmallVec<[(ParamKey, Substr); 4]>,
}

impl Params {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn push(&mut self, key: ParamKey, value: Substr) {
		self.entries.push((key, value));
	}

	/// Value captured by the `:name` segment.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.iter().find_map(|(key, value)| match key {
			| ParamKey::Named(n) if n.as_str() == name => Some(value.as_str()),
			| _ => None,
		})
	}

	/// Value captured by the `index`-th unnamed wildcard.
	pub fn index(&self, index: usize) -> Option<&str> {
		self.entries.iter().find_map(|(key, value)| match key {
			| ParamKey::Index(i) if *i == index => Some(value.as_str()),
			| _ => None,
		})
	}

	/// Number of captured values.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over captures in pattern order.
	pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &str)> {
		self.entries.iter().map(|(key, value)| (key, value.as_str()))
	}
}

impl fmt::Display for Params {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{")?;
		for (i, (key, value)) in self.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{key}: {value}")?;
		}
		write!(f, "}}")
	}
}
