use std::collections::HashSet;
use std::convert::TryFrom;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use arcstr::{ArcStr, Substr};
use lru::LruCache;

use super::error::validation;
use super::topic_match::{ParamKey, Params, TopicMatchError, TopicPath};
use super::topic_pattern_item::{TopicPatternError, TopicPatternItem};

/// Memoization of match results for a single pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
	/// Keep the results for the most recently seen topics
	Lru(NonZeroUsize),
	/// Match every topic from scratch
	#[default]
	NoCache,
}

/// Options controlling how patterns compare against topics.
///
/// A stack hands the same options to every layer it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
	/// Compare literal segments byte-for-byte (`true`) or ASCII
	/// case-insensitively (`false`)
	pub case_sensitive: bool,
	/// When `false`, a single trailing `/` on the topic or the pattern is
	/// ignored
	pub strict: bool,
	/// Per-pattern match memo
	pub cache_strategy: CacheStrategy,
}

impl Default for MatchOptions {
	fn default() -> Self {
		Self {
			case_sensitive: true,
			strict: true,
			cache_strategy: CacheStrategy::NoCache,
		}
	}
}

/// Compiled route pattern with wildcard and named parameter support
#[derive(Debug)]
pub struct TopicPatternPath {
	template_pattern: ArcStr, // route as registered: "sensors/:room/temp"
	mqtt_topic_subscription: ArcStr, // broker form: "sensors/+/temp"
	segments: Vec<TopicPatternItem>,
	/// Number of leading segments that take part in matching; shorter than
	/// `segments` only when a trailing `/` is ignored.
	match_len: usize,
	options: MatchOptions,
	/// Match memo keyed by topic; never holds per-dispatch state.
	match_cache: Option<Mutex<LruCache<ArcStr, Option<Params>>>>,
}

impl Clone for TopicPatternPath {
	fn clone(&self) -> Self {
		Self {
			template_pattern: self.template_pattern.clone(),
			mqtt_topic_subscription: self.mqtt_topic_subscription.clone(),
			segments: self.segments.clone(),
			match_len: self.match_len,
			options: self.options,
			match_cache: Self::new_cache(self.options.cache_strategy),
		}
	}
}

impl TopicPatternPath {
	/// Compiles a route pattern.
	pub fn new_from_string(
		topic_pattern: impl Into<ArcStr>,
		options: MatchOptions,
	) -> Result<Self, TopicPatternError> {
		let topic_pattern = topic_pattern.into();
		validation::validate_pattern_for_subscription(&topic_pattern)?;

		let segments: Result<Vec<_>, _> = topic_pattern
			.split('/')
			.map(|s| topic_pattern.substr_from(s))
			.map(TopicPatternItem::try_from)
			.collect();

		let segments = segments?;

		let mut seen_names = HashSet::new();
		for name in segments.iter().filter_map(TopicPatternItem::param_name) {
			if !seen_names.insert(name.clone()) {
				return Err(TopicPatternError::duplicate_parameter(
					name.as_str(),
					topic_pattern.as_str(),
				));
			}
		}

		if let Some(hash_pos) = segments
			.iter()
			.position(|s| matches!(*s, TopicPatternItem::Hash))
		{
			if hash_pos != segments.len() - 1 {
				return Err(TopicPatternError::hash_position(
					topic_pattern.as_str(),
				));
			}
		}

		let match_len = if !options.strict && has_trailing_slash(&segments)
		{
			segments.len() - 1
		} else {
			segments.len()
		};

		Ok(Self {
			mqtt_topic_subscription: ArcStr::from(
				Self::to_mqtt_subscription_pattern(&segments),
			),
			template_pattern: topic_pattern,
			segments,
			match_len,
			options,
			match_cache: Self::new_cache(options.cache_strategy),
		})
	}

	fn new_cache(
		strategy: CacheStrategy,
	) -> Option<Mutex<LruCache<ArcStr, Option<Params>>>> {
		match strategy {
			| CacheStrategy::Lru(capacity) => {
				Some(Mutex::new(LruCache::new(capacity)))
			}
			| CacheStrategy::NoCache => None,
		}
	}

	/// Returns the options this pattern was compiled with.
	pub fn options(&self) -> MatchOptions {
		self.options
	}

	/// Returns MQTT pattern with wildcards for broker subscription.
	pub fn mqtt_pattern(&self) -> ArcStr {
		self.mqtt_topic_subscription.clone()
	}

	/// Returns original pattern with named parameters.
	pub fn topic_pattern(&self) -> ArcStr {
		self.template_pattern.clone()
	}

	/// True for the bare `#` pattern, which accepts every topic without
	/// looking at it.
	pub fn is_catch_all(&self) -> bool {
		matches!(self.segments.as_slice(), [TopicPatternItem::Hash])
	}

	/// Returns true if pattern contains multi-level wildcard (#).
	pub fn contains_hash(&self) -> bool {
		self.segments
			.last()
			.is_some_and(|s| matches!(s, TopicPatternItem::Hash))
	}

	fn str_len(segments: &[TopicPatternItem]) -> usize {
		if segments.is_empty() {
			return 0;
		}
		(segments.len() - 1) + // slashes count
		segments.iter().map(|s| s.as_str().len()).sum::<usize>()
	}

	fn to_mqtt_subscription_pattern(segments: &[TopicPatternItem]) -> String {
		let mut mqtt_topic = String::with_capacity(Self::str_len(segments));
		segments.iter().enumerate().for_each(|(i, segment)| {
			if i > 0 {
				mqtt_topic.push('/');
			}
			mqtt_topic.push_str(segment.as_str());
		});
		mqtt_topic
	}

	/// Matches a topic, separating ordinary non-matches from failures.
	///
	/// Returns `Ok(None)` when the pattern does not apply and `Err` only when
	/// the topic is malformed. Results are memoized when the pattern was built
	/// with [`CacheStrategy::Lru`]; failures are never cached.
	pub fn matches(
		&self,
		topic: &TopicPath,
	) -> Result<Option<Params>, TopicMatchError> {
		if let Some(cache_mutex) = &self.match_cache {
			let mut match_cache =
				cache_mutex.lock().unwrap_or_else(PoisonError::into_inner);
			if let Some(cached) = match_cache.get(&topic.path) {
				return Ok(cached.clone());
			}
		}

		let outcome = match self.try_match(topic) {
			| Ok(params) => Some(params),
			| Err(err) if err.is_mismatch() => None,
			| Err(err) => return Err(err),
		};

		if let Some(cache_mutex) = &self.match_cache {
			let mut match_cache =
				cache_mutex.lock().unwrap_or_else(PoisonError::into_inner);
			match_cache.put(topic.path.clone(), outcome.clone());
		}
		Ok(outcome)
	}

	/// Matches topic path against this pattern, extracting parameters.
	///
	/// The error explains why the topic did not match.
	pub fn try_match(
		&self,
		topic: &TopicPath,
	) -> Result<Params, TopicMatchError> {
		validation::validate_topic_path(topic.as_str())?;

		let pattern = &self.segments[.. self.match_len];
		let mut topic_len = topic.segments.len();
		if !self.options.strict
			&& !self.contains_hash()
			&& topic_len > 1
			&& topic.segments[topic_len - 1].is_empty()
		{
			topic_len -= 1;
		}

		let mut topic_index = 0;
		let mut positional = 0;
		let mut params = Params::new();
		for pattern_segment in pattern {
			match pattern_segment {
				| TopicPatternItem::Str(expected) => {
					if topic_index >= topic_len {
						return Err(TopicMatchError::UnexpectedEndOfTopic);
					}
					let found = &topic.segments[topic_index];
					if !self.literal_eq(expected, found) {
						return Err(TopicMatchError::SegmentMismatch {
							expected: expected.to_string(),
							found: found.to_string(),
							position: topic_index,
						});
					}
					topic_index += 1;
				}
				| TopicPatternItem::Plus(opt_name) => {
					if topic_index >= topic_len {
						return Err(TopicMatchError::UnexpectedEndOfTopic);
					}
					let value = topic.segments[topic_index].clone();
					let key = match opt_name {
						| Some(name) => ParamKey::Named(name.clone()),
						| None => {
							positional += 1;
							ParamKey::Index(positional - 1)
						}
					};
					params.push(key, value);
					topic_index += 1;
				}
				| TopicPatternItem::Hash => {
					// always last, enforced at construction
					let rest = topic.join_segments(topic_index .. topic_len);
					params.push(ParamKey::Index(positional), rest);
					return Ok(params);
				}
			}
		}
		if topic_index < topic_len {
			return Err(TopicMatchError::UnexpectedEndOfPattern);
		}
		Ok(params)
	}

	fn literal_eq(&self, expected: &Substr, found: &Substr) -> bool {
		if self.options.case_sensitive {
			expected == found
		} else {
			expected.eq_ignore_ascii_case(found)
		}
	}
}

fn has_trailing_slash(segments: &[TopicPatternItem]) -> bool {
	segments.len() > 1
		&& matches!(segments.last(), Some(TopicPatternItem::Str(s)) if s.is_empty())
}

impl std::fmt::Display for TopicPatternPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.template_pattern)
	}
}

impl TryFrom<String> for TopicPatternPath {
	type Error = TopicPatternError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new_from_string(value, MatchOptions::default())
	}
}

impl TryFrom<&str> for TopicPatternPath {
	type Error = TopicPatternError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new_from_string(value, MatchOptions::default())
	}
}

impl TryFrom<ArcStr> for TopicPatternPath {
	type Error = TopicPatternError;

	fn try_from(value: ArcStr) -> Result<Self, Self::Error> {
		Self::new_from_string(value, MatchOptions::default())
	}
}
