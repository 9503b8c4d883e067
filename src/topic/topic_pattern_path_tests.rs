//! Tests for TopicPatternPath functionality

use std::num::NonZeroUsize;

use super::{
	CacheStrategy, MatchOptions, ParamKey, TopicMatchError, TopicPath,
	TopicPatternError, TopicPatternPath,
};

fn create_pattern(pattern: &str) -> TopicPatternPath {
	TopicPatternPath::new_from_string(pattern, MatchOptions::default())
		.expect("Pattern should be valid")
}

fn create_pattern_with(pattern: &str, options: MatchOptions) -> TopicPatternPath {
	TopicPatternPath::new_from_string(pattern, options)
		.expect("Pattern should be valid")
}

fn is_match(pattern: &TopicPatternPath, topic: &str) -> bool {
	pattern
		.matches(&TopicPath::new(topic))
		.expect("topic should be well formed")
		.is_some()
}

mod construction_tests {
	use super::*;

	#[test]
	fn test_mqtt_pattern_replaces_named_parameters() {
		let pattern = create_pattern("sensors/:room/temp");
		assert_eq!(pattern.topic_pattern(), "sensors/:room/temp");
		assert_eq!(pattern.mqtt_pattern(), "sensors/+/temp");

		let pattern = create_pattern("/:channel/#");
		assert_eq!(pattern.mqtt_pattern(), "/+/#");
	}

	#[test]
	fn test_empty_pattern_rejected() {
		assert_eq!(
			TopicPatternPath::try_from("").unwrap_err(),
			TopicPatternError::EmptyTopic
		);
		assert_eq!(
			TopicPatternPath::try_from("   ").unwrap_err(),
			TopicPatternError::EmptyTopic
		);
	}

	#[test]
	fn test_hash_must_be_last() {
		let err = TopicPatternPath::try_from("a/#/b").unwrap_err();
		assert_eq!(err, TopicPatternError::hash_position("a/#/b"));

		let err = TopicPatternPath::try_from("#/a").unwrap_err();
		assert_eq!(err, TopicPatternError::hash_position("#/a"));
	}

	#[test]
	fn test_duplicate_parameter_rejected() {
		let err = TopicPatternPath::try_from("a/:id/b/:id").unwrap_err();
		assert_eq!(
			err,
			TopicPatternError::duplicate_parameter("id", "a/:id/b/:id")
		);
	}

	#[test]
	fn test_too_deep_pattern_rejected() {
		let deep = vec!["a"; 40].join("/");
		assert!(matches!(
			TopicPatternPath::try_from(deep.as_str()),
			Err(TopicPatternError::WildcardUsage { .. })
		));
	}

	#[test]
	fn test_catch_all_detection() {
		assert!(create_pattern("#").is_catch_all());
		assert!(!create_pattern("a/#").is_catch_all());
		assert!(create_pattern("a/#").contains_hash());
		assert!(!create_pattern("a/+").contains_hash());
	}
}

mod matching_tests {
	use super::*;

	#[test]
	fn test_literal_patterns_need_equal_length() {
		let pattern = create_pattern("/this/is/a/");
		assert!(is_match(&pattern, "/this/is/a/"));
		assert!(!is_match(&pattern, "/this/is/a/not/compatible/path"));
		assert!(!is_match(&pattern, "/not/compatible"));
		assert!(!is_match(&pattern, "/this/is/a"));
	}

	#[test]
	fn test_single_level_wildcard() {
		let pattern = create_pattern("a/+");
		assert!(is_match(&pattern, "a/x"));
		assert!(!is_match(&pattern, "a/x/y"));
		assert!(!is_match(&pattern, "a"));
	}

	#[test]
	fn test_multi_level_wildcard() {
		let pattern = create_pattern("a/b/#");
		assert!(is_match(&pattern, "a/b/x"));
		assert!(is_match(&pattern, "a/b/x/y"));
		assert!(is_match(&pattern, "a/b"));
		assert!(!is_match(&pattern, "a/c"));
		assert!(!is_match(&pattern, "a"));
	}

	#[test]
	fn test_leading_slash_is_a_level() {
		let pattern = create_pattern("/a/path/#");
		assert!(is_match(&pattern, "/a/path/that/works"));
		assert!(!is_match(&pattern, "a/path/that/does/not"));
	}

	#[test]
	fn test_named_and_positional_captures() {
		let pattern = create_pattern("a/:p/+");
		let params = pattern
			.matches(&TopicPath::new("a/z/q"))
			.unwrap()
			.expect("should match");

		assert_eq!(params.get("p"), Some("z"));
		assert_eq!(params.index(0), Some("q"));
		assert_eq!(params.len(), 2);
		assert_eq!(params.to_string(), "{p: z, 0: q}");
	}

	#[test]
	fn test_positional_indices_count_unnamed_only() {
		let pattern = create_pattern("+/:path/that/+/#");
		let params = pattern
			.try_match(&TopicPath::new("x/giraffe/that/rocks/a/b"))
			.unwrap();

		let keys: Vec<_> = params.iter().map(|(k, _)| k.clone()).collect();
		assert_eq!(keys[0], ParamKey::Index(0));
		assert_eq!(params.index(0), Some("x"));
		assert_eq!(params.get("path"), Some("giraffe"));
		assert_eq!(params.index(1), Some("rocks"));
		assert_eq!(params.index(2), Some("a/b"));
	}

	#[test]
	fn test_hash_capture_of_zero_levels_is_empty() {
		let pattern = create_pattern("a/#");
		let params = pattern.try_match(&TopicPath::new("a")).unwrap();
		assert_eq!(params.index(0), Some(""));
	}

	#[test]
	fn test_mismatch_reasons() {
		let pattern = create_pattern("a/b");
		assert_eq!(
			pattern.try_match(&TopicPath::new("a")).unwrap_err(),
			TopicMatchError::UnexpectedEndOfTopic
		);
		assert_eq!(
			pattern.try_match(&TopicPath::new("a/b/c")).unwrap_err(),
			TopicMatchError::UnexpectedEndOfPattern
		);
		assert_eq!(
			pattern.try_match(&TopicPath::new("a/c")).unwrap_err(),
			TopicMatchError::SegmentMismatch {
				expected: "b".to_string(),
				found: "c".to_string(),
				position: 1,
			}
		);
	}

	#[test]
	fn test_long_and_deep_topics_are_valid() {
		let long_level = format!("{}/y", "x".repeat(300));
		let params = create_pattern("+/+")
			.matches(&TopicPath::new(long_level.as_str()))
			.unwrap()
			.expect("300-byte level should match");
		assert_eq!(params.index(0).map(str::len), Some(300));

		let deep = format!("a/{}", vec!["l"; 40].join("/"));
		let params = create_pattern("a/#")
			.matches(&TopicPath::new(deep.as_str()))
			.unwrap()
			.expect("41-level topic should match");
		assert_eq!(params.index(0).map(|rest| rest.split('/').count()), Some(40));
	}

	#[test]
	fn test_topic_over_mqtt_maximum_is_an_error() {
		let at_limit = "x".repeat(65_535);
		assert!(create_pattern("+")
			.matches(&TopicPath::new(at_limit.as_str()))
			.unwrap()
			.is_some());

		let over_limit = "x".repeat(65_536);
		assert!(matches!(
			create_pattern("+").matches(&TopicPath::new(over_limit.as_str())),
			Err(TopicMatchError::InvalidTopic { .. })
		));
	}

	#[test]
	fn test_malformed_topic_is_an_error() {
		let pattern = create_pattern("a/+");
		for topic in ["", "a/+", "a/#", "a/x\0"] {
			let result = pattern.matches(&TopicPath::new(topic));
			assert!(
				matches!(result, Err(TopicMatchError::InvalidTopic { .. })),
				"topic {topic:?} should fail validation"
			);
		}
	}
}

mod options_tests {
	use super::*;

	#[test]
	fn test_case_insensitive_literals() {
		let options = MatchOptions {
			case_sensitive: false,
			..MatchOptions::default()
		};
		let pattern = create_pattern_with("Sensors/:room", options);
		let params = pattern
			.matches(&TopicPath::new("sensors/Kitchen"))
			.unwrap()
			.expect("should match ignoring case");
		// captured values keep their original case
		assert_eq!(params.get("room"), Some("Kitchen"));

		assert!(!is_match(&create_pattern("Sensors/:room"), "sensors/x"));
	}

	#[test]
	fn test_non_strict_tolerates_trailing_slash() {
		let options = MatchOptions {
			strict: false,
			..MatchOptions::default()
		};
		let pattern = create_pattern_with("a/path/that/+", options);
		assert!(is_match(&pattern, "a/path/that/works/"));
		assert!(is_match(&pattern, "a/path/that/works"));
		assert!(!is_match(&pattern, "a/path/that/does/not/"));

		let pattern = create_pattern_with("/this/is/a/", options);
		assert!(is_match(&pattern, "/this/is/a"));
		assert!(is_match(&pattern, "/this/is/a/"));
		// subscription keeps the pattern as written
		assert_eq!(pattern.mqtt_pattern(), "/this/is/a/");

		let strict = create_pattern("a/path/that/+");
		assert!(!is_match(&strict, "a/path/that/works/"));
	}

	#[test]
	fn test_lru_cache_returns_same_results() {
		let options = MatchOptions {
			cache_strategy: CacheStrategy::Lru(NonZeroUsize::new(2).unwrap()),
			..MatchOptions::default()
		};
		let pattern = create_pattern_with("sensors/:room/temp", options);

		for _ in 0 .. 3 {
			let params = pattern
				.matches(&TopicPath::new("sensors/kitchen/temp"))
				.unwrap()
				.expect("should match");
			assert_eq!(params.get("room"), Some("kitchen"));
			assert!(!is_match(&pattern, "sensors/kitchen/humidity"));
		}

		// failures are not memoized
		assert!(pattern.matches(&TopicPath::new("sensors/+/temp")).is_err());
		assert!(pattern.matches(&TopicPath::new("sensors/+/temp")).is_err());

		let cloned = pattern.clone();
		assert_eq!(cloned.options(), options);
		assert!(is_match(&cloned, "sensors/hall/temp"));
	}
}
