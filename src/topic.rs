//! Topic handling module
//!
//! Route patterns (`sensors/:room/temp`, `a/+`, `logs/#`), concrete topic
//! paths, and the parameters a match captures.

// Submodules
/// Topic limits and validation
pub mod error;
pub mod topic_match;
pub mod topic_pattern_item;
/// Topic pattern parsing and matching
pub mod topic_pattern_path;

#[cfg(test)]
mod topic_pattern_path_tests;

// Re-export constants and validation utilities
pub use error::{limits, validation};
pub use topic_match::{ParamKey, Params, TopicMatchError, TopicPath};
pub use topic_pattern_item::{TopicPatternError, TopicPatternItem};
pub use topic_pattern_path::{CacheStrategy, MatchOptions, TopicPatternPath};
