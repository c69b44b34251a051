//! Notification rules: key patterns, the compiled rule map and its cache.
//!
//! A binding's prefix/suffix filter collapses into one single-wildcard
//! pattern ([`new_pattern`]). [`RulesMap::compile`] turns a bucket's
//! bindings into `leaf event -> pattern -> destinations`, and
//! [`RulesMap::match_event`] answers which destinations an event reaches.

mod cache;
mod compiler;
mod pattern;

pub use cache::RuleCache;
pub use compiler::RulesMap;
pub use pattern::{match_simple, new_pattern, pattern_from_rules};
