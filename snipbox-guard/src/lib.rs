//! Admission control for snipbox.
//!
//! Two independent gates sit in front of every execution:
//!
//! - [`PatternValidator`] rejects snippets containing denylisted constructs
//!   for their language, plus a small set of path rules shared by all
//!   languages.
//! - [`RateLimiter`] caps how many requests each origin may make within a
//!   sliding window, with a background sweep that forgets idle origins.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod limiter;
pub mod rules;
pub mod validator;

pub use error::{GuardError, ValidationError, Violation};
pub use limiter::{EvictionTask, LimiterConfig, RateLimiter};
pub use rules::RuleCategory;
pub use validator::{PatternValidator, Rule, RuleSet};
