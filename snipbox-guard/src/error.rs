//! Error types for the guard crate.

use snipbox_core::Language;

use crate::rules::RuleCategory;

/// Errors raised while building the guard components.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GuardError {
    /// A denylist pattern failed to compile.
    #[error("invalid denylist rule '{description}': {source}")]
    InvalidRule {
        description: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Reasons a snippet is refused by the pattern validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The language is not in the allowed set.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A denylist rule matched the snippet.
    #[error(transparent)]
    ForbiddenPattern(#[from] Violation),
}

/// A denylist rule that matched a snippet.
///
/// `description` names the exact rule and is meant for server logs;
/// only `category` should be shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("forbidden operation detected ({category}): {description}")]
pub struct Violation {
    /// The language whose rule set matched, or `None` for a global rule.
    pub language: Option<Language>,
    /// Broad class of the forbidden construct.
    pub category: RuleCategory,
    /// Exact rule that matched.
    pub description: &'static str,
}
