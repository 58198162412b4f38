//! Denylist validator over compiled per-language and global rule sets.

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use snipbox_core::Language;

use crate::error::{GuardError, ValidationError, Violation};
use crate::rules::{global_rules, language_rules, RuleCategory, RuleDef};

/// A compiled denylist rule.
#[derive(Debug, Clone)]
pub struct Rule {
    description: &'static str,
    category: RuleCategory,
    regex: Regex,
}

impl Rule {
    fn compile(def: RuleDef) -> Result<Self, GuardError> {
        let regex = RegexBuilder::new(def.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| GuardError::InvalidRule {
                description: def.description,
                source,
            })?;
        Ok(Self {
            description: def.description,
            category: def.category,
            regex,
        })
    }

    /// Exact description of the forbidden construct.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Category of the forbidden construct.
    #[must_use]
    pub fn category(&self) -> RuleCategory {
        self.category
    }

    /// `true` if the rule matches anywhere in `code`.
    #[must_use]
    pub fn is_match(&self, code: &str) -> bool {
        self.regex.is_match(code)
    }
}

/// Compiled rules keyed by language, plus the global rules.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RuleSet {
    by_language: IndexMap<Language, Vec<Rule>>,
    global: Vec<Rule>,
}

impl RuleSet {
    /// Compile the built-in rule tables.
    ///
    /// # Errors
    /// Returns [`GuardError::InvalidRule`] if any pattern fails to compile.
    pub fn builtin() -> Result<Self, GuardError> {
        let mut by_language = IndexMap::with_capacity(Language::ALL.len());
        for language in Language::ALL {
            let rules = language_rules(language)
                .iter()
                .copied()
                .map(Rule::compile)
                .collect::<Result<Vec<_>, _>>()?;
            by_language.insert(language, rules);
        }
        let global = global_rules()
            .iter()
            .copied()
            .map(Rule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            by_language,
            global,
        })
    }

    /// Rules for `language`, in evaluation order.
    #[must_use]
    pub fn language(&self, language: Language) -> &[Rule] {
        self.by_language.get(&language).map(Vec::as_slice).unwrap_or_default()
    }

    /// Rules applied regardless of language.
    #[must_use]
    pub fn global(&self) -> &[Rule] {
        &self.global
    }

    /// Total number of compiled rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_language.values().map(Vec::len).sum::<usize>() + self.global.len()
    }

    /// `true` if no rules are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Admission check over submitted code.
///
/// Holds only immutable state, so concurrent calls need no coordination.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    rules: RuleSet,
}

impl PatternValidator {
    /// Build a validator over the built-in rule tables.
    ///
    /// # Errors
    /// Returns [`GuardError::InvalidRule`] if any pattern fails to compile.
    pub fn new() -> Result<Self, GuardError> {
        Ok(Self::with_rules(RuleSet::builtin()?))
    }

    /// Build a validator over an existing rule set.
    #[must_use]
    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// The compiled rules in use.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Check `code` against the rules for `language`, then the global rules.
    ///
    /// The language is matched ignoring ASCII case. The first matching rule
    /// wins; later rules are not evaluated.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnsupportedLanguage`] for an unknown
    /// language, or [`ValidationError::ForbiddenPattern`] for the first rule
    /// that matches.
    pub fn validate(&self, code: &str, language: &str) -> Result<(), ValidationError> {
        let language: Language = language
            .parse()
            .map_err(|_| ValidationError::UnsupportedLanguage(language.to_owned()))?;
        Ok(self.validate_language(code, language)?)
    }

    /// [`validate`](Self::validate) for an already-parsed language.
    ///
    /// # Errors
    /// Returns the [`Violation`] for the first rule that matches.
    pub fn validate_language(&self, code: &str, language: Language) -> Result<(), Violation> {
        if let Some(rule) = first_match(self.rules.language(language), code) {
            return Err(Violation {
                language: Some(language),
                category: rule.category,
                description: rule.description,
            });
        }
        if let Some(rule) = first_match(self.rules.global(), code) {
            return Err(Violation {
                language: None,
                category: rule.category,
                description: rule.description,
            });
        }
        Ok(())
    }
}

fn first_match<'a>(rules: &'a [Rule], code: &str) -> Option<&'a Rule> {
    rules.iter().find(|rule| rule.is_match(code))
}
