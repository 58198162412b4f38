use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A target language accepted for execution.
///
/// Each language maps to one external interpreter and one source file
/// naming scheme. Identifiers are lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// JavaScript, executed with `node`.
    Node,
    /// PHP, executed with `php`.
    Php,
    /// Go, executed with `go run`.
    Go,
}

impl Language {
    /// Every supported language, in canonical order.
    pub const ALL: [Language; 3] = [Language::Node, Language::Php, Language::Go];

    /// Lowercase wire identifier (`"node"`, `"php"`, `"go"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Language::Node => "node",
            Language::Php => "php",
            Language::Go => "go",
        }
    }

    /// File extension for staged source files, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Language::Node => "js",
            Language::Php => "php",
            Language::Go => "go",
        }
    }

    /// File stem prefix for staged source files.
    ///
    /// `go run` needs a `main` package file, the interpreters do not care.
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Language::Node | Language::Php => "index",
            Language::Go => "main",
        }
    }

    /// Default interpreter program name, resolved through `PATH`.
    #[must_use]
    pub const fn default_program(self) -> &'static str {
        match self {
            Language::Node => "node",
            Language::Php => "php",
            Language::Go => "go",
        }
    }

    /// Arguments passed to the interpreter before the staged file path.
    #[must_use]
    pub const fn default_args(self) -> &'static [&'static str] {
        match self {
            Language::Node | Language::Php => &[],
            Language::Go => &["run"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    /// Parses a language identifier, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnsupportedLanguage {
                value: s.to_owned(),
            })
    }
}
