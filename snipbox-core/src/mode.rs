//! Execution modes and the fixed harness appended in structured mode.
//!
//! In structured mode the user submits a function named `intIntoString`
//! and the harness drives it over a fixed sample of integers, printing one
//! line per call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::language::Language;

/// Integers fed to the user function by every harness.
pub const HARNESS_SAMPLES: [i64; 4] = [0, 7, -42, 1024];

const NODE_HARNESS: &str = r"

for (const n of [0, 7, -42, 1024]) {
  console.log(`intIntoString(${n}) = ${JSON.stringify(intIntoString(n))}`);
}
";

const PHP_HARNESS: &str = r"
foreach ([0, 7, -42, 1024] as $n) {
    echo 'intIntoString(' . $n . ') = ' . var_export(intIntoString($n), true) . PHP_EOL;
}
";

// Relies on the `fmt` import every Go snippet keeps at the top of the file.
const GO_HARNESS: &str = r#"

func main() {
	for _, n := range []int{0, 7, -42, 1024} {
		fmt.Printf("intIntoString(%d) = %q\n", n, intIntoString(n))
	}
}
"#;

/// How submitted code is turned into the executed source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Run the code exactly as submitted.
    #[serde(rename = "repl")]
    Repl,
    /// Append the language harness before running.
    #[serde(rename = "stq")]
    Structured,
}

impl ExecutionMode {
    /// Wire identifier (`"repl"` or `"stq"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Repl => "repl",
            ExecutionMode::Structured => "stq",
        }
    }

    /// Build the source text to execute for `code` in `language`.
    #[must_use]
    pub fn wrap(self, code: &str, language: Language) -> String {
        match self {
            ExecutionMode::Repl => code.to_owned(),
            ExecutionMode::Structured => {
                let mut source = String::with_capacity(code.len() + 256);
                source.push_str(code);
                if language == Language::Php && code.trim_end().ends_with("?>") {
                    source.push_str("\n<?php");
                }
                source.push_str(harness(language));
                source
            }
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repl" => Ok(ExecutionMode::Repl),
            "stq" => Ok(ExecutionMode::Structured),
            other => Err(CoreError::UnsupportedMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// The harness snippet appended in [`ExecutionMode::Structured`].
#[must_use]
pub const fn harness(language: Language) -> &'static str {
    match language {
        Language::Node => NODE_HARNESS,
        Language::Php => PHP_HARNESS,
        Language::Go => GO_HARNESS,
    }
}
