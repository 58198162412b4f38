use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::language::Language;
use crate::mode::ExecutionMode;

/// A validated request to execute a snippet.
///
/// Construction guarantees the code is non-blank and the language and mode
/// are supported, so the executor never has to re-check its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExecutionRequest {
    /// Submitted source code, as received after trimming.
    pub code: String,
    /// Target language.
    pub language: Language,
    /// Whether the harness is appended before execution.
    pub mode: ExecutionMode,
}

impl ExecutionRequest {
    /// Create a new execution request.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyCode`] if `code` is empty or whitespace-only.
    pub fn new(
        code: impl Into<String>,
        language: Language,
        mode: ExecutionMode,
    ) -> Result<Self, CoreError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(CoreError::EmptyCode);
        }
        Ok(Self {
            code,
            language,
            mode,
        })
    }

    /// The full source text to stage, with the harness applied when the
    /// mode requires it.
    #[must_use]
    pub fn source(&self) -> String {
        self.mode.wrap(&self.code, self.language)
    }
}
