/// Errors produced by the `snipbox-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// The language identifier is not one of the supported interpreters.
    #[error("unsupported language: {value}")]
    UnsupportedLanguage { value: String },

    /// The execution mode is neither `repl` nor `stq`.
    #[error("unsupported execution mode: {value}")]
    UnsupportedMode { value: String },

    /// The submitted source code is empty or whitespace-only.
    #[error("source code must not be empty")]
    EmptyCode,
}
