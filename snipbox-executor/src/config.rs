//! Executor configuration and interpreter commands.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use snipbox_core::Language;

/// Default wall-clock limit for one interpreter run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default staging directory, relative to the server's working directory.
pub const DEFAULT_STAGING_DIR: &str = "tmp";

/// Program and leading arguments used to run a staged file.
///
/// The staged file path is appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct InterpreterCommand {
    /// Binary name (resolved through `PATH`) or absolute path.
    pub program: PathBuf,
    /// Arguments placed before the file path.
    pub args: Vec<String>,
}

impl InterpreterCommand {
    /// A command with no leading arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Replace the leading arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The stock command for `language`: `node <file>`, `php <file>`, `go run <file>`.
    #[must_use]
    pub fn default_for(language: Language) -> Self {
        Self::new(language.default_program())
            .with_args(language.default_args().iter().copied())
    }
}

/// Configuration for the execution orchestrator.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ExecutorConfig {
    /// Directory where source files are first written.
    pub work_dir: PathBuf,

    /// Directory staged files are relocated into and executed from.
    pub staging_dir: PathBuf,

    /// Wall-clock limit per run.
    pub timeout: Duration,

    /// Interpreter used for each language.
    pub interpreters: IndexMap<Language, InterpreterCommand>,
}

impl ExecutorConfig {
    /// Config with stock interpreters and the default timeout.
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        let interpreters = Language::ALL
            .into_iter()
            .map(|lang| (lang, InterpreterCommand::default_for(lang)))
            .collect();
        Self {
            work_dir: work_dir.into(),
            staging_dir: staging_dir.into(),
            timeout: DEFAULT_TIMEOUT,
            interpreters,
        }
    }

    /// Override the per-run timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the interpreter for one language.
    #[must_use]
    pub fn with_interpreter(mut self, language: Language, command: InterpreterCommand) -> Self {
        self.interpreters.insert(language, command);
        self
    }

    /// The interpreter configured for `language`, if any.
    #[must_use]
    pub fn interpreter(&self, language: Language) -> Option<&InterpreterCommand> {
        self.interpreters.get(&language)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir(), DEFAULT_STAGING_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interpreters_cover_every_language() {
        let config = ExecutorConfig::default();
        for lang in Language::ALL {
            assert!(config.interpreter(lang).is_some(), "{lang} must have an interpreter");
        }
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.staging_dir, PathBuf::from("tmp"));
    }

    #[test]
    fn go_runs_through_run_subcommand() {
        let go = InterpreterCommand::default_for(Language::Go);
        assert_eq!(go.program, PathBuf::from("go"));
        assert_eq!(go.args, vec!["run".to_owned()]);
        assert!(InterpreterCommand::default_for(Language::Node).args.is_empty());
    }

    #[test]
    fn with_interpreter_replaces_only_that_language() {
        let config = ExecutorConfig::default()
            .with_interpreter(Language::Php, InterpreterCommand::new("/opt/php/bin/php"));
        assert_eq!(
            config.interpreter(Language::Php).map(|c| c.program.clone()),
            Some(PathBuf::from("/opt/php/bin/php"))
        );
        assert_eq!(
            config.interpreter(Language::Node).map(|c| c.program.clone()),
            Some(PathBuf::from("node"))
        );
    }
}
