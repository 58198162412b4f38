//! Snippet execution for snipbox.
//!
//! Stages submitted code as a source file, runs it with the language's
//! interpreter under a deadline, and captures both output streams.
//!
//! There is no sandbox here. Code runs with the server's own privileges;
//! isolation must come from the environment the server is deployed in.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod staging;

pub use backend::{ProcessBackend, ProcessOutput};
pub use config::{ExecutorConfig, InterpreterCommand, DEFAULT_TIMEOUT};
pub use error::ExecutorError;
pub use orchestrator::ExecutionOrchestrator;
pub use process::{which_binary, LocalProcessBackend};
pub use staging::{StagedFile, Staging};
