//! Core types for the snipbox snippet execution service.
//!
//! Defines the fundamental domain types: supported languages, execution
//! modes and their harnesses, execution requests, and captured results.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod execution;
pub mod id;
pub mod language;
pub mod mode;
pub mod request;

pub use error::CoreError;
pub use execution::{ExecutionResult, ExecutionStatus};
pub use id::{ContentHash, ExecutionId};
pub use language::Language;
pub use mode::{harness, ExecutionMode, HARNESS_SAMPLES};
pub use request::ExecutionRequest;
