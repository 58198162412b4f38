//! Local subprocess backend.
//!
//! Runs the interpreter directly on the host with `tokio::process`. There is
//! no filesystem or network isolation; the only containment is the deadline.
//! Each interpreter leads its own process group, and the whole group is
//! killed once the run ends, so programs forked by the interpreter (the
//! binary `go run` builds, background shell jobs) die with it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;

use crate::backend::{ProcessBackend, ProcessOutput};
use crate::{ExecutorError, InterpreterCommand};

/// Runs interpreters as child processes of the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProcessBackend;

impl LocalProcessBackend {
    /// Create the backend.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessBackend for LocalProcessBackend {
    async fn run(
        &self,
        command: &InterpreterCommand,
        script: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput, ExecutorError> {
        let program = which_binary(&command.program)?;

        tracing::debug!(
            program = %program.display(),
            script = %script.display(),
            "spawning interpreter"
        );

        let child = Command::new(&program)
            .args(&command.args)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExecutorError::InterpreterNotFound {
                    program: program.clone(),
                },
                _ => ExecutorError::SpawnFailed(format!("exec {}: {e}", program.display())),
            })?;

        let _group = child
            .id()
            .and_then(|id| i32::try_from(id).ok())
            .map(ProcessGroup::new);

        // Dropping `wait_with_output` on timeout drops the child, which kills it.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ExecutorError::Timeout { limit: timeout })??;

        Ok(ProcessOutput::new(output.stdout, output.stderr, output.status.code()))
    }
}

/// Sends `SIGKILL` to a process group when dropped.
///
/// Dropped on every exit path of a run, so background jobs die even when
/// the interpreter itself exited cleanly.
#[derive(Debug)]
struct ProcessGroup {
    pgid: Pid,
}

impl ProcessGroup {
    fn new(leader: i32) -> Self {
        Self {
            pgid: Pid::from_raw(leader),
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        match killpg(self.pgid, Signal::SIGKILL) {
            // ESRCH: every member already exited.
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => {
                tracing::warn!(
                    pgid = self.pgid.as_raw(),
                    error = %e,
                    "failed to kill process group"
                );
            }
        }
    }
}

/// Resolve a binary either at the given path or through `PATH`.
///
/// # Errors
/// Returns [`ExecutorError::InterpreterNotFound`] if no file exists at the
/// path or in any `PATH` entry.
pub fn which_binary(program: &Path) -> Result<PathBuf, ExecutorError> {
    let not_found = || ExecutorError::InterpreterNotFound {
        program: program.to_owned(),
    };

    if program.components().count() > 1 || program.is_absolute() {
        return if program.is_file() {
            Ok(program.to_owned())
        } else {
            Err(not_found())
        };
    }

    let path = std::env::var_os("PATH").ok_or_else(not_found)?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
        .ok_or_else(not_found)
}
