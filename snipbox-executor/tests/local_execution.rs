//! Integration tests for local interpreter execution.
//!
//! Most tests stand `sh` or `cat` in for the real interpreters so they run
//! anywhere. Tests that need node, php or go are ignored by default.
//! Run them with: `cargo test --test local_execution -- --ignored`

use std::time::{Duration, Instant};

use snipbox_core::{ExecutionMode, ExecutionRequest, ExecutionStatus, Language};
use snipbox_executor::{
    ExecutionOrchestrator, ExecutorConfig, InterpreterCommand, LocalProcessBackend,
};
use tempfile::TempDir;

fn temp_root() -> TempDir {
    TempDir::new().expect("tempdir must be creatable")
}

async fn orchestrator(config: ExecutorConfig) -> ExecutionOrchestrator<LocalProcessBackend> {
    let orch = ExecutionOrchestrator::new(LocalProcessBackend::new(), config);
    orch.prepare().await.expect("staging dir must be preparable");
    orch
}

fn repl(code: &str, language: Language) -> ExecutionRequest {
    ExecutionRequest::new(code, language, ExecutionMode::Repl).expect("non-blank code")
}

#[tokio::test]
async fn shell_script_output_is_captured() {
    let root = temp_root();
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp"))
        .with_interpreter(Language::Node, InterpreterCommand::new("sh"));
    let orch = orchestrator(config).await;

    let result = orch.execute(&repl("echo out; echo err >&2", Language::Node)).await;

    assert!(result.success(), "status was {:?}", result.status);
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
    assert_eq!(result.exit_code, Some(0));
}

#[tokio::test]
async fn leading_args_precede_the_script() {
    let root = temp_root();
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp"))
        .with_interpreter(Language::Go, InterpreterCommand::new("sh").with_args(["-e"]));
    let orch = orchestrator(config).await;

    let result = orch.execute(&repl("false\necho unreachable", Language::Go)).await;

    assert!(!result.success());
    assert!(result.stdout.is_empty(), "-e must stop the script at `false`");
    assert_eq!(result.exit_code, Some(1));
}

#[tokio::test]
async fn non_zero_exit_returns_stderr_and_failure() {
    let root = temp_root();
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp"))
        .with_interpreter(Language::Php, InterpreterCommand::new("sh"));
    let orch = orchestrator(config).await;

    let result = orch.execute(&repl("echo nope >&2; exit 3", Language::Php)).await;

    assert!(!result.success());
    assert_eq!(result.stderr, "nope\n");
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.error().as_deref(), Some("process exited with status 3"));
}

#[tokio::test]
async fn missing_interpreter_is_a_failed_result() {
    let root = temp_root();
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp")).with_interpreter(
        Language::Node,
        InterpreterCommand::new("snipbox-interpreter-that-does-not-exist"),
    );
    let orch = orchestrator(config).await;

    let result = orch.execute(&repl("console.log(1)", Language::Node)).await;

    match &result.status {
        ExecutionStatus::Failed { reason } => {
            assert!(reason.contains("interpreter not found"), "reason was {reason}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(orch.active_count(), 0);
}

#[tokio::test]
async fn runaway_script_is_killed_at_the_deadline() {
    let root = temp_root();
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp"))
        .with_interpreter(Language::Node, InterpreterCommand::new("sh"))
        .with_timeout(Duration::from_millis(300));
    let orch = orchestrator(config.clone()).await;

    let start = Instant::now();
    let result = orch.execute(&repl("sleep 30", Language::Node)).await;

    assert_eq!(
        result.status,
        ExecutionStatus::TimedOut {
            limit: Duration::from_millis(300)
        }
    );
    assert!(start.elapsed() < Duration::from_secs(10), "deadline must cut the run short");
    let leftovers = std::fs::read_dir(&config.staging_dir).expect("staging dir").count();
    assert_eq!(leftovers, 0, "staged file must be removed after a timeout");
}

#[tokio::test]
async fn timeout_kills_processes_forked_by_the_interpreter() {
    let root = temp_root();
    let marker = root.path().join("forked-survived");
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp"))
        .with_interpreter(Language::Node, InterpreterCommand::new("sh"))
        .with_timeout(Duration::from_millis(300));
    let orch = orchestrator(config).await;

    let script = format!("(sleep 1; touch '{}') &\nwait", marker.display());
    let result = orch.execute(&repl(&script, Language::Node)).await;

    assert_eq!(
        result.status,
        ExecutionStatus::TimedOut {
            limit: Duration::from_millis(300)
        }
    );
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "forked child must die with the interpreter");
}

#[tokio::test]
async fn background_jobs_are_killed_after_a_clean_exit() {
    let root = temp_root();
    let marker = root.path().join("background-survived");
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp"))
        .with_interpreter(Language::Node, InterpreterCommand::new("sh"));
    let orch = orchestrator(config).await;

    let script = format!(
        "(sleep 1; touch '{}') >/dev/null 2>&1 &\necho started",
        marker.display()
    );
    let result = orch.execute(&repl(&script, Language::Node)).await;

    assert!(result.success(), "status was {:?}", result.status);
    assert_eq!(result.stdout, "started\n");
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "background job must not outlive the run");
}

#[tokio::test]
async fn concurrent_runs_use_distinct_files() {
    let root = temp_root();
    let config = ExecutorConfig::new(root.path(), root.path().join("tmp"))
        .with_interpreter(Language::Node, InterpreterCommand::new("cat"));
    let orch = std::sync::Arc::new(orchestrator(config).await);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let orch = std::sync::Arc::clone(&orch);
        tasks.push(tokio::spawn(async move {
            let code = format!("snippet {i}");
            (code.clone(), orch.execute(&repl(&code, Language::Node)).await)
        }));
    }
    for task in tasks {
        let (code, result) = task.await.expect("task must not panic");
        assert_eq!(result.stdout, code, "each run must see its own file");
    }
}

#[tokio::test]
async fn prepare_clears_stale_files_from_a_previous_run() {
    let root = temp_root();
    let staging_dir = root.path().join("tmp");
    std::fs::create_dir_all(&staging_dir).expect("mkdir");
    std::fs::write(staging_dir.join("index-zzzzzzzz.js"), "stale").expect("seed");
    std::fs::write(staging_dir.join("README"), "keep").expect("seed");

    let orch = ExecutionOrchestrator::new(
        LocalProcessBackend::new(),
        ExecutorConfig::new(root.path(), &staging_dir),
    );
    let removed = orch.prepare().await.expect("prepare");

    assert_eq!(removed, 1);
    assert!(staging_dir.join("README").exists());
}

#[tokio::test]
#[ignore = "requires node on PATH"]
async fn node_prints_hi() {
    let root = temp_root();
    let orch = orchestrator(ExecutorConfig::new(root.path(), root.path().join("tmp"))).await;

    let result = orch.execute(&repl("console.log(\"hi\")", Language::Node)).await;

    assert!(result.success(), "status was {:?}", result.status);
    assert_eq!(result.stdout, "hi\n");
    assert!(result.stderr.is_empty());
}

#[tokio::test]
#[ignore = "requires php on PATH"]
async fn php_structured_mode_runs_harness() {
    let root = temp_root();
    let orch = orchestrator(ExecutorConfig::new(root.path(), root.path().join("tmp"))).await;
    let code = "<?php\nfunction intIntoString($n) { return (string) $n; }\n?>";
    let req = ExecutionRequest::new(code, Language::Php, ExecutionMode::Structured)
        .expect("non-blank code");

    let result = orch.execute(&req).await;

    assert!(result.success(), "status was {:?}, stderr {}", result.status, result.stderr);
    assert!(result.stdout.contains("intIntoString(7) = '7'"), "stdout was {}", result.stdout);
}

#[tokio::test]
#[ignore = "requires go on PATH"]
async fn go_runs_through_go_run() {
    let root = temp_root();
    let orch = orchestrator(ExecutorConfig::new(root.path(), root.path().join("tmp"))).await;
    let code = "package main\n\nfunc main() { println(\"hi\") }\n";

    let result = orch.execute(&repl(code, Language::Go)).await;

    assert!(result.success(), "status was {:?}, stderr {}", result.status, result.stderr);
    assert_eq!(result.stderr, "hi\n", "println writes to stderr");
}

#[tokio::test]
#[ignore = "requires go on PATH"]
async fn go_structured_template_runs_with_fmt_import() {
    let root = temp_root();
    let orch = orchestrator(ExecutorConfig::new(root.path(), root.path().join("tmp"))).await;
    let code = "package main\n\nimport (\n\t\"fmt\" //Don't remove fmt\n\t\"strconv\"\n)\n\n\
                func intIntoString(n int) string {\n\treturn strconv.Itoa(n)\n}\n";
    let req = ExecutionRequest::new(code, Language::Go, ExecutionMode::Structured)
        .expect("non-blank code");

    let result = orch.execute(&req).await;

    assert!(result.success(), "status was {:?}, stderr {}", result.status, result.stderr);
    assert!(
        result.stdout.contains("intIntoString(-42) = \"-42\""),
        "stdout was {}",
        result.stdout
    );
    assert!(result.stderr.is_empty(), "harness must write to stdout");
}
