#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::time::Duration;

use hemtt_workbench_core::CommandRunner;
use hemtt_workbench_core::Invocation;
use hemtt_workbench_core::OutputStream;
use hemtt_workbench_core::RunOutcome;
use hemtt_workbench_core::RunStatus;
use hemtt_workbench_core::RunnerError;
use hemtt_workbench_core::RunnerEvent;
use hemtt_workbench_core::Severity;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc::UnboundedReceiver;

fn sh(script: &str) -> Invocation {
    Invocation::new(
        "sh".to_string(),
        vec!["-c".to_string(), script.to_string()],
        PathBuf::from("."),
    )
}

/// Collect every event until the channel closes; asserts that exactly one
/// Completed arrives and that it is the final event.
async fn drain(
    mut rx: UnboundedReceiver<RunnerEvent>,
) -> (Vec<(String, Severity, OutputStream)>, RunOutcome) {
    let mut lines = Vec::new();
    let mut outcome = None;
    while let Some(event) = rx.recv().await {
        match event {
            RunnerEvent::Line(line) => {
                assert!(outcome.is_none(), "line arrived after completion");
                lines.push((line.text, line.severity, line.stream));
            }
            RunnerEvent::Completed(result) => {
                assert!(outcome.is_none(), "completed delivered twice");
                outcome = Some(result);
            }
        }
    }
    (lines, outcome.expect("no completion event"))
}

#[tokio::test]
async fn successful_run_produces_plain_line_and_zero_exit() {
    let runner = CommandRunner::new();
    let rx = runner.start(sh("echo 'Build complete'")).unwrap();
    assert_eq!(runner.status(), RunStatus::Running);

    let (lines, outcome) = drain(rx).await;
    assert_eq!(
        lines,
        vec![(
            "Build complete".to_string(),
            Severity::Plain,
            OutputStream::Stdout
        )]
    );
    assert_eq!(outcome.status, RunStatus::Succeeded);
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(runner.status(), RunStatus::Succeeded);
}

#[tokio::test]
async fn failing_run_classifies_error_line() {
    let runner = CommandRunner::new();
    let rx = runner
        .start(sh("echo 'error: something failed'; exit 1"))
        .unwrap();

    let (lines, outcome) = drain(rx).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].1, Severity::Error);
    assert_eq!(outcome.status, RunStatus::Failed);
    assert_eq!(outcome.exit_code, Some(1));
}

#[tokio::test]
async fn stderr_lines_are_tagged_and_classified() {
    let runner = CommandRunner::new();
    let rx = runner
        .start(sh("echo 'warning: deprecated thing' 1>&2"))
        .unwrap();

    let (lines, outcome) = drain(rx).await;
    assert_eq!(
        lines,
        vec![(
            "warning: deprecated thing".to_string(),
            Severity::Warning,
            OutputStream::Stderr
        )]
    );
    assert_eq!(outcome.status, RunStatus::Succeeded);
}

#[tokio::test]
async fn stdout_ordering_is_preserved() {
    let runner = CommandRunner::new();
    let rx = runner
        .start(sh("for i in 1 2 3 4 5; do echo line-$i; done"))
        .unwrap();

    let (lines, outcome) = drain(rx).await;
    let texts: Vec<&str> = lines.iter().map(|(text, _, _)| text.as_str()).collect();
    assert_eq!(texts, ["line-1", "line-2", "line-3", "line-4", "line-5"]);
    assert_eq!(outcome.exit_code, Some(0));
}

#[tokio::test]
async fn missing_program_fails_synchronously() {
    let runner = CommandRunner::new();
    let invocation = Invocation::new(
        "definitely-not-a-real-binary-2a7f".to_string(),
        Vec::new(),
        PathBuf::from("."),
    );
    let err = runner.start(invocation).unwrap_err();
    assert!(matches!(err, RunnerError::Launch { .. }));
    assert_eq!(runner.status(), RunStatus::Idle);
}

#[tokio::test]
async fn empty_program_is_rejected() {
    let runner = CommandRunner::new();
    let invocation = Invocation::new(String::new(), Vec::new(), PathBuf::from("."));
    let err = runner.start(invocation).unwrap_err();
    assert!(matches!(err, RunnerError::EmptyCommand));
}

#[tokio::test]
async fn second_start_while_running_is_busy() {
    let runner = CommandRunner::new();
    let rx = runner.start(sh("sleep 5")).unwrap();

    let err = runner.start(sh("echo never")).unwrap_err();
    assert!(matches!(err, RunnerError::Busy));

    runner.cancel();
    let (_, outcome) = drain(rx).await;
    assert_eq!(outcome.status, RunStatus::Cancelled);
}

#[tokio::test]
async fn cancel_terminates_run_with_no_exit_code() {
    let runner = CommandRunner::new();
    let rx = runner.start(sh("sleep 30")).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    runner.cancel();

    let (lines, outcome) = drain(rx).await;
    assert!(lines.is_empty());
    assert_eq!(outcome.status, RunStatus::Cancelled);
    assert_eq!(outcome.exit_code, None);
    assert_eq!(runner.status(), RunStatus::Cancelled);
}

#[tokio::test]
async fn cancel_lets_buffered_output_through() {
    let runner = CommandRunner::new();
    let rx = runner.start(sh("echo early; sleep 30")).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    runner.cancel();

    let (lines, outcome) = drain(rx).await;
    assert_eq!(
        lines,
        vec![("early".to_string(), Severity::Plain, OutputStream::Stdout)]
    );
    assert_eq!(outcome.status, RunStatus::Cancelled);
}

#[tokio::test]
async fn cancel_when_idle_is_a_no_op() {
    let runner = CommandRunner::new();
    runner.cancel();
    assert_eq!(runner.status(), RunStatus::Idle);

    let rx = runner.start(sh("echo after-cancel")).unwrap();
    let (lines, outcome) = drain(rx).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(outcome.status, RunStatus::Succeeded);
}

#[tokio::test]
async fn runner_is_reusable_after_completion() {
    let runner = CommandRunner::new();
    let rx = runner.start(sh("true")).unwrap();
    let (_, outcome) = drain(rx).await;
    assert_eq!(outcome.status, RunStatus::Succeeded);

    let rx = runner.start(sh("false")).unwrap();
    let (_, outcome) = drain(rx).await;
    assert_eq!(outcome.status, RunStatus::Failed);
    assert_eq!(outcome.exit_code, Some(1));
}

#[tokio::test]
async fn no_color_is_set_in_child_environment() {
    let runner = CommandRunner::new();
    let rx = runner.start(sh("printf 'NO_COLOR=%s\\n' \"$NO_COLOR\"")).unwrap();
    let (lines, _) = drain(rx).await;
    assert_eq!(lines[0].0, "NO_COLOR=1");
}

#[tokio::test]
async fn invalid_utf8_is_replaced_not_fatal() {
    let runner = CommandRunner::new();
    let rx = runner
        .start(sh("printf 'before\\n\\377\\376bad\\n'; echo after"))
        .unwrap();

    let (lines, outcome) = drain(rx).await;
    let texts: Vec<&str> = lines.iter().map(|(text, _, _)| text.as_str()).collect();
    assert_eq!(texts, ["before", "\u{fffd}\u{fffd}bad", "after"]);
    assert_eq!(outcome.status, RunStatus::Succeeded);
    assert_eq!(outcome.exit_code, Some(0));
}

#[tokio::test]
async fn ansi_escapes_are_stripped_from_output() {
    let runner = CommandRunner::new();
    let rx = runner
        .start(sh("printf '\\033[31merror:\\033[0m bad\\n'"))
        .unwrap();
    let (lines, _) = drain(rx).await;
    assert_eq!(lines[0].0, "error: bad");
    assert_eq!(lines[0].1, Severity::Error);
}

#[tokio::test]
async fn snapshot_reflects_running_session() {
    let runner = CommandRunner::new();
    let rx = runner.start(sh("sleep 5")).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = runner.snapshot();
    assert_eq!(snapshot.status, RunStatus::Running);
    assert!(snapshot.command_preview.starts_with("sh -c"));
    assert!(runner.elapsed().is_some());

    runner.cancel();
    drain(rx).await;
}
