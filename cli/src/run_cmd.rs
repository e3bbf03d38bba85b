//! Driving a hemtt run from the terminal: stream output, forward
//! Ctrl-C as a cancel request, and report the child's exit code.

use std::process::Stdio;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use hemtt_workbench_core::CommandRunner;
use hemtt_workbench_core::Invocation;
use hemtt_workbench_core::RunnerEvent;
use tracing::debug;
use tracing::warn;

use crate::output::ColorMode;
use crate::output::exit_code;
use crate::output::print_line;
use crate::output::trailer;

/// Run the invocation through the streaming runner, printing output as
/// it arrives. Returns the exit code the front-end should report.
pub async fn execute(invocation: Invocation) -> Result<i32> {
    let colors = ColorMode::detect();
    let runner = CommandRunner::new();
    let mut rx = runner
        .start(invocation)
        .context("failed to start command")?;

    let mut cancel_requested = false;
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(RunnerEvent::Line(line)) => print_line(&line, colors),
                Some(RunnerEvent::Completed(outcome)) => {
                    eprintln!("{}", trailer(&outcome, runner.elapsed()));
                    return Ok(exit_code(&outcome));
                }
                None => bail!("output channel closed before completion"),
            },
            signal = tokio::signal::ctrl_c(), if !cancel_requested => {
                if let Err(err) = signal {
                    warn!(error = %err, "failed to listen for ctrl-c");
                }
                debug!("cancel requested");
                cancel_requested = true;
                runner.cancel();
            }
        }
    }
}

/// Run an interactive command with the terminal's own stdio; the child
/// prompts the user directly, so nothing is streamed or classified.
pub fn execute_interactive(invocation: Invocation) -> Result<i32> {
    let program = invocation
        .resolve_program()
        .context("failed to resolve command")?;
    let status = std::process::Command::new(program)
        .args(invocation.args())
        .current_dir(invocation.cwd())
        .envs(invocation.env_overrides())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to run `{}`", invocation.preview()))?;
    Ok(status.code().unwrap_or(1))
}
