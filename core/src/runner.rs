//! Asynchronous execution of a single external command.
//!
//! One invocation at a time: `start` spawns the child with piped output,
//! a relay task per stream forwards lines as they arrive, and a
//! supervisor task waits for exit or cancellation. The caller drains a
//! channel of typed events instead of registering callbacks, so no
//! synchronization is needed on the consuming side; the channel is the
//! marshaling point back onto the controlling thread.

use std::io;
use std::process::ExitStatus;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::error::RunnerError;
use crate::invocation::Invocation;
use crate::severity::Severity;
use crate::severity::strip_ansi_codes;

/// How long a cancelled child gets to exit on its own before the runner
/// escalates to a forced kill.
pub const CANCEL_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Which pipe a line arrived on. Order is preserved within a stream; the
/// interleaving between the two is whatever the OS delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone)]
pub struct OutputLine {
    pub text: String,
    pub severity: Severity,
    pub stream: OutputStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Absent when the process was terminated rather than exiting on its
    /// own, including the forced-kill end of a cancellation.
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone)]
pub enum RunnerEvent {
    Line(OutputLine),
    Completed(RunOutcome),
}

/// Point-in-time view of the current session, for status bars and the
/// like. Lines accumulate in arrival order and are never mutated.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub status: RunStatus,
    pub command_preview: String,
    pub started_at: Option<SystemTime>,
    pub elapsed: Option<Duration>,
    pub lines: Vec<OutputLine>,
    pub exit_code: Option<i32>,
}

#[derive(Debug)]
struct SessionState {
    status: RunStatus,
    command_preview: String,
    started_at: Option<SystemTime>,
    started: Option<Instant>,
    finished_elapsed: Option<Duration>,
    lines: Vec<OutputLine>,
    exit_code: Option<i32>,
    cancel: Option<CancellationToken>,
}

impl SessionState {
    fn idle() -> Self {
        Self {
            status: RunStatus::Idle,
            command_preview: String::new(),
            started_at: None,
            started: None,
            finished_elapsed: None,
            lines: Vec::new(),
            exit_code: None,
            cancel: None,
        }
    }

    fn begin(&mut self, preview: String, cancel: CancellationToken) {
        self.status = RunStatus::Running;
        self.command_preview = preview;
        self.started_at = Some(SystemTime::now());
        self.started = Some(Instant::now());
        self.finished_elapsed = None;
        self.lines.clear();
        self.exit_code = None;
        self.cancel = Some(cancel);
    }

    fn finish(&mut self, outcome: RunOutcome) {
        self.status = outcome.status;
        self.exit_code = outcome.exit_code;
        self.finished_elapsed = self.started.map(|started| started.elapsed());
        self.cancel = None;
    }

    fn elapsed(&self) -> Option<Duration> {
        match self.status {
            RunStatus::Idle => None,
            RunStatus::Running => self.started.map(|started| started.elapsed()),
            _ => self.finished_elapsed,
        }
    }
}

/// Executes one external command at a time and relays its lifecycle over
/// an event channel. Cheap to clone; clones share the session.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    state: Arc<Mutex<SessionState>>,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::idle())),
        }
    }

    /// Launch the invocation and return the event stream for this run.
    ///
    /// Returns immediately: spawn failures surface here, everything that
    /// happens after the process exists arrives as events. Fails with
    /// [`RunnerError::Busy`] while a previous run is still in flight,
    /// leaving that run untouched.
    pub fn start(
        &self,
        invocation: Invocation,
    ) -> Result<UnboundedReceiver<RunnerEvent>, RunnerError> {
        let program = invocation.resolve_program()?;

        let mut guard = self.state.lock();
        if guard.status == RunStatus::Running {
            return Err(RunnerError::Busy);
        }

        let mut command = Command::new(&program);
        command
            .args(invocation.args())
            .current_dir(invocation.cwd())
            .envs(invocation.env_overrides())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|err| RunnerError::launch(invocation.program(), err))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            RunnerError::launch(
                invocation.program(),
                io::Error::other("stdout pipe unavailable"),
            )
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            RunnerError::launch(
                invocation.program(),
                io::Error::other("stderr pipe unavailable"),
            )
        })?;

        let token = CancellationToken::new();
        guard.begin(invocation.preview(), token.clone());
        drop(guard);

        debug!(command = %invocation.preview(), "spawned child process");

        let (tx, rx) = mpsc::unbounded_channel();
        let stdout_task = tokio::spawn(relay_lines(
            stdout,
            OutputStream::Stdout,
            tx.clone(),
            Arc::clone(&self.state),
        ));
        let stderr_task = tokio::spawn(relay_lines(
            stderr,
            OutputStream::Stderr,
            tx.clone(),
            Arc::clone(&self.state),
        ));
        tokio::spawn(supervise(
            child,
            token,
            tx,
            stdout_task,
            stderr_task,
            Arc::clone(&self.state),
        ));

        Ok(rx)
    }

    /// Request cancellation of the active run. A no-op when nothing is
    /// running; safe to call repeatedly.
    pub fn cancel(&self) {
        let guard = self.state.lock();
        if let Some(token) = guard.cancel.as_ref() {
            token.cancel();
        }
    }

    pub fn status(&self) -> RunStatus {
        self.state.lock().status
    }

    /// Time since the current run started, or the total duration of the
    /// last finished run. `None` before the first run.
    pub fn elapsed(&self) -> Option<Duration> {
        self.state.lock().elapsed()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let guard = self.state.lock();
        RunSnapshot {
            status: guard.status,
            command_preview: guard.command_preview.clone(),
            started_at: guard.started_at,
            elapsed: guard.elapsed(),
            lines: guard.lines.clone(),
            exit_code: guard.exit_code,
        }
    }
}

async fn relay_lines<R>(
    reader: R,
    stream: OutputStream,
    tx: UnboundedSender<RunnerEvent>,
    state: Arc<Mutex<SessionState>>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        // Raw bytes, decoded lossily: a child emitting non-UTF-8 output
        // (Windows codepages, binary noise) must not abort the stream.
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let text = strip_ansi_codes(&String::from_utf8_lossy(&buf));
        let line = OutputLine {
            severity: Severity::classify(&text),
            text,
            stream,
        };
        state.lock().lines.push(line.clone());
        // Keep reading to EOF even if the receiver is gone, so the child
        // never blocks on a full pipe.
        let _ = tx.send(RunnerEvent::Line(line));
    }
    Ok(())
}

async fn supervise(
    mut child: Child,
    token: CancellationToken,
    tx: UnboundedSender<RunnerEvent>,
    stdout_task: JoinHandle<io::Result<()>>,
    stderr_task: JoinHandle<io::Result<()>>,
    state: Arc<Mutex<SessionState>>,
) {
    let mut cancelled = false;
    let wait_result: io::Result<Option<ExitStatus>> = tokio::select! {
        result = child.wait() => result.map(Some),
        _ = token.cancelled() => {
            cancelled = true;
            shutdown_child(&mut child).await
        }
    };

    // The pipes hit EOF once the child is gone, so both relays terminate.
    // Joining them before emitting the completion event is what guarantees
    // every line event precedes it.
    let mut stream_error: Option<io::Error> = None;
    for joined in [stdout_task.await, stderr_task.await] {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => stream_error = Some(err),
            Err(err) => stream_error = Some(io::Error::other(err)),
        }
    }

    let outcome = if cancelled {
        if let Err(err) = &wait_result {
            warn!(error = %err, "failed to confirm termination of cancelled child");
        }
        RunOutcome {
            status: RunStatus::Cancelled,
            exit_code: None,
        }
    } else {
        match wait_result {
            Ok(exit_status) => {
                let exit_code = exit_status.and_then(|status| status.code());
                if let Some(err) = stream_error.take() {
                    emit_diagnostic(&tx, &state, format!("output stream error: {err}"));
                    RunOutcome {
                        status: RunStatus::Failed,
                        exit_code,
                    }
                } else if exit_code == Some(0) {
                    RunOutcome {
                        status: RunStatus::Succeeded,
                        exit_code,
                    }
                } else {
                    // Non-zero exit, or killed by a signal (no code).
                    RunOutcome {
                        status: RunStatus::Failed,
                        exit_code,
                    }
                }
            }
            Err(err) => {
                emit_diagnostic(&tx, &state, format!("failed waiting for process: {err}"));
                RunOutcome {
                    status: RunStatus::Failed,
                    exit_code: None,
                }
            }
        }
    };

    state.lock().finish(outcome);
    let _ = tx.send(RunnerEvent::Completed(outcome));
}

/// Append a final diagnostic line of severity Error, both to the session
/// record and to the event stream, ahead of the completion event.
fn emit_diagnostic(
    tx: &UnboundedSender<RunnerEvent>,
    state: &Arc<Mutex<SessionState>>,
    text: String,
) {
    let line = OutputLine {
        text,
        severity: Severity::Error,
        stream: OutputStream::Stderr,
    };
    state.lock().lines.push(line.clone());
    let _ = tx.send(RunnerEvent::Line(line));
}

/// Terminate a cancelled child: ask nicely, wait out the grace period,
/// then kill. Always waits for the process so termination is confirmed
/// before the completion event fires.
async fn shutdown_child(child: &mut Child) -> io::Result<Option<ExitStatus>> {
    if request_terminate(child) {
        match tokio::time::timeout(CANCEL_GRACE_PERIOD, child.wait()).await {
            Ok(result) => return result.map(Some),
            Err(_) => {
                warn!("child ignored termination request; escalating to kill");
            }
        }
    }
    child.start_kill()?;
    child.wait().await.map(Some)
}

#[cfg(unix)]
fn request_terminate(child: &Child) -> bool {
    match child.id() {
        Some(pid) => unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 },
        None => false,
    }
}

#[cfg(not(unix))]
fn request_terminate(_child: &Child) -> bool {
    // No graceful signal to send; the caller falls through to the kill.
    false
}
