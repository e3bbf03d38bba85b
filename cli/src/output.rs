//! Severity-aware line printing for the run loop.

use std::time::Duration;

use hemtt_workbench_core::OutputLine;
use hemtt_workbench_core::OutputStream;
use hemtt_workbench_core::RunOutcome;
use hemtt_workbench_core::RunStatus;
use hemtt_workbench_core::Severity;
use owo_colors::OwoColorize;

/// Whether each output stream of this process is attached to something
/// that renders color.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode {
    stdout: bool,
    stderr: bool,
}

impl ColorMode {
    pub fn detect() -> Self {
        Self {
            stdout: supports_color::on(supports_color::Stream::Stdout).is_some(),
            stderr: supports_color::on(supports_color::Stream::Stderr).is_some(),
        }
    }

    #[cfg(test)]
    fn plain() -> Self {
        Self {
            stdout: false,
            stderr: false,
        }
    }
}

fn paint(text: &str, severity: Severity) -> String {
    match severity {
        Severity::Error => text.red().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Info => text.cyan().to_string(),
        Severity::Plain => text.to_string(),
    }
}

/// Print one child line on the matching stream of our own process.
pub fn print_line(line: &OutputLine, colors: ColorMode) {
    match line.stream {
        OutputStream::Stdout => {
            if colors.stdout {
                println!("{}", paint(&line.text, line.severity));
            } else {
                println!("{}", line.text);
            }
        }
        OutputStream::Stderr => {
            if colors.stderr {
                eprintln!("{}", paint(&line.text, line.severity));
            } else {
                eprintln!("{}", line.text);
            }
        }
    }
}

/// The trailer printed after the run, mirroring a terminal's exit banner.
pub fn trailer(outcome: &RunOutcome, elapsed: Option<Duration>) -> String {
    let elapsed = match elapsed {
        Some(elapsed) => format!(" after {:.1}s", elapsed.as_secs_f64()),
        None => String::new(),
    };
    match (outcome.status, outcome.exit_code) {
        (RunStatus::Cancelled, _) => format!("[Process cancelled{elapsed}]"),
        (_, Some(code)) => format!("[Process exited with code {code}{elapsed}]"),
        (_, None) => format!("[Process failed{elapsed}]"),
    }
}

/// Shell exit code for a finished run. Cancellation reports the way a
/// SIGINT-killed process would.
pub fn exit_code(outcome: &RunOutcome) -> i32 {
    match (outcome.status, outcome.exit_code) {
        (RunStatus::Cancelled, _) => 130,
        (_, Some(code)) => code,
        (RunStatus::Succeeded, None) => 0,
        (_, None) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailer_reports_exit_code() {
        let outcome = RunOutcome {
            status: RunStatus::Succeeded,
            exit_code: Some(0),
        };
        assert_eq!(
            trailer(&outcome, Some(Duration::from_millis(1540))),
            "[Process exited with code 0 after 1.5s]"
        );
        assert_eq!(trailer(&outcome, None), "[Process exited with code 0]");
    }

    #[test]
    fn trailer_reports_cancellation() {
        let outcome = RunOutcome {
            status: RunStatus::Cancelled,
            exit_code: None,
        };
        assert_eq!(trailer(&outcome, None), "[Process cancelled]");
    }

    #[test]
    fn exit_codes_pass_through() {
        let succeeded = RunOutcome {
            status: RunStatus::Succeeded,
            exit_code: Some(0),
        };
        let failed = RunOutcome {
            status: RunStatus::Failed,
            exit_code: Some(12),
        };
        let failed_unknown = RunOutcome {
            status: RunStatus::Failed,
            exit_code: None,
        };
        let cancelled = RunOutcome {
            status: RunStatus::Cancelled,
            exit_code: None,
        };
        assert_eq!(exit_code(&succeeded), 0);
        assert_eq!(exit_code(&failed), 12);
        assert_eq!(exit_code(&failed_unknown), 1);
        assert_eq!(exit_code(&cancelled), 130);
    }

    #[test]
    fn plain_mode_never_colors() {
        let colors = ColorMode::plain();
        assert!(!colors.stdout);
        assert!(!colors.stderr);
    }
}
