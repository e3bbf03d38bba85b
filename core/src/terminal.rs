//! Launching interactive commands in a real terminal window.
//!
//! `hemtt new` and the bare `hemtt license` prompt on stdin, so they
//! cannot run behind the piped runner. Instead we hand them to the
//! platform's terminal emulator and detach.

use std::process::Command;
use std::process::Stdio;

use tracing::debug;

use crate::error::TerminalError;
use crate::invocation::Invocation;

#[cfg(all(not(windows), not(target_os = "macos")))]
const LINUX_EMULATORS: &[&str] = &["gnome-terminal", "konsole", "xterm"];

/// Build the terminal-emulator command that runs `invocation` in a new
/// window and leaves the window open for the user to read.
#[cfg(windows)]
fn emulator_command(invocation: &Invocation) -> Result<Command, TerminalError> {
    let mut cmd = Command::new("powershell");
    cmd.arg("-NoExit")
        .arg("-Command")
        .arg(powershell_line(invocation));
    Ok(cmd)
}

#[cfg(target_os = "macos")]
fn emulator_command(invocation: &Invocation) -> Result<Command, TerminalError> {
    let script = format!(
        "tell application \"Terminal\" to do script \"cd {} && {}\"",
        quote_word(&invocation.cwd().display().to_string()),
        shell_line(invocation),
    );
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    Ok(cmd)
}

#[cfg(all(not(windows), not(target_os = "macos")))]
fn emulator_command(invocation: &Invocation) -> Result<Command, TerminalError> {
    let emulator = LINUX_EMULATORS
        .iter()
        .find(|name| which::which(name).is_ok())
        .ok_or(TerminalError::NoEmulator)?;
    let line = format!("{}; exec $SHELL", shell_line(invocation));
    let mut cmd = Command::new(emulator);
    match *emulator {
        "gnome-terminal" => {
            cmd.arg("--").arg("sh").arg("-c").arg(line);
        }
        _ => {
            cmd.arg("-e").arg(format!("sh -c {}", quote_word(&line)));
        }
    }
    Ok(cmd)
}

/// Run `invocation` in a freshly opened terminal window. The spawned
/// emulator is not waited on.
pub fn run_in_terminal(invocation: &Invocation) -> Result<(), TerminalError> {
    let mut cmd = emulator_command(invocation)?;
    cmd.current_dir(invocation.cwd())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    debug!(program = invocation.program(), "opening terminal window");
    cmd.spawn()?;
    Ok(())
}

fn shell_line(invocation: &Invocation) -> String {
    invocation
        .command_line()
        .iter()
        .map(|word| quote_word(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn powershell_line(invocation: &Invocation) -> String {
    invocation
        .command_line()
        .iter()
        .map(|word| powershell_quote(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn needs_no_quoting(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '='))
}

/// Single-quote a word for POSIX sh; embedded single quotes are escaped
/// the sh way.
fn quote_word(word: &str) -> String {
    if needs_no_quoting(word) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', "'\\''"))
}

/// Single-quote a word for PowerShell, where an embedded single quote is
/// doubled rather than backslash-escaped.
fn powershell_quote(word: &str) -> String {
    if needs_no_quoting(word) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_pass_unquoted() {
        assert_eq!(quote_word("hemtt"), "hemtt");
        assert_eq!(quote_word("--no-rap"), "--no-rap");
        assert_eq!(quote_word("/usr/bin/hemtt"), "/usr/bin/hemtt");
    }

    #[test]
    fn spaces_and_quotes_are_escaped() {
        assert_eq!(quote_word("my mod"), "'my mod'");
        assert_eq!(quote_word("it's"), "'it'\\''s'");
        assert_eq!(quote_word(""), "''");
    }

    #[test]
    fn powershell_doubles_embedded_single_quotes() {
        assert_eq!(powershell_quote("hemtt"), "hemtt");
        assert_eq!(powershell_quote("my mod"), "'my mod'");
        assert_eq!(powershell_quote("it's"), "'it''s'");

        let invocation = Invocation::new(
            "hemtt".to_string(),
            vec!["new".to_string(), "it's".to_string()],
            std::path::PathBuf::from("."),
        );
        assert_eq!(powershell_line(&invocation), "hemtt new 'it''s'");
    }

    #[test]
    fn shell_line_joins_quoted_words() {
        let invocation = Invocation::new(
            "hemtt".to_string(),
            vec!["new".to_string(), "my mod".to_string()],
            std::path::PathBuf::from("."),
        );
        assert_eq!(shell_line(&invocation), "hemtt new 'my mod'");
    }
}
