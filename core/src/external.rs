//! Hand-offs to the desktop: documentation in the browser, files and
//! folders in whatever the platform associates with them.

use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use tracing::debug;

const DOCS_URL: &str = "https://hemtt.dev";

/// Open the HEMTT book in the default browser.
pub fn open_docs() -> io::Result<()> {
    debug!(url = DOCS_URL, "opening documentation");
    webbrowser::open(DOCS_URL)
}

/// Where HEMTT writes the log of its most recent run.
pub fn hemtt_log_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".hemttout").join("latest.log")
}

/// Open a file or directory with the platform's default handler.
pub fn open_path(path: &Path) -> io::Result<()> {
    let mut cmd = opener_command(path);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    debug!(path = %path.display(), "opening with system handler");
    cmd.spawn()?;
    Ok(())
}

#[cfg(windows)]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg("start").arg("").arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(all(not(windows), not(target_os = "macos")))]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_under_hemttout() {
        assert_eq!(
            hemtt_log_path(Path::new("/proj")),
            PathBuf::from("/proj/.hemttout/latest.log")
        );
    }
}
