//! Installing and updating HEMTT itself through winget.

use std::path::PathBuf;

use crate::invocation::Invocation;

const HEMTT_PACKAGE_ID: &str = "BrettMayson.HEMTT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WingetAction {
    Install,
    Upgrade,
}

impl WingetAction {
    fn verb(self) -> &'static str {
        match self {
            WingetAction::Install => "install",
            WingetAction::Upgrade => "upgrade",
        }
    }

    /// The winget invocation for this action, run from `cwd`.
    pub fn invocation(self, cwd: PathBuf) -> Invocation {
        Invocation::new(
            "winget".to_string(),
            vec![
                self.verb().to_string(),
                "--id".to_string(),
                HEMTT_PACKAGE_ID.to_string(),
                "-e".to_string(),
            ],
            cwd,
        )
    }
}
