use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::error::RunnerError;

/// A fully specified request to run an external tool: program, ordered
/// arguments, working directory, and environment overrides. Immutable
/// once handed to the runner.
///
/// HEMTT's colored output is suppressed at the source rather than relying
/// purely on ANSI stripping, so every invocation carries `NO_COLOR=1` and
/// `TERM=dumb` unless the caller overrides them.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
    env: HashMap<String, String>,
}

impl Invocation {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = String>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        let mut env = HashMap::new();
        env.insert("NO_COLOR".to_string(), "1".to_string());
        env.insert("TERM".to_string(), "dumb".to_string());
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
            cwd: cwd.into(),
            env,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn env_overrides(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Full argv, program first. Useful for previews and dry runs.
    pub fn command_line(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Space-joined command line for status displays.
    pub fn preview(&self) -> String {
        self.command_line().join(" ")
    }

    /// Resolve the program to a concrete path before spawning.
    ///
    /// A bare name goes through `PATH`; anything containing a path
    /// separator must point at an existing file. Both failure modes are
    /// reported as launch errors so the caller sees them synchronously,
    /// before any session state changes.
    pub fn resolve_program(&self) -> Result<PathBuf, RunnerError> {
        if self.program.is_empty() {
            return Err(RunnerError::EmptyCommand);
        }
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            if candidate.is_file() {
                Ok(candidate.to_path_buf())
            } else {
                Err(RunnerError::launch(
                    &self.program,
                    io::Error::new(io::ErrorKind::NotFound, "executable not found"),
                ))
            }
        } else {
            which::which(&self.program).map_err(|err| {
                RunnerError::launch(
                    &self.program,
                    io::Error::new(io::ErrorKind::NotFound, err.to_string()),
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_suppression_is_on_by_default() {
        let invocation = Invocation::new("hemtt", vec!["check".to_string()], ".");
        assert_eq!(
            invocation.env_overrides().get("NO_COLOR").map(String::as_str),
            Some("1")
        );
        assert_eq!(
            invocation.env_overrides().get("TERM").map(String::as_str),
            Some("dumb")
        );
    }

    #[test]
    fn caller_can_override_env() {
        let invocation =
            Invocation::new("hemtt", Vec::new(), ".").env("TERM", "xterm-256color");
        assert_eq!(
            invocation.env_overrides().get("TERM").map(String::as_str),
            Some("xterm-256color")
        );
    }

    #[test]
    fn preview_joins_program_and_args() {
        let invocation = Invocation::new(
            "hemtt",
            vec!["build".to_string(), "--no-bin".to_string()],
            ".",
        );
        assert_eq!(invocation.preview(), "hemtt build --no-bin");
    }

    #[test]
    fn explicit_path_must_exist() {
        let invocation = Invocation::new("/definitely/not/here/hemtt", Vec::new(), ".");
        assert!(matches!(
            invocation.resolve_program(),
            Err(RunnerError::Launch { .. })
        ));
    }

    #[test]
    fn empty_program_is_rejected() {
        let invocation = Invocation::new("", Vec::new(), ".");
        assert!(matches!(
            invocation.resolve_program(),
            Err(RunnerError::EmptyCommand)
        ));
    }
}
