use std::sync::OnceLock;

use regex_lite::Regex;
use serde::Deserialize;
use serde::Serialize;

const ERROR_TOKENS: &[&str] = &["error", "err:", "fatal", "failed", "failure"];
const WARNING_TOKENS: &[&str] = &["warning", "warn:", "caution"];
const INFO_TOKENS: &[&str] = &["info", "information", "note:", "hint:"];

/// Coarse classification of an output line, inferred from its text for
/// display purposes only. Classification never alters the line itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Plain,
}

impl Severity {
    /// Best-effort keyword match, case-insensitive. Error tokens win over
    /// warning tokens, which win over info tokens.
    pub fn classify(line: &str) -> Self {
        let lower = line.to_lowercase();
        if ERROR_TOKENS.iter().any(|token| lower.contains(token)) {
            Severity::Error
        } else if WARNING_TOKENS.iter().any(|token| lower.contains(token)) {
            Severity::Warning
        } else if INFO_TOKENS.iter().any(|token| lower.contains(token)) {
            Severity::Info
        } else {
            Severity::Plain
        }
    }
}

// Literal pattern, cannot fail to parse.
#[allow(clippy::unwrap_used)]
fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").unwrap())
}

/// Remove ANSI escape sequences from a line. HEMTT is asked not to emit
/// them (`NO_COLOR=1`), but tools invoked through the custom-args path
/// may still color their output.
pub fn strip_ansi_codes(text: &str) -> String {
    ansi_pattern().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_tokens_classify_as_error() {
        assert_eq!(Severity::classify("ERROR: missing file"), Severity::Error);
        assert_eq!(Severity::classify("build failed"), Severity::Error);
        assert_eq!(Severity::classify("fatal: bad addon"), Severity::Error);
    }

    #[test]
    fn warning_tokens_classify_as_warning() {
        assert_eq!(Severity::classify("Warning: unused macro"), Severity::Warning);
        assert_eq!(Severity::classify("warn: slow path"), Severity::Warning);
    }

    #[test]
    fn info_tokens_classify_as_info() {
        assert_eq!(Severity::classify("note: see config.cpp"), Severity::Info);
        assert_eq!(Severity::classify("Info lints enabled"), Severity::Info);
    }

    #[test]
    fn plain_lines_stay_plain() {
        assert_eq!(Severity::classify("Build complete"), Severity::Plain);
        assert_eq!(Severity::classify(""), Severity::Plain);
    }

    #[test]
    fn error_wins_over_warning() {
        assert_eq!(
            Severity::classify("warning treated as error"),
            Severity::Error
        );
    }

    #[test]
    fn strips_color_sequences() {
        assert_eq!(
            strip_ansi_codes("\x1b[31mERROR\x1b[0m: bad"),
            "ERROR: bad"
        );
        assert_eq!(strip_ansi_codes("plain text"), "plain text");
    }
}
