//! Launcher backend for the HEMTT build tool.
//!
//! The interesting part lives in [`runner`]: asynchronous execution of a
//! single external command with line-buffered output streaming, severity
//! classification, and cooperative cancellation. Everything else is the
//! glue a front-end needs around it: the command catalog that turns typed
//! options into argv, persisted settings, and platform integration for
//! interactive commands and external artifacts.

pub mod commands;
pub mod config;
mod error;
pub mod external;
mod invocation;
pub mod runner;
mod severity;
pub mod terminal;

pub use error::ConfigError;
pub use error::RunnerError;
pub use error::TerminalError;
pub use invocation::Invocation;
pub use runner::CommandRunner;
pub use runner::OutputLine;
pub use runner::OutputStream;
pub use runner::RunOutcome;
pub use runner::RunSnapshot;
pub use runner::RunStatus;
pub use runner::RunnerEvent;
pub use severity::Severity;
pub use severity::strip_ansi_codes;
