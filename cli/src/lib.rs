//! Terminal front-end for the HEMTT build tool: translates subcommands
//! into hemtt invocations and streams their output with severity
//! coloring.

pub mod args;
mod config_cmd;
mod output;
mod run_cmd;

use anyhow::Context;
use anyhow::Result;
use hemtt_workbench_core::config::Settings;
use hemtt_workbench_core::commands::winget::WingetAction;
use hemtt_workbench_core::external;

use crate::args::Cli;
use crate::args::WorkbenchCommand;

/// Saved settings with the one-shot command line overrides applied.
fn effective_settings(cli: &Cli) -> Settings {
    let mut settings = Settings::load();
    if let Some(hemtt_path) = &cli.hemtt_path {
        settings.hemtt_path = hemtt_path.clone();
    }
    if let Some(project_dir) = &cli.project_dir {
        settings.project_dir = project_dir.clone();
    }
    settings
}

/// Dispatch a parsed command line. Returns the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    let settings = effective_settings(&cli);

    let invocation = match &cli.command {
        WorkbenchCommand::Config(command) => {
            return config_cmd::run(command.clone());
        }
        WorkbenchCommand::Book => {
            external::open_docs().context("failed to open the documentation")?;
            return Ok(0);
        }
        WorkbenchCommand::Log => {
            let path = external::hemtt_log_path(&settings.project_dir);
            external::open_path(&path)
                .with_context(|| format!("failed to open `{}`", path.display()))?;
            return Ok(0);
        }
        WorkbenchCommand::InstallHemtt => {
            WingetAction::Install.invocation(settings.project_dir.clone())
        }
        WorkbenchCommand::UpdateHemtt => {
            WingetAction::Upgrade.invocation(settings.project_dir.clone())
        }
        command => {
            let command = command
                .to_hemtt_command(&settings)
                .context("subcommand does not map to a hemtt invocation")?;
            if cli.dry_run {
                println!("{}", command.invocation(&settings).preview());
                return Ok(0);
            }
            if command.needs_terminal() {
                return run_cmd::execute_interactive(command.invocation(&settings));
            }
            command.invocation(&settings)
        }
    };

    if cli.dry_run {
        println!("{}", invocation.preview());
        return Ok(0);
    }
    run_cmd::execute(invocation).await
}
