use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use hemtt_workbench_core::commands::CommonArgs;
use hemtt_workbench_core::commands::CoverageFormat;
use hemtt_workbench_core::commands::HemttCommand;
use hemtt_workbench_core::commands::Verbosity;
use hemtt_workbench_core::config::Settings;

/// Desktop-free front-end for the HEMTT build tool.
#[derive(Debug, Parser)]
#[command(name = "hemtt-workbench", version, about)]
pub struct Cli {
    /// Print the resolved command line instead of running it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Path to the hemtt executable, overriding the saved setting.
    #[arg(long, global = true, value_name = "PATH")]
    pub hemtt_path: Option<String>,

    /// Project directory to run in, overriding the saved setting.
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: WorkbenchCommand,
}

/// Thread count and verbosity knobs shared by the build-style commands.
#[derive(Debug, Default, clap::Args)]
pub struct CommonOpts {
    /// Number of worker threads.
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<u32>,

    /// Increase output verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommonOpts {
    /// Saved settings fill in what the command line leaves unset.
    fn resolve(&self, settings: &Settings) -> CommonArgs {
        let verbosity = match self.verbose {
            0 if settings.verbose => Verbosity::Debug,
            0 => Verbosity::Normal,
            1 => Verbosity::Debug,
            _ => Verbosity::Trace,
        };
        CommonArgs {
            threads: self.threads,
            verbosity,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum CoverageFormatArg {
    #[default]
    Ascii,
    Json,
    PrettyJson,
    Markdown,
}

impl From<CoverageFormatArg> for CoverageFormat {
    fn from(value: CoverageFormatArg) -> Self {
        match value {
            CoverageFormatArg::Ascii => CoverageFormat::Ascii,
            CoverageFormatArg::Json => CoverageFormat::Json,
            CoverageFormatArg::PrettyJson => CoverageFormat::PrettyJson,
            CoverageFormatArg::Markdown => CoverageFormat::Markdown,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum WorkbenchCommand {
    /// Lint the project without writing any output.
    Check {
        /// Enable pedantic lints.
        #[arg(short = 'p', long)]
        pedantic: bool,
        /// Treat warnings as errors.
        #[arg(short = 'e', long = "errors")]
        errors: bool,
        /// Enable a specific lint (repeatable).
        #[arg(short = 'L', long = "lint", value_name = "LINT")]
        lints: Vec<String>,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Build a development version of the project.
    Dev {
        /// Binarize the output.
        #[arg(short = 'b', long)]
        binarize: bool,
        /// Skip rapifying configs.
        #[arg(long)]
        no_rap: bool,
        /// Include all optional addons.
        #[arg(short = 'O', long = "all-optionals")]
        all_optionals: bool,
        /// Include a specific optional addon (repeatable).
        #[arg(short = 'o', long = "optional", value_name = "ADDON")]
        optionals: Vec<String>,
        /// Build only the named addon (repeatable).
        #[arg(long = "just", value_name = "ADDON")]
        just: Vec<String>,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Build the project for release testing.
    Build {
        /// Skip binarization.
        #[arg(long)]
        no_bin: bool,
        /// Skip rapifying configs.
        #[arg(long)]
        no_rap: bool,
        /// Build only the named addon (repeatable).
        #[arg(long = "just", value_name = "ADDON")]
        just: Vec<String>,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Build and sign a release of the project.
    Release {
        /// Skip binarization.
        #[arg(long)]
        no_bin: bool,
        /// Skip rapifying configs.
        #[arg(long)]
        no_rap: bool,
        /// Skip signing the release.
        #[arg(long)]
        no_sign: bool,
        /// Skip creating the release archive.
        #[arg(long)]
        no_archive: bool,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Dev-build the project and launch Arma 3 with it.
    Launch {
        /// Launch configuration profiles.
        profiles: Vec<String>,
        /// Arma 3 executable to launch.
        #[arg(short = 'e', long, value_name = "EXE")]
        executable: Option<String>,
        /// Number of game instances to launch.
        #[arg(short = 'i', long, value_name = "N", default_value_t = 1)]
        instances: u32,
        /// Skip the dev build and reuse the last one.
        #[arg(short = 'Q', long)]
        quick: bool,
        /// Disable file patching.
        #[arg(short = 'F', long)]
        no_filepatching: bool,
        /// Binarize the dev build.
        #[arg(short = 'b', long)]
        binarize: bool,
        /// Skip rapifying configs.
        #[arg(long)]
        no_rap: bool,
        /// Include all optional addons.
        #[arg(short = 'O', long = "all-optionals")]
        all_optionals: bool,
        /// Include a specific optional addon (repeatable).
        #[arg(short = 'o', long = "optional", value_name = "ADDON")]
        optionals: Vec<String>,
        /// Build only the named addon (repeatable).
        #[arg(long = "just", value_name = "ADDON")]
        just: Vec<String>,
        #[command(flatten)]
        common: CommonOpts,
        /// Arguments passed through to the game after `--`.
        #[arg(last = true)]
        passthrough: Vec<String>,
    },
    /// Stringtable tooling.
    #[command(subcommand)]
    Localization(LocalizationCommand),
    /// Standalone file utilities.
    #[command(subcommand)]
    Utils(UtilsCommand),
    /// Run a Rhai script from `.hemtt/scripts`.
    Script {
        /// Script name without the extension.
        name: String,
    },
    /// Print a value from the project configuration.
    Value {
        /// Configuration key to look up.
        key: String,
    },
    /// BIKey management.
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Print a license, or pick one interactively when no name is given.
    License {
        /// License name, e.g. `mit` or `apl-sa`.
        name: Option<String>,
    },
    /// Create a new project (interactive).
    New {
        /// Name of the new project.
        name: String,
    },
    /// Run hemtt with raw arguments.
    Run {
        /// Arguments passed to hemtt verbatim.
        #[arg(required = true, trailing_var_arg = true)]
        args: Vec<String>,
    },
    /// Install HEMTT through winget.
    InstallHemtt,
    /// Update HEMTT through winget.
    UpdateHemtt,
    /// Inspect or change saved settings.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Open the HEMTT book in the browser.
    Book,
    /// Open the log of the most recent HEMTT run.
    Log,
}

#[derive(Debug, Subcommand)]
pub enum LocalizationCommand {
    /// Sort stringtable entries in place.
    Sort {
        /// Sort languages within keys only.
        #[arg(long)]
        only_lang: bool,
    },
    /// Report translation coverage.
    Coverage {
        /// Output format.
        #[arg(long, value_enum, default_value_t = CoverageFormatArg::Ascii)]
        format: CoverageFormatArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum UtilsCommand {
    /// Fix line endings across the project.
    Fnl,
    /// Find and strip byte-order marks.
    Bom,
    /// PAA image tooling.
    #[command(subcommand)]
    Paa(PaaCommand),
    /// PBO archive tooling.
    #[command(subcommand)]
    Pbo(PboCommand),
}

#[derive(Debug, Subcommand)]
pub enum PaaCommand {
    /// Convert an image to or from PAA.
    Convert {
        source: PathBuf,
        dest: PathBuf,
    },
    /// Print details of a PAA file.
    Inspect {
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum PboCommand {
    /// Print details of a PBO file.
    Inspect {
        file: PathBuf,
    },
    /// Unpack a PBO next to itself.
    Unpack {
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeysCommand {
    /// Generate the project's signing keys.
    Generate,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the path of the settings file.
    Path,
    /// Print one saved setting.
    Get {
        key: String,
    },
    /// Change one saved setting.
    Set {
        key: String,
        value: String,
    },
}

impl WorkbenchCommand {
    /// Translate a run-style subcommand into the catalog. `None` for the
    /// subcommands handled directly by the front-end.
    pub fn to_hemtt_command(&self, settings: &Settings) -> Option<HemttCommand> {
        let command = match self {
            WorkbenchCommand::Check {
                pedantic,
                errors,
                lints,
                common,
            } => HemttCommand::Check {
                pedantic: *pedantic || settings.pedantic,
                warnings_as_errors: *errors,
                lints: lints.clone(),
                common: common.resolve(settings),
            },
            WorkbenchCommand::Dev {
                binarize,
                no_rap,
                all_optionals,
                optionals,
                just,
                common,
            } => HemttCommand::Dev {
                binarize: *binarize,
                no_rap: *no_rap,
                all_optionals: *all_optionals,
                optionals: optionals.clone(),
                just: just.clone(),
                common: common.resolve(settings),
            },
            WorkbenchCommand::Build {
                no_bin,
                no_rap,
                just,
                common,
            } => HemttCommand::Build {
                no_bin: *no_bin,
                no_rap: *no_rap,
                just: just.clone(),
                common: common.resolve(settings),
            },
            WorkbenchCommand::Release {
                no_bin,
                no_rap,
                no_sign,
                no_archive,
                common,
            } => HemttCommand::Release {
                no_bin: *no_bin,
                no_rap: *no_rap,
                no_sign: *no_sign,
                no_archive: *no_archive,
                common: common.resolve(settings),
            },
            WorkbenchCommand::Launch {
                profiles,
                executable,
                instances,
                quick,
                no_filepatching,
                binarize,
                no_rap,
                all_optionals,
                optionals,
                just,
                common,
                passthrough,
            } => HemttCommand::Launch {
                profiles: profiles.clone(),
                executable: executable
                    .clone()
                    .or_else(|| settings.arma3_executable.clone()),
                instances: *instances,
                quick: *quick,
                no_filepatching: *no_filepatching,
                binarize: *binarize,
                no_rap: *no_rap,
                all_optionals: *all_optionals,
                optionals: optionals.clone(),
                just: just.clone(),
                passthrough: passthrough.clone(),
                common: common.resolve(settings),
            },
            WorkbenchCommand::Localization(LocalizationCommand::Sort { only_lang }) => {
                HemttCommand::LocalizationSort {
                    only_lang: *only_lang,
                }
            }
            WorkbenchCommand::Localization(LocalizationCommand::Coverage { format }) => {
                HemttCommand::LocalizationCoverage {
                    format: (*format).into(),
                }
            }
            WorkbenchCommand::Utils(UtilsCommand::Fnl) => HemttCommand::UtilsFnl,
            WorkbenchCommand::Utils(UtilsCommand::Bom) => HemttCommand::UtilsBom,
            WorkbenchCommand::Utils(UtilsCommand::Paa(PaaCommand::Convert { source, dest })) => {
                HemttCommand::PaaConvert {
                    source: source.clone(),
                    dest: dest.clone(),
                }
            }
            WorkbenchCommand::Utils(UtilsCommand::Paa(PaaCommand::Inspect { file })) => {
                HemttCommand::PaaInspect { file: file.clone() }
            }
            WorkbenchCommand::Utils(UtilsCommand::Pbo(PboCommand::Inspect { file })) => {
                HemttCommand::PboInspect { file: file.clone() }
            }
            WorkbenchCommand::Utils(UtilsCommand::Pbo(PboCommand::Unpack { file })) => {
                HemttCommand::PboUnpack { file: file.clone() }
            }
            WorkbenchCommand::Script { name } => HemttCommand::Script { name: name.clone() },
            WorkbenchCommand::Value { key } => HemttCommand::Value { key: key.clone() },
            WorkbenchCommand::Keys(KeysCommand::Generate) => HemttCommand::KeysGenerate,
            WorkbenchCommand::License { name } => HemttCommand::License { name: name.clone() },
            WorkbenchCommand::New { name } => HemttCommand::New { name: name.clone() },
            WorkbenchCommand::Run { args } => HemttCommand::Custom { args: args.clone() },
            WorkbenchCommand::InstallHemtt
            | WorkbenchCommand::UpdateHemtt
            | WorkbenchCommand::Config(_)
            | WorkbenchCommand::Book
            | WorkbenchCommand::Log => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_asserts() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn settings_fill_in_verbosity_and_pedantic() {
        let settings = Settings {
            pedantic: true,
            verbose: true,
            ..Settings::default()
        };
        let cli = Cli::parse_from(["hemtt-workbench", "check"]);
        let command = cli.command.to_hemtt_command(&settings).unwrap();
        assert_eq!(
            command.to_args(),
            vec!["check".to_string(), "-p".to_string(), "-v".to_string()]
        );
    }

    #[test]
    fn explicit_flags_beat_settings() {
        let settings = Settings::default();
        let cli = Cli::parse_from(["hemtt-workbench", "check", "-vv", "-e"]);
        let command = cli.command.to_hemtt_command(&settings).unwrap();
        assert_eq!(
            command.to_args(),
            vec!["check".to_string(), "-e".to_string(), "-vv".to_string()]
        );
    }

    #[test]
    fn launch_passthrough_after_double_dash() {
        let cli = Cli::parse_from([
            "hemtt-workbench",
            "launch",
            "default",
            "--",
            "-world=empty",
        ]);
        let command = cli.command.to_hemtt_command(&Settings::default()).unwrap();
        assert_eq!(
            command.to_args(),
            vec![
                "launch".to_string(),
                "default".to_string(),
                "--".to_string(),
                "-world=empty".to_string(),
            ]
        );
    }

    #[test]
    fn front_end_subcommands_map_to_nothing() {
        let cli = Cli::parse_from(["hemtt-workbench", "config", "path"]);
        assert!(cli.command.to_hemtt_command(&Settings::default()).is_none());
    }
}
