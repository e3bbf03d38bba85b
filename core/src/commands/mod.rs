//! The HEMTT command catalog.
//!
//! Each variant carries exactly the options that command accepts; the
//! translation into an argv tail is pure and side-effect free, which
//! makes it the natural unit-test surface. Argument order matches what
//! HEMTT documents: command, command-specific flags, threads, verbosity,
//! and any passthrough args after a literal `--`.

pub mod winget;

use std::path::Path;
use std::path::PathBuf;

use crate::config::Settings;
use crate::invocation::Invocation;

/// Verbosity tail shared by the build-style commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    #[default]
    Normal,
    /// `-v`
    Debug,
    /// `-vv`
    Trace,
}

impl Verbosity {
    fn push_args(self, args: &mut Vec<String>) {
        match self {
            Verbosity::Normal => {}
            Verbosity::Debug => args.push("-v".to_string()),
            Verbosity::Trace => args.push("-vv".to_string()),
        }
    }
}

/// Options every build-style command shares: worker thread count and
/// verbosity. Appended after the command-specific flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonArgs {
    pub threads: Option<u32>,
    pub verbosity: Verbosity,
}

impl CommonArgs {
    fn push_args(self, args: &mut Vec<String>) {
        if let Some(threads) = self.threads {
            args.push("-t".to_string());
            args.push(threads.to_string());
        }
        self.verbosity.push_args(args);
    }
}

/// Output format for `localization coverage`. Ascii is HEMTT's default
/// and is therefore not passed explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoverageFormat {
    #[default]
    Ascii,
    Json,
    PrettyJson,
    Markdown,
}

impl CoverageFormat {
    fn flag_value(self) -> Option<&'static str> {
        match self {
            CoverageFormat::Ascii => None,
            CoverageFormat::Json => Some("json"),
            CoverageFormat::PrettyJson => Some("pretty-json"),
            CoverageFormat::Markdown => Some("markdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HemttCommand {
    Check {
        pedantic: bool,
        warnings_as_errors: bool,
        lints: Vec<String>,
        common: CommonArgs,
    },
    Dev {
        binarize: bool,
        no_rap: bool,
        all_optionals: bool,
        optionals: Vec<String>,
        just: Vec<String>,
        common: CommonArgs,
    },
    Build {
        no_bin: bool,
        no_rap: bool,
        just: Vec<String>,
        common: CommonArgs,
    },
    Release {
        no_bin: bool,
        no_rap: bool,
        no_sign: bool,
        no_archive: bool,
        common: CommonArgs,
    },
    Launch {
        profiles: Vec<String>,
        executable: Option<String>,
        instances: u32,
        quick: bool,
        no_filepatching: bool,
        binarize: bool,
        no_rap: bool,
        all_optionals: bool,
        optionals: Vec<String>,
        just: Vec<String>,
        passthrough: Vec<String>,
        common: CommonArgs,
    },
    LocalizationSort {
        only_lang: bool,
    },
    LocalizationCoverage {
        format: CoverageFormat,
    },
    UtilsFnl,
    UtilsBom,
    PaaConvert {
        source: PathBuf,
        dest: PathBuf,
    },
    PaaInspect {
        file: PathBuf,
    },
    PboInspect {
        file: PathBuf,
    },
    PboUnpack {
        file: PathBuf,
    },
    Script {
        name: String,
    },
    Value {
        key: String,
    },
    KeysGenerate,
    /// `None` runs HEMTT's interactive license picker.
    License {
        name: Option<String>,
    },
    New {
        name: String,
    },
    /// Raw args after the executable, the custom-command escape hatch.
    Custom {
        args: Vec<String>,
    },
}

impl HemttCommand {
    /// The argv tail after the hemtt executable.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            HemttCommand::Check {
                pedantic,
                warnings_as_errors,
                lints,
                common,
            } => {
                args.push("check".to_string());
                if *pedantic {
                    args.push("-p".to_string());
                }
                if *warnings_as_errors {
                    args.push("-e".to_string());
                }
                for lint in lints {
                    args.push("-L".to_string());
                    args.push(lint.clone());
                }
                common.push_args(&mut args);
            }
            HemttCommand::Dev {
                binarize,
                no_rap,
                all_optionals,
                optionals,
                just,
                common,
            } => {
                args.push("dev".to_string());
                if *binarize {
                    args.push("-b".to_string());
                }
                if *no_rap {
                    args.push("--no-rap".to_string());
                }
                if *all_optionals {
                    args.push("-O".to_string());
                }
                for optional in optionals {
                    args.push("-o".to_string());
                    args.push(optional.clone());
                }
                for addon in just {
                    args.push("--just".to_string());
                    args.push(addon.clone());
                }
                common.push_args(&mut args);
            }
            HemttCommand::Build {
                no_bin,
                no_rap,
                just,
                common,
            } => {
                args.push("build".to_string());
                if *no_bin {
                    args.push("--no-bin".to_string());
                }
                if *no_rap {
                    args.push("--no-rap".to_string());
                }
                for addon in just {
                    args.push("--just".to_string());
                    args.push(addon.clone());
                }
                common.push_args(&mut args);
            }
            HemttCommand::Release {
                no_bin,
                no_rap,
                no_sign,
                no_archive,
                common,
            } => {
                args.push("release".to_string());
                if *no_bin {
                    args.push("--no-bin".to_string());
                }
                if *no_rap {
                    args.push("--no-rap".to_string());
                }
                if *no_sign {
                    args.push("--no-sign".to_string());
                }
                if *no_archive {
                    args.push("--no-archive".to_string());
                }
                common.push_args(&mut args);
            }
            HemttCommand::Launch {
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
                passthrough,
                common,
            } => {
                args.push("launch".to_string());
                args.extend(profiles.iter().cloned());
                if let Some(executable) = executable {
                    args.push("-e".to_string());
                    args.push(executable.clone());
                }
                if *instances > 1 {
                    args.push("-i".to_string());
                    args.push(instances.to_string());
                }
                if *quick {
                    args.push("-Q".to_string());
                }
                if *no_filepatching {
                    args.push("-F".to_string());
                }
                if *all_optionals {
                    args.push("-O".to_string());
                }
                for optional in optionals {
                    args.push("-o".to_string());
                    args.push(optional.clone());
                }
                if *binarize {
                    args.push("-b".to_string());
                }
                if *no_rap {
                    args.push("--no-rap".to_string());
                }
                for addon in just {
                    args.push("--just".to_string());
                    args.push(addon.clone());
                }
                common.push_args(&mut args);
                if !passthrough.is_empty() {
                    args.push("--".to_string());
                    args.extend(passthrough.iter().cloned());
                }
            }
            HemttCommand::LocalizationSort { only_lang } => {
                args.push("localization".to_string());
                args.push("sort".to_string());
                if *only_lang {
                    args.push("--only-lang".to_string());
                }
            }
            HemttCommand::LocalizationCoverage { format } => {
                args.push("localization".to_string());
                args.push("coverage".to_string());
                if let Some(value) = format.flag_value() {
                    args.push("--format".to_string());
                    args.push(value.to_string());
                }
            }
            HemttCommand::UtilsFnl => {
                args.push("utils".to_string());
                args.push("fnl".to_string());
            }
            HemttCommand::UtilsBom => {
                args.push("utils".to_string());
                args.push("bom".to_string());
            }
            HemttCommand::PaaConvert { source, dest } => {
                args.push("utils".to_string());
                args.push("paa".to_string());
                args.push("convert".to_string());
                args.push(source.display().to_string());
                args.push(dest.display().to_string());
            }
            HemttCommand::PaaInspect { file } => {
                args.push("utils".to_string());
                args.push("paa".to_string());
                args.push("inspect".to_string());
                args.push(file.display().to_string());
            }
            HemttCommand::PboInspect { file } => {
                args.push("utils".to_string());
                args.push("pbo".to_string());
                args.push("inspect".to_string());
                args.push(file.display().to_string());
            }
            HemttCommand::PboUnpack { file } => {
                args.push("utils".to_string());
                args.push("pbo".to_string());
                args.push("unpack".to_string());
                args.push(file.display().to_string());
            }
            HemttCommand::Script { name } => {
                args.push("script".to_string());
                args.push(name.clone());
            }
            HemttCommand::Value { key } => {
                args.push("value".to_string());
                args.push(key.clone());
            }
            HemttCommand::KeysGenerate => {
                args.push("keys".to_string());
                args.push("generate".to_string());
            }
            HemttCommand::License { name } => {
                args.push("license".to_string());
                if let Some(name) = name {
                    args.push(name.clone());
                }
            }
            HemttCommand::New { name } => {
                args.push("new".to_string());
                args.push(name.clone());
            }
            HemttCommand::Custom { args: custom } => {
                args.extend(custom.iter().cloned());
            }
        }
        args
    }

    /// Working directory for this command. File-scoped utilities run
    /// from the file's parent directory; everything else runs from the
    /// project directory.
    pub fn working_dir(&self, settings: &Settings) -> PathBuf {
        let file_scope = match self {
            HemttCommand::PaaConvert { source, .. } => Some(source.as_path()),
            HemttCommand::PaaInspect { file }
            | HemttCommand::PboInspect { file }
            | HemttCommand::PboUnpack { file } => Some(file.as_path()),
            _ => None,
        };
        match file_scope.and_then(Path::parent) {
            Some(parent) if parent != Path::new("") => parent.to_path_buf(),
            _ => settings.project_dir.clone(),
        }
    }

    /// Commands that prompt on a real terminal and cannot run behind a
    /// pipe: project scaffolding and the interactive license picker.
    pub fn needs_terminal(&self) -> bool {
        matches!(
            self,
            HemttCommand::New { .. } | HemttCommand::License { name: None }
        )
    }

    /// Assemble the full invocation for this command under the given
    /// settings.
    pub fn invocation(&self, settings: &Settings) -> Invocation {
        Invocation::new(
            settings.hemtt_path.clone(),
            self.to_args(),
            self.working_dir(settings),
        )
    }
}
