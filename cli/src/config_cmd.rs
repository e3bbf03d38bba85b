use anyhow::Context;
use anyhow::Result;
use hemtt_workbench_core::config;
use hemtt_workbench_core::config::Settings;

use crate::args::ConfigCommand;

pub fn run(command: ConfigCommand) -> Result<i32> {
    match command {
        ConfigCommand::Path => {
            let path = config::config_path().context("no configuration directory available")?;
            println!("{}", path.display());
        }
        ConfigCommand::Get { key } => {
            let settings = Settings::load();
            let value = settings
                .get(&key)
                .with_context(|| format!("unknown setting `{key}`"))?;
            println!("{value}");
        }
        ConfigCommand::Set { key, value } => {
            let mut settings = Settings::load();
            settings
                .set(&key, &value)
                .with_context(|| format!("cannot set `{key}`"))?;
            settings.save().context("failed to save settings")?;
        }
    }
    Ok(0)
}
