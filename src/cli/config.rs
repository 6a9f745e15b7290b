//! CLI commands for settings

use clap::Subcommand;

use crate::config::{Settings, TallyPaths};
use crate::display::format_settings;
use crate::error::TallyResult;

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show paths and settings
    Show,
    /// Change a setting
    Set {
        /// Setting name (currency_symbol, date_format, top_categories, default_window)
        key: String,
        /// New value
        value: String,
    },
}

/// Handle a config command; no subcommand shows the settings
pub fn handle_config_command(
    paths: &TallyPaths,
    settings: &mut Settings,
    cmd: Option<ConfigCommands>,
) -> TallyResult<()> {
    match cmd.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            print!("{}", format_settings(paths, settings));
        }
        ConfigCommands::Set { key, value } => {
            settings.set(&key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value.trim());
        }
    }
    Ok(())
}
