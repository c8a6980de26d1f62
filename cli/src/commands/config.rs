//! Config commands

use crate::config;
use crate::output::OutputFormat;
use crate::ConfigCommands;
use sase_rules::EngineConfig;
use std::path::Path;

pub fn handle(
    action: ConfigCommands,
    explicit: Option<&Path>,
    current: &EngineConfig,
    format: OutputFormat,
) -> Result<(), String> {
    match action {
        ConfigCommands::Show => match format {
            OutputFormat::Table => {
                let text = toml::to_string_pretty(current).map_err(|e| e.to_string())?;
                print!("{text}");
            }
            _ => format.print(current),
        },
        ConfigCommands::Init { force } => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => config::default_path()?,
            };
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ));
            }
            config::save(&EngineConfig::default(), &path)?;
            println!("Configuration initialized at {}", path.display());
        }
    }
    Ok(())
}
