use crate::cli::commands::{ConfigAction, ConfigCmd};
use crate::io::config_io;
use crate::model::config::ClientConfig;

/// `config show|set|path`. Never touches the server or the triage state.
pub fn cmd_config(
    effective: &ClientConfig,
    args: ConfigCmd,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_io::config_path();
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            if json {
                println!("{}", serde_json::to_string_pretty(effective)?);
            } else {
                print!("{}", toml::to_string_pretty(effective)?);
                println!(
                    "# triage state: {}",
                    config_io::state_path(effective).display()
                );
            }
        }
        ConfigAction::Set { key, value } => {
            config_io::set_config_value(&path, &key, &value)?;
            println!("{} = {}", key, value);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
