use clap::{Args, Subcommand};

use crate::config;
use crate::error::CliError;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    #[command(about = "Validate the config file and optionally one profile")]
    Check {
        #[arg(long)]
        profile: Option<String>,
    },
    #[command(about = "Print the resolved config file path")]
    Path,
}

pub fn run(args: ConfigArgs) -> Result<(), CliError> {
    match args.command {
        ConfigSubcommand::Check { profile } => {
            let path = config::validate_config(profile.as_deref()).map_err(CliError::Config)?;
            println!("config OK: {}", path.display());
        }
        ConfigSubcommand::Path => {
            let path = config::config_path().map_err(CliError::Config)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
