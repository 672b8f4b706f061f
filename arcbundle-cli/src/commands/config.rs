//! Configuration management CLI commands.
//!
//! Provides `config show`, `config path`, and `config init`.

use std::path::Path;

use arcbundle::config::{config_file_path, ConfigFile};
use clap::Subcommand;

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as INI
    Show,

    /// Show the configuration file path
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand. `path` overrides the default file location.
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    let file = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Show => {
            let config = load_config(Some(&file))?;
            print!("{}", config.to_ini_string());
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", file.display());
            Ok(())
        }
        ConfigCommands::Init { force } => run_init(&file, force),
    }
}

fn run_init(file: &Path, force: bool) -> Result<(), CliError> {
    if force {
        ConfigFile::default().save_to(file)?;
        println!("Wrote default configuration to {}", file.display());
    } else if ConfigFile::ensure_exists_at(file)? {
        println!("Created {}", file.display());
    } else {
        println!(
            "{} already exists (use --force to overwrite)",
            file.display()
        );
    }
    Ok(())
}
