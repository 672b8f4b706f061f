//! arcbundle CLI - Command-line interface
//!
//! Export, serve and inspect tiles stored in ArcGIS compact-cache bundles.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::export::ExportArgs;
use commands::locate::LocateArgs;
use commands::serve::ServeArgs;
use commands::tile::TileArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "arcbundle", version)]
#[command(about = "Extract and serve map tiles from ArcGIS compact cache bundles", long_about = None)]
struct Cli {
    /// Use this config file instead of ~/.arcbundle/config.ini
    #[arg(long, global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export every tile of the bundles covering an area
    Export(ExportArgs),

    /// Serve tiles over HTTP
    Serve(ServeArgs),

    /// Extract a single tile
    Tile(TileArgs),

    /// Show which bundle and slot store a coordinate
    Locate(LocateArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config_file.as_deref();

    match cli.command {
        Commands::Config { command } => commands::config::run(command, config_path),
        Commands::Locate(args) => {
            let config = commands::common::load_config(config_path)?;
            commands::locate::run(args, &config)
        }
        Commands::Tile(args) => {
            let config = commands::common::load_config(config_path)?;
            commands::tile::run(args, &config)
        }
        Commands::Export(args) => {
            let config = commands::common::load_config(config_path)?;
            let _logging = commands::common::start_logging(&config)?;
            commands::export::run(args, &config)
        }
        Commands::Serve(args) => {
            let config = commands::common::load_config(config_path)?;
            let _logging = commands::common::start_logging(&config)?;
            commands::serve::run(args, &config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcbundle::bundle::OffsetMode;
    use arcbundle::config::ConfigFile;
    use clap::CommandFactory;
    use commands::common::OffsetModeArg;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "arcbundle",
            "export",
            "--root",
            "/cache",
            "--out",
            "/out",
            "--north",
            "10.5",
            "--west",
            "-20.25",
            "--south",
            "-5",
            "--east",
            "3",
            "--min-level",
            "2",
            "--max-level",
            "6",
            "--offset-mode",
            "full",
            "--row-offset",
            "-1",
        ])
        .unwrap();

        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.west, -20.25);
        assert_eq!(args.south, -5.0);
        assert_eq!(args.offset_mode, Some(OffsetModeArg::Full));

        let request = args.to_request(&ConfigFile::default()).unwrap();
        assert_eq!(request.corner_a, (10.5, -20.25));
        assert_eq!(request.corner_b, (-5.0, 3.0));
        assert_eq!(request.offset_mode, OffsetMode::Full);
        assert_eq!(request.output_row_offset, -1);
    }

    #[test]
    fn test_export_falls_back_to_config() {
        let cli = Cli::try_parse_from([
            "arcbundle",
            "export",
            "--north",
            "1",
            "--west",
            "1",
            "--south",
            "0",
            "--east",
            "2",
            "--min-level",
            "0",
            "--max-level",
            "1",
        ])
        .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };

        assert!(args.to_request(&ConfigFile::default()).is_err());

        let mut config = ConfigFile::default();
        config.cache.root = Some(PathBuf::from("/cache"));
        config.export.output = Some(PathBuf::from("/out"));
        config.export.workers = Some(3);
        config.export.row_offset = 0;

        let request = args.to_request(&config).unwrap();
        assert_eq!(request.input_root, PathBuf::from("/cache"));
        assert_eq!(request.workers, 3);
        assert_eq!(request.output_row_offset, 0);
    }

    #[test]
    fn test_parse_tile_short_flags() {
        let cli = Cli::try_parse_from(["arcbundle", "tile", "-z", "3", "-x", "5", "-y", "2"]).unwrap();
        let Commands::Tile(args) = cli.command else {
            panic!("expected tile command");
        };
        assert_eq!((args.zoom, args.x, args.y), (3, 5, 2));
    }
}
