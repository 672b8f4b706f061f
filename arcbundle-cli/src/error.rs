//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit code 1 for every failure.

use std::fmt;
use std::path::PathBuf;
use std::process;

use arcbundle::config::ConfigFileError;
use arcbundle::coord::CoordError;
use arcbundle::endpoint::EndpointError;
use arcbundle::export::ExportError;
use arcbundle::server::ServerError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Missing or inconsistent settings
    Config(String),
    /// Failed to read or write config.ini
    ConfigFile(ConfigFileError),
    /// Invalid coordinates
    Coord(CoordError),
    /// Export could not start
    Export(ExportError),
    /// Export finished but some bundles failed
    ExportIncomplete { failed: usize },
    /// Tile lookup failed
    Tile(EndpointError),
    /// The requested tile is empty or its bundle is missing
    TileNotFound { z: u8, x: u32, y: u32 },
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// HTTP server error
    Serve(ServerError),
    /// Failed to write output file
    FileWrite { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Set defaults with: arcbundle config init");
                eprintln!("Then edit: arcbundle config path");
            }
            CliError::ExportIncomplete { .. } => {
                eprintln!();
                eprintln!("See the log file for the bundles that failed and why.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Coord(e) => write!(f, "Invalid coordinates: {}", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
            CliError::ExportIncomplete { failed } => {
                write!(f, "Export finished with {} failed bundle(s)", failed)
            }
            CliError::Tile(e) => write!(f, "Tile lookup failed: {}", e),
            CliError::TileNotFound { z, x, y } => write!(f, "No tile at z={} x={} y={}", z, x, y),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::Serve(e) => write!(f, "Tile server error: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Coord(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::Tile(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Serve(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coord(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}

impl From<EndpointError> for CliError {
    fn from(e: EndpointError) -> Self {
        CliError::Tile(e)
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        CliError::Serve(e)
    }
}
