//! User configuration stored in `~/.arcbundle/config.ini`.
//!
//! Every value has a default, so a missing file or section is not an error.
//! Command-line flags override whatever is loaded here.

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    BundleSettings, CacheSettings, ConfigFile, ExportSettings, LoggingSettings, ServerSettings,
    DEFAULT_BIND_ADDR,
};
