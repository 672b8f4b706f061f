//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use arcbundle::bundle::OffsetMode;
use arcbundle::config::{config_file_path, ConfigFile};
use arcbundle::logging::{init_logging, LoggingGuard};
use clap::ValueEnum;

use crate::error::CliError;

/// Index offset decoding selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OffsetModeArg {
    /// Low 4 bytes of each index record (matches existing exports)
    Compat,
    /// All 5 bytes, for data files over 4 GiB
    Full,
}

impl From<OffsetModeArg> for OffsetMode {
    fn from(arg: OffsetModeArg) -> Self {
        match arg {
            OffsetModeArg::Compat => OffsetMode::Compat,
            OffsetModeArg::Full => OffsetMode::Full,
        }
    }
}

/// Load config.ini from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    Ok(ConfigFile::load_from(&path)?)
}

/// Bundle cache root: CLI flag first, then `cache.root` from config.
pub fn resolve_root(cli_root: Option<PathBuf>, config: &ConfigFile) -> Result<PathBuf, CliError> {
    cli_root.or_else(|| config.cache.root.clone()).ok_or_else(|| {
        CliError::Config(
            "no bundle cache root. Pass --root or set root in the [cache] section of config.ini"
                .to_string(),
        )
    })
}

/// Offset mode: CLI flag first, then `bundle.offset_mode` from config.
pub fn resolve_offset_mode(cli_mode: Option<OffsetModeArg>, config: &ConfigFile) -> OffsetMode {
    cli_mode
        .map(OffsetMode::from)
        .unwrap_or(config.bundle.offset_mode)
}

/// Start file and stdout logging as configured.
pub fn start_logging(config: &ConfigFile) -> Result<LoggingGuard, CliError> {
    init_logging(&config.logging.directory, &config.logging.file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_prefers_cli() {
        let mut config = ConfigFile::default();
        config.cache.root = Some(PathBuf::from("/from/config"));

        let root = resolve_root(Some(PathBuf::from("/from/cli")), &config).unwrap();
        assert_eq!(root, PathBuf::from("/from/cli"));

        let root = resolve_root(None, &config).unwrap();
        assert_eq!(root, PathBuf::from("/from/config"));
    }

    #[test]
    fn test_resolve_root_missing() {
        let config = ConfigFile::default();
        assert!(matches!(
            resolve_root(None, &config),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_resolve_offset_mode() {
        let mut config = ConfigFile::default();
        config.bundle.offset_mode = OffsetMode::Full;

        assert_eq!(resolve_offset_mode(None, &config), OffsetMode::Full);
        assert_eq!(
            resolve_offset_mode(Some(OffsetModeArg::Compat), &config),
            OffsetMode::Compat
        );
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("custom.ini");
        std::fs::write(&path, "[cache]\ncapacity = 7\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.cache.capacity, 7);
    }
}
