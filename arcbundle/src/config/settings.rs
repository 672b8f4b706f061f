//! Settings structs for each section of `config.ini`, with their defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::bundle::OffsetMode;
use crate::cache::DEFAULT_CAPACITY;
use crate::export::DEFAULT_ROW_OFFSET;
use crate::logging::DEFAULT_LOG_FILE;
use crate::server::DEFAULT_REQUEST_TIMEOUT_SECS;

use super::file::config_directory;

/// Default listen address for `arcbundle serve`.
pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 8080);

/// Complete configuration loaded from `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub bundle: BundleSettings,
    pub export: ExportSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Root directory of the compact cache (contains the `Lnn` folders).
    pub root: Option<PathBuf>,
    /// Number of bundles kept in memory by the tile server.
    pub capacity: usize,
}

/// `[bundle]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSettings {
    pub offset_mode: OffsetMode,
}

/// `[export]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub output: Option<PathBuf>,
    /// Worker threads; `None` uses one per CPU.
    pub workers: Option<usize>,
    pub row_offset: i64,
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// Per-request deadline; 0 disables it.
    pub request_timeout_secs: u64,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = config_directory();

        Self {
            cache: CacheSettings {
                root: None,
                capacity: DEFAULT_CAPACITY,
            },
            bundle: BundleSettings {
                offset_mode: OffsetMode::default(),
            },
            export: ExportSettings {
                output: None,
                workers: None,
                row_offset: DEFAULT_ROW_OFFSET,
            },
            server: ServerSettings {
                bind: DEFAULT_BIND_ADDR,
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            logging: LoggingSettings {
                directory: config_dir.join("logs"),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}
