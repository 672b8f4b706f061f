//! `arcbundle serve`: HTTP tile server over a compact cache.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arcbundle::cache::BundleCache;
use arcbundle::config::ConfigFile;
use arcbundle::endpoint::TileEndpoint;
use arcbundle::server::{self, ServerState};
use clap::Args;
use tracing::info;

use super::common::{resolve_offset_mode, resolve_root, OffsetModeArg};
use crate::error::CliError;

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Compact cache root (defaults to cache.root from config)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Listen address (defaults to server.bind from config)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Bundles kept in memory (defaults to cache.capacity from config)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Index offset decoding
    #[arg(long, value_enum)]
    pub offset_mode: Option<OffsetModeArg>,

    /// Seconds before a tile request gets 504; 0 disables
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Run the serve command until Ctrl-C.
pub fn run(args: ServeArgs, config: &ConfigFile) -> Result<(), CliError> {
    let root = resolve_root(args.root, config)?;
    let bind = args.bind.unwrap_or(config.server.bind);
    let capacity = args.capacity.unwrap_or(config.cache.capacity);
    let offset_mode = resolve_offset_mode(args.offset_mode, config);
    let timeout_secs = args
        .timeout_secs
        .unwrap_or(config.server.request_timeout_secs);

    let cache = Arc::new(BundleCache::new(capacity));
    let endpoint = TileEndpoint::new(cache, root, offset_mode);
    let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
    let state = ServerState::new(endpoint).with_request_timeout(timeout);

    info!(capacity, timeout_secs, "Starting tile server");
    println!("Serving tiles on http://{}/tiles/{{z}}/{{x}}/{{y}}", bind);
    println!("Press Ctrl-C to stop.");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("arcbundle-http")
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(server::serve(bind, state))?;
    Ok(())
}
