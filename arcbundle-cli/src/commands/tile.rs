//! `arcbundle tile`: extract a single tile.

use std::path::PathBuf;
use std::sync::Arc;

use arcbundle::cache::BundleCache;
use arcbundle::config::ConfigFile;
use arcbundle::endpoint::{TileEndpoint, TileResponse};
use clap::Args;

use super::common::{resolve_offset_mode, resolve_root, OffsetModeArg};
use crate::error::CliError;

/// Arguments for the tile command.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Compact cache root (defaults to cache.root from config)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Zoom level
    #[arg(short = 'z', long)]
    pub zoom: u8,

    /// Column
    #[arg(short = 'x', long)]
    pub x: u32,

    /// Row
    #[arg(short = 'y', long)]
    pub y: u32,

    /// Write the tile to this file instead of only describing it
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Index offset decoding
    #[arg(long, value_enum)]
    pub offset_mode: Option<OffsetModeArg>,
}

/// Run the tile command.
pub fn run(args: TileArgs, config: &ConfigFile) -> Result<(), CliError> {
    let root = resolve_root(args.root, config)?;
    let offset_mode = resolve_offset_mode(args.offset_mode, config);
    let endpoint = TileEndpoint::new(Arc::new(BundleCache::new(1)), root, offset_mode);

    let (z, x, y) = (args.zoom, args.x, args.y);
    let (bytes, content_type) = match endpoint.fetch(x, y, z)? {
        TileResponse::Found {
            bytes,
            content_type,
        } => (bytes, content_type),
        TileResponse::NotFound => return Err(CliError::TileNotFound { z, x, y }),
    };

    println!("Tile z={} x={} y={}", z, x, y);
    println!("  Type: {}", content_type);
    println!("  Size: {} bytes", bytes.len());

    if let Some(path) = args.output {
        std::fs::write(&path, &bytes).map_err(|error| CliError::FileWrite {
            path: path.clone(),
            error,
        })?;
        println!("  Saved to: {}", path.display());
    }

    Ok(())
}
