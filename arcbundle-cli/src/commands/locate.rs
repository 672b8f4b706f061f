//! `arcbundle locate`: show which bundle and slot hold a coordinate.

use std::path::{Path, PathBuf};

use arcbundle::bundle::BundleDescriptor;
use arcbundle::config::ConfigFile;
use arcbundle::coord::to_tile_coords;
use arcbundle::export::output_tile_path;
use clap::Args;

use crate::error::CliError;

/// Arguments for the locate command.
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Zoom level
    #[arg(long)]
    pub zoom: u8,

    /// Compact cache root; when set, also reports whether the files exist
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Run the locate command.
pub fn run(args: LocateArgs, config: &ConfigFile) -> Result<(), CliError> {
    let tile = to_tile_coords(args.lat, args.lon, args.zoom)?;
    let root = args.root.or_else(|| config.cache.root.clone());

    let descriptor = BundleDescriptor::for_tile(root.as_deref().unwrap_or(Path::new("")), &tile);
    let slot = descriptor
        .slot_of(&tile)
        .map_err(|e| CliError::Tile(e.into()))?;

    println!("Location: {}, {}", args.lat, args.lon);
    println!("  Tile:   row={} col={} zoom={}", tile.row, tile.col, tile.zoom);
    println!(
        "  Bundle: {} (origin row={} col={})",
        descriptor.id, descriptor.origin_row, descriptor.origin_col
    );
    println!("  Slot:   {}", slot);
    println!(
        "  Export: {}",
        output_tile_path(Path::new(""), &tile, config.export.row_offset).display()
    );

    if root.is_some() {
        for path in [&descriptor.index_path, &descriptor.data_path] {
            let state = if path.exists() { "present" } else { "missing" };
            println!("  File:   {} ({})", path.display(), state);
        }
    }

    Ok(())
}
