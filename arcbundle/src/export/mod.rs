//! Batch export of bundle contents into a tile pyramid on disk.
//!
//! For every level in the requested range the two corner coordinates are
//! converted to tiles, the bundles covering that box are enumerated, and
//! every non-empty slot of every bundle is written to
//!
//! ```text
//! {output}/L{level:02}/R{col:08X}/C{row + row_offset:08X}.png
//! ```
//!
//! Whole bundles are exported, including slots outside the requested box.
//! The default `row_offset` of `-1` reproduces the layout produced by the
//! original exporter; row 0 wraps to `FFFFFFFF`.
//!
//! # Parallelism
//!
//! Bundles are distributed over a bounded rayon pool. Workers share nothing
//! but the loader. A missing bundle is skipped; a corrupt record or a
//! failed write stops that bundle only and is reported in the summary.

mod types;

pub use types::{
    BundleOutcome, ExportError, ExportFailure, ExportObserver, ExportRequest, ExportSummary,
    NoopObserver, DEFAULT_ROW_OFFSET,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::bundle::{enumerate_bundles, BundleDescriptor};
use crate::cache::{BundleLoader, FsBundleLoader};
use crate::coord::{to_tile_coords, TileCoord};

/// Output path of one exported tile.
pub fn output_tile_path(output_root: &Path, tile: &TileCoord, row_offset: i64) -> PathBuf {
    // Truncating cast keeps the signed wrap-around of the original layout
    let row = (i64::from(tile.row) + row_offset) as u32;
    output_root
        .join(format!("L{:02}", tile.zoom))
        .join(format!("R{:08X}", tile.col))
        .join(format!("C{:08X}.png", row))
}

/// Exports bundles to a tile pyramid using a fixed worker pool.
pub struct BatchExporter {
    loader: Arc<dyn BundleLoader>,
}

impl BatchExporter {
    /// Create an exporter that reads bundles from disk.
    pub fn new() -> Self {
        Self::with_loader(Arc::new(FsBundleLoader))
    }

    pub fn with_loader(loader: Arc<dyn BundleLoader>) -> Self {
        Self { loader }
    }

    /// Bundles covering the request, level by level.
    pub fn plan(&self, request: &ExportRequest) -> Result<Vec<BundleDescriptor>, ExportError> {
        request.validate()?;

        let mut descriptors = Vec::new();
        for level in request.min_level..=request.max_level {
            let (lat_a, lon_a) = request.corner_a;
            let (lat_b, lon_b) = request.corner_b;
            let a = to_tile_coords(lat_a, lon_a, level)?;
            let b = to_tile_coords(lat_b, lon_b, level)?;

            let bundles = enumerate_bundles(&request.input_root, level, a.row, b.row, a.col, b.col);
            debug!(
                level,
                rows = ?(a.row.min(b.row), a.row.max(b.row)),
                cols = ?(a.col.min(b.col), a.col.max(b.col)),
                bundles = bundles.len(),
                "Planned export level"
            );
            descriptors.extend(bundles);
        }
        Ok(descriptors)
    }

    /// Run the export, reporting progress to `observer`.
    pub fn run(
        &self,
        request: &ExportRequest,
        observer: &dyn ExportObserver,
    ) -> Result<ExportSummary, ExportError> {
        let started = Instant::now();
        let descriptors = self.plan(request)?;
        observer.export_started(descriptors.len());

        info!(
            input = %request.input_root.display(),
            output = %request.output_root.display(),
            levels = ?(request.min_level, request.max_level),
            bundles = descriptors.len(),
            workers = request.workers,
            offset_mode = %request.offset_mode,
            "Starting bundle export"
        );

        fs::create_dir_all(&request.output_root).map_err(|source| ExportError::OutputDir {
            path: request.output_root.clone(),
            source,
        })?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(request.workers)
            .thread_name(|i| format!("arcbundle-export-{}", i))
            .build()?;

        let outcomes: Vec<BundleOutcome> = pool.install(|| {
            descriptors
                .par_iter()
                .map(|descriptor| {
                    let outcome = self.export_bundle(descriptor, request);
                    observer.bundle_finished(descriptor, &outcome);
                    outcome
                })
                .collect()
        });

        let mut summary = ExportSummary::default();
        for outcome in &outcomes {
            summary.record(outcome);
        }
        summary.duration = started.elapsed();

        info!(
            bundles = summary.bundles_total,
            exported = summary.bundles_exported,
            missing = summary.bundles_missing,
            failed = summary.bundles_failed,
            tiles = summary.tiles_written,
            bytes = summary.bytes_written,
            elapsed_ms = summary.duration.as_millis() as u64,
            "Bundle export finished"
        );

        Ok(summary)
    }

    /// Export every non-empty slot of one bundle.
    fn export_bundle(&self, descriptor: &BundleDescriptor, request: &ExportRequest) -> BundleOutcome {
        let buffer = match self.loader.load(descriptor) {
            Ok(buffer) => buffer,
            Err(e) if e.is_not_found() => {
                debug!(bundle = %descriptor.id, "Bundle not present, skipping");
                return BundleOutcome::Missing;
            }
            Err(e) => {
                warn!(bundle = %descriptor.id, error = %e, "Failed to load bundle");
                return BundleOutcome::Failed {
                    tiles_written: 0,
                    error: ExportFailure::Bundle(e),
                };
            }
        };

        let mut tiles_written = 0;
        let mut bytes_written = 0u64;
        let mut created_dir: Option<PathBuf> = None;

        for (slot, tile) in descriptor.slots() {
            let result = match buffer.tile(slot, request.offset_mode) {
                Ok(Some(bytes)) => write_tile(
                    &bytes,
                    &request.output_root,
                    &tile,
                    request.output_row_offset,
                    &mut created_dir,
                ),
                Ok(None) => continue,
                Err(e) => Err(ExportFailure::Bundle(e)),
            };

            match result {
                Ok(written) => {
                    tiles_written += 1;
                    bytes_written += written;
                }
                Err(error) => {
                    warn!(
                        bundle = %descriptor.id,
                        slot,
                        tiles_written,
                        error = %error,
                        "Aborting bundle export"
                    );
                    return BundleOutcome::Failed {
                        tiles_written,
                        error,
                    };
                }
            }
        }

        debug!(bundle = %descriptor.id, tiles_written, bytes_written, "Exported bundle");
        BundleOutcome::Exported {
            tiles_written,
            bytes_written,
        }
    }
}

impl Default for BatchExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one tile, creating its directory when it changes; returns bytes written.
fn write_tile(
    bytes: &[u8],
    output_root: &Path,
    tile: &TileCoord,
    row_offset: i64,
    created_dir: &mut Option<PathBuf>,
) -> Result<u64, ExportFailure> {
    let path = output_tile_path(output_root, tile, row_offset);
    if let Some(dir) = path.parent() {
        if created_dir.as_deref() != Some(dir) {
            fs::create_dir_all(dir).map_err(|source| ExportFailure::Write {
                path: dir.to_path_buf(),
                source,
            })?;
            *created_dir = Some(dir.to_path_buf());
        }
    }

    fs::write(&path, bytes).map_err(|source| ExportFailure::Write { path, source })?;
    Ok(bytes.len() as u64)
}
