//! Request, outcome and error types for batch export.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::bundle::{BundleDescriptor, BundleError, OffsetMode};
use crate::coord::{CoordError, MAX_ZOOM};

/// Row shift applied to exported filenames unless overridden.
pub const DEFAULT_ROW_OFFSET: i64 = -1;

/// Parameters of one export run.
///
/// Corners are `(latitude, longitude)` pairs in degrees and may be given
/// in any order; the box between them is covered at every level in
/// `min_level..=max_level`.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub corner_a: (f64, f64),
    pub corner_b: (f64, f64),
    pub min_level: u8,
    pub max_level: u8,
    /// Size of the worker pool.
    pub workers: usize,
    pub offset_mode: OffsetMode,
    /// Added to the row before it is formatted into the output filename.
    pub output_row_offset: i64,
}

impl ExportRequest {
    /// Create a request with default workers, offset mode and row offset.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        corner_a: (f64, f64),
        corner_b: (f64, f64),
        min_level: u8,
        max_level: u8,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            corner_a,
            corner_b,
            min_level,
            max_level,
            workers: default_workers(),
            offset_mode: OffsetMode::default(),
            output_row_offset: DEFAULT_ROW_OFFSET,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_offset_mode(mut self, mode: OffsetMode) -> Self {
        self.offset_mode = mode;
        self
    }

    pub fn with_row_offset(mut self, row_offset: i64) -> Self {
        self.output_row_offset = row_offset;
        self
    }

    /// Check level range and worker count. Coordinates are checked per
    /// level during planning.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.min_level > self.max_level || self.max_level > MAX_ZOOM {
            return Err(ExportError::InvalidLevels {
                min: self.min_level,
                max: self.max_level,
            });
        }
        if self.workers == 0 {
            return Err(ExportError::InvalidWorkers);
        }
        Ok(())
    }
}

/// Number of CPUs, or 1 if it cannot be determined.
pub(crate) fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Errors that stop an export before any bundle is processed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export area: {0}")]
    Coord(#[from] CoordError),

    #[error("invalid level range {min}..={max} (levels must be ascending and at most {})", MAX_ZOOM)]
    InvalidLevels { min: u8, max: u8 },

    #[error("worker count must be at least 1")]
    InvalidWorkers,

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to create output directory {}: {}", .path.display(), .source)]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single bundle stopped exporting.
#[derive(Debug, Error)]
pub enum ExportFailure {
    /// The bundle could not be read, or one of its records is corrupt.
    #[error("{0}")]
    Bundle(#[source] BundleError),

    /// Writing a tile or creating its directory failed.
    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of exporting one bundle.
#[derive(Debug)]
pub enum BundleOutcome {
    /// Every non-empty slot was written.
    Exported {
        tiles_written: usize,
        bytes_written: u64,
    },
    /// One or both bundle files do not exist.
    Missing,
    /// The bundle stopped at the first error; tiles before it were written.
    Failed {
        tiles_written: usize,
        error: ExportFailure,
    },
}

/// Totals over an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub bundles_total: usize,
    pub bundles_exported: usize,
    pub bundles_missing: usize,
    pub bundles_failed: usize,
    pub tiles_written: usize,
    pub bytes_written: u64,
    pub duration: Duration,
}

impl ExportSummary {
    /// Fold one bundle outcome into the totals.
    pub fn record(&mut self, outcome: &BundleOutcome) {
        self.bundles_total += 1;
        match outcome {
            BundleOutcome::Exported {
                tiles_written,
                bytes_written,
            } => {
                self.bundles_exported += 1;
                self.tiles_written += tiles_written;
                self.bytes_written += bytes_written;
            }
            BundleOutcome::Missing => self.bundles_missing += 1,
            BundleOutcome::Failed { tiles_written, .. } => {
                self.bundles_failed += 1;
                self.tiles_written += tiles_written;
            }
        }
    }

    /// True when no bundle failed.
    pub fn is_clean(&self) -> bool {
        self.bundles_failed == 0
    }
}

/// Progress callbacks for an export run.
///
/// `bundle_finished` is called from worker threads in completion order.
pub trait ExportObserver: Send + Sync {
    fn export_started(&self, _bundles: usize) {}

    fn bundle_finished(&self, _descriptor: &BundleDescriptor, _outcome: &BundleOutcome) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {}
