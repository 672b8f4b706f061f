//! arcbundle - tile extraction from ArcGIS compact-cache bundles
//!
//! A compact cache stores each 128×128 block of tiles in a pair of files:
//! a `.bundlx` index of 5-byte offsets and a `.bundle` data file of
//! length-prefixed tile records. This library locates, parses and caches
//! those bundles, exports their contents to a plain tile pyramid, and
//! serves single tiles over HTTP.

pub mod bundle;
pub mod cache;
pub mod config;
pub mod coord;
pub mod endpoint;
pub mod export;
pub mod logging;
pub mod server;
