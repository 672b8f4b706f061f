//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! - [`config`] - Configuration management (show, path, init)
//! - [`export`] - Batch export of bundles to a tile pyramid
//! - [`locate`] - Map a coordinate to its bundle and slot
//! - [`serve`] - HTTP tile server
//! - [`tile`] - Single tile extraction

pub mod common;
pub mod config;
pub mod export;
pub mod locate;
pub mod serve;
pub mod tile;
