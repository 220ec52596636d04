//! shell-qr library crate.
//!
//! Watches a terminal transcript for QR character grids and turns them into
//! black/white images. Modules are exposed for the binary and for
//! integration testing.

pub mod block;
pub mod cli;
pub mod config;
pub mod grid;
pub mod output;
pub mod pipeline;
pub mod raster;
pub mod watch;
