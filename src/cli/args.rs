//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Mode;
use crate::raster::{MAX_BORDER, MAX_SCALE};
use crate::watch::{MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};

/// Parse and validate module scale (1-64 pixels per cell)
fn parse_scale(s: &str) -> Result<u32, String> {
    let scale: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid scale", s))?;
    if !(1..=MAX_SCALE).contains(&scale) {
        return Err(format!(
            "Scale must be between 1 and {}, got {}",
            MAX_SCALE, scale
        ));
    }
    Ok(scale)
}

/// Parse and validate border width (0-1024 pixels)
fn parse_border(s: &str) -> Result<u32, String> {
    let border: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid border", s))?;
    if border > MAX_BORDER {
        return Err(format!(
            "Border must be between 0 and {}, got {}",
            MAX_BORDER, border
        ));
    }
    Ok(border)
}

/// Parse and validate poll interval (10-60000 ms)
fn parse_interval(s: &str) -> Result<u64, String> {
    let ms: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid interval", s))?;
    if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&ms) {
        return Err(format!(
            "Interval must be between {} and {} ms, got {}",
            MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, ms
        ));
    }
    Ok(ms)
}

/// Watch a terminal transcript and turn QR character grids into images
#[derive(Parser, Debug)]
#[command(name = "shell-qr")]
#[command(version, about = "Extract QR character grids from a terminal transcript", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Watch shell.txt and write qr.png whenever a new block appears
    shell-qr

    # Watch a script(1) transcript, preview blocks in the console
    shell-qr --path session.log --mode preview

    # Bigger image with a quiet zone, one file per block
    shell-qr --scale 8 --border 32 --keep-history

    # Convert the last block once and exit
    shell-qr extract --path session.log -o code.png")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Transcript file to watch (default: shell.txt)
    #[arg(short, long, global = true)]
    pub path: Option<PathBuf>,

    /// Image path for png mode (default: qr.png)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Output mode
    #[arg(short, long, global = true)]
    pub mode: Option<Mode>,

    /// Pixels per grid cell
    #[arg(long, global = true, value_parser = parse_scale)]
    pub scale: Option<u32>,

    /// White border around the image, in pixels
    #[arg(long, global = true, value_parser = parse_border)]
    pub border: Option<u32>,

    /// Poll interval in milliseconds
    #[arg(long, global = true, value_parser = parse_interval)]
    pub interval_ms: Option<u64>,

    /// Check the file once at startup instead of waiting for the first change
    #[arg(long, global = true)]
    pub scan_existing: bool,

    /// Also write <stem>-<fingerprint>.png for every new block
    #[arg(long, global = true)]
    pub keep_history: bool,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Watch the transcript and emit every new block (default)
    Watch,
    /// Emit the last block currently in the transcript and exit
    Extract,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
