//! Emitting labeled grids as PNG files, console previews, or log lines.

use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;

use crate::pipeline::LabeledBlock;
use crate::raster::{self, RasterError, RasterOptions};

/// Default image written in PNG mode.
pub const DEFAULT_OUTPUT_PATH: &str = "qr.png";

/// Errors that can occur while emitting a grid.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("Failed to write preview: {0}")]
    Preview(#[from] std::io::Error),
}

/// What to do with each labeled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Write a PNG image
    #[default]
    Png,
    /// Print block symbols to the console
    Preview,
    /// Log grid statistics only
    Log,
}

impl OutputMode {
    pub fn name(&self) -> &'static str {
        match self {
            OutputMode::Png => "png",
            OutputMode::Preview => "preview",
            OutputMode::Log => "log",
        }
    }
}

/// Resolved output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub mode: OutputMode,
    /// Image path for PNG mode
    pub path: PathBuf,
    /// Also keep a copy of every image named after the block fingerprint
    pub keep_history: bool,
    pub raster: RasterOptions,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            keep_history: false,
            raster: RasterOptions::default(),
        }
    }
}

/// Writes each labeled grid according to [`OutputSettings`].
pub struct Emitter<W: Write> {
    settings: OutputSettings,
    out: W,
    emitted: usize,
}

impl Emitter<std::io::Stdout> {
    pub fn stdout(settings: OutputSettings) -> Self {
        Self::new(settings, std::io::stdout())
    }
}

impl<W: Write> Emitter<W> {
    pub fn new(settings: OutputSettings, out: W) -> Self {
        Self {
            settings,
            out,
            emitted: 0,
        }
    }

    /// Number of grids emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn emit(&mut self, item: &LabeledBlock) -> Result<(), OutputError> {
        let fingerprint = item.block.fingerprint();
        let counts = item.grid.counts();

        match self.settings.mode {
            OutputMode::Png => {
                let img = raster::render(&item.grid, &self.settings.raster)?;
                raster::save_png(&img, &self.settings.path)?;
                if self.settings.keep_history {
                    let history = raster::history_path(&self.settings.path, &fingerprint);
                    raster::save_png(&img, &history)?;
                }
                log::info!(
                    "Wrote {} ({}x{} px) for block {}",
                    self.settings.path.display(),
                    img.width(),
                    img.height(),
                    fingerprint
                );
            }
            OutputMode::Preview => {
                writeln!(self.out, "{}", item.grid.to_symbols())?;
                writeln!(self.out)?;
                self.out.flush()?;
                log::info!(
                    "Previewed block {} ({}x{})",
                    fingerprint,
                    item.grid.width(),
                    item.grid.height()
                );
            }
            OutputMode::Log => {
                log::info!(
                    "Block {}: {}x{} cells, {} black, {} white, {} unknown",
                    fingerprint,
                    item.grid.width(),
                    item.grid.height(),
                    counts.black,
                    counts.white,
                    counts.unknown
                );
            }
        }

        if counts.unknown > 0 {
            log::warn!(
                "Block {} has {} cell(s) matching neither reference character",
                fingerprint,
                counts.unknown
            );
        }

        self.emitted += 1;
        Ok(())
    }
}
