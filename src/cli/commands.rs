//! Subcommand handlers and settings resolution.

use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use super::args::{Args, ConfigAction};
use crate::config::{default_path as get_config_path, Config, ConfigError, DEFAULT_CONFIG};
use crate::output::{Emitter, OutputError, OutputSettings, DEFAULT_OUTPUT_PATH};
use crate::pipeline::{self, Pipeline, PipelineError, PipelineSettings};
use crate::raster::{RasterOptions, MAX_BORDER, MAX_SCALE};
use crate::watch::{DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};

/// Transcript watched when neither the CLI nor the config names one.
pub const DEFAULT_WATCH_PATH: &str = "shell.txt";

/// Errors surfaced to the user by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Ctrlc(#[from] ctrlc::Error),

    #[error("No QR block found in '{}'", .path.display())]
    NoBlock { path: PathBuf },

    #[error("Config file already exists: {}\nUse 'shell-qr config show' to view current settings.", .path.display())]
    ConfigExists { path: PathBuf },

    #[error("Failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Effective settings after merging CLI args, config file, and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pipeline: PipelineSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Merge settings: CLI args > config file > built-in defaults
    ///
    /// Numeric values are held to the same ranges the CLI enforces; config
    /// values outside them are clamped with a warning.
    pub fn resolve(args: &Args, config: &Config) -> Self {
        let path = args
            .path
            .clone()
            .or_else(|| config.watch.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WATCH_PATH));

        let poll_interval = args
            .interval_ms
            .or(config.watch.interval_ms)
            .map(|ms| {
                clamp_setting("interval_ms", ms, MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS)
            })
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let scan_existing = args.scan_existing || config.watch.scan_existing.unwrap_or(false);

        let mode = args
            .mode
            .map(Into::into)
            .or(config.output.mode)
            .unwrap_or_default();

        let output_path = args
            .output
            .clone()
            .or_else(|| config.output.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let keep_history = args.keep_history || config.output.keep_history.unwrap_or(false);

        let defaults = RasterOptions::default();
        let scale = args
            .scale
            .or(config.raster.scale)
            .map(|s| clamp_setting("scale", s, 1, MAX_SCALE))
            .unwrap_or(defaults.scale);
        let border = args
            .border
            .or(config.raster.border)
            .map(|b| clamp_setting("border", b, 0, MAX_BORDER))
            .unwrap_or(defaults.border);

        Self {
            pipeline: PipelineSettings {
                path,
                poll_interval,
                scan_existing,
            },
            output: OutputSettings {
                mode,
                path: output_path,
                keep_history,
                raster: RasterOptions { scale, border },
            },
        }
    }
}

fn clamp_setting<T: Ord + Copy + Display>(name: &str, value: T, min: T, max: T) -> T {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!(
            "{} = {} is outside {}..={}; using {}",
            name,
            value,
            min,
            max,
            clamped
        );
    }
    clamped
}

/// Load the config file.
///
/// An explicit `--config` path must exist and parse. A broken default config
/// falls back to built-in defaults with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => Config::load_from(path),
        None => match Config::load() {
            Ok(c) => Ok(c),
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Ok(Config::default())
            }
        },
    }
}

/// Watch the transcript until Ctrl+C, emitting every new block.
pub fn run_watch(settings: Settings) -> Result<(), CliError> {
    let stop = Arc::new(AtomicBool::new(false));
    pipeline::setup_ctrlc_handler(stop.clone())?;
    run_watch_until(settings, stop, Emitter::stdout)
}

/// Watch loop with an externally owned stop flag and output sink.
pub fn run_watch_until<W, F>(
    settings: Settings,
    stop: Arc<AtomicBool>,
    make_emitter: F,
) -> Result<(), CliError>
where
    W: Write,
    F: FnOnce(OutputSettings) -> Emitter<W>,
{
    let mode = settings.output.mode;
    let mut pipeline = Pipeline::spawn(settings.pipeline, stop)?;
    let mut emitter = make_emitter(settings.output);

    log::info!("Output mode: {}", mode.name());

    for item in pipeline.by_ref() {
        emitter.emit(&item?)?;
    }

    pipeline.shutdown();
    log::info!("Stopped after {} block(s)", emitter.emitted());
    Ok(())
}

/// Emit the last block currently in the transcript.
pub fn run_extract(settings: Settings) -> Result<(), CliError> {
    let path = settings.pipeline.path;
    let item = pipeline::run_once(&path)?.ok_or(CliError::NoBlock { path })?;
    Emitter::stdout(settings.output).emit(&item)?;
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    settings: &Settings,
    explicit: Option<&Path>,
) -> Result<(), CliError> {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            print!("{}", describe(settings));
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            init_config(&config_path)?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

/// Write the default config to `path`, refusing to overwrite.
pub fn init_config(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::ConfigExists {
            path: path.to_path_buf(),
        });
    }

    let io_err = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(io_err)
}

/// Human-readable summary of the effective settings.
pub fn describe(settings: &Settings) -> String {
    let p = &settings.pipeline;
    let o = &settings.output;
    format!(
        "Current configuration:\n  Watch: {}\n  Interval: {} ms\n  Scan existing: {}\n  Mode: {}\n  Output: {}\n  Keep history: {}\n  Scale: {}\n  Border: {}\n",
        p.path.display(),
        p.poll_interval.as_millis(),
        yes_no(p.scan_existing),
        o.mode.name(),
        o.path.display(),
        yes_no(o.keep_history),
        o.raster.scale,
        o.raster.border,
    )
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}
