//! ZVF - a small video filter host with temporal analysis filters
//!
//! Filters follow a two-phase activation protocol: on the first call they
//! request the source frames they need, on the second they compute an output
//! frame from them. The host tracks every frame handle it gives out.
//!
//! # Architecture
//!
//! - `frame`: video frames, strided planes, frame properties, tracked handles
//! - `host`: activation context, nodes, argument maps, plugin registry, scheduler
//! - `filter`: the filters (`dotblur`, `rainbowdetect`, `motiondetect`, `uncross`)
//! - `format`: Y4M input and output
//! - `util`: buffers, pixel formats, rationals, timestamps

pub mod error;
pub mod filter;
pub mod format;
pub mod frame;
pub mod host;
pub mod util;

pub use error::{Error, Result};

/// ZVF version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the ZVF library
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of threads used to render frames in parallel
    pub max_threads: Option<usize>,
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
    /// Row alignment, in bytes, of frames allocated by the host
    pub frame_alignment: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_threads: None,
            verbose: false,
            debug: false,
            frame_alignment: host::core::DEFAULT_ALIGNMENT,
        }
    }
}

/// Initialize the ZVF library with the given configuration
///
/// `RUST_LOG` overrides the log level picked from `verbose` and `debug`.
pub fn init(config: Config) -> Result<()> {
    if config.frame_alignment == 0 || !config.frame_alignment.is_power_of_two() {
        return Err(Error::config(format!(
            "Frame alignment must be a power of two, got {}",
            config.frame_alignment
        )));
    }

    if let Some(threads) = config.max_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::config(format!("Failed to initialize thread pool: {}", e)))?;
    }

    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}
