//! Logger built on `tracing-subscriber`
//!
//! - Console output with color control
//! - File output in full, compact or JSON format
//! - Size-based rotation with retention and optional gzip
//! - Level changes at runtime through [`LogLevelHandle`]

pub mod compression;
pub mod config;
pub mod error;
pub mod rotation;
pub(crate) mod writer;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, reload};

use writer::RotatingFileWriter;

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Swaps the active level filter of the installed subscriber.
#[derive(Clone)]
pub struct LogLevelHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelHandle {
    /// Replace the filter with a level name or directive such as `nudge_rs=debug`.
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = config::build_filter(level)?;
        self.inner
            .reload(filter)
            .map_err(|e| LoggerError::subscriber(e.to_string()))?;
        tracing::info!(level = %level, "Log level changed");
        Ok(())
    }

    pub fn current(&self) -> Option<String> {
        self.inner.with_current(|filter| filter.to_string()).ok()
    }
}

/// Install the global subscriber for `config`.
pub fn init_logger(config: LoggerConfig) -> Result<LogLevelHandle, LoggerError> {
    let (filter, handle, layers) = build_layers(&config)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggerError::subscriber(e.to_string()))?;

    Ok(LogLevelHandle { inner: handle })
}

fn build_layers(
    config: &LoggerConfig,
) -> Result<
    (
        reload::Layer<EnvFilter, Registry>,
        reload::Handle<EnvFilter, Registry>,
        Vec<BoxedLayer>,
    ),
    LoggerError,
> {
    config.validate()?;
    let (filter, handle) = reload::Layer::new(config.filter()?);

    // File layer goes first so console ANSI settings do not leak into span fields
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        let use_ansi = config.console.colored && std::io::stdout().is_terminal();
        layers.push(
            fmt::layer()
                .with_ansi(use_ansi)
                .with_target(true)
                .with_level(true)
                .boxed(),
        );
    }

    Ok((filter, handle, layers))
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    let writer = RotatingFileWriter::new(config)?;
    let base = fmt::layer().with_ansi(false).with_target(true);

    Ok(match config.format {
        LogFormat::Full => base.with_writer(writer).boxed(),
        LogFormat::Compact => base.compact().with_writer(writer).boxed(),
        LogFormat::Json => base.json().with_writer(writer).boxed(),
    })
}
