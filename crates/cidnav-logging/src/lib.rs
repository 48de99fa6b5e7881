//! Logging for the cidnav content browser
//!
//! Two separate concerns live here:
//!
//! - **Activity log** ([`ActivityLog`]): the human-readable, timestamped
//!   trail shown to the user (`00:00:01:25 - Fetched content for CID: ...`).
//! - **Diagnostics** ([`SubscriberBuilder`]): `tracing` subscriber setup for
//!   developer-facing structured logs, with console and optional rolling file
//!   output.
//!
//! # Quick Start
//!
//! ```ignore
//! use cidnav_logging::{LogConfig, SubscriberBuilder};
//!
//! // Compact console output at `info`, overridable with RUST_LOG
//! let _guard = SubscriberBuilder::new().try_init()?;
//!
//! // Development mode with pretty human-readable output
//! let _guard = SubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .try_init()?;
//! ```

pub mod activity;
pub mod capture;
pub mod config;

pub use activity::{format_elapsed, ActivityLog, LogEntry, LogSink, SinkId};
pub use capture::LogCapture;
pub use config::{ConsoleConfig, ConsoleFormat, FileConfig, LogConfig, RotationStrategy};

use std::fs::{self, File};

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Errors raised while setting up diagnostics
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Log file error: {0}")]
    File(#[from] std::io::Error),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(String),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Builder for configuring and initializing the tracing subscriber
///
/// By default, console output uses the compact single-line format. Use
/// `LogConfig::development()` for pretty output or `ConsoleFormat::Json` for
/// machine-readable lines.
#[derive(Debug, Clone, Default)]
pub struct SubscriberBuilder {
    config: LogConfig,
}

impl SubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Set the console line format
    pub fn with_console_format(mut self, format: ConsoleFormat) -> Self {
        self.config.console.format = format;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Build a subscriber writing to stdout (and the configured file)
    ///
    /// The returned guard must be kept alive while file output is wanted.
    pub fn build(
        self,
    ) -> Result<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>), LoggingError> {
        let filter = self.env_filter()?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.config.console.enabled {
            layers.push(self.console_layer(std::io::stdout));
        }

        let guard = match &self.config.file {
            Some(file_config) => {
                let (writer, guard) = file_writer(file_config)?;
                layers.push(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(true)
                        .with_writer(writer)
                        .boxed(),
                );
                Some(guard)
            }
            None => None,
        };

        Ok((Registry::default().with(layers).with(filter), guard))
    }

    /// Build a subscriber whose console output goes to `writer`
    ///
    /// File output is ignored. Useful with [`LogCapture`] and
    /// `tracing::subscriber::with_default`.
    pub fn build_with_writer<W>(
        self,
        writer: W,
    ) -> Result<impl Subscriber + Send + Sync + 'static, LoggingError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let filter = self.env_filter()?;
        let layer = self.console_layer(writer);
        Ok(Registry::default().with(layer).with(filter))
    }

    /// Initialize the subscriber globally
    ///
    /// Fails instead of panicking if a global subscriber is already set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let (subscriber, guard) = self.build()?;
        subscriber
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
        Ok(guard)
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.config.default_level)
                .map_err(|e| LoggingError::Filter(e.to_string())),
        }
    }

    fn console_layer<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let ansi = self.config.console.ansi;
        match self.config.console.format {
            ConsoleFormat::Pretty => fmt::layer()
                .pretty()
                .with_ansi(ansi)
                .with_writer(writer)
                .boxed(),
            ConsoleFormat::Compact => fmt::layer()
                .compact()
                .with_ansi(ansi)
                .with_target(true)
                .with_writer(writer)
                .boxed(),
            ConsoleFormat::Json => fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_writer(writer)
                .boxed(),
        }
    }
}

/// Create a non-blocking file writer; `Never` truncates a single file
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;
    let pair = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            tracing_appender::non_blocking(File::create(path)?)
        }
        RotationStrategy::Daily => tracing_appender::non_blocking(RollingFileAppender::new(
            Rotation::DAILY,
            &config.directory,
            &config.prefix,
        )),
        RotationStrategy::Hourly => tracing_appender::non_blocking(RollingFileAppender::new(
            Rotation::HOURLY,
            &config.directory,
            &config.prefix,
        )),
    };
    Ok(pair)
}
