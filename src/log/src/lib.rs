use std::io::Write;

use owo_colors::OwoColorize;
use tracing::metadata::LevelFilter;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use strata_config::{Log, LogLevel};

/// Strips ANSI color codes before bytes reach the rolling file sink, since
/// the terminal layer and the file layer share the same event formatter.
struct AnsiStripper<W: Write> {
    inner: W,
}

impl<W: Write> Write for AnsiStripper<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let stripped = strip_ansi_escapes::strip(buf);
        self.inner.write_all(&stripped)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Installs the real subscriber once configuration has been read. Returns
/// the appender's `WorkerGuard`; it must be kept alive for the process
/// lifetime or the background file-writer thread is dropped early.
pub fn configure_logger(config: &Log) -> WorkerGuard {
    let file_appender = AnsiStripper {
        inner: tracing_appender::rolling::daily(&config.file_directory, "strata"),
    };
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
            .with_filter(LevelFilter::from_level(convert_level(config.terminal_level))),
    );

    if config.file_enabled {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .with_filter(LevelFilter::from_level(convert_level(config.file_level))),
            )
            .init();
    } else {
        registry.init();
    }

    guard
}

/// A bare terminal-only subscriber used before configuration has been
/// loaded, so startup failures are still reported with consistent
/// formatting.
pub fn configure_temporary_logger() -> impl tracing::Subscriber {
    tracing_subscriber::fmt()
        .with_ansi(true)
        .with_max_level(Level::INFO)
        .finish()
}

fn convert_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Colors a startup-banner number (chunk counts, elapsed time) with
/// `owo-colors` rather than plain `{}` interpolation.
pub fn highlight(value: impl std::fmt::Display) -> String {
    value.green().to_string()
}
