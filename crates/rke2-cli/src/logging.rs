use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Where the plugin logs when nothing else is configured.
pub const DEFAULT_LOG_FILE: &str = "/var/log/provider-rke2.log";

/// Logging settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log file; `None` logs to stderr
    pub file: Option<PathBuf>,
    pub verbose: bool,
}

impl LoggingConfig {
    /// `-` selects stderr. Stdout is reserved for the event response.
    pub fn new(file: &Path, verbose: bool) -> Self {
        let file = (file != Path::new("-")).then(|| file.to_path_buf());
        Self { file, verbose }
    }

    fn default_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the level. If the log file cannot be opened the
/// subscriber writes to stderr instead and says so.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_level()))?;

    let mut fallback = None;
    let writer = match &config.file {
        Some(path) => match open_log_file(path) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(e) => {
                fallback = Some((path.clone(), e));
                BoxMakeWriter::new(std::io::stderr)
            }
        },
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(writer)
        .compact();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    if let Some((path, e)) = fallback {
        tracing::warn!(path = %path.display(), error = %e, "Could not open log file, logging to stderr");
    }

    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn dash_means_stderr() {
        let config = LoggingConfig::new(Path::new("-"), false);
        assert_eq!(config.file, None);
        assert_eq!(config.default_level(), "info");
    }

    #[test]
    fn verbose_lowers_level() {
        let config = LoggingConfig::new(Path::new("/tmp/x.log"), true);
        assert_eq!(config.file.as_deref(), Some(Path::new("/tmp/x.log")));
        assert_eq!(config.default_level(), "debug");
    }

    #[test]
    fn log_file_is_created_with_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs/provider.log");

        open_log_file(&path).unwrap();

        assert!(path.is_file());
    }
}
