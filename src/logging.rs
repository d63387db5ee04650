use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{AppError, Result};

const LOG_FILE_NAME: &str = "compat-chat.log";

/// Filter directives used when `RUST_LOG` is not set
fn default_directives(level: &str) -> String {
    format!("{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn", level.trim())
}

fn appender(log_dir: &Path, log_file: Option<&Path>) -> Result<RollingFileAppender> {
    let (dir, name, rotation) = match log_file {
        Some(file) => (
            file.parent().map(Path::to_path_buf).unwrap_or_default(),
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| LOG_FILE_NAME.to_string()),
            Rotation::NEVER,
        ),
        None => (log_dir.to_path_buf(), LOG_FILE_NAME.to_string(), Rotation::DAILY),
    };

    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&dir).map_err(|source| AppError::Write {
            path: dir.clone(),
            source,
        })?;
    }

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(name)
        .build(&dir)
        .map_err(|e| AppError::Config(format!("Cannot open log file in {}: {}", dir.display(), e)))
}

/// Route `tracing` output to a file. The terminal belongs to the UI, so
/// nothing is written to stdout or stderr. Keep the guard alive until exit.
pub fn init_tracing(log_dir: &Path, log_file: Option<&Path>, level: &str) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new(default_directives("info")));

    let (writer, guard) = tracing_appender::non_blocking(appender(log_dir, log_file)?);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(" debug "),
            "debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn"
        );
        assert!(EnvFilter::try_new(default_directives("trace")).is_ok());
    }

    #[test]
    fn test_explicit_log_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("custom").join("chat.log");

        let _appender = appender(dir.path(), Some(&file)).unwrap();

        assert!(dir.path().join("custom").is_dir());
    }

    #[test]
    fn test_daily_log_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");

        let _appender = appender(&logs, None).unwrap();

        assert!(logs.is_dir());
    }
}
