//! Log writer module
//!
//! Installs the global `tracing` subscriber with two sinks: the access log
//! (target [`ACCESS_TARGET`], stdout by default) and the application log
//! (everything else, stderr by default). File sinks are non-blocking; the
//! returned guards flush them on drop.

use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{filter_fn, Directive, EnvFilter, LevelFilter};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::error::StartupError;

/// Event target reserved for access log lines
pub const ACCESS_TARGET: &str = "access";

/// Keeps non-blocking file writers alive
#[must_use = "dropping the guards stops file logging"]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

#[derive(Clone, Copy)]
enum Fallback {
    Stdout,
    Stderr,
}

/// Parse log level from config string
fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "error" => LevelFilter::ERROR,
        "warn" => LevelFilter::WARN,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    }
}

/// Open a non-blocking appender for `path`, creating parent directories
fn make_writer(
    path: Option<&str>,
    fallback: Fallback,
) -> io::Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    let Some(path) = path else {
        let writer = match fallback {
            Fallback::Stdout => BoxMakeWriter::new(io::stdout),
            Fallback::Stderr => BoxMakeWriter::new(io::stderr),
        };
        return Ok((writer, None));
    };

    let path = Path::new(path);
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no file name: {}", path.display()),
        )
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(writer), Some(guard)))
}

/// Initialize the global subscriber
///
/// `RUST_LOG` overrides `level` for the application log.
pub fn init(
    level: &str,
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
) -> Result<LogGuards, StartupError> {
    let (access_writer, access_guard) = make_writer(access_log_file, Fallback::Stdout)?;
    let (app_writer, app_guard) = make_writer(error_log_file, Fallback::Stderr)?;

    let silence_access: Directive = format!("{ACCESS_TARGET}=off")
        .parse()
        .map_err(|e| StartupError::Logging(format!("{e}")))?;
    let app_filter = EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy()
        .add_directive(silence_access);

    let access_layer = tracing_subscriber::fmt::layer()
        .with_writer(access_writer)
        .with_ansi(false)
        .with_level(false)
        .with_target(false)
        .without_time()
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));

    let app_layer = tracing_subscriber::fmt::layer()
        .with_writer(app_writer)
        .with_ansi(error_log_file.is_none())
        .with_target(true)
        .with_filter(app_filter);

    tracing_subscriber::registry()
        .with(access_layer)
        .with(app_layer)
        .try_init()
        .map_err(|e| StartupError::Logging(e.to_string()))?;

    Ok(LogGuards {
        _guards: [access_guard, app_guard].into_iter().flatten().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level("warn"), LevelFilter::WARN);
        assert_eq!(parse_level("error"), LevelFilter::ERROR);
        assert_eq!(parse_level("bogus"), LevelFilter::INFO);
    }

    #[test]
    fn test_off_silences_everything() {
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("OFF"), LevelFilter::OFF);
    }

    #[test]
    fn test_stdout_fallback_has_no_guard() {
        let (_, guard) = make_writer(None, Fallback::Stdout).unwrap();
        assert!(guard.is_none());
    }

    #[test]
    fn test_file_writer_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("landing-log-{}", std::process::id()));
        let path = dir.join("nested").join("access.log");
        let (_, guard) = make_writer(path.to_str(), Fallback::Stdout).unwrap();
        assert!(guard.is_some());
        assert!(dir.join("nested").is_dir());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_path_without_file_name_rejected() {
        assert!(make_writer(Some("/"), Fallback::Stderr).is_err());
    }
}
