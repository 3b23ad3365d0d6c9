//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Emit stable, metadata-only diagnostic events from core.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and directory.
//! - Logging initialization must not panic.
//! - Re-initialization with a different level or directory is rejected.
//! - Contact field values (names, emails, phones) are never logged.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "contacts";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Logging bootstrap failures.
#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidLogDir(String),
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// A logger with different settings is already running.
    Reconfigure { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidLogDir(message) => write!(f, "{message}"),
            Self::CreateDir { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::Reconfigure { active, requested } => write!(
                f,
                "logging already initialized with `{active}`; refusing to switch to `{requested}`"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Initializes core logging with level and directory.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is empty, relative, or cannot be created.
/// - The logger backend fails to start.
/// - Logging is already active with a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let normalized_level = normalize_level(level)?;
    let normalized_dir = normalize_log_dir(log_dir)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, LoggingError> {
        std::fs::create_dir_all(&normalized_dir).map_err(|source| LoggingError::CreateDir {
            path: normalized_dir.clone(),
            source,
        })?;

        let logger = Logger::try_with_str(normalized_level)
            .map_err(LoggingError::Backend)?
            .log_to_file(
                FileSpec::default()
                    .directory(normalized_dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(LoggingError::Backend)?;

        install_panic_hook_once();

        info!(
            "event=app_start module=core status=ok platform={} build_mode={} version={}",
            std::env::consts::OS,
            build_mode(),
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=core_init module=core status=ok level={} log_dir={}",
            normalized_level,
            normalized_dir.display()
        );

        Ok(LoggingState {
            level: normalized_level,
            log_dir: normalized_dir.clone(),
            _logger: logger,
        })
    })?;

    if state.log_dir != normalized_dir {
        return Err(LoggingError::Reconfigure {
            active: state.log_dir.display().to_string(),
            requested: normalized_dir.display().to_string(),
        });
    }
    if state.level != normalized_level {
        return Err(LoggingError::Reconfigure {
            active: state.level.to_string(),
            requested: normalized_level.to_string(),
        });
    }

    Ok(())
}

/// Returns `(level, log_dir)` when logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::InvalidLogDir(
            "log_dir cannot be empty".to_string(),
        ));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::InvalidLogDir(format!(
            "log_dir must be an absolute path, got `{trimmed}`"
        )));
    }
    Ok(path.to_path_buf())
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Panic payloads may echo contact data; cap and flatten before logging.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
