//! Process logging bootstrap for the ETL commands.
//!
//! Records go to stderr by default so stdout stays clean for JSON output.
//! A log directory switches to size-rotated files. The first successful
//! init wins; later calls must ask for the same level and target.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "fitcoach";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Directory(PathBuf),
}

impl LogTarget {
    /// Resolves an optional `--log-dir` value. The directory must be absolute.
    pub fn from_option(log_dir: Option<&str>) -> Result<Self, String> {
        let Some(raw) = log_dir else {
            return Ok(Self::Stderr);
        };
        let dir = PathBuf::from(raw.trim());
        if dir.as_os_str().is_empty() {
            return Err("log directory is empty".to_string());
        }
        if dir.is_relative() {
            return Err(format!("log directory `{}` is not absolute", dir.display()));
        }
        Ok(Self::Directory(dir))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

struct ActiveLogger {
    level: LevelFilter,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts the process logger.
///
/// # Errors
/// Unknown level names, a bad `log_dir`, a backend start failure, or a
/// second call that disagrees with the active level or target.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let level = parse_level(level)?;
    let target = LogTarget::from_option(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| -> Result<ActiveLogger, String> {
        let handle = start(level, &target)?;
        info!(
            "event=logging_init module=core status=ok level={} target={} version={}",
            level,
            target,
            env!("CARGO_PKG_VERSION")
        );
        Ok(ActiveLogger {
            level,
            target: target.clone(),
            _handle: handle,
        })
    })?;

    if active.level != level || active.target != target {
        return Err(format!(
            "logging is already active at {} -> {}; cannot switch to {} -> {}",
            active.level, active.target, level, target
        ));
    }
    Ok(())
}

/// Returns the active `(level, target)`, lowercase level name.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    ACTIVE
        .get()
        .map(|active| (level_name(active.level), active.target.clone()))
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    let trimmed = raw.trim();
    let candidate = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };
    match LevelFilter::from_str(candidate) {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{trimmed}`; expected trace|debug|info|warn|error"
        )),
        Ok(level) => Ok(level),
    }
}

fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

fn start(level: LevelFilter, target: &LogTarget) -> Result<LoggerHandle, String> {
    let logger = Logger::try_with_str(level_name(level)).map_err(|err| err.to_string())?;
    let logger = match target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| format!("cannot create `{}`: {err}", dir.display()))?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };
    logger
        .start()
        .map_err(|err| format!("logger failed to start: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, parse_level, LogTarget};
    use log::LevelFilter;

    #[test]
    fn level_names_are_case_insensitive_and_accept_warning() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert!(parse_level("off").is_err());
        assert!(parse_level("verbose").unwrap_err().contains("unsupported"));
    }

    #[test]
    fn log_target_requires_absolute_directory() {
        assert_eq!(LogTarget::from_option(None).unwrap(), LogTarget::Stderr);
        assert!(LogTarget::from_option(Some("logs/dev"))
            .unwrap_err()
            .contains("not absolute"));
        assert!(LogTarget::from_option(Some("  ")).unwrap_err().contains("empty"));
    }

    #[test]
    fn second_init_must_match_the_first() {
        let log_dir = tempfile::tempdir().unwrap();
        let dir = log_dir.path().to_str().unwrap().to_string();

        init_logging("info", Some(&dir)).unwrap();
        init_logging("INFO", Some(&dir)).unwrap();
        assert!(init_logging("debug", Some(&dir))
            .unwrap_err()
            .contains("cannot switch"));
        assert!(init_logging("info", None).unwrap_err().contains("cannot switch"));

        assert_eq!(
            logging_status(),
            Some(("info", LogTarget::Directory(log_dir.path().to_path_buf())))
        );
    }
}
