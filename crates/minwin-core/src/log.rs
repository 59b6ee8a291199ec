//! File logger for the pump and the CLI.
//!
//! Disabled unless `[log] enabled = true`. Lines go to
//! `~/.config/minwin/logs/minwin.log` (or `[log] dir`), and the file is
//! moved to `minwin.log.1` once it grows past `max_file_mb`.
//!
//! The level threshold lives in an atomic so the `log_*!` macros can
//! skip formatting without taking the lock. `MessagePump::run` polls in a
//! tight loop and logs every dispatch at debug level.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Lowest level that gets written. `OFF` until [`init`] succeeds.
static THRESHOLD: AtomicU8 = AtomicU8::new(OFF);

const OFF: u8 = u8::MAX;
const LOG_FILE_NAME: &str = "minwin.log";
const BACKUP_FILE_NAME: &str = "minwin.log.1";

/// The `[log]` section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub level: Level,
    /// Rotation size. Zero disables rotation.
    pub max_file_mb: u64,
    /// Overrides the log directory.
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: Level::Info,
            max_file_mb: 10,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Case-insensitive. Anything unrecognised means `Info`, so a typo in
    /// the config file never turns logging off.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag().to_ascii_lowercase())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self::parse(&s))
    }
}

/// An open log file plus its rotation bookkeeping.
struct Logger {
    file: File,
    dir: PathBuf,
    max_bytes: u64,
    size: u64,
}

impl Logger {
    fn open(dir: &Path, max_file_mb: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file = append_to(&dir.join(LOG_FILE_NAME))?;
        let size = file.metadata()?.len();
        Ok(Self {
            file,
            dir: dir.to_path_buf(),
            max_bytes: max_file_mb.saturating_mul(1024 * 1024),
            size,
        })
    }

    fn append(&mut self, line: &str) {
        if self.file.write_all(line.as_bytes()).is_err() {
            return;
        }
        self.size += line.len() as u64;
        if self.max_bytes > 0 && self.size >= self.max_bytes {
            self.rotate();
        }
    }

    /// Moves the current file to the backup name and starts a new one.
    /// The previous backup is replaced.
    fn rotate(&mut self) {
        let current = self.dir.join(LOG_FILE_NAME);
        if fs::rename(&current, self.dir.join(BACKUP_FILE_NAME)).is_err() {
            return;
        }
        if let Ok(file) = append_to(&current) {
            self.file = file;
            self.size = 0;
        }
    }
}

fn append_to(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Starts file logging as configured.
///
/// A no-op when logging is disabled, when no log directory can be found,
/// or when a logger is already installed. Failing to open the file is not
/// an error: minwin runs the same without a log.
pub fn init(config: &LogConfig) {
    if !config.enabled {
        return;
    }
    let Some(dir) = config
        .dir
        .clone()
        .or_else(|| crate::config::config_dir().map(|d| d.join("logs")))
    else {
        return;
    };
    let Ok(logger) = Logger::open(&dir, config.max_file_mb) else {
        return;
    };
    if LOGGER.set(Mutex::new(logger)).is_ok() {
        THRESHOLD.store(config.level as u8, Ordering::Relaxed);
    }
}

/// Whether a message at `level` would be written.
pub fn enabled(level: Level) -> bool {
    passes(level, THRESHOLD.load(Ordering::Relaxed))
}

fn passes(level: Level, threshold: u8) -> bool {
    threshold != OFF && level as u8 >= threshold
}

/// Writes one line. Callers normally go through the `log_*!` macros,
/// which check [`enabled`] first.
pub fn write(level: Level, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let Some(Ok(mut logger)) = LOGGER.get().map(|m| m.lock()) else {
        return;
    };
    logger.append(&format_line(&clock(), level, args));
}

fn format_line(now: &str, level: Level, args: fmt::Arguments<'_>) -> String {
    format!("{now} {:<5} {args}\n", level.tag())
}

/// UTC time of day with milliseconds, `HH:MM:SS.mmm`.
fn clock() -> String {
    let since_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let day_secs = since_epoch.as_secs() % 86_400;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        day_secs / 3600,
        day_secs / 60 % 60,
        day_secs % 60,
        since_epoch.subsec_millis()
    )
}

#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {
        if $crate::log::enabled($crate::log::Level::$level) {
            $crate::log::write($crate::log::Level::$level, format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::log_at!(Debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::log_at!(Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::log_at!(Warn, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::log_at!(Error, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("minwin-log-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn level_parse_is_lenient() {
        // Assert
        assert_eq!(Level::parse("DEBUG"), Level::Debug);
        assert_eq!(Level::parse(" warning "), Level::Warn);
        assert_eq!(Level::parse("error"), Level::Error);
        assert_eq!(Level::parse("verbose"), Level::Info);
    }

    #[test]
    fn threshold_filters_lower_levels() {
        // Assert
        assert!(!passes(Level::Debug, Level::Info as u8));
        assert!(passes(Level::Info, Level::Info as u8));
        assert!(passes(Level::Error, Level::Warn as u8));
    }

    #[test]
    fn nothing_passes_when_logging_is_off() {
        // Assert
        assert!(!passes(Level::Error, OFF));
    }

    #[test]
    fn nothing_is_formatted_before_init() {
        // Arrange
        struct Loud;
        impl fmt::Display for Loud {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted while logging is off");
            }
        }

        // Act / Assert
        crate::log_debug!("{}", Loud);
        crate::log_error!("{}", Loud);
    }

    #[test]
    fn config_level_reads_any_case() {
        // Act
        let config: LogConfig = toml::from_str("enabled = true\nlevel = \"Debug\"\n").unwrap();

        // Assert
        assert!(config.enabled);
        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.max_file_mb, 10);
        assert_eq!(config.dir, None);
    }

    #[test]
    fn line_has_time_padded_level_and_message() {
        // Act
        let line = format_line("12:00:00.000", Level::Warn, format_args!("pump {}", "stopped"));

        // Assert
        assert_eq!(line, "12:00:00.000 WARN  pump stopped\n");
    }

    #[test]
    fn logger_rotates_into_a_single_backup() {
        // Arrange
        let dir = temp_dir("rotate");
        let mut logger = Logger::open(&dir, 1).unwrap();
        logger.max_bytes = 16;

        // Act
        logger.append("first line, long enough\n");
        logger.append("second\n");

        // Assert
        let backup = fs::read_to_string(dir.join(BACKUP_FILE_NAME)).unwrap();
        let current = fs::read_to_string(dir.join(LOG_FILE_NAME)).unwrap();
        assert_eq!(backup, "first line, long enough\n");
        assert_eq!(current, "second\n");
        assert_eq!(logger.size, 7);
    }

    #[test]
    fn logger_resumes_size_of_an_existing_file() {
        // Arrange
        let dir = temp_dir("resume");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(LOG_FILE_NAME), "earlier\n").unwrap();

        // Act
        let logger = Logger::open(&dir, 0).unwrap();

        // Assert
        assert_eq!(logger.size, 8);
        assert_eq!(logger.max_bytes, 0);
    }
}
