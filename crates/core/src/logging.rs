//! Centralized logging configuration for the generators.
//!
//! # Architecture
//!
//! - **LogConfig**: Process-wide configuration using atomic operations
//! - **LogLevel**: Hierarchical log levels (Off < Error < Warn < Info < Debug < Trace)
//! - **LogCategory**: Logging categories (Table, Hdl, Persist)
//! - **log()**: Common logging function for all output, to stderr or a log file
//!
//! Logging is off by default. Messages are built lazily, so a disabled
//! category costs one atomic load.
//!
//! # Usage
//!
//! ```rust
//! use sintab_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Table, LogLevel::Debug, || {
//!     format!("Built table with {} entries", 1 << 10)
//! });
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for the stages of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Numeric table construction
    Table,
    /// Module text emission
    Hdl,
    /// Table file output
    Persist,
}

impl LogCategory {
    pub const ALL: [LogCategory; 3] = [LogCategory::Table, LogCategory::Hdl, LogCategory::Persist];

    fn index(self) -> usize {
        match self {
            LogCategory::Table => 0,
            LogCategory::Hdl => 1,
            LogCategory::Persist => 2,
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    /// Applies to every category without its own level
    global_level: AtomicU8,
    /// Per-category overrides, indexed by `LogCategory::index`
    category_levels: [AtomicU8; 3],
    /// Log file; stderr when unset
    log_file: Mutex<Option<File>>,
}

impl LogConfig {
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            category_levels: [
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
            ],
            log_file: Mutex::new(None),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.category_levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// Check if a message should be logged for the given category and level
    ///
    /// A category with its own level uses it; otherwise the global level applies.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    /// Append log output to `path` instead of stderr.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if let Ok(mut slot) = self.log_file.lock() {
            *slot = Some(file);
        }
        Ok(())
    }

    /// Go back to logging on stderr
    pub fn clear_log_file(&self) {
        if let Ok(mut slot) = self.log_file.lock() {
            *slot = None;
        }
    }

    fn write_message(&self, message: &str) {
        if let Ok(mut slot) = self.log_file.lock() {
            if let Some(file) = slot.as_mut() {
                // Fall back to stderr rather than failing the generation run
                if writeln!(file, "{}", message).is_ok() {
                    return;
                }
            }
        }
        eprintln!("{}", message);
    }
}

/// Log a message with the specified category and level
///
/// The message closure only runs when the category is enabled at `level`.
///
/// ```rust
/// use sintab_core::logging::{log, LogCategory, LogLevel};
///
/// log(LogCategory::Persist, LogLevel::Info, || {
///     format!("Wrote {} entries", 256)
/// });
/// ```
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if config.should_log(category, level) {
        let message = format!("[{:?}] {}", category, message_fn());
        config.write_message(&message);
    }
}
