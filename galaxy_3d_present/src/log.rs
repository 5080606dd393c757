//! Logging for the presentation subsystem
//!
//! Every message goes through the process-wide [`Logger`] held by
//! [`Engine`](crate::galaxy3d::Engine). The `engine_*!` macros are the only
//! entry points the managers and backends use; `engine_err!` and
//! `engine_bail!` also turn the message into an `Error::BackendError`.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Destination of every log entry
///
/// Installed with `Engine::set_logger`. Tests use it to capture what the
/// swapchain manager reports.
///
/// # Example
///
/// ```no_run
/// use std::sync::Mutex;
/// use galaxy_3d_present::galaxy3d::log::{Logger, LogEntry, LogSeverity};
///
/// struct DroppedFrameCounter(Mutex<u32>);
///
/// impl Logger for DroppedFrameCounter {
///     fn log(&self, entry: &LogEntry) {
///         if entry.severity == LogSeverity::Warn && entry.message.contains("dropping frame") {
///             *self.0.lock().unwrap() += 1;
///         }
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One logged message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,

    /// Subsystem tag, "galaxy3d::present" or "galaxy3d::vulkan"
    pub source: String,

    pub message: String,

    /// Set by `engine_error!` / `engine_err!` only
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-frame chatter (acquired index, semaphore recycling)
    Trace,
    /// State transitions and resource bookkeeping
    Debug,
    /// Swapchain created or recreated
    Info,
    /// Recoverable problems (dropped frames, suboptimal surfaces)
    Warn,
    /// Sequence violations, lost surfaces, failed builds
    Error,
}

impl LogSeverity {
    /// Fixed-width label used in the output
    fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Console logger: `[timestamp] [SEVERITY] [source] message (file:line)`
pub struct DefaultLogger;

impl DefaultLogger {
    /// Render an entry the way it is printed, without colors
    pub fn format_plain(entry: &LogEntry) -> String {
        Self::render(entry, entry.severity.label().to_string(), entry.source.clone())
    }

    fn render(entry: &LogEntry, severity: String, source: String) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");
        let mut line = format!("[{}] [{}] [{}] {}", timestamp, severity, source, entry.message);
        if let (Some(file), Some(number)) = (entry.file, entry.line) {
            line.push_str(&format!(" ({}:{})", file, number));
        }
        line
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let label = entry.severity.label();
        let severity = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };
        println!("{}", Self::render(entry, severity.to_string(), entry.source.bright_blue().to_string()));
    }
}

// ===== LOGGING MACROS =====

/// Log at TRACE
///
/// # Example
///
/// ```no_run
/// galaxy_3d_present::engine_trace!("galaxy3d::present", "Acquired image {}", 2);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at DEBUG
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at INFO
///
/// # Example
///
/// ```no_run
/// galaxy_3d_present::engine_info!("galaxy3d::present", "Swapchain recreated: {}x{}", 800, 600);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at WARN
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at ERROR, with the caller's file:line
///
/// # Example
///
/// ```no_run
/// galaxy_3d_present::engine_error!("galaxy3d::present", "Failed to present: {}", "ERROR_DEVICE_LOST");
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log_detailed(
            $crate::galaxy3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR message and build an `Error::BackendError` with the same text
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_present::galaxy3d::Error;
/// let err: Error = galaxy_3d_present::engine_err!("galaxy3d::vulkan", "vkQueueSubmit failed: {}", -4);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::galaxy3d::Engine::log_detailed(
            $crate::galaxy3d::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return early with an `Error::BackendError`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
