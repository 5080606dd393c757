//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the
//! engine_err!/engine_bail! error helpers.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use crate::error::{Error, Result};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::present".to_string(),
        message: "swapchain recreated".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_with_file_line() {
    let entry = entry(LogSeverity::Error, Some("swapchain_manager.rs"), Some(42));

    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.source, "galaxy3d::present");
    assert_eq!(entry.file, Some("swapchain_manager.rs"));
    assert_eq!(entry.line, Some(42));
}

#[test]
fn test_log_entry_clone() {
    let entry1 = entry(LogSeverity::Warn, None, None);
    let entry2 = entry1.clone();

    assert_eq!(entry1.severity, entry2.severity);
    assert_eq!(entry1.source, entry2.source);
    assert_eq!(entry1.message, entry2.message);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;

    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        // Just verify it doesn't panic, with and without location
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("test.rs"), Some(7)));
    }
}

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Info, None, None));
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[galaxy3d::present]"));
    assert!(text.ends_with("swapchain recreated"));
}

#[test]
fn test_format_plain_needs_file_and_line() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Warn, Some("test.rs"), None));
    assert!(text.contains("[WARN ]"));
    assert!(!text.contains("test.rs"));
}

#[test]
fn test_format_plain_with_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Error, Some("test.rs"), Some(7)));
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("(test.rs:7)"));
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// ERROR MACRO TESTS
// ============================================================================

#[test]
fn test_engine_err_builds_backend_error() {
    let err = crate::engine_err!("galaxy3d::present", "vkQueueSubmit failed: {}", -4);
    assert_eq!(err, Error::BackendError("vkQueueSubmit failed: -4".to_string()));
}

#[test]
fn test_engine_bail_returns_early() {
    fn bails(flag: bool) -> Result<u32> {
        if flag {
            crate::engine_bail!("galaxy3d::present", "bailing out with {}", flag);
        }
        Ok(1)
    }

    assert_eq!(bails(false), Ok(1));
    assert_eq!(bails(true), Err(Error::BackendError("bailing out with true".to_string())));
}
