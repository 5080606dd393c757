//! Unit tests for Engine process-wide state
//!
//! IMPORTANT: ENGINE_STATE and LOGGER are globals shared across all tests.
//! All tests are marked with #[serial] to run sequentially.

use crate::galaxy3d::{Engine, Error};
use crate::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
pub(crate) struct CaptureLogger {
    pub(crate) entries: Arc<Mutex<Vec<(LogSeverity, String)>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push((entry.severity, entry.message.clone()));
    }
}

fn setup() {
    Engine::reset_for_testing();
}

// ============================================================================
// INITIALIZATION AND SHUTDOWN TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_initialize_then_shutdown() {
    setup();
    assert!(!Engine::is_initialized());

    Engine::initialize().unwrap();
    assert!(Engine::is_initialized());
    assert!(Engine::require_initialized().is_ok());

    Engine::shutdown();
    assert!(!Engine::is_initialized());
}

#[test]
#[serial]
fn test_engine_double_initialize_fails() {
    setup();
    Engine::initialize().unwrap();

    let result = Engine::initialize();
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    // Still initialized after the failed second call
    assert!(Engine::is_initialized());

    Engine::shutdown();
}

#[test]
#[serial]
fn test_engine_require_initialized_before_init() {
    setup();
    let result = Engine::require_initialized();
    match result {
        Err(Error::InitializationFailed(msg)) => assert!(msg.contains("Engine::initialize()")),
        other => panic!("expected InitializationFailed, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_engine_shutdown_without_initialize_warns() {
    setup();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: Arc::clone(&entries) });

    Engine::shutdown();

    let warned = entries.lock().unwrap().iter().any(|(severity, message)| {
        *severity == LogSeverity::Warn && message.contains("without initialize()")
    });
    Engine::reset_logger();
    assert!(warned);
}

#[test]
#[serial]
fn test_engine_reinitialize_after_shutdown() {
    setup();
    Engine::initialize().unwrap();
    Engine::shutdown();
    assert!(Engine::initialize().is_ok());
    Engine::shutdown();
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_macro_output() {
    setup();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: Arc::clone(&entries) });

    crate::engine_info!("galaxy3d::present", "Swapchain created: {} images", 3);
    crate::engine_error!("galaxy3d::present", "Present failed");

    Engine::reset_logger();
    crate::engine_info!("galaxy3d::present", "goes to the default logger");

    // Other tests may log concurrently, so look for our entries only
    let entries = entries.lock().unwrap();
    assert!(entries.contains(&(LogSeverity::Info, "Swapchain created: 3 images".to_string())));
    assert!(entries.contains(&(LogSeverity::Error, "Present failed".to_string())));
    assert!(!entries.iter().any(|(_, message)| message == "goes to the default logger"));
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    setup();
    struct LocationLogger {
        seen: Arc<Mutex<Option<(Option<&'static str>, Option<u32>)>>>,
    }
    impl Logger for LocationLogger {
        fn log(&self, entry: &LogEntry) {
            *self.seen.lock().unwrap() = Some((entry.file, entry.line));
        }
    }

    let seen = Arc::new(Mutex::new(None));
    Engine::set_logger(LocationLogger { seen: Arc::clone(&seen) });
    Engine::log_detailed(LogSeverity::Error, "test-location", "boom".to_string(), "file.rs", 99);
    Engine::reset_logger();

    assert!(seen.lock().unwrap().is_some());
}
