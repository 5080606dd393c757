/// Galaxy3D Engine - process-wide state for the presentation subsystem
///
/// Holds the state that exists exactly once per process: whether the
/// windowing/graphics platform has been initialized, and the global logger.
/// The application entry point owns the init/teardown pair: call
/// `Engine::initialize()` before creating any window or presentation context,
/// and `Engine::shutdown()` after the last one has been dropped.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure
struct EngineState {
    /// Set between `initialize()` and `shutdown()`
    initialized: RwLock<bool>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            initialized: RwLock::new(false),
        }
    }
}

fn state() -> &'static EngineState {
    ENGINE_STATE.get_or_init(EngineState::new)
}

// ===== PUBLIC API =====

/// Process-wide engine state manager
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_present::galaxy3d::Engine;
///
/// Engine::initialize()?;
/// // create the window, the Vulkan context and the swapchain manager...
/// // drop them...
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_present::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Initialize the process-wide state
    ///
    /// Must be called once at application startup, before any window or
    /// presentation context is created.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the engine is already initialized
    /// or its state lock is poisoned.
    pub fn initialize() -> Result<()> {
        let mut initialized = state().initialized.write()
            .map_err(|_| Error::InitializationFailed("Engine state lock poisoned".to_string()))?;

        if *initialized {
            crate::engine_error!("galaxy3d::Engine", "Engine::initialize() called twice");
            return Err(Error::InitializationFailed(
                "Engine already initialized. Call Engine::shutdown() first.".to_string()
            ));
        }

        *initialized = true;
        crate::engine_debug!("galaxy3d::Engine", "Engine initialized");
        Ok(())
    }

    /// Shutdown the process-wide state
    ///
    /// Call after the last window and presentation context have been dropped.
    /// Calling it while not initialized only logs a warning.
    pub fn shutdown() {
        let Ok(mut initialized) = state().initialized.write() else {
            return;
        };

        if !*initialized {
            crate::engine_warn!("galaxy3d::Engine", "Engine::shutdown() called without initialize()");
            return;
        }

        *initialized = false;
        crate::engine_debug!("galaxy3d::Engine", "Engine shut down");
    }

    /// Whether `initialize()` has been called without a matching `shutdown()`
    pub fn is_initialized() -> bool {
        state().initialized.read().map(|guard| *guard).unwrap_or(false)
    }

    /// Fail with `InitializationFailed` unless the engine is initialized
    ///
    /// Used by backends to enforce init-before-use ordering.
    pub fn require_initialized() -> Result<()> {
        if Self::is_initialized() {
            Ok(())
        } else {
            Err(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string()
            ))
        }
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_present::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by the engine_error!, engine_err! and engine_bail! macros.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }

    /// Reset the process-wide state for testing (only available in test builds)
    #[cfg(test)]
    pub(crate) fn reset_for_testing() {
        if let Ok(mut initialized) = state().initialized.write() {
            *initialized = false;
        }
        Self::reset_logger();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
