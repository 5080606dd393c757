//! Unit tests for the Vulkan context configuration
//!
//! No GPU needed: only configuration defaults and flag mappings are checked.
//! Context creation itself is covered by the ignored tests under tests/.

use super::*;

// ============================================================================
// CONFIG DEFAULTS
// ============================================================================

#[test]
fn test_context_config_default() {
    let config = ContextConfig::default();
    assert_eq!(config.app_name, "Galaxy3D Application");
    assert_eq!(config.enable_validation, cfg!(debug_assertions));
    assert_eq!(config.debug_severity, DebugSeverity::ErrorsAndWarnings);
    assert_eq!(config.debug_output, DebugOutput::Console);
    assert!(!config.break_on_validation_error);
    assert!(!config.panic_on_error);
    assert!(config.enable_validation_stats);
}

#[test]
fn test_message_filter_shows_everything_by_default() {
    let filter = DebugMessageFilter::default();
    assert!(filter.show_general);
    assert!(filter.show_validation);
    assert!(filter.show_performance);
}

// ============================================================================
// SEVERITY FLAGS
// ============================================================================

#[test]
fn test_severity_errors_only() {
    assert_eq!(
        DebugSeverity::ErrorsOnly.to_vk_flags(),
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
    );
}

#[test]
fn test_severity_errors_and_warnings() {
    let flags = DebugSeverity::ErrorsAndWarnings.to_vk_flags();
    assert!(flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
    assert!(flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
    assert!(!flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO));
}

#[test]
fn test_severity_all_includes_verbose() {
    let flags = DebugSeverity::All.to_vk_flags();
    assert!(flags.contains(
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
    ));
}
