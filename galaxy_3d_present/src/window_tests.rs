//! Unit tests for WindowState
//!
//! Feeds synthetic winit events, no window or event loop needed.

use super::*;

#[test]
fn test_new_state() {
    let state = WindowState::new(1280, 720);
    assert_eq!(state.size(), (1280, 720));
    assert!(!state.should_resize());
    assert!(state.is_focused());
    assert!(!state.is_iconified());
    assert!(!state.should_close());
}

// ============================================================================
// RESIZE TESTS
// ============================================================================

#[test]
fn test_resize_event_sets_flag_once() {
    let mut state = WindowState::new(1280, 720);
    assert!(state.handle_event(&WindowEvent::Resized(PhysicalSize::new(1920, 1080))));

    assert!(state.should_resize());
    assert_eq!(state.take_resize(), Some((1920, 1080)));
    assert!(!state.should_resize());
    assert_eq!(state.take_resize(), None);
}

#[test]
fn test_resize_to_same_size_is_ignored() {
    let mut state = WindowState::new(800, 600);
    state.handle_event(&WindowEvent::Resized(PhysicalSize::new(800, 600)));
    assert!(!state.should_resize());
}

#[test]
fn test_minimized_window_keeps_resize_pending() {
    let mut state = WindowState::new(800, 600);
    state.handle_event(&WindowEvent::Resized(PhysicalSize::new(0, 0)));

    assert!(state.is_iconified());
    assert_eq!(state.take_resize(), None);
    assert!(state.should_resize());

    state.handle_event(&WindowEvent::Resized(PhysicalSize::new(800, 600)));
    assert!(!state.is_iconified());
    assert_eq!(state.take_resize(), Some((800, 600)));
}

#[test]
fn test_request_resize() {
    let mut state = WindowState::new(640, 480);
    state.request_resize();
    assert_eq!(state.take_resize(), Some((640, 480)));
}

// ============================================================================
// FOCUS / OCCLUSION / CLOSE TESTS
// ============================================================================

#[test]
fn test_focus_events() {
    let mut state = WindowState::new(640, 480);
    assert!(state.handle_event(&WindowEvent::Focused(false)));
    assert!(!state.is_focused());
    state.handle_event(&WindowEvent::Focused(true));
    assert!(state.is_focused());
}

#[test]
fn test_occluded_window_is_iconified() {
    let mut state = WindowState::new(640, 480);
    state.handle_event(&WindowEvent::Occluded(true));
    assert!(state.is_iconified());
    state.handle_event(&WindowEvent::Occluded(false));
    assert!(!state.is_iconified());
}

#[test]
fn test_close_requested() {
    let mut state = WindowState::new(640, 480);
    assert!(state.handle_event(&WindowEvent::CloseRequested));
    assert!(state.should_close());
}

#[test]
fn test_unrelated_event_is_not_handled() {
    let mut state = WindowState::new(640, 480);
    let before = state;
    assert!(!state.handle_event(&WindowEvent::Destroyed));
    assert_eq!(state, before);
}
