//! Polled window state for the render loop
//!
//! The presentation subsystem never receives window callbacks. The
//! application forwards winit [`WindowEvent`]s to a [`WindowState`] and the
//! render loop polls it once per frame: resize pending, minimized, focused,
//! close requested.

use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

/// Window flags accumulated from winit events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    width: u32,
    height: u32,
    should_resize: bool,
    is_focused: bool,
    is_occluded: bool,
    should_close: bool,
}

impl WindowState {
    /// State of a freshly created, focused window of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            should_resize: false,
            is_focused: true,
            is_occluded: false,
            should_close: false,
        }
    }

    /// Snapshot the current size and focus of a winit window
    pub fn from_window(window: &Window) -> Self {
        let size = window.inner_size();
        Self {
            is_focused: window.has_focus(),
            ..Self::new(size.width, size.height)
        }
    }

    /// Update the flags from a window event
    ///
    /// Returns `true` when the event was one the render loop cares about.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                self.resize(*size);
                true
            }
            WindowEvent::Focused(focused) => {
                self.is_focused = *focused;
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.is_occluded = *occluded;
                true
            }
            WindowEvent::CloseRequested => {
                self.should_close = true;
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width != self.width || size.height != self.height {
            self.width = size.width;
            self.height = size.height;
            self.should_resize = true;
            crate::engine_trace!("galaxy3d::window", "Window resized to {}x{}", size.width, size.height);
        }
    }

    /// Current size in physical pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// A resize happened since the last [`take_resize`](Self::take_resize)
    pub fn should_resize(&self) -> bool {
        self.should_resize
    }

    /// Mark the swapchain as needing a rebuild at the current size
    ///
    /// Used when the surface reports out-of-date without a resize event.
    pub fn request_resize(&mut self) {
        self.should_resize = true;
    }

    /// Consume a pending resize, returning the size to rebuild at
    ///
    /// Stays pending while the window is iconified: there is nothing to
    /// build a swapchain for until it comes back.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        if !self.should_resize || self.is_iconified() {
            return None;
        }
        self.should_resize = false;
        Some(self.size())
    }

    /// Zero-sized (minimized) or fully occluded
    pub fn is_iconified(&self) -> bool {
        self.width == 0 || self.height == 0 || self.is_occluded
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
