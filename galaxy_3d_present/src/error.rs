//! Error types for the Galaxy3D presentation subsystem
//!
//! This module defines the error types returned by the swapchain manager,
//! its semaphore and deletion helpers, and the backends that implement
//! [`PresentDevice`](crate::device::PresentDevice).

use std::fmt;

/// Result type for Galaxy3D presentation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of GPU object whose creation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Querying surface capabilities, formats or present modes
    SurfaceSupport,
    /// Creating the swapchain object itself
    Swapchain,
    /// Retrieving the swapchain images
    SwapchainImages,
    /// Creating the swapchain image views
    ImageViews,
    /// Creating a binary semaphore
    Semaphore,
    /// Creating a framebuffer
    Framebuffer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::SurfaceSupport => "surface support details",
            ResourceKind::Swapchain => "swapchain",
            ResourceKind::SwapchainImages => "swapchain images",
            ResourceKind::ImageViews => "swapchain image views",
            ResourceKind::Semaphore => "semaphore",
            ResourceKind::Framebuffer => "framebuffer",
        };
        write!(f, "{}", name)
    }
}

/// Galaxy3D presentation errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The surface no longer matches the window, the swapchain must be recreated
    SurfaceOutOfDate,

    /// The platform surface was lost, the whole presentation context must be rebuilt
    SurfaceLost,

    /// The caller violated the swapchain state machine (e.g. present before acquire)
    SequenceError(String),

    /// The driver failed to acquire the next image
    AcquireFailed(String),

    /// The driver failed to present the image
    PresentFailed(String),

    /// Creating a GPU object during construction or recreation failed
    ResourceCreationFailed {
        kind: ResourceKind,
        message: String,
    },

    /// Backend-specific error (Vulkan, etc.)
    BackendError(String),

    /// Initialization failed (context, device, subsystems)
    InitializationFailed(String),
}

impl Error {
    /// Shorthand for building a [`Error::ResourceCreationFailed`]
    pub fn creation_failed(kind: ResourceKind, message: impl Into<String>) -> Self {
        Error::ResourceCreationFailed { kind, message: message.into() }
    }

    /// Whether the caller should recreate the swapchain and carry on
    pub fn is_out_of_date(&self) -> bool {
        matches!(self, Error::SurfaceOutOfDate)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SurfaceOutOfDate => write!(f, "Swapchain out of date"),
            Error::SurfaceLost => write!(f, "Surface lost"),
            Error::SequenceError(msg) => write!(f, "Invalid call sequence: {}", msg),
            Error::AcquireFailed(msg) => write!(f, "Failed to acquire next image: {}", msg),
            Error::PresentFailed(msg) => write!(f, "Failed to present image: {}", msg),
            Error::ResourceCreationFailed { kind, message } => {
                write!(f, "Failed to create {}: {}", kind, message)
            }
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
