/// Presentation module - swapchain state machine and its helpers

// Module declarations
pub mod config;
pub mod deletion_queue;
pub mod semaphore_manager;
pub mod swapchain_manager;
pub mod swapchain_types;

// Re-export everything
pub use config::*;
pub use deletion_queue::*;
pub use semaphore_manager::*;
pub use swapchain_manager::*;
pub use swapchain_types::*;

/// Number of frames the host may have submitted without waiting
///
/// Also the number of acquires semaphores stay quarantined after a recreate.
pub const FRAMES_IN_FLIGHT: usize = 2;

/// Upper bound on swapchain image count (and deletion queue depth)
pub const MAX_SWAPCHAIN_IMAGE_COUNT: usize = 8;
