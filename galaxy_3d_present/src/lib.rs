/*!
# Galaxy 3D Present

Platform-agnostic swapchain lifecycle management for the Galaxy 3D engine.

This crate owns everything that happens between "give me an image to draw
into" and "show it on screen": acquiring drawable images, tracking the
semaphores that protect them, presenting, and destroying surface-owned
resources once no in-flight frame can still reference them. Backends
(Vulkan, ...) plug in by implementing [`PresentDevice`](galaxy3d::present::PresentDevice).

## Architecture

- **SwapchainManager**: State machine driving acquire / present / recreate / cancel
- **SemaphoreManager**: Per-image semaphore pairs, idle pool, expired quarantine
- **DeletionQueue**: Generation ring delaying destruction by N presented frames
- **PresentDevice**: Trait implemented by graphics backends
- **WindowState**: Polled window flags fed from winit events

Process-wide state (init/teardown ordering, logger) lives in
[`Engine`](galaxy3d::Engine).
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod device;
pub mod presentation;
pub mod utils;
pub mod window;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, ResourceKind, Result};

    // Process-wide engine state
    pub use crate::engine::Engine;

    // Swapchain state machine
    pub use crate::presentation::SwapchainManager;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are exported at the crate root by #[macro_export]
    }

    // Device sub-module: backend trait and swapchain description types
    pub mod render {
        pub use crate::device::*;
    }

    // Presentation sub-module: managers, status and frame types
    pub mod present {
        pub use crate::device::{PresentDevice, SurfaceError, SurfaceResult};
        pub use crate::presentation::*;
    }

    // Window sub-module
    pub mod window {
        pub use crate::window::*;
    }
}
