/// Device module - backend capability trait and swapchain description types

// Module declarations
pub mod present_device;
pub mod swapchain_desc;
pub mod mock_present_device;

// Re-export everything
pub use present_device::*;
pub use swapchain_desc::*;
