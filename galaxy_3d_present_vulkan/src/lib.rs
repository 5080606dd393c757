/*!
# Galaxy 3D Present - Vulkan Backend

Vulkan implementation of the Galaxy 3D presentation subsystem.

This crate bootstraps a Vulkan instance, surface and logical device from a
window ([`VulkanContext`](galaxy3d::VulkanContext)) and implements the
[`PresentDevice`](galaxy_3d_present::galaxy3d::present::PresentDevice) trait
on top of it ([`VulkanPresentDevice`](galaxy3d::VulkanPresentDevice)), using
the Ash library for Vulkan bindings.

Swapchain lifetime, semaphores and deferred destruction are handled by
`SwapchainManager<VulkanPresentDevice>` in `galaxy_3d_present`.
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_format;
mod vulkan_framebuffer;
mod vulkan_present_device;

// Validation layer callback (compiled only with `vulkan-validation`)
#[cfg(feature = "vulkan-validation")]
mod debug;

pub mod galaxy3d {
    pub use crate::vulkan_context::{
        ContextConfig, DebugMessageFilter, DebugOutput, DebugSeverity, VulkanContext,
    };
    pub use crate::vulkan_format::format_to_vk;
    pub use crate::vulkan_framebuffer::ImagelessFramebufferBuilder;
    pub use crate::vulkan_present_device::VulkanPresentDevice;

    // Re-export debug utilities
    #[cfg(feature = "vulkan-validation")]
    pub use crate::debug::{get_validation_stats, print_validation_stats_report, ValidationStats};
}
