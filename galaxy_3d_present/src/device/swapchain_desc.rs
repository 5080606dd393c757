/// Swapchain description types shared by every backend

use bitflags::bitflags;

/// Pixel format of presentable images
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
}

/// How presented images are queued for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresentMode {
    /// Wait for vertical blank, always supported
    #[default]
    Fifo,
    /// Like Fifo, but late images tear instead of waiting a full refresh
    FifoRelaxed,
    /// Replace the queued image, no tearing, lowest latency without tearing
    Mailbox,
    /// Present immediately, may tear
    Immediate,
}

bitflags! {
    /// How swapchain images may be used
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const TRANSFER_SRC     = 1 << 1;
        const TRANSFER_DST     = 1 << 2;
        const STORAGE          = 1 << 3;
        const SAMPLED          = 1 << 4;
    }
}

impl Default for ImageUsage {
    fn default() -> Self {
        ImageUsage::COLOR_ATTACHMENT
    }
}

/// Description of the swapchain to build
///
/// Owned by [`SwapchainManager`](crate::presentation::SwapchainManager) and
/// reused on every recreate; edit it through `desc_mut()` to change how the
/// next swapchain is built. Backends clamp each field to what the surface
/// actually supports.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapchainDesc {
    /// Desired width in pixels (0 = use the surface's current extent)
    pub width: u32,
    /// Desired height in pixels (0 = use the surface's current extent)
    pub height: u32,
    /// Formats to try, in order of preference
    pub preferred_formats: Vec<TextureFormat>,
    /// Present mode, falls back to Fifo when unsupported
    pub present_mode: PresentMode,
    /// Image usage flags
    pub usage: ImageUsage,
    /// Minimum number of images to request
    pub min_image_count: u32,
}

impl Default for SwapchainDesc {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            preferred_formats: vec![TextureFormat::B8G8R8A8_SRGB, TextureFormat::B8G8R8A8_UNORM],
            present_mode: PresentMode::Fifo,
            usage: ImageUsage::COLOR_ATTACHMENT,
            min_image_count: 3,
        }
    }
}

impl SwapchainDesc {
    /// Default description at a given size
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}
