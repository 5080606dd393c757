/// Status, descriptor and per-frame types of the swapchain manager

use crate::device::{ImageUsage, PresentDevice, TextureFormat};

/// State of a [`SwapchainManager`](crate::presentation::SwapchainManager)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainStatus {
    /// No image is held, `acquire_image()` may be called
    ReadyToAcquire,
    /// An image is held, `present()` or a cancel must follow
    ReadyToPresent,
    /// The surface changed, `recreate()` must be called
    Expired,
    /// Terminal, every resource has been released
    Destroyed,
}

/// Read-only description of the current swapchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: ImageUsage,
    pub image_count: u32,
}

/// The swapchain handle plus its images and views
///
/// Views are indexed like images: `image_views[i]` views `images[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainResources<Sw, Img, View> {
    pub swapchain: Sw,
    pub images: Vec<Img>,
    pub image_views: Vec<View>,
}

/// Everything needed to render one acquired frame
///
/// Valid until the next `present()` or cancel. Wait on `wait_semaphore`
/// before writing `image_view`, and signal `signal_semaphore` when done:
/// present waits on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireInfo<View, Sem> {
    pub image_view: View,
    pub image_index: u32,
    pub wait_semaphore: Sem,
    pub signal_semaphore: Sem,
}

/// [`SwapchainResources`] with the handle types of device `D`
pub type FrameResources<D> = SwapchainResources<
    <D as PresentDevice>::Swapchain,
    <D as PresentDevice>::Image,
    <D as PresentDevice>::ImageView,
>;

/// [`AcquireInfo`] with the handle types of device `D`
pub type FrameInfo<D> = AcquireInfo<<D as PresentDevice>::ImageView, <D as PresentDevice>::Semaphore>;
