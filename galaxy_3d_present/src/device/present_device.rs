/// PresentDevice trait - the graphics capability required by the presentation managers

use std::fmt;
use std::hash::Hash;
use crate::error::Result;
use crate::device::{ImageUsage, SwapchainDesc, TextureFormat};

/// Failure of an acquire or present call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface changed, the swapchain must be recreated
    OutOfDate,
    /// The surface is gone, the presentation context must be rebuilt
    SurfaceLost,
    /// Any other driver failure
    Device(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::OutOfDate => write!(f, "surface out of date"),
            SurfaceError::SurfaceLost => write!(f, "surface lost"),
            SurfaceError::Device(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Result of an acquire or present call
pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Image handed back by a successful acquire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredImage {
    /// Index of the image in the swapchain
    pub index: u32,
    /// The swapchain still works but no longer matches the surface exactly
    pub suboptimal: bool,
}

/// A freshly built swapchain and its images
#[derive(Debug, Clone, PartialEq)]
pub struct SwapchainBuild<Sw, Img> {
    /// Swapchain handle
    pub swapchain: Sw,
    /// Presentable images, owned by the swapchain
    pub images: Vec<Img>,
    /// Format actually selected
    pub format: TextureFormat,
    /// Width actually selected
    pub width: u32,
    /// Height actually selected
    pub height: u32,
    /// Usage the images were created with
    pub usage: ImageUsage,
}

/// Handle types must be plain copyable identifiers
pub trait DeviceHandle: Copy + Eq + Hash + fmt::Debug {}

impl<T: Copy + Eq + Hash + fmt::Debug> DeviceHandle for T {}

/// Graphics device operations needed to drive a swapchain
///
/// Every handle is a plain copyable identifier; the managers decide when
/// each one is destroyed. `destroy_*` calls are never made twice for the
/// same handle.
pub trait PresentDevice: Send + Sync {
    /// Binary semaphore
    type Semaphore: DeviceHandle;
    /// Image (swapchain-owned or application-owned)
    type Image: DeviceHandle;
    /// Image view
    type ImageView: DeviceHandle;
    /// Framebuffer
    type Framebuffer: DeviceHandle;
    /// Swapchain
    type Swapchain: DeviceHandle;

    /// Create a binary semaphore
    fn create_semaphore(&self) -> Result<Self::Semaphore>;

    /// Destroy a semaphore no pending GPU work references
    fn destroy_semaphore(&self, semaphore: Self::Semaphore);

    /// Build a swapchain and fetch its images
    ///
    /// # Arguments
    ///
    /// * `desc` - What to build; width/height 0 means the surface's current extent
    /// * `old_swapchain` - Previous swapchain, passed to the driver for resource reuse.
    ///   The caller keeps ownership of it and destroys it later.
    ///
    /// # Errors
    ///
    /// `ResourceCreationFailed` with kind `SurfaceSupport`, `Swapchain` or
    /// `SwapchainImages`. Nothing built by a failed call is left alive.
    fn create_swapchain(
        &self,
        desc: &SwapchainDesc,
        old_swapchain: Option<Self::Swapchain>,
    ) -> Result<SwapchainBuild<Self::Swapchain, Self::Image>>;

    /// Create a 2D color view of a swapchain image
    fn create_image_view(&self, image: Self::Image, format: TextureFormat) -> Result<Self::ImageView>;

    /// Acquire the next presentable image, signaling `semaphore` when it is ready
    ///
    /// Blocks until an image is available or `timeout_ns` elapses.
    fn acquire_next_image(
        &self,
        swapchain: Self::Swapchain,
        timeout_ns: u64,
        semaphore: Self::Semaphore,
    ) -> SurfaceResult<AcquiredImage>;

    /// Queue `image_index` for presentation once `wait_semaphore` is signaled
    ///
    /// Returns `true` when the swapchain is suboptimal.
    fn queue_present(
        &self,
        swapchain: Self::Swapchain,
        image_index: u32,
        wait_semaphore: Self::Semaphore,
    ) -> SurfaceResult<bool>;

    /// Consume a pending signal on `semaphore` and block until the GPU has done so
    fn wait_semaphore(&self, semaphore: Self::Semaphore) -> Result<()>;

    /// Destroy an application-owned image
    fn destroy_image(&self, image: Self::Image);

    /// Destroy an image view
    fn destroy_image_view(&self, view: Self::ImageView);

    /// Destroy a framebuffer
    fn destroy_framebuffer(&self, framebuffer: Self::Framebuffer);

    /// Destroy a swapchain (its images go with it)
    fn destroy_swapchain(&self, swapchain: Self::Swapchain);

    /// Block until the device has finished all submitted work
    fn wait_idle(&self) -> Result<()>;
}
