/// DeletionQueue - delayed destruction of surface-owned resources
///
/// Handles retired during one presented frame go into the current bucket.
/// Every [`tick`](DeletionQueue::tick) moves to the next bucket and destroys
/// whatever it holds, so a handle survives exactly `depth` ticks: enough for
/// every frame that could still reference it to have finished on the GPU.

use std::sync::Arc;
use crate::device::PresentDevice;
use crate::error::{Error, Result};
use crate::presentation::MAX_SWAPCHAIN_IMAGE_COUNT;
use crate::utils::GenerationRing;

/// Handles retired during one generation
struct DeletionBucket<D: PresentDevice> {
    images: Vec<D::Image>,
    image_views: Vec<D::ImageView>,
    framebuffers: Vec<D::Framebuffer>,
    swapchains: Vec<D::Swapchain>,
}

impl<D: PresentDevice> Default for DeletionBucket<D> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            image_views: Vec::new(),
            framebuffers: Vec::new(),
            swapchains: Vec::new(),
        }
    }
}

impl<D: PresentDevice> DeletionBucket<D> {
    fn len(&self) -> usize {
        self.images.len() + self.image_views.len() + self.framebuffers.len() + self.swapchains.len()
    }

    /// Destroy everything in the bucket, dependents before what they reference
    fn flush(&mut self, device: &D) {
        for framebuffer in self.framebuffers.drain(..) {
            device.destroy_framebuffer(framebuffer);
        }
        for view in self.image_views.drain(..) {
            device.destroy_image_view(view);
        }
        for image in self.images.drain(..) {
            device.destroy_image(image);
        }
        for swapchain in self.swapchains.drain(..) {
            device.destroy_swapchain(swapchain);
        }
    }
}

/// Generation ring of retired images, views, framebuffers and swapchains
pub struct DeletionQueue<D: PresentDevice> {
    device: Arc<D>,
    ring: GenerationRing<DeletionBucket<D>>,
}

impl<D: PresentDevice> DeletionQueue<D> {
    /// Create an empty queue
    ///
    /// # Arguments
    ///
    /// * `device` - Device used to destroy the handles
    /// * `depth` - Ticks a handle waits before destruction (1..=8)
    ///
    /// # Errors
    ///
    /// `InitializationFailed` when `depth` is out of range.
    pub fn new(device: Arc<D>, depth: u32) -> Result<Self> {
        if depth == 0 || depth as usize > MAX_SWAPCHAIN_IMAGE_COUNT {
            return Err(Error::InitializationFailed(format!(
                "Deletion queue depth must be in 1..={}, got {}",
                MAX_SWAPCHAIN_IMAGE_COUNT, depth
            )));
        }

        Ok(Self {
            device,
            ring: GenerationRing::new(depth as usize),
        })
    }

    /// Number of ticks a handle waits before destruction
    pub fn depth(&self) -> usize {
        self.ring.depth()
    }

    /// Handles still waiting for destruction
    pub fn pending_count(&self) -> usize {
        self.ring.iter().map(DeletionBucket::len).sum()
    }

    // ===== RETIRE =====

    pub fn add_image(&mut self, image: D::Image) {
        self.ring.current_mut().images.push(image);
    }

    pub fn add_images(&mut self, images: &[D::Image]) {
        self.ring.current_mut().images.extend_from_slice(images);
    }

    pub fn add_image_view(&mut self, view: D::ImageView) {
        self.ring.current_mut().image_views.push(view);
    }

    pub fn add_image_views(&mut self, views: &[D::ImageView]) {
        self.ring.current_mut().image_views.extend_from_slice(views);
    }

    pub fn add_framebuffer(&mut self, framebuffer: D::Framebuffer) {
        self.ring.current_mut().framebuffers.push(framebuffer);
    }

    pub fn add_framebuffers(&mut self, framebuffers: &[D::Framebuffer]) {
        self.ring.current_mut().framebuffers.extend_from_slice(framebuffers);
    }

    pub fn add_swapchain(&mut self, swapchain: D::Swapchain) {
        self.ring.current_mut().swapchains.push(swapchain);
    }

    // ===== RECLAIM =====

    /// Move to the next generation and destroy the handles it holds
    ///
    /// Call exactly once per presented frame.
    pub fn tick(&mut self) {
        let bucket = self.ring.advance();
        let count = bucket.len();
        bucket.flush(&self.device);
        if count > 0 {
            crate::engine_trace!("galaxy3d::present", "Deletion queue destroyed {} handle(s)", count);
        }
    }

    /// Destroy every pending handle regardless of age
    ///
    /// The device must be idle. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        let device = &self.device;
        for bucket in self.ring.iter_mut() {
            bucket.flush(device);
        }
    }
}

impl<D: PresentDevice> Drop for DeletionQueue<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "deletion_queue_tests.rs"]
mod tests;
