/// SwapchainManager - the presentation state machine
///
/// Drives one swapchain through acquire / present / recreate / cancel and
/// refuses any call sequence that would misuse a semaphore or an image:
///
/// ```text
///                  acquire_image()               present()
///  ReadyToAcquire ---------------> ReadyToPresent ---------> ReadyToAcquire
///        |  ^                        |     cancel_*_frame()        ^
///        |  |                        +-----------------------------+
///        |  | recreate()             |
///        v  |                        | present() out of date
///      Expired <---------------------+
///
///  any --destroy()--> Destroyed
/// ```
///
/// Resources the swapchain no longer needs (old views, old swapchains,
/// framebuffers handed in by the application) go to a [`DeletionQueue`]
/// that advances once per successful present.

use std::sync::Arc;
use crate::device::{PresentDevice, SurfaceError, SwapchainBuild, SwapchainDesc};
use crate::error::{Error, ResourceKind, Result};
use crate::presentation::{
    AcquireInfo, Config, DeletionQueue, FrameInfo, FrameResources, SemaphoreManager,
    SwapchainInfo, SwapchainResources, SwapchainStatus, FRAMES_IN_FLIGHT, MAX_SWAPCHAIN_IMAGE_COUNT,
};

/// A swapchain plus everything needed to use it safely
///
/// # Example
///
/// ```ignore
/// let mut swapchain = SwapchainManager::new(device, SwapchainDesc::with_size(1280, 720), Config::default())?;
/// loop {
///     let frame = match swapchain.acquire_image() {
///         Ok(frame) => frame,
///         Err(Error::SurfaceOutOfDate) => { swapchain.recreate(0, 0)?; continue; }
///         Err(err) => return Err(err),
///     };
///     // record and submit: wait on frame.wait_semaphore, signal frame.signal_semaphore
///     swapchain.present()?;
/// }
/// ```
pub struct SwapchainManager<D: PresentDevice> {
    device: Arc<D>,
    config: Config,
    desc: SwapchainDesc,

    /// None while Expired after a failed recreate, or once Destroyed
    resources: Option<FrameResources<D>>,
    info: SwapchainInfo,
    status: SwapchainStatus,

    /// Bundle returned by the outstanding acquire (Some only while ReadyToPresent)
    frame: Option<FrameInfo<D>>,

    semaphores: SemaphoreManager<D>,
    deletion_queue: DeletionQueue<D>,
}

impl<D: PresentDevice> SwapchainManager<D> {
    /// Build the first swapchain and its helpers
    ///
    /// # Arguments
    ///
    /// * `device` - Backend that owns the surface
    /// * `desc` - How to build the swapchain, reused by every `recreate()`
    /// * `config` - Deletion queue depth, acquire timeout, semaphore pool size
    ///
    /// # Errors
    ///
    /// `ResourceCreationFailed` when the swapchain, its images, its views or
    /// a semaphore cannot be created; `InitializationFailed` when the
    /// configured deletion queue depth is out of range. Nothing is leaked.
    pub fn new(device: Arc<D>, desc: SwapchainDesc, config: Config) -> Result<Self> {
        // A shallower queue could free a resource the previous frame still reads
        if let Some(depth) = config.deletion_queue_depth {
            if (depth as usize) < FRAMES_IN_FLIGHT {
                crate::engine_error!(
                    "galaxy3d::present",
                    "Deletion queue depth {} is below FRAMES_IN_FLIGHT ({})",
                    depth,
                    FRAMES_IN_FLIGHT
                );
                return Err(Error::InitializationFailed(format!(
                    "Deletion queue depth must be at least {}, got {}",
                    FRAMES_IN_FLIGHT, depth
                )));
            }
        }

        let build = device.create_swapchain(&desc, None)?;
        let (resources, info) = match Self::build_resources(&device, build) {
            Ok(built) => built,
            Err((partial, err)) => {
                Self::destroy_resources_now(&device, partial);
                crate::engine_error!("galaxy3d::present", "Swapchain creation failed: {}", err);
                return Err(err);
            }
        };

        let depth = config
            .deletion_queue_depth
            .unwrap_or_else(|| info.image_count.max(FRAMES_IN_FLIGHT as u32));
        let helpers = DeletionQueue::new(Arc::clone(&device), depth).and_then(|deletion_queue| {
            SemaphoreManager::new(Arc::clone(&device), info.image_count, config.initial_idle_semaphores)
                .map(|semaphores| (deletion_queue, semaphores))
        });
        let (deletion_queue, semaphores) = match helpers {
            Ok(helpers) => helpers,
            Err(err) => {
                Self::destroy_resources_now(&device, resources);
                crate::engine_error!("galaxy3d::present", "Swapchain creation failed: {}", err);
                return Err(err);
            }
        };

        crate::engine_info!(
            "galaxy3d::present",
            "Swapchain created: {}x{} {:?}, {} images, deletion depth {}",
            info.width,
            info.height,
            info.format,
            info.image_count,
            deletion_queue.depth()
        );

        Ok(Self {
            device,
            config,
            desc,
            resources: Some(resources),
            info,
            status: SwapchainStatus::ReadyToAcquire,
            frame: None,
            semaphores,
            deletion_queue,
        })
    }

    // ===== ACCESSORS =====

    pub fn status(&self) -> SwapchainStatus {
        self.status
    }

    /// Description of the current swapchain
    ///
    /// # Errors
    ///
    /// `SurfaceOutOfDate` while Expired.
    pub fn info(&self) -> Result<SwapchainInfo> {
        self.ensure_not_destroyed("info")?;
        match self.status {
            SwapchainStatus::Expired => Err(Error::SurfaceOutOfDate),
            _ => Ok(self.info),
        }
    }

    /// Swapchain handle, images and views of the current swapchain
    ///
    /// # Errors
    ///
    /// `SurfaceOutOfDate` while Expired.
    pub fn resources(&self) -> Result<&FrameResources<D>> {
        self.ensure_not_destroyed("resources")?;
        match (self.status, self.resources.as_ref()) {
            (SwapchainStatus::Expired, _) | (_, None) => Err(Error::SurfaceOutOfDate),
            (_, Some(resources)) => Ok(resources),
        }
    }

    /// Description used by the next `recreate()`
    pub fn desc(&self) -> &SwapchainDesc {
        &self.desc
    }

    /// Change how the next `recreate()` builds the swapchain
    pub fn desc_mut(&mut self) -> &mut SwapchainDesc {
        &mut self.desc
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    /// Bundle of the outstanding acquire, if any
    pub fn current_frame(&self) -> Option<FrameInfo<D>> {
        self.frame
    }

    /// Handles waiting in the deletion queue
    pub fn pending_deletions(&self) -> usize {
        self.deletion_queue.pending_count()
    }

    pub fn semaphores(&self) -> &SemaphoreManager<D> {
        &self.semaphores
    }

    // ===== FRAME OPERATIONS =====

    /// Acquire the next image to render into
    ///
    /// While ReadyToPresent, returns the bundle of the outstanding acquire
    /// again without calling the driver. May block up to the configured
    /// acquire timeout. A suboptimal swapchain still counts as success.
    ///
    /// # Errors
    ///
    /// - `SurfaceOutOfDate`: status is (or just became) Expired, call `recreate()`
    /// - `SurfaceLost`: the presentation context must be rebuilt
    /// - `AcquireFailed`: the frame is dropped, status unchanged
    pub fn acquire_image(&mut self) -> Result<FrameInfo<D>> {
        self.ensure_not_destroyed("acquire_image")?;
        match (self.status, self.frame) {
            (SwapchainStatus::Expired, _) => return Err(Error::SurfaceOutOfDate),
            (SwapchainStatus::ReadyToPresent, Some(frame)) => return Ok(frame),
            _ => {}
        }

        let (Some(swapchain), Some(semaphore)) = (
            self.resources.as_ref().map(|resources| resources.swapchain),
            self.semaphores.next_acquire_semaphore(),
        ) else {
            return Err(Error::SurfaceOutOfDate);
        };

        let acquired = match self.device.acquire_next_image(swapchain, self.config.acquire_timeout_ns, semaphore) {
            Ok(acquired) => acquired,
            Err(SurfaceError::OutOfDate) => {
                self.expire("acquire_image");
                return Err(Error::SurfaceOutOfDate);
            }
            Err(SurfaceError::SurfaceLost) => {
                crate::engine_error!("galaxy3d::present", "Surface lost while acquiring an image");
                return Err(Error::SurfaceLost);
            }
            Err(SurfaceError::Device(message)) => {
                crate::engine_warn!("galaxy3d::present", "Acquire failed, dropping frame: {}", message);
                return Err(Error::AcquireFailed(message));
            }
        };

        let Some(image_view) = self
            .resources
            .as_ref()
            .and_then(|resources| resources.image_views.get(acquired.index as usize).copied())
        else {
            crate::engine_error!(
                "galaxy3d::present",
                "Driver acquired image {} but the swapchain has {}",
                acquired.index,
                self.info.image_count
            );
            return Err(Error::AcquireFailed(format!("image index {} out of range", acquired.index)));
        };
        if acquired.suboptimal {
            crate::engine_debug!("galaxy3d::present", "Acquired image {} from a suboptimal swapchain", acquired.index);
        }

        self.semaphores.update_current_index(acquired.index);
        let (Some(wait_semaphore), Some(signal_semaphore)) =
            (self.semaphores.acquire_semaphore(), self.semaphores.submit_semaphore())
        else {
            return Err(Error::AcquireFailed(format!("no semaphores bound to image {}", acquired.index)));
        };

        let frame = AcquireInfo {
            image_view,
            image_index: acquired.index,
            wait_semaphore,
            signal_semaphore,
        };
        self.frame = Some(frame);
        self.status = SwapchainStatus::ReadyToPresent;
        Ok(frame)
    }

    /// Present the acquired image once its signal semaphore fires
    ///
    /// On success (suboptimal included) the deletion queue advances by one
    /// generation.
    ///
    /// # Errors
    ///
    /// - `SequenceError`: no image was acquired, status stays ReadyToAcquire
    /// - `SurfaceOutOfDate`: status is (or just became) Expired
    /// - `SurfaceLost`: the presentation context must be rebuilt
    /// - `PresentFailed`: status unchanged, present may be retried
    pub fn present(&mut self) -> Result<()> {
        self.ensure_not_destroyed("present")?;
        let frame = match (self.status, self.frame) {
            (SwapchainStatus::Expired, _) => return Err(Error::SurfaceOutOfDate),
            (SwapchainStatus::ReadyToPresent, Some(frame)) => frame,
            _ => return Err(Self::sequence_error("present", "acquire_image() must succeed first")),
        };
        let Some(swapchain) = self.resources.as_ref().map(|resources| resources.swapchain) else {
            return Err(Error::SurfaceOutOfDate);
        };

        match self.device.queue_present(swapchain, frame.image_index, frame.signal_semaphore) {
            Ok(suboptimal) => {
                if suboptimal {
                    crate::engine_debug!("galaxy3d::present", "Presented image {} to a suboptimal swapchain", frame.image_index);
                }
                self.frame = None;
                self.status = SwapchainStatus::ReadyToAcquire;
                self.deletion_queue.tick();
                Ok(())
            }
            Err(SurfaceError::OutOfDate) => {
                self.expire("present");
                Err(Error::SurfaceOutOfDate)
            }
            Err(SurfaceError::SurfaceLost) => {
                crate::engine_error!("galaxy3d::present", "Surface lost while presenting image {}", frame.image_index);
                Err(Error::SurfaceLost)
            }
            Err(SurfaceError::Device(message)) => {
                crate::engine_warn!("galaxy3d::present", "Present of image {} failed: {}", frame.image_index, message);
                Err(Error::PresentFailed(message))
            }
        }
    }

    /// Rebuild the swapchain, e.g. after a resize
    ///
    /// The old swapchain is handed to the driver for reuse, then retired with
    /// its views into the deletion queue. Semaphores bound to in-use images
    /// are quarantined.
    ///
    /// # Arguments
    ///
    /// * `width` - New width in pixels (0 = keep the current description's)
    /// * `height` - New height in pixels (0 = keep the current description's)
    ///
    /// # Errors
    ///
    /// - `SequenceError`: an acquired image was neither presented nor cancelled
    /// - `ResourceCreationFailed`: status becomes Expired, call `recreate()` again later
    pub fn recreate(&mut self, width: u32, height: u32) -> Result<SwapchainInfo> {
        self.ensure_not_destroyed("recreate")?;
        if self.status == SwapchainStatus::ReadyToPresent {
            return Err(Self::sequence_error(
                "recreate",
                "the acquired image must be presented or cancelled first",
            ));
        }
        if width != 0 {
            self.desc.width = width;
        }
        if height != 0 {
            self.desc.height = height;
        }

        let old = self.resources.take();
        let old_swapchain = old.as_ref().map(|resources| resources.swapchain);
        if let Some(old) = &old {
            self.deletion_queue.add_image_views(&old.image_views);
        }
        let built = self.device.create_swapchain(&self.desc, old_swapchain);
        if let Some(old_swapchain) = old_swapchain {
            self.deletion_queue.add_swapchain(old_swapchain);
        }

        let build = match built {
            Ok(build) => build,
            Err(err) => return Err(self.recreate_failed(err)),
        };
        let (resources, info) = match Self::build_resources(&self.device, build) {
            Ok(built) => built,
            Err((partial, err)) => {
                self.retire_resources(partial);
                return Err(self.recreate_failed(err));
            }
        };
        if let Err(err) = self.semaphores.recreate_resources(info.image_count) {
            self.retire_resources(resources);
            return Err(self.recreate_failed(err));
        }

        self.resources = Some(resources);
        self.info = info;
        self.frame = None;
        self.status = SwapchainStatus::ReadyToAcquire;

        crate::engine_info!(
            "galaxy3d::present",
            "Swapchain recreated: {}x{} {:?}, {} images",
            info.width,
            info.height,
            info.format,
            info.image_count
        );
        Ok(info)
    }

    /// Give up on the acquired image before submitting any work for it
    ///
    /// Blocks until the GPU has consumed the acquire semaphore's signal.
    pub fn cancel_acquire_frame(&mut self) -> Result<()> {
        self.cancel_frame("cancel_acquire_frame", |frame| frame.wait_semaphore)
    }

    /// Give up on presenting after the rendering work was submitted
    ///
    /// Blocks until the GPU has consumed the submit semaphore's signal.
    pub fn cancel_present_frame(&mut self) -> Result<()> {
        self.cancel_frame("cancel_present_frame", |frame| frame.signal_semaphore)
    }

    /// Hand a framebuffer built on the current views to the deletion queue
    pub fn retire_framebuffer(&mut self, framebuffer: D::Framebuffer) {
        self.deletion_queue.add_framebuffer(framebuffer);
    }

    pub fn retire_framebuffers(&mut self, framebuffers: &[D::Framebuffer]) {
        self.deletion_queue.add_framebuffers(framebuffers);
    }

    /// Wait for the device, then release every resource
    ///
    /// Further calls are programming errors. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.status == SwapchainStatus::Destroyed {
            return;
        }
        if let Err(err) = self.device.wait_idle() {
            crate::engine_warn!("galaxy3d::present", "wait_idle failed while destroying the swapchain: {}", err);
        }

        self.semaphores.destroy();
        if let Some(resources) = self.resources.take() {
            self.retire_resources(resources);
        }
        self.deletion_queue.destroy();
        self.frame = None;
        self.status = SwapchainStatus::Destroyed;
        crate::engine_debug!("galaxy3d::present", "Swapchain manager destroyed");
    }

    // ===== INTERNAL =====

    fn cancel_frame(
        &mut self,
        operation: &str,
        semaphore_of: impl Fn(&FrameInfo<D>) -> D::Semaphore,
    ) -> Result<()> {
        self.ensure_not_destroyed(operation)?;
        let frame = match (self.status, self.frame) {
            (SwapchainStatus::ReadyToPresent, Some(frame)) => frame,
            _ => return Err(Self::sequence_error(operation, "no acquired image to cancel")),
        };

        self.device.wait_semaphore(semaphore_of(&frame))?;
        self.frame = None;
        self.status = SwapchainStatus::ReadyToAcquire;
        crate::engine_debug!(
            "galaxy3d::present",
            "{}: image {} released without presenting",
            operation,
            frame.image_index
        );
        Ok(())
    }

    fn expire(&mut self, operation: &str) {
        crate::engine_debug!("galaxy3d::present", "{}: swapchain out of date, status Expired", operation);
        self.frame = None;
        self.status = SwapchainStatus::Expired;
    }

    fn recreate_failed(&mut self, err: Error) -> Error {
        crate::engine_error!("galaxy3d::present", "Swapchain recreation failed: {}", err);
        self.frame = None;
        self.status = SwapchainStatus::Expired;
        err
    }

    fn ensure_not_destroyed(&self, operation: &str) -> Result<()> {
        if self.status != SwapchainStatus::Destroyed {
            return Ok(());
        }
        crate::engine_error!("galaxy3d::present", "SwapchainManager::{}() called after destroy()", operation);
        if cfg!(debug_assertions) {
            panic!("SwapchainManager::{}() called after destroy()", operation);
        }
        Err(Error::SequenceError(format!("{}() called after destroy()", operation)))
    }

    fn sequence_error(operation: &str, message: &str) -> Error {
        crate::engine_error!("galaxy3d::present", "{}(): {}", operation, message);
        Error::SequenceError(format!("{}(): {}", operation, message))
    }

    fn retire_resources(&mut self, resources: FrameResources<D>) {
        self.deletion_queue.add_image_views(&resources.image_views);
        self.deletion_queue.add_swapchain(resources.swapchain);
    }

    /// Only used before the deletion queue exists
    fn destroy_resources_now(device: &D, resources: FrameResources<D>) {
        for view in resources.image_views {
            device.destroy_image_view(view);
        }
        device.destroy_swapchain(resources.swapchain);
    }

    /// Create the views of a fresh swapchain
    ///
    /// On failure the swapchain and the views created so far come back with
    /// the error so the caller can dispose of them.
    #[allow(clippy::type_complexity)]
    fn build_resources(
        device: &D,
        build: SwapchainBuild<D::Swapchain, D::Image>,
    ) -> std::result::Result<(FrameResources<D>, SwapchainInfo), (FrameResources<D>, Error)> {
        let SwapchainBuild { swapchain, images, format, width, height, usage } = build;

        let mut image_views = Vec::with_capacity(images.len());
        let created = if images.is_empty() || images.len() > MAX_SWAPCHAIN_IMAGE_COUNT {
            Err(Error::creation_failed(
                ResourceKind::SwapchainImages,
                format!("driver returned {} images, expected 1..={}", images.len(), MAX_SWAPCHAIN_IMAGE_COUNT),
            ))
        } else {
            images.iter().try_for_each(|&image| -> Result<()> {
                image_views.push(device.create_image_view(image, format)?);
                Ok(())
            })
        };

        let info = SwapchainInfo {
            width,
            height,
            format,
            usage,
            image_count: images.len() as u32,
        };
        let resources = SwapchainResources { swapchain, images, image_views };
        match created {
            Ok(()) => Ok((resources, info)),
            Err(err) => Err((resources, err)),
        }
    }
}

impl<D: PresentDevice> Drop for SwapchainManager<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "swapchain_manager_tests.rs"]
mod tests;
