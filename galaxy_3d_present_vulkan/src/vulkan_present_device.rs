/// VulkanPresentDevice - Vulkan implementation of the PresentDevice trait

use ash::vk;
use galaxy_3d_present::galaxy3d::{Error, ResourceKind, Result};
use galaxy_3d_present::galaxy3d::present::{PresentDevice, SurfaceError, SurfaceResult};
use galaxy_3d_present::galaxy3d::render::{AcquiredImage, SwapchainBuild, SwapchainDesc, TextureFormat};
use galaxy_3d_present::{engine_debug, engine_err, engine_error};
use std::sync::{Arc, Mutex, PoisonError};

use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::{
    choose_extent, choose_image_count, choose_image_usage, choose_present_mode,
    choose_surface_format, format_to_vk, surface_error_from_vk, vk_image_usage_to_usage,
};

/// Vulkan presentation device
///
/// Thin layer over a [`VulkanContext`]: every call maps one-to-one to the
/// Vulkan entry point of the same name. Handle lifetimes are decided by
/// `SwapchainManager`, never here.
pub struct VulkanPresentDevice {
    context: Arc<VulkanContext>,
    /// Fence for host waits on a semaphore (unsignaled between uses)
    wait_fence: Mutex<vk::Fence>,
}

/// Log and build a `ResourceCreationFailed` error
fn creation_error(kind: ResourceKind, cause: impl std::fmt::Debug) -> Error {
    engine_error!("galaxy3d::vulkan", "Failed to create {}: {:?}", kind, cause);
    Error::creation_failed(kind, format!("{:?}", cause))
}

impl VulkanPresentDevice {
    /// Create a present device on top of a Vulkan context
    pub fn new(context: Arc<VulkanContext>) -> Result<Self> {
        let fence = unsafe { context.device().create_fence(&vk::FenceCreateInfo::default(), None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create semaphore wait fence: {:?}", e))?;

        Ok(Self {
            context,
            wait_fence: Mutex::new(fence),
        })
    }

    pub fn context(&self) -> &Arc<VulkanContext> {
        &self.context
    }
}

impl PresentDevice for VulkanPresentDevice {
    type Semaphore = vk::Semaphore;
    type Image = vk::Image;
    type ImageView = vk::ImageView;
    type Framebuffer = vk::Framebuffer;
    type Swapchain = vk::SwapchainKHR;

    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        unsafe { self.context.device().create_semaphore(&vk::SemaphoreCreateInfo::default(), None) }
            .map_err(|e| creation_error(ResourceKind::Semaphore, e))
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe { self.context.device().destroy_semaphore(semaphore, None) };
    }

    fn create_swapchain(
        &self,
        desc: &SwapchainDesc,
        old_swapchain: Option<vk::SwapchainKHR>,
    ) -> Result<SwapchainBuild<vk::SwapchainKHR, vk::Image>> {
        let physical_device = self.context.physical_device();
        let surface = self.context.surface();
        let surface_loader = self.context.surface_loader();

        unsafe {
            let capabilities = surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(|e| creation_error(ResourceKind::SurfaceSupport, e))?;
            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| creation_error(ResourceKind::SurfaceSupport, e))?;
            let present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(|e| creation_error(ResourceKind::SurfaceSupport, e))?;

            let (surface_format, format) = choose_surface_format(&formats, &desc.preferred_formats)
                .ok_or_else(|| creation_error(ResourceKind::SurfaceSupport, "no presentable color format"))?;
            let present_mode = choose_present_mode(&present_modes, desc.present_mode);
            let extent = choose_extent(&capabilities, desc.width, desc.height);
            let image_count = choose_image_count(&capabilities, desc.min_image_count);
            let usage = choose_image_usage(capabilities.supported_usage_flags, desc.usage);

            // Minimized windows report a zero extent; no swapchain can be built
            if extent.width == 0 || extent.height == 0 {
                return Err(creation_error(
                    ResourceKind::Swapchain,
                    format!("surface extent is {}x{}", extent.width, extent.height),
                ));
            }

            // Graphics and present on different families share the images
            let queue_families = [self.context.graphics_queue_family(), self.context.present_queue_family()];
            let mut create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(surface)
                .min_image_count(image_count)
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(usage)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain.unwrap_or_default());
            if queue_families[0] != queue_families[1] {
                create_info = create_info
                    .image_sharing_mode(vk::SharingMode::CONCURRENT)
                    .queue_family_indices(&queue_families);
            }

            let swapchain_loader = self.context.swapchain_loader();
            let swapchain = swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| creation_error(ResourceKind::Swapchain, e))?;

            let images = match swapchain_loader.get_swapchain_images(swapchain) {
                Ok(images) => images,
                Err(e) => {
                    swapchain_loader.destroy_swapchain(swapchain, None);
                    return Err(creation_error(ResourceKind::SwapchainImages, e));
                }
            };

            engine_debug!("galaxy3d::vulkan",
                "Built swapchain {}x{} {:?} {:?}, {} images",
                extent.width, extent.height, surface_format.format, present_mode, images.len());

            Ok(SwapchainBuild {
                swapchain,
                images,
                format,
                width: extent.width,
                height: extent.height,
                usage: vk_image_usage_to_usage(usage),
            })
        }
    }

    fn create_image_view(&self, image: vk::Image, format: TextureFormat) -> Result<vk::ImageView> {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format_to_vk(format))
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe { self.context.device().create_image_view(&create_info, None) }
            .map_err(|e| creation_error(ResourceKind::ImageViews, e))
    }

    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        timeout_ns: u64,
        semaphore: vk::Semaphore,
    ) -> SurfaceResult<AcquiredImage> {
        let result = unsafe {
            self.context.swapchain_loader().acquire_next_image(
                swapchain,
                timeout_ns,
                semaphore,
                vk::Fence::null(),
            )
        };

        match result {
            Ok((index, suboptimal)) => Ok(AcquiredImage { index, suboptimal }),
            // Success codes ash surfaces as errors: nothing was signaled
            Err(vk::Result::TIMEOUT) | Err(vk::Result::NOT_READY) => {
                Err(SurfaceError::Device(format!("no image available within {} ns", timeout_ns)))
            }
            Err(e) => Err(surface_error_from_vk(e)),
        }
    }

    fn queue_present(
        &self,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait_semaphore: vk::Semaphore,
    ) -> SurfaceResult<bool> {
        let swapchains = [swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait_semaphore];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        self.context.queue_present(&present_info).map_err(surface_error_from_vk)
    }

    fn wait_semaphore(&self, semaphore: vk::Semaphore) -> Result<()> {
        let fence = self.wait_fence.lock().unwrap_or_else(PoisonError::into_inner);
        let wait_semaphores = [semaphore];
        let wait_stages = [vk::PipelineStageFlags::ALL_COMMANDS];

        // Empty batch: only consumes the signal
        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages);

        self.context.queue_submit(&[submit_info], *fence)?;

        let device = self.context.device();
        unsafe {
            device
                .wait_for_fences(&[*fence], true, u64::MAX)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to wait for semaphore fence: {:?}", e))?;
            device
                .reset_fences(&[*fence])
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to reset semaphore fence: {:?}", e))?;
        }
        Ok(())
    }

    fn destroy_image(&self, image: vk::Image) {
        unsafe { self.context.device().destroy_image(image, None) };
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.context.device().destroy_image_view(view, None) };
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.context.device().destroy_framebuffer(framebuffer, None) };
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.context.swapchain_loader().destroy_swapchain(swapchain, None) };
    }

    fn wait_idle(&self) -> Result<()> {
        self.context.wait_idle()
    }
}

impl Drop for VulkanPresentDevice {
    fn drop(&mut self) {
        let fence = *self.wait_fence.get_mut().unwrap_or_else(PoisonError::into_inner);
        unsafe { self.context.device().destroy_fence(fence, None) };
    }
}
