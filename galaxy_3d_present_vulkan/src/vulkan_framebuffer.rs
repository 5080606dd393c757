/// Imageless framebuffer creation
///
/// An imageless framebuffer only records the size, usage and format of each
/// attachment. The actual image view is bound when the render pass begins
/// (`VkRenderPassAttachmentBeginInfo`), so one framebuffer serves every
/// swapchain image. It still depends on the swapchain extent and format:
/// hand the old one to `SwapchainManager::retire_framebuffer` on recreate.

use ash::vk;
use galaxy_3d_present::galaxy3d::{Error, ResourceKind, Result};
use galaxy_3d_present::galaxy3d::present::SwapchainInfo;
use galaxy_3d_present::engine_error;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::{format_to_vk, image_usage_to_vk};

/// Attachment slot of an imageless framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttachmentDesc {
    format: vk::Format,
    usage: vk::ImageUsageFlags,
}

/// Builder for a single imageless `vk::Framebuffer`
#[derive(Debug, Clone)]
pub struct ImagelessFramebufferBuilder {
    render_pass: vk::RenderPass,
    width: u32,
    height: u32,
    layers: u32,
    attachments: Vec<AttachmentDesc>,
}

impl ImagelessFramebufferBuilder {
    pub fn new(render_pass: vk::RenderPass) -> Self {
        Self {
            render_pass,
            width: 0,
            height: 0,
            layers: 1,
            attachments: Vec::new(),
        }
    }

    /// Size and single color attachment matching the current swapchain
    pub fn for_swapchain(render_pass: vk::RenderPass, info: &SwapchainInfo) -> Self {
        Self::new(render_pass)
            .extent(info.width, info.height)
            .color_attachment(format_to_vk(info.format), image_usage_to_vk(info.usage))
    }

    pub fn extent(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Append an attachment; order must match the render pass attachments
    pub fn color_attachment(mut self, format: vk::Format, usage: vk::ImageUsageFlags) -> Self {
        self.attachments.push(AttachmentDesc { format, usage });
        self
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// Create the framebuffer
    ///
    /// # Errors
    ///
    /// `ResourceCreationFailed` with kind `Framebuffer` for a zero extent,
    /// no attachment, or a failed `vkCreateFramebuffer`.
    pub fn build(&self, context: &VulkanContext) -> Result<vk::Framebuffer> {
        if self.width == 0 || self.height == 0 || self.attachments.is_empty() {
            engine_error!("galaxy3d::vulkan",
                "Invalid imageless framebuffer: {}x{} with {} attachments",
                self.width, self.height, self.attachments.len());
            return Err(Error::creation_failed(
                ResourceKind::Framebuffer,
                format!("{}x{} with {} attachments", self.width, self.height, self.attachments.len()),
            ));
        }

        // One view-format list per attachment, kept alive for the create call
        let view_formats: Vec<[vk::Format; 1]> = self.attachments.iter()
            .map(|attachment| [attachment.format])
            .collect();
        let image_infos: Vec<vk::FramebufferAttachmentImageInfo> = self.attachments.iter()
            .zip(&view_formats)
            .map(|(attachment, formats)| {
                vk::FramebufferAttachmentImageInfo::default()
                    .usage(attachment.usage)
                    .width(self.width)
                    .height(self.height)
                    .layer_count(self.layers)
                    .view_formats(formats)
            })
            .collect();
        let mut attachments_info = vk::FramebufferAttachmentsCreateInfo::default()
            .attachment_image_infos(&image_infos);

        let mut create_info = vk::FramebufferCreateInfo::default()
            .flags(vk::FramebufferCreateFlags::IMAGELESS)
            .render_pass(self.render_pass)
            .width(self.width)
            .height(self.height)
            .layers(self.layers)
            .push_next(&mut attachments_info);
        // Imageless: the count is required, the view pointer is ignored
        create_info.attachment_count = self.attachments.len() as u32;

        unsafe { context.device().create_framebuffer(&create_info, None) }
            .map_err(|e| {
                engine_error!("galaxy3d::vulkan", "Failed to create imageless framebuffer: {:?}", e);
                Error::creation_failed(ResourceKind::Framebuffer, format!("{:?}", e))
            })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "vulkan_framebuffer_tests.rs"]
mod tests;
