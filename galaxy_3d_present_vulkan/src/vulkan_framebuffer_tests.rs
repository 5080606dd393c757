//! Unit tests for ImagelessFramebufferBuilder
//!
//! Only the builder state is checked here; `build()` needs a device and is
//! exercised by the GPU tests.

use super::*;
use galaxy_3d_present::galaxy3d::render::{ImageUsage, TextureFormat};

#[test]
fn test_new_builder_defaults() {
    let builder = ImagelessFramebufferBuilder::new(vk::RenderPass::null());
    assert_eq!(builder.width, 0);
    assert_eq!(builder.height, 0);
    assert_eq!(builder.layers, 1);
    assert_eq!(builder.attachment_count(), 0);
}

#[test]
fn test_attachments_keep_insertion_order() {
    let builder = ImagelessFramebufferBuilder::new(vk::RenderPass::null())
        .extent(640, 480)
        .layers(2)
        .color_attachment(vk::Format::B8G8R8A8_SRGB, vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .color_attachment(vk::Format::R16G16B16A16_SFLOAT, vk::ImageUsageFlags::STORAGE);

    assert_eq!((builder.width, builder.height, builder.layers), (640, 480, 2));
    assert_eq!(builder.attachments[0].format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(builder.attachments[1].usage, vk::ImageUsageFlags::STORAGE);
}

#[test]
fn test_for_swapchain_matches_swapchain_info() {
    let info = SwapchainInfo {
        width: 1920,
        height: 1080,
        format: TextureFormat::B8G8R8A8_UNORM,
        usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_DST,
        image_count: 3,
    };
    let builder = ImagelessFramebufferBuilder::for_swapchain(vk::RenderPass::null(), &info);

    assert_eq!((builder.width, builder.height), (1920, 1080));
    assert_eq!(builder.attachment_count(), 1);
    assert_eq!(
        builder.attachments[0],
        AttachmentDesc {
            format: vk::Format::B8G8R8A8_UNORM,
            usage: vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST,
        }
    );
}
