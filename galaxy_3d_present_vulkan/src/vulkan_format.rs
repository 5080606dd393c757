/// Conversions between presentation types and Vulkan, plus surface selection rules
///
/// Everything here is a pure function of its inputs so it can be tested
/// without a GPU.

use ash::vk;
use galaxy_3d_present::galaxy3d::present::{SurfaceError, MAX_SWAPCHAIN_IMAGE_COUNT};
use galaxy_3d_present::galaxy3d::render::{ImageUsage, PresentMode, TextureFormat};

/// Convert TextureFormat to Vulkan format
pub fn format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::A2B10G10R10_UNORM => vk::Format::A2B10G10R10_UNORM_PACK32,
        TextureFormat::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
    }
}

/// Convert a Vulkan format back, `None` for formats we never present
pub(crate) fn vk_format_to_format(format: vk::Format) -> Option<TextureFormat> {
    match format {
        vk::Format::R8G8B8A8_SRGB => Some(TextureFormat::R8G8B8A8_SRGB),
        vk::Format::R8G8B8A8_UNORM => Some(TextureFormat::R8G8B8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(TextureFormat::B8G8R8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(TextureFormat::B8G8R8A8_UNORM),
        vk::Format::A2B10G10R10_UNORM_PACK32 => Some(TextureFormat::A2B10G10R10_UNORM),
        vk::Format::R16G16B16A16_SFLOAT => Some(TextureFormat::R16G16B16A16_SFLOAT),
        _ => None,
    }
}

pub(crate) fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
    }
}

pub(crate) fn image_usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(ImageUsage::COLOR_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(ImageUsage::TRANSFER_SRC) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(ImageUsage::TRANSFER_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    if usage.contains(ImageUsage::STORAGE) {
        flags |= vk::ImageUsageFlags::STORAGE;
    }
    if usage.contains(ImageUsage::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    flags
}

pub(crate) fn vk_image_usage_to_usage(flags: vk::ImageUsageFlags) -> ImageUsage {
    let mut usage = ImageUsage::empty();
    if flags.contains(vk::ImageUsageFlags::COLOR_ATTACHMENT) {
        usage |= ImageUsage::COLOR_ATTACHMENT;
    }
    if flags.contains(vk::ImageUsageFlags::TRANSFER_SRC) {
        usage |= ImageUsage::TRANSFER_SRC;
    }
    if flags.contains(vk::ImageUsageFlags::TRANSFER_DST) {
        usage |= ImageUsage::TRANSFER_DST;
    }
    if flags.contains(vk::ImageUsageFlags::STORAGE) {
        usage |= ImageUsage::STORAGE;
    }
    if flags.contains(vk::ImageUsageFlags::SAMPLED) {
        usage |= ImageUsage::SAMPLED;
    }
    usage
}

/// Map an acquire/present failure to a [`SurfaceError`]
pub(crate) fn surface_error_from_vk(result: vk::Result) -> SurfaceError {
    match result {
        vk::Result::ERROR_OUT_OF_DATE_KHR => SurfaceError::OutOfDate,
        vk::Result::ERROR_SURFACE_LOST_KHR => SurfaceError::SurfaceLost,
        other => SurfaceError::Device(format!("{:?}", other)),
    }
}

// ===== Surface selection =====

/// Pick the surface format to build with
///
/// The first preferred format the surface offers in the sRGB non-linear color
/// space wins. A single `UNDEFINED` entry means anything goes. Otherwise we
/// fall back to the first offered format we know how to describe.
pub(crate) fn choose_surface_format(
    available: &[vk::SurfaceFormatKHR],
    preferred: &[TextureFormat],
) -> Option<(vk::SurfaceFormatKHR, TextureFormat)> {
    if let [only] = available {
        if only.format == vk::Format::UNDEFINED {
            let format = preferred.first().copied().unwrap_or(TextureFormat::B8G8R8A8_UNORM);
            let surface_format = vk::SurfaceFormatKHR {
                format: format_to_vk(format),
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            };
            return Some((surface_format, format));
        }
    }

    preferred
        .iter()
        .find_map(|&format| {
            available
                .iter()
                .find(|candidate| {
                    candidate.format == format_to_vk(format)
                        && candidate.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
                })
                .map(|candidate| (*candidate, format))
        })
        .or_else(|| {
            available
                .iter()
                .find_map(|candidate| vk_format_to_format(candidate.format).map(|format| (*candidate, format)))
        })
}

/// Requested present mode when supported, FIFO otherwise (always available)
pub(crate) fn choose_present_mode(available: &[vk::PresentModeKHR], requested: PresentMode) -> vk::PresentModeKHR {
    let wanted = present_mode_to_vk(requested);
    if available.contains(&wanted) {
        wanted
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Image extent: the surface's own extent when it dictates one, else the
/// requested size clamped to the supported range (0 falls back to the minimum)
pub(crate) fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    let min = capabilities.min_image_extent;
    let max = capabilities.max_image_extent;
    vk::Extent2D {
        width: width.max(min.width).min(max.width),
        height: height.max(min.height).min(max.height),
    }
}

/// Number of images to ask for, within the surface limits and our own cap
pub(crate) fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR, requested: u32) -> u32 {
    let mut count = requested.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 {
        count = count.min(capabilities.max_image_count);
    }
    count.min(MAX_SWAPCHAIN_IMAGE_COUNT as u32)
}

/// Requested usage restricted to what the surface supports
///
/// Color attachment is guaranteed by every surface and is always kept.
pub(crate) fn choose_image_usage(supported: vk::ImageUsageFlags, requested: ImageUsage) -> vk::ImageUsageFlags {
    (image_usage_to_vk(requested) & supported) | vk::ImageUsageFlags::COLOR_ATTACHMENT
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
