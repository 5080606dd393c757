//! Integration tests for the Vulkan presentation backend
//!
//! These tests drive a real SwapchainManager<VulkanPresentDevice> against a
//! hidden window. All tests require a GPU and a display and are marked with
//! #[ignore].
//!
//! Run with: cargo test --test vulkan_present_tests -- --ignored --test-threads=1

use galaxy_3d_present::galaxy3d::{Engine, Error, SwapchainManager};
use galaxy_3d_present::galaxy3d::present::{Config, PresentDevice, SwapchainStatus};
use galaxy_3d_present::galaxy3d::render::SwapchainDesc;
use galaxy_3d_present_vulkan::galaxy3d::{
    format_to_vk, ContextConfig, ImagelessFramebufferBuilder, VulkanContext, VulkanPresentDevice,
};
use serial_test::serial;
use std::sync::Arc;
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Helper to create a hidden test window
#[allow(deprecated)]
fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Vulkan Present Test")
        .with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
        .with_visible(false);
    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}

fn ensure_engine() {
    if !Engine::is_initialized() {
        Engine::initialize().unwrap();
    }
}

fn create_device(window: &Window) -> Arc<VulkanPresentDevice> {
    ensure_engine();
    let context = Arc::new(VulkanContext::new(window, ContextConfig::default()).unwrap());
    Arc::new(VulkanPresentDevice::new(context).unwrap())
}

fn create_manager(device: &Arc<VulkanPresentDevice>) -> SwapchainManager<VulkanPresentDevice> {
    SwapchainManager::new(Arc::clone(device), SwapchainDesc::with_size(800, 600), Config::default()).unwrap()
}

// ============================================================================
// CONTEXT TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_context_requires_engine() {
    let (window, _event_loop) = create_test_window();
    if Engine::is_initialized() {
        Engine::shutdown();
    }
    let result = VulkanContext::new(&window, ContextConfig::default());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_swapchain_manager() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let manager = create_manager(&device);

    let info = manager.info().unwrap();
    assert!(info.image_count >= 1);
    assert!(info.width > 0 && info.height > 0);
    assert_eq!(manager.status(), SwapchainStatus::ReadyToAcquire);
}

// ============================================================================
// FRAME LOOP TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_acquire_then_cancel() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let mut manager = create_manager(&device);

    for _ in 0..5 {
        let frame = manager.acquire_image().unwrap();
        assert!(frame.image_index < manager.info().unwrap().image_count);
        manager.cancel_acquire_frame().unwrap();
        assert_eq!(manager.status(), SwapchainStatus::ReadyToAcquire);
    }
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_recreate_keeps_manager_usable() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let mut manager = create_manager(&device);

    let info = manager.recreate(640, 480).unwrap();
    assert_eq!(manager.status(), SwapchainStatus::ReadyToAcquire);
    assert_eq!(manager.info().unwrap(), info);

    manager.acquire_image().unwrap();
    manager.cancel_acquire_frame().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_imageless_framebuffer_retired_on_recreate() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let mut manager = create_manager(&device);
    let info = manager.info().unwrap();

    let context = Arc::clone(device.context());
    let attachment = ash::vk::AttachmentDescription::default()
        .format(format_to_vk(info.format))
        .samples(ash::vk::SampleCountFlags::TYPE_1)
        .load_op(ash::vk::AttachmentLoadOp::CLEAR)
        .store_op(ash::vk::AttachmentStoreOp::STORE)
        .final_layout(ash::vk::ImageLayout::PRESENT_SRC_KHR);
    let color_ref = [ash::vk::AttachmentReference::default()
        .attachment(0)
        .layout(ash::vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)];
    let subpass = ash::vk::SubpassDescription::default()
        .pipeline_bind_point(ash::vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_ref);
    let attachments = [attachment];
    let subpasses = [subpass];
    let render_pass_info = ash::vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses);
    let render_pass = unsafe { context.device().create_render_pass(&render_pass_info, None) }.unwrap();

    let framebuffer = ImagelessFramebufferBuilder::for_swapchain(render_pass, &info)
        .build(&context)
        .unwrap();

    manager.recreate(0, 0).unwrap();
    manager.retire_framebuffer(framebuffer);
    assert!(manager.pending_deletions() > 0);

    manager.destroy();
    assert_eq!(manager.pending_deletions(), 0);
    device.wait_idle().unwrap();
    unsafe { context.device().destroy_render_pass(render_pass, None) };
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_destroy_is_idempotent() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let mut manager = create_manager(&device);

    manager.destroy();
    assert_eq!(manager.status(), SwapchainStatus::Destroyed);
    manager.destroy();
    drop(manager);
    device.wait_idle().unwrap();
}
