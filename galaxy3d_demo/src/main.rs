//! Galaxy3D Present Demo - Main Entry Point
//!
//! Clears a window to a slowly cycling color through
//! `SwapchainManager<VulkanPresentDevice>`: acquire, record, submit, present.
//! Resizes rebuild the swapchain, a minimized window skips frames, and an
//! occluded window cancels the acquired image instead of drawing it.

use ash::vk;
use galaxy_3d_present::galaxy3d::present::{Config, SwapchainStatus, FRAMES_IN_FLIGHT};
use galaxy_3d_present::galaxy3d::render::SwapchainDesc;
use galaxy_3d_present::galaxy3d::window::WindowState;
use galaxy_3d_present::galaxy3d::{Engine, Error, Result, SwapchainManager};
use galaxy_3d_present::{engine_err, engine_error, engine_info, engine_warn};
use galaxy_3d_present_vulkan::galaxy3d::{
    format_to_vk, ContextConfig, ImagelessFramebufferBuilder, VulkanContext, VulkanPresentDevice,
};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Command buffer and fence of one frame in flight
#[derive(Clone, Copy)]
struct FrameSync {
    command_buffer: vk::CommandBuffer,
    fence: vk::Fence,
}

/// Vulkan objects living as long as the window
struct Renderer {
    context: Arc<VulkanContext>,
    swapchain: SwapchainManager<VulkanPresentDevice>,
    render_pass: vk::RenderPass,
    render_pass_format: vk::Format,
    framebuffer: vk::Framebuffer,
    command_pool: vk::CommandPool,
    frames: Vec<FrameSync>,
    frame_index: usize,
    frame_count: u64,
}

impl Renderer {
    fn new(window: &Window) -> Result<Self> {
        let config = ContextConfig {
            app_name: "Galaxy3D Present Demo".to_string(),
            ..Default::default()
        };
        let context = Arc::new(VulkanContext::new(window, config)?);
        let device = Arc::new(VulkanPresentDevice::new(Arc::clone(&context))?);

        let size = window.inner_size();
        let swapchain = SwapchainManager::new(
            device,
            SwapchainDesc::with_size(size.width, size.height),
            Config::default(),
        )?;
        let info = swapchain.info()?;

        let render_pass_format = format_to_vk(info.format);
        let render_pass = create_clear_render_pass(&context, render_pass_format)?;
        let framebuffer = ImagelessFramebufferBuilder::for_swapchain(render_pass, &info).build(&context)?;

        let device = context.device();
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(context.graphics_queue_family())
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let command_pool = unsafe { device.create_command_pool(&pool_info, None) }
            .map_err(|e| engine_err!("galaxy3d::demo", "Failed to create command pool: {:?}", e))?;

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(FRAMES_IN_FLIGHT as u32);
        let command_buffers = unsafe { device.allocate_command_buffers(&alloc_info) }
            .map_err(|e| engine_err!("galaxy3d::demo", "Failed to allocate command buffers: {:?}", e))?;

        // Signaled so the first wait of each slot returns immediately
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
        let frames = command_buffers
            .into_iter()
            .map(|command_buffer| {
                unsafe { device.create_fence(&fence_info, None) }
                    .map(|fence| FrameSync { command_buffer, fence })
                    .map_err(|e| engine_err!("galaxy3d::demo", "Failed to create frame fence: {:?}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        engine_info!("galaxy3d::demo", "Renderer ready: {}x{} {:?}, {} images",
            info.width, info.height, info.format, info.image_count);

        Ok(Self {
            context,
            swapchain,
            render_pass,
            render_pass_format,
            framebuffer,
            command_pool,
            frames,
            frame_index: 0,
            frame_count: 0,
        })
    }

    /// Rebuild the swapchain and everything that depends on its extent or format
    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        let info = self.swapchain.recreate(width, height)?;

        let format = format_to_vk(info.format);
        if format != self.render_pass_format {
            // Render passes are not tracked by the deletion queue
            self.context.wait_idle()?;
            let render_pass = create_clear_render_pass(&self.context, format)?;
            unsafe { self.context.device().destroy_render_pass(self.render_pass, None) };
            self.render_pass = render_pass;
            self.render_pass_format = format;
        }

        let framebuffer = ImagelessFramebufferBuilder::for_swapchain(self.render_pass, &info)
            .build(&self.context)?;
        let old = std::mem::replace(&mut self.framebuffer, framebuffer);
        self.swapchain.retire_framebuffer(old);
        Ok(())
    }

    /// Draw one frame, or skip it when there is nothing to draw into
    fn render_frame(&mut self, window_state: &mut WindowState) -> Result<()> {
        let (width, height) = window_state.size();
        if width == 0 || height == 0 {
            return Ok(());
        }

        if let Some((width, height)) = window_state.take_resize() {
            self.recreate(width, height)?;
        } else if self.swapchain.status() == SwapchainStatus::Expired {
            self.recreate(width, height)?;
        }

        let sync = self.frames[self.frame_index];
        let device = self.context.device();
        unsafe { device.wait_for_fences(&[sync.fence], true, u64::MAX) }
            .map_err(|e| engine_err!("galaxy3d::demo", "Failed to wait for frame fence: {:?}", e))?;

        let frame = match self.swapchain.acquire_image() {
            Ok(frame) => frame,
            Err(Error::SurfaceOutOfDate) => {
                window_state.request_resize();
                return Ok(());
            }
            Err(Error::AcquireFailed(message)) => {
                engine_warn!("galaxy3d::demo", "Dropped frame {}: {}", self.frame_count, message);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        // Occluded: hand the image back without drawing
        if window_state.is_iconified() {
            return self.swapchain.cancel_acquire_frame();
        }

        let info = self.swapchain.info()?;
        let extent = vk::Extent2D { width: info.width, height: info.height };
        if let Err(err) = self.record_clear(sync.command_buffer, frame.image_view, extent) {
            self.swapchain.cancel_acquire_frame()?;
            return Err(err);
        }

        let wait_semaphores = [frame.wait_semaphore];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [frame.signal_semaphore];
        let command_buffers = [sync.command_buffer];
        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe { device.reset_fences(&[sync.fence]) }
            .map_err(|e| engine_err!("galaxy3d::demo", "Failed to reset frame fence: {:?}", e))?;
        if let Err(err) = self.context.queue_submit(&[submit_info], sync.fence) {
            self.swapchain.cancel_acquire_frame()?;
            return Err(err);
        }

        match self.swapchain.present() {
            Ok(()) => {}
            Err(Error::SurfaceOutOfDate) => window_state.request_resize(),
            Err(Error::PresentFailed(message)) => {
                engine_warn!("galaxy3d::demo", "Dropped frame {}: {}", self.frame_count, message);
                self.swapchain.cancel_present_frame()?;
            }
            Err(err) => return Err(err),
        }

        self.frame_index = (self.frame_index + 1) % self.frames.len();
        self.frame_count += 1;
        Ok(())
    }

    fn record_clear(&self, command_buffer: vk::CommandBuffer, image_view: vk::ImageView, extent: vk::Extent2D) -> Result<()> {
        let device = self.context.device();
        let t = self.frame_count as f32 * 0.01;
        let clear_values = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: [0.5 + 0.5 * t.sin(), 0.2, 0.5 + 0.5 * t.cos(), 1.0],
            },
        }];
        let attachments = [image_view];
        let mut attachment_info = vk::RenderPassAttachmentBeginInfo::default().attachments(&attachments);
        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(self.render_pass)
            .framebuffer(self.framebuffer)
            .render_area(vk::Rect2D { offset: vk::Offset2D::default(), extent })
            .clear_values(&clear_values)
            .push_next(&mut attachment_info);

        unsafe {
            device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("galaxy3d::demo", "Failed to reset command buffer: {:?}", e))?;
            let cmd_begin = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(command_buffer, &cmd_begin)
                .map_err(|e| engine_err!("galaxy3d::demo", "Failed to begin command buffer: {:?}", e))?;
            device.cmd_begin_render_pass(command_buffer, &begin_info, vk::SubpassContents::INLINE);
            device.cmd_end_render_pass(command_buffer);
            device
                .end_command_buffer(command_buffer)
                .map_err(|e| engine_err!("galaxy3d::demo", "Failed to end command buffer: {:?}", e))?;
        }
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(err) = self.context.wait_idle() {
            engine_warn!("galaxy3d::demo", "wait_idle failed during shutdown: {}", err);
        }
        self.swapchain.retire_framebuffer(self.framebuffer);
        self.swapchain.destroy();

        let device = self.context.device();
        unsafe {
            for frame in &self.frames {
                device.destroy_fence(frame.fence, None);
            }
            device.destroy_command_pool(self.command_pool, None);
            device.destroy_render_pass(self.render_pass, None);
        }
    }
}

/// Single color attachment, cleared on load and left ready to present
fn create_clear_render_pass(context: &VulkanContext, format: vk::Format) -> Result<vk::RenderPass> {
    let attachments = [vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];
    let color_refs = [vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)];
    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs)];
    // The layout transition must wait for the acquire semaphore
    let dependencies = [vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)];

    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    unsafe { context.device().create_render_pass(&create_info, None) }
        .map_err(|e| engine_err!("galaxy3d::demo", "Failed to create render pass: {:?}", e))
}

// ===== Application =====

struct App {
    // Dropped before the window it renders to
    renderer: Option<Renderer>,
    window: Option<Window>,
    window_state: WindowState,
}

impl App {
    fn new() -> Self {
        Self {
            renderer: None,
            window: None,
            window_state: WindowState::new(0, 0),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Galaxy3D Present Demo")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(err) => {
                engine_error!("galaxy3d::demo", "Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        match Renderer::new(&window) {
            Ok(renderer) => {
                self.window_state = WindowState::from_window(&window);
                self.renderer = Some(renderer);
                self.window = Some(window);
            }
            Err(err) => {
                engine_error!("galaxy3d::demo", "Failed to create renderer: {}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.window_state.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                engine_info!("galaxy3d::demo", "Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                match renderer.render_frame(&mut self.window_state) {
                    Ok(()) => {}
                    Err(err @ Error::ResourceCreationFailed { .. }) => {
                        engine_warn!("galaxy3d::demo", "Swapchain rebuild failed, retrying next frame: {}", err);
                    }
                    Err(err) => {
                        engine_error!("galaxy3d::demo", "Render error: {}", err);
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.renderer = None;
    }
}

fn run() -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| Error::InitializationFailed(format!("Failed to create event loop: {}", e)))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::BackendError(format!("Event loop error: {}", e)))
}

fn main() {
    if let Err(err) = Engine::initialize() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
    engine_info!("galaxy3d::demo", "Starting Galaxy3D present demo");

    let result = run();

    #[cfg(feature = "vulkan-validation")]
    galaxy_3d_present_vulkan::galaxy3d::print_validation_stats_report();

    Engine::shutdown();

    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
