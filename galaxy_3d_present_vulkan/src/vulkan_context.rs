/// VulkanContext - Instance, surface, device and queues for presentation
///
/// Built once per window. Everything else in this crate borrows it through
/// an `Arc`: the present device, framebuffer builders, and the application's
/// own rendering code.

use ash::vk;
use galaxy_3d_present::galaxy3d::{Engine, Error, Result};
use galaxy_3d_present::{engine_debug, engine_err, engine_error, engine_info};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "vulkan-validation")]
const VALIDATION_LAYER: &std::ffi::CStr = c"VK_LAYER_KHRONOS_validation";

/// Which validation messages reach the callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugSeverity {
    ErrorsOnly,
    #[default]
    ErrorsAndWarnings,
    All,
}

impl DebugSeverity {
    /// Severity flags the debug messenger is registered for
    pub fn to_vk_flags(self) -> vk::DebugUtilsMessageSeverityFlagsEXT {
        match self {
            DebugSeverity::ErrorsOnly => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            DebugSeverity::ErrorsAndWarnings => {
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
            }
            DebugSeverity::All => {
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
            }
        }
    }
}

/// Where validation messages are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DebugOutput {
    #[default]
    Console,
    File(String),
    Both(String),
}

/// Validation message categories to display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessageFilter {
    pub show_general: bool,
    pub show_validation: bool,
    pub show_performance: bool,
}

impl Default for DebugMessageFilter {
    fn default() -> Self {
        Self {
            show_general: true,
            show_validation: true,
            show_performance: true,
        }
    }
}

/// Vulkan context configuration
///
/// The `debug_*`, `break_on_validation_error`, `panic_on_error` and
/// `enable_validation_stats` settings only take effect when the crate is
/// built with the `vulkan-validation` feature.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Application name reported to the driver
    pub app_name: String,
    /// Load VK_LAYER_KHRONOS_validation (skipped with a warning if not installed)
    pub enable_validation: bool,
    pub debug_severity: DebugSeverity,
    pub debug_output: DebugOutput,
    pub debug_message_filter: DebugMessageFilter,
    /// Abort the process on the first validation error
    pub break_on_validation_error: bool,
    /// Panic on the first validation error
    pub panic_on_error: bool,
    /// Count validation messages, see `get_validation_stats()`
    pub enable_validation_stats: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            app_name: "Galaxy3D Application".to_string(),
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::default(),
            debug_output: DebugOutput::default(),
            debug_message_filter: DebugMessageFilter::default(),
            break_on_validation_error: false,
            panic_on_error: false,
            enable_validation_stats: true,
        }
    }
}

/// Physical device picked for presentation
struct SelectedDevice {
    physical_device: vk::PhysicalDevice,
    graphics_queue_family: u32,
    present_queue_family: u32,
    name: String,
    discrete: bool,
}

/// Vulkan instance, window surface, logical device and queues
///
/// The device is created with `VK_KHR_swapchain` and the Vulkan 1.2
/// `imagelessFramebuffer` feature. Dropping the context waits for the device
/// to go idle; every swapchain built on it must be gone by then.
pub struct VulkanContext {
    _entry: ash::Entry,
    instance: ash::Instance,
    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    swapchain_loader: ash::khr::swapchain::Device,
    graphics_queue: vk::Queue,
    graphics_queue_family: u32,
    present_queue: vk::Queue,
    present_queue_family: u32,
    /// Queue access must be externally synchronized
    queue_lock: Mutex<()>,
}

/// Log and build an `InitializationFailed` error
fn init_error(what: &str, cause: impl Debug) -> Error {
    engine_error!("galaxy3d::vulkan", "{}: {:?}", what, cause);
    Error::InitializationFailed(format!("{}: {:?}", what, cause))
}

impl VulkanContext {
    /// Create the Vulkan context for a window
    ///
    /// # Arguments
    ///
    /// * `window` - Window to create the surface for
    /// * `config` - Context configuration
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the engine is not initialized, if no
    /// GPU can present to the window, or if any Vulkan call fails.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: ContextConfig,
    ) -> Result<Self> {
        Engine::require_initialized()?;

        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| init_error("Failed to load Vulkan library", e))?;

            let app_name = CString::new(config.app_name.as_str())
                .unwrap_or_else(|_| c"Galaxy3D Application".to_owned());
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Galaxy3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_2);

            let display_handle = window.display_handle()
                .map_err(|e| init_error("Failed to get display handle", e))?;
            let window_handle = window.window_handle()
                .map_err(|e| init_error("Failed to get window handle", e))?;

            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| init_error("Failed to get required extensions", e))?
                .to_vec();

            let validation = Self::validation_requested(&entry, &config);
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            #[cfg(feature = "vulkan-validation")]
            let layer_names = if validation { vec![VALIDATION_LAYER.as_ptr()] } else { Vec::new() };
            #[cfg(not(feature = "vulkan-validation"))]
            let layer_names: Vec<*const std::ffi::c_char> = Vec::new();

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| init_error("Failed to create Vulkan instance", e))?;

            #[cfg(feature = "vulkan-validation")]
            let debug_messenger = if validation {
                Some(Self::create_debug_messenger(&entry, &instance, &config)?)
            } else {
                None
            };

            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| init_error("Failed to create surface", e))?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let selected = Self::select_physical_device(&instance, &surface_loader, surface)?;

            // One queue per distinct family
            let queue_priorities = [1.0];
            let mut queue_create_infos = vec![
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(selected.graphics_queue_family)
                    .queue_priorities(&queue_priorities),
            ];
            if selected.present_queue_family != selected.graphics_queue_family {
                queue_create_infos.push(
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(selected.present_queue_family)
                        .queue_priorities(&queue_priorities),
                );
            }

            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
            let mut features12 = vk::PhysicalDeviceVulkan12Features::default()
                .imageless_framebuffer(true);

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .push_next(&mut features12);

            let device = instance
                .create_device(selected.physical_device, &device_create_info, None)
                .map_err(|e| init_error("Failed to create logical device", e))?;

            let graphics_queue = device.get_device_queue(selected.graphics_queue_family, 0);
            let present_queue = device.get_device_queue(selected.present_queue_family, 0);
            let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

            engine_info!("galaxy3d::vulkan",
                "Vulkan context ready on {} (graphics family {}, present family {}, validation {})",
                selected.name, selected.graphics_queue_family, selected.present_queue_family,
                if validation { "on" } else { "off" });

            Ok(Self {
                _entry: entry,
                instance,
                #[cfg(feature = "vulkan-validation")]
                debug_messenger,
                surface_loader,
                surface,
                physical_device: selected.physical_device,
                device,
                swapchain_loader,
                graphics_queue,
                graphics_queue_family: selected.graphics_queue_family,
                present_queue,
                present_queue_family: selected.present_queue_family,
                queue_lock: Mutex::new(()),
            })
        }
    }

    #[cfg(feature = "vulkan-validation")]
    fn validation_requested(entry: &ash::Entry, config: &ContextConfig) -> bool {
        if !config.enable_validation {
            return false;
        }
        let available = unsafe { entry.enumerate_instance_layer_properties() }
            .map(|layers| {
                layers.iter().any(|layer| {
                    layer.layer_name_as_c_str().is_ok_and(|name| name == VALIDATION_LAYER)
                })
            })
            .unwrap_or(false);
        if !available {
            galaxy_3d_present::engine_warn!("galaxy3d::vulkan",
                "{:?} is not installed, running without validation", VALIDATION_LAYER);
        }
        available
    }

    #[cfg(not(feature = "vulkan-validation"))]
    fn validation_requested(_entry: &ash::Entry, config: &ContextConfig) -> bool {
        if config.enable_validation {
            engine_debug!("galaxy3d::vulkan",
                "Validation requested but the vulkan-validation feature is disabled");
        }
        false
    }

    #[cfg(feature = "vulkan-validation")]
    unsafe fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
        config: &ContextConfig,
    ) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

        crate::debug::init_debug_config(crate::debug::Config {
            severity: config.debug_severity,
            output: config.debug_output.clone(),
            message_filter: config.debug_message_filter,
            break_on_error: config.break_on_validation_error,
            panic_on_error: config.panic_on_error,
            enable_stats: config.enable_validation_stats,
        });

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(config.debug_severity.to_vk_flags())
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        let messenger = debug_utils
            .create_debug_utils_messenger(&debug_info, None)
            .map_err(|e| init_error("Failed to create debug messenger", e))?;

        Ok((debug_utils, messenger))
    }

    /// Pick a GPU that can render and present to `surface`
    ///
    /// Requires Vulkan 1.2, `VK_KHR_swapchain` and imageless framebuffers.
    /// Discrete GPUs win over everything else; otherwise the first match.
    unsafe fn select_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<SelectedDevice> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| init_error("Failed to enumerate physical devices", e))?;

        let mut best: Option<SelectedDevice> = None;

        for physical_device in physical_devices {
            let properties = instance.get_physical_device_properties(physical_device);
            let name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "Unknown Device".to_string());

            if properties.api_version < vk::API_VERSION_1_2 {
                engine_debug!("galaxy3d::vulkan", "Skipping {}: Vulkan 1.2 not supported", name);
                continue;
            }
            if !Self::supports_presentation_features(instance, physical_device) {
                engine_debug!("galaxy3d::vulkan",
                    "Skipping {}: missing VK_KHR_swapchain or imageless framebuffers", name);
                continue;
            }

            let queue_families = instance.get_physical_device_queue_family_properties(physical_device);
            let can_present = |index: u32| {
                surface_loader
                    .get_physical_device_surface_support(physical_device, index, surface)
                    .unwrap_or(false)
            };
            let is_graphics = |index: u32| {
                queue_families[index as usize].queue_flags.contains(vk::QueueFlags::GRAPHICS)
            };
            let family_count = queue_families.len() as u32;

            // A single family doing both avoids ownership transfers
            let families = match (0..family_count).find(|&i| is_graphics(i) && can_present(i)) {
                Some(shared) => Some((shared, shared)),
                None => (0..family_count)
                    .find(|&i| is_graphics(i))
                    .zip((0..family_count).find(|&i| can_present(i))),
            };
            let Some((graphics_queue_family, present_queue_family)) = families else {
                engine_debug!("galaxy3d::vulkan", "Skipping {}: cannot present to this surface", name);
                continue;
            };

            let discrete = properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU;
            if best.as_ref().map_or(true, |current| discrete && !current.discrete) {
                best = Some(SelectedDevice {
                    physical_device,
                    graphics_queue_family,
                    present_queue_family,
                    name,
                    discrete,
                });
            }
        }

        best.ok_or_else(|| {
            engine_error!("galaxy3d::vulkan", "No GPU can present to this window");
            Error::InitializationFailed("No GPU can present to this window".to_string())
        })
    }

    unsafe fn supports_presentation_features(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> bool {
        let has_swapchain = instance
            .enumerate_device_extension_properties(physical_device)
            .map(|extensions| {
                extensions.iter().any(|extension| {
                    extension.extension_name_as_c_str().is_ok_and(|name| name == ash::khr::swapchain::NAME)
                })
            })
            .unwrap_or(false);

        let mut features12 = vk::PhysicalDeviceVulkan12Features::default();
        {
            let mut features2 = vk::PhysicalDeviceFeatures2::default().push_next(&mut features12);
            instance.get_physical_device_features2(physical_device, &mut features2);
        }

        has_swapchain && features12.imageless_framebuffer == vk::TRUE
    }

    /// Submit command buffers to the graphics queue
    pub fn queue_submit(&self, submits: &[vk::SubmitInfo<'_>], fence: vk::Fence) -> Result<()> {
        let _guard = self.queue_lock.lock().unwrap_or_else(PoisonError::into_inner);
        unsafe { self.device.queue_submit(self.graphics_queue, submits, fence) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to submit commands to GPU queue: {:?}", e))
    }

    /// Present on the present queue, returning the suboptimal flag
    pub(crate) fn queue_present(&self, present_info: &vk::PresentInfoKHR<'_>) -> ash::prelude::VkResult<bool> {
        let _guard = self.queue_lock.lock().unwrap_or_else(PoisonError::into_inner);
        unsafe { self.swapchain_loader.queue_present(self.present_queue, present_info) }
    }

    /// Block until every queue of the device is idle
    pub fn wait_idle(&self) -> Result<()> {
        let _guard = self.queue_lock.lock().unwrap_or_else(PoisonError::into_inner);
        unsafe { self.device.device_wait_idle() }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to wait for device idle: {:?}", e))
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub fn surface_loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }

    pub fn swapchain_loader(&self) -> &ash::khr::swapchain::Device {
        &self.swapchain_loader
    }

    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }

    pub fn present_queue_family(&self) -> u32 {
        self.present_queue_family
    }

    #[cfg(feature = "vulkan-validation")]
    unsafe fn destroy_debug_messenger(&mut self) {
        if let Some((debug_utils, messenger)) = self.debug_messenger.take() {
            // No callback may run against a cleared config
            crate::debug::cleanup_debug_config();
            debug_utils.destroy_debug_utils_messenger(messenger, None);
        }
    }

    #[cfg(not(feature = "vulkan-validation"))]
    unsafe fn destroy_debug_messenger(&mut self) {}
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // Device, then surface, then messenger, then instance
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            self.destroy_debug_messenger();
            self.instance.destroy_instance(None);
        }
        engine_debug!("galaxy3d::vulkan", "Vulkan context destroyed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "vulkan_context_tests.rs"]
mod tests;
