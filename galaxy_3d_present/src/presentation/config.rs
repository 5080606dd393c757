/// Configuration of the swapchain manager

/// Swapchain manager configuration
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_present::galaxy3d::present::Config;
///
/// let config = Config {
///     deletion_queue_depth: Some(4),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Presented frames a retired resource waits before destruction
    /// (None = image count of the first swapchain, at least FRAMES_IN_FLIGHT;
    /// valid range FRAMES_IN_FLIGHT..=8)
    pub deletion_queue_depth: Option<u32>,

    /// Timeout passed to every acquire, in nanoseconds
    pub acquire_timeout_ns: u64,

    /// Semaphores created up front into the idle pool
    pub initial_idle_semaphores: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deletion_queue_depth: None,
            acquire_timeout_ns: u64::MAX,
            initial_idle_semaphores: 10,
        }
    }
}
