/// Mock PresentDevice for unit tests (no GPU required)
///
/// Hands out unique integer handles, records every driver call, and lets a
/// test script the results of acquire/present and inject creation failures.

#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use rustc_hash::FxHashSet;

#[cfg(test)]
use crate::device::{
    AcquiredImage, ImageUsage, PresentDevice, SurfaceResult, SwapchainBuild, SwapchainDesc,
    TextureFormat,
};
#[cfg(test)]
use crate::error::{Error, ResourceKind, Result};

// ============================================================================
// Mock handles and call records
// ============================================================================

/// Handle returned by the mock device, unique across all kinds
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockHandle(pub u64);

/// One destroy call seen by the mock device
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockDestroyed {
    Semaphore(MockHandle),
    Image(MockHandle),
    ImageView(MockHandle),
    Framebuffer(MockHandle),
    Swapchain(MockHandle),
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockAcquireCall {
    pub swapchain: MockHandle,
    pub timeout_ns: u64,
    pub semaphore: MockHandle,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPresentCall {
    pub swapchain: MockHandle,
    pub image_index: u32,
    pub wait_semaphore: MockHandle,
}

// ============================================================================
// Mock device state
// ============================================================================

#[cfg(test)]
#[derive(Debug, Default)]
struct MockState {
    next_handle: u64,
    image_count: u32,
    next_image_index: u32,

    live_semaphores: FxHashSet<MockHandle>,
    live_views: FxHashSet<MockHandle>,
    live_swapchains: FxHashSet<MockHandle>,
    semaphores_created: usize,

    acquire_results: VecDeque<SurfaceResult<AcquiredImage>>,
    present_results: VecDeque<SurfaceResult<bool>>,
    swapchain_failure: Option<Error>,
    views_before_failure: Option<usize>,
    semaphores_before_failure: Option<usize>,

    acquire_calls: Vec<MockAcquireCall>,
    present_calls: Vec<MockPresentCall>,
    waited_semaphores: Vec<MockHandle>,
    swapchain_builds: Vec<(SwapchainDesc, Option<MockHandle>)>,
    destroyed: Vec<MockDestroyed>,
    wait_idle_calls: usize,
}

#[cfg(test)]
impl MockState {
    fn alloc(&mut self) -> MockHandle {
        self.next_handle += 1;
        MockHandle(self.next_handle)
    }
}

/// Mock graphics device
#[cfg(test)]
pub struct MockPresentDevice {
    state: Mutex<MockState>,
}

#[cfg(test)]
impl MockPresentDevice {
    /// Device whose swapchains have `image_count` images
    pub fn new(image_count: u32) -> Self {
        Self {
            state: Mutex::new(MockState {
                image_count,
                ..Default::default()
            }),
        }
    }

    // ===== SCRIPTING =====

    /// Queue the result of a future acquire (default: round-robin success)
    pub fn script_acquire(&self, result: SurfaceResult<AcquiredImage>) {
        self.state.lock().unwrap().acquire_results.push_back(result);
    }

    /// Queue the result of a future present (default: Ok(false))
    pub fn script_present(&self, result: SurfaceResult<bool>) {
        self.state.lock().unwrap().present_results.push_back(result);
    }

    /// Make the next create_swapchain fail with `error`
    pub fn fail_next_swapchain(&self, error: Error) {
        self.state.lock().unwrap().swapchain_failure = Some(error);
    }

    /// Let `count` image views succeed, then fail the next one
    pub fn fail_image_view_after(&self, count: usize) {
        self.state.lock().unwrap().views_before_failure = Some(count);
    }

    /// Let `count` semaphores succeed, then fail the next one
    pub fn fail_semaphore_after(&self, count: usize) {
        self.state.lock().unwrap().semaphores_before_failure = Some(count);
    }

    /// Image count of swapchains built from now on
    pub fn set_image_count(&self, image_count: u32) {
        let mut state = self.state.lock().unwrap();
        state.image_count = image_count;
        state.next_image_index = 0;
    }

    // ===== INSPECTION =====

    pub fn acquire_calls(&self) -> Vec<MockAcquireCall> {
        self.state.lock().unwrap().acquire_calls.clone()
    }

    pub fn present_calls(&self) -> Vec<MockPresentCall> {
        self.state.lock().unwrap().present_calls.clone()
    }

    pub fn waited_semaphores(&self) -> Vec<MockHandle> {
        self.state.lock().unwrap().waited_semaphores.clone()
    }

    pub fn swapchain_builds(&self) -> Vec<(SwapchainDesc, Option<MockHandle>)> {
        self.state.lock().unwrap().swapchain_builds.clone()
    }

    pub fn destroyed(&self) -> Vec<MockDestroyed> {
        self.state.lock().unwrap().destroyed.clone()
    }

    /// How many times this exact handle was destroyed
    pub fn destroy_count(&self, destroyed: MockDestroyed) -> usize {
        self.state.lock().unwrap().destroyed.iter().filter(|d| **d == destroyed).count()
    }

    pub fn live_semaphores(&self) -> FxHashSet<MockHandle> {
        self.state.lock().unwrap().live_semaphores.clone()
    }

    pub fn live_view_count(&self) -> usize {
        self.state.lock().unwrap().live_views.len()
    }

    pub fn live_swapchain_count(&self) -> usize {
        self.state.lock().unwrap().live_swapchains.len()
    }

    pub fn semaphores_created(&self) -> usize {
        self.state.lock().unwrap().semaphores_created
    }

    pub fn wait_idle_calls(&self) -> usize {
        self.state.lock().unwrap().wait_idle_calls
    }

    /// Hand out a handle for tests that retire their own objects
    pub fn make_handle(&self) -> MockHandle {
        self.state.lock().unwrap().alloc()
    }
}

#[cfg(test)]
impl PresentDevice for MockPresentDevice {
    type Semaphore = MockHandle;
    type Image = MockHandle;
    type ImageView = MockHandle;
    type Framebuffer = MockHandle;
    type Swapchain = MockHandle;

    fn create_semaphore(&self) -> Result<MockHandle> {
        let mut state = self.state.lock().unwrap();
        match state.semaphores_before_failure {
            Some(0) => {
                state.semaphores_before_failure = None;
                return Err(Error::creation_failed(ResourceKind::Semaphore, "mock semaphore failure"));
            }
            Some(n) => state.semaphores_before_failure = Some(n - 1),
            None => {}
        }
        let handle = state.alloc();
        state.live_semaphores.insert(handle);
        state.semaphores_created += 1;
        Ok(handle)
    }

    fn destroy_semaphore(&self, semaphore: MockHandle) {
        let mut state = self.state.lock().unwrap();
        state.live_semaphores.remove(&semaphore);
        state.destroyed.push(MockDestroyed::Semaphore(semaphore));
    }

    fn create_swapchain(
        &self,
        desc: &SwapchainDesc,
        old_swapchain: Option<MockHandle>,
    ) -> Result<SwapchainBuild<MockHandle, MockHandle>> {
        let mut state = self.state.lock().unwrap();
        state.swapchain_builds.push((desc.clone(), old_swapchain));
        if let Some(error) = state.swapchain_failure.take() {
            return Err(error);
        }

        let swapchain = state.alloc();
        state.live_swapchains.insert(swapchain);
        let images = (0..state.image_count).map(|_| state.alloc()).collect();
        state.next_image_index = 0;

        Ok(SwapchainBuild {
            swapchain,
            images,
            format: desc.preferred_formats.first().copied().unwrap_or(TextureFormat::B8G8R8A8_UNORM),
            width: if desc.width == 0 { 800 } else { desc.width },
            height: if desc.height == 0 { 600 } else { desc.height },
            usage: desc.usage | ImageUsage::COLOR_ATTACHMENT,
        })
    }

    fn create_image_view(&self, _image: MockHandle, _format: TextureFormat) -> Result<MockHandle> {
        let mut state = self.state.lock().unwrap();
        match state.views_before_failure {
            Some(0) => {
                state.views_before_failure = None;
                return Err(Error::creation_failed(ResourceKind::ImageViews, "mock view failure"));
            }
            Some(n) => state.views_before_failure = Some(n - 1),
            None => {}
        }
        let view = state.alloc();
        state.live_views.insert(view);
        Ok(view)
    }

    fn acquire_next_image(
        &self,
        swapchain: MockHandle,
        timeout_ns: u64,
        semaphore: MockHandle,
    ) -> SurfaceResult<AcquiredImage> {
        let mut state = self.state.lock().unwrap();
        state.acquire_calls.push(MockAcquireCall { swapchain, timeout_ns, semaphore });
        if let Some(result) = state.acquire_results.pop_front() {
            return result;
        }
        let index = state.next_image_index;
        state.next_image_index = (index + 1) % state.image_count.max(1);
        Ok(AcquiredImage { index, suboptimal: false })
    }

    fn queue_present(
        &self,
        swapchain: MockHandle,
        image_index: u32,
        wait_semaphore: MockHandle,
    ) -> SurfaceResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.present_calls.push(MockPresentCall { swapchain, image_index, wait_semaphore });
        state.present_results.pop_front().unwrap_or(Ok(false))
    }

    fn wait_semaphore(&self, semaphore: MockHandle) -> Result<()> {
        self.state.lock().unwrap().waited_semaphores.push(semaphore);
        Ok(())
    }

    fn destroy_image(&self, image: MockHandle) {
        self.state.lock().unwrap().destroyed.push(MockDestroyed::Image(image));
    }

    fn destroy_image_view(&self, view: MockHandle) {
        let mut state = self.state.lock().unwrap();
        state.live_views.remove(&view);
        state.destroyed.push(MockDestroyed::ImageView(view));
    }

    fn destroy_framebuffer(&self, framebuffer: MockHandle) {
        self.state.lock().unwrap().destroyed.push(MockDestroyed::Framebuffer(framebuffer));
    }

    fn destroy_swapchain(&self, swapchain: MockHandle) {
        let mut state = self.state.lock().unwrap();
        state.live_swapchains.remove(&swapchain);
        state.destroyed.push(MockDestroyed::Swapchain(swapchain));
    }

    fn wait_idle(&self) -> Result<()> {
        self.state.lock().unwrap().wait_idle_calls += 1;
        Ok(())
    }
}
