/// SemaphoreManager - per-image semaphore pairs with idle pool and quarantine
///
/// Every swapchain image index owns a [`SyncSlot`]: the semaphore the
/// acquire signals and the semaphore the rendering submission signals.
/// Acquire itself always signals `current_acquire`, a spare that is swapped
/// into the slot once the driver tells us which index it resolved to.
///
/// A semaphore bound to an index is only reused after that index is
/// acquired again, which cannot happen before its previous frame was
/// presented. Recreating the swapchain breaks that chain, so bound
/// semaphores are quarantined in an expired ring for
/// [`FRAMES_IN_FLIGHT`] acquires before going back to the idle pool.

use std::sync::Arc;
use crate::device::PresentDevice;
use crate::error::{Error, Result};
use crate::presentation::{FRAMES_IN_FLIGHT, MAX_SWAPCHAIN_IMAGE_COUNT};
use crate::utils::GenerationRing;

/// Semaphores bound to one swapchain image index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSlot<S> {
    /// Signaled by the acquire that resolved to this index
    pub acquire: S,
    /// Signaled by the submission rendering into this index, waited by present
    pub submit: S,
    /// Acquired at least once since the last recreate
    pub in_use: bool,
}

/// Owner of every semaphore used by a swapchain
pub struct SemaphoreManager<D: PresentDevice> {
    device: Arc<D>,
    slots: Vec<SyncSlot<D::Semaphore>>,
    current_acquire: Option<D::Semaphore>,
    current_index: Option<u32>,
    idle: Vec<D::Semaphore>,
    expired: GenerationRing<Vec<D::Semaphore>>,
}

impl<D: PresentDevice> SemaphoreManager<D> {
    /// Create the manager for a swapchain of `image_count` images
    ///
    /// Pre-fills the idle pool with `initial_idle` semaphores, then binds a
    /// fresh pair to every slot. On failure every semaphore created so far
    /// is destroyed.
    pub fn new(device: Arc<D>, image_count: u32, initial_idle: usize) -> Result<Self> {
        if image_count == 0 || image_count as usize > MAX_SWAPCHAIN_IMAGE_COUNT {
            return Err(Error::InitializationFailed(format!(
                "Swapchain image count must be in 1..={}, got {}",
                MAX_SWAPCHAIN_IMAGE_COUNT, image_count
            )));
        }

        let mut manager = Self {
            device,
            slots: Vec::with_capacity(image_count as usize),
            current_acquire: None,
            current_index: None,
            idle: Vec::with_capacity(initial_idle),
            expired: GenerationRing::new(FRAMES_IN_FLIGHT),
        };

        // Partially built managers clean up through Drop
        for _ in 0..initial_idle {
            let semaphore = manager.device.create_semaphore()?;
            manager.idle.push(semaphore);
        }
        manager.resize_slots(image_count as usize)?;
        manager.current_acquire = Some(manager.fresh_semaphore()?);

        crate::engine_debug!(
            "galaxy3d::present",
            "Semaphore manager created: {} slots, {} idle",
            manager.slots.len(),
            manager.idle.len()
        );
        Ok(manager)
    }

    // ===== ACCESSORS =====

    /// Semaphore the next acquire must signal
    ///
    /// `None` only after [`destroy`](Self::destroy).
    pub fn next_acquire_semaphore(&self) -> Option<D::Semaphore> {
        self.current_acquire
    }

    /// Acquire semaphore of the last acquired index
    pub fn acquire_semaphore(&self) -> Option<D::Semaphore> {
        self.current_slot().map(|slot| slot.acquire)
    }

    /// Submit semaphore of the last acquired index
    pub fn submit_semaphore(&self) -> Option<D::Semaphore> {
        self.current_slot().map(|slot| slot.submit)
    }

    /// Last acquired index, `None` after a recreate
    pub fn current_index(&self) -> Option<u32> {
        self.current_index
    }

    pub fn slot(&self, index: u32) -> Option<&SyncSlot<D::Semaphore>> {
        self.slots.get(index as usize)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Semaphores quarantined by recent recreates
    pub fn expired_count(&self) -> usize {
        self.expired.iter().map(Vec::len).sum()
    }

    /// Whether `semaphore` currently sits in the idle pool
    pub fn is_idle(&self, semaphore: D::Semaphore) -> bool {
        self.idle.contains(&semaphore)
    }

    fn current_slot(&self) -> Option<&SyncSlot<D::Semaphore>> {
        self.current_index.and_then(|index| self.slots.get(index as usize))
    }

    // ===== FRAME OPERATIONS =====

    /// Bind the semaphore the last acquire signaled to image `index`
    ///
    /// The semaphore previously bound to `index` becomes the next
    /// acquire semaphore: its wait completed before that image could be
    /// acquired again. Also advances the expired ring, releasing the
    /// semaphores quarantined [`FRAMES_IN_FLIGHT`] acquires ago.
    pub fn update_current_index(&mut self, index: u32) {
        let slot_count = self.slots.len();
        let Some(slot) = self.slots.get_mut(index as usize) else {
            crate::engine_error!(
                "galaxy3d::present",
                "update_current_index({}) out of range ({} slots)",
                index,
                slot_count
            );
            return;
        };

        if let Some(current) = self.current_acquire.as_mut() {
            std::mem::swap(current, &mut slot.acquire);
        }
        slot.in_use = true;
        self.current_index = Some(index);

        let released = self.expired.advance();
        if !released.is_empty() {
            crate::engine_trace!(
                "galaxy3d::present",
                "{} expired semaphore(s) back to the idle pool",
                released.len()
            );
            self.idle.append(released);
        }
    }

    /// Quarantine every bound semaphore after a swapchain rebuild
    ///
    /// In-use slots and the spare acquire semaphore get fresh semaphores;
    /// the old ones wait in the current expired generation. The slot table
    /// is resized to `image_count`, dropped slots returning their (never
    /// signaled) semaphores to the idle pool.
    pub fn recreate_resources(&mut self, image_count: u32) -> Result<()> {
        if image_count == 0 || image_count as usize > MAX_SWAPCHAIN_IMAGE_COUNT {
            return Err(Error::InitializationFailed(format!(
                "Swapchain image count must be in 1..={}, got {}",
                MAX_SWAPCHAIN_IMAGE_COUNT, image_count
            )));
        }

        let mut quarantined = 0;
        for index in 0..self.slots.len() {
            if !self.slots[index].in_use {
                continue;
            }
            let (acquire, submit) = self.fresh_pair()?;
            let slot = &mut self.slots[index];
            let old_acquire = std::mem::replace(&mut slot.acquire, acquire);
            let old_submit = std::mem::replace(&mut slot.submit, submit);
            slot.in_use = false;
            self.expired.current_mut().extend([old_acquire, old_submit]);
            quarantined += 2;
        }

        let fresh = self.fresh_semaphore()?;
        if let Some(old) = self.current_acquire.replace(fresh) {
            self.expired.current_mut().push(old);
            quarantined += 1;
        }
        self.current_index = None;

        self.resize_slots(image_count as usize)?;

        crate::engine_debug!(
            "galaxy3d::present",
            "Semaphores recreated: {} quarantined, {} slots, {} idle",
            quarantined,
            self.slots.len(),
            self.idle.len()
        );
        Ok(())
    }

    /// Take a semaphore from the idle pool, keeping one in reserve, or create one
    pub fn fresh_semaphore(&mut self) -> Result<D::Semaphore> {
        if self.idle.len() >= 2 {
            if let Some(semaphore) = self.idle.pop() {
                return Ok(semaphore);
            }
        }
        self.device.create_semaphore()
    }

    /// Destroy every semaphore the manager owns
    ///
    /// The device must be idle. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        let device = &self.device;
        for slot in self.slots.drain(..) {
            device.destroy_semaphore(slot.acquire);
            device.destroy_semaphore(slot.submit);
        }
        for bucket in self.expired.iter_mut() {
            for semaphore in bucket.drain(..) {
                device.destroy_semaphore(semaphore);
            }
        }
        for semaphore in self.idle.drain(..) {
            device.destroy_semaphore(semaphore);
        }
        if let Some(semaphore) = self.current_acquire.take() {
            device.destroy_semaphore(semaphore);
        }
        self.current_index = None;
    }

    /// Grow or shrink the slot table; only unbound slots may be dropped
    fn resize_slots(&mut self, image_count: usize) -> Result<()> {
        while self.slots.len() > image_count {
            if let Some(slot) = self.slots.pop() {
                debug_assert!(!slot.in_use, "dropping a slot that is still in use");
                self.idle.extend([slot.acquire, slot.submit]);
            }
        }
        while self.slots.len() < image_count {
            let (acquire, submit) = self.fresh_pair()?;
            self.slots.push(SyncSlot { acquire, submit, in_use: false });
        }
        Ok(())
    }

    /// Two fresh semaphores; on failure the first one goes back to the idle pool
    fn fresh_pair(&mut self) -> Result<(D::Semaphore, D::Semaphore)> {
        let acquire = self.fresh_semaphore()?;
        match self.fresh_semaphore() {
            Ok(submit) => Ok((acquire, submit)),
            Err(err) => {
                self.idle.push(acquire);
                Err(err)
            }
        }
    }
}

impl<D: PresentDevice> Drop for SemaphoreManager<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "semaphore_manager_tests.rs"]
mod tests;
