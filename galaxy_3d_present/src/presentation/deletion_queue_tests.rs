//! Unit tests for DeletionQueue
//!
//! Uses MockPresentDevice to check when (and how often) each handle is destroyed.

use super::*;
use crate::device::mock_present_device::{MockDestroyed, MockPresentDevice};

fn queue(depth: u32) -> (Arc<MockPresentDevice>, DeletionQueue<MockPresentDevice>) {
    let device = Arc::new(MockPresentDevice::new(3));
    let queue = DeletionQueue::new(Arc::clone(&device), depth).unwrap();
    (device, queue)
}

// ============================================================================
// CONSTRUCTION TESTS
// ============================================================================

#[test]
fn test_new_valid_depths() {
    for depth in 1..=8 {
        let (_device, queue) = queue(depth);
        assert_eq!(queue.depth(), depth as usize);
        assert_eq!(queue.pending_count(), 0);
    }
}

#[test]
fn test_new_rejects_zero_depth() {
    let device = Arc::new(MockPresentDevice::new(3));
    let result = DeletionQueue::new(device, 0);
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
fn test_new_rejects_depth_above_max() {
    let device = Arc::new(MockPresentDevice::new(3));
    let result = DeletionQueue::new(device, 9);
    match result {
        Err(Error::InitializationFailed(msg)) => assert!(msg.contains("got 9")),
        _ => panic!("expected InitializationFailed"),
    }
}

// ============================================================================
// TICK TESTS
// ============================================================================

#[test]
fn test_depth_two_destroys_on_second_tick() {
    // image_count = 3, depth = 2
    let (device, mut queue) = queue(2);
    let a = device.make_handle();
    let b = device.make_handle();
    queue.add_images(&[a, b]);
    assert_eq!(queue.pending_count(), 2);

    queue.tick();
    assert!(device.destroyed().is_empty());
    assert_eq!(queue.pending_count(), 2);

    queue.tick();
    assert_eq!(device.destroyed(), vec![MockDestroyed::Image(a), MockDestroyed::Image(b)]);
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn test_handle_destroyed_exactly_once_after_depth_ticks() {
    let depth = 3;
    let (device, mut queue) = queue(depth);
    let view = device.make_handle();
    queue.add_image_view(view);

    for cycle in 0..10 {
        queue.tick();
        let count = device.destroy_count(MockDestroyed::ImageView(view));
        if cycle < depth as usize - 1 {
            assert_eq!(count, 0, "destroyed too early at cycle {}", cycle);
        } else {
            assert_eq!(count, 1, "wrong destroy count at cycle {}", cycle);
        }
    }
}

#[test]
fn test_depth_one_destroys_on_first_tick() {
    let (device, mut queue) = queue(1);
    let swapchain = device.make_handle();
    queue.add_swapchain(swapchain);
    queue.tick();
    assert_eq!(device.destroyed(), vec![MockDestroyed::Swapchain(swapchain)]);
}

#[test]
fn test_each_generation_destroyed_separately() {
    let (device, mut queue) = queue(2);
    let first = device.make_handle();
    let second = device.make_handle();

    queue.add_framebuffer(first);
    queue.tick();
    queue.add_framebuffer(second);

    queue.tick();
    assert_eq!(device.destroyed(), vec![MockDestroyed::Framebuffer(first)]);

    queue.tick();
    assert_eq!(
        device.destroyed(),
        vec![MockDestroyed::Framebuffer(first), MockDestroyed::Framebuffer(second)]
    );
}

#[test]
fn test_flush_order_framebuffers_views_images_swapchains() {
    let (device, mut queue) = queue(1);
    let swapchain = device.make_handle();
    let image = device.make_handle();
    let view = device.make_handle();
    let framebuffer = device.make_handle();

    queue.add_swapchain(swapchain);
    queue.add_image(image);
    queue.add_image_views(&[view]);
    queue.add_framebuffers(&[framebuffer]);
    queue.tick();

    assert_eq!(
        device.destroyed(),
        vec![
            MockDestroyed::Framebuffer(framebuffer),
            MockDestroyed::ImageView(view),
            MockDestroyed::Image(image),
            MockDestroyed::Swapchain(swapchain),
        ]
    );
}

// ============================================================================
// DESTROY TESTS
// ============================================================================

#[test]
fn test_destroy_flushes_all_generations() {
    let (device, mut queue) = queue(4);
    let handles: Vec<_> = (0..4).map(|_| device.make_handle()).collect();
    for handle in &handles {
        queue.add_image_view(*handle);
        queue.tick();
    }
    // Nothing is old enough yet except the first one
    assert_eq!(device.destroyed().len(), 1);

    queue.destroy();
    assert_eq!(queue.pending_count(), 0);
    for handle in &handles {
        assert_eq!(device.destroy_count(MockDestroyed::ImageView(*handle)), 1);
    }
}

#[test]
fn test_destroy_is_idempotent() {
    let (device, mut queue) = queue(2);
    queue.add_image(device.make_handle());
    queue.destroy();
    queue.destroy();
    assert_eq!(device.destroyed().len(), 1);
}

#[test]
fn test_drop_destroys_pending_handles() {
    let (device, mut queue) = queue(3);
    let image = device.make_handle();
    queue.add_image(image);
    drop(queue);
    assert_eq!(device.destroy_count(MockDestroyed::Image(image)), 1);
}
