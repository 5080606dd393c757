use super::*;

// ============================================================================
// Construction tests
// ============================================================================

#[test]
fn test_new_ring_is_empty() {
    let ring: GenerationRing<Vec<u32>> = GenerationRing::new(3);
    assert_eq!(ring.depth(), 3);
    assert_eq!(ring.current_index(), 0);
    assert!(ring.iter().all(|bucket| bucket.is_empty()));
}

#[test]
#[cfg(not(debug_assertions))]
fn test_zero_depth_is_clamped_to_one() {
    let ring: GenerationRing<Vec<u32>> = GenerationRing::new(0);
    assert_eq!(ring.depth(), 1);
}

// ============================================================================
// Advance tests
// ============================================================================

#[test]
fn test_advance_wraps_around() {
    let mut ring: GenerationRing<Vec<u32>> = GenerationRing::new(3);
    ring.advance();
    assert_eq!(ring.current_index(), 1);
    ring.advance();
    assert_eq!(ring.current_index(), 2);
    ring.advance();
    assert_eq!(ring.current_index(), 0);
}

#[test]
fn test_items_come_back_after_depth_advances() {
    let mut ring: GenerationRing<Vec<u32>> = GenerationRing::new(2);
    ring.current_mut().push(7);
    ring.current_mut().push(8);

    // One advance: not old enough yet
    assert!(ring.advance().is_empty());

    // Second advance: the generation that received 7 and 8
    let reached = std::mem::take(ring.advance());
    assert_eq!(reached, vec![7, 8]);
    assert!(ring.current().is_empty());
}

#[test]
fn test_depth_one_reclaims_on_next_advance() {
    let mut ring: GenerationRing<Vec<&str>> = GenerationRing::new(1);
    ring.current_mut().push("view");
    assert_eq!(ring.advance(), &mut vec!["view"]);
}

#[test]
fn test_items_pushed_in_different_generations_stay_separate() {
    let mut ring: GenerationRing<Vec<u32>> = GenerationRing::new(3);
    ring.current_mut().push(1);
    ring.advance();
    ring.current_mut().push(2);
    ring.advance();
    ring.current_mut().push(3);

    // Reaches generation 0 again
    assert_eq!(std::mem::take(ring.advance()), vec![1]);
    assert_eq!(std::mem::take(ring.advance()), vec![2]);
    assert_eq!(std::mem::take(ring.advance()), vec![3]);
}

// ============================================================================
// Iteration tests
// ============================================================================

#[test]
fn test_iter_is_oldest_first() {
    let mut ring: GenerationRing<Vec<u32>> = GenerationRing::new(3);
    ring.current_mut().push(1);
    ring.advance();
    ring.current_mut().push(2);
    ring.advance();
    ring.current_mut().push(3);
    ring.advance();
    std::mem::take(ring.current_mut());
    ring.current_mut().push(4);

    let order: Vec<u32> = ring.iter().flatten().copied().collect();
    assert_eq!(order, vec![2, 3, 4]);
}

#[test]
fn test_iter_mut_drains_everything() {
    let mut ring: GenerationRing<Vec<u32>> = GenerationRing::new(4);
    for value in 0..8 {
        ring.current_mut().push(value);
        if value % 2 == 1 {
            ring.advance();
        }
    }

    let mut drained: Vec<u32> = ring.iter_mut().flat_map(|bucket| bucket.drain(..)).collect();
    drained.sort_unstable();
    assert_eq!(drained, (0..8).collect::<Vec<_>>());
    assert!(ring.iter().all(|bucket| bucket.is_empty()));
}
