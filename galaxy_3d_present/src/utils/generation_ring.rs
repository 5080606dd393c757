/// Fixed-depth ring of per-generation buckets.
///
/// Buckets are indexed by `counter mod depth`. Items are pushed into the
/// current bucket; [`advance`](Self::advance) moves the counter forward and
/// hands back the bucket it lands on, which holds the items retired exactly
/// `depth` advances ago. Whoever owns the ring empties that bucket: this is
/// the single point where retired items are reclaimed.
///
/// # Example
///
/// ```ignore
/// let mut ring: GenerationRing<Vec<u32>> = GenerationRing::new(2);
/// ring.current_mut().push(7);      // generation 0
/// assert!(ring.advance().is_empty()); // generation 1, nothing old enough
/// assert_eq!(ring.advance(), &vec![7]); // back to generation 0
/// ```
#[derive(Debug, Clone)]
pub struct GenerationRing<T> {
    buckets: Vec<T>,
    current: usize,
}

impl<T: Default> GenerationRing<T> {
    /// Create a ring with `depth` empty buckets
    ///
    /// A depth of 0 is treated as 1 (reclaim on the very next advance).
    pub fn new(depth: usize) -> Self {
        debug_assert!(depth > 0, "GenerationRing depth must be at least 1");
        let depth = depth.max(1);
        Self {
            buckets: (0..depth).map(|_| T::default()).collect(),
            current: 0,
        }
    }
}

impl<T> GenerationRing<T> {
    /// Number of buckets
    pub fn depth(&self) -> usize {
        self.buckets.len()
    }

    /// Index of the bucket currently receiving retired items
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Bucket currently receiving retired items
    pub fn current(&self) -> &T {
        &self.buckets[self.current]
    }

    /// Mutable access to the bucket currently receiving retired items
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.buckets[self.current]
    }

    /// Move to the next generation and return the bucket reached
    pub fn advance(&mut self) -> &mut T {
        self.current = (self.current + 1) % self.buckets.len();
        &mut self.buckets[self.current]
    }

    /// Iterate over every bucket, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let split = (self.current + 1) % self.buckets.len();
        let (newer, older) = self.buckets.split_at(split);
        older.iter().chain(newer.iter())
    }

    /// Mutable iteration over every bucket, oldest first
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        let split = (self.current + 1) % self.buckets.len();
        let (newer, older) = self.buckets.split_at_mut(split);
        older.iter_mut().chain(newer.iter_mut())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "generation_ring_tests.rs"]
mod tests;
