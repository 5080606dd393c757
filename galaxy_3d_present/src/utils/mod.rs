/// Utility types shared by the presentation managers

pub mod generation_ring;

pub use generation_ring::GenerationRing;
