//! Randomized star population for one selection cycle.
//!
//! A field is regenerated wholesale — fresh positions, fresh ids — whenever
//! the viewport is resized or a new journey starts. Nothing carries over.

use rand::Rng;

/// A single background star, selectable by proximity.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Stable per-field identifier.
    pub id: u32,
    pub x: f32,
    pub y: f32,
    /// Marker radius in pixels.
    pub size: f32,
    /// Base brightness in [0.3, 0.8); twinkle jitter is applied at draw time.
    pub alpha: f32,
    pub selected: bool,
}

/// The star population for the current viewport.
#[derive(Debug, Clone, Default)]
pub struct StarField {
    pub stars: Vec<Star>,
    pub width: f32,
    pub height: f32,
}

impl StarField {
    /// Draw a fresh field of `count` stars uniformly over `[0,width) x [0,height)`.
    pub fn generate(width: f32, height: f32, count: usize) -> Self {
        let mut rng = rand::thread_rng();
        let stars = (0..count)
            .map(|i| Star {
                id: i as u32,
                x: rng.gen_range(0.0..width.max(f32::MIN_POSITIVE)),
                y: rng.gen_range(0.0..height.max(f32::MIN_POSITIVE)),
                size: rng.gen_range(1.0..3.0),
                alpha: rng.gen_range(0.3..0.8),
                selected: false,
            })
            .collect();

        log::debug!("generated star field: {}x{}, {} stars", width, height, count);
        Self { stars, width, height }
    }

    /// Look up a star by id.
    pub fn get(&self, id: u32) -> Option<&Star> {
        self.stars.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Star> {
        self.stars.iter_mut().find(|s| s.id == id)
    }
}
