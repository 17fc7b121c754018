//! The night sky: star population, tap selection, and the connection reveal.
//!
//! - `field`     — randomized background star population
//! - `selection` — proximity hit-testing and the ordered pick sequence
//! - `animator`  — the timed reveal that finalizes a completed selection

pub mod animator;
pub mod field;
pub mod selection;

pub use animator::ConnectionAnimator;
pub use field::{Star, StarField};
pub use selection::{SelectionTracker, HIT_RADIUS, REQUIRED_STARS};
