//! The connection reveal: a single-shot timer armed when the fifth star is
//! chosen.
//!
//! The animator owns the timing contract only — five segments at 200 ms each
//! plus a 500 ms buffer, 1500 ms total — and hands the finalized point
//! sequence to the caller exactly once when the deadline passes. Visual
//! pacing of individual segments is derived from [`reveal_fraction`] and
//! never alters the total delay.
//!
//! [`reveal_fraction`]: ConnectionAnimator::reveal_fraction

use std::time::{Duration, Instant};

use crate::sketch::Point;
use crate::sky::selection::REQUIRED_STARS;

/// Reveal duration per connecting segment.
pub const SEGMENT_DURATION: Duration = Duration::from_millis(200);

/// Fixed buffer after the last segment.
pub const COMPLETION_BUFFER: Duration = Duration::from_millis(500);

/// Total wall-clock delay between the fifth pick and the completion callback.
pub fn total_delay() -> Duration {
    SEGMENT_DURATION * REQUIRED_STARS as u32 + COMPLETION_BUFFER
}

#[derive(Debug, Clone)]
struct Armed {
    started: Instant,
    deadline: Instant,
    points: Vec<Point>,
}

/// Single-shot reveal timer. Armed once per selection cycle; a second arm
/// attempt before the timer fires is ignored.
#[derive(Debug, Clone, Default)]
pub struct ConnectionAnimator {
    armed: Option<Armed>,
    fired: bool,
}

impl ConnectionAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer with the finalized point sequence. No-op if already
    /// armed or already fired this cycle.
    pub fn arm(&mut self, points: Vec<Point>, now: Instant) {
        if self.armed.is_some() || self.fired {
            return;
        }
        log::debug!("connection reveal armed, fires in {:?}", total_delay());
        self.armed = Some(Armed {
            started: now,
            deadline: now + total_delay(),
            points,
        });
    }

    /// Check the deadline. Returns the finalized points exactly once, on the
    /// first poll at or past the deadline.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<Point>> {
        let due = self.armed.as_ref().map_or(false, |a| now >= a.deadline);
        if !due {
            return None;
        }
        let armed = self.armed.take()?;
        self.fired = true;
        Some(armed.points)
    }

    /// Fraction of the segment reveal elapsed, in [0, 1]. `None` when not
    /// armed (all segments should be drawn plainly).
    pub fn reveal_fraction(&self, now: Instant) -> Option<f32> {
        let armed = self.armed.as_ref()?;
        let segments = SEGMENT_DURATION * REQUIRED_STARS as u32;
        let elapsed = now.saturating_duration_since(armed.started);
        Some((elapsed.as_secs_f32() / segments.as_secs_f32()).clamp(0.0, 1.0))
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Disarm and clear the fired latch for a fresh selection cycle.
    pub fn reset(&mut self) {
        self.armed = None;
        self.fired = false;
    }
}
