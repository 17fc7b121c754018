//! Tap-to-select: proximity hit-testing against the star field and the
//! ordered pick sequence.
//!
//! The sequence permits duplicates — tapping the same star five times is a
//! legitimate constellation. Selection is keyed on proximity only; already
//! chosen ids are never excluded from the hit test.

use crate::sketch::Point;
use crate::sky::field::StarField;

/// Maximum tap distance (pixels) for a star to count as hit.
pub const HIT_RADIUS: f32 = 50.0;

/// A constellation is exactly this many picks.
pub const REQUIRED_STARS: usize = 5;

/// Ordered, duplicate-permitting sequence of chosen star ids.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    picks: Vec<u32>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit-test `tap` against the field and, on a hit, append the nearest
    /// star to the sequence.
    ///
    /// Returns the chosen id, or `None` when no star is within
    /// [`HIT_RADIUS`] or the sequence is already complete. Taps after
    /// completion are silently ignored.
    pub fn attempt_select(&mut self, tap: Point, field: &mut StarField) -> Option<u32> {
        if self.picks.len() >= REQUIRED_STARS {
            return None;
        }

        let mut best: Option<(u32, f32)> = None;
        for star in &field.stars {
            let dx = star.x - tap.x;
            let dy = star.y - tap.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((star.id, dist));
            }
        }

        let (id, dist) = best?;
        if dist >= HIT_RADIUS {
            return None;
        }

        self.picks.push(id);
        if let Some(star) = field.get_mut(id) {
            star.selected = true;
        }
        log::debug!("selected star {} ({}/{})", id, self.picks.len(), REQUIRED_STARS);
        Some(id)
    }

    /// Chosen ids in selection order.
    pub fn picks(&self) -> &[u32] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.picks.len() >= REQUIRED_STARS
    }

    /// Whether a star id appears anywhere in the sequence.
    pub fn contains(&self, id: u32) -> bool {
        self.picks.contains(&id)
    }

    /// Resolve the sequence to pixel positions, in selection order.
    /// Ids no longer present in the field are skipped.
    pub fn points(&self, field: &StarField) -> Vec<Point> {
        self.picks
            .iter()
            .filter_map(|id| field.get(*id))
            .map(|s| Point { x: s.x, y: s.y })
            .collect()
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_with(stars: &[(u32, f32, f32)]) -> StarField {
        StarField {
            stars: stars
                .iter()
                .map(|&(id, x, y)| crate::sky::Star {
                    id,
                    x,
                    y,
                    size: 1.5,
                    alpha: 0.5,
                    selected: false,
                })
                .collect(),
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn picks_the_nearest_star_within_radius() {
        let mut field = field_with(&[(0, 10.0, 10.0), (1, 100.0, 100.0)]);
        let mut tracker = SelectionTracker::new();
        let id = tracker.attempt_select(Point { x: 12.0, y: 14.0 }, &mut field);
        assert_eq!(id, Some(0));
        assert!(field.get(0).unwrap().selected);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn far_taps_are_ignored() {
        let mut field = field_with(&[(0, 10.0, 10.0)]);
        let mut tracker = SelectionTracker::new();
        let id = tracker.attempt_select(Point { x: 200.0, y: 200.0 }, &mut field);
        assert_eq!(id, None);
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn hit_radius_is_exclusive() {
        let mut field = field_with(&[(0, 0.0, 0.0)]);
        let mut tracker = SelectionTracker::new();
        assert!(tracker
            .attempt_select(Point { x: HIT_RADIUS, y: 0.0 }, &mut field)
            .is_none());
        assert!(tracker
            .attempt_select(Point { x: HIT_RADIUS - 0.5, y: 0.0 }, &mut field)
            .is_some());
    }

    #[test]
    fn duplicates_accumulate_toward_completion() {
        let mut field = field_with(&[(0, 10.0, 10.0)]);
        let mut tracker = SelectionTracker::new();
        for _ in 0..REQUIRED_STARS {
            assert_eq!(
                tracker.attempt_select(Point { x: 10.0, y: 10.0 }, &mut field),
                Some(0)
            );
        }
        assert!(tracker.is_complete());
        assert_eq!(tracker.picks(), &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn sixth_pick_is_rejected() {
        let mut field = field_with(&[(0, 10.0, 10.0)]);
        let mut tracker = SelectionTracker::new();
        for _ in 0..REQUIRED_STARS {
            tracker.attempt_select(Point { x: 10.0, y: 10.0 }, &mut field);
        }
        assert_eq!(
            tracker.attempt_select(Point { x: 10.0, y: 10.0 }, &mut field),
            None
        );
        assert_eq!(tracker.len(), REQUIRED_STARS);
    }

    #[test]
    fn points_resolve_in_selection_order() {
        let mut field = field_with(&[(0, 10.0, 10.0), (1, 60.0, 10.0)]);
        let mut tracker = SelectionTracker::new();
        tracker.attempt_select(Point { x: 58.0, y: 12.0 }, &mut field);
        tracker.attempt_select(Point { x: 11.0, y: 11.0 }, &mut field);
        let pts = tracker.points(&field);
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0], Point { x: 60.0, y: 10.0 });
        assert_eq!(pts[1], Point { x: 10.0, y: 10.0 });
    }
}
