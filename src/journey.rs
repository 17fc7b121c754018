//! The journey orchestrator: phase state machine, generation cycle identity,
//! and failure recovery.
//!
//! `Intro → Selecting → GeneratingMetadata → GeneratingImage → Result ⟷
//! Editing`. `Intro` and `Result` are the user-actionable states; the
//! generating states are transient and entered only here, never by direct
//! user action. Invalid events are ignored no-ops, never errors.
//!
//! Every `start`/`reset` bumps a monotonically increasing cycle id, and every
//! collaborator outcome carries the cycle it was issued for. An outcome with
//! a stale id is discarded, so a late-arriving response can never mutate a
//! newer cycle's state.

use crate::net::client::{ConstellationMetadata, GenerateError};
use crate::sketch::Point;
use crate::sky::selection::REQUIRED_STARS;

/// User-visible copy for the two failure classes.
pub const GENERATION_FAILED_NOTICE: &str = "The stars are cloudy tonight. Try again.";
pub const EDIT_FAILED_NOTICE: &str = "The weave resisted your change.";

/// The orchestrator's current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Intro,
    Selecting,
    GeneratingMetadata,
    GeneratingImage,
    Result,
    Editing,
}

/// The current generated constellation. At most one live instance; edits
/// replace it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAsset {
    pub image_png: Vec<u8>,
    pub metadata: ConstellationMetadata,
}

/// A collaborator call the app layer must run in the background.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Metadata {
        cycle: u64,
        points: Vec<Point>,
        viewport: (f32, f32),
    },
    Image {
        cycle: u64,
        prompt: String,
        points: Vec<Point>,
    },
    Edit {
        cycle: u64,
        image_png: Vec<u8>,
        instruction: String,
    },
}

/// Owns the phase, the finalized point sequence, and the current asset for
/// one generation cycle. GUI-free by construction.
#[derive(Debug, Default)]
pub struct Journey {
    phase: Phase,
    cycle: u64,
    viewport: (f32, f32),
    points: Vec<Point>,
    metadata: Option<ConstellationMetadata>,
    asset: Option<GeneratedAsset>,
    asset_revision: u64,
    notice: Option<&'static str>,
}

impl Journey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn asset(&self) -> Option<&GeneratedAsset> {
        self.asset.as_ref()
    }

    /// Bumped every time the current asset is replaced; lets the app layer
    /// know when to re-upload the result texture.
    pub fn asset_revision(&self) -> u64 {
        self.asset_revision
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// `Intro --start--> Selecting`. Clears any previous selection and asset
    /// and opens a fresh cycle. Returns false (no-op) outside `Intro`.
    pub fn start(&mut self, viewport: (f32, f32)) -> bool {
        if self.phase != Phase::Intro {
            return false;
        }
        self.open_cycle(viewport);
        self.phase = Phase::Selecting;
        log::info!("journey {} started, viewport {:?}", self.cycle, viewport);
        true
    }

    /// Start over from any phase. Opens a fresh cycle so in-flight
    /// collaborator responses for the old one are discarded on arrival.
    pub fn reset(&mut self) {
        self.open_cycle(self.viewport);
        self.phase = Phase::Intro;
        log::info!("journey reset, next cycle {}", self.cycle);
    }

    /// Record the live canvas size so point normalization matches the
    /// surface the points were captured on (the field regenerates on
    /// resize, mid-selection included).
    pub fn update_viewport(&mut self, viewport: (f32, f32)) {
        self.viewport = viewport;
    }

    fn open_cycle(&mut self, viewport: (f32, f32)) {
        self.cycle += 1;
        self.viewport = viewport;
        self.points.clear();
        self.metadata = None;
        self.asset = None;
        self.notice = None;
    }

    /// The connection reveal finished: hand the finalized five points to the
    /// metadata collaborator. No-op outside `Selecting`.
    pub fn on_connection_complete(&mut self, points: Vec<Point>) -> Option<Request> {
        if self.phase != Phase::Selecting || points.len() != REQUIRED_STARS {
            return None;
        }
        self.points = points;
        self.phase = Phase::GeneratingMetadata;
        Some(Request::Metadata {
            cycle: self.cycle,
            points: self.points.clone(),
            viewport: self.viewport,
        })
    }

    /// Metadata arrived. On success, advance to image generation; on
    /// failure, discard partial state and return to `Intro`.
    pub fn on_metadata(
        &mut self,
        cycle: u64,
        result: Result<ConstellationMetadata, GenerateError>,
    ) -> Option<Request> {
        if !self.accepts(cycle, Phase::GeneratingMetadata) {
            return None;
        }
        match result {
            Ok(metadata) => {
                let prompt = metadata.visual_prompt.clone();
                self.metadata = Some(metadata);
                self.phase = Phase::GeneratingImage;
                Some(Request::Image {
                    cycle: self.cycle,
                    prompt,
                    points: self.points.clone(),
                })
            }
            Err(e) => {
                log::warn!("metadata generation failed: {}", e);
                self.fail_initial();
                None
            }
        }
    }

    /// The generated image arrived. On success, store the asset and present
    /// it; on failure, discard partial state and return to `Intro`.
    pub fn on_image(&mut self, cycle: u64, result: Result<Vec<u8>, GenerateError>) {
        if !self.accepts(cycle, Phase::GeneratingImage) {
            return;
        }
        match (result, self.metadata.take()) {
            (Ok(image_png), Some(metadata)) => {
                self.asset = Some(GeneratedAsset { image_png, metadata });
                self.asset_revision += 1;
                self.phase = Phase::Result;
                log::info!("journey {} complete", self.cycle);
            }
            (Ok(_), None) => {
                log::error!("image arrived without metadata");
                self.fail_initial();
            }
            (Err(e), _) => {
                log::warn!("image generation failed: {}", e);
                self.fail_initial();
            }
        }
    }

    /// `Result --edit--> Editing`. No-op outside `Result`, without an asset,
    /// or for a blank instruction.
    pub fn request_edit(&mut self, instruction: &str) -> Option<Request> {
        if self.phase != Phase::Result || instruction.trim().is_empty() {
            return None;
        }
        let asset = self.asset.as_ref()?;
        self.phase = Phase::Editing;
        self.notice = None;
        Some(Request::Edit {
            cycle: self.cycle,
            image_png: asset.image_png.clone(),
            instruction: instruction.trim().to_string(),
        })
    }

    /// The edited image arrived. On success, replace the current image; on
    /// failure, return to `Result` with the previous asset untouched — the
    /// prior phase, not `Intro`, is the recovery target for edits.
    pub fn on_edit(&mut self, cycle: u64, result: Result<Vec<u8>, GenerateError>) {
        if !self.accepts(cycle, Phase::Editing) {
            return;
        }
        match result {
            Ok(image_png) => {
                if let Some(asset) = self.asset.as_mut() {
                    asset.image_png = image_png;
                    self.asset_revision += 1;
                }
                self.phase = Phase::Result;
            }
            Err(e) => {
                log::warn!("edit failed: {}", e);
                self.phase = Phase::Result;
                self.notice = Some(EDIT_FAILED_NOTICE);
            }
        }
    }

    fn accepts(&self, cycle: u64, expected: Phase) -> bool {
        if cycle != self.cycle {
            log::info!(
                "discarding stale response (cycle {}, current {})",
                cycle,
                self.cycle
            );
            return false;
        }
        self.phase == expected
    }

    /// Initial-generation failure: clear everything, back to `Intro`.
    fn fail_initial(&mut self) {
        self.points.clear();
        self.metadata = None;
        self.asset = None;
        self.phase = Phase::Intro;
        self.notice = Some(GENERATION_FAILED_NOTICE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_points() -> Vec<Point> {
        (0..5)
            .map(|i| Point {
                x: 100.0 + i as f32,
                y: 200.0,
            })
            .collect()
    }

    fn meta() -> ConstellationMetadata {
        ConstellationMetadata {
            name: "The River Door".to_string(),
            horoscope: "You will cross quietly.".to_string(),
            visual_prompt: "five stars arching over a dark river".to_string(),
        }
    }

    fn err() -> GenerateError {
        GenerateError {
            message: "boom".to_string(),
            phase: "test",
        }
    }

    fn advance_to_result(journey: &mut Journey) {
        assert!(journey.start((800.0, 600.0)));
        let req = journey.on_connection_complete(five_points()).unwrap();
        let cycle = match req {
            Request::Metadata { cycle, .. } => cycle,
            other => panic!("unexpected request: {:?}", other),
        };
        journey.on_metadata(cycle, Ok(meta())).unwrap();
        journey.on_image(cycle, Ok(vec![1, 2, 3]));
        assert_eq!(journey.phase(), Phase::Result);
    }

    #[test]
    fn happy_path_reaches_result() {
        let mut journey = Journey::new();
        assert_eq!(journey.phase(), Phase::Intro);

        assert!(journey.start((800.0, 600.0)));
        assert_eq!(journey.phase(), Phase::Selecting);

        let req = journey.on_connection_complete(five_points()).unwrap();
        assert_eq!(journey.phase(), Phase::GeneratingMetadata);
        let cycle = match req {
            Request::Metadata { cycle, points, viewport } => {
                assert_eq!(points, five_points());
                assert_eq!(viewport, (800.0, 600.0));
                cycle
            }
            other => panic!("unexpected request: {:?}", other),
        };

        let req = journey.on_metadata(cycle, Ok(meta())).unwrap();
        assert_eq!(journey.phase(), Phase::GeneratingImage);
        match req {
            Request::Image { prompt, points, .. } => {
                assert_eq!(prompt, meta().visual_prompt);
                assert_eq!(points, five_points());
            }
            other => panic!("unexpected request: {:?}", other),
        }

        journey.on_image(cycle, Ok(vec![1, 2, 3]));
        assert_eq!(journey.phase(), Phase::Result);
        let asset = journey.asset().unwrap();
        assert_eq!(asset.image_png, vec![1, 2, 3]);
        assert_eq!(asset.metadata, meta());
    }

    #[test]
    fn start_is_only_valid_from_intro() {
        let mut journey = Journey::new();
        assert!(journey.start((800.0, 600.0)));
        assert!(!journey.start((800.0, 600.0)));
        assert_eq!(journey.phase(), Phase::Selecting);
    }

    #[test]
    fn connection_complete_is_ignored_outside_selecting() {
        let mut journey = Journey::new();
        assert!(journey.on_connection_complete(five_points()).is_none());
        assert_eq!(journey.phase(), Phase::Intro);
    }

    #[test]
    fn short_sequences_are_rejected() {
        let mut journey = Journey::new();
        journey.start((800.0, 600.0));
        assert!(journey.on_connection_complete(five_points()[..3].to_vec()).is_none());
        assert_eq!(journey.phase(), Phase::Selecting);
    }

    #[test]
    fn metadata_failure_rolls_back_to_intro() {
        let mut journey = Journey::new();
        journey.start((800.0, 600.0));
        let cycle = journey.cycle();
        journey.on_connection_complete(five_points());

        assert!(journey.on_metadata(cycle, Err(err())).is_none());
        assert_eq!(journey.phase(), Phase::Intro);
        assert!(journey.asset().is_none());
        assert_eq!(journey.notice(), Some(GENERATION_FAILED_NOTICE));
    }

    #[test]
    fn image_failure_rolls_back_to_intro_and_clears_metadata() {
        let mut journey = Journey::new();
        journey.start((800.0, 600.0));
        let cycle = journey.cycle();
        journey.on_connection_complete(five_points());
        journey.on_metadata(cycle, Ok(meta()));

        journey.on_image(cycle, Err(err()));
        assert_eq!(journey.phase(), Phase::Intro);
        assert!(journey.asset().is_none());
        assert_eq!(journey.notice(), Some(GENERATION_FAILED_NOTICE));

        // The rolled-back journey accepts a fresh start.
        assert!(journey.start((800.0, 600.0)));
    }

    #[test]
    fn stale_cycle_responses_are_discarded() {
        let mut journey = Journey::new();
        journey.start((800.0, 600.0));
        let stale_cycle = journey.cycle();
        journey.on_connection_complete(five_points());

        // User starts over while metadata generation is in flight.
        journey.reset();
        assert_eq!(journey.phase(), Phase::Intro);

        // The old response arrives late; it must not move the machine.
        assert!(journey.on_metadata(stale_cycle, Ok(meta())).is_none());
        assert_eq!(journey.phase(), Phase::Intro);
        journey.on_image(stale_cycle, Ok(vec![9]));
        assert!(journey.asset().is_none());
    }

    #[test]
    fn edit_success_replaces_the_image() {
        let mut journey = Journey::new();
        advance_to_result(&mut journey);
        let cycle = journey.cycle();
        let rev = journey.asset_revision();

        let req = journey.request_edit("  make it violet  ").unwrap();
        assert_eq!(journey.phase(), Phase::Editing);
        match req {
            Request::Edit { image_png, instruction, .. } => {
                assert_eq!(image_png, vec![1, 2, 3]);
                assert_eq!(instruction, "make it violet");
            }
            other => panic!("unexpected request: {:?}", other),
        }

        journey.on_edit(cycle, Ok(vec![7, 7]));
        assert_eq!(journey.phase(), Phase::Result);
        assert_eq!(journey.asset().unwrap().image_png, vec![7, 7]);
        assert_eq!(journey.asset().unwrap().metadata, meta());
        assert!(journey.asset_revision() > rev);
    }

    #[test]
    fn edit_failure_restores_the_previous_asset() {
        let mut journey = Journey::new();
        advance_to_result(&mut journey);
        let cycle = journey.cycle();

        journey.request_edit("bluer").unwrap();
        journey.on_edit(cycle, Err(err()));

        assert_eq!(journey.phase(), Phase::Result);
        assert_eq!(journey.asset().unwrap().image_png, vec![1, 2, 3]);
        assert_eq!(journey.notice(), Some(EDIT_FAILED_NOTICE));
    }

    #[test]
    fn edits_are_rejected_outside_result() {
        let mut journey = Journey::new();
        assert!(journey.request_edit("nope").is_none());
        journey.start((800.0, 600.0));
        assert!(journey.request_edit("nope").is_none());
    }

    #[test]
    fn blank_edit_instructions_are_rejected() {
        let mut journey = Journey::new();
        advance_to_result(&mut journey);
        assert!(journey.request_edit("   ").is_none());
        assert_eq!(journey.phase(), Phase::Result);
    }

    #[test]
    fn reset_from_result_clears_the_asset() {
        let mut journey = Journey::new();
        advance_to_result(&mut journey);
        journey.reset();
        assert_eq!(journey.phase(), Phase::Intro);
        assert!(journey.asset().is_none());
    }

    // Whole-pipeline scenario: the same star tapped five times flows
    // through tracker, reveal timer, normalization, and sketch projection.
    #[test]
    fn five_taps_on_one_star_weave_a_coincident_constellation() {
        use crate::net::client::{normalize_points, NormalizedPoint};
        use crate::sky::{ConnectionAnimator, SelectionTracker, Star, StarField};
        use std::time::{Duration, Instant};

        let mut field = StarField {
            stars: vec![Star {
                id: 0,
                x: 10.0,
                y: 10.0,
                size: 2.0,
                alpha: 0.5,
                selected: false,
            }],
            width: 800.0,
            height: 600.0,
        };
        let mut tracker = SelectionTracker::new();
        let mut animator = ConnectionAnimator::new();
        let mut journey = Journey::new();
        assert!(journey.start((800.0, 600.0)));

        let t0 = Instant::now();
        for _ in 0..REQUIRED_STARS {
            tracker.attempt_select(Point { x: 12.0, y: 9.0 }, &mut field);
        }
        assert!(tracker.is_complete());
        animator.arm(tracker.points(&field), t0);

        // Taps during the delay change nothing.
        assert!(tracker
            .attempt_select(Point { x: 10.0, y: 10.0 }, &mut field)
            .is_none());
        assert!(animator.poll(t0 + Duration::from_millis(800)).is_none());

        let points = animator.poll(t0 + Duration::from_millis(1500)).unwrap();
        let request = journey.on_connection_complete(points).unwrap();

        let (cycle, points, viewport) = match request {
            Request::Metadata { cycle, points, viewport } => (cycle, points, viewport),
            other => panic!("unexpected request: {:?}", other),
        };
        assert_eq!(
            normalize_points(&points, viewport),
            vec![NormalizedPoint { x: 1, y: 2 }; 5]
        );

        let request = journey.on_metadata(cycle, Ok(meta())).unwrap();
        let points = match request {
            Request::Image { points, .. } => points,
            other => panic!("unexpected request: {:?}", other),
        };

        // All five coincident points project to the target-region center.
        let projected = crate::sketch::project_points(
            &points,
            crate::sketch::FRAME_WIDTH,
            crate::sketch::FRAME_HEIGHT,
        );
        let cx = crate::sketch::FRAME_WIDTH as f32 / 2.0;
        for p in &projected {
            assert!((p.x - cx).abs() < 1e-4);
        }

        journey.on_image(cycle, Ok(vec![5]));
        assert_eq!(journey.phase(), Phase::Result);
    }
}
