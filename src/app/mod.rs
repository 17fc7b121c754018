//! `WeaverApp` — the top-level egui application state.
//!
//! This module declares the `WeaverApp` struct and its constructors. All
//! methods are split across the sibling sub-modules:
//!
//! - `lifecycle` — journey driving, worker polling, field regeneration
//! - `canvas`    — the interactive star canvas (selection + render loop)
//! - `screens`   — intro and result surfaces

pub mod canvas;
pub mod lifecycle;
pub mod screens;

use std::sync::Arc;

use eframe::egui;

use crate::journey::{Journey, Phase};
use crate::net::client::{Collaborator, StudioClient};
use crate::net::worker::GenerationWorker;
use crate::sky::{ConnectionAnimator, SelectionTracker, StarField};

/// Stars drawn per field.
pub const STAR_COUNT: usize = 80;

// ─── Application state ───────────────────────────────────────────────────────

pub struct WeaverApp {
    pub journey: Journey,
    pub field: StarField,
    pub tracker: SelectionTracker,
    pub animator: ConnectionAnimator,
    pub worker: GenerationWorker,
    /// When set, a failed metadata call is answered with the stock
    /// placeholder instead of aborting the journey to the intro.
    pub fallback_on_metadata_failure: bool,
    // Result screen
    pub edit_input: String,
    pub result_texture: Option<egui::TextureHandle>,
    pub result_texture_revision: u64,
    // Canvas size last used to generate the field (resize detection)
    pub canvas_size: egui::Vec2,
}

impl WeaverApp {
    pub fn new(client: Arc<dyn Collaborator>) -> Self {
        Self {
            journey: Journey::new(),
            field: StarField::default(),
            tracker: SelectionTracker::new(),
            animator: ConnectionAnimator::new(),
            worker: GenerationWorker::new(client),
            fallback_on_metadata_failure: false,
            edit_input: String::new(),
            result_texture: None,
            result_texture_revision: 0,
            canvas_size: egui::Vec2::ZERO,
        }
    }
}

impl Default for WeaverApp {
    fn default() -> Self {
        Self::new(Arc::new(StudioClient::from_env()))
    }
}

impl eframe::App for WeaverApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());
        self.check_generation(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(canvas::NIGHT))
            .show(ctx, |ui| match self.journey.phase() {
                Phase::Intro => self.draw_intro(ui),
                Phase::Selecting | Phase::GeneratingMetadata | Phase::GeneratingImage => {
                    self.draw_canvas(ui, ctx)
                }
                Phase::Result | Phase::Editing => self.draw_result(ui, ctx),
            });
    }
}
