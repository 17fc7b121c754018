//! Journey driving for `WeaverApp`.
//!
//! Covers the per-frame polling of the generation worker and the connection
//! animator (`check_generation`), plus the user-initiated lifecycle moves
//! (`begin_journey`, `submit_edit`, `start_over`).

use std::time::Instant;

use eframe::egui;

use crate::journey::{Phase, Request};
use crate::net::client::fallback_metadata;
use crate::net::worker::Outcome;
use crate::sky::StarField;

use super::{WeaverApp, STAR_COUNT};

impl WeaverApp {
    /// Poll background work and forward any follow-up request. Call once per
    /// frame, before drawing.
    pub fn check_generation(&mut self, ctx: &egui::Context) {
        if let Some(outcome) = self.worker.poll() {
            let follow_up = match outcome {
                Outcome::Metadata { cycle, result } => {
                    let result = match result {
                        Err(e) if self.fallback_on_metadata_failure => {
                            log::warn!("metadata generation failed, using the placeholder: {}", e);
                            Ok(fallback_metadata())
                        }
                        other => other,
                    };
                    self.journey.on_metadata(cycle, result)
                }
                Outcome::Image { cycle, result } => {
                    self.journey.on_image(cycle, result);
                    None
                }
                Outcome::Edit { cycle, result } => {
                    self.journey.on_edit(cycle, result);
                    None
                }
            };
            if let Some(request) = follow_up {
                self.dispatch(request, ctx);
            }
        }

        // The reveal timer finalizes the selection.
        if self.journey.phase() == Phase::Selecting {
            if let Some(points) = self.animator.poll(Instant::now()) {
                if let Some(request) = self.journey.on_connection_complete(points) {
                    self.dispatch(request, ctx);
                }
            }
        }
    }

    /// Run a collaborator request in the background, waking the UI when it
    /// completes.
    pub fn dispatch(&mut self, request: Request, ctx: &egui::Context) {
        let ctx = ctx.clone();
        self.worker.dispatch(request, move || ctx.request_repaint());
    }

    /// `Intro --start--> Selecting`, with a freshly drawn star field.
    pub fn begin_journey(&mut self, size: egui::Vec2) {
        if self.journey.start((size.x, size.y)) {
            self.regenerate_field(size);
            self.result_texture = None;
            self.edit_input.clear();
        }
    }

    /// Draw a fresh field for `size` and drop the current picks. Called on
    /// journey start and whenever the canvas is resized.
    pub fn regenerate_field(&mut self, size: egui::Vec2) {
        self.field = StarField::generate(size.x, size.y, STAR_COUNT);
        self.tracker.clear();
        self.animator.reset();
        self.canvas_size = size;
        self.journey.update_viewport((size.x, size.y));
    }

    /// Back to the intro from anywhere. An in-flight generation keeps
    /// running, but its cycle id is now stale and its response will be
    /// discarded on arrival.
    pub fn start_over(&mut self) {
        self.journey.reset();
        self.tracker.clear();
        self.animator.reset();
        self.result_texture = None;
        self.edit_input.clear();
    }

    /// Submit the edit box as a reweave instruction.
    pub fn submit_edit(&mut self, ctx: &egui::Context) {
        let instruction = self.edit_input.clone();
        if let Some(request) = self.journey.request_edit(&instruction) {
            self.edit_input.clear();
            self.dispatch(request, ctx);
        }
    }
}
