//! The interactive star canvas.
//!
//! One `draw_canvas` call per frame: feed pointer clicks to the selection
//! tracker, then redraw everything from current field + selection state.
//! Drawing is strictly read-and-draw — the only mutations here are the input
//! handling at the top and the resize-triggered field regeneration.

use std::time::Instant;

use eframe::egui;
use rand::Rng;

use crate::journey::Phase;
use crate::sketch::Point;
use crate::sky::selection::REQUIRED_STARS;

use super::WeaverApp;

pub const NIGHT: egui::Color32 = egui::Color32::from_rgb(7, 9, 26);
const STARLIGHT: egui::Color32 = egui::Color32::from_rgb(235, 240, 255);
const THREAD: egui::Color32 = egui::Color32::from_rgb(255, 224, 160);
const GLOW: egui::Color32 = egui::Color32::from_rgba_premultiplied(90, 78, 50, 70);

/// Bounded per-frame twinkle jitter, applied at draw time and never stored.
const TWINKLE_JITTER: f32 = 0.15;

impl WeaverApp {
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
        let rect = response.rect;
        if rect.width() < 1.0 || rect.height() < 1.0 {
            // No drawing surface this frame.
            return;
        }

        // The field follows the viewport; a resize draws a fresh population.
        if (rect.size() - self.canvas_size).length() > 0.5 {
            self.regenerate_field(rect.size());
        }

        let now = Instant::now();

        if self.journey.phase() == Phase::Selecting && response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let tap = Point {
                    x: pos.x - rect.min.x,
                    y: pos.y - rect.min.y,
                };
                if self.tracker.attempt_select(tap, &mut self.field).is_some()
                    && self.tracker.is_complete()
                {
                    let points = self.tracker.points(&self.field);
                    self.animator.arm(points, now);
                }
            }
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, NIGHT);

        let to_screen =
            |p: Point| egui::pos2(rect.min.x + p.x, rect.min.y + p.y);

        // Connecting thread through the picks, in selection order. While the
        // reveal timer runs, segments appear one by one; the completion
        // timing itself lives in the animator.
        let picked = self.tracker.points(&self.field);
        if picked.len() >= 2 {
            let segments = picked.len() - 1;
            let visible = match self.animator.reveal_fraction(now) {
                Some(f) => ((f * segments as f32).ceil() as usize).min(segments),
                None => segments,
            };
            for pair in picked.windows(2).take(visible) {
                painter.line_segment(
                    [to_screen(pair[0]), to_screen(pair[1])],
                    egui::Stroke::new(2.0, THREAD),
                );
            }
        }

        // Stars: glow for the chosen, twinkle for the rest.
        let mut rng = rand::thread_rng();
        for star in &self.field.stars {
            let pos = to_screen(Point { x: star.x, y: star.y });
            if self.tracker.contains(star.id) {
                painter.circle_filled(pos, star.size + 5.0, GLOW);
                painter.circle_filled(pos, star.size + 1.5, STARLIGHT);
            } else {
                let alpha = (star.alpha
                    + rng.gen_range(-TWINKLE_JITTER..TWINKLE_JITTER))
                .clamp(0.0, 1.0);
                painter.circle_filled(
                    pos,
                    star.size,
                    egui::Color32::from_white_alpha((alpha * 255.0) as u8),
                );
            }
        }

        self.draw_canvas_status(&painter, rect);

        // Starting over is reachable mid-selection and mid-generation, not
        // only from the result screen; a generation left in flight resolves
        // against a stale cycle and is discarded.
        egui::Area::new(egui::Id::new("canvas_start_over"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .show(ctx, |ui| {
                if ui.button("Start over").clicked() {
                    self.start_over();
                }
            });

        // Twinkle and the reveal are continuous.
        ctx.request_repaint();
    }

    fn draw_canvas_status(&self, painter: &egui::Painter, rect: egui::Rect) {
        let status = match self.journey.phase() {
            Phase::Selecting => {
                if self.animator.is_armed() {
                    "The thread is weaving...".to_string()
                } else {
                    format!(
                        "{} of {} stars chosen — tap the sky",
                        self.tracker.len(),
                        REQUIRED_STARS
                    )
                }
            }
            Phase::GeneratingMetadata => "Reading the stars...".to_string(),
            Phase::GeneratingImage => "Painting the sky...".to_string(),
            _ => return,
        };

        painter.text(
            egui::pos2(rect.center().x, rect.bottom() - 28.0),
            egui::Align2::CENTER_CENTER,
            status,
            egui::FontId::proportional(16.0),
            STARLIGHT,
        );
    }
}
