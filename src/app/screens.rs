//! Intro and result surfaces for `WeaverApp`.

use eframe::egui;

use crate::journey::Phase;

use super::WeaverApp;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(255, 224, 160);
const NOTICE: egui::Color32 = egui::Color32::from_rgb(240, 150, 130);

impl WeaverApp {
    pub fn draw_intro(&mut self, ui: &mut egui::Ui) {
        let canvas_size = ui.available_size();

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.28);
            ui.heading(
                egui::RichText::new("Constella")
                    .size(44.0)
                    .color(ACCENT),
            );
            ui.add_space(6.0);
            ui.label("Pick five stars. The sky will do the rest.");

            if let Some(notice) = self.journey.notice() {
                ui.add_space(12.0);
                ui.colored_label(NOTICE, notice);
            }

            ui.add_space(28.0);
            let start = ui.add(
                egui::Button::new(egui::RichText::new("Begin weaving").size(18.0))
                    .min_size(egui::vec2(180.0, 40.0)),
            );
            if start.clicked() {
                self.begin_journey(canvas_size);
            }
        });
    }

    pub fn draw_result(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        self.refresh_result_texture(ctx);

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);

                if let Some(asset) = self.journey.asset() {
                    ui.heading(
                        egui::RichText::new(&asset.metadata.name)
                            .size(30.0)
                            .color(ACCENT),
                    );
                    ui.add_space(12.0);
                }

                if let Some(tex) = &self.result_texture {
                    let size = tex.size_vec2();
                    let scale = (ui.available_width() * 0.6 / size.x).min(1.0);
                    ui.image((tex.id(), size * scale));
                    ui.add_space(12.0);
                }

                if let Some(asset) = self.journey.asset() {
                    ui.add_sized(
                        [ui.available_width() * 0.6, 0.0],
                        egui::Label::new(&asset.metadata.horoscope).wrap(),
                    );
                }

                if let Some(notice) = self.journey.notice() {
                    ui.add_space(10.0);
                    ui.colored_label(NOTICE, notice);
                }

                ui.add_space(20.0);

                if self.journey.phase() == Phase::Editing {
                    ui.spinner();
                    ui.label("Reweaving...");
                } else {
                    ui.horizontal_wrapped(|ui| {
                        ui.add_space(ui.available_width() * 0.2);
                        let edit = ui.add(
                            egui::TextEdit::singleline(&mut self.edit_input)
                                .hint_text("Ask the sky for a change...")
                                .desired_width(260.0),
                        );
                        let submitted = edit.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        if ui.button("Reweave").clicked() || submitted {
                            self.submit_edit(ctx);
                        }
                    });
                    ui.add_space(10.0);
                    if ui.button("Start over").clicked() {
                        self.start_over();
                    }
                }

                ui.add_space(24.0);
            });
        });
    }

    /// Upload the current asset image as an egui texture when it changes.
    fn refresh_result_texture(&mut self, ctx: &egui::Context) {
        let revision = self.journey.asset_revision();
        if self.result_texture.is_some() && self.result_texture_revision == revision {
            return;
        }
        let Some(asset) = self.journey.asset() else {
            return;
        };

        match image::load_from_memory(&asset.image_png) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (w, h) = rgba.dimensions();
                let color = egui::ColorImage::from_rgba_unmultiplied(
                    [w as usize, h as usize],
                    rgba.as_raw(),
                );
                self.result_texture =
                    Some(ctx.load_texture("constellation", color, egui::TextureOptions::LINEAR));
            }
            Err(e) => {
                log::error!("could not decode generated image: {}", e);
                self.result_texture = None;
            }
        }
        // Either way, do not retry this revision every frame.
        self.result_texture_revision = revision;
    }
}
