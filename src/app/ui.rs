use super::BlinkyApp;
use crate::session::NotificationKind;
use crate::upload::OutputFormat;
use crate::utils::file_size::format_size;
use eframe::egui::{self, Align, Color32, RichText};
use tracing::debug;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);
const THUMBNAIL: f32 = 140.0;
const RESULT_PREVIEW: f32 = 320.0;

/// Decodes jpeg/png/webp bytes into a texture. Formats the `image` crate
/// cannot read (animated AVIF, for one) give `None`.
pub fn decode_texture(ctx: &egui::Context, name: &str, bytes: &[u8]) -> Option<egui::TextureHandle> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            debug!(name, error = %e, "preview not decodable");
            return None;
        }
    };
    let size = [decoded.width() as usize, decoded.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_raw());
    Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
}

fn fitted(texture: &egui::TextureHandle, max_side: f32) -> egui::load::SizedTexture {
    let size = texture.size_vec2();
    let scale = (max_side / size.x.max(size.y)).min(1.0);
    egui::load::SizedTexture::new(texture.id(), size * scale)
}

impl BlinkyApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Blinky Animation Maker");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Turn up to three images into an animated image")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                    ui.label(
                        RichText::new(format!("Server: {}", self.server_label))
                            .small()
                            .color(ui.visuals().text_color().gamma_multiply(0.5)),
                    );
                });

                ui.add_space(20.0);

                if self.view.upload_prompt_visible {
                    self.render_upload_area(ui);
                }
                if self.view.previews_visible {
                    self.render_previews(ui);
                }
                if self.view.options_visible {
                    ui.add_space(10.0);
                    self.render_options(ui);
                }
                if self.view.busy {
                    ui.add_space(10.0);
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                    });
                }
                if self.view.result_visible {
                    ui.add_space(10.0);
                    self.render_result(ui);
                }

                ui.add_space(20.0);
                ui.with_layout(egui::Layout::top_down(Align::Center), |ui| {
                    self.render_notification(ui);
                });
            });
        });
    }

    fn render_upload_area(&mut self, ui: &mut egui::Ui) {
        let stroke_color = if self.view.drag_hover {
            ACCENT
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };

        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label("Drop up to 3 images here (JPG, PNG, WebP)");
                    ui.add_space(10.0);
                    let button =
                        egui::Button::new("📁 Choose Images").min_size(egui::vec2(200.0, 40.0));
                    if ui.add_enabled(self.view.can_select(), button).clicked() {
                        self.pick_files();
                    }
                });
            });
    }

    fn render_previews(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Uploaded frames");
            ui.add_space(8.0);
            ui.horizontal_wrapped(|ui| {
                for (index, preview) in self.view.previews.iter().enumerate() {
                    ui.vertical(|ui| {
                        match self.preview_textures.get(index).and_then(Option::as_ref) {
                            Some(texture) => {
                                ui.image(fitted(texture, THUMBNAIL));
                            }
                            None => {
                                ui.label(RichText::new("🖼").size(48.0));
                            }
                        }
                        ui.label(&preview.label);
                        ui.label(
                            RichText::new(format!(
                                "{} · {}",
                                preview.file.name,
                                format_size(preview.file.size())
                            ))
                            .small(),
                        );
                    });
                    ui.add_space(8.0);
                }
            });
        });
    }

    fn render_options(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            egui::Grid::new("options").num_columns(2).show(ui, |ui| {
                ui.label("Output format");
                egui::ComboBox::from_id_source("format")
                    .selected_text(self.view.format.label())
                    .show_ui(ui, |ui| {
                        for format in OutputFormat::ALL {
                            ui.selectable_value(&mut self.view.format, format, format.label());
                        }
                    });
                ui.end_row();

                ui.label("Seconds per frame");
                ui.add(egui::TextEdit::singleline(&mut self.view.duration_text).desired_width(80.0));
                ui.end_row();
            });

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                let button = egui::Button::new("✨ Generate Animation").min_size(egui::vec2(200.0, 40.0));
                if ui.add_enabled(self.view.can_process(), button).clicked() {
                    self.start_process();
                }
                if ui.button("🔄 Start Over").clicked() {
                    self.reset();
                }
            });
        });
    }

    fn render_result(&mut self, ui: &mut egui::Ui) {
        let Some(result) = self.view.result.clone() else {
            return;
        };

        ui.group(|ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Your animation").strong());
                ui.add_space(8.0);
                match &self.result_texture {
                    Some(texture) => {
                        ui.image(fitted(texture, RESULT_PREVIEW));
                    }
                    None => {
                        ui.label(
                            RichText::new("Preview unavailable for this format")
                                .color(ui.visuals().text_color().gamma_multiply(0.6)),
                        );
                    }
                }
                ui.add_space(8.0);
                ui.label(&result.file_name);

                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!self.view.busy, egui::Button::new("⬇ Download"))
                        .clicked()
                    {
                        self.save_result();
                    }
                    if let Some(path) = self.view.saved_to.clone() {
                        if ui.button("Open").clicked() {
                            if let Err(e) = open::that(&path) {
                                tracing::warn!(error = %e, path = %path.display(), "failed to open saved animation");
                            }
                        }
                    }
                });
            });
        });
    }

    fn render_notification(&self, ui: &mut egui::Ui) {
        if let Some(shown) = &self.view.notification {
            let color = match shown.notification.kind {
                NotificationKind::Success => SUCCESS,
                NotificationKind::Error => FAILURE,
            };
            ui.colored_label(color, &shown.notification.text);
        }
    }
}
