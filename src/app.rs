use std::time::Duration;

use handtracking::Digit;

use crate::utils::*;

pub struct HandtrackingApp {
    shared_state: SharedState,
}

impl HandtrackingApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, shared_state: SharedState) -> Self {
        Self { shared_state }
    }
}

impl eframe::App for HandtrackingApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        _frame.close();
                    }
                });
            });
        });

        // copy what the panels need so the worker is not blocked while drawing
        let (fps, resolution, hands, thumb_tip, fingers, error, image) = {
            let state = lock(&self.shared_state);
            (
                state.fps.unwrap_or(0.0),
                state.resolution.unwrap_or((0, 0)),
                state.hands,
                state.thumb_tip,
                state.fingers,
                state.error.clone(),
                state.image.clone(),
            )
        };

        egui::SidePanel::left("side_panel").show(ctx, |ui| {
            ui.label(format!("FPS: {}", fps.round()));
            ui.label(format!("Resolution: {}x{}", resolution.0, resolution.1));
            ui.label(format!("Hands: {}", hands));

            match thumb_tip {
                Some(lm) => ui.label(format!("Thumb tip: [{}, {}, {}]", lm.id, lm.x, lm.y)),
                None => ui.label("Thumb tip: -"),
            };

            ui.separator();
            for digit in Digit::ALL {
                let mut up = fingers.map_or(false, |f| f.is_extended(digit));
                ui.add_enabled(
                    false,
                    egui::Checkbox::new(&mut up, format!("{:?}", digit)),
                );
            }
            if let Some(fingers) = fingers {
                ui.label(format!("Fingers up: {}", fingers.count()));
            }

            if let Some(error) = error {
                ui.separator();
                ui.colored_label(egui::Color32::RED, error);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(image) = image else {
                ui.label("Waiting for camera...");
                return;
            };

            let image_size = [image.width() as usize, image.height() as usize];
            let ui_image = egui::ColorImage::from_rgb(image_size, image.as_raw().as_slice());
            let texture_hdl = ctx.load_texture("frame", ui_image, egui::TextureOptions::default());

            // scale the frame to the panel width
            let ui_img_width = ui.available_width();
            let ui_img_height = ui_img_width / (image.width() as f32 / image.height() as f32);

            ui.image(&texture_hdl, egui::Vec2::new(ui_img_width, ui_img_height));
        });

        ctx.request_repaint_after(Duration::from_millis(1000 / 30));
    }
}
