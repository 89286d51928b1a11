//! Top bar: slideshow navigation, classify buttons and status.

use super::UiApp;
use eframe::egui;

impl UiApp {
    pub(super) fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Previous").clicked() {
                self.previous();
            }
            if ui.button("Next").clicked() {
                self.next();
            }
            ui.label(format!(
                "{}/{}",
                self.slideshow.slideshow().index() + 1,
                self.slideshow.slideshow().len()
            ));
            ui.separator();

            let idle = self.pending.is_none();
            if ui
                .add_enabled(idle, egui::Button::new("Classify This Image"))
                .clicked()
            {
                self.classify_current();
            }
        });
        ui.horizontal(|ui| {
            ui.label("Image URL");
            let response = ui.text_edit_singleline(&mut self.url_input);
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let can_submit = self.pending.is_none() && !self.url_input.trim().is_empty();
            if ui
                .add_enabled(can_submit, egui::Button::new("Classify URL"))
                .clicked()
                || (submitted && can_submit)
            {
                self.classify_url();
            }

            if !self.status.is_empty() {
                ui.label(&self.status);
            }
        });
    }
}
