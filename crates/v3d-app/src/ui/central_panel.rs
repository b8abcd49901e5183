use egui::{Color32, Context, RichText};
use crate::ui::{UiComponent, UiContext};

#[derive(Default)]
pub struct CentralPanel;

impl UiComponent for CentralPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(failure) = ui_ctx.session.failure() {
                egui::Frame::new()
                    .fill(Color32::from_rgb(80, 30, 30))
                    .inner_margin(10.0)
                    .corner_radius(5.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(format!("⚠ {}", failure.message)).color(Color32::WHITE));
                    });
                ui.add_space(10.0);
            }

            ui.vertical_centered(|ui| {
                if let Some(url) = ui_ctx.viewer.url() {
                    ui.add_space(40.0);
                    ui.heading("Your model is ready");
                    ui.add_space(10.0);
                    ui.hyperlink_to(RichText::new("🧊 Open in model viewer").size(18.0), url.as_str());
                    ui.label(RichText::new(url.as_str()).small().color(Color32::GRAY));
                    ui.add_space(10.0);
                    ui.label("🖱 Drag to rotate • Scroll to zoom • Right-click to pan");
                } else if ui_ctx.session.is_loading() {
                    ui.add_space(120.0);
                    ui.spinner();
                    ui.label(RichText::new("Crafting your 3D masterpiece...").size(16.0));
                } else {
                    ui.add_space(120.0);
                    ui.heading("🎭 Your 3D Model Will Appear Here");
                    ui.label("Enter a prompt and click Generate to get started");
                }
            });
        });
    }
}
