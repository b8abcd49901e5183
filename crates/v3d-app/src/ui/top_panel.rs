use egui::{Color32, Context, RichText};
use crate::ui::{ServiceHealth, UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct TopPanel;

impl UiComponent for TopPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("🎨 Vision3D Pro").strong());
                ui.separator();

                let (text, color) = match &ui_ctx.health {
                    ServiceHealth::Unknown => ("● checking".to_string(), Color32::GRAY),
                    ServiceHealth::Healthy(h) => (format!("● {}", h.service), Color32::GREEN),
                    ServiceHealth::Unhealthy(reason) => (format!("● offline ({reason})"), Color32::RED),
                };
                ui.label(RichText::new(text).color(color))
                    .on_hover_text(ui_ctx.service_url.as_str());
                if ui.small_button("⟳").on_hover_text("Check service").clicked() {
                    ui_ctx.send_event(UiEvent::CheckHealth);
                }

                ui.separator();

                match &ui_ctx.stats {
                    Some(stats) => {
                        ui.label(format!(
                            "Cache hits {} • cached {} • fresh {}",
                            stats.cache_hit_rate, stats.cached_avg_response, stats.non_cached_avg_response
                        ));
                    }
                    None => {
                        ui.label(RichText::new("No stats yet").color(Color32::GRAY));
                    }
                }
                if ui.small_button("📊 Stats").clicked() {
                    ui_ctx.send_event(UiEvent::RefreshStats);
                }
            });
        });
    }
}
