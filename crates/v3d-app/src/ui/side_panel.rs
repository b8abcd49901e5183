use egui::emath::Numeric;
use egui::{Color32, Context, RichText, TextEdit};
use v3d_core::{PrintSetting, SUGGESTED_PROMPTS};
use crate::ui::{UiComponent, UiContext, UiEvent};

pub struct SidePanel {
    pub prompt_text: String,
    pub layer_height_mm: f32,
    pub infill_density_percent: u8,
}

impl SidePanel {
    pub fn new(layer_height_mm: f32, infill_density_percent: u8) -> Self {
        Self {
            prompt_text: String::new(),
            layer_height_mm,
            infill_density_percent,
        }
    }

    fn generate_event(&self) -> UiEvent {
        UiEvent::Generate {
            prompt: self.prompt_text.clone(),
            layer_height_mm: self.layer_height_mm,
            infill_density_percent: self.infill_density_percent,
        }
    }
}

impl Default for SidePanel {
    fn default() -> Self {
        Self::new(
            PrintSetting::LayerHeight.default_value() as f32,
            PrintSetting::InfillDensity.default_value() as u8,
        )
    }
}

impl UiComponent for SidePanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let loading = ui_ctx.session.is_loading();

        egui::SidePanel::left("side_panel")
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("Vision3D Pro");
                ui.label(
                    RichText::new("Transform Text into 3D Printable Models")
                        .small()
                        .color(Color32::LIGHT_BLUE)
                );
                ui.separator();

                // === Prompt Input ===
                ui.heading(RichText::new("✨ Text Prompt").size(16.0));
                ui.add_space(5.0);

                let text_edit = TextEdit::singleline(&mut self.prompt_text)
                    .desired_width(f32::INFINITY)
                    .hint_text("Describe your 3D model... (e.g., 'a red robot', 'blue car', 'gold pendant')");
                let response = ui.add_enabled(!loading, text_edit);
                let enter_pressed = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.add_space(8.0);

                // === Print Settings ===
                setting_slider(ui, PrintSetting::LayerHeight, &mut self.layer_height_mm, !loading);
                ui.add_space(5.0);
                setting_slider(ui, PrintSetting::InfillDensity, &mut self.infill_density_percent, !loading);
                ui.add_space(8.0);

                let label = if loading { "⏳ Generating..." } else { "✨ Generate 3D" };
                let generate_button = ui.add_enabled(
                    !loading && !self.prompt_text.trim().is_empty(),
                    egui::Button::new(RichText::new(label).size(14.0))
                        .min_size(egui::vec2(ui.available_width(), 30.0))
                );

                // Enter goes through even with a blank prompt; the session ignores it
                if generate_button.clicked() || (enter_pressed && !loading) {
                    ui_ctx.send_event(self.generate_event());
                }

                // === Suggestions ===
                if !loading && ui_ctx.viewer.url().is_none() {
                    ui.add_space(5.0);
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new("Try:").color(Color32::GRAY));
                        for suggestion in SUGGESTED_PROMPTS {
                            if ui.button(suggestion).clicked() {
                                self.prompt_text = suggestion.to_string();
                            }
                        }
                    });
                }

                ui.separator();

                ui.collapsing("💭 Prompt Tips", |ui| {
                    ui.label("✓ Name one object and its color");
                    ui.label("✓ Shapes: cube, sphere, cylinder, cone, torus");
                    ui.label("✓ Objects: robot, car, pendant");
                    ui.label("✓ Colors: red, blue, green, gold, silver...");
                    ui.label("✗ Avoid whole scenes");
                });
            });
    }
}

fn setting_slider<N: Numeric>(ui: &mut egui::Ui, setting: PrintSetting, value: &mut N, enabled: bool) {
    ui.horizontal(|ui| {
        ui.label(format!("{}:", setting.name()));
        ui.label(RichText::new(setting.format_value(value.to_f64())).strong());
        ui.label(RichText::new(setting.hint()).small().color(Color32::GRAY));
    });

    let range = N::from_f64(setting.min())..=N::from_f64(setting.max());
    ui.push_id(setting.id(), |ui| {
        ui.add_enabled(
            enabled,
            egui::Slider::new(value, range)
                .step_by(setting.step())
                .show_value(false)
        );
    });

    ui.horizontal(|ui| {
        ui.label(RichText::new(setting.low_label()).small());
        ui.label(RichText::new("→").small().color(Color32::GRAY));
        ui.label(RichText::new(setting.high_label()).small());
    });
}
