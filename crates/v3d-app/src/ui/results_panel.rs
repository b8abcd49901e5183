use egui::{Color32, Context, RichText};
use v3d_core::{GenerationSuccess, PrintParameters};
use crate::ui::{UiComponent, UiContext};

#[derive(Default)]
pub struct ResultsPanel;

impl UiComponent for ResultsPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let Some(success) = ui_ctx.session.success() else {
            return;
        };

        egui::SidePanel::right("results_panel")
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    metrics(ui, success);
                    ui.separator();
                    print_parameters(ui, &success.print_params);
                });
            });
    }
}

fn metrics(ui: &mut egui::Ui, success: &GenerationSuccess) {
    ui.heading("📈 Metrics");
    egui::Grid::new("metrics_grid").num_columns(2).striped(true).show(ui, |ui| {
        let (icon, color) = if success.cached {
            ("⚡", Color32::YELLOW)
        } else {
            ("🎨", Color32::LIGHT_GREEN)
        };
        ui.label("Status:");
        ui.label(RichText::new(format!("{icon} {}", success.status_label())).color(color));
        ui.end_row();

        ui.label("Generation Time:");
        ui.label(success.generation_time_label());
        ui.end_row();

        ui.label("Response Time:");
        ui.label(success.response_time_label());
        ui.end_row();
    });
}

fn print_parameters(ui: &mut egui::Ui, p: &PrintParameters) {
    ui.heading("📐 3D Printing Parameters");

    section(ui, "📏 Layer Settings", &[
        ("Height", format!("{}mm", p.layer_height_mm)),
        ("Total Layers", p.layer_count.to_string()),
    ]);
    section(ui, "🔲 Infill Configuration", &[
        ("Density", format!("{}%", p.infill_density_percent)),
        ("Pattern", p.infill_pattern.clone()),
    ]);
    section(ui, "🧱 Shell/Walls", &[
        ("Wall Count", p.wall_count.to_string()),
        ("Thickness", format!("{}mm", p.wall_thickness_mm)),
    ]);
    section(ui, "🏗 Support Structures", &[
        ("Required", p.supports_label().to_string()),
        ("Type", p.support_type.clone()),
    ]);
    section(ui, "🔄 Orientation", &[("", p.orientation.clone())]);
    section(ui, "📦 Model Size", &[
        ("Volume", format!("{} cm³", p.model_volume_cm3)),
        ("Height", format!("{}mm", p.model_height_mm)),
    ]);

    ui.separator();
    ui.label(RichText::new("⏱ Estimated Print Time").strong());
    ui.label(RichText::new(p.estimated_print_time().to_string()).size(18.0));
    ui.add_space(5.0);
    ui.label(RichText::new("💰 Estimated Cost").strong());
    ui.label(RichText::new(p.cost_label()).size(18.0));
    ui.label(RichText::new(format!("{}g of material", p.material_weight_g)).small());
}

fn section(ui: &mut egui::Ui, title: &str, rows: &[(&str, String)]) {
    ui.add_space(4.0);
    ui.label(RichText::new(title).strong());
    for (name, value) in rows {
        if name.is_empty() {
            ui.label(value.as_str());
        } else {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{name}:")).color(Color32::GRAY));
                ui.label(value.as_str());
            });
        }
    }
}
