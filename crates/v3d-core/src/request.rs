use serde::{Deserialize, Serialize};
use crate::presets::PrintSetting;

/// Body of a generate call.
///
/// Only constructible through [`GenerationRequest::new`], which guarantees a
/// non-blank trimmed prompt and in-range print settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    #[serde(rename = "layer_height")]
    layer_height_mm: f32,
    #[serde(rename = "infill_density")]
    infill_density_percent: u8,
}

impl GenerationRequest {
    /// Returns `None` when the prompt is empty after trimming.
    /// Numeric settings outside their slider range are clamped into it.
    pub fn new(prompt: &str, layer_height_mm: f32, infill_density_percent: u8) -> Option<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        let lh = PrintSetting::LayerHeight;
        let layer_height_mm = if layer_height_mm.is_finite() {
            layer_height_mm.clamp(lh.min() as f32, lh.max() as f32)
        } else {
            lh.default_value() as f32
        };

        Some(Self {
            prompt: prompt.to_string(),
            layer_height_mm,
            infill_density_percent: infill_density_percent.min(PrintSetting::InfillDensity.max() as u8),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn layer_height_mm(&self) -> f32 {
        self.layer_height_mm
    }

    pub fn infill_density_percent(&self) -> u8 {
        self.infill_density_percent
    }
}
