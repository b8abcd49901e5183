/// Print settings exposed as sliders next to the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintSetting {
    LayerHeight,
    InfillDensity,
}

impl PrintSetting {
    /// Setting name for display in UI
    pub fn name(&self) -> &str {
        match self {
            Self::LayerHeight => "Layer Height",
            Self::InfillDensity => "Infill Density",
        }
    }

    /// Field name on the wire, also used as the slider's widget id
    pub fn id(&self) -> &str {
        match self {
            Self::LayerHeight => "layer_height",
            Self::InfillDensity => "infill_density",
        }
    }

    /// What the slider trades off
    pub fn hint(&self) -> &str {
        match self {
            Self::LayerHeight => "(Resolution vs Speed)",
            Self::InfillDensity => "(Strength vs Material)",
        }
    }

    pub fn unit(&self) -> &str {
        match self {
            Self::LayerHeight => "mm",
            Self::InfillDensity => "%",
        }
    }

    pub fn min(&self) -> f64 {
        match self {
            Self::LayerHeight => 0.1,
            Self::InfillDensity => 0.0,
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            Self::LayerHeight => 0.3,
            Self::InfillDensity => 100.0,
        }
    }

    pub fn step(&self) -> f64 {
        match self {
            Self::LayerHeight => 0.05,
            Self::InfillDensity => 5.0,
        }
    }

    pub fn default_value(&self) -> f64 {
        match self {
            Self::LayerHeight => 0.2,
            Self::InfillDensity => 20.0,
        }
    }

    /// Label under the low end of the slider
    pub fn low_label(&self) -> &str {
        match self {
            Self::LayerHeight => "Fine (0.1mm)",
            Self::InfillDensity => "Light (0%)",
        }
    }

    /// Label under the high end of the slider
    pub fn high_label(&self) -> &str {
        match self {
            Self::LayerHeight => "Fast (0.3mm)",
            Self::InfillDensity => "Solid (100%)",
        }
    }

    /// Value with the precision and unit shown next to the slider
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Self::LayerHeight => format!("{value:.2}mm"),
            Self::InfillDensity => format!("{value:.0}%"),
        }
    }

    /// Clamp into range and snap to the nearest slider step
    pub fn snap(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default_value();
        }
        let clamped = value.clamp(self.min(), self.max());
        let steps = ((clamped - self.min()) / self.step()).round();
        (self.min() + steps * self.step()).clamp(self.min(), self.max())
    }
}

/// Prompts offered as one-click chips before the first generation
pub const SUGGESTED_PROMPTS: [&str; 4] = ["a blue robot", "red car", "gold pendant", "green sphere"];
