use std::fmt;
use serde::{Deserialize, Serialize};

/// Slicer-style print settings the service derives for a generated model.
/// Kept exactly as received; formatting happens through the accessor helpers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintParameters {
    pub layer_height_mm: f64,
    pub layer_count: u32,
    pub infill_density_percent: f64,
    pub infill_pattern: String,
    pub wall_count: u32,
    pub wall_thickness_mm: f64,
    pub supports_needed: bool,
    pub support_type: String,
    pub orientation: String,
    pub model_volume_cm3: f64,
    pub model_height_mm: f64,
    pub print_time_hours: f64,
    pub print_time_minutes: f64,
    pub material_cost_usd: f64,
    pub material_weight_g: f64,
}

/// Hours rounded to 2 dp is off by at most 0.005 h = 0.3 min,
/// minutes rounded to 1 dp by 0.05 min.
const PRINT_TIME_TOLERANCE_MIN: f64 = 0.35;

impl PrintParameters {
    /// Estimated duration as whole hours plus remaining minutes.
    pub fn estimated_print_time(&self) -> PrintTime {
        let total = if self.print_time_minutes.is_finite() && self.print_time_minutes >= 0.0 {
            self.print_time_minutes
        } else if self.print_time_hours.is_finite() && self.print_time_hours >= 0.0 {
            self.print_time_hours * 60.0
        } else {
            0.0
        };
        PrintTime::from_total_minutes(total.round() as u64)
    }

    /// Whether the hours and minutes fields describe the same duration.
    pub fn print_time_is_consistent(&self) -> bool {
        (self.print_time_hours * 60.0 - self.print_time_minutes).abs() <= PRINT_TIME_TOLERANCE_MIN
    }

    pub fn supports_label(&self) -> &str {
        if self.supports_needed { "Yes" } else { "No" }
    }

    pub fn cost_label(&self) -> String {
        format!("${:.2}", self.material_cost_usd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintTime {
    pub hours: u64,
    pub minutes: u8,
}

impl PrintTime {
    pub fn from_total_minutes(total: u64) -> Self {
        Self {
            hours: total / 60,
            minutes: (total % 60) as u8,
        }
    }
}

impl fmt::Display for PrintTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hours, self.minutes) {
            (0, m) => write!(f, "{m} min"),
            (h, 0) => write!(f, "{h}h"),
            (h, m) => write!(f, "{h}h {m} min"),
        }
    }
}
