use std::env;
use std::time::Duration;
use thiserror::Error;
use v3d_core::PrintSetting;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Could not read .env: {0}")]
    DotEnv(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub service_url: String,
    pub generate_path: String,
    pub health_path: String,
    pub stats_path: String,
    pub request_timeout: Duration,
    pub layer_height_mm: f32,
    pub infill_density_percent: u8,
}

impl ServiceConfig {
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::DotEnv(e.to_string())),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let service_url = get("V3D_SERVICE_URL", "http://127.0.0.1:8000");
        let service_url = service_url.trim_end_matches('/').to_string();

        let timeout_raw = get("V3D_REQUEST_TIMEOUT_SECS", "120");
        let timeout_secs: u64 = timeout_raw
            .parse()
            .ok()
            .filter(|s| *s > 0)
            .ok_or(ConfigError::Invalid {
                key: "V3D_REQUEST_TIMEOUT_SECS",
                expected: "a positive number of seconds",
                value: timeout_raw.clone(),
            })?;

        let layer_raw = get("V3D_LAYER_HEIGHT", "0.2");
        let layer_height: f64 = layer_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "V3D_LAYER_HEIGHT",
            expected: "a layer height in mm",
            value: layer_raw.clone(),
        })?;

        let infill_raw = get("V3D_INFILL_DENSITY", "20");
        let infill: f64 = infill_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "V3D_INFILL_DENSITY",
            expected: "an infill percentage",
            value: infill_raw.clone(),
        })?;

        Ok(Self {
            service_url,
            generate_path: get("V3D_GENERATE_PATH", "/api/generate/"),
            health_path: get("V3D_HEALTH_PATH", "/api/health/"),
            stats_path: get("V3D_STATS_PATH", "/api/stats/"),
            request_timeout: Duration::from_secs(timeout_secs),
            layer_height_mm: PrintSetting::LayerHeight.snap(layer_height) as f32,
            infill_density_percent: PrintSetting::InfillDensity.snap(infill) as u8,
        })
    }
}
