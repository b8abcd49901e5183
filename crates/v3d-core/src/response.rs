use std::fmt::Display;
use serde::{Deserialize, Serialize};
use crate::outcome::{GenerationFailure, GenerationOutcome, GenerationSuccess};
use crate::print_params::PrintParameters;

/// Reply envelope of the generate endpoint.
///
/// `success` decides which of the remaining fields are meaningful: the model
/// and metric fields on success, `error` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    pub success: bool,
    pub error: Option<String>,
    pub model_url: Option<String>,
    pub cached: Option<bool>,
    pub generation_time: Option<f64>,
    pub response_time: Option<f64>,
    pub print_parameters: Option<PrintParameters>,
}

impl GenerateResponse {
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            model_url: None,
            cached: None,
            generation_time: None,
            response_time: None,
            print_parameters: None,
        }
    }

    /// Classifies the reply. `resolve_url` turns the server-relative
    /// `model_url` into the absolute URL handed to the viewer.
    pub fn into_outcome<F, E>(self, resolve_url: F) -> GenerationOutcome
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: Display,
    {
        if !self.success {
            return GenerationOutcome::Failure(GenerationFailure::application(self.error.as_deref()));
        }

        let Some(path) = self.model_url else {
            return GenerationOutcome::Failure(GenerationFailure::transport(
                "success reply without model_url",
            ));
        };
        let Some(print_params) = self.print_parameters else {
            return GenerationOutcome::Failure(GenerationFailure::transport(
                "success reply without print_parameters",
            ));
        };

        let model_url = match resolve_url(&path) {
            Ok(url) => url,
            Err(e) => {
                return GenerationOutcome::Failure(GenerationFailure::transport(format!(
                    "unusable model_url {path:?}: {e}"
                )));
            }
        };

        GenerationOutcome::Success(GenerationSuccess {
            model_url,
            cached: self.cached.unwrap_or(false),
            generation_time_sec: self.generation_time.unwrap_or(0.0).max(0.0),
            response_time_sec: self.response_time.unwrap_or(0.0).max(0.0),
            print_params,
        })
    }
}
