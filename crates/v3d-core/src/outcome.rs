use crate::print_params::PrintParameters;

/// Shown when the service rejects a request without saying why.
pub const APPLICATION_FALLBACK_MESSAGE: &str = "Error generating model";

/// Shown for every transport-level problem.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Cannot connect to the generation service. Is the server running?";

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success(GenerationSuccess),
    Failure(GenerationFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSuccess {
    /// Absolute, cache-busted asset URL ready for the viewer
    pub model_url: String,
    pub cached: bool,
    pub generation_time_sec: f64,
    pub response_time_sec: f64,
    pub print_params: PrintParameters,
}

impl GenerationSuccess {
    pub fn status_label(&self) -> &str {
        if self.cached { "Cached" } else { "Generated" }
    }

    pub fn generation_time_label(&self) -> String {
        format!("{:.2}s", self.generation_time_sec)
    }

    pub fn response_time_label(&self) -> String {
        format!("{:.3}s", self.response_time_sec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Well-formed reply with `success: false`
    Application,
    /// Unreachable service, timeout, bad status or unreadable body
    Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Technical cause, for logs only
    pub detail: Option<String>,
}

impl GenerationFailure {
    pub fn application(server_message: Option<&str>) -> Self {
        let message = server_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(APPLICATION_FALLBACK_MESSAGE)
            .to_string();

        Self {
            kind: FailureKind::Application,
            message,
            detail: None,
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: TRANSPORT_FAILURE_MESSAGE.to_string(),
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_message_from_server() {
        let f = GenerationFailure::application(Some("Prompt is required"));
        assert_eq!(f.kind, FailureKind::Application);
        assert_eq!(f.message, "Prompt is required");
    }

    #[test]
    fn test_application_message_fallback() {
        assert_eq!(GenerationFailure::application(None).message, APPLICATION_FALLBACK_MESSAGE);
        assert_eq!(GenerationFailure::application(Some("  ")).message, APPLICATION_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_transport_message_distinct() {
        let t = GenerationFailure::transport("connection refused");
        let a = GenerationFailure::application(None);
        assert_eq!(t.kind, FailureKind::Transport);
        assert_ne!(t.message, a.message);
        assert!(t.message.contains("running"));
        assert_eq!(t.detail.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_metric_labels() {
        let s = GenerationSuccess {
            model_url: "http://127.0.0.1:8000/generated/a.glb?t=1".into(),
            cached: true,
            generation_time_sec: 4.2,
            response_time_sec: 4.35,
            print_params: crate::print_params::tests::sample(),
        };
        assert_eq!(s.status_label(), "Cached");
        assert_eq!(s.generation_time_label(), "4.20s");
        assert_eq!(s.response_time_label(), "4.350s");
    }
}
