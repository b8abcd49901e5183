use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use chrono::Utc;
use futures::FutureExt;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use v3d_core::{GenerationFailure, GenerationOutcome, GenerationRequest, GenerationSuccess};
use crate::error::AppError;
use crate::service::GenerationService;
use crate::viewer::resolve_model_url;

/// Tag of one `submit`. Strictly increasing within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Succeeded(GenerationSuccess),
    Failed(GenerationFailure),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn success(&self) -> Option<&GenerationSuccess> {
        match self {
            Self::Succeeded(s) => Some(s),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&GenerationFailure> {
        match self {
            Self::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// Result of one attempt on its way back to the session
#[derive(Debug, Clone)]
pub struct Completion {
    pub attempt: AttemptId,
    pub outcome: GenerationOutcome,
}

/// Where request tasks hand their completions. The receiving side must feed
/// them back into [`GenerationSession::resolve`] on the session's thread.
pub trait CompletionSink: Send + Sync + 'static {
    fn deliver(&self, completion: Completion);
}

impl CompletionSink for UnboundedSender<Completion> {
    fn deliver(&self, completion: Completion) {
        if self.send(completion).is_err() {
            debug!("Completion receiver dropped");
        }
    }
}

/// One user-facing generate-and-display workflow.
///
/// State changes only in [`submit`](Self::submit) and
/// [`resolve`](Self::resolve); both are called from the thread that owns the
/// session. The network call itself runs on the tokio runtime.
pub struct GenerationSession {
    service: Arc<dyn GenerationService>,
    sink: Arc<dyn CompletionSink>,
    runtime: Handle,
    state: SessionState,
    latest: AttemptId,
}

impl GenerationSession {
    /// Must be called from within a tokio runtime.
    pub fn new(service: Arc<dyn GenerationService>, sink: Arc<dyn CompletionSink>) -> Result<Self, AppError> {
        let runtime = Handle::try_current().map_err(|e| AppError::NoRuntime(e.to_string()))?;

        Ok(Self {
            service,
            sink,
            runtime,
            state: SessionState::Idle,
            latest: AttemptId::default(),
        })
    }

    /// Starts a new attempt, replacing whatever came before.
    ///
    /// A prompt that is blank after trimming is ignored: no state change, no
    /// request, `None` returned.
    pub fn submit(&mut self, prompt: &str, layer_height_mm: f32, infill_density_percent: u8) -> Option<AttemptId> {
        let Some(request) = GenerationRequest::new(prompt, layer_height_mm, infill_density_percent) else {
            debug!("Ignoring submit with blank prompt");
            return None;
        };

        self.latest = self.latest.next();
        let attempt = self.latest;
        self.state = SessionState::Loading;

        info!(
            "Attempt {} submitted: '{}' (layer {}mm, infill {}%)",
            attempt,
            request.prompt(),
            request.layer_height_mm(),
            request.infill_density_percent()
        );

        let guard = DeliveryGuard {
            attempt,
            sink: self.sink.clone(),
            delivered: false,
        };
        self.runtime.spawn(run_attempt(self.service.clone(), request, guard));

        Some(attempt)
    }

    /// Applies a completion if it belongs to the latest attempt and that
    /// attempt is still in flight. Returns whether the state changed.
    pub fn resolve(&mut self, completion: Completion) -> bool {
        if completion.attempt != self.latest {
            debug!("Discarding stale completion {} (latest is {})", completion.attempt, self.latest);
            return false;
        }
        if !self.state.is_loading() {
            debug!("Attempt {} already resolved", completion.attempt);
            return false;
        }

        self.state = match completion.outcome {
            GenerationOutcome::Success(success) => {
                info!(
                    "Attempt {} succeeded: {} ({}, generation {:.2}s, response {:.3}s)",
                    completion.attempt,
                    success.model_url,
                    success.status_label(),
                    success.generation_time_sec,
                    success.response_time_sec
                );
                if !success.print_params.print_time_is_consistent() {
                    warn!(
                        "Print time fields disagree: {}h vs {} min",
                        success.print_params.print_time_hours,
                        success.print_params.print_time_minutes
                    );
                }
                SessionState::Succeeded(success)
            }
            GenerationOutcome::Failure(failure) => {
                warn!(
                    "Attempt {} failed ({:?}): {}{}",
                    completion.attempt,
                    failure.kind,
                    failure.message,
                    failure.detail.as_deref().map(|d| format!(" [{d}]")).unwrap_or_default()
                );
                SessionState::Failed(failure)
            }
        };

        true
    }

    pub fn current_state(&self) -> SessionState {
        self.state.clone()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Id of the most recent accepted submit; the default id before any.
    pub fn latest_attempt(&self) -> AttemptId {
        self.latest
    }
}

async fn run_attempt(service: Arc<dyn GenerationService>, request: GenerationRequest, guard: DeliveryGuard) {
    let reply = AssertUnwindSafe(service.generate(&request)).catch_unwind().await;

    let outcome = match reply {
        Ok(Ok(reply)) => {
            let origin = service.origin().clone();
            reply.into_outcome(|path| {
                resolve_model_url(&origin, path, Utc::now().timestamp_millis()).map(|url| url.to_string())
            })
        }
        Ok(Err(e)) => GenerationOutcome::Failure(GenerationFailure::transport(e.to_string())),
        Err(_) => GenerationOutcome::Failure(GenerationFailure::transport("generation request panicked")),
    };

    guard.deliver(outcome);
}

/// Resolves its attempt exactly once, even if the request task is dropped
/// before it produced an outcome.
struct DeliveryGuard {
    attempt: AttemptId,
    sink: Arc<dyn CompletionSink>,
    delivered: bool,
}

impl DeliveryGuard {
    fn deliver(mut self, outcome: GenerationOutcome) {
        self.delivered = true;
        self.sink.deliver(Completion {
            attempt: self.attempt,
            outcome,
        });
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        if !self.delivered {
            self.sink.deliver(Completion {
                attempt: self.attempt,
                outcome: GenerationOutcome::Failure(GenerationFailure::transport(
                    "generation task ended without a reply",
                )),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use reqwest::Url;
    use serde_json::json;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use tokio::sync::oneshot;
    use v3d_core::outcome::{APPLICATION_FALLBACK_MESSAGE, TRANSPORT_FAILURE_MESSAGE};
    use v3d_core::{FailureKind, GenerateResponse};
    use crate::service::ServiceError;

    type Reply = Result<GenerateResponse, ServiceError>;

    /// Replies per prompt are held back until the test releases them
    struct GatedService {
        origin: Url,
        calls: AtomicUsize,
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl GatedService {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                origin: Url::parse("http://127.0.0.1:8000").unwrap(),
                calls: AtomicUsize::new(0),
                gates: Mutex::new(HashMap::new()),
            })
        }

        fn gate(&self, prompt: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(prompt.to_string(), rx);
            tx
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationService for GatedService {
        async fn generate(&self, request: &GenerationRequest) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(request.prompt());
            let Some(gate) = gate else {
                panic!("no reply prepared for {:?}", request.prompt());
            };
            gate.await.expect("gate sender dropped")
        }

        fn origin(&self) -> &Url {
            &self.origin
        }
    }

    fn session_with(service: Arc<GatedService>) -> (GenerationSession, UnboundedReceiver<Completion>) {
        let (tx, rx) = unbounded_channel();
        let session = GenerationSession::new(service, Arc::new(tx)).unwrap();
        (session, rx)
    }

    fn success_reply(model_url: &str, generation_time: f64) -> Reply {
        let body = json!({
            "success": true,
            "model_url": model_url,
            "cached": false,
            "generation_time": generation_time,
            "response_time": 4.35,
            "print_parameters": print_parameters(),
        });
        Ok(GenerateResponse::from_json(&body.to_string()).unwrap())
    }

    fn print_parameters() -> serde_json::Value {
        json!({
            "layer_height_mm": 0.2,
            "layer_count": 20,
            "infill_density_percent": 20.0,
            "infill_pattern": "Triangular (balanced)",
            "wall_count": 3,
            "wall_thickness_mm": 1.2,
            "supports_needed": true,
            "support_type": "Auto-generated tree supports",
            "orientation": "Optimal (largest base area)",
            "model_volume_cm3": 4.19,
            "model_height_mm": 4.0,
            "print_time_hours": 0.67,
            "print_time_minutes": 40.0,
            "material_cost_usd": 0.13,
            "material_weight_g": 6.4
        })
    }

    async fn settle(session: &mut GenerationSession, rx: &mut UnboundedReceiver<Completion>) -> bool {
        let completion = rx.recv().await.unwrap();
        session.resolve(completion)
    }

    #[tokio::test]
    async fn test_blank_prompt_is_noop() {
        let service = GatedService::new();
        let (mut session, _rx) = session_with(service.clone());

        assert_eq!(session.submit("", 0.2, 20), None);
        assert_eq!(session.submit("   \t", 0.2, 20), None);

        assert_eq!(session.current_state(), SessionState::Idle);
        assert_eq!(session.latest_attempt(), AttemptId::default());
        tokio::task::yield_now().await;
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_recorded() {
        let service = GatedService::new();
        let reply = service.gate("a red robot");
        let (mut session, mut rx) = session_with(service.clone());

        let attempt = session.submit("a red robot", 0.2, 20).unwrap();
        assert!(session.is_loading());
        reply.send(success_reply("/generated/abc.glb", 4.2)).unwrap();

        assert!(settle(&mut session, &mut rx).await);
        assert!(!session.is_loading());
        assert_eq!(session.latest_attempt(), attempt);

        let state = session.current_state();
        let success = state.success().unwrap();
        assert_eq!(success.generation_time_sec, 4.2);
        assert_eq!(success.response_time_sec, 4.35);
        assert!(!success.cached);
        assert!(success.model_url.starts_with("http://127.0.0.1:8000/generated/abc.glb?t="));

        let expected: v3d_core::PrintParameters = serde_json::from_value(print_parameters()).unwrap();
        assert_eq!(success.print_params, expected);
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_application_failure_uses_server_message() {
        let service = GatedService::new();
        let reply = service.gate("gold pendant");
        let (mut session, mut rx) = session_with(service);

        session.submit("gold pendant", 0.2, 20);
        reply.send(Ok(GenerateResponse::failure("Mesh export failed"))).unwrap();
        assert!(settle(&mut session, &mut rx).await);

        let failure = session.state().failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Application);
        assert_eq!(failure.message, "Mesh export failed");
        assert!(session.state().success().is_none());
    }

    #[tokio::test]
    async fn test_application_failure_fallback_message() {
        let service = GatedService::new();
        let reply = service.gate("red car");
        let (mut session, mut rx) = session_with(service);

        session.submit("red car", 0.2, 20);
        let bare = GenerateResponse::from_json(r#"{"success": false}"#).unwrap();
        reply.send(Ok(bare)).unwrap();
        assert!(settle(&mut session, &mut rx).await);

        assert_eq!(session.state().failure().unwrap().message, APPLICATION_FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_transport_failure_distinct() {
        let service = GatedService::new();
        let reply = service.gate("green sphere");
        let (mut session, mut rx) = session_with(service);

        session.submit("green sphere", 0.2, 20);
        assert!(session.is_loading());
        reply.send(Err(ServiceError::Unreachable("connection refused".into()))).unwrap();
        assert!(settle(&mut session, &mut rx).await);

        let failure = session.state().failure().unwrap();
        assert!(!session.is_loading());
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.message, TRANSPORT_FAILURE_MESSAGE);
        assert_ne!(failure.message, APPLICATION_FALLBACK_MESSAGE);
        assert!(failure.detail.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_off_origin_model_url_is_transport_failure() {
        let service = GatedService::new();
        let reply = service.gate("silver ring");
        let (mut session, mut rx) = session_with(service);

        session.submit("silver ring", 0.2, 20);
        reply.send(success_reply("http://elsewhere.example/ring.glb", 1.0)).unwrap();
        assert!(settle(&mut session, &mut rx).await);

        let failure = session.state().failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(failure.detail.as_deref().unwrap().contains("not a server-relative path"));
        assert!(session.state().success().is_none());
    }

    #[tokio::test]
    async fn test_panicking_service_still_resolves() {
        let service = GatedService::new();
        let (mut session, mut rx) = session_with(service);

        // No gate registered, so the service panics
        session.submit("a crystal castle", 0.2, 20);
        assert!(settle(&mut session, &mut rx).await);

        let failure = session.state().failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_stale_completion_discarded() {
        let service = GatedService::new();
        let reply_a = service.gate("slow");
        let reply_b = service.gate("fast");
        let (mut session, mut rx) = session_with(service.clone());

        let a = session.submit("slow", 0.2, 20).unwrap();
        let b = session.submit("fast", 0.2, 20).unwrap();
        assert!(b > a);
        assert_eq!(session.latest_attempt(), b);

        reply_b.send(success_reply("/generated/fast.glb", 1.0)).unwrap();
        assert!(settle(&mut session, &mut rx).await);

        reply_a.send(success_reply("/generated/slow.glb", 9.0)).unwrap();
        assert!(!settle(&mut session, &mut rx).await);

        let state = session.current_state();
        let success = state.success().unwrap();
        assert!(success.model_url.contains("/generated/fast.glb"));
        assert_eq!(success.generation_time_sec, 1.0);
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_failure_cannot_clobber_loading() {
        let service = GatedService::new();
        let reply_a = service.gate("first");
        let _reply_b = service.gate("second");
        let (mut session, mut rx) = session_with(service);

        session.submit("first", 0.2, 20);
        session.submit("second", 0.2, 20);

        reply_a.send(Err(ServiceError::Timeout)).unwrap();
        assert!(!settle(&mut session, &mut rx).await);
        assert!(session.is_loading());
    }

    #[tokio::test]
    async fn test_resubmit_clears_previous_result() {
        let service = GatedService::new();
        let first = service.gate("robot");
        let second = service.gate("robot again");
        let (mut session, mut rx) = session_with(service);

        session.submit("robot", 0.2, 20);
        first.send(Err(ServiceError::Timeout)).unwrap();
        settle(&mut session, &mut rx).await;
        assert!(session.state().failure().is_some());

        session.submit("robot again", 0.15, 60);
        assert_eq!(session.current_state(), SessionState::Loading);
        assert!(session.state().failure().is_none());

        second.send(success_reply("/generated/r.glb", 2.0)).unwrap();
        settle(&mut session, &mut rx).await;
        assert!(session.state().success().is_some());

        // Blank prompt after a result keeps the result
        session.submit(" ", 0.2, 20);
        assert!(session.state().success().is_some());
    }

    #[tokio::test]
    async fn test_completion_applied_once() {
        let service = GatedService::new();
        let reply = service.gate("cube");
        let (mut session, mut rx) = session_with(service);

        session.submit("cube", 0.2, 20);
        reply.send(success_reply("/generated/cube.glb", 0.5)).unwrap();
        let completion = rx.recv().await.unwrap();

        assert!(session.resolve(completion.clone()));
        assert!(!session.resolve(completion));
    }

    #[tokio::test]
    async fn test_dropped_task_still_delivers() {
        let (tx, mut rx) = unbounded_channel();
        let guard = DeliveryGuard {
            attempt: AttemptId(7),
            sink: Arc::new(tx),
            delivered: false,
        };
        drop(guard);

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.attempt, AttemptId(7));
        let GenerationOutcome::Failure(f) = completion.outcome else {
            panic!("expected failure");
        };
        assert_eq!(f.kind, FailureKind::Transport);
    }

    #[test]
    fn test_new_outside_runtime() {
        let (tx, _rx) = unbounded_channel::<Completion>();
        let result = GenerationSession::new(GatedService::new(), Arc::new(tx));
        assert!(matches!(result, Err(AppError::NoRuntime(_))));
    }
}
