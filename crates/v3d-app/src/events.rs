use log::warn;
use winit::event_loop::EventLoopProxy;
use crate::service::{HealthStatus, PerformanceStats, ServiceError};
use crate::session::{Completion, CompletionSink};
use crate::ui::UiEvent;

#[derive(Debug, Clone)]
pub enum V3dEvent {
    Ui(UiEvent),
    Gen(GenEvent),
}

/// Results coming back from the generation service
#[derive(Debug, Clone)]
pub enum GenEvent {
    Resolved(Completion),
    Health(Result<HealthStatus, ServiceError>),
    Stats(Result<PerformanceStats, ServiceError>),
}

/// Completions re-enter the session on the event loop thread
impl CompletionSink for EventLoopProxy<V3dEvent> {
    fn deliver(&self, completion: Completion) {
        let attempt = completion.attempt;
        if self.send_event(V3dEvent::Gen(GenEvent::Resolved(completion))).is_err() {
            warn!("Event loop closed before attempt {} resolved", attempt);
        }
    }
}
