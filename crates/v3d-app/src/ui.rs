mod top_panel;
mod side_panel;
mod results_panel;
mod central_panel;

pub use top_panel::TopPanel;
pub use side_panel::SidePanel;
pub use results_panel::ResultsPanel;
pub use central_panel::CentralPanel;

use std::sync::Arc;
use egui::Context;
use log::warn;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use crate::events::V3dEvent;
use crate::gfx::GfxState;
use crate::service::{HealthStatus, PerformanceStats};
use crate::session::SessionState;
use crate::viewer::ViewerSlot;

#[derive(Debug, Clone)]
pub enum UiEvent {
    Generate {
        prompt: String,
        layer_height_mm: f32,
        infill_density_percent: u8,
    },
    CheckHealth,
    RefreshStats,
}

/// Service reachability as last probed
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Healthy(HealthStatus),
    Unhealthy(String),
}

/// Read-only view handed to every component each frame
pub struct UiContext {
    pub session: SessionState,
    pub viewer: ViewerSlot,
    pub health: ServiceHealth,
    pub stats: Option<PerformanceStats>,
    pub service_url: String,
    pub event_loop_proxy: Arc<EventLoopProxy<V3dEvent>>,
}

impl UiContext {
    pub fn new(service_url: String, event_loop_proxy: Arc<EventLoopProxy<V3dEvent>>) -> Self {
        Self {
            session: SessionState::Idle,
            viewer: ViewerSlot::default(),
            health: ServiceHealth::Unknown,
            stats: None,
            service_url,
            event_loop_proxy,
        }
    }

    pub fn send_event(&self, event: UiEvent) {
        if self.event_loop_proxy.send_event(V3dEvent::Ui(event)).is_err() {
            warn!("Event loop closed, dropping UI event");
        }
    }
}

pub struct UiState {
    pub(crate) egui_state: egui_winit::State,
    pub(crate) egui_ctx: egui::Context,
    pub(crate) egui_renderer: egui_wgpu::Renderer,

    components: Vec<Box<dyn UiComponent>>,
    pub(crate) ui_ctx: UiContext,
}

impl UiState {
    pub fn new(gfx: &GfxState, window: Arc<Window>, ui_ctx: UiContext) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gfx.device, gfx.config.format, egui_wgpu::RendererOptions::default());

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            components: Vec::new(),
            ui_ctx,
        }
    }

    pub fn draw(&mut self, window: &Window) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);

        self.egui_ctx.run(raw_input, |ctx| {
            for component in self.components.iter_mut() {
                component.show(ctx, &self.ui_ctx);
            }
        })
    }

    /// Components draw in insertion order; the central panel goes last.
    pub fn add_component(&mut self, component: Box<dyn UiComponent>) {
        self.components.push(component);
    }

    pub fn set_session(&mut self, session: SessionState) {
        self.ui_ctx.session = session;
    }
}

pub trait UiComponent {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext);
}
