use std::sync::Arc;
use log::error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::window::{WindowAttributes, WindowId};
use crate::config::ServiceConfig;
use crate::events::V3dEvent;
use crate::state::AppState;

pub struct App {
    event_loop_proxy: Arc<EventLoopProxy<V3dEvent>>,
    config: ServiceConfig,
    state: Option<AppState>,
}

impl App {
    pub fn new(event_loop: &EventLoop<V3dEvent>, config: ServiceConfig) -> Self {
        let event_loop_proxy = Arc::new(event_loop.create_proxy());

        Self {
            event_loop_proxy,
            config,
            state: None,
        }
    }
}

impl ApplicationHandler<V3dEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title("Vision3D Pro")
            .with_inner_size(winit::dpi::LogicalSize::new(1400.0, 900.0));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Could not create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(AppState::new(window, self.event_loop_proxy.clone(), &self.config)) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                error!("Startup failed: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: V3dEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            V3dEvent::Ui(e) => state.on_ui_event(e),
            V3dEvent::Gen(e) => state.on_gen_event(e),
        }
        state.window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        if state.window.id() != window_id {
            return;
        }

        let response = state.ui.egui_state.on_window_event(&state.window, &event);
        if response.repaint {
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                state.resize(physical_size);
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.render() {
                    error!("Render failed: {:#}", e);
                }
            }
            _ => {}
        }
    }
}
