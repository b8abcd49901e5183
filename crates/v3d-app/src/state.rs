use std::sync::Arc;
use egui_wgpu::wgpu;
use egui_wgpu::wgpu::StoreOp;
use log::{info, warn};
use reqwest::Url;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use crate::config::ServiceConfig;
use crate::events::{GenEvent, V3dEvent};
use crate::gfx::GfxState;
use crate::service::HttpGenerationService;
use crate::session::{CompletionSink, GenerationSession};
use crate::ui;
use crate::ui::{ServiceHealth, UiContext, UiEvent, UiState};
use crate::viewer::ModelViewer;

pub struct AppState {
    pub(crate) window: Arc<Window>,
    event_loop_proxy: Arc<EventLoopProxy<V3dEvent>>,

    pub gfx: GfxState,
    pub ui: UiState,

    service: Arc<HttpGenerationService>,
    session: GenerationSession,
}

impl AppState {
    pub async fn new(
        window: Arc<Window>,
        event_loop_proxy: Arc<EventLoopProxy<V3dEvent>>,
        config: &ServiceConfig,
    ) -> anyhow::Result<Self> {
        let service = Arc::new(HttpGenerationService::new(config)?);
        let sink: Arc<dyn CompletionSink> = Arc::new(event_loop_proxy.as_ref().clone());
        let session = GenerationSession::new(service.clone(), sink)?;

        let gfx = GfxState::new(window.clone()).await?;
        let ui_ctx = UiContext::new(config.service_url.clone(), event_loop_proxy.clone());
        let mut ui_state = UiState::new(&gfx, window.clone(), ui_ctx);

        ui_state.add_component(Box::new(ui::TopPanel));
        ui_state.add_component(Box::new(ui::SidePanel::new(
            config.layer_height_mm,
            config.infill_density_percent,
        )));
        ui_state.add_component(Box::new(ui::ResultsPanel));
        ui_state.add_component(Box::new(ui::CentralPanel));

        let state = Self {
            window,
            event_loop_proxy,
            gfx,
            ui: ui_state,
            service,
            session,
        };

        info!("Generation service at {}", config.service_url);
        state.check_health();

        Ok(state)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gfx.resize(new_size);
    }

    pub fn on_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Generate { prompt, layer_height_mm, infill_density_percent } => {
                if self.session.submit(&prompt, layer_height_mm, infill_density_percent).is_some() {
                    self.ui.ui_ctx.viewer.clear();
                    self.sync_session();
                }
            }
            UiEvent::CheckHealth => {
                self.ui.ui_ctx.health = ServiceHealth::Unknown;
                self.check_health();
            }
            UiEvent::RefreshStats => {
                self.refresh_stats();
            }
        }
    }

    pub fn on_gen_event(&mut self, event: GenEvent) {
        match event {
            GenEvent::Resolved(completion) => {
                if !self.session.resolve(completion) {
                    return;
                }

                if let Some(success) = self.session.state().success() {
                    match Url::parse(&success.model_url) {
                        Ok(url) => self.ui.ui_ctx.viewer.present(&url),
                        Err(e) => warn!("Viewer rejected {}: {}", success.model_url, e),
                    }
                }
                self.sync_session();
            }
            GenEvent::Health(result) => {
                self.ui.ui_ctx.health = match result {
                    Ok(health) if health.is_healthy() => ServiceHealth::Healthy(health),
                    Ok(health) => ServiceHealth::Unhealthy(health.status),
                    Err(e) => {
                        warn!("Health check failed: {}", e);
                        ServiceHealth::Unhealthy(e.to_string())
                    }
                };
            }
            GenEvent::Stats(result) => match result {
                Ok(stats) => self.ui.ui_ctx.stats = Some(stats),
                Err(e) => warn!("Could not load stats: {}", e),
            },
        }
    }

    fn sync_session(&mut self) {
        self.ui.set_session(self.session.current_state());
    }

    fn check_health(&self) {
        let service = self.service.clone();
        let proxy = self.event_loop_proxy.clone();
        tokio::spawn(async move {
            let result = service.health().await;
            if proxy.send_event(V3dEvent::Gen(GenEvent::Health(result))).is_err() {
                warn!("Event loop closed, dropping health result");
            }
        });
    }

    fn refresh_stats(&self) {
        let service = self.service.clone();
        let proxy = self.event_loop_proxy.clone();
        tokio::spawn(async move {
            let result = service.stats().await;
            if proxy.send_event(V3dEvent::Gen(GenEvent::Stats(result))).is_err() {
                warn!("Event loop closed, dropping stats");
            }
        });
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gfx.resize(size);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder")
        });

        let full_output = self.ui.draw(&self.window);

        let platform_output = full_output.platform_output.clone();
        self.ui.egui_state.handle_platform_output(&self.window, platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let paint_jobs = self.ui.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_desc = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.ui.egui_renderer.update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        self.ui.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &paint_jobs,
            &screen_desc,
        );

        {
            let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.07, g: 0.07, b: 0.1, a: 1.0 }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.ui.egui_renderer.render(&mut rpass.forget_lifetime(), &paint_jobs, &screen_desc);
        }

        for id in &full_output.textures_delta.free {
            self.ui.egui_renderer.free_texture(id);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Keep the spinner moving while a request is out
        if self.session.is_loading() {
            self.window.request_redraw();
        }

        Ok(())
    }
}
