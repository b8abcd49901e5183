mod app;
mod config;
mod error;
mod events;
mod gfx;
mod service;
mod session;
mod state;
mod ui;
mod viewer;

use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};
use crate::config::ServiceConfig;
use crate::events::V3dEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::load()?;

    let event_loop: EventLoop<V3dEvent> = EventLoop::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(&event_loop, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
