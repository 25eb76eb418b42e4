mod app;

use crate::app::App;
use beacon_runtime::{DemoConfig, Graphics, config::DEFAULT_CONFIG_PATH};
use winit::event_loop::EventLoop;

fn run_app(event_loop: EventLoop<Graphics>, mut app: App) -> anyhow::Result<()> {
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = DemoConfig::load(&path)?;
    log::info!("using config {path}");

    let event_loop = EventLoop::<Graphics>::with_user_event().build()?;
    let app = App::new(&event_loop, config);
    run_app(event_loop, app)
}
