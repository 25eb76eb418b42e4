pub mod config;
pub mod setup;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use winit::{dpi::PhysicalSize, event_loop::EventLoopProxy, window::Window};

use wgpu::{
    CommandEncoderDescriptor, Device, ExperimentalFeatures, Features, Instance, Limits,
    MemoryHints, PowerPreference, Queue, RequestAdapterOptions, Surface, SurfaceConfiguration,
    SurfaceError, TextureViewDescriptor,
};

use beacon_3d::Renderer3D;
use beacon_assets::{FsAssetLoader, load_meshes};
use beacon_math::parse_hex_color;
use beacon_scene::Scene;

pub use config::DemoConfig;

pub type RcWindow = Arc<Window>;

/// Creates the GPU context, loads every asset the config names and builds
/// the scene, then hands the result to the event loop.
pub async fn create_graphics(
    window: RcWindow,
    proxy: EventLoopProxy<Graphics>,
    config: DemoConfig,
) -> anyhow::Result<()> {
    let instance = Instance::default();
    let surface = instance
        .create_surface(Arc::clone(&window))
        .context("creating surface")?;

    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("no suitable GPU adapter")?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: Features::empty(),
            required_limits: Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
            memory_hints: MemoryHints::Performance,
            trace: Default::default(),
            experimental_features: ExperimentalFeatures::disabled(),
        })
        .await
        .context("requesting device")?;

    let size = window.inner_size();
    let width = size.width.max(1);
    let height = size.height.max(1);

    let surface_config = surface
        .get_default_config(&adapter, width, height)
        .ok_or_else(|| anyhow!("surface is not supported by the adapter"))?;
    surface.configure(&device, &surface_config);

    let clear_color = parse_hex_color(&config.renderer.clear_color)
        .context("renderer.clear_color")?;
    let mut renderer = Renderer3D::new(
        &device,
        surface_config.format,
        surface_config.width,
        surface_config.height,
        clear_color,
    );

    log::info!("loading assets from {}", config.assets.root.display());
    let loader = FsAssetLoader::new(&config.assets.root);
    let mesh_names = config.mesh_names();
    let (_, mesh_results) = futures::join!(
        renderer.load_programs(&device, &loader, &config.shaders),
        load_meshes(&loader, &mesh_names),
    );

    let mut meshes = HashMap::new();
    for (name, result) in mesh_results {
        match result {
            Ok(data) => {
                let handle = renderer.meshes.upload(&device, &name, &data);
                meshes.insert(name, handle);
            }
            Err(err) => log::error!("{err}"),
        }
    }

    let aspect_ratio = surface_config.width as f32 / surface_config.height as f32;
    let scene = setup::build_scene(&config, aspect_ratio, &meshes).context("building scene")?;
    renderer.prepare(&device, &scene);

    let gfx = Graphics {
        window,
        surface,
        surface_config,
        device,
        queue,
        renderer,
        scene,
        rotation_step: config.camera.rotation_step,
    };

    proxy
        .send_event(gfx)
        .map_err(|_| anyhow!("event loop closed before graphics were ready"))
}

pub struct Graphics {
    window: RcWindow,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    renderer: Renderer3D,
    scene: Scene,
    rotation_step: f32,
}

impl Graphics {
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface_config.width = new_size.width.max(1);
        self.surface_config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.renderer.resize(
            &self.device,
            self.surface_config.width,
            self.surface_config.height,
        );

        let aspect_ratio = self.surface_config.width as f32 / self.surface_config.height as f32;
        self.scene.camera_mut().update(aspect_ratio);
    }

    /// Renders one frame, orbiting the camera by the configured step first.
    pub fn draw(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("surface lost; reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(err) => {
                log::error!("failed to acquire next frame: {err}");
                return;
            }
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: None });

        let step = self.rotation_step;
        self.renderer
            .render(&self.queue, &mut encoder, &view, &mut self.scene, |scene| {
                scene.camera_mut().rotate(step)
            });

        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}
