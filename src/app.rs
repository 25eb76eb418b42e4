use beacon_runtime::{DemoConfig, Graphics, RcWindow, create_graphics};
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

enum State {
    Ready(Graphics),
    Init(Option<(EventLoopProxy<Graphics>, DemoConfig)>),
}

pub struct App {
    state: State,
    frame_time: Duration,
    render_target: Instant,
}

impl App {
    pub fn new(event_loop: &EventLoop<Graphics>, config: DemoConfig) -> Self {
        let fps = config.window.fps.max(1) as u64;
        Self {
            state: State::Init(Some((event_loop.create_proxy(), config))),
            frame_time: Duration::from_nanos(1_000_000_000 / fps),
            render_target: Instant::now(),
        }
    }

    fn draw(&mut self) {
        if let State::Ready(gfx) = &mut self.state {
            gfx.draw();
        }
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let State::Ready(gfx) = &mut self.state {
            gfx.resize(size);
        }
    }

    fn toggle_fullscreen(&self) {
        if let State::Ready(gfx) = &self.state {
            let window = gfx.window();
            let next = match window.fullscreen() {
                Some(_) => None,
                None => Some(Fullscreen::Borderless(None)),
            };
            window.set_fullscreen(next);
        }
    }

    fn key_pressed(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
            PhysicalKey::Code(KeyCode::KeyF) => self.toggle_fullscreen(),
            _ => {}
        }
    }
}

impl ApplicationHandler<Graphics> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let State::Init(pending) = &mut self.state else {
            return;
        };
        let Some((proxy, config)) = pending.take() else {
            return;
        };

        let win_attr = Window::default_attributes().with_title(config.window.title.clone());
        let window: RcWindow = match event_loop.create_window(win_attr) {
            Ok(window) => std::sync::Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        if let Err(err) = pollster::block_on(create_graphics(window, proxy, config)) {
            log::error!("setup failed: {err:#}");
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        graphics.request_redraw();
        self.render_target = Instant::now() + self.frame_time;
        self.state = State::Ready(graphics);
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {
        if self.render_target <= Instant::now() {
            self.render_target += self.frame_time;
            if let State::Ready(gfx) = &self.state {
                gfx.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::RedrawRequested => {
                self.draw();
                let now = Instant::now();
                if self.render_target <= now {
                    self.render_target = now + self.frame_time;
                    if let State::Ready(gfx) = &self.state {
                        gfx.request_redraw();
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.key_pressed(event_loop, &event),
            WindowEvent::CloseRequested => event_loop.exit(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.render_target));
    }
}
