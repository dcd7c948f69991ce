use crate::{
    camera::CameraController,
    config::Config,
    icons::ThreadedIconLoader,
    renderer::Renderer,
    source::ViewerEvent,
    ui,
};
use anyhow::Result;
use market_scene::{FrameScheduler, IconLoader, SceneLifecycle, TickOutcome, Viewport};
use std::sync::Arc;
use winit::{event::WindowEvent, window::Window};

/// Schedules scene frames as window redraws.
pub struct WindowScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&self) {
        self.window.request_redraw();
    }
}

pub type ViewerLifecycle = SceneLifecycle<Renderer, ThreadedIconLoader, WindowScheduler>;

pub struct App {
    pub lifecycle: ViewerLifecycle,
    pub camera_controller: CameraController,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    background: [f32; 3],
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let renderer = Renderer::new(window.clone()).await?;
        let size = renderer.gfx.size;
        let icons = ThreadedIconLoader::new()?;

        let settings = config.scene_settings();
        let background = settings.background;
        let lifecycle = SceneLifecycle::new(
            renderer,
            icons,
            WindowScheduler {
                window: window.clone(),
            },
            settings,
            config.layout_policy(),
            Viewport::new(size.width.max(1), size.height.max(1)),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            lifecycle,
            camera_controller: CameraController::new(),
            egui_ctx,
            egui_state,
            background,
        })
    }

    /// Enters `Loading`; the first snapshot arrives as a [`ViewerEvent`].
    pub fn start(&mut self) {
        self.lifecycle.start();
    }

    pub fn on_viewer_event(&mut self, window: &Window, event: ViewerEvent) {
        match event {
            ViewerEvent::Snapshot(result) => {
                if let Err(err) = self.lifecycle.on_fetch_result(result) {
                    log::error!("Could not build scene: {}", err);
                }
                window.request_redraw();
            }
        }
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.lifecycle.backend_mut().resize_surface(new_size);
            self.lifecycle
                .resize(Viewport::new(new_size.width, new_size.height));
        }
    }

    /// Returns `true` if the event was consumed by the UI.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.repaint {
            window.request_redraw();
        }
        if response.consumed {
            self.camera_controller.handle_consumed_event(event);
            return true;
        }

        if let Some(input) = self.camera_controller.handle_event(event) {
            if let Some(controls) = self.lifecycle.controls_mut() {
                input.apply(controls);
            }
        }

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    /// Disposes the live scene. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.lifecycle.teardown();
    }

    /// Reconfigures the surface after it was lost or outdated.
    pub fn recover_surface(&mut self) {
        self.lifecycle.backend_mut().gfx.reconfigure();
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let icons = self.lifecycle.poll_icons();
        if icons.attached + icons.failed > 0 {
            log::debug!(
                "Icons: {} attached, {} failed, {} stale",
                icons.attached,
                icons.failed,
                icons.stale
            );
        }

        self.lifecycle.backend_mut().begin_frame()?;

        if self.lifecycle.frame() == TickOutcome::Stopped {
            self.lifecycle.backend_mut().clear_frame(self.background);
        }

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);
        ui::draw_hud(
            &self.egui_ctx,
            self.lifecycle.state(),
            self.lifecycle.icons().pending(),
        );
        let egui_output = self.egui_ctx.end_frame();

        let pixels_per_point = self.egui_ctx.pixels_per_point();
        let shapes = self.egui_ctx.tessellate(egui_output.shapes, pixels_per_point);

        let renderer = self.lifecycle.backend_mut();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [renderer.gfx.config.width, renderer.gfx.config.height],
            pixels_per_point,
        };
        renderer.draw_ui(&shapes, &egui_output.textures_delta, &screen_descriptor);
        renderer.present();

        Ok(())
    }
}
