//! Entry point for the market viewer.

use anyhow::Result;
use clap::Parser;
use market_viewer::{
    app::App,
    config::Config,
    source::{spawn_source, JsonFileSource, ViewerEvent},
};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = Config::parse();
    log::info!("Starting market viewer: {:?}", config);

    // Snapshots from the source thread arrive as user events.
    let event_loop = EventLoopBuilder::<ViewerEvent>::with_user_event().build()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Market Spheres")
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );

    // Initialise the application (async → sync).
    let mut app = pollster::block_on(App::new(window.clone(), &config))?;
    app.start();

    let proxy = event_loop.create_proxy();
    let _source = spawn_source(
        JsonFileSource::new(&config.data_path),
        config.refresh_interval(),
        move |event| proxy.send_event(event).is_ok(),
    );

    window.request_redraw();

    event_loop.run(move |event, elwt| {
        // Frames are requested by the scene's render loop, not polled.
        elwt.set_control_flow(ControlFlow::Wait);

        match event {
            Event::UserEvent(event) => app.on_viewer_event(&window, event),
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                if !app.handle_event(&window, &event) {
                    match event {
                        WindowEvent::CloseRequested => {
                            app.teardown();
                            elwt.exit();
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                                app.teardown();
                                elwt.exit();
                            }
                        }
                        WindowEvent::RedrawRequested => match app.render(&window) {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                log::warn!("Surface lost; reconfiguring");
                                app.recover_surface();
                                window.request_redraw();
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("WGPU out of memory – exiting.");
                                app.teardown();
                                elwt.exit();
                            }
                            Err(e) => {
                                log::warn!("Frame skipped: {:?}", e);
                                window.request_redraw();
                            }
                        },
                        _ => {}
                    }
                }
            }
            Event::LoopExiting => app.teardown(),
            _ => {}
        }
    })?;

    Ok(())
}
