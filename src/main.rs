//! Trispin - spinning triangle demo
//!
//! Opens a window, draws one triangle, rotates it with the arrow keys, and
//! hot-reloads the shader pair when either source file changes on disk.

mod config;

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use trispin_render::{
    camera::Camera,
    context::RenderContext,
    pipeline::{TrianglePipeline, Uniforms},
    shader_watch::{ShaderSources, ShaderWatcher},
};
use trispin_input::KeyController;

use config::AppConfig;

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    pipeline: Option<TrianglePipeline>,
    /// The tracked shader source pair
    sources: ShaderSources,
    /// Modification-time watermarks for the source pair
    watcher: ShaderWatcher,
    camera: Camera,
    controller: KeyController,
    fatal_error: bool,
}

impl App {
    fn new() -> Self {
        // Load configuration
        let config = AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        });

        let camera = Camera::new(config.camera.fov, config.camera.far);

        let controller = KeyController::new()
            .with_rotate_step(config.input.rotate_step)
            .with_zoom_step(config.input.zoom_step);

        let sources = ShaderSources::new(
            config.shaders.vertex.clone(),
            config.shaders.fragment.clone(),
        );

        Self {
            config,
            window: None,
            render_context: None,
            pipeline: None,
            sources,
            // Epoch watermarks: the first frame's poll compiles the program
            watcher: ShaderWatcher::new(),
            camera,
            controller,
            fatal_error: false,
        }
    }

    /// Record a fatal windowing/context failure and stop the event loop
    fn fail(&mut self, event_loop: &ActiveEventLoop, message: String) {
        log::error!("{}", message);
        eprintln!("{}", message);
        self.fatal_error = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, format!("Failed to create window: {}", e));
                return;
            }
        };

        let render_context = match pollster::block_on(RenderContext::new(window.clone())) {
            Ok(ctx) => ctx,
            Err(e) => {
                self.fail(event_loop, e.to_string());
                return;
            }
        };

        let pipeline = TrianglePipeline::new(&render_context.device, render_context.config.format);

        window.request_redraw();

        self.window = Some(window);
        self.render_context = Some(render_context);
        self.pipeline = Some(pipeline);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(ctx) = &mut self.render_context {
                    ctx.resize(physical_size);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state == ElementState::Pressed && key == KeyCode::Escape {
                        event_loop.exit();
                        return;
                    }
                    self.controller.process_keyboard(key, event.state);
                }
            }

            WindowEvent::RedrawRequested => {
                // Apply one frame of held-key rotation/zoom
                self.controller.update(&mut self.camera);

                if let (Some(ctx), Some(pipeline)) = (&self.render_context, &mut self.pipeline) {
                    let uniforms = Uniforms {
                        rotation: self.camera.rotation_matrix(),
                        projection: self.camera.projection_matrix(ctx.aspect_ratio()),
                    };

                    // Swap in a fresh program if a shader source changed
                    pipeline.check_reload(&ctx.device, &mut self.watcher, &self.sources);

                    pipeline.update_uniforms(&ctx.queue, &uniforms);

                    let output = match ctx.surface.get_current_texture() {
                        Ok(output) => output,
                        Err(wgpu::SurfaceError::Lost) => {
                            if let Some(ctx) = &mut self.render_context {
                                let size = ctx.size;
                                ctx.resize(size);
                            }
                            if let Some(window) = &self.window {
                                window.request_redraw();
                            }
                            return;
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            self.fail(event_loop, "Surface out of memory".to_string());
                            return;
                        }
                        Err(e) => {
                            log::warn!("Surface error: {:?}", e);
                            return;
                        }
                    };

                    let view = output
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());

                    let mut encoder = ctx.device.create_command_encoder(
                        &wgpu::CommandEncoderDescriptor {
                            label: Some("Frame Encoder"),
                        },
                    );

                    let bg = &self.config.rendering.background_color;
                    pipeline.render(
                        &mut encoder,
                        &view,
                        wgpu::Color {
                            r: bg[0] as f64,
                            g: bg[1] as f64,
                            b: bg[2] as f64,
                            a: bg[3] as f64,
                        },
                    );

                    ctx.queue.submit(std::iter::once(encoder.finish()));
                    output.present();
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn main() {
    // Initialize logging
    env_logger::init();
    log::info!("Starting Trispin");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            eprintln!("Failed to create event loop: {}", e);
            std::process::exit(-1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {}", e);
        std::process::exit(-1);
    }

    if app.fatal_error {
        std::process::exit(-1);
    }
}
