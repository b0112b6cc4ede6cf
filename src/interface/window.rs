use std::time::Instant;

use glutin::dpi::LogicalSize;
use glutin::event::{Event, WindowEvent};
use glutin::event_loop::{ControlFlow, EventLoop};
use glutin::window::WindowBuilder;
use glutin::{Api, ContextBuilder, GlProfile, GlRequest};
use log::{debug, error, info};
use thiserror::Error;

use render::device::ElementKind;
use render::{IndexBuffer, Program, Renderer, ShaderProgramSource, VertexArray, VertexBuffer, VertexBufferLayout};

use crate::graphics::GlDevice;
use crate::interface::cli::Config;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to create window: {0}")]
    Window(#[from] glutin::CreationError),
    #[error("failed to make the GL context current: {0}")]
    Context(#[from] glutin::ContextError),
    #[error(transparent)]
    Render(#[from] render::RenderError),
}

const POSITIONS: [f32; 8] = [
    -0.5, -0.5, // 0
     0.5, -0.5, // 1
     0.5,  0.5, // 2
    -0.5,  0.5, // 3
];

const INDICES: [u32; 6] = [
    0, 1, 2,
    2, 3, 0
];

/// Everything that gets drawn each frame.
struct Quad {
    program: Program<'static, GlDevice>,
    array: VertexArray<'static, GlDevice>,
    indices: IndexBuffer<'static, GlDevice>,
    // Read through `array`, so it must stay alive as long as the array does
    _vertices: VertexBuffer<'static, GlDevice>,
    renderer: Renderer<'static, GlDevice>,
}

impl Quad {
    fn new(device: &'static GlDevice, source: &ShaderProgramSource) -> Result<Self, AppError> {
        let vertices = VertexBuffer::from_slice(device, &POSITIONS)?;

        let mut layout = VertexBufferLayout::new();
        layout.push(ElementKind::Float32, 2);

        let mut array = VertexArray::new(device)?;
        array.add_buffer(&vertices, &layout);

        let indices = IndexBuffer::new(device, &INDICES)?;
        let program = Program::new(device, source)?;

        // Nothing should depend on what happened to be bound during setup
        array.unbind();
        vertices.unbind();
        indices.unbind();
        program.unbind();

        let renderer = Renderer::new(device);
        renderer.set_clear_color([0.1, 0.1, 0.1, 1.0]);

        Ok(Self {
            program,
            array,
            indices,
            _vertices: vertices,
            renderer,
        })
    }

    fn draw(&self, seconds: f32) {
        // Pulse the red channel so there's something to look at
        let red = 0.5 + 0.5 * seconds.sin();

        self.renderer.clear();
        self.program.set_uniform_4f("u_Color", [red, 0.3, 0.8, 1.0]);
        self.renderer.draw(&self.array, &self.indices, &self.program);
    }
}

/// Opens the window and draws the quad until it's closed.
///
/// Only returns if setup fails; once the event loop starts, the process ends when the loop does.
pub fn run(config: Config) -> Result<(), AppError> {
    let source = ShaderProgramSource::load(&config.shader)?;

    let events = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64));
    let win_context = ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (3, 3)))
        .with_gl_profile(GlProfile::Core)
        .with_vsync(config.vsync)
        .build_windowed(window, &events)?;

    let win_context = unsafe { win_context.make_current().map_err(|(_, e)| e)? };

    let device = GlDevice::load_with(|s| win_context.get_proc_address(s) as *const _);
    let size = win_context.window().inner_size();
    device.viewport(0, 0, size.width as i32, size.height as i32);

    let mut quad = Some(Quad::new(device, &source)?);
    info!("Drawing {} with {}", config.title, config.shader.display());

    let start = Instant::now();
    events.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(physical_size) => {
                    debug!("Resized to {}x{}", physical_size.width, physical_size.height);
                    win_context.resize(physical_size);
                    device.viewport(0, 0, physical_size.width as i32, physical_size.height as i32);
                }
                WindowEvent::CloseRequested => {
                    // Release the GL objects while the context is still around
                    drop(quad.take());
                    *control_flow = ControlFlow::Exit;
                }
                _ => {}
            },
            Event::MainEventsCleared => win_context.window().request_redraw(),
            Event::RedrawRequested(_) => {
                if let Some(quad) = &quad {
                    quad.draw(start.elapsed().as_secs_f32());
                    if let Err(e) = win_context.swap_buffers() {
                        error!("Failed to swap buffers: {}", e);
                        *control_flow = ControlFlow::Exit;
                    }
                }
            }
            _ => {}
        }
    })
}
