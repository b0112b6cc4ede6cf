//! A simple set of wrappers around an OpenGL-style graphics device.
//!
//! Drawing a quad takes about a dozen raw GL calls, all unsafe and all reading or writing some
//! piece of global "currently bound" state. This crate wraps those calls in a handful of types
//! that each own one device object and clean it up when dropped:
//!
//! * [`VertexBufferLayout`] says how one vertex record is laid out,
//! * [`VertexBuffer`] and [`IndexBuffer`] hold the vertex and index data,
//! * [`VertexArray`] ties a vertex buffer to attribute slots according to a layout,
//! * [`Program`] is a compiled and linked pair of shaders,
//! * [`Renderer`] clears the screen and issues the draw.
//!
//! None of them talk to GL directly. They go through the [`Device`] trait, which the application
//! implements on top of the real API, and which [`recording::RecordingDevice`] implements for
//! tests.
//!
//! Obviously, a knowledge of OpenGL is *necessary* to understand any of this. [Learn
//! OpenGL](learnopengl) is a classic set of tutorials on understanding and using it, and
//! [docs.gl](docsgl) has the reference pages for every call the device trait mirrors.
//!
//! [learnopengl]: https://learnopengl.com/
//! [docsgl]: http://docs.gl/

pub mod buffer;
pub mod debug;
pub mod device;
pub mod error;
pub mod layout;
pub mod recording;
pub mod renderer;
pub mod shader;
pub mod vertex_array;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use device::Device;
pub use error::{RenderError, Result};
pub use layout::{VertexBufferElement, VertexBufferLayout, VertexElementType};
pub use renderer::Renderer;
pub use shader::{Program, Shader, ShaderProgramSource};
pub use vertex_array::{AttributeBinding, VertexArray};
