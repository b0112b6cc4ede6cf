pub mod opengl;
pub mod utils;

pub use opengl::GlDevice;
