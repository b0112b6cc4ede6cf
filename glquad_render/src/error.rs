use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::device::ShaderStage;

/// Everything that can go wrong while creating device resources.
///
/// The raw API would hand back object 0 and let you find out later. Here you find out now.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("failed to link shader program: {log}")]
    ProgramLink { log: String },
    #[error("device could not create a {resource}")]
    ResourceCreation { resource: &'static str },
    #[error("device ran out of memory uploading {size} bytes into a {resource}")]
    OutOfMemory { resource: &'static str, size: usize },
    #[error("failed to read shader source {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, RenderError>;
