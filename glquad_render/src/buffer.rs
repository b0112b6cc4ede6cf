//! Vertex and index buffers.
//!
//! Both are uploaded once with [`BufferUsage::StaticDraw`] and never touched again; if you need
//! different data, make a new buffer. Each owns exactly one device buffer and deletes it on drop.

use bytemuck::Pod;
use log::{debug, error, trace};

use crate::device::{BufferId, BufferTarget, BufferUsage, Device, ErrorCode};
use crate::device_call;
use crate::error::{RenderError, Result};

/// Represents a [vertex buffer object (VBO)](vbo): raw vertex records sitting in device memory.
/// Vertices don't have to be spatial; they can carry colours, normals, texture coordinates, or
/// anything else the shader wants, as described by a [`crate::VertexBufferLayout`].
///
/// [vbo]: https://en.wikipedia.org/wiki/Vertex_buffer_object
pub struct VertexBuffer<'a, D: Device> {
    device: &'a D,
    id: BufferId,
    size: usize,
}

impl<'a, D: Device> VertexBuffer<'a, D> {
    /// Allocates a device buffer and uploads `data` into it.
    pub fn new(device: &'a D, data: &[u8]) -> Result<Self> {
        let id = device_call!(device, create_buffer())
            .ok_or(RenderError::ResourceCreation { resource: "vertex buffer" })?;

        // From here on the buffer is released by `Drop`, whatever happens
        let buffer = Self { device, id, size: data.len() };
        buffer.bind();
        upload(device, BufferTarget::Array, data, "vertex buffer")?;

        debug!("Created vertex buffer {} ({} bytes)", id.0, data.len());
        Ok(buffer)
    }

    /// Like [`VertexBuffer::new`], for any slice of plain old data (`[f32]`, `#[repr(C)]`
    /// vertex structs, ...).
    pub fn from_slice<T: Pod>(device: &'a D, data: &[T]) -> Result<Self> {
        Self::new(device, bytemuck::cast_slice(data))
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The number of bytes uploaded.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn bind(&self) {
        trace!("Binding vertex buffer {}", self.id.0);
        device_call!(self.device, bind_buffer(BufferTarget::Array, Some(self.id)));
    }

    pub fn unbind(&self) {
        device_call!(self.device, bind_buffer(BufferTarget::Array, None));
    }
}

impl<'a, D: Device> Drop for VertexBuffer<'a, D> {
    fn drop(&mut self) {
        debug!("Deleting vertex buffer {}", self.id.0);
        device_call!(self.device, delete_buffer(self.id));
    }
}

/// Represents an element buffer object (EBO): a list of vertex indices. This allows you to reuse
/// vertex data. This way, to draw a rectangle (which is two triangles that share a common side),
/// you don't need to send data for the shared vertices twice.
pub struct IndexBuffer<'a, D: Device> {
    device: &'a D,
    id: BufferId,
    count: usize,
}

impl<'a, D: Device> IndexBuffer<'a, D> {
    pub fn new(device: &'a D, indices: &[u32]) -> Result<Self> {
        let id = device_call!(device, create_buffer())
            .ok_or(RenderError::ResourceCreation { resource: "index buffer" })?;

        let buffer = Self { device, id, count: indices.len() };
        buffer.bind();
        upload(device, BufferTarget::ElementArray, bytemuck::cast_slice(indices), "index buffer")?;

        debug!("Created index buffer {} ({} indices)", id.0, indices.len());
        Ok(buffer)
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The number of indices, which is what a draw call wants, not the byte size.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bind(&self) {
        trace!("Binding index buffer {}", self.id.0);
        device_call!(self.device, bind_buffer(BufferTarget::ElementArray, Some(self.id)));
    }

    pub fn unbind(&self) {
        device_call!(self.device, bind_buffer(BufferTarget::ElementArray, None));
    }
}

impl<'a, D: Device> Drop for IndexBuffer<'a, D> {
    fn drop(&mut self) {
        debug!("Deleting index buffer {}", self.id.0);
        device_call!(self.device, delete_buffer(self.id));
    }
}

/// Fills whatever is bound to `target`.
fn upload<D: Device>(device: &D, target: BufferTarget, data: &[u8], resource: &'static str) -> Result<()> {
    device_call!(device, buffer_data(target, data, BufferUsage::StaticDraw)).map_err(|code| {
        error!("Uploading {} bytes into a {} failed: {}", data.len(), resource, code);
        match code {
            ErrorCode::OutOfMemory => RenderError::OutOfMemory { resource, size: data.len() },
            _ => RenderError::ResourceCreation { resource },
        }
    })
}
