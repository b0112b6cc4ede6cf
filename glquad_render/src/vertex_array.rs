use log::{debug, trace};

use crate::buffer::VertexBuffer;
use crate::device::{AttribPointer, BufferId, Device, VertexArrayId};
use crate::device_call;
use crate::error::{RenderError, Result};
use crate::layout::{VertexBufferElement, VertexBufferLayout};

/// One attribute slot as [`VertexArray::add_buffer`] configured it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub slot: u32,
    pub buffer: BufferId,
    pub element: VertexBufferElement,
    pub stride: usize,
    pub offset: usize,
}

/// Represents a vertex array object (VAO), the device-side table that says which buffer each
/// attribute slot reads from and how.
///
/// The array doesn't own the buffers it reads from, it only remembers their ids. Keep every buffer
/// you've added alive for as long as you draw with the array.
pub struct VertexArray<'a, D: Device> {
    device: &'a D,
    id: VertexArrayId,
    bindings: Vec<AttributeBinding>,
    buffers: Vec<BufferId>,
}

impl<'a, D: Device> VertexArray<'a, D> {
    pub fn new(device: &'a D) -> Result<Self> {
        let id = device_call!(device, create_vertex_array())
            .ok_or(RenderError::ResourceCreation { resource: "vertex array" })?;

        debug!("Created vertex array {}", id.0);
        Ok(Self {
            device,
            id,
            bindings: Vec::new(),
            buffers: Vec::new(),
        })
    }

    pub fn id(&self) -> VertexArrayId {
        self.id
    }

    /// Points one attribute slot per element of `layout` into `buffer`.
    ///
    /// Slots are handed out in layout order, continuing after any slots earlier buffers took.
    /// Element `i` starts at the combined size of elements `0..i`, since the attributes are
    /// interleaved inside each record.
    pub fn add_buffer(&mut self, buffer: &VertexBuffer<'_, D>, layout: &VertexBufferLayout) {
        self.bind();
        buffer.bind();

        let stride = layout.stride();
        let mut slot = self.bindings.len() as u32;
        let mut offset = 0;

        for element in layout.elements() {
            device_call!(self.device, enable_vertex_attrib_array(slot));
            device_call!(
                self.device,
                vertex_attrib_pointer(
                    slot,
                    &AttribPointer {
                        components: element.count,
                        kind: element.kind,
                        normalized: element.normalized,
                        stride,
                        offset,
                    }
                )
            );

            trace!("Vertex array {} slot {} reads {:?} at offset {} of buffer {}", self.id.0, slot, element, offset, buffer.id().0);
            self.bindings.push(AttributeBinding {
                slot,
                buffer: buffer.id(),
                element: *element,
                stride,
                offset,
            });

            offset += element.size();
            slot += 1;
        }

        self.buffers.push(buffer.id());
    }

    /// Every slot configured so far, lowest first.
    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    /// The vertex buffers added so far, in the order they were added.
    pub fn buffers(&self) -> &[BufferId] {
        &self.buffers
    }

    pub fn bind(&self) {
        trace!("Binding vertex array {}", self.id.0);
        device_call!(self.device, bind_vertex_array(Some(self.id)));
    }

    pub fn unbind(&self) {
        device_call!(self.device, bind_vertex_array(None));
    }
}

impl<'a, D: Device> Drop for VertexArray<'a, D> {
    fn drop(&mut self) {
        debug!("Deleting vertex array {}", self.id.0);
        device_call!(self.device, delete_vertex_array(self.id));
    }
}
