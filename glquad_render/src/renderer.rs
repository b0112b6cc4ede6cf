use crate::buffer::IndexBuffer;
use crate::device::{Device, IndexType, Primitive};
use crate::device_call;
use crate::shader::Program;
use crate::vertex_array::VertexArray;

/// Clears the screen and draws indexed triangles.
///
/// Holds no state of its own. Anything might have been bound since the last draw, so every draw
/// binds everything it needs again.
pub struct Renderer<'a, D: Device> {
    device: &'a D,
}

impl<'a, D: Device> Renderer<'a, D> {
    pub fn new(device: &'a D) -> Self {
        Self { device }
    }

    pub fn set_clear_color(&self, rgba: [f32; 4]) {
        device_call!(self.device, clear_color(rgba));
    }

    pub fn clear(&self) {
        device_call!(self.device, clear_color_buffer());
    }

    /// Draws every index in `index_buffer` as triangles, reading vertices through `vertex_array`.
    pub fn draw(&self, vertex_array: &VertexArray<'_, D>, index_buffer: &IndexBuffer<'_, D>, program: &Program<'_, D>) {
        program.bind();
        vertex_array.bind();
        index_buffer.bind();
        device_call!(
            self.device,
            draw_elements(Primitive::Triangles, index_buffer.count(), IndexType::UnsignedInt, 0)
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::buffer::VertexBuffer;
    use crate::device::ElementKind;
    use crate::layout::VertexBufferLayout;
    use crate::recording::RecordingDevice;
    use crate::shader::ShaderProgramSource;

    #[test]
    fn clear_uses_the_configured_colour() {
        let device = RecordingDevice::new();
        let renderer = Renderer::new(&device);

        renderer.set_clear_color([0.1, 0.2, 0.3, 1.0]);
        renderer.clear();
        renderer.clear();

        assert_eq!(device.current_clear_color(), [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(device.clears(), 2);
    }

    #[test]
    fn draw_rebinds_after_someone_else_unbound_everything() {
        let device = RecordingDevice::new();
        let vertices = VertexBuffer::from_slice(&device, &[0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0]).unwrap();
        let indices = IndexBuffer::new(&device, &[0, 1, 2]).unwrap();
        let mut layout = VertexBufferLayout::new();
        layout.push(ElementKind::Float32, 2);
        let mut array = VertexArray::new(&device).unwrap();
        array.add_buffer(&vertices, &layout);
        let program = Program::new(&device, &ShaderProgramSource::default()).unwrap();

        array.unbind();
        indices.unbind();
        program.unbind();

        let renderer = Renderer::new(&device);
        renderer.draw(&array, &indices, &program);
        renderer.draw(&array, &indices, &program);

        let draws = device.draws();
        assert_eq!(draws.len(), 2);
        assert!(draws.iter().all(|draw| draw.count == 3 && draw.element_buffer == indices.id()));
        assert!(device.errors_raised().is_empty());
    }
}
