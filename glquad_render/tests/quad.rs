use render::device::{BufferTarget, ElementKind, IndexType, Primitive};
use render::recording::RecordingDevice;
use render::{IndexBuffer, Program, Renderer, ShaderProgramSource, VertexArray, VertexBuffer, VertexBufferLayout};

const SHADER: &str = "\
#shader vertex
#version 330 core

layout(location = 0) in vec4 position;

void main() {
    gl_Position = position;
}

#shader fragment
#version 330 core

layout(location = 0) out vec4 color;

uniform vec4 u_Color;

void main() {
    color = u_Color;
}
";

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

#[test]
fn unit_quad_is_drawn_with_one_indexed_call() {
    let device = RecordingDevice::new();

    let vertices = VertexBuffer::from_slice(&device, &POSITIONS).unwrap();
    let mut layout = VertexBufferLayout::new();
    layout.push(ElementKind::Float32, 2);

    let mut array = VertexArray::new(&device).unwrap();
    array.add_buffer(&vertices, &layout);

    let indices = IndexBuffer::new(&device, &INDICES).unwrap();
    let program = Program::new(&device, &ShaderProgramSource::parse(SHADER)).unwrap();
    program.set_uniform_4f("u_Color", [0.8, 0.3, 0.8, 1.0]);

    let renderer = Renderer::new(&device);
    renderer.clear();
    renderer.draw(&array, &indices, &program);

    let draws = device.draws();
    assert_eq!(draws.len(), 1);

    let draw = draws[0];
    assert_eq!(draw.primitive, Primitive::Triangles);
    assert_eq!(draw.count, 6);
    assert_eq!(draw.index_type, IndexType::UnsignedInt);
    assert_eq!(draw.offset, 0);
    assert_eq!(draw.program, program.id());
    assert_eq!(draw.vertex_array, array.id());
    assert_eq!(draw.element_buffer, indices.id());

    let position = device.attribute(array.id(), 0).unwrap();
    assert_eq!(position.buffer, Some(vertices.id()));
    assert_eq!(position.pointer.unwrap().stride, 8);

    assert_eq!(device.uniform(program.id(), "u_Color"), Some([0.8, 0.3, 0.8, 1.0]));
    assert!(device.errors_raised().is_empty());
}

#[test]
fn interleaved_layout_offsets() {
    let device = RecordingDevice::new();

    // position, texture coordinates, RGBA colour
    let record = [0u8; 20];
    let vertices = VertexBuffer::new(&device, &[record, record, record, record].concat()).unwrap();

    let mut layout = VertexBufferLayout::new();
    layout.push_type::<f32>(2).push_type::<f32>(2).push_type::<u8>(4);
    assert_eq!(layout.stride(), 20);

    let mut array = VertexArray::new(&device).unwrap();
    array.add_buffer(&vertices, &layout);

    let offsets: Vec<_> = (0..3)
        .map(|slot| device.attribute(array.id(), slot).unwrap().pointer.unwrap().offset)
        .collect();
    assert_eq!(offsets, vec![0, 8, 16]);
    assert_eq!(vertices.size(), 80);
}

#[test]
fn everything_is_released_exactly_once() {
    let device = RecordingDevice::new();

    {
        let vertices = VertexBuffer::from_slice(&device, &POSITIONS).unwrap();
        let indices = IndexBuffer::new(&device, &INDICES).unwrap();
        let mut layout = VertexBufferLayout::new();
        layout.push(ElementKind::Float32, 2);
        let mut array = VertexArray::new(&device).unwrap();
        array.add_buffer(&vertices, &layout);
        let program = Program::new(&device, &ShaderProgramSource::parse(SHADER)).unwrap();

        Renderer::new(&device).draw(&array, &indices, &program);
    }

    // Also fine if nothing was ever bound
    {
        let _vertices = VertexBuffer::new(&device, &[0; 4]).unwrap();
        let _array = VertexArray::new(&device).unwrap();
    }

    let mut buffers = device.deleted_buffers();
    buffers.sort_by_key(|id| id.0);
    buffers.dedup();
    assert_eq!(buffers.len(), device.deleted_buffers().len());
    assert_eq!(buffers.len(), 3);
    assert_eq!(device.deleted_vertex_arrays().len(), 2);
    assert_eq!(device.deleted_programs().len(), 1);

    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_vertex_arrays(), 0);
    assert_eq!(device.live_programs(), 0);
    assert_eq!(device.live_shaders(), 0);
}

#[test]
fn the_last_bound_buffer_wins() {
    let device = RecordingDevice::new();
    let a = VertexBuffer::new(&device, &[0; 8]).unwrap();
    let b = VertexBuffer::new(&device, &[0; 8]).unwrap();

    let mut layout = VertexBufferLayout::new();
    layout.push(ElementKind::Float32, 2);
    let mut array = VertexArray::new(&device).unwrap();

    b.bind();
    a.bind();
    assert_eq!(device.bound_buffer(BufferTarget::Array), Some(a.id()));

    array.add_buffer(&b, &layout);
    assert_eq!(device.attribute(array.id(), 0).unwrap().buffer, Some(b.id()));
}

#[test]
fn attribute_setup_without_a_vertex_array_is_flagged_by_the_device() {
    use render::device::{AttribPointer, Device, ErrorCode};

    let device = RecordingDevice::new();
    let buffer = VertexBuffer::new(&device, &[0; 8]).unwrap();
    buffer.bind();

    // Skipping the wrappers: nothing is bound to describe
    device.vertex_attrib_pointer(0, &AttribPointer {
        components: 2,
        kind: ElementKind::Float32,
        normalized: false,
        stride: 8,
        offset: 0,
    });

    assert_eq!(device.get_error(), Some(ErrorCode::InvalidOperation));
}
