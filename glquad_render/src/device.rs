//! The graphics device seen by the wrappers.
//!
//! OpenGL is one big bag of global state: "the" array buffer, "the" vertex array, "the" program.
//! The [`Device`] trait is exactly the slice of that API the wrappers in this crate need, with the
//! raw `GLuint`s and `GLenum`s swapped for small typed handles and enums. The real implementation
//! lives in the binary and calls straight into the `gl` crate; [`crate::recording`] offers a fake
//! one that just remembers what it was asked to do.
//!
//! Every method takes `&self`. The context *is* the mutable state, and nothing here can stop some
//! other bit of code from binding something else in between two of your calls, so don't assume a
//! binding survives anything you didn't write yourself.

use core::fmt;

/// Handle to a device buffer (a VBO or EBO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Handle to a device vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

/// Handle to one compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Location of a uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// The buffer binding slots. Vertex data goes in `Array`, indices go in `ElementArray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// How often the contents of a buffer are expected to change after upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

/// The scalar type of a single vertex attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Float32,
    Int32,
    UnsignedInt32,
    UnsignedShort,
    UnsignedByte,
}

impl ElementKind {
    /// Size in bytes of one component of this kind.
    pub fn size(self) -> usize {
        match self {
            ElementKind::Float32 | ElementKind::Int32 | ElementKind::UnsignedInt32 => 4,
            ElementKind::UnsignedShort => 2,
            ElementKind::UnsignedByte => 1,
        }
    }

    /// Whether attributes of this kind are normalized when no one says otherwise. Colour bytes are
    /// almost always meant as `0.0..=1.0`, everything else is read as-is.
    pub fn normalized_by_default(self) -> bool {
        self == ElementKind::UnsignedByte
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

/// Type of the indices stored in the bound element buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// An error flag popped off the device's error queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    OutOfMemory,
    InvalidFramebufferOperation,
    Other(u32),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidEnum => write!(f, "GL_INVALID_ENUM"),
            ErrorCode::InvalidValue => write!(f, "GL_INVALID_VALUE"),
            ErrorCode::InvalidOperation => write!(f, "GL_INVALID_OPERATION"),
            ErrorCode::OutOfMemory => write!(f, "GL_OUT_OF_MEMORY"),
            ErrorCode::InvalidFramebufferOperation => write!(f, "GL_INVALID_FRAMEBUFFER_OPERATION"),
            ErrorCode::Other(code) => write!(f, "unknown error 0x{:04X}", code),
        }
    }
}

/// Everything [`crate::VertexArray::add_buffer`] passes to one attribute-pointer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribPointer {
    pub components: u32,
    pub kind: ElementKind,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

/// The graphics API, as far as this crate is concerned.
///
/// Creation calls return `None` when the device hands back its "no object" value (0 in GL).
/// Compile and link report failure with the info log the device produced.
pub trait Device {
    fn create_buffer(&self) -> Option<BufferId>;
    fn delete_buffer(&self, buffer: BufferId);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);

    /// Uploads `data` into whatever buffer is bound to `target`. Fails only when the device could
    /// not find room for it.
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<(), ErrorCode>;

    fn create_vertex_array(&self) -> Option<VertexArrayId>;
    fn delete_vertex_array(&self, array: VertexArrayId);
    fn bind_vertex_array(&self, array: Option<VertexArrayId>);
    fn enable_vertex_attrib_array(&self, slot: u32);

    /// Describes attribute `slot` of the bound vertex array as a view into the bound array buffer.
    fn vertex_attrib_pointer(&self, slot: u32, pointer: &AttribPointer);

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<ShaderId, String>;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> Option<ProgramId>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId) -> Result<(), String>;
    fn validate_program(&self, program: ProgramId) -> Result<(), String>;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn uniform_4f(&self, location: UniformLocation, value: [f32; 4]);

    fn clear_color(&self, rgba: [f32; 4]);
    fn clear_color_buffer(&self);

    /// Draws `count` indices out of the bound element buffer, starting `offset` bytes in.
    fn draw_elements(&self, primitive: Primitive, count: usize, index_type: IndexType, offset: usize);

    /// Pops one flag off the error queue, or `None` once it's empty.
    fn get_error(&self) -> Option<ErrorCode>;
}
