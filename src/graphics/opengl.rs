//! The real device: every [`Device`] method is one or two raw `gl` calls.
//!
//! The `gl` crate keeps its function pointers in globals, so there is nothing to put in the
//! device itself. [`GlDevice::load_with`] fills those pointers in and hands back the one device
//! the program gets; it lives for the rest of the process, like the context it stands for.

use std::ffi::{c_void, CString};
use std::ptr::null;

use gl;
use gl::types::*;
use log::info;

use render::device::*;

use super::utils::{gl_string, read_info_log};

pub struct GlDevice {
    _private: (),
}

static DEVICE: GlDevice = GlDevice { _private: () };

impl GlDevice {
    /// Loads the GL function pointers with `loader`. The context they belong to has to be
    /// current on this thread, and has to stay that way for as long as the device is used.
    pub fn load_with<F>(loader: F) -> &'static GlDevice
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        info!("OpenGL {}", gl_string(gl::VERSION));
        info!("Renderer: {}", gl_string(gl::RENDERER));

        &DEVICE
    }

    pub fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) };
    }
}

fn buffer_target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::StaticDraw => gl::STATIC_DRAW,
        BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
        BufferUsage::StreamDraw => gl::STREAM_DRAW,
    }
}

fn element_kind(kind: ElementKind) -> GLenum {
    match kind {
        ElementKind::Float32 => gl::FLOAT,
        ElementKind::Int32 => gl::INT,
        ElementKind::UnsignedInt32 => gl::UNSIGNED_INT,
        ElementKind::UnsignedShort => gl::UNSIGNED_SHORT,
        ElementKind::UnsignedByte => gl::UNSIGNED_BYTE,
    }
}

fn primitive(primitive: Primitive) -> GLenum {
    match primitive {
        Primitive::Points => gl::POINTS,
        Primitive::Lines => gl::LINES,
        Primitive::LineStrip => gl::LINE_STRIP,
        Primitive::Triangles => gl::TRIANGLES,
        Primitive::TriangleStrip => gl::TRIANGLE_STRIP,
    }
}

fn index_type(index_type: IndexType) -> GLenum {
    match index_type {
        IndexType::UnsignedByte => gl::UNSIGNED_BYTE,
        IndexType::UnsignedShort => gl::UNSIGNED_SHORT,
        IndexType::UnsignedInt => gl::UNSIGNED_INT,
    }
}

fn shader_kind(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

fn error_code(code: GLenum) -> ErrorCode {
    match code {
        gl::INVALID_ENUM => ErrorCode::InvalidEnum,
        gl::INVALID_VALUE => ErrorCode::InvalidValue,
        gl::INVALID_OPERATION => ErrorCode::InvalidOperation,
        gl::OUT_OF_MEMORY => ErrorCode::OutOfMemory,
        gl::INVALID_FRAMEBUFFER_OPERATION => ErrorCode::InvalidFramebufferOperation,
        other => ErrorCode::Other(other),
    }
}

/// `None` for GL's "no object" name.
fn name(id: GLuint) -> Option<GLuint> {
    if id == 0 {
        None
    } else {
        Some(id)
    }
}

fn shader_info_log(id: GLuint) -> String {
    let mut len = 0;
    unsafe { gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len) };
    read_info_log(len, |size, written, buf| unsafe { gl::GetShaderInfoLog(id, size, written, buf) })
}

fn program_info_log(id: GLuint) -> String {
    let mut len = 0;
    unsafe { gl::GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut len) };
    read_info_log(len, |size, written, buf| unsafe { gl::GetProgramInfoLog(id, size, written, buf) })
}

impl Device for GlDevice {
    fn create_buffer(&self) -> Option<BufferId> {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, &mut id) };
        name(id).map(BufferId)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { gl::DeleteBuffers(1, &buffer.0) };
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe { gl::BindBuffer(buffer_target(target), buffer.map_or(0, |b| b.0)) };
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<(), ErrorCode> {
        unsafe {
            gl::BufferData(
                buffer_target(target),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                buffer_usage(usage),
            );
        }

        match unsafe { gl::GetError() } {
            gl::NO_ERROR => Ok(()),
            code => Err(error_code(code)),
        }
    }

    fn create_vertex_array(&self) -> Option<VertexArrayId> {
        let mut id = 0;
        unsafe { gl::GenVertexArrays(1, &mut id) };
        name(id).map(VertexArrayId)
    }

    fn delete_vertex_array(&self, array: VertexArrayId) {
        unsafe { gl::DeleteVertexArrays(1, &array.0) };
    }

    fn bind_vertex_array(&self, array: Option<VertexArrayId>) {
        unsafe { gl::BindVertexArray(array.map_or(0, |a| a.0)) };
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        unsafe { gl::EnableVertexAttribArray(slot) };
    }

    fn vertex_attrib_pointer(&self, slot: u32, pointer: &AttribPointer) {
        unsafe {
            gl::VertexAttribPointer(
                slot,
                pointer.components as GLint,
                element_kind(pointer.kind),
                if pointer.normalized { gl::TRUE } else { gl::FALSE },
                pointer.stride as GLsizei,
                // The "pointer" is a byte offset into the bound array buffer
                pointer.offset as *const c_void,
            );
        }
    }

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        let source = CString::new(source).map_err(|e| format!("shader source contains a NUL byte: {}", e))?;

        let id = unsafe { gl::CreateShader(shader_kind(stage)) };
        if id == 0 {
            return Err(String::from("glCreateShader returned 0"));
        }

        unsafe {
            gl::ShaderSource(id, 1, &source.as_ptr(), null());
            gl::CompileShader(id);
        }

        let mut success = 1;
        unsafe { gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut success) };

        if success == 0 {
            let log = shader_info_log(id);
            unsafe { gl::DeleteShader(id) };
            return Err(log);
        }

        Ok(ShaderId(id))
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { gl::DeleteShader(shader.0) };
    }

    fn create_program(&self) -> Option<ProgramId> {
        name(unsafe { gl::CreateProgram() }).map(ProgramId)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { gl::AttachShader(program.0, shader.0) };
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { gl::DetachShader(program.0, shader.0) };
    }

    fn link_program(&self, program: ProgramId) -> Result<(), String> {
        let mut success = 1;
        unsafe {
            gl::LinkProgram(program.0);
            gl::GetProgramiv(program.0, gl::LINK_STATUS, &mut success);
        }

        if success == 0 {
            return Err(program_info_log(program.0));
        }
        Ok(())
    }

    fn validate_program(&self, program: ProgramId) -> Result<(), String> {
        let mut success = 1;
        unsafe {
            gl::ValidateProgram(program.0);
            gl::GetProgramiv(program.0, gl::VALIDATE_STATUS, &mut success);
        }

        if success == 0 {
            return Err(program_info_log(program.0));
        }
        Ok(())
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { gl::DeleteProgram(program.0) };
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { gl::UseProgram(program.map_or(0, |p| p.0)) };
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let name = CString::new(name).ok()?;
        match unsafe { gl::GetUniformLocation(program.0, name.as_ptr()) } {
            -1 => None,
            location => Some(UniformLocation(location)),
        }
    }

    fn uniform_4f(&self, location: UniformLocation, value: [f32; 4]) {
        let [r, g, b, a] = value;
        unsafe { gl::Uniform4f(location.0, r, g, b, a) };
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        let [r, g, b, a] = rgba;
        unsafe { gl::ClearColor(r, g, b, a) };
    }

    fn clear_color_buffer(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) };
    }

    fn draw_elements(&self, primitive_kind: Primitive, count: usize, kind: IndexType, offset: usize) {
        unsafe {
            gl::DrawElements(
                primitive(primitive_kind),
                count as GLsizei,
                index_type(kind),
                offset as *const c_void,
            );
        }
    }

    fn get_error(&self) -> Option<ErrorCode> {
        match unsafe { gl::GetError() } {
            gl::NO_ERROR => None,
            code => Some(error_code(code)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_is_no_object() {
        assert_eq!(name(0), None);
        assert_eq!(name(7), Some(7));
    }

    #[test]
    fn error_codes_map_to_their_enums() {
        assert_eq!(error_code(gl::INVALID_OPERATION), ErrorCode::InvalidOperation);
        assert_eq!(error_code(gl::OUT_OF_MEMORY), ErrorCode::OutOfMemory);
        assert_eq!(error_code(0x9999), ErrorCode::Other(0x9999));
    }

    #[test]
    fn enums_map_to_gl_constants() {
        assert_eq!(buffer_target(BufferTarget::ElementArray), gl::ELEMENT_ARRAY_BUFFER);
        assert_eq!(buffer_usage(BufferUsage::StaticDraw), gl::STATIC_DRAW);
        assert_eq!(element_kind(ElementKind::UnsignedByte), gl::UNSIGNED_BYTE);
        assert_eq!(primitive(Primitive::Triangles), gl::TRIANGLES);
        assert_eq!(index_type(IndexType::UnsignedInt), gl::UNSIGNED_INT);
        assert_eq!(shader_kind(ShaderStage::Fragment), gl::FRAGMENT_SHADER);
    }
}
