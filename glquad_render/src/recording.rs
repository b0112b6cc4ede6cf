//! A fake device that keeps a ledger instead of talking to a GPU.
//!
//! [`RecordingDevice`] follows the GL 3.3 core rules closely enough to catch the mistakes the
//! wrappers are meant to prevent: attribute calls with no vertex array bound, uploads with no
//! buffer bound, draws with no program, names used after deletion. Each of those raises an
//! [`ErrorCode`] on the error queue, same as the real thing, instead of doing anything.
//!
//! Element array bindings belong to the bound vertex array (or to the default one when none is
//! bound), just like in GL, so a draw only sees the index buffer its vertex array remembers.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::device::*;

/// What one attribute slot of a vertex array was told to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeState {
    pub enabled: bool,
    /// The array buffer that was bound when the pointer was set.
    pub buffer: Option<BufferId>,
    pub pointer: Option<AttribPointer>,
}

/// One draw the device actually performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub primitive: Primitive,
    pub count: usize,
    pub index_type: IndexType,
    pub offset: usize,
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub element_buffer: BufferId,
}

#[derive(Debug, Default)]
struct VertexArrayState {
    attributes: HashMap<u32, AttributeState>,
    element_buffer: Option<BufferId>,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<ShaderId>,
    linked: bool,
    uniforms: Vec<String>,
    values: HashMap<i32, [f32; 4]>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,

    buffers: HashMap<BufferId, Option<(Vec<u8>, BufferUsage)>>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    shaders: HashMap<ShaderId, (ShaderStage, String)>,
    programs: HashMap<ProgramId, ProgramState>,

    array_buffer: Option<BufferId>,
    default_element_buffer: Option<BufferId>,
    vertex_array: Option<VertexArrayId>,
    program: Option<ProgramId>,

    clear_color: [f32; 4],
    clears: usize,
    draws: Vec<DrawCommand>,

    pending: VecDeque<ErrorCode>,
    raised: Vec<ErrorCode>,

    deleted_buffers: Vec<BufferId>,
    deleted_vertex_arrays: Vec<VertexArrayId>,
    deleted_shaders: Vec<ShaderId>,
    deleted_programs: Vec<ProgramId>,

    refuse_creation: bool,
    out_of_memory: bool,
    compile_failures: HashMap<ShaderStage, String>,
    link_failure: Option<String>,
}

impl State {
    fn name(&mut self) -> Option<u32> {
        if self.refuse_creation {
            return None;
        }
        self.next_name += 1;
        Some(self.next_name)
    }

    fn raise(&mut self, code: ErrorCode) {
        self.raised.push(code);
        self.pending.push_back(code);
    }

    fn element_buffer(&self) -> Option<BufferId> {
        match self.vertex_array {
            Some(array) => self.vertex_arrays.get(&array).and_then(|state| state.element_buffer),
            None => self.default_element_buffer,
        }
    }

    fn set_element_buffer(&mut self, buffer: Option<BufferId>) {
        match self.vertex_array {
            Some(array) => {
                if let Some(state) = self.vertex_arrays.get_mut(&array) {
                    state.element_buffer = buffer;
                }
            }
            None => self.default_element_buffer = buffer,
        }
    }

    fn bound(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.element_buffer(),
        }
    }

    fn attribute(&mut self, slot: u32) -> Option<&mut AttributeState> {
        let array = self.vertex_array?;
        let state = self.vertex_arrays.get_mut(&array)?;
        Some(state.attributes.entry(slot).or_insert(AttributeState {
            enabled: false,
            buffer: None,
            pointer: None,
        }))
    }
}

/// A [`Device`] that records everything and renders nothing.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: RefCell<State>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `code` as if some earlier call had raised it.
    pub fn push_error(&self, code: ErrorCode) {
        self.state.borrow_mut().raise(code);
    }

    /// Every error raised so far, including ones that have since been drained.
    pub fn errors_raised(&self) -> Vec<ErrorCode> {
        self.state.borrow().raised.clone()
    }

    /// Makes every later create call hand back "no object".
    pub fn refuse_creation(&self, refuse: bool) {
        self.state.borrow_mut().refuse_creation = refuse;
    }

    /// Makes every later upload fail with [`ErrorCode::OutOfMemory`].
    pub fn run_out_of_memory(&self, out: bool) {
        self.state.borrow_mut().out_of_memory = out;
    }

    /// Makes every later compile of `stage` fail with `log`.
    pub fn fail_compile(&self, stage: ShaderStage, log: &str) {
        self.state.borrow_mut().compile_failures.insert(stage, log.to_owned());
    }

    /// Makes every later link fail with `log`.
    pub fn fail_link(&self, log: &str) {
        self.state.borrow_mut().link_failure = Some(log.to_owned());
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.state.borrow().bound(target)
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().vertex_array
    }

    pub fn bound_program(&self) -> Option<ProgramId> {
        self.state.borrow().program
    }

    /// What `slot` of `array` currently reads from.
    pub fn attribute(&self, array: VertexArrayId, slot: u32) -> Option<AttributeState> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&array)
            .and_then(|state| state.attributes.get(&slot).copied())
    }

    /// The index buffer `array` remembers.
    pub fn element_buffer_of(&self, array: VertexArrayId) -> Option<BufferId> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&array)
            .and_then(|state| state.element_buffer)
    }

    /// Bytes last uploaded into `buffer`, if it is alive and has had data.
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .and_then(|data| data.as_ref().map(|(bytes, _)| bytes.clone()))
    }

    pub fn buffer_usage(&self, buffer: BufferId) -> Option<BufferUsage> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .and_then(|data| data.as_ref().map(|(_, usage)| *usage))
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    /// Every delete call made for a buffer, in order, including repeats.
    pub fn deleted_buffers(&self) -> Vec<BufferId> {
        self.state.borrow().deleted_buffers.clone()
    }

    pub fn deleted_vertex_arrays(&self) -> Vec<VertexArrayId> {
        self.state.borrow().deleted_vertex_arrays.clone()
    }

    pub fn deleted_shaders(&self) -> Vec<ShaderId> {
        self.state.borrow().deleted_shaders.clone()
    }

    pub fn deleted_programs(&self) -> Vec<ProgramId> {
        self.state.borrow().deleted_programs.clone()
    }

    pub fn attached_shaders(&self, program: ProgramId) -> Vec<ShaderId> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|state| state.attached.clone())
            .unwrap_or_default()
    }

    /// Last value written to the uniform called `name` in `program`.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<[f32; 4]> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.iter().position(|uniform| uniform == name)?;
        program.values.get(&(location as i32)).copied()
    }

    pub fn draws(&self) -> Vec<DrawCommand> {
        self.state.borrow().draws.clone()
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn current_clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }
}

/// The name declared by a `uniform <type> <name>;` line, if that's what `line` is.
fn declared_uniform(line: &str) -> Option<&str> {
    let mut words = line.trim().trim_end_matches(';').split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("uniform"), Some(_), Some(name)) => Some(name),
        _ => None,
    }
}

impl Device for RecordingDevice {
    fn create_buffer(&self) -> Option<BufferId> {
        let mut state = self.state.borrow_mut();
        let id = BufferId(state.name()?);
        state.buffers.insert(id, None);
        Some(id)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        state.deleted_buffers.push(buffer);
        if state.buffers.remove(&buffer).is_none() {
            return;
        }

        // Deleting a bound buffer unbinds it
        if state.array_buffer == Some(buffer) {
            state.array_buffer = None;
        }
        if state.element_buffer() == Some(buffer) {
            state.set_element_buffer(None);
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = buffer {
            if !state.buffers.contains_key(&id) {
                state.raise(ErrorCode::InvalidOperation);
                return;
            }
        }

        match target {
            BufferTarget::Array => state.array_buffer = buffer,
            BufferTarget::ElementArray => state.set_element_buffer(buffer),
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<(), ErrorCode> {
        let mut state = self.state.borrow_mut();
        let bound = match state.bound(target) {
            Some(buffer) => buffer,
            None => {
                state.raise(ErrorCode::InvalidOperation);
                return Err(ErrorCode::InvalidOperation);
            }
        };

        if state.out_of_memory {
            return Err(ErrorCode::OutOfMemory);
        }

        state.buffers.insert(bound, Some((data.to_vec(), usage)));
        Ok(())
    }

    fn create_vertex_array(&self) -> Option<VertexArrayId> {
        let mut state = self.state.borrow_mut();
        let id = VertexArrayId(state.name()?);
        state.vertex_arrays.insert(id, VertexArrayState::default());
        Some(id)
    }

    fn delete_vertex_array(&self, array: VertexArrayId) {
        let mut state = self.state.borrow_mut();
        state.deleted_vertex_arrays.push(array);
        if state.vertex_arrays.remove(&array).is_some() && state.vertex_array == Some(array) {
            state.vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, array: Option<VertexArrayId>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = array {
            if !state.vertex_arrays.contains_key(&id) {
                state.raise(ErrorCode::InvalidOperation);
                return;
            }
        }
        state.vertex_array = array;
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        let mut state = self.state.borrow_mut();
        match state.attribute(slot) {
            Some(attribute) => attribute.enabled = true,
            None => state.raise(ErrorCode::InvalidOperation),
        }
    }

    fn vertex_attrib_pointer(&self, slot: u32, pointer: &AttribPointer) {
        let mut state = self.state.borrow_mut();
        let buffer = state.array_buffer;
        if buffer.is_none() {
            state.raise(ErrorCode::InvalidOperation);
            return;
        }

        match state.attribute(slot) {
            Some(attribute) => {
                attribute.buffer = buffer;
                attribute.pointer = Some(*pointer);
            }
            None => state.raise(ErrorCode::InvalidOperation),
        }
    }

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        let mut state = self.state.borrow_mut();
        if let Some(log) = state.compile_failures.get(&stage) {
            return Err(log.clone());
        }

        let id = ShaderId(state.name().ok_or_else(|| String::from("no shader object"))?);
        state.shaders.insert(id, (stage, source.to_owned()));
        Ok(id)
    }

    fn delete_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        state.deleted_shaders.push(shader);
        state.shaders.remove(&shader);
    }

    fn create_program(&self) -> Option<ProgramId> {
        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.name()?);
        state.programs.insert(id, ProgramState::default());
        Some(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.raise(ErrorCode::InvalidValue);
            return;
        }
        match state.programs.get_mut(&program) {
            Some(program) => program.attached.push(shader),
            None => state.raise(ErrorCode::InvalidValue),
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        match state.programs.get_mut(&program) {
            Some(program) => program.attached.retain(|attached| *attached != shader),
            None => state.raise(ErrorCode::InvalidValue),
        }
    }

    fn link_program(&self, program: ProgramId) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        if let Some(log) = state.link_failure.clone() {
            return Err(log);
        }

        let attached = match state.programs.get(&program) {
            Some(program) => program.attached.clone(),
            None => return Err(format!("program {} does not exist", program.0)),
        };

        let mut uniforms = Vec::new();
        for shader in &attached {
            if let Some((_, source)) = state.shaders.get(shader) {
                for name in source.lines().filter_map(declared_uniform) {
                    if !uniforms.iter().any(|uniform| uniform == name) {
                        uniforms.push(name.to_owned());
                    }
                }
            }
        }

        if let Some(program) = state.programs.get_mut(&program) {
            program.linked = true;
            program.uniforms = uniforms;
        }
        Ok(())
    }

    fn validate_program(&self, program: ProgramId) -> Result<(), String> {
        match self.state.borrow().programs.get(&program) {
            Some(state) if state.linked => Ok(()),
            Some(_) => Err(String::from("program is not linked")),
            None => Err(format!("program {} does not exist", program.0)),
        }
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        state.deleted_programs.push(program);
        if state.programs.remove(&program).is_some() && state.program == Some(program) {
            state.program = None;
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = program {
            if !state.programs.get(&id).map_or(false, |program| program.linked) {
                state.raise(ErrorCode::InvalidOperation);
                return;
            }
        }
        state.program = program;
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        program
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|location| UniformLocation(location as i32))
    }

    fn uniform_4f(&self, location: UniformLocation, value: [f32; 4]) {
        let mut state = self.state.borrow_mut();
        let current = match state.program {
            Some(program) => program,
            None => {
                state.raise(ErrorCode::InvalidOperation);
                return;
            }
        };

        if let Some(program) = state.programs.get_mut(&current) {
            if (location.0 as usize) < program.uniforms.len() {
                program.values.insert(location.0, value);
                return;
            }
        }
        state.raise(ErrorCode::InvalidOperation);
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.state.borrow_mut().clear_color = rgba;
    }

    fn clear_color_buffer(&self) {
        self.state.borrow_mut().clears += 1;
    }

    fn draw_elements(&self, primitive: Primitive, count: usize, index_type: IndexType, offset: usize) {
        let mut state = self.state.borrow_mut();
        let bound = (state.program, state.vertex_array, state.element_buffer());
        match bound {
            (Some(program), Some(vertex_array), Some(element_buffer)) => {
                state.draws.push(DrawCommand {
                    primitive,
                    count,
                    index_type,
                    offset,
                    program,
                    vertex_array,
                    element_buffer,
                });
            }
            _ => state.raise(ErrorCode::InvalidOperation),
        }
    }

    fn get_error(&self) -> Option<ErrorCode> {
        self.state.borrow_mut().pending.pop_front()
    }
}
