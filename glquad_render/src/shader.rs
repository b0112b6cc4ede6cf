//! Shader sources, stages and programs.
//!
//! Both stages of a program live in one file, each introduced by a marker line:
//!
//! ```text
//! #shader vertex
//! #version 330 core
//! ...
//! #shader fragment
//! #version 330 core
//! ...
//! ```
//!
//! Anything before the first marker is ignored, and so is a section whose marker names a stage we
//! don't know.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, error, trace, warn};

use crate::device::{Device, ProgramId, ShaderId, ShaderStage, UniformLocation};
use crate::device_call;
use crate::error::{RenderError, Result};

const MARKER: &str = "#shader";

/// The two halves of a shader file, each ready to hand to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderProgramSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderProgramSource {
    /// Splits `text` into its vertex and fragment sections. Every line kept gets its `\n` back,
    /// including the last one. Never fails; a missing section just comes out empty.
    pub fn parse(text: &str) -> Self {
        let mut source = Self::default();
        let mut current: Option<ShaderStage> = None;

        for line in text.lines() {
            if line.contains(MARKER) {
                current = if line.contains("vertex") {
                    Some(ShaderStage::Vertex)
                } else if line.contains("fragment") {
                    Some(ShaderStage::Fragment)
                } else {
                    warn!("Ignoring shader section with unknown stage: {}", line.trim());
                    None
                };
                continue;
            }

            let section = match current {
                Some(ShaderStage::Vertex) => &mut source.vertex,
                Some(ShaderStage::Fragment) => &mut source.fragment,
                None => continue,
            };
            section.push_str(line);
            section.push('\n');
        }

        source
    }

    /// Reads a shader file from disk and [`parse`](Self::parse)s it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded shader source {}", path.display());
        Ok(Self::parse(&text))
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// Represents a compiled shader.
pub struct Shader<'a, D: Device> {
    device: &'a D,
    id: ShaderId,
    stage: ShaderStage,
}

impl<'a, D: Device> Shader<'a, D> {
    pub fn compile(device: &'a D, stage: ShaderStage, source: &str) -> Result<Self> {
        match device_call!(device, compile_shader(stage, source)) {
            Ok(id) => {
                debug!("Compiled {} shader {}", stage, id.0);
                Ok(Self { device, id, stage })
            }
            Err(log) => {
                error!("Failed to compile {} shader!\n{}", stage, log);
                Err(RenderError::ShaderCompile { stage, log })
            }
        }
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<'a, D: Device> Drop for Shader<'a, D> {
    fn drop(&mut self) {
        device_call!(self.device, delete_shader(self.id));
    }
}

/// Represents the graphics pipeline: a vertex and a fragment shader linked together.
pub struct Program<'a, D: Device> {
    device: &'a D,
    id: ProgramId,
    uniforms: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl<'a, D: Device> Program<'a, D> {
    /// Compiles both stages of `source` and links them.
    ///
    /// The individual shaders are only needed until the link, so they're detached and deleted
    /// before this returns, whether it succeeded or not.
    pub fn new(device: &'a D, source: &ShaderProgramSource) -> Result<Self> {
        let vertex = Shader::compile(device, ShaderStage::Vertex, &source.vertex)?;
        let fragment = Shader::compile(device, ShaderStage::Fragment, &source.fragment)?;
        Self::from_shaders(device, &[vertex, fragment])
    }

    pub fn from_shaders(device: &'a D, shaders: &[Shader<'a, D>]) -> Result<Self> {
        let id = device_call!(device, create_program())
            .ok_or(RenderError::ResourceCreation { resource: "shader program" })?;
        let program = Self {
            device,
            id,
            uniforms: RefCell::new(HashMap::new()),
        };

        for shader in shaders {
            device_call!(device, attach_shader(id, shader.id()));
        }

        let linked = device_call!(device, link_program(id));

        for shader in shaders {
            device_call!(device, detach_shader(id, shader.id()));
        }

        if let Err(log) = linked {
            error!("Failed to link shader program!\n{}", log);
            return Err(RenderError::ProgramLink { log });
        }

        // Validity depends on whatever else is bound right now, so this is only worth a warning
        if let Err(log) = device_call!(device, validate_program(id)) {
            warn!("Shader program {} failed validation: {}", id.0, log);
        }

        debug!("Linked shader program {}", id.0);
        Ok(program)
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn bind(&self) {
        trace!("Using shader program {}", self.id.0);
        device_call!(self.device, use_program(Some(self.id)));
    }

    pub fn unbind(&self) {
        device_call!(self.device, use_program(None));
    }

    /// Looks up a uniform's location, asking the device only the first time for each name.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if let Some(location) = self.uniforms.borrow().get(name) {
            return *location;
        }

        let location = device_call!(self.device, uniform_location(self.id, name));
        if location.is_none() {
            warn!("Uniform {} doesn't exist in shader program {}", name, self.id.0);
        }
        self.uniforms.borrow_mut().insert(name.to_owned(), location);
        location
    }

    /// Sets a `vec4` uniform. The program is bound first, since that's who the value goes to.
    /// Uniforms the program doesn't have are silently skipped after the first warning.
    pub fn set_uniform_4f(&self, name: &str, value: [f32; 4]) {
        if let Some(location) = self.uniform_location(name) {
            self.bind();
            device_call!(self.device, uniform_4f(location, value));
        }
    }
}

impl<'a, D: Device> Drop for Program<'a, D> {
    fn drop(&mut self) {
        debug!("Deleting shader program {}", self.id.0);
        device_call!(self.device, delete_program(self.id));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::recording::RecordingDevice;

    const TWO_STAGES: &str = "\
this line is not part of any shader
#shader vertex
#version 330 core
void main() {}
#shader fragment
out vec4 color;
";

    #[test]
    fn sections_are_split_on_markers() {
        let source = ShaderProgramSource::parse(TWO_STAGES);

        assert_eq!(source.vertex, "#version 330 core\nvoid main() {}\n");
        assert_eq!(source.fragment, "out vec4 color;\n");
    }

    #[test]
    fn blank_lines_are_kept_verbatim() {
        let source = ShaderProgramSource::parse("#shader vertex\na\n\n  b\n#shader fragment\n\n");

        assert_eq!(source.vertex, "a\n\n  b\n");
        assert_eq!(source.fragment, "\n");
    }

    #[test]
    fn missing_or_empty_sections_are_fine() {
        let only_vertex = ShaderProgramSource::parse("#shader vertex\nvoid main() {}");
        assert_eq!(only_vertex.vertex, "void main() {}\n");
        assert_eq!(only_vertex.fragment, "");

        let empty = ShaderProgramSource::parse("#shader vertex\n#shader fragment\n");
        assert_eq!(empty, ShaderProgramSource::default());

        assert_eq!(ShaderProgramSource::parse("no markers at all\n"), ShaderProgramSource::default());
    }

    #[test]
    fn unknown_stages_are_skipped() {
        let source = ShaderProgramSource::parse("#shader geometry\nlost\n#shader fragment\nkept\n");

        assert_eq!(source.vertex, "");
        assert_eq!(source.fragment, "kept\n");
        assert_eq!(source.stage(ShaderStage::Fragment), "kept\n");
    }

    #[test]
    fn repeated_markers_append_to_the_same_section() {
        let source = ShaderProgramSource::parse("#shader vertex\na\n#shader fragment\nb\n#shader vertex\nc\n");

        assert_eq!(source.vertex, "a\nc\n");
        assert_eq!(source.fragment, "b\n");
    }

    #[test]
    fn shipped_shader_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../res/shaders/basic.shader");
        let source = ShaderProgramSource::load(path).unwrap();

        assert!(source.vertex.starts_with("#version 330 core\n"));
        assert!(source.vertex.contains("gl_Position"));
        assert!(source.fragment.contains("uniform vec4 u_Color;"));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = ShaderProgramSource::load("does/not/exist.shader").unwrap_err();

        assert!(matches!(error, RenderError::Io { .. }));
        assert!(error.to_string().contains("does/not/exist.shader"));
    }

    #[test]
    fn program_links_and_drops_its_shaders() {
        let device = RecordingDevice::new();
        let program = Program::new(&device, &ShaderProgramSource::parse(TWO_STAGES)).unwrap();

        assert!(device.attached_shaders(program.id()).is_empty());
        assert_eq!(device.live_shaders(), 0);
        assert_eq!(device.deleted_shaders().len(), 2);
        assert_eq!(device.live_programs(), 1);

        drop(program);
        assert_eq!(device.live_programs(), 0);
    }

    #[test]
    fn compile_failure_names_the_stage() {
        let device = RecordingDevice::new();
        device.fail_compile(ShaderStage::Fragment, "0:1(1): error: syntax error");

        let error = Program::new(&device, &ShaderProgramSource::parse(TWO_STAGES)).err().unwrap();

        match error {
            RenderError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("syntax error"));
            }
            other => panic!("unexpected error: {}", other),
        }

        // The vertex shader had compiled and must not leak
        assert_eq!(device.live_shaders(), 0);
        assert_eq!(device.live_programs(), 0);
    }

    #[test]
    fn link_failure_releases_everything() {
        let device = RecordingDevice::new();
        device.fail_link("vertex output not read by fragment shader");

        let error = Program::new(&device, &ShaderProgramSource::parse(TWO_STAGES)).err().unwrap();

        assert!(matches!(error, RenderError::ProgramLink { .. }));
        assert_eq!(device.live_shaders(), 0);
        assert_eq!(device.live_programs(), 0);
        assert_eq!(device.deleted_programs().len(), 1);
    }

    #[test]
    fn uniforms_are_set_on_the_program_and_cached() {
        let device = RecordingDevice::new();
        let source = ShaderProgramSource::parse("#shader vertex\n#shader fragment\nuniform vec4 u_Color;\n");
        let program = Program::new(&device, &source).unwrap();

        program.set_uniform_4f("u_Color", [0.2, 0.3, 0.8, 1.0]);
        program.set_uniform_4f("u_Missing", [1.0; 4]);

        assert_eq!(device.bound_program(), Some(program.id()));
        assert_eq!(device.uniform(program.id(), "u_Color"), Some([0.2, 0.3, 0.8, 1.0]));
        assert_eq!(program.uniform_location("u_Color"), Some(UniformLocation(0)));
        assert_eq!(program.uniform_location("u_Missing"), None);
        assert!(device.errors_raised().is_empty());
    }
}
