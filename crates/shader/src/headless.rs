//! Software [`GpuContext`] that records every call instead of driving a GPU.
//!
//! Compilation only checks that a stage defines `main`; uniform locations
//! come from the `uniform <type> <name>;` declarations of the linked stages,
//! numbered in declaration order. Failures can be injected per stage and for
//! linking, which is enough to exercise every path of [`Shader`](crate::Shader)
//! without a display.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::context::{GpuContext, RenderContext, ShaderStage};

const PRECISION_QUALIFIERS: [&str; 3] = ["lowp", "mediump", "highp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlessShader(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlessProgram(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlessLocation(pub i32);

/// Value carried by one recorded uniform upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Mat4([f32; 16]),
}

/// An upload that reached a real location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Upload {
    /// Program bound when the upload was issued.
    pub program: Option<HeadlessProgram>,
    pub location: HeadlessLocation,
    pub value: UniformValue,
}

/// Call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub shaders_created: usize,
    pub shaders_deleted: usize,
    pub programs_created: usize,
    pub programs_deleted: usize,
    pub binds: usize,
    pub location_queries: usize,
    /// Uploads addressed to a `None` location.
    pub dropped_uploads: usize,
}

#[derive(Debug)]
struct StageObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<HeadlessShader>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    shaders: BTreeMap<HeadlessShader, StageObject>,
    programs: BTreeMap<HeadlessProgram, ProgramObject>,
    bound: Option<HeadlessProgram>,
    compile_failures: BTreeMap<ShaderStage, String>,
    link_failure: Option<String>,
    stats: CallStats,
    uploads: Vec<Upload>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, location: Option<&HeadlessLocation>, value: UniformValue) {
        match location {
            Some(&location) => self.uploads.push(Upload {
                program: self.bound,
                location,
                value,
            }),
            None => self.stats.dropped_uploads += 1,
        }
    }
}

/// Recording GPU context for tests and display-less tooling.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    state: RefCell<State>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every compile of `stage` fail with `log`.
    pub fn fail_compile(self, stage: ShaderStage, log: impl Into<String>) -> Self {
        self.state
            .borrow_mut()
            .compile_failures
            .insert(stage, log.into());
        self
    }

    /// Make every link fail with `log`.
    pub fn fail_link(self, log: impl Into<String>) -> Self {
        self.state.borrow_mut().link_failure = Some(log.into());
        self
    }

    pub fn stats(&self) -> CallStats {
        self.state.borrow().stats
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.state.borrow().uploads.clone()
    }

    pub fn bound_program(&self) -> Option<HeadlessProgram> {
        self.state.borrow().bound
    }

    /// Stage objects created and not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Program objects created and not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    /// Uniform names of a linked program, in location order.
    pub fn active_uniforms(&self, program: HeadlessProgram) -> Vec<String> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }
}

/// Read-only inspection of a headless backend owned by a [`RenderContext`].
impl RenderContext<HeadlessContext> {
    pub fn stats(&self) -> CallStats {
        self.gpu().stats()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.gpu().uploads()
    }

    /// Program the backend itself has bound, as opposed to the tracked
    /// [`RenderContext::bound_program`].
    pub fn driver_program(&self) -> Option<HeadlessProgram> {
        self.gpu().bound_program()
    }

    pub fn live_shaders(&self) -> usize {
        self.gpu().live_shaders()
    }

    pub fn live_programs(&self) -> usize {
        self.gpu().live_programs()
    }

    pub fn active_uniforms(&self, program: HeadlessProgram) -> Vec<String> {
        self.gpu().active_uniforms(program)
    }
}

impl GpuContext for HeadlessContext {
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;
    type UniformLocation = HeadlessLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<HeadlessShader, String> {
        let mut state = self.state.borrow_mut();
        let shader = HeadlessShader(state.next_id());
        state.shaders.insert(
            shader,
            StageObject {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        state.stats.shaders_created += 1;
        Ok(shader)
    }

    fn shader_source(&self, shader: HeadlessShader, source: &str) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(&shader) {
            object.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: HeadlessShader) {
        let mut state = self.state.borrow_mut();
        let State {
            shaders,
            compile_failures,
            ..
        } = &mut *state;
        let Some(object) = shaders.get_mut(&shader) else {
            return;
        };

        if let Some(log) = compile_failures.get(&object.stage) {
            object.compiled = false;
            object.log = log.clone();
        } else if !defines_main(&object.source) {
            object.compiled = false;
            object.log = "0:1(1): error: no function with name 'main'".to_owned();
        } else {
            object.compiled = true;
            object.log.clear();
        }
    }

    fn shader_compile_status(&self, shader: HeadlessShader) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: HeadlessShader) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: HeadlessShader) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader).is_some() {
            state.stats.shaders_deleted += 1;
        }
    }

    fn create_program(&self) -> Result<HeadlessProgram, String> {
        let mut state = self.state.borrow_mut();
        let program = HeadlessProgram(state.next_id());
        state.programs.insert(program, ProgramObject::default());
        state.stats.programs_created += 1;
        Ok(program)
    }

    fn attach_shader(&self, program: HeadlessProgram, shader: HeadlessShader) {
        if let Some(object) = self.state.borrow_mut().programs.get_mut(&program) {
            object.attached.push(shader);
        }
    }

    fn link_program(&self, program: HeadlessProgram) {
        let mut state = self.state.borrow_mut();
        let State {
            shaders,
            programs,
            link_failure,
            ..
        } = &mut *state;
        let Some(object) = programs.get_mut(&program) else {
            return;
        };

        let stages: Vec<&StageObject> = object
            .attached
            .iter()
            .filter_map(|id| shaders.get(id))
            .collect();
        let missing = [ShaderStage::Vertex, ShaderStage::Fragment]
            .into_iter()
            .find(|stage| !stages.iter().any(|s| s.stage == *stage && s.compiled));

        object.uniforms.clear();
        if let Some(log) = link_failure {
            object.linked = false;
            object.log = log.clone();
        } else if let Some(stage) = missing {
            object.linked = false;
            object.log = format!("error: program has no compiled {stage} shader attached");
        } else {
            object.linked = true;
            object.log.clear();
            for stage in &stages {
                for name in declared_uniforms(&stage.source) {
                    if !object.uniforms.contains(&name) {
                        object.uniforms.push(name);
                    }
                }
            }
        }
    }

    fn program_link_status(&self, program: HeadlessProgram) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: HeadlessProgram) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: HeadlessProgram) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_some() {
            state.stats.programs_deleted += 1;
        }
    }

    fn use_program(&self, program: Option<HeadlessProgram>) {
        let mut state = self.state.borrow_mut();
        state.bound = program;
        state.stats.binds += 1;
    }

    fn uniform_location(&self, program: HeadlessProgram, name: &str) -> Option<HeadlessLocation> {
        let mut state = self.state.borrow_mut();
        state.stats.location_queries += 1;
        let object = state.programs.get(&program).filter(|p| p.linked)?;
        let index = object.uniforms.iter().position(|u| u == name)?;
        i32::try_from(index).ok().map(HeadlessLocation)
    }

    fn uniform_1_i32(&self, location: Option<&HeadlessLocation>, value: i32) {
        self.state
            .borrow_mut()
            .record(location, UniformValue::Int(value));
    }

    fn uniform_1_f32(&self, location: Option<&HeadlessLocation>, value: f32) {
        self.state
            .borrow_mut()
            .record(location, UniformValue::Float(value));
    }

    fn uniform_3_f32(&self, location: Option<&HeadlessLocation>, x: f32, y: f32, z: f32) {
        self.state
            .borrow_mut()
            .record(location, UniformValue::Vec3([x, y, z]));
    }

    fn uniform_matrix_4_f32(&self, location: Option<&HeadlessLocation>, value: &[f32; 16]) {
        self.state
            .borrow_mut()
            .record(location, UniformValue::Mat4(*value));
    }
}

fn strip_comment(line: &str) -> &str {
    line.split("//").next().unwrap_or_default().trim()
}

fn defines_main(source: &str) -> bool {
    source.lines().map(strip_comment).any(|line| {
        line.strip_prefix("void")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .is_some_and(|rest| rest.trim_start().starts_with("main"))
    })
}

/// Names from `uniform <type> <name>[, <name>...];` lines.
fn declared_uniforms(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in source.lines().map(strip_comment) {
        let Some(decl) = line.strip_prefix("uniform") else {
            continue;
        };
        if !decl.starts_with(char::is_whitespace) {
            continue;
        }
        let decl = decl.split(';').next().unwrap_or_default();
        let mut tokens = decl
            .split_whitespace()
            .filter(|t| !PRECISION_QUALIFIERS.contains(t));
        // type
        if tokens.next().is_none() {
            continue;
        }
        let declarators: String = tokens.collect();
        for name in declarators.split(',') {
            let name = name.split('[').next().unwrap_or_default().trim();
            if !name.is_empty() {
                names.push(name.to_owned());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_main() {
        assert!(defines_main("void main() {}"));
        assert!(defines_main("#version 330 core\nvoid  main ()\n{\n}"));
        assert!(!defines_main("// void main()\nfloat x;"));
        assert!(!defines_main("voidmain()"));
    }

    #[test]
    fn parses_uniform_declarations() {
        let src = "uniform mat4 view;
uniform highp float mixValue; // trailing
uniform vec3 lights[4];
uniform float a, b;
// uniform int commented;
uniformity bogus;
";
        assert_eq!(
            declared_uniforms(src),
            vec!["view", "mixValue", "lights", "a", "b"]
        );
    }

    #[test]
    fn link_numbers_uniforms_across_stages() {
        let gpu = HeadlessContext::new();
        let vs = gpu.create_shader(ShaderStage::Vertex).unwrap();
        gpu.shader_source(vs, "uniform mat4 view;\nuniform float t;\nvoid main() {}");
        gpu.compile_shader(vs);
        let fs = gpu.create_shader(ShaderStage::Fragment).unwrap();
        gpu.shader_source(fs, "uniform float t;\nuniform vec3 tint;\nvoid main() {}");
        gpu.compile_shader(fs);

        let program = gpu.create_program().unwrap();
        gpu.attach_shader(program, vs);
        gpu.attach_shader(program, fs);
        gpu.link_program(program);
        assert!(gpu.program_link_status(program));
        assert_eq!(gpu.active_uniforms(program), vec!["view", "t", "tint"]);
        assert_eq!(
            gpu.uniform_location(program, "tint"),
            Some(HeadlessLocation(2))
        );
        assert_eq!(gpu.uniform_location(program, "nope"), None);
        assert_eq!(gpu.stats().location_queries, 2);
    }

    #[test]
    fn link_requires_both_stages() {
        let gpu = HeadlessContext::new();
        let vs = gpu.create_shader(ShaderStage::Vertex).unwrap();
        gpu.shader_source(vs, "void main() {}");
        gpu.compile_shader(vs);
        let program = gpu.create_program().unwrap();
        gpu.attach_shader(program, vs);
        gpu.link_program(program);
        assert!(!gpu.program_link_status(program));
        assert!(gpu.program_info_log(program).contains("fragment"));
        assert!(gpu.active_uniforms(program).is_empty());
    }

    #[test]
    fn uploads_without_location_are_dropped() {
        let gpu = HeadlessContext::new();
        gpu.uniform_1_f32(None, 1.0);
        gpu.uniform_1_i32(Some(&HeadlessLocation(0)), 7);
        assert_eq!(gpu.stats().dropped_uploads, 1);
        assert_eq!(gpu.uploads().len(), 1);
        assert_eq!(gpu.uploads()[0].value, UniformValue::Int(7));
    }
}
