use std::cell::Cell;
use std::fmt;

/// Programmable pipeline stage a source file is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// GPU primitives a [`Shader`](crate::Shader) is built from.
///
/// Mirrors the OpenGL program API. Implementations assume a single thread
/// owns the context; every method takes `&self`.
pub trait GpuContext {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + PartialEq + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    /// Bind `program` for subsequent uniform uploads and draws.
    fn use_program(&self, program: Option<Self::Program>);

    /// `None` when the program has no active uniform called `name`.
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    // Uploads target the bound program. A `None` location is a no-op.
    fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, value: i32);
    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32);
    fn uniform_3_f32(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32, z: f32);
    /// Column-major, untransposed.
    fn uniform_matrix_4_f32(&self, location: Option<&Self::UniformLocation>, value: &[f32; 16]);
}

/// A GPU context plus explicit tracking of the bound program.
///
/// Shaders borrow the context they were built on, so they cannot outlive it,
/// and uniform setters check against [`RenderContext::bound_program`] instead
/// of trusting whatever the driver has bound. The backend itself stays inside
/// this crate, so every bind and unbind goes through the tracked path.
pub struct RenderContext<G: GpuContext> {
    gpu: G,
    bound: Cell<Option<G::Program>>,
}

impl<G: GpuContext> RenderContext<G> {
    pub fn new(gpu: G) -> Self {
        Self {
            gpu,
            bound: Cell::new(None),
        }
    }

    pub(crate) fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn bound_program(&self) -> Option<G::Program> {
        self.bound.get()
    }

    /// Unbind whatever program is active.
    pub fn unbind(&self) {
        self.gpu.use_program(None);
        self.bound.set(None);
    }

    pub fn into_inner(self) -> G {
        self.gpu
    }

    pub(crate) fn bind(&self, program: G::Program) {
        self.gpu.use_program(Some(program));
        self.bound.set(Some(program));
    }

    /// Delete `program`, unbinding it first if it is the active one.
    pub(crate) fn release(&self, program: G::Program) {
        if self.bound.get() == Some(program) {
            self.unbind();
        }
        self.gpu.delete_program(program);
    }
}

impl<G: GpuContext> fmt::Debug for RenderContext<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("bound", &self.bound.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessContext;

    #[test]
    fn stage_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }

    #[test]
    fn bind_and_release_track_program() {
        let ctx = RenderContext::new(HeadlessContext::new());
        let program = ctx.gpu().create_program().unwrap();
        assert_eq!(ctx.bound_program(), None);

        ctx.bind(program);
        assert_eq!(ctx.bound_program(), Some(program));
        assert_eq!(ctx.driver_program(), Some(program));

        ctx.release(program);
        assert_eq!(ctx.bound_program(), None);
        assert_eq!(ctx.driver_program(), None);
        assert_eq!(ctx.live_programs(), 0);
    }
}
