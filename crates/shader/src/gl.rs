//! [`GpuContext`] for a `glow` OpenGL context.
//!
//! The context must be current on the calling thread for as long as any
//! [`Shader`](crate::Shader) built on it is alive.

use glow::HasContext;

use crate::context::{GpuContext, ShaderStage};

type Native = glow::Context;
type GlShader = <Native as HasContext>::Shader;
type GlProgram = <Native as HasContext>::Program;
type GlLocation = <Native as HasContext>::UniformLocation;

impl GpuContext for glow::Context {
    type Shader = GlShader;
    type Program = GlProgram;
    type UniformLocation = GlLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<GlShader, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { HasContext::create_shader(self, kind) }
    }

    fn shader_source(&self, shader: GlShader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: GlShader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: GlShader) -> bool {
        unsafe { HasContext::get_shader_compile_status(self, shader) }
    }

    fn shader_info_log(&self, shader: GlShader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: GlShader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<GlProgram, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: GlProgram, shader: GlShader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn link_program(&self, program: GlProgram) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: GlProgram) -> bool {
        unsafe { HasContext::get_program_link_status(self, program) }
    }

    fn program_info_log(&self, program: GlProgram) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    fn delete_program(&self, program: GlProgram) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<GlProgram>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(&self, program: GlProgram, name: &str) -> Option<GlLocation> {
        unsafe { HasContext::get_uniform_location(self, program, name) }
    }

    fn uniform_1_i32(&self, location: Option<&GlLocation>, value: i32) {
        unsafe { HasContext::uniform_1_i32(self, location, value) }
    }

    fn uniform_1_f32(&self, location: Option<&GlLocation>, value: f32) {
        unsafe { HasContext::uniform_1_f32(self, location, value) }
    }

    fn uniform_3_f32(&self, location: Option<&GlLocation>, x: f32, y: f32, z: f32) {
        unsafe { HasContext::uniform_3_f32(self, location, x, y, z) }
    }

    fn uniform_matrix_4_f32(&self, location: Option<&GlLocation>, value: &[f32; 16]) {
        unsafe { HasContext::uniform_matrix_4_f32_slice(self, location, false, value) }
    }
}

#[cfg(test)]
mod tests {
    use crate::{GpuContext, RenderContext, Shader, ShaderError};

    fn build_on<G: GpuContext>(ctx: &RenderContext<G>) -> Result<Shader<'_, G>, ShaderError> {
        Shader::from_sources(ctx, "void main() {}", "void main() {}")
    }

    // Needs a live GL context to run, so only the types are checked here.
    #[test]
    fn glow_context_is_a_backend() {
        let _ = build_on::<glow::Context>;
    }
}
