//! Shader program wrapper: compile, link, and upload uniforms through a
//! pluggable GPU context.
//!
//! # Invariants
//! - Construction is all-or-nothing; a failed build leaves no GPU objects.
//! - A program is deleted exactly once, when its [`Shader`] is dropped.
//! - Each uniform name is resolved against the GPU at most once per program,
//!   including names the program does not have.
//! - Uniform setters only upload while their program is the bound one.
//!
//! # Backends
//! [`HeadlessContext`] records calls and runs anywhere. With the `glow`
//! feature, `glow::Context` implements [`GpuContext`] directly.

mod context;
mod error;
#[cfg(feature = "glow")]
mod gl;
pub mod headless;
mod program;

pub use context::{GpuContext, RenderContext, ShaderStage};
pub use error::{ShaderError, UniformError};
pub use headless::HeadlessContext;
pub use program::Shader;

pub fn crate_info() -> &'static str {
    "learngl-shader v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("shader"));
    }
}
