use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use glam::{Mat4, Vec3};

use crate::context::{GpuContext, RenderContext, ShaderStage};
use crate::error::{ShaderError, UniformError};

/// A linked vertex + fragment program with cached uniform locations.
///
/// Built atomically: either both stages compile and the program links, or
/// construction fails and nothing is left allocated. The program is deleted
/// when the `Shader` is dropped.
pub struct Shader<'ctx, G: GpuContext> {
    ctx: &'ctx RenderContext<G>,
    program: G::Program,
    // Locations never change for a linked program, misses included.
    locations: RefCell<HashMap<String, Option<G::UniformLocation>>>,
}

impl<'ctx, G: GpuContext> Shader<'ctx, G> {
    /// Read both stage sources from disk and build the program.
    ///
    /// Both files are read before any GPU object is created.
    pub fn from_files(
        ctx: &'ctx RenderContext<G>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex_source = read_source(vertex_path.as_ref())?;
        let fragment_source = read_source(fragment_path.as_ref())?;
        Self::from_sources(ctx, &vertex_source, &fragment_source)
    }

    pub fn from_sources(
        ctx: &'ctx RenderContext<G>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let _span = tracing::debug_span!("shader_build").entered();
        let gpu = ctx.gpu();

        let vertex = compile_stage(gpu, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_stage(gpu, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                gpu.delete_shader(vertex);
                return Err(err);
            }
        };

        let linked = link_program(gpu, vertex, fragment);
        // Stage objects are only needed until link.
        gpu.delete_shader(vertex);
        gpu.delete_shader(fragment);
        let program = linked?;

        tracing::debug!(?program, "shader program linked");
        Ok(Self {
            ctx,
            program,
            locations: RefCell::new(HashMap::new()),
        })
    }

    /// Make this the active program for uniform uploads and draws.
    pub fn use_program(&self) {
        self.ctx.bind(self.program);
    }

    pub fn is_active(&self) -> bool {
        self.ctx.bound_program() == Some(self.program)
    }

    pub fn program(&self) -> G::Program {
        self.program
    }

    /// Resolve `name`, asking the GPU only the first time it is seen.
    pub fn uniform_location(&self, name: &str) -> Option<G::UniformLocation> {
        if let Some(location) = self.locations.borrow().get(name) {
            return location.clone();
        }

        let location = self.ctx.gpu().uniform_location(self.program, name);
        match &location {
            Some(location) => tracing::trace!(uniform = name, ?location, "uniform resolved"),
            None => {
                tracing::debug!(uniform = name, program = ?self.program, "uniform not found in program")
            }
        }
        self.locations
            .borrow_mut()
            .insert(name.to_owned(), location.clone());
        location
    }

    /// Number of distinct uniform names resolved so far.
    pub fn cached_uniforms(&self) -> usize {
        self.locations.borrow().len()
    }

    pub fn set_bool(&self, name: &str, value: bool) -> Result<(), UniformError> {
        let location = self.active_location(name)?;
        self.ctx.gpu().uniform_1_i32(location.as_ref(), i32::from(value));
        Ok(())
    }

    pub fn set_integer(&self, name: &str, value: i32) -> Result<(), UniformError> {
        let location = self.active_location(name)?;
        self.ctx.gpu().uniform_1_i32(location.as_ref(), value);
        Ok(())
    }

    pub fn set_float(&self, name: &str, value: f32) -> Result<(), UniformError> {
        let location = self.active_location(name)?;
        self.ctx.gpu().uniform_1_f32(location.as_ref(), value);
        Ok(())
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) -> Result<(), UniformError> {
        let location = self.active_location(name)?;
        self.ctx
            .gpu()
            .uniform_3_f32(location.as_ref(), value.x, value.y, value.z);
        Ok(())
    }

    pub fn set_matrix4(&self, name: &str, value: &Mat4) -> Result<(), UniformError> {
        let location = self.active_location(name)?;
        self.ctx
            .gpu()
            .uniform_matrix_4_f32(location.as_ref(), &value.to_cols_array());
        Ok(())
    }

    fn active_location(&self, name: &str) -> Result<Option<G::UniformLocation>, UniformError> {
        if !self.is_active() {
            return Err(UniformError::ProgramNotActive {
                name: name.to_owned(),
            });
        }
        Ok(self.uniform_location(name))
    }
}

impl<G: GpuContext> Drop for Shader<'_, G> {
    fn drop(&mut self) {
        self.ctx.release(self.program);
        tracing::debug!(program = ?self.program, "shader program deleted");
    }
}

impl<G: GpuContext> fmt::Debug for Shader<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("cached_uniforms", &self.cached_uniforms())
            .finish()
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| {
        tracing::warn!(path = %path.display(), %source, "failed to read shader source");
        ShaderError::FileRead {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn compile_stage<G: GpuContext>(
    gpu: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, ShaderError> {
    let shader = gpu.create_shader(stage).map_err(ShaderError::Create)?;
    gpu.shader_source(shader, source);
    gpu.compile_shader(shader);

    if !gpu.shader_compile_status(shader) {
        let log = diagnostic(gpu.shader_info_log(shader));
        gpu.delete_shader(shader);
        tracing::warn!(%stage, log = %log.trim_end(), "shader compilation failed");
        return Err(ShaderError::Compile { stage, log });
    }
    Ok(shader)
}

fn link_program<G: GpuContext>(
    gpu: &G,
    vertex: G::Shader,
    fragment: G::Shader,
) -> Result<G::Program, ShaderError> {
    let program = gpu.create_program().map_err(ShaderError::Create)?;
    gpu.attach_shader(program, vertex);
    gpu.attach_shader(program, fragment);
    gpu.link_program(program);

    if !gpu.program_link_status(program) {
        let log = diagnostic(gpu.program_info_log(program));
        gpu.delete_program(program);
        tracing::warn!(log = %log.trim_end(), "shader program failed to link");
        return Err(ShaderError::Link { log });
    }
    Ok(program)
}

fn diagnostic(log: String) -> String {
    if log.trim().is_empty() {
        "driver reported no diagnostics".to_owned()
    } else {
        log
    }
}
