use std::path::PathBuf;

use crate::context::ShaderStage;

/// Errors from building a shader program. Every variant means construction
/// failed and no GPU object survived it.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader source {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
    #[error("GPU object creation failed: {0}")]
    Create(String),
}

impl ShaderError {
    /// Driver diagnostic text, for compile and link failures.
    pub fn log(&self) -> Option<&str> {
        match self {
            Self::Compile { log, .. } | Self::Link { log } => Some(log),
            _ => None,
        }
    }
}

/// Errors from setting a uniform value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniformError {
    #[error("uniform `{name}` set while its program is not the active one")]
    ProgramNotActive { name: String },
}
