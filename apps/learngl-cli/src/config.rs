use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use learngl_camera::CameraConfig;
use serde::{Deserialize, Serialize};

/// Session file: everything a render loop would need to drive the camera and
/// shader components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub camera: CameraConfig,
    /// Clamp pitch to +/-89 degrees on mouse look.
    pub constrain_pitch: bool,
    pub projection: ProjectionConfig,
    pub shaders: Option<ShaderPaths>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            constrain_pitch: true,
            projection: ProjectionConfig::default(),
            shaders: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            aspect: 1024.0 / 768.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    /// Rebase relative paths onto `dir`. Absolute paths are kept.
    fn resolve_against(&mut self, dir: &Path) {
        self.vertex = dir.join(&self.vertex);
        self.fragment = dir.join(&self.fragment);
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading session config {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing session config {}", path.display()))?;
        if let (Some(shaders), Some(dir)) = (config.shaders.as_mut(), path.parent()) {
            shaders.resolve_against(dir);
        }
        tracing::debug!(path = %path.display(), "session config loaded");
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let cfg = SessionConfig::load_or_default(None).unwrap();
        assert!(cfg.constrain_pitch);
        assert_eq!(cfg.camera, CameraConfig::default());
        assert!(cfg.shaders.is_none());
    }

    #[test]
    fn loads_yaml_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            "camera:\n  yaw: 0.0\n  movement_speed: 5.0\nconstrain_pitch: false\n\
             projection:\n  far: 500.0\nshaders:\n  vertex: a.vert\n  fragment: a.frag\n"
        )
        .unwrap();

        let cfg = SessionConfig::load(tmp.path()).unwrap();
        assert_eq!(cfg.camera.yaw, 0.0);
        assert_eq!(cfg.camera.movement_speed, 5.0);
        assert_eq!(cfg.camera.mouse_sensitivity, 0.1);
        assert!(!cfg.constrain_pitch);
        assert_eq!(cfg.projection.far, 500.0);
        assert_eq!(cfg.projection.near, 0.1);
        let shaders = cfg.shaders.unwrap();
        let dir = tmp.path().parent().unwrap();
        assert_eq!(shaders.vertex, dir.join("a.vert"));
        assert_eq!(shaders.fragment, dir.join("a.frag"));
    }

    #[test]
    fn shader_paths_resolve_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        std::fs::write(
            &path,
            "shaders:\n  vertex: shaders/cube.vert\n  fragment: /abs/cube.frag\n",
        )
        .unwrap();

        let shaders = SessionConfig::load(&path).unwrap().shaders.unwrap();
        assert_eq!(shaders.vertex, dir.path().join("shaders/cube.vert"));
        assert_eq!(shaders.fragment, PathBuf::from("/abs/cube.frag"));
    }

    #[test]
    fn shipped_session_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/session.yaml");
        let cfg = SessionConfig::load(&path).unwrap();
        assert_eq!(cfg.camera, CameraConfig::default());
        let shaders = cfg.shaders.unwrap();
        // usable whatever the working directory is
        assert!(shaders.vertex.is_file());
        assert!(shaders.fragment.is_file());
    }

    #[test]
    fn missing_file_names_path() {
        let err = SessionConfig::load(Path::new("/nonexistent/session.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("session.yaml"));
    }
}
