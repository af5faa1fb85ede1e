use std::path::Path;

use anyhow::{Context, Result};
use glam::Mat4;
use learngl_camera::{Camera, Movement};
use learngl_shader::{HeadlessContext, RenderContext, Shader};
use serde::Serialize;

use crate::config::ProjectionConfig;

/// Input fed to the camera each frame of a scripted fly session.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyScript {
    pub frames: u32,
    pub delta_time: f32,
    pub keys: Vec<Movement>,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub scroll: f32,
    pub constrain_pitch: bool,
}

/// Run the same per-frame sequence a render loop would: held keys, then
/// pointer motion, then scroll.
pub fn fly(camera: &mut Camera, script: &FlyScript) {
    let _span = tracing::info_span!("fly", frames = script.frames).entered();
    for _ in 0..script.frames {
        for &key in &script.keys {
            camera.move_in(key, script.delta_time);
        }
        if script.mouse_dx != 0.0 || script.mouse_dy != 0.0 {
            camera.rotate(script.mouse_dx, script.mouse_dy, script.constrain_pitch);
        }
        if script.scroll != 0.0 {
            camera.scroll_zoom(script.scroll);
        }
    }
    tracing::debug!(position = ?camera.position(), zoom = camera.zoom(), "fly session finished");
}

/// Final camera state, printable or serializable as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseReport {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub front: [f32; 3],
    pub right: [f32; 3],
    pub up: [f32; 3],
    /// Column-major.
    pub view: [[f32; 4]; 4],
}

impl PoseReport {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            position: camera.position().to_array(),
            yaw: camera.yaw(),
            pitch: camera.pitch(),
            zoom: camera.zoom(),
            front: camera.front().to_array(),
            right: camera.right().to_array(),
            up: camera.up().to_array(),
            view: camera.view_matrix().to_cols_array_2d(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let [x, y, z] = self.position;
        out.push_str(&format!("position: ({x:.3}, {y:.3}, {z:.3})\n"));
        out.push_str(&format!(
            "yaw: {:.2}  pitch: {:.2}  zoom: {:.2}\n",
            self.yaw, self.pitch, self.zoom
        ));
        for (label, v) in [("front", self.front), ("right", self.right), ("up", self.up)] {
            out.push_str(&format!(
                "{label:>5}: ({:.3}, {:.3}, {:.3})\n",
                v[0], v[1], v[2]
            ));
        }
        out.push_str("view:\n");
        // print rows of the column-major matrix
        for row in 0..4 {
            out.push_str(&format!(
                "  [{:8.3} {:8.3} {:8.3} {:8.3}]\n",
                self.view[0][row], self.view[1][row], self.view[2][row], self.view[3][row]
            ));
        }
        out
    }
}

/// What happened to one matrix uniform during a shader check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniformStatus {
    pub name: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Uniforms the linked program declares, in location order.
    pub declared: Vec<String>,
    pub matrices: Vec<UniformStatus>,
}

/// Build the program on the headless backend and push the camera matrices
/// into it the way a frame would.
pub fn check_shaders(
    vertex: &Path,
    fragment: &Path,
    camera: &Camera,
    projection: &ProjectionConfig,
) -> Result<CheckReport> {
    let ctx = RenderContext::new(HeadlessContext::new());
    let shader = Shader::from_files(&ctx, vertex, fragment)?;
    shader.use_program();

    let matrices = [
        ("model", Mat4::IDENTITY),
        ("view", camera.view_matrix()),
        (
            "projection",
            camera.projection_matrix(projection.aspect, projection.near, projection.far),
        ),
    ];
    let mut statuses = Vec::with_capacity(matrices.len());
    for (name, value) in &matrices {
        shader
            .set_matrix4(name, value)
            .with_context(|| format!("uploading `{name}`"))?;
        statuses.push(UniformStatus {
            name: (*name).to_owned(),
            resolved: shader.uniform_location(name).is_some(),
        });
    }

    let report = CheckReport {
        declared: ctx.active_uniforms(shader.program()),
        matrices: statuses,
    };
    tracing::info!(
        declared = report.declared.len(),
        uploads = ctx.uploads().len(),
        "shader check passed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use learngl_shader::ShaderError;
    use std::io::Write;

    fn script() -> FlyScript {
        FlyScript {
            frames: 10,
            delta_time: 0.1,
            keys: Vec::new(),
            mouse_dx: 0.0,
            mouse_dy: 0.0,
            scroll: 0.0,
            constrain_pitch: true,
        }
    }

    fn source_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn fly_forward_moves_along_front() {
        let mut cam = Camera::default();
        fly(
            &mut cam,
            &FlyScript {
                keys: vec![Movement::Forward],
                ..script()
            },
        );
        // 10 frames * 0.1s * 2.5 units/s down -Z
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-4));
    }

    #[test]
    fn fly_look_up_saturates_pitch() {
        let mut cam = Camera::default();
        fly(
            &mut cam,
            &FlyScript {
                frames: 100,
                mouse_dy: 500.0,
                ..script()
            },
        );
        assert_eq!(cam.pitch(), 89.0);
    }

    #[test]
    fn fly_scroll_clamps_zoom() {
        let mut cam = Camera::default();
        fly(
            &mut cam,
            &FlyScript {
                scroll: 10.0,
                ..script()
            },
        );
        assert_eq!(cam.zoom(), 1.0);
    }

    #[test]
    fn pose_report_text_lists_basis() {
        let report = PoseReport::from_camera(&Camera::default());
        let text = report.render_text();
        assert!(text.contains("position: (0.000, 0.000, 3.000)"));
        assert!(text.contains("front"));
        assert!(text.contains("view:"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["zoom"], 45.0);
    }

    #[test]
    fn check_reports_resolved_matrices() {
        let vert = source_file(
            "#version 330 core\nuniform mat4 view;\nuniform mat4 projection;\nvoid main() {}\n",
        );
        let frag = source_file("#version 330 core\nout vec4 color;\nvoid main() {}\n");
        let report = check_shaders(
            vert.path(),
            frag.path(),
            &Camera::default(),
            &ProjectionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.declared, vec!["view", "projection"]);
        let resolved: Vec<_> = report.matrices.iter().map(|m| m.resolved).collect();
        assert_eq!(resolved, vec![false, true, true]);
    }

    #[test]
    fn shipped_cube_shaders_take_camera_matrices() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders");
        let report = check_shaders(
            &assets.join("cube.vert"),
            &assets.join("cube.frag"),
            &Camera::default(),
            &ProjectionConfig::default(),
        )
        .unwrap();
        assert_eq!(
            report.declared,
            vec!["model", "view", "projection", "texture1", "texture2"]
        );
        assert!(report.matrices.iter().all(|m| m.resolved));
    }

    #[test]
    fn check_surfaces_compile_error() {
        let vert = source_file("void main() {}\n");
        let frag = source_file("out vec4 color;\n");
        let err = check_shaders(
            vert.path(),
            frag.path(),
            &Camera::default(),
            &ProjectionConfig::default(),
        )
        .unwrap_err();
        let shader_err = err.downcast_ref::<ShaderError>().unwrap();
        assert!(matches!(shader_err, ShaderError::Compile { .. }));
    }
}
