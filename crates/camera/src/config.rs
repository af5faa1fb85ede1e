use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Initial pose and tuning for a [`Camera`](crate::Camera).
///
/// Every field has a default, so a config file only needs to name the values
/// it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Reference "up" axis; normalized when the camera is built.
    pub world_up: Vec3,
    /// Degrees. -90 faces down -Z.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    /// World units per second.
    pub movement_speed: f32,
    /// Degrees per pointer unit.
    pub mouse_sensitivity: f32,
    /// Initial field of view in degrees.
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: CameraConfig = serde_yaml::from_str("yaw: 0.0\nposition: [1.0, 2.0, 3.0]\n").unwrap();
        assert_eq!(cfg.yaw, 0.0);
        assert_eq!(cfg.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cfg.movement_speed, 2.5);
        assert_eq!(cfg.zoom, 45.0);
    }

    #[test]
    fn empty_document_is_default() {
        let cfg: CameraConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, CameraConfig::default());
    }
}
