use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;

/// Pitch limit in degrees applied when a rotation asks for it.
pub const MAX_PITCH: f32 = 89.0;
/// Narrowest field of view in degrees.
pub const MIN_ZOOM: f32 = 1.0;
/// Widest field of view in degrees.
pub const MAX_ZOOM: f32 = 45.0;

/// Discrete movement directions, relative to the camera orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Fly camera with position, yaw/pitch orientation and zoom.
///
/// Angles are in degrees. The basis vectors are private and only ever
/// written by [`Camera::update_basis`], so they can never disagree with the
/// angles they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    /// Camera at `position` looking along yaw/pitch, with default speed,
    /// sensitivity and zoom.
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let defaults = CameraConfig::default();
        Self::from_config(&CameraConfig {
            position,
            world_up,
            yaw,
            pitch,
            ..defaults
        })
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: config.position,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: config.world_up.normalize(),
            yaw: config.yaw,
            pitch: config.pitch,
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            zoom: config.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
        camera.update_basis();
        tracing::debug!(
            position = ?camera.position,
            yaw = camera.yaw,
            pitch = camera.pitch,
            "camera created"
        );
        camera
    }

    /// Look-at transform from `position` toward `position + front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// OpenGL-style perspective projection using the current zoom as the
    /// vertical field of view.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.zoom.to_radians(), aspect, near, far)
    }

    /// Translate along the current basis by `movement_speed * delta_time`.
    pub fn move_in(&mut self, direction: Movement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Apply a pointer delta. `x_delta` turns yaw, `y_delta` turns pitch.
    ///
    /// With `constrain_pitch` unset the camera may pass the poles, where
    /// `right` degenerates.
    pub fn rotate(&mut self, x_delta: f32, y_delta: f32, constrain_pitch: bool) {
        self.yaw += x_delta * self.mouse_sensitivity;
        self.pitch += y_delta * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
        }

        self.update_basis();
    }

    /// Narrow (positive delta) or widen (negative delta) the field of view.
    pub fn scroll_zoom(&mut self, y_delta: f32) {
        self.zoom = (self.zoom - y_delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.movement_speed = speed;
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.mouse_sensitivity = sensitivity;
    }

    fn update_basis(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();

        self.front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
