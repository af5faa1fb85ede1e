//! Free-fly camera driven by yaw/pitch Euler angles.
//!
//! The camera stores its orientation as two angles and re-derives the
//! front/right/up basis from them on every rotation. It produces a view
//! matrix and a zoom (field of view) for whatever renders the scene.
//!
//! # Invariants
//! - `front`, `right` and `up` are a right-handed orthonormal basis matching
//!   the current yaw and pitch after every public operation.
//! - Zoom stays within [`MIN_ZOOM`, `MAX_ZOOM`].
//! - No operation fails; out-of-range input is clamped, never rejected.

mod camera;
mod config;

pub use camera::{Camera, Movement, MAX_PITCH, MAX_ZOOM, MIN_ZOOM};
pub use config::CameraConfig;

pub fn crate_info() -> &'static str {
    "learngl-camera v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("camera"));
    }
}
