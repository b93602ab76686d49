//! Per-frame context.
//!
//! Everything the frame graph consumes from outside per frame: timing,
//! viewport, the active camera's matrices and the primary light direction.
//! The scene itself never crosses this boundary; scene traversal hands the
//! graph compiled tasks instead.

use glam::{Mat4, Vec3};

use crate::renderer::backend::Extent;

/// The slice of camera state the frame graph needs.
#[derive(Clone, Copy, Debug)]
pub struct CameraSlice {
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub near: f32,
    pub far: f32,
}

impl CameraSlice {
    /// A unit camera at the origin, useful as a headless placeholder.
    #[must_use]
    pub fn identity(near: f32, far: f32) -> Self {
        Self {
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, near, far),
            near,
            far,
        }
    }
}

/// Per-frame inbound data from the game loop.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub delta_time: f32,
    pub viewport: Extent,
    pub camera: CameraSlice,
    /// World-space direction the primary shadow-casting light shines.
    pub light_direction: Vec3,
}

impl FrameContext {
    #[must_use]
    pub fn new(delta_time: f32, viewport: Extent, camera: CameraSlice) -> Self {
        Self {
            delta_time,
            viewport,
            camera,
            light_direction: -Vec3::Y,
        }
    }

    #[must_use]
    pub fn with_light_direction(mut self, direction: Vec3) -> Self {
        self.light_direction = direction;
        self
    }
}
