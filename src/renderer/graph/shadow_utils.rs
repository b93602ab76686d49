//! Shadow Utilities
//!
//! Pure math functions for cascaded shadow mapping, kept out of the pass
//! for reuse and testability.
//!
//! # Provided Functions
//!
//! - Cascade split computation (Practical Split Scheme)
//! - Frustum corner extraction in world space
//! - Orthographic VP matrix construction for CSM cascades

use glam::{Mat4, Vec3};

use super::context::CameraSlice;

/// Maximum cascade count for the shadow pass.
pub const MAX_CASCADES: u32 = 4;

// ============================================================================
// Cascade Split Computation
// ============================================================================

/// Computes cascade split distances using the Practical Split Scheme.
///
/// `lambda` blends between uniform (`0.0`) and logarithmic (`1.0`)
/// distribution. Returns the far distance of each cascade in view space.
#[must_use]
pub fn compute_cascade_splits(
    cascade_count: u32,
    near: f32,
    far: f32,
    lambda: f32,
) -> [f32; MAX_CASCADES as usize] {
    let mut splits = [0.0f32; MAX_CASCADES as usize];
    let n = cascade_count.min(MAX_CASCADES) as usize;

    for (i, split) in splits.iter_mut().enumerate().take(n) {
        let p = (i + 1) as f32 / n as f32;
        let log_split = near * (far / near).powf(p);
        let uni_split = near + (far - near) * p;
        *split = lambda * log_split + (1.0 - lambda) * uni_split;
    }

    // Ensure the last split reaches the far plane
    if n > 0 {
        splits[n - 1] = far;
    }

    splits
}

// ============================================================================
// Frustum Corners in World Space
// ============================================================================

/// Computes the 8 corners of a view-space frustum slice in world space.
///
/// Extracts FOV and aspect from the projection matrix, builds the slice
/// corners in view space and transforms them by the inverse view matrix.
#[must_use]
pub fn compute_frustum_corners_world(
    camera: &CameraSlice,
    slice_near: f32,
    slice_far: f32,
) -> [Vec3; 8] {
    let proj = camera.projection_matrix;
    let tan_half_fov = 1.0 / proj.y_axis.y;
    let aspect = proj.y_axis.y / proj.x_axis.x;

    let h_near = tan_half_fov * slice_near;
    let w_near = h_near * aspect;
    let h_far = tan_half_fov * slice_far;
    let w_far = h_far * aspect;

    // Corners in view space (RH: -Z is forward)
    let corners_view = [
        Vec3::new(-w_near, -h_near, -slice_near),
        Vec3::new(w_near, -h_near, -slice_near),
        Vec3::new(w_near, h_near, -slice_near),
        Vec3::new(-w_near, h_near, -slice_near),
        Vec3::new(-w_far, -h_far, -slice_far),
        Vec3::new(w_far, -h_far, -slice_far),
        Vec3::new(w_far, h_far, -slice_far),
        Vec3::new(-w_far, h_far, -slice_far),
    ];

    let inv_view = camera.view_matrix.inverse();
    let mut corners_world = [Vec3::ZERO; 8];
    for (i, c) in corners_view.iter().enumerate() {
        corners_world[i] = inv_view.transform_point3(*c);
    }
    corners_world
}

// ============================================================================
// CSM: Build Cascade VP Matrix
// ============================================================================

/// Builds an orthographic VP matrix for one shadow cascade.
///
/// Computes the light-space AABB of the frustum slice and snaps the ortho
/// bounds to the shadow texel grid to prevent shimmer under camera motion.
#[must_use]
pub fn build_cascade_vp(
    light_direction: Vec3,
    frustum_corners: &[Vec3; 8],
    shadow_map_size: u32,
    caster_extension: f32,
) -> Mat4 {
    let safe_dir = if light_direction.length_squared() > 1e-6 {
        light_direction.normalize()
    } else {
        -Vec3::Z
    };

    let mut center = Vec3::ZERO;
    for c in frustum_corners {
        center += *c;
    }
    center /= 8.0;

    let up = if safe_dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let light_view = Mat4::look_at_rh(center - safe_dir, center, up);

    // Light-space AABB of the slice
    let mut ls_min = Vec3::splat(f32::MAX);
    let mut ls_max = Vec3::splat(f32::MIN);
    for c in frustum_corners {
        let ls = light_view.transform_point3(*c);
        ls_min = ls_min.min(ls);
        ls_max = ls_max.max(ls);
    }

    // Expand Z to include casters between camera and light.
    // In RH light view, ls_max.z is near (towards light), ls_min.z is far.
    let base_z_range = (ls_max.z - ls_min.z).max(1.0);
    let near_extension = caster_extension.max(base_z_range);
    let far_extension = base_z_range.max(50.0);
    ls_max.z += near_extension;
    ls_min.z -= far_extension;

    // Texel alignment: snap the ortho bounds to the texel grid
    let world_units_per_texel_x = (ls_max.x - ls_min.x) / shadow_map_size as f32;
    let world_units_per_texel_y = (ls_max.y - ls_min.y) / shadow_map_size as f32;

    if world_units_per_texel_x > 0.0 {
        ls_min.x = (ls_min.x / world_units_per_texel_x).floor() * world_units_per_texel_x;
        ls_max.x = (ls_max.x / world_units_per_texel_x).ceil() * world_units_per_texel_x;
    }
    if world_units_per_texel_y > 0.0 {
        ls_min.y = (ls_min.y / world_units_per_texel_y).floor() * world_units_per_texel_y;
        ls_max.y = (ls_max.y / world_units_per_texel_y).ceil() * world_units_per_texel_y;
    }

    let proj = Mat4::orthographic_rh(
        ls_min.x, ls_max.x, ls_min.y, ls_max.y, -ls_max.z,
        -ls_min.z, // glam orthographic_rh: near/far are positive distances
    );

    proj * light_view
}
