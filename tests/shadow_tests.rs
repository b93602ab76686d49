//! Shadow Algorithm Tests
//!
//! Tests for:
//! - Cascade split computation (Practical Split Scheme)
//! - Frustum corners extraction in world space
//! - Cascade VP matrix construction correctness

use glam::{Mat4, Vec3};

use vesper::renderer::graph::shadow_utils::*;
use vesper::CameraSlice;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn test_camera(near: f32, far: f32) -> CameraSlice {
    CameraSlice {
        view_matrix: Mat4::look_at_rh(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO, Vec3::Y),
        projection_matrix: Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, near, far),
        near,
        far,
    }
}

// ============================================================================
// compute_cascade_splits Tests
// ============================================================================

#[test]
fn cascade_splits_last_equals_far() {
    let splits = compute_cascade_splits(4, 0.1, 100.0, 0.5);
    assert!(
        approx(splits[3], 100.0),
        "Last split should equal far plane, got {}",
        splits[3]
    );
}

#[test]
fn cascade_splits_monotonically_increasing() {
    let splits = compute_cascade_splits(4, 0.1, 100.0, 0.5);
    for i in 1..4 {
        assert!(
            splits[i] > splits[i - 1],
            "Splits should be monotonically increasing: splits[{}]={} <= splits[{}]={}",
            i,
            splits[i],
            i - 1,
            splits[i - 1]
        );
    }
}

#[test]
fn cascade_splits_uniform_when_lambda_zero() {
    let splits = compute_cascade_splits(4, 0.1, 100.0, 0.0);
    assert!(approx(splits[0], 25.075), "got {}", splits[0]);
    assert!(approx(splits[1], 50.05), "got {}", splits[1]);
    assert!(approx(splits[2], 75.025), "got {}", splits[2]);
    assert!(approx(splits[3], 100.0), "got {}", splits[3]);
}

#[test]
fn cascade_splits_respect_requested_count() {
    let splits = compute_cascade_splits(2, 0.1, 60.0, 0.5);
    assert!(approx(splits[1], 60.0), "got {}", splits[1]);
    assert!(
        approx(splits[2], 0.0) && approx(splits[3], 0.0),
        "unused cascade entries stay zero"
    );
}

// ============================================================================
// compute_frustum_corners_world Tests
// ============================================================================

#[test]
fn frustum_corners_straddle_the_slice_planes() {
    let camera = test_camera(0.1, 100.0);
    let corners = compute_frustum_corners_world(&camera, 1.0, 10.0);

    // Transform back to view space: near face at z=-1, far face at z=-10.
    for (i, corner) in corners.iter().enumerate() {
        let view = camera.view_matrix.transform_point3(*corner);
        let expected_z = if i < 4 { -1.0 } else { -10.0 };
        assert!(
            approx(view.z, expected_z),
            "corner {} expected view z {}, got {}",
            i,
            expected_z,
            view.z
        );
    }
}

#[test]
fn far_face_is_wider_than_near_face() {
    let camera = test_camera(0.1, 100.0);
    let corners = compute_frustum_corners_world(&camera, 1.0, 20.0);

    let near_width = corners[0].distance(corners[1]);
    let far_width = corners[4].distance(corners[5]);
    assert!(
        far_width > near_width,
        "perspective frusta widen with distance: near {near_width}, far {far_width}"
    );
}

// ============================================================================
// build_cascade_vp Tests
// ============================================================================

#[test]
fn cascade_vp_contains_the_frustum_slice() {
    let camera = test_camera(0.1, 100.0);
    let corners = compute_frustum_corners_world(&camera, 0.1, 25.0);
    let light_vp = build_cascade_vp(Vec3::new(-0.5, -1.0, -0.3), &corners, 2048, 50.0);

    for corner in &corners {
        let clip = light_vp.project_point3(*corner);
        assert!(
            clip.x.abs() <= 1.0 + EPSILON && clip.y.abs() <= 1.0 + EPSILON,
            "slice corner must project inside the ortho bounds, got {clip:?}"
        );
        assert!(
            (-EPSILON..=1.0 + EPSILON).contains(&clip.z),
            "slice corner must land inside the depth range, got {}",
            clip.z
        );
    }
}

#[test]
fn cascade_vp_survives_degenerate_light_direction() {
    let camera = test_camera(0.1, 100.0);
    let corners = compute_frustum_corners_world(&camera, 0.1, 25.0);
    let light_vp = build_cascade_vp(Vec3::ZERO, &corners, 2048, 50.0);

    assert!(
        light_vp.is_finite(),
        "a zero light direction falls back to a safe axis"
    );
}

#[test]
fn cascade_vp_is_stable_under_subtexel_camera_motion() {
    let camera = test_camera(0.1, 100.0);
    let light_dir = Vec3::new(-0.5, -1.0, -0.3);
    let corners = compute_frustum_corners_world(&camera, 0.1, 25.0);
    let vp_a = build_cascade_vp(light_dir, &corners, 2048, 50.0);

    // Shift every corner by far less than one texel; the snapped ortho
    // bounds should not change.
    let mut nudged = corners;
    for c in &mut nudged {
        *c += Vec3::splat(1e-5);
    }
    let vp_b = build_cascade_vp(light_dir, &nudged, 2048, 50.0);

    let diff = vp_a
        .to_cols_array()
        .iter()
        .zip(vp_b.to_cols_array().iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max);
    assert!(diff < 1e-2, "texel snapping should absorb tiny motion, diff {diff}");
}
