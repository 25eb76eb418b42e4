//! Numeric helpers shared by the camera, scene and renderer crates.
//!
//! All matrices are glam column-major homogeneous transforms, so `a * b`
//! applies `b` first and then `a`.

mod color;

pub use color::{ColorError, parse_hex_color};
pub use glam::{Mat3, Mat4, Vec3, Vec4};

/// Principal axis for [`rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotation of `angle` radians about a single principal axis.
pub fn rotate(axis: Axis, angle: f32) -> Mat4 {
    match axis {
        Axis::X => Mat4::from_rotation_x(angle),
        Axis::Y => Mat4::from_rotation_y(angle),
        Axis::Z => Mat4::from_rotation_z(angle),
    }
}

/// View matrix looking from `eye` towards `target`.
///
/// The basis is `z = normalize(eye - target)`, `x = normalize(up × z)`,
/// `y = z × x`; the translation column holds `-dot(axis, eye)` for each axis.
/// Degenerate when `eye == target` or `up` is parallel to the view direction.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let z_axis = (eye - target).normalize();
    let x_axis = up.cross(z_axis).normalize();
    let y_axis = z_axis.cross(x_axis);

    Mat4::from_cols(
        Vec4::new(x_axis.x, y_axis.x, z_axis.x, 0.0),
        Vec4::new(x_axis.y, y_axis.y, z_axis.y, 0.0),
        Vec4::new(x_axis.z, y_axis.z, z_axis.z, 0.0),
        Vec4::new(-x_axis.dot(eye), -y_axis.dot(eye), -z_axis.dot(eye), 1.0),
    )
}

/// Symmetric right-handed frustum with depth mapped to `[0, 1]`.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y, aspect, near, far)
}

/// Box of `width` × `height` centred on the view axis, covering `[0, depth]`
/// in front of the eye.
pub fn orthographic(width: f32, height: f32, depth: f32) -> Mat4 {
    let half_w = width * 0.5;
    let half_h = height * 0.5;
    Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, 0.0, depth)
}

/// Upper 3×3 of `transpose(inverse(model_view))`.
///
/// Keeps normals perpendicular to surfaces under non-uniform scaling.
pub fn normal_matrix(model_view: Mat4) -> Mat3 {
    Mat3::from_mat4(model_view.inverse().transpose())
}

/// `m · [p, 1]`, dropping w.
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    (m * p.extend(1.0)).truncate()
}

/// `m · [v, 0]`, dropping w.
pub fn transform_direction(m: Mat4, v: Vec3) -> Vec3 {
    (m * v.extend(0.0)).truncate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f32 = 1e-5;

    fn sample() -> Mat4 {
        Mat4::from_translation(Vec3::new(1.0, -2.0, 3.5))
            * rotate(Axis::Y, 0.7)
            * rotate(Axis::X, -0.3)
            * Mat4::from_scale(Vec3::new(2.0, 0.5, 1.5))
    }

    #[test]
    fn identity_is_neutral_for_multiplication() {
        let m = sample();
        assert!((Mat4::IDENTITY * m).abs_diff_eq(m, EPS));
        assert!((m * Mat4::IDENTITY).abs_diff_eq(m, EPS));
    }

    #[test]
    fn inverse_composes_to_identity() {
        let m = sample();
        assert!((m * m.inverse()).abs_diff_eq(Mat4::IDENTITY, 1e-4));
        assert!((m.inverse() * m).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn multiplication_applies_right_operand_first() {
        let t = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let r = rotate(Axis::Z, FRAC_PI_2);
        let p = Vec3::X;

        assert!(transform_point(t * r, p).abs_diff_eq(Vec3::new(5.0, 1.0, 0.0), EPS));
        assert!(transform_point(r * t, p).abs_diff_eq(Vec3::new(0.0, 6.0, 0.0), EPS));
    }

    #[test]
    fn look_at_maps_eye_to_origin() {
        let eye = Vec3::new(0.0, 13.0, -18.0);
        let target = Vec3::new(0.0, 2.0, 0.0);
        let view = look_at(eye, target, Vec3::Y);

        assert!(transform_point(view, eye).abs_diff_eq(Vec3::ZERO, 1e-4));

        let z_axis = (eye - target).normalize();
        let x_axis = Vec3::Y.cross(z_axis).normalize();
        let y_axis = z_axis.cross(x_axis);
        let translation = view.w_axis.truncate();
        assert!(
            translation.abs_diff_eq(
                Vec3::new(-x_axis.dot(eye), -y_axis.dot(eye), -z_axis.dot(eye)),
                EPS
            )
        );
    }

    #[test]
    fn look_at_points_target_down_negative_z() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let target = Vec3::new(-1.0, 0.5, 2.0);
        let view = look_at(eye, target, Vec3::Y);
        let in_view = transform_point(view, target);

        assert!(in_view.x.abs() < 1e-4);
        assert!(in_view.y.abs() < 1e-4);
        assert!((in_view.z + (eye - target).length()).abs() < 1e-4);
        assert!(view.abs_diff_eq(Mat4::look_at_rh(eye, target, Vec3::Y), EPS));
    }

    #[test]
    fn perspective_uses_inverse_tangent_of_half_fov() {
        let m = perspective(FRAC_PI_4, 2.0, 0.5, 100.0);
        let f = 1.0 / (FRAC_PI_4 / 2.0).tan();

        assert!((m.x_axis.x - f / 2.0).abs() < EPS);
        assert!((m.y_axis.y - f).abs() < EPS);
        assert_eq!(m.z_axis.w, -1.0);

        let near = m * Vec4::new(0.0, 0.0, -0.5, 1.0);
        let far = m * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn orthographic_maps_box_to_clip_volume() {
        let m = orthographic(20.0, 10.0, 50.0);
        let corner = m * Vec4::new(10.0, 5.0, -50.0, 1.0);
        assert!(corner.truncate().abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), EPS));
        let centre = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(centre.truncate().abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn rotate_about_y_matches_column_layout() {
        let (s, c) = 0.4_f32.sin_cos();
        let m = rotate(Axis::Y, 0.4);
        assert!(m.x_axis.abs_diff_eq(Vec4::new(c, 0.0, -s, 0.0), EPS));
        assert!(m.z_axis.abs_diff_eq(Vec4::new(s, 0.0, c, 0.0), EPS));
        assert!(transform_direction(rotate(Axis::X, FRAC_PI_2), Vec3::Y).abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn normal_matrix_corrects_non_uniform_scale() {
        let model_view = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        let surface_normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let tangent = Vec3::new(1.0, -1.0, 0.0);

        let n = normal_matrix(model_view) * surface_normal;
        let t = transform_direction(model_view, tangent);
        assert!(n.dot(t).abs() < EPS);
    }

    #[test]
    fn normal_matrix_of_rigid_transform_is_its_rotation() {
        let model_view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * rotate(Axis::Z, 0.9);
        let expected = Mat3::from_mat4(rotate(Axis::Z, 0.9));
        assert!(normal_matrix(model_view).abs_diff_eq(expected, EPS));
    }
}
