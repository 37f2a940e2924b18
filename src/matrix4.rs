//! 4x4 homogeneous transform builders.
//!
//! Free functions constructing the standard spatial matrices: affine SRT
//! factors, rotation in its usual parameterizations, and the right-handed
//! camera/projection matrices. All results are 4x4 [`Matrix`] values.

use crate::angle::Radian;
use crate::matrix::Matrix;
use crate::quaternion::Quaternion;
use crate::vector::Vec3;

fn identity4() -> Matrix {
    let mut matrix = Matrix::zeroed(4, 4);

    for i in 0..4 {
        matrix[(i, i)] = 1.0;
    }

    matrix
}

/// Translation by `offset`.
#[must_use]
pub fn translation(offset: &Vec3) -> Matrix {
    let mut matrix = identity4();

    matrix[(0, 3)] = offset.x;
    matrix[(1, 3)] = offset.y;
    matrix[(2, 3)] = offset.z;

    matrix
}

/// Non-uniform scaling by `scale`.
#[must_use]
pub fn scaling(scale: &Vec3) -> Matrix {
    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = scale.x;
    matrix[(1, 1)] = scale.y;
    matrix[(2, 2)] = scale.z;
    matrix[(3, 3)] = 1.0;

    matrix
}

/// Rotation by a unit quaternion.
#[must_use]
pub fn rotation(quat: &Quaternion) -> Matrix {
    let q = quat.normalized();
    let (w, x, y, z) = (q.w, q.x, q.y, q.z);

    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = 1.0 - 2.0 * (y * y + z * z);
    matrix[(0, 1)] = 2.0 * (x * y - w * z);
    matrix[(0, 2)] = 2.0 * (x * z + w * y);

    matrix[(1, 0)] = 2.0 * (x * y + w * z);
    matrix[(1, 1)] = 1.0 - 2.0 * (x * x + z * z);
    matrix[(1, 2)] = 2.0 * (y * z - w * x);

    matrix[(2, 0)] = 2.0 * (x * z - w * y);
    matrix[(2, 1)] = 2.0 * (y * z + w * x);
    matrix[(2, 2)] = 1.0 - 2.0 * (x * x + y * y);

    matrix[(3, 3)] = 1.0;

    matrix
}

/// Rotation by `angle` around `axis` (Rodrigues formula).
///
/// The axis is normalized here.
#[must_use]
pub fn rotation_axis_angle(angle: Radian, axis: &Vec3) -> Matrix {
    let dir = axis.normalized();
    let cos = angle.cos();
    let sin = angle.sin();

    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = cos + dir.x * dir.x * (1.0 - cos);
    matrix[(0, 1)] = dir.x * dir.y * (1.0 - cos) - dir.z * sin;
    matrix[(0, 2)] = dir.x * dir.z * (1.0 - cos) + dir.y * sin;

    matrix[(1, 0)] = dir.y * dir.x * (1.0 - cos) + dir.z * sin;
    matrix[(1, 1)] = cos + dir.y * dir.y * (1.0 - cos);
    matrix[(1, 2)] = dir.y * dir.z * (1.0 - cos) - dir.x * sin;

    matrix[(2, 0)] = dir.z * dir.x * (1.0 - cos) - dir.y * sin;
    matrix[(2, 1)] = dir.z * dir.y * (1.0 - cos) + dir.x * sin;
    matrix[(2, 2)] = cos + dir.z * dir.z * (1.0 - cos);

    matrix[(3, 3)] = 1.0;

    matrix
}

/// Rotation from yaw (Y), pitch (X) and roll (Z) angles.
#[must_use]
pub fn rotation_ypr(yaw: Radian, pitch: Radian, roll: Radian) -> Matrix {
    let (cos_yaw, sin_yaw) = (yaw.cos(), yaw.sin());
    let (cos_pitch, sin_pitch) = (pitch.cos(), pitch.sin());
    let (cos_roll, sin_roll) = (roll.cos(), roll.sin());

    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = cos_yaw * cos_roll + sin_yaw * sin_pitch * sin_roll;
    matrix[(0, 1)] = -cos_yaw * sin_roll + sin_yaw * sin_pitch * cos_roll;
    matrix[(0, 2)] = sin_yaw * cos_pitch;

    matrix[(1, 0)] = sin_roll * cos_pitch;
    matrix[(1, 1)] = cos_roll * cos_pitch;
    matrix[(1, 2)] = -sin_pitch;

    matrix[(2, 0)] = -sin_yaw * cos_roll + cos_yaw * sin_pitch * sin_roll;
    matrix[(2, 1)] = sin_roll * sin_yaw + cos_yaw * sin_pitch * cos_roll;
    matrix[(2, 2)] = cos_yaw * cos_pitch;

    matrix[(3, 3)] = 1.0;

    matrix
}

/// Rotation from per-axis Euler angles, mapping x to pitch, y to roll and
/// z to yaw.
#[must_use]
pub fn rotation_euler(x: Radian, y: Radian, z: Radian) -> Matrix {
    rotation_ypr(z, x, y)
}

/// Shortest-arc rotation taking the direction of `from` to the direction
/// of `to`.
///
/// Parallel inputs yield the identity; anti-parallel inputs yield a point
/// reflection, which flips handedness but maps the direction correctly.
#[must_use]
pub fn rotation_from_to(from: &Vec3, to: &Vec3) -> Matrix {
    let from_dir = from.normalized();
    let to_dir = to.normalized();

    if to_dir == from_dir {
        return identity4();
    }

    if to_dir == -from_dir {
        return scaling(&Vec3::uniform(-1.0));
    }

    let axis = from_dir.cross(&to_dir);
    let cos = from_dir.dot(&to_dir);
    let k = 1.0 / (1.0 + cos);

    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = axis.x * axis.x * k + cos;
    matrix[(0, 1)] = axis.y * axis.x * k - axis.z;
    matrix[(0, 2)] = axis.z * axis.x * k + axis.y;

    matrix[(1, 0)] = axis.x * axis.y * k + axis.z;
    matrix[(1, 1)] = axis.y * axis.y * k + cos;
    matrix[(1, 2)] = axis.z * axis.y * k - axis.x;

    matrix[(2, 0)] = axis.x * axis.z * k - axis.y;
    matrix[(2, 1)] = axis.y * axis.z * k + axis.x;
    matrix[(2, 2)] = axis.z * axis.z * k + cos;

    matrix[(3, 3)] = 1.0;

    matrix
}

/// Right-handed orthographic projection onto the given box.
#[must_use]
pub fn orthographic(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Matrix {
    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = 2.0 / (right - left);
    matrix[(0, 3)] = (right + left) / (left - right);

    matrix[(1, 1)] = 2.0 / (top - bottom);
    matrix[(1, 3)] = (top + bottom) / (bottom - top);

    matrix[(2, 2)] = 2.0 / (near - far);
    matrix[(2, 3)] = (far + near) / (near - far);

    matrix[(3, 3)] = 1.0;

    matrix
}

/// Right-handed perspective projection from a vertical field of view.
#[must_use]
pub fn perspective(fov_y: Radian, aspect: f32, near: f32, far: f32) -> Matrix {
    let tan_half_fov_y = (fov_y * 0.5).tan();

    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = 1.0 / (aspect * tan_half_fov_y);
    matrix[(1, 1)] = 1.0 / tan_half_fov_y;
    matrix[(2, 2)] = (far + near) / (near - far);
    matrix[(2, 3)] = (2.0 * far * near) / (near - far);
    matrix[(3, 2)] = -1.0;

    matrix
}

/// Right-handed view matrix looking from `eye` toward `center`.
#[must_use]
pub fn look_at(eye: &Vec3, center: &Vec3, up: &Vec3) -> Matrix {
    let forward = (*center - *eye).normalized();
    let side = forward.cross(up).normalized();
    let view_up = side.cross(&forward);

    let mut matrix = Matrix::zeroed(4, 4);

    matrix[(0, 0)] = side.x;
    matrix[(0, 1)] = side.y;
    matrix[(0, 2)] = side.z;
    matrix[(0, 3)] = -side.dot(eye);

    matrix[(1, 0)] = view_up.x;
    matrix[(1, 1)] = view_up.y;
    matrix[(1, 2)] = view_up.z;
    matrix[(1, 3)] = -view_up.dot(eye);

    matrix[(2, 0)] = -forward.x;
    matrix[(2, 1)] = -forward.y;
    matrix[(2, 2)] = -forward.z;
    matrix[(2, 3)] = forward.dot(eye);

    matrix[(3, 3)] = 1.0;

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec4;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1.0e-5;

    fn apply(matrix: &Matrix, point: Vec3) -> Vec3 {
        matrix.transform_vec4(&Vec4::from_point(point)).unwrap().xyz()
    }

    #[test]
    fn test_translation_moves_points_not_directions() {
        let matrix = translation(&Vec3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(
            apply(&matrix, Vec3::zero()),
            Vec3::new(1.0, 2.0, 3.0),
            epsilon = EPSILON
        );

        let direction = matrix
            .transform_vec4(&Vec4::from_direction(Vec3::new(5.0, 0.0, 0.0)))
            .unwrap();
        assert_relative_eq!(direction.xyz(), Vec3::new(5.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_scaling() {
        let matrix = scaling(&Vec3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(
            apply(&matrix, Vec3::one()),
            Vec3::new(2.0, 3.0, 4.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_quaternion_and_axis_angle_rotations_agree() {
        let angle = Radian::new(1.1);
        let axis = Vec3::new(1.0, 2.0, -0.5);

        let from_quat = rotation(&Quaternion::from_axis_angle(angle, axis));
        let from_rodrigues = rotation_axis_angle(angle, &axis);

        assert_relative_eq!(from_quat, from_rodrigues, epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_matches_quaternion_application() {
        let quat = Quaternion::from_euler(Radian::new(0.3), Radian::new(-0.9), Radian::new(1.7));
        let matrix = rotation(&quat);
        let point = Vec3::new(1.0, -2.0, 0.5);

        assert_relative_eq!(
            apply(&matrix, point),
            quat.rotate_vec3(&point),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_rotation_ypr_quarter_yaw() {
        let matrix = rotation_ypr(Radian::new(PI / 2.0), Radian::new(0.0), Radian::new(0.0));
        assert_relative_eq!(apply(&matrix, Vec3::right()), Vec3::back(), epsilon = EPSILON);
        assert_relative_eq!(apply(&matrix, Vec3::up()), Vec3::up(), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_from_to() {
        let matrix = rotation_from_to(&Vec3::right(), &Vec3::up());
        assert_relative_eq!(apply(&matrix, Vec3::right()), Vec3::up(), epsilon = EPSILON);

        assert!(rotation_from_to(&Vec3::up(), &Vec3::up()).is_identity());

        let flipped = rotation_from_to(&Vec3::up(), &Vec3::down());
        assert_relative_eq!(apply(&flipped, Vec3::up()), Vec3::down(), epsilon = EPSILON);
    }

    #[test]
    fn test_orthographic_maps_box_to_unit_cube() {
        let matrix = orthographic(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);

        // The near plane (z = 0 here) lands on -1, the far plane on +1.
        assert_relative_eq!(
            apply(&matrix, Vec3::new(-2.0, -1.0, 0.0)),
            Vec3::new(-1.0, -1.0, -1.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            apply(&matrix, Vec3::new(2.0, 1.0, -10.0)),
            Vec3::new(1.0, 1.0, 1.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_perspective_scales_with_depth() {
        let matrix = perspective(Radian::from_degrees(90.0), 1.0, 0.1, 100.0);

        let clip = matrix
            .transform_vec4(&Vec4::from_point(Vec3::new(1.0, 0.0, -1.0)))
            .unwrap();
        // w receives the (negated) view-space depth.
        assert_relative_eq!(clip.w, 1.0, epsilon = EPSILON);
        assert_relative_eq!(clip.x / clip.w, 1.0, epsilon = 1.0e-4);
    }

    #[test]
    fn test_look_at_centers_the_target() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let matrix = look_at(&eye, &Vec3::zero(), &Vec3::up());

        // The eye maps to the origin, the target onto the -Z axis.
        assert_relative_eq!(apply(&matrix, eye), Vec3::zero(), epsilon = EPSILON);

        let target_view = apply(&matrix, Vec3::zero());
        assert_relative_eq!(target_view, Vec3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }
}
