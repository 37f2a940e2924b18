//! Rotation quaternions.
//!
//! `Quaternion` stores components in `(w, x, y, z)` order with `w` as the
//! scalar part. Rotation constructors produce unit quaternions; the
//! arithmetic operators work on arbitrary quaternions so that composition
//! and interpolation stay expressible.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};

use crate::angle::Radian;
use crate::arithmetic::float_equals;
use crate::error::MathError;
use crate::matrix::Matrix;
use crate::vector::Vec3;

/// Multiplication order for composing the per-axis rotations of an Euler
/// triple. As with quaternion products, the rightmost axis applies first:
/// `Zyx` is the product `z * y * x`, which rotates around X first and is
/// the yaw-pitch-roll convention used by the transform system.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationOrder {
    /// Product `x * y * z`.
    Xyz,
    /// Product `x * z * y`.
    Xzy,
    /// Product `y * x * z`.
    Yxz,
    /// Product `y * z * x`.
    Yzx,
    /// Product `z * x * y`.
    Zxy,
    /// Product `z * y * x` (yaw-pitch-roll).
    #[default]
    Zyx,
}

/// A rotation quaternion with scalar part `w` and vector part `(x, y, z)`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    /// Scalar (real) component.
    pub w: f32,
    /// X component of the vector part.
    pub x: f32,
    /// Y component of the vector part.
    pub y: f32,
    /// Z component of the vector part.
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// The identity rotation.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Creates a quaternion from raw components, scalar part first.
    #[must_use]
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Creates a quaternion from a scalar part and a vector part.
    #[must_use]
    pub const fn from_scalar_vector(scalar: f32, vector: Vec3) -> Self {
        Self::new(scalar, vector.x, vector.y, vector.z)
    }

    /// Unit quaternion rotating by `angle` around `axis`.
    ///
    /// The axis does not need to be unit length; it is normalized here.
    #[must_use]
    pub fn from_axis_angle(angle: Radian, axis: Vec3) -> Self {
        let half = angle / 2.0;
        let vector = axis.normalized() * half.sin();

        Self::from_scalar_vector(half.cos(), vector)
    }

    /// Unit quaternion from yaw (Y), pitch (X) and roll (Z) angles,
    /// composed in a single closed form.
    #[must_use]
    pub fn from_yaw_pitch_roll(yaw: Radian, pitch: Radian, roll: Radian) -> Self {
        let half_yaw = yaw / 2.0;
        let half_pitch = pitch / 2.0;
        let half_roll = roll / 2.0;

        let (cos_yaw, sin_yaw) = (half_yaw.cos(), half_yaw.sin());
        let (cos_pitch, sin_pitch) = (half_pitch.cos(), half_pitch.sin());
        let (cos_roll, sin_roll) = (half_roll.cos(), half_roll.sin());

        Self::new(
            cos_yaw * cos_pitch * cos_roll + sin_yaw * sin_pitch * sin_roll,
            cos_yaw * sin_pitch * cos_roll + sin_yaw * cos_pitch * sin_roll,
            sin_yaw * cos_pitch * cos_roll - cos_yaw * sin_pitch * sin_roll,
            cos_yaw * cos_pitch * sin_roll - sin_yaw * sin_pitch * cos_roll,
        )
    }

    /// Unit quaternion from per-axis Euler angles, applied in
    /// yaw-pitch-roll ([`RotationOrder::Zyx`]) order.
    #[must_use]
    pub fn from_euler(x: Radian, y: Radian, z: Radian) -> Self {
        Self::from_euler_ordered(x, y, z, RotationOrder::Zyx)
    }

    /// Unit quaternion from per-axis Euler angles applied in `order`.
    #[must_use]
    pub fn from_euler_ordered(x: Radian, y: Radian, z: Radian, order: RotationOrder) -> Self {
        let x_quat = Self::from_axis_angle(x, Vec3::right());
        let y_quat = Self::from_axis_angle(y, Vec3::up());
        let z_quat = Self::from_axis_angle(z, Vec3::front());

        match order {
            RotationOrder::Xyz => x_quat * y_quat * z_quat,
            RotationOrder::Xzy => x_quat * z_quat * y_quat,
            RotationOrder::Yxz => y_quat * x_quat * z_quat,
            RotationOrder::Yzx => y_quat * z_quat * x_quat,
            RotationOrder::Zxy => z_quat * x_quat * y_quat,
            RotationOrder::Zyx => z_quat * y_quat * x_quat,
        }
    }

    /// Extracts the rotation from the upper-left 3x3 block of `matrix`.
    ///
    /// The block is expected to be a pure rotation (orthonormal columns);
    /// scale must be divided out by the caller first. Uses the trace-based
    /// extraction, branching on the largest diagonal term for stability.
    pub fn from_rotation_matrix(matrix: &Matrix) -> Result<Self, MathError> {
        if matrix.rows() < 3 || matrix.cols() < 3 {
            return Err(MathError::InvalidArgument(
                "rotation extraction needs at least a 3x3 matrix",
            ));
        }

        Ok(Self::from_rotation_block(matrix))
    }

    // Shape-unchecked variant for callers that already hold a 4x4.
    pub(crate) fn from_rotation_block(matrix: &Matrix) -> Self {
        let m = |row: usize, col: usize| matrix[(row, col)];
        let trace = m(0, 0) + m(1, 1) + m(2, 2);

        let quat = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (m(2, 1) - m(1, 2)) / s,
                (m(0, 2) - m(2, 0)) / s,
                (m(1, 0) - m(0, 1)) / s,
            )
        } else if m(0, 0) > m(1, 1) && m(0, 0) > m(2, 2) {
            let s = (1.0 + m(0, 0) - m(1, 1) - m(2, 2)).sqrt() * 2.0;
            Self::new(
                (m(2, 1) - m(1, 2)) / s,
                0.25 * s,
                (m(0, 1) + m(1, 0)) / s,
                (m(0, 2) + m(2, 0)) / s,
            )
        } else if m(1, 1) > m(2, 2) {
            let s = (1.0 + m(1, 1) - m(0, 0) - m(2, 2)).sqrt() * 2.0;
            Self::new(
                (m(0, 2) - m(2, 0)) / s,
                (m(0, 1) + m(1, 0)) / s,
                0.25 * s,
                (m(1, 2) + m(2, 1)) / s,
            )
        } else {
            let s = (1.0 + m(2, 2) - m(0, 0) - m(1, 1)).sqrt() * 2.0;
            Self::new(
                (m(1, 0) - m(0, 1)) / s,
                (m(0, 2) + m(2, 0)) / s,
                (m(1, 2) + m(2, 1)) / s,
                0.25 * s,
            )
        };

        quat.normalized()
    }

    /// Shortest-arc rotation taking the direction of `from` to the
    /// direction of `to`.
    ///
    /// Opposite vectors have no unique shortest arc; a half-turn around an
    /// arbitrary perpendicular axis is returned.
    #[must_use]
    pub fn rotation_from_to(from: &Vec3, to: &Vec3) -> Self {
        let from = from.normalized();
        let to = to.normalized();
        let dot = from.dot(&to);

        if float_equals(dot, -1.0) {
            let mut axis = Vec3::right().cross(&from);

            if float_equals(axis.magnitude_squared(), 0.0) {
                axis = Vec3::up().cross(&from);
            }

            return Self::from_axis_angle(Radian::new(std::f32::consts::PI), axis);
        }

        let half = Self::from_scalar_vector(1.0 + dot, from.cross(&to));
        half.normalized()
    }

    /// The vector part.
    #[must_use]
    pub const fn vector(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Component at `index` in `(x, y, z, w)` order, or `OutOfRange`.
    pub fn get(&self, index: usize) -> Result<f32, MathError> {
        match index {
            0 => Ok(self.x),
            1 => Ok(self.y),
            2 => Ok(self.z),
            3 => Ok(self.w),
            _ => Err(MathError::OutOfRange { index, len: 4 }),
        }
    }

    /// Dot product over all four components.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared magnitude.
    #[must_use]
    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Whether the quaternion is unit length, within tolerance.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        float_equals(self.magnitude_squared(), 1.0)
    }

    /// The conjugate: same scalar part, negated vector part.
    #[must_use]
    pub fn conjugate(&self) -> Self {
        Self::from_scalar_vector(self.w, -self.vector())
    }

    /// The multiplicative inverse.
    ///
    /// For unit quaternions this equals the conjugate. The zero quaternion
    /// has no inverse and yields non-finite components.
    #[must_use]
    pub fn inverse(&self) -> Self {
        self.conjugate() / self.magnitude_squared()
    }

    /// Normalizes in place.
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Unit-length copy. The zero quaternion is returned unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let magnitude = self.magnitude();

        if magnitude == 0.0 {
            return *self;
        }

        *self / magnitude
    }

    /// Rotates `vector` by this quaternion via `q * (0, v) * q^-1`.
    #[must_use]
    pub fn rotate_vec3(&self, vector: &Vec3) -> Vec3 {
        (*self * Self::from_scalar_vector(0.0, *vector) * self.inverse()).vector()
    }

    /// Spherical linear interpolation toward `to` at parameter `t`.
    ///
    /// Follows the shortest arc (negates `to` when the dot product is
    /// negative) and falls back to normalized lerp when the quaternions are
    /// nearly parallel, where the sine denominator loses precision. `t` is
    /// unclamped.
    #[must_use]
    pub fn slerp(&self, to: &Self, t: f32) -> Self {
        let mut dot = self.dot(to);
        let mut to = *to;

        if dot < 0.0 {
            to = -to;
            dot = -dot;
        }

        if dot > 0.9995 {
            let lerped = *self + (to - *self) * t;
            return lerped.normalized();
        }

        let theta = dot.clamp(-1.0, 1.0).acos();
        let sin_theta = theta.sin();

        let from_weight = ((1.0 - t) * theta).sin() / sin_theta;
        let to_weight = (t * theta).sin() / sin_theta;

        (*self * from_weight + to * to_weight).normalized()
    }

    /// Euler angles `(x, y, z)` that reproduce this rotation when composed
    /// in yaw-pitch-roll order, i.e. via [`Quaternion::from_euler`].
    ///
    /// At the pitch singularity (`y = +-pi/2`) the x and z angles are not
    /// unique; the returned pair is one valid decomposition.
    #[must_use]
    pub fn to_euler(&self) -> [Radian; 3] {
        let q = self.normalized();

        let sin_pitch = 2.0 * (q.w * q.y - q.z * q.x);
        let x = (2.0 * (q.w * q.x + q.y * q.z)).atan2(1.0 - 2.0 * (q.x * q.x + q.y * q.y));
        let y = sin_pitch.clamp(-1.0, 1.0).asin();
        let z = (2.0 * (q.w * q.z + q.x * q.y)).atan2(1.0 - 2.0 * (q.y * q.y + q.z * q.z));

        [Radian::new(x), Radian::new(y), Radian::new(z)]
    }
}

impl PartialEq for Quaternion {
    fn eq(&self, other: &Self) -> bool {
        float_equals(self.w, other.w)
            && float_equals(self.x, other.x)
            && float_equals(self.y, other.y)
            && float_equals(self.z, other.z)
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product; `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Self) -> Self {
        let (s, a, b, c) = (self.w, self.x, self.y, self.z);

        Self::new(
            s * rhs.w - a * rhs.x - b * rhs.y - c * rhs.z,
            s * rhs.x + a * rhs.w + b * rhs.z - c * rhs.y,
            s * rhs.y - a * rhs.z + b * rhs.w + c * rhs.x,
            s * rhs.z + a * rhs.y - b * rhs.x + c * rhs.w,
        )
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for Quaternion {
    type Output = Self;

    /// Multiplication by the right-hand inverse.
    fn div(self, rhs: Self) -> Self {
        self * rhs.inverse()
    }
}

impl DivAssign for Quaternion {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Add for Quaternion {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.w + rhs.w, self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Quaternion {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Quaternion {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.w - rhs.w, self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Quaternion {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Quaternion {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.w * rhs, self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl MulAssign<f32> for Quaternion {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl Div<f32> for Quaternion {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.w / rhs, self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl DivAssign<f32> for Quaternion {
    fn div_assign(&mut self, rhs: f32) {
        *self = *self / rhs;
    }
}

impl Neg for Quaternion {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.w, -self.x, -self.y, -self.z)
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        f32::abs_diff_eq(&self.w, &other.w, epsilon)
            && f32::abs_diff_eq(&self.x, &other.x, epsilon)
            && f32::abs_diff_eq(&self.y, &other.y, epsilon)
            && f32::abs_diff_eq(&self.z, &other.z, epsilon)
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        f32::relative_eq(&self.w, &other.w, epsilon, max_relative)
            && f32::relative_eq(&self.x, &other.x, epsilon, max_relative)
            && f32::relative_eq(&self.y, &other.y, epsilon, max_relative)
            && f32::relative_eq(&self.z, &other.z, epsilon, max_relative)
    }
}
