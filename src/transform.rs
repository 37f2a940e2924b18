//! Spatial transforms composed of position, rotation and scale.
//!
//! `Transform` is a plain value type: it owns a local SRT triple plus the
//! matching local matrix, and a world-space mirror of both. The two sides
//! never drift; every mutation regenerates the affected matrix and
//! re-derives the other side immediately. On its own a `Transform` behaves
//! as a root (world state equals local state); hierarchy bookkeeping lives
//! in [`crate::scene::TransformGraph`], which feeds parent world matrices
//! into the crate-internal refresh hooks.

use std::ops::{Mul, MulAssign};

use approx::{AbsDiffEq, RelativeEq};

use crate::angle::Radian;
use crate::error::MathError;
use crate::matrix::Matrix;
use crate::matrix4;
use crate::quaternion::{Quaternion, RotationOrder};
use crate::vector::{Vec3, Vec4};

/// A local/world pair of scale-rotation-translation states with their
/// composed matrices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    position: Vec3,
    rotation: Quaternion,
    scale: Vec3,
    matrix: Matrix,

    world_position: Vec3,
    world_rotation: Quaternion,
    world_scale: Vec3,
    world_matrix: Matrix,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform: zero position, identity rotation, unit scale.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity(), Vec3::one())
    }

    /// Creates a transform from local position, rotation and scale.
    #[must_use]
    pub fn new(position: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        let matrix = Self::generate_matrix(&position, &rotation, &scale);

        let mut transform = Self {
            position,
            rotation,
            scale,
            matrix: matrix.clone(),
            world_position: position,
            world_rotation: rotation,
            world_scale: scale,
            world_matrix: matrix,
        };

        transform.refresh_world(None);
        transform
    }

    /// Creates a transform from local position, Euler angles
    /// (yaw-pitch-roll order) and scale.
    #[must_use]
    pub fn from_euler(position: Vec3, euler: [Radian; 3], scale: Vec3) -> Self {
        Self::new(
            position,
            Quaternion::from_euler(euler[0], euler[1], euler[2]),
            scale,
        )
    }

    /// Creates a transform by decomposing a 4x4 matrix.
    pub fn from_matrix(matrix: Matrix) -> Result<Self, MathError> {
        let (position, rotation, scale) = Self::decompose_matrix(&matrix)?;

        let mut transform = Self {
            position,
            rotation,
            scale,
            matrix: matrix.clone(),
            world_position: position,
            world_rotation: rotation,
            world_scale: scale,
            world_matrix: matrix,
        };

        transform.refresh_world(None);
        Ok(transform)
    }

    /// Composes position, rotation and scale into a 4x4 matrix, in fixed
    /// translation x rotation x scaling order.
    #[must_use]
    pub fn generate_matrix(position: &Vec3, rotation: &Quaternion, scale: &Vec3) -> Matrix {
        let translation = matrix4::translation(position);
        let rotation = matrix4::rotation(rotation);
        let scaling = matrix4::scaling(scale);

        &(&translation * &rotation) * &scaling
    }

    /// Splits a 4x4 transform matrix back into position, rotation and
    /// scale.
    ///
    /// Position comes from the last column, scale from the basis-column
    /// magnitudes, rotation from the normalized basis. A zero-magnitude
    /// column is left unnormalized, so the extracted rotation is only
    /// meaningful for non-degenerate scale.
    pub fn decompose_matrix(matrix: &Matrix) -> Result<(Vec3, Quaternion, Vec3), MathError> {
        if matrix.shape() != (4, 4) {
            return Err(MathError::IncompatibleShape {
                lhs: matrix.shape(),
                rhs: (4, 4),
            });
        }

        Ok(Self::decompose4(matrix))
    }

    // Shape-unchecked decomposition for the internally generated matrices.
    fn decompose4(matrix: &Matrix) -> (Vec3, Quaternion, Vec3) {
        let position = Vec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);

        let mut columns = [
            Vec3::new(matrix[(0, 0)], matrix[(1, 0)], matrix[(2, 0)]),
            Vec3::new(matrix[(0, 1)], matrix[(1, 1)], matrix[(2, 1)]),
            Vec3::new(matrix[(0, 2)], matrix[(1, 2)], matrix[(2, 2)]),
        ];

        let scale = Vec3::new(
            columns[0].magnitude(),
            columns[1].magnitude(),
            columns[2].magnitude(),
        );

        for (column, magnitude) in columns.iter_mut().zip([scale.x, scale.y, scale.z]) {
            if magnitude > 0.0 {
                *column = *column / magnitude;
            }
        }

        let mut basis = Matrix::zeroed(3, 3);

        for (col, column) in columns.iter().enumerate() {
            basis[(0, col)] = column.x;
            basis[(1, col)] = column.y;
            basis[(2, col)] = column.z;
        }

        (position, Quaternion::from_rotation_block(&basis), scale)
    }

    /// Local position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation.
    #[must_use]
    pub const fn rotation(&self) -> Quaternion {
        self.rotation
    }

    /// Local scale.
    #[must_use]
    pub const fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Local transform matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// World position.
    #[must_use]
    pub const fn world_position(&self) -> Vec3 {
        self.world_position
    }

    /// World rotation.
    #[must_use]
    pub const fn world_rotation(&self) -> Quaternion {
        self.world_rotation
    }

    /// World scale.
    #[must_use]
    pub const fn world_scale(&self) -> Vec3 {
        self.world_scale
    }

    /// World transform matrix.
    #[must_use]
    pub const fn world_matrix(&self) -> &Matrix {
        &self.world_matrix
    }

    /// Sets the local position.
    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self.regenerate_local()
    }

    /// Sets the local rotation.
    pub fn set_rotation(&mut self, rotation: Quaternion) -> &mut Self {
        self.rotation = rotation;
        self.regenerate_local()
    }

    /// Sets the local rotation from Euler angles in yaw-pitch-roll order.
    pub fn set_euler(&mut self, euler: [Radian; 3]) -> &mut Self {
        self.set_rotation(Quaternion::from_euler(euler[0], euler[1], euler[2]))
    }

    /// Sets the local rotation from Euler angles in an explicit order.
    pub fn set_euler_ordered(&mut self, euler: [Radian; 3], order: RotationOrder) -> &mut Self {
        self.set_rotation(Quaternion::from_euler_ordered(
            euler[0], euler[1], euler[2], order,
        ))
    }

    /// Sets the local scale.
    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self.regenerate_local()
    }

    /// Replaces the local matrix, re-deriving position, rotation and scale.
    pub fn set_matrix(&mut self, matrix: Matrix) -> Result<&mut Self, MathError> {
        let (position, rotation, scale) = Self::decompose_matrix(&matrix)?;

        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self.matrix = matrix;
        self.refresh_world(None);

        Ok(self)
    }

    /// Moves the local position by `translation`.
    pub fn translate(&mut self, translation: Vec3) -> &mut Self {
        self.set_position(self.position + translation)
    }

    /// Post-composes `rotation` onto the local rotation.
    pub fn rotate(&mut self, rotation: Quaternion) -> &mut Self {
        self.set_rotation(self.rotation * rotation)
    }

    /// Post-composes an Euler rotation (yaw-pitch-roll order).
    pub fn rotate_euler(&mut self, euler: [Radian; 3]) -> &mut Self {
        self.rotate(Quaternion::from_euler(euler[0], euler[1], euler[2]))
    }

    /// Multiplies the local scale componentwise.
    pub fn scale_by(&mut self, scale: Vec3) -> &mut Self {
        self.set_scale(self.scale * scale)
    }

    /// Sets the world position.
    pub fn set_world_position(&mut self, position: Vec3) -> &mut Self {
        self.world_position = position;
        self.regenerate_world()
    }

    /// Sets the world rotation.
    pub fn set_world_rotation(&mut self, rotation: Quaternion) -> &mut Self {
        self.world_rotation = rotation;
        self.regenerate_world()
    }

    /// Sets the world rotation from Euler angles in yaw-pitch-roll order.
    pub fn set_world_euler(&mut self, euler: [Radian; 3]) -> &mut Self {
        self.set_world_rotation(Quaternion::from_euler(euler[0], euler[1], euler[2]))
    }

    /// Sets the world scale.
    pub fn set_world_scale(&mut self, scale: Vec3) -> &mut Self {
        self.world_scale = scale;
        self.regenerate_world()
    }

    /// Replaces the world matrix, re-deriving the world SRT state.
    pub fn set_world_matrix(&mut self, matrix: Matrix) -> Result<&mut Self, MathError> {
        let (position, rotation, scale) = Self::decompose_matrix(&matrix)?;

        self.world_position = position;
        self.world_rotation = rotation;
        self.world_scale = scale;
        self.world_matrix = matrix;
        self.refresh_local_as_root();

        Ok(self)
    }

    /// Moves the world position by `translation`.
    pub fn world_translate(&mut self, translation: Vec3) -> &mut Self {
        self.set_world_position(self.world_position + translation)
    }

    /// Post-composes `rotation` onto the world rotation.
    pub fn world_rotate(&mut self, rotation: Quaternion) -> &mut Self {
        self.set_world_rotation(self.world_rotation * rotation)
    }

    /// Post-composes an Euler rotation (yaw-pitch-roll order) onto the
    /// world rotation.
    pub fn world_rotate_euler(&mut self, euler: [Radian; 3]) -> &mut Self {
        self.world_rotate(Quaternion::from_euler(euler[0], euler[1], euler[2]))
    }

    /// Multiplies the world scale componentwise.
    pub fn world_scale_by(&mut self, scale: Vec3) -> &mut Self {
        self.set_world_scale(self.world_scale * scale)
    }

    /// Local right axis: the rotated +X.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation.rotate_vec3(&Vec3::right())
    }

    /// Local up axis: the rotated +Y.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation.rotate_vec3(&Vec3::up())
    }

    /// Local forward axis, `up x right` (the rotated -Z).
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.up().cross(&self.right())
    }

    /// Opposite of [`Transform::right`].
    #[must_use]
    pub fn left(&self) -> Vec3 {
        -self.right()
    }

    /// Opposite of [`Transform::up`].
    #[must_use]
    pub fn down(&self) -> Vec3 {
        -self.up()
    }

    /// Opposite of [`Transform::forward`].
    #[must_use]
    pub fn back(&self) -> Vec3 {
        -self.forward()
    }

    /// World right axis, unit length.
    #[must_use]
    pub fn world_right(&self) -> Vec3 {
        self.world_axis(Vec3::right())
    }

    /// World up axis, unit length.
    #[must_use]
    pub fn world_up(&self) -> Vec3 {
        self.world_axis(Vec3::up())
    }

    /// World forward axis, `world_up x world_right`.
    #[must_use]
    pub fn world_forward(&self) -> Vec3 {
        self.world_up().cross(&self.world_right())
    }

    /// Opposite of [`Transform::world_right`].
    #[must_use]
    pub fn world_left(&self) -> Vec3 {
        -self.world_right()
    }

    /// Opposite of [`Transform::world_up`].
    #[must_use]
    pub fn world_down(&self) -> Vec3 {
        -self.world_up()
    }

    /// Opposite of [`Transform::world_forward`].
    #[must_use]
    pub fn world_back(&self) -> Vec3 {
        -self.world_forward()
    }

    fn world_axis(&self, axis: Vec3) -> Vec3 {
        let direction = Vec4::from_direction(axis);

        match self.world_matrix.transform_vec4(&direction) {
            Ok(mapped) => mapped.xyz().normalized(),
            // World matrices are always 4x4; unreachable in practice.
            Err(_) => axis,
        }
    }

    /// Composes `other`'s world matrix onto this transform's local matrix
    /// and re-derives the local SRT state from the product.
    pub fn apply(&mut self, other: &Self) -> &mut Self {
        self.matrix = &self.matrix * &other.world_matrix;

        let (position, rotation, scale) = Self::decompose4(&self.matrix);
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;

        self.refresh_world(None);
        self
    }

    /// Inverts the local state in place: negated position, inverted
    /// rotation, reciprocal scale.
    ///
    /// A zero scale component produces an infinite reciprocal; callers own
    /// that precondition.
    pub fn invert(&mut self) {
        self.position = self.position * -1.0;
        self.rotation = self.rotation.inverse();
        self.scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        self.regenerate_local();
    }

    /// Returns the locally inverted transform; see [`Transform::invert`].
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inverted = self.clone();
        inverted.invert();
        inverted
    }

    /// Inverts the world state in place; the local state follows.
    pub fn invert_world(&mut self) {
        self.world_position = self.world_position * -1.0;
        self.world_rotation = self.world_rotation.inverse();
        self.world_scale = Vec3::new(
            1.0 / self.world_scale.x,
            1.0 / self.world_scale.y,
            1.0 / self.world_scale.z,
        );
        self.regenerate_world();
    }

    /// Returns the world-inverted transform; see [`Transform::invert_world`].
    #[must_use]
    pub fn inverse_world(&self) -> Self {
        let mut inverted = self.clone();
        inverted.invert_world();
        inverted
    }

    /// Interpolates the local states of `from` and `to` at parameter `t`:
    /// lerped position and scale, slerped rotation. `t` is unclamped.
    #[must_use]
    pub fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        Self::new(
            from.position.lerp(&to.position, t),
            from.rotation.slerp(&to.rotation, t),
            from.scale.lerp(&to.scale, t),
        )
    }

    /// Interpolates the world states of `from` and `to` at parameter `t`.
    #[must_use]
    pub fn interpolate_world(from: &Self, to: &Self, t: f32) -> Self {
        let mut result = from.clone();

        result.world_position = from.world_position.lerp(&to.world_position, t);
        result.world_rotation = from.world_rotation.slerp(&to.world_rotation, t);
        result.world_scale = from.world_scale.lerp(&to.world_scale, t);
        result.regenerate_world();

        result
    }

    // Regenerates the local matrix from local SRT, then the world side.
    fn regenerate_local(&mut self) -> &mut Self {
        self.matrix = Self::generate_matrix(&self.position, &self.rotation, &self.scale);
        self.refresh_world(None);
        self
    }

    // Regenerates the world matrix from world SRT, then the local side.
    fn regenerate_world(&mut self) -> &mut Self {
        self.world_matrix =
            Self::generate_matrix(&self.world_position, &self.world_rotation, &self.world_scale);
        self.refresh_local_as_root();
        self
    }

    fn refresh_local_as_root(&mut self) {
        self.matrix = self.world_matrix.clone();
        self.position = self.world_position;
        self.rotation = self.world_rotation;
        self.scale = self.world_scale;
    }

    // Recomputes world state as parent_world x local (or local for roots).
    pub(crate) fn refresh_world(&mut self, parent_world: Option<&Matrix>) {
        self.world_matrix = match parent_world {
            Some(parent_world) => parent_world * &self.matrix,
            None => self.matrix.clone(),
        };

        let (position, rotation, scale) = Self::decompose4(&self.world_matrix);
        self.world_position = position;
        self.world_rotation = rotation;
        self.world_scale = scale;
    }

    // Recomputes local state as parent_world^-1 x world (or world for
    // roots). Fails when the parent's world matrix is singular.
    pub(crate) fn refresh_local(&mut self, parent_world: Option<&Matrix>) -> Result<(), MathError> {
        self.matrix = match parent_world {
            Some(parent_world) => parent_world.inverse()?.try_mul(&self.world_matrix)?,
            None => self.world_matrix.clone(),
        };

        let (position, rotation, scale) = Self::decompose4(&self.matrix);
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;

        Ok(())
    }

    // Promotes the world state to local, for a node whose parent was
    // destroyed: the node keeps its world placement and becomes a root.
    pub(crate) fn bake_world_into_local(&mut self) {
        self.refresh_local_as_root();
    }
}

impl MulAssign<&Transform> for Transform {
    fn mul_assign(&mut self, rhs: &Transform) {
        self.apply(rhs);
    }
}

impl Mul for &Transform {
    type Output = Transform;

    fn mul(self, rhs: Self) -> Transform {
        let mut result = self.clone();
        result.apply(rhs);
        result
    }
}

impl AbsDiffEq for Transform {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.position.abs_diff_eq(&other.position, epsilon)
            && self.rotation.abs_diff_eq(&other.rotation, epsilon)
            && self.scale.abs_diff_eq(&other.scale, epsilon)
            && self.world_position.abs_diff_eq(&other.world_position, epsilon)
            && self.world_rotation.abs_diff_eq(&other.world_rotation, epsilon)
            && self.world_scale.abs_diff_eq(&other.world_scale, epsilon)
    }
}

impl RelativeEq for Transform {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.position.relative_eq(&other.position, epsilon, max_relative)
            && self.rotation.relative_eq(&other.rotation, epsilon, max_relative)
            && self.scale.relative_eq(&other.scale, epsilon, max_relative)
            && self
                .world_position
                .relative_eq(&other.world_position, epsilon, max_relative)
            && self
                .world_rotation
                .relative_eq(&other.world_rotation, epsilon, max_relative)
            && self
                .world_scale
                .relative_eq(&other.world_scale, epsilon, max_relative)
    }
}
