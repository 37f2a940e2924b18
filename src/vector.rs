//! Fixed-size vector types.
//!
//! `Vec2`, `Vec3` and `Vec4` are plain `f32` tuples with componentwise
//! arithmetic and the geometric helpers the transform system consumes.
//! Equality is tolerance-based throughout; use [`approx`] assertions in
//! tests rather than `==` on freshly computed values.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};

use crate::angle::Radian;
use crate::arithmetic::{float_equals, lerp};
use crate::error::MathError;
use crate::quaternion::Quaternion;

/// A 2-dimensional vector.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

/// A 3-dimensional vector.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

/// A 4-dimensional vector, used for homogeneous coordinates.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec4 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component.
    pub w: f32,
}

macro_rules! impl_vector {
    ($name:ident, $dims:expr, { $($field:ident),+ }) => {
        impl $name {
            /// Creates a vector from its components.
            #[must_use]
            pub const fn new($($field: f32),+) -> Self {
                Self { $($field),+ }
            }

            /// The zero vector.
            #[must_use]
            pub const fn zero() -> Self {
                Self::uniform(0.0)
            }

            /// The all-ones vector.
            #[must_use]
            pub const fn one() -> Self {
                Self::uniform(1.0)
            }

            /// A vector with every component set to `value`.
            #[must_use]
            pub const fn uniform(value: f32) -> Self {
                Self { $($field: value),+ }
            }

            /// Number of components.
            #[must_use]
            pub const fn len() -> usize {
                $dims
            }

            /// Component at `index`, or `OutOfRange`.
            pub fn get(&self, index: usize) -> Result<f32, MathError> {
                let components = [$(self.$field),+];
                components
                    .get(index)
                    .copied()
                    .ok_or(MathError::OutOfRange { index, len: $dims })
            }

            /// Dot product.
            #[must_use]
            pub fn dot(&self, other: &Self) -> f32 {
                0.0 $(+ self.$field * other.$field)+
            }

            /// Squared magnitude.
            #[must_use]
            pub fn magnitude_squared(&self) -> f32 {
                self.dot(self)
            }

            /// Magnitude (Euclidean length).
            #[must_use]
            pub fn magnitude(&self) -> f32 {
                self.magnitude_squared().sqrt()
            }

            /// Unit-length copy. The zero vector is returned unchanged.
            #[must_use]
            pub fn normalized(&self) -> Self {
                let magnitude = self.magnitude();

                if magnitude == 0.0 {
                    return *self;
                }

                *self / magnitude
            }

            /// Whether the vector is unit length, within tolerance.
            #[must_use]
            pub fn is_unit(&self) -> bool {
                float_equals(self.magnitude_squared(), 1.0)
            }

            /// Componentwise linear interpolation, unclamped.
            #[must_use]
            pub fn lerp(&self, to: &Self, t: f32) -> Self {
                Self { $($field: lerp(self.$field, to.$field, t)),+ }
            }

            /// Componentwise minimum.
            #[must_use]
            pub fn min(&self, other: &Self) -> Self {
                Self { $($field: self.$field.min(other.$field)),+ }
            }

            /// Componentwise maximum.
            #[must_use]
            pub fn max(&self, other: &Self) -> Self {
                Self { $($field: self.$field.max(other.$field)),+ }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                true $(&& float_equals(self.$field, other.$field))+
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Self { $($field: self.$field * rhs.$field),+ }
            }
        }

        impl Div for $name {
            type Output = Self;
            fn div(self, rhs: Self) -> Self {
                Self { $($field: self.$field / rhs.$field),+ }
            }
        }

        impl Mul<f32> for $name {
            type Output = Self;
            fn mul(self, rhs: f32) -> Self {
                Self { $($field: self.$field * rhs),+ }
            }
        }

        impl Div<f32> for $name {
            type Output = Self;
            fn div(self, rhs: f32) -> Self {
                Self { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                $(self.$field += rhs.$field;)+
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$field -= rhs.$field;)+
            }
        }

        impl MulAssign for $name {
            fn mul_assign(&mut self, rhs: Self) {
                $(self.$field *= rhs.$field;)+
            }
        }

        impl MulAssign<f32> for $name {
            fn mul_assign(&mut self, rhs: f32) {
                $(self.$field *= rhs;)+
            }
        }

        impl DivAssign<f32> for $name {
            fn div_assign(&mut self, rhs: f32) {
                $(self.$field /= rhs;)+
            }
        }

        impl Index<usize> for $name {
            type Output = f32;

            /// # Panics
            /// Panics when `index` is out of range.
            fn index(&self, index: usize) -> &f32 {
                let components = [$(&self.$field),+];
                components[index]
            }
        }

        impl IndexMut<usize> for $name {
            fn index_mut(&mut self, index: usize) -> &mut f32 {
                let components = [$(&mut self.$field),+];
                components
                    .into_iter()
                    .nth(index)
                    .unwrap_or_else(|| panic!("component index {index} out of range"))
            }
        }

        impl AbsDiffEq for $name {
            type Epsilon = f32;

            fn default_epsilon() -> f32 {
                f32::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
                true $(&& f32::abs_diff_eq(&self.$field, &other.$field, epsilon))+
            }
        }

        impl RelativeEq for $name {
            fn default_max_relative() -> f32 {
                f32::default_max_relative()
            }

            fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
                true $(&& f32::relative_eq(&self.$field, &other.$field, epsilon, max_relative))+
            }
        }
    };
}

impl_vector!(Vec2, 2, { x, y });
impl_vector!(Vec3, 3, { x, y, z });
impl_vector!(Vec4, 4, { x, y, z, w });

impl Vec2 {
    /// 2D cross product (the z component of the 3D cross product).
    #[must_use]
    pub fn cross(&self, other: &Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Smallest angle between this vector and `other`.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> Radian {
        angle_between(self.dot(other), self.magnitude() * other.magnitude())
    }
}

impl Vec3 {
    /// Unit vector along +Y.
    #[must_use]
    pub const fn up() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    /// Unit vector along -Y.
    #[must_use]
    pub const fn down() -> Self {
        Self::new(0.0, -1.0, 0.0)
    }

    /// Unit vector along +X.
    #[must_use]
    pub const fn right() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Unit vector along -X.
    #[must_use]
    pub const fn left() -> Self {
        Self::new(-1.0, 0.0, 0.0)
    }

    /// Unit vector along +Z (toward the viewer in a right-handed basis).
    #[must_use]
    pub const fn front() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Unit vector along -Z.
    #[must_use]
    pub const fn back() -> Self {
        Self::new(0.0, 0.0, -1.0)
    }

    /// Cross product following the right-hand rule.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Smallest angle between this vector and `other`.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> Radian {
        angle_between(self.dot(other), self.magnitude() * other.magnitude())
    }

    /// Reflection across a plane with unit normal `normal`.
    #[must_use]
    pub fn reflect(&self, normal: &Self) -> Self {
        *self - *normal * (2.0 * self.dot(normal))
    }

    /// Projection of this vector onto `onto`.
    ///
    /// Projecting onto the zero vector returns zero.
    #[must_use]
    pub fn project(&self, onto: &Self) -> Self {
        let denominator = onto.magnitude_squared();

        if denominator == 0.0 {
            return Self::zero();
        }

        *onto * (self.dot(onto) / denominator)
    }

    /// Distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        (*other - *self).magnitude()
    }

    /// This vector rotated by `rotation`.
    #[must_use]
    pub fn rotated(&self, rotation: &Quaternion) -> Self {
        rotation.rotate_vec3(self)
    }
}

impl Vec4 {
    /// Homogeneous point (`w = 1`).
    #[must_use]
    pub const fn from_point(point: Vec3) -> Self {
        Self::new(point.x, point.y, point.z, 1.0)
    }

    /// Homogeneous direction (`w = 0`).
    #[must_use]
    pub const fn from_direction(direction: Vec3) -> Self {
        Self::new(direction.x, direction.y, direction.z, 0.0)
    }

    /// The first three components.
    #[must_use]
    pub const fn xyz(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Shared angle computation: clamps the cosine to [-1, 1] before `acos`
/// so near-parallel vectors do not produce NaN.
fn angle_between(dot: f32, magnitudes: f32) -> Radian {
    if magnitudes == 0.0 {
        return Radian::new(0.0);
    }

    Radian::new((dot / magnitudes).clamp(-1.0, 1.0).acos())
}
