//! Angle types with explicit units.
//!
//! `Radian` and `Degree` are distinct newtypes with named constructors and
//! explicit conversions. There is deliberately no `From<f32>` and no
//! implicit radian/degree coercion: silent unit mixing is the classic
//! angle bug, so every crossing of the unit boundary is spelled out.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::arithmetic::{float_equals, wrap};

/// An angle measured in radians.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Radian {
    value: f32,
}

/// An angle measured in degrees.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Degree {
    value: f32,
}

impl Radian {
    /// Creates an angle from a raw radian value.
    #[must_use]
    pub const fn new(radians: f32) -> Self {
        Self { value: radians }
    }

    /// Creates a radian angle from a degree value.
    #[must_use]
    pub fn from_degrees(degrees: f32) -> Self {
        Self::new(degrees.to_radians())
    }

    /// The stored value, unwrapped.
    #[must_use]
    pub const fn raw(self) -> f32 {
        self.value
    }

    /// The angle in radians, wrapped to `[-pi, pi)` when `signed` is true
    /// or `[0, 2pi)` otherwise.
    #[must_use]
    pub fn radian(self, signed: bool) -> f32 {
        if signed {
            wrap(self.value, -PI, PI)
        } else {
            wrap(self.value, 0.0, TAU)
        }
    }

    /// The angle in degrees, wrapped to `[-180, 180)` when `signed` is true
    /// or `[0, 360)` otherwise.
    #[must_use]
    pub fn degree(self, signed: bool) -> f32 {
        self.radian(signed).to_degrees()
    }

    /// Wraps the stored value in place; see [`Radian::radian`] for ranges.
    pub fn wrap(&mut self, signed: bool) {
        self.value = self.radian(signed);
    }

    /// Returns a wrapped copy; see [`Radian::radian`] for ranges.
    #[must_use]
    pub fn wrapped(self, signed: bool) -> Self {
        Self::new(self.radian(signed))
    }

    /// Explicit conversion to degrees.
    #[must_use]
    pub fn to_degree(self) -> Degree {
        Degree::new(self.value.to_degrees())
    }

    /// Sine of the angle.
    #[must_use]
    pub fn sin(self) -> f32 {
        self.value.sin()
    }

    /// Cosine of the angle.
    #[must_use]
    pub fn cos(self) -> f32 {
        self.value.cos()
    }

    /// Tangent of the angle.
    #[must_use]
    pub fn tan(self) -> f32 {
        self.value.tan()
    }
}

impl Degree {
    /// Creates an angle from a raw degree value.
    #[must_use]
    pub const fn new(degrees: f32) -> Self {
        Self { value: degrees }
    }

    /// Creates a degree angle from a radian value.
    #[must_use]
    pub fn from_radians(radians: f32) -> Self {
        Self::new(radians.to_degrees())
    }

    /// The stored value, unwrapped.
    #[must_use]
    pub const fn raw(self) -> f32 {
        self.value
    }

    /// The angle in degrees, wrapped to `[-180, 180)` when `signed` is true
    /// or `[0, 360)` otherwise.
    #[must_use]
    pub fn degree(self, signed: bool) -> f32 {
        if signed {
            wrap(self.value, -180.0, 180.0)
        } else {
            wrap(self.value, 0.0, 360.0)
        }
    }

    /// The angle in radians, wrapped to `[-pi, pi)` when `signed` is true
    /// or `[0, 2pi)` otherwise.
    #[must_use]
    pub fn radian(self, signed: bool) -> f32 {
        self.degree(signed).to_radians()
    }

    /// Wraps the stored value in place; see [`Degree::degree`] for ranges.
    pub fn wrap(&mut self, signed: bool) {
        self.value = self.degree(signed);
    }

    /// Explicit conversion to radians.
    #[must_use]
    pub fn to_radian(self) -> Radian {
        Radian::new(self.value.to_radians())
    }
}

// Equality compares wrapped values so that e.g. 0 and 2pi are equal.

impl PartialEq for Radian {
    fn eq(&self, other: &Self) -> bool {
        float_equals(self.radian(false), other.radian(false))
    }
}

impl PartialEq for Degree {
    fn eq(&self, other: &Self) -> bool {
        float_equals(self.degree(false), other.degree(false))
    }
}

impl PartialEq<Degree> for Radian {
    fn eq(&self, other: &Degree) -> bool {
        float_equals(self.degree(false), other.degree(false))
    }
}

impl PartialEq<Radian> for Degree {
    fn eq(&self, other: &Radian) -> bool {
        float_equals(self.degree(false), other.degree(false))
    }
}

macro_rules! angle_ops {
    ($name:ident) => {
        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self::new(self.value + rhs.value)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self::new(self.value - rhs.value)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self::new(-self.value)
            }
        }

        impl Mul<f32> for $name {
            type Output = Self;
            fn mul(self, rhs: f32) -> Self {
                Self::new(self.value * rhs)
            }
        }

        impl Div<f32> for $name {
            type Output = Self;
            fn div(self, rhs: f32) -> Self {
                Self::new(self.value / rhs)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.value += rhs.value;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.value -= rhs.value;
            }
        }

        impl MulAssign<f32> for $name {
            fn mul_assign(&mut self, rhs: f32) {
                self.value *= rhs;
            }
        }

        impl DivAssign<f32> for $name {
            fn div_assign(&mut self, rhs: f32) {
                self.value /= rhs;
            }
        }
    };
}

angle_ops!(Radian);
angle_ops!(Degree);
