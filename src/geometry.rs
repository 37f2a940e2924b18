//! Axis-aligned bounding volumes.

use crate::error::MathError;
use crate::matrix::Matrix;
use crate::vector::{Vec3, Vec4};

/// An axis-aligned bounding box described by its two extreme corners.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Corner with the smallest coordinates on every axis.
    pub min: Vec3,
    /// Corner with the largest coordinates on every axis.
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a box from its extreme corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The smallest box enclosing both `a` and `b`.
    #[must_use]
    pub fn enclosing(a: &Self, b: &Self) -> Self {
        Self::new(a.min.min(&b.min), a.max.max(&b.max))
    }

    /// The box center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The box extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether `point` lies inside the box (inclusive bounds).
    #[must_use]
    pub fn contains(&self, point: &Vec3) -> bool {
        self.min.x <= point.x
            && point.x <= self.max.x
            && self.min.y <= point.y
            && point.y <= self.max.y
            && self.min.z <= point.z
            && point.z <= self.max.z
    }

    /// The axis-aligned box enclosing this box after applying `transform`.
    ///
    /// Maps all eight corners and refits, so rotated boxes grow rather than
    /// tilt. The transform must be a 4x4 matrix.
    pub fn transformed(&self, transform: &Matrix) -> Result<Self, MathError> {
        let corners = [
            self.min,
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            self.max,
        ];

        let mut min = Vec3::uniform(f32::MAX);
        let mut max = Vec3::uniform(f32::MIN);

        for corner in &corners {
            let mapped = transform.transform_vec4(&Vec4::from_point(*corner))?.xyz();
            min = min.min(&mapped);
            max = max.max(&mapped);
        }

        Ok(Self::new(min, max))
    }
}
