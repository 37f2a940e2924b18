//! # spatial_math
//!
//! A deterministic 3D math library with a hierarchical scene-graph
//! transform system.
//!
//! ## Features
//!
//! - **Runtime-shaped matrices**: dense row-major matrices with
//!   determinant, adjugate and inverse via recursive cofactor expansion
//! - **Spatial types**: vectors, unit-aware angles, quaternions and
//!   axis-aligned bounding boxes
//! - **Transform hierarchy**: local/world SRT transforms stored in an
//!   arena-backed graph with synchronous parent-to-child change
//!   propagation
//! - **Tolerance-first comparisons**: scale-aware epsilon equality
//!   throughout, plus [`approx`] trait implementations for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use spatial_math::prelude::*;
//!
//! let mut graph = TransformGraph::new();
//!
//! let body = graph.insert(Transform::new(
//!     Vec3::new(0.0, 1.0, 0.0),
//!     Quaternion::from_axis_angle(Radian::from_degrees(90.0), Vec3::up()),
//!     Vec3::one(),
//! ));
//!
//! let turret = graph
//!     .insert_child(body, Transform::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity(), Vec3::one()), false)
//!     .expect("body is a live node");
//!
//! // Moving the body drags the turret's world placement along.
//! graph.update_local(body, |t| {
//!     t.translate(Vec3::new(5.0, 0.0, 0.0));
//! }).expect("body is a live node");
//!
//! let world = graph.transform(turret).expect("live node").world_position();
//! assert!((world.x - 5.0).abs() < 1.0e-5);
//! ```

pub mod angle;
pub mod arithmetic;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod matrix4;
pub mod quaternion;
pub mod scene;
pub mod transform;
pub mod vector;

pub use error::MathError;
pub use scene::SceneError;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        angle::{Degree, Radian},
        error::MathError,
        geometry::BoundingBox,
        matrix::Matrix,
        quaternion::{Quaternion, RotationOrder},
        scene::{ListenerId, NodeKey, SceneError, TransformEvent, TransformGraph, TransformNotifier},
        transform::Transform,
        vector::{Vec2, Vec3, Vec4},
    };
}
