#![warn(missing_docs)]

//! Math types for the canopy scene builder.
//!
//! Thin wrappers around nalgebra providing the point and vector types used
//! by scene geometry and light sources, a placement [`Transform`] for
//! procedural shapes, and the two scalar helpers the energy balance and
//! output derivation rely on.

use nalgebra::{Matrix4, Rotation3, Vector3};

/// A point in 3D scene space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D scene space.
pub type Vec3 = Vector3<f64>;

/// A point on the horizontal (x, y) plane.
pub type Point2 = nalgebra::Point2<f64>;

/// Local-to-scene placement of a shape, as a homogeneous matrix.
///
/// Organs are modelled in a local frame and placed by scaling, tilting
/// about x (inclination), turning about z (azimuth) and moving to their
/// position, in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(Matrix4<f64>);

impl Transform {
    /// Leaves points where they are.
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// Move by `offset`.
    pub fn translation(offset: Vec3) -> Self {
        Self(Matrix4::new_translation(&offset))
    }

    /// Scale each axis by the matching component of `factors`.
    pub fn scale(factors: Vec3) -> Self {
        Self(Matrix4::new_nonuniform_scaling(&factors))
    }

    /// Tilt about the x axis by `angle` radians.
    pub fn inclination(angle: f64) -> Self {
        Self(Rotation3::from_axis_angle(&Vector3::x_axis(), angle).to_homogeneous())
    }

    /// Turn about the vertical axis by `angle` radians.
    pub fn azimuth(angle: f64) -> Self {
        Self(Rotation3::from_axis_angle(&Vector3::z_axis(), angle).to_homogeneous())
    }

    /// Full organ placement: uniform `scale`, `inclination`, `azimuth`
    /// (radians), then translation to `position`.
    pub fn placement(position: Point3, azimuth: f64, inclination: f64, scale: f64) -> Self {
        Self::scale(Vec3::repeat(scale))
            .then(Self::inclination(inclination))
            .then(Self::azimuth(azimuth))
            .then(Self::translation(position.coords))
    }

    /// `self` followed by `next`.
    pub fn then(self, next: Transform) -> Self {
        Self(next.0 * self.0)
    }

    /// Map a local point to scene space.
    pub fn apply(&self, p: &Point3) -> Point3 {
        self.0.transform_point(p)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Area of the triangle `(a, b, c)`.
pub fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

/// Cosine of the angle between `dir` and the vertical axis.
///
/// Returns `None` when the direction has no vertical component, in which
/// case a flux measured on a horizontal plane cannot be re-expressed
/// perpendicular to the direction.
pub fn cos_zenith(dir: &Vec3) -> Option<f64> {
    let norm = dir.norm();
    if dir.z == 0.0 || norm == 0.0 {
        return None;
    }
    Some(dir.z.abs() / norm)
}
