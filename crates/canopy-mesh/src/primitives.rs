//! Procedural primitives commonly found in canopy mock-ups: flat leaves
//! (quads), boxes for stems and obstacles, and discs.

use std::f64::consts::PI;

use canopy_math::{Point3, Transform, Vec3};

use crate::{Tessellate, TriangleMesh};

/// Planar quadrilateral given by four corners in winding order.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    /// Corners, counter-clockwise when seen from the front face.
    pub corners: [Point3; 4],
}

impl Quad {
    /// Horizontal rectangle with its minimum corner at `origin`.
    pub fn horizontal(origin: Point3, sx: f64, sy: f64) -> Self {
        Self {
            corners: [
                origin,
                origin + Vec3::new(sx, 0.0, 0.0),
                origin + Vec3::new(sx, sy, 0.0),
                origin + Vec3::new(0.0, sy, 0.0),
            ],
        }
    }
}

impl Tessellate for Quad {
    fn tessellate(&self) -> TriangleMesh {
        TriangleMesh {
            points: self.corners.to_vec(),
            indices: vec![[0, 1, 2], [0, 2, 3]],
        }
    }
}

/// Axis-aligned box with corner at `origin` and dimensions `size`.
///
/// Vertex layout:
/// ```text
///     v4----v5
///    /|    /|
///   v7----v6|    z
///   | v0--|-v1   | y
///   |/    |/     |/
///   v3----v2     +---x
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    /// Minimum corner.
    pub origin: Point3,
    /// Extent along x, y and z.
    pub size: Vec3,
}

impl Tessellate for Cuboid {
    fn tessellate(&self) -> TriangleMesh {
        let o = self.origin;
        let (sx, sy, sz) = (self.size.x, self.size.y, self.size.z);
        let points = vec![
            o,
            o + Vec3::new(sx, 0.0, 0.0),
            o + Vec3::new(sx, sy, 0.0),
            o + Vec3::new(0.0, sy, 0.0),
            o + Vec3::new(0.0, 0.0, sz),
            o + Vec3::new(sx, 0.0, sz),
            o + Vec3::new(sx, sy, sz),
            o + Vec3::new(0.0, sy, sz),
        ];
        // Outward normals, counter-clockwise seen from outside.
        let faces: [[u32; 4]; 6] = [
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [2, 3, 7, 6], // back
            [0, 4, 7, 3], // left
            [1, 2, 6, 5], // right
        ];
        let indices = faces
            .iter()
            .flat_map(|f| [[f[0], f[1], f[2]], [f[0], f[2], f[3]]])
            .collect();
        TriangleMesh { points, indices }
    }
}

/// Horizontal disc approximated by a triangle fan.
#[derive(Debug, Clone, PartialEq)]
pub struct Disc {
    /// Center of the disc.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
    /// Number of fan triangles (at least 3).
    pub segments: u32,
}

impl Tessellate for Disc {
    fn tessellate(&self) -> TriangleMesh {
        let n = self.segments.max(3);
        let mut points = Vec::with_capacity(n as usize + 1);
        points.push(self.center);
        for i in 0..n {
            let angle = 2.0 * PI * f64::from(i) / f64::from(n);
            points.push(
                self.center + Vec3::new(self.radius * angle.cos(), self.radius * angle.sin(), 0.0),
            );
        }
        let indices = (0..n).map(|i| [0, 1 + i, 1 + (i + 1) % n]).collect();
        TriangleMesh { points, indices }
    }
}

/// A shape placed in the scene by an affine transform.
#[derive(Debug, Clone)]
pub struct Placed<S> {
    /// Shape in its local frame.
    pub shape: S,
    /// Local-to-scene transform.
    pub transform: Transform,
}

impl<S> Placed<S> {
    /// Place `shape` with `transform`.
    pub fn new(shape: S, transform: Transform) -> Self {
        Self { shape, transform }
    }
}

impl<S: Tessellate> Tessellate for Placed<S> {
    fn tessellate(&self) -> TriangleMesh {
        self.shape.tessellate().transformed(&self.transform)
    }
}
