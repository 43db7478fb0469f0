#![warn(missing_docs)]

//! Triangle meshes and procedural primitives for canopy scenes.
//!
//! Shapes are turned into triangles through the [`Tessellate`] capability.
//! A scene builder only ever sees the resulting [`TriangleMesh`]: a point
//! list plus one index triple per triangle.
//!
//! # Example
//!
//! ```
//! use canopy_mesh::{Quad, Tessellate};
//! use canopy_math::Point3;
//!
//! let leaf = Quad::horizontal(Point3::new(0.0, 0.0, 1.0), 2.0, 1.0);
//! let mesh = leaf.tessellate();
//! assert_eq!(mesh.num_triangles(), 2);
//! ```

mod primitives;

pub use primitives::{Cuboid, Disc, Placed, Quad};

use canopy_math::{triangle_area, Point3, Transform};

/// Triangle mesh: shared points and per-triangle index triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub points: Vec<Point3>,
    /// Index triples into `points`, one per triangle.
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.points.extend_from_slice(&other.points);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|tri| [tri[0] + offset, tri[1] + offset, tri[2] + offset]),
        );
    }

    /// Resolve each index triple to its three points, in triangle order.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.iter().map(move |tri| {
            [
                self.points[tri[0] as usize],
                self.points[tri[1] as usize],
                self.points[tri[2] as usize],
            ]
        })
    }

    /// Total surface area.
    pub fn area(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| triangle_area(&a, &b, &c))
            .sum()
    }

    /// Copy of this mesh with every point transformed.
    pub fn transformed(&self, transform: &Transform) -> TriangleMesh {
        TriangleMesh {
            points: self.points.iter().map(|p| transform.apply(p)).collect(),
            indices: self.indices.clone(),
        }
    }
}

/// Capability of producing a triangle mesh.
pub trait Tessellate {
    /// Triangulate the shape.
    fn tessellate(&self) -> TriangleMesh;
}

impl Tessellate for TriangleMesh {
    fn tessellate(&self) -> TriangleMesh {
        self.clone()
    }
}

impl<T: Tessellate + ?Sized> Tessellate for &T {
    fn tessellate(&self) -> TriangleMesh {
        (**self).tessellate()
    }
}

impl<T: Tessellate + ?Sized> Tessellate for Box<T> {
    fn tessellate(&self) -> TriangleMesh {
        (**self).tessellate()
    }
}
