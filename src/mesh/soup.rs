//! Polygon soup input.
//!
//! A [`PolygonSoup`] is what the mesh loader hands over: vertex positions and
//! colors plus faces as counter-clockwise vertex-id lists, already consistently
//! oriented and centered at the origin.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};

/// Color given to vertices when the input carries none.
pub const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Oriented, centered polygon soup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSoup {
    /// Vertex positions; a vertex's id is its index here.
    pub positions: Vec<Point3<f64>>,

    /// Vertex colors, one per position.
    pub colors: Vec<Vector3<f32>>,

    /// Faces as counter-clockwise vertex-id loops.
    pub faces: Vec<Vec<usize>>,
}

impl PolygonSoup {
    /// Create a soup with every vertex in [`DEFAULT_COLOR`].
    pub fn new(positions: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        let colors = vec![Vector3::from(DEFAULT_COLOR); positions.len()];
        Self {
            positions,
            colors,
            faces,
        }
    }

    /// Replace the vertex colors.
    pub fn with_colors(mut self, colors: Vec<Vector3<f32>>) -> Self {
        self.colors = colors;
        self
    }

    /// Give every vertex the same color.
    pub fn with_uniform_color(mut self, color: Vector3<f32>) -> Self {
        self.colors = vec![color; self.positions.len()];
        self
    }

    /// Check the per-face rules construction relies on.
    ///
    /// Colors must match positions one to one, and every face needs at least
    /// three distinct, in-range vertices. Edge sharing between faces is
    /// checked later, while half-edges are built.
    pub fn validate(&self) -> Result<()> {
        if self.colors.len() != self.positions.len() {
            return Err(MeshError::AttributeCountMismatch {
                attribute: "color",
                expected: self.positions.len(),
                actual: self.colors.len(),
            });
        }

        for (fi, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::FaceTooSmall {
                    face: fi,
                    len: face.len(),
                });
            }
            for (k, &vi) in face.iter().enumerate() {
                if vi >= self.positions.len() {
                    return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
                }
                if face[..k].contains(&vi) {
                    return Err(MeshError::DegenerateFace { face: fi, vertex: vi });
                }
            }
        }

        Ok(())
    }

    /// Regular tetrahedron centered at the origin, faces wound outward.
    pub fn tetrahedron() -> Self {
        let positions = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]];
        Self::new(positions, faces)
    }

    /// A single 1x1 quad in the z = 0 plane, facing +z.
    pub fn unit_quad() -> Self {
        let positions = vec![
            Point3::new(-0.5, -0.5, 0.0),
            Point3::new(0.5, -0.5, 0.0),
            Point3::new(0.5, 0.5, 0.0),
            Point3::new(-0.5, 0.5, 0.0),
        ];
        Self::new(positions, vec![vec![0, 1, 2, 3]])
    }

    /// Triangulated `n` x `n` grid in the z = 0 plane, centered, facing +z.
    ///
    /// Vertex `(i, j)` has id `j * (n + 1) + i`.
    pub fn grid(n: usize, spacing: f64) -> Self {
        let half = n as f64 * spacing * 0.5;
        let mut positions = Vec::with_capacity((n + 1) * (n + 1));
        for j in 0..=n {
            for i in 0..=n {
                positions.push(Point3::new(
                    i as f64 * spacing - half,
                    j as f64 * spacing - half,
                    0.0,
                ));
            }
        }

        let mut faces = Vec::with_capacity(n * n * 2);
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;

                faces.push(vec![v00, v10, v11]);
                faces.push(vec![v00, v11, v01]);
            }
        }

        Self::new(positions, faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_are_valid() {
        assert!(PolygonSoup::tetrahedron().validate().is_ok());
        assert!(PolygonSoup::unit_quad().validate().is_ok());
        assert!(PolygonSoup::grid(3, 1.0).validate().is_ok());
    }

    #[test]
    fn test_grid_is_centered() {
        let soup = PolygonSoup::grid(4, 0.5);
        assert_eq!(soup.positions.len(), 25);
        assert_eq!(soup.faces.len(), 32);
        let centroid = soup
            .positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / soup.positions.len() as f64;
        assert!(centroid.norm() < 1e-12);
    }

    #[test]
    fn test_face_too_small() {
        let soup = PolygonSoup::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![vec![0, 1]],
        );
        assert_eq!(soup.validate(), Err(MeshError::FaceTooSmall { face: 0, len: 2 }));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let soup = PolygonSoup::new(vec![Point3::origin()], vec![vec![0, 1, 2]]);
        assert_eq!(
            soup.validate(),
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        );
    }

    #[test]
    fn test_repeated_vertex() {
        let mut soup = PolygonSoup::unit_quad();
        soup.faces[0] = vec![0, 1, 0, 3];
        assert_eq!(
            soup.validate(),
            Err(MeshError::DegenerateFace { face: 0, vertex: 0 })
        );
    }

    #[test]
    fn test_color_count_mismatch() {
        let soup = PolygonSoup::unit_quad().with_colors(vec![Vector3::zeros()]);
        assert_eq!(
            soup.validate(),
            Err(MeshError::AttributeCountMismatch {
                attribute: "color",
                expected: 4,
                actual: 1,
            })
        );
    }
}
