//! # hemesh
//!
//! A half-edge polygon mesh with the geometric operators an interactive mesh
//! viewer needs: topology traversal, face and vertex normals, inflating and
//! deflating single vertices, and curvature-flow Laplacian smoothing and
//! sharpening with cotangent weights.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Arbitrary polygons**: faces of any size; areas and normals use a fan
//! - **Strict construction**: ambiguous input is reported, not patched over
//! - **Order-independent updates**: smoothing computes every displacement
//!   before moving anything
//! - **Render buffers**: flat index buffers plus explicit change notices
//!
//! ## Quick Start
//!
//! ```
//! use hemesh::prelude::*;
//!
//! let mesh = HalfEdgeMesh::from_soup(&PolygonSoup::tetrahedron()).unwrap();
//!
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 4);
//!
//! for f in mesh.face_ids() {
//!     let normal = mesh.face_normal(f);
//!     let area = mesh.face_area(f);
//!     println!("Face {:?}: normal={:?}, area={}", f, normal, area);
//! }
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use hemesh::prelude::*;
//!
//! let mesh = HalfEdgeMesh::from_soup(&PolygonSoup::unit_quad()).unwrap();
//! let v = VertexId::new(0);
//!
//! // Neighbors and faces around a vertex
//! assert_eq!(mesh.vertex_neighbors(v).count(), 2);
//! assert_eq!(mesh.vertex_faces(v).count(), 1);
//!
//! // Vertices of a face
//! let f = FaceId::new(0);
//! let loop_ids: Vec<VertexId> = mesh.face_vertices(f).collect();
//! assert_eq!(loop_ids.len(), 4);
//! ```
//!
//! ## Smoothing
//!
//! ```
//! use hemesh::prelude::*;
//! use hemesh::render::RenderCache;
//!
//! let mut soup = PolygonSoup::grid(4, 1.0);
//! soup.positions[12].z = 0.5;
//! let mut mesh = HalfEdgeMesh::from_soup(&soup).unwrap();
//! let mut cache = RenderCache::new();
//!
//! let options = LaplacianOptions::default().with_iterations(3);
//! let change = laplacian_smooth_sharpen(&mut mesh, &options).unwrap();
//! cache.invalidate(change);
//! assert_eq!(cache.buffers(&mesh).num_triangles(), 32);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod render;

/// Prelude module for convenient imports.
///
/// ```
/// use hemesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{inflate_deflate, laplacian_smooth_sharpen, LaplacianMode, LaplacianOptions};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_soup, Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, PolygonSoup, Vertex,
        VertexId,
    };
    pub use crate::render::{MeshChange, RenderBuffers, RenderCache};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
