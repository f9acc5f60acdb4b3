//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and the polygon
//! soup it is built from.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which stores vertices, half-edges and
//! faces in flat arrays and links them through typed indices:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! ```
//! use hemesh::mesh::{HalfEdgeMesh, PolygonSoup};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let soup = PolygonSoup::new(positions, vec![vec![0, 1, 2]]);
//!
//! let mesh = HalfEdgeMesh::from_soup(&soup).unwrap();
//! assert_eq!(mesh.num_halfedges(), 6);
//! ```

mod builder;
mod halfedge;
mod index;
mod soup;

pub use builder::{build_from_soup, to_polygon_soup};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{DirectedEdge, FaceId, HalfEdgeId, VertexId};
pub use soup::{PolygonSoup, DEFAULT_COLOR};
