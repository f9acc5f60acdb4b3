//! Error types for hemesh.
//!
//! Construction failures, numeric degeneracies and invalid arguments are all
//! reported through [`MeshError`]. Topology queries that can legitimately find
//! nothing (an isolated vertex, a face without neighbors) return empty
//! iterators instead.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction and mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face lists fewer than three vertices.
    #[error("face {face} has {len} vertices, at least 3 are required")]
    FaceTooSmall {
        /// The face index.
        face: usize,
        /// Number of vertices the face lists.
        len: usize,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face visits the same vertex more than once.
    #[error("face {face} is degenerate (vertex {vertex} appears more than once)")]
    DegenerateFace {
        /// The face index.
        face: usize,
        /// The repeated vertex.
        vertex: usize,
    },

    /// Two faces contain the same directed edge.
    ///
    /// Either the surface is non-manifold along this edge or the two faces
    /// are inconsistently oriented.
    #[error("directed edge ({from}, {to}) of face {face} already belongs to another face")]
    DuplicateHalfEdge {
        /// Origin vertex of the edge.
        from: usize,
        /// Head vertex of the edge.
        to: usize,
        /// The face that tried to claim the edge a second time.
        face: usize,
    },

    /// A vertex has more than one boundary fan, so its boundary loop is ambiguous.
    #[error("vertex {vertex} is non-manifold (it touches the boundary more than once)")]
    NonManifoldVertex {
        /// The offending vertex.
        vertex: usize,
    },

    /// Per-vertex attribute arrays disagree in length.
    #[error("{attribute} count {actual} does not match vertex count {expected}")]
    AttributeCountMismatch {
        /// Name of the attribute.
        attribute: &'static str,
        /// Number of vertex positions.
        expected: usize,
        /// Number of attribute values supplied.
        actual: usize,
    },

    /// A half-edge was left without a pair, next or prev link after construction.
    #[error("half-edge {halfedge} is missing its {link} link")]
    UnlinkedHalfEdge {
        /// The half-edge index.
        halfedge: usize,
        /// Which link is missing.
        link: &'static str,
    },

    /// A vertex id that does not exist in the mesh.
    #[error("vertex {vertex} does not exist (mesh has {count} vertices)")]
    InvalidVertex {
        /// The requested vertex.
        vertex: usize,
        /// Number of vertices in the mesh.
        count: usize,
    },

    /// The vertex normal is undefined because no face touches the vertex.
    #[error("vertex {vertex} has no incident faces, its normal is undefined")]
    NoIncidentFaces {
        /// The vertex.
        vertex: usize,
    },

    /// The face normals around a vertex cancel out or are not finite.
    #[error("vertex {vertex} has a degenerate normal")]
    DegenerateNormal {
        /// The vertex.
        vertex: usize,
    },

    /// The cotangent weights around a vertex sum to zero or a non-finite value.
    #[error("cotangent weights around vertex {vertex} sum to {total}")]
    ZeroWeightSum {
        /// The vertex.
        vertex: usize,
        /// The offending weight sum.
        total: f64,
    },

    /// The mesh connectivity is inconsistent.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
