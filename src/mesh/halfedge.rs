//! Half-edge connectivity and the queries built on it.
//!
//! Polygons of any size are stored as loops of directed half-edges. Area and
//! normal computations treat a polygon as a fan anchored at its first vertex.
//!
//! # Structure
//!
//! - Every undirected edge becomes two half-edges running opposite ways
//! - A half-edge records its **head** vertex, its **pair** (opposite half-edge),
//!   the **next** and **prev** half-edges of its loop, and its **face**
//! - A vertex records one half-edge that leaves it
//! - A face records one half-edge of its loop
//!
//! # Boundary Handling
//!
//! Boundary half-edges have no face. They are created during construction as
//! the pairs of unmatched face half-edges and are linked into closed loops
//! through their own `next`/`prev`, so every traversal below works the same
//! on open and closed meshes.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex. The only attribute operators mutate.
    pub position: Point3<f64>,

    /// RGB color in `[0, 1]`.
    pub color: Vector3<f32>,

    /// Stable id, equal to this vertex's index in the mesh.
    pub id: VertexId,

    /// One outgoing half-edge from this vertex, `None` for isolated vertices.
    pub outgoing: Option<HalfEdgeId>,
}

impl Vertex {
    /// Create an isolated vertex.
    pub fn new(id: VertexId, position: Point3<f64>, color: Vector3<f32>) -> Self {
        Self {
            position,
            color,
            id,
            outgoing: None,
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// The vertex this half-edge points to.
    pub head: VertexId,

    /// The face this half-edge belongs to. `None` for boundary half-edges.
    pub face: Option<FaceId>,

    /// The opposite half-edge.
    pub pair: HalfEdgeId,

    /// The previous half-edge around the face (or boundary loop).
    pub prev: HalfEdgeId,

    /// The next half-edge around the face (or boundary loop).
    pub next: HalfEdgeId,
}

impl HalfEdge {
    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.face.is_none()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

impl Face {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId) -> Self {
        Self { halfedge }
    }
}

/// A half-edge mesh.
///
/// The mesh exclusively owns its vertices, half-edges and faces; all
/// cross-references are indices into these arrays. Topology is fixed once
/// built (see [`HalfEdgeMesh::from_soup`]); operators only move vertices.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex>,

    /// All half-edges in the mesh, face half-edges first, boundary half-edges after.
    pub(crate) halfedges: Vec<HalfEdge>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges, boundary half-edges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Check whether the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check that a vertex id refers to a vertex of this mesh.
    pub fn check_vertex(&self, v: VertexId) -> Result<()> {
        if v.index() < self.vertices.len() {
            Ok(())
        } else {
            Err(MeshError::InvalidVertex {
                vertex: v.index(),
                count: self.vertices.len(),
            })
        }
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    ///
    /// Crate-internal so every public mutation reports a `MeshChange`.
    #[inline]
    pub(crate) fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertices[v.index()].position = pos;
    }

    /// Get the color of a vertex.
    #[inline]
    pub fn color(&self, v: VertexId) -> &Vector3<f32> {
        &self.vertex(v).color
    }

    /// Copy out every vertex position, indexed by vertex id.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    // ==================== Topology Queries ====================

    /// Get the pair (opposite) half-edge.
    #[inline]
    pub fn pair(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).pair
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the vertex a half-edge points to.
    #[inline]
    pub fn head(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).head
    }

    /// Get the vertex a half-edge starts from.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.head(self.pair(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> Option<FaceId> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Isolated vertices count as boundary vertices.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        if self.vertex(v).outgoing.is_none() {
            return true;
        }
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_halfedge(he))
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter()
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all boundary half-edges.
    pub fn boundary_halfedges(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedges()
            .filter(|(_, he)| he.is_boundary())
            .map(|(id, _)| id)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over the outgoing half-edges of a vertex.
    ///
    /// Starts at the vertex's stored outgoing half-edge and steps to
    /// `pair(prev(current))` until the start comes around again.
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex, in ring order.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_halfedges(v).map(|he| self.head(he))
    }

    /// Iterate over faces adjacent to a vertex.
    ///
    /// Boundary half-edges in the ring contribute no face.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_halfedges(v).filter_map(|he| self.face_of(he))
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// First vertex whose ring misses some of the half-edges leaving it.
    ///
    /// That happens when faces meet at the vertex in more than one fan. The
    /// ring must be traversable, i.e. `pair` and `prev` consistent.
    pub(crate) fn find_non_manifold_vertex(&self) -> Option<VertexId> {
        let mut leaving = vec![0usize; self.vertices.len()];
        for he in self.halfedge_ids() {
            leaving[self.origin(he).index()] += 1;
        }
        self.vertex_ids()
            .find(|&v| self.valence(v) != leaving[v.index()])
    }

    /// Find the outgoing half-edge of `v` whose head sits at the same position
    /// as `other`.
    ///
    /// Matching is by exact position, not id: if two vertices share a position
    /// the first one met in ring order wins. Use [`Self::edge_between_ids`] when
    /// that matters.
    pub fn edge_between(&self, v: VertexId, other: VertexId) -> Option<HalfEdgeId> {
        let target = self.position(other);
        self.vertex_halfedges(v)
            .find(|&he| self.position(self.head(he)) == target)
    }

    /// Find the half-edge `v -> other` by vertex id.
    pub fn edge_between_ids(&self, v: VertexId, other: VertexId) -> Option<HalfEdgeId> {
        self.vertex_halfedges(v).find(|&he| self.head(he) == other)
    }

    /// Iterate over the half-edges around a face, starting at its stored half-edge.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over the vertices of a face: heads of consecutive half-edges.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|he| self.head(he))
    }

    /// Number of vertices (and edges) of a face.
    pub fn face_vertex_count(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    // ==================== Geometry ====================

    /// Area of a face, summed over the fan of triangles `(v0, vi, vi+1)`.
    ///
    /// Exact for planar convex faces, an approximation otherwise.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let positions: Vec<Point3<f64>> =
            self.face_vertices(f).map(|v| *self.position(v)).collect();
        let Some((p0, rest)) = positions.split_first() else {
            return 0.0;
        };

        rest.windows(2)
            .map(|w| 0.5 * (w[0] - p0).cross(&(w[1] - p0)).norm())
            .sum()
    }

    /// Normal of a face from its first fan triangle: `(v1 - v0) x (v2 - v0)`.
    ///
    /// The result is not normalized; its length is twice the first triangle's area.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let mut vertices = self.face_vertices(f);
        match (vertices.next(), vertices.next(), vertices.next()) {
            (Some(v0), Some(v1), Some(v2)) => {
                let p0 = self.position(v0);
                (self.position(v1) - p0).cross(&(self.position(v2) - p0))
            }
            _ => Vector3::zeros(),
        }
    }

    /// Unit normal at a vertex.
    ///
    /// Sums `area(f) * normal(f)` over the faces around the vertex, divides by
    /// the number of faces, then normalizes.
    ///
    /// # Errors
    ///
    /// [`MeshError::NoIncidentFaces`] if no face touches the vertex and
    /// [`MeshError::DegenerateNormal`] if the weighted normals cancel out.
    pub fn vertex_normal(&self, v: VertexId) -> Result<Vector3<f64>> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for f in self.vertex_faces(v) {
            sum += self.face_area(f) * self.face_normal(f);
            count += 1;
        }

        if count == 0 {
            log::warn!("vertex {} has no incident faces", v.index());
            return Err(MeshError::NoIncidentFaces { vertex: v.index() });
        }

        let averaged = sum / count as f64;
        let len = averaged.norm();
        if !(len > 0.0 && len.is_finite()) {
            log::warn!("vertex {} normal has length {}", v.index(), len);
            return Err(MeshError::DegenerateNormal { vertex: v.index() });
        }
        Ok(averaged / len)
    }

    /// Total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    ///
    /// Verifies pair symmetry, `next`/`prev` inverses, that face loops close
    /// and carry their face, and that boundary half-edges only link to
    /// boundary half-edges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MeshError::InvalidState(msg));
        let n = self.halfedges.len();

        for (id, he) in self.halfedges() {
            for (link, target) in [("pair", he.pair), ("next", he.next), ("prev", he.prev)] {
                if target.index() >= n {
                    return invalid(format!("{:?}.{} points outside the mesh", id, link));
                }
            }
            if he.head.index() >= self.vertices.len() {
                return invalid(format!("{:?} has no valid head vertex", id));
            }
            if self.pair(he.pair) != id {
                return invalid(format!("{:?}.pair.pair != {:?}", id, id));
            }
            if he.pair == id {
                return invalid(format!("{:?} is its own pair", id));
            }
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return invalid(format!("{:?} next/prev are not inverse", id));
            }
            if self.head(he.prev) != self.origin(id) {
                return invalid(format!("{:?}.prev does not end at its origin", id));
            }
            if he.is_boundary() != self.is_boundary_halfedge(he.next) {
                return invalid(format!("{:?} links a face and a boundary loop", id));
            }
        }

        for (i, v) in self.vertices.iter().enumerate() {
            if v.id.index() != i {
                return invalid(format!("vertex {} carries id {:?}", i, v.id));
            }
            if let Some(he) = v.outgoing {
                if he.index() >= n || self.origin(he) != v.id {
                    return invalid(format!("vertex {} outgoing edge does not leave it", i));
                }
            }
        }

        for f in self.face_ids() {
            let start = self.face(f).halfedge;
            if start.index() >= n {
                return invalid(format!("{:?} has no valid half-edge", f));
            }
            let mut he = start;
            let mut steps = 0;
            loop {
                if self.face_of(he) != Some(f) {
                    return invalid(format!("{:?} in loop of {:?} has another face", he, f));
                }
                he = self.next(he);
                steps += 1;
                if he == start {
                    break;
                }
                if steps > n {
                    return invalid(format!("loop of {:?} does not close", f));
                }
            }
            if steps < 3 {
                return invalid(format!("{:?} has only {} edges", f, steps));
            }
        }

        if let Some(v) = self.find_non_manifold_vertex() {
            return invalid(format!("vertex {} joins more than one fan", v.index()));
        }

        Ok(())
    }
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).outgoing;
        Self {
            mesh,
            start,
            current: start,
        }
    }
}

impl Iterator for VertexHalfEdgeIter<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;

        // he goes v -> w; prev(he) ends at v, so its pair leaves v and is the
        // next outgoing half-edge around the ring.
        let step = self.mesh.pair(self.mesh.prev(result));
        self.current = if Some(step) == self.start { None } else { Some(step) };

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, f: FaceId) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: Some(start),
        }
    }
}

impl Iterator for FaceHalfEdgeIter<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        let step = self.mesh.next(result);
        self.current = if step == self.start { None } else { Some(step) };
        Some(result)
    }
}
