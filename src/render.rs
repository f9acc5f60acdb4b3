//! Render buffers and change tracking.
//!
//! The renderer consumes flat vertex and index arrays. Every operation that
//! mutates a mesh returns a [`MeshChange`]; handing it to
//! [`RenderCache::invalidate`] marks the cached buffers stale, and the next
//! [`RenderCache::buffers`] call refreshes only what changed.
//!
//! ```
//! use hemesh::prelude::*;
//! use hemesh::algo::inflate_deflate;
//! use hemesh::render::RenderCache;
//!
//! let mut mesh = HalfEdgeMesh::from_soup(&PolygonSoup::tetrahedron()).unwrap();
//! let mut cache = RenderCache::new();
//! assert_eq!(cache.buffers(&mesh).triangles.len(), 12);
//!
//! let change = inflate_deflate(&mut mesh, VertexId::new(0), 0.5).unwrap();
//! cache.invalidate(change);
//! assert!(cache.is_stale());
//! let moved: [f32; 3] = mesh.position(VertexId::new(0)).cast::<f32>().into();
//! assert_eq!(cache.buffers(&mesh).positions[0], moved);
//! ```

use crate::mesh::HalfEdgeMesh;

/// What a mesh operation changed.
#[must_use = "pass the change to RenderCache::invalidate so render buffers stay current"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshChange {
    /// Nothing was modified.
    Unchanged,
    /// Vertex positions moved; topology and colors are as before.
    Positions {
        /// Number of vertices written.
        moved: usize,
    },
    /// The mesh was rebuilt from scratch.
    Rebuilt,
}

impl MeshChange {
    /// Whether cached render data must be refreshed.
    pub fn is_dirty(self) -> bool {
        !matches!(self, MeshChange::Unchanged)
    }
}

/// Flat buffers for a renderer. Indices are vertex ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffers {
    /// One position per vertex.
    pub positions: Vec<[f32; 3]>,
    /// One color per vertex.
    pub colors: Vec<[f32; 3]>,
    /// Fan triangulation of every face, three indices per triangle.
    pub triangles: Vec<u32>,
    /// Two indices (origin, head) per half-edge.
    pub edges: Vec<u32>,
}

impl RenderBuffers {
    /// Build all buffers from a mesh.
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Self {
        let mut buffers = Self {
            positions: Vec::new(),
            colors: mesh.vertices().map(|v| v.color.into()).collect(),
            triangles: triangle_indices(mesh),
            edges: edge_indices(mesh),
        };
        buffers.refresh_positions(mesh);
        buffers
    }

    /// Re-read vertex positions, keeping index buffers.
    pub fn refresh_positions(&mut self, mesh: &HalfEdgeMesh) {
        self.positions.clear();
        self.positions
            .extend(mesh.vertices().map(|v| -> [f32; 3] { v.position.cast::<f32>().into() }));
    }

    /// Number of triangles in the triangle buffer.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Position buffer as raw bytes, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Color buffer as raw bytes.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Triangle index buffer as raw bytes.
    pub fn triangle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    /// Edge index buffer as raw bytes.
    pub fn edge_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.edges)
    }
}

/// Fan-triangulate every face: `(v0, vi, vi+1)` for each face loop.
pub fn triangle_indices(mesh: &HalfEdgeMesh) -> Vec<u32> {
    let mut indices = Vec::with_capacity(mesh.num_faces() * 3);
    for f in mesh.face_ids() {
        let loop_ids: Vec<u32> = mesh.face_vertices(f).map(|v| v.raw()).collect();
        let Some((&first, rest)) = loop_ids.split_first() else {
            continue;
        };
        for w in rest.windows(2) {
            indices.extend_from_slice(&[first, w[0], w[1]]);
        }
    }
    indices
}

/// Two indices per half-edge, so interior edges appear once in each direction.
pub fn edge_indices(mesh: &HalfEdgeMesh) -> Vec<u32> {
    mesh.halfedge_ids()
        .flat_map(|he| [mesh.origin(he).raw(), mesh.head(he).raw()])
        .collect()
}

/// Lazily rebuilt render buffers.
#[derive(Debug, Default)]
pub struct RenderCache {
    buffers: Option<RenderBuffers>,
    positions_stale: bool,
}

impl RenderCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mesh change.
    pub fn invalidate(&mut self, change: MeshChange) {
        match change {
            MeshChange::Unchanged => {}
            MeshChange::Positions { .. } => self.positions_stale = true,
            MeshChange::Rebuilt => {
                self.buffers = None;
                self.positions_stale = false;
            }
        }
    }

    /// Whether the next [`Self::buffers`] call will do any work.
    pub fn is_stale(&self) -> bool {
        self.buffers.is_none() || self.positions_stale
    }

    /// Current buffers for `mesh`, refreshed if stale.
    ///
    /// `mesh` must be the mesh whose changes were reported to this cache.
    pub fn buffers(&mut self, mesh: &HalfEdgeMesh) -> &RenderBuffers {
        if self.positions_stale {
            if let Some(buffers) = self.buffers.as_mut() {
                log::debug!("refreshing {} cached positions", mesh.num_vertices());
                buffers.refresh_positions(mesh);
            }
            self.positions_stale = false;
        }
        self.buffers.get_or_insert_with(|| {
            log::debug!("building render buffers for {} faces", mesh.num_faces());
            RenderBuffers::from_mesh(mesh)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{PolygonSoup, VertexId};
    use nalgebra::Point3;

    #[test]
    fn test_quad_fan() {
        let mesh = HalfEdgeMesh::from_soup(&PolygonSoup::unit_quad()).unwrap();
        assert_eq!(triangle_indices(&mesh), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_edge_buffer_covers_every_halfedge() {
        let mesh = HalfEdgeMesh::from_soup(&PolygonSoup::tetrahedron()).unwrap();
        let edges = edge_indices(&mesh);
        assert_eq!(edges.len(), 2 * mesh.num_halfedges());

        // Each undirected edge shows up once in each direction.
        let pairs: Vec<(u32, u32)> = edges.chunks(2).map(|c| (c[0], c[1])).collect();
        for &(a, b) in &pairs {
            assert!(pairs.contains(&(b, a)));
        }
    }

    #[test]
    fn test_boundary_halfedges_are_emitted() {
        let mesh = HalfEdgeMesh::from_soup(&PolygonSoup::unit_quad()).unwrap();
        assert_eq!(edge_indices(&mesh).len(), 16);
    }

    #[test]
    fn test_buffers_match_mesh() {
        let mesh = HalfEdgeMesh::from_soup(&PolygonSoup::grid(2, 1.0)).unwrap();
        let buffers = RenderBuffers::from_mesh(&mesh);
        assert_eq!(buffers.positions.len(), 9);
        assert_eq!(buffers.colors.len(), 9);
        assert_eq!(buffers.num_triangles(), 8);
        assert_eq!(buffers.position_bytes().len(), 9 * 12);
        assert_eq!(buffers.triangle_bytes().len(), 24 * 4);
        assert_eq!(buffers.color_bytes().len(), 9 * 12);
        assert_eq!(buffers.edge_bytes().len(), buffers.edges.len() * 4);
    }

    #[test]
    fn test_cache_refreshes_positions_only_when_told() {
        let mut mesh = HalfEdgeMesh::from_soup(&PolygonSoup::unit_quad()).unwrap();
        let mut cache = RenderCache::new();
        assert!(cache.is_stale());
        let before = cache.buffers(&mesh).clone();
        assert!(!cache.is_stale());

        let v = VertexId::new(1);
        mesh.set_position(v, Point3::new(2.0, 0.0, 0.0));
        assert_eq!(cache.buffers(&mesh), &before);

        cache.invalidate(MeshChange::Positions { moved: 1 });
        assert!(cache.is_stale());
        let after = cache.buffers(&mesh);
        assert_eq!(after.positions[1], [2.0, 0.0, 0.0]);
        assert_eq!(after.triangles, before.triangles);
    }

    #[test]
    fn test_cache_rebuild() {
        let mut mesh = HalfEdgeMesh::from_soup(&PolygonSoup::unit_quad()).unwrap();
        let mut cache = RenderCache::new();
        assert_eq!(cache.buffers(&mesh).num_triangles(), 2);

        let change = mesh.rebuild(&PolygonSoup::tetrahedron()).unwrap();
        assert!(change.is_dirty());
        cache.invalidate(change);
        assert_eq!(cache.buffers(&mesh).num_triangles(), 4);

        cache.invalidate(MeshChange::Unchanged);
        assert!(!cache.is_stale());
    }
}
