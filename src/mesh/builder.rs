//! Mesh construction from polygon soup.
//!
//! Construction creates one half-edge per face edge, pairs opposite
//! half-edges through a directed-edge map, synthesizes boundary half-edges for
//! unmatched edges and links those into closed boundary loops. Input that
//! would leave the topology ambiguous is rejected instead of patched over.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{DirectedEdge, FaceId, HalfEdgeId, VertexId};
use super::soup::PolygonSoup;
use crate::error::{MeshError, Result};
use crate::render::MeshChange;

/// A half-edge whose links are still being filled in.
#[derive(Debug, Clone, Copy)]
struct HalfEdgeDraft {
    head: VertexId,
    face: Option<FaceId>,
    pair: Option<HalfEdgeId>,
    prev: Option<HalfEdgeId>,
    next: Option<HalfEdgeId>,
}

impl HalfEdgeDraft {
    fn finish(self, index: usize) -> Result<HalfEdge> {
        let missing = |link| MeshError::UnlinkedHalfEdge {
            halfedge: index,
            link,
        };
        Ok(HalfEdge {
            head: self.head,
            face: self.face,
            pair: self.pair.ok_or_else(|| missing("pair"))?,
            prev: self.prev.ok_or_else(|| missing("prev"))?,
            next: self.next.ok_or_else(|| missing("next"))?,
        })
    }
}

/// Build a half-edge mesh from a polygon soup.
///
/// # Errors
///
/// Fails on malformed faces (see [`PolygonSoup::validate`]), on a directed
/// edge claimed by two faces ([`MeshError::DuplicateHalfEdge`]) and on
/// vertices where faces meet in more than one fan
/// ([`MeshError::NonManifoldVertex`]), whether those fans are open or closed.
///
/// # Example
/// ```
/// use hemesh::mesh::{build_from_soup, PolygonSoup};
///
/// let mesh = build_from_soup(&PolygonSoup::unit_quad()).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_faces(), 1);
/// // 4 face half-edges + 4 boundary half-edges
/// assert_eq!(mesh.num_halfedges(), 8);
/// ```
pub fn build_from_soup(soup: &PolygonSoup) -> Result<HalfEdgeMesh> {
    soup.validate()?;

    let vertices: Vec<Vertex> = soup
        .positions
        .iter()
        .zip(&soup.colors)
        .enumerate()
        .map(|(i, (&p, &c))| Vertex::new(VertexId::new(i), p, c))
        .collect();

    let num_face_halfedges: usize = soup.faces.iter().map(Vec::len).sum();
    let mut mesh = HalfEdgeMesh {
        vertices,
        halfedges: Vec::new(),
        faces: Vec::with_capacity(soup.faces.len()),
    };

    let mut drafts: Vec<HalfEdgeDraft> = Vec::with_capacity(num_face_halfedges * 3 / 2);
    let mut keys: Vec<DirectedEdge> = Vec::with_capacity(num_face_halfedges);
    let mut edge_map: HashMap<DirectedEdge, HalfEdgeId> =
        HashMap::with_capacity(num_face_halfedges);

    // First pass: face half-edges, linked around each face
    for (fi, face) in soup.faces.iter().enumerate() {
        let face_id = FaceId::new(fi);
        let first = drafts.len();
        let n = face.len();

        for k in 0..n {
            let from = VertexId::new(face[k]);
            let to = VertexId::new(face[(k + 1) % n]);
            let he = HalfEdgeId::new(first + k);

            let key = DirectedEdge::new(from, to);
            if edge_map.insert(key, he).is_some() {
                return Err(MeshError::DuplicateHalfEdge {
                    from: from.index(),
                    to: to.index(),
                    face: fi,
                });
            }
            keys.push(key);

            drafts.push(HalfEdgeDraft {
                head: to,
                face: Some(face_id),
                pair: None,
                prev: Some(HalfEdgeId::new(first + (k + n - 1) % n)),
                next: Some(HalfEdgeId::new(first + (k + 1) % n)),
            });
            mesh.vertices[from.index()].outgoing = Some(he);
        }

        mesh.faces.push(Face::new(HalfEdgeId::new(first + n - 1)));
    }

    // Second pass: pair half-edges, synthesizing boundary pairs
    let mut boundary_by_origin: HashMap<VertexId, HalfEdgeId> = HashMap::new();
    for (i, &key) in keys.iter().enumerate() {
        if drafts[i].pair.is_some() {
            continue;
        }
        let he = HalfEdgeId::new(i);

        match edge_map.get(&key.reversed()) {
            Some(&twin) => {
                drafts[i].pair = Some(twin);
                drafts[twin.index()].pair = Some(he);
            }
            None => {
                let boundary = HalfEdgeId::new(drafts.len());
                drafts.push(HalfEdgeDraft {
                    head: key.from,
                    face: None,
                    pair: Some(he),
                    prev: None,
                    next: None,
                });
                drafts[i].pair = Some(boundary);

                if boundary_by_origin.insert(key.to, boundary).is_some() {
                    return Err(MeshError::NonManifoldVertex {
                        vertex: key.to.index(),
                    });
                }
            }
        }
    }

    // Third pass: link boundary half-edges into loops
    for b in num_face_halfedges..drafts.len() {
        let head = drafts[b].head;
        let next = *boundary_by_origin
            .get(&head)
            .ok_or(MeshError::NonManifoldVertex {
                vertex: head.index(),
            })?;
        drafts[b].next = Some(next);
        drafts[next.index()].prev = Some(HalfEdgeId::new(b));
    }

    mesh.halfedges = drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| d.finish(i))
        .collect::<Result<Vec<_>>>()?;

    if let Some(v) = mesh.find_non_manifold_vertex() {
        return Err(MeshError::NonManifoldVertex { vertex: v.index() });
    }

    log::debug!(
        "built half-edge mesh: {} vertices, {} faces, {} half-edges ({} boundary)",
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.num_halfedges(),
        mesh.num_halfedges() - num_face_halfedges
    );

    Ok(mesh)
}

impl HalfEdgeMesh {
    /// Build a mesh from a polygon soup. See [`build_from_soup`].
    pub fn from_soup(soup: &PolygonSoup) -> Result<Self> {
        build_from_soup(soup)
    }

    /// Replace the whole mesh with one built from `soup`.
    ///
    /// On error the current contents are left untouched.
    pub fn rebuild(&mut self, soup: &PolygonSoup) -> Result<MeshChange> {
        *self = build_from_soup(soup)?;
        Ok(MeshChange::Rebuilt)
    }
}

/// Convert a half-edge mesh back to a polygon soup.
///
/// Face loops start at each face's stored half-edge, so the result may be a
/// rotation of the original loops.
pub fn to_polygon_soup(mesh: &HalfEdgeMesh) -> PolygonSoup {
    let positions: Vec<Point3<f64>> = mesh.positions();
    let colors = mesh.vertices().map(|v| v.color).collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(VertexId::index).collect())
        .collect();

    PolygonSoup {
        positions,
        colors,
        faces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn two_triangles() -> PolygonSoup {
        // Two triangles sharing the edge 0-1
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        PolygonSoup::new(positions, vec![vec![0, 1, 2], vec![1, 0, 3]])
    }

    fn boundary_loop_len(mesh: &HalfEdgeMesh, start: HalfEdgeId) -> usize {
        let mut he = start;
        let mut len = 0;
        loop {
            assert!(mesh.is_boundary_halfedge(he));
            he = mesh.next(he);
            len += 1;
            if he == start {
                return len;
            }
        }
    }

    #[test]
    fn test_tetrahedron_is_closed() {
        let mesh = build_from_soup(&PolygonSoup::tetrahedron()).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.boundary_halfedges().count(), 0);

        for (id, he) in mesh.halfedges() {
            assert_eq!(mesh.pair(he.pair), id);
            assert!(mesh.face_of(he.pair).is_some());
        }
        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v), "{:?} should be interior", v);
        }
    }

    #[test]
    fn test_quad_boundary_loop() {
        let mesh = build_from_soup(&PolygonSoup::unit_quad()).unwrap();
        assert!(mesh.validate().is_ok());

        let boundary: Vec<HalfEdgeId> = mesh.boundary_halfedges().collect();
        assert_eq!(boundary.len(), 4);
        for he in mesh.face_halfedges(FaceId::new(0)) {
            assert!(mesh.is_boundary_halfedge(mesh.pair(he)));
        }

        // All four boundary twins form exactly one loop.
        assert_eq!(boundary_loop_len(&mesh, boundary[0]), 4);
    }

    #[test]
    fn test_boundary_loop_runs_clockwise() {
        let mesh = build_from_soup(&PolygonSoup::unit_quad()).unwrap();
        let start = mesh.boundary_halfedges().next().unwrap();
        // Boundary half-edges point against the face winding: 1 -> 0 -> 3 -> 2.
        let next = mesh.next(start);
        assert_eq!(mesh.origin(next), mesh.head(start));
        let face_edge = mesh.pair(start);
        assert_eq!(mesh.head(start), mesh.origin(face_edge));
        assert_eq!(mesh.origin(start), mesh.head(face_edge));
    }

    #[test]
    fn test_two_triangles() {
        let mesh = build_from_soup(&two_triangles()).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 6 face half-edges + 4 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.validate().is_ok());

        let boundary: Vec<HalfEdgeId> = mesh.boundary_halfedges().collect();
        assert_eq!(boundary_loop_len(&mesh, boundary[0]), 4);
    }

    #[test]
    fn test_grid_boundary_is_one_loop() {
        let n = 4;
        let mesh = build_from_soup(&PolygonSoup::grid(n, 1.0)).unwrap();
        assert!(mesh.validate().is_ok());

        let boundary: Vec<HalfEdgeId> = mesh.boundary_halfedges().collect();
        assert_eq!(boundary.len(), 4 * n);
        assert_eq!(boundary_loop_len(&mesh, boundary[0]), 4 * n);
    }

    #[test]
    fn test_duplicate_directed_edge_rejected() {
        // Second face repeats the directed edge 0 -> 1 instead of using 1 -> 0.
        let mut soup = two_triangles();
        soup.faces[1] = vec![0, 1, 3];
        let result = build_from_soup(&soup);
        assert!(matches!(
            result,
            Err(MeshError::DuplicateHalfEdge { from: 0, to: 1, face: 1 })
        ));
    }

    #[test]
    fn test_bowtie_vertex_rejected() {
        // Two triangles touching only at vertex 0.
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let soup = PolygonSoup::new(positions, vec![vec![0, 1, 2], vec![0, 3, 4]]);
        assert_eq!(
            build_from_soup(&soup).unwrap_err(),
            MeshError::NonManifoldVertex { vertex: 0 }
        );
    }

    /// A tetrahedron on vertices 0..4 plus `extra` faces over vertices 4.. that
    /// reuse vertex 0.
    fn tetrahedron_with(extra: &[[usize; 3]], num_extra_vertices: usize) -> PolygonSoup {
        let mut soup = PolygonSoup::tetrahedron();
        for i in 0..num_extra_vertices {
            soup.positions.push(Point3::new(3.0 + i as f64, 2.0, -1.0));
            soup.colors.push(Vector3::zeros());
        }
        soup.faces.extend(extra.iter().map(|f| f.to_vec()));
        soup
    }

    #[test]
    fn test_two_closed_fans_rejected() {
        // A second tetrahedron hanging off vertex 0.
        let soup = tetrahedron_with(&[[0, 4, 5], [0, 6, 4], [0, 5, 6], [4, 6, 5]], 3);
        assert_eq!(
            build_from_soup(&soup).unwrap_err(),
            MeshError::NonManifoldVertex { vertex: 0 }
        );
    }

    #[test]
    fn test_closed_and_open_fan_rejected() {
        let soup = tetrahedron_with(&[[0, 4, 5]], 2);
        assert_eq!(
            build_from_soup(&soup).unwrap_err(),
            MeshError::NonManifoldVertex { vertex: 0 }
        );
    }

    #[test]
    fn test_separate_tetrahedra_accepted() {
        let soup = tetrahedron_with(&[[5, 4, 6], [5, 7, 4], [5, 6, 7], [4, 7, 6]], 4);
        let mesh = build_from_soup(&soup).unwrap();
        assert!(mesh.validate().is_ok());
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.valence(v), 3);
        }
    }

    #[test]
    fn test_face_too_small() {
        let mut soup = two_triangles();
        soup.faces.push(vec![2, 3]);
        assert_eq!(
            build_from_soup(&soup).unwrap_err(),
            MeshError::FaceTooSmall { face: 2, len: 2 }
        );
    }

    #[test]
    fn test_vertex_ids_and_colors() {
        let colors = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 1.0, 0.0),
        ];
        let soup = two_triangles().with_colors(colors.clone());
        let mesh = build_from_soup(&soup).unwrap();
        for (i, v) in mesh.vertices().enumerate() {
            assert_eq!(v.id, VertexId::new(i));
            assert_eq!(v.color, colors[i]);
        }
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut mesh = build_from_soup(&PolygonSoup::tetrahedron()).unwrap();
        let change = mesh.rebuild(&PolygonSoup::unit_quad()).unwrap();
        assert_eq!(change, MeshChange::Rebuilt);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_halfedges(), 8);

        let mut bad = PolygonSoup::unit_quad();
        bad.faces[0].truncate(2);
        assert!(mesh.rebuild(&bad).is_err());
        assert_eq!(mesh.num_faces(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_roundtrip() {
        let soup = PolygonSoup::grid(2, 1.0);
        let mesh = build_from_soup(&soup).unwrap();
        let out = to_polygon_soup(&mesh);

        assert_eq!(out.positions, soup.positions);
        assert_eq!(out.colors, soup.colors);
        assert_eq!(out.faces.len(), soup.faces.len());
        // Loops start at the last input vertex's successor, which is the first.
        assert_eq!(out.faces, soup.faces);
    }
}
