//! Moving a single vertex along its normal.

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};
use crate::render::MeshChange;

/// Move vertex `v` by `factor` along its unit normal.
///
/// Positive factors push the vertex outward (inflate), negative factors pull
/// it inward (deflate). Only `v` moves, so no staging is needed.
///
/// # Errors
///
/// [`MeshError::InvalidVertex`] for an unknown vertex,
/// [`MeshError::InvalidParameter`] for a non-finite factor, and the errors of
/// [`HalfEdgeMesh::vertex_normal`] when the normal is undefined. The mesh is
/// unchanged on error.
///
/// # Example
///
/// ```
/// use hemesh::prelude::*;
/// use hemesh::algo::inflate_deflate;
///
/// let mut mesh = HalfEdgeMesh::from_soup(&PolygonSoup::unit_quad()).unwrap();
/// let v = VertexId::new(0);
/// inflate_deflate(&mut mesh, v, 0.25).unwrap();
/// assert!((mesh.position(v).z - 0.25).abs() < 1e-12);
/// ```
pub fn inflate_deflate(mesh: &mut HalfEdgeMesh, v: VertexId, factor: f64) -> Result<MeshChange> {
    mesh.check_vertex(v)?;
    if !factor.is_finite() {
        return Err(MeshError::invalid_param("factor", factor, "must be finite"));
    }

    let normal = mesh.vertex_normal(v)?;
    let moved = *mesh.position(v) + normal * factor;
    mesh.set_position(v, moved);

    log::debug!("moved vertex {} by {} along its normal", v.index(), factor);
    Ok(MeshChange::Positions { moved: 1 })
}
