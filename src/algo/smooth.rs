//! Curvature-flow Laplacian smoothing and sharpening.
//!
//! Each vertex moves toward (smoothing) or away from (sharpening) the
//! cotangent-weighted average of its neighbors. Every pass is two-phase: all
//! displacements are computed from one snapshot of the positions, then all
//! positions are written, so the result does not depend on vertex order.
//!
//! # Example
//!
//! ```
//! use hemesh::prelude::*;
//! use hemesh::algo::smooth::{laplacian_smooth_sharpen, LaplacianOptions};
//!
//! let mut soup = PolygonSoup::grid(4, 1.0);
//! soup.positions[12].z = 1.0; // bump in the middle
//! let mut mesh = HalfEdgeMesh::from_soup(&soup).unwrap();
//!
//! let change = laplacian_smooth_sharpen(&mut mesh, &LaplacianOptions::default()).unwrap();
//! assert!(change.is_dirty());
//! assert!(mesh.position(VertexId::new(12)).z < 1.0);
//! ```

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, VertexId};
use crate::render::MeshChange;

/// Direction of a Laplacian pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaplacianMode {
    /// Move each vertex onto its weighted neighbor average.
    #[default]
    Smooth,
    /// Move each vertex away from its weighted neighbor average by the same amount.
    Sharpen,
}

impl LaplacianMode {
    /// Build a mode from the `smooth` flag the UI passes around.
    pub fn from_smooth_flag(smooth: bool) -> Self {
        if smooth {
            LaplacianMode::Smooth
        } else {
            LaplacianMode::Sharpen
        }
    }

    /// Factor applied to each displacement.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            LaplacianMode::Smooth => 1.0,
            LaplacianMode::Sharpen => -1.0,
        }
    }
}

/// Options for Laplacian smoothing and sharpening.
#[derive(Debug, Clone)]
pub struct LaplacianOptions {
    /// Smooth or sharpen.
    pub mode: LaplacianMode,

    /// Number of full two-phase passes.
    pub iterations: usize,

    /// Compute displacements on the rayon pool (default: false).
    ///
    /// Displacements only read the snapshot, so the result is identical
    /// either way.
    pub parallel: bool,
}

impl Default for LaplacianOptions {
    fn default() -> Self {
        Self {
            mode: LaplacianMode::Smooth,
            iterations: 1,
            parallel: false,
        }
    }
}

impl LaplacianOptions {
    /// Create options with the specified number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the pass direction.
    pub fn with_mode(mut self, mode: LaplacianMode) -> Self {
        self.mode = mode;
        self
    }

    /// Create options that sharpen instead of smooth.
    pub fn sharpen(self) -> Self {
        self.with_mode(LaplacianMode::Sharpen)
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Smooth or sharpen every vertex of the mesh.
///
/// Runs `options.iterations` two-phase passes. If any pass fails the mesh is
/// restored to its positions from before the call.
///
/// # Errors
///
/// [`MeshError::ZeroWeightSum`] if the cotangent weights around some vertex
/// sum to zero or a non-finite value, which includes isolated vertices.
pub fn laplacian_smooth_sharpen(
    mesh: &mut HalfEdgeMesh,
    options: &LaplacianOptions,
) -> Result<MeshChange> {
    if options.iterations == 0 || mesh.is_empty() {
        return Ok(MeshChange::Unchanged);
    }

    let original = mesh.positions();
    let sign = options.mode.sign();

    for iter in 0..options.iterations {
        // Pass 1: displacements from the current snapshot
        let deltas = match laplacian_deltas(mesh, options.parallel) {
            Ok(deltas) => deltas,
            Err(err) => {
                restore_positions(mesh, &original);
                return Err(err);
            }
        };

        // Pass 2: commit
        for (i, delta) in deltas.iter().enumerate() {
            let v = VertexId::new(i);
            let moved = *mesh.position(v) + *delta * sign;
            mesh.set_position(v, moved);
        }

        log::debug!(
            "{:?} pass {}/{}: max displacement {:.3e}",
            options.mode,
            iter + 1,
            options.iterations,
            deltas.iter().map(|d| d.norm()).fold(0.0, f64::max)
        );
    }

    Ok(MeshChange::Positions {
        moved: mesh.num_vertices(),
    })
}

/// Compute the displacement `Q_i - P_i` of every vertex without moving anything.
///
/// `Q_i` is the cotangent-weighted average of the neighbors of vertex `i`.
/// Smoothing adds the displacement, sharpening subtracts it.
pub fn laplacian_deltas(mesh: &HalfEdgeMesh, parallel: bool) -> Result<Vec<Vector3<f64>>> {
    let n = mesh.num_vertices();
    if parallel {
        (0..n)
            .into_par_iter()
            .map(|i| vertex_delta(mesh, VertexId::new(i)))
            .collect()
    } else {
        (0..n).map(|i| vertex_delta(mesh, VertexId::new(i))).collect()
    }
}

/// Displacement of one vertex toward its cotangent-weighted neighbor average.
fn vertex_delta(mesh: &HalfEdgeMesh, v: VertexId) -> Result<Vector3<f64>> {
    let pos = mesh.position(v);

    let mut weighted_sum = Vector3::zeros();
    let mut weight_total = 0.0;

    for he in mesh.vertex_halfedges(v) {
        let weight = edge_cotangent_weight(mesh, he);
        weighted_sum += weight * mesh.position(mesh.head(he)).coords;
        weight_total += weight;
    }

    if !(weight_total > 0.0 && weight_total.is_finite()) {
        log::warn!(
            "vertex {} has cotangent weight sum {}",
            v.index(),
            weight_total
        );
        return Err(MeshError::ZeroWeightSum {
            vertex: v.index(),
            total: weight_total,
        });
    }

    Ok(weighted_sum / weight_total - pos.coords)
}

/// Cotangent weight `(cot α + cot β) / 2` of the edge `he = (i -> j)`.
///
/// α sits at the head of `pair(prev(he))` and β at the head of
/// `pair(prev(pair(he)))`. On a boundary edge one of those walks runs along
/// the boundary loop instead of through a face.
fn edge_cotangent_weight(mesh: &HalfEdgeMesh, he: HalfEdgeId) -> f64 {
    let pi = mesh.position(mesh.origin(he));
    let pj = mesh.position(mesh.head(he));

    let opp1 = mesh.position(mesh.head(mesh.pair(mesh.prev(he))));
    let opp2 = mesh.position(mesh.head(mesh.pair(mesh.prev(mesh.pair(he)))));

    let alpha = angle_at(opp1, pi, pj);
    let beta = angle_at(opp2, pi, pj);

    (clamped_cot(alpha) + clamped_cot(beta)) * 0.5
}

/// Angle at `apex` between the rays toward `a` and `b`, in `[0, π]`.
///
/// Zero if either ray has zero length.
fn angle_at(apex: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let u = a - apex;
    let w = b - apex;
    u.cross(&w).norm().atan2(u.dot(&w))
}

/// `cot(angle)`, taken as 1 whenever `tan(angle) <= 0`.
fn clamped_cot(angle: f64) -> f64 {
    let t = angle.tan();
    if t <= 0.0 {
        1.0
    } else {
        1.0 / t
    }
}

fn restore_positions(mesh: &mut HalfEdgeMesh, positions: &[Point3<f64>]) {
    for (i, &p) in positions.iter().enumerate() {
        mesh.set_position(VertexId::new(i), p);
    }
}
