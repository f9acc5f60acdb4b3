//! Geometric operators on a built mesh.
//!
//! Operators never change topology; they move vertices and report what they
//! moved as a [`MeshChange`](crate::render::MeshChange).
//!
//! - **Inflate/deflate**: push one vertex along its normal
//! - **Smoothing**: cotangent-weighted Laplacian smoothing and sharpening

pub mod inflate;
pub mod smooth;

pub use inflate::inflate_deflate;
pub use smooth::{laplacian_deltas, laplacian_smooth_sharpen, LaplacianMode, LaplacianOptions};
