//! Index types for mesh elements.
//!
//! Vertices, half-edges and faces live in flat arrays owned by the mesh and
//! refer to each other through these `u32` handles. The wrappers keep the three
//! index spaces from being mixed up.

use std::fmt::{self, Debug};

macro_rules! impl_index_type {
    ($(#[$meta:meta])* $name:ident, $display:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// Panics in debug builds if the value does not fit in 32 bits.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize, "index {} too large for u32", index);
                Self(index as u32)
            }

            /// Get the index as `usize`, suitable for slice indexing.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw `u32` value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(
    /// A type-safe vertex index. Equal to the vertex's position in the input.
    VertexId,
    "V"
);
impl_index_type!(
    /// A type-safe half-edge index.
    HalfEdgeId,
    "HE"
);
impl_index_type!(
    /// A type-safe face index. Equal to the face's position in the input.
    FaceId,
    "F"
);

/// A directed edge `from -> to`, used to find each half-edge's reverse
/// during construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DirectedEdge {
    /// Origin vertex.
    pub from: VertexId,
    /// Head vertex.
    pub to: VertexId,
}

impl DirectedEdge {
    /// Create the directed edge `from -> to`.
    #[inline]
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self { from, to }
    }

    /// The same edge traversed the other way.
    #[inline]
    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert_eq!(v.raw(), 42u32);
        assert_eq!(VertexId::from(42usize), v);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", VertexId::new(42)), "V(42)");
        assert_eq!(format!("{:?}", HalfEdgeId::new(7)), "HE(7)");
        assert_eq!(format!("{:?}", FaceId::new(0)), "F(0)");
    }

    #[test]
    fn test_directed_edge_reversal() {
        let e = DirectedEdge::new(VertexId::new(1), VertexId::new(2));
        let r = e.reversed();
        assert_eq!(r.from, VertexId::new(2));
        assert_eq!(r.to, VertexId::new(1));
        assert_ne!(e, r);
        assert_eq!(r.reversed(), e);
    }
}
