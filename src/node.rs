use crate::utils::types::VertexIdx;
use core::fmt;

/// Classification of an index into the lifted point array.
///
/// A `casual node` has an index into the input vertex list.
///
/// A `ghost node` is a periodic image of an input vertex. It only exists while lifting and never
/// ends up in a tetrahedron of the result.
///
/// The `conceptual node` is the ceiling apex appended above the paraboloid, the lifted analog of a
/// point at infinity.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum VertexNode {
    /// A node that has an index into the input vertex list.
    Casual(VertexIdx),
    /// A periodic image `image` (0..26) of input vertex `of`.
    Ghost { of: VertexIdx, image: usize },
    /// The ceiling apex of the lift.
    Conceptual,
}

impl VertexNode {
    /// Classifies `idx` of a lifted array made of `num_casual` input points, followed by
    /// `num_ghosts` periodic images, followed by the ceiling apex.
    pub const fn classify(idx: VertexIdx, num_casual: usize, num_ghosts: usize) -> Self {
        if idx < num_casual {
            VertexNode::Casual(idx)
        } else if idx < num_casual + num_ghosts {
            let offset = idx - num_casual;
            VertexNode::Ghost {
                of: offset % num_casual,
                image: offset / num_casual,
            }
        } else {
            VertexNode::Conceptual
        }
    }

    /// Get the index of the node.
    pub const fn idx(&self) -> Option<VertexIdx> {
        match self {
            VertexNode::Casual(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Check if the node is an input vertex.
    pub const fn is_casual(&self) -> bool {
        matches!(self, VertexNode::Casual(_))
    }

    /// Check if the node is conceptual.
    pub const fn is_conceptual(&self) -> bool {
        matches!(self, VertexNode::Conceptual)
    }
}

impl fmt::Display for VertexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexNode::Casual(v_idx) => write!(f, "Casual({v_idx})"),
            VertexNode::Ghost { of, image } => write!(f, "Ghost({of}, image {image})"),
            VertexNode::Conceptual => write!(f, "Conceptual"),
        }
    }
}
