// Type aliases for data values.
pub type Vertex3 = [f64; 3];
pub type Vertex4 = [f64; 4];
pub type Tetrahedron3 = [Vertex3; 4];
pub type Edge3 = [Vertex3; 2];

// Type aliases for data indices.
pub type VertexIdx = usize;
pub type Tetrahedron = [VertexIdx; 4];
pub type FaceKey = [VertexIdx; 3];
pub type EdgeKey = [VertexIdx; 2];

// Type aliases for data structure indices.
// This is to know, when a function accepts or returns a usize, what it is for.
pub type FacetIdx = usize;
pub type TetIdx = usize;
