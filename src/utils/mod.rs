pub mod linalg;
pub mod types;
