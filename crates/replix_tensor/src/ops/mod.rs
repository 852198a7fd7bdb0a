pub mod indexing;
pub mod repeat;
pub mod transform;
