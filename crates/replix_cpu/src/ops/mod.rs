pub mod copy;
pub mod indexing;
