pub mod copy;
pub mod indexing;
#[cfg(feature = "native")]
pub mod repeat;
