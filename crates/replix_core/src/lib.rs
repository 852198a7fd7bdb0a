pub mod be;
pub mod buffer;
pub mod dtype;
pub mod error;
pub mod layout;
pub mod native;
pub mod scalar;

pub use replix_cpu as cpu;
#[cfg(feature = "native")]
pub use replix_native as native_kernels;
