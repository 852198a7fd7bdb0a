//! Process-wide native extension registry.
//!
//! A native extension provides fused implementations of selected operations. Whether one is
//! present is decided once per process: the first lookup either takes the extension installed
//! with [`install_native_extension`] or probes for the built-in one (compiled in with the
//! `native` feature). The result never changes afterwards.

#[cfg(feature = "native")]
mod builtin;

#[cfg(feature = "native")]
pub use builtin::BuiltinExtension;

use crate::Tensor;
use replix_core::{
    error::{Error, Result},
    native::{get_native_policy, NativePolicy},
};
use std::sync::{Arc, OnceLock};

pub use replix_core::native::{set_native_policy, NATIVE_POLICY_ENV};

pub trait NativeExtension: Send + Sync {
    fn name(&self) -> &str;

    /// Writes the repeat-interleave of `values` into `out`. `dim` is already resolved;
    /// `None` means `values` is expanded as a flattened 1-D tensor.
    fn repeat_interleave_out(&self, out: &mut Tensor, values: &Tensor, repeats_or_scope: &Tensor, dim: Option<usize>) -> Result<()>;

    /// Allocates and fills a repeat-interleave result whose expanded dimension holds `out_length`
    /// entries, trusting the caller's length instead of summing the repeats first.
    fn repeat_interleave_out_shape(&self, values: &Tensor, repeats_or_scope: &Tensor, out_length: usize, dim: Option<usize>) -> Result<Tensor>;
}

pub enum NativeBackend {
    Available(Arc<dyn NativeExtension>),
    Unavailable,
}

impl NativeBackend {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn extension(&self) -> Option<&Arc<dyn NativeExtension>> {
        match self {
            Self::Available(extension) => Some(extension),
            Self::Unavailable => None,
        }
    }
}

static BACKEND: OnceLock<NativeBackend> = OnceLock::new();

fn probe() -> NativeBackend {
    #[cfg(feature = "native")]
    {
        let extension = BuiltinExtension;
        log::info!("native extension `{}` loaded", extension.name());
        NativeBackend::Available(Arc::new(extension))
    }

    #[cfg(not(feature = "native"))]
    {
        log::info!("no native extension present, using portable implementations");
        NativeBackend::Unavailable
    }
}

/// The process-wide backend, probing on first use.
pub fn native_backend() -> &'static NativeBackend {
    BACKEND.get_or_init(probe)
}

/// Installs `extension` as the process-wide backend. Only possible before the first lookup.
pub fn install_native_extension<E: NativeExtension + 'static>(extension: E) -> Result<()> {
    let mut installed = false;
    BACKEND.get_or_init(|| {
        installed = true;
        log::info!("native extension `{}` installed", extension.name());
        NativeBackend::Available(Arc::new(extension))
    });

    if installed {
        Ok(())
    } else {
        Err(Error::NativeExtensionAlreadyInstalled)
    }
}

pub fn native_extension() -> Option<&'static Arc<dyn NativeExtension>> {
    native_backend().extension()
}

pub fn is_native_extension_available() -> bool {
    native_backend().is_available()
}

/// True when the current policy allows native code and an extension is present.
pub fn use_native_extension() -> bool {
    get_native_policy() != NativePolicy::Disable && is_native_extension_available()
}

/// The extension that must serve an operation, or [`Error::NativeExtensionMissing`].
pub fn require_native_extension() -> Result<&'static Arc<dyn NativeExtension>> {
    native_extension().ok_or(Error::NativeExtensionMissing)
}
