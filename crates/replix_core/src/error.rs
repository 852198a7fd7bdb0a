use crate::dtype::DType;
#[cfg(feature = "native")]
use replix_native::native_error;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    OutOfMemory,
    DTypeMismatch {
        expected: DType,
        got: DType,
    },
    UnsupportedDType,
    InvalidArgument(String),
    IncompatibleShape(String),
    //
    BufferShared,
    GradLocked,
    InvalidShape {
        message: String,
    },
    ShapeMismatch {
        expected: usize,
        got: usize,
        msg: String,
    },
    DimensionMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    DimensionOutOfBounds {
        dim: i32,
        ndim: usize,
    },
    IndexOutOfBounds {
        index: usize,
        size: usize,
    },
    // native extension
    NativeExtensionMissing,
    NativeExtensionAlreadyInstalled,
    Native(String),
    //
    Internal {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "Out of memory"),
            Self::DTypeMismatch { expected, got } => {
                write!(f, "DType mismatch: expected {:?}, got {:?}", expected, got)
            }
            Self::UnsupportedDType => write!(f, "Unsupported data type"),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::IncompatibleShape(msg) => write!(f, "Incompatible shape: {}", msg),

            Self::BufferShared => write!(f, "Buffer is shared"),
            Self::GradLocked => write!(f, "Grad is locked"),
            Self::InvalidShape { message } => {
                write!(f, "Invalid shape: {}", message)
            }
            Self::ShapeMismatch { expected, got, msg } => {
                write!(f, "Shape mismatch ({}): expected {}, got {}", msg, expected, got)
            }
            Self::DimensionMismatch { expected, got } => {
                write!(f, "Dimension mismatch: expected {:?}, got {:?}", expected, got)
            }
            Self::DimensionOutOfBounds { dim, ndim } => {
                write!(
                    f,
                    "Dimension out of bounds: dimension {} is not valid for tensor with {} dimensions",
                    dim, ndim
                )
            }
            Self::IndexOutOfBounds { index, size } => {
                write!(f, "Index out of bounds: index {} is out of bounds for tensor with size {}", index, size)
            }
            Self::NativeExtensionMissing => write!(f, "Native extension is not present"),
            Self::NativeExtensionAlreadyInstalled => {
                write!(f, "Native extension was already installed or probed")
            }
            Self::Native(msg) => write!(f, "Native extension error: {}", msg),
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    #[cfg(feature = "native")]
    pub fn from_native_error(status: i32) -> Self {
        Self::Native(native_error(status))
    }
}
