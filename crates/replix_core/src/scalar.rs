use crate::dtype::DType;
use half::{bf16, f16};
use std::fmt;

macro_rules! numeric_variants {
    ($($variant:ident => $type:ty),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum Scalar {
            BOOL(bool),
            $($variant($type),)*
        }

        impl Scalar {
            #[inline]
            pub fn new<T: Into<Self>>(value: T) -> Self {
                value.into()
            }

            #[inline]
            pub fn dtype(&self) -> DType {
                match self {
                    Self::BOOL(_) => DType::BOOL,
                    $(Self::$variant(_) => DType::$variant,)*
                }
            }

            #[inline]
            pub fn is_int(&self) -> bool {
                self.dtype().is_int()
            }

            #[inline]
            pub fn is_float(&self) -> bool {
                self.dtype().is_float()
            }

            #[inline]
            pub fn as_f64_any(&self) -> f64 {
                match *self {
                    Self::BOOL(x) => if x { 1.0 } else { 0.0 },
                    $(
                        Self::$variant(x) => {
                            numeric_variants!(@as_f64 $variant, x)
                        },
                    )*
                }
            }

            $(
                paste::paste! {
                    #[inline]
                    pub fn [<as_ $variant:lower>](&self) -> $type {
                        match *self {
                            Self::$variant(x) => x,
                            _ => numeric_variants!(@convert $variant => self.as_f64_any()),
                        }
                    }
                }
            )*

            #[inline]
            pub fn as_bool(&self) -> bool {
                match *self {
                    Self::BOOL(x) => x,
                    _ => self.as_f64_any() != 0.0,
                }
            }
        }

        impl From<bool> for Scalar {
            #[inline]
            fn from(x: bool) -> Self {
                Self::BOOL(x)
            }
        }

        $(
            impl From<$type> for Scalar {
                #[inline]
                fn from(x: $type) -> Self {
                    Self::$variant(x)
                }
            }
        )*
    };

    (@as_f64 BF16, $x:ident) => {
        f32::from($x) as f64
    };
    (@as_f64 F16, $x:ident) => {
        f32::from($x) as f64
    };
    (@as_f64 $variant:ident, $x:ident) => {
        $x as f64
    };

    (@convert BF16 => $val:expr) => {
        bf16::from_f64($val)
    };
    (@convert F16 => $val:expr) => {
        f16::from_f64($val)
    };
    (@convert F32 => $val:expr) => {
        $val as f32
    };
    (@convert F64 => $val:expr) => {
        $val
    };
    (@convert U8  => $val:expr) => {
        $val.clamp(0.0, u8::MAX as f64) as u8
    };
    (@convert I8  => $val:expr) => {
        $val.clamp(i8::MIN as f64, i8::MAX as f64) as i8
    };
    (@convert U32 => $val:expr) => {
        $val.clamp(0.0, u32::MAX as f64) as u32
    };
    (@convert I32 => $val:expr) => {
        $val.clamp(i32::MIN as f64, i32::MAX as f64) as i32
    };
    (@convert I64 => $val:expr) => {
        $val.clamp(i64::MIN as f64, i64::MAX as f64) as i64
    };
}

numeric_variants! {
    BF16 => bf16,
    F16  => f16,
    F32  => f32,
    F64  => f64,
    U8   => u8,
    I8   => i8,
    U32  => u32,
    I32  => i32,
    I64  => i64,
}

impl Scalar {
    /// Integer view of the value, exact for every integer variant.
    #[inline]
    pub fn to_i64(&self) -> i64 {
        match *self {
            Self::BOOL(x) => x as i64,
            Self::U8(x) => x as i64,
            Self::I8(x) => x as i64,
            Self::U32(x) => x as i64,
            Self::I32(x) => x as i64,
            Self::I64(x) => x,
            _ => self.as_i64(),
        }
    }
}

impl From<usize> for Scalar {
    #[inline]
    fn from(x: usize) -> Self {
        if x <= u32::MAX as usize {
            Scalar::U32(x as u32)
        } else {
            Scalar::I64(x as i64)
        }
    }
}

impl From<isize> for Scalar {
    #[inline]
    fn from(x: isize) -> Self {
        if x >= i32::MIN as isize && x <= i32::MAX as isize {
            Scalar::I32(x as i32)
        } else {
            Scalar::I64(x as i64)
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BOOL(x) => write!(f, "{}", x),
            Self::BF16(x) => write!(f, "{}", x),
            Self::F16(x) => write!(f, "{}", x),
            Self::F32(x) => write!(f, "{}", x),
            Self::F64(x) => write!(f, "{}", x),
            Self::U8(x) => write!(f, "{}", x),
            Self::I8(x) => write!(f, "{}", x),
            Self::U32(x) => write!(f, "{}", x),
            Self::I32(x) => write!(f, "{}", x),
            Self::I64(x) => write!(f, "{}", x),
        }
    }
}

impl DType {
    /// # Safety
    /// `ptr` must be valid for a read of `self.size_in_bytes()` bytes.
    pub unsafe fn read_scalar(&self, ptr: *const u8) -> Scalar {
        match self {
            Self::BF16 => Scalar::BF16(std::ptr::read_unaligned(ptr as *const bf16)),
            Self::F16 => Scalar::F16(std::ptr::read_unaligned(ptr as *const f16)),
            Self::F32 => Scalar::F32(std::ptr::read_unaligned(ptr as *const f32)),
            Self::F64 => Scalar::F64(std::ptr::read_unaligned(ptr as *const f64)),
            Self::BOOL => Scalar::BOOL(*ptr != 0),
            Self::U8 => Scalar::U8(*ptr),
            Self::U32 => Scalar::U32(std::ptr::read_unaligned(ptr as *const u32)),
            Self::I8 => Scalar::I8(*ptr as i8),
            Self::I32 => Scalar::I32(std::ptr::read_unaligned(ptr as *const i32)),
            Self::I64 => Scalar::I64(std::ptr::read_unaligned(ptr as *const i64)),
        }
    }

    /// # Safety
    /// `ptr` must be valid for a write of `self.size_in_bytes()` bytes.
    pub unsafe fn write_scalar(&self, ptr: *mut u8, value: Scalar) {
        match self {
            Self::BF16 => std::ptr::write_unaligned(ptr as *mut bf16, value.as_bf16()),
            Self::F16 => std::ptr::write_unaligned(ptr as *mut f16, value.as_f16()),
            Self::F32 => std::ptr::write_unaligned(ptr as *mut f32, value.as_f32()),
            Self::F64 => std::ptr::write_unaligned(ptr as *mut f64, value.as_f64()),
            Self::BOOL => *ptr = value.as_bool() as u8,
            Self::U8 => *ptr = value.as_u8(),
            Self::U32 => std::ptr::write_unaligned(ptr as *mut u32, value.as_u32()),
            Self::I8 => *ptr = value.as_i8() as u8,
            Self::I32 => std::ptr::write_unaligned(ptr as *mut i32, value.as_i32()),
            Self::I64 => std::ptr::write_unaligned(ptr as *mut i64, value.to_i64()),
        }
    }
}
