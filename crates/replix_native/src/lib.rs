pub mod ops;

pub const NATIVE_SUCCESS: i32 = 0;
pub const NATIVE_INVALID_SCOPE: i32 = 1;
pub const NATIVE_REPEATS_MISMATCH: i32 = 2;
pub const NATIVE_NEGATIVE_REPEAT: i32 = 3;
pub const NATIVE_OUTPUT_LENGTH_MISMATCH: i32 = 4;
pub const NATIVE_REPEAT_OVERFLOW: i32 = 5;

/// Converts a native kernel status code into a human-readable string
pub fn native_error(status: i32) -> String {
    match status {
        NATIVE_SUCCESS => "success".to_string(),
        NATIVE_INVALID_SCOPE => "repeats must be one-dimensional or a two-column scope".to_string(),
        NATIVE_REPEATS_MISMATCH => "number of repeats does not match the size of the repeated dimension".to_string(),
        NATIVE_NEGATIVE_REPEAT => "repeats must be non-negative".to_string(),
        NATIVE_OUTPUT_LENGTH_MISMATCH => "sum of repeats does not match the requested output length".to_string(),
        NATIVE_REPEAT_OVERFLOW => "sum of repeats overflows the index range".to_string(),
        _ => format!("Unknown native error: {}", status),
    }
}
