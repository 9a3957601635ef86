//! Text marshaling - host strings ↔ C strings
//!
//! - `to_c_string()`: host text to a NUL-terminated argument
//! - `decode_bounded()`: native bytes back to host text
//!
//! # Memory Safety
//!
//! - Decoding never reads more than the declared capacity
//! - A missing terminator ends the string at the capacity
//! - A null pointer decodes to the empty string

use std::ffi::CString;
use std::os::raw::c_char;
use thiserror::Error;

/// Marshal error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarshalError {
    /// Host text contains a NUL byte and cannot cross as a C string
    #[error("String contains a NUL byte at offset {0}")]
    InteriorNul(usize),

    /// Native bytes are not valid UTF-8
    #[error("Invalid UTF-8 from native side: {0}")]
    InvalidUtf8(String),
}

/// Convert host text to a C string argument
pub fn to_c_string(text: &str) -> Result<CString, MarshalError> {
    CString::new(text).map_err(|e| MarshalError::InteriorNul(e.nul_position()))
}

/// Decode a NUL-terminated string, reading at most `capacity` bytes
///
/// # Safety
///
/// `ptr` must be null or readable up to its terminator or `capacity` bytes,
/// whichever comes first.
pub unsafe fn decode_bounded(ptr: *const c_char, capacity: usize) -> Result<String, MarshalError> {
    if ptr.is_null() {
        return Ok(String::new());
    }

    let bytes = ptr as *const u8;
    let mut len = 0;
    while len < capacity && *bytes.add(len) != 0 {
        len += 1;
    }

    let slice = std::slice::from_raw_parts(bytes, len);
    std::str::from_utf8(slice)
        .map(str::to_owned)
        .map_err(|e| MarshalError::InvalidUtf8(e.to_string()))
}
