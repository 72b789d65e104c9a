//! Binary codec for image payloads.
//!
//! This module contains:
//! - `hex`: hex digit strings to bytes and back
//! - `base64`: base64 and data URI encoding
//! - `signature`: image type detection from magic bytes

pub mod base64;
pub mod hex;
pub mod signature;

// Re-export main functions for convenience
pub use self::base64::{bytes_to_base64, data_uri};
pub use self::hex::{bytes_to_hex, hex_to_bytes};
pub use self::signature::detect_signature;
