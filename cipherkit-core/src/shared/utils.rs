//! Utility functions for the crypto core
//!
//! Hex and base64 codecs used for every textual key, digest and ciphertext form.

use crate::shared::types::CryptoResult;
use base64::Engine;
use std::io::Read;

/// Encode bytes as lowercase hex without separators
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex text; either case is accepted
pub fn hex_decode(text: &str) -> CryptoResult<Vec<u8>> {
    Ok(hex::decode(text.trim())?)
}

/// Encode bytes as standard base64 without line wrapping
pub fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64
pub fn base64_decode(text: &str) -> CryptoResult<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(text.trim())?)
}

/// Read a stream to exhaustion
pub fn read_fully<R: Read>(mut reader: R) -> CryptoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}
