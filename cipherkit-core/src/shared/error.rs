//! Error handling for the crypto core
//!
//! Every failure coming out of the underlying primitives is mapped to one of
//! the variants below at the call site, so callers only ever see this enum.

use thiserror::Error;

/// Crypto error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("Crypto operation failed: {0}")]
    CryptoOperation(String),

    #[error("Key decode error: {0}")]
    KeyDecode(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CryptoError {
    /// Create an unsupported algorithm error
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(message.into())
    }

    /// Create an invalid key material error
    pub fn invalid_key_material(message: impl Into<String>) -> Self {
        Self::InvalidKeyMaterial(message.into())
    }

    /// Create a missing key error
    pub fn missing_key(message: impl Into<String>) -> Self {
        Self::MissingKey(message.into())
    }

    /// Create a crypto operation error
    pub fn crypto_operation(message: impl Into<String>) -> Self {
        Self::CryptoOperation(message.into())
    }

    /// Create a key decode error
    pub fn key_decode(message: impl Into<String>) -> Self {
        Self::KeyDecode(message.into())
    }

    /// Create a codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// Standard library error conversions
impl From<std::io::Error> for CryptoError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("Read failed: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for CryptoError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::codec(format!("Invalid UTF-8: {}", err))
    }
}

// Codec error conversions
impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        Self::codec(format!("Hex decoding error: {}", err))
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        Self::codec(format!("Base64 decoding error: {}", err))
    }
}
