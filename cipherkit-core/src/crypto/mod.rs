//! Cryptographic operations
//!
//! Key material, digests and HMAC, symmetric and asymmetric ciphers.

pub mod keys;
pub mod hashing;
pub mod encryption;
pub mod asymmetric;

pub use keys::*;
pub use hashing::*;
pub use encryption::*;
pub use asymmetric::*;
