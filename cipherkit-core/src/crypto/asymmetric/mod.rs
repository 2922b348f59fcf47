//! Asymmetric cryptography
//!
//! Key-pair based signing and block-chunked encryption.

pub mod key_type;
pub mod asymmetric_crypto;

pub use key_type::*;
pub use asymmetric_crypto::*;
