//! Symmetric encryption
//!
//! Transformation parsing, padding, modes of operation and the thread-safe
//! symmetric cipher built on them.

pub mod cipher_spec;
pub mod symmetric_crypto;
mod padding;
pub(crate) mod block_mode;

pub use cipher_spec::*;
pub use symmetric_crypto::*;
