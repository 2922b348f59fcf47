//! Key material for the crypto core
//!
//! Algorithm catalogs, symmetric keys, asymmetric key pairs, certificates,
//! PKCS#12 stores and the provider that generates, loads and derives them.

pub mod key_algorithm;
pub mod symmetric_key;
pub mod key_pair;
pub mod certificate;
pub mod key_store;
pub mod key_manager;

pub use key_algorithm::*;
pub use symmetric_key::*;
pub use key_pair::*;
pub use certificate::*;
pub use key_store::*;
pub use key_manager::*;
