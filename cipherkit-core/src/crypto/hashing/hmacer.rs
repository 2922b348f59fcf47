//! Keyed digests over the RustCrypto `hmac` crate

use crate::crypto::keys::KeyManager;
use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;
use super::{DigestEngine, HmacAlgorithm};

enum MacState {
    Md5(Hmac<Md5>),
    Sha1(Hmac<Sha1>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

macro_rules! with_mac {
    ($state:expr, $mac:ident => $body:expr) => {
        match $state {
            MacState::Md5($mac) => $body,
            MacState::Sha1($mac) => $body,
            MacState::Sha256($mac) => $body,
            MacState::Sha384($mac) => $body,
            MacState::Sha512($mac) => $body,
        }
    };
}

impl MacState {
    fn new(algorithm: HmacAlgorithm, key: &[u8]) -> CryptoResult<Self> {
        let invalid = |e: hmac::digest::InvalidLength| CryptoError::invalid_key_material(format!("{} key rejected: {}", algorithm, e));
        Ok(match algorithm {
            HmacAlgorithm::HmacMd5 => MacState::Md5(<Hmac<Md5> as Mac>::new_from_slice(key).map_err(invalid)?),
            HmacAlgorithm::HmacSha1 => MacState::Sha1(<Hmac<Sha1> as Mac>::new_from_slice(key).map_err(invalid)?),
            HmacAlgorithm::HmacSha256 => MacState::Sha256(<Hmac<Sha256> as Mac>::new_from_slice(key).map_err(invalid)?),
            HmacAlgorithm::HmacSha384 => MacState::Sha384(<Hmac<Sha384> as Mac>::new_from_slice(key).map_err(invalid)?),
            HmacAlgorithm::HmacSha512 => MacState::Sha512(<Hmac<Sha512> as Mac>::new_from_slice(key).map_err(invalid)?),
        })
    }
}

/// Keyed digester (HMAC)
pub struct Hmacer {
    algorithm: HmacAlgorithm,
    key: Zeroizing<Vec<u8>>,
    state: MacState,
}

impl Hmacer {
    /// Create an HMAC engine with the given key
    pub fn new(algorithm: HmacAlgorithm, key: &[u8]) -> CryptoResult<Self> {
        if key.is_empty() {
            return Err(CryptoError::invalid_key_material(format!("{} key must not be empty", algorithm)));
        }
        Ok(Self {
            algorithm,
            key: Zeroizing::new(key.to_vec()),
            state: MacState::new(algorithm, key)?,
        })
    }

    /// Create an HMAC engine with a freshly generated random key
    pub fn with_random_key(algorithm: HmacAlgorithm) -> CryptoResult<Self> {
        let key = KeyManager::generate_hmac_key(algorithm);
        Self::new(algorithm, &key)
    }

    pub fn algorithm(&self) -> HmacAlgorithm {
        self.algorithm
    }

    /// Raw key bytes, needed by the verifying side
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Constant-time check of `tag` against the HMAC of `data`
    pub fn verify(&mut self, data: &[u8], tag: &[u8]) -> bool {
        self.reset();
        with_mac!(&self.state, mac => {
            let mut mac = mac.clone();
            mac.update(data);
            mac.verify_slice(tag).is_ok()
        })
    }
}

impl DigestEngine for Hmacer {
    fn update(&mut self, data: &[u8]) {
        with_mac!(&mut self.state, mac => Mac::update(mac, data))
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        with_mac!(&mut self.state, mac => mac.finalize_reset().into_bytes().to_vec())
    }

    fn reset(&mut self) {
        with_mac!(&mut self.state, mac => Mac::reset(mac))
    }

    fn output_len(&self) -> usize {
        self.algorithm.output_len()
    }
}

impl std::fmt::Debug for Hmacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // No key bytes in debug output
        f.debug_struct("Hmacer").field("algorithm", &self.algorithm).finish()
    }
}
