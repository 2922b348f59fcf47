//! Lock-guarded symmetric cipher over a shared key and IV

use crate::crypto::keys::{KeyManager, SymmetricAlgorithm, SymmetricKey};
use crate::shared::constants::{PBE_ITERATION_COUNT, PBE_SALT_SIZE};
use crate::shared::error::CryptoError;
use crate::shared::types::{Charset, CryptoResult};
use crate::shared::utils::{base64_decode, base64_encode, hex_decode, hex_encode, read_fully};
use std::io::Read;
use std::sync::{Mutex, MutexGuard};
use super::block_mode::{new_primitive, BlockPrimitive, CipherHandle, Direction};
use super::{CipherMode, CipherPadding, CipherParams, CipherSpec};

struct CipherState {
    handle: CipherHandle,
    params: CipherParams,
}

/// Symmetric cipher with a configurable mode and padding
///
/// One instance owns one transform handle guarded by a mutex, so it can be
/// shared between threads; concurrent transforms are serialized.
pub struct SymmetricCrypto {
    spec: CipherSpec,
    key: SymmetricKey,
    state: Mutex<CipherState>,
}

impl SymmetricCrypto {
    /// Build from a `NAME` or `NAME/MODE/PADDING` transformation
    ///
    /// Without `key` a random key (or password) is generated.
    pub fn new(transformation: &str, key: Option<&[u8]>) -> CryptoResult<Self> {
        Self::with_spec(transformation.parse()?, key)
    }

    pub fn with_spec(spec: CipherSpec, key: Option<&[u8]>) -> CryptoResult<Self> {
        let key = KeyManager::generate_symmetric_key(spec.algorithm(), key)?;
        Self::with_key(spec, key)
    }

    pub fn with_key(spec: CipherSpec, key: SymmetricKey) -> CryptoResult<Self> {
        Self::with_key_and_iterations(spec, key, PBE_ITERATION_COUNT)
    }

    pub(crate) fn with_key_and_iterations(spec: CipherSpec, key: SymmetricKey, iterations: u32) -> CryptoResult<Self> {
        if key.algorithm() != spec.algorithm() {
            return Err(CryptoError::invalid_key_material(format!(
                "{} key cannot be used with {}",
                key.algorithm(),
                spec
            )));
        }

        let params = Self::default_params(&spec, iterations);
        log::info!("Created {} cipher", spec);
        Ok(Self {
            spec,
            key,
            state: Mutex::new(CipherState {
                handle: CipherHandle::new(spec.mode(), spec.padding()),
                params,
            }),
        })
    }

    /// AES with the default ECB/PKCS5Padding transformation
    pub fn aes(key: Option<&[u8]>) -> CryptoResult<Self> {
        Self::with_spec(CipherSpec::for_algorithm(SymmetricAlgorithm::Aes), key)
    }

    /// DES with the default ECB/PKCS5Padding transformation
    pub fn des(key: Option<&[u8]>) -> CryptoResult<Self> {
        Self::with_spec(CipherSpec::for_algorithm(SymmetricAlgorithm::Des), key)
    }

    pub fn des_with(mode: CipherMode, padding: CipherPadding, key: Option<&[u8]>) -> CryptoResult<Self> {
        Self::with_spec(CipherSpec::new(SymmetricAlgorithm::Des, mode, padding)?, key)
    }

    fn default_params(spec: &CipherSpec, iterations: u32) -> CipherParams {
        let mut params = CipherParams::default();
        if spec.algorithm().is_password_based() {
            params.salt = Some(KeyManager::random_bytes(PBE_SALT_SIZE));
            params.iterations = Some(iterations);
        }
        if spec.needs_iv() {
            params.iv = Some(KeyManager::random_bytes(spec.block_size()));
        }
        params
    }

    pub fn spec(&self) -> CipherSpec {
        self.spec
    }

    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// Current IV / salt / iteration count, for configuring the peer
    pub fn params(&self) -> CipherParams {
        self.lock_state().params.clone()
    }

    /// Replace the IV / salt / iteration count
    pub fn set_params(&self, params: CipherParams) -> CryptoResult<()> {
        if let Some(iv) = &params.iv {
            if iv.len() != self.spec.block_size() {
                return Err(CryptoError::invalid_key_material(format!(
                    "IV must be {} bytes, got {}",
                    self.spec.block_size(),
                    iv.len()
                )));
            }
        }
        if params.iterations == Some(0) {
            return Err(CryptoError::invalid_key_material("Iteration count must be positive"));
        }
        self.lock_state().params = params;
        Ok(())
    }

    pub fn encrypt(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        self.transform(Direction::Encrypt, data)
    }

    pub fn decrypt(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        self.transform(Direction::Decrypt, data)
    }

    pub fn encrypt_hex(&self, data: &[u8]) -> CryptoResult<String> {
        Ok(hex_encode(&self.encrypt(data)?))
    }

    pub fn decrypt_hex(&self, hex: &str) -> CryptoResult<Vec<u8>> {
        self.decrypt(&hex_decode(hex)?)
    }

    /// Encrypt text and return hex
    pub fn encrypt_str(&self, text: &str, charset: Charset) -> CryptoResult<String> {
        self.encrypt_hex(&charset.encode(text)?)
    }

    /// Decrypt hex produced by [`encrypt_str`](Self::encrypt_str)
    pub fn decrypt_str(&self, hex: &str, charset: Charset) -> CryptoResult<String> {
        charset.decode(&self.decrypt_hex(hex)?)
    }

    pub fn encrypt_base64(&self, data: &[u8]) -> CryptoResult<String> {
        Ok(base64_encode(&self.encrypt(data)?))
    }

    pub fn decrypt_base64(&self, text: &str) -> CryptoResult<Vec<u8>> {
        self.decrypt(&base64_decode(text)?)
    }

    /// Encrypt a whole stream; reading completes before the lock is taken
    pub fn encrypt_reader<R: Read>(&self, reader: R) -> CryptoResult<Vec<u8>> {
        let data = read_fully(reader)?;
        self.encrypt(&data)
    }

    pub fn decrypt_reader<R: Read>(&self, reader: R) -> CryptoResult<Vec<u8>> {
        let data = read_fully(reader)?;
        self.decrypt(&data)
    }

    fn transform(&self, direction: Direction, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut state = self.lock_state();
        let (primitive, derived_iv) = self.prepare_primitive(&state.params)?;
        let iv = derived_iv.or_else(|| state.params.iv.clone());

        log::debug!("{:?} {} bytes with {}", direction, data.len(), self.spec);
        state.handle.init(direction, primitive, iv.as_deref())?;
        state.handle.do_final(data)
    }

    /// Block primitive keyed for this transform, plus the IV when the key
    /// derivation produces one
    fn prepare_primitive(&self, params: &CipherParams) -> CryptoResult<(Box<dyn BlockPrimitive>, Option<Vec<u8>>)> {
        let algorithm = self.spec.algorithm();
        if !algorithm.is_password_based() {
            return Ok((new_primitive(algorithm, self.key.as_bytes())?, None));
        }

        let salt = params
            .salt
            .as_deref()
            .ok_or_else(|| CryptoError::crypto_operation(format!("{} requires a salt", algorithm)))?;
        let iterations = params.iterations.unwrap_or(PBE_ITERATION_COUNT);
        let derived = KeyManager::derive_pbe_key(&self.key, salt, iterations)?;
        Ok((new_primitive(algorithm, &derived.key)?, derived.iv))
    }

    fn lock_state(&self) -> MutexGuard<'_, CipherState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            // Handle is re-initialized on every transform
            log::warn!("Recovering poisoned {} cipher lock", self.spec);
            poisoned.into_inner()
        })
    }
}

impl std::fmt::Debug for SymmetricCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricCrypto")
            .field("spec", &self.spec.to_string())
            .field("key", &self.key)
            .finish()
    }
}
