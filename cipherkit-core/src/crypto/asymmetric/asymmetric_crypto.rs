//! Asymmetric cipher over an optional private/public key pair
//!
//! Single transforms are limited to one RSA block. The chunked forms split
//! plaintext into `key bytes - 11` pieces, encrypt each independently and
//! concatenate the per-chunk hex; decryption splits the bytes back into
//! `key bytes` pieces. The whole chunk loop runs under the instance lock.

use crate::crypto::hashing::{DigestAlgorithm, DigestEngine, Digester};
use crate::crypto::keys::{AsymmetricAlgorithm, KeyManager, KeyPair, PrivateKey, PublicKey};
use crate::shared::constants::*;
use crate::shared::error::CryptoError;
use crate::shared::types::{Charset, CryptoResult};
use crate::shared::utils::{base64_decode, hex_decode, hex_encode, read_fully};
use md5::Md5;
use rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use std::io::Read;
use std::sync::{Mutex, MutexGuard};
use super::KeyType;

struct KeyState {
    private_key: Option<PrivateKey>,
    public_key: Option<PublicKey>,
    signature_digest: DigestAlgorithm,
}

impl KeyState {
    fn private_key(&self) -> CryptoResult<&PrivateKey> {
        self.private_key
            .as_ref()
            .ok_or_else(|| CryptoError::missing_key("Operation requires a private key"))
    }

    fn public_key(&self) -> CryptoResult<&PublicKey> {
        self.public_key
            .as_ref()
            .ok_or_else(|| CryptoError::missing_key("Operation requires a public key"))
    }

    /// Modulus length in bytes of the selected key
    fn key_len(&self, key_type: KeyType) -> CryptoResult<usize> {
        match key_type {
            KeyType::PublicKey => Ok(self.public_key()?.size()),
            KeyType::PrivateKey => Ok(self.private_key()?.size()),
        }
    }

    fn encrypt_block(&self, data: &[u8], key_type: KeyType) -> CryptoResult<Vec<u8>> {
        let result = match key_type {
            KeyType::PublicKey => match self.public_key()? {
                PublicKey::Rsa(key) => key.encrypt(&mut OsRng, Pkcs1v15Encrypt, data),
            },
            // Block type 1, recoverable with the public key
            KeyType::PrivateKey => match self.private_key()? {
                PrivateKey::Rsa(key) => key.sign_with_rng(&mut OsRng, Pkcs1v15Sign::new_unprefixed(), data),
            },
        };
        result.map_err(|e| CryptoError::crypto_operation(format!("Encryption with {} failed: {}", key_type, e)))
    }

    fn decrypt_block(&self, data: &[u8], key_type: KeyType) -> CryptoResult<Vec<u8>> {
        match key_type {
            KeyType::PrivateKey => match self.private_key()? {
                PrivateKey::Rsa(key) => key
                    .decrypt_blinded(&mut OsRng, Pkcs1v15Encrypt, data)
                    .map_err(|e| CryptoError::crypto_operation(format!("Decryption with private key failed: {}", e))),
            },
            KeyType::PublicKey => match self.public_key()? {
                PublicKey::Rsa(key) => public_decrypt(key, data),
            },
        }
    }

    fn sign(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let hashed = Digester::new(self.signature_digest).digest(data);
        match self.private_key()? {
            PrivateKey::Rsa(key) => key
                .sign_with_rng(&mut OsRng, signature_scheme(self.signature_digest), &hashed)
                .map_err(|e| CryptoError::crypto_operation(format!("Signing failed: {}", e))),
        }
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        let hashed = Digester::new(self.signature_digest).digest(data);
        match self.public_key()? {
            PublicKey::Rsa(key) => Ok(key
                .verify(signature_scheme(self.signature_digest), &hashed, signature)
                .is_ok()),
        }
    }
}

fn signature_scheme(digest: DigestAlgorithm) -> Pkcs1v15Sign {
    match digest {
        DigestAlgorithm::Md5 => Pkcs1v15Sign::new::<Md5>(),
        DigestAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        DigestAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        DigestAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        DigestAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

/// Raw RSA public operation followed by removal of block type 1 padding
fn public_decrypt(key: &RsaPublicKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
    let k = key.size();
    if data.len() > k {
        return Err(CryptoError::crypto_operation(format!(
            "Ciphertext of {} bytes exceeds the {}-byte modulus",
            data.len(),
            k
        )));
    }
    let c = BigUint::from_bytes_be(data);
    if &c >= key.n() {
        return Err(CryptoError::crypto_operation("Ciphertext out of range for this key"));
    }

    let m = c.modpow(key.e(), key.n()).to_bytes_be();
    let mut em = vec![0u8; k];
    em[k - m.len()..].copy_from_slice(&m);
    strip_type1_padding(&em)
}

/// `00 01 FF..FF 00 data`, at least eight `FF` bytes
fn strip_type1_padding(em: &[u8]) -> CryptoResult<Vec<u8>> {
    let invalid = || CryptoError::crypto_operation("Decryption error: invalid block type 1 padding");
    if em.len() < PKCS1_PADDING_OVERHEAD || em[0] != 0x00 || em[1] != 0x01 {
        return Err(invalid());
    }
    let separator = em[2..].iter().position(|&b| b != 0xff).map(|i| i + 2).ok_or_else(invalid)?;
    if em[separator] != 0x00 || separator - 2 < PKCS1_MIN_PS_LEN {
        return Err(invalid());
    }
    Ok(em[separator + 1..].to_vec())
}

/// Asymmetric cipher: sign/verify and block-chunked encrypt/decrypt
///
/// Either key may be absent. Without a private key `sign` and private-key
/// transforms fail with [`CryptoError::MissingKey`]; likewise for the public
/// key with `verify` and public-key transforms.
pub struct AsymmetricCrypto {
    algorithm: AsymmetricAlgorithm,
    state: Mutex<KeyState>,
}

impl AsymmetricCrypto {
    /// Fresh key pair of the default size
    pub fn new(algorithm: AsymmetricAlgorithm) -> CryptoResult<Self> {
        Self::generate(algorithm, DEFAULT_KEY_SIZE, None)
    }

    /// Fresh key pair; deterministic when `seed` is given
    pub fn generate(algorithm: AsymmetricAlgorithm, key_size: usize, seed: Option<&[u8]>) -> CryptoResult<Self> {
        let pair = KeyManager::generate_key_pair(algorithm, key_size, seed)?;
        Ok(Self::from_key_pair(pair))
    }

    pub fn from_key_pair(pair: KeyPair) -> Self {
        let algorithm = pair.algorithm();
        let (private_key, public_key) = pair.into_parts();
        Self {
            algorithm,
            state: Mutex::new(KeyState {
                private_key,
                public_key,
                signature_digest: DigestAlgorithm::Md5,
            }),
        }
    }

    /// Load PKCS#8 private and X.509 public key bytes
    ///
    /// With neither key given a fresh pair is generated.
    pub fn from_der(
        algorithm: AsymmetricAlgorithm,
        private_key: Option<&[u8]>,
        public_key: Option<&[u8]>,
    ) -> CryptoResult<Self> {
        if private_key.is_none() && public_key.is_none() {
            return Self::new(algorithm);
        }
        let private_key = private_key
            .map(|der| KeyManager::load_private_key(algorithm, der))
            .transpose()?;
        let public_key = public_key
            .map(|der| KeyManager::load_public_key(algorithm, der))
            .transpose()?;
        Ok(Self::from_key_pair(KeyPair::new(private_key, public_key)?))
    }

    /// Same as [`from_der`](Self::from_der) with base64 text
    pub fn from_base64(
        algorithm: AsymmetricAlgorithm,
        private_key: Option<&str>,
        public_key: Option<&str>,
    ) -> CryptoResult<Self> {
        let decode = |text: &str| {
            base64_decode(text).map_err(|e| CryptoError::key_decode(format!("Key is not valid base64: {}", e)))
        };
        let private_der = private_key.map(decode).transpose()?;
        let public_der = public_key.map(decode).transpose()?;
        Self::from_der(algorithm, private_der.as_deref(), public_der.as_deref())
    }

    pub fn rsa() -> CryptoResult<Self> {
        Self::new(AsymmetricAlgorithm::Rsa)
    }

    pub fn rsa_from_der(private_key: Option<&[u8]>, public_key: Option<&[u8]>) -> CryptoResult<Self> {
        Self::from_der(AsymmetricAlgorithm::Rsa, private_key, public_key)
    }

    pub fn rsa_from_base64(private_key: Option<&str>, public_key: Option<&str>) -> CryptoResult<Self> {
        Self::from_base64(AsymmetricAlgorithm::Rsa, private_key, public_key)
    }

    pub fn algorithm(&self) -> AsymmetricAlgorithm {
        self.algorithm
    }

    // Sign and verify

    pub fn sign(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        self.lock_state().sign(data)
    }

    pub fn sign_hex(&self, data: &[u8]) -> CryptoResult<String> {
        Ok(hex_encode(&self.sign(data)?))
    }

    /// `Ok(false)` for a signature that does not match
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        self.lock_state().verify(data, signature)
    }

    pub fn verify_hex(&self, data: &[u8], signature_hex: &str) -> CryptoResult<bool> {
        self.verify(data, &hex_decode(signature_hex)?)
    }

    /// Digest used for signatures, e.g. `MD5withRSA`
    pub fn signature_algorithm(&self) -> String {
        format!("{}with{}", self.lock_state().signature_digest.signature_prefix(), self.algorithm)
    }

    pub fn set_signature_digest(&self, digest: DigestAlgorithm) {
        self.lock_state().signature_digest = digest;
    }

    // Single block

    pub fn encrypt(&self, data: &[u8], key_type: KeyType) -> CryptoResult<Vec<u8>> {
        self.lock_state().encrypt_block(data, key_type)
    }

    pub fn decrypt(&self, data: &[u8], key_type: KeyType) -> CryptoResult<Vec<u8>> {
        self.lock_state().decrypt_block(data, key_type)
    }

    /// Single block encryption of a whole stream, read before locking
    pub fn encrypt_reader<R: Read>(&self, reader: R, key_type: KeyType) -> CryptoResult<Vec<u8>> {
        let data = read_fully(reader)?;
        self.encrypt(&data, key_type)
    }

    pub fn decrypt_reader<R: Read>(&self, reader: R, key_type: KeyType) -> CryptoResult<Vec<u8>> {
        let data = read_fully(reader)?;
        self.decrypt(&data, key_type)
    }

    // Chunked

    /// Encrypt data of any length into concatenated per-chunk hex
    pub fn encrypt_chunked(&self, data: &[u8], key_type: KeyType) -> CryptoResult<String> {
        let state = self.lock_state();
        let chunk_len = state.key_len(key_type)? - PKCS1_PADDING_OVERHEAD;
        let mut hex = String::with_capacity(data.len().div_ceil(chunk_len) * 2 * (chunk_len + PKCS1_PADDING_OVERHEAD));
        for chunk in data.chunks(chunk_len) {
            hex.push_str(&hex_encode(&state.encrypt_block(chunk, key_type)?));
        }
        log::debug!("Encrypted {} bytes in {} chunks with {}", data.len(), data.len().div_ceil(chunk_len), key_type);
        Ok(hex)
    }

    /// Reverse of [`encrypt_chunked`](Self::encrypt_chunked)
    pub fn decrypt_chunked(&self, hex: &str, key_type: KeyType) -> CryptoResult<Vec<u8>> {
        let data = hex_decode(hex)?;
        let state = self.lock_state();
        let block_len = state.key_len(key_type)?;
        if data.len() % block_len != 0 {
            return Err(CryptoError::crypto_operation(format!(
                "Ciphertext length {} is not a multiple of the {}-byte block",
                data.len(),
                block_len
            )));
        }
        let mut plain = Vec::with_capacity(data.len());
        for chunk in data.chunks(block_len) {
            plain.extend_from_slice(&state.decrypt_block(chunk, key_type)?);
        }
        Ok(plain)
    }

    /// Chunked encryption of UTF-8 text
    pub fn encrypt_text(&self, text: &str, key_type: KeyType) -> CryptoResult<String> {
        self.encrypt_str(text, Charset::Utf8, key_type)
    }

    pub fn decrypt_text(&self, hex: &str, key_type: KeyType) -> CryptoResult<String> {
        self.decrypt_str(hex, Charset::Utf8, key_type)
    }

    pub fn encrypt_str(&self, text: &str, charset: Charset, key_type: KeyType) -> CryptoResult<String> {
        self.encrypt_chunked(&charset.encode(text)?, key_type)
    }

    /// Text is decoded once after all chunks are joined, so multi-byte
    /// characters split across chunks survive
    pub fn decrypt_str(&self, hex: &str, charset: Charset, key_type: KeyType) -> CryptoResult<String> {
        charset.decode(&self.decrypt_chunked(hex, key_type)?)
    }

    // Sizes

    /// Largest plaintext one block can carry with the selected key
    pub fn plaintext_block_size(&self, key_type: KeyType) -> CryptoResult<usize> {
        Ok(self.lock_state().key_len(key_type)? - PKCS1_PADDING_OVERHEAD)
    }

    pub fn ciphertext_block_size(&self, key_type: KeyType) -> CryptoResult<usize> {
        self.lock_state().key_len(key_type)
    }

    /// Modulus length in bits of whichever key is present
    pub fn key_size_bits(&self) -> usize {
        let state = self.lock_state();
        let bytes = state
            .public_key
            .as_ref()
            .map(PublicKey::size)
            .or_else(|| state.private_key.as_ref().map(PrivateKey::size))
            .unwrap_or(0);
        bytes * 8
    }

    // Keys

    pub fn private_key(&self) -> Option<PrivateKey> {
        self.lock_state().private_key.clone()
    }

    pub fn public_key(&self) -> Option<PublicKey> {
        self.lock_state().public_key.clone()
    }

    /// PKCS#8 private key as base64, if present
    pub fn private_key_base64(&self) -> CryptoResult<Option<String>> {
        self.lock_state().private_key.as_ref().map(PrivateKey::to_base64).transpose()
    }

    /// X.509 public key as base64, if present
    pub fn public_key_base64(&self) -> CryptoResult<Option<String>> {
        self.lock_state().public_key.as_ref().map(PublicKey::to_base64).transpose()
    }

    pub fn set_private_key(&self, key: PrivateKey) -> CryptoResult<()> {
        self.check_algorithm(key.algorithm())?;
        self.lock_state().private_key = Some(key);
        Ok(())
    }

    pub fn set_public_key(&self, key: PublicKey) -> CryptoResult<()> {
        self.check_algorithm(key.algorithm())?;
        self.lock_state().public_key = Some(key);
        Ok(())
    }

    fn check_algorithm(&self, algorithm: AsymmetricAlgorithm) -> CryptoResult<()> {
        if algorithm != self.algorithm {
            return Err(CryptoError::invalid_key_material(format!(
                "{} key cannot be used with a {} cipher",
                algorithm, self.algorithm
            )));
        }
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, KeyState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("Recovering poisoned {} cipher lock", self.algorithm);
            poisoned.into_inner()
        })
    }
}

impl std::fmt::Debug for AsymmetricCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("AsymmetricCrypto")
            .field("algorithm", &self.algorithm)
            .field("has_private_key", &state.private_key.is_some())
            .field("has_public_key", &state.public_key.is_some())
            .field("signature_digest", &state.signature_digest)
            .finish()
    }
}
