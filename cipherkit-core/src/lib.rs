//! Cipherkit Core
//!
//! Cryptographic operations layer for the framework: symmetric and asymmetric
//! ciphers, message digests and HMAC over RustCrypto primitives.
//!
//! ## Architecture
//!
//! - **Crypto**: key material, digests, symmetric and asymmetric ciphers
//! - **Shared**: common types, constants, configuration and codec helpers
//!
//! ## Usage
//!
//! ```rust
//! use cipherkit_core::{init_crypto_core, KeyType};
//!
//! let core = init_crypto_core()?;
//!
//! let aes = core.symmetric("AES/CBC/PKCS5Padding", None)?;
//! let hex = aes.encrypt_str("secret", Default::default())?;
//! assert_eq!(aes.decrypt_str(&hex, Default::default())?, "secret");
//!
//! let rsa = core.rsa()?;
//! let hex = rsa.encrypt_text("for the key owner", KeyType::PublicKey)?;
//! assert_eq!(rsa.decrypt_text(&hex, KeyType::PrivateKey)?, "for the key owner");
//! # Ok::<(), cipherkit_core::CryptoError>(())
//! ```

use std::io::Read;

pub mod crypto;
pub mod shared;

pub use crypto::asymmetric::{AsymmetricCrypto, KeyType};
pub use crypto::encryption::{CipherMode, CipherPadding, CipherParams, CipherSpec, SymmetricCrypto};
pub use crypto::hashing::{DigestAlgorithm, DigestEngine, Digester, HmacAlgorithm, Hmacer};
pub use crypto::keys::{
    AsymmetricAlgorithm, Certificate, KeyManager, KeyPair, KeyStore, PrivateKey, PublicKey, SymmetricAlgorithm, SymmetricKey,
};
pub use shared::config::CryptoConfig;
pub use shared::error::CryptoError;
pub use shared::types::{Charset, CryptoResult};

/// Install the `env_logger` backend; repeated calls are no-ops
pub fn init() {
    if env_logger::try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize logging and build the crypto core from `.env` / environment
pub fn init_crypto_core() -> CryptoResult<CryptoCore> {
    init();
    let config = CryptoConfig::from_env()?;
    log::info!("{} {} initialized: {:?}", NAME, VERSION, config);
    Ok(CryptoCore::new(config))
}

/// Entry point handing out ciphers and digesters built from one configuration
#[derive(Debug, Clone, Default)]
pub struct CryptoCore {
    config: CryptoConfig,
}

impl CryptoCore {
    pub fn new(config: CryptoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn digester(&self, algorithm: DigestAlgorithm) -> Digester {
        Digester::new(algorithm)
    }

    /// HMAC engine; a random key is generated when `key` is `None`
    pub fn hmac(&self, algorithm: HmacAlgorithm, key: Option<&[u8]>) -> CryptoResult<Hmacer> {
        match key {
            Some(key) => Hmacer::new(algorithm, key),
            None => Hmacer::with_random_key(algorithm),
        }
    }

    /// Stream digest using the configured buffer size
    pub fn digest_reader<R: Read>(&self, algorithm: DigestAlgorithm, reader: R) -> CryptoResult<Vec<u8>> {
        self.digester(algorithm).digest_reader(reader, self.config.stream_buffer_size)
    }

    /// Symmetric cipher for a `NAME` or `NAME/MODE/PADDING` transformation
    pub fn symmetric(&self, transformation: &str, key: Option<&[u8]>) -> CryptoResult<SymmetricCrypto> {
        let spec: CipherSpec = transformation.parse()?;
        let key = KeyManager::generate_symmetric_key(spec.algorithm(), key)?;
        SymmetricCrypto::with_key_and_iterations(spec, key, self.config.pbe_iterations)
    }

    /// Asymmetric cipher with a fresh key pair of the configured size
    pub fn asymmetric(&self, algorithm: AsymmetricAlgorithm) -> CryptoResult<AsymmetricCrypto> {
        let crypto = AsymmetricCrypto::generate(algorithm, self.config.default_key_size, None)?;
        crypto.set_signature_digest(self.config.signature_digest);
        Ok(crypto)
    }

    /// Asymmetric cipher over encoded keys; a fresh pair when both are absent
    pub fn asymmetric_from_der(
        &self,
        algorithm: AsymmetricAlgorithm,
        private_key: Option<&[u8]>,
        public_key: Option<&[u8]>,
    ) -> CryptoResult<AsymmetricCrypto> {
        if private_key.is_none() && public_key.is_none() {
            return self.asymmetric(algorithm);
        }
        let crypto = AsymmetricCrypto::from_der(algorithm, private_key, public_key)?;
        crypto.set_signature_digest(self.config.signature_digest);
        Ok(crypto)
    }

    /// RSA cipher over the entry stored under `alias` in a PKCS#12 store
    pub fn asymmetric_from_key_store(&self, store: &KeyStore, alias: &str) -> CryptoResult<AsymmetricCrypto> {
        let crypto = AsymmetricCrypto::from_key_pair(store.key_pair(AsymmetricAlgorithm::Rsa, alias)?);
        crypto.set_signature_digest(self.config.signature_digest);
        Ok(crypto)
    }

    pub fn rsa(&self) -> CryptoResult<AsymmetricCrypto> {
        self.asymmetric(AsymmetricAlgorithm::Rsa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_with(config: CryptoConfig) -> CryptoCore {
        CryptoCore::new(config)
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }

    #[test]
    fn test_default_core() {
        let core = CryptoCore::default();
        assert_eq!(core.config(), &CryptoConfig::default());
        let rsa = core.rsa().unwrap();
        assert_eq!(rsa.key_size_bits(), 1024);
        assert_eq!(rsa.signature_algorithm(), "MD5withRSA");
    }

    #[test]
    fn test_core_honors_config() {
        let core = core_with(CryptoConfig {
            default_key_size: 512,
            signature_digest: DigestAlgorithm::Sha1,
            pbe_iterations: 7,
            stream_buffer_size: 3,
        });

        let rsa = core.rsa().unwrap();
        assert_eq!(rsa.key_size_bits(), 512);
        assert_eq!(rsa.signature_algorithm(), "SHA1withRSA");

        let pbe = core.symmetric("PBEWithMD5AndDES", Some(b"pw")).unwrap();
        assert_eq!(pbe.params().iterations, Some(7));

        let digest = core.digest_reader(DigestAlgorithm::Md5, &b"abc"[..]).unwrap();
        assert_eq!(shared::utils::hex_encode(&digest), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_core_hmac_keys() {
        let core = CryptoCore::default();
        let random = core.hmac(HmacAlgorithm::HmacSha256, None).unwrap();
        assert_eq!(random.key().len(), 32);

        let mut fixed = core.hmac(HmacAlgorithm::HmacSha256, Some(random.key())).unwrap();
        let mut random = random;
        assert_eq!(fixed.digest(b"data"), random.digest(b"data"));
    }

    #[test]
    fn test_core_symmetric_roundtrip() {
        let core = CryptoCore::default();
        let cipher = core.symmetric("DESede/CFB/NoPadding", None).unwrap();
        let hex = cipher.encrypt_str("configured", Charset::Utf8).unwrap();
        assert_eq!(cipher.decrypt_str(&hex, Charset::Utf8).unwrap(), "configured");
        assert!(matches!(core.symmetric("AES/XTS/NoPadding", None), Err(CryptoError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_core_loads_keys() {
        let core = core_with(CryptoConfig {
            signature_digest: DigestAlgorithm::Sha256,
            default_key_size: 512,
            ..CryptoConfig::default()
        });
        let source = core.rsa().unwrap();
        let public_der = source.public_key().unwrap().to_x509_der().unwrap();

        let verifier = core.asymmetric_from_der(AsymmetricAlgorithm::Rsa, None, Some(&public_der)).unwrap();
        assert_eq!(verifier.signature_algorithm(), "SHA256withRSA");
        let signature = source.sign(b"payload").unwrap();
        assert!(verifier.verify(b"payload", &signature).unwrap());
    }

    #[test]
    fn test_core_signs_with_key_store_entry() {
        let core = core_with(CryptoConfig {
            signature_digest: DigestAlgorithm::Sha256,
            ..CryptoConfig::default()
        });
        let store = KeyStore::from_bytes(include_bytes!("../testdata/server.p12"), "changeit").unwrap();
        let signer = core.asymmetric_from_key_store(&store, "server").unwrap();

        let certificate = KeyManager::load_certificate_public_key(include_bytes!("../testdata/server.crt.der")).unwrap();
        let verifier = core
            .asymmetric_from_der(AsymmetricAlgorithm::Rsa, None, Some(&certificate.to_x509_der().unwrap()))
            .unwrap();
        let signature = signer.sign(b"release").unwrap();
        assert!(verifier.verify(b"release", &signature).unwrap());

        let hex = verifier.encrypt_text("to the store owner", KeyType::PublicKey).unwrap();
        assert_eq!(signer.decrypt_text(&hex, KeyType::PrivateKey).unwrap(), "to the store owner");
    }
}
