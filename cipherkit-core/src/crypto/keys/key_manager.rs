//! Key generation, loading and derivation
//!
//! Stateless entry points for every piece of key material the ciphers and
//! digesters consume. Randomness comes from the OS; seeded key pair
//! generation runs a ChaCha20 stream keyed by SHA-256 of the seed so the same
//! seed always yields the same pair.

use crate::crypto::hashing::HmacAlgorithm;
use crate::shared::constants::*;
use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use hmac::Hmac;
use md5::Md5;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;
use super::{AsymmetricAlgorithm, Certificate, KeyPair, KeyStore, PrivateKey, PublicKey, SymmetricAlgorithm, SymmetricKey};

/// Key produced by stretching a password
pub struct DerivedKey {
    pub key: Zeroizing<Vec<u8>>,
    /// IV derived alongside the key; only PBEWithMD5AndDES produces one
    pub iv: Option<Vec<u8>>,
}

/// Key material provider
pub struct KeyManager;

impl KeyManager {
    /// Generate or wrap a symmetric key
    ///
    /// Without `raw`, a random key of the algorithm's default length is
    /// generated; password based algorithms get a random alphanumeric
    /// password instead.
    pub fn generate_symmetric_key(algorithm: SymmetricAlgorithm, raw: Option<&[u8]>) -> CryptoResult<SymmetricKey> {
        match raw {
            Some(bytes) => SymmetricKey::new(algorithm, bytes),
            None if algorithm.is_password_based() => {
                let password = Zeroizing::new(Self::random_password(PBE_RANDOM_PASSWORD_LENGTH));
                log::debug!("Generated random password for {}", algorithm);
                SymmetricKey::new(algorithm, password.as_bytes())
            }
            None => {
                let key = Zeroizing::new(Self::random_bytes(algorithm.default_key_len()));
                log::debug!("Generated random {}-byte {} key", key.len(), algorithm);
                SymmetricKey::new(algorithm, &key)
            }
        }
    }

    /// Random key sized for the HMAC algorithm
    pub fn generate_hmac_key(algorithm: HmacAlgorithm) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(Self::random_bytes(algorithm.default_key_len()))
    }

    /// Cryptographically secure random bytes
    pub fn random_bytes(len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }

    fn random_password(len: usize) -> String {
        OsRng.sample_iter(&Alphanumeric).take(len).map(char::from).collect()
    }

    /// Generate an asymmetric key pair
    ///
    /// `key_size` is the modulus length in bits: a multiple of 8 within
    /// 512..=16384. With a seed the result is deterministic.
    pub fn generate_key_pair(
        algorithm: AsymmetricAlgorithm,
        key_size: usize,
        seed: Option<&[u8]>,
    ) -> CryptoResult<KeyPair> {
        if !(MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&key_size) || key_size % 8 != 0 {
            return Err(CryptoError::unsupported_algorithm(format!(
                "{} key size must be a multiple of 8 between {} and {}, got {}",
                algorithm, MIN_KEY_SIZE, MAX_KEY_SIZE, key_size
            )));
        }

        log::info!(
            "Generating {}-bit {} key pair ({})",
            key_size,
            algorithm,
            if seed.is_some() { "seeded" } else { "random" }
        );

        let private_key = match (algorithm, seed) {
            (AsymmetricAlgorithm::Rsa, Some(seed)) => {
                let seed: [u8; 32] = Sha256::digest(seed).into();
                let mut rng = ChaCha20Rng::from_seed(seed);
                RsaPrivateKey::new(&mut rng, key_size)
            }
            (AsymmetricAlgorithm::Rsa, None) => RsaPrivateKey::new(&mut OsRng, key_size),
        }
        .map_err(|e| CryptoError::crypto_operation(format!("{} key generation failed: {}", algorithm, e)))?;

        Ok(KeyPair::from_private_key(PrivateKey::Rsa(private_key)))
    }

    /// Load a PKCS#8 encoded private key
    pub fn load_private_key(algorithm: AsymmetricAlgorithm, der: &[u8]) -> CryptoResult<PrivateKey> {
        PrivateKey::from_pkcs8_der(algorithm, der)
    }

    /// Load an X.509 encoded public key
    pub fn load_public_key(algorithm: AsymmetricAlgorithm, der: &[u8]) -> CryptoResult<PublicKey> {
        PublicKey::from_x509_der(algorithm, der)
    }

    /// Public key of a DER or PEM encoded X.509 certificate
    pub fn load_certificate_public_key(bytes: &[u8]) -> CryptoResult<PublicKey> {
        Certificate::from_bytes(bytes)?.public_key()
    }

    /// Open a PKCS#12 store with its password
    pub fn load_key_store(bytes: &[u8], password: &str) -> CryptoResult<KeyStore> {
        KeyStore::from_bytes(bytes, password)
    }

    /// Private key stored under `alias` in a PKCS#12 store
    pub fn load_key_store_private_key(
        algorithm: AsymmetricAlgorithm,
        bytes: &[u8],
        password: &str,
        alias: &str,
    ) -> CryptoResult<PrivateKey> {
        Self::load_key_store(bytes, password)?.private_key(algorithm, alias)
    }

    /// Stretch a password into a cipher key
    ///
    /// PBEWithMD5AndDES follows PBKDF1 with MD5: the first 8 bytes of the
    /// result are the DES key, the next 8 the IV. The AES variants use
    /// PBKDF2-HMAC-SHA256 and take their IV from the cipher parameters.
    pub fn derive_pbe_key(key: &SymmetricKey, salt: &[u8], iterations: u32) -> CryptoResult<DerivedKey> {
        let algorithm = key.algorithm();
        if iterations == 0 {
            return Err(CryptoError::invalid_key_material("PBE iteration count must be positive"));
        }

        match algorithm {
            SymmetricAlgorithm::PbeWithMd5AndDes => {
                if salt.len() != PBE_SALT_SIZE {
                    return Err(CryptoError::invalid_key_material(format!(
                        "{} salt must be {} bytes, got {}",
                        algorithm,
                        PBE_SALT_SIZE,
                        salt.len()
                    )));
                }
                let mut hasher = Md5::new();
                hasher.update(key.as_bytes());
                hasher.update(salt);
                let mut derived = Zeroizing::new(hasher.finalize().to_vec());
                for _ in 1..iterations {
                    *derived = Md5::digest(derived.as_slice()).to_vec();
                }
                Ok(DerivedKey {
                    key: Zeroizing::new(derived[..DES_KEY_SIZE].to_vec()),
                    iv: Some(derived[DES_KEY_SIZE..DES_KEY_SIZE + DES_BLOCK_SIZE].to_vec()),
                })
            }
            SymmetricAlgorithm::PbeWithHmacSha256AndAes128 | SymmetricAlgorithm::PbeWithHmacSha256AndAes256 => {
                let len = algorithm.derived_key_len().unwrap_or(AES_DEFAULT_KEY_SIZE);
                let mut derived = Zeroizing::new(vec![0u8; len]);
                pbkdf2::pbkdf2::<Hmac<Sha256>>(key.as_bytes(), salt, iterations, &mut derived)
                    .map_err(|e| CryptoError::crypto_operation(format!("PBKDF2 failed: {}", e)))?;
                Ok(DerivedKey { key: derived, iv: None })
            }
            _ => Err(CryptoError::unsupported_algorithm(format!("{} is not password based", algorithm))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::utils::hex_encode;

    #[test]
    fn test_random_symmetric_key_lengths() {
        assert_eq!(KeyManager::generate_symmetric_key(SymmetricAlgorithm::Aes, None).unwrap().len(), 16);
        assert_eq!(KeyManager::generate_symmetric_key(SymmetricAlgorithm::Des, None).unwrap().len(), 8);
        assert_eq!(KeyManager::generate_symmetric_key(SymmetricAlgorithm::DesEde, None).unwrap().len(), 24);
    }

    #[test]
    fn test_random_password() {
        let key = KeyManager::generate_symmetric_key(SymmetricAlgorithm::PbeWithMd5AndDes, None).unwrap();
        assert_eq!(key.len(), 32);
        assert!(key.as_bytes().iter().all(u8::is_ascii_alphanumeric));
    }

    #[test]
    fn test_raw_key_validation() {
        assert!(KeyManager::generate_symmetric_key(SymmetricAlgorithm::Aes, Some(&[1u8; 32])).is_ok());
        assert!(matches!(
            KeyManager::generate_symmetric_key(SymmetricAlgorithm::Des, Some(&[1u8; 7])),
            Err(CryptoError::InvalidKeyMaterial(_))
        ));
        assert!(matches!(
            KeyManager::generate_symmetric_key(SymmetricAlgorithm::DesEde, Some(&[1u8; 8])),
            Err(CryptoError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn test_hmac_key_lengths() {
        assert_eq!(KeyManager::generate_hmac_key(HmacAlgorithm::HmacSha384).len(), 48);
        assert_eq!(KeyManager::generate_hmac_key(HmacAlgorithm::HmacMd5).len(), 64);
    }

    #[test]
    fn test_random_bytes_differ() {
        assert_eq!(KeyManager::random_bytes(24).len(), 24);
        assert_ne!(KeyManager::random_bytes(16), KeyManager::random_bytes(16));
    }

    #[test]
    fn test_invalid_key_sizes() {
        for size in [0, 256, 511, 1020, 16392] {
            assert!(matches!(
                KeyManager::generate_key_pair(AsymmetricAlgorithm::Rsa, size, None),
                Err(CryptoError::UnsupportedAlgorithm(_))
            ));
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let first = KeyManager::generate_key_pair(AsymmetricAlgorithm::Rsa, 512, Some(b"seed")).unwrap();
        let second = KeyManager::generate_key_pair(AsymmetricAlgorithm::Rsa, 512, Some(b"seed")).unwrap();
        let other = KeyManager::generate_key_pair(AsymmetricAlgorithm::Rsa, 512, Some(b"other seed")).unwrap();
        assert_eq!(first, second);
        assert_ne!(first.public_key(), other.public_key());
        assert_eq!(first.public_key().unwrap().size(), 64);
    }

    #[test]
    fn test_load_exported_keys() {
        let pair = KeyManager::generate_key_pair(AsymmetricAlgorithm::Rsa, 512, Some(b"load")).unwrap();
        let der = pair.private_key().unwrap().to_pkcs8_der().unwrap();
        let loaded = KeyManager::load_private_key(AsymmetricAlgorithm::Rsa, &der).unwrap();
        assert_eq!(Some(&loaded), pair.private_key());

        let der = pair.public_key().unwrap().to_x509_der().unwrap();
        let loaded = KeyManager::load_public_key(AsymmetricAlgorithm::Rsa, &der).unwrap();
        assert_eq!(Some(&loaded), pair.public_key());
    }

    #[test]
    fn test_load_from_certificate_and_store() {
        let pem = include_bytes!("../../../testdata/server.crt.pem");
        let store = include_bytes!("../../../testdata/server.p12");

        let public_key = KeyManager::load_certificate_public_key(pem).unwrap();
        let private_key =
            KeyManager::load_key_store_private_key(AsymmetricAlgorithm::Rsa, store, "changeit", "server").unwrap();
        assert_eq!(private_key.public_key(), public_key);

        assert!(matches!(
            KeyManager::load_key_store_private_key(AsymmetricAlgorithm::Rsa, store, "changeit", "missing"),
            Err(CryptoError::MissingKey(_))
        ));
        assert!(matches!(KeyManager::load_certificate_public_key(b"\x30\x03"), Err(CryptoError::KeyDecode(_))));
    }

    #[test]
    fn test_pbkdf1_md5_derivation() {
        let key = SymmetricKey::new(SymmetricAlgorithm::PbeWithMd5AndDes, b"password").unwrap();
        let salt = [0u8; 8];

        // One iteration is a single MD5 over password || salt
        let single = KeyManager::derive_pbe_key(&key, &salt, 1).unwrap();
        let expected = Md5::digest([b"password".as_slice(), &salt].concat());
        assert_eq!(single.key.as_slice(), &expected[..8]);
        assert_eq!(single.iv.as_deref(), Some(&expected[8..]));

        let double = KeyManager::derive_pbe_key(&key, &salt, 2).unwrap();
        assert_eq!(hex_encode(&double.key), hex_encode(&Md5::digest(expected)[..8]));
    }

    #[test]
    fn test_pbkdf2_derivation_lengths() {
        let key = SymmetricKey::new(SymmetricAlgorithm::PbeWithHmacSha256AndAes256, b"pw").unwrap();
        let derived = KeyManager::derive_pbe_key(&key, b"saltsalt", 100).unwrap();
        assert_eq!(derived.key.len(), 32);
        assert!(derived.iv.is_none());

        let key = SymmetricKey::new(SymmetricAlgorithm::PbeWithHmacSha256AndAes128, b"pw").unwrap();
        let again = KeyManager::derive_pbe_key(&key, b"saltsalt", 100).unwrap();
        assert_eq!(again.key.as_slice(), &derived.key[..16]);
    }

    #[test]
    fn test_pbe_rejects_bad_input() {
        let key = SymmetricKey::new(SymmetricAlgorithm::PbeWithMd5AndDes, b"pw").unwrap();
        assert!(KeyManager::derive_pbe_key(&key, &[0u8; 4], 100).is_err());
        assert!(KeyManager::derive_pbe_key(&key, &[0u8; 8], 0).is_err());

        let plain = SymmetricKey::new(SymmetricAlgorithm::Aes, &[0u8; 16]).unwrap();
        assert!(matches!(
            KeyManager::derive_pbe_key(&plain, &[0u8; 8], 100),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }
}
