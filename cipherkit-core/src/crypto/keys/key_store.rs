//! PKCS#12 key stores
//!
//! A store is opened with its password, which both checks the integrity MAC
//! and decrypts every bag. Entries are addressed by the friendly name the
//! store was written with; unnamed entries fall back to their position.

use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use crate::shared::utils::read_fully;
use p12::{CertBag, SafeBagKind, PFX};
use std::collections::BTreeMap;
use std::io::Read;
use zeroize::Zeroizing;
use super::{AsymmetricAlgorithm, Certificate, KeyPair, PrivateKey};

#[derive(Default)]
struct Entry {
    key: Option<Zeroizing<Vec<u8>>>,
    certificate: Option<Vec<u8>>,
}

/// Decrypted contents of a PKCS#12 file
pub struct KeyStore {
    entries: BTreeMap<String, Entry>,
}

impl KeyStore {
    /// Open a DER encoded PKCS#12 store
    pub fn from_bytes(bytes: &[u8], password: &str) -> CryptoResult<Self> {
        let pfx = PFX::parse(bytes).map_err(|e| CryptoError::key_decode(format!("Invalid PKCS#12 store: {:?}", e)))?;
        if !pfx.verify_mac(password) {
            return Err(CryptoError::invalid_key_material("Key store password is incorrect or the store is corrupt"));
        }

        let bags = pfx
            .bags(password)
            .map_err(|e| CryptoError::key_decode(format!("Unreadable PKCS#12 contents: {:?}", e)))?;
        // key_bags decrypts the shrouded key bags in the same order bags() lists them
        let mut keys = pfx
            .key_bags(password)
            .map_err(|e| CryptoError::key_decode(format!("Unreadable PKCS#12 keys: {:?}", e)))?
            .into_iter()
            .map(Zeroizing::new);

        let mut entries: BTreeMap<String, Entry> = BTreeMap::new();
        for (index, bag) in bags.iter().enumerate() {
            let alias = bag.friendly_name().unwrap_or_else(|| index.to_string());
            match &bag.bag {
                SafeBagKind::Pkcs8ShroudedKeyBag(_) => {
                    let key = keys
                        .next()
                        .ok_or_else(|| CryptoError::invalid_key_material(format!("Key entry '{}' could not be decrypted", alias)))?;
                    entries.entry(alias).or_default().key = Some(key);
                }
                SafeBagKind::CertBag(CertBag::X509(der)) => {
                    entries.entry(alias).or_default().certificate = Some(der.clone());
                }
                _ => log::debug!("Skipping unsupported PKCS#12 bag '{}'", alias),
            }
        }

        log::info!("Loaded PKCS#12 key store with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn from_reader<R: Read>(reader: R, password: &str) -> CryptoResult<Self> {
        Self::from_bytes(&read_fully(reader)?, password)
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Private key stored under `alias`
    pub fn private_key(&self, algorithm: AsymmetricAlgorithm, alias: &str) -> CryptoResult<PrivateKey> {
        let der = self
            .entries
            .get(alias)
            .and_then(|entry| entry.key.as_ref())
            .ok_or_else(|| CryptoError::missing_key(format!("No private key under alias '{}'", alias)))?;
        PrivateKey::from_pkcs8_der(algorithm, der)
    }

    /// Certificate stored under `alias`
    pub fn certificate(&self, alias: &str) -> CryptoResult<Certificate> {
        let der = self
            .entries
            .get(alias)
            .and_then(|entry| entry.certificate.as_ref())
            .ok_or_else(|| CryptoError::missing_key(format!("No certificate under alias '{}'", alias)))?;
        Certificate::from_bytes(der)
    }

    /// Private key under `alias`, paired with its certificate's public key
    /// when the store holds one
    pub fn key_pair(&self, algorithm: AsymmetricAlgorithm, alias: &str) -> CryptoResult<KeyPair> {
        let private_key = self.private_key(algorithm, alias)?;
        let public_key = match self.certificate(alias) {
            Ok(certificate) => certificate.public_key()?,
            Err(CryptoError::MissingKey(_)) => private_key.public_key(),
            Err(e) => return Err(e),
        };
        KeyPair::new(Some(private_key), Some(public_key))
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore").field("aliases", &self.aliases()).finish()
    }
}
