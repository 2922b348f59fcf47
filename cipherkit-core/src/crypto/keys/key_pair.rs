//! RSA key halves and their DER encodings

use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use crate::shared::utils::base64_encode;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;
use super::AsymmetricAlgorithm;

/// Private half of an asymmetric key pair
#[derive(Clone, PartialEq)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
}

impl PrivateKey {
    /// Decode PKCS#8 DER
    pub fn from_pkcs8_der(algorithm: AsymmetricAlgorithm, der: &[u8]) -> CryptoResult<Self> {
        match algorithm {
            AsymmetricAlgorithm::Rsa => RsaPrivateKey::from_pkcs8_der(der)
                .map(PrivateKey::Rsa)
                .map_err(|e| CryptoError::key_decode(format!("Invalid PKCS#8 {} private key: {}", algorithm, e))),
        }
    }

    pub fn algorithm(&self) -> AsymmetricAlgorithm {
        match self {
            PrivateKey::Rsa(_) => AsymmetricAlgorithm::Rsa,
        }
    }

    /// PKCS#8 DER encoding
    pub fn to_pkcs8_der(&self) -> CryptoResult<Zeroizing<Vec<u8>>> {
        match self {
            PrivateKey::Rsa(key) => key
                .to_pkcs8_der()
                .map(|document| document.to_bytes())
                .map_err(|e| CryptoError::crypto_operation(format!("Failed to encode private key: {}", e))),
        }
    }

    pub fn to_base64(&self) -> CryptoResult<String> {
        Ok(base64_encode(&self.to_pkcs8_der()?))
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
        }
    }

    /// Modulus size in bytes
    pub fn size(&self) -> usize {
        match self {
            PrivateKey::Rsa(key) => key.size(),
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("bits", &(self.size() * 8))
            .finish()
    }
}

/// Public half of an asymmetric key pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
}

impl PublicKey {
    /// Decode X.509 SubjectPublicKeyInfo DER
    pub fn from_x509_der(algorithm: AsymmetricAlgorithm, der: &[u8]) -> CryptoResult<Self> {
        match algorithm {
            AsymmetricAlgorithm::Rsa => RsaPublicKey::from_public_key_der(der)
                .map(PublicKey::Rsa)
                .map_err(|e| CryptoError::key_decode(format!("Invalid X.509 {} public key: {}", algorithm, e))),
        }
    }

    pub fn algorithm(&self) -> AsymmetricAlgorithm {
        match self {
            PublicKey::Rsa(_) => AsymmetricAlgorithm::Rsa,
        }
    }

    /// X.509 SubjectPublicKeyInfo DER encoding
    pub fn to_x509_der(&self) -> CryptoResult<Vec<u8>> {
        match self {
            PublicKey::Rsa(key) => key
                .to_public_key_der()
                .map(|document| document.as_bytes().to_vec())
                .map_err(|e| CryptoError::crypto_operation(format!("Failed to encode public key: {}", e))),
        }
    }

    pub fn to_base64(&self) -> CryptoResult<String> {
        Ok(base64_encode(&self.to_x509_der()?))
    }

    /// Modulus size in bytes
    pub fn size(&self) -> usize {
        match self {
            PublicKey::Rsa(key) => key.size(),
        }
    }
}

/// Public and private key, at least one of them present
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    private_key: Option<PrivateKey>,
    public_key: Option<PublicKey>,
}

impl KeyPair {
    pub fn new(private_key: Option<PrivateKey>, public_key: Option<PublicKey>) -> CryptoResult<Self> {
        if private_key.is_none() && public_key.is_none() {
            return Err(CryptoError::missing_key("A key pair needs a private key, a public key or both"));
        }
        if let (Some(private_key), Some(public_key)) = (&private_key, &public_key) {
            if private_key.algorithm() != public_key.algorithm() {
                return Err(CryptoError::invalid_key_material(format!(
                    "Private key is {} but public key is {}",
                    private_key.algorithm(),
                    public_key.algorithm()
                )));
            }
        }
        Ok(Self { private_key, public_key })
    }

    /// Complete pair with the public half derived from the private key
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key: Some(private_key),
            public_key: Some(public_key),
        }
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn algorithm(&self) -> AsymmetricAlgorithm {
        match (&self.private_key, &self.public_key) {
            (Some(key), _) => key.algorithm(),
            (None, Some(key)) => key.algorithm(),
            (None, None) => AsymmetricAlgorithm::Rsa,
        }
    }

    pub fn into_parts(self) -> (Option<PrivateKey>, Option<PublicKey>) {
        (self.private_key, self.public_key)
    }
}
