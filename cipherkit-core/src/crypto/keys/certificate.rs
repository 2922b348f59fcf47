//! X.509 certificates as a source of public keys

use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use crate::shared::utils::read_fully;
use std::io::Read;
use x509_cert::der::{Decode, DecodePem, Encode};
use x509_cert::Certificate as X509Certificate;
use super::{AsymmetricAlgorithm, PublicKey};

const PEM_PREFIX: &[u8] = b"-----BEGIN";

/// Parsed X.509 certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    inner: X509Certificate,
}

impl Certificate {
    /// Parse a certificate, accepting DER or PEM
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
        let inner = if bytes[start..].starts_with(PEM_PREFIX) {
            X509Certificate::from_pem(bytes)
        } else {
            X509Certificate::from_der(bytes)
        }
        .map_err(|e| CryptoError::key_decode(format!("Invalid X.509 certificate: {}", e)))?;
        Ok(Self { inner })
    }

    pub fn from_reader<R: Read>(reader: R) -> CryptoResult<Self> {
        Self::from_bytes(&read_fully(reader)?)
    }

    pub fn subject(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    pub fn issuer(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    pub fn serial_number(&self) -> &[u8] {
        self.inner.tbs_certificate.serial_number.as_bytes()
    }

    /// Algorithm of the subject key; only RSA keys are recognized
    pub fn key_algorithm(&self) -> CryptoResult<AsymmetricAlgorithm> {
        let oid = self.inner.tbs_certificate.subject_public_key_info.algorithm.oid;
        if oid == rsa::pkcs1::ALGORITHM_OID {
            Ok(AsymmetricAlgorithm::Rsa)
        } else {
            Err(CryptoError::unsupported_algorithm(format!("Certificate key algorithm {}", oid)))
        }
    }

    /// Subject public key
    pub fn public_key(&self) -> CryptoResult<PublicKey> {
        let algorithm = self.key_algorithm()?;
        let spki = self
            .inner
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| CryptoError::key_decode(format!("Invalid subject public key info: {}", e)))?;
        PublicKey::from_x509_der(algorithm, &spki)
    }

    pub fn to_der(&self) -> CryptoResult<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CryptoError::crypto_operation(format!("Failed to encode certificate: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PrivateKey;

    const CERT_PEM: &[u8] = include_bytes!("../../../testdata/server.crt.pem");
    const CERT_DER: &[u8] = include_bytes!("../../../testdata/server.crt.der");
    const KEY_DER: &[u8] = include_bytes!("../../../testdata/server.key.der");

    #[test]
    fn test_pem_and_der_agree() {
        let pem = Certificate::from_bytes(CERT_PEM).unwrap();
        let der = Certificate::from_bytes(CERT_DER).unwrap();
        assert_eq!(pem, der);
        assert_eq!(der.to_der().unwrap(), CERT_DER);
        assert!(pem.subject().contains("CN=cipherkit test"));
        assert_eq!(pem.subject(), pem.issuer());
        assert!(!pem.serial_number().is_empty());
    }

    #[test]
    fn test_public_key_matches_private_key() {
        let cert = Certificate::from_reader(CERT_DER).unwrap();
        let private_key = PrivateKey::from_pkcs8_der(AsymmetricAlgorithm::Rsa, KEY_DER).unwrap();
        assert_eq!(cert.key_algorithm().unwrap(), AsymmetricAlgorithm::Rsa);
        assert_eq!(cert.public_key().unwrap(), private_key.public_key());
        assert_eq!(cert.public_key().unwrap().size(), 128);
    }

    #[test]
    fn test_malformed_certificate() {
        assert!(matches!(Certificate::from_bytes(b"not a certificate"), Err(CryptoError::KeyDecode(_))));
        assert!(matches!(
            Certificate::from_bytes(b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n"),
            Err(CryptoError::KeyDecode(_))
        ));
        assert!(matches!(Certificate::from_bytes(&CERT_DER[..100]), Err(CryptoError::KeyDecode(_))));
    }
}
