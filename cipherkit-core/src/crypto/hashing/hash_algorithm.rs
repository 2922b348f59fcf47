//! Digest and HMAC algorithm identifiers

use crate::shared::error::CryptoError;
use md5::Md5;
use sha1::Sha1;
use sha2::digest::DynDigest;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 5] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
    ];

    /// Standard algorithm name
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Name fragment used in signature algorithm names, e.g. `SHA256withRSA`
    pub fn signature_prefix(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Digest length in bytes
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Fresh incremental hasher for this algorithm
    pub(crate) fn new_hasher(&self) -> Box<dyn DynDigest + Send> {
        match self {
            DigestAlgorithm::Md5 => Box::new(Md5::new()),
            DigestAlgorithm::Sha1 => Box::new(Sha1::new()),
            DigestAlgorithm::Sha256 => Box::new(Sha256::new()),
            DigestAlgorithm::Sha384 => Box::new(Sha384::new()),
            DigestAlgorithm::Sha512 => Box::new(Sha512::new()),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "MD5" => Ok(DigestAlgorithm::Md5),
            "SHA1" | "SHA" => Ok(DigestAlgorithm::Sha1),
            "SHA256" => Ok(DigestAlgorithm::Sha256),
            "SHA384" => Ok(DigestAlgorithm::Sha384),
            "SHA512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(CryptoError::unsupported_algorithm(format!("Unknown digest algorithm: {}", s))),
        }
    }
}

/// HMAC algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl HmacAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HmacAlgorithm::HmacMd5 => "HmacMD5",
            HmacAlgorithm::HmacSha1 => "HmacSHA1",
            HmacAlgorithm::HmacSha256 => "HmacSHA256",
            HmacAlgorithm::HmacSha384 => "HmacSHA384",
            HmacAlgorithm::HmacSha512 => "HmacSHA512",
        }
    }

    /// Underlying digest
    pub fn digest(&self) -> DigestAlgorithm {
        match self {
            HmacAlgorithm::HmacMd5 => DigestAlgorithm::Md5,
            HmacAlgorithm::HmacSha1 => DigestAlgorithm::Sha1,
            HmacAlgorithm::HmacSha256 => DigestAlgorithm::Sha256,
            HmacAlgorithm::HmacSha384 => DigestAlgorithm::Sha384,
            HmacAlgorithm::HmacSha512 => DigestAlgorithm::Sha512,
        }
    }

    /// Length of randomly generated keys
    pub fn default_key_len(&self) -> usize {
        match self {
            HmacAlgorithm::HmacMd5 | HmacAlgorithm::HmacSha1 => 64,
            HmacAlgorithm::HmacSha256 => 32,
            HmacAlgorithm::HmacSha384 => 48,
            HmacAlgorithm::HmacSha512 => 64,
        }
    }

    pub fn output_len(&self) -> usize {
        self.digest().output_len()
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HmacAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "HMACMD5" => Ok(HmacAlgorithm::HmacMd5),
            "HMACSHA1" => Ok(HmacAlgorithm::HmacSha1),
            "HMACSHA256" => Ok(HmacAlgorithm::HmacSha256),
            "HMACSHA384" => Ok(HmacAlgorithm::HmacSha384),
            "HMACSHA512" => Ok(HmacAlgorithm::HmacSha512),
            _ => Err(CryptoError::unsupported_algorithm(format!("Unknown HMAC algorithm: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_lengths_match_hashers() {
        for algorithm in DigestAlgorithm::ALL {
            assert_eq!(algorithm.new_hasher().output_size(), algorithm.output_len());
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("sha-256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("SHA1".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha1);
        assert_eq!("HmacSHA512".parse::<HmacAlgorithm>().unwrap(), HmacAlgorithm::HmacSha512);
        assert!(matches!(
            "RIPEMD160".parse::<DigestAlgorithm>(),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_names_roundtrip() {
        for algorithm in DigestAlgorithm::ALL {
            assert_eq!(algorithm.name().parse::<DigestAlgorithm>().unwrap(), algorithm);
        }
    }
}
