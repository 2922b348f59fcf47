//! Supported key algorithms and their size rules

use crate::shared::constants::*;
use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use std::fmt;
use std::str::FromStr;

/// Symmetric cipher algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymmetricAlgorithm {
    Aes,
    Des,
    DesEde,
    PbeWithMd5AndDes,
    PbeWithHmacSha256AndAes128,
    PbeWithHmacSha256AndAes256,
}

impl SymmetricAlgorithm {
    pub const ALL: [SymmetricAlgorithm; 6] = [
        SymmetricAlgorithm::Aes,
        SymmetricAlgorithm::Des,
        SymmetricAlgorithm::DesEde,
        SymmetricAlgorithm::PbeWithMd5AndDes,
        SymmetricAlgorithm::PbeWithHmacSha256AndAes128,
        SymmetricAlgorithm::PbeWithHmacSha256AndAes256,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SymmetricAlgorithm::Aes => "AES",
            SymmetricAlgorithm::Des => "DES",
            SymmetricAlgorithm::DesEde => "DESede",
            SymmetricAlgorithm::PbeWithMd5AndDes => "PBEWithMD5AndDES",
            SymmetricAlgorithm::PbeWithHmacSha256AndAes128 => "PBEWithHmacSHA256AndAES_128",
            SymmetricAlgorithm::PbeWithHmacSha256AndAes256 => "PBEWithHmacSHA256AndAES_256",
        }
    }

    /// Whether the key material is a password rather than a raw key
    pub fn is_password_based(&self) -> bool {
        matches!(
            self,
            SymmetricAlgorithm::PbeWithMd5AndDes
                | SymmetricAlgorithm::PbeWithHmacSha256AndAes128
                | SymmetricAlgorithm::PbeWithHmacSha256AndAes256
        )
    }

    /// Cipher block size in bytes
    pub fn block_size(&self) -> usize {
        match self {
            SymmetricAlgorithm::Aes
            | SymmetricAlgorithm::PbeWithHmacSha256AndAes128
            | SymmetricAlgorithm::PbeWithHmacSha256AndAes256 => AES_BLOCK_SIZE,
            SymmetricAlgorithm::Des | SymmetricAlgorithm::DesEde | SymmetricAlgorithm::PbeWithMd5AndDes => {
                DES_BLOCK_SIZE
            }
        }
    }

    /// Accepted raw key lengths; empty for password based algorithms
    pub fn key_lengths(&self) -> &'static [usize] {
        match self {
            SymmetricAlgorithm::Aes => AES_KEY_SIZES,
            SymmetricAlgorithm::Des => &[DES_KEY_SIZE],
            SymmetricAlgorithm::DesEde => &[DESEDE_KEY_SIZE],
            _ => &[],
        }
    }

    /// Length of randomly generated raw keys
    pub fn default_key_len(&self) -> usize {
        match self {
            SymmetricAlgorithm::Aes => AES_DEFAULT_KEY_SIZE,
            SymmetricAlgorithm::Des => DES_KEY_SIZE,
            SymmetricAlgorithm::DesEde => DESEDE_KEY_SIZE,
            _ => PBE_RANDOM_PASSWORD_LENGTH,
        }
    }

    /// Length of the key the password is stretched to
    pub fn derived_key_len(&self) -> Option<usize> {
        match self {
            SymmetricAlgorithm::PbeWithMd5AndDes => Some(DES_KEY_SIZE),
            SymmetricAlgorithm::PbeWithHmacSha256AndAes128 => Some(16),
            SymmetricAlgorithm::PbeWithHmacSha256AndAes256 => Some(32),
            _ => None,
        }
    }

    pub fn validate_key_len(&self, len: usize) -> CryptoResult<()> {
        if self.is_password_based() {
            if len == 0 {
                return Err(CryptoError::invalid_key_material(format!("{} password must not be empty", self)));
            }
            return Ok(());
        }
        if !self.key_lengths().contains(&len) {
            return Err(CryptoError::invalid_key_material(format!(
                "{} key must be {:?} bytes, got {}",
                self,
                self.key_lengths(),
                len
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SymmetricAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CryptoError::unsupported_algorithm(format!("Unknown symmetric algorithm: {}", s)))
    }
}

/// Asymmetric key algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsymmetricAlgorithm {
    Rsa,
}

impl AsymmetricAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            AsymmetricAlgorithm::Rsa => "RSA",
        }
    }
}

impl fmt::Display for AsymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AsymmetricAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RSA" => Ok(AsymmetricAlgorithm::Rsa),
            _ => Err(CryptoError::unsupported_algorithm(format!("Unknown asymmetric algorithm: {}", s))),
        }
    }
}
