//! Transformation strings and the parameters that travel with a ciphertext

use crate::crypto::keys::SymmetricAlgorithm;
use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use std::fmt;
use std::str::FromStr;

/// Block cipher mode of operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
    Ctr,
}

impl CipherMode {
    pub const ALL: [CipherMode; 5] = [CipherMode::Ecb, CipherMode::Cbc, CipherMode::Cfb, CipherMode::Ofb, CipherMode::Ctr];

    pub fn name(&self) -> &'static str {
        match self {
            CipherMode::Ecb => "ECB",
            CipherMode::Cbc => "CBC",
            CipherMode::Cfb => "CFB",
            CipherMode::Ofb => "OFB",
            CipherMode::Ctr => "CTR",
        }
    }

    pub fn needs_iv(&self) -> bool {
        !matches!(self, CipherMode::Ecb)
    }

    /// Whether raw input has to be a whole number of blocks
    pub fn is_block_aligned(&self) -> bool {
        matches!(self, CipherMode::Ecb | CipherMode::Cbc)
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ECB" => Ok(CipherMode::Ecb),
            "CBC" => Ok(CipherMode::Cbc),
            "CFB" => Ok(CipherMode::Cfb),
            "OFB" => Ok(CipherMode::Ofb),
            "CTR" => Ok(CipherMode::Ctr),
            "NONE" | "CTS" | "PCBC" => Err(CryptoError::unsupported_algorithm(format!("Cipher mode {} is not supported", s))),
            _ => Err(CryptoError::unsupported_algorithm(format!("Unknown cipher mode: {}", s))),
        }
    }
}

/// Block padding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherPadding {
    NoPadding,
    Pkcs5,
    Iso10126,
}

impl CipherPadding {
    pub const ALL: [CipherPadding; 3] = [CipherPadding::NoPadding, CipherPadding::Pkcs5, CipherPadding::Iso10126];

    pub fn name(&self) -> &'static str {
        match self {
            CipherPadding::NoPadding => "NoPadding",
            CipherPadding::Pkcs5 => "PKCS5Padding",
            CipherPadding::Iso10126 => "ISO10126Padding",
        }
    }
}

impl fmt::Display for CipherPadding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherPadding {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOPADDING" => Ok(CipherPadding::NoPadding),
            "PKCS5PADDING" | "PKCS7PADDING" => Ok(CipherPadding::Pkcs5),
            "ISO10126PADDING" => Ok(CipherPadding::Iso10126),
            "OAEPPADDING" | "PKCS1PADDING" | "SSL3PADDING" => Err(CryptoError::unsupported_algorithm(format!(
                "Padding {} is not supported for symmetric ciphers",
                s
            ))),
            _ => Err(CryptoError::unsupported_algorithm(format!("Unknown padding: {}", s))),
        }
    }
}

/// Validated `NAME/MODE/PADDING` transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSpec {
    algorithm: SymmetricAlgorithm,
    mode: CipherMode,
    padding: CipherPadding,
}

impl CipherSpec {
    pub fn new(algorithm: SymmetricAlgorithm, mode: CipherMode, padding: CipherPadding) -> CryptoResult<Self> {
        if algorithm.is_password_based() && (mode != CipherMode::Cbc || padding != CipherPadding::Pkcs5) {
            return Err(CryptoError::unsupported_algorithm(format!(
                "{} only supports CBC/PKCS5Padding, got {}/{}",
                algorithm, mode, padding
            )));
        }
        Ok(Self { algorithm, mode, padding })
    }

    /// Default transformation for a bare algorithm name
    pub fn for_algorithm(algorithm: SymmetricAlgorithm) -> Self {
        let mode = if algorithm.is_password_based() { CipherMode::Cbc } else { CipherMode::Ecb };
        Self {
            algorithm,
            mode,
            padding: CipherPadding::Pkcs5,
        }
    }

    pub fn algorithm(&self) -> SymmetricAlgorithm {
        self.algorithm
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn padding(&self) -> CipherPadding {
        self.padding
    }

    pub fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    /// Whether transforms need an IV from the cipher parameters
    pub fn needs_iv(&self) -> bool {
        match self.algorithm {
            // IV comes out of the key derivation
            SymmetricAlgorithm::PbeWithMd5AndDes => false,
            _ => self.mode.needs_iv(),
        }
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.algorithm, self.mode, self.padding)
    }
}

impl FromStr for CipherSpec {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            [name] => Ok(Self::for_algorithm(name.parse()?)),
            [name, mode, padding] => Self::new(name.parse()?, mode.parse()?, padding.parse()?),
            _ => Err(CryptoError::unsupported_algorithm(format!(
                "Transformation must be NAME or NAME/MODE/PADDING, got {}",
                s
            ))),
        }
    }
}

/// Algorithm parameters shared between the encrypting and decrypting side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CipherParams {
    pub iv: Option<Vec<u8>>,
    pub salt: Option<Vec<u8>>,
    pub iterations: Option<u32>,
}

impl CipherParams {
    pub fn with_iv(iv: &[u8]) -> Self {
        Self {
            iv: Some(iv.to_vec()),
            ..Self::default()
        }
    }

    pub fn with_salt(salt: &[u8], iterations: u32) -> Self {
        Self {
            salt: Some(salt.to_vec()),
            iterations: Some(iterations),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_transformation() {
        let spec: CipherSpec = "AES/CBC/PKCS5Padding".parse().unwrap();
        assert_eq!(spec.algorithm(), SymmetricAlgorithm::Aes);
        assert_eq!(spec.mode(), CipherMode::Cbc);
        assert_eq!(spec.padding(), CipherPadding::Pkcs5);
        assert_eq!(spec.to_string(), "AES/CBC/PKCS5Padding");
    }

    #[test]
    fn test_bare_name_defaults() {
        let spec: CipherSpec = "DESede".parse().unwrap();
        assert_eq!(spec.to_string(), "DESede/ECB/PKCS5Padding");

        let spec: CipherSpec = "PBEWithMD5AndDES".parse().unwrap();
        assert_eq!(spec.to_string(), "PBEWithMD5AndDES/CBC/PKCS5Padding");
        assert!(!spec.needs_iv());

        let spec: CipherSpec = "PBEWithHmacSHA256AndAES_128".parse().unwrap();
        assert!(spec.needs_iv());
    }

    #[test]
    fn test_rejected_modes_and_paddings() {
        for transformation in [
            "AES/CTS/NoPadding",
            "AES/PCBC/PKCS5Padding",
            "AES/NONE/NoPadding",
            "AES/ECB/OAEPPadding",
            "DES/CBC/PKCS1Padding",
            "DES/CBC/SSL3Padding",
            "AES/GCM/NoPadding",
            "AES/CBC",
        ] {
            assert!(
                matches!(transformation.parse::<CipherSpec>(), Err(CryptoError::UnsupportedAlgorithm(_))),
                "{} should be rejected",
                transformation
            );
        }
    }

    #[test]
    fn test_pbe_only_cbc_pkcs5() {
        assert!("PBEWithMD5AndDES/ECB/PKCS5Padding".parse::<CipherSpec>().is_err());
        assert!("PBEWithHmacSHA256AndAES_256/CBC/NoPadding".parse::<CipherSpec>().is_err());
        assert!("PBEWithHmacSHA256AndAES_256/CBC/PKCS5Padding".parse::<CipherSpec>().is_ok());
    }

    #[test]
    fn test_iv_requirements() {
        assert!(!CipherMode::Ecb.needs_iv());
        for mode in [CipherMode::Cbc, CipherMode::Cfb, CipherMode::Ofb, CipherMode::Ctr] {
            assert!(mode.needs_iv());
        }
    }
}
