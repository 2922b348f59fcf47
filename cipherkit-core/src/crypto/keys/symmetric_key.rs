//! Secret key material for the symmetric ciphers

use crate::shared::types::CryptoResult;
use crate::shared::utils::base64_encode;
use zeroize::Zeroizing;
use super::SymmetricAlgorithm;

/// Symmetric key material bound to its algorithm
///
/// For password based algorithms the material is the password; the actual
/// cipher key is derived from it per transform. Bytes are zeroized on drop.
#[derive(Clone)]
pub struct SymmetricKey {
    algorithm: SymmetricAlgorithm,
    material: Zeroizing<Vec<u8>>,
}

impl SymmetricKey {
    /// Wrap raw key bytes, rejecting lengths the algorithm does not accept
    pub fn new(algorithm: SymmetricAlgorithm, material: &[u8]) -> CryptoResult<Self> {
        algorithm.validate_key_len(material.len())?;
        Ok(Self {
            algorithm,
            material: Zeroizing::new(material.to_vec()),
        })
    }

    pub fn algorithm(&self) -> SymmetricAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.material
    }

    pub fn len(&self) -> usize {
        self.material.len()
    }

    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }

    pub fn to_base64(&self) -> String {
        base64_encode(&self.material)
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.material.as_slice() == other.material.as_slice()
    }
}

impl Eq for SymmetricKey {}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("algorithm", &self.algorithm)
            .field("len", &self.material.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::CryptoError;
    use crate::shared::utils::base64_decode;

    #[test]
    fn test_wrong_length_rejected() {
        let result = SymmetricKey::new(SymmetricAlgorithm::Aes, &[0u8; 15]);
        assert!(matches!(result, Err(CryptoError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn test_debug_hides_material() {
        let key = SymmetricKey::new(SymmetricAlgorithm::Des, b"\x42\x42\x42\x42\x42\x42\x42\x42").unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("Des"));
        assert!(!debug.contains("66"));
    }

    #[test]
    fn test_base64_export() {
        let key = SymmetricKey::new(SymmetricAlgorithm::Aes, &[9u8; 32]).unwrap();
        assert_eq!(base64_decode(&key.to_base64()).unwrap(), vec![9u8; 32]);
        assert_eq!(key.len(), 32);
    }
}
