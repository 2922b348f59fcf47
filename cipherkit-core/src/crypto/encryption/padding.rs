//! Block padding schemes

use crate::crypto::keys::KeyManager;
use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use super::CipherPadding;

impl CipherPadding {
    /// Extend `data` to a whole number of blocks
    pub(crate) fn pad(&self, data: &[u8], block_size: usize) -> Vec<u8> {
        let fill = block_size - data.len() % block_size;
        let mut padded = Vec::with_capacity(data.len() + fill);
        padded.extend_from_slice(data);
        match self {
            CipherPadding::NoPadding => return padded,
            CipherPadding::Pkcs5 => padded.resize(data.len() + fill, fill as u8),
            CipherPadding::Iso10126 => {
                padded.extend_from_slice(&KeyManager::random_bytes(fill - 1));
                padded.push(fill as u8);
            }
        }
        padded
    }

    /// Strip padding added by [`pad`](Self::pad)
    pub(crate) fn unpad(&self, mut data: Vec<u8>, block_size: usize) -> CryptoResult<Vec<u8>> {
        if *self == CipherPadding::NoPadding {
            return Ok(data);
        }
        if data.is_empty() || data.len() % block_size != 0 {
            return Err(CryptoError::crypto_operation(format!(
                "Padded input length {} is not a multiple of {}",
                data.len(),
                block_size
            )));
        }

        let fill = data[data.len() - 1] as usize;
        if fill == 0 || fill > block_size {
            return Err(bad_padding());
        }
        if *self == CipherPadding::Pkcs5 {
            let tail = &data[data.len() - fill..];
            let mismatch = tail.iter().fold(0u8, |acc, byte| acc | (byte ^ fill as u8));
            if mismatch != 0 {
                return Err(bad_padding());
            }
        }
        data.truncate(data.len() - fill);
        Ok(data)
    }
}

fn bad_padding() -> CryptoError {
    CryptoError::crypto_operation("Given final block not properly padded")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkcs5_full_block_on_aligned_input() {
        let padded = CipherPadding::Pkcs5.pad(&[1u8; 16], 16);
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
        assert_eq!(CipherPadding::Pkcs5.unpad(padded, 16).unwrap(), vec![1u8; 16]);
    }

    #[test]
    fn test_pkcs5_partial_block() {
        let padded = CipherPadding::Pkcs5.pad(b"abc", 8);
        assert_eq!(padded, b"abc\x05\x05\x05\x05\x05".to_vec());
    }

    #[test]
    fn test_iso10126_only_checks_last_byte() {
        let padded = CipherPadding::Iso10126.pad(b"hello", 8);
        assert_eq!(padded.len(), 8);
        assert_eq!(padded[7], 3);
        assert_eq!(CipherPadding::Iso10126.unpad(padded, 8).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_no_padding_is_identity() {
        assert_eq!(CipherPadding::NoPadding.pad(b"abc", 8), b"abc".to_vec());
        assert_eq!(CipherPadding::NoPadding.unpad(b"abc".to_vec(), 8).unwrap(), b"abc".to_vec());
    }

    #[test]
    fn test_corrupt_padding_rejected() {
        let mut block = vec![0u8; 8];
        block[7] = 9;
        assert!(CipherPadding::Pkcs5.unpad(block.clone(), 8).is_err());
        block[7] = 0;
        assert!(CipherPadding::Iso10126.unpad(block, 8).is_err());
        assert!(CipherPadding::Pkcs5.unpad(b"\x02\x01\x02\x02\x02\x02\x02\x03".to_vec(), 8).is_err());
        assert!(CipherPadding::Pkcs5.unpad(Vec::new(), 8).is_err());
    }
}
