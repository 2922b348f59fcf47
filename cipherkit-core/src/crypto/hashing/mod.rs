//! Message digests and HMAC

pub mod hash_algorithm;
pub mod digester;
pub mod hmacer;

pub use hash_algorithm::*;
pub use digester::*;
pub use hmacer::*;

use crate::shared::types::CryptoResult;

pub fn md5(data: &[u8]) -> Vec<u8> {
    Digester::new(DigestAlgorithm::Md5).digest(data)
}

pub fn md5_hex(data: &[u8]) -> String {
    Digester::new(DigestAlgorithm::Md5).digest_hex(data)
}

pub fn sha1(data: &[u8]) -> Vec<u8> {
    Digester::new(DigestAlgorithm::Sha1).digest(data)
}

pub fn sha1_hex(data: &[u8]) -> String {
    Digester::new(DigestAlgorithm::Sha1).digest_hex(data)
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    Digester::new(DigestAlgorithm::Sha256).digest(data)
}

pub fn sha256_hex(data: &[u8]) -> String {
    Digester::new(DigestAlgorithm::Sha256).digest_hex(data)
}

/// One-shot HMAC
pub fn hmac(algorithm: HmacAlgorithm, key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>> {
    Ok(Hmacer::new(algorithm, key)?.digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers() {
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(sha1(b"abc").len(), 20);
        assert_eq!(hex::encode(sha256(b"")), sha256_hex(b""));
        assert_eq!(md5(b"abc"), hex::decode(md5_hex(b"abc")).unwrap());
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_one_shot_hmac() {
        let tag = hmac(HmacAlgorithm::HmacMd5, b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(hex::encode(tag), "750c783e6ab0b503eaa86e310a5db738");
    }
}
