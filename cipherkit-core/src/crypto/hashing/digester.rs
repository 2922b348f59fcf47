//! Unkeyed message digests and the shared digest engine trait

use crate::shared::constants::DEFAULT_BUFFER_SIZE;
use crate::shared::types::{Charset, CryptoResult};
use crate::shared::utils::hex_encode;
use sha2::digest::DynDigest;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use super::DigestAlgorithm;

/// Incremental digest computation shared by [`Digester`] and
/// [`Hmacer`](super::Hmacer).
///
/// Every provided method leaves the engine reset, whether it succeeds or
/// fails, so one instance can compute any number of independent digests.
/// Engines are not synchronized; `&mut self` keeps calls serialized.
pub trait DigestEngine {
    /// Feed bytes into the running state
    fn update(&mut self, data: &[u8]);

    /// Produce the digest and reset the state
    fn finalize_reset(&mut self) -> Vec<u8>;

    /// Drop any partially absorbed input
    fn reset(&mut self);

    /// Digest length in bytes
    fn output_len(&self) -> usize;

    fn digest(&mut self, data: &[u8]) -> Vec<u8> {
        self.reset();
        self.update(data);
        self.finalize_reset()
    }

    fn digest_hex(&mut self, data: &[u8]) -> String {
        hex_encode(&self.digest(data))
    }

    fn digest_str(&mut self, text: &str, charset: Charset) -> CryptoResult<Vec<u8>> {
        let bytes = charset.encode(text)?;
        Ok(self.digest(&bytes))
    }

    fn digest_str_hex(&mut self, text: &str, charset: Charset) -> CryptoResult<String> {
        Ok(hex_encode(&self.digest_str(text, charset)?))
    }

    /// Digest a stream in `buffer_size` chunks; zero selects the default size
    fn digest_reader<R: Read>(&mut self, mut reader: R, buffer_size: usize) -> CryptoResult<Vec<u8>>
    where
        Self: Sized,
    {
        let buffer_size = if buffer_size < 1 { DEFAULT_BUFFER_SIZE } else { buffer_size };
        let mut buffer = vec![0u8; buffer_size];
        self.reset();
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => self.update(&buffer[..read]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.reset();
                    return Err(e.into());
                }
            }
        }
        Ok(self.finalize_reset())
    }

    fn digest_reader_hex<R: Read>(&mut self, reader: R, buffer_size: usize) -> CryptoResult<String>
    where
        Self: Sized,
    {
        Ok(hex_encode(&self.digest_reader(reader, buffer_size)?))
    }

    fn digest_file<P: AsRef<Path>>(&mut self, path: P) -> CryptoResult<Vec<u8>>
    where
        Self: Sized,
    {
        let file = File::open(path.as_ref())?;
        self.digest_reader(BufReader::new(file), DEFAULT_BUFFER_SIZE)
    }

    fn digest_file_hex<P: AsRef<Path>>(&mut self, path: P) -> CryptoResult<String>
    where
        Self: Sized,
    {
        Ok(hex_encode(&self.digest_file(path)?))
    }
}

/// Reusable message digester
pub struct Digester {
    algorithm: DigestAlgorithm,
    hasher: Box<dyn DynDigest + Send>,
}

impl Digester {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            hasher: algorithm.new_hasher(),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl DigestEngine for Digester {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        self.hasher.finalize_reset().into_vec()
    }

    fn reset(&mut self) {
        self.hasher.reset();
    }

    fn output_len(&self) -> usize {
        self.algorithm.output_len()
    }
}

impl std::fmt::Debug for Digester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digester").field("algorithm", &self.algorithm).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    #[test]
    fn test_md5_abc() {
        let mut digester = Digester::new(DigestAlgorithm::Md5);
        assert_eq!(
            digester.digest_str_hex("abc", Charset::Utf8).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn test_known_vectors() {
        let mut sha1 = Digester::new(DigestAlgorithm::Sha1);
        assert_eq!(sha1.digest_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");

        let mut sha256 = Digester::new(DigestAlgorithm::Sha256);
        assert_eq!(
            sha256.digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_output_lengths() {
        for algorithm in DigestAlgorithm::ALL {
            let mut digester = Digester::new(algorithm);
            assert_eq!(digester.digest(b"Hello, World!").len(), algorithm.output_len());
        }
    }

    #[test]
    fn test_reuse_resets_state() {
        let mut digester = Digester::new(DigestAlgorithm::Sha256);
        let first = digester.digest(b"first");
        let _ = digester.digest(b"second");
        assert_eq!(digester.digest(b"first"), first);

        // Stray partial input is discarded by the next one-shot digest
        digester.update(b"garbage");
        assert_eq!(digester.digest(b"first"), first);
    }

    #[test]
    fn test_different_inputs_differ() {
        let mut digester = Digester::new(DigestAlgorithm::Md5);
        assert_ne!(digester.digest(b"x"), digester.digest(b"y"));
    }

    #[test]
    fn test_stream_matches_one_shot() {
        let data = b"x".repeat(10_000);
        let mut digester = Digester::new(DigestAlgorithm::Sha1);
        let expected = digester.digest(&data);
        assert_eq!(digester.digest_reader(&data[..], 7).unwrap(), expected);
        assert_eq!(digester.digest_reader(&data[..], 0).unwrap(), expected);
    }

    #[test]
    fn test_stream_error_resets_state() {
        struct FailingReader(bool);
        impl Read for FailingReader {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0 {
                    return Err(std::io::Error::new(ErrorKind::Other, "boom"));
                }
                self.0 = true;
                buf[0] = 1;
                Ok(1)
            }
        }

        let mut digester = Digester::new(DigestAlgorithm::Md5);
        let result = digester.digest_reader(FailingReader(false), 16);
        assert!(matches!(result, Err(crate::shared::error::CryptoError::Io(_))));
        assert_eq!(digester.finalize_reset(), Digester::new(DigestAlgorithm::Md5).digest(b""));
    }

    #[test]
    fn test_digest_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        file.flush().unwrap();

        let mut digester = Digester::new(DigestAlgorithm::Md5);
        assert_eq!(digester.digest_file_hex(file.path()).unwrap(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_missing_file() {
        let mut digester = Digester::new(DigestAlgorithm::Md5);
        assert!(digester.digest_file("/definitely/not/here").is_err());
    }

    proptest! {
        #[test]
        fn prop_chunked_stream_equals_one_shot(data in proptest::collection::vec(any::<u8>(), 0..2048), chunk in 1usize..300) {
            let mut digester = Digester::new(DigestAlgorithm::Sha256);
            let expected = digester.digest(&data);
            for piece in data.chunks(chunk) {
                digester.update(piece);
            }
            prop_assert_eq!(digester.finalize_reset(), expected.clone());
            prop_assert_eq!(digester.digest_reader(&data[..], chunk).unwrap(), expected);
        }
    }
}
