//! Runtime configuration for the crypto core
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file); anything unset falls back to the built-in defaults.

use crate::crypto::hashing::DigestAlgorithm;
use crate::shared::constants::*;
use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use dotenv::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoConfig {
    /// Modulus size in bits for freshly generated key pairs
    pub default_key_size: usize,
    /// Chunk size used when digesting streams
    pub stream_buffer_size: usize,
    /// Digest combined with the asymmetric algorithm for signatures
    pub signature_digest: DigestAlgorithm,
    /// Iteration count for password based encryption
    pub pbe_iterations: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            default_key_size: DEFAULT_KEY_SIZE,
            stream_buffer_size: DEFAULT_BUFFER_SIZE,
            signature_digest: DigestAlgorithm::Md5,
            pbe_iterations: PBE_ITERATION_COUNT,
        }
    }
}

impl CryptoConfig {
    /// Load configuration from `.env` (if present) and the environment
    pub fn from_env() -> CryptoResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> CryptoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            default_key_size: parse_or(&lookup, ENV_DEFAULT_KEY_SIZE, defaults.default_key_size)?,
            stream_buffer_size: parse_or(&lookup, ENV_STREAM_BUFFER_SIZE, defaults.stream_buffer_size)?,
            signature_digest: parse_or(&lookup, ENV_SIGNATURE_DIGEST, defaults.signature_digest)?,
            pbe_iterations: parse_or(&lookup, ENV_PBE_ITERATIONS, defaults.pbe_iterations)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CryptoResult<()> {
        if self.default_key_size < MIN_KEY_SIZE || self.default_key_size > MAX_KEY_SIZE || self.default_key_size % 8 != 0 {
            return Err(CryptoError::config(format!(
                "{} must be a multiple of 8 between {} and {}, got {}",
                ENV_DEFAULT_KEY_SIZE, MIN_KEY_SIZE, MAX_KEY_SIZE, self.default_key_size
            )));
        }
        if self.stream_buffer_size == 0 {
            return Err(CryptoError::config(format!("{} must be positive", ENV_STREAM_BUFFER_SIZE)));
        }
        if self.pbe_iterations == 0 {
            return Err(CryptoError::config(format!("{} must be positive", ENV_PBE_ITERATIONS)));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> CryptoResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| CryptoError::config(format!("Invalid {}={:?}: {}", key, raw, e))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CryptoConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CryptoConfig::default());
        assert_eq!(config.default_key_size, 1024);
        assert_eq!(config.stream_buffer_size, 4096);
        assert_eq!(config.signature_digest, DigestAlgorithm::Md5);
        assert_eq!(config.pbe_iterations, 100);
    }

    #[test]
    fn test_overrides() {
        let config = CryptoConfig::from_lookup(lookup_from(&[
            (ENV_DEFAULT_KEY_SIZE, "2048"),
            (ENV_SIGNATURE_DIGEST, "SHA-256"),
            (ENV_STREAM_BUFFER_SIZE, " 512 "),
        ]))
        .unwrap();
        assert_eq!(config.default_key_size, 2048);
        assert_eq!(config.signature_digest, DigestAlgorithm::Sha256);
        assert_eq!(config.stream_buffer_size, 512);
    }

    #[test]
    fn test_invalid_values() {
        let bad_number = CryptoConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_KEY_SIZE, "big")]));
        assert!(matches!(bad_number, Err(CryptoError::Config(_))));

        let too_small = CryptoConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_KEY_SIZE, "256")]));
        assert!(matches!(too_small, Err(CryptoError::Config(_))));

        let zero_buffer = CryptoConfig::from_lookup(lookup_from(&[(ENV_STREAM_BUFFER_SIZE, "0")]));
        assert!(matches!(zero_buffer, Err(CryptoError::Config(_))));

        let bad_digest = CryptoConfig::from_lookup(lookup_from(&[(ENV_SIGNATURE_DIGEST, "WHIRLPOOL")]));
        assert!(matches!(bad_digest, Err(CryptoError::Config(_))));
    }
}
