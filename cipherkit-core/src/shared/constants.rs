//! Constants for the crypto core
//!
//! This module contains all constants used throughout the crypto core.

// Asymmetric constants
pub const DEFAULT_KEY_SIZE: usize = 1024;
pub const MIN_KEY_SIZE: usize = 512;
pub const MAX_KEY_SIZE: usize = 16384;
pub const PKCS1_PADDING_OVERHEAD: usize = 11; // 0x00 0x0N + 8 bytes PS + 0x00
pub const PKCS1_MIN_PS_LEN: usize = 8;

// Password based encryption constants
pub const PBE_SALT_SIZE: usize = 8;
pub const PBE_ITERATION_COUNT: u32 = 100;
pub const PBE_RANDOM_PASSWORD_LENGTH: usize = 32;

// Block cipher constants
pub const AES_BLOCK_SIZE: usize = 16;
pub const DES_BLOCK_SIZE: usize = 8;
pub const AES_KEY_SIZES: &[usize] = &[16, 24, 32];
pub const AES_DEFAULT_KEY_SIZE: usize = 16;
pub const DES_KEY_SIZE: usize = 8;
pub const DESEDE_KEY_SIZE: usize = 24;

// Stream constants
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

// Configuration environment keys
pub const ENV_DEFAULT_KEY_SIZE: &str = "CIPHERKIT_DEFAULT_KEY_SIZE";
pub const ENV_STREAM_BUFFER_SIZE: &str = "CIPHERKIT_STREAM_BUFFER_SIZE";
pub const ENV_SIGNATURE_DIGEST: &str = "CIPHERKIT_SIGNATURE_DIGEST";
pub const ENV_PBE_ITERATIONS: &str = "CIPHERKIT_PBE_ITERATIONS";
