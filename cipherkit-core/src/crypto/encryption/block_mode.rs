//! Modes of operation over a raw block primitive
//!
//! The primitive only transforms single blocks; chaining, feedback, counters
//! and padding are applied here. `CipherHandle` is the mutable transform
//! handle owned by a symmetric cipher: it is initialized for one direction,
//! consumes one message in `do_final`, and is always back to `Ready`
//! afterwards, whether the transform succeeded or not.

use crate::crypto::keys::SymmetricAlgorithm;
use crate::shared::error::CryptoError;
use crate::shared::types::CryptoResult;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use des::{Des, TdesEde3};
use zeroize::Zeroizing;
use super::{CipherMode, CipherPadding};

/// Single-block encryption and decryption
pub(crate) trait BlockPrimitive: Send {
    fn block_len(&self) -> usize;
    fn seal_block(&self, block: &mut [u8]);
    fn open_block(&self, block: &mut [u8]);
}

impl<C> BlockPrimitive for C
where
    C: BlockEncrypt + BlockDecrypt + Send,
{
    fn block_len(&self) -> usize {
        <C as BlockSizeUser>::block_size()
    }

    fn seal_block(&self, block: &mut [u8]) {
        self.encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn open_block(&self, block: &mut [u8]) {
        self.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

/// Instantiate the block cipher behind `algorithm` with a raw key
pub(crate) fn new_primitive(algorithm: SymmetricAlgorithm, key: &[u8]) -> CryptoResult<Box<dyn BlockPrimitive>> {
    fn boxed<C: BlockPrimitive + KeyInit + 'static>(key: &[u8]) -> CryptoResult<Box<dyn BlockPrimitive>> {
        C::new_from_slice(key)
            .map(|cipher| Box::new(cipher) as Box<dyn BlockPrimitive>)
            .map_err(|_| CryptoError::invalid_key_material(format!("Invalid key length {}", key.len())))
    }

    match algorithm {
        SymmetricAlgorithm::Aes
        | SymmetricAlgorithm::PbeWithHmacSha256AndAes128
        | SymmetricAlgorithm::PbeWithHmacSha256AndAes256 => match key.len() {
            16 => boxed::<Aes128>(key),
            24 => boxed::<Aes192>(key),
            32 => boxed::<Aes256>(key),
            len => Err(CryptoError::invalid_key_material(format!("AES key must be 16, 24 or 32 bytes, got {}", len))),
        },
        SymmetricAlgorithm::Des | SymmetricAlgorithm::PbeWithMd5AndDes => boxed::<Des>(key),
        SymmetricAlgorithm::DesEde => boxed::<TdesEde3>(key),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Encrypt,
    Decrypt,
}

struct Transform {
    direction: Direction,
    primitive: Box<dyn BlockPrimitive>,
    iv: Zeroizing<Vec<u8>>,
}

enum HandleState {
    Uninitialized,
    Ready,
    Active(Transform),
}

/// Mutable transform handle for one mode/padding combination
pub(crate) struct CipherHandle {
    mode: CipherMode,
    padding: CipherPadding,
    state: HandleState,
}

impl CipherHandle {
    pub(crate) fn new(mode: CipherMode, padding: CipherPadding) -> Self {
        Self {
            mode,
            padding,
            state: HandleState::Uninitialized,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        matches!(self.state, HandleState::Active(_))
    }

    /// Arm the handle for one transform; a handle left armed by an earlier
    /// caller is simply re-armed
    pub(crate) fn init(
        &mut self,
        direction: Direction,
        primitive: Box<dyn BlockPrimitive>,
        iv: Option<&[u8]>,
    ) -> CryptoResult<()> {
        self.state = HandleState::Ready;
        let block_size = primitive.block_len();
        let iv = match (self.mode.needs_iv(), iv) {
            (false, _) => Vec::new(),
            (true, Some(iv)) if iv.len() == block_size => iv.to_vec(),
            (true, Some(iv)) => {
                return Err(CryptoError::crypto_operation(format!(
                    "Wrong IV length: must be {} bytes long, got {}",
                    block_size,
                    iv.len()
                )))
            }
            (true, None) => return Err(CryptoError::crypto_operation(format!("{} mode requires an IV", self.mode))),
        };
        self.state = HandleState::Active(Transform {
            direction,
            primitive,
            iv: Zeroizing::new(iv),
        });
        Ok(())
    }

    /// Transform a complete message and return the handle to `Ready`
    pub(crate) fn do_final(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>> {
        let transform = match std::mem::replace(&mut self.state, HandleState::Ready) {
            HandleState::Active(transform) => transform,
            _ => return Err(CryptoError::crypto_operation("Cipher not initialized")),
        };
        let block_size = transform.primitive.block_len();

        match transform.direction {
            Direction::Encrypt => {
                let padded = self.padding.pad(input, block_size);
                if self.mode.is_block_aligned() && padded.len() % block_size != 0 {
                    return Err(misaligned(padded.len(), block_size));
                }
                Ok(self.apply(&transform, &padded, Direction::Encrypt))
            }
            Direction::Decrypt => {
                if self.mode.is_block_aligned() && input.len() % block_size != 0 {
                    return Err(misaligned(input.len(), block_size));
                }
                let plain = self.apply(&transform, input, Direction::Decrypt);
                self.padding.unpad(plain, block_size)
            }
        }
    }

    fn apply(&self, transform: &Transform, input: &[u8], direction: Direction) -> Vec<u8> {
        let primitive = transform.primitive.as_ref();
        let iv = transform.iv.as_slice();
        match self.mode {
            CipherMode::Ecb => ecb(primitive, input, direction),
            CipherMode::Cbc => cbc(primitive, iv, input, direction),
            CipherMode::Cfb => cfb(primitive, iv, input, direction),
            CipherMode::Ofb => ofb(primitive, iv, input),
            CipherMode::Ctr => ctr(primitive, iv, input),
        }
    }
}

fn misaligned(len: usize, block_size: usize) -> CryptoError {
    CryptoError::crypto_operation(format!(
        "Input length not multiple of {} bytes: {}",
        block_size, len
    ))
}

fn xor_in_place(target: &mut [u8], other: &[u8]) {
    for (t, o) in target.iter_mut().zip(other) {
        *t ^= o;
    }
}

fn ecb(primitive: &dyn BlockPrimitive, input: &[u8], direction: Direction) -> Vec<u8> {
    let mut output = input.to_vec();
    for block in output.chunks_exact_mut(primitive.block_len()) {
        match direction {
            Direction::Encrypt => primitive.seal_block(block),
            Direction::Decrypt => primitive.open_block(block),
        }
    }
    output
}

fn cbc(primitive: &dyn BlockPrimitive, iv: &[u8], input: &[u8], direction: Direction) -> Vec<u8> {
    let mut output = input.to_vec();
    let mut previous = iv.to_vec();
    for block in output.chunks_exact_mut(primitive.block_len()) {
        match direction {
            Direction::Encrypt => {
                xor_in_place(block, &previous);
                primitive.seal_block(block);
                previous.copy_from_slice(block);
            }
            Direction::Decrypt => {
                let ciphertext = block.to_vec();
                primitive.open_block(block);
                xor_in_place(block, &previous);
                previous = ciphertext;
            }
        }
    }
    output
}

/// Full-block cipher feedback; a trailing partial block is XORed with a
/// truncated keystream block
fn cfb(primitive: &dyn BlockPrimitive, iv: &[u8], input: &[u8], direction: Direction) -> Vec<u8> {
    let mut output = input.to_vec();
    let mut register = iv.to_vec();
    for chunk in output.chunks_mut(primitive.block_len()) {
        let mut keystream = register.clone();
        primitive.seal_block(&mut keystream);
        let ciphertext = match direction {
            Direction::Encrypt => {
                xor_in_place(chunk, &keystream);
                chunk.to_vec()
            }
            Direction::Decrypt => {
                let ciphertext = chunk.to_vec();
                xor_in_place(chunk, &keystream);
                ciphertext
            }
        };
        register[..ciphertext.len()].copy_from_slice(&ciphertext);
    }
    output
}

fn ofb(primitive: &dyn BlockPrimitive, iv: &[u8], input: &[u8]) -> Vec<u8> {
    let mut output = input.to_vec();
    let mut keystream = iv.to_vec();
    for chunk in output.chunks_mut(primitive.block_len()) {
        primitive.seal_block(&mut keystream);
        xor_in_place(chunk, &keystream);
    }
    output
}

fn ctr(primitive: &dyn BlockPrimitive, iv: &[u8], input: &[u8]) -> Vec<u8> {
    let mut output = input.to_vec();
    let mut counter = iv.to_vec();
    for chunk in output.chunks_mut(primitive.block_len()) {
        let mut keystream = counter.clone();
        primitive.seal_block(&mut keystream);
        xor_in_place(chunk, &keystream);
        increment_be(&mut counter);
    }
    output
}

/// Big-endian increment over the whole counter block, wrapping at the top
fn increment_be(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            break;
        }
    }
}
