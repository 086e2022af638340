//! Generic stream and block adapters over RustCrypto mode types.
//!
//! These know nothing about IVs or framing; [`crate::aes`], [`crate::des`]
//! and [`crate::rc4`] build the framed operations on top of them.

use cipher::{
    AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, BlockSizeUser, StreamCipher,
    block_padding::NoPadding,
};

use crate::{
    error::{BLOCK, Result, STREAM},
    padding,
};

/// Apply a keystream to a copy of `input`. Encryption and decryption are the
/// same operation.
pub fn stream_xor<S: StreamCipher>(mut cipher: S, input: &[u8]) -> Result<Vec<u8>> {
    let mut buf = input.to_vec();
    cipher
        .try_apply_keystream(&mut buf)
        .map_err(|_| STREAM.with_detail("keystream exhausted"))?;
    Ok(buf)
}

/// Encrypt with a self-synchronising stream mode such as CFB. A trailing
/// partial block is handled by the mode.
pub fn async_stream_encrypt<E>(cipher: E, input: &[u8]) -> Vec<u8>
where
    E: AsyncStreamCipher + BlockEncryptMut,
{
    let mut buf = input.to_vec();
    cipher.encrypt(&mut buf);
    buf
}

pub fn async_stream_decrypt<D>(cipher: D, input: &[u8]) -> Vec<u8>
where
    D: AsyncStreamCipher + BlockDecryptMut,
{
    let mut buf = input.to_vec();
    cipher.decrypt(&mut buf);
    buf
}

/// PKCS#7-pad `plaintext` to the mode's block size and encrypt it.
pub fn block_encrypt<M: BlockEncryptMut>(mode: M, plaintext: &[u8]) -> Result<Vec<u8>> {
    let block_size = <M as BlockSizeUser>::block_size();
    let mut buf = padding::pkcs7_pad(block_size, plaintext).map_err(|e| BLOCK.wrap(e))?;
    let len = buf.len();
    mode.encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .map_err(|_| BLOCK.with_detail("padded input is not block aligned"))?;
    Ok(buf)
}

/// Decrypt `ciphertext` and strip its PKCS#7 padding.
pub fn block_decrypt<M: BlockDecryptMut>(mode: M, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let block_size = <M as BlockSizeUser>::block_size();
    let mut buf = ciphertext.to_vec();
    mode.decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| {
            BLOCK.with_detail(format!(
                "ciphertext length {} is not a multiple of block size {block_size}",
                ciphertext.len()
            ))
        })?;
    padding::pkcs7_unpad(block_size, &buf).map_err(|e| BLOCK.wrap(e))
}
