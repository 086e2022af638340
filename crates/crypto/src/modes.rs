//! Framed encrypt/decrypt for each block cipher mode, generic over the cipher.
//!
//! Every output is `IV || body` with an IV as long as the mode requires
//! (the cipher's block size). Decrypt validates the minimum length before the
//! cipher is constructed.

use {
    cipher::{
        BlockCipher, BlockDecryptMut, BlockEncryptMut, BlockSizeUser, IvSizeUser, KeyInit,
        KeyIvInit, StreamCipher,
    },
    gantry_common::Kind,
};

use crate::{
    error::{DECRYPT, ENCRYPT, Error, Result},
    primitive, random,
};

fn fresh_iv(label: &'static str, len: usize) -> Result<Vec<u8>> {
    random::random_bytes(len).map_err(|e| ENCRYPT.wrap(e).with_detail(label))
}

fn frame(iv: &[u8], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(iv.len() + body.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(body);
    out
}

pub(crate) fn too_short(label: &'static str, got: usize, want: usize) -> Error {
    DECRYPT.with_detail(format!(
        "{label}: ciphertext is {got} bytes, at least {want} required"
    ))
}

pub(crate) fn bad_key(kind: Kind, label: &'static str, len: usize) -> Error {
    kind.with_detail(format!("{label}: invalid key length {len}"))
}

pub(crate) fn cbc_encrypt<C>(label: &'static str, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let iv = fresh_iv(label, <C as BlockSizeUser>::block_size())?;
    let mode = cbc::Encryptor::<C>::new_from_slices(key, &iv)
        .map_err(|_| bad_key(ENCRYPT, label, key.len()))?;
    let body = primitive::block_encrypt(mode, plaintext)
        .map_err(|e| ENCRYPT.wrap(e).with_detail(label))?;
    Ok(frame(&iv, &body))
}

pub(crate) fn cbc_decrypt<C>(label: &'static str, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let block_size = <C as BlockSizeUser>::block_size();
    if ciphertext.len() < 2 * block_size {
        return Err(too_short(label, ciphertext.len(), 2 * block_size));
    }
    let (iv, body) = ciphertext.split_at(block_size);
    let mode = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| bad_key(DECRYPT, label, key.len()))?;
    primitive::block_decrypt(mode, body).map_err(|e| DECRYPT.wrap(e).with_detail(label))
}

pub(crate) fn cfb_encrypt<C>(label: &'static str, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let iv = fresh_iv(label, <C as BlockSizeUser>::block_size())?;
    let mode = cfb_mode::Encryptor::<C>::new_from_slices(key, &iv)
        .map_err(|_| bad_key(ENCRYPT, label, key.len()))?;
    Ok(frame(&iv, &primitive::async_stream_encrypt(mode, plaintext)))
}

pub(crate) fn cfb_decrypt<C>(label: &'static str, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let block_size = <C as BlockSizeUser>::block_size();
    if ciphertext.len() < block_size {
        return Err(too_short(label, ciphertext.len(), block_size));
    }
    let (iv, body) = ciphertext.split_at(block_size);
    let mode = cfb_mode::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| bad_key(DECRYPT, label, key.len()))?;
    Ok(primitive::async_stream_decrypt(mode, body))
}

/// CTR and OFB: the mode type `S` carries both the cipher and its IV size.
pub(crate) fn stream_encrypt<S>(label: &'static str, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    S: StreamCipher + KeyIvInit,
{
    let iv = fresh_iv(label, <S as IvSizeUser>::iv_size())?;
    let mode = S::new_from_slices(key, &iv).map_err(|_| bad_key(ENCRYPT, label, key.len()))?;
    let body = primitive::stream_xor(mode, plaintext)
        .map_err(|e| ENCRYPT.wrap(e).with_detail(label))?;
    Ok(frame(&iv, &body))
}

pub(crate) fn stream_decrypt<S>(label: &'static str, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    S: StreamCipher + KeyIvInit,
{
    let iv_size = <S as IvSizeUser>::iv_size();
    if ciphertext.len() < iv_size {
        return Err(too_short(label, ciphertext.len(), iv_size));
    }
    let (iv, body) = ciphertext.split_at(iv_size);
    let mode = S::new_from_slices(key, iv).map_err(|_| bad_key(DECRYPT, label, key.len()))?;
    primitive::stream_xor(mode, body).map_err(|e| DECRYPT.wrap(e).with_detail(label))
}
