//! RC4 stream cipher with a random 24-byte prefix.
//!
//! Encryption draws 24 random bytes, prepends them to the plaintext and runs
//! the keystream over the whole buffer. Decryption runs the keystream and
//! drops the first 24 bytes, so the prefix only ever perturbs the keystream
//! position of the payload.

use {
    ::rc4::{KeyInit, Rc4, consts::U256},
    gantry_common::Kind,
    zeroize::Zeroizing,
};

use crate::{
    error::{DECRYPT, ENCRYPT, Error, Result},
    modes::{bad_key, too_short},
    primitive, random,
};

/// Length of the random prefix.
pub const IV_SIZE: usize = 24;

const MAX_KEY_LEN: usize = 256;
const LABEL: &str = "RC4";

/// Build an RC4 instance for a key of any length in `1..=256`.
///
/// The key schedule only reads `key[i % key.len()]`, so repeating the key to
/// 256 bytes yields the same state as scheduling the short key directly.
fn cipher(kind: Kind, key: &[u8]) -> Result<Rc4<U256>> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(bad_key(kind, LABEL, key.len()));
    }
    let expanded: Zeroizing<Vec<u8>> =
        Zeroizing::new(key.iter().copied().cycle().take(MAX_KEY_LEN).collect());
    Rc4::new_from_slice(&expanded).map_err(|_| bad_key(kind, LABEL, key.len()))
}

fn rc4_error(kind: Kind) -> impl FnOnce(Error) -> Error {
    move |e| kind.wrap(e).with_detail(LABEL)
}

pub fn encrypt_rc4(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let rc4 = cipher(ENCRYPT, key)?;
    let mut buf = Vec::with_capacity(IV_SIZE + plaintext.len());
    buf.extend_from_slice(
        &random::random_bytes(IV_SIZE).map_err(|e| ENCRYPT.wrap(e).with_detail(LABEL))?,
    );
    buf.extend_from_slice(plaintext);
    primitive::stream_xor(rc4, &buf).map_err(rc4_error(ENCRYPT))
}

pub fn decrypt_rc4(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < IV_SIZE {
        return Err(too_short(LABEL, ciphertext.len(), IV_SIZE));
    }
    let rc4 = cipher(DECRYPT, key)?;
    let mut opened = primitive::stream_xor(rc4, ciphertext).map_err(rc4_error(DECRYPT))?;
    opened.drain(..IV_SIZE);
    Ok(opened)
}
