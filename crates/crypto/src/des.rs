//! DES and Triple DES (EDE3) in CBC, CFB, CTR and OFB modes.
//!
//! Both are legacy ciphers kept for interoperating with existing data. DES
//! takes an 8-byte key and Triple DES a 24-byte key. Every ciphertext starts
//! with an 8-byte IV; CBC bodies are PKCS#7 padded, the other modes keep the
//! plaintext length.

use ::des::{Des, TdesEde3};

use crate::{error::Result, modes};

/// DES block size, also the IV length.
pub const BLOCK_SIZE: usize = 8;

pub fn encrypt_des_cbc(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::cbc_encrypt::<Des>("DES-CBC", key, plaintext)
}

pub fn decrypt_des_cbc(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::cbc_decrypt::<Des>("DES-CBC", key, ciphertext)
}

pub fn encrypt_des_cfb(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::cfb_encrypt::<Des>("DES-CFB", key, plaintext)
}

pub fn decrypt_des_cfb(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::cfb_decrypt::<Des>("DES-CFB", key, ciphertext)
}

pub fn encrypt_des_ctr(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_encrypt::<ctr::Ctr64BE<Des>>("DES-CTR", key, plaintext)
}

pub fn decrypt_des_ctr(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_decrypt::<ctr::Ctr64BE<Des>>("DES-CTR", key, ciphertext)
}

pub fn encrypt_des_ofb(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_encrypt::<ofb::Ofb<Des>>("DES-OFB", key, plaintext)
}

pub fn decrypt_des_ofb(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_decrypt::<ofb::Ofb<Des>>("DES-OFB", key, ciphertext)
}

pub fn encrypt_3des_cbc(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::cbc_encrypt::<TdesEde3>("3DES-CBC", key, plaintext)
}

pub fn decrypt_3des_cbc(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::cbc_decrypt::<TdesEde3>("3DES-CBC", key, ciphertext)
}

pub fn encrypt_3des_cfb(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::cfb_encrypt::<TdesEde3>("3DES-CFB", key, plaintext)
}

pub fn decrypt_3des_cfb(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::cfb_decrypt::<TdesEde3>("3DES-CFB", key, ciphertext)
}

pub fn encrypt_3des_ctr(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_encrypt::<ctr::Ctr64BE<TdesEde3>>("3DES-CTR", key, plaintext)
}

pub fn decrypt_3des_ctr(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_decrypt::<ctr::Ctr64BE<TdesEde3>>("3DES-CTR", key, ciphertext)
}

pub fn encrypt_3des_ofb(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_encrypt::<ofb::Ofb<TdesEde3>>("3DES-OFB", key, plaintext)
}

pub fn decrypt_3des_ofb(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    modes::stream_decrypt::<ofb::Ofb<TdesEde3>>("3DES-OFB", key, ciphertext)
}
