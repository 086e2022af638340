//! Map a configured [`CommonKeyAlg`] to its encrypt and decrypt functions.

use gantry_config::CommonKeyAlg;

use crate::{aes, error::Result};

/// `(key, plaintext) -> IV || ciphertext`
pub type EncryptFn = fn(&[u8], &[u8]) -> Result<Vec<u8>>;

/// `(key, IV || ciphertext) -> plaintext`
pub type DecryptFn = fn(&[u8], &[u8]) -> Result<Vec<u8>>;

/// Encrypt function for `alg`, or `None` when the algorithm is not compiled
/// in. DES, Triple DES and RC4 require the `legacy` feature.
#[must_use]
pub fn encrypter_for(alg: CommonKeyAlg) -> Option<EncryptFn> {
    let f: EncryptFn = match alg {
        CommonKeyAlg::AesGcm => aes::encrypt_gcm,
        CommonKeyAlg::AesCbc => aes::encrypt_cbc,
        CommonKeyAlg::AesCfb => aes::encrypt_cfb,
        CommonKeyAlg::AesCtr => aes::encrypt_ctr,
        CommonKeyAlg::AesOfb => aes::encrypt_ofb,
        #[cfg(feature = "legacy")]
        legacy => return legacy_encrypter(legacy),
        #[cfg(not(feature = "legacy"))]
        _ => return None,
    };
    Some(f)
}

/// Decrypt counterpart of [`encrypter_for`].
#[must_use]
pub fn decrypter_for(alg: CommonKeyAlg) -> Option<DecryptFn> {
    let f: DecryptFn = match alg {
        CommonKeyAlg::AesGcm => aes::decrypt_gcm,
        CommonKeyAlg::AesCbc => aes::decrypt_cbc,
        CommonKeyAlg::AesCfb => aes::decrypt_cfb,
        CommonKeyAlg::AesCtr => aes::decrypt_ctr,
        CommonKeyAlg::AesOfb => aes::decrypt_ofb,
        #[cfg(feature = "legacy")]
        legacy => return legacy_decrypter(legacy),
        #[cfg(not(feature = "legacy"))]
        _ => return None,
    };
    Some(f)
}

#[cfg(feature = "legacy")]
fn legacy_encrypter(alg: CommonKeyAlg) -> Option<EncryptFn> {
    use crate::{des, rc4};

    let f: EncryptFn = match alg {
        CommonKeyAlg::DesCbc => des::encrypt_des_cbc,
        CommonKeyAlg::DesCfb => des::encrypt_des_cfb,
        CommonKeyAlg::DesCtr => des::encrypt_des_ctr,
        CommonKeyAlg::DesOfb => des::encrypt_des_ofb,
        CommonKeyAlg::TripleDesCbc => des::encrypt_3des_cbc,
        CommonKeyAlg::TripleDesCfb => des::encrypt_3des_cfb,
        CommonKeyAlg::TripleDesCtr => des::encrypt_3des_ctr,
        CommonKeyAlg::TripleDesOfb => des::encrypt_3des_ofb,
        CommonKeyAlg::Rc4 => rc4::encrypt_rc4,
        _ => return None,
    };
    Some(f)
}

#[cfg(feature = "legacy")]
fn legacy_decrypter(alg: CommonKeyAlg) -> Option<DecryptFn> {
    use crate::{des, rc4};

    let f: DecryptFn = match alg {
        CommonKeyAlg::DesCbc => des::decrypt_des_cbc,
        CommonKeyAlg::DesCfb => des::decrypt_des_cfb,
        CommonKeyAlg::DesCtr => des::decrypt_des_ctr,
        CommonKeyAlg::DesOfb => des::decrypt_des_ofb,
        CommonKeyAlg::TripleDesCbc => des::decrypt_3des_cbc,
        CommonKeyAlg::TripleDesCfb => des::decrypt_3des_cfb,
        CommonKeyAlg::TripleDesCtr => des::decrypt_3des_ctr,
        CommonKeyAlg::TripleDesOfb => des::decrypt_3des_ofb,
        CommonKeyAlg::Rc4 => rc4::decrypt_rc4,
        _ => return None,
    };
    Some(f)
}

/// Key length, in bytes, accepted by `alg`. AES and RC4 accept more than one
/// length; this returns the one used when generating a key.
#[must_use]
pub fn default_key_len(alg: CommonKeyAlg) -> usize {
    match alg {
        CommonKeyAlg::AesGcm
        | CommonKeyAlg::AesCbc
        | CommonKeyAlg::AesCfb
        | CommonKeyAlg::AesCtr
        | CommonKeyAlg::AesOfb
        | CommonKeyAlg::Rc4 => 32,
        CommonKeyAlg::DesCbc | CommonKeyAlg::DesCfb | CommonKeyAlg::DesCtr | CommonKeyAlg::DesOfb => {
            8
        },
        CommonKeyAlg::TripleDesCbc
        | CommonKeyAlg::TripleDesCfb
        | CommonKeyAlg::TripleDesCtr
        | CommonKeyAlg::TripleDesOfb => 24,
    }
}
