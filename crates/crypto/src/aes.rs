//! AES in GCM, CBC, CFB, CTR and OFB modes.
//!
//! Keys are 16, 24 or 32 bytes and select AES-128, AES-192 or AES-256.
//!
//! Ciphertext layout:
//! - GCM: `[nonce: 12 bytes][ciphertext + tag: N + 16 bytes]`
//! - CBC: `[iv: 16 bytes][PKCS#7 padded ciphertext]`
//! - CFB, CTR, OFB: `[iv: 16 bytes][ciphertext: N bytes]`

use aes_gcm::{
    Aes128Gcm, Aes256Gcm, AesGcm,
    aead::{Aead, AeadCore, KeyInit, Nonce, consts::U12},
};

use crate::{
    error::{DECRYPT, ENCRYPT, Result},
    modes::{self, bad_key, too_short},
    random,
};

/// AES block size, also the IV length of the non-AEAD modes.
pub const BLOCK_SIZE: usize = 16;

/// GCM nonce length.
pub const NONCE_SIZE: usize = 12;

type Aes192Gcm = AesGcm<::aes::Aes192, U12>;

/// Pick the AES variant from the key length and evaluate `$call` with the
/// cipher type bound to `$cipher`.
macro_rules! by_key_len {
    ($key:expr, $kind:expr, $label:expr, $cipher:ident => $call:expr) => {
        match $key.len() {
            16 => {
                type $cipher = ::aes::Aes128;
                $call
            },
            24 => {
                type $cipher = ::aes::Aes192;
                $call
            },
            32 => {
                type $cipher = ::aes::Aes256;
                $call
            },
            n => Err(bad_key($kind, $label, n)),
        }
    };
}

const GCM: &str = "AES-GCM";
const CBC: &str = "AES-CBC";
const CFB: &str = "AES-CFB";
const CTR: &str = "AES-CTR";
const OFB: &str = "AES-OFB";

pub fn encrypt_gcm(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    match key.len() {
        16 => seal::<Aes128Gcm>(key, plaintext),
        24 => seal::<Aes192Gcm>(key, plaintext),
        32 => seal::<Aes256Gcm>(key, plaintext),
        n => Err(bad_key(ENCRYPT, GCM, n)),
    }
}

pub fn decrypt_gcm(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < NONCE_SIZE {
        return Err(too_short(GCM, ciphertext.len(), NONCE_SIZE));
    }
    match key.len() {
        16 => open::<Aes128Gcm>(key, ciphertext),
        24 => open::<Aes192Gcm>(key, ciphertext),
        32 => open::<Aes256Gcm>(key, ciphertext),
        n => Err(bad_key(DECRYPT, GCM, n)),
    }
}

#[allow(deprecated)]
fn seal<A>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    A: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher = A::new_from_slice(key).map_err(|_| bad_key(ENCRYPT, GCM, key.len()))?;

    // A block's worth of randomness, truncated to the nonce size.
    let mut nonce = random::random_bytes(BLOCK_SIZE).map_err(|e| ENCRYPT.wrap(e).with_detail(GCM))?;
    nonce.truncate(NONCE_SIZE);

    let sealed = cipher
        .encrypt(Nonce::<A>::from_slice(&nonce), plaintext)
        .map_err(|e| ENCRYPT.with_detail(format!("{GCM}: {e}")))?;

    let mut out = nonce;
    out.extend_from_slice(&sealed);
    Ok(out)
}

#[allow(deprecated)]
fn open<A>(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    A: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher = A::new_from_slice(key).map_err(|_| bad_key(DECRYPT, GCM, key.len()))?;
    let (nonce, body) = ciphertext.split_at(NONCE_SIZE);
    cipher
        .decrypt(Nonce::<A>::from_slice(nonce), body)
        .map_err(|e| DECRYPT.with_detail(format!("{GCM}: {e}")))
}

pub fn encrypt_cbc(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, ENCRYPT, CBC, C => modes::cbc_encrypt::<C>(CBC, key, plaintext))
}

pub fn decrypt_cbc(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, DECRYPT, CBC, C => modes::cbc_decrypt::<C>(CBC, key, ciphertext))
}

pub fn encrypt_cfb(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, ENCRYPT, CFB, C => modes::cfb_encrypt::<C>(CFB, key, plaintext))
}

pub fn decrypt_cfb(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, DECRYPT, CFB, C => modes::cfb_decrypt::<C>(CFB, key, ciphertext))
}

pub fn encrypt_ctr(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, ENCRYPT, CTR, C => modes::stream_encrypt::<ctr::Ctr128BE<C>>(CTR, key, plaintext))
}

pub fn decrypt_ctr(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, DECRYPT, CTR, C => modes::stream_decrypt::<ctr::Ctr128BE<C>>(CTR, key, ciphertext))
}

pub fn encrypt_ofb(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, ENCRYPT, OFB, C => modes::stream_encrypt::<ofb::Ofb<C>>(OFB, key, plaintext))
}

pub fn decrypt_ofb(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    by_key_len!(key, DECRYPT, OFB, C => modes::stream_decrypt::<ofb::Ofb<C>>(OFB, key, ciphertext))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::random::{FixedEntropy, with_source},
    };

    type CryptFn = fn(&[u8], &[u8]) -> Result<Vec<u8>>;

    const KEY: &[u8] = b"1234567890123456";
    const PLAINTEXT: &[u8] = b"plaintext message";
    const FIXED: &[u8] = b"fixed value will be returned for reproducibility";

    const MODES: [(&str, CryptFn, CryptFn); 5] = [
        ("gcm", encrypt_gcm, decrypt_gcm),
        ("cbc", encrypt_cbc, decrypt_cbc),
        ("cfb", encrypt_cfb, decrypt_cfb),
        ("ctr", encrypt_ctr, decrypt_ctr),
        ("ofb", encrypt_ofb, decrypt_ofb),
    ];

    fn decode_hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn fixed<T>(f: impl FnOnce() -> T) -> T {
        with_source(FixedEntropy::new(FIXED), f)
    }

    #[test]
    fn gcm_known_answer() {
        let sealed = fixed(|| encrypt_gcm(KEY, PLAINTEXT)).unwrap();
        assert_eq!(
            sealed,
            decode_hex(
                "66697865642076616c756520ad6e5f0773705d3964ddc5173946355bc680d98834bef3351f2b4eb25d36fae4f2"
            )
        );
        assert_eq!(decrypt_gcm(KEY, &sealed).unwrap(), PLAINTEXT);
    }

    #[test]
    fn cbc_known_answer() {
        let sealed = fixed(|| encrypt_cbc(KEY, PLAINTEXT)).unwrap();
        assert_eq!(
            sealed,
            decode_hex(
                "66697865642076616c75652077696c6c152fece4213897d9a86bca729e6f6be4cce941d02efc6e0efa677c6ec2ba4b6a"
            )
        );
        assert_eq!(decrypt_cbc(KEY, &sealed).unwrap(), PLAINTEXT);
    }

    #[test]
    fn stream_modes_known_answer() {
        let cases: [(CryptFn, &str); 3] = [
            (
                encrypt_cfb,
                "66697865642076616c75652077696c6c4c6e78d7a206d2db4dde7b34618dfae869",
            ),
            (
                encrypt_ctr,
                "66697865642076616c75652077696c6c4c6e78d7a206d2db4dde7b34618dfae85e",
            ),
            (
                encrypt_ofb,
                "66697865642076616c75652077696c6c4c6e78d7a206d2db4dde7b34618dfae87e",
            ),
        ];
        for (encrypt, expected) in cases {
            let sealed = fixed(|| encrypt(KEY, PLAINTEXT)).unwrap();
            assert_eq!(sealed, decode_hex(expected));
        }
    }

    #[test]
    fn ciphertext_starts_with_iv() {
        for (name, encrypt, _) in MODES {
            let sealed = fixed(|| encrypt(KEY, PLAINTEXT)).unwrap();
            let iv_len = if name == "gcm" { NONCE_SIZE } else { BLOCK_SIZE };
            assert_eq!(&sealed[..iv_len], &FIXED[..iv_len], "{name}");
        }
    }

    #[test]
    fn round_trip_all_key_sizes() {
        let keys: [&[u8]; 3] = [&[7u8; 16], &[7u8; 24], &[7u8; 32]];
        let inputs: [&[u8]; 4] = [b"", b"x", b"sixteen bytes!!!", &[0xAB; 1000]];
        for (name, encrypt, decrypt) in MODES {
            for key in keys {
                for input in inputs {
                    let sealed = encrypt(key, input).unwrap();
                    let opened = decrypt(key, &sealed).unwrap();
                    assert_eq!(opened, input, "{name} key={}", key.len());
                }
            }
        }
    }

    #[test]
    fn fresh_iv_per_call() {
        for (name, encrypt, _) in MODES {
            let a = encrypt(KEY, PLAINTEXT).unwrap();
            let b = encrypt(KEY, PLAINTEXT).unwrap();
            assert_ne!(a, b, "{name}");
        }
    }

    #[test]
    fn invalid_key_length() {
        for (name, encrypt, decrypt) in MODES {
            assert_eq!(encrypt(b"short", PLAINTEXT).unwrap_err(), ENCRYPT, "{name}");
            assert_eq!(decrypt(b"short", &[0u8; 64]).unwrap_err(), DECRYPT, "{name}");
        }
    }

    #[test]
    fn short_ciphertext_is_rejected() {
        assert_eq!(decrypt_gcm(KEY, &[0u8; 11]).unwrap_err(), DECRYPT);
        assert_eq!(decrypt_cbc(KEY, &[0u8; 31]).unwrap_err(), DECRYPT);
        for decrypt in [decrypt_cfb, decrypt_ctr, decrypt_ofb] {
            assert_eq!(decrypt(KEY, &[0u8; 15]).unwrap_err(), DECRYPT);
            assert_eq!(decrypt(KEY, &[]).unwrap_err(), DECRYPT);
        }
    }

    #[test]
    fn truncated_ciphertexts_never_panic() {
        for (name, encrypt, decrypt) in MODES {
            let sealed = encrypt(KEY, PLAINTEXT).unwrap();
            for len in 0..sealed.len() {
                // Errors are fine, panics are not.
                let _ = decrypt(KEY, &sealed[..len]);
            }
            assert!(decrypt(KEY, &sealed).is_ok(), "{name}");
        }
    }

    #[test]
    fn gcm_wrong_key_fails() {
        let sealed = encrypt_gcm(KEY, PLAINTEXT).unwrap();
        let err = decrypt_gcm(b"6543210987654321", &sealed).unwrap_err();
        assert_eq!(err, DECRYPT);
    }

    #[test]
    fn gcm_tampered_fails() {
        let mut sealed = encrypt_gcm(KEY, PLAINTEXT).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert_eq!(decrypt_gcm(KEY, &sealed).unwrap_err(), DECRYPT);
    }

    #[test]
    fn non_aead_wrong_key_is_garbage() {
        let wrong = b"6543210987654321";
        let streams: [(CryptFn, CryptFn); 3] = [
            (encrypt_cfb, decrypt_cfb),
            (encrypt_ctr, decrypt_ctr),
            (encrypt_ofb, decrypt_ofb),
        ];
        for (encrypt, decrypt) in streams {
            let sealed = encrypt(KEY, PLAINTEXT).unwrap();
            let opened = decrypt(wrong, &sealed).unwrap();
            assert_eq!(opened.len(), PLAINTEXT.len());
            assert_ne!(opened, PLAINTEXT);
        }
        // CBC either fails on padding or returns noise.
        let sealed = encrypt_cbc(KEY, PLAINTEXT).unwrap();
        match decrypt_cbc(wrong, &sealed) {
            Ok(opened) => assert_ne!(opened, PLAINTEXT),
            Err(err) => assert_eq!(err, DECRYPT),
        }
    }
}
