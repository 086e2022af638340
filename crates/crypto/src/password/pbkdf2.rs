use {
    ::pbkdf2::pbkdf2_hmac,
    gantry_config::{HashAlg, Pbkdf2Config},
    sha1::Sha1,
    sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256},
    sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512},
    tracing::debug,
    zeroize::Zeroizing,
};

use super::{DEFAULT_KEY_LEN, DEFAULT_SALT_LEN, SaltedKdf, or_default, salted_password_crypt};
use crate::error::{HASH_VALID, Result};

pub const DEFAULT_ITER: u32 = 4096;

type Prf = fn(&[u8], &[u8], u32, &mut [u8]);

/// PBKDF2-HMAC producing `salt || key`.
#[derive(Debug, Clone)]
pub struct Pbkdf2Hasher {
    prf: Prf,
    hash_alg: HashAlg,
    iter: u32,
    salt_len: usize,
    key_len: usize,
}

/// HMAC PRF for `alg`. `Unspecified` means SHA-256; MD5 and the SHAKE
/// functions are not accepted.
fn prf_for(alg: HashAlg) -> Option<Prf> {
    let prf: Prf = match alg {
        HashAlg::Sha1 => pbkdf2_hmac::<Sha1>,
        HashAlg::Sha224 => pbkdf2_hmac::<Sha224>,
        HashAlg::Unspecified | HashAlg::Sha256 => pbkdf2_hmac::<Sha256>,
        HashAlg::Sha384 => pbkdf2_hmac::<Sha384>,
        HashAlg::Sha512 => pbkdf2_hmac::<Sha512>,
        HashAlg::Sha512_224 => pbkdf2_hmac::<Sha512_224>,
        HashAlg::Sha512_256 => pbkdf2_hmac::<Sha512_256>,
        HashAlg::Sha3_224 => pbkdf2_hmac::<Sha3_224>,
        HashAlg::Sha3_256 => pbkdf2_hmac::<Sha3_256>,
        HashAlg::Sha3_384 => pbkdf2_hmac::<Sha3_384>,
        HashAlg::Sha3_512 => pbkdf2_hmac::<Sha3_512>,
        HashAlg::Md5 | HashAlg::Shake128 | HashAlg::Shake256 => return None,
    };
    Some(prf)
}

impl Pbkdf2Hasher {
    pub fn new(config: &Pbkdf2Config) -> Result<Self> {
        let prf = prf_for(config.hash_alg).ok_or_else(|| {
            HASH_VALID.with_detail(format!(
                "pbkdf2 does not support hash algorithm {:?}",
                config.hash_alg
            ))
        })?;
        let hash_alg = match config.hash_alg {
            HashAlg::Unspecified => HashAlg::Sha256,
            alg => alg,
        };
        let iter = or_default(config.iter, DEFAULT_ITER);
        debug!(iter, hash_alg = ?hash_alg, "pbkdf2 hasher ready");
        Ok(Self {
            prf,
            hash_alg,
            iter,
            salt_len: or_default(config.salt_len, DEFAULT_SALT_LEN as u32) as usize,
            key_len: or_default(config.key_len, DEFAULT_KEY_LEN as u32) as usize,
        })
    }

    #[must_use]
    pub fn hash_alg(&self) -> HashAlg {
        self.hash_alg
    }
}

impl SaltedKdf for Pbkdf2Hasher {
    fn salt_len(&self) -> usize {
        self.salt_len
    }

    fn derive(&self, password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let mut key = Zeroizing::new(vec![0u8; self.key_len]);
        (self.prf)(password, salt, self.iter, &mut key);
        Ok(key)
    }
}

salted_password_crypt!(Pbkdf2Hasher);

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::NOT_MATCH,
            password::PasswordCrypt,
            random::{FixedEntropy, with_source},
        },
        rstest::rstest,
    };

    fn decode_hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    #[test]
    fn defaults() {
        let hasher = Pbkdf2Hasher::new(&Pbkdf2Config::default()).unwrap();
        assert_eq!(hasher.iter, DEFAULT_ITER);
        assert_eq!(hasher.salt_len, DEFAULT_SALT_LEN);
        assert_eq!(hasher.key_len, DEFAULT_KEY_LEN);
        assert_eq!(hasher.hash_alg(), HashAlg::Sha256);
    }

    #[test]
    fn rfc6070_sha1_vector() {
        let hasher = Pbkdf2Hasher::new(&Pbkdf2Config {
            salt_len: 4,
            iter: 2,
            key_len: 20,
            hash_alg: HashAlg::Sha1,
        })
        .unwrap();
        let hashed = with_source(FixedEntropy::new(*b"salt"), || hasher.hash(b"password")).unwrap();
        let mut expected = b"salt".to_vec();
        expected.extend(decode_hex("ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957"));
        assert_eq!(hashed, expected);
        hasher.compare(&hashed, b"password").unwrap();
    }

    #[rstest]
    #[case(HashAlg::Sha1)]
    #[case(HashAlg::Sha224)]
    #[case(HashAlg::Sha256)]
    #[case(HashAlg::Sha384)]
    #[case(HashAlg::Sha512)]
    #[case(HashAlg::Sha512_224)]
    #[case(HashAlg::Sha512_256)]
    #[case(HashAlg::Sha3_224)]
    #[case(HashAlg::Sha3_256)]
    #[case(HashAlg::Sha3_384)]
    #[case(HashAlg::Sha3_512)]
    fn supported_algorithms(#[case] hash_alg: HashAlg) {
        let hasher = Pbkdf2Hasher::new(&Pbkdf2Config {
            iter: 3,
            hash_alg,
            ..Default::default()
        })
        .unwrap();
        let hashed = hasher.hash(b"pw").unwrap();
        assert_eq!(hashed.len(), DEFAULT_SALT_LEN + DEFAULT_KEY_LEN);
        hasher.compare(&hashed, b"pw").unwrap();
        assert_eq!(hasher.compare(&hashed, b"px").unwrap_err(), NOT_MATCH);
    }

    #[rstest]
    #[case(HashAlg::Md5)]
    #[case(HashAlg::Shake128)]
    #[case(HashAlg::Shake256)]
    fn unsupported_algorithms(#[case] hash_alg: HashAlg) {
        let err = Pbkdf2Hasher::new(&Pbkdf2Config {
            hash_alg,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, HASH_VALID);
    }

    #[test]
    fn algorithms_are_not_interchangeable() {
        let config = |hash_alg| Pbkdf2Config {
            iter: 3,
            hash_alg,
            ..Default::default()
        };
        let sha256 = Pbkdf2Hasher::new(&config(HashAlg::Sha256)).unwrap();
        let sha3 = Pbkdf2Hasher::new(&config(HashAlg::Sha3_256)).unwrap();
        let hashed = sha256.hash(b"pw").unwrap();
        assert_eq!(sha3.compare(&hashed, b"pw").unwrap_err(), NOT_MATCH);
    }
}
