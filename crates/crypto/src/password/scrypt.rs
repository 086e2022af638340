use {
    ::scrypt::Params,
    gantry_config::SCryptConfig,
    tracing::debug,
    zeroize::Zeroizing,
};

use super::{
    DEFAULT_KEY_LEN, DEFAULT_SALT_LEN, SaltedKdf, or_default, salted_hash, salted_password_crypt,
};
use crate::error::{HASH, HASH_VALID, Result};

pub const DEFAULT_N: u32 = 32768;
pub const DEFAULT_R: u32 = 8;
pub const DEFAULT_P: u32 = 1;

/// SCrypt producing `salt || key`.
#[derive(Debug, Clone)]
pub struct SCryptHasher {
    params: Params,
    n: u32,
    salt_len: usize,
    key_len: usize,
}

impl SCryptHasher {
    /// Build the hasher and run one probe hash so bad parameters fail here
    /// instead of on first use.
    pub fn new(config: &SCryptConfig) -> Result<Self> {
        let hasher = Self::resolve(config)?;
        salted_hash(&hasher, b"test").map_err(|e| HASH_VALID.wrap(e).with_detail("scrypt probe hash"))?;
        debug!(
            n = hasher.n,
            r = hasher.params.r(),
            p = hasher.params.p(),
            "scrypt hasher ready"
        );
        Ok(hasher)
    }

    fn resolve(config: &SCryptConfig) -> Result<Self> {
        let n = or_default(config.n, DEFAULT_N);
        if n < 2 || !n.is_power_of_two() {
            return Err(HASH_VALID.with_detail(format!(
                "scrypt N must be a power of two greater than 1, got {n}"
            )));
        }
        // Exact for powers of two, always below 32.
        let log_n = n.trailing_zeros() as u8;
        let r = or_default(config.r, DEFAULT_R);
        let p = or_default(config.p, DEFAULT_P);
        let params = Params::new(log_n, r, p, Params::RECOMMENDED_LEN)
            .map_err(|e| HASH_VALID.with_detail(format!("scrypt parameters: {e}")))?;
        Ok(Self {
            params,
            n,
            salt_len: or_default(config.salt_len, DEFAULT_SALT_LEN as u32) as usize,
            key_len: or_default(config.key_len, DEFAULT_KEY_LEN as u32) as usize,
        })
    }
}

impl SaltedKdf for SCryptHasher {
    fn salt_len(&self) -> usize {
        self.salt_len
    }

    fn derive(&self, password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let mut key = Zeroizing::new(vec![0u8; self.key_len]);
        ::scrypt::scrypt(password, salt, &self.params, &mut key)
            .map_err(|e| HASH.with_detail(format!("scrypt: {e}")))?;
        Ok(key)
    }
}

salted_password_crypt!(SCryptHasher);
