use {
    ::argon2::{Algorithm, Argon2, Params, Version},
    gantry_config::Argon2Config,
    tracing::debug,
    zeroize::Zeroizing,
};

use super::{DEFAULT_KEY_LEN, DEFAULT_SALT_LEN, SaltedKdf, or_default, salted_password_crypt};
use crate::error::{HASH, HASH_VALID, Result};

/// Shortest salt Argon2 accepts.
pub const MIN_SALT_LEN: usize = 8;

pub const ARGON2I_DEFAULT_TIME: u32 = 3;
pub const ARGON2I_DEFAULT_MEMORY: u32 = 32 * 1024; // 32 MiB
pub const ARGON2ID_DEFAULT_TIME: u32 = 1;
pub const ARGON2ID_DEFAULT_MEMORY: u32 = 64 * 1024; // 64 MiB
pub const DEFAULT_THREADS: u32 = 4;

/// Argon2i or Argon2id (version 0x13) producing `salt || key`.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    algorithm: Algorithm,
    params: Params,
    salt_len: usize,
}

impl Argon2Hasher {
    pub fn argon2i(config: &Argon2Config) -> Result<Self> {
        Self::new(
            Algorithm::Argon2i,
            config,
            ARGON2I_DEFAULT_TIME,
            ARGON2I_DEFAULT_MEMORY,
        )
    }

    pub fn argon2id(config: &Argon2Config) -> Result<Self> {
        Self::new(
            Algorithm::Argon2id,
            config,
            ARGON2ID_DEFAULT_TIME,
            ARGON2ID_DEFAULT_MEMORY,
        )
    }

    fn new(
        algorithm: Algorithm,
        config: &Argon2Config,
        default_time: u32,
        default_memory: u32,
    ) -> Result<Self> {
        let salt_len = or_default(config.salt_len, DEFAULT_SALT_LEN as u32) as usize;
        if salt_len < MIN_SALT_LEN {
            return Err(HASH_VALID.with_detail(format!(
                "argon2 salt must be at least {MIN_SALT_LEN} bytes, got {salt_len}"
            )));
        }
        let params = Params::new(
            or_default(config.memory, default_memory),
            or_default(config.time, default_time),
            or_default(config.threads, DEFAULT_THREADS),
            Some(or_default(config.key_len, DEFAULT_KEY_LEN as u32) as usize),
        )
        .map_err(|e| HASH_VALID.with_detail(format!("argon2 parameters: {e}")))?;
        debug!(
            algorithm = %algorithm,
            m_cost = params.m_cost(),
            t_cost = params.t_cost(),
            p_cost = params.p_cost(),
            "argon2 hasher ready"
        );
        Ok(Self {
            algorithm,
            params,
            salt_len,
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl SaltedKdf for Argon2Hasher {
    fn salt_len(&self) -> usize {
        self.salt_len
    }

    fn derive(&self, password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let argon2 = Argon2::new(self.algorithm, Version::V0x13, self.params.clone());
        let mut key = Zeroizing::new(vec![0u8; self.params.output_len().unwrap_or(DEFAULT_KEY_LEN)]);
        argon2
            .hash_password_into(password, salt, &mut key)
            .map_err(|e| HASH.with_detail(format!("argon2: {e}")))?;
        Ok(key)
    }
}

salted_password_crypt!(Argon2Hasher);
