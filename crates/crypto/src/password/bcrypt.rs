use {
    ::bcrypt::Version,
    gantry_config::BCryptConfig,
    tracing::debug,
};

use super::{PasswordCrypt, or_default};
use crate::{
    error::{HASH, HASH_VALID, NOT_MATCH, Result},
    random,
};

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;
pub const DEFAULT_COST: u32 = 10;

const SALT_LEN: usize = 16;

/// BCrypt with the `$2a$` prefix. Passwords longer than 72 bytes are
/// truncated by the algorithm.
#[derive(Debug, Clone)]
pub struct BCryptHasher {
    cost: u32,
}

impl BCryptHasher {
    pub fn new(config: &BCryptConfig) -> Result<Self> {
        let cost = or_default(config.cost, DEFAULT_COST);
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(HASH_VALID.with_detail(format!(
                "bcrypt cost must be in [{MIN_COST},{MAX_COST}], got {cost}"
            )));
        }
        debug!(cost, "bcrypt hasher ready");
        Ok(Self { cost })
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl PasswordCrypt for BCryptHasher {
    fn hash(&self, password: &[u8]) -> Result<Vec<u8>> {
        let mut salt = [0u8; SALT_LEN];
        random::fill(&mut salt).map_err(|e| HASH.wrap(e))?;
        let parts = ::bcrypt::hash_with_salt(password, self.cost, salt).map_err(|e| HASH.wrap(e))?;
        Ok(parts.format_for_version(Version::TwoA).into_bytes())
    }

    fn compare(&self, hashed: &[u8], password: &[u8]) -> Result<()> {
        let hashed = std::str::from_utf8(hashed).map_err(|_| NOT_MATCH.error())?;
        match ::bcrypt::verify(password, hashed) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(NOT_MATCH.error()),
        }
    }
}
