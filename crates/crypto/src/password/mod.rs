//! Password hashing: BCrypt, SCrypt, PBKDF2, Argon2i and Argon2id.
//!
//! Every hasher except BCrypt produces `salt || derived_key` with a salt
//! length fixed when the hasher is built. BCrypt produces its own
//! `$2a$<cost>$...` string, returned as bytes.

mod argon2;
mod bcrypt;
mod pbkdf2;
mod scrypt;

use {
    base64::{Engine, engine::general_purpose::STANDARD},
    gantry_config::PasswordCryptConfig,
    tracing::debug,
    zeroize::Zeroizing,
};

pub use self::{
    argon2::Argon2Hasher,
    bcrypt::{BCryptHasher, DEFAULT_COST, MAX_COST, MIN_COST},
    pbkdf2::Pbkdf2Hasher,
    scrypt::SCryptHasher,
};
use crate::{
    error::{HASH, NOT_MATCH, Result},
    random,
};

/// Salt length used by every salted hasher when the config leaves it at zero.
pub const DEFAULT_SALT_LEN: usize = 32;

/// Derived key length used when the config leaves it at zero.
pub const DEFAULT_KEY_LEN: usize = 32;

/// Hash a password and check a password against a stored hash.
pub trait PasswordCrypt: Send + Sync {
    fn hash(&self, password: &[u8]) -> Result<Vec<u8>>;

    /// `Ok(())` when `password` produced `hashed`, [`NOT_MATCH`] otherwise.
    /// Malformed or truncated hashes are also reported as [`NOT_MATCH`].
    fn compare(&self, hashed: &[u8], password: &[u8]) -> Result<()>;

    /// [`hash`](Self::hash) encoded as standard base64.
    fn hash_b64(&self, password: &[u8]) -> Result<String> {
        Ok(STANDARD.encode(self.hash(password)?))
    }

    fn compare_b64(&self, hashed: &str, password: &[u8]) -> Result<()> {
        let raw = STANDARD
            .decode(hashed.trim())
            .map_err(|_| NOT_MATCH.with_detail("stored hash is not valid base64"))?;
        self.compare(&raw, password)
    }
}

/// Build the hasher selected by `config`.
///
/// `None` means no hashing is configured and yields `Ok(None)`.
pub fn new_password_crypt(
    config: Option<&PasswordCryptConfig>,
) -> Result<Option<Box<dyn PasswordCrypt>>> {
    let Some(config) = config else {
        return Ok(None);
    };
    let hasher: Box<dyn PasswordCrypt> = match config {
        PasswordCryptConfig::BCrypt(c) => Box::new(BCryptHasher::new(c)?),
        PasswordCryptConfig::SCrypt(c) => Box::new(SCryptHasher::new(c)?),
        PasswordCryptConfig::Pbkdf2(c) => Box::new(Pbkdf2Hasher::new(c)?),
        PasswordCryptConfig::Argon2i(c) => Box::new(Argon2Hasher::argon2i(c)?),
        PasswordCryptConfig::Argon2id(c) => Box::new(Argon2Hasher::argon2id(c)?),
    };
    debug!(kind = config_name(config), "password hasher configured");
    Ok(Some(hasher))
}

fn config_name(config: &PasswordCryptConfig) -> &'static str {
    match config {
        PasswordCryptConfig::BCrypt(_) => "bcrypt",
        PasswordCryptConfig::SCrypt(_) => "scrypt",
        PasswordCryptConfig::Pbkdf2(_) => "pbkdf2",
        PasswordCryptConfig::Argon2i(_) => "argon2i",
        PasswordCryptConfig::Argon2id(_) => "argon2id",
    }
}

/// `value`, or `default` when the config left it at zero.
fn or_default(value: u32, default: u32) -> u32 {
    if value == 0 { default } else { value }
}

/// Key derivation behind the `salt || key` framing.
trait SaltedKdf {
    fn salt_len(&self) -> usize;

    fn derive(&self, password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

fn salted_hash(kdf: &impl SaltedKdf, password: &[u8]) -> Result<Vec<u8>> {
    let mut out = random::random_bytes(kdf.salt_len()).map_err(|e| HASH.wrap(e))?;
    let key = kdf.derive(password, &out)?;
    out.extend_from_slice(&key);
    Ok(out)
}

fn salted_compare(kdf: &impl SaltedKdf, hashed: &[u8], password: &[u8]) -> Result<()> {
    if hashed.len() < kdf.salt_len() {
        return Err(NOT_MATCH.error());
    }
    let (salt, _) = hashed.split_at(kdf.salt_len());
    let key = kdf.derive(password, salt).map_err(|_| NOT_MATCH.error())?;
    let mut expected = Zeroizing::new(Vec::with_capacity(salt.len() + key.len()));
    expected.extend_from_slice(salt);
    expected.extend_from_slice(&key);
    if constant_time_eq(&expected, hashed) {
        Ok(())
    } else {
        Err(NOT_MATCH.error())
    }
}

/// Implements [`PasswordCrypt`] through [`salted_hash`] and [`salted_compare`].
macro_rules! salted_password_crypt {
    ($ty:ty) => {
        impl $crate::password::PasswordCrypt for $ty {
            fn hash(&self, password: &[u8]) -> $crate::error::Result<Vec<u8>> {
                $crate::password::salted_hash(self, password)
            }

            fn compare(&self, hashed: &[u8], password: &[u8]) -> $crate::error::Result<()> {
                $crate::password::salted_compare(self, hashed, password)
            }
        }
    };
}
pub(crate) use salted_password_crypt;

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}
