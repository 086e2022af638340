//! Config schema types (retry tripperware, password hashing, common-key encryption).
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GantryConfig {
    /// Retry tripperware for outbound requests. Absent means no retrying.
    pub retry: Option<RetryConfig>,
    /// Password hasher. Absent means no hashing is configured.
    pub password: Option<PasswordCryptConfig>,
    /// Common-key algorithm used for payload encryption.
    pub encryption: Option<CommonKeyAlg>,
}

/// Retry tripperware configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt. `0` installs no tripperware.
    pub max_retry: u32,
    /// Largest request body, in bytes, that is buffered for replay.
    /// Requests with a larger or unknown length are sent once.
    pub max_content_length: u64,
    /// Response status codes that trigger a retry.
    pub retry_status_codes: Vec<u16>,
    /// Delay between attempts.
    pub waiter: WaiterConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retry: 1,
            max_content_length: 1 << 20, // 1 MiB
            retry_status_codes: Vec::new(),
            waiter: WaiterConfig::default(),
        }
    }
}

/// Backoff waiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaiterConfig {
    pub kind: BackoffKind,
    /// Base delay in milliseconds.
    pub base_ms: u64,
    /// Lower bound applied to every computed delay, in milliseconds.
    pub min_ms: u64,
    /// Upper bound applied to every computed delay, in milliseconds. `0` means unbounded.
    pub max_ms: u64,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            kind: BackoffKind::ExponentialFullJitter,
            base_ms: 100,
            min_ms: 0,
            max_ms: 10_000,
        }
    }
}

/// How the delay grows with the attempt number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// `base`
    Fixed,
    /// `base * attempt`
    Linear,
    /// `base * attempt^2`
    Polynomial,
    /// `base * 2^(attempt-1)`
    Exponential,
    /// uniform in `[0, base * 2^(attempt-1)]`
    #[default]
    ExponentialFullJitter,
    /// half of the exponential delay plus uniform jitter over the other half
    ExponentialEqualJitter,
}

/// Password hasher selection. Zero-valued parameters fall back to the
/// hasher's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PasswordCryptConfig {
    BCrypt(BCryptConfig),
    SCrypt(SCryptConfig),
    Pbkdf2(Pbkdf2Config),
    Argon2i(Argon2Config),
    Argon2id(Argon2Config),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BCryptConfig {
    pub cost: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SCryptConfig {
    pub salt_len: u32,
    /// CPU/memory cost. Must be a power of two greater than one.
    pub n: u32,
    pub r: u32,
    pub p: u32,
    pub key_len: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pbkdf2Config {
    pub salt_len: u32,
    pub iter: u32,
    pub key_len: u32,
    pub hash_alg: HashAlg,
}

/// Shared by Argon2i and Argon2id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
    pub salt_len: u32,
    /// Number of passes.
    pub time: u32,
    /// Memory in KiB.
    pub memory: u32,
    pub threads: u32,
    pub key_len: u32,
}

/// Hash algorithms that can be named in configuration.
///
/// Not every consumer accepts every algorithm; PBKDF2 for instance rejects
/// the extendable-output and broken ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlg {
    #[default]
    Unspecified,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Shake128,
    Shake256,
}

/// Common-key (symmetric) algorithm and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommonKeyAlg {
    AesGcm,
    AesCbc,
    AesCfb,
    AesCtr,
    AesOfb,
    DesCbc,
    DesCfb,
    DesCtr,
    DesOfb,
    TripleDesCbc,
    TripleDesCfb,
    TripleDesCtr,
    TripleDesOfb,
    Rc4,
}

impl CommonKeyAlg {
    pub const ALL: &'static [CommonKeyAlg] = &[
        Self::AesGcm,
        Self::AesCbc,
        Self::AesCfb,
        Self::AesCtr,
        Self::AesOfb,
        Self::DesCbc,
        Self::DesCfb,
        Self::DesCtr,
        Self::DesOfb,
        Self::TripleDesCbc,
        Self::TripleDesCfb,
        Self::TripleDesCtr,
        Self::TripleDesOfb,
        Self::Rc4,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AesGcm => "aes_gcm",
            Self::AesCbc => "aes_cbc",
            Self::AesCfb => "aes_cfb",
            Self::AesCtr => "aes_ctr",
            Self::AesOfb => "aes_ofb",
            Self::DesCbc => "des_cbc",
            Self::DesCfb => "des_cfb",
            Self::DesCtr => "des_ctr",
            Self::DesOfb => "des_ofb",
            Self::TripleDesCbc => "triple_des_cbc",
            Self::TripleDesCfb => "triple_des_cfb",
            Self::TripleDesCtr => "triple_des_ctr",
            Self::TripleDesOfb => "triple_des_ofb",
            Self::Rc4 => "rc4",
        }
    }
}

impl fmt::Display for CommonKeyAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown common-key algorithm: {0}")]
pub struct UnknownAlg(String);

impl FromStr for CommonKeyAlg {
    type Err = UnknownAlg;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.as_str() == normalized)
            .ok_or_else(|| UnknownAlg(s.to_string()))
    }
}
