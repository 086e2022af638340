//! Configuration schema and loading for gantry.
//!
//! Config files: `gantry.toml`, `gantry.yaml`, or `gantry.json`
//! Searched in `./` then `~/.config/gantry/`.
//!
//! Supports `${ENV_VAR}` substitution in the raw file text.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{
        Argon2Config, BCryptConfig, BackoffKind, CommonKeyAlg, GantryConfig, HashAlg,
        PasswordCryptConfig, Pbkdf2Config, RetryConfig, SCryptConfig, WaiterConfig,
    },
};
