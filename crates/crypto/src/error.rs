//! Error kinds raised by the crypto toolkit.

use gantry_common::Kind;

pub use gantry_common::{Error, Result};

const PACKAGE: &str = "gantry/crypto";

pub const ENCRYPT: Kind = Kind::new(PACKAGE, "Encrypt", "failed to encrypt.");
pub const DECRYPT: Kind = Kind::new(PACKAGE, "Decrypt", "failed to decrypt.");
pub const PADDING: Kind = Kind::new(PACKAGE, "Padding", "failed to pad data.");
pub const UNPADDING: Kind = Kind::new(PACKAGE, "Unpadding", "failed to unpad data.");
pub const BLOCK: Kind = Kind::new(PACKAGE, "Block", "block cipher operation failed.");
pub const STREAM: Kind = Kind::new(PACKAGE, "Stream", "stream cipher operation failed.");
pub const HASH: Kind = Kind::new(PACKAGE, "Hash", "failed to hash password.");
pub const HASH_VALID: Kind = Kind::new(
    PACKAGE,
    "HashValid",
    "invalid password hasher parameters.",
);
pub const NOT_MATCH: Kind = Kind::new(
    PACKAGE,
    "NotMatch",
    "hashed password and password do not match.",
);
