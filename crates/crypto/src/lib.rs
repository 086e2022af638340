//! Common-key cryptography toolkit.
//!
//! Symmetric ciphers (AES, and behind the `legacy` feature DES, Triple DES
//! and RC4) with the IV or nonce framed in front of the ciphertext, block
//! padding schemes, and salted password hashers. All randomness comes from
//! [`random`], which tests can pin to a fixed source.

pub mod aes;
#[cfg(feature = "legacy")]
pub mod des;
pub mod error;
mod modes;
pub mod padding;
pub mod password;
pub mod primitive;
pub mod random;
#[cfg(feature = "legacy")]
pub mod rc4;
pub mod selector;

pub use {
    error::{Error, Result},
    padding::Padding,
    password::{PasswordCrypt, new_password_crypt},
    selector::{DecryptFn, EncryptFn, decrypter_for, encrypter_for},
};
