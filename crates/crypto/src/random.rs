//! Cryptographically secure random source for IVs, nonces, salts and padding.
//!
//! All randomness drawn by this crate goes through [`fill`]. By default it
//! reads the operating system CSPRNG. [`with_source`] swaps in another
//! [`Entropy`] for the current thread while a closure runs, which is how
//! tests pin IVs to known values.

use std::{cell::RefCell, sync::Arc};

use rand::{TryRngCore, rngs::OsRng};

#[derive(Debug, thiserror::Error)]
pub enum EntropyError {
    #[error("operating system random source failed: {0}")]
    Os(String),
    #[error("random source exhausted: {requested} bytes requested, {available} available")]
    Exhausted { requested: usize, available: usize },
    #[error("{0}")]
    Other(String),
}

/// A source of random bytes.
pub trait Entropy: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let mut rng = OsRng;
        rng.try_fill_bytes(dest)
            .map_err(|e| EntropyError::Os(e.to_string()))
    }
}

/// Deterministic source that always yields the leading bytes of a fixed
/// buffer. Requests longer than the buffer fail.
#[derive(Debug, Clone)]
pub struct FixedEntropy(Vec<u8>);

impl FixedEntropy {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl Entropy for FixedEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let src = self.0.get(..dest.len()).ok_or(EntropyError::Exhausted {
            requested: dest.len(),
            available: self.0.len(),
        })?;
        dest.copy_from_slice(src);
        Ok(())
    }
}

thread_local! {
    static OVERRIDE: RefCell<Option<Arc<dyn Entropy>>> = const { RefCell::new(None) };
}

/// Fill `dest` from the active random source.
pub fn fill(dest: &mut [u8]) -> Result<(), EntropyError> {
    let source = OVERRIDE.with(|o| o.borrow().clone());
    match source {
        Some(source) => source.fill(dest),
        None => OsEntropy.fill(dest),
    }
}

/// `len` bytes from the active random source.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, EntropyError> {
    let mut buf = vec![0u8; len];
    fill(&mut buf)?;
    Ok(buf)
}

/// Run `f` with `source` as the random source of the current thread.
///
/// The previous source is restored when `f` returns or unwinds. Other
/// threads are unaffected.
pub fn with_source<T>(source: impl Entropy + 'static, f: impl FnOnce() -> T) -> T {
    struct Restore(Option<Arc<dyn Entropy>>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            OVERRIDE.with(|o| *o.borrow_mut() = previous);
        }
    }

    let source: Arc<dyn Entropy> = Arc::new(source);
    let _restore = Restore(OVERRIDE.with(|o| o.borrow_mut().replace(source)));
    f()
}
