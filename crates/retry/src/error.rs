//! Error kinds and sentinels raised by the retry tripperware.

use {gantry_common::Kind, http::StatusCode};

pub use gantry_common::{BoxError, Error, Result};

const PACKAGE: &str = "gantry/retry";

pub const RETRY_FAIL: Kind = Kind::new(PACKAGE, "RetryFail", "failed after retries.");

/// Returned by a [`RoundTripper`](crate::RoundTripper) when the request's
/// cancellation token fired before a response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request canceled")]
pub struct Canceled;

/// A response whose status code is configured as retryable. Recorded as the
/// cause of the terminal error when the last attempt ended this way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("retryable status code {status}")]
pub struct StatusError {
    pub status: StatusCode,
}

#[derive(Debug, thiserror::Error)]
pub enum RewindError {
    #[error("request body was consumed and has no rewinder")]
    NoRewinder,
    #[error("failed to rewind request body: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether `err`, or anything in its source chain, is [`Canceled`].
pub fn is_canceled(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<Canceled>() {
            return true;
        }
        current = e.source();
    }
    false
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canceled_is_found_in_chain() {
        let direct: BoxError = Box::new(Canceled);
        assert!(is_canceled(&*direct));

        let wrapped = RETRY_FAIL.wrap(Canceled);
        assert!(is_canceled(&wrapped));

        let other = std::io::Error::other("connection reset");
        assert!(!is_canceled(&other));
    }
}
