//! HTTP round tripping with composable tripperware, and a retry tripperware
//! that replays request bodies between attempts.

pub mod body;
pub mod error;
pub mod retry;
pub mod round_trip;
pub mod transport;
pub mod waiter;

pub use {
    body::{Body, ReplayableBody, Rewinder},
    error::{Canceled, RETRY_FAIL, RewindError, StatusError, is_canceled},
    retry::{RetryPolicy, retry_tripperware, tripperware},
    round_trip::{RoundTripFn, RoundTripper, Tripperware, chain},
    transport::HttpTransport,
    waiter::{Backoff, Waiter},
};
