//! Retry tripperware: bounded, body-preserving retries around an inner
//! round tripper.
//!
//! Retries are request level. The method and headers are not inspected;
//! enabling the tripperware asserts the requests it sees may be repeated.

use std::{fmt, sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    gantry_config::RetryConfig,
    http::{Request, Response, StatusCode, request::Parts},
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use crate::{
    body::{Body, ReplayableBody},
    error::{BoxError, Error, RETRY_FAIL, RewindError, StatusError, is_canceled},
    round_trip::{RoundTripper, Tripperware},
    waiter::{Backoff, Waiter},
};

/// What to retry and how long to wait in between.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retry: u32,
    max_content_length: u64,
    retry_status: Vec<u16>,
    waiter: Arc<dyn Waiter>,
}

impl RetryPolicy {
    /// `max_retry` retries after the first attempt, bodies up to 1 MiB, no
    /// retryable status codes and no delay.
    #[must_use]
    pub fn new(max_retry: u32) -> Self {
        Self {
            max_retry,
            max_content_length: RetryConfig::default().max_content_length,
            retry_status: Vec::new(),
            waiter: Arc::new(Backoff::fixed(Duration::ZERO)),
        }
    }

    #[must_use]
    pub fn max_content_length(mut self, len: u64) -> Self {
        self.max_content_length = len;
        self
    }

    /// Response status codes that trigger another attempt. Order and
    /// duplicates do not matter.
    #[must_use]
    pub fn retry_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        let mut codes: Vec<u16> = codes.into_iter().collect();
        codes.sort_unstable();
        codes.dedup();
        self.retry_status = codes;
        self
    }

    #[must_use]
    pub fn waiter(mut self, waiter: impl Waiter + 'static) -> Self {
        self.waiter = Arc::new(waiter);
        self
    }

    #[must_use]
    pub fn is_retry_status(&self, status: StatusCode) -> bool {
        self.retry_status.binary_search(&status.as_u16()).is_ok()
    }

    /// The declared body length, if it can be buffered for replay. Requests
    /// whose length is unknown or over the limit are sent once.
    fn replayable_length(&self, content_length: Option<u64>) -> Option<u64> {
        content_length.filter(|&len| len <= self.max_content_length)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retry", &self.max_retry)
            .field("max_content_length", &self.max_content_length)
            .field("retry_status", &self.retry_status)
            .finish_non_exhaustive()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retry)
            .max_content_length(config.max_content_length)
            .retry_status_codes(config.retry_status_codes.iter().copied())
            .waiter(Backoff::from(&config.waiter))
    }
}

/// Tripperware for `config`, or `None` when retrying is not configured.
#[must_use]
pub fn tripperware(config: Option<&RetryConfig>) -> Option<Tripperware> {
    let config = config.filter(|c| c.max_retry > 0)?;
    Some(retry_tripperware(RetryPolicy::from(config)))
}

#[must_use]
pub fn retry_tripperware(policy: RetryPolicy) -> Tripperware {
    let policy = Arc::new(policy);
    Arc::new(move |inner: Arc<dyn RoundTripper>| {
        Arc::new(Retry {
            policy: Arc::clone(&policy),
            inner,
        }) as Arc<dyn RoundTripper>
    })
}

/// Round tripper that retries failed attempts of `inner`.
struct Retry {
    policy: Arc<RetryPolicy>,
    inner: Arc<dyn RoundTripper>,
}

/// Request body as offered to each attempt.
enum Replay {
    Empty,
    Body(ReplayableBody),
}

impl Replay {
    /// Make `body` replayable, buffering at most `declared` bytes of it
    /// when it has no rewinder of its own.
    async fn prepare(body: Body, declared: u64) -> std::io::Result<Self> {
        if body.is_empty() {
            return Ok(Self::Empty);
        }
        let body = if body.rewinder().is_some() {
            body
        } else {
            Body::from(body.collect_at_most(declared).await?)
        };
        Ok(Self::Body(ReplayableBody::new(body)))
    }

    fn body(&self) -> Body {
        match self {
            Self::Empty => Body::empty(),
            Self::Body(replay) => replay.body(),
        }
    }

    fn rewind(&mut self) -> Result<(), RewindError> {
        match self {
            Self::Empty => Ok(()),
            Self::Body(replay) => replay.rewind(),
        }
    }
}

fn rebuild(parts: &Parts, body: Body) -> Request<Body> {
    let mut req = Request::new(body);
    *req.method_mut() = parts.method.clone();
    *req.uri_mut() = parts.uri.clone();
    *req.version_mut() = parts.version;
    *req.headers_mut() = parts.headers.clone();
    *req.extensions_mut() = parts.extensions.clone();
    req
}

fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Sleep for `delay`. Returns `false` if `cancel` fired first.
async fn sleep_or_cancel(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        },
        None => {
            tokio::time::sleep(delay).await;
            true
        },
    }
}

fn exhausted(failures: &[String], last: Option<BoxError>) -> Error {
    let err = RETRY_FAIL.with_detail(failures.join("; "));
    match last {
        Some(cause) => err.with_source(cause),
        None => err,
    }
}

#[async_trait]
impl RoundTripper for Retry {
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let policy = &self.policy;
        if policy.max_retry == 0 {
            return self.inner.round_trip(req).await;
        }
        let Some(declared) = policy.replayable_length(req.body().content_length()) else {
            debug!(
                uri = %req.uri(),
                content_length = ?req.body().content_length(),
                "request body cannot be buffered, sending without retry"
            );
            return self.inner.round_trip(req).await;
        };

        let (parts, body) = req.into_parts();
        let cancel = parts.extensions.get::<CancellationToken>().cloned();
        let mut replay = Replay::prepare(body, declared)
            .await
            .map_err(|e| RETRY_FAIL.wrap(e).with_detail("failed to read request body"))?;

        let mut failures = Vec::new();
        let mut last: Option<BoxError> = None;
        for attempt in 0..=policy.max_retry {
            let n = attempt + 1;
            match self.inner.round_trip(rebuild(&parts, replay.body())).await {
                Ok(resp) if !policy.is_retry_status(resp.status()) => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    failures.push(format!(
                        "{n}th request failed at unix millis {} with status code {}",
                        unix_millis(),
                        status.as_u16()
                    ));
                    last = Some(Box::new(StatusError { status }));
                },
                Err(e) if is_canceled(&*e) => return Err(e),
                Err(e) => {
                    failures.push(format!(
                        "{n}th request failed at unix millis {}. caused by {e}",
                        unix_millis()
                    ));
                    last = Some(e);
                },
            }
            if attempt == policy.max_retry {
                break;
            }

            let delay = policy.waiter.wait(n);
            warn!(
                uri = %parts.uri,
                attempt = n,
                delay_ms = delay.as_millis() as u64,
                "request failed, retrying"
            );
            if !sleep_or_cancel(delay, cancel.as_ref()).await {
                debug!(uri = %parts.uri, attempt = n, "request canceled while waiting to retry");
                break;
            }
            if let Err(e) = replay.rewind() {
                failures.push(format!(
                    "{n}th request body rewind failed at unix millis {}. caused by {e}",
                    unix_millis()
                ));
                last = Some(Box::new(e));
                break;
            }
        }

        Err(Box::new(exhausted(&failures, last)))
    }
}
