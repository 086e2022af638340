//! [`RoundTripper`] over a `reqwest` client.

use std::{io, time::Duration};

use {
    async_trait::async_trait,
    futures::TryStreamExt,
    http::{Request, Response},
    tokio_util::{io::StreamReader, sync::CancellationToken},
    tracing::debug,
};

use crate::{
    body::Body,
    error::{BoxError, Canceled},
    round_trip::RoundTripper,
};

/// Sends requests with `reqwest`. Response bodies are streamed.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn send(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let (parts, body) = req.into_parts();
        let payload = body.collect().await?;

        let mut builder = self
            .client
            .request(parts.method.clone(), parts.uri.to_string())
            .headers(parts.headers);
        if !payload.is_empty() {
            builder = builder.body(payload);
        }

        let resp = builder.send().await?;
        debug!(method = %parts.method, uri = %parts.uri, status = %resp.status(), "upstream responded");

        let mut out = Response::new(Body::empty());
        *out.status_mut() = resp.status();
        *out.version_mut() = resp.version();
        *out.headers_mut() = resp.headers().clone();
        let content_length = resp.content_length();
        let stream = resp.bytes_stream().map_err(io::Error::other);
        *out.body_mut() = Body::from_reader(StreamReader::new(stream), content_length);
        Ok(out)
    }
}

#[async_trait]
impl RoundTripper for HttpTransport {
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let Some(token) = req.extensions().get::<CancellationToken>().cloned() else {
            return self.send(req).await;
        };
        if token.is_cancelled() {
            return Err(Box::new(Canceled));
        }
        tokio::select! {
            biased;
            () = token.cancelled() => Err(Box::new(Canceled)),
            result = self.send(req) => result,
        }
    }
}
