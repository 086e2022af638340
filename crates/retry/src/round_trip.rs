//! The round-trip capability and the tripperware that wraps it.

use std::{future::Future, sync::Arc};

use {
    async_trait::async_trait,
    http::{Request, Response},
};

use crate::{body::Body, error::BoxError};

/// Executes one HTTP request.
///
/// A request carrying a [`tokio_util::sync::CancellationToken`] extension
/// should be abandoned with [`Canceled`](crate::error::Canceled) once the
/// token fires.
#[async_trait]
pub trait RoundTripper: Send + Sync {
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError>;
}

/// Wraps one round tripper in another.
pub type Tripperware = Arc<dyn Fn(Arc<dyn RoundTripper>) -> Arc<dyn RoundTripper> + Send + Sync>;

/// Wrap `base` in every tripperware of `chain`. The first entry ends up
/// outermost and sees the request first.
pub fn chain(base: Arc<dyn RoundTripper>, chain: &[Tripperware]) -> Arc<dyn RoundTripper> {
    chain.iter().rev().fold(base, |inner, ware| ware(inner))
}

/// Adapts an async closure into a [`RoundTripper`].
pub struct RoundTripFn<F>(pub F);

#[async_trait]
impl<F, Fut> RoundTripper for RoundTripFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Body>, BoxError>> + Send,
{
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        (self.0)(req).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        http::HeaderValue,
        std::sync::Mutex,
    };

    fn tagging(tag: &'static str, order: Arc<Mutex<Vec<&'static str>>>) -> Tripperware {
        Arc::new(move |inner: Arc<dyn RoundTripper>| {
            let order = Arc::clone(&order);
            Arc::new(RoundTripFn(move |mut req: Request<Body>| {
                let inner = Arc::clone(&inner);
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(tag);
                    req.headers_mut()
                        .append("x-trace", HeaderValue::from_static(tag));
                    inner.round_trip(req).await
                }
            })) as Arc<dyn RoundTripper>
        })
    }

    #[tokio::test]
    async fn chain_applies_first_outermost() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let base: Arc<dyn RoundTripper> = Arc::new(RoundTripFn(|req: Request<Body>| async move {
            let trace: Vec<String> = req
                .headers()
                .get_all("x-trace")
                .iter()
                .map(|v| v.to_str().unwrap().to_string())
                .collect();
            Ok::<_, BoxError>(Response::new(Body::from(trace.join(","))))
        }));

        let rt = chain(base, &[
            tagging("outer", Arc::clone(&order)),
            tagging("inner", Arc::clone(&order)),
        ]);
        let resp = rt.round_trip(Request::new(Body::empty())).await.unwrap();
        let body = resp.into_body().collect().await.unwrap();
        assert_eq!(body, "outer,inner");
        assert_eq!(*order.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn empty_chain_is_base() {
        let base: Arc<dyn RoundTripper> = Arc::new(RoundTripFn(|_req: Request<Body>| async {
            Ok::<_, BoxError>(Response::new(Body::from("base")))
        }));
        let rt = chain(base, &[]);
        let resp = rt.round_trip(Request::new(Body::empty())).await.unwrap();
        assert_eq!(resp.into_body().collect().await.unwrap(), "base");
    }
}
