use std::{sync::Arc, time::Duration};

use {
    anyhow::{Context, Result, anyhow},
    clap::Args,
    gantry_config::{GantryConfig, RetryConfig},
    gantry_retry::{Body, HttpTransport, Tripperware, chain, tripperware},
    http::{HeaderName, HeaderValue, Method, Request},
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

#[derive(Args)]
pub struct FetchArgs {
    /// Request URL.
    url: String,
    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    method: Method,
    /// Header in `Name: value` form. Repeatable.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,
    /// Request body.
    #[arg(short, long)]
    data: Option<String>,
    /// Retries after the first attempt (overrides config).
    #[arg(long)]
    max_retry: Option<u32>,
    /// Status code that triggers a retry (overrides config). Repeatable.
    #[arg(long = "retry-status")]
    retry_status: Vec<u16>,
    /// Per-attempt timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

pub async fn handle_fetch(args: FetchArgs, config: &GantryConfig) -> Result<()> {
    let retry = retry_config(&args, config.retry.as_ref());
    let wares: Vec<Tripperware> = tripperware(retry.as_ref()).into_iter().collect();
    let transport = HttpTransport::with_timeout(Duration::from_secs(args.timeout))?;
    let client = chain(Arc::new(transport), &wares);

    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, canceling request");
            on_signal.cancel();
        }
    });

    let mut req = build_request(&args)?;
    req.extensions_mut().insert(token);

    let resp = client
        .round_trip(req)
        .await
        .map_err(|e| anyhow!(e))
        .context("request failed")?;
    info!(status = %resp.status(), "response received");

    let mut body = resp.into_body();
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut body, &mut stdout).await?;
    Ok(())
}

/// Config retry settings with command line overrides applied. Any override
/// enables retrying even when the config has none.
fn retry_config(args: &FetchArgs, configured: Option<&RetryConfig>) -> Option<RetryConfig> {
    if args.max_retry.is_none() && args.retry_status.is_empty() {
        return configured.cloned();
    }
    let mut retry = configured.cloned().unwrap_or_default();
    if let Some(max_retry) = args.max_retry {
        retry.max_retry = max_retry;
    }
    if !args.retry_status.is_empty() {
        retry.retry_status_codes = args.retry_status.clone();
    }
    Some(retry)
}

fn build_request(args: &FetchArgs) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(args.method.clone())
        .uri(&args.url);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        builder = builder.header(name, value);
    }
    let body = args.data.clone().map(Body::from).unwrap_or_default();
    builder.body(body).context("invalid request")
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header `{raw}` is not in `Name: value` form"))?;
    let name = HeaderName::try_from(name.trim()).context("invalid header name")?;
    let value = HeaderValue::try_from(value.trim()).context("invalid header value")?;
    Ok((name, value))
}
