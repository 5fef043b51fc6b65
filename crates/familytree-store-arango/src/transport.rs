//! HTTP plumbing: endpoint rotation, authentication, retry and decoding of
//! ArangoDB error bodies.

use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::{Client, Method, Response, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ArangoOptions, Error, Result};

/// A pooled HTTP client bound to one set of ArangoDB endpoints.
#[derive(Debug)]
pub(crate) struct Transport {
  client:      Client,
  endpoints:   Vec<Url>,
  next:        AtomicUsize,
  username:    String,
  password:    String,
  max_retries: u32,
  retry_delay: std::time::Duration,
}

impl Transport {
  pub fn new(options: &ArangoOptions) -> Result<Self> {
    if options.endpoints.is_empty() {
      return Err(Error::Config("at least one endpoint is required".into()));
    }
    let endpoints = options
      .endpoints
      .iter()
      .map(|raw| {
        let url = Url::parse(raw)
          .map_err(|e| Error::Config(format!("invalid endpoint {raw:?}: {e}")))?;
        if url.cannot_be_a_base() {
          return Err(Error::Config(format!("invalid endpoint {raw:?}")));
        }
        Ok(url)
      })
      .collect::<Result<Vec<_>>>()?;

    let client = Client::builder().timeout(options.timeout).build()?;

    Ok(Self {
      client,
      endpoints,
      next: AtomicUsize::new(0),
      username: options.username.clone(),
      password: options.password.clone(),
      max_retries: options.max_retries,
      retry_delay: options.retry_delay,
    })
  }

  /// Send one request to `segments` (path segments, percent-encoded here)
  /// and return the decoded JSON answer. An empty body decodes to `Null`.
  pub async fn send(
    &self,
    method: Method,
    segments: &[&str],
    body: Option<&Value>,
  ) -> Result<Value> {
    let idempotent = method != Method::POST;
    let mut delay = self.retry_delay;
    let mut attempt = 0;

    loop {
      let url = self.url(segments);
      debug!(%method, %url, attempt, "arangodb request");
      let mut request = self
        .client
        .request(method.clone(), url)
        .basic_auth(&self.username, Some(&self.password));
      if let Some(body) = body {
        request = request.json(body);
      }

      let outcome = match request.send().await {
        Ok(response) => decode(response).await,
        Err(e) => Err(Error::Http(e)),
      };

      match outcome {
        Err(err) if attempt < self.max_retries && err.is_retryable(idempotent) => {
          attempt += 1;
          warn!(
            %method,
            path = %segments.join("/"),
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying arangodb request"
          );
          tokio::time::sleep(delay).await;
          delay = delay.saturating_mul(2);
        }
        other => return other,
      }
    }
  }

  /// The next endpoint in rotation with `segments` appended to its path.
  fn url(&self, segments: &[&str]) -> Url {
    let index = self.next.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
    let mut url = self.endpoints[index].clone();
    // Endpoints are checked to be base URLs in `new`.
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }
}

async fn decode(response: Response) -> Result<Value> {
  let status = response.status();
  let bytes = response.bytes().await?;

  if status.is_success() {
    if bytes.is_empty() {
      return Ok(Value::Null);
    }
    return Ok(serde_json::from_slice(&bytes)?);
  }

  let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  Err(Error::Arango {
    status:    status.as_u16(),
    error_num: body.get("errorNum").and_then(Value::as_i64).unwrap_or(0),
    message:   body
      .get("errorMessage")
      .and_then(Value::as_str)
      .map(str::to_owned)
      .unwrap_or_else(|| status.to_string()),
  })
}
