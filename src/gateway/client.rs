//! Subscription-key authenticated HTTP client for the gateway.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::GatewayConfig;
use crate::gateway::{is_pending_status, GatewayError, GatewayResult};
use crate::model::{BlobRecord, PublishMessageRequest, PublishMessageResponse, TableEntityRecord};
use crate::resilience::PollOutcome;

const TRACE_HEADER: &str = "ocp-apim-trace";
const MAX_ERROR_BODY: usize = 512;

/// Gateway client bound to one namespace and one subscription key.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base: Url,
    namespace: String,
    headers: HeaderMap,
}

impl GatewayClient {
    /// Create a client with its own connection pool.
    pub fn new(config: &GatewayConfig, subscription_key: &str) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_http_client(http, config, subscription_key)
    }

    /// Create a client on an existing pool. Per-run headers stay in this
    /// value; the pool itself is never modified.
    pub fn with_http_client(
        http: reqwest::Client,
        config: &GatewayConfig,
        subscription_key: &str,
    ) -> GatewayResult<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| GatewayError::InvalidUrl(format!("'{}': {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(config.url.clone()));
        }

        let headers = build_headers(&config.subscription_header, subscription_key, config.trace)?;

        tracing::debug!(
            gateway = %base,
            namespace = %config.namespace,
            header = %config.subscription_header,
            trace = config.trace,
            "Gateway client created"
        );

        Ok(Self {
            http,
            base,
            namespace: config.namespace.clone(),
            headers,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Absolute URL for `path` under `{base}/{namespace}`.
    pub fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        let mut url = self.base.clone();
        url.set_query(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty().push(&self.namespace);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    /// POST a JSON body and decode the JSON reply.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "POST");
        let response = self
            .http
            .post(url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// GET and decode the JSON reply.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "GET");
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;
        decode(response).await
    }

    pub async fn publish_message(&self, message: &str) -> GatewayResult<PublishMessageResponse> {
        let response: PublishMessageResponse = self
            .post("messages", &PublishMessageRequest::new(message))
            .await?;
        tracing::info!(id = %response.id, "Message published");
        Ok(response)
    }

    pub async fn table_entity(&self, id: &str) -> GatewayResult<TableEntityRecord> {
        self.get(&format!("table-entities/{id}")).await
    }

    pub async fn blob(&self, id: &str) -> GatewayResult<BlobRecord> {
        self.get(&format!("blobs/{id}")).await
    }

    /// One GET, classified for the poll executor.
    pub async fn poll_json<T: DeserializeOwned>(&self, path: &str) -> PollOutcome<T, GatewayError> {
        let url = match self.endpoint(path) {
            Ok(url) => url,
            Err(e) => return PollOutcome::Failed(e),
        };

        let response = match self.http.get(url).headers(self.headers.clone()).send().await {
            Ok(response) => response,
            Err(e) => return PollOutcome::Failed(GatewayError::Transport(e)),
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => classify(status, &body),
            Err(e) => PollOutcome::Failed(GatewayError::Transport(e)),
        }
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base", &self.base.as_str())
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Header set attached to every request. The key is marked sensitive.
fn build_headers(header_name: &str, subscription_key: &str, trace: bool) -> GatewayResult<HeaderMap> {
    let name = HeaderName::from_bytes(header_name.as_bytes())
        .map_err(|e| GatewayError::InvalidHeader(format!("'{header_name}': {e}")))?;
    let mut value = HeaderValue::from_str(subscription_key)
        .map_err(|_| GatewayError::InvalidHeader(format!("value of '{header_name}'")))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(name, value);
    if trace {
        headers.insert(
            HeaderName::from_static(TRACE_HEADER),
            HeaderValue::from_static("true"),
        );
    }
    Ok(headers)
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GatewayError::Http {
            status,
            body: truncate(&body),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Classify one response for the poll executor.
///
/// A failure status whose body still decodes as `T` is reported as
/// ambiguous rather than guessed at.
pub(crate) fn classify<T: DeserializeOwned>(status: StatusCode, body: &str) -> PollOutcome<T, GatewayError> {
    if status.is_success() {
        return match serde_json::from_str(body) {
            Ok(value) => PollOutcome::Ready(value),
            Err(e) => PollOutcome::Failed(GatewayError::Deserialization(e)),
        };
    }

    if !body.trim().is_empty() && serde_json::from_str::<T>(body).is_ok() {
        return PollOutcome::Failed(GatewayError::Ambiguous { status });
    }

    if is_pending_status(status) {
        return PollOutcome::NotYetAvailable(format!("gateway returned {status}"));
    }

    PollOutcome::Failed(GatewayError::Http {
        status,
        body: truncate(body),
    })
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
