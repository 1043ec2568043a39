//! Authenticated HTTP client for the billing API.
//!
//! [`Client`] wraps a pooled [`reqwest::Client`] and centralizes request
//! construction, authentication, status checking, and response decoding.
//! Resource modules never touch `reqwest` directly.

use std::{fmt, time::Duration};

use reqwest::{Method, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
};

/// A decoded error body from the billing service.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Raw response from the billing service: status, headers, and body bytes.
///
/// Used by the pager, which needs response headers for record counts.
pub(crate) struct ApiResponse {
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

/// Rejects request paths that could escape or confuse the API base.
pub(crate) fn sanitize_path(path: &str) -> Result<&str> {
    if path.contains("..") || path.contains("//") {
        return Err(ClientError::InvalidUrl(format!(
            "path contains traversal sequence: {path}"
        )));
    }
    if !path.starts_with('/') {
        return Err(ClientError::InvalidUrl(format!("path must start with '/': {path}")));
    }
    Ok(path)
}

/// Appends percent-encoded query parameters to a request path.
pub(crate) fn path_with_query(path: &str, params: &[(&str, &str)]) -> Result<String> {
    if params.is_empty() {
        return Ok(path.to_owned());
    }

    // Borrow Url's encoder rather than hand-rolling percent escaping.
    let scratch = format!("https://rebill.invalid{path}");
    let mut url =
        Url::parse(&scratch).map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    match url.query() {
        Some(query) if !query.is_empty() => Ok(format!("{}?{query}", url.path())),
        _ => Ok(url.path().to_owned()),
    }
}

/// Extracts an error message from a non-success response body.
fn api_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .ok()
        .or_else(|| {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            (!text.is_empty() && text.len() <= 512).then(|| text.to_owned())
        })
        .unwrap_or_else(|| format!("service returned status {status}"));

    ClientError::Api { status, message }
}

/// Decodes a JSON response body, attaching the serde error as context.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Authenticated client for one billing API site.
///
/// Cheap to clone: the underlying connection pool is shared between
/// clones. Create one per API site and pass it by reference to resource
/// operations.
///
/// # Examples
///
/// ```no_run
/// use rebill::{Client, ClientConfig, Invoice};
///
/// # async fn example() -> rebill::Result<()> {
/// let config = ClientConfig::new("https://api.rebill.example.com/v2", "sk_live_abc123");
/// let client = Client::new(&config)?;
///
/// let mut open = Invoice::open(&client);
/// while let Some(invoice) = open.try_next().await? {
///     println!("{}", invoice.invoice_number_with_prefix());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when the configuration fails
    /// validation, or [`ClientError::Http`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(ClientError::Http)?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("invalid base_url: {e}")))?;

        Ok(Self { http, base_url, api_key: config.api_key.clone() })
    }

    /// Builds a client against an arbitrary base URL, skipping config
    /// validation so tests can target a local mock server.
    #[cfg(test)]
    pub(crate) fn unvalidated(base_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder().build().map_err(ClientError::Http)?;
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self { http, base_url, api_key: api_key.to_owned() })
    }

    /// Resolves a request path or absolute action href against the base URL.
    ///
    /// Absolute hrefs must point at the same scheme and host as the base
    /// URL; action links never legitimately leave the API site.
    pub(crate) fn resolve(&self, href: &str) -> Result<Url> {
        if href.starts_with('/') {
            let path = sanitize_path(href)?;
            let joined = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
            return Url::parse(&joined).map_err(|e| ClientError::InvalidUrl(e.to_string()));
        }

        let url = Url::parse(href).map_err(|e| ClientError::InvalidUrl(format!("{href}: {e}")))?;
        if url.scheme() != self.base_url.scheme() || url.host_str() != self.base_url.host_str() {
            return Err(ClientError::InvalidUrl(format!(
                "action href points outside the API site: {href}"
            )));
        }
        Ok(url)
    }

    /// Executes a request and returns the raw response.
    ///
    /// Non-2xx statuses are mapped to [`ClientError::Api`] with the error
    /// message extracted from the body when possible.
    #[instrument(skip(self, body), fields(method = %method, url = %url))]
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        accept: &str,
    ) -> Result<ApiResponse> {
        let mut request = self
            .http
            .request(method, url)
            .basic_auth(&self.api_key, Some(""))
            .header("Accept", accept);

        if let Some(bytes) = body {
            request = request.header("Content-Type", "application/json").body(bytes);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ClientError::Http)?.to_vec();

        if !(200..300).contains(&status) {
            return Err(api_error(status, &body));
        }

        debug!(status, bytes = body.len(), "request completed");
        Ok(ApiResponse { headers, body })
    }

    /// Fetches and decodes a JSON resource.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.resolve(path)?;
        let response = self.execute(Method::GET, url, None, "application/json").await?;
        decode_json(&response.body)
    }

    /// Issues an empty-bodied POST and decodes the JSON response.
    pub(crate) async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.resolve(path)?;
        let response = self.execute(Method::POST, url, None, "application/json").await?;
        decode_json(&response.body)
    }

    /// PUTs a JSON body and decodes the JSON response.
    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.resolve(path)?;
        let bytes =
            serde_json::to_vec(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        let response = self.execute(Method::PUT, url, Some(bytes), "application/json").await?;
        decode_json(&response.body)
    }

    /// Issues a DELETE, discarding the response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.resolve(path)?;
        self.execute(Method::DELETE, url, None, "application/json").await?;
        Ok(())
    }

    /// Fetches a non-JSON representation of a resource, such as a PDF.
    pub(crate) async fn get_bytes(&self, path: &str, accept: &str) -> Result<Vec<u8>> {
        let url = self.resolve(path)?;
        let response = self.execute(Method::GET, url, None, accept).await?;
        Ok(response.body)
    }

    /// Invokes an action link and returns the raw response body.
    pub(crate) async fn follow_link(&self, method: Method, href: &str) -> Result<Vec<u8>> {
        let url = self.resolve(href)?;
        let response = self.execute(method, url, None, "application/json").await?;
        Ok(response.body)
    }
}
