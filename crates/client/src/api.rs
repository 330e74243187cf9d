//! REST API client for the Lark open platform.
//!
//! Wraps the tenant-token and approval-instance endpoints using [`reqwest`].
//! Retries and token caching are left to callers; each instance fetch
//! obtains a fresh token.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Default open-platform host (international). Use `https://open.feishu.cn` for Feishu.
pub const DEFAULT_BASE_URL: &str = "https://open.larksuite.com";

const TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";
const INSTANCE_PATH: &str = "/open-apis/approval/v4/instances";

/// Connection settings for [`LarkApi`].
#[derive(Debug, Clone)]
pub struct LarkClientConfig {
    /// Base URL without trailing slash, e.g. `https://open.larksuite.com`.
    pub base_url: String,
    pub app_id: String,
    pub app_secret: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Errors from the Lark REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum LarkApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform returned a non-2xx status code.
    #[error("Lark API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response was not JSON.
    #[error("Lark API returned non-JSON content (content-type {content_type:?}): {body}")]
    ContentType { content_type: String, body: String },

    /// The body claimed to be JSON but could not be decoded.
    #[error("Lark API response could not be decoded ({message}): {body}")]
    Decode { message: String, body: String },

    /// The instance URL could not be built from the base URL and code.
    #[error("Invalid instance URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The envelope carried a non-zero business code. A missing code is reported as `-1`.
    #[error("Lark API business error (code {code}): {msg}")]
    Business { code: i64, msg: String },
}

/// The common `{code, msg, ...}` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: Option<i64>,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    tenant_access_token: Option<String>,
}

/// HTTP client for the Lark open platform.
pub struct LarkApi {
    client: reqwest::Client,
    config: LarkClientConfig,
}

impl LarkApi {
    /// Create a client with its own connection pool and the configured timeout.
    pub fn new(config: LarkClientConfig) -> Result<Self, LarkApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: LarkClientConfig) -> Self {
        Self { client, config }
    }

    /// Obtain a tenant access token for the configured app.
    ///
    /// Sends `POST /open-apis/auth/v3/tenant_access_token/internal`.
    pub async fn tenant_access_token(&self) -> Result<String, LarkApiError> {
        let body = serde_json::json!({
            "app_id": self.config.app_id,
            "app_secret": self.config.app_secret,
        });

        let response = self
            .client
            .post(format!("{}{TOKEN_PATH}", self.config.base_url))
            .json(&body)
            .send()
            .await?;

        let envelope = Self::read_envelope(response).await?;
        envelope
            .tenant_access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LarkApiError::Decode {
                message: "missing tenant_access_token".to_string(),
                body: envelope.msg,
            })
    }

    /// Fetch the full approval instance and return its `data` object.
    ///
    /// Sends `GET /open-apis/approval/v4/instances/{instance_code}`. A
    /// successful envelope without `data` yields an empty object.
    pub async fn get_instance(&self, instance_code: &str) -> Result<Value, LarkApiError> {
        let url = instance_url(&self.config.base_url, instance_code)?;
        let token = self.tenant_access_token().await?;

        tracing::debug!(%url, instance_code, "Fetching approval instance");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let envelope = Self::read_envelope(response).await?;

        Ok(envelope
            .data
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    // ---- private helpers ----

    /// Read the body and run it through [`decode_envelope`].
    async fn read_envelope(response: reqwest::Response) -> Result<Envelope, LarkApiError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        tracing::debug!(status, %content_type, body_len = body.len(), "Lark API response");

        decode_envelope(status, &content_type, &body)
    }
}

/// Build the instance endpoint URL with the code as one escaped path segment.
///
/// `/`, `?` and `#` inside the code are percent-encoded, so the request
/// always targets the instances collection.
fn instance_url(base_url: &str, instance_code: &str) -> Result<reqwest::Url, LarkApiError> {
    let collection = format!("{base_url}{INSTANCE_PATH}");
    let invalid = |message: &str| LarkApiError::InvalidUrl {
        url: collection.clone(),
        message: message.to_string(),
    };

    // Dot segments are dropped by the URL builder and would hit the collection itself.
    if matches!(instance_code, "" | "." | "..") {
        return Err(invalid("instance code is not a valid path segment"));
    }

    let mut url = reqwest::Url::parse(&collection).map_err(|e| invalid(&e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("base URL cannot carry a path"))?
        .push(instance_code);
    Ok(url)
}

/// Validate a raw response: 2xx status, JSON content type, decodable body,
/// business code `0`.
fn decode_envelope(status: u16, content_type: &str, body: &str) -> Result<Envelope, LarkApiError> {
    if !(200..300).contains(&status) {
        return Err(LarkApiError::Status {
            status,
            body: body.to_string(),
        });
    }

    if !content_type.starts_with("application/json") {
        return Err(LarkApiError::ContentType {
            content_type: content_type.to_string(),
            body: body.to_string(),
        });
    }

    let envelope: Envelope = serde_json::from_str(body).map_err(|e| LarkApiError::Decode {
        message: e.to_string(),
        body: body.to_string(),
    })?;

    match envelope.code {
        Some(0) => Ok(envelope),
        code => Err(LarkApiError::Business {
            code: code.unwrap_or(-1),
            msg: envelope.msg,
        }),
    }
}
