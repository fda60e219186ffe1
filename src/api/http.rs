use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use super::{ApiError, ApiRequest, Transport};

/// [`Transport`] over HTTPS using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    account_id: Option<String>,
    source: String,
}

impl HttpTransport {
    /// Create a transport for the API at `base_url`.
    ///
    /// `source` is sent as `X-Checkly-Source`; `account_id`, when present, as
    /// `X-Checkly-Account`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        account_id: Option<String>,
        source: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("checkly-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            account_id,
            source: source.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, url = %url, "Sending API request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .bearer_auth(&self.api_key)
            .header("X-Checkly-Source", &self.source);
        if let Some(account_id) = &self.account_id {
            builder = builder.header("X-Checkly-Account", account_id);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!(status = status.as_u16(), body = %text, "Received API response");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_body(&text)
    }
}

/// Empty bodies (e.g. `204 No Content`) decode to `None`.
fn parse_body(text: &str) -> Result<Option<Value>, ApiError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(text)?))
}
