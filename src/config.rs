//! Provider configuration.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::interop::strip_unknown;
use crate::schema::{Attribute, Schema};

/// Default Checkly API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.checklyhq.com";

/// Default value of the `X-Checkly-Source` header.
pub const DEFAULT_API_SOURCE: &str = "TF";

/// Environment variable names.
pub mod env {
    /// API key.
    pub const API_KEY: &str = "CHECKLY_API_KEY";
    /// API base URL.
    pub const API_URL: &str = "CHECKLY_API_URL";
    /// Account ID.
    pub const ACCOUNT_ID: &str = "CHECKLY_ACCOUNT_ID";
    /// Value of the `X-Checkly-Source` header.
    pub const API_SOURCE: &str = "CHECKLY_API_SOURCE";
    /// File that receives debug logs.
    pub const DEBUG_LOG: &str = "CHECKLY_DEBUG_LOG";
}

/// Settings used to build the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API key, sent as a bearer token.
    pub api_key: String,
    /// API base URL.
    pub api_url: String,
    /// Account the key acts on.
    pub account_id: Option<String>,
    /// Value of the `X-Checkly-Source` header.
    pub api_source: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    api_key: Option<String>,
    api_url: Option<String>,
    account_id: Option<String>,
}

impl ProviderConfig {
    /// The provider configuration schema.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("The Checkly provider manages Checkly monitoring resources.")
            .with_attribute(
                "api_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!("API key. Falls back to `{}`.", env::API_KEY)),
            )
            .with_attribute(
                "api_url",
                Attribute::optional_string().with_description(format!(
                    "API base URL. Falls back to `{}`, then `{}`.",
                    env::API_URL,
                    DEFAULT_API_URL
                )),
            )
            .with_attribute(
                "account_id",
                Attribute::optional_string()
                    .with_description(format!("Account ID. Falls back to `{}`.", env::ACCOUNT_ID)),
            )
    }

    /// Resolve configuration from the process environment.
    pub fn from_config(config: &Value) -> Result<Self, ProviderError> {
        Self::from_sources(config, |name| std::env::var(name).ok())
    }

    /// Resolve configuration; explicit values win over `lookup`.
    pub fn from_sources<F>(config: &Value, lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = if config.is_null() {
            RawConfig::default()
        } else {
            serde_json::from_value(strip_unknown(config))?
        };

        let pick = |explicit: Option<String>, var: &str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(var).filter(|v| !v.is_empty()))
        };

        let api_key = pick(raw.api_key, env::API_KEY).ok_or_else(|| {
            ProviderError::Configuration(format!(
                "api_key must be set in the provider configuration or via {}",
                env::API_KEY
            ))
        })?;

        Ok(Self {
            api_key,
            api_url: pick(raw.api_url, env::API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            account_id: pick(raw.account_id, env::ACCOUNT_ID),
            api_source: lookup(env::API_SOURCE)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_SOURCE.to_string()),
        })
    }
}
