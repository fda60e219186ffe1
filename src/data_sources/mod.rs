//! Read-only data sources.

mod static_ips;

pub use static_ips::StaticIpsDataSource;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::ChecklyClient;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};
use crate::validation;

/// A data source backed by the Checkly API.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Terraform type name, e.g. `checkly_static_ips`.
    fn type_name(&self) -> &'static str;

    /// The data source schema.
    fn schema(&self) -> &Schema;

    /// Validate a configuration against the schema.
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        validation::validate(self.schema(), config)
    }

    /// Read the data source for `config`.
    async fn read(&self, client: &ChecklyClient, config: Value) -> Result<Value, ProviderError>;
}
