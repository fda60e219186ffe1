//! The Checkly provider root.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::api::{ChecklyClient, HttpTransport};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::plan;
use crate::registry::Registry;
use crate::schema::{has_errors, Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation;

/// Provider type name; every resource type starts with it.
pub const PROVIDER_NAME: &str = "checkly";

/// Serves every Checkly resource and data source.
///
/// The API client is built by [`configure`](ProviderService::configure), or
/// injected up front with [`ChecklyProvider::with_client`]. Operations that
/// reach the API fail with a configuration error until then.
#[derive(Debug)]
pub struct ChecklyProvider {
    registry: Registry,
    client: RwLock<Option<ChecklyClient>>,
}

impl ChecklyProvider {
    /// An unconfigured provider serving [`Registry::standard`].
    pub fn new() -> Self {
        Self::with_registry(Registry::standard())
    }

    /// An unconfigured provider serving `registry`.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            client: RwLock::new(None),
        }
    }

    /// A provider that talks to the API through `client`.
    pub fn with_client(client: ChecklyClient) -> Self {
        Self {
            registry: Registry::standard(),
            client: RwLock::new(Some(client)),
        }
    }

    /// The resources and data sources served.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    async fn client(&self) -> Result<ChecklyClient, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".to_string())
        })
    }
}

impl Default for ChecklyProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn error diagnostics into an `Err`, passing warnings through.
fn fail_on_errors(diagnostics: Vec<Diagnostic>) -> Result<Vec<Diagnostic>, ProviderError> {
    if has_errors(&diagnostics) {
        Err(ProviderError::Diagnostics(diagnostics))
    } else {
        Ok(diagnostics)
    }
}

#[async_trait::async_trait]
impl ProviderService for ChecklyProvider {
    fn schema(&self) -> ProviderSchema {
        self.registry.schema(ProviderConfig::schema())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            resources: self.registry.resource_names(),
            data_sources: self.registry.data_source_names(),
            plan_destroy: true,
        }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&ProviderConfig::schema(), &config))
    }

    #[instrument(skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let warnings = fail_on_errors(validation::validate(&ProviderConfig::schema(), &config))?;
        let settings = ProviderConfig::from_config(&config)?;

        let transport = HttpTransport::new(
            settings.api_url.clone(),
            settings.api_key,
            settings.account_id.clone(),
            settings.api_source,
        )
        .map_err(|e| ProviderError::Configuration(format!("failed to build API client: {}", e)))?;

        *self.client.write().await = Some(ChecklyClient::new(Arc::new(transport)));
        info!(
            api_url = %settings.api_url,
            account_id = settings.account_id.as_deref().unwrap_or(""),
            "Provider configured"
        );
        Ok(warnings)
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(self.registry.resource(resource_type)?.validate(&config))
    }

    #[instrument(skip(self, prior_state, proposed_state, config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let controller = self.registry.resource(resource_type)?;
        if !proposed_state.is_null() {
            fail_on_errors(controller.validate(&config))?;
        }

        debug!("Planning resource");
        Ok(plan::plan(
            controller.schema(),
            prior_state.as_ref(),
            &proposed_state,
        ))
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let controller = self.registry.resource(resource_type)?;
        controller.create(&self.client().await?, planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let controller = self.registry.resource(resource_type)?;
        controller.read(&self.client().await?, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let controller = self.registry.resource(resource_type)?;
        controller
            .update(&self.client().await?, prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let controller = self.registry.resource(resource_type)?;
        controller.delete(&self.client().await?, current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let state = self.registry.resource(resource_type)?.import(id)?;
        info!(resource = resource_type, id, "Importing resource");
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(self.registry.data_source(data_source_type)?.validate(&config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.registry.data_source(data_source_type)?;
        fail_on_errors(data_source.validate(&config))?;
        data_source.read(&self.client().await?, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::interop::UNKNOWN;
    use crate::resources::test_support::client;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_unconfigured_provider_rejects_api_calls() {
        let provider = ChecklyProvider::new();
        let err = assert_err!(
            provider
                .create("checkly_snippet", json!({"name": "n", "script": "s"}))
                .await
        );
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_configure_builds_client() {
        let provider = ChecklyProvider::new();
        let warnings = provider
            .configure(json!({"api_key": "cu_test", "api_url": "http://localhost:1"}))
            .await
            .unwrap();
        assert!(warnings.is_empty());
        assert!(provider.client().await.is_ok());
    }

    #[tokio::test]
    async fn test_plan_validates_first() {
        let provider = ChecklyProvider::new();
        let config = json!({
            "name": "backup",
            "activated": true,
            "heartbeat": {"period": 5, "period_unit": "seconds", "grace": 0, "grace_unit": "seconds"}
        });

        let err = provider
            .plan("checkly_heartbeat", None, config.clone(), config)
            .await
            .unwrap_err();
        let diagnostics = err.to_diagnostics();
        assert!(diagnostics.iter().any(|d| d
            .detail
            .as_deref()
            .is_some_and(|m| m.contains("must be greater than or equal to 30s"))));
    }

    #[tokio::test]
    async fn test_plan_fills_defaults_and_unknowns() {
        let provider = ChecklyProvider::new();
        let config = json!({"name": "g", "concurrency": 2, "activated": true});

        let result = provider
            .plan("checkly_check_group", None, config.clone(), config)
            .await
            .unwrap();
        assert_eq!(result.planned_state["muted"], json!(false));
        assert_eq!(result.planned_state["id"], json!(UNKNOWN));
        assert!(!result.requires_replace);
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let provider = ChecklyProvider::new();
        let err = provider
            .validate_resource_config("checkly_widget", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_import_then_read() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.path == "/v1/snippets/12")
            .returning(|_| Ok(Some(json!({"id": 12, "name": "setup", "script": "init()"}))));
        let provider = ChecklyProvider::with_client(client(mock));

        let imported = assert_ok!(provider.import_resource("checkly_snippet", "12").await);
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].state["id"], "12");

        let state = provider
            .read("checkly_snippet", imported[0].state.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state["name"], "setup");
        assert_eq!(state["script"], "init()");
    }

    #[tokio::test]
    async fn test_read_data_source() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(Some(json!([{"region": "eu-west-1", "address": "1.1.1.1/32"}]))));
        let provider = ChecklyProvider::with_client(client(mock));

        let state = assert_ok!(provider.read_data_source("checkly_static_ips", json!({})).await);
        assert_eq!(state["addresses"], json!(["1.1.1.1/32"]));
    }

    #[test]
    fn test_metadata() {
        let metadata = ChecklyProvider::new().metadata();
        assert_eq!(metadata.type_name, "checkly");
        assert_eq!(metadata.resources.len(), 11);
        assert!(metadata.plan_destroy);
    }
}
