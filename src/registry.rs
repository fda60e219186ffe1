//! The set of resources and data sources a provider serves.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data_sources::{DataSource, StaticIpsDataSource};
use crate::error::ProviderError;
use crate::resources::{
    AlertChannelResource, CheckGroupResource, CheckResource, Controller, DashboardResource,
    EnvironmentVariableResource, HeartbeatResource, MaintenanceWindowResource, ManagedResource,
    PrivateLocationResource, ResourceController, SnippetResource, TriggerCheckResource,
    TriggerGroupResource,
};
use crate::schema::ProviderSchema;

/// Resource controllers and data sources keyed by type name.
#[derive(Clone, Default)]
pub struct Registry {
    resources: BTreeMap<&'static str, Arc<dyn ResourceController>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every Checkly resource and data source.
    pub fn standard() -> Self {
        Self::new()
            .with_resource(CheckResource)
            .with_resource(CheckGroupResource)
            .with_resource(AlertChannelResource)
            .with_resource(DashboardResource)
            .with_resource(HeartbeatResource)
            .with_resource(EnvironmentVariableResource)
            .with_resource(MaintenanceWindowResource)
            .with_resource(PrivateLocationResource)
            .with_resource(SnippetResource)
            .with_resource(TriggerCheckResource)
            .with_resource(TriggerGroupResource)
            .with_data_source(StaticIpsDataSource::new())
    }

    /// Register a resource kind.
    pub fn with_resource<K: ManagedResource>(self, kind: K) -> Self {
        self.with_controller(Arc::new(Controller::new(kind)))
    }

    /// Register a resource controller.
    pub fn with_controller(mut self, controller: Arc<dyn ResourceController>) -> Self {
        self.resources.insert(controller.type_name(), controller);
        self
    }

    /// Register a data source.
    pub fn with_data_source<D: DataSource + 'static>(mut self, data_source: D) -> Self {
        self.data_sources
            .insert(data_source.type_name(), Arc::new(data_source));
        self
    }

    /// The controller for `type_name`.
    pub fn resource(&self, type_name: &str) -> Result<&dyn ResourceController, ProviderError> {
        self.resources
            .get(type_name)
            .map(|c| c.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// The data source for `type_name`.
    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .get(type_name)
            .map(|d| d.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// Registered resource type names, sorted.
    pub fn resource_names(&self) -> Vec<String> {
        self.resources.keys().map(|k| k.to_string()).collect()
    }

    /// Registered data source type names, sorted.
    pub fn data_source_names(&self) -> Vec<String> {
        self.data_sources.keys().map(|k| k.to_string()).collect()
    }

    /// Schemas of everything registered, with `provider` as the provider
    /// configuration schema.
    pub fn schema(&self, provider: crate::schema::Schema) -> ProviderSchema {
        let schema = self
            .resources
            .iter()
            .fold(ProviderSchema::new().with_provider_config(provider), |s, (name, c)| {
                s.with_resource(*name, c.schema().clone())
            });
        self.data_sources
            .iter()
            .fold(schema, |s, (name, d)| s.with_data_source(*name, d.schema().clone()))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("resources", &self.resource_names())
            .field("data_sources", &self.data_source_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = Registry::standard();

        assert_eq!(
            registry.resource_names(),
            vec![
                "checkly_alert_channel",
                "checkly_check",
                "checkly_check_group",
                "checkly_dashboard",
                "checkly_environment_variable",
                "checkly_heartbeat",
                "checkly_maintenance_windows",
                "checkly_private_location",
                "checkly_snippet",
                "checkly_trigger_check",
                "checkly_trigger_group",
            ]
        );
        assert_eq!(registry.data_source_names(), vec!["checkly_static_ips"]);
    }

    #[test]
    fn test_lookup() {
        let registry = Registry::standard();
        assert_eq!(
            registry.resource("checkly_snippet").unwrap().type_name(),
            "checkly_snippet"
        );
        assert!(matches!(
            registry.resource("checkly_nope"),
            Err(ProviderError::UnknownResource(_))
        ));
        assert!(registry.data_source("checkly_static_ips").is_ok());
    }

    #[test]
    fn test_schema_lists_everything() {
        let schema = Registry::standard().schema(crate::config::ProviderConfig::schema());
        assert_eq!(schema.resources.len(), 11);
        assert!(schema.data_sources.contains_key("checkly_static_ips"));
        assert!(schema.provider.block.attributes.contains_key("api_key"));
    }
}
