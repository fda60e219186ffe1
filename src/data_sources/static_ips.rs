use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::DataSource;
use crate::api::models::StaticIp;
use crate::api::ChecklyClient;
use crate::error::ProviderError;
use crate::interop::Objecter;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema, Validator};

const TYPE_NAME: &str = "checkly_static_ips";

/// `checkly_static_ips`: the source addresses of Checkly's public locations.
pub struct StaticIpsDataSource {
    schema: Schema,
    objecter: Objecter,
}

impl StaticIpsDataSource {
    /// Create the data source.
    pub fn new() -> Self {
        let schema = Schema::v0()
            .with_description("Static IP addresses Checkly runs checks from.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "locations",
                Attribute::optional_string_set()
                    .with_description("Only return addresses of these locations."),
            )
            .with_attribute(
                "ip_family",
                Attribute::optional_string()
                    .with_validator(Validator::one_of_strings(&["IPv4", "IPv6"]))
                    .with_description("Only return addresses of this family."),
            )
            .with_attribute(
                "addresses",
                Attribute::new(AttributeType::set(AttributeType::String), AttributeFlags::computed())
                    .with_description("Addresses in CIDR notation."),
            );
        let objecter = Objecter::for_schema(&schema);
        Self { schema, objecter }
    }
}

impl Default for StaticIpsDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct StaticIpsModel {
    id: String,
    locations: Vec<String>,
    ip_family: Option<String>,
    addresses: Vec<String>,
}

impl StaticIpsModel {
    fn matches(&self, ip: &StaticIp) -> bool {
        let location_ok = self.locations.is_empty() || self.locations.contains(&ip.region);
        let family_ok = match self.ip_family.as_deref() {
            Some("IPv4") => !ip.address.contains(':'),
            Some("IPv6") => ip.address.contains(':'),
            _ => true,
        };
        location_ok && family_ok
    }

    /// Stable ID derived from the filters.
    fn filter_id(&self) -> String {
        let mut locations = self.locations.clone();
        locations.sort();
        format!(
            "{}#{}#{}",
            TYPE_NAME,
            locations.join(","),
            self.ip_family.as_deref().unwrap_or("all")
        )
    }
}

#[async_trait]
impl DataSource for StaticIpsDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, client: &ChecklyClient, config: Value) -> Result<Value, ProviderError> {
        let mut model: StaticIpsModel = self.objecter.decode(&config)?;

        let ips = client
            .list_static_ips()
            .await
            .map_err(|e| ProviderError::remote("Reading", "Static IPs", e))?;

        let mut addresses: Vec<String> = ips
            .iter()
            .filter(|ip| model.matches(ip))
            .map(|ip| ip.address.clone())
            .collect();
        addresses.sort();
        addresses.dedup();
        debug!(count = addresses.len(), "Read static IPs");

        model.addresses = addresses;
        model.id = model.filter_id();
        Ok(self.objecter.encode(&model)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::resources::test_support::client;
    use serde_json::json;

    fn mock() -> MockTransport {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.path == "/v1/static-ips")
            .returning(|_| {
                Ok(Some(json!([
                    {"region": "us-east-1", "address": "54.1.1.1/32"},
                    {"region": "eu-west-1", "address": "34.2.2.2/32"},
                    {"region": "eu-west-1", "address": "2a05:d018::1/128"},
                    {"region": "ap-south-1", "address": "13.3.3.3/32"}
                ])))
            });
        mock
    }

    #[tokio::test]
    async fn test_read_all_addresses_sorted() {
        let state = StaticIpsDataSource::new()
            .read(&client(mock()), json!({}))
            .await
            .unwrap();

        assert_eq!(
            state["addresses"],
            json!(["13.3.3.3/32", "2a05:d018::1/128", "34.2.2.2/32", "54.1.1.1/32"])
        );
        assert_eq!(state["id"], "checkly_static_ips##all");
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let state = StaticIpsDataSource::new()
            .read(
                &client(mock()),
                json!({"locations": ["eu-west-1"], "ip_family": "IPv6"}),
            )
            .await
            .unwrap();

        assert_eq!(state["addresses"], json!(["2a05:d018::1/128"]));
        assert_eq!(state["locations"], json!(["eu-west-1"]));
        assert_eq!(state["ip_family"], "IPv6");
    }

    #[test]
    fn test_ip_family_is_validated() {
        let diagnostics = StaticIpsDataSource::new().validate(&json!({"ip_family": "IPv5"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("ip_family"));
    }
}
