use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::common::{optional_string, refresh_id};
use super::{string_id, ManagedResource};
use crate::api::models::PrivateLocation;
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{InteropResult, Refresh, RefreshMode, Render};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema, Validator};

/// `checkly_private_location`: a self-hosted location for running checks.
///
/// Raw agent keys are only present in the create response, so `keys` is
/// filled once and left alone afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivateLocationResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateLocationModel {
    pub id: String,
    pub name: String,
    pub slug_name: String,
    pub icon: Option<String>,
    pub keys: Vec<String>,
}

impl Refresh<PrivateLocation> for PrivateLocationModel {
    fn refresh(&mut self, remote: &PrivateLocation, mode: RefreshMode) -> InteropResult<()> {
        refresh_id(&mut self.id, remote.id.clone(), mode);
        self.name = remote.name.clone();
        self.slug_name = remote.slug_name.clone();
        self.icon = remote.icon.as_deref().and_then(optional_string);
        if mode.is_created() {
            self.keys = remote.keys.iter().map(|k| k.raw_key.clone()).collect();
        }
        Ok(())
    }
}

impl Render<PrivateLocation> for PrivateLocationModel {
    fn render(&self, remote: &mut PrivateLocation) -> InteropResult<()> {
        remote.id = self.id.clone();
        remote.name = self.name.clone();
        remote.slug_name = self.slug_name.clone();
        remote.icon = self.icon.clone();
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for PrivateLocationResource {
    type Remote = PrivateLocation;
    type Model = PrivateLocationModel;
    type Id = String;

    const TYPE_NAME: &'static str = "checkly_private_location";
    const DISPLAY_NAME: &'static str = "Private Location";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A private location runs checks from your own infrastructure.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "name",
                Attribute::required_string().with_validator(Validator::not_empty()),
            )
            .with_attribute(
                "slug_name",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Valid slug name."),
            )
            .with_attribute(
                "icon",
                Attribute::optional_string().with_description("Icon assigned to the location."),
            )
            .with_attribute(
                "keys",
                Attribute::new(
                    AttributeType::set(AttributeType::String),
                    AttributeFlags::computed().sensitive(),
                )
                .with_description("Private location API keys."),
            )
    }

    fn parse_id(raw: &str) -> InteropResult<String> {
        string_id(raw)
    }

    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &PrivateLocation,
    ) -> Result<PrivateLocation, ApiError> {
        client.create_private_location(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &String) -> Result<PrivateLocation, ApiError> {
        client.get_private_location(id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &String,
        remote: &PrivateLocation,
    ) -> Result<PrivateLocation, ApiError> {
        client.update_private_location(id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &String) -> Result<(), ApiError> {
        client.delete_private_location(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::PrivateLocationKey;

    fn remote_with_keys() -> PrivateLocation {
        PrivateLocation {
            id: "pl-1".to_string(),
            name: "Office".to_string(),
            slug_name: "office".to_string(),
            icon: Some("location".to_string()),
            keys: vec![PrivateLocationKey {
                id: "k-1".to_string(),
                raw_key: "pl_raw_key".to_string(),
                masked_key: "pl_...key".to_string(),
            }],
        }
    }

    #[test]
    fn test_keys_only_taken_on_create() {
        let mut model = PrivateLocationModel::default();
        model
            .refresh(&remote_with_keys(), RefreshMode::Created)
            .unwrap();
        assert_eq!(model.keys, vec!["pl_raw_key".to_string()]);

        let mut later = remote_with_keys();
        later.keys[0].raw_key = String::new();
        model.refresh(&later, RefreshMode::Loaded).unwrap();
        assert_eq!(model.keys, vec!["pl_raw_key".to_string()]);
    }

    #[test]
    fn test_round_trip() {
        let model = PrivateLocationModel {
            id: "pl-1".to_string(),
            name: "Office".to_string(),
            slug_name: "office".to_string(),
            icon: Some("location".to_string()),
            keys: Vec::new(),
        };

        let mut remote = PrivateLocation::default();
        model.render(&mut remote).unwrap();

        let mut refreshed = PrivateLocationModel::default();
        refreshed.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }
}
