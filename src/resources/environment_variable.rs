use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{string_id, ManagedResource};
use crate::api::models::EnvironmentVariable;
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{InteropResult, Refresh, RefreshMode, Render};
use crate::schema::{Attribute, Schema, Validator};

/// `checkly_environment_variable`: an account-level variable.
///
/// The key doubles as the ID. Secret values are never returned by the API,
/// so the local value is kept for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentVariableResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentVariableModel {
    pub id: String,
    pub key: String,
    pub value: String,
    pub locked: bool,
    pub secret: bool,
}

impl Refresh<EnvironmentVariable> for EnvironmentVariableModel {
    fn refresh(&mut self, remote: &EnvironmentVariable, _mode: RefreshMode) -> InteropResult<()> {
        self.id = remote.key.clone();
        self.key = remote.key.clone();
        self.locked = remote.locked;
        self.secret = remote.secret;
        if !remote.secret {
            self.value = remote.value.clone();
        }
        Ok(())
    }
}

impl Render<EnvironmentVariable> for EnvironmentVariableModel {
    fn render(&self, remote: &mut EnvironmentVariable) -> InteropResult<()> {
        remote.key = self.key.clone();
        remote.value = self.value.clone();
        remote.locked = self.locked;
        remote.secret = self.secret;
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for EnvironmentVariableResource {
    type Remote = EnvironmentVariable;
    type Model = EnvironmentVariableModel;
    type Id = String;

    const TYPE_NAME: &'static str = "checkly_environment_variable";
    const DISPLAY_NAME: &'static str = "Environment Variable";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Environment variables available to all checks.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "key",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::not_empty()),
            )
            .with_attribute("value", Attribute::required_string().sensitive())
            .with_attribute(
                "locked",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "secret",
                Attribute::optional_bool()
                    .with_default(json!(false))
                    .with_description("Secret values are write-only and never shown again."),
            )
    }

    fn parse_id(raw: &str) -> InteropResult<String> {
        string_id(raw)
    }

    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &EnvironmentVariable,
    ) -> Result<EnvironmentVariable, ApiError> {
        client.create_environment_variable(remote).await
    }

    async fn get(
        &self,
        client: &ChecklyClient,
        id: &String,
    ) -> Result<EnvironmentVariable, ApiError> {
        client.get_environment_variable(id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &String,
        remote: &EnvironmentVariable,
    ) -> Result<EnvironmentVariable, ApiError> {
        client.update_environment_variable(id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &String) -> Result<(), ApiError> {
        client.delete_environment_variable(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::resources::test_support::client;
    use crate::resources::{Controller, ResourceController};
    use reqwest::Method;

    fn model(secret: bool) -> EnvironmentVariableModel {
        EnvironmentVariableModel {
            id: "API_TOKEN".to_string(),
            key: "API_TOKEN".to_string(),
            value: "s3cr3t".to_string(),
            locked: true,
            secret,
        }
    }

    #[test]
    fn test_round_trip() {
        let model = model(false);
        let mut remote = EnvironmentVariable::default();
        model.render(&mut remote).unwrap();

        let mut refreshed = EnvironmentVariableModel::default();
        refreshed.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }

    #[test]
    fn test_secret_value_is_not_overwritten() {
        let mut local = model(true);
        let remote = EnvironmentVariable {
            key: "API_TOKEN".to_string(),
            value: String::new(),
            locked: true,
            secret: true,
        };

        local.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(local.value, "s3cr3t");
    }

    #[test]
    fn test_plain_value_is_refreshed() {
        let mut local = model(false);
        let remote = EnvironmentVariable {
            key: "API_TOKEN".to_string(),
            value: "rotated".to_string(),
            ..Default::default()
        };

        local.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(local.value, "rotated");
    }

    #[tokio::test]
    async fn test_read_keeps_secret_in_state() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.path == "/v1/variables/API_TOKEN")
            .returning(|_| {
                Ok(Some(serde_json::json!({
                    "key": "API_TOKEN",
                    "value": "",
                    "locked": false,
                    "secret": true
                })))
            });

        let controller = Controller::new(EnvironmentVariableResource);
        let state = controller
            .read(
                &client(mock),
                serde_json::json!({
                    "id": "API_TOKEN",
                    "key": "API_TOKEN",
                    "value": "s3cr3t",
                    "locked": false,
                    "secret": true
                }),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(state["value"], "s3cr3t");
        assert_eq!(state["id"], "API_TOKEN");
    }
}
