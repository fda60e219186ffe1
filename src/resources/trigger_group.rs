use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::common::refresh_id;
use super::ManagedResource;
use crate::api::models::TriggerGroup;
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{parse_numeric_id, InteropResult, Refresh, RefreshMode, Render};
use crate::schema::{Attribute, Schema};

/// `checkly_trigger_group`: a URL that runs every check in a group.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerGroupResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerGroupModel {
    pub id: String,
    pub group_id: i64,
    pub token: String,
    pub url: String,
}

impl Refresh<TriggerGroup> for TriggerGroupModel {
    fn refresh(&mut self, remote: &TriggerGroup, mode: RefreshMode) -> InteropResult<()> {
        refresh_id(&mut self.id, remote.group_id.to_string(), mode);
        self.group_id = remote.group_id;
        self.token = remote.token.clone();
        self.url = remote.url.clone();
        Ok(())
    }
}

impl Render<TriggerGroup> for TriggerGroupModel {
    fn render(&self, remote: &mut TriggerGroup) -> InteropResult<()> {
        remote.group_id = self.group_id;
        remote.token = self.token.clone();
        remote.url = self.url.clone();
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for TriggerGroupResource {
    type Remote = TriggerGroup;
    type Model = TriggerGroupModel;
    type Id = i64;

    const TYPE_NAME: &'static str = "checkly_trigger_group";
    const DISPLAY_NAME: &'static str = "Group Trigger";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A URL that triggers a run of every check in a group.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "group_id",
                Attribute::required_int64()
                    .with_force_new()
                    .with_description("The ID of the check group to trigger."),
            )
            .with_attribute("token", Attribute::computed_string().sensitive())
            .with_attribute("url", Attribute::computed_string())
    }

    fn parse_id(raw: &str) -> InteropResult<i64> {
        parse_numeric_id(raw, "id")
    }

    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &TriggerGroup,
    ) -> Result<TriggerGroup, ApiError> {
        client.create_trigger_group(remote.group_id).await
    }

    async fn get(&self, client: &ChecklyClient, id: &i64) -> Result<TriggerGroup, ApiError> {
        client.get_trigger_group(*id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &i64,
        _remote: &TriggerGroup,
    ) -> Result<TriggerGroup, ApiError> {
        client.get_trigger_group(*id).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &i64) -> Result<(), ApiError> {
        client.delete_trigger_group(*id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::resources::test_support::client;
    use crate::resources::{Controller, ResourceController};
    use reqwest::Method;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let model = TriggerGroupModel {
            id: "15".to_string(),
            group_id: 15,
            token: "tok".to_string(),
            url: "https://api.checklyhq.com/check-groups/15/trigger/tok".to_string(),
        };

        let mut remote = TriggerGroup::default();
        model.render(&mut remote).unwrap();

        let mut refreshed = TriggerGroupModel::default();
        refreshed.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }

    #[tokio::test]
    async fn test_create_posts_to_group_path() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::POST && req.path == "/v1/triggers/check-groups/15"
            })
            .times(1)
            .returning(|_| Ok(Some(json!({"id": 3, "groupId": 15, "token": "t", "url": "u"}))));

        let state = Controller::new(TriggerGroupResource)
            .create(&client(mock), json!({"group_id": 15}))
            .await
            .unwrap();

        assert_eq!(state["id"], "15");
        assert_eq!(state["token"], "t");
    }
}
