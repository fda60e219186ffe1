use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::common::refresh_id;
use super::ManagedResource;
use crate::api::models::TriggerCheck;
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{InteropResult, Refresh, RefreshMode, Render};
use crate::schema::{Attribute, Schema};

/// `checkly_trigger_check`: a URL that starts a check run.
///
/// Triggers are keyed by their check, so the check ID is also the resource
/// ID. There is nothing to update remotely; an update re-reads the trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerCheckResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerCheckModel {
    pub id: String,
    pub check_id: String,
    pub token: String,
    pub url: String,
}

impl Refresh<TriggerCheck> for TriggerCheckModel {
    fn refresh(&mut self, remote: &TriggerCheck, mode: RefreshMode) -> InteropResult<()> {
        refresh_id(&mut self.id, remote.check_id.clone(), mode);
        self.check_id = remote.check_id.clone();
        self.token = remote.token.clone();
        self.url = remote.url.clone();
        Ok(())
    }
}

impl Render<TriggerCheck> for TriggerCheckModel {
    fn render(&self, remote: &mut TriggerCheck) -> InteropResult<()> {
        remote.check_id = self.check_id.clone();
        remote.token = self.token.clone();
        remote.url = self.url.clone();
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for TriggerCheckResource {
    type Remote = TriggerCheck;
    type Model = TriggerCheckModel;
    type Id = String;

    const TYPE_NAME: &'static str = "checkly_trigger_check";
    const DISPLAY_NAME: &'static str = "Check Trigger";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A URL that triggers a run of a single check.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "check_id",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("The ID of the check to trigger."),
            )
            .with_attribute("token", Attribute::computed_string().sensitive())
            .with_attribute(
                "url",
                Attribute::computed_string().with_description("POST to this URL to start a run."),
            )
    }

    fn parse_id(raw: &str) -> InteropResult<String> {
        super::string_id(raw)
    }

    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &TriggerCheck,
    ) -> Result<TriggerCheck, ApiError> {
        client.create_trigger_check(&remote.check_id).await
    }

    async fn get(&self, client: &ChecklyClient, id: &String) -> Result<TriggerCheck, ApiError> {
        client.get_trigger_check(id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &String,
        _remote: &TriggerCheck,
    ) -> Result<TriggerCheck, ApiError> {
        client.get_trigger_check(id).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &String) -> Result<(), ApiError> {
        client.delete_trigger_check(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::interop::UNKNOWN;
    use crate::resources::test_support::client;
    use crate::resources::{Controller, ResourceController};
    use reqwest::Method;
    use serde_json::json;

    fn trigger_response() -> serde_json::Value {
        json!({
            "id": 77,
            "checkId": "c-1",
            "token": "abc",
            "url": "https://api.checklyhq.com/checks/c-1/trigger/abc"
        })
    }

    #[test]
    fn test_round_trip() {
        let model = TriggerCheckModel {
            id: "c-1".to_string(),
            check_id: "c-1".to_string(),
            token: "abc".to_string(),
            url: "https://api.checklyhq.com/checks/c-1/trigger/abc".to_string(),
        };

        let mut remote = TriggerCheck::default();
        model.render(&mut remote).unwrap();
        let wire = serde_json::to_value(&remote).unwrap();
        assert_eq!(wire["checkId"], "c-1");
        let decoded: TriggerCheck = serde_json::from_value(wire).unwrap();

        let mut refreshed = TriggerCheckModel::default();
        refreshed.refresh(&decoded, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }

    #[tokio::test]
    async fn test_create_fills_computed_fields() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::POST && req.path == "/v1/triggers/checks/c-1")
            .times(1)
            .returning(|_| Ok(Some(trigger_response())));

        let controller = Controller::new(TriggerCheckResource);
        let state = controller
            .create(
                &client(mock),
                json!({"id": UNKNOWN, "check_id": "c-1", "token": UNKNOWN, "url": UNKNOWN}),
            )
            .await
            .unwrap();

        assert_eq!(state["id"], "c-1");
        assert_eq!(state["token"], "abc");
        assert_eq!(
            state["url"],
            "https://api.checklyhq.com/checks/c-1/trigger/abc"
        );
    }

    #[tokio::test]
    async fn test_update_rereads() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.path == "/v1/triggers/checks/c-1")
            .times(1)
            .returning(|_| Ok(Some(trigger_response())));

        let prior = json!({"id": "c-1", "check_id": "c-1", "token": "old", "url": "u"});
        let state = Controller::new(TriggerCheckResource)
            .update(&client(mock), prior.clone(), prior)
            .await
            .unwrap();

        assert_eq!(state["token"], "abc");
    }
}
