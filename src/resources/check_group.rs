use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::{
    alert_channel_subscription_block, alert_channel_subscriptions, alert_settings,
    alert_settings_block, assertion_block, assertions, basic_auth, basic_auth_block,
    key_value_block, key_values, key_values_to_map, map_to_key_values, optional_string,
    present_basic_auth, refresh_id, retry_strategy, retry_strategy_block, sorted,
};
use super::{ManagedResource, LAST_UPDATED};
use crate::api::models::{ApiCheckDefaults, Group};
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{
    non_empty, parse_numeric_id, parse_optional_numeric_id, Gluer, InteropResult, Refresh,
    RefreshMode, Render,
};
use crate::schema::{Attribute, Block, BlockConstraint, NestedBlock, Schema, Validator};

/// `checkly_check_group`: shared settings for a set of checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckGroupResource;

fn api_check_defaults_block() -> Block {
    Block::new()
        .with_description("Defaults applied to every API check in the group.")
        .with_attribute(
            "url",
            Attribute::optional_string()
                .with_default(json!(""))
                .with_description("Base URL; checks can reference it as `{{GROUP_BASE_URL}}`."),
        )
        .with_attribute("headers", Attribute::optional_string_map())
        .with_attribute("query_parameters", Attribute::optional_string_map())
        .with_block("assertion", NestedBlock::set(assertion_block()))
        .with_block("basic_auth", NestedBlock::single(basic_auth_block()))
}

/// The nested `api_check_defaults` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCheckDefaultsModel {
    pub url: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub query_parameters: Option<BTreeMap<String, String>>,
    pub assertion: Value,
    pub basic_auth: Value,
}

impl Refresh<ApiCheckDefaults> for ApiCheckDefaultsModel {
    fn refresh(&mut self, remote: &ApiCheckDefaults, mode: RefreshMode) -> InteropResult<()> {
        self.url = remote.url.clone();
        self.headers = non_empty(&remote.headers).map(key_values_to_map);
        self.query_parameters = non_empty(&remote.query_parameters).map(key_values_to_map);
        self.assertion = assertions().refresh_set(non_empty(&remote.assertions), mode)?;
        self.basic_auth = basic_auth().refresh_object(
            &self.basic_auth,
            present_basic_auth(remote.basic_auth.as_ref()),
            mode,
        )?;
        Ok(())
    }
}

impl Render<ApiCheckDefaults> for ApiCheckDefaultsModel {
    fn render(&self, remote: &mut ApiCheckDefaults) -> InteropResult<()> {
        remote.url = self.url.clone();
        remote.headers = self
            .headers
            .as_ref()
            .map(map_to_key_values)
            .unwrap_or_default();
        remote.query_parameters = self
            .query_parameters
            .as_ref()
            .map(map_to_key_values)
            .unwrap_or_default();
        remote.assertions = assertions().render_set(&self.assertion)?;
        remote.basic_auth = basic_auth().render_object(&self.basic_auth)?;
        Ok(())
    }
}

fn api_check_defaults() -> Gluer<ApiCheckDefaults, ApiCheckDefaultsModel> {
    Gluer::new("api_check_defaults", &api_check_defaults_block())
}

/// Whether the remote defaults carry anything worth keeping in state.
fn present_defaults(defaults: Option<&ApiCheckDefaults>) -> Option<&ApiCheckDefaults> {
    defaults.filter(|d| {
        !d.url.is_empty()
            || !d.headers.is_empty()
            || !d.query_parameters.is_empty()
            || !d.assertions.is_empty()
            || present_basic_auth(d.basic_auth.as_ref()).is_some()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckGroupModel {
    pub id: String,
    pub name: String,
    pub concurrency: i64,
    pub activated: bool,
    pub muted: bool,
    pub locations: Vec<String>,
    pub private_locations: Vec<String>,
    pub tags: Vec<String>,
    pub double_check: bool,
    pub use_global_alert_settings: bool,
    pub runtime_id: Option<String>,
    pub setup_snippet_id: Option<i64>,
    pub teardown_snippet_id: Option<i64>,
    pub local_setup_script: Option<String>,
    pub local_teardown_script: Option<String>,
    pub api_check_defaults: Value,
    pub environment_variable: Value,
    pub retry_strategy: Value,
    pub alert_settings: Value,
    pub alert_channel_subscription: Value,
}

impl Refresh<Group> for CheckGroupModel {
    fn refresh(&mut self, remote: &Group, mode: RefreshMode) -> InteropResult<()> {
        let id = remote.id.map(|id| id.to_string()).unwrap_or_default();
        refresh_id(&mut self.id, id, mode);
        self.name = remote.name.clone();
        self.concurrency = remote.concurrency;
        self.activated = remote.activated;
        self.muted = remote.muted;
        self.locations = sorted(&remote.locations);
        self.private_locations = sorted(&remote.private_locations);
        self.tags = sorted(&remote.tags);
        self.double_check = remote.double_check;
        self.use_global_alert_settings = remote.use_global_alert_settings;
        self.runtime_id = remote.runtime_id.as_deref().and_then(optional_string);
        self.setup_snippet_id = remote.setup_snippet_id;
        self.teardown_snippet_id = remote.teardown_snippet_id;
        self.local_setup_script = remote.local_setup_script.as_deref().and_then(optional_string);
        self.local_teardown_script = remote
            .local_teardown_script
            .as_deref()
            .and_then(optional_string);
        self.api_check_defaults = api_check_defaults().refresh_object(
            &self.api_check_defaults,
            present_defaults(remote.api_check_defaults.as_ref()),
            mode,
        )?;
        self.environment_variable = key_values("environment_variable")
            .refresh_list(non_empty(&remote.environment_variables), mode)?;
        self.retry_strategy = retry_strategy().refresh_object(
            &self.retry_strategy,
            remote.retry_strategy.as_ref(),
            mode,
        )?;
        self.alert_settings = alert_settings().refresh_object(
            &self.alert_settings,
            remote.alert_settings.as_ref(),
            mode,
        )?;
        self.alert_channel_subscription = alert_channel_subscriptions()
            .refresh_list(non_empty(&remote.alert_channel_subscriptions), mode)?;
        Ok(())
    }
}

impl Render<Group> for CheckGroupModel {
    fn render(&self, remote: &mut Group) -> InteropResult<()> {
        remote.id = parse_optional_numeric_id(&self.id, "id")?;
        remote.name = self.name.clone();
        remote.concurrency = self.concurrency;
        remote.activated = self.activated;
        remote.muted = self.muted;
        remote.locations = self.locations.clone();
        remote.private_locations = self.private_locations.clone();
        remote.tags = self.tags.clone();
        remote.double_check = self.double_check;
        remote.use_global_alert_settings = self.use_global_alert_settings;
        remote.runtime_id = self.runtime_id.clone();
        remote.setup_snippet_id = self.setup_snippet_id;
        remote.teardown_snippet_id = self.teardown_snippet_id;
        remote.local_setup_script = self.local_setup_script.clone();
        remote.local_teardown_script = self.local_teardown_script.clone();
        remote.api_check_defaults = api_check_defaults().render_object(&self.api_check_defaults)?;
        remote.environment_variables =
            key_values("environment_variable").render_list(&self.environment_variable)?;
        remote.retry_strategy = retry_strategy().render_object(&self.retry_strategy)?;
        remote.alert_settings = alert_settings().render_object(&self.alert_settings)?;
        remote.alert_channel_subscriptions =
            alert_channel_subscriptions().render_list(&self.alert_channel_subscription)?;
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for CheckGroupResource {
    type Remote = Group;
    type Model = CheckGroupModel;
    type Id = i64;

    const TYPE_NAME: &'static str = "checkly_check_group";
    const DISPLAY_NAME: &'static str = "Check Group";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Check groups share configuration between checks.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "name",
                Attribute::required_string().with_validator(Validator::not_empty()),
            )
            .with_attribute(
                "concurrency",
                Attribute::required_int64()
                    .with_validator(Validator::int_at_least(1))
                    .with_description("Number of checks run at once when triggered."),
            )
            .with_attribute("activated", Attribute::required_bool())
            .with_attribute(
                "muted",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("locations", Attribute::optional_string_set())
            .with_attribute("private_locations", Attribute::optional_string_set())
            .with_attribute("tags", Attribute::optional_string_set())
            .with_attribute(
                "double_check",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "use_global_alert_settings",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("runtime_id", Attribute::optional_string())
            .with_attribute("setup_snippet_id", Attribute::optional_int64())
            .with_attribute("teardown_snippet_id", Attribute::optional_int64())
            .with_attribute("local_setup_script", Attribute::optional_string())
            .with_attribute("local_teardown_script", Attribute::optional_string())
            .with_attribute(LAST_UPDATED, Attribute::computed_string())
            .with_block(
                "api_check_defaults",
                NestedBlock::single(api_check_defaults_block()),
            )
            .with_block("environment_variable", NestedBlock::list(key_value_block()))
            .with_block("retry_strategy", NestedBlock::single(retry_strategy_block()))
            .with_block("alert_settings", NestedBlock::single(alert_settings_block()))
            .with_block(
                "alert_channel_subscription",
                NestedBlock::list(alert_channel_subscription_block()),
            )
            .with_constraint(BlockConstraint::conflicts_with(
                "local_setup_script",
                &["setup_snippet_id"],
            ))
            .with_constraint(BlockConstraint::conflicts_with(
                "local_teardown_script",
                &["teardown_snippet_id"],
            ))
    }

    fn parse_id(raw: &str) -> InteropResult<i64> {
        parse_numeric_id(raw, "id")
    }

    async fn create(&self, client: &ChecklyClient, remote: &Group) -> Result<Group, ApiError> {
        client.create_group(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &i64) -> Result<Group, ApiError> {
        client.get_group(*id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &i64,
        remote: &Group,
    ) -> Result<Group, ApiError> {
        client.update_group(*id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &i64) -> Result<(), ApiError> {
        client.delete_group(*id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Assertion, BasicAuth, KeyValue};
    use crate::validation::validate;

    fn full_model() -> CheckGroupModel {
        CheckGroupModel {
            id: "42".to_string(),
            name: "api".to_string(),
            concurrency: 3,
            activated: true,
            muted: false,
            locations: vec!["eu-west-1".to_string(), "us-east-1".to_string()],
            private_locations: Vec::new(),
            tags: vec!["prod".to_string()],
            double_check: true,
            use_global_alert_settings: false,
            runtime_id: Some("2024.02".to_string()),
            setup_snippet_id: Some(7),
            teardown_snippet_id: None,
            local_setup_script: Some("setup()".to_string()),
            local_teardown_script: None,
            api_check_defaults: json!({
                "url": "https://api.example.com",
                "headers": {"X-Team": "core"},
                "query_parameters": null,
                "assertion": [{
                    "source": "STATUS_CODE",
                    "property": null,
                    "comparison": "EQUALS",
                    "target": "200"
                }],
                "basic_auth": {"username": "admin", "password": "pw"}
            }),
            environment_variable: json!([{"key": "ENV", "value": "prod", "locked": false}]),
            retry_strategy: json!({
                "type": "FIXED",
                "base_backoff_seconds": 60,
                "max_retries": 2,
                "max_duration_seconds": 600,
                "same_region": true
            }),
            alert_settings: Value::Null,
            alert_channel_subscription: json!([{"channel_id": 9, "activated": true}]),
        }
    }

    #[test]
    fn test_round_trip() {
        let model = full_model();

        let mut remote = Group::default();
        model.render(&mut remote).unwrap();
        assert_eq!(remote.id, Some(42));

        let mut refreshed = CheckGroupModel::default();
        refreshed.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }

    #[test]
    fn test_api_check_defaults_on_the_wire() {
        let mut remote = Group::default();
        full_model().render(&mut remote).unwrap();

        let defaults = remote.api_check_defaults.unwrap();
        assert_eq!(
            defaults.headers,
            vec![KeyValue {
                key: "X-Team".to_string(),
                value: "core".to_string(),
                ..Default::default()
            }]
        );
        assert_eq!(
            defaults.assertions,
            vec![Assertion {
                source: "STATUS_CODE".to_string(),
                property: String::new(),
                comparison: "EQUALS".to_string(),
                target: "200".to_string(),
            }]
        );
        assert_eq!(
            defaults.basic_auth,
            Some(BasicAuth {
                username: "admin".to_string(),
                password: "pw".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_remote_defaults_stay_null() {
        let remote = Group {
            id: Some(1),
            api_check_defaults: Some(ApiCheckDefaults {
                basic_auth: Some(BasicAuth::default()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let mut model = CheckGroupModel::default();
        model.refresh(&remote, RefreshMode::Created).unwrap();
        assert_eq!(model.id, "1");
        assert_eq!(model.api_check_defaults, Value::Null);
        assert_eq!(model.environment_variable, Value::Null);
    }

    #[test]
    fn test_teardown_snippet_conflicts_with_local_script() {
        let diagnostics = validate(
            &CheckGroupResource.schema(),
            &json!({
                "name": "g",
                "concurrency": 2,
                "activated": true,
                "teardown_snippet_id": 9,
                "local_teardown_script": "cleanup()"
            }),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid Attribute Combination");
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("local_teardown_script")
        );
    }

    #[test]
    fn test_concurrency_must_be_positive() {
        let diagnostics = validate(
            &CheckGroupResource.schema(),
            &json!({"name": "g", "concurrency": 0, "activated": true}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("concurrency"));
    }
}
