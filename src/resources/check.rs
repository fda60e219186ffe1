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
use super::{string_id, ManagedResource, LAST_UPDATED};
use crate::api::models::{Check, Request};
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{
    is_unknown, non_empty, Gluer, InteropResult, Refresh, RefreshMode, Render,
};
use crate::schema::{
    Attribute, Block, BlockConstraint, Diagnostic, NestedBlock, Schema, Validator,
};

const CHECK_TYPES: [&str; 3] = ["API", "BROWSER", "MULTI_STEP"];
const FREQUENCIES: [i64; 13] = [0, 1, 2, 5, 10, 15, 30, 60, 120, 180, 360, 720, 1440];

/// `checkly_check`: an API, browser or multi-step check.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckResource;

fn request_block() -> Block {
    Block::new()
        .with_description("The HTTP request an API check performs.")
        .with_attribute(
            "method",
            Attribute::optional_string()
                .with_default(json!("GET"))
                .with_validator(Validator::one_of_strings(&[
                    "GET", "POST", "PUT", "HEAD", "DELETE", "PATCH",
                ])),
        )
        .with_attribute("url", Attribute::required_string())
        .with_attribute(
            "follow_redirects",
            Attribute::optional_bool().with_default(json!(true)),
        )
        .with_attribute(
            "skip_ssl",
            Attribute::optional_bool().with_default(json!(false)),
        )
        .with_attribute("body", Attribute::optional_string().with_default(json!("")))
        .with_attribute(
            "body_type",
            Attribute::optional_string()
                .with_default(json!("NONE"))
                .with_validator(Validator::one_of_strings(&[
                    "NONE", "JSON", "FORM", "RAW", "GRAPHQL",
                ])),
        )
        .with_attribute("headers", Attribute::optional_string_map())
        .with_attribute("query_parameters", Attribute::optional_string_map())
        .with_attribute(
            "ip_family",
            Attribute::optional_string()
                .with_default(json!("IPv4"))
                .with_validator(Validator::one_of_strings(&["IPv4", "IPv6"])),
        )
        .with_block("assertion", NestedBlock::set(assertion_block()))
        .with_block("basic_auth", NestedBlock::single(basic_auth_block()))
}

/// The nested `request` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestModel {
    pub method: String,
    pub url: String,
    pub follow_redirects: bool,
    pub skip_ssl: bool,
    pub body: String,
    pub body_type: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub query_parameters: Option<BTreeMap<String, String>>,
    pub ip_family: String,
    pub assertion: Value,
    pub basic_auth: Value,
}

impl Refresh<Request> for RequestModel {
    fn refresh(&mut self, remote: &Request, mode: RefreshMode) -> InteropResult<()> {
        self.method = remote.method.clone();
        self.url = remote.url.clone();
        self.follow_redirects = remote.follow_redirects;
        self.skip_ssl = remote.skip_ssl;
        self.body = remote.body.clone();
        self.body_type = remote.body_type.clone();
        self.headers = non_empty(&remote.headers).map(key_values_to_map);
        self.query_parameters = non_empty(&remote.query_parameters).map(key_values_to_map);
        self.ip_family = remote.ip_family.clone();
        self.assertion = assertions().refresh_set(non_empty(&remote.assertions), mode)?;
        self.basic_auth = basic_auth().refresh_object(
            &self.basic_auth,
            present_basic_auth(remote.basic_auth.as_ref()),
            mode,
        )?;
        Ok(())
    }
}

impl Render<Request> for RequestModel {
    fn render(&self, remote: &mut Request) -> InteropResult<()> {
        remote.method = self.method.clone();
        remote.url = self.url.clone();
        remote.follow_redirects = self.follow_redirects;
        remote.skip_ssl = self.skip_ssl;
        remote.body = self.body.clone();
        remote.body_type = self.body_type.clone();
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
        remote.ip_family = self.ip_family.clone();
        remote.assertions = assertions().render_set(&self.assertion)?;
        remote.basic_auth = basic_auth().render_object(&self.basic_auth)?;
        Ok(())
    }
}

fn request() -> Gluer<Request, RequestModel> {
    Gluer::new("request", &request_block())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckModel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub check_type: String,
    pub frequency: i64,
    pub frequency_offset: Option<i64>,
    pub activated: bool,
    pub muted: bool,
    pub should_fail: bool,
    pub run_parallel: bool,
    pub locations: Vec<String>,
    pub private_locations: Vec<String>,
    pub script: Option<String>,
    pub degraded_response_time: i64,
    pub max_response_time: i64,
    pub tags: Vec<String>,
    pub double_check: bool,
    pub use_global_alert_settings: bool,
    pub group_id: Option<i64>,
    pub group_order: Option<i64>,
    pub runtime_id: Option<String>,
    pub setup_snippet_id: Option<i64>,
    pub teardown_snippet_id: Option<i64>,
    pub local_setup_script: Option<String>,
    pub local_teardown_script: Option<String>,
    pub request: Value,
    pub environment_variable: Value,
    pub retry_strategy: Value,
    pub alert_settings: Value,
    pub alert_channel_subscription: Value,
}

impl Refresh<Check> for CheckModel {
    fn refresh(&mut self, remote: &Check, mode: RefreshMode) -> InteropResult<()> {
        refresh_id(&mut self.id, remote.id.clone(), mode);
        self.name = remote.name.clone();
        self.check_type = remote.check_type.clone();
        self.frequency = remote.frequency;
        self.frequency_offset = remote.frequency_offset;
        self.activated = remote.activated;
        self.muted = remote.muted;
        self.should_fail = remote.should_fail;
        self.run_parallel = remote.run_parallel;
        self.locations = sorted(&remote.locations);
        self.private_locations = sorted(&remote.private_locations);
        self.script = remote.script.as_deref().and_then(optional_string);
        self.degraded_response_time = remote.degraded_response_time;
        self.max_response_time = remote.max_response_time;
        self.tags = sorted(&remote.tags);
        self.double_check = remote.double_check;
        self.use_global_alert_settings = remote.use_global_alert_settings;
        self.group_id = remote.group_id;
        self.group_order = remote.group_order;
        self.runtime_id = remote.runtime_id.as_deref().and_then(optional_string);
        self.setup_snippet_id = remote.setup_snippet_id;
        self.teardown_snippet_id = remote.teardown_snippet_id;
        self.local_setup_script = remote.local_setup_script.as_deref().and_then(optional_string);
        self.local_teardown_script = remote
            .local_teardown_script
            .as_deref()
            .and_then(optional_string);

        // Browser checks come back with an empty request object.
        let remote_request = remote.request.as_ref().filter(|r| !r.url.is_empty());
        self.request = request().refresh_object(&self.request, remote_request, mode)?;

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

impl Render<Check> for CheckModel {
    fn render(&self, remote: &mut Check) -> InteropResult<()> {
        remote.id = self.id.clone();
        remote.name = self.name.clone();
        remote.check_type = self.check_type.clone();
        remote.frequency = self.frequency;
        remote.frequency_offset = self.frequency_offset;
        remote.activated = self.activated;
        remote.muted = self.muted;
        remote.should_fail = self.should_fail;
        remote.run_parallel = self.run_parallel;
        remote.locations = self.locations.clone();
        remote.private_locations = self.private_locations.clone();
        remote.script = self.script.clone();
        remote.degraded_response_time = self.degraded_response_time;
        remote.max_response_time = self.max_response_time;
        remote.tags = self.tags.clone();
        remote.double_check = self.double_check;
        remote.use_global_alert_settings = self.use_global_alert_settings;
        remote.group_id = self.group_id;
        remote.group_order = self.group_order;
        remote.runtime_id = self.runtime_id.clone();
        remote.setup_snippet_id = self.setup_snippet_id;
        remote.teardown_snippet_id = self.teardown_snippet_id;
        remote.local_setup_script = self.local_setup_script.clone();
        remote.local_teardown_script = self.local_teardown_script.clone();
        remote.request = request().render_object(&self.request)?;
        remote.environment_variables =
            key_values("environment_variable").render_list(&self.environment_variable)?;
        remote.retry_strategy = retry_strategy().render_object(&self.retry_strategy)?;
        remote.alert_settings = alert_settings().render_object(&self.alert_settings)?;
        remote.alert_channel_subscriptions =
            alert_channel_subscriptions().render_list(&self.alert_channel_subscription)?;
        Ok(())
    }
}

fn response_time(default: i64) -> Attribute {
    Attribute::optional_int64()
        .with_default(json!(default))
        .with_validator(Validator::int_between(0, 30_000))
}

#[async_trait]
impl ManagedResource for CheckResource {
    type Remote = Check;
    type Model = CheckModel;
    type Id = String;

    const TYPE_NAME: &'static str = "checkly_check";
    const DISPLAY_NAME: &'static str = "Check";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Checks monitor an API endpoint or run a browser script.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "name",
                Attribute::required_string().with_validator(Validator::not_empty()),
            )
            .with_attribute(
                "type",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::one_of_strings(&CHECK_TYPES)),
            )
            .with_attribute(
                "frequency",
                Attribute::required_int64()
                    .with_validator(Validator::one_of_ints(&FREQUENCIES))
                    .with_description("Minutes between runs."),
            )
            .with_attribute(
                "frequency_offset",
                Attribute::optional_int64()
                    .with_description("Sub-minute frequency in seconds when frequency is 0."),
            )
            .with_attribute("activated", Attribute::required_bool())
            .with_attribute(
                "muted",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "should_fail",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "run_parallel",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("locations", Attribute::optional_string_set())
            .with_attribute("private_locations", Attribute::optional_string_set())
            .with_attribute(
                "script",
                Attribute::optional_string()
                    .with_description("Script run by browser and multi-step checks."),
            )
            .with_attribute("degraded_response_time", response_time(15_000))
            .with_attribute("max_response_time", response_time(30_000))
            .with_attribute("tags", Attribute::optional_string_set())
            .with_attribute(
                "double_check",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "use_global_alert_settings",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("group_id", Attribute::optional_int64())
            .with_attribute("group_order", Attribute::optional_int64())
            .with_attribute("runtime_id", Attribute::optional_string())
            .with_attribute("setup_snippet_id", Attribute::optional_int64())
            .with_attribute("teardown_snippet_id", Attribute::optional_int64())
            .with_attribute("local_setup_script", Attribute::optional_string())
            .with_attribute("local_teardown_script", Attribute::optional_string())
            .with_attribute(LAST_UPDATED, Attribute::computed_string())
            .with_block("request", NestedBlock::single(request_block()))
            .with_block("environment_variable", NestedBlock::list(key_value_block()))
            .with_block("retry_strategy", NestedBlock::single(retry_strategy_block()))
            .with_block("alert_settings", NestedBlock::single(alert_settings_block()))
            .with_block(
                "alert_channel_subscription",
                NestedBlock::list(alert_channel_subscription_block()),
            )
            .with_constraint(BlockConstraint::conflicts_with("script", &["request"]))
            .with_constraint(BlockConstraint::conflicts_with(
                "local_setup_script",
                &["setup_snippet_id"],
            ))
            .with_constraint(BlockConstraint::conflicts_with(
                "local_teardown_script",
                &["teardown_snippet_id"],
            ))
    }

    fn parse_id(raw: &str) -> InteropResult<String> {
        string_id(raw)
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let Some(check_type) = config.get("type").filter(|t| !is_unknown(t)) else {
            return Vec::new();
        };

        let has_request = config.get("request").is_some_and(|r| !r.is_null());
        let has_script = config
            .get("script")
            .is_some_and(|s| !s.is_null() && s.as_str() != Some(""));

        match check_type.as_str() {
            Some("API") if !has_request => vec![Diagnostic::error("Missing request")
                .with_detail("API checks require a request block")
                .with_attribute("request")],
            Some(kind @ ("BROWSER" | "MULTI_STEP")) if !has_script => {
                let label = if kind == "BROWSER" { "Browser" } else { "Multi-step" };
                vec![Diagnostic::error("Missing script")
                    .with_detail(format!("{} checks require a script", label))
                    .with_attribute("script")]
            },
            _ => Vec::new(),
        }
    }

    async fn create(&self, client: &ChecklyClient, remote: &Check) -> Result<Check, ApiError> {
        client.create_check(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &String) -> Result<Check, ApiError> {
        client.get_check(id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &String,
        remote: &Check,
    ) -> Result<Check, ApiError> {
        client.update_check(id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &String) -> Result<(), ApiError> {
        client.delete_check(id).await
    }
}
