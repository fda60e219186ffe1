//! Nested blocks shared by several resources.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::models::{
    AlertChannelSubscription, AlertSettings, Assertion, BasicAuth, KeyValue,
    ParallelRunFailureThreshold, Reminders, RetryStrategy, RunBasedEscalation,
    TimeBasedEscalation,
};
use crate::interop::{Gluer, InteropResult, Refresh, RefreshMode, Render};
use crate::schema::{Attribute, Block, NestedBlock, Validator};

/// `Some(value)` unless `value` is empty.
pub(crate) fn optional_string(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Take the remote ID on creation, or when the local one was never set.
///
/// Afterwards the local ID is authoritative.
pub(crate) fn refresh_id(local: &mut String, remote: String, mode: RefreshMode) {
    if mode.is_created() || local.is_empty() {
        *local = remote;
    }
}

/// A sorted copy of `items`, for attributes the API returns in any order.
pub(crate) fn sorted(items: &[String]) -> Vec<String> {
    let mut items = items.to_vec();
    items.sort();
    items
}

// Key/value pairs

pub(crate) fn key_value_block() -> Block {
    Block::new()
        .with_attribute("key", Attribute::required_string())
        .with_attribute("value", Attribute::required_string())
        .with_attribute(
            "locked",
            Attribute::optional_bool().with_default(json!(false)),
        )
}

/// A key/value block such as `environment_variable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValueModel {
    pub key: String,
    pub value: String,
    pub locked: bool,
}

impl Refresh<KeyValue> for KeyValueModel {
    fn refresh(&mut self, remote: &KeyValue, _mode: RefreshMode) -> InteropResult<()> {
        self.key = remote.key.clone();
        self.value = remote.value.clone();
        self.locked = remote.locked;
        Ok(())
    }
}

impl Render<KeyValue> for KeyValueModel {
    fn render(&self, remote: &mut KeyValue) -> InteropResult<()> {
        remote.key = self.key.clone();
        remote.value = self.value.clone();
        remote.locked = self.locked;
        Ok(())
    }
}

pub(crate) fn key_values(name: &str) -> Gluer<KeyValue, KeyValueModel> {
    Gluer::new(name, &key_value_block())
}

/// Convert a string map attribute to the API's key/value list.
pub(crate) fn map_to_key_values(map: &std::collections::BTreeMap<String, String>) -> Vec<KeyValue> {
    map.iter()
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: value.clone(),
            ..Default::default()
        })
        .collect()
}

/// Convert the API's key/value list to a string map attribute.
pub(crate) fn key_values_to_map(pairs: &[KeyValue]) -> std::collections::BTreeMap<String, String> {
    pairs
        .iter()
        .map(|kv| (kv.key.clone(), kv.value.clone()))
        .collect()
}

// Assertions

pub(crate) fn assertion_block() -> Block {
    Block::new()
        .with_attribute(
            "source",
            Attribute::required_string().with_validator(Validator::one_of_strings(&[
                "STATUS_CODE",
                "JSON_BODY",
                "HEADERS",
                "TEXT_BODY",
                "RESPONSE_TIME",
            ])),
        )
        .with_attribute("property", Attribute::optional_string())
        .with_attribute(
            "comparison",
            Attribute::required_string().with_validator(Validator::one_of_strings(&[
                "EQUALS",
                "NOT_EQUALS",
                "HAS_KEY",
                "NOT_HAS_KEY",
                "HAS_VALUE",
                "NOT_HAS_VALUE",
                "IS_EMPTY",
                "NOT_EMPTY",
                "GREATER_THAN",
                "LESS_THAN",
                "CONTAINS",
                "NOT_CONTAINS",
                "IS_NULL",
                "NOT_NULL",
            ])),
        )
        .with_attribute("target", Attribute::optional_string())
}

/// An `assertion` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertionModel {
    pub source: String,
    pub property: Option<String>,
    pub comparison: String,
    pub target: Option<String>,
}

impl Refresh<Assertion> for AssertionModel {
    fn refresh(&mut self, remote: &Assertion, _mode: RefreshMode) -> InteropResult<()> {
        self.source = remote.source.clone();
        self.property = optional_string(&remote.property);
        self.comparison = remote.comparison.clone();
        self.target = optional_string(&remote.target);
        Ok(())
    }
}

impl Render<Assertion> for AssertionModel {
    fn render(&self, remote: &mut Assertion) -> InteropResult<()> {
        remote.source = self.source.clone();
        remote.property = self.property.clone().unwrap_or_default();
        remote.comparison = self.comparison.clone();
        remote.target = self.target.clone().unwrap_or_default();
        Ok(())
    }
}

pub(crate) fn assertions() -> Gluer<Assertion, AssertionModel> {
    Gluer::new("assertion", &assertion_block())
}

// Basic auth

pub(crate) fn basic_auth_block() -> Block {
    Block::new()
        .with_attribute("username", Attribute::required_string())
        .with_attribute("password", Attribute::required_string().sensitive())
}

/// A `basic_auth` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAuthModel {
    pub username: String,
    pub password: String,
}

impl Refresh<BasicAuth> for BasicAuthModel {
    fn refresh(&mut self, remote: &BasicAuth, _mode: RefreshMode) -> InteropResult<()> {
        self.username = remote.username.clone();
        self.password = remote.password.clone();
        Ok(())
    }
}

impl Render<BasicAuth> for BasicAuthModel {
    fn render(&self, remote: &mut BasicAuth) -> InteropResult<()> {
        remote.username = self.username.clone();
        remote.password = self.password.clone();
        Ok(())
    }
}

pub(crate) fn basic_auth() -> Gluer<BasicAuth, BasicAuthModel> {
    Gluer::new("basic_auth", &basic_auth_block())
}

/// The API reports "no credentials" as an empty pair rather than omitting it.
pub(crate) fn present_basic_auth(auth: Option<&BasicAuth>) -> Option<&BasicAuth> {
    auth.filter(|a| !a.username.is_empty() || !a.password.is_empty())
}

// Retry strategy

pub(crate) fn retry_strategy_block() -> Block {
    Block::new()
        .with_attribute(
            "type",
            Attribute::required_string().with_validator(Validator::one_of_strings(&[
                "FIXED",
                "LINEAR",
                "EXPONENTIAL",
                "NO_RETRIES",
            ])),
        )
        .with_attribute(
            "base_backoff_seconds",
            Attribute::optional_int64().with_default(json!(60)),
        )
        .with_attribute(
            "max_retries",
            Attribute::optional_int64()
                .with_default(json!(2))
                .with_validator(Validator::int_between(1, 10)),
        )
        .with_attribute(
            "max_duration_seconds",
            Attribute::optional_int64()
                .with_default(json!(600))
                .with_validator(Validator::int_between(0, 600)),
        )
        .with_attribute(
            "same_region",
            Attribute::optional_bool().with_default(json!(true)),
        )
}

/// A `retry_strategy` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryStrategyModel {
    #[serde(rename = "type")]
    pub strategy_type: String,
    pub base_backoff_seconds: i64,
    pub max_retries: i64,
    pub max_duration_seconds: i64,
    pub same_region: bool,
}

impl Refresh<RetryStrategy> for RetryStrategyModel {
    fn refresh(&mut self, remote: &RetryStrategy, _mode: RefreshMode) -> InteropResult<()> {
        self.strategy_type = remote.strategy_type.clone();
        self.base_backoff_seconds = remote.base_backoff_seconds;
        self.max_retries = remote.max_retries;
        self.max_duration_seconds = remote.max_duration_seconds;
        self.same_region = remote.same_region;
        Ok(())
    }
}

impl Render<RetryStrategy> for RetryStrategyModel {
    fn render(&self, remote: &mut RetryStrategy) -> InteropResult<()> {
        remote.strategy_type = self.strategy_type.clone();
        remote.base_backoff_seconds = self.base_backoff_seconds;
        remote.max_retries = self.max_retries;
        remote.max_duration_seconds = self.max_duration_seconds;
        remote.same_region = self.same_region;
        Ok(())
    }
}

pub(crate) fn retry_strategy() -> Gluer<RetryStrategy, RetryStrategyModel> {
    Gluer::new("retry_strategy", &retry_strategy_block())
}

// Alert settings

fn run_based_escalation_block() -> Block {
    Block::new().with_attribute(
        "failed_run_threshold",
        Attribute::required_int64().with_validator(Validator::one_of_ints(&[1, 2, 3, 4, 5])),
    )
}

fn time_based_escalation_block() -> Block {
    Block::new().with_attribute(
        "minutes_failing_threshold",
        Attribute::required_int64().with_validator(Validator::one_of_ints(&[5, 10, 15, 30])),
    )
}

fn reminders_block() -> Block {
    Block::new()
        .with_attribute(
            "amount",
            Attribute::optional_int64()
                .with_default(json!(0))
                .with_validator(Validator::one_of_ints(&[0, 1, 2, 3, 4, 5, 100000])),
        )
        .with_attribute(
            "interval",
            Attribute::optional_int64()
                .with_default(json!(5))
                .with_validator(Validator::one_of_ints(&[5, 10, 15, 30])),
        )
}

fn parallel_run_failure_threshold_block() -> Block {
    Block::new()
        .with_attribute(
            "enabled",
            Attribute::optional_bool().with_default(json!(false)),
        )
        .with_attribute(
            "percentage",
            Attribute::optional_int64()
                .with_default(json!(10))
                .with_validator(Validator::one_of_ints(&[
                    10, 20, 30, 40, 50, 60, 70, 80, 90, 100,
                ])),
        )
}

pub(crate) fn alert_settings_block() -> Block {
    Block::new()
        .with_attribute(
            "escalation_type",
            Attribute::optional_string()
                .with_default(json!("RUN_BASED"))
                .with_validator(Validator::one_of_strings(&["RUN_BASED", "TIME_BASED"])),
        )
        .with_block(
            "run_based_escalation",
            NestedBlock::single(run_based_escalation_block()),
        )
        .with_block(
            "time_based_escalation",
            NestedBlock::single(time_based_escalation_block()),
        )
        .with_block("reminders", NestedBlock::single(reminders_block()))
        .with_block(
            "parallel_run_failure_threshold",
            NestedBlock::single(parallel_run_failure_threshold_block()),
        )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunBasedEscalationModel {
    pub failed_run_threshold: i64,
}

impl Refresh<RunBasedEscalation> for RunBasedEscalationModel {
    fn refresh(&mut self, remote: &RunBasedEscalation, _mode: RefreshMode) -> InteropResult<()> {
        self.failed_run_threshold = remote.failed_run_threshold;
        Ok(())
    }
}

impl Render<RunBasedEscalation> for RunBasedEscalationModel {
    fn render(&self, remote: &mut RunBasedEscalation) -> InteropResult<()> {
        remote.failed_run_threshold = self.failed_run_threshold;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeBasedEscalationModel {
    pub minutes_failing_threshold: i64,
}

impl Refresh<TimeBasedEscalation> for TimeBasedEscalationModel {
    fn refresh(&mut self, remote: &TimeBasedEscalation, _mode: RefreshMode) -> InteropResult<()> {
        self.minutes_failing_threshold = remote.minutes_failing_threshold;
        Ok(())
    }
}

impl Render<TimeBasedEscalation> for TimeBasedEscalationModel {
    fn render(&self, remote: &mut TimeBasedEscalation) -> InteropResult<()> {
        remote.minutes_failing_threshold = self.minutes_failing_threshold;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersModel {
    pub amount: i64,
    pub interval: i64,
}

impl Refresh<Reminders> for RemindersModel {
    fn refresh(&mut self, remote: &Reminders, _mode: RefreshMode) -> InteropResult<()> {
        self.amount = remote.amount;
        self.interval = remote.interval;
        Ok(())
    }
}

impl Render<Reminders> for RemindersModel {
    fn render(&self, remote: &mut Reminders) -> InteropResult<()> {
        remote.amount = self.amount;
        remote.interval = self.interval;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelRunFailureThresholdModel {
    pub enabled: bool,
    pub percentage: i64,
}

impl Refresh<ParallelRunFailureThreshold> for ParallelRunFailureThresholdModel {
    fn refresh(
        &mut self,
        remote: &ParallelRunFailureThreshold,
        _mode: RefreshMode,
    ) -> InteropResult<()> {
        self.enabled = remote.enabled;
        self.percentage = remote.percentage;
        Ok(())
    }
}

impl Render<ParallelRunFailureThreshold> for ParallelRunFailureThresholdModel {
    fn render(&self, remote: &mut ParallelRunFailureThreshold) -> InteropResult<()> {
        remote.enabled = self.enabled;
        remote.percentage = self.percentage;
        Ok(())
    }
}

/// An `alert_settings` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettingsModel {
    pub escalation_type: Option<String>,
    pub run_based_escalation: Value,
    pub time_based_escalation: Value,
    pub reminders: Value,
    pub parallel_run_failure_threshold: Value,
}

impl AlertSettingsModel {
    fn run_based() -> Gluer<RunBasedEscalation, RunBasedEscalationModel> {
        Gluer::new("run_based_escalation", &run_based_escalation_block())
    }

    fn time_based() -> Gluer<TimeBasedEscalation, TimeBasedEscalationModel> {
        Gluer::new("time_based_escalation", &time_based_escalation_block())
    }

    fn reminders() -> Gluer<Reminders, RemindersModel> {
        Gluer::new("reminders", &reminders_block())
    }

    fn parallel_threshold() -> Gluer<ParallelRunFailureThreshold, ParallelRunFailureThresholdModel>
    {
        Gluer::new(
            "parallel_run_failure_threshold",
            &parallel_run_failure_threshold_block(),
        )
    }
}

impl Refresh<AlertSettings> for AlertSettingsModel {
    fn refresh(&mut self, remote: &AlertSettings, mode: RefreshMode) -> InteropResult<()> {
        self.escalation_type = optional_string(&remote.escalation_type);
        self.run_based_escalation = Self::run_based().refresh_object(
            &self.run_based_escalation,
            remote.run_based_escalation.as_ref(),
            mode,
        )?;
        self.time_based_escalation = Self::time_based().refresh_object(
            &self.time_based_escalation,
            remote.time_based_escalation.as_ref(),
            mode,
        )?;
        self.reminders =
            Self::reminders().refresh_object(&self.reminders, remote.reminders.as_ref(), mode)?;
        self.parallel_run_failure_threshold = Self::parallel_threshold().refresh_object(
            &self.parallel_run_failure_threshold,
            remote.parallel_run_failure_threshold.as_ref(),
            mode,
        )?;
        Ok(())
    }
}

impl Render<AlertSettings> for AlertSettingsModel {
    fn render(&self, remote: &mut AlertSettings) -> InteropResult<()> {
        remote.escalation_type = self.escalation_type.clone().unwrap_or_default();
        remote.run_based_escalation = Self::run_based().render_object(&self.run_based_escalation)?;
        remote.time_based_escalation =
            Self::time_based().render_object(&self.time_based_escalation)?;
        remote.reminders = Self::reminders().render_object(&self.reminders)?;
        remote.parallel_run_failure_threshold =
            Self::parallel_threshold().render_object(&self.parallel_run_failure_threshold)?;
        Ok(())
    }
}

pub(crate) fn alert_settings() -> Gluer<AlertSettings, AlertSettingsModel> {
    Gluer::new("alert_settings", &alert_settings_block())
}

// Alert channel subscriptions

pub(crate) fn alert_channel_subscription_block() -> Block {
    Block::new()
        .with_attribute("channel_id", Attribute::required_int64())
        .with_attribute("activated", Attribute::required_bool())
}

/// An `alert_channel_subscription` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertChannelSubscriptionModel {
    pub channel_id: i64,
    pub activated: bool,
}

impl Refresh<AlertChannelSubscription> for AlertChannelSubscriptionModel {
    fn refresh(
        &mut self,
        remote: &AlertChannelSubscription,
        _mode: RefreshMode,
    ) -> InteropResult<()> {
        self.channel_id = remote.channel_id;
        self.activated = remote.activated;
        Ok(())
    }
}

impl Render<AlertChannelSubscription> for AlertChannelSubscriptionModel {
    fn render(&self, remote: &mut AlertChannelSubscription) -> InteropResult<()> {
        remote.channel_id = self.channel_id;
        remote.activated = self.activated;
        Ok(())
    }
}

pub(crate) fn alert_channel_subscriptions(
) -> Gluer<AlertChannelSubscription, AlertChannelSubscriptionModel> {
    Gluer::new(
        "alert_channel_subscription",
        &alert_channel_subscription_block(),
    )
}
