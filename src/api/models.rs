//! Remote representations of Checkly API objects.
//!
//! Field names follow the API's camelCase JSON. All structs default missing
//! fields so partial responses decode.

use serde::{Deserialize, Serialize};

/// A key/value pair used for headers, query parameters and variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValue {
    /// Key.
    pub key: String,
    /// Value.
    pub value: String,
    /// Locked values are hidden in the Checkly UI.
    pub locked: bool,
    /// Secret values are never returned by the API.
    pub secret: bool,
}

/// An API check assertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assertion {
    /// Source of the asserted value (`STATUS_CODE`, `JSON_BODY`, ...).
    pub source: String,
    /// Property path within the source.
    pub property: String,
    /// Comparison operator.
    pub comparison: String,
    /// Expected value.
    pub target: String,
}

/// HTTP basic authentication credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicAuth {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// The HTTP request an API check performs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Request {
    /// HTTP method.
    pub method: String,
    /// Target URL.
    pub url: String,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Skip TLS certificate verification.
    pub skip_ssl: bool,
    /// Request body.
    pub body: String,
    /// Body encoding (`NONE`, `JSON`, `FORM`, `RAW`, `GRAPHQL`).
    pub body_type: String,
    /// Request headers.
    pub headers: Vec<KeyValue>,
    /// Query parameters.
    pub query_parameters: Vec<KeyValue>,
    /// Response assertions.
    pub assertions: Vec<Assertion>,
    /// Basic auth credentials.
    pub basic_auth: Option<BasicAuth>,
    /// `IPv4` or `IPv6`.
    pub ip_family: String,
}

/// How failed runs are retried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryStrategy {
    /// `FIXED`, `LINEAR`, `EXPONENTIAL` or `NO_RETRIES`.
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// Initial backoff.
    pub base_backoff_seconds: i64,
    /// Maximum number of retries.
    pub max_retries: i64,
    /// Upper bound on total retry time.
    pub max_duration_seconds: i64,
    /// Retry in the same region.
    pub same_region: bool,
}

/// Escalate after a number of failed runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunBasedEscalation {
    /// Failed runs before alerting.
    pub failed_run_threshold: i64,
}

/// Escalate after failing for some time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeBasedEscalation {
    /// Minutes failing before alerting.
    pub minutes_failing_threshold: i64,
}

/// Repeated alert reminders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reminders {
    /// Number of reminders.
    pub amount: i64,
    /// Minutes between reminders.
    pub interval: i64,
}

/// Alert when a share of parallel runs fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParallelRunFailureThreshold {
    /// Whether the threshold applies.
    pub enabled: bool,
    /// Failure percentage.
    pub percentage: i64,
}

/// Alerting behaviour of a check or group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertSettings {
    /// `RUN_BASED` or `TIME_BASED`.
    pub escalation_type: String,
    /// Run-based escalation settings.
    pub run_based_escalation: Option<RunBasedEscalation>,
    /// Time-based escalation settings.
    pub time_based_escalation: Option<TimeBasedEscalation>,
    /// Reminder settings.
    pub reminders: Option<Reminders>,
    /// Parallel run failure threshold.
    pub parallel_run_failure_threshold: Option<ParallelRunFailureThreshold>,
}

/// Subscription of a check or group to an alert channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertChannelSubscription {
    /// Alert channel ID.
    pub channel_id: i64,
    /// Whether the subscription is active.
    pub activated: bool,
}

/// A monitored endpoint or script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Check {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
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
    pub environment_variables: Vec<KeyValue>,
    pub double_check: bool,
    pub use_global_alert_settings: bool,
    pub group_id: Option<i64>,
    pub group_order: Option<i64>,
    pub runtime_id: Option<String>,
    pub setup_snippet_id: Option<i64>,
    pub teardown_snippet_id: Option<i64>,
    pub local_setup_script: Option<String>,
    pub local_teardown_script: Option<String>,
    pub request: Option<Request>,
    pub retry_strategy: Option<RetryStrategy>,
    pub alert_settings: Option<AlertSettings>,
    pub alert_channel_subscriptions: Vec<AlertChannelSubscription>,
}

/// Request defaults applied to API checks in a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCheckDefaults {
    /// Base URL prefixed to check URLs.
    pub url: String,
    /// Default headers.
    pub headers: Vec<KeyValue>,
    /// Default query parameters.
    pub query_parameters: Vec<KeyValue>,
    /// Default assertions.
    pub assertions: Vec<Assertion>,
    /// Default credentials.
    pub basic_auth: Option<BasicAuth>,
}

/// A named collection of checks sharing defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub concurrency: i64,
    pub activated: bool,
    pub muted: bool,
    pub locations: Vec<String>,
    pub private_locations: Vec<String>,
    pub tags: Vec<String>,
    pub environment_variables: Vec<KeyValue>,
    pub double_check: bool,
    pub use_global_alert_settings: bool,
    pub runtime_id: Option<String>,
    pub setup_snippet_id: Option<i64>,
    pub teardown_snippet_id: Option<i64>,
    pub local_setup_script: Option<String>,
    pub local_teardown_script: Option<String>,
    pub api_check_defaults: Option<ApiCheckDefaults>,
    pub retry_strategy: Option<RetryStrategy>,
    pub alert_settings: Option<AlertSettings>,
    pub alert_channel_subscriptions: Vec<AlertChannelSubscription>,
}

/// Email alert destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailConfig {
    pub address: String,
}

/// Slack alert destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlackConfig {
    pub url: String,
    pub channel: String,
}

/// SMS alert destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsConfig {
    pub name: String,
    pub number: String,
}

/// Voice call alert destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallConfig {
    pub name: String,
    pub number: String,
}

/// Webhook alert destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookConfig {
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: Vec<KeyValue>,
    pub query_parameters: Vec<KeyValue>,
    pub template: Option<String>,
    /// Write-only; the API never returns it.
    pub webhook_secret: Option<String>,
    pub webhook_type: Option<String>,
}

/// Opsgenie alert destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpsgenieConfig {
    pub name: String,
    /// Write-only; the API never returns it.
    pub api_key: String,
    pub region: String,
    pub priority: String,
}

/// PagerDuty alert destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagerdutyConfig {
    pub account: Option<String>,
    pub service_key: String,
    pub service_name: Option<String>,
}

/// Destination of an alert channel, tagged by the API's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertChannelConfig {
    /// `EMAIL`
    Email(EmailConfig),
    /// `SLACK`
    Slack(SlackConfig),
    /// `SMS`
    Sms(SmsConfig),
    /// `CALL`
    Call(CallConfig),
    /// `WEBHOOK`
    Webhook(WebhookConfig),
    /// `OPSGENIE`
    Opsgenie(OpsgenieConfig),
    /// `PAGERDUTY`
    Pagerduty(PagerdutyConfig),
}

impl Default for AlertChannelConfig {
    fn default() -> Self {
        Self::Email(EmailConfig::default())
    }
}

/// A notification destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertChannel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub config: AlertChannelConfig,
    pub send_recovery: bool,
    pub send_failure: bool,
    pub send_degraded: bool,
    pub ssl_expiry: bool,
    pub ssl_expiry_threshold: i64,
}

/// A public status dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dashboard {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dashboard_id: String,
    pub custom_url: String,
    pub custom_domain: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub header: Option<String>,
    pub width: String,
    pub refresh_rate: i64,
    pub paginate: bool,
    pub checks_per_page: i64,
    pub pagination_rate: i64,
    pub tags: Vec<String>,
    pub hide_tags: bool,
    pub use_tags_and_operator: bool,
    pub is_private: bool,
    pub custom_css: Option<String>,
}

/// Ping expectations of a heartbeat check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Heartbeat {
    pub period: i64,
    pub period_unit: String,
    pub grace: i64,
    pub grace_unit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ping_token: String,
}

/// A check that expects periodic pings instead of running itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartbeatCheck {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub check_type: String,
    pub activated: bool,
    pub muted: bool,
    pub tags: Vec<String>,
    pub use_global_alert_settings: bool,
    pub alert_settings: Option<AlertSettings>,
    pub alert_channel_subscriptions: Vec<AlertChannelSubscription>,
    pub heartbeat: Heartbeat,
}

/// An account-level environment variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: String,
    pub locked: bool,
    pub secret: bool,
}

/// A window during which checks do not alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub starts_at: String,
    pub ends_at: String,
    pub repeat_unit: Option<String>,
    pub repeat_interval: Option<i64>,
    pub repeat_ends_at: Option<String>,
    pub tags: Vec<String>,
}

/// An API key of a private location agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivateLocationKey {
    pub id: String,
    /// Only present in the create response.
    pub raw_key: String,
    pub masked_key: String,
}

/// A self-hosted location that runs checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivateLocation {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub slug_name: String,
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<PrivateLocationKey>,
}

/// Reusable code shared between browser checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub script: String,
}

/// A URL that triggers a single check run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerCheck {
    pub id: i64,
    pub check_id: String,
    pub token: String,
    pub url: String,
}

/// A URL that triggers every check in a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerGroup {
    pub id: i64,
    pub group_id: i64,
    pub token: String,
    pub url: String,
}

/// A source address Checkly runs checks from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticIp {
    /// Location (region) name.
    pub region: String,
    /// Address in CIDR notation.
    pub address: String,
}
