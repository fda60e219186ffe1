use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::{key_values_to_map, map_to_key_values, optional_string, refresh_id};
use super::ManagedResource;
use crate::api::models::{
    AlertChannel, AlertChannelConfig, CallConfig, EmailConfig, OpsgenieConfig, PagerdutyConfig,
    SlackConfig, SmsConfig, WebhookConfig,
};
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{
    is_null_or_unknown, non_empty, parse_numeric_id, parse_optional_numeric_id, render_one,
    Gluer, InteropResult, Objecter, Refresh, RefreshMode, Render,
};
use crate::schema::{
    Attribute, Block, BlockConstraint, Diagnostic, NestedBlock, Schema, Validator,
};

const CHANNEL_BLOCKS: [&str; 7] = [
    "email",
    "slack",
    "sms",
    "call",
    "webhook",
    "opsgenie",
    "pagerduty",
];

/// `checkly_alert_channel`: where alerts are delivered.
///
/// Configuration carries one optional block per destination kind; the model
/// layer turns whichever one is set into an [`AlertChannelKind`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertChannelResource;

fn email_block() -> Block {
    Block::new().with_attribute("address", Attribute::required_string())
}

fn slack_block() -> Block {
    Block::new()
        .with_attribute("url", Attribute::required_string())
        .with_attribute("channel", Attribute::required_string())
}

fn phone_block() -> Block {
    Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute(
            "number",
            Attribute::required_string().with_description("Number in E.164 format."),
        )
}

fn webhook_block() -> Block {
    Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("url", Attribute::required_string())
        .with_attribute(
            "method",
            Attribute::optional_string()
                .with_default(json!("POST"))
                .with_validator(Validator::one_of_strings(&[
                    "GET", "POST", "PUT", "HEAD", "DELETE", "PATCH",
                ])),
        )
        .with_attribute("headers", Attribute::optional_string_map())
        .with_attribute("query_parameters", Attribute::optional_string_map())
        .with_attribute("template", Attribute::optional_string())
        .with_attribute("webhook_secret", Attribute::optional_string().sensitive())
        .with_attribute(
            "webhook_type",
            Attribute::optional_string().with_validator(Validator::one_of_strings(&[
                "WEBHOOK_DISCORD",
                "WEBHOOK_FIREHYDRANT",
                "WEBHOOK_GITLAB_ALERT",
                "WEBHOOK_SPIKESH",
                "WEBHOOK_SPLUNK",
                "WEBHOOK_MSTEAMS",
                "WEBHOOK_TELEGRAM",
            ])),
        )
}

fn opsgenie_block() -> Block {
    Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("api_key", Attribute::required_string().sensitive())
        .with_attribute(
            "region",
            Attribute::required_string().with_validator(Validator::one_of_strings(&["US", "EU"])),
        )
        .with_attribute(
            "priority",
            Attribute::required_string()
                .with_validator(Validator::one_of_strings(&["P1", "P2", "P3", "P4", "P5"])),
        )
}

fn pagerduty_block() -> Block {
    Block::new()
        .with_attribute("account", Attribute::optional_string())
        .with_attribute("service_key", Attribute::required_string().sensitive())
        .with_attribute("service_name", Attribute::optional_string())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailModel {
    pub address: String,
}

impl Refresh<EmailConfig> for EmailModel {
    fn refresh(&mut self, remote: &EmailConfig, _mode: RefreshMode) -> InteropResult<()> {
        self.address = remote.address.clone();
        Ok(())
    }
}

impl Render<EmailConfig> for EmailModel {
    fn render(&self, remote: &mut EmailConfig) -> InteropResult<()> {
        remote.address = self.address.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackModel {
    pub url: String,
    pub channel: String,
}

impl Refresh<SlackConfig> for SlackModel {
    fn refresh(&mut self, remote: &SlackConfig, _mode: RefreshMode) -> InteropResult<()> {
        self.url = remote.url.clone();
        self.channel = remote.channel.clone();
        Ok(())
    }
}

impl Render<SlackConfig> for SlackModel {
    fn render(&self, remote: &mut SlackConfig) -> InteropResult<()> {
        remote.url = self.url.clone();
        remote.channel = self.channel.clone();
        Ok(())
    }
}

/// Shared by the `sms` and `call` blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneModel {
    pub name: String,
    pub number: String,
}

impl Refresh<SmsConfig> for PhoneModel {
    fn refresh(&mut self, remote: &SmsConfig, _mode: RefreshMode) -> InteropResult<()> {
        self.name = remote.name.clone();
        self.number = remote.number.clone();
        Ok(())
    }
}

impl Render<SmsConfig> for PhoneModel {
    fn render(&self, remote: &mut SmsConfig) -> InteropResult<()> {
        remote.name = self.name.clone();
        remote.number = self.number.clone();
        Ok(())
    }
}

impl Refresh<CallConfig> for PhoneModel {
    fn refresh(&mut self, remote: &CallConfig, _mode: RefreshMode) -> InteropResult<()> {
        self.name = remote.name.clone();
        self.number = remote.number.clone();
        Ok(())
    }
}

impl Render<CallConfig> for PhoneModel {
    fn render(&self, remote: &mut CallConfig) -> InteropResult<()> {
        remote.name = self.name.clone();
        remote.number = self.number.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookModel {
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub query_parameters: Option<BTreeMap<String, String>>,
    pub template: Option<String>,
    pub webhook_secret: Option<String>,
    pub webhook_type: Option<String>,
}

impl Refresh<WebhookConfig> for WebhookModel {
    fn refresh(&mut self, remote: &WebhookConfig, _mode: RefreshMode) -> InteropResult<()> {
        self.name = remote.name.clone();
        self.url = remote.url.clone();
        self.method = remote.method.clone();
        self.headers = non_empty(&remote.headers).map(key_values_to_map);
        self.query_parameters = non_empty(&remote.query_parameters).map(key_values_to_map);
        self.template = remote.template.as_deref().and_then(optional_string);
        if let Some(secret) = remote.webhook_secret.as_deref().and_then(optional_string) {
            self.webhook_secret = Some(secret);
        }
        self.webhook_type = remote.webhook_type.as_deref().and_then(optional_string);
        Ok(())
    }
}

impl Render<WebhookConfig> for WebhookModel {
    fn render(&self, remote: &mut WebhookConfig) -> InteropResult<()> {
        remote.name = self.name.clone();
        remote.url = self.url.clone();
        remote.method = self.method.clone();
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
        remote.template = self.template.clone();
        remote.webhook_secret = self.webhook_secret.clone();
        remote.webhook_type = self.webhook_type.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsgenieModel {
    pub name: String,
    pub api_key: String,
    pub region: String,
    pub priority: String,
}

impl Refresh<OpsgenieConfig> for OpsgenieModel {
    fn refresh(&mut self, remote: &OpsgenieConfig, _mode: RefreshMode) -> InteropResult<()> {
        self.name = remote.name.clone();
        if !remote.api_key.is_empty() {
            self.api_key = remote.api_key.clone();
        }
        self.region = remote.region.clone();
        self.priority = remote.priority.clone();
        Ok(())
    }
}

impl Render<OpsgenieConfig> for OpsgenieModel {
    fn render(&self, remote: &mut OpsgenieConfig) -> InteropResult<()> {
        remote.name = self.name.clone();
        remote.api_key = self.api_key.clone();
        remote.region = self.region.clone();
        remote.priority = self.priority.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerdutyModel {
    pub account: Option<String>,
    pub service_key: String,
    pub service_name: Option<String>,
}

impl Refresh<PagerdutyConfig> for PagerdutyModel {
    fn refresh(&mut self, remote: &PagerdutyConfig, _mode: RefreshMode) -> InteropResult<()> {
        self.account = remote.account.as_deref().and_then(optional_string);
        self.service_key = remote.service_key.clone();
        self.service_name = remote.service_name.as_deref().and_then(optional_string);
        Ok(())
    }
}

impl Render<PagerdutyConfig> for PagerdutyModel {
    fn render(&self, remote: &mut PagerdutyConfig) -> InteropResult<()> {
        remote.account = self.account.clone();
        remote.service_key = self.service_key.clone();
        remote.service_name = self.service_name.clone();
        Ok(())
    }
}

fn email() -> Gluer<EmailConfig, EmailModel> {
    Gluer::new("email", &email_block())
}

fn slack() -> Gluer<SlackConfig, SlackModel> {
    Gluer::new("slack", &slack_block())
}

fn sms() -> Gluer<SmsConfig, PhoneModel> {
    Gluer::new("sms", &phone_block())
}

fn call() -> Gluer<CallConfig, PhoneModel> {
    Gluer::new("call", &phone_block())
}

fn webhook() -> Gluer<WebhookConfig, WebhookModel> {
    Gluer::new("webhook", &webhook_block())
}

fn opsgenie() -> Gluer<OpsgenieConfig, OpsgenieModel> {
    Gluer::new("opsgenie", &opsgenie_block())
}

fn pagerduty() -> Gluer<PagerdutyConfig, PagerdutyModel> {
    Gluer::new("pagerduty", &pagerduty_block())
}

/// The destination of an alert channel.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertChannelKind {
    /// Email address.
    Email(EmailModel),
    /// Slack incoming webhook.
    Slack(SlackModel),
    /// Text message.
    Sms(PhoneModel),
    /// Voice call.
    Call(PhoneModel),
    /// Generic or templated webhook.
    Webhook(WebhookModel),
    /// Opsgenie integration.
    Opsgenie(OpsgenieModel),
    /// PagerDuty service.
    Pagerduty(PagerdutyModel),
}

impl AlertChannelKind {
    /// The configuration block this kind is declared with.
    pub fn block_name(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Slack(_) => "slack",
            Self::Sms(_) => "sms",
            Self::Call(_) => "call",
            Self::Webhook(_) => "webhook",
            Self::Opsgenie(_) => "opsgenie",
            Self::Pagerduty(_) => "pagerduty",
        }
    }

    /// Decode the single destination block set in `model`.
    fn from_model(model: &AlertChannelModel) -> InteropResult<Self> {
        let set: Vec<(&str, &Value)> = CHANNEL_BLOCKS
            .iter()
            .map(|name| (*name, model.block(name)))
            .filter(|(_, value)| !is_null_or_unknown(value))
            .collect();

        let [(name, value)] = set.as_slice() else {
            return Err(vec![Diagnostic::error(format!(
                "ExactlyOneOf: exactly one of [{}] must be specified",
                CHANNEL_BLOCKS.join(", ")
            ))
            .with_detail(format!("{} of these blocks were specified", set.len()))]);
        };

        let decoder = |block: Block| Objecter::for_block(*name, &block);
        let kind = match *name {
            "email" => Self::Email(decoder(email_block()).decode(value)?),
            "slack" => Self::Slack(decoder(slack_block()).decode(value)?),
            "sms" => Self::Sms(decoder(phone_block()).decode(value)?),
            "call" => Self::Call(decoder(phone_block()).decode(value)?),
            "webhook" => Self::Webhook(decoder(webhook_block()).decode(value)?),
            "opsgenie" => Self::Opsgenie(decoder(opsgenie_block()).decode(value)?),
            _ => Self::Pagerduty(decoder(pagerduty_block()).decode(value)?),
        };
        Ok(kind)
    }
}

impl Render<AlertChannelConfig> for AlertChannelKind {
    fn render(&self, remote: &mut AlertChannelConfig) -> InteropResult<()> {
        *remote = match self {
            Self::Email(m) => AlertChannelConfig::Email(render_one(m)?),
            Self::Slack(m) => AlertChannelConfig::Slack(render_one(m)?),
            Self::Sms(m) => AlertChannelConfig::Sms(render_one(m)?),
            Self::Call(m) => AlertChannelConfig::Call(render_one(m)?),
            Self::Webhook(m) => AlertChannelConfig::Webhook(render_one(m)?),
            Self::Opsgenie(m) => AlertChannelConfig::Opsgenie(render_one(m)?),
            Self::Pagerduty(m) => AlertChannelConfig::Pagerduty(render_one(m)?),
        };
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertChannelModel {
    pub id: String,
    pub email: Value,
    pub slack: Value,
    pub sms: Value,
    pub call: Value,
    pub webhook: Value,
    pub opsgenie: Value,
    pub pagerduty: Value,
    pub send_recovery: bool,
    pub send_failure: bool,
    pub send_degraded: bool,
    pub ssl_expiry: bool,
    pub ssl_expiry_threshold: i64,
}

impl AlertChannelModel {
    fn block(&self, name: &str) -> &Value {
        match name {
            "email" => &self.email,
            "slack" => &self.slack,
            "sms" => &self.sms,
            "call" => &self.call,
            "webhook" => &self.webhook,
            "opsgenie" => &self.opsgenie,
            _ => &self.pagerduty,
        }
    }

    /// The destination configured by this model.
    pub fn kind(&self) -> InteropResult<AlertChannelKind> {
        AlertChannelKind::from_model(self)
    }
}

impl Refresh<AlertChannel> for AlertChannelModel {
    fn refresh(&mut self, remote: &AlertChannel, mode: RefreshMode) -> InteropResult<()> {
        let id = remote.id.map(|id| id.to_string()).unwrap_or_default();
        refresh_id(&mut self.id, id, mode);

        use AlertChannelConfig as C;
        let config = &remote.config;
        self.email = email().refresh_object(
            &self.email,
            if let C::Email(c) = config { Some(c) } else { None },
            mode,
        )?;
        self.slack = slack().refresh_object(
            &self.slack,
            if let C::Slack(c) = config { Some(c) } else { None },
            mode,
        )?;
        self.sms = sms().refresh_object(
            &self.sms,
            if let C::Sms(c) = config { Some(c) } else { None },
            mode,
        )?;
        self.call = call().refresh_object(
            &self.call,
            if let C::Call(c) = config { Some(c) } else { None },
            mode,
        )?;
        self.webhook = webhook().refresh_object(
            &self.webhook,
            if let C::Webhook(c) = config { Some(c) } else { None },
            mode,
        )?;
        self.opsgenie = opsgenie().refresh_object(
            &self.opsgenie,
            if let C::Opsgenie(c) = config { Some(c) } else { None },
            mode,
        )?;
        self.pagerduty = pagerduty().refresh_object(
            &self.pagerduty,
            if let C::Pagerduty(c) = config { Some(c) } else { None },
            mode,
        )?;

        self.send_recovery = remote.send_recovery;
        self.send_failure = remote.send_failure;
        self.send_degraded = remote.send_degraded;
        self.ssl_expiry = remote.ssl_expiry;
        self.ssl_expiry_threshold = remote.ssl_expiry_threshold;
        Ok(())
    }
}

impl Render<AlertChannel> for AlertChannelModel {
    fn render(&self, remote: &mut AlertChannel) -> InteropResult<()> {
        remote.id = parse_optional_numeric_id(&self.id, "id")?;
        self.kind()?.render(&mut remote.config)?;
        remote.send_recovery = self.send_recovery;
        remote.send_failure = self.send_failure;
        remote.send_degraded = self.send_degraded;
        remote.ssl_expiry = self.ssl_expiry;
        remote.ssl_expiry_threshold = self.ssl_expiry_threshold;
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for AlertChannelResource {
    type Remote = AlertChannel;
    type Model = AlertChannelModel;
    type Id = i64;

    const TYPE_NAME: &'static str = "checkly_alert_channel";
    const DISPLAY_NAME: &'static str = "Alert Channel";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Alert channels deliver check failures and recoveries.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "send_recovery",
                Attribute::optional_bool().with_default(json!(true)),
            )
            .with_attribute(
                "send_failure",
                Attribute::optional_bool().with_default(json!(true)),
            )
            .with_attribute(
                "send_degraded",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "ssl_expiry",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "ssl_expiry_threshold",
                Attribute::optional_int64()
                    .with_default(json!(30))
                    .with_validator(Validator::int_between(1, 30))
                    .with_description("Days before certificate expiry to alert."),
            )
            .with_block("email", NestedBlock::single(email_block()))
            .with_block("slack", NestedBlock::single(slack_block()))
            .with_block("sms", NestedBlock::single(phone_block()))
            .with_block("call", NestedBlock::single(phone_block()))
            .with_block("webhook", NestedBlock::single(webhook_block()))
            .with_block("opsgenie", NestedBlock::single(opsgenie_block()))
            .with_block("pagerduty", NestedBlock::single(pagerduty_block()))
            .with_constraint(BlockConstraint::exactly_one_of(&CHANNEL_BLOCKS))
    }

    fn parse_id(raw: &str) -> InteropResult<i64> {
        parse_numeric_id(raw, "id")
    }

    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &AlertChannel,
    ) -> Result<AlertChannel, ApiError> {
        client.create_alert_channel(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &i64) -> Result<AlertChannel, ApiError> {
        client.get_alert_channel(*id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &i64,
        remote: &AlertChannel,
    ) -> Result<AlertChannel, ApiError> {
        client.update_alert_channel(*id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &i64) -> Result<(), ApiError> {
        client.delete_alert_channel(*id).await
    }
}
