use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::{
    alert_channel_subscription_block, alert_channel_subscriptions, alert_settings,
    alert_settings_block, refresh_id, sorted,
};
use super::{string_id, ManagedResource};
use crate::api::models::{Heartbeat, HeartbeatCheck};
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{is_unknown, non_empty, Gluer, InteropResult, Refresh, RefreshMode, Render};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema, Validator};

const CHECK_TYPE: &str = "HEARTBEAT";
const TIME_UNITS: [&str; 4] = ["seconds", "minutes", "hours", "days"];
const MIN_PERIOD_SECONDS: i64 = 30;
const MAX_SECONDS: i64 = 365 * 24 * 60 * 60;

/// `checkly_heartbeat`: a check that expects to be pinged on a schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartbeatResource;

fn heartbeat_block() -> Block {
    Block::new()
        .with_attribute(
            "period",
            Attribute::required_int64()
                .with_description("How often you expect a ping to the ping URL."),
        )
        .with_attribute(
            "period_unit",
            Attribute::required_string().with_validator(Validator::one_of_strings(&TIME_UNITS)),
        )
        .with_attribute(
            "grace",
            Attribute::required_int64()
                .with_description("How long to wait before triggering an alert."),
        )
        .with_attribute(
            "grace_unit",
            Attribute::required_string().with_validator(Validator::one_of_strings(&TIME_UNITS)),
        )
        .with_attribute(
            "ping_token",
            Attribute::computed_string().with_description("Token used in the ping URL."),
        )
}

/// The nested `heartbeat` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatBlockModel {
    pub period: i64,
    pub period_unit: String,
    pub grace: i64,
    pub grace_unit: String,
    pub ping_token: String,
}

impl Refresh<Heartbeat> for HeartbeatBlockModel {
    fn refresh(&mut self, remote: &Heartbeat, _mode: RefreshMode) -> InteropResult<()> {
        self.period = remote.period;
        self.period_unit = remote.period_unit.clone();
        self.grace = remote.grace;
        self.grace_unit = remote.grace_unit.clone();
        self.ping_token = remote.ping_token.clone();
        Ok(())
    }
}

impl Render<Heartbeat> for HeartbeatBlockModel {
    fn render(&self, remote: &mut Heartbeat) -> InteropResult<()> {
        remote.period = self.period;
        remote.period_unit = self.period_unit.clone();
        remote.grace = self.grace;
        remote.grace_unit = self.grace_unit.clone();
        remote.ping_token = self.ping_token.clone();
        Ok(())
    }
}

fn heartbeat_gluer() -> Gluer<Heartbeat, HeartbeatBlockModel> {
    Gluer::new("heartbeat", &heartbeat_block())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatModel {
    pub id: String,
    pub name: String,
    pub activated: bool,
    pub muted: bool,
    pub tags: Vec<String>,
    pub use_global_alert_settings: bool,
    pub alert_settings: Value,
    pub alert_channel_subscription: Value,
    pub heartbeat: Value,
}

impl Refresh<HeartbeatCheck> for HeartbeatModel {
    fn refresh(&mut self, remote: &HeartbeatCheck, mode: RefreshMode) -> InteropResult<()> {
        refresh_id(&mut self.id, remote.id.clone(), mode);
        self.name = remote.name.clone();
        self.activated = remote.activated;
        self.muted = remote.muted;
        self.tags = sorted(&remote.tags);
        self.use_global_alert_settings = remote.use_global_alert_settings;
        self.alert_settings = alert_settings().refresh_object(
            &self.alert_settings,
            remote.alert_settings.as_ref(),
            mode,
        )?;
        self.alert_channel_subscription = alert_channel_subscriptions()
            .refresh_list(non_empty(&remote.alert_channel_subscriptions), mode)?;
        self.heartbeat =
            heartbeat_gluer().refresh_object(&self.heartbeat, Some(&remote.heartbeat), mode)?;
        Ok(())
    }
}

impl Render<HeartbeatCheck> for HeartbeatModel {
    fn render(&self, remote: &mut HeartbeatCheck) -> InteropResult<()> {
        remote.id = self.id.clone();
        remote.name = self.name.clone();
        remote.check_type = CHECK_TYPE.to_string();
        remote.activated = self.activated;
        remote.muted = self.muted;
        remote.tags = self.tags.clone();
        remote.use_global_alert_settings = self.use_global_alert_settings;
        remote.alert_settings = alert_settings().render_object(&self.alert_settings)?;
        remote.alert_channel_subscriptions =
            alert_channel_subscriptions().render_list(&self.alert_channel_subscription)?;
        remote.heartbeat = heartbeat_gluer()
            .render_object(&self.heartbeat)?
            .unwrap_or_default();
        Ok(())
    }
}

fn unit_seconds(unit: &str) -> Option<i64> {
    match unit {
        "seconds" => Some(1),
        "minutes" => Some(60),
        "hours" => Some(60 * 60),
        "days" => Some(24 * 60 * 60),
        _ => None,
    }
}

/// Duration of `heartbeat.<field>` in seconds, when known.
fn duration(heartbeat: &Value, field: &str) -> Option<i64> {
    let amount = heartbeat.get(field)?.as_i64()?;
    let unit = heartbeat.get(format!("{}_unit", field).as_str())?;
    if is_unknown(unit) {
        return None;
    }
    unit_seconds(unit.as_str()?).map(|factor| amount.saturating_mul(factor))
}

fn out_of_range(field: &str, detail: &str) -> Diagnostic {
    Diagnostic::error(format!("Invalid Heartbeat {}", field))
        .with_detail(format!("{} {}", field, detail))
        .with_attribute(format!("heartbeat.{}", field))
}

#[async_trait]
impl ManagedResource for HeartbeatResource {
    type Remote = HeartbeatCheck;
    type Model = HeartbeatModel;
    type Id = String;

    const TYPE_NAME: &'static str = "checkly_heartbeat";
    const DISPLAY_NAME: &'static str = "Heartbeat";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Heartbeats monitor jobs that ping Checkly on a schedule.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("activated", Attribute::required_bool())
            .with_attribute(
                "muted",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("tags", Attribute::optional_string_set())
            .with_attribute(
                "use_global_alert_settings",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_block("alert_settings", NestedBlock::single(alert_settings_block()))
            .with_block(
                "alert_channel_subscription",
                NestedBlock::list(alert_channel_subscription_block()),
            )
            .with_block(
                "heartbeat",
                NestedBlock::single(heartbeat_block()).with_min_items(1),
            )
    }

    fn parse_id(raw: &str) -> InteropResult<String> {
        string_id(raw)
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let Some(heartbeat) = config.get("heartbeat").filter(|v| v.is_object()) else {
            return diagnostics;
        };

        if let Some(period) = duration(heartbeat, "period") {
            if period < MIN_PERIOD_SECONDS {
                diagnostics.push(out_of_range(
                    "period",
                    "must be greater than or equal to 30s",
                ));
            } else if period > MAX_SECONDS {
                diagnostics.push(out_of_range(
                    "period",
                    "must be less than or equal to 365 days",
                ));
            }
        }

        if let Some(grace) = duration(heartbeat, "grace") {
            if grace < 0 {
                diagnostics.push(out_of_range(
                    "grace",
                    "must be greater than or equal to 0",
                ));
            } else if grace > MAX_SECONDS {
                diagnostics.push(out_of_range(
                    "grace",
                    "must be less than or equal to 365 days",
                ));
            }
        }

        diagnostics
    }

    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &HeartbeatCheck,
    ) -> Result<HeartbeatCheck, ApiError> {
        client.create_heartbeat(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &String) -> Result<HeartbeatCheck, ApiError> {
        client.get_heartbeat(id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &String,
        remote: &HeartbeatCheck,
    ) -> Result<HeartbeatCheck, ApiError> {
        client.update_heartbeat(id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &String) -> Result<(), ApiError> {
        client.delete_heartbeat(id).await
    }
}
