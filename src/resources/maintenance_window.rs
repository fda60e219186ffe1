use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::common::{refresh_id, sorted};
use super::ManagedResource;
use crate::api::models::MaintenanceWindow;
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{
    parse_numeric_id, parse_optional_numeric_id, InteropResult, Refresh, RefreshMode, Render,
};
use crate::schema::{Attribute, Schema, Validator};

/// `checkly_maintenance_windows`: a period during which checks do not alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceWindowResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceWindowModel {
    pub id: String,
    pub name: String,
    pub starts_at: String,
    pub ends_at: String,
    pub repeat_unit: Option<String>,
    pub repeat_interval: Option<i64>,
    pub repeat_ends_at: Option<String>,
    pub tags: Vec<String>,
}

impl Refresh<MaintenanceWindow> for MaintenanceWindowModel {
    fn refresh(&mut self, remote: &MaintenanceWindow, mode: RefreshMode) -> InteropResult<()> {
        let id = remote.id.map(|id| id.to_string()).unwrap_or_default();
        refresh_id(&mut self.id, id, mode);
        self.name = remote.name.clone();
        self.starts_at = remote.starts_at.clone();
        self.ends_at = remote.ends_at.clone();
        self.repeat_unit = remote.repeat_unit.clone();
        self.repeat_interval = remote.repeat_interval;
        self.repeat_ends_at = remote.repeat_ends_at.clone();
        self.tags = sorted(&remote.tags);
        Ok(())
    }
}

impl Render<MaintenanceWindow> for MaintenanceWindowModel {
    fn render(&self, remote: &mut MaintenanceWindow) -> InteropResult<()> {
        remote.id = parse_optional_numeric_id(&self.id, "id")?;
        remote.name = self.name.clone();
        remote.starts_at = self.starts_at.clone();
        remote.ends_at = self.ends_at.clone();
        remote.repeat_unit = self.repeat_unit.clone();
        remote.repeat_interval = self.repeat_interval;
        remote.repeat_ends_at = self.repeat_ends_at.clone();
        remote.tags = self.tags.clone();
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for MaintenanceWindowResource {
    type Remote = MaintenanceWindow;
    type Model = MaintenanceWindowModel;
    type Id = i64;

    const TYPE_NAME: &'static str = "checkly_maintenance_windows";
    const DISPLAY_NAME: &'static str = "Maintenance Window";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Maintenance windows mute alerting for tagged checks.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "starts_at",
                Attribute::required_string().with_description("RFC 3339 start time."),
            )
            .with_attribute(
                "ends_at",
                Attribute::required_string().with_description("RFC 3339 end time."),
            )
            .with_attribute(
                "repeat_unit",
                Attribute::optional_string()
                    .with_validator(Validator::one_of_strings(&["DAY", "WEEK", "MONTH"])),
            )
            .with_attribute(
                "repeat_interval",
                Attribute::optional_int64().with_validator(Validator::int_at_least(1)),
            )
            .with_attribute("repeat_ends_at", Attribute::optional_string())
            .with_attribute("tags", Attribute::optional_string_set())
    }

    fn parse_id(raw: &str) -> InteropResult<i64> {
        parse_numeric_id(raw, "id")
    }

    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &MaintenanceWindow,
    ) -> Result<MaintenanceWindow, ApiError> {
        client.create_maintenance_window(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &i64) -> Result<MaintenanceWindow, ApiError> {
        client.get_maintenance_window(*id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &i64,
        remote: &MaintenanceWindow,
    ) -> Result<MaintenanceWindow, ApiError> {
        client.update_maintenance_window(*id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &i64) -> Result<(), ApiError> {
        client.delete_maintenance_window(*id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let model = MaintenanceWindowModel {
            id: "9".to_string(),
            name: "Weekly deploy".to_string(),
            starts_at: "2024-01-01T00:00:00.000Z".to_string(),
            ends_at: "2024-01-01T01:00:00.000Z".to_string(),
            repeat_unit: Some("WEEK".to_string()),
            repeat_interval: Some(1),
            repeat_ends_at: None,
            tags: vec!["prod".to_string(), "web".to_string()],
        };

        let mut remote = MaintenanceWindow::default();
        model.render(&mut remote).unwrap();

        let mut refreshed = MaintenanceWindowModel::default();
        refreshed.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }

    #[test]
    fn test_repeat_unit_is_validated() {
        let schema = MaintenanceWindowResource.schema();
        let diagnostics = validate(
            &schema,
            &json!({
                "name": "w",
                "starts_at": "2024-01-01T00:00:00Z",
                "ends_at": "2024-01-01T01:00:00Z",
                "repeat_unit": "YEAR"
            }),
        );

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("repeat_unit"));
    }
}
