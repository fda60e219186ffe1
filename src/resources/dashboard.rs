use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::common::{refresh_id, sorted};
use super::{string_id, ManagedResource};
use crate::api::models::Dashboard;
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{InteropResult, Refresh, RefreshMode, Render};
use crate::schema::{Attribute, Schema, Validator};

/// `checkly_dashboard`: a public status page. Its ID is the remote
/// `dashboardId`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardModel {
    pub id: String,
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

impl Refresh<Dashboard> for DashboardModel {
    fn refresh(&mut self, remote: &Dashboard, mode: RefreshMode) -> InteropResult<()> {
        refresh_id(&mut self.id, remote.dashboard_id.clone(), mode);
        self.custom_url = remote.custom_url.clone();
        self.custom_domain = remote.custom_domain.clone();
        self.logo = remote.logo.clone();
        self.favicon = remote.favicon.clone();
        self.link = remote.link.clone();
        self.description = remote.description.clone();
        self.header = remote.header.clone();
        self.width = remote.width.clone();
        self.refresh_rate = remote.refresh_rate;
        self.paginate = remote.paginate;
        self.checks_per_page = remote.checks_per_page;
        self.pagination_rate = remote.pagination_rate;
        self.tags = sorted(&remote.tags);
        self.hide_tags = remote.hide_tags;
        self.use_tags_and_operator = remote.use_tags_and_operator;
        self.is_private = remote.is_private;
        self.custom_css = remote.custom_css.clone();
        Ok(())
    }
}

impl Render<Dashboard> for DashboardModel {
    fn render(&self, remote: &mut Dashboard) -> InteropResult<()> {
        remote.dashboard_id = self.id.clone();
        remote.custom_url = self.custom_url.clone();
        remote.custom_domain = self.custom_domain.clone();
        remote.logo = self.logo.clone();
        remote.favicon = self.favicon.clone();
        remote.link = self.link.clone();
        remote.description = self.description.clone();
        remote.header = self.header.clone();
        remote.width = self.width.clone();
        remote.refresh_rate = self.refresh_rate;
        remote.paginate = self.paginate;
        remote.checks_per_page = self.checks_per_page;
        remote.pagination_rate = self.pagination_rate;
        remote.tags = self.tags.clone();
        remote.hide_tags = self.hide_tags;
        remote.use_tags_and_operator = self.use_tags_and_operator;
        remote.is_private = self.is_private;
        remote.custom_css = self.custom_css.clone();
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for DashboardResource {
    type Remote = Dashboard;
    type Model = DashboardModel;
    type Id = String;

    const TYPE_NAME: &'static str = "checkly_dashboard";
    const DISPLAY_NAME: &'static str = "Dashboard";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Public dashboards showing the status of tagged checks.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "custom_url",
                Attribute::required_string()
                    .with_description("Subdomain under checklyhq.com where the dashboard is served."),
            )
            .with_attribute("custom_domain", Attribute::optional_string())
            .with_attribute("logo", Attribute::optional_string())
            .with_attribute("favicon", Attribute::optional_string())
            .with_attribute("link", Attribute::optional_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("header", Attribute::optional_string())
            .with_attribute(
                "width",
                Attribute::optional_string()
                    .with_default(json!("FULL"))
                    .with_validator(Validator::one_of_strings(&["FULL", "960PX"])),
            )
            .with_attribute(
                "refresh_rate",
                Attribute::optional_int64()
                    .with_default(json!(60))
                    .with_validator(Validator::one_of_ints(&[60, 300, 600])),
            )
            .with_attribute(
                "paginate",
                Attribute::optional_bool().with_default(json!(true)),
            )
            .with_attribute(
                "checks_per_page",
                Attribute::optional_int64()
                    .with_default(json!(15))
                    .with_validator(Validator::int_between(1, 20)),
            )
            .with_attribute(
                "pagination_rate",
                Attribute::optional_int64()
                    .with_default(json!(60))
                    .with_validator(Validator::one_of_ints(&[30, 60, 300])),
            )
            .with_attribute("tags", Attribute::optional_string_set())
            .with_attribute(
                "hide_tags",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "use_tags_and_operator",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "is_private",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("custom_css", Attribute::optional_string())
    }

    fn parse_id(raw: &str) -> InteropResult<String> {
        string_id(raw)
    }

    async fn create(&self, client: &ChecklyClient, remote: &Dashboard) -> Result<Dashboard, ApiError> {
        client.create_dashboard(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &String) -> Result<Dashboard, ApiError> {
        client.get_dashboard(id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &String,
        remote: &Dashboard,
    ) -> Result<Dashboard, ApiError> {
        client.update_dashboard(id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &String) -> Result<(), ApiError> {
        client.delete_dashboard(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_round_trip() {
        let model = DashboardModel {
            id: "dash-1".to_string(),
            custom_url: "status".to_string(),
            custom_domain: Some("status.example.com".to_string()),
            header: Some("Status".to_string()),
            width: "960PX".to_string(),
            refresh_rate: 300,
            paginate: true,
            checks_per_page: 10,
            pagination_rate: 30,
            tags: vec!["prod".to_string()],
            is_private: true,
            ..Default::default()
        };

        let mut remote = Dashboard::default();
        model.render(&mut remote).unwrap();
        assert_eq!(remote.dashboard_id, "dash-1");

        let mut refreshed = DashboardModel::default();
        refreshed.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }

    #[test]
    fn test_enumerations_are_validated() {
        let schema = DashboardResource.schema();

        let diagnostics = validate(
            &schema,
            &json!({"custom_url": "s", "refresh_rate": 120, "checks_per_page": 21}),
        );
        let attributes: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(diagnostics.len(), 2);
        assert!(attributes.contains(&"refresh_rate"));
        assert!(attributes.contains(&"checks_per_page"));
    }
}
