//! Client for the Checkly REST API.
//!
//! [`ChecklyClient`] exposes typed CRUD calls for every entity kind. It
//! speaks to the service through a [`Transport`], so tests can swap the HTTP
//! layer for a mock.

mod error;
mod http;
pub mod models;

pub use error::ApiError;
pub use http::HttpTransport;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use models::{
    AlertChannel, Check, Dashboard, EnvironmentVariable, Group, HeartbeatCheck, MaintenanceWindow,
    PrivateLocation, Snippet, StaticIp, TriggerCheck, TriggerGroup,
};

/// A single API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/v1/checks`.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request without a body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends requests to the Checkly API.
///
/// Implementations return the decoded JSON body, or `None` for empty
/// responses, and map non-success statuses to [`ApiError::Status`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request.
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, ApiError>;
}

/// Typed Checkly API client.
///
/// Cheap to clone; safe to share between concurrent operations.
#[derive(Clone)]
pub struct ChecklyClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ChecklyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecklyClient").finish_non_exhaustive()
    }
}

impl ChecklyClient {
    /// Create a client over `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let request = ApiRequest {
            method,
            path,
            body,
        };
        let response = self
            .transport
            .send(request)
            .await?
            .ok_or_else(|| ApiError::Decode("empty response body".to_string()))?;
        Ok(serde_json::from_value(response)?)
    }

    async fn send_json<B, T>(&self, method: Method, path: String, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.call(method, path, Some(body)).await
    }

    async fn remove(&self, path: String) -> Result<(), ApiError> {
        self.transport
            .send(ApiRequest::new(Method::DELETE, path))
            .await?;
        Ok(())
    }

    // Checks

    /// Create a check.
    pub async fn create_check(&self, check: &Check) -> Result<Check, ApiError> {
        self.send_json(Method::POST, "/v1/checks".to_string(), check)
            .await
    }

    /// Fetch a check.
    pub async fn get_check(&self, id: &str) -> Result<Check, ApiError> {
        self.call(Method::GET, format!("/v1/checks/{}", urlencoding::encode(id)), None)
            .await
    }

    /// Replace a check.
    pub async fn update_check(&self, id: &str, check: &Check) -> Result<Check, ApiError> {
        self.send_json(Method::PUT, format!("/v1/checks/{}", urlencoding::encode(id)), check)
            .await
    }

    /// Delete a check.
    pub async fn delete_check(&self, id: &str) -> Result<(), ApiError> {
        self.remove(format!("/v1/checks/{}", urlencoding::encode(id))).await
    }

    // Heartbeats

    /// Create a heartbeat check.
    pub async fn create_heartbeat(
        &self,
        heartbeat: &HeartbeatCheck,
    ) -> Result<HeartbeatCheck, ApiError> {
        self.send_json(Method::POST, "/v1/checks/heartbeat".to_string(), heartbeat)
            .await
    }

    /// Fetch a heartbeat check.
    pub async fn get_heartbeat(&self, id: &str) -> Result<HeartbeatCheck, ApiError> {
        self.call(Method::GET, format!("/v1/checks/{}", urlencoding::encode(id)), None)
            .await
    }

    /// Replace a heartbeat check.
    pub async fn update_heartbeat(
        &self,
        id: &str,
        heartbeat: &HeartbeatCheck,
    ) -> Result<HeartbeatCheck, ApiError> {
        self.send_json(
            Method::PUT,
            format!("/v1/checks/heartbeat/{}", urlencoding::encode(id)),
            heartbeat,
        )
        .await
    }

    /// Delete a heartbeat check.
    pub async fn delete_heartbeat(&self, id: &str) -> Result<(), ApiError> {
        self.remove(format!("/v1/checks/{}", urlencoding::encode(id))).await
    }

    // Check groups

    /// Create a check group.
    pub async fn create_group(&self, group: &Group) -> Result<Group, ApiError> {
        self.send_json(Method::POST, "/v1/check-groups".to_string(), group)
            .await
    }

    /// Fetch a check group.
    pub async fn get_group(&self, id: i64) -> Result<Group, ApiError> {
        self.call(Method::GET, format!("/v1/check-groups/{}", id), None)
            .await
    }

    /// Replace a check group.
    pub async fn update_group(&self, id: i64, group: &Group) -> Result<Group, ApiError> {
        self.send_json(Method::PUT, format!("/v1/check-groups/{}", id), group)
            .await
    }

    /// Delete a check group.
    pub async fn delete_group(&self, id: i64) -> Result<(), ApiError> {
        self.remove(format!("/v1/check-groups/{}", id)).await
    }

    // Alert channels

    /// Create an alert channel.
    pub async fn create_alert_channel(
        &self,
        channel: &AlertChannel,
    ) -> Result<AlertChannel, ApiError> {
        self.send_json(Method::POST, "/v1/alert-channels".to_string(), channel)
            .await
    }

    /// Fetch an alert channel.
    pub async fn get_alert_channel(&self, id: i64) -> Result<AlertChannel, ApiError> {
        self.call(Method::GET, format!("/v1/alert-channels/{}", id), None)
            .await
    }

    /// Replace an alert channel.
    pub async fn update_alert_channel(
        &self,
        id: i64,
        channel: &AlertChannel,
    ) -> Result<AlertChannel, ApiError> {
        self.send_json(Method::PUT, format!("/v1/alert-channels/{}", id), channel)
            .await
    }

    /// Delete an alert channel.
    pub async fn delete_alert_channel(&self, id: i64) -> Result<(), ApiError> {
        self.remove(format!("/v1/alert-channels/{}", id)).await
    }

    // Dashboards

    /// Create a dashboard.
    pub async fn create_dashboard(&self, dashboard: &Dashboard) -> Result<Dashboard, ApiError> {
        self.send_json(Method::POST, "/v1/dashboards".to_string(), dashboard)
            .await
    }

    /// Fetch a dashboard.
    pub async fn get_dashboard(&self, id: &str) -> Result<Dashboard, ApiError> {
        self.call(Method::GET, format!("/v1/dashboards/{}", urlencoding::encode(id)), None)
            .await
    }

    /// Replace a dashboard.
    pub async fn update_dashboard(
        &self,
        id: &str,
        dashboard: &Dashboard,
    ) -> Result<Dashboard, ApiError> {
        self.send_json(
            Method::PUT,
            format!("/v1/dashboards/{}", urlencoding::encode(id)),
            dashboard,
        )
        .await
    }

    /// Delete a dashboard.
    pub async fn delete_dashboard(&self, id: &str) -> Result<(), ApiError> {
        self.remove(format!("/v1/dashboards/{}", urlencoding::encode(id))).await
    }

    // Environment variables

    /// Create an environment variable.
    pub async fn create_environment_variable(
        &self,
        variable: &EnvironmentVariable,
    ) -> Result<EnvironmentVariable, ApiError> {
        self.send_json(Method::POST, "/v1/variables".to_string(), variable)
            .await
    }

    /// Fetch an environment variable by key.
    pub async fn get_environment_variable(
        &self,
        key: &str,
    ) -> Result<EnvironmentVariable, ApiError> {
        self.call(Method::GET, format!("/v1/variables/{}", urlencoding::encode(key)), None)
            .await
    }

    /// Replace an environment variable.
    pub async fn update_environment_variable(
        &self,
        key: &str,
        variable: &EnvironmentVariable,
    ) -> Result<EnvironmentVariable, ApiError> {
        self.send_json(
            Method::PUT,
            format!("/v1/variables/{}", urlencoding::encode(key)),
            variable,
        )
        .await
    }

    /// Delete an environment variable.
    pub async fn delete_environment_variable(&self, key: &str) -> Result<(), ApiError> {
        self.remove(format!("/v1/variables/{}", urlencoding::encode(key))).await
    }

    // Maintenance windows

    /// Create a maintenance window.
    pub async fn create_maintenance_window(
        &self,
        window: &MaintenanceWindow,
    ) -> Result<MaintenanceWindow, ApiError> {
        self.send_json(Method::POST, "/v1/maintenance-windows".to_string(), window)
            .await
    }

    /// Fetch a maintenance window.
    pub async fn get_maintenance_window(&self, id: i64) -> Result<MaintenanceWindow, ApiError> {
        self.call(Method::GET, format!("/v1/maintenance-windows/{}", id), None)
            .await
    }

    /// Replace a maintenance window.
    pub async fn update_maintenance_window(
        &self,
        id: i64,
        window: &MaintenanceWindow,
    ) -> Result<MaintenanceWindow, ApiError> {
        self.send_json(
            Method::PUT,
            format!("/v1/maintenance-windows/{}", id),
            window,
        )
        .await
    }

    /// Delete a maintenance window.
    pub async fn delete_maintenance_window(&self, id: i64) -> Result<(), ApiError> {
        self.remove(format!("/v1/maintenance-windows/{}", id)).await
    }

    // Private locations

    /// Create a private location. Only this response carries raw keys.
    pub async fn create_private_location(
        &self,
        location: &PrivateLocation,
    ) -> Result<PrivateLocation, ApiError> {
        self.send_json(Method::POST, "/v1/private-locations".to_string(), location)
            .await
    }

    /// Fetch a private location.
    pub async fn get_private_location(&self, id: &str) -> Result<PrivateLocation, ApiError> {
        self.call(Method::GET, format!("/v1/private-locations/{}", urlencoding::encode(id)), None)
            .await
    }

    /// Replace a private location.
    pub async fn update_private_location(
        &self,
        id: &str,
        location: &PrivateLocation,
    ) -> Result<PrivateLocation, ApiError> {
        self.send_json(
            Method::PUT,
            format!("/v1/private-locations/{}", urlencoding::encode(id)),
            location,
        )
        .await
    }

    /// Delete a private location.
    pub async fn delete_private_location(&self, id: &str) -> Result<(), ApiError> {
        self.remove(format!("/v1/private-locations/{}", urlencoding::encode(id))).await
    }

    // Snippets

    /// Create a snippet.
    pub async fn create_snippet(&self, snippet: &Snippet) -> Result<Snippet, ApiError> {
        self.send_json(Method::POST, "/v1/snippets".to_string(), snippet)
            .await
    }

    /// Fetch a snippet.
    pub async fn get_snippet(&self, id: i64) -> Result<Snippet, ApiError> {
        self.call(Method::GET, format!("/v1/snippets/{}", id), None)
            .await
    }

    /// Replace a snippet.
    pub async fn update_snippet(&self, id: i64, snippet: &Snippet) -> Result<Snippet, ApiError> {
        self.send_json(Method::PUT, format!("/v1/snippets/{}", id), snippet)
            .await
    }

    /// Delete a snippet.
    pub async fn delete_snippet(&self, id: i64) -> Result<(), ApiError> {
        self.remove(format!("/v1/snippets/{}", id)).await
    }

    // Triggers

    /// Create the trigger URL of a check.
    pub async fn create_trigger_check(&self, check_id: &str) -> Result<TriggerCheck, ApiError> {
        self.call(
            Method::POST,
            format!("/v1/triggers/checks/{}", urlencoding::encode(check_id)),
            None,
        )
        .await
    }

    /// Fetch the trigger URL of a check.
    pub async fn get_trigger_check(&self, check_id: &str) -> Result<TriggerCheck, ApiError> {
        self.call(
            Method::GET,
            format!("/v1/triggers/checks/{}", urlencoding::encode(check_id)),
            None,
        )
        .await
    }

    /// Delete the trigger URL of a check.
    pub async fn delete_trigger_check(&self, check_id: &str) -> Result<(), ApiError> {
        self.remove(format!("/v1/triggers/checks/{}", urlencoding::encode(check_id)))
            .await
    }

    /// Create the trigger URL of a check group.
    pub async fn create_trigger_group(&self, group_id: i64) -> Result<TriggerGroup, ApiError> {
        self.call(
            Method::POST,
            format!("/v1/triggers/check-groups/{}", group_id),
            None,
        )
        .await
    }

    /// Fetch the trigger URL of a check group.
    pub async fn get_trigger_group(&self, group_id: i64) -> Result<TriggerGroup, ApiError> {
        self.call(
            Method::GET,
            format!("/v1/triggers/check-groups/{}", group_id),
            None,
        )
        .await
    }

    /// Delete the trigger URL of a check group.
    pub async fn delete_trigger_group(&self, group_id: i64) -> Result<(), ApiError> {
        self.remove(format!("/v1/triggers/check-groups/{}", group_id))
            .await
    }

    // Static IPs

    /// List the addresses Checkly runs checks from.
    pub async fn list_static_ips(&self) -> Result<Vec<StaticIp>, ApiError> {
        self.call(Method::GET, "/v1/static-ips".to_string(), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(mock: MockTransport) -> ChecklyClient {
        ChecklyClient::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_create_check_posts_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::POST
                    && req.path == "/v1/checks"
                    && req.body.as_ref().and_then(|b| b.get("name")) == Some(&json!("api"))
            })
            .times(1)
            .returning(|req| {
                let mut body = req.body.unwrap_or_default();
                body["id"] = json!("c-1");
                Ok(Some(body))
            });

        let check = Check {
            name: "api".to_string(),
            check_type: "API".to_string(),
            ..Default::default()
        };
        let created = client(mock).create_check(&check).await.unwrap();

        assert_eq!(created.id, "c-1");
        assert_eq!(created.name, "api");
    }

    #[tokio::test]
    async fn test_get_group_uses_numeric_path() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.path == "/v1/check-groups/42")
            .returning(|_| Ok(Some(json!({"id": 42, "name": "g", "concurrency": 3}))));

        let group = client(mock).get_group(42).await.unwrap();
        assert_eq!(group.id, Some(42));
        assert_eq!(group.concurrency, 3);
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_response() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::DELETE && req.path == "/v1/snippets/7")
            .returning(|_| Ok(None));

        client(mock).delete_snippet(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_body_where_object_expected() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| Ok(None));

        let err = client(mock).get_check("c-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_status_errors_pass_through() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| {
            Err(ApiError::Status {
                status: 404,
                body: "not found".to_string(),
            })
        });

        let err = client(mock).get_dashboard("d-1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_string_ids_stay_in_one_segment() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::DELETE
                    && req.path == "/v1/checks/x%2F..%2F..%2Fcheck-groups%2F5%3Fa%23b"
            })
            .times(1)
            .returning(|_| Ok(None));
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.path == "/v1/variables/API%20KEY")
            .times(1)
            .returning(|_| Ok(Some(json!({"key": "API KEY", "value": "v"}))));

        let client = client(mock);
        client
            .delete_check("x/../../check-groups/5?a#b")
            .await
            .unwrap();
        let variable = client.get_environment_variable("API KEY").await.unwrap();
        assert_eq!(variable.key, "API KEY");
    }

    #[tokio::test]
    async fn test_trigger_check_has_no_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::POST
                    && req.path == "/v1/triggers/checks/c-9"
                    && req.body.is_none()
            })
            .returning(|_| {
                Ok(Some(json!({
                    "id": 1,
                    "checkId": "c-9",
                    "token": "tok",
                    "url": "https://api.checklyhq.com/checks/c-9/trigger/tok"
                })))
            });

        let trigger = client(mock).create_trigger_check("c-9").await.unwrap();
        assert_eq!(trigger.check_id, "c-9");
        assert_eq!(trigger.token, "tok");
    }

    #[tokio::test]
    async fn test_list_static_ips() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.path == "/v1/static-ips")
            .returning(|_| {
                Ok(Some(json!([
                    {"region": "eu-west-1", "address": "1.2.3.4/32"},
                    {"region": "us-east-1", "address": "2600::1/128"}
                ])))
            });

        let ips = client(mock).list_static_ips().await.unwrap();
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[1].region, "us-east-1");
    }
}
