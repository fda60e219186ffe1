//! Managed resources.
//!
//! Every resource kind implements [`ManagedResource`]: a schema, a model that
//! can [`Refresh`] from and [`Render`] into the remote type, and the four
//! API hooks. [`Controller`] turns any such kind into a
//! [`ResourceController`], which runs the shared lifecycle:
//!
//! - **create**: decode plan, render, call create, refresh with
//!   [`RefreshMode::Created`].
//! - **read**: call get by ID; not found drops the resource from state,
//!   otherwise refresh with [`RefreshMode::Loaded`].
//! - **update**: decode plan, render, call update by ID, refresh with
//!   [`RefreshMode::Updated`].
//! - **delete**: call delete by ID; not found counts as deleted.
//! - **import**: state holding only the given ID; a read fills in the rest.
//!
//! Remote failures surface as `Error <Verb> <Resource>` diagnostics and are
//! never retried.

mod alert_channel;
mod check;
mod check_group;
mod common;
mod dashboard;
mod environment_variable;
mod heartbeat;
mod maintenance_window;
mod private_location;
mod snippet;
mod trigger_check;
mod trigger_group;

pub use alert_channel::{AlertChannelKind, AlertChannelResource};
pub use check::CheckResource;
pub use check_group::CheckGroupResource;
pub use dashboard::DashboardResource;
pub use environment_variable::EnvironmentVariableResource;
pub use heartbeat::HeartbeatResource;
pub use maintenance_window::MaintenanceWindowResource;
pub use private_location::PrivateLocationResource;
pub use snippet::SnippetResource;
pub use trigger_check::TriggerCheckResource;
pub use trigger_group::TriggerGroupResource;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::api::{ApiError, ChecklyClient};
use crate::error::ProviderError;
use crate::interop::{render_one, InteropResult, Objecter, Refresh, RefreshMode, Render};
use crate::schema::{AttributeType, Diagnostic, Schema};
use crate::validation;

/// Attribute stamped with the time of the last create or update.
pub const LAST_UPDATED: &str = "last_updated";

/// A resource kind backed by the Checkly API.
#[async_trait]
pub trait ManagedResource: Send + Sync + 'static {
    /// The API's representation.
    type Remote: Default + Send + Sync;
    /// The framework-side model.
    type Model: Refresh<Self::Remote>
        + Render<Self::Remote>
        + Serialize
        + DeserializeOwned
        + Default
        + Send;
    /// The parsed form of the state's `id` attribute.
    type Id: Send + Sync;

    /// Terraform type name, e.g. `checkly_check`.
    const TYPE_NAME: &'static str;
    /// Human-readable name used in error titles, e.g. `Check`.
    const DISPLAY_NAME: &'static str;

    /// The resource schema.
    fn schema(&self) -> Schema;

    /// Parse the state's `id` attribute.
    fn parse_id(raw: &str) -> InteropResult<Self::Id>;

    /// Checks beyond what the schema expresses.
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let _ = config;
        Vec::new()
    }

    /// Create the remote object.
    async fn create(
        &self,
        client: &ChecklyClient,
        remote: &Self::Remote,
    ) -> Result<Self::Remote, ApiError>;

    /// Fetch the remote object.
    async fn get(&self, client: &ChecklyClient, id: &Self::Id) -> Result<Self::Remote, ApiError>;

    /// Replace the remote object.
    async fn update(
        &self,
        client: &ChecklyClient,
        id: &Self::Id,
        remote: &Self::Remote,
    ) -> Result<Self::Remote, ApiError>;

    /// Delete the remote object.
    async fn delete(&self, client: &ChecklyClient, id: &Self::Id) -> Result<(), ApiError>;
}

/// Type-erased resource lifecycle, as held by the registry.
#[async_trait]
pub trait ResourceController: Send + Sync {
    /// Terraform type name.
    fn type_name(&self) -> &'static str;

    /// The resource schema.
    fn schema(&self) -> &Schema;

    /// Validate a configuration against the schema and resource rules.
    fn validate(&self, config: &Value) -> Vec<Diagnostic>;

    /// Create the resource from its planned state.
    async fn create(&self, client: &ChecklyClient, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh the resource; `None` means it no longer exists.
    async fn read(
        &self,
        client: &ChecklyClient,
        current: Value,
    ) -> Result<Option<Value>, ProviderError>;

    /// Update the resource in place.
    async fn update(
        &self,
        client: &ChecklyClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the resource.
    async fn delete(&self, client: &ChecklyClient, current: Value) -> Result<(), ProviderError>;

    /// State for an imported resource.
    fn import(&self, id: &str) -> Result<Value, ProviderError>;
}

/// Runs the shared lifecycle for a [`ManagedResource`].
pub struct Controller<K: ManagedResource> {
    kind: K,
    schema: Schema,
    objecter: Objecter,
}

impl<K: ManagedResource> Controller<K> {
    /// Wrap `kind`.
    pub fn new(kind: K) -> Self {
        let schema = kind.schema();
        let objecter = Objecter::for_schema(&schema);
        Self {
            kind,
            schema,
            objecter,
        }
    }

    fn decode(&self, value: &Value) -> Result<K::Model, ProviderError> {
        Ok(self.objecter.decode(value)?)
    }

    fn render(&self, model: &K::Model) -> Result<K::Remote, ProviderError> {
        Ok(render_one(model)?)
    }

    fn state_id(&self, state: &Value) -> Result<K::Id, ProviderError> {
        let raw = state
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ProviderError::Validation(format!(
                    "{} state has no id",
                    K::TYPE_NAME
                ))
            })?;
        Ok(K::parse_id(raw)?)
    }

    fn declares_last_updated(&self) -> bool {
        self.schema.block.attributes.contains_key(LAST_UPDATED)
    }

    /// Encode the refreshed model and settle `last_updated`.
    fn finish(&self, model: &K::Model, last_updated: Option<Value>) -> Result<Value, ProviderError> {
        let mut state = self.objecter.encode(model)?;
        if self.declares_last_updated() {
            if let Value::Object(map) = &mut state {
                map.insert(
                    LAST_UPDATED.to_string(),
                    last_updated.unwrap_or(Value::Null),
                );
            }
        }
        Ok(state)
    }
}

fn now_rfc3339() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[async_trait]
impl<K: ManagedResource> ResourceController for Controller<K> {
    fn type_name(&self) -> &'static str {
        K::TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = validation::validate(&self.schema, config);
        diagnostics.extend(self.kind.validate(config));
        diagnostics
    }

    async fn create(&self, client: &ChecklyClient, planned: Value) -> Result<Value, ProviderError> {
        let mut model = self.decode(&planned)?;
        let remote = self.render(&model)?;

        info!(resource = K::TYPE_NAME, "Creating resource");
        let created = self
            .kind
            .create(client, &remote)
            .await
            .map_err(|e| ProviderError::remote("Creating", K::DISPLAY_NAME, e))?;

        model.refresh(&created, RefreshMode::Created)?;
        let state = self.finish(&model, Some(now_rfc3339()))?;
        debug!(resource = K::TYPE_NAME, id = ?state.get("id"), "Created resource");
        Ok(state)
    }

    async fn read(
        &self,
        client: &ChecklyClient,
        current: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = self.state_id(&current)?;
        let mut model = self.decode(&current)?;

        debug!(resource = K::TYPE_NAME, id = ?current.get("id"), "Reading resource");
        let remote = match self.kind.get(client, &id).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => {
                warn!(
                    resource = K::TYPE_NAME,
                    id = ?current.get("id"),
                    "Resource no longer exists, removing from state"
                );
                return Ok(None);
            },
            Err(e) => return Err(ProviderError::remote("Reading", K::DISPLAY_NAME, e)),
        };

        model.refresh(&remote, RefreshMode::Loaded)?;
        let last_updated = current.get(LAST_UPDATED).cloned();
        self.finish(&model, last_updated).map(Some)
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let id = self.state_id(&prior)?;
        let mut model = self.decode(&planned)?;
        let remote = self.render(&model)?;

        info!(resource = K::TYPE_NAME, id = ?prior.get("id"), "Updating resource");
        let updated = self
            .kind
            .update(client, &id, &remote)
            .await
            .map_err(|e| ProviderError::remote("Updating", K::DISPLAY_NAME, e))?;

        model.refresh(&updated, RefreshMode::Updated)?;
        self.finish(&model, Some(now_rfc3339()))
    }

    async fn delete(&self, client: &ChecklyClient, current: Value) -> Result<(), ProviderError> {
        let id = self.state_id(&current)?;

        info!(resource = K::TYPE_NAME, id = ?current.get("id"), "Deleting resource");
        match self.kind.delete(client, &id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(resource = K::TYPE_NAME, "Resource already deleted");
                Ok(())
            },
            Err(e) => Err(ProviderError::remote("Deleting", K::DISPLAY_NAME, e)),
        }
    }

    fn import(&self, id: &str) -> Result<Value, ProviderError> {
        K::parse_id(id)?;

        let mut state = Map::new();
        if let AttributeType::Object(fields) = self.objecter.attribute_type() {
            for name in fields.keys() {
                state.insert(name.clone(), Value::Null);
            }
        }
        state.insert("id".to_string(), Value::String(id.to_string()));
        Ok(Value::Object(state))
    }
}

/// `raw` as an owned string ID.
pub(crate) fn string_id(raw: &str) -> InteropResult<String> {
    Ok(raw.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockTransport};
    use reqwest::Method;
    use serde_json::json;
    use super::test_support::client;

    fn snippets() -> Controller<SnippetResource> {
        Controller::new(SnippetResource)
    }

    #[tokio::test]
    async fn test_create_refreshes_from_response() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::POST && req.path == "/v1/snippets")
            .times(1)
            .returning(|req| {
                let mut body = req.body.unwrap_or_default();
                body["id"] = json!(12);
                Ok(Some(body))
            });

        let state = snippets()
            .create(
                &client(mock),
                json!({"id": crate::interop::UNKNOWN, "name": "setup", "script": "console.log(1)"}),
            )
            .await
            .unwrap();

        assert_eq!(state["id"], json!("12"));
        assert_eq!(state["name"], json!("setup"));
        assert_eq!(state["script"], json!("console.log(1)"));
    }

    #[tokio::test]
    async fn test_create_failure_is_titled() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| {
            Err(ApiError::Status {
                status: 400,
                body: "bad script".to_string(),
            })
        });

        let err = snippets()
            .create(&client(mock), json!({"name": "n", "script": "s"}))
            .await
            .unwrap_err();

        let diagnostics = err.to_diagnostics();
        assert_eq!(diagnostics[0].summary, "Error Creating Snippet");
        assert_eq!(
            diagnostics[0].detail.as_deref(),
            Some("unexpected response status: 400, bad script")
        );
    }

    #[tokio::test]
    async fn test_read_not_found_drops_state() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.path == "/v1/snippets/12")
            .returning(|_| {
                Err(ApiError::Status {
                    status: 404,
                    body: String::new(),
                })
            });

        let state = snippets()
            .read(&client(mock), json!({"id": "12", "name": "n", "script": "s"}))
            .await
            .unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_read_not_found_from_message() {
        for message in [
            "GET /v1/snippets/12: unexpected response status: 404, {}",
            "unexpected response status 404",
        ] {
            let mut mock = MockTransport::new();
            mock.expect_send()
                .returning(move |_| Err(ApiError::Other(message.to_string())));

            let state = snippets()
                .read(&client(mock), json!({"id": "12"}))
                .await
                .unwrap();
            assert!(state.is_none(), "{} should mean not found", message);
        }
    }

    #[tokio::test]
    async fn test_read_other_errors_are_reported() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Err(ApiError::Transport("connection reset".to_string())));

        let err = snippets()
            .read(&client(mock), json!({"id": "12"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_diagnostics()[0].summary, "Error Reading Snippet");
    }

    #[tokio::test]
    async fn test_read_rejects_invalid_numeric_id() {
        let mock = MockTransport::new();

        let err = snippets()
            .read(&client(mock), json!({"id": "not-a-number"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_diagnostics()[0].summary, "Invalid ID");
    }

    #[tokio::test]
    async fn test_update_uses_prior_id() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::PUT && req.path == "/v1/snippets/12")
            .times(1)
            .returning(|req| Ok(req.body));

        let state = snippets()
            .update(
                &client(mock),
                json!({"id": "12", "name": "old", "script": "s"}),
                json!({"id": "12", "name": "new", "script": "s"}),
            )
            .await
            .unwrap();
        assert_eq!(state["id"], json!("12"));
        assert_eq!(state["name"], json!("new"));
    }

    #[tokio::test]
    async fn test_delete_not_found_is_success() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::DELETE && req.path == "/v1/snippets/12")
            .returning(|_| {
                Err(ApiError::Status {
                    status: 404,
                    body: String::new(),
                })
            });

        snippets()
            .delete(&client(mock), json!({"id": "12"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| {
            Err(ApiError::Status {
                status: 500,
                body: "oops".to_string(),
            })
        });

        let err = snippets()
            .delete(&client(mock), json!({"id": "12"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_diagnostics()[0].summary, "Error Deleting Snippet");
    }

    #[test]
    fn test_import_sets_only_id() {
        let state = snippets().import("12").unwrap();
        assert_eq!(state["id"], json!("12"));
        assert_eq!(state["name"], Value::Null);
        assert_eq!(state["script"], Value::Null);

        assert!(snippets().import("abc").is_err());
    }

    #[tokio::test]
    async fn test_last_updated_is_stamped_and_carried() {
        let controller = Controller::new(CheckGroupResource);

        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::POST)
            .returning(|req| {
                let mut body = req.body.unwrap_or_default();
                body["id"] = json!(5);
                Ok(Some(body))
            });
        mock.expect_send()
            .withf(|req| req.method == Method::GET)
            .returning(|_| Ok(Some(json!({"id": 5, "name": "g", "concurrency": 1, "activated": true}))));
        let client = client(mock);

        let created = controller
            .create(
                &client,
                json!({"name": "g", "concurrency": 1, "activated": true}),
            )
            .await
            .unwrap();
        let stamp = created[LAST_UPDATED].clone();
        assert!(stamp.as_str().is_some_and(|s| s.ends_with('Z')));

        let read = controller.read(&client, created).await.unwrap().unwrap();
        assert_eq!(read[LAST_UPDATED], stamp);
    }
}
