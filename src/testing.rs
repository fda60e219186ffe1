//! Helpers for driving a provider in tests.
//!
//! [`ProviderTester`] runs the same plan/apply sequence a host would, so a
//! test can go from configuration to state in one call and then assert on
//! the result.
//!
//! ```ignore
//! use checkly_provider::testing::{assert_plan_creates, ProviderTester};
//! use serde_json::json;
//!
//! let tester = ProviderTester::with_transport(transport);
//! let config = json!({"name": "setup", "script": "init()"});
//!
//! assert_plan_creates(&tester.plan_create("checkly_snippet", config.clone()).await?);
//! let state = tester.apply("checkly_snippet", None, config).await?;
//! assert_eq!(state["name"], "setup");
//! ```

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::api::{ChecklyClient, Transport};
use crate::error::ProviderError;
use crate::provider::ChecklyProvider;
use crate::schema::{Diagnostic, DiagnosticSeverity};
use crate::service::ProviderService;
use crate::types::PlanResult;

/// Wraps a [`ProviderService`] with host-like convenience calls.
pub struct ProviderTester<P: ProviderService = ChecklyProvider> {
    provider: P,
}

impl ProviderTester<ChecklyProvider> {
    /// A Checkly provider that sends its API calls to `transport`.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(ChecklyProvider::with_client(ChecklyClient::new(transport)))
    }
}

impl<P: ProviderService> ProviderTester<P> {
    /// Wrap `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Configure the provider, failing on error diagnostics.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        check_diagnostics(self.provider.configure(config).await?)
    }

    /// Validate a resource configuration, failing on error diagnostics.
    pub async fn validate(&self, resource_type: &str, config: Value) -> Result<(), TestError> {
        check_diagnostics(
            self.provider
                .validate_resource_config(resource_type, config)
                .await?,
        )
    }

    /// Plan a resource that does not exist yet.
    pub async fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, config.clone(), config)
            .await
    }

    /// Plan `prior` towards `config`.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior), config.clone(), config)
            .await
    }

    /// Plan the destruction of `prior`.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior), Value::Null, Value::Null)
            .await
    }

    /// Plan and then carry out the plan, the way a host applies one change.
    ///
    /// Replacements delete `prior` before creating the new object.
    pub async fn apply(
        &self,
        resource_type: &str,
        prior: Option<Value>,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let planned = match &prior {
            Some(prior) => self.plan_update(resource_type, prior.clone(), config).await?,
            None => self.plan_create(resource_type, config).await?,
        };

        match prior {
            None => {
                self.provider
                    .create(resource_type, planned.planned_state)
                    .await
            },
            Some(prior) if planned.requires_replace => {
                self.provider.delete(resource_type, prior).await?;
                self.provider
                    .create(resource_type, planned.planned_state)
                    .await
            },
            Some(prior) if !planned.has_changes() => Ok(prior),
            Some(prior) => {
                self.provider
                    .update(resource_type, prior, planned.planned_state)
                    .await
            },
        }
    }

    /// Refresh `state`; `None` when the remote object is gone.
    pub async fn refresh(
        &self,
        resource_type: &str,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        self.provider.read(resource_type, state).await
    }

    /// Plan and carry out the destruction of `state`.
    pub async fn destroy(&self, resource_type: &str, state: Value) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, state.clone()).await?;
        self.provider.delete(resource_type, state).await
    }

    /// Import `id`, then refresh it into full state.
    pub async fn import(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Option<Value>, ProviderError> {
        let imported = self.provider.import_resource(resource_type, id).await?;
        match imported.into_iter().next() {
            Some(resource) => self.refresh(resource_type, resource.state).await,
            None => Ok(None),
        }
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }
}

/// A test step failed.
#[derive(Debug, Error)]
pub enum TestError {
    /// Validation or configuration returned error diagnostics.
    #[error("{}", render_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// The provider returned an error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("{} error diagnostic(s):", diagnostics.len());
    for d in diagnostics {
        out.push_str("\n  ");
        out.push_str(&d.summary);
        if let Some(detail) = &d.detail {
            out.push_str(": ");
            out.push_str(detail);
        }
        if let Some(attr) = &d.attribute {
            out.push_str(&format!(" (at {})", attr));
        }
    }
    out
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<Diagnostic> = diagnostics
        .into_iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// Assert that `plan` creates a new object.
///
/// # Panics
///
/// Panics if the plan is empty or replaces an object.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(plan.has_changes(), "expected a create plan, got no changes");
    assert!(!plan.requires_replace, "expected a create plan, got a replacement");
}

/// Assert that `plan` changes nothing.
///
/// # Panics
///
/// Panics if the plan has changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        !plan.has_changes(),
        "expected no changes, got: {:?}",
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that `plan` replaces the object.
///
/// # Panics
///
/// Panics if the plan updates in place.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(plan.requires_replace, "expected the plan to require replacement");
}

/// Assert that `plan` touches `path`.
///
/// # Panics
///
/// Panics if no change has that path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "expected a change to '{}', got: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that some error diagnostic mentions `needle` in its summary or
/// detail.
///
/// # Panics
///
/// Panics if none does.
pub fn assert_error_contains(diagnostics: &[Diagnostic], needle: &str) {
    let found = diagnostics.iter().any(|d| {
        d.severity == DiagnosticSeverity::Error
            && (d.summary.contains(needle)
                || d.detail.as_deref().is_some_and(|detail| detail.contains(needle)))
    });
    assert!(
        found,
        "expected an error mentioning '{}', got: {:?}",
        needle,
        diagnostics
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use reqwest::Method;
    use serde_json::json;

    fn snippet_transport() -> MockTransport {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::POST && req.path == "/v1/snippets")
            .returning(|req| {
                let mut body = req.body.unwrap_or_default();
                body["id"] = json!(42);
                Ok(Some(body))
            });
        mock.expect_send()
            .withf(|req| req.method == Method::PUT && req.path == "/v1/snippets/42")
            .returning(|req| {
                let mut body = req.body.unwrap_or_default();
                body["id"] = json!(42);
                Ok(Some(body))
            });
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.path == "/v1/snippets/42")
            .returning(|_| Ok(Some(json!({"id": 42, "name": "setup", "script": "v2()"}))));
        mock.expect_send()
            .withf(|req| req.method == Method::DELETE && req.path == "/v1/snippets/42")
            .times(1)
            .returning(|_| Ok(None));
        mock
    }

    #[tokio::test]
    async fn test_snippet_lifecycle() {
        let tester = ProviderTester::with_transport(Arc::new(snippet_transport()));

        let v1 = json!({"name": "setup", "script": "init()"});
        assert_plan_creates(&tester.plan_create("checkly_snippet", v1.clone()).await.unwrap());
        let created = tester.apply("checkly_snippet", None, v1.clone()).await.unwrap();
        assert_eq!(created["id"], "42");

        let unchanged = tester
            .plan_update("checkly_snippet", created.clone(), v1)
            .await
            .unwrap();
        assert_plan_no_changes(&unchanged);

        let v2 = json!({"name": "setup", "script": "v2()"});
        let plan = tester
            .plan_update("checkly_snippet", created.clone(), v2.clone())
            .await
            .unwrap();
        assert_plan_changes_attribute(&plan, "script");
        let updated = tester
            .apply("checkly_snippet", Some(created), v2)
            .await
            .unwrap();
        assert_eq!(updated["script"], "v2()");

        let refreshed = tester
            .refresh("checkly_snippet", updated.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed["script"], "v2()");

        tester.destroy("checkly_snippet", refreshed).await.unwrap();
    }

    #[tokio::test]
    async fn test_check_type_change_replaces() {
        let tester = ProviderTester::with_transport(Arc::new(MockTransport::new()));
        let prior = json!({
            "id": "c-1",
            "name": "home",
            "type": "API",
            "activated": true,
            "frequency": 10,
            "locations": ["eu-west-1"],
            "request": {"url": "https://example.com"}
        });
        let config = json!({
            "name": "home",
            "type": "BROWSER",
            "activated": true,
            "frequency": 10,
            "locations": ["eu-west-1"],
            "script": "await page.goto('https://example.com')"
        });

        let plan = tester
            .plan_update("checkly_check", prior, config)
            .await
            .unwrap();
        assert_plan_replaces(&plan);
        assert_plan_changes_attribute(&plan, "type");
    }

    #[tokio::test]
    async fn test_validate_reports_diagnostics() {
        let tester = ProviderTester::new(ChecklyProvider::new());
        let err = tester
            .validate(
                "checkly_alert_channel",
                json!({"email": {"address": "a@b.c"}, "sms": {"name": "n", "number": "1"}}),
            )
            .await
            .unwrap_err();

        let TestError::Diagnostics(diagnostics) = &err else {
            panic!("expected diagnostics, got {}", err);
        };
        assert_error_contains(diagnostics, "exactly one of");
        assert!(err.to_string().contains("error diagnostic(s)"));
    }

    #[tokio::test]
    async fn test_configure_failure_is_provider_error() {
        let tester = ProviderTester::new(ChecklyProvider::new());
        let result = tester.configure(json!({"api_key": 7})).await;
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "expected an error mentioning")]
    fn test_assert_error_contains_fails() {
        assert_error_contains(&[Diagnostic::warning("heads up")], "heads up");
    }
}
