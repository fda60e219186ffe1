use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::common::refresh_id;
use super::ManagedResource;
use crate::api::models::Snippet;
use crate::api::{ApiError, ChecklyClient};
use crate::interop::{
    parse_numeric_id, parse_optional_numeric_id, InteropResult, Refresh, RefreshMode, Render,
};
use crate::schema::{Attribute, Schema, Validator};

/// `checkly_snippet`: reusable code for browser checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetModel {
    pub id: String,
    pub name: String,
    pub script: String,
}

impl Refresh<Snippet> for SnippetModel {
    fn refresh(&mut self, remote: &Snippet, mode: RefreshMode) -> InteropResult<()> {
        let id = remote.id.map(|id| id.to_string()).unwrap_or_default();
        refresh_id(&mut self.id, id, mode);
        self.name = remote.name.clone();
        self.script = remote.script.clone();
        Ok(())
    }
}

impl Render<Snippet> for SnippetModel {
    fn render(&self, remote: &mut Snippet) -> InteropResult<()> {
        remote.id = parse_optional_numeric_id(&self.id, "id")?;
        remote.name = self.name.clone();
        remote.script = self.script.clone();
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for SnippetResource {
    type Remote = Snippet;
    type Model = SnippetModel;
    type Id = i64;

    const TYPE_NAME: &'static str = "checkly_snippet";
    const DISPLAY_NAME: &'static str = "Snippet";

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Snippets can be used to reuse code across browser checks.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_description("The name of the snippet.")
                    .with_validator(Validator::not_empty()),
            )
            .with_attribute(
                "script",
                Attribute::required_string()
                    .with_description("Your Node.js code that interacts with the browser check."),
            )
    }

    fn parse_id(raw: &str) -> InteropResult<i64> {
        parse_numeric_id(raw, "id")
    }

    async fn create(&self, client: &ChecklyClient, remote: &Snippet) -> Result<Snippet, ApiError> {
        client.create_snippet(remote).await
    }

    async fn get(&self, client: &ChecklyClient, id: &i64) -> Result<Snippet, ApiError> {
        client.get_snippet(*id).await
    }

    async fn update(
        &self,
        client: &ChecklyClient,
        id: &i64,
        remote: &Snippet,
    ) -> Result<Snippet, ApiError> {
        client.update_snippet(*id, remote).await
    }

    async fn delete(&self, client: &ChecklyClient, id: &i64) -> Result<(), ApiError> {
        client.delete_snippet(*id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let model = SnippetModel {
            id: "4".to_string(),
            name: "login".to_string(),
            script: "await page.goto('/login')".to_string(),
        };

        let mut remote = Snippet::default();
        model.render(&mut remote).unwrap();
        assert_eq!(remote.id, Some(4));

        let mut refreshed = SnippetModel::default();
        refreshed.refresh(&remote, RefreshMode::Loaded).unwrap();
        assert_eq!(refreshed, model);
    }

    #[test]
    fn test_unsaved_id_renders_as_none() {
        let model = SnippetModel {
            name: "n".to_string(),
            ..Default::default()
        };
        let mut remote = Snippet::default();
        model.render(&mut remote).unwrap();
        assert_eq!(remote.id, None);
    }

    #[test]
    fn test_invalid_id_is_diagnostic() {
        let model = SnippetModel {
            id: "abc".to_string(),
            ..Default::default()
        };
        let err = model.render(&mut Snippet::default()).unwrap_err();
        assert_eq!(err[0].summary, "Invalid ID");
    }
}
