//! Checkly Provider
//!
//! An infrastructure-as-code provider for [Checkly](https://www.checklyhq.com)
//! monitoring resources: checks, check groups, alert channels, heartbeats,
//! dashboards, maintenance windows, private locations, snippets, environment
//! variables and trigger URLs, plus a static IP data source.
//!
//! # Overview
//!
//! - **Schemas**: every resource declares its attributes, defaults and
//!   validators with the [`schema`] builders.
//! - **Interop**: [`interop`] converts between framework values and Checkly
//!   API models. Each model implements `Refresh` and `Render`, and a
//!   [`Gluer`](interop::Gluer) joins a nested model to a named attribute.
//! - **API client**: [`api::ChecklyClient`] wraps the REST API behind a
//!   mockable [`api::Transport`].
//! - **Provider**: [`ChecklyProvider`] implements [`ProviderService`], routing
//!   validate/plan/create/read/update/delete/import calls to the
//!   [`Registry`] of resource controllers.
//!
//! # Quick Start
//!
//! ```no_run
//! use checkly_provider::{init_logging, ChecklyProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), checkly_provider::ProviderError> {
//!     init_logging();
//!
//!     let provider = ChecklyProvider::new();
//!     provider.configure(json!({"account_id": "acc-1"})).await?;
//!
//!     let config = json!({
//!         "name": "nightly backup",
//!         "activated": true,
//!         "heartbeat": {"period": 1, "period_unit": "days", "grace": 1, "grace_unit": "hours"}
//!     });
//!     let plan = provider
//!         .plan("checkly_heartbeat", None, config.clone(), config)
//!         .await?;
//!     let state = provider.create("checkly_heartbeat", plan.planned_state).await?;
//!     tracing::info!(ping_token = %state["heartbeat"]["ping_token"], "Heartbeat ready");
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The provider reads `api_key`, `api_url` and `account_id` from its
//! configuration, falling back to `CHECKLY_API_KEY`, `CHECKLY_API_URL` and
//! `CHECKLY_ACCOUNT_ID`. `CHECKLY_API_SOURCE` overrides the source header
//! and `CHECKLY_DEBUG_LOG` sends debug logs to a file (see [`logging`]).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod interop;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::ChecklyProvider;
pub use registry::Registry;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

pub use async_trait::async_trait;
pub use serde_json;
pub use tracing;
