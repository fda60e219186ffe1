//! Error types for the Checkly provider.

use thiserror::Error;

use crate::api::ApiError;
use crate::schema::Diagnostic;

/// Errors that can occur while serving a provider operation.
///
/// Every failure is scoped to a single operation and reaches the host as
/// diagnostics (see [`ProviderError::to_diagnostics`]).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A call to the remote API failed.
    #[error("{summary}: {source}")]
    Remote {
        /// Static title, e.g. `Error Creating Check`.
        summary: String,
        /// The underlying API error.
        source: ApiError,
    },

    /// Conversion or validation produced error diagnostics.
    #[error("{}", summarize(.0))]
    Diagnostics(Vec<Diagnostic>),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Wrap a remote-call failure with an `Error <verb> <resource>` title.
    pub fn remote(verb: &str, resource: &str, source: ApiError) -> Self {
        Self::Remote {
            summary: format!("Error {} {}", verb, resource),
            source,
        }
    }

    /// Get the error message as a string.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Configuration(msg) => msg.clone(),
            Self::UnknownResource(msg) => msg.clone(),
            Self::Serialization(err) => err.to_string(),
            Self::Remote { source, .. } => source.to_string(),
            Self::Diagnostics(diagnostics) => summarize(diagnostics),
            Self::Unimplemented(msg) => msg.clone(),
        }
    }

    /// Convert this error into diagnostics for the host.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Diagnostics(diagnostics) => diagnostics.clone(),
            Self::Remote { summary, source } => {
                vec![Diagnostic::error(summary.clone()).with_detail(source.to_string())]
            },
            other => vec![Diagnostic::error(other.to_string())],
        }
    }
}

impl From<Vec<Diagnostic>> for ProviderError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::Diagnostics(diagnostics)
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    let parts: Vec<String> = diagnostics
        .iter()
        .map(|d| match (&d.attribute, &d.detail) {
            (Some(attr), Some(detail)) => format!("{} ({}): {}", d.summary, attr, detail),
            (Some(attr), None) => format!("{} ({})", d.summary, attr),
            (None, Some(detail)) => format!("{}: {}", d.summary, detail),
            (None, None) => d.summary.clone(),
        })
        .collect();
    parts.join("; ")
}
