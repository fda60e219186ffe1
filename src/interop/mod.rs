//! Conversion between framework values and typed models.
//!
//! Configuration and state travel as `serde_json::Value`. Resource code works
//! with serde-typed models instead, and every model knows how to fill itself
//! from a remote API object ([`Refresh`]) and how to fill a remote API object
//! from itself ([`Render`]).
//!
//! - [`Objecter`], [`Lister`] and [`Setter`] decode and encode values of a
//!   known [`AttributeType`](crate::schema::AttributeType).
//! - [`Gluer`] composes a converter with `Refresh`/`Render`, going straight
//!   between remote values and framework values one nesting level at a time.

mod convert;
mod gluer;

pub use convert::{Lister, Objecter, Setter};
pub use gluer::{non_empty, Gluer};
pub(crate) use gluer::render_one;

use crate::schema::Diagnostic;
use serde_json::Value;

/// Placeholder for a value that is not known until apply.
///
/// This matches the sentinel Terraform uses for unknown values in legacy
/// encodings.
pub const UNKNOWN: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// Result type for conversions; errors are reported as diagnostics.
pub type InteropResult<T> = Result<T, Vec<Diagnostic>>;

/// Whether `value` is the unknown placeholder.
pub fn is_unknown(value: &Value) -> bool {
    value.as_str() == Some(UNKNOWN)
}

/// Whether `value` is null or unknown.
pub fn is_null_or_unknown(value: &Value) -> bool {
    value.is_null() || is_unknown(value)
}

/// Replace every unknown placeholder inside `value` with null.
pub fn strip_unknown(value: &Value) -> Value {
    match value {
        v if is_unknown(v) => Value::Null,
        Value::Array(items) => Value::Array(items.iter().map(strip_unknown).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), strip_unknown(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Why a model is being refreshed.
///
/// Some fields are only meaningful on creation (the remote ID, one-time key
/// material) and some are never returned by the remote service (secrets);
/// models use the mode to decide what to overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// The remote object was just created.
    Created,
    /// The remote object was just updated.
    Updated,
    /// The remote object was loaded for a read or import.
    Loaded,
}

impl RefreshMode {
    /// Whether this refresh follows a create call.
    pub fn is_created(self) -> bool {
        self == RefreshMode::Created
    }
}

/// Populate a model from a remote API value.
pub trait Refresh<R> {
    /// Overwrite this model's fields from `remote`.
    fn refresh(&mut self, remote: &R, mode: RefreshMode) -> InteropResult<()>;
}

/// Populate a remote API value from a model.
pub trait Render<R> {
    /// Write this model's fields into `remote`.
    fn render(&self, remote: &mut R) -> InteropResult<()>;
}

/// Parse a string ID that the remote API represents as a number.
pub fn parse_numeric_id(id: &str, attribute: &str) -> InteropResult<i64> {
    id.trim().parse::<i64>().map_err(|e| {
        vec![Diagnostic::error("Invalid ID")
            .with_detail(format!("'{}' is not a numeric ID: {}", id, e))
            .with_attribute(attribute)]
    })
}

/// Like [`parse_numeric_id`], but an empty ID (not yet created) yields `None`.
pub fn parse_optional_numeric_id(id: &str, attribute: &str) -> InteropResult<Option<i64>> {
    if id.is_empty() {
        Ok(None)
    } else {
        parse_numeric_id(id, attribute).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_detection() {
        assert!(is_unknown(&json!(UNKNOWN)));
        assert!(!is_unknown(&json!("id")));
        assert!(is_null_or_unknown(&Value::Null));
        assert!(is_null_or_unknown(&json!(UNKNOWN)));
        assert!(!is_null_or_unknown(&json!(0)));
    }

    #[test]
    fn test_strip_unknown_is_recursive() {
        let value = json!({
            "id": UNKNOWN,
            "request": {"url": "https://example.com", "method": UNKNOWN},
            "tags": ["a", UNKNOWN],
        });

        assert_eq!(
            strip_unknown(&value),
            json!({
                "id": null,
                "request": {"url": "https://example.com", "method": null},
                "tags": ["a", null],
            })
        );
    }

    #[test]
    fn test_parse_numeric_id() {
        assert_eq!(parse_numeric_id("42", "id").unwrap(), 42);

        let err = parse_numeric_id("abc", "id").unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].summary, "Invalid ID");
        assert_eq!(err[0].attribute.as_deref(), Some("id"));
    }

    #[test]
    fn test_parse_optional_numeric_id() {
        assert_eq!(parse_optional_numeric_id("", "id").unwrap(), None);
        assert_eq!(parse_optional_numeric_id("7", "id").unwrap(), Some(7));
        assert!(parse_optional_numeric_id("seven", "id").is_err());
    }
}
