//! Plain data exchanged with the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A change to one top-level attribute or block in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Name of the attribute or block.
    pub path: String,
    /// Prior value; `None` when the attribute is being set for the first time.
    pub before: Option<Value>,
    /// Planned value; `None` when the attribute is being removed.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// Create a change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// An attribute that was not set before.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// An attribute that is no longer set.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// An attribute whose value changes.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }

    /// Whether the planned value is only known after apply.
    pub fn is_unknown(&self) -> bool {
        self.after.as_ref().is_some_and(crate::interop::is_unknown)
    }
}

/// The outcome of planning one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// Planned state; null for a destroy plan.
    pub planned_state: Value,
    /// Attributes that differ from prior state.
    pub changes: Vec<AttributeChange>,
    /// Whether a `force_new` attribute changed.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan that leaves `state` as it is.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// A plan with changes.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether anything changes.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Whether this plan destroys the resource.
    pub fn is_destroy(&self) -> bool {
        self.planned_state.is_null() && self.has_changes()
    }
}

/// A resource brought under management by `terraform import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// Resource type name.
    pub resource_type: String,
    /// State holding the imported ID; a read fills in the rest.
    pub state: Value,
}

impl ImportedResource {
    /// Create an imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// What the provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Provider type name, the prefix of every resource type.
    pub type_name: String,
    /// Crate version.
    pub version: String,
    /// Resource type names.
    pub resources: Vec<String>,
    /// Data source type names.
    pub data_sources: Vec<String>,
    /// Whether destroy plans are computed by the provider.
    pub plan_destroy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::UNKNOWN;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("homepage"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("homepage")));

        let removed = AttributeChange::removed("tags", json!(["prod"]));
        assert_eq!(removed.before, Some(json!(["prod"])));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("frequency", json!(5), json!(10));
        assert_eq!(modified.before, Some(json!(5)));
        assert_eq!(modified.after, Some(json!(10)));
        assert!(!modified.is_unknown());

        assert!(AttributeChange::added("id", json!(UNKNOWN)).is_unknown());
    }

    #[test]
    fn test_plan_result() {
        let unchanged = PlanResult::no_change(json!({"id": "1"}));
        assert!(!unchanged.has_changes());
        assert!(!unchanged.is_destroy());

        let destroy = PlanResult::with_changes(
            Value::Null,
            vec![AttributeChange::removed("id", json!("1"))],
            false,
        );
        assert!(destroy.is_destroy());
    }

    #[test]
    fn test_imported_resource() {
        let imported = ImportedResource::new("checkly_snippet", json!({"id": "12"}));
        assert_eq!(imported.resource_type, "checkly_snippet");
        assert_eq!(imported.state["id"], "12");
    }
}
