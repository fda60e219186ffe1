//! Schemas for the provider configuration, resources and data sources.
//!
//! A [`Schema`] is plain data. [`crate::validation`] checks configuration
//! against it, [`crate::plan`] fills defaults and computed values from it,
//! and the converters in [`crate::interop`] take their shape from
//! [`Block::object_type`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// String.
    String,
    /// Integer.
    Int64,
    /// Boolean.
    Bool,
    /// Ordered elements.
    List(Box<AttributeType>),
    /// Unordered, unique elements.
    Set(Box<AttributeType>),
    /// String-keyed elements.
    Map(Box<AttributeType>),
    /// Fixed fields.
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    /// `list(element)`.
    pub fn list(element: AttributeType) -> Self {
        Self::List(Box::new(element))
    }

    /// `set(element)`.
    pub fn set(element: AttributeType) -> Self {
        Self::Set(Box::new(element))
    }

    /// `map(element)`.
    pub fn map(element: AttributeType) -> Self {
        Self::Map(Box::new(element))
    }
}

/// Who sets an attribute.
///
/// `required` and `optional` attributes come from configuration; `computed`
/// ones may be filled in by the provider. An attribute can be both optional
/// and computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be configured.
    pub required: bool,
    /// May be configured.
    pub optional: bool,
    /// May be set by the provider.
    pub computed: bool,
    /// Hidden from plan output and logs.
    pub sensitive: bool,
}

impl AttributeFlags {
    /// Required in configuration.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Optional in configuration.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Self::default()
        }
    }

    /// Set only by the provider.
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Self::default()
        }
    }

    /// With `sensitive` set.
    pub fn sensitive(self) -> Self {
        Self {
            sensitive: true,
            ..self
        }
    }

    /// Neither required nor optional, so configuration never sets it.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// A value constraint attached to a single attribute.
///
/// Validators are plain data; [`crate::validation`] evaluates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Validator {
    /// The value must equal one of the listed values.
    OneOf {
        /// Accepted values.
        values: Vec<Value>,
    },
    /// An integer within `[min, max]`.
    IntBetween {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// An integer greater than or equal to `min`.
    IntAtLeast {
        /// Inclusive lower bound.
        min: i64,
    },
    /// A string of at least `min` characters.
    LengthAtLeast {
        /// Minimum character count.
        min: usize,
    },
}

impl Validator {
    /// Accept only the given strings.
    pub fn one_of_strings(values: &[&str]) -> Self {
        Self::OneOf {
            values: values.iter().map(|v| Value::from(*v)).collect(),
        }
    }

    /// Accept only the given integers.
    pub fn one_of_ints(values: &[i64]) -> Self {
        Self::OneOf {
            values: values.iter().map(|v| Value::from(*v)).collect(),
        }
    }

    /// Accept integers in `[min, max]`.
    pub fn int_between(min: i64, max: i64) -> Self {
        Self::IntBetween { min, max }
    }

    /// Accept integers greater than or equal to `min`.
    pub fn int_at_least(min: i64) -> Self {
        Self::IntAtLeast { min }
    }

    /// Accept non-empty strings.
    pub fn not_empty() -> Self {
        Self::LengthAtLeast { min: 1 }
    }
}

/// One attribute of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Who sets it.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Shown in generated documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A change replaces the remote object instead of updating it.
    #[serde(default)]
    pub force_new: bool,
    /// Planned when configuration leaves the attribute null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Checked by [`crate::validation`] on known, well-typed values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

macro_rules! attribute_constructors {
    ($($(#[$doc:meta])* $name:ident => $ty:expr, $flags:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name() -> Self {
                Self::new($ty, AttributeFlags::$flags())
            }
        )*
    };
}

impl Attribute {
    /// An attribute of `attr_type` with `flags` and nothing else.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            force_new: false,
            default: None,
            validators: Vec::new(),
        }
    }

    attribute_constructors! {
        /// Required string.
        required_string => AttributeType::String, required;
        /// Optional string.
        optional_string => AttributeType::String, optional;
        /// Provider-set string, such as an ID.
        computed_string => AttributeType::String, computed;
        /// Required integer.
        required_int64 => AttributeType::Int64, required;
        /// Optional integer.
        optional_int64 => AttributeType::Int64, optional;
        /// Required boolean.
        required_bool => AttributeType::Bool, required;
        /// Optional boolean.
        optional_bool => AttributeType::Bool, optional;
        /// Optional set of strings, such as tags or locations.
        optional_string_set => AttributeType::set(AttributeType::String), optional;
        /// Optional string-to-string map, such as HTTP headers.
        optional_string_map => AttributeType::map(AttributeType::String), optional;
    }

    /// Set the documentation string.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the remote object when this attribute changes.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Plan `default` when configuration leaves the attribute null.
    ///
    /// The attribute becomes computed as well, since the planned value may
    /// not come from configuration.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.flags.computed = true;
        self
    }

    /// Add a value check.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Hide the value from plan output and logs.
    pub fn sensitive(mut self) -> Self {
        self.flags = self.flags.sensitive();
        self
    }
}

/// How a nested block repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingMode {
    /// At most one, held as an object.
    #[default]
    Single,
    /// Ordered objects.
    List,
    /// Unordered objects.
    Set,
}

/// A cross-attribute rule evaluated over a whole block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlockConstraint {
    /// Exactly one of the named attributes or blocks must be set.
    ExactlyOneOf {
        /// Candidate attribute or block names.
        names: Vec<String>,
    },
    /// `attribute` may not be set together with any of `with`.
    ConflictsWith {
        /// The constrained attribute.
        attribute: String,
        /// Attributes that conflict with it.
        with: Vec<String>,
    },
}

impl BlockConstraint {
    /// Exactly one of `names` must be set.
    pub fn exactly_one_of(names: &[&str]) -> Self {
        Self::ExactlyOneOf {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// `attribute` conflicts with every name in `with`.
    pub fn conflicts_with(attribute: &str, with: &[&str]) -> Self {
        Self::ConflictsWith {
            attribute: attribute.to_string(),
            with: with.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Attributes and nested blocks at one level of a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Attributes by name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Attribute>,
    /// Nested blocks by name, e.g. the `request` of an API check.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub blocks: HashMap<String, NestedBlock>,
    /// Shown in generated documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rules spanning several attributes or blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<BlockConstraint>,
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Add a nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Set the documentation string.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a rule spanning several attributes or blocks.
    pub fn with_constraint(mut self, constraint: BlockConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// The value type of this block as a whole.
    ///
    /// A single nested block becomes an object field; list and set blocks
    /// become a list or set of objects.
    pub fn object_type(&self) -> AttributeType {
        let attributes = self
            .attributes
            .iter()
            .map(|(name, attr)| (name.clone(), attr.attr_type.clone()));
        let blocks = self.blocks.iter().map(|(name, nested)| {
            let object = nested.block.object_type();
            let ty = match nested.nesting_mode {
                BlockNestingMode::Single => object,
                BlockNestingMode::List => AttributeType::list(object),
                BlockNestingMode::Set => AttributeType::set(object),
            };
            (name.clone(), ty)
        });
        AttributeType::Object(attributes.chain(blocks).collect())
    }
}

/// A [`Block`] nested under a name, with its repetition rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// Contents of each occurrence.
    #[serde(flatten)]
    pub block: Block,
    /// How the block repeats.
    #[serde(default)]
    pub nesting_mode: BlockNestingMode,
    /// Fewest occurrences allowed.
    #[serde(default)]
    pub min_items: u32,
    /// Most occurrences allowed; 0 is unbounded.
    #[serde(default)]
    pub max_items: u32,
}

impl NestedBlock {
    fn with_mode(block: Block, nesting_mode: BlockNestingMode, max_items: u32) -> Self {
        Self {
            block,
            nesting_mode,
            min_items: 0,
            max_items,
        }
    }

    /// Zero or one occurrence.
    pub fn single(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::Single, 1)
    }

    /// Any number of ordered occurrences.
    pub fn list(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::List, 0)
    }

    /// Any number of unordered occurrences.
    pub fn set(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::Set, 0)
    }

    /// Require at least `min` occurrences.
    pub fn with_min_items(mut self, min: u32) -> Self {
        self.min_items = min;
        self
    }

    /// Allow at most `max` occurrences.
    pub fn with_max_items(mut self, max: u32) -> Self {
        self.max_items = max;
        self
    }
}

/// Schema of a resource, a data source or the provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// State layout version. Every Checkly schema is still at 0.
    #[serde(default)]
    pub version: u64,
    /// Top-level attributes and blocks.
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// An empty version 0 schema.
    pub fn v0() -> Self {
        Self {
            version: 0,
            block: Block::new(),
        }
    }

    /// Add a top-level attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block = self.block.with_attribute(name, attr);
        self
    }

    /// Add a top-level nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block = self.block.with_block(name, block);
        self
    }

    /// Set the documentation string.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.block = self.block.with_description(description);
        self
    }

    /// Add a top-level constraint.
    pub fn with_constraint(mut self, constraint: BlockConstraint) -> Self {
        self.block = self.block.with_constraint(constraint);
        self
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::v0()
    }
}

/// Everything a provider exposes, keyed by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Resources by type name.
    #[serde(default)]
    pub resources: HashMap<String, Schema>,
    /// Data sources by type name.
    #[serde(default)]
    pub data_sources: HashMap<String, Schema>,
}

impl ProviderSchema {
    /// An empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider configuration schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Add a resource.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Add a data source.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// The operation failed.
    Error,
    /// The operation went ahead.
    Warning,
}

/// A problem reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: DiagnosticSeverity,
    /// One-line title, e.g. `Error Creating Check`.
    pub summary: String,
    /// Longer explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted path of the offending attribute, e.g. `heartbeat.period`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn new(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// An error.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, summary)
    }

    /// A warning.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, summary)
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Point at an attribute path.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether the severity is [`DiagnosticSeverity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Whether any of `diagnostics` is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flags() {
        assert!(!AttributeFlags::required().is_computed_only());
        assert!(AttributeFlags::computed().is_computed_only());
        assert!(AttributeFlags::optional().sensitive().sensitive);

        let id = Attribute::computed_string();
        assert!(id.flags.is_computed_only());
        assert!(Attribute::optional_string().sensitive().flags.sensitive);
    }

    #[test]
    fn test_default_makes_attribute_computed() {
        let attr = Attribute::optional_bool().with_default(json!(true));
        assert!(attr.flags.optional);
        assert!(attr.flags.computed);
        assert!(!attr.flags.is_computed_only());
        assert_eq!(attr.default, Some(json!(true)));
    }

    #[test]
    fn test_constructor_types() {
        assert_eq!(Attribute::required_int64().attr_type, AttributeType::Int64);
        assert_eq!(
            Attribute::optional_string_set().attr_type,
            AttributeType::set(AttributeType::String)
        );
        assert_eq!(
            Attribute::optional_string_map().attr_type,
            AttributeType::map(AttributeType::String)
        );
        assert!(Attribute::required_bool().flags.required);
    }

    #[test]
    fn test_attribute_validators() {
        let attr = Attribute::optional_int64()
            .with_validator(Validator::int_between(0, 30000))
            .with_validator(Validator::one_of_ints(&[0, 10]));

        assert_eq!(attr.validators.len(), 2);
        assert_eq!(
            attr.validators[0],
            Validator::IntBetween { min: 0, max: 30000 }
        );
    }

    #[test]
    fn test_object_type_of_request_block() {
        let request = Block::new()
            .with_attribute("url", Attribute::required_string())
            .with_block(
                "assertion",
                NestedBlock::set(Block::new().with_attribute("target", Attribute::optional_string())),
            )
            .with_block(
                "basic_auth",
                NestedBlock::single(
                    Block::new().with_attribute("username", Attribute::required_string()),
                ),
            );

        let AttributeType::Object(fields) = request.object_type() else {
            panic!("expected object type");
        };
        assert_eq!(fields["url"], AttributeType::String);
        assert!(matches!(fields["assertion"], AttributeType::Set(_)));
        assert!(matches!(fields["basic_auth"], AttributeType::Object(_)));
    }

    #[test]
    fn test_alert_channel_constraints() {
        let schema = Schema::v0()
            .with_constraint(BlockConstraint::exactly_one_of(&["email", "slack"]))
            .with_constraint(BlockConstraint::conflicts_with("script", &["request"]));

        assert_eq!(
            schema.block.constraints[0],
            BlockConstraint::ExactlyOneOf {
                names: vec!["email".to_string(), "slack".to_string()]
            }
        );
        assert_eq!(schema.block.constraints.len(), 2);
    }

    #[test]
    fn test_provider_schema() {
        let schema = ProviderSchema::new()
            .with_provider_config(
                Schema::v0().with_attribute("api_key", Attribute::optional_string().sensitive()),
            )
            .with_resource(
                "checkly_snippet",
                Schema::v0().with_attribute("id", Attribute::computed_string()),
            )
            .with_data_source("checkly_static_ips", Schema::v0());

        assert!(schema.provider.block.attributes["api_key"].flags.sensitive);
        assert!(schema.resources.contains_key("checkly_snippet"));
        assert!(schema.data_sources.contains_key("checkly_static_ips"));
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid Heartbeat period")
            .with_detail("period must be greater than or equal to 30s")
            .with_attribute("heartbeat.period");

        assert!(err.is_error());
        assert_eq!(err.attribute.as_deref(), Some("heartbeat.period"));
        assert!(has_errors(&[Diagnostic::warning("w"), err]));
        assert!(!has_errors(&[Diagnostic::warning("w")]));
    }

    #[test]
    fn test_nested_block_counts() {
        let single = NestedBlock::single(Block::new());
        assert_eq!(single.nesting_mode, BlockNestingMode::Single);
        assert_eq!(single.max_items, 1);

        let heartbeat = NestedBlock::single(Block::new()).with_min_items(1);
        assert_eq!(heartbeat.min_items, 1);

        let list = NestedBlock::list(Block::new()).with_max_items(5);
        assert_eq!(list.nesting_mode, BlockNestingMode::List);
        assert_eq!(list.max_items, 5);
    }
}
