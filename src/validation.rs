//! Configuration validation.
//!
//! [`validate`] walks a configuration `Value` against a [`Schema`] and
//! reports every problem it finds as a [`Diagnostic`]: missing required
//! attributes, values of the wrong type, validator failures, nested block
//! counts and block constraints. Unknown values (see
//! [`crate::interop::UNKNOWN`]) pass, as they are only resolved at apply.
//!
//! ```
//! use checkly_provider::schema::{Attribute, Schema, Validator};
//! use checkly_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute(
//!         "frequency",
//!         Attribute::optional_int64().with_validator(Validator::one_of_ints(&[1, 5, 10])),
//!     );
//!
//! assert!(validate(&schema, &json!({"name": "api", "frequency": 5})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "api", "frequency": 7}));
//! assert_eq!(diagnostics[0].attribute.as_deref(), Some("frequency"));
//! ```

use serde_json::{Map, Value};

use crate::interop::is_unknown;
use crate::schema::{
    Attribute, AttributeType, Block, BlockConstraint, BlockNestingMode, Diagnostic, NestedBlock,
    Schema, Validator,
};

/// Every problem with `value` under `schema`; empty when valid.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut walker = Walker::default();
    walker.block(&schema.block, value, "");
    walker.diagnostics
}

/// [`validate`] as a `Result`.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    match validate(schema, value) {
        diagnostics if diagnostics.is_empty() => Ok(()),
        diagnostics => Err(diagnostics),
    }
}

/// Whether `value` passes [`validate`].
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

/// Type-check `value` against `ty`. Null and unknown pass anywhere.
pub fn check_type(ty: &AttributeType, value: &Value, path: &str) -> Vec<Diagnostic> {
    let mut walker = Walker::default();
    walker.typed(ty, value, path);
    walker.diagnostics
}

/// Whether a value counts as present for block constraints.
///
/// Null and empty lists are absent; unknown is present.
pub fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

#[derive(Default)]
struct Walker {
    diagnostics: Vec<Diagnostic>,
}

impl Walker {
    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn block(&mut self, block: &Block, value: &Value, path: &str) {
        if value.is_null() || is_unknown(value) {
            return;
        }
        let Some(fields) = value.as_object() else {
            self.push(at(
                Diagnostic::error("Expected object").with_detail(format!("Got {}", kind(value))),
                path,
            ));
            return;
        };

        for (name, attr) in &block.attributes {
            self.attribute(attr, fields.get(name), &child(path, name));
        }
        for (name, nested) in &block.blocks {
            self.nested(nested, fields.get(name), &child(path, name));
        }
        for constraint in &block.constraints {
            self.constraint(constraint, fields, path);
        }
    }

    fn attribute(&mut self, attr: &Attribute, value: Option<&Value>, path: &str) {
        if attr.flags.is_computed_only() {
            return;
        }
        let value = match value {
            Some(v) if !v.is_null() => v,
            _ => {
                if attr.flags.required {
                    self.push(
                        Diagnostic::error(format!("Missing required attribute '{}'", path))
                            .with_detail("This attribute is required and must be provided")
                            .with_attribute(path),
                    );
                }
                return;
            },
        };
        if is_unknown(value) {
            return;
        }

        let before = self.diagnostics.len();
        self.typed(&attr.attr_type, value, path);
        if self.diagnostics.len() > before {
            return;
        }
        for validator in &attr.validators {
            if let Some(detail) = rejection(validator, value, path) {
                self.push(
                    Diagnostic::error("Invalid Attribute Value")
                        .with_detail(detail)
                        .with_attribute(path),
                );
            }
        }
    }

    fn typed(&mut self, ty: &AttributeType, value: &Value, path: &str) {
        if value.is_null() || is_unknown(value) {
            return;
        }
        let expected = match (ty, value) {
            (AttributeType::String, Value::String(_)) | (AttributeType::Bool, Value::Bool(_)) => {
                return
            },
            (AttributeType::Int64, v) if as_int(v).is_some() => return,
            (AttributeType::List(element) | AttributeType::Set(element), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.typed(element, item, &format!("{}.{}", path, i));
                }
                return;
            },
            (AttributeType::Map(element), Value::Object(entries)) => {
                for (key, item) in entries {
                    self.typed(element, item, &format!("{}.{}", path, key));
                }
                return;
            },
            (AttributeType::Object(fields), Value::Object(entries)) => {
                for (name, field_ty) in fields {
                    if let Some(item) = entries.get(name) {
                        self.typed(field_ty, item, &child(path, name));
                    }
                }
                return;
            },
            (AttributeType::String, _) => "string",
            (AttributeType::Int64, _) => "int64",
            (AttributeType::Bool, _) => "bool",
            (AttributeType::List(_), _) => "list",
            (AttributeType::Set(_), _) => "set",
            (AttributeType::Map(_), _) => "map",
            (AttributeType::Object(_), _) => "object",
        };

        self.push(
            Diagnostic::error(format!("Invalid type for attribute '{}'", path))
                .with_detail(format!("Expected {}, got {}", expected, kind(value)))
                .with_attribute(path),
        );
    }

    fn nested(&mut self, nested: &NestedBlock, value: Option<&Value>, path: &str) {
        let value = value.unwrap_or(&Value::Null);
        if is_unknown(value) {
            return;
        }

        match (nested.nesting_mode, value) {
            (_, Value::Null) if nested.min_items > 0 => {
                let summary = match nested.nesting_mode {
                    BlockNestingMode::Single => format!("Missing required block '{}'", path),
                    _ => format!(
                        "Block '{}' requires at least {} item(s)",
                        path, nested.min_items
                    ),
                };
                self.push(Diagnostic::error(summary).with_attribute(path));
            },
            (_, Value::Null) => {},
            (BlockNestingMode::Single, value) => self.block(&nested.block, value, path),
            (BlockNestingMode::List | BlockNestingMode::Set, Value::Array(items)) => {
                self.item_count(nested, items.len(), path);
                for (i, item) in items.iter().enumerate() {
                    self.block(&nested.block, item, &format!("{}.{}", path, i));
                }
            },
            (_, other) => self.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", kind(other)))
                    .with_attribute(path),
            ),
        }
    }

    fn item_count(&mut self, nested: &NestedBlock, len: usize, path: &str) {
        let len = len as u32;
        if len < nested.min_items {
            self.push(
                Diagnostic::error(format!(
                    "Block '{}' requires at least {} item(s), got {}",
                    path, nested.min_items, len
                ))
                .with_attribute(path),
            );
        }
        // max_items of 0 is unbounded.
        if nested.max_items > 0 && len > nested.max_items {
            self.push(
                Diagnostic::error(format!(
                    "Block '{}' allows at most {} item(s), got {}",
                    path, nested.max_items, len
                ))
                .with_attribute(path),
            );
        }
    }

    fn constraint(&mut self, constraint: &BlockConstraint, fields: &Map<String, Value>, path: &str) {
        match constraint {
            BlockConstraint::ExactlyOneOf { names } => {
                let present = names.iter().filter(|n| is_set(fields.get(*n))).count();
                if present == 1 {
                    return;
                }
                let listed: Vec<String> = names.iter().map(|n| child(path, n)).collect();
                self.push(at(
                    Diagnostic::error(format!(
                        "ExactlyOneOf: exactly one of [{}] must be specified",
                        listed.join(", ")
                    ))
                    .with_detail(format!("{} of these attributes were specified", present)),
                    path,
                ));
            },
            BlockConstraint::ConflictsWith { attribute, with } => {
                if !is_set(fields.get(attribute)) {
                    return;
                }
                let attribute = child(path, attribute);
                for other in with.iter().filter(|n| is_set(fields.get(*n))) {
                    self.push(
                        Diagnostic::error("Invalid Attribute Combination")
                            .with_detail(format!(
                                "Attribute {} cannot be specified when {} is specified",
                                child(path, other),
                                attribute
                            ))
                            .with_attribute(attribute.clone()),
                    );
                }
            },
        }
    }
}

/// Why `validator` rejects `value`, or `None` when it accepts it.
fn rejection(validator: &Validator, value: &Value, path: &str) -> Option<String> {
    match validator {
        Validator::OneOf { values } => {
            if values.iter().any(|accepted| same_value(accepted, value)) {
                return None;
            }
            let accepted: Vec<String> = values.iter().map(Value::to_string).collect();
            Some(format!(
                "Attribute {} value must be one of: [{}], got: {}",
                path,
                accepted.join(" "),
                value
            ))
        },
        Validator::IntBetween { min, max } => {
            let n = as_int(value)?;
            (!(*min..=*max).contains(&n)).then(|| {
                format!(
                    "Attribute {} value must be between {} and {}, got: {}",
                    path, min, max, n
                )
            })
        },
        Validator::IntAtLeast { min } => {
            let n = as_int(value)?;
            (n < *min)
                .then(|| format!("Attribute {} value must be at least {}, got: {}", path, min, n))
        },
        Validator::LengthAtLeast { min } => {
            let len = value.as_str()?.chars().count();
            (len < *min).then(|| {
                format!(
                    "Attribute {} string length must be at least {}, got: {}",
                    path, min, len
                )
            })
        },
    }
}

fn child(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

/// Attach `path` unless it is the root.
fn at(diagnostic: Diagnostic, path: &str) -> Diagnostic {
    if path.is_empty() {
        diagnostic
    } else {
        diagnostic.with_attribute(path)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integers, including floats with no fractional part.
fn as_int(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
