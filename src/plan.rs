//! Resource planning.
//!
//! A plan combines prior state with the proposed configuration:
//!
//! 1. Schema defaults fill attributes the configuration leaves null.
//! 2. Computed attributes the configuration leaves null keep their prior
//!    value, or become unknown when there is no prior state.
//! 3. Every top-level attribute or block whose value differs from prior
//!    state is recorded as an [`AttributeChange`]. Null and empty
//!    collections are the same value, and sets compare without order.
//! 4. A change to a `force_new` attribute requires replacement.
//!
//! A null proposal with prior state plans the destruction of the resource.

use serde_json::{Map, Value};
use tracing::debug;

use crate::interop::{is_unknown, UNKNOWN};
use crate::resources::LAST_UPDATED;
use crate::schema::{AttributeType, Block, BlockNestingMode, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan a resource of `schema` from `prior` state towards `proposed`.
pub fn plan(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    let prior = prior.filter(|p| !p.is_null());

    if proposed.is_null() {
        return match prior {
            Some(prior) => destroy(prior),
            None => PlanResult::no_change(Value::Null),
        };
    }

    let mut planned = proposed.clone();
    apply_defaults(&schema.block, &mut planned);
    fill_computed(&schema.block, &mut planned, prior);

    let (changes, requires_replace) = diff(schema, prior, &planned);

    // The remote object is rewritten, so the stamp will move.
    if prior.is_some() && !changes.is_empty() && schema.block.attributes.contains_key(LAST_UPDATED)
    {
        if let Value::Object(map) = &mut planned {
            map.insert(LAST_UPDATED.to_string(), Value::String(UNKNOWN.to_string()));
        }
    }

    debug!(
        changes = changes.len(),
        requires_replace, "Planned resource"
    );
    PlanResult::with_changes(planned, changes, requires_replace)
}

fn destroy(prior: &Value) -> PlanResult {
    let changes = match prior {
        Value::Object(map) => map
            .iter()
            .filter(|(_, value)| !is_empty(value))
            .map(|(name, value)| AttributeChange::removed(name.clone(), value.clone()))
            .collect(),
        _ => Vec::new(),
    };
    PlanResult::with_changes(Value::Null, changes, false)
}

/// Fill null attributes that declare a default, recursing into nested blocks.
pub fn apply_defaults(block: &Block, value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    for (name, attr) in &block.attributes {
        if let Some(default) = &attr.default {
            let slot = map.entry(name.clone()).or_insert(Value::Null);
            if slot.is_null() {
                *slot = default.clone();
            }
        }
    }

    for (name, nested) in &block.blocks {
        let Some(child) = map.get_mut(name) else {
            continue;
        };
        match (nested.nesting_mode, child) {
            (BlockNestingMode::Single, child) => apply_defaults(&nested.block, child),
            (BlockNestingMode::List | BlockNestingMode::Set, Value::Array(items)) => {
                for item in items {
                    apply_defaults(&nested.block, item);
                }
            },
            _ => {},
        }
    }
}

fn fill_computed(block: &Block, value: &mut Value, prior: Option<&Value>) {
    let Value::Object(map) = value else {
        return;
    };

    for (name, attr) in &block.attributes {
        if !attr.flags.computed {
            continue;
        }
        let slot = map.entry(name.clone()).or_insert(Value::Null);
        if !slot.is_null() {
            continue;
        }
        *slot = match prior {
            Some(prior) => prior.get(name).cloned().unwrap_or(Value::Null),
            None => Value::String(UNKNOWN.to_string()),
        };
    }

    for (name, nested) in &block.blocks {
        let Some(child) = map.get_mut(name) else {
            continue;
        };
        let prior_child = prior.and_then(|p| p.get(name));
        match (nested.nesting_mode, child) {
            (BlockNestingMode::Single, child) => {
                fill_computed(&nested.block, child, prior_child)
            },
            (BlockNestingMode::List, Value::Array(items)) => {
                for (i, item) in items.iter_mut().enumerate() {
                    let prior_item = prior_child.and_then(|p| p.get(i));
                    fill_computed(&nested.block, item, prior_item);
                }
            },
            _ => {},
        }
    }
}

fn diff(schema: &Schema, prior: Option<&Value>, planned: &Value) -> (Vec<AttributeChange>, bool) {
    let AttributeType::Object(fields) = schema.block.object_type() else {
        return (Vec::new(), false);
    };

    let mut names: Vec<&String> = fields.keys().collect();
    names.sort();

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in names {
        let before = prior.and_then(|p| p.get(name)).unwrap_or(&Value::Null);
        let after = planned.get(name).unwrap_or(&Value::Null);
        if equivalent(&fields[name], before, after) {
            continue;
        }

        let change = match (is_empty(before), is_empty(after)) {
            (true, _) => AttributeChange::added(name.clone(), after.clone()),
            (false, true) => AttributeChange::removed(name.clone(), before.clone()),
            (false, false) => AttributeChange::modified(name.clone(), before.clone(), after.clone()),
        };
        changes.push(change);

        let force_new = schema
            .block
            .attributes
            .get(name)
            .is_some_and(|attr| attr.force_new);
        if prior.is_some() && force_new {
            requires_replace = true;
        }
    }
    (changes, requires_replace)
}

/// Null, empty collections, and nothing at all are the same value.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn field<'a>(map: &'a Map<String, Value>, name: &str) -> &'a Value {
    map.get(name).unwrap_or(&Value::Null)
}

/// Structural equality under the plan's rules.
fn equivalent(ty: &AttributeType, a: &Value, b: &Value) -> bool {
    if is_empty(a) && is_empty(b) {
        return true;
    }
    if is_unknown(a) || is_unknown(b) {
        return a == b;
    }

    match (ty, a, b) {
        (AttributeType::Set(element), Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|x| ys.iter().any(|y| equivalent(element, x, y)))
                && ys.iter().all(|y| xs.iter().any(|x| equivalent(element, x, y)))
        },
        (AttributeType::List(element), Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equivalent(element, x, y))
        },
        (AttributeType::Map(element), Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| equivalent(element, x, y)))
        },
        (AttributeType::Object(fields), Value::Object(xs), Value::Object(ys)) => fields
            .iter()
            .all(|(name, field_ty)| equivalent(field_ty, field(xs, name), field(ys, name))),
        _ => a == b,
    }
}
