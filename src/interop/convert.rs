use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{is_null_or_unknown, strip_unknown, InteropResult};
use crate::schema::{has_errors, AttributeType, Block, Diagnostic, Schema};
use crate::validation::check_type;

/// Converts a single nested object.
#[derive(Debug, Clone)]
pub struct Objecter {
    name: String,
    ty: AttributeType,
}

impl Objecter {
    /// Converter for an object of type `ty`, reported under `name`.
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Converter for the object described by `block`.
    pub fn for_block(name: impl Into<String>, block: &Block) -> Self {
        Self::new(name, block.object_type())
    }

    /// Converter for a whole resource or data source.
    pub fn for_schema(schema: &Schema) -> Self {
        Self::new("", schema.block.object_type())
    }

    /// The object type handled by this converter.
    pub fn attribute_type(&self) -> &AttributeType {
        &self.ty
    }

    /// Decode `value` into a model.
    ///
    /// Null and unknown values decode to `M::default()`, as do absent,
    /// null or unknown fields.
    pub fn decode<M: DeserializeOwned + Default>(&self, value: &Value) -> InteropResult<M> {
        if is_null_or_unknown(value) {
            return Ok(M::default());
        }
        decode_typed(&self.ty, value, &self.name)
    }

    /// Encode a model into an object carrying exactly the type's fields.
    pub fn encode<M: Serialize>(&self, model: &M) -> InteropResult<Value> {
        encode_typed(&self.ty, model, &self.name)
    }
}

/// Converts a homogeneous, ordered collection.
#[derive(Debug, Clone)]
pub struct Lister {
    name: String,
    element: AttributeType,
}

impl Lister {
    /// Converter for a list of `element`, reported under `name`.
    pub fn new(name: impl Into<String>, element: AttributeType) -> Self {
        Self {
            name: name.into(),
            element,
        }
    }

    /// Converter for a list of the objects described by `block`.
    pub fn for_block(name: impl Into<String>, block: &Block) -> Self {
        Self::new(name, block.object_type())
    }

    /// Decode a list value; null and unknown decode to an empty vector.
    pub fn decode<M: DeserializeOwned>(&self, value: &Value) -> InteropResult<Vec<M>> {
        decode_collection(&AttributeType::list(self.element.clone()), value, &self.name)
    }

    /// Encode models as a list value.
    pub fn encode<M: Serialize>(&self, items: &[M]) -> InteropResult<Value> {
        let encoded = encode_elements(&self.element, items, &self.name)?;
        Ok(Value::Array(encoded))
    }
}

/// Converts a homogeneous collection of unique elements.
#[derive(Debug, Clone)]
pub struct Setter {
    name: String,
    element: AttributeType,
}

impl Setter {
    /// Converter for a set of `element`, reported under `name`.
    pub fn new(name: impl Into<String>, element: AttributeType) -> Self {
        Self {
            name: name.into(),
            element,
        }
    }

    /// Converter for a set of the objects described by `block`.
    pub fn for_block(name: impl Into<String>, block: &Block) -> Self {
        Self::new(name, block.object_type())
    }

    /// Decode a set value; duplicates are dropped, first occurrence wins.
    pub fn decode<M: DeserializeOwned>(&self, value: &Value) -> InteropResult<Vec<M>> {
        let deduped = match value {
            Value::Array(items) => Value::Array(dedup(items.clone())),
            other => other.clone(),
        };
        decode_collection(&AttributeType::set(self.element.clone()), &deduped, &self.name)
    }

    /// Encode models as a set value without duplicates.
    pub fn encode<M: Serialize>(&self, items: &[M]) -> InteropResult<Value> {
        let encoded = encode_elements(&self.element, items, &self.name)?;
        Ok(Value::Array(dedup(encoded)))
    }
}

fn decode_typed<M: DeserializeOwned>(ty: &AttributeType, value: &Value, path: &str) -> InteropResult<M> {
    let diagnostics = check_type(ty, value, path);
    if has_errors(&diagnostics) {
        return Err(diagnostics);
    }

    let cleaned = drop_nulls(strip_unknown(value));
    serde_json::from_value(cleaned).map_err(|e| vec![conversion_error(path, "decode", &e)])
}

fn decode_collection<M: DeserializeOwned>(
    ty: &AttributeType,
    value: &Value,
    path: &str,
) -> InteropResult<Vec<M>> {
    if is_null_or_unknown(value) {
        return Ok(Vec::new());
    }

    let diagnostics = check_type(ty, value, path);
    if has_errors(&diagnostics) {
        return Err(diagnostics);
    }

    let element = match ty {
        AttributeType::List(element) | AttributeType::Set(element) => element.as_ref(),
        _ => ty,
    };

    let mut items = Vec::new();
    if let Value::Array(values) = value {
        for (i, item) in values.iter().enumerate() {
            if is_null_or_unknown(item) {
                continue;
            }
            items.push(decode_typed(element, item, &format!("{}.{}", path, i))?);
        }
    }
    Ok(items)
}

fn encode_typed<M: Serialize>(ty: &AttributeType, model: &M, path: &str) -> InteropResult<Value> {
    let raw = serde_json::to_value(model).map_err(|e| vec![conversion_error(path, "encode", &e)])?;
    Ok(project(ty, raw))
}

fn encode_elements<M: Serialize>(
    element: &AttributeType,
    items: &[M],
    path: &str,
) -> InteropResult<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| encode_typed(element, item, &format!("{}.{}", path, i)))
        .collect()
}

/// Shape `value` after `ty`: objects get exactly the declared fields, with
/// missing ones set to null.
fn project(ty: &AttributeType, value: Value) -> Value {
    match (ty, value) {
        (AttributeType::Object(fields), Value::Object(mut map)) => Value::Object(
            fields
                .iter()
                .map(|(name, field_ty)| {
                    let field = map.remove(name).unwrap_or(Value::Null);
                    (name.clone(), project(field_ty, field))
                })
                .collect(),
        ),
        (AttributeType::List(element) | AttributeType::Set(element), Value::Array(items)) => {
            Value::Array(items.into_iter().map(|v| project(element, v)).collect())
        },
        (AttributeType::Map(element), Value::Object(map)) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, project(element, v)))
                .collect(),
        ),
        (_, value) => value,
    }
}

/// Remove null object fields and null array elements so serde defaults apply.
fn drop_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, drop_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(drop_nulls)
                .collect(),
        ),
        other => other,
    }
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

fn conversion_error(path: &str, action: &str, err: &serde_json::Error) -> Diagnostic {
    let target = if path.is_empty() { "value" } else { path };
    let diagnostic = Diagnostic::error("Value Conversion Error").with_detail(format!(
        "An unexpected error was encountered trying to {} {}: {}",
        action, target, err
    ));
    if path.is_empty() {
        diagnostic
    } else {
        diagnostic.with_attribute(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::UNKNOWN;
    use crate::schema::{Attribute, NestedBlock};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct AuthModel {
        username: String,
        password: String,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct KeyValueModel {
        key: String,
        value: String,
        locked: bool,
    }

    fn auth_block() -> Block {
        Block::new()
            .with_attribute("username", Attribute::required_string())
            .with_attribute("password", Attribute::required_string().sensitive())
    }

    fn key_value_block() -> Block {
        Block::new()
            .with_attribute("key", Attribute::required_string())
            .with_attribute("value", Attribute::required_string())
            .with_attribute("locked", Attribute::optional_bool())
    }

    #[test]
    fn test_object_null_and_unknown_decode_to_default() {
        let objecter = Objecter::for_block("basic_auth", &auth_block());

        let model: AuthModel = objecter.decode(&Value::Null).unwrap();
        assert_eq!(model, AuthModel::default());

        let model: AuthModel = objecter.decode(&json!(UNKNOWN)).unwrap();
        assert_eq!(model, AuthModel::default());
    }

    #[test]
    fn test_object_absent_fields_default() {
        let objecter = Objecter::for_block("basic_auth", &auth_block());

        let model: AuthModel = objecter
            .decode(&json!({"username": "admin", "password": null}))
            .unwrap();
        assert_eq!(model.username, "admin");
        assert_eq!(model.password, "");

        let model: AuthModel = objecter
            .decode(&json!({"username": UNKNOWN, "password": "pw"}))
            .unwrap();
        assert_eq!(model.username, "");
        assert_eq!(model.password, "pw");
    }

    #[test]
    fn test_object_type_mismatch_is_diagnostic() {
        let objecter = Objecter::for_block("basic_auth", &auth_block());

        let err = objecter
            .decode::<AuthModel>(&json!({"username": 12}))
            .unwrap_err();
        assert_eq!(err[0].attribute.as_deref(), Some("basic_auth.username"));

        let err = objecter.decode::<AuthModel>(&json!("nope")).unwrap_err();
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_object_encode_projects_declared_fields() {
        let block = Block::new()
            .with_attribute("username", Attribute::required_string())
            .with_attribute("realm", Attribute::optional_string());
        let objecter = Objecter::for_block("basic_auth", &block);

        let value = objecter
            .encode(&AuthModel {
                username: "admin".to_string(),
                password: "secret".to_string(),
            })
            .unwrap();

        assert_eq!(value, json!({"username": "admin", "realm": null}));
    }

    #[test]
    fn test_nested_block_projection() {
        #[derive(Debug, Default, Serialize, Deserialize)]
        #[serde(default)]
        struct Outer {
            name: String,
            pairs: Vec<KeyValueModel>,
        }

        let block = Block::new()
            .with_attribute("name", Attribute::required_string())
            .with_block("pairs", NestedBlock::list(key_value_block()));
        let objecter = Objecter::for_block("", &block);

        let value = objecter
            .encode(&Outer {
                name: "n".to_string(),
                pairs: vec![KeyValueModel {
                    key: "k".to_string(),
                    value: "v".to_string(),
                    locked: true,
                }],
            })
            .unwrap();

        assert_eq!(
            value,
            json!({"name": "n", "pairs": [{"key": "k", "value": "v", "locked": true}]})
        );
    }

    #[test]
    fn test_list_null_round_trips_empty() {
        let lister = Lister::for_block("environment_variable", &key_value_block());

        let items: Vec<KeyValueModel> = lister.decode(&Value::Null).unwrap();
        assert!(items.is_empty());

        let items: Vec<KeyValueModel> = lister.decode(&json!(UNKNOWN)).unwrap();
        assert!(items.is_empty());

        let empty: Vec<KeyValueModel> = Vec::new();
        assert_eq!(lister.encode(&empty).unwrap(), json!([]));
    }

    #[test]
    fn test_list_decode_keeps_order() {
        let lister = Lister::for_block("environment_variable", &key_value_block());

        let items: Vec<KeyValueModel> = lister
            .decode(&json!([
                {"key": "B", "value": "2"},
                {"key": "A", "value": "1", "locked": true},
            ]))
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key, "B");
        assert!(items[1].locked);
    }

    #[test]
    fn test_list_element_type_error_path() {
        let lister = Lister::new("locations", AttributeType::String);

        let err = lister.decode::<String>(&json!(["eu-west-1", 5])).unwrap_err();
        assert_eq!(err[0].attribute.as_deref(), Some("locations.1"));

        let err = lister.decode::<String>(&json!({"a": 1})).unwrap_err();
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_set_removes_duplicates() {
        let setter = Setter::new("tags", AttributeType::String);

        let tags: Vec<String> = setter.decode(&json!(["api", "prod", "api"])).unwrap();
        assert_eq!(tags, vec!["api".to_string(), "prod".to_string()]);

        let value = setter
            .encode(&["x".to_string(), "x".to_string(), "y".to_string()])
            .unwrap();
        assert_eq!(value, json!(["x", "y"]));
    }

    #[test]
    fn test_set_null_decodes_empty() {
        let setter = Setter::new("tags", AttributeType::String);
        let tags: Vec<String> = setter.decode(&Value::Null).unwrap();
        assert!(tags.is_empty());
    }
}
