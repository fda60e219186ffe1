use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{is_null_or_unknown, InteropResult, Lister, Objecter, Refresh, RefreshMode, Render, Setter};
use crate::schema::{AttributeType, Block};

/// Glues a converter to a model's [`Refresh`] and [`Render`] implementations.
///
/// A `Gluer<R, M>` converts remote values of type `R` directly into framework
/// values (via the model `M`) and back. Null propagates both ways without
/// touching the model: a missing remote value refreshes to null, and a null
/// or unknown framework value renders to nothing.
#[derive(Debug, Clone)]
pub struct Gluer<R, M> {
    name: String,
    ty: AttributeType,
    _marker: PhantomData<fn() -> (R, M)>,
}

impl<R, M> Gluer<R, M>
where
    R: Default,
    M: Refresh<R> + Render<R> + Serialize + DeserializeOwned + Default,
{
    /// Gluer for the nested block `name`, shaped by `block`.
    pub fn new(name: impl Into<String>, block: &Block) -> Self {
        Self {
            name: name.into(),
            ty: block.object_type(),
            _marker: PhantomData,
        }
    }

    fn objecter(&self) -> Objecter {
        Objecter::new(self.name.clone(), self.ty.clone())
    }

    fn lister(&self) -> Lister {
        Lister::new(self.name.clone(), self.ty.clone())
    }

    fn setter(&self) -> Setter {
        Setter::new(self.name.clone(), self.ty.clone())
    }

    /// Refresh a single nested object.
    ///
    /// `current` is decoded first so fields the remote never returns keep
    /// their local value.
    pub fn refresh_object(
        &self,
        current: &Value,
        remote: Option<&R>,
        mode: RefreshMode,
    ) -> InteropResult<Value> {
        let Some(remote) = remote else {
            return Ok(Value::Null);
        };

        let objecter = self.objecter();
        let mut model: M = objecter.decode(current)?;
        model.refresh(remote, mode)?;
        objecter.encode(&model)
    }

    /// Render a single nested object.
    pub fn render_object(&self, value: &Value) -> InteropResult<Option<R>> {
        if is_null_or_unknown(value) {
            return Ok(None);
        }

        let model: M = self.objecter().decode(value)?;
        render_one(&model).map(Some)
    }

    /// Refresh an ordered collection of nested objects.
    pub fn refresh_list(&self, remote: Option<&[R]>, mode: RefreshMode) -> InteropResult<Value> {
        match remote {
            None => Ok(Value::Null),
            Some(items) => self.lister().encode(&refresh_all::<R, M>(items, mode)?),
        }
    }

    /// Render an ordered collection of nested objects.
    pub fn render_list(&self, value: &Value) -> InteropResult<Vec<R>> {
        if is_null_or_unknown(value) {
            return Ok(Vec::new());
        }
        let models: Vec<M> = self.lister().decode(value)?;
        models.iter().map(render_one::<R, M>).collect()
    }

    /// Refresh an unordered collection of nested objects.
    pub fn refresh_set(&self, remote: Option<&[R]>, mode: RefreshMode) -> InteropResult<Value> {
        match remote {
            None => Ok(Value::Null),
            Some(items) => self.setter().encode(&refresh_all::<R, M>(items, mode)?),
        }
    }

    /// Render an unordered collection of nested objects.
    pub fn render_set(&self, value: &Value) -> InteropResult<Vec<R>> {
        if is_null_or_unknown(value) {
            return Ok(Vec::new());
        }
        let models: Vec<M> = self.setter().decode(value)?;
        models.iter().map(render_one::<R, M>).collect()
    }
}

/// `Some(items)` unless `items` is empty.
///
/// Remote APIs return empty arrays where configuration simply omits a block;
/// mapping those to `None` keeps the refreshed state null.
pub fn non_empty<T>(items: &[T]) -> Option<&[T]> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// A fresh `R` rendered from `model`.
pub(crate) fn render_one<R: Default, M: Render<R>>(model: &M) -> InteropResult<R> {
    let mut remote = R::default();
    model.render(&mut remote)?;
    Ok(remote)
}

fn refresh_all<R, M>(items: &[R], mode: RefreshMode) -> InteropResult<Vec<M>>
where
    M: Refresh<R> + Default,
{
    items
        .iter()
        .map(|item| {
            let mut model = M::default();
            model.refresh(item, mode)?;
            Ok(model)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::UNKNOWN;
    use crate::schema::Attribute;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct RemoteHeader {
        key: String,
        value: String,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct HeaderModel {
        key: String,
        value: String,
    }

    impl Refresh<RemoteHeader> for HeaderModel {
        fn refresh(&mut self, remote: &RemoteHeader, _mode: RefreshMode) -> InteropResult<()> {
            self.key = remote.key.clone();
            self.value = remote.value.clone();
            Ok(())
        }
    }

    impl Render<RemoteHeader> for HeaderModel {
        fn render(&self, remote: &mut RemoteHeader) -> InteropResult<()> {
            remote.key = self.key.clone();
            remote.value = self.value.clone();
            Ok(())
        }
    }

    /// Fails the test if the gluer ever reaches into the model.
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct UntouchableModel {}

    impl Refresh<RemoteHeader> for UntouchableModel {
        fn refresh(&mut self, _remote: &RemoteHeader, _mode: RefreshMode) -> InteropResult<()> {
            panic!("refresh must not be called");
        }
    }

    impl Render<RemoteHeader> for UntouchableModel {
        fn render(&self, _remote: &mut RemoteHeader) -> InteropResult<()> {
            panic!("render must not be called");
        }
    }

    fn header_block() -> Block {
        Block::new()
            .with_attribute("key", Attribute::required_string())
            .with_attribute("value", Attribute::required_string())
    }

    fn header(key: &str, value: &str) -> RemoteHeader {
        RemoteHeader {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_null_remote_refreshes_to_null() {
        let gluer: Gluer<RemoteHeader, UntouchableModel> = Gluer::new("header", &header_block());

        assert_eq!(
            gluer.refresh_object(&Value::Null, None, RefreshMode::Loaded).unwrap(),
            Value::Null
        );
        assert_eq!(gluer.refresh_list(None, RefreshMode::Loaded).unwrap(), Value::Null);
        assert_eq!(gluer.refresh_set(None, RefreshMode::Created).unwrap(), Value::Null);
    }

    #[test]
    fn test_null_or_unknown_value_renders_to_nothing() {
        let gluer: Gluer<RemoteHeader, UntouchableModel> = Gluer::new("header", &header_block());

        assert!(gluer.render_object(&Value::Null).unwrap().is_none());
        assert!(gluer.render_object(&json!(UNKNOWN)).unwrap().is_none());
        assert!(gluer.render_list(&Value::Null).unwrap().is_empty());
        assert!(gluer.render_list(&json!(UNKNOWN)).unwrap().is_empty());
        assert!(gluer.render_set(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_object_round_trip() {
        let gluer: Gluer<RemoteHeader, HeaderModel> = Gluer::new("header", &header_block());
        let remote = header("Accept", "application/json");

        let value = gluer
            .refresh_object(&Value::Null, Some(&remote), RefreshMode::Loaded)
            .unwrap();
        assert_eq!(value, json!({"key": "Accept", "value": "application/json"}));

        let rendered = gluer.render_object(&value).unwrap();
        assert_eq!(rendered, Some(remote));
    }

    #[test]
    fn test_list_round_trip_preserves_order() {
        let gluer: Gluer<RemoteHeader, HeaderModel> = Gluer::new("header", &header_block());
        let remote = vec![header("b", "2"), header("a", "1")];

        let value = gluer.refresh_list(Some(&remote), RefreshMode::Loaded).unwrap();
        assert_eq!(
            value,
            json!([{"key": "b", "value": "2"}, {"key": "a", "value": "1"}])
        );
        assert_eq!(gluer.render_list(&value).unwrap(), remote);
    }

    #[test]
    fn test_set_refresh_drops_duplicates() {
        let gluer: Gluer<RemoteHeader, HeaderModel> = Gluer::new("header", &header_block());
        let remote = vec![header("a", "1"), header("a", "1")];

        let value = gluer.refresh_set(Some(&remote), RefreshMode::Loaded).unwrap();
        assert_eq!(value, json!([{"key": "a", "value": "1"}]));
    }

    #[test]
    fn test_render_reports_decode_errors() {
        let gluer: Gluer<RemoteHeader, HeaderModel> = Gluer::new("header", &header_block());

        let err = gluer.render_object(&json!({"key": 1})).unwrap_err();
        assert_eq!(err[0].attribute.as_deref(), Some("header.key"));
    }

    #[test]
    fn test_non_empty() {
        let empty: Vec<RemoteHeader> = Vec::new();
        assert!(non_empty(&empty).is_none());
        assert_eq!(non_empty(&[1, 2]).map(<[i32]>::len), Some(2));
    }
}
