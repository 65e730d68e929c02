//! Block property values.
//!
//! Property bags in a replicated document are dynamically typed. They are
//! modelled here as a tagged union so that extraction code can match on the
//! shape of a value instead of probing an untyped map.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Explicit null
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value
    Number(Number),
    /// Plain string
    Text(String),
    /// Rich text as a sequence of delta runs
    RichText(Vec<TextDelta>),
    /// Ordered list of values
    List(Vec<PropValue>),
    /// Nested map (for example database cells)
    Map(Properties),
}

impl PropValue {
    /// Convert a JSON value into a property value.
    ///
    /// Arrays whose elements are all objects with a string `insert` field are
    /// recognized as rich text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => PropValue::Null,
            Value::Bool(b) => PropValue::Bool(b),
            Value::Number(n) => PropValue::Number(n),
            Value::String(s) => PropValue::Text(s),
            Value::Array(items) => {
                if !items.is_empty() && items.iter().all(is_delta_run) {
                    let runs = items
                        .into_iter()
                        .filter_map(|item| serde_json::from_value(item).ok())
                        .collect();
                    PropValue::RichText(runs)
                } else {
                    PropValue::List(items.into_iter().map(PropValue::from_json).collect())
                }
            }
            Value::Object(map) => PropValue::Map(Properties::from_json_map(map)),
        }
    }

    /// Convert back into a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            PropValue::Null => Value::Null,
            PropValue::Bool(b) => Value::Bool(*b),
            PropValue::Number(n) => Value::Number(n.clone()),
            PropValue::Text(s) => Value::String(s.clone()),
            PropValue::RichText(runs) => {
                serde_json::to_value(runs).unwrap_or_else(|_| Value::Array(Vec::new()))
            }
            PropValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            PropValue::Map(props) => Value::Object(
                props
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Get the value as a plain string slice (only for `Text`).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the delta runs of a rich text value.
    pub fn as_rich_text(&self) -> Option<&[TextDelta]> {
        match self {
            PropValue::RichText(runs) => Some(runs),
            _ => None,
        }
    }

    /// Get the nested map.
    pub fn as_map(&self) -> Option<&Properties> {
        match self {
            PropValue::Map(props) => Some(props),
            _ => None,
        }
    }

    /// Get the list items.
    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert a scalar or text value to its textual form.
    ///
    /// Returns `None` for null, lists and maps.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            PropValue::Text(s) => Some(Cow::Borrowed(s)),
            PropValue::RichText(runs) => Some(Cow::Owned(
                runs.iter().map(|r| r.insert.as_str()).collect::<String>(),
            )),
            PropValue::Number(n) => Some(Cow::Owned(n.to_string())),
            PropValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            PropValue::Null | PropValue::List(_) | PropValue::Map(_) => None,
        }
    }
}

fn is_delta_run(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("insert"))
        .is_some_and(Value::is_string)
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Text(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Text(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<Vec<TextDelta>> for PropValue {
    fn from(runs: Vec<TextDelta>) -> Self {
        PropValue::RichText(runs)
    }
}

impl From<Properties> for PropValue {
    fn from(props: Properties) -> Self {
        PropValue::Map(props)
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Null => serializer.serialize_unit(),
            PropValue::Bool(b) => serializer.serialize_bool(*b),
            PropValue::Number(n) => n.serialize(serializer),
            PropValue::Text(s) => serializer.serialize_str(s),
            PropValue::RichText(runs) => runs.serialize(serializer),
            PropValue::List(items) => items.serialize(serializer),
            PropValue::Map(props) => props.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PropValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(PropValue::from_json)
    }
}

/// One run of rich text: inserted text plus optional formatting attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDelta {
    /// Text content of the run
    pub insert: String,

    /// Formatting attributes (bold, italic, link, reference, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
}

impl TextDelta {
    /// Create an unformatted run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            insert: text.into(),
            attributes: None,
        }
    }

    /// Add an attribute and return self.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Create a run that references another document.
    pub fn reference(text: impl Into<String>, doc_id: impl Into<String>) -> Self {
        let mut reference = Map::new();
        reference.insert("type".to_string(), Value::from("LinkedPage"));
        reference.insert("pageId".to_string(), Value::from(doc_id.into()));
        Self::plain(text).with_attribute("reference", Value::Object(reference))
    }

    /// Look up a formatting attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.as_ref().and_then(|attrs| attrs.get(key))
    }

    /// Check whether a boolean attribute is set.
    pub fn has_flag(&self, key: &str) -> bool {
        self.attribute(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Link target, if this run is a hyperlink.
    pub fn link(&self) -> Option<&str> {
        self.attribute("link").and_then(Value::as_str)
    }

    /// Document reference carried by this run, if any.
    pub fn doc_reference(&self) -> Option<DocReference> {
        let reference = self.attribute("reference")?.as_object()?;
        let doc_id = reference.get("pageId")?.as_str()?;
        Some(DocReference {
            doc_id: doc_id.to_string(),
            params: reference.get("params").cloned(),
        })
    }
}

/// A reference from a block to another document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocReference {
    /// Referenced document identifier
    pub doc_id: String,

    /// Reference parameters (mode, block ids, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl DocReference {
    /// Serialize the reference as a flat JSON object string.
    ///
    /// Parameters are merged next to `docId`.
    pub fn to_info_string(&self) -> String {
        let mut info = Map::new();
        info.insert("docId".to_string(), Value::from(self.doc_id.clone()));
        if let Some(Value::Object(params)) = &self.params {
            for (k, v) in params {
                info.insert(k.clone(), v.clone());
            }
        }
        Value::Object(info).to_string()
    }
}

/// An ordered property bag.
///
/// Iteration yields entries in the order they were stored in the snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, PropValue)>,
}

impl Properties {
    /// Create an empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, keeping its key order.
    pub fn from_json_map(map: Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(k, v)| (k, PropValue::from_json(v)))
                .collect(),
        }
    }

    /// Insert a value, replacing an existing entry with the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get the textual form of a value by key.
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).and_then(PropValue::to_text)
    }

    /// Check whether a key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over entries in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Properties::from_json_map)
    }
}
