//! JSON:API document model and validated parsing
//!
//! A response body is parsed in two steps: first into an untyped
//! `serde_json::Value` (malformed JSON is a parse error), then into typed
//! [`Resource`] values (a wrong shape is a schema error). Nothing is indexed
//! until the whole document has been validated.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::StreamError;

// ============================================================================
// Domain Models (Input from API)
// ============================================================================

/// One JSON:API record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relationships: Map<String, Value>,
    /// Public page of a discussion, derived at index-build time.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Resource {
    pub fn pointer(&self) -> ResourcePointer {
        ResourcePointer::new(&self.kind, &self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn str_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Value::as_str)
    }

    /// Like [`Resource::str_attribute`] but a missing or non-string value is
    /// a schema error.
    pub fn require_str(&self, name: &str) -> Result<&str, StreamError> {
        self.str_attribute(name).ok_or_else(|| {
            StreamError::schema(format!(
                "{} {} has no string attribute `{}`",
                self.kind, self.id, name
            ))
        })
    }

    /// Raw relationship entry (pointer, envelope or collection).
    pub fn relationship_ref(&self, name: &str) -> Option<&Value> {
        self.relationships.get(name)
    }
}

/// A `{type, id}` reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourcePointer {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl ResourcePointer {
    pub fn new(kind: &str, id: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    /// Read a single pointer, unwrapping a `{data: ...}` envelope if present.
    pub fn from_value(value: &Value) -> Result<Self, StreamError> {
        match unwrap_envelope(value) {
            Value::Null => Err(StreamError::schema(
                "relationship does not link to any resource",
            )),
            Value::Array(_) => Err(StreamError::schema(
                "expected a single resource pointer, found a collection",
            )),
            linkage => pointer_from_object(linkage),
        }
    }

    /// Read to-many linkage. A single pointer yields one element and a
    /// `null` linkage yields none.
    pub fn many_from_value(value: &Value) -> Result<Vec<Self>, StreamError> {
        match unwrap_envelope(value) {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.iter().map(pointer_from_object).collect(),
            linkage => Ok(vec![pointer_from_object(linkage)?]),
        }
    }
}

fn unwrap_envelope(value: &Value) -> &Value {
    value.get("data").unwrap_or(value)
}

fn pointer_from_object(value: &Value) -> Result<ResourcePointer, StreamError> {
    let kind = value.get("type").and_then(Value::as_str);
    let id = value.get("id").and_then(id_from_value);

    match (kind, id) {
        (Some(kind), Some(id)) => Ok(ResourcePointer {
            kind: kind.to_string(),
            id,
        }),
        _ => Err(StreamError::schema("missing type or id in relationship query")),
    }
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Ids follow the same rule as pointer ids; a missing or null id is empty.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => id_from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id {value}"))),
    }
}

fn deserialize_kind<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validated top-level response.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub data: Vec<Resource>,
    pub included: Vec<Resource>,
}

impl Document {
    /// Parse and validate a response body.
    pub fn parse(body: &str) -> Result<Self, StreamError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, StreamError> {
        let Value::Object(mut root) = value else {
            return Err(StreamError::schema("response is not a JSON object"));
        };

        let data = match root.remove("data") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(StreamError::schema(
                    "invalid or missing data key in the discussions response",
                ))
            }
        };

        let included = match root.remove("included") {
            None => Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(StreamError::schema(
                    "included key in the discussions response is not an array",
                ))
            }
        };

        Ok(Self {
            data: parse_resources(data, "data")?,
            included: parse_resources(included, "included")?,
        })
    }
}

/// Included entries must be addressable; primary entries are kept as they
/// come so `data.len()` is preserved.
fn parse_resources(entries: Vec<Value>, section: &str) -> Result<Vec<Resource>, StreamError> {
    let addressable = section == "included";

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if addressable && pointer_from_object(&entry).is_err() {
                return Err(StreamError::schema(format!(
                    "missing type or id in {section}[{index}]"
                )));
            }

            serde_json::from_value(entry)
                .map_err(|e| StreamError::schema(format!("{section}[{index}]: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_document() {
        let document =
            Document::parse(r#"{"data":[{"type":"discussions","id":"1"}]}"#).unwrap();

        assert_eq!(document.data.len(), 1);
        assert_eq!(document.data[0].kind, "discussions");
        assert!(document.data[0].attributes.is_empty());
        assert!(document.data[0].url.is_none());
        assert!(document.included.is_empty());
    }

    #[test]
    fn test_numeric_ids_are_normalized() {
        let document = Document::parse(r#"{"data":[{"type":"users","id":42}]}"#).unwrap();
        assert_eq!(document.data[0].id, "42");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Document::parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, StreamError::Parse(_)));
    }

    #[test]
    fn test_missing_data_is_schema_error() {
        let err = Document::parse(r#"{"included":[]}"#).unwrap_err();
        assert!(matches!(err, StreamError::Schema(_)));
    }

    #[test]
    fn test_non_array_data_is_schema_error() {
        let err = Document::parse(r#"{"data":{"type":"discussions","id":"1"}}"#).unwrap_err();
        assert!(matches!(err, StreamError::Schema(_)));
    }

    #[test]
    fn test_non_object_root_is_schema_error() {
        let err = Document::parse("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, StreamError::Schema(_)));
    }

    #[test]
    fn test_non_array_included_is_schema_error() {
        let err = Document::parse(r#"{"data":[],"included":{}}"#).unwrap_err();
        assert_eq!(
            err,
            StreamError::schema("included key in the discussions response is not an array")
        );
    }

    #[test]
    fn test_included_without_id_is_schema_error() {
        let err = Document::parse(r#"{"data":[],"included":[{"type":"users"}]}"#).unwrap_err();
        assert_eq!(err, StreamError::schema("missing type or id in included[0]"));
    }

    #[test]
    fn test_included_without_type_is_schema_error() {
        let err = Document::parse(r#"{"data":[],"included":[{"id":"1"}]}"#).unwrap_err();
        assert_eq!(err, StreamError::schema("missing type or id in included[0]"));
    }

    #[test]
    fn test_included_null_type_is_schema_error() {
        let err =
            Document::parse(r#"{"data":[],"included":[{"type":null,"id":"1"}]}"#).unwrap_err();
        assert_eq!(err, StreamError::schema("missing type or id in included[0]"));
    }

    #[test]
    fn test_included_non_object_attributes_is_schema_error() {
        let err = Document::parse(
            r#"{"data":[],"included":[{"type":"users","id":"1","attributes":[]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StreamError::Schema(ref msg) if msg.starts_with("included[0]")));
    }

    #[test]
    fn test_non_object_attributes_is_schema_error() {
        let err =
            Document::parse(r#"{"data":[{"type":"users","id":"1","attributes":[]}]}"#).unwrap_err();
        assert!(matches!(err, StreamError::Schema(ref msg) if msg.starts_with("data[0]")));
    }

    #[test]
    fn test_null_members_parse_as_empty() {
        let document = Document::parse(
            r#"{"data":[
                {"type":"discussions","id":"1","relationships":null},
                {"type":"discussions","id":"2","attributes":null}
            ]}"#,
        )
        .unwrap();

        assert_eq!(document.data.len(), 2);
        assert!(document.data[0].relationships.is_empty());
        assert!(document.data[1].attributes.is_empty());
    }

    #[test]
    fn test_data_entries_without_type_or_id_are_kept() {
        let document =
            Document::parse(r#"{"data":[{"attributes":{"title":"a"}},{"type":"discussions"}]}"#)
                .unwrap();

        assert_eq!(document.data.len(), 2);
        assert_eq!(document.data[0].kind, "");
        assert_eq!(document.data[0].id, "");
        assert_eq!(document.data[0].str_attribute("title"), Some("a"));
        assert_eq!(document.data[1].id, "");
    }

    #[test]
    fn test_resource_and_pointer_ids_share_one_rule() {
        let document = Document::parse(
            r#"{"data":[],"included":[{"type":"users","id":-1},{"type":"posts","id":1.5}]}"#,
        )
        .unwrap();

        assert_eq!(document.included[0].id, "-1");
        assert_eq!(document.included[1].id, "1.5");
        assert_eq!(
            ResourcePointer::from_value(&json!({"type": "users", "id": -1})).unwrap(),
            document.included[0].pointer()
        );
        assert_eq!(
            ResourcePointer::from_value(&json!({"type": "posts", "id": 1.5})).unwrap(),
            document.included[1].pointer()
        );
    }

    #[test]
    fn test_data_entry_with_invalid_id_is_schema_error() {
        let err = Document::parse(r#"{"data":[{"type":"discussions","id":[1]}]}"#).unwrap_err();
        assert!(matches!(err, StreamError::Schema(ref msg) if msg.starts_with("data[0]")));
    }

    #[test]
    fn test_pointer_from_raw_pointer() {
        let pointer = ResourcePointer::from_value(&json!({"type": "users", "id": "9"})).unwrap();
        assert_eq!(pointer, ResourcePointer::new("users", "9"));
    }

    #[test]
    fn test_pointer_from_envelope() {
        let pointer =
            ResourcePointer::from_value(&json!({"data": {"type": "posts", "id": 3}})).unwrap();
        assert_eq!(pointer, ResourcePointer::new("posts", "3"));
    }

    #[test]
    fn test_pointer_without_id_is_schema_error() {
        let err = ResourcePointer::from_value(&json!({"data": {"type": "posts"}})).unwrap_err();
        assert!(matches!(err, StreamError::Schema(_)));
    }

    #[test]
    fn test_pointer_from_collection_is_schema_error() {
        let err = ResourcePointer::from_value(&json!({"data": [{"type": "tags", "id": "1"}]}))
            .unwrap_err();
        assert!(matches!(err, StreamError::Schema(_)));
    }

    #[test]
    fn test_many_from_collection_and_null() {
        let pointers = ResourcePointer::many_from_value(&json!({
            "data": [{"type": "tags", "id": "1"}, {"type": "tags", "id": "2"}]
        }))
        .unwrap();
        assert_eq!(pointers.len(), 2);
        assert_eq!(pointers[1].id, "2");

        let empty = ResourcePointer::many_from_value(&json!({"data": null})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_require_str_reports_missing_attribute() {
        let document = Document::parse(
            r#"{"data":[{"type":"discussions","id":"7","attributes":{"title":3}}]}"#,
        )
        .unwrap();
        let err = document.data[0].require_str("title").unwrap_err();
        assert_eq!(
            err,
            StreamError::schema("discussions 7 has no string attribute `title`")
        );
    }
}
