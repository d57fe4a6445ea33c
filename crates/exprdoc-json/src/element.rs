// exprdoc - Expression tree document serialization
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `serde_json` views and builders for the document traits.
//!
//! A node is an object with exactly one key, the tag, whose value is the
//! object of node properties. Fragments are plain property objects.

use exprdoc_core::document::format_float;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::{DocElement, DocPath, DocValue, ElementSink, Scalar, SerializationError, ValueSource};
use serde_json::{Map, Number, Value as JsonValue};

/// JSON kind name for error messages.
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn to_scalar(value: &JsonValue) -> Option<Scalar> {
    match value {
        JsonValue::Null => Some(Scalar::Null),
        JsonValue::Bool(b) => Some(Scalar::Bool(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Scalar::Int(i))
            } else if let Some(u) = n.as_u64() {
                Some(Scalar::UInt(u))
            } else {
                n.as_f64().map(Scalar::Float)
            }
        }
        JsonValue::String(s) => Some(Scalar::Str(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn from_scalar(scalar: Scalar) -> JsonValue {
    match scalar {
        Scalar::Null => JsonValue::Null,
        Scalar::Bool(b) => JsonValue::Bool(b),
        Scalar::Int(i) => JsonValue::Number(i.into()),
        Scalar::UInt(u) => JsonValue::Number(u.into()),
        Scalar::Float(x) => match Number::from_f64(x) {
            Some(n) => JsonValue::Number(n),
            None => JsonValue::String(format_float(x)),
        },
        Scalar::Str(s) => JsonValue::String(s),
    }
}

pub(crate) fn from_doc_value(value: DocValue) -> JsonValue {
    match value {
        DocValue::Null => JsonValue::Null,
        DocValue::Scalar(s) => from_scalar(s),
        DocValue::Seq(items) => JsonValue::Array(items.into_iter().map(from_doc_value).collect()),
        DocValue::Map(entries) => JsonValue::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k, from_doc_value(v)))
                .collect(),
        ),
    }
}

/// Constant payload inside a JSON document.
#[derive(Debug, Clone)]
pub struct JsonValueSource<'a> {
    value: &'a JsonValue,
    path: DocPath,
}

impl<'a> ValueSource for JsonValueSource<'a> {
    fn path(&self) -> &DocPath {
        &self.path
    }

    fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn scalar(&self) -> Result<Scalar, SerializationError> {
        to_scalar(self.value).ok_or_else(|| {
            SerializationError::invalid_value(
                &self.path,
                format!("expected a scalar value, found {}", json_kind(self.value)),
            )
        })
    }

    fn items(&self) -> Result<Vec<Self>, SerializationError> {
        match self.value {
            JsonValue::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, value)| JsonValueSource {
                    value,
                    path: self.path.index(i),
                })
                .collect()),
            other => Err(SerializationError::invalid_value(
                &self.path,
                format!("expected an array, found {}", json_kind(other)),
            )),
        }
    }

    fn field(&self, name: &str) -> Result<Option<Self>, SerializationError> {
        match self.value {
            JsonValue::Object(map) => Ok(map.get(name).map(|value| JsonValueSource {
                value,
                path: self.path.child(name),
            })),
            other => Err(SerializationError::invalid_value(
                &self.path,
                format!("expected an object, found {}", json_kind(other)),
            )),
        }
    }
}

/// A node or fragment of a parsed JSON document.
#[derive(Debug, Clone)]
pub struct JsonElement<'a> {
    tag: &'a str,
    props: &'a Map<String, JsonValue>,
    path: DocPath,
}

impl<'a> JsonElement<'a> {
    /// The root node of an envelope `{"$schema": ..., "expression": {...}}`.
    pub fn root(document: &'a JsonValue) -> Result<Self, SerializationError> {
        let envelope = match document {
            JsonValue::Object(map) => map,
            other => {
                return Err(SerializationError::unexpected_node(
                    &DocPath::new(),
                    "an object",
                    json_kind(other),
                ))
            }
        };
        let expression = envelope
            .get(vocab::EXPRESSION)
            .ok_or_else(|| SerializationError::missing_element(&DocPath::new(), vocab::EXPRESSION))?;
        Self::node(expression, DocPath::root(vocab::EXPRESSION), vocab::EXPRESSION)
    }

    /// Interpret `value` as a node wrapped at `path`.
    fn node(value: &'a JsonValue, path: DocPath, wrapper: &str) -> Result<Self, SerializationError> {
        let map = match value {
            JsonValue::Object(map) => map,
            other => {
                return Err(SerializationError::unexpected_node(&path, "a node object", json_kind(other)))
            }
        };
        let mut entries = map.iter();
        match (entries.next(), entries.next()) {
            (Some((tag, JsonValue::Object(props))), None) => Ok(JsonElement {
                tag,
                props,
                path: path.child(tag),
            }),
            (Some((tag, other)), None) => Err(SerializationError::unexpected_node(
                &path.child(tag),
                "an object of node properties",
                json_kind(other),
            )),
            _ => Err(SerializationError::operand_count(&path, wrapper, 1, map.len())),
        }
    }

    fn nodes(&self, name: &str, items: &'a [JsonValue]) -> Result<Vec<Self>, SerializationError> {
        let base = self.path.child(name);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::node(item, base.index(i), name))
            .collect()
    }

    fn get(&self, name: &str) -> Option<(&'a String, &'a JsonValue)> {
        match self.props.get_key_value(name) {
            Some((_, JsonValue::Null)) | None => None,
            found => found,
        }
    }
}

impl<'a> DocElement for JsonElement<'a> {
    type Value = JsonValueSource<'a>;

    fn tag(&self) -> &str {
        self.tag
    }

    fn path(&self) -> &DocPath {
        &self.path
    }

    fn element(&self, name: &str) -> Result<Option<Self>, SerializationError> {
        match self.get(name) {
            None => Ok(None),
            Some((_, value)) if value.is_object() => {
                Self::node(value, self.path.child(name), self.tag).map(Some)
            }
            Some((_, JsonValue::Array(items))) if items.len() == 1 => {
                Self::node(&items[0], self.path.child(name).index(0), self.tag).map(Some)
            }
            Some((_, JsonValue::Array(items))) => Err(SerializationError::operand_count(
                &self.path.child(name),
                self.tag,
                1,
                items.len(),
            )),
            Some((_, other)) => Err(SerializationError::unexpected_node(
                &self.path.child(name),
                "a node object",
                json_kind(other),
            )),
        }
    }

    fn elements(&self, name: &str) -> Result<Option<Vec<Self>>, SerializationError> {
        match self.get(name) {
            None => Ok(None),
            Some((_, JsonValue::Array(items))) => self.nodes(name, items).map(Some),
            Some((_, other)) => Err(SerializationError::unexpected_node(
                &self.path.child(name),
                "an array of nodes",
                json_kind(other),
            )),
        }
    }

    fn object(&self, name: &str) -> Result<Option<Self>, SerializationError> {
        match self.get(name) {
            None => Ok(None),
            Some((key, JsonValue::Object(props))) => Ok(Some(JsonElement {
                tag: key,
                props,
                path: self.path.child(name),
            })),
            Some((_, other)) => Err(SerializationError::unexpected_node(
                &self.path.child(name),
                "an object",
                json_kind(other),
            )),
        }
    }

    fn objects(&self, name: &str) -> Result<Option<Vec<Self>>, SerializationError> {
        let (key, items) = match self.get(name) {
            None => return Ok(None),
            Some((key, JsonValue::Array(items))) => (key, items),
            Some((_, other)) => {
                return Err(SerializationError::unexpected_node(
                    &self.path.child(name),
                    "an array of objects",
                    json_kind(other),
                ))
            }
        };
        let base = self.path.child(name);
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                JsonValue::Object(props) => out.push(JsonElement {
                    tag: key,
                    props,
                    path: base.index(i),
                }),
                other => {
                    return Err(SerializationError::unexpected_node(
                        &base.index(i),
                        "an object",
                        json_kind(other),
                    ))
                }
            }
        }
        Ok(Some(out))
    }

    fn scalar(&self, name: &str) -> Result<Option<Scalar>, SerializationError> {
        match self.props.get(name) {
            None => Ok(None),
            Some(value) => to_scalar(value).map(Some).ok_or_else(|| {
                SerializationError::invalid_value(
                    &self.path,
                    format!("property '{}' must be a scalar, found {}", name, json_kind(value)),
                )
            }),
        }
    }

    fn value(&self, name: &str) -> Result<Option<Self::Value>, SerializationError> {
        Ok(self.props.get(name).map(|value| JsonValueSource {
            value,
            path: self.path.child(name),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SinkKind {
    Node(String),
    Fragment,
}

/// Builder for one output node or fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSink {
    kind: SinkKind,
    comment: Option<String>,
    props: Map<String, JsonValue>,
}

impl JsonSink {
    /// The finished JSON value: `{tag: {...}}` for nodes, `{...}` for fragments.
    pub fn into_value(self) -> JsonValue {
        let props = match self.comment {
            Some(comment) => {
                let mut map = Map::with_capacity(self.props.len() + 1);
                map.insert(vocab::COMMENT.to_string(), JsonValue::String(comment));
                map.extend(self.props);
                map
            }
            None => self.props,
        };
        match self.kind {
            SinkKind::Node(tag) => {
                let mut node = Map::with_capacity(1);
                node.insert(tag, JsonValue::Object(props));
                JsonValue::Object(node)
            }
            SinkKind::Fragment => JsonValue::Object(props),
        }
    }

    /// Wrap a root node in the dialect envelope.
    pub fn into_document(self) -> JsonValue {
        let mut envelope = Map::with_capacity(2);
        envelope.insert(
            vocab::SCHEMA.to_string(),
            JsonValue::String(vocab::JSON_SCHEMA_ID.to_string()),
        );
        envelope.insert(vocab::EXPRESSION.to_string(), self.into_value());
        JsonValue::Object(envelope)
    }
}

impl ElementSink for JsonSink {
    fn node(tag: &str) -> Self {
        JsonSink {
            kind: SinkKind::Node(tag.to_string()),
            comment: None,
            props: Map::new(),
        }
    }

    fn fragment(_name: &str) -> Self {
        JsonSink {
            kind: SinkKind::Fragment,
            comment: None,
            props: Map::new(),
        }
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) {
        self.props.insert(name.to_string(), from_scalar(value));
    }

    fn set_element(&mut self, name: &str, node: Self) {
        self.props.insert(name.to_string(), node.into_value());
    }

    fn set_elements(&mut self, name: &str, nodes: Vec<Self>) {
        let items = nodes.into_iter().map(JsonSink::into_value).collect();
        self.props.insert(name.to_string(), JsonValue::Array(items));
    }

    fn set_object(&mut self, name: &str, fragment: Self) {
        self.props.insert(name.to_string(), fragment.into_value());
    }

    fn set_objects(&mut self, name: &str, fragments: Vec<Self>) {
        self.set_elements(name, fragments);
    }

    fn set_value(&mut self, name: &str, value: DocValue) {
        self.props.insert(name.to_string(), from_doc_value(value));
    }

    fn set_comment(&mut self, text: &str) {
        self.comment = Some(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::SerializationErrorKind;
    use serde_json::json;

    #[test]
    fn test_root_element_path() {
        let doc = json!({"expression": {"parameter": {"id": "P1", "type": "int"}}});
        let root = JsonElement::root(&doc).unwrap();
        assert_eq!(root.tag(), "parameter");
        assert_eq!(root.path().to_string(), "expression/parameter");
        assert_eq!(root.get_id().unwrap(), "P1");
    }

    #[test]
    fn test_missing_expression_fails() {
        let doc = json!({"$schema": vocab::JSON_SCHEMA_ID});
        let err = JsonElement::root(&doc).unwrap_err();
        assert_eq!(err.kind, SerializationErrorKind::MissingElement);
    }

    #[test]
    fn test_array_item_paths() {
        let doc = json!({"expression": {"add": {"operands": [
            {"constant": {"type": "int", "value": 1}},
            {"constant": {"type": "int", "value": 2}}
        ]}}});
        let root = JsonElement::root(&doc).unwrap();
        let operands = root.get_elements("operands").unwrap();
        assert_eq!(operands.len(), 2);
        assert_eq!(operands[1].path().to_string(), "expression/add/operands[1]/constant");
    }

    #[test]
    fn test_wrapper_with_two_nodes_is_operand_count() {
        let doc = json!({"expression": {"typeIs": {
            "operand": {"parameter": {"idref": "P1"}, "constant": {"type": "int", "value": 1}},
            "typeOperand": "int"
        }}});
        let root = JsonElement::root(&doc).unwrap();
        let err = root.element("operand").unwrap_err();
        assert_eq!(err.kind, SerializationErrorKind::OperandCount);
        assert_eq!(err.path.to_string(), "expression/typeIs/operand");
        assert!(root.try_element("operand").is_none());
    }

    #[test]
    fn test_null_property_counts_as_absent() {
        let doc = json!({"expression": {"lambda": {"name": null, "body": null}}});
        let root = JsonElement::root(&doc).unwrap();
        assert!(root.element("body").unwrap().is_none());
        assert_eq!(root.property::<String>("name").unwrap(), None);
    }

    #[test]
    fn test_fragment_takes_property_name_as_tag() {
        let doc = json!({"expression": {"call": {"method": {"declaringType": "System.Math", "name": "Max"}}}});
        let root = JsonElement::root(&doc).unwrap();
        let method = root.get_object("method").unwrap();
        assert_eq!(method.tag(), "method");
        assert_eq!(method.path().to_string(), "expression/call/method");
        assert_eq!(method.get_property::<String>("name").unwrap(), "Max");
    }

    #[test]
    fn test_sink_places_comment_first() {
        let mut node = JsonSink::node("constant");
        node.set_scalar("type", Scalar::from("int"));
        node.set_value("value", DocValue::Scalar(Scalar::Int(3)));
        node.set_comment("3");
        let value = node.into_value();
        let props = value["constant"].as_object().unwrap();
        assert_eq!(props.keys().next().map(String::as_str), Some("$comment"));
        assert_eq!(value, json!({"constant": {"$comment": "3", "type": "int", "value": 3}}));
    }

    #[test]
    fn test_non_finite_float_falls_back_to_string() {
        assert_eq!(from_scalar(Scalar::Float(f64::NAN)), json!("NaN"));
        assert_eq!(from_scalar(Scalar::Float(1.5)), json!(1.5));
    }
}
