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

//! JSON Schema subset validation
//!
//! Supports the keywords the dialect schema uses: `type`, `enum`, `const`,
//! `properties`, `required`, `additionalProperties`, `propertyNames`,
//! `minProperties`, `maxProperties`, `items`, `minItems`, `maxItems`,
//! `minLength`, `maxLength`, `allOf`, `anyOf`, `oneOf`, `not` and local
//! `$ref` pointers (`#/definitions/...`). Unknown keywords are ignored.
//!
//! Violations carry a JSON pointer to the offending value in their message;
//! parsed `serde_json` values have no source positions, so line and column
//! are left empty.

use crate::element::json_kind;
use crate::error::JsonTransformError;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::{with_stack, SchemaValidationError, SchemaViolation};
use serde_json::Value as JsonValue;

/// The dialect schema shipped with the crate.
pub const DIALECT_SCHEMA: &str = include_str!("../schemas/expression.schema.json");

/// Nesting limit for `$ref` chains that do not descend into the instance.
const MAX_REF_DEPTH: usize = 64;

/// A parsed schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    id: String,
    root: JsonValue,
}

impl JsonSchema {
    /// Parse a schema; its `$id` becomes the cache key.
    pub fn parse(text: &str) -> Result<Self, JsonTransformError> {
        let root: JsonValue = serde_json::from_str(text)?;
        Self::from_value(root)
    }

    /// Wrap an already parsed schema.
    pub fn from_value(root: JsonValue) -> Result<Self, JsonTransformError> {
        let id = match root.get("$id") {
            Some(JsonValue::String(id)) => id.clone(),
            _ => {
                return Err(JsonTransformError::InvalidSchema {
                    id: String::new(),
                    message: "schema has no '$id'".to_string(),
                })
            }
        };
        if !root.is_object() {
            return Err(JsonTransformError::InvalidSchema {
                id,
                message: "schema root must be an object".to_string(),
            });
        }
        Ok(Self { id, root })
    }

    /// The bundled schema of the expression dialect.
    pub fn dialect() -> Result<Self, JsonTransformError> {
        let schema = Self::parse(DIALECT_SCHEMA)?;
        if schema.id != vocab::JSON_SCHEMA_ID {
            return Err(JsonTransformError::InvalidSchema {
                id: schema.id,
                message: format!("expected '$id' {}", vocab::JSON_SCHEMA_ID),
            });
        }
        Ok(schema)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check `instance`, collecting every violation.
    pub fn validate(&self, instance: &JsonValue) -> Result<(), SchemaValidationError> {
        let mut validator = Validator {
            root: &self.root,
            violations: Vec::new(),
        };
        validator.check(&self.root, instance, "", 0);
        if validator.violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError {
                schema: self.id.clone(),
                violations: validator.violations,
            })
        }
    }

    /// True when `instance` conforms.
    pub fn is_valid(&self, instance: &JsonValue) -> bool {
        self.validate(instance).is_ok()
    }
}

struct Validator<'s> {
    root: &'s JsonValue,
    violations: Vec<SchemaViolation>,
}

fn pointer_child(pointer: &str, key: &str) -> String {
    format!("{}/{}", pointer, key.replace('~', "~0").replace('/', "~1"))
}

fn type_matches(name: &str, instance: &JsonValue) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => instance.is_i64() || instance.is_u64(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        _ => false,
    }
}

fn as_count(value: Option<&JsonValue>) -> Option<usize> {
    value
        .and_then(JsonValue::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

impl<'s> Validator<'s> {
    fn fail(&mut self, pointer: &str, message: impl std::fmt::Display) {
        let location = if pointer.is_empty() { "/" } else { pointer };
        self.violations
            .push(SchemaViolation::new(None, None, format!("{}: {}", location, message)));
    }

    /// Run `schema` against `instance` without recording violations.
    fn passes(&self, schema: &JsonValue, instance: &JsonValue, depth: usize) -> bool {
        let mut probe = Validator {
            root: self.root,
            violations: Vec::new(),
        };
        probe.check(schema, instance, "", depth);
        probe.violations.is_empty()
    }

    /// Check a value nested inside `instance`'s parent.
    fn descend(&mut self, schema: &JsonValue, instance: &JsonValue, pointer: &str) {
        with_stack(|| self.check(schema, instance, pointer, 0))
    }

    fn check(&mut self, schema: &JsonValue, instance: &JsonValue, pointer: &str, depth: usize) {
        let keywords = match schema {
            JsonValue::Bool(true) => return,
            JsonValue::Bool(false) => return self.fail(pointer, "no value is allowed here"),
            JsonValue::Object(keywords) => keywords,
            _ => return,
        };

        if let Some(JsonValue::String(reference)) = keywords.get("$ref") {
            if depth >= MAX_REF_DEPTH {
                return self.fail(pointer, format!("reference '{}' nests too deeply", reference));
            }
            let root = self.root;
            let target = reference
                .strip_prefix('#')
                .and_then(|p| if p.is_empty() { Some(root) } else { root.pointer(p) });
            match target {
                Some(target) => self.check(target, instance, pointer, depth + 1),
                None => self.fail(pointer, format!("unresolvable reference '{}'", reference)),
            }
        }

        if let Some(expected) = keywords.get("type") {
            let ok = match expected {
                JsonValue::String(name) => type_matches(name, instance),
                JsonValue::Array(names) => names
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .any(|name| type_matches(name, instance)),
                _ => true,
            };
            if !ok {
                return self.fail(
                    pointer,
                    format!("expected {}, found {}", expected, json_kind(instance)),
                );
            }
        }

        if let Some(JsonValue::Array(allowed)) = keywords.get("enum") {
            if !allowed.contains(instance) {
                self.fail(pointer, format!("{} is not one of the allowed values", instance));
            }
        }
        if let Some(constant) = keywords.get("const") {
            if constant != instance {
                self.fail(pointer, format!("expected {}, found {}", constant, instance));
            }
        }

        for sub in keywords.get("allOf").and_then(JsonValue::as_array).into_iter().flatten() {
            self.check(sub, instance, pointer, depth);
        }
        if let Some(JsonValue::Array(options)) = keywords.get("anyOf") {
            if !options.iter().any(|s| self.passes(s, instance, depth)) {
                self.fail(pointer, "value matches none of the alternatives");
            }
        }
        if let Some(JsonValue::Array(options)) = keywords.get("oneOf") {
            let matched = options.iter().filter(|s| self.passes(s, instance, depth)).count();
            if matched != 1 {
                self.fail(pointer, format!("value matches {} alternatives, expected exactly 1", matched));
            }
        }
        if let Some(negated) = keywords.get("not") {
            if self.passes(negated, instance, depth) {
                self.fail(pointer, "value matches a forbidden schema");
            }
        }

        match instance {
            JsonValue::Object(map) => self.check_object(keywords, map, pointer, depth),
            JsonValue::Array(items) => self.check_array(keywords, items, pointer, depth),
            JsonValue::String(s) => {
                let len = s.chars().count();
                if let Some(min) = as_count(keywords.get("minLength")) {
                    if len < min {
                        self.fail(pointer, format!("string is shorter than {} character(s)", min));
                    }
                }
                if let Some(max) = as_count(keywords.get("maxLength")) {
                    if len > max {
                        self.fail(pointer, format!("string is longer than {} character(s)", max));
                    }
                }
            }
            _ => {}
        }
    }

    fn check_object(
        &mut self,
        keywords: &serde_json::Map<String, JsonValue>,
        map: &serde_json::Map<String, JsonValue>,
        pointer: &str,
        depth: usize,
    ) {
        if let Some(JsonValue::Array(required)) = keywords.get("required") {
            for name in required.iter().filter_map(JsonValue::as_str) {
                if !map.contains_key(name) {
                    self.fail(pointer, format!("missing required property '{}'", name));
                }
            }
        }
        if let Some(min) = as_count(keywords.get("minProperties")) {
            if map.len() < min {
                self.fail(pointer, format!("expected at least {} propert(ies), found {}", min, map.len()));
            }
        }
        if let Some(max) = as_count(keywords.get("maxProperties")) {
            if map.len() > max {
                self.fail(pointer, format!("expected at most {} propert(ies), found {}", max, map.len()));
            }
        }

        let properties = keywords.get("properties").and_then(JsonValue::as_object);
        let additional = keywords.get("additionalProperties");
        let names = keywords.get("propertyNames");
        for (key, value) in map {
            let child = pointer_child(pointer, key);
            if let Some(names) = names {
                if !self.passes(names, &JsonValue::String(key.clone()), depth) {
                    self.fail(&child, format!("'{}' is not an allowed property name", key));
                    continue;
                }
            }
            match properties.and_then(|p| p.get(key)) {
                Some(sub) => self.descend(sub, value, &child),
                None => match additional {
                    Some(JsonValue::Bool(false)) => {
                        self.fail(&child, format!("property '{}' is not allowed", key))
                    }
                    Some(sub) => self.descend(sub, value, &child),
                    None => {}
                },
            }
        }
    }

    fn check_array(
        &mut self,
        keywords: &serde_json::Map<String, JsonValue>,
        items: &[JsonValue],
        pointer: &str,
        _depth: usize,
    ) {
        if let Some(min) = as_count(keywords.get("minItems")) {
            if items.len() < min {
                self.fail(pointer, format!("expected at least {} item(s), found {}", min, items.len()));
            }
        }
        if let Some(max) = as_count(keywords.get("maxItems")) {
            if items.len() > max {
                self.fail(pointer, format!("expected at most {} item(s), found {}", max, items.len()));
            }
        }
        if let Some(item_schema) = keywords.get("items") {
            for (i, item) in items.iter().enumerate() {
                self.descend(item_schema, item, &pointer_child(pointer, &i.to_string()));
            }
        }
    }
}
