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

//! JSON to expression tree conversion

use crate::element::JsonElement;
use crate::error::JsonTransformError;
use crate::lenient;
use crate::schema::JsonSchema;
use crate::schema_cache::SchemaCache;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::{
    deserialize, DeserializeOptions, Expression, TypeRegistry, ValidationMode, DEFAULT_MAX_DEPTH,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration for reading JSON documents
///
/// # Examples
///
/// ```
/// use exprdoc_json::FromJsonConfig;
/// use exprdoc_core::ValidationMode;
///
/// let strict = FromJsonConfig::builder()
///     .strict()
///     .validation(ValidationMode::Always)
///     .max_depth(200)
///     .build();
/// assert!(!strict.allow_comments);
/// ```
#[derive(Debug, Clone)]
pub struct FromJsonConfig {
    /// Types and members that fragments may name
    pub registry: Arc<TypeRegistry>,
    /// When to validate the document before reading it
    pub validation: ValidationMode,
    /// Schema used instead of the one the document names
    pub schema: Option<Arc<JsonSchema>>,
    /// Accept `//` and `/* */` comments
    pub allow_comments: bool,
    /// Accept a comma before `]` or `}`
    pub allow_trailing_commas: bool,
    /// Maximum node nesting depth
    pub max_depth: usize,
}

impl Default for FromJsonConfig {
    fn default() -> Self {
        Self {
            registry: TypeRegistry::builtin(),
            validation: ValidationMode::default(),
            schema: None,
            allow_comments: true,
            allow_trailing_commas: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FromJsonConfig {
    /// Create a new builder
    pub fn builder() -> FromJsonConfigBuilder {
        FromJsonConfigBuilder::default()
    }

    fn options(&self) -> DeserializeOptions {
        DeserializeOptions {
            max_depth: self.max_depth,
        }
    }
}

/// Builder for [`FromJsonConfig`]
#[derive(Debug, Clone, Default)]
pub struct FromJsonConfigBuilder {
    config: FromJsonConfig,
}

impl FromJsonConfigBuilder {
    /// Resolve types and members against `registry`
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.config.registry = registry;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    /// Validate against `schema` regardless of the document's `$schema`
    pub fn schema(mut self, schema: Arc<JsonSchema>) -> Self {
        self.config.schema = Some(schema);
        self
    }

    pub fn allow_comments(mut self, allow: bool) -> Self {
        self.config.allow_comments = allow;
        self
    }

    pub fn allow_trailing_commas(mut self, allow: bool) -> Self {
        self.config.allow_trailing_commas = allow;
        self
    }

    /// Reject comments and trailing commas
    pub fn strict(mut self) -> Self {
        self.config.allow_comments = false;
        self.config.allow_trailing_commas = false;
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.config.max_depth = limit;
        self
    }

    /// Build the configuration
    pub fn build(self) -> FromJsonConfig {
        self.config
    }
}

/// Parse JSON text, applying the configured tolerances.
///
/// Nesting is not capped here; `max_depth` bounds the node depth once the
/// document is read.
pub fn parse_json(json: &str, config: &FromJsonConfig) -> Result<JsonValue, JsonTransformError> {
    let text = lenient::prepare(json, config.allow_comments, config.allow_trailing_commas);
    let mut de = serde_json::Deserializer::from_str(&text);
    de.disable_recursion_limit();
    let value = JsonValue::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Validate `document` as `config` requires.
pub fn validate_json(document: &JsonValue, config: &FromJsonConfig) -> Result<(), JsonTransformError> {
    let named = document.get(vocab::SCHEMA).and_then(JsonValue::as_str);
    let schema = SchemaCache::global().select(config.validation, config.schema.as_ref(), named)?;
    if let Some(schema) = schema {
        debug!(schema = schema.id(), "validating JSON document");
        schema.validate(document)?;
    }
    Ok(())
}

/// Convert JSON text to an expression tree
///
/// # Examples
///
/// ```
/// use exprdoc_json::{from_json, FromJsonConfig};
///
/// let json = r#"{
///     "$schema": "urn:schemas-vm-com:Linq.Expressions.Serialization.Json",
///     "expression": {"constant": {"type": "int", "value": 42}}
/// }"#;
/// let expr = from_json(json, &FromJsonConfig::default()).unwrap();
/// assert_eq!(expr.to_string(), "42");
/// ```
pub fn from_json(json: &str, config: &FromJsonConfig) -> Result<Expression, JsonTransformError> {
    let document = parse_json(json, config)?;
    from_json_value(&document, config)
}

/// Convert a parsed JSON document to an expression tree
pub fn from_json_value(
    document: &JsonValue,
    config: &FromJsonConfig,
) -> Result<Expression, JsonTransformError> {
    validate_json(document, config)?;
    let root = JsonElement::root(document)?;
    Ok(deserialize(&root, &config.registry, &config.options())?)
}

/// Read a JSON document from a file
pub fn from_json_file(
    path: impl AsRef<Path>,
    config: &FromJsonConfig,
) -> Result<Expression, JsonTransformError> {
    let contents = std::fs::read_to_string(path)?;
    from_json(&contents, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::{SerializationErrorKind, Type};

    #[test]
    fn test_lenient_input_by_default() {
        let json = r#"{
            // the answer
            "expression": {"constant": {"type": "int", "value": 42,},},
        }"#;
        let expr = from_json(json, &FromJsonConfig::default()).unwrap();
        assert_eq!(expr.ty(), &Type::int32());
    }

    #[test]
    fn test_strict_rejects_comments() {
        let json = r#"{"expression": {"constant": {"type": "int", "value": 1}}} // end"#;
        let config = FromJsonConfig::builder().strict().build();
        assert!(matches!(from_json(json, &config), Err(JsonTransformError::Parse(_))));
    }

    #[test]
    fn test_comment_property_is_ignored() {
        let json = r#"{"expression": {"default": {"$comment": "default(int)", "type": "int"}}}"#;
        let expr = from_json(json, &FromJsonConfig::default()).unwrap();
        assert_eq!(expr.kind_name(), "default");
    }

    #[test]
    fn test_schema_gate_reports_violations() {
        let json = format!(
            r#"{{"$schema": "{}", "expression": {{"mystery": {{}}}}}}"#,
            vocab::JSON_SCHEMA_ID
        );
        let err = from_json(&json, &FromJsonConfig::default()).unwrap_err();
        assert!(err.as_schema().is_some(), "{}", err);

        let config = FromJsonConfig::builder().validation(ValidationMode::Never).build();
        let err = from_json(&json, &config).unwrap_err();
        assert_eq!(err.as_serialization().unwrap().kind, SerializationErrorKind::UnknownNodeKind);
    }

    #[test]
    fn test_always_without_schema_fails() {
        let json = r#"{"expression": {"default": {"type": "int"}}}"#;
        let config = FromJsonConfig::builder().validation(ValidationMode::Always).build();
        assert!(matches!(from_json(json, &config), Err(JsonTransformError::MissingSchema(_))));
    }

    #[test]
    fn test_depth_limit() {
        let mut json = String::from(r#"{"constant": {"type": "bool", "value": true}}"#);
        for _ in 0..10 {
            json = format!(r#"{{"not": {{"operand": {}, "type": "bool"}}}}"#, json);
        }
        let json = format!(r#"{{"expression": {}}}"#, json);
        let config = FromJsonConfig::builder().max_depth(5).build();
        let err = from_json(&json, &config).unwrap_err();
        assert_eq!(err.as_serialization().unwrap().kind, SerializationErrorKind::DepthLimitExceeded);
        assert!(from_json(&json, &FromJsonConfig::default()).is_ok());
    }
}
