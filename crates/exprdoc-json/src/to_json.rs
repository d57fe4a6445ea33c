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

//! Expression tree to JSON conversion

use crate::element::JsonSink;
use crate::error::JsonTransformError;
use crate::schema::JsonSchema;
use crate::schema_cache::SchemaCache;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::{
    serialize, Expression, SerializeOptions, TypeNameConvention, TypeRegistry, ValidationMode,
};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration for JSON output
#[derive(Debug, Clone)]
pub struct ToJsonConfig {
    /// Types whose members the tree references
    pub registry: Arc<TypeRegistry>,
    /// Add a `$comment` rendering of every node
    pub add_comments: bool,
    /// Indent the output
    pub pretty: bool,
    /// Spaces per indentation level when pretty printing
    pub indent: usize,
    /// Type name spelling
    pub type_names: TypeNameConvention,
    /// When to validate the produced document
    pub validation: ValidationMode,
    /// Schema used instead of the dialect schema
    pub schema: Option<Arc<JsonSchema>>,
}

impl Default for ToJsonConfig {
    fn default() -> Self {
        Self {
            registry: TypeRegistry::builtin(),
            add_comments: false,
            pretty: true,
            indent: 2,
            type_names: TypeNameConvention::default(),
            validation: ValidationMode::default(),
            schema: None,
        }
    }
}

impl ToJsonConfig {
    /// Create a new builder
    pub fn builder() -> ToJsonConfigBuilder {
        ToJsonConfigBuilder::default()
    }

    fn options(&self) -> SerializeOptions {
        SerializeOptions {
            add_comments: self.add_comments,
            type_names: self.type_names,
        }
    }
}

/// Builder for [`ToJsonConfig`]
#[derive(Debug, Clone, Default)]
pub struct ToJsonConfigBuilder {
    config: ToJsonConfig,
}

impl ToJsonConfigBuilder {
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.config.registry = registry;
        self
    }

    pub fn add_comments(mut self, add: bool) -> Self {
        self.config.add_comments = add;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    /// Pretty print with `spaces` per level
    pub fn indent(mut self, spaces: usize) -> Self {
        self.config.pretty = true;
        self.config.indent = spaces;
        self
    }

    pub fn type_names(mut self, convention: TypeNameConvention) -> Self {
        self.config.type_names = convention;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    pub fn schema(mut self, schema: Arc<JsonSchema>) -> Self {
        self.config.schema = Some(schema);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ToJsonConfig {
        self.config
    }
}

/// Convert an expression tree to a JSON document value
pub fn to_json_value(expr: &Expression, config: &ToJsonConfig) -> Result<JsonValue, JsonTransformError> {
    let root: JsonSink = serialize(expr, &config.registry, &config.options())?;
    let document = root.into_document();
    let schema = SchemaCache::global().select(
        config.validation,
        config.schema.as_ref(),
        Some(vocab::JSON_SCHEMA_ID),
    )?;
    if let Some(schema) = schema {
        debug!(schema = schema.id(), "validating JSON output");
        schema.validate(&document)?;
    }
    Ok(document)
}

/// Render a JSON value the way `config` asks for.
pub fn write_json(document: &JsonValue, config: &ToJsonConfig) -> Result<String, JsonTransformError> {
    if !config.pretty {
        return Ok(serde_json::to_string(document)?);
    }
    let indent = vec![b' '; config.indent];
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    document.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| JsonTransformError::Parse(e.to_string()))
}

/// Convert an expression tree to JSON text
///
/// # Examples
///
/// ```
/// use exprdoc_core::{Expression, Value};
/// use exprdoc_json::{to_json, ToJsonConfig};
///
/// let expr = Expression::constant_of(Value::Int32(7)).unwrap();
/// let json = to_json(&expr, &ToJsonConfig::builder().pretty(false).build()).unwrap();
/// assert!(json.contains(r#""constant":{"type":"int","value":7}"#));
/// ```
pub fn to_json(expr: &Expression, config: &ToJsonConfig) -> Result<String, JsonTransformError> {
    let document = to_json_value(expr, config)?;
    write_json(&document, config)
}

/// Write an expression tree to a JSON file
pub fn to_json_file(
    expr: &Expression,
    path: impl AsRef<Path>,
    config: &ToJsonConfig,
) -> Result<(), JsonTransformError> {
    let json = to_json(expr, config)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::{BinaryOp, ParameterExpression, Type, Value};
    use serde_json::json;

    fn sum() -> Expression {
        let a = ParameterExpression::new(Type::int32(), Some("a"));
        let b = ParameterExpression::new(Type::int32(), Some("b"));
        let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
        Expression::lambda(None, body, vec![a, b], false, None).unwrap().into()
    }

    #[test]
    fn test_envelope_and_ids() {
        let doc = to_json_value(&sum(), &ToJsonConfig::default()).unwrap();
        assert_eq!(doc["$schema"], vocab::JSON_SCHEMA_ID);
        let lambda = &doc["expression"]["lambda"];
        assert_eq!(lambda["type"], "Func<int, int, int>");
        assert_eq!(lambda["parameters"][0], json!({"parameter": {"id": "P1", "type": "int", "name": "a"}}));
        assert_eq!(lambda["parameters"][1]["parameter"]["id"], "P2");
        let operands = &lambda["body"]["add"]["operands"];
        assert_eq!(operands[0], json!({"parameter": {"idref": "P1"}}));
        assert_eq!(operands[1], json!({"parameter": {"idref": "P2"}}));
    }

    #[test]
    fn test_comments() {
        let config = ToJsonConfig::builder().add_comments(true).build();
        let doc = to_json_value(&sum(), &config).unwrap();
        assert_eq!(doc["expression"]["lambda"]["$comment"], "(a, b) => (a + b)");
        assert_eq!(doc["expression"]["lambda"]["body"]["add"]["$comment"], "(a + b)");
    }

    #[test]
    fn test_full_type_names() {
        let config = ToJsonConfig::builder().type_names(TypeNameConvention::Full).build();
        let doc = to_json_value(&Expression::constant_of(Value::Int64(3)).unwrap(), &config).unwrap();
        assert_eq!(doc["expression"]["constant"]["type"], "System.Int64");
    }

    #[test]
    fn test_indentation() {
        let expr = Expression::constant_of(Value::Bool(true)).unwrap();
        let four = to_json(&expr, &ToJsonConfig::builder().indent(4).build()).unwrap();
        assert!(four.contains("\n    \"expression\""));
        let compact = to_json(&expr, &ToJsonConfig::builder().pretty(false).build()).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_non_finite_double() {
        let expr = Expression::constant_of(Value::Double(f64::NEG_INFINITY)).unwrap();
        let doc = to_json_value(&expr, &ToJsonConfig::default()).unwrap();
        assert_eq!(doc["expression"]["constant"]["value"], "-Infinity");
    }

    #[test]
    fn test_reused_visitor_restarts_ids() {
        use exprdoc_core::{deep_eq, ToDocVisitor};

        let registry = TypeRegistry::builtin();
        let mut visitor = ToDocVisitor::<JsonSink>::new(&registry, SerializeOptions::default());
        let expr = sum();
        let first = visitor.serialize(&expr).unwrap().into_document();
        let second = visitor.serialize(&expr).unwrap().into_document();
        assert_eq!(first, second);
        assert_eq!(visitor.symbol_counts(), (2, 0));

        let back = crate::from_json_value(&second, &crate::FromJsonConfig::default()).unwrap();
        assert!(deep_eq(&back, &expr));

        let x = ParameterExpression::new(Type::int32(), Some("x"));
        let identity: Expression = Expression::lambda(None, x.clone().into(), vec![x], false, None)
            .unwrap()
            .into();
        let third = visitor.serialize(&identity).unwrap().into_document();
        assert_eq!(
            third["expression"]["lambda"]["parameters"][0],
            json!({"parameter": {"id": "P1", "type": "int", "name": "x"}})
        );
    }

    #[test]
    fn test_parameterless_lambda_writes_empty_list() {
        let body = Expression::constant_of(Value::Int32(1)).unwrap();
        let expr: Expression = Expression::lambda(None, body, vec![], false, None).unwrap().into();
        let doc = to_json_value(&expr, &ToJsonConfig::default()).unwrap();
        assert_eq!(doc["expression"]["lambda"]["parameters"], json!([]));
        let back = crate::from_json_value(&doc, &crate::FromJsonConfig::default()).unwrap();
        assert_eq!(back.to_string(), "() => 1");
    }
}
