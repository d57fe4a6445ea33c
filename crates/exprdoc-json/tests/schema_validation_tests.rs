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

//! Schema gate tests: bundled dialect schema, custom schemas and the cache

use exprdoc_core::vocabulary::JSON_SCHEMA_ID;
use exprdoc_core::{Expression, ValidationMode, Value};
use exprdoc_json::{
    from_json, to_json, FromJsonConfig, JsonSchema, JsonTransformError, SchemaCache, ToJsonConfig,
};
use exprdoc_test::{fixtures, sample_registry};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

const CONSTANTS_ONLY: &str = r#"{
    "$id": "urn:acme:constants-only",
    "type": "object",
    "required": ["expression"],
    "properties": {
        "expression": {
            "type": "object",
            "required": ["constant"],
            "additionalProperties": false,
            "properties": {"constant": {"type": "object"}}
        }
    }
}"#;

fn constants_only() -> Arc<JsonSchema> {
    Arc::new(JsonSchema::parse(CONSTANTS_ONLY).unwrap())
}

fn forty_two() -> Expression {
    Expression::constant_of(Value::Int32(42)).unwrap()
}

#[test]
fn test_every_fixture_passes_bundled_schema() {
    init_tracing();
    let schema = JsonSchema::dialect().unwrap();
    let config = ToJsonConfig::builder()
        .registry(sample_registry())
        .validation(ValidationMode::Never)
        .build();
    for (name, fixture) in fixtures::all() {
        let doc = exprdoc_json::to_json_value(&fixture().unwrap(), &config).unwrap();
        if let Err(e) = schema.validate(&doc) {
            panic!("fixture {} violates the dialect schema: {}", name, e);
        }
    }
}

#[test]
fn test_always_validates_output() {
    init_tracing();
    let config = ToJsonConfig::builder().validation(ValidationMode::Always).build();
    assert!(to_json(&fixtures::sum_lambda().unwrap(), &config).is_ok());
}

#[test]
fn test_custom_schema_on_input() {
    init_tracing();
    let config = FromJsonConfig::builder().schema(constants_only()).build();

    let json = to_json(&forty_two(), &ToJsonConfig::default()).unwrap();
    assert!(from_json(&json, &config).is_ok());

    let json = to_json(&fixtures::sum_lambda().unwrap(), &ToJsonConfig::default()).unwrap();
    let err = from_json(&json, &config).unwrap_err();
    let schema_err = err.as_schema().unwrap();
    assert_eq!(schema_err.schema, "urn:acme:constants-only");
    assert!(!schema_err.violations.is_empty());
}

#[test]
fn test_custom_schema_on_output() {
    init_tracing();
    let config = ToJsonConfig::builder().schema(constants_only()).build();
    assert!(to_json(&forty_two(), &config).is_ok());
    let err = to_json(&fixtures::sum_lambda().unwrap(), &config).unwrap_err();
    assert!(err.as_schema().is_some());
}

#[test]
fn test_never_skips_custom_schema() {
    let config = FromJsonConfig::builder()
        .schema(constants_only())
        .validation(ValidationMode::Never)
        .build();
    let json = to_json(&fixtures::sum_lambda().unwrap(), &ToJsonConfig::default()).unwrap();
    assert!(from_json(&json, &config).is_ok());
}

#[test]
fn test_unknown_schema_id() {
    let json = r#"{"$schema": "urn:acme:unknown", "expression": {"default": {"type": "int"}}}"#;

    let lenient = FromJsonConfig::default();
    assert!(from_json(json, &lenient).is_ok());

    let always = FromJsonConfig::builder().validation(ValidationMode::Always).build();
    match from_json(json, &always) {
        Err(JsonTransformError::MissingSchema(id)) => assert_eq!(id, "urn:acme:unknown"),
        other => panic!("expected MissingSchema, got {:?}", other),
    }
}

#[test]
fn test_global_cache_serves_registered_schema() {
    init_tracing();
    let cache = SchemaCache::global();
    let schema = cache.load(CONSTANTS_ONLY).unwrap();
    assert_eq!(schema.id(), "urn:acme:constants-only");
    assert!(cache.contains("urn:acme:constants-only"));

    let accepted = r#"{"$schema": "urn:acme:constants-only", "expression": {"constant": {"type": "int", "value": 1}}}"#;
    assert!(from_json(accepted, &FromJsonConfig::default()).is_ok());

    let rejected = r#"{"$schema": "urn:acme:constants-only", "expression": {"default": {"type": "int"}}}"#;
    let err = from_json(rejected, &FromJsonConfig::default()).unwrap_err();
    assert!(err.as_schema().is_some(), "{}", err);

    assert!(cache.get(JSON_SCHEMA_ID).unwrap().is_some());
}

#[test]
fn test_bundled_schema_rejects_malformed_nodes() {
    let samples = [
        r#"{"$schema": "urn:schemas-vm-com:Linq.Expressions.Serialization.Json", "expression": {"constant": {"type": "", "value": 1}}}"#,
        r#"{"$schema": "urn:schemas-vm-com:Linq.Expressions.Serialization.Json", "expression": {"lambda": {"body": 3}}}"#,
        r#"{"$schema": "urn:schemas-vm-com:Linq.Expressions.Serialization.Json", "expression": {"parameter": {"type": 5}}}"#,
    ];
    for json in samples {
        let err = from_json(json, &FromJsonConfig::default()).unwrap_err();
        assert!(err.as_schema().is_some(), "{} gave {}", json, err);
    }
}

#[test]
fn test_invalid_schema_text() {
    assert!(JsonSchema::parse("[1, 2]").is_err());
    assert!(JsonSchema::parse("{").is_err());
}
