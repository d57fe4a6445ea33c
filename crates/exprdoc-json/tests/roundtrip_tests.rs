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

//! Round-trip tests over every fixture
//!
//! Every fixture must come back deep-equal, with the same node and symbol
//! counts, under each output configuration.

use exprdoc_core::{
    deep_eq, Expression, SerializationErrorKind, TypeNameConvention, DEFAULT_MAX_DEPTH,
};
use exprdoc_json::{
    from_json, parse_json, to_json, to_json_value, FromJsonConfig, ToJsonConfig,
};
use exprdoc_test::{fixtures, sample_registry, NodeCounter};
use serde_json::Value as JsonValue;

fn roundtrip(expr: &Expression, config: &ToJsonConfig) -> Expression {
    let json = to_json(expr, config).unwrap_or_else(|e| panic!("to_json failed for {}: {}", expr, e));
    let read = FromJsonConfig::builder().registry(sample_registry()).build();
    from_json(&json, &read).unwrap_or_else(|e| panic!("from_json failed: {}\n{}", e, json))
}

fn check_all(config: &ToJsonConfig) {
    for (name, fixture) in fixtures::all() {
        let expr = fixture().unwrap();
        let back = roundtrip(&expr, config);
        assert!(deep_eq(&expr, &back), "fixture {} changed in the round trip", name);
        assert_eq!(
            NodeCounter::new().count(&expr),
            NodeCounter::new().count(&back),
            "fixture {}",
            name
        );
        assert_eq!(expr.to_string(), back.to_string(), "fixture {}", name);
    }
}

fn sample_output() -> exprdoc_json::ToJsonConfigBuilder {
    ToJsonConfig::builder().registry(sample_registry())
}

#[test]
fn test_fixtures_roundtrip_default() {
    check_all(&sample_output().build());
}

#[test]
fn test_fixtures_roundtrip_with_comments() {
    check_all(&sample_output().add_comments(true).build());
}

#[test]
fn test_fixtures_roundtrip_full_type_names() {
    check_all(&sample_output().type_names(TypeNameConvention::Full).build());
}

#[test]
fn test_fixtures_roundtrip_compact() {
    check_all(&sample_output().pretty(false).build());
}

#[test]
fn test_output_is_stable() {
    let config = sample_output().build();
    for (name, fixture) in fixtures::all() {
        let expr = fixture().unwrap();
        let first = to_json(&expr, &config).unwrap();
        let second = to_json(&roundtrip(&expr, &config), &config).unwrap();
        assert_eq!(first, second, "fixture {}", name);
    }
}

fn collect_ids(value: &JsonValue, key: &str, out: &mut Vec<String>) {
    match value {
        JsonValue::Object(map) => {
            for (k, v) in map {
                if k == key {
                    if let Some(id) = v.as_str() {
                        out.push(id.to_string());
                    }
                }
                collect_ids(v, key, out);
            }
        }
        JsonValue::Array(items) => items.iter().for_each(|v| collect_ids(v, key, out)),
        _ => {}
    }
}

#[test]
fn test_every_idref_has_an_id() {
    let config = sample_output().build();
    for (name, fixture) in fixtures::all() {
        let doc = to_json_value(&fixture().unwrap(), &config).unwrap();
        let (mut ids, mut idrefs) = (Vec::new(), Vec::new());
        collect_ids(&doc, "id", &mut ids);
        collect_ids(&doc, "idref", &mut idrefs);

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len(), "fixture {} declares an id twice", name);
        for idref in &idrefs {
            assert!(ids.contains(idref), "fixture {}: dangling idref {}", name, idref);
        }
    }
}

#[test]
fn test_label_ids_in_emission_order() {
    let doc = to_json_value(&fixtures::counting_loop().unwrap(), &ToJsonConfig::default()).unwrap();
    let mut ids = Vec::new();
    collect_ids(&doc, "id", &mut ids);
    assert_eq!(ids, vec!["P1", "L1", "L2"]);
}

#[test]
fn test_constant_encodings() {
    let doc = to_json_value(&fixtures::constants().unwrap(), &ToJsonConfig::default()).unwrap();
    let exprs = doc["expression"]["block"]["expressions"].as_array().unwrap();
    let value_of = |type_name: &str| {
        exprs
            .iter()
            .map(|e| &e["constant"])
            .find(|c| c["type"] == type_name)
            .map(|c| c["value"].clone())
            .unwrap_or_else(|| panic!("no constant of type {}", type_name))
    };

    assert_eq!(value_of("ulong"), JsonValue::from(u64::MAX));
    assert_eq!(value_of("decimal"), "79228162514264337593543950335");
    assert_eq!(value_of("int?"), JsonValue::Null);
    assert_eq!(value_of("int[]"), serde_json::json!([1, 2, 3]));
    assert_eq!(value_of("List<int>"), serde_json::json!({"length": 5, "items": [1, 2, 3, 4, 5]}));
    assert_eq!(
        value_of("KeyValuePair<string, double>"),
        serde_json::json!({"key": "pi", "value": 3.25})
    );
}

#[test]
fn test_struct_and_enum_constants() {
    let config = sample_output().build();
    let doc = to_json_value(&fixtures::application_constants().unwrap(), &config).unwrap();
    let exprs = &doc["expression"]["block"]["expressions"];
    assert_eq!(exprs[0]["constant"]["value"], serde_json::json!({"X": 3, "Y": -4}));
    assert_eq!(exprs[1]["constant"]["value"], 2);
    assert_eq!(exprs[2]["constant"]["value"], JsonValue::Null);
}

#[test]
fn test_member_fragments() {
    let config = sample_output().build();
    let doc = to_json_value(&fixtures::method_calls().unwrap(), &config).unwrap();
    let exprs = &doc["expression"]["lambda"]["body"]["block"]["expressions"];

    let write_line = &exprs[0]["call"]["method"];
    assert_eq!(write_line["declaringType"], "System.Console");
    assert_eq!(write_line["static"], true);
    assert_eq!(write_line["parameterSpecs"], serde_json::json!([{"type": "string"}]));

    let reset = &exprs[1]["call"]["method"];
    assert_eq!(reset["visibility"], "nonPublic");
    assert!(reset.get("parameterSpecs").is_none());

    let method3 = &exprs[2]["call"]["method"];
    assert_eq!(method3["name"], "Method3");
    assert_eq!(
        method3["parameterSpecs"],
        serde_json::json!([{"type": "int"}, {"type": "int"}])
    );
}

// =============================================================================
// Deep nesting
// =============================================================================

#[test]
fn test_nesting_just_below_depth_limit() {
    let expr = fixtures::nested_sum(DEFAULT_MAX_DEPTH - 1).unwrap();
    let back = roundtrip(&expr, &sample_output().build());
    assert!(deep_eq(&expr, &back));
    assert_eq!(
        NodeCounter::new().count(&back).max_depth,
        NodeCounter::new().count(&expr).max_depth
    );
}

#[test]
fn test_nesting_past_depth_limit_is_rejected() {
    let expr = fixtures::nested_sum(DEFAULT_MAX_DEPTH + 1).unwrap();
    let json = to_json(&expr, &ToJsonConfig::default()).unwrap();
    let err = from_json(&json, &FromJsonConfig::default()).unwrap_err();
    let err = err.as_serialization().unwrap();
    assert_eq!(err.kind, SerializationErrorKind::DepthLimitExceeded);
}

#[test]
fn test_deep_chain_beyond_parser_default_limit() {
    // three JSON levels per node, so this is far past 128 levels of JSON
    let expr = fixtures::nested_sum(100).unwrap();
    let json = to_json(&expr, &ToJsonConfig::builder().pretty(false).build()).unwrap();
    let back = from_json(&json, &FromJsonConfig::default()).unwrap();
    assert!(deep_eq(&expr, &back));
}

#[test]
fn test_parser_accepts_deeply_nested_text() {
    let text = format!("{}{}", "[".repeat(600), "]".repeat(600));
    let value = parse_json(&text, &FromJsonConfig::default()).unwrap();
    assert!(value.is_array());
}
