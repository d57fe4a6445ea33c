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

//! Reference scenarios for the JSON dialect
//!
//! 1. `(a, b) => a + b` round-trips with shared parameter identity
//! 2. a switch with a default and two cases, one with two test values
//! 3. a binary node with three operands fails with a path
//! 4. a 32-length add-loop collection carrying 30 items fails internally
//! 5. `Method3(int, double)` does not resolve against `Method3(int, int)`

use exprdoc_core::{deep_eq, Expression, SerializationErrorKind, ValidationMode};
use exprdoc_json::{
    expression_to_json, from_json, json_to_expression, to_json_value, FromJsonConfig,
    ToJsonConfig,
};
use exprdoc_test::fixtures::{self, documents, errors};
use exprdoc_test::sample_registry;

fn sample_config() -> FromJsonConfig {
    FromJsonConfig::builder().registry(sample_registry()).build()
}

// =============================================================================
// Scenario 1: (a, b) => a + b
// =============================================================================

#[test]
fn test_sum_lambda_roundtrip() {
    let expr = fixtures::sum_lambda().unwrap();
    let json = expression_to_json(&expr).unwrap();
    let back = json_to_expression(&json).unwrap();

    assert!(deep_eq(&expr, &back));
    assert_eq!(back.to_string(), "(a, b) => (a + b)");
}

#[test]
fn test_sum_lambda_shares_parameters() {
    let json = expression_to_json(&fixtures::sum_lambda().unwrap()).unwrap();
    let back = json_to_expression(&json).unwrap();
    let lambda = back.as_lambda().unwrap();
    let body = match lambda.body() {
        Expression::Binary(b) => b,
        other => panic!("expected add, found {}", other.kind_name()),
    };
    let declared = lambda.parameters();
    assert!(body.left().as_parameter().unwrap().same_symbol(&declared[0]));
    assert!(body.right().as_parameter().unwrap().same_symbol(&declared[1]));
}

// =============================================================================
// Scenario 2: switch with default and two cases
// =============================================================================

#[test]
fn test_switch_roundtrip() {
    let expr = fixtures::switch_with_default().unwrap();
    let doc = to_json_value(&expr, &ToJsonConfig::default()).unwrap();

    let switch = &doc["expression"]["lambda"]["body"]["switch"];
    assert_eq!(switch["type"], "string");
    assert_eq!(switch["cases"].as_array().unwrap().len(), 2);
    assert_eq!(switch["cases"][0]["case"]["caseValues"].as_array().unwrap().len(), 2);
    assert_eq!(switch["cases"][1]["case"]["caseValues"].as_array().unwrap().len(), 1);
    assert_eq!(switch["defaultCase"]["constant"]["value"], "other");

    let back = exprdoc_json::from_json_value(&doc, &FromJsonConfig::default()).unwrap();
    assert!(deep_eq(&expr, &back));
}

// =============================================================================
// Scenario 3: three operands
// =============================================================================

#[test]
fn test_three_operands_rejected_with_path() {
    let err = json_to_expression(&documents::three_operand_add_json()).unwrap_err();
    let err = err.as_serialization().expect("serialization error");

    assert_eq!(err.kind, SerializationErrorKind::OperandCount);
    assert_eq!(err.path.to_string(), documents::THREE_OPERAND_PATH);
    assert!(
        err.message.contains("'add' requires exactly 2 operand(s), found 3"),
        "{}",
        err.message
    );
}

#[test]
fn test_three_operands_pass_the_schema() {
    // arity is the engine's check, not the schema's
    let doc = exprdoc_json::parse_json(&documents::three_operand_add_json(), &FromJsonConfig::default())
        .unwrap();
    assert!(exprdoc_json::validate_json(&doc, &FromJsonConfig::default()).is_ok());
}

// =============================================================================
// Scenario 4: collection length mismatch
// =============================================================================

#[test]
fn test_short_collection_is_internal_error() {
    let err = json_to_expression(&documents::short_collection_json()).unwrap_err();
    assert!(err.as_internal().is_some(), "{}", err);
    assert!(err.as_serialization().is_none());
}

#[test]
fn test_full_collection_is_accepted() {
    let json = documents::short_collection_json().replace("\"length\": 32", "\"length\": 30");
    let expr = json_to_expression(&json).unwrap();
    assert_eq!(expr.ty().to_string(), "BlockingCollection<int>");
}

// =============================================================================
// Scenario 5: exact overload resolution
// =============================================================================

#[test]
fn test_wrong_overload_is_unresolved() {
    let err = from_json(&documents::wrong_overload_json(), &sample_config()).unwrap_err();
    let err = err.as_serialization().expect("serialization error");

    assert_eq!(err.kind, SerializationErrorKind::UnresolvedMember);
    assert_eq!(err.path.to_string(), documents::WRONG_OVERLOAD_PATH);
    assert!(err.message.contains("Method3(int, double)"), "{}", err.message);
    assert!(err.message.contains("Acme.Sample"), "{}", err.message);
}

#[test]
fn test_exact_overload_resolves() {
    let json = documents::wrong_overload_json()
        .replace(r#"{"type": "double"}"#, r#"{"type": "int"}"#)
        .replace(r#""type": "double", "value": 2.5"#, r#""type": "int", "value": 2"#);
    let expr = from_json(&json, &sample_config()).unwrap();
    assert_eq!(expr.kind_name(), "call");
    assert_eq!(expr.ty().to_string(), "int");
}

#[test]
fn test_sample_types_need_the_sample_registry() {
    let err = json_to_expression(&documents::wrong_overload_json()).unwrap_err();
    assert_eq!(
        err.as_serialization().unwrap().kind,
        SerializationErrorKind::UnresolvedType
    );
}

// =============================================================================
// Malformed documents
// =============================================================================

#[test]
fn test_invalid_samples_report_expected_kind() {
    let config = FromJsonConfig::builder()
        .validation(ValidationMode::Never)
        .build();
    for (name, json, kind) in errors::invalid_json_samples() {
        let err = from_json(json, &config)
            .err()
            .unwrap_or_else(|| panic!("sample {} was accepted", name));
        let err = err
            .as_serialization()
            .unwrap_or_else(|| panic!("sample {}: {}", name, err));
        assert_eq!(err.kind, kind, "sample {}: {}", name, err);
    }
}

#[test]
fn test_lenient_document() {
    let expr = json_to_expression(&documents::lenient_json()).unwrap();
    assert_eq!(expr.to_string(), "x => (x * 2)");
}
