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

//! Malformed documents and the error kind the engine reports for each.
//!
//! The samples are meant to be read with validation switched off so that the
//! engine, not the schema, rejects them.

use exprdoc_core::SerializationErrorKind as Kind;

/// Invalid JSON documents as (name, json_text, expected_error_kind).
pub fn invalid_json_samples() -> Vec<(&'static str, &'static str, Kind)> {
    vec![
        ("missing_expression", r#"{"$schema": "urn:x"}"#, Kind::MissingElement),
        ("unknown_tag", r#"{"expression": {"frobnicate": {}}}"#, Kind::UnknownNodeKind),
        (
            "two_tags",
            r#"{"expression": {"default": {"type": "int"}, "constant": {"type": "int", "value": 1}}}"#,
            Kind::OperandCount,
        ),
        (
            "one_operand",
            r#"{"expression": {"add": {"operands": [{"constant": {"type": "int", "value": 1}}]}}}"#,
            Kind::OperandCount,
        ),
        (
            "missing_operand",
            r#"{"expression": {"typeIs": {"typeOperand": "int"}}}"#,
            Kind::MissingElement,
        ),
        (
            "two_operands",
            r#"{"expression": {"typeIs": {
                "operand": {"constant": {"type": "int", "value": 1}, "default": {"type": "int"}},
                "typeOperand": "int"
            }}}"#,
            Kind::OperandCount,
        ),
        (
            "lambda_without_parameters",
            r#"{"expression": {"lambda": {"type": "Func<int>", "body": {"constant": {"type": "int", "value": 1}}}}}"#,
            Kind::MissingElement,
        ),
        (
            "goto_without_kind",
            r#"{"expression": {"goto": {"type": "void", "labelTarget": {"labelTarget": {"id": "L1"}}}}}"#,
            Kind::MissingElement,
        ),
        (
            "unknown_goto_kind",
            r#"{"expression": {"goto": {"kind": "leap", "type": "void", "labelTarget": {"labelTarget": {"id": "L1"}}}}}"#,
            Kind::InvalidValue,
        ),
        (
            "scalar_body",
            r#"{"expression": {"lambda": {"type": "Func<int>", "parameters": [], "body": 5}}}"#,
            Kind::UnexpectedNodeKind,
        ),
        (
            "dangling_idref",
            r#"{"expression": {"lambda": {"type": "Func<int>", "parameters": [], "body": {"parameter": {"idref": "P9"}}}}}"#,
            Kind::UnresolvedReference,
        ),
        ("unknown_type", r#"{"expression": {"default": {"type": "Acme.Nope"}}}"#, Kind::UnresolvedType),
        (
            "bad_int",
            r#"{"expression": {"constant": {"type": "int", "value": "abc"}}}"#,
            Kind::InvalidValue,
        ),
        (
            "int_out_of_range",
            r#"{"expression": {"constant": {"type": "byte", "value": 300}}}"#,
            Kind::InvalidValue,
        ),
        (
            "float_out_of_range",
            r#"{"expression": {"constant": {"type": "float", "value": 1e300}}}"#,
            Kind::InvalidValue,
        ),
        (
            "decimal_nan",
            r#"{"expression": {"constant": {"type": "decimal", "value": "NaN"}}}"#,
            Kind::InvalidValue,
        ),
        (
            "decimal_overflow",
            r#"{"expression": {"constant": {"type": "decimal", "value": "1e400"}}}"#,
            Kind::InvalidValue,
        ),
        (
            "object_constant",
            r#"{"expression": {"constant": {"type": "object", "value": 1}}}"#,
            Kind::UnsupportedValue,
        ),
        (
            "mixed_add",
            r#"{"expression": {"add": {"operands": [
                {"constant": {"type": "int", "value": 1}},
                {"constant": {"type": "string", "value": "x"}}
            ]}}}"#,
            Kind::InvalidExpression,
        ),
        (
            "unknown_method",
            r#"{"expression": {"call": {"method": {"declaringType": "System.Console", "name": "Beep", "static": true}, "arguments": []}}}"#,
            Kind::UnresolvedMember,
        ),
    ]
}

/// Invalid XML documents as (name, xml_text, expected_error_kind).
pub fn invalid_xml_samples() -> Vec<(&'static str, &'static str, Kind)> {
    vec![
        ("empty_envelope", r#"<expression/>"#, Kind::MissingElement),
        ("unknown_tag", r#"<expression><frobnicate/></expression>"#, Kind::UnknownNodeKind),
        (
            "two_roots",
            r#"<expression><default type="int"/><default type="int"/></expression>"#,
            Kind::OperandCount,
        ),
        (
            "one_operand",
            r#"<expression><add><operands><constant type="int"><value>1</value></constant></operands></add></expression>"#,
            Kind::OperandCount,
        ),
        (
            "empty_wrapper",
            r#"<expression><typeIs typeOperand="int"><operand/></typeIs></expression>"#,
            Kind::OperandCount,
        ),
        (
            "two_operands",
            r#"<expression><typeIs typeOperand="int"><operand><constant type="int"><value>1</value></constant><default type="int"/></operand></typeIs></expression>"#,
            Kind::OperandCount,
        ),
        (
            "lambda_without_parameters",
            r#"<expression><lambda type="Func&lt;int&gt;"><body><constant type="int"><value>1</value></constant></body></lambda></expression>"#,
            Kind::MissingElement,
        ),
        (
            "goto_without_kind",
            r#"<expression><goto type="void"><labelTarget><labelTarget id="L1"/></labelTarget></goto></expression>"#,
            Kind::MissingElement,
        ),
        (
            "unknown_goto_kind",
            r#"<expression><goto kind="leap" type="void"><labelTarget><labelTarget id="L1"/></labelTarget></goto></expression>"#,
            Kind::InvalidValue,
        ),
        (
            "dangling_idref",
            r#"<expression><lambda type="Func&lt;int&gt;"><parameters/><body><parameter idref="P9"/></body></lambda></expression>"#,
            Kind::UnresolvedReference,
        ),
        ("unknown_type", r#"<expression><default type="Acme.Nope"/></expression>"#, Kind::UnresolvedType),
        (
            "bad_bool",
            r#"<expression><constant type="bool"><value>maybe</value></constant></expression>"#,
            Kind::InvalidValue,
        ),
        (
            "nil_int",
            r#"<expression><constant type="int"><value nil="true"/></constant></expression>"#,
            Kind::InvalidValue,
        ),
        (
            "float_out_of_range",
            r#"<expression><constant type="float"><value>1e300</value></constant></expression>"#,
            Kind::InvalidValue,
        ),
        (
            "decimal_infinity",
            r#"<expression><constant type="decimal"><value>inf</value></constant></expression>"#,
            Kind::InvalidValue,
        ),
        (
            "unknown_method",
            r#"<expression><call><method declaringType="System.Console" name="Beep" static="true"/><arguments/></call></expression>"#,
            Kind::UnresolvedMember,
        ),
    ]
}
