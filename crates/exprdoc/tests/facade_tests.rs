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

//! Facade tests across both dialects

use exprdoc::{
    convert, deep_eq, from_file, from_str, from_str_with, to_file, to_string_with, Error,
    Expression, Format, Options, ResultExt, SerializationErrorKind, ValidationMode, Value,
};
use exprdoc_test::fixtures::{self, documents};
use exprdoc_test::{count_nodes, sample_registry};
use proptest::prelude::*;
use tempfile::TempDir;

fn sample_options() -> Options {
    Options::with_registry(sample_registry())
}

#[test]
fn test_every_fixture_in_both_formats() {
    let options = Options {
        add_comments: true,
        validation: ValidationMode::Always,
        ..sample_options()
    };
    for (name, fixture) in fixtures::all() {
        let expr = fixture().unwrap();
        for format in [Format::Json, Format::Xml] {
            let text = to_string_with(&expr, format, &options)
                .with_context(|| format!("writing {} as {}", name, format))
                .unwrap();
            let back = from_str_with(&text, format, &options)
                .with_context(|| format!("reading {} as {}", name, format))
                .unwrap();
            assert!(deep_eq(&expr, &back), "fixture {} changed in {}", name, format);
        }
    }
}

#[test]
fn test_conversion_is_lossless() {
    let options = sample_options();
    for (name, fixture) in fixtures::all() {
        let expr = fixture().unwrap();
        let json = to_string_with(&expr, Format::Json, &options).unwrap();
        let xml = convert(&json, Format::Json, Format::Xml, &options).unwrap();
        assert_eq!(xml, to_string_with(&expr, Format::Xml, &options).unwrap(), "{}", name);
        let again = convert(&xml, Format::Xml, Format::Json, &options).unwrap();
        assert_eq!(again, json, "{}", name);
    }
}

#[test]
fn test_same_error_in_both_formats() {
    let json = from_str(&documents::three_operand_add_json(), Format::Json).unwrap_err();
    let xml = from_str(&documents::three_operand_add_xml(), Format::Xml).unwrap_err();
    let (json, xml) = (json.as_serialization().unwrap(), xml.as_serialization().unwrap());
    assert_eq!(json.kind, SerializationErrorKind::OperandCount);
    assert_eq!(json.kind, xml.kind);
    assert_eq!(json.path, xml.path);
    assert_eq!(json.message, xml.message);
}

#[test]
fn test_files_by_extension() {
    let dir = TempDir::new().unwrap();
    let expr = fixtures::exception_handling().unwrap();
    let options = sample_options();
    for name in ["handlers.json", "handlers.XML"] {
        let path = dir.path().join(name);
        to_file(&expr, &path, &options).unwrap();
        let back = from_file(&path, &options).unwrap();
        assert!(deep_eq(&expr, &back), "{}", name);
    }

    let err = to_file(&expr, dir.path().join("handlers.yaml"), &options).unwrap_err();
    assert!(matches!(err, Error::UnknownFormat(ref ext) if ext == "yaml"));
    assert!(!dir.path().join("handlers.yaml").exists());
}

#[test]
fn test_context_on_file_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.xml");
    let err = from_file(&path, &Options::default())
        .with_context(|| format!("loading {}", path.display()))
        .unwrap_err();
    assert_eq!(err.contexts().len(), 1);
    assert!(matches!(err.root(), Error::Xml(exprdoc::xml::XmlTransformError::Io { .. })));
}

proptest! {
    #[test]
    fn prop_constants_convert_both_ways(v in any::<i64>(), s in "[a-zA-Z0-9 <>&'\"]{0,24}") {
        let options = Options::default();
        let block = Expression::block(
            None,
            Vec::new(),
            vec![
                Expression::constant_of(Value::Int64(v)).unwrap(),
                Expression::constant_of(Value::String(s)).unwrap(),
            ],
        )
        .unwrap();
        let json = to_string_with(&block, Format::Json, &options).unwrap();
        let xml = convert(&json, Format::Json, Format::Xml, &options).unwrap();
        let back = from_str(&xml, Format::Xml).unwrap();
        prop_assert!(deep_eq(&block, &back));
        prop_assert_eq!(count_nodes(&back), 3);
    }
}
