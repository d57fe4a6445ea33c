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

//! File helpers

use exprdoc_core::deep_eq;
use exprdoc_test::{fixtures, sample_registry};
use exprdoc_xml::{from_xml_file, to_xml_file, FromXmlConfig, ToXmlConfig, XmlTransformError};
use tempfile::TempDir;

#[test]
fn test_write_then_read_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sum.xml");
    let sum = fixtures::sum_lambda().unwrap();

    to_xml_file(&sum, &path, &ToXmlConfig::default()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(text.contains("<lambda "));

    let back = from_xml_file(&path, &FromXmlConfig::default()).unwrap();
    assert!(deep_eq(&sum, &back));
}

#[test]
fn test_byte_order_mark_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bom.xml");
    let sum = fixtures::sum_lambda().unwrap();
    let xml = exprdoc_xml::expression_to_xml(&sum).unwrap();

    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(xml.as_bytes());
    std::fs::write(&path, bytes).unwrap();

    let back = from_xml_file(&path, &FromXmlConfig::default()).unwrap();
    assert!(deep_eq(&sum, &back));
}

#[test]
fn test_file_uses_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.xml");
    let calls = fixtures::method_calls().unwrap();

    to_xml_file(&calls, &path, &ToXmlConfig::builder().registry(sample_registry()).build()).unwrap();

    let err = from_xml_file(&path, &FromXmlConfig::default()).unwrap_err();
    assert!(err.as_serialization().is_some(), "{}", err);

    let config = FromXmlConfig::builder().registry(sample_registry()).build();
    let back = from_xml_file(&path, &config).unwrap();
    assert!(deep_eq(&calls, &back));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = from_xml_file(dir.path().join("absent.xml"), &FromXmlConfig::default()).unwrap_err();
    assert!(matches!(err, XmlTransformError::Io { .. }));
}

#[test]
fn test_unwritable_path_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("out.xml");
    let err = to_xml_file(&fixtures::sum_lambda().unwrap(), &path, &ToXmlConfig::default()).unwrap_err();
    assert!(matches!(err, XmlTransformError::Io { .. }));
}

#[test]
fn test_garbage_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.xml");
    std::fs::write(&path, "<expression><constant></expression>").unwrap();
    let err = from_xml_file(&path, &FromXmlConfig::default()).unwrap_err();
    assert!(matches!(err, XmlTransformError::Parse { line: 1, .. }), "{}", err);
}

#[test]
fn test_latin1_file_is_utf8_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.xml");
    std::fs::write(&path, b"<expression>\xE9</expression>").unwrap();
    let err = from_xml_file(&path, &FromXmlConfig::default()).unwrap_err();
    assert!(matches!(err, XmlTransformError::Utf8 { .. }), "{}", err);
}
