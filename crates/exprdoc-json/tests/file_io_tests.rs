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
use exprdoc_json::{from_json_file, to_json_file, FromJsonConfig, JsonTransformError, ToJsonConfig};
use exprdoc_test::{fixtures, sample_registry};
use tempfile::TempDir;

#[test]
fn test_write_then_read_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sum.json");
    let sum = fixtures::sum_lambda().unwrap();

    to_json_file(&sum, &path, &ToJsonConfig::default()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with('{'));
    assert!(text.contains("\"lambda\""));

    let back = from_json_file(&path, &FromJsonConfig::default()).unwrap();
    assert!(deep_eq(&sum, &back));
}

#[test]
fn test_file_uses_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.json");
    let calls = fixtures::method_calls().unwrap();

    to_json_file(&calls, &path, &ToJsonConfig::builder().registry(sample_registry()).build()).unwrap();

    let err = from_json_file(&path, &FromJsonConfig::default()).unwrap_err();
    assert!(err.as_serialization().is_some(), "{}", err);

    let config = FromJsonConfig::builder().registry(sample_registry()).build();
    let back = from_json_file(&path, &config).unwrap();
    assert!(deep_eq(&calls, &back));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = from_json_file(dir.path().join("absent.json"), &FromJsonConfig::default()).unwrap_err();
    assert!(matches!(err, JsonTransformError::Io(_)));
}

#[test]
fn test_unwritable_path_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("out.json");
    let err = to_json_file(&fixtures::sum_lambda().unwrap(), &path, &ToJsonConfig::default()).unwrap_err();
    assert!(matches!(err, JsonTransformError::Io(_)));
}

#[test]
fn test_garbage_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.json");
    std::fs::write(&path, "{ this is not json").unwrap();
    let err = from_json_file(&path, &FromJsonConfig::default()).unwrap_err();
    assert!(matches!(err, JsonTransformError::Parse(_)));
}
