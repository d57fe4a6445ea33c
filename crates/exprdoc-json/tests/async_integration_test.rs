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

//! Async helpers over files and in-memory streams

#![cfg(feature = "async")]

use exprdoc_core::deep_eq;
use exprdoc_json::async_api::{
    from_json_file_async, from_json_reader_async, to_json_file_async, to_json_writer_async,
};
use exprdoc_json::{FromJsonConfig, JsonTransformError, ToJsonConfig};
use exprdoc_test::{fixtures, sample_registry};
use tempfile::TempDir;

#[tokio::test]
async fn test_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loop.json");
    let expr = fixtures::counting_loop().unwrap();

    to_json_file_async(&expr, &path, &ToJsonConfig::default()).await.unwrap();
    let back = from_json_file_async(&path, &FromJsonConfig::default()).await.unwrap();
    assert!(deep_eq(&expr, &back));
}

#[tokio::test]
async fn test_stream_roundtrip() {
    let expr = fixtures::member_access().unwrap();
    let mut buffer: Vec<u8> = Vec::new();
    let out = ToJsonConfig::builder().registry(sample_registry()).build();
    to_json_writer_async(&expr, &mut buffer, &out).await.unwrap();
    assert!(!buffer.is_empty());

    let read = FromJsonConfig::builder().registry(sample_registry()).build();
    let back = from_json_reader_async(buffer.as_slice(), &read).await.unwrap();
    assert!(deep_eq(&expr, &back));
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = from_json_file_async(dir.path().join("absent.json"), &FromJsonConfig::default()).await;
    assert!(matches!(result, Err(JsonTransformError::Io(_))));
}

#[tokio::test]
async fn test_reader_reports_document_errors() {
    let json = br#"{"expression": {"add": {"operands": []}}}"#;
    let err = from_json_reader_async(&json[..], &FromJsonConfig::default()).await.unwrap_err();
    assert!(err.as_serialization().is_some(), "{}", err);
}
