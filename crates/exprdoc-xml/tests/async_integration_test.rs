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
use exprdoc_test::{fixtures, sample_registry};
use exprdoc_xml::async_api::{
    from_xml_file_async, from_xml_files_concurrent, from_xml_reader_async, to_xml_file_async,
    to_xml_writer_async,
};
use exprdoc_xml::{FromXmlConfig, ToXmlConfig, XmlTransformError};
use tempfile::TempDir;

#[tokio::test]
async fn test_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loop.xml");
    let expr = fixtures::counting_loop().unwrap();

    to_xml_file_async(&expr, &path, &ToXmlConfig::default()).await.unwrap();
    let back = from_xml_file_async(&path, &FromXmlConfig::default()).await.unwrap();
    assert!(deep_eq(&expr, &back));
}

#[tokio::test]
async fn test_stream_roundtrip() {
    let expr = fixtures::member_access().unwrap();
    let mut buffer: Vec<u8> = Vec::new();
    let out = ToXmlConfig::builder().registry(sample_registry()).build();
    to_xml_writer_async(&expr, &mut buffer, &out).await.unwrap();
    assert!(buffer.starts_with(b"<?xml"));

    let read = FromXmlConfig::builder().registry(sample_registry()).build();
    let back = from_xml_reader_async(buffer.as_slice(), &read).await.unwrap();
    assert!(deep_eq(&expr, &back));
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = from_xml_file_async(dir.path().join("absent.xml"), &FromXmlConfig::default()).await;
    assert!(matches!(result, Err(XmlTransformError::Io { .. })));
}

#[tokio::test]
async fn test_reader_reports_document_errors() {
    let xml = br#"<expression><add><operands/></add></expression>"#;
    let err = from_xml_reader_async(&xml[..], &FromXmlConfig::default()).await.unwrap_err();
    assert!(err.as_serialization().is_some(), "{}", err);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_reads_keep_input_order() {
    let dir = TempDir::new().unwrap();
    let config = ToXmlConfig::default();
    let written = [
        ("sum.xml", fixtures::sum_lambda().unwrap()),
        ("switch.xml", fixtures::switch_with_default().unwrap()),
        ("loop.xml", fixtures::counting_loop().unwrap()),
    ];
    let mut paths = Vec::new();
    for (name, expr) in &written {
        let path = dir.path().join(name);
        to_xml_file_async(expr, &path, &config).await.unwrap();
        paths.push(path);
    }
    paths.insert(1, dir.path().join("absent.xml"));

    let results = from_xml_files_concurrent(&paths, &FromXmlConfig::default(), 2).await;
    assert_eq!(results.len(), 4);
    assert!(deep_eq(&written[0].1, results[0].as_ref().unwrap()));
    assert!(matches!(results[1], Err(XmlTransformError::Io { .. })));
    assert!(deep_eq(&written[1].1, results[2].as_ref().unwrap()));
    assert!(deep_eq(&written[2].1, results[3].as_ref().unwrap()));
}

#[tokio::test]
async fn test_concurrency_of_zero_still_reads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sum.xml");
    to_xml_file_async(&fixtures::sum_lambda().unwrap(), &path, &ToXmlConfig::default())
        .await
        .unwrap();
    let results = from_xml_files_concurrent([&path, &path], &FromXmlConfig::default(), 0).await;
    assert!(results.iter().all(Result::is_ok));
}
