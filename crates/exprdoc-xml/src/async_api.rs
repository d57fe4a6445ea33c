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

//! Async API for XML conversion with Tokio
//!
//! File and stream helpers: the I/O is asynchronous, conversion runs on the
//! calling task once the whole document is in memory.
//!
//! # Examples
//!
//! ```no_run
//! use exprdoc_xml::async_api::{from_xml_file_async, to_xml_file_async};
//! use exprdoc_xml::{FromXmlConfig, ToXmlConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let expr = from_xml_file_async("input.xml", &FromXmlConfig::default()).await?;
//!     to_xml_file_async(&expr, "output.xml", &ToXmlConfig::default()).await?;
//!     Ok(())
//! }
//! ```

use crate::error::XmlTransformError;
use crate::{from_xml_bytes, to_xml, FromXmlConfig, ToXmlConfig};
use exprdoc_core::Expression;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinSet;

/// Read an XML document from a file asynchronously
pub async fn from_xml_file_async(
    path: impl AsRef<Path>,
    config: &FromXmlConfig,
) -> Result<Expression, XmlTransformError> {
    let bytes = tokio::fs::read(path).await?;
    from_xml_bytes(&bytes, config)
}

/// Write an expression tree to an XML file asynchronously
pub async fn to_xml_file_async(
    expr: &Expression,
    path: impl AsRef<Path>,
    config: &ToXmlConfig,
) -> Result<(), XmlTransformError> {
    let xml = to_xml(expr, config)?;
    tokio::fs::write(path, xml).await?;
    Ok(())
}

/// Read an XML document from an async reader
pub async fn from_xml_reader_async<R: AsyncRead + Unpin>(
    mut reader: R,
    config: &FromXmlConfig,
) -> Result<Expression, XmlTransformError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    from_xml_bytes(&bytes, config)
}

/// Write an expression tree to an async writer
pub async fn to_xml_writer_async<W: AsyncWrite + Unpin>(
    expr: &Expression,
    mut writer: W,
    config: &ToXmlConfig,
) -> Result<(), XmlTransformError> {
    let xml = to_xml(expr, config)?;
    writer.write_all(xml.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read several XML files with at most `concurrency` reads in flight.
///
/// Results are returned in the order of `paths`. Must be called from within
/// a Tokio runtime.
pub async fn from_xml_files_concurrent<I, P>(
    paths: I,
    config: &FromXmlConfig,
    concurrency: usize,
) -> Vec<Result<Expression, XmlTransformError>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let paths: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
    let mut results: Vec<Option<Result<Expression, XmlTransformError>>> =
        (0..paths.len()).map(|_| None).collect();
    let mut set = JoinSet::new();
    let mut queue = paths.into_iter().enumerate();

    let spawn = |set: &mut JoinSet<_>, (index, path): (usize, PathBuf)| {
        let config = config.clone();
        set.spawn(async move { (index, from_xml_file_async(&path, &config).await) });
    };
    for item in queue.by_ref().take(concurrency.max(1)) {
        spawn(&mut set, item);
    }
    while let Some(joined) = set.join_next().await {
        // A panicked task leaves its slot empty.
        if let Ok((index, result)) = joined {
            results[index] = Some(result);
        }
        if let Some(item) = queue.next() {
            spawn(&mut set, item);
        }
    }

    results
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(XmlTransformError::Io {
                    message: "conversion task failed".to_string(),
                })
            })
        })
        .collect()
}
