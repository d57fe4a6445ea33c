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

//! Async file and stream helpers with Tokio
//!
//! Only the I/O is asynchronous; conversion runs on the calling task once
//! the whole document is in memory.
//!
//! ```no_run
//! use exprdoc_json::async_api::{from_json_file_async, to_json_file_async};
//! use exprdoc_json::{FromJsonConfig, ToJsonConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let expr = from_json_file_async("input.json", &FromJsonConfig::default()).await?;
//!     to_json_file_async(&expr, "output.json", &ToJsonConfig::default()).await?;
//!     Ok(())
//! }
//! ```

use crate::error::JsonTransformError;
use crate::{from_json, to_json, FromJsonConfig, ToJsonConfig};
use exprdoc_core::Expression;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read a JSON document from a file asynchronously
pub async fn from_json_file_async(
    path: impl AsRef<Path>,
    config: &FromJsonConfig,
) -> Result<Expression, JsonTransformError> {
    let contents = tokio::fs::read_to_string(path).await?;
    from_json(&contents, config)
}

/// Write an expression tree to a JSON file asynchronously
pub async fn to_json_file_async(
    expr: &Expression,
    path: impl AsRef<Path>,
    config: &ToJsonConfig,
) -> Result<(), JsonTransformError> {
    let json = to_json(expr, config)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Read a JSON document from an async reader
pub async fn from_json_reader_async<R: AsyncRead + Unpin>(
    mut reader: R,
    config: &FromJsonConfig,
) -> Result<Expression, JsonTransformError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents).await?;
    from_json(&contents, config)
}

/// Write an expression tree to an async writer
pub async fn to_json_writer_async<W: AsyncWrite + Unpin>(
    expr: &Expression,
    mut writer: W,
    config: &ToJsonConfig,
) -> Result<(), JsonTransformError> {
    let json = to_json(expr, config)?;
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
