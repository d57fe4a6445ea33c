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

//! Facade errors and context helpers.
//!
//! ```rust
//! use exprdoc::{from_str, Format, ResultExt};
//!
//! fn load(name: &str, text: &str) -> Result<exprdoc::Expression, exprdoc::Error> {
//!     from_str(text, Format::Json).with_context(|| format!("loading {}", name))
//! }
//!
//! let err = load("broken.json", "{").unwrap_err();
//! assert!(err.to_string().starts_with("loading broken.json: "));
//! ```

use exprdoc_core::{InternalTransformError, SchemaValidationError, SerializationError};
use exprdoc_json::JsonTransformError;
use exprdoc_xml::XmlTransformError;
use thiserror::Error;

/// Any failure of a facade operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The JSON dialect failed.
    #[error(transparent)]
    Json(#[from] JsonTransformError),

    /// The XML dialect failed.
    #[error(transparent)]
    Xml(#[from] XmlTransformError),

    /// A format name or file extension was not recognised.
    #[error("unknown document format '{0}'")]
    UnknownFormat(String),

    /// Another error, annotated by a caller.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The innermost error, below any context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Context messages, outermost first.
    pub fn contexts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self;
        while let Error::Context { context, source } = current {
            out.push(context.as_str());
            current = source;
        }
        out
    }

    /// The malformed-document error, if that is what this is.
    pub fn as_serialization(&self) -> Option<&SerializationError> {
        match self.root() {
            Error::Json(e) => e.as_serialization(),
            Error::Xml(e) => e.as_serialization(),
            _ => None,
        }
    }

    pub fn as_internal(&self) -> Option<&InternalTransformError> {
        match self.root() {
            Error::Json(e) => e.as_internal(),
            Error::Xml(e) => e.as_internal(),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaValidationError> {
        match self.root() {
            Error::Json(e) => e.as_schema(),
            Error::Xml(e) => e.as_schema(),
            _ => None,
        }
    }

    fn wrap(self, context: String) -> Error {
        Error::Context {
            context,
            source: Box::new(self),
        }
    }
}

/// Annotate errors on their way up.
pub trait ResultExt<T> {
    /// Add a fixed context message.
    fn context<C: Into<String>>(self, context: C) -> Result<T, Error>;

    /// Add a context message computed only on failure.
    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T, Error>;
}

impl<T, E: Into<Error>> ResultExt<T> for Result<T, E> {
    fn context<C: Into<String>>(self, context: C) -> Result<T, Error> {
        self.map_err(|e| e.into().wrap(context.into()))
    }

    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T, Error> {
        self.map_err(|e| e.into().wrap(f().into()))
    }
}
