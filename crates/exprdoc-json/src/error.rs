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

//! Errors of the JSON dialect.

use exprdoc_core::{
    InternalTransformError, SchemaValidationError, SerializationError, TransformError,
};

/// Errors that can occur while converting between JSON and expression trees
#[derive(Debug, thiserror::Error)]
pub enum JsonTransformError {
    /// The text is not JSON
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// The document is malformed or the engine failed
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The document does not conform to its schema
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// A schema could not be loaded
    #[error("invalid schema '{id}': {message}")]
    InvalidSchema { id: String, message: String },

    /// Validation was required but no schema applies
    #[error("no schema available to validate the document (requested '{0}')")]
    MissingSchema(String),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JsonTransformError {
    /// The path-qualified serialization error, if this is one.
    pub fn as_serialization(&self) -> Option<&SerializationError> {
        match self {
            Self::Transform(e) => e.as_serialization(),
            _ => None,
        }
    }

    /// The internal engine error, if this is one.
    pub fn as_internal(&self) -> Option<&InternalTransformError> {
        match self {
            Self::Transform(e) => e.as_internal(),
            _ => None,
        }
    }

    /// The schema validation error, if this is one.
    pub fn as_schema(&self) -> Option<&SchemaValidationError> {
        match self {
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for JsonTransformError {
    fn from(err: serde_json::Error) -> Self {
        JsonTransformError::Parse(err.to_string())
    }
}

impl From<SerializationError> for JsonTransformError {
    fn from(err: SerializationError) -> Self {
        JsonTransformError::Transform(err.into())
    }
}
