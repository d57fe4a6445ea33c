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

//! Error types for the XML dialect

use exprdoc_core::{
    InternalTransformError, SchemaValidationError, SerializationError, TransformError,
};
use std::fmt;

/// Errors that can occur while converting between XML and expression trees.
///
/// Document-level problems (a missing operand, an unknown type) arrive as
/// [`XmlTransformError::Transform`] and carry the path of the offending
/// node; text-level problems (malformed markup) carry a line and column.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlTransformError {
    /// The text is not well-formed XML.
    ///
    /// # Example
    ///
    /// ```text
    /// XML parse error at 3:14: expected '>' not '/'
    /// ```
    Parse {
        /// Line (1-based)
        line: u32,
        /// Column (1-based)
        column: u32,
        /// Description of the parsing error
        message: String,
    },

    /// Writing the output document failed.
    Write {
        /// Description of what failed to write
        context: String,
        /// Underlying error message
        message: String,
    },

    /// Input or output bytes are not valid UTF-8.
    Utf8 {
        /// Description of the encoding error
        message: String,
    },

    /// The document is malformed or the engine failed.
    Transform(TransformError),

    /// The document does not conform to its schema.
    Schema(SchemaValidationError),

    /// An XSD document could not be understood.
    InvalidSchema {
        /// Description of the schema problem
        message: String,
    },

    /// Validation was required but no schema applies.
    MissingSchema {
        /// Namespace the document was looked up under
        namespace: String,
    },

    /// File I/O failed.
    Io {
        /// Description of the I/O error
        message: String,
    },
}

impl XmlTransformError {
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

impl fmt::Display for XmlTransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlTransformError::Parse {
                line,
                column,
                message,
            } => write!(f, "XML parse error at {}:{}: {}", line, column, message),
            XmlTransformError::Write { context, message } => {
                write!(f, "Failed to write {}: {}", context, message)
            }
            XmlTransformError::Utf8 { message } => write!(f, "UTF-8 encoding error: {}", message),
            XmlTransformError::Transform(e) => write!(f, "{}", e),
            XmlTransformError::Schema(e) => write!(f, "{}", e),
            XmlTransformError::InvalidSchema { message } => {
                write!(f, "Invalid XML schema: {}", message)
            }
            XmlTransformError::MissingSchema { namespace } => write!(
                f,
                "No schema available to validate the document (namespace '{}')",
                namespace
            ),
            XmlTransformError::Io { message } => write!(f, "I/O error: {}", message),
        }
    }
}

impl std::error::Error for XmlTransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XmlTransformError::Transform(e) => Some(e),
            _ => None,
        }
    }
}

impl From<roxmltree::Error> for XmlTransformError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        XmlTransformError::Parse {
            line: pos.row,
            column: pos.col,
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::Error> for XmlTransformError {
    fn from(err: quick_xml::Error) -> Self {
        XmlTransformError::Write {
            context: "XML event".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<std::str::Utf8Error> for XmlTransformError {
    fn from(err: std::str::Utf8Error) -> Self {
        XmlTransformError::Utf8 {
            message: err.to_string(),
        }
    }
}

impl From<std::string::FromUtf8Error> for XmlTransformError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        XmlTransformError::Utf8 {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for XmlTransformError {
    fn from(err: std::io::Error) -> Self {
        XmlTransformError::Io {
            message: err.to_string(),
        }
    }
}

impl From<TransformError> for XmlTransformError {
    fn from(err: TransformError) -> Self {
        XmlTransformError::Transform(err)
    }
}

impl From<SerializationError> for XmlTransformError {
    fn from(err: SerializationError) -> Self {
        XmlTransformError::Transform(err.into())
    }
}

impl From<SchemaValidationError> for XmlTransformError {
    fn from(err: SchemaValidationError) -> Self {
        XmlTransformError::Schema(err)
    }
}
