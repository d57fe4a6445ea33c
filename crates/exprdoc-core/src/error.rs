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

//! Error types shared by every transform direction.

use crate::document::DocPath;
use std::fmt;
use thiserror::Error;

/// The kind of input malformation found while reading or writing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationErrorKind {
    /// A required element or property is absent.
    MissingElement,
    /// A node of a different container kind was found (array vs object vs scalar).
    UnexpectedNodeKind,
    /// A scalar could not be converted to the requested type.
    InvalidValue,
    /// The element tag does not name a supported expression node.
    UnknownNodeKind,
    /// A type name could not be resolved.
    UnresolvedType,
    /// A member fragment did not resolve to exactly one member.
    UnresolvedMember,
    /// An operand array has the wrong number of entries.
    OperandCount,
    /// An `idref` points at an id that was never declared.
    UnresolvedReference,
    /// The expression factory rejected the node.
    InvalidExpression,
    /// The document nests deeper than the configured limit.
    DepthLimitExceeded,
    /// The value or node cannot be represented in the document dialect.
    UnsupportedValue,
}

impl fmt::Display for SerializationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement => write!(f, "MissingElement"),
            Self::UnexpectedNodeKind => write!(f, "UnexpectedNodeKind"),
            Self::InvalidValue => write!(f, "InvalidValue"),
            Self::UnknownNodeKind => write!(f, "UnknownNodeKind"),
            Self::UnresolvedType => write!(f, "UnresolvedType"),
            Self::UnresolvedMember => write!(f, "UnresolvedMember"),
            Self::OperandCount => write!(f, "OperandCount"),
            Self::UnresolvedReference => write!(f, "UnresolvedReference"),
            Self::InvalidExpression => write!(f, "InvalidExpression"),
            Self::DepthLimitExceeded => write!(f, "DepthLimitExceeded"),
            Self::UnsupportedValue => write!(f, "UnsupportedValue"),
        }
    }
}

/// Malformed input, always reported together with the document path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at '{path}': {message}")]
pub struct SerializationError {
    /// What went wrong.
    pub kind: SerializationErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Path from the document root to the offending node.
    pub path: DocPath,
}

impl SerializationError {
    /// Create a new error.
    pub fn new(kind: SerializationErrorKind, path: &DocPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: path.clone(),
        }
    }

    pub fn missing_element(path: &DocPath, name: &str) -> Self {
        Self::new(
            SerializationErrorKind::MissingElement,
            path,
            format!("required element '{}' is missing", name),
        )
    }

    pub fn unexpected_node(path: &DocPath, expected: &str, found: &str) -> Self {
        Self::new(
            SerializationErrorKind::UnexpectedNodeKind,
            path,
            format!("expected {}, found {}", expected, found),
        )
    }

    pub fn invalid_value(path: &DocPath, message: impl Into<String>) -> Self {
        Self::new(SerializationErrorKind::InvalidValue, path, message)
    }

    pub fn unknown_node_kind(path: &DocPath, tag: &str) -> Self {
        Self::new(
            SerializationErrorKind::UnknownNodeKind,
            path,
            format!("'{}' is not a supported expression node", tag),
        )
    }

    pub fn unresolved_type(path: &DocPath, name: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            SerializationErrorKind::UnresolvedType,
            path,
            format!("could not resolve type '{}': {}", name, reason),
        )
    }

    pub fn unresolved_member(path: &DocPath, reason: impl fmt::Display) -> Self {
        Self::new(SerializationErrorKind::UnresolvedMember, path, reason.to_string())
    }

    pub fn operand_count(path: &DocPath, tag: &str, expected: usize, found: usize) -> Self {
        Self::new(
            SerializationErrorKind::OperandCount,
            path,
            format!(
                "'{}' requires exactly {} operand(s), found {}",
                tag, expected, found
            ),
        )
    }

    pub fn unresolved_reference(path: &DocPath, id: &str) -> Self {
        Self::new(
            SerializationErrorKind::UnresolvedReference,
            path,
            format!("idref '{}' does not match any declared id", id),
        )
    }

    pub fn invalid_expression(path: &DocPath, err: ExpressionError) -> Self {
        Self::new(SerializationErrorKind::InvalidExpression, path, err.to_string())
    }

    pub fn depth_limit(path: &DocPath, max: usize) -> Self {
        Self::new(
            SerializationErrorKind::DepthLimitExceeded,
            path,
            format!("maximum nesting depth ({}) exceeded", max),
        )
    }

    pub fn unsupported_value(path: &DocPath, message: impl Into<String>) -> Self {
        Self::new(SerializationErrorKind::UnsupportedValue, path, message)
    }
}

/// A violated engine invariant that cannot be blamed on the input document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal transform error: {message}")]
pub struct InternalTransformError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalTransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Rejection raised by the expression factory when a node would be inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// The operator has no meaning for the operand type(s).
    #[error("the {operator} operator is not defined for '{operand_type}'")]
    OperatorNotDefined {
        operator: String,
        operand_type: String,
    },

    /// A type does not line up with what the node requires.
    #[error("{context}: expected '{expected}', found '{found}'")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// Wrong number of arguments for a method, constructor, delegate or indexer.
    #[error("{context}: expected {expected} argument(s), found {found}")]
    ArgumentCount {
        context: String,
        expected: usize,
        found: usize,
    },

    /// The left side of an assignment cannot be written.
    #[error("expression '{0}' cannot be assigned to")]
    NotWritable(String),

    /// A member handle was used in a position it does not fit.
    #[error("invalid member: {0}")]
    InvalidMember(String),

    /// A try expression combined a fault handler with catch or finally blocks.
    #[error("a try expression with a fault block cannot have catch or finally blocks")]
    FaultWithHandlers,

    /// Any other structural rule of the node kind.
    #[error("{0}")]
    InvalidShape(String),
}

/// Failure of a document transform in either direction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The document is malformed.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The engine hit an invariant violation.
    #[error(transparent)]
    Internal(#[from] InternalTransformError),
}

impl TransformError {
    /// The serialization error, if this is one.
    pub fn as_serialization(&self) -> Option<&SerializationError> {
        match self {
            Self::Serialization(e) => Some(e),
            Self::Internal(_) => None,
        }
    }

    /// The internal error, if this is one.
    pub fn as_internal(&self) -> Option<&InternalTransformError> {
        match self {
            Self::Internal(e) => Some(e),
            Self::Serialization(_) => None,
        }
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Line (1-based) when the validator can locate the violation.
    pub line: Option<usize>,
    /// Column (1-based) when the validator can locate the violation.
    pub column: Option<usize>,
    /// Description of the violation.
    pub message: String,
}

impl SchemaViolation {
    pub fn new(line: Option<usize>, column: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(l), Some(c)) => write!(f, "({}, {}): {}", l, c, self.message),
            (Some(l), None) => write!(f, "(line {}): {}", l, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Every violation found by one schema validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    /// Namespace or path of the schema that was applied.
    pub schema: String,
    /// All violations, in document order.
    pub violations: Vec<SchemaViolation>,
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "document does not conform to schema '{}' ({} violation(s))",
            self.schema,
            self.violations.len()
        )?;
        for v in &self.violations {
            write!(f, "\n  {}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_display_includes_path() {
        let path = DocPath::root("expression").child("lambda").child("body");
        let err = SerializationError::missing_element(&path, "operand");
        assert_eq!(
            err.to_string(),
            "MissingElement at 'expression/lambda/body': required element 'operand' is missing"
        );
    }

    #[test]
    fn test_operand_count_message() {
        let path = DocPath::root("add");
        let err = SerializationError::operand_count(&path, "add", 2, 3);
        assert_eq!(err.kind, SerializationErrorKind::OperandCount);
        assert!(err.message.contains("exactly 2"));
        assert!(err.message.contains("found 3"));
    }

    #[test]
    fn test_transform_error_from_internal() {
        let err: TransformError = InternalTransformError::new("boom").into();
        assert!(err.as_internal().is_some());
        assert!(err.as_serialization().is_none());
        assert_eq!(err.to_string(), "internal transform error: boom");
    }

    #[test]
    fn test_schema_error_lists_violations() {
        let err = SchemaValidationError {
            schema: "urn:test".to_string(),
            violations: vec![
                SchemaViolation::new(Some(3), Some(5), "unknown element 'foo'"),
                SchemaViolation::new(None, None, "missing 'expression'"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("2 violation(s)"));
        assert!(text.contains("(3, 5): unknown element 'foo'"));
        assert!(text.contains("missing 'expression'"));
    }

    #[test]
    fn test_expression_error_display() {
        let err = ExpressionError::OperatorNotDefined {
            operator: "add".to_string(),
            operand_type: "bool".to_string(),
        };
        assert_eq!(err.to_string(), "the add operator is not defined for 'bool'");
        assert_eq!(
            ExpressionError::FaultWithHandlers.to_string(),
            "a try expression with a fault block cannot have catch or finally blocks"
        );
    }
}
