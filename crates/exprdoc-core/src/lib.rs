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

//! Core model and transform engine for expression tree documents.
//!
//! This crate holds everything that does not depend on a concrete document
//! format:
//!
//! - the typed, immutable [`Expression`] tree and its validating factory;
//! - the closed [`TypeRegistry`] used to resolve type names and member
//!   fragments by exact signature;
//! - collection reconstruction strategies ([`collections`]);
//! - the [`DocElement`] / [`ElementSink`] traits that the JSON and XML crates
//!   implement, and the generic visitors in [`transform`] that walk them.
//!
//! # Example
//!
//! ```
//! use exprdoc_core::{BinaryOp, Expression, ParameterExpression, Type};
//!
//! let a = ParameterExpression::new(Type::int32(), Some("a"));
//! let b = ParameterExpression::new(Type::int32(), Some("b"));
//! let sum = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
//! let lambda = Expression::lambda(None, sum, vec![a, b], false, None).unwrap();
//! assert_eq!(lambda.to_string(), "(a, b) => (a + b)");
//! ```

pub mod collections;
pub mod config;
pub mod document;
mod error;
pub mod expression;
mod registry;
pub mod transform;
pub mod types;
mod value;
pub mod vocabulary;

pub use config::{
    DeserializeOptions, SerializeOptions, TypeNameConvention, ValidationMode, DEFAULT_MAX_DEPTH,
};
pub use document::{DocElement, DocPath, DocValue, ElementSink, PathSegment, Scalar, ValueSource};
pub use error::{
    ExpressionError, InternalTransformError, SchemaValidationError, SchemaViolation,
    SerializationError, SerializationErrorKind, TransformError,
};
pub use expression::{
    deep_eq, BinaryOp, CatchBlock, Expression, ExpressionVisitor, GotoKind, LabelTarget,
    LambdaExpression, ParameterExpression, SwitchCase, TypeBinaryOp, UnaryOp,
};
pub use registry::{ResolveError, TypeBuilder, TypeMembers, TypeRegistry};
pub use transform::{deserialize, serialize, with_stack, FromDocVisitor, ToDocVisitor};
pub use types::{
    BasicType, CollectionKind, DelegateKind, MemberInfo, MemberKind, MemberQuery, ParameterSpec,
    Type, TypeDefinition, TypeKind, Visibility,
};
pub use value::Value;
