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

//! JSON dialect for expression tree documents
//!
//! Reads and writes documents of the form
//!
//! ```json
//! {
//!   "$schema": "urn:schemas-vm-com:Linq.Expressions.Serialization.Json",
//!   "expression": {
//!     "lambda": {
//!       "type": "Func<int, int>",
//!       "parameters": [{ "parameter": { "id": "P1", "type": "int", "name": "x" } }],
//!       "body": { ... }
//!     }
//!   }
//! }
//! ```
//!
//! # Features
//!
//! - **Bidirectional Conversion**: expression tree ↔ JSON with shared
//!   parameter and label identity
//! - **Lenient Input**: comments and trailing commas, on by default
//! - **Schema Gate**: subset JSON Schema validation in both directions, with
//!   the dialect schema bundled
//! - **Async I/O**: Tokio file and stream helpers behind the `async` feature
//!
//! # Examples
//!
//! ```rust
//! use exprdoc_core::{BinaryOp, Expression, ParameterExpression, Type, deep_eq};
//! use exprdoc_json::{expression_to_json, json_to_expression};
//!
//! let x = ParameterExpression::new(Type::int32(), Some("x"));
//! let body = Expression::binary(BinaryOp::Multiply, x.clone().into(), x.clone().into()).unwrap();
//! let square: Expression = Expression::lambda(None, body, vec![x], false, None).unwrap().into();
//!
//! let json = expression_to_json(&square).unwrap();
//! let back = json_to_expression(&json).unwrap();
//! assert!(deep_eq(&square, &back));
//! ```

mod element;
mod error;
mod from_json;
pub mod lenient;
pub mod schema;
pub mod schema_cache;
mod to_json;

#[cfg(feature = "async")]
pub mod async_api;

pub use element::{JsonElement, JsonSink, JsonValueSource};
pub use error::JsonTransformError;
pub use from_json::{
    from_json, from_json_file, from_json_value, parse_json, validate_json, FromJsonConfig,
    FromJsonConfigBuilder,
};
pub use schema::JsonSchema;
pub use schema_cache::{CacheStatistics, SchemaCache};
pub use to_json::{to_json, to_json_file, to_json_value, write_json, ToJsonConfig, ToJsonConfigBuilder};

use exprdoc_core::Expression;

/// Convert an expression tree to JSON with default settings
pub fn expression_to_json(expr: &Expression) -> Result<String, JsonTransformError> {
    to_json(expr, &ToJsonConfig::default())
}

/// Convert JSON to an expression tree with default settings
pub fn json_to_expression(json: &str) -> Result<Expression, JsonTransformError> {
    from_json(json, &FromJsonConfig::default())
}
