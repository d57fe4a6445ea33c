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

//! XML dialect for expression tree documents
//!
//! Reads and writes documents of the form
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <expression xmlns="urn:schemas-vm-com:Linq.Expressions.Serialization">
//!   <lambda type="Func&lt;int, int&gt;">
//!     <parameters><parameter id="P1" type="int" name="x"/></parameters>
//!     <body>...</body>
//!   </lambda>
//! </expression>
//! ```
//!
//! Scalar properties are attributes; wrapped operands, node lists, member
//! fragments and constant payloads are child elements.
//!
//! # Features
//!
//! - **Bidirectional Conversion**: expression tree ↔ XML with shared
//!   parameter and label identity
//! - **XSD Schema Validation**: subset XSD validator with the dialect schema
//!   bundled, applied in both directions
//! - **Schema Caching**: parsed schemas shared per namespace
//! - **Async I/O**: Tokio file and stream helpers behind the `async` feature
//!
//! # Examples
//!
//! ```rust
//! use exprdoc_core::{BinaryOp, Expression, ParameterExpression, Type, deep_eq};
//! use exprdoc_xml::{expression_to_xml, xml_to_expression};
//!
//! let x = ParameterExpression::new(Type::int32(), Some("x"));
//! let body = Expression::binary(BinaryOp::Multiply, x.clone().into(), x.clone().into()).unwrap();
//! let square: Expression = Expression::lambda(None, body, vec![x], false, None).unwrap().into();
//!
//! let xml = expression_to_xml(&square).unwrap();
//! let back = xml_to_expression(&xml).unwrap();
//! assert!(deep_eq(&square, &back));
//! ```

mod element;
mod error;
mod from_xml;
pub mod schema;
pub mod schema_cache;
mod to_xml;

#[cfg(feature = "async")]
pub mod async_api;

pub use element::{XmlElement, XmlSink, XmlValueSource};
pub use error::XmlTransformError;
pub use from_xml::{
    from_xml, from_xml_bytes, from_xml_document, from_xml_file, parse_xml, validate_xml,
    FromXmlConfig, FromXmlConfigBuilder,
};
pub use schema::XsdSchema;
pub use schema_cache::{CacheStatistics, SchemaCache};
pub use to_xml::{to_xml, to_xml_document, to_xml_file, write_xml, ToXmlConfig, ToXmlConfigBuilder};

use exprdoc_core::Expression;

/// Convert an expression tree to XML with default settings
pub fn expression_to_xml(expr: &Expression) -> Result<String, XmlTransformError> {
    to_xml(expr, &ToXmlConfig::default())
}

/// Convert XML to an expression tree with default settings
pub fn xml_to_expression(xml: &str) -> Result<Expression, XmlTransformError> {
    from_xml(xml, &FromXmlConfig::default())
}
