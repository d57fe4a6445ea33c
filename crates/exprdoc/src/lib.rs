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

//! # exprdoc - Expression tree documents
//!
//! Serializes expression trees (lambdas, operators, calls, blocks, loops,
//! exception handlers …) to JSON or XML documents and reads them back,
//! validating against the bundled dialect schemas.
//!
//! ## Quick Start
//!
//! ```rust
//! use exprdoc::{from_str, to_string, BinaryOp, Expression, Format, ParameterExpression, Type};
//!
//! let a = ParameterExpression::new(Type::int32(), Some("a"));
//! let b = ParameterExpression::new(Type::int32(), Some("b"));
//! let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
//! let sum: Expression = Expression::lambda(None, body, vec![a, b], false, None).unwrap().into();
//!
//! let xml = to_string(&sum, Format::Xml).unwrap();
//! let back = from_str(&xml, Format::Xml).unwrap();
//! assert_eq!(back.to_string(), "(a, b) => (a + b)");
//! ```
//!
//! ## Modules
//!
//! - [`model`]: expression model, type registry and transform visitors
//! - [`json`]: JSON dialect
//! - [`xml`]: XML dialect
//!
//! Both dialects are always available; the `async` feature adds Tokio file
//! and stream helpers to each.

pub use exprdoc_core::{
    deep_eq, BinaryOp, DeserializeOptions, Expression, LambdaExpression, ParameterExpression,
    SchemaValidationError, SchemaViolation, SerializationError, SerializationErrorKind,
    SerializeOptions, Type, TypeNameConvention, TypeRegistry, UnaryOp, ValidationMode, Value,
    DEFAULT_MAX_DEPTH,
};

mod error;
mod format;

pub use error::{Error, ResultExt};
pub use format::Format;

pub mod model {
    //! Expression model, type registry and transform engine
    pub use exprdoc_core::*;
}

pub mod json {
    //! JSON dialect
    pub use exprdoc_json::*;
}

pub mod xml {
    //! XML dialect
    pub use exprdoc_xml::*;
}

use exprdoc_json::{FromJsonConfig, ToJsonConfig};
use exprdoc_xml::{FromXmlConfig, ToXmlConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Settings shared by both dialects.
///
/// Format-specific knobs (JSON leniency, XML DTD handling, indentation) stay
/// with the per-format configs in [`json`] and [`xml`].
#[derive(Debug, Clone)]
pub struct Options {
    pub registry: Arc<TypeRegistry>,
    pub validation: ValidationMode,
    pub add_comments: bool,
    pub type_names: TypeNameConvention,
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            registry: TypeRegistry::builtin(),
            validation: ValidationMode::default(),
            add_comments: false,
            type_names: TypeNameConvention::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// Defaults with `registry` for type and member lookups.
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            ..Default::default()
        }
    }

    fn to_json(&self) -> ToJsonConfig {
        ToJsonConfig::builder()
            .registry(self.registry.clone())
            .validation(self.validation)
            .add_comments(self.add_comments)
            .type_names(self.type_names)
            .build()
    }

    fn from_json(&self) -> FromJsonConfig {
        FromJsonConfig::builder()
            .registry(self.registry.clone())
            .validation(self.validation)
            .max_depth(self.max_depth)
            .build()
    }

    fn to_xml(&self) -> ToXmlConfig {
        ToXmlConfig::builder()
            .registry(self.registry.clone())
            .validation(self.validation)
            .add_comments(self.add_comments)
            .type_names(self.type_names)
            .build()
    }

    fn from_xml(&self) -> FromXmlConfig {
        FromXmlConfig::builder()
            .registry(self.registry.clone())
            .validation(self.validation)
            .max_depth(self.max_depth)
            .build()
    }
}

/// Serialize `expr` as a `format` document with default options.
pub fn to_string(expr: &Expression, format: Format) -> Result<String, Error> {
    to_string_with(expr, format, &Options::default())
}

/// Serialize `expr` as a `format` document.
pub fn to_string_with(expr: &Expression, format: Format, options: &Options) -> Result<String, Error> {
    Ok(match format {
        Format::Json => exprdoc_json::to_json(expr, &options.to_json())?,
        Format::Xml => exprdoc_xml::to_xml(expr, &options.to_xml())?,
    })
}

/// Read a `format` document with default options.
pub fn from_str(text: &str, format: Format) -> Result<Expression, Error> {
    from_str_with(text, format, &Options::default())
}

/// Read a `format` document.
pub fn from_str_with(text: &str, format: Format, options: &Options) -> Result<Expression, Error> {
    Ok(match format {
        Format::Json => exprdoc_json::from_json(text, &options.from_json())?,
        Format::Xml => exprdoc_xml::from_xml(text, &options.from_xml())?,
    })
}

/// Read a document of either format, telling them apart by the first
/// significant character.
///
/// # Examples
///
/// ```rust
/// let expr = exprdoc::from_str_detect(r#"{"expression": {"default": {"type": "int"}}}"#).unwrap();
/// assert_eq!(expr.kind_name(), "default");
/// ```
pub fn from_str_detect(text: &str) -> Result<Expression, Error> {
    let format = Format::detect(text).ok_or_else(|| Error::UnknownFormat(preview(text)))?;
    from_str(text, format)
}

/// Rewrite a document from one format into the other.
///
/// The document is fully read into an expression tree, so everything the
/// reader checks (schema, references, overloads) applies.
pub fn convert(text: &str, from: Format, to: Format, options: &Options) -> Result<String, Error> {
    let expr = from_str_with(text, from, options)?;
    debug!(from = %from, to = %to, "converting document");
    to_string_with(&expr, to, options)
}

/// Write `expr` to `path`, in the format its extension names.
pub fn to_file(expr: &Expression, path: impl AsRef<Path>, options: &Options) -> Result<(), Error> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Json => exprdoc_json::to_json_file(expr, path, &options.to_json())?,
        Format::Xml => exprdoc_xml::to_xml_file(expr, path, &options.to_xml())?,
    }
    Ok(())
}

/// Read `path`, in the format its extension names.
pub fn from_file(path: impl AsRef<Path>, options: &Options) -> Result<Expression, Error> {
    let path = path.as_ref();
    Ok(match Format::from_path(path)? {
        Format::Json => exprdoc_json::from_json_file(path, &options.from_json())?,
        Format::Xml => exprdoc_xml::from_xml_file(path, &options.from_xml())?,
    })
}

fn preview(text: &str) -> String {
    text.trim_start().chars().take(16).collect()
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn sum() -> Expression {
        let a = ParameterExpression::new(Type::int32(), Some("a"));
        let b = ParameterExpression::new(Type::int32(), Some("b"));
        let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
        Expression::lambda(None, body, vec![a, b], false, None)
            .unwrap()
            .into()
    }

    #[test]
    fn test_both_formats_roundtrip() {
        let expr = sum();
        for format in [Format::Json, Format::Xml] {
            let text = to_string(&expr, format).unwrap();
            let back = from_str(&text, format).unwrap();
            assert!(deep_eq(&expr, &back), "{}", format);
        }
    }

    #[test]
    fn test_convert_json_to_xml() {
        let json = to_string(&sum(), Format::Json).unwrap();
        let xml = convert(&json, Format::Json, Format::Xml, &Options::default()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"<parameter id="P1" type="int" name="a"/>"#));
        assert!(deep_eq(&sum(), &from_str(&xml, Format::Xml).unwrap()));
    }

    #[test]
    fn test_detect() {
        let xml = to_string(&sum(), Format::Xml).unwrap();
        assert!(deep_eq(&sum(), &from_str_detect(&xml).unwrap()));
        assert!(matches!(from_str_detect("  hello"), Err(Error::UnknownFormat(s)) if s == "hello"));
    }

    #[test]
    fn test_wrong_format_fails() {
        let json = to_string(&sum(), Format::Json).unwrap();
        assert!(matches!(from_str(&json, Format::Xml), Err(Error::Xml(_))));
    }

    #[test]
    fn test_options_reach_the_dialects() {
        let options = Options {
            add_comments: true,
            ..Default::default()
        };
        let xml = to_string_with(&sum(), Format::Xml, &options).unwrap();
        assert!(xml.contains("<!-- (a, b) => (a + b) -->"));
        let json = to_string_with(&sum(), Format::Json, &options).unwrap();
        assert!(json.contains("\"$comment\": \"(a, b) => (a + b)\""));
    }
}
