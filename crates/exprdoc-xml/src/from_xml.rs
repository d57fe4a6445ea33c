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

//! XML to expression tree conversion

use crate::element::XmlElement;
use crate::error::XmlTransformError;
use crate::schema::XsdSchema;
use crate::schema_cache::SchemaCache;
use exprdoc_core::{
    deserialize, DeserializeOptions, Expression, TypeRegistry, ValidationMode, DEFAULT_MAX_DEPTH,
};
use roxmltree::{Document, ParsingOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration for reading XML documents
///
/// # Examples
///
/// ```
/// use exprdoc_xml::FromXmlConfig;
/// use exprdoc_core::ValidationMode;
///
/// let config = FromXmlConfig::builder()
///     .validation(ValidationMode::Always)
///     .max_depth(200)
///     .build();
/// assert!(!config.allow_dtd);
/// ```
#[derive(Debug, Clone)]
pub struct FromXmlConfig {
    /// Types and members that fragments may name
    pub registry: Arc<TypeRegistry>,
    /// When to validate the document before reading it
    pub validation: ValidationMode,
    /// Schema used instead of the one the root namespace names
    pub schema: Option<Arc<XsdSchema>>,
    /// Maximum node nesting depth
    pub max_depth: usize,
    /// Accept a document type declaration
    pub allow_dtd: bool,
    /// Maximum number of XML nodes parsed
    pub nodes_limit: u32,
}

impl Default for FromXmlConfig {
    fn default() -> Self {
        Self {
            registry: TypeRegistry::builtin(),
            validation: ValidationMode::default(),
            schema: None,
            max_depth: DEFAULT_MAX_DEPTH,
            allow_dtd: false,
            nodes_limit: u32::MAX,
        }
    }
}

impl FromXmlConfig {
    /// Create a new builder
    pub fn builder() -> FromXmlConfigBuilder {
        FromXmlConfigBuilder::default()
    }

    fn options(&self) -> DeserializeOptions {
        DeserializeOptions {
            max_depth: self.max_depth,
        }
    }

    fn parsing_options(&self) -> ParsingOptions {
        ParsingOptions {
            allow_dtd: self.allow_dtd,
            nodes_limit: self.nodes_limit,
        }
    }
}

/// Builder for [`FromXmlConfig`]
#[derive(Debug, Clone, Default)]
pub struct FromXmlConfigBuilder {
    config: FromXmlConfig,
}

impl FromXmlConfigBuilder {
    /// Resolve types and members against `registry`
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.config.registry = registry;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    /// Validate against `schema` regardless of the root namespace
    pub fn schema(mut self, schema: Arc<XsdSchema>) -> Self {
        self.config.schema = Some(schema);
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.config.max_depth = limit;
        self
    }

    pub fn allow_dtd(mut self, allow: bool) -> Self {
        self.config.allow_dtd = allow;
        self
    }

    pub fn nodes_limit(mut self, limit: u32) -> Self {
        self.config.nodes_limit = limit;
        self
    }

    /// Build the configuration
    pub fn build(self) -> FromXmlConfig {
        self.config
    }
}

/// Parse XML text with the configured limits.
pub fn parse_xml<'input>(
    xml: &'input str,
    config: &FromXmlConfig,
) -> Result<Document<'input>, XmlTransformError> {
    Ok(Document::parse_with_options(xml, config.parsing_options())?)
}

/// Validate `document` as `config` requires.
///
/// The schema is looked up by the namespace of the root element.
pub fn validate_xml(document: &Document<'_>, config: &FromXmlConfig) -> Result<(), XmlTransformError> {
    let namespace = document.root_element().tag_name().namespace();
    let schema = SchemaCache::global().select(config.validation, config.schema.as_ref(), namespace)?;
    if let Some(schema) = schema {
        debug!(schema = schema.id(), "validating XML document");
        schema.validate_document(document)?;
    }
    Ok(())
}

/// Convert XML text to an expression tree
///
/// # Examples
///
/// ```
/// use exprdoc_xml::{from_xml, FromXmlConfig};
///
/// let xml = r#"<?xml version="1.0" encoding="utf-8"?>
/// <expression xmlns="urn:schemas-vm-com:Linq.Expressions.Serialization">
///   <constant type="int"><value>42</value></constant>
/// </expression>"#;
/// let expr = from_xml(xml, &FromXmlConfig::default()).unwrap();
/// assert_eq!(expr.to_string(), "42");
/// ```
pub fn from_xml(xml: &str, config: &FromXmlConfig) -> Result<Expression, XmlTransformError> {
    let document = parse_xml(xml, config)?;
    from_xml_document(&document, config)
}

/// Convert a parsed XML document to an expression tree
pub fn from_xml_document(
    document: &Document<'_>,
    config: &FromXmlConfig,
) -> Result<Expression, XmlTransformError> {
    validate_xml(document, config)?;
    let root = XmlElement::root(document)?;
    Ok(deserialize(&root, &config.registry, &config.options())?)
}

/// Convert UTF-8 bytes, with or without a byte order mark.
pub fn from_xml_bytes(bytes: &[u8], config: &FromXmlConfig) -> Result<Expression, XmlTransformError> {
    let text = std::str::from_utf8(bytes)?;
    from_xml(text.strip_prefix('\u{feff}').unwrap_or(text), config)
}

/// Read an XML document from a file
pub fn from_xml_file(
    path: impl AsRef<Path>,
    config: &FromXmlConfig,
) -> Result<Expression, XmlTransformError> {
    let bytes = std::fs::read(path)?;
    from_xml_bytes(&bytes, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::vocabulary as vocab;
    use exprdoc_core::{SerializationErrorKind, Type};

    fn document(body: &str) -> String {
        format!(r#"<expression xmlns="{}">{}</expression>"#, vocab::XML_NAMESPACE, body)
    }

    #[test]
    fn test_comments_and_whitespace_are_ignored() {
        let xml = document(
            r#"
            <!-- default(int) -->
            <default type="int">
                <!-- no children -->
            </default>
            "#,
        );
        let expr = from_xml(&xml, &FromXmlConfig::default()).unwrap();
        assert_eq!(expr.kind_name(), "default");
        assert_eq!(expr.ty(), &Type::int32());
    }

    #[test]
    fn test_schema_gate_reports_violations() {
        let xml = document("<mystery/>");
        let err = from_xml(&xml, &FromXmlConfig::default()).unwrap_err();
        let schema = err.as_schema().expect("schema error");
        assert_eq!(schema.schema, vocab::XML_NAMESPACE);
        assert_eq!(schema.violations[0].line, Some(1));

        let config = FromXmlConfig::builder().validation(ValidationMode::Never).build();
        let err = from_xml(&xml, &config).unwrap_err();
        assert_eq!(err.as_serialization().unwrap().kind, SerializationErrorKind::UnknownNodeKind);
    }

    #[test]
    fn test_document_without_namespace() {
        let xml = r#"<expression><default type="int"/></expression>"#;
        assert!(from_xml(xml, &FromXmlConfig::default()).is_ok());
        let config = FromXmlConfig::builder().validation(ValidationMode::Always).build();
        assert!(matches!(
            from_xml(xml, &config),
            Err(XmlTransformError::MissingSchema { .. })
        ));
    }

    #[test]
    fn test_malformed_xml_has_position() {
        let err = from_xml("<expression>\n  <default type=\"int\">\n</expression>", &FromXmlConfig::default())
            .unwrap_err();
        match err {
            XmlTransformError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_dtd_rejected_by_default() {
        let xml = r#"<!DOCTYPE expression [<!ENTITY t "int">]><expression><default type="&t;"/></expression>"#;
        assert!(matches!(
            from_xml(xml, &FromXmlConfig::default()),
            Err(XmlTransformError::Parse { .. })
        ));
        let config = FromXmlConfig::builder().allow_dtd(true).build();
        assert_eq!(from_xml(xml, &config).unwrap().ty(), &Type::int32());
    }

    #[test]
    fn test_depth_limit() {
        let mut xml = String::from(r#"<constant type="bool"><value>true</value></constant>"#);
        for _ in 0..10 {
            xml = format!(r#"<not type="bool"><operand>{}</operand></not>"#, xml);
        }
        let xml = document(&xml);
        let config = FromXmlConfig::builder().max_depth(5).build();
        let err = from_xml(&xml, &config).unwrap_err();
        assert_eq!(err.as_serialization().unwrap().kind, SerializationErrorKind::DepthLimitExceeded);
        assert!(from_xml(&xml, &FromXmlConfig::default()).is_ok());
    }

    #[test]
    fn test_bytes_with_bom() {
        let mut bytes = "\u{feff}".as_bytes().to_vec();
        bytes.extend_from_slice(document(r#"<default type="string"/>"#).as_bytes());
        let expr = from_xml_bytes(&bytes, &FromXmlConfig::default()).unwrap();
        assert_eq!(expr.ty(), &Type::string());
        assert!(matches!(
            from_xml_bytes(&[0xff, 0xfe, 0x00], &FromXmlConfig::default()),
            Err(XmlTransformError::Utf8 { .. })
        ));
    }
}
