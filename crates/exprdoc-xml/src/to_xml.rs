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

//! Expression tree to XML conversion

use crate::element::XmlSink;
use crate::error::XmlTransformError;
use crate::schema::XsdSchema;
use crate::schema_cache::SchemaCache;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::{
    serialize, with_stack, Expression, SerializeOptions, TypeNameConvention, TypeRegistry,
    ValidationMode,
};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration for XML output
#[derive(Debug, Clone)]
pub struct ToXmlConfig {
    /// Types whose members the tree references
    pub registry: Arc<TypeRegistry>,
    /// Add an XML comment rendering every node
    pub add_comments: bool,
    /// Indent the output
    pub pretty: bool,
    /// Spaces per indentation level when pretty printing
    pub indent: usize,
    /// Type name spelling
    pub type_names: TypeNameConvention,
    /// When to validate the produced document
    pub validation: ValidationMode,
    /// Schema used instead of the dialect schema
    pub schema: Option<Arc<XsdSchema>>,
}

impl Default for ToXmlConfig {
    fn default() -> Self {
        Self {
            registry: TypeRegistry::builtin(),
            add_comments: false,
            pretty: true,
            indent: 2,
            type_names: TypeNameConvention::default(),
            validation: ValidationMode::default(),
            schema: None,
        }
    }
}

impl ToXmlConfig {
    /// Create a new builder
    pub fn builder() -> ToXmlConfigBuilder {
        ToXmlConfigBuilder::default()
    }

    fn options(&self) -> SerializeOptions {
        SerializeOptions {
            add_comments: self.add_comments,
            type_names: self.type_names,
        }
    }
}

/// Builder for [`ToXmlConfig`]
#[derive(Debug, Clone, Default)]
pub struct ToXmlConfigBuilder {
    config: ToXmlConfig,
}

impl ToXmlConfigBuilder {
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.config.registry = registry;
        self
    }

    pub fn add_comments(mut self, add: bool) -> Self {
        self.config.add_comments = add;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    /// Pretty print with `spaces` per level
    pub fn indent(mut self, spaces: usize) -> Self {
        self.config.pretty = true;
        self.config.indent = spaces;
        self
    }

    pub fn type_names(mut self, convention: TypeNameConvention) -> Self {
        self.config.type_names = convention;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    pub fn schema(mut self, schema: Arc<XsdSchema>) -> Self {
        self.config.schema = Some(schema);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ToXmlConfig {
        self.config
    }
}

/// Escape attribute text so that whitespace survives attribute normalization.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;"),
    )
}

/// Escape character data; a literal CR would be folded into LF on reading.
fn escape_text(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains('\r') {
        return escaped;
    }
    Cow::Owned(escaped.replace('\r', "&#13;"))
}

/// Comments may not contain `--` or end in `-`.
fn comment_text(text: &str) -> String {
    let mut safe = text.replace("--", "- -");
    while safe.contains("--") {
        safe = safe.replace("--", "- -");
    }
    if safe.ends_with('-') {
        safe.push(' ');
    }
    format!(" {} ", safe)
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlSink,
) -> Result<(), XmlTransformError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        let value = escape_attribute(value);
        start.push_attribute((name.as_bytes(), value.as_bytes()));
    }
    let text = element.text.as_deref().filter(|t| !t.is_empty());
    if element.children.is_empty() && element.comment.is_none() && text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    if let Some(comment) = &element.comment {
        writer.write_event(Event::Comment(BytesText::from_escaped(comment_text(comment))))?;
    }
    if let Some(text) = text {
        writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?;
    }
    for child in &element.children {
        with_stack(|| write_element(writer, child))?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Render a document tree the way `config` asks for.
pub fn write_xml(document: &XmlSink, config: &ToXmlConfig) -> Result<String, XmlTransformError> {
    let mut writer = if config.pretty {
        Writer::new_with_indent(Vec::new(), b' ', config.indent)
    } else {
        Writer::new(Vec::new())
    };
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, document)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Build the document tree for `expr`, without validation.
pub fn to_xml_document(expr: &Expression, config: &ToXmlConfig) -> Result<XmlSink, XmlTransformError> {
    let root: XmlSink = serialize(expr, &config.registry, &config.options())?;
    Ok(root.into_document())
}

/// Convert an expression tree to XML text
///
/// # Examples
///
/// ```
/// use exprdoc_core::{Expression, Value};
/// use exprdoc_xml::{to_xml, ToXmlConfig};
///
/// let expr = Expression::constant_of(Value::Int32(7)).unwrap();
/// let xml = to_xml(&expr, &ToXmlConfig::builder().pretty(false).build()).unwrap();
/// assert!(xml.contains(r#"<constant type="int"><value>7</value></constant>"#));
/// ```
pub fn to_xml(expr: &Expression, config: &ToXmlConfig) -> Result<String, XmlTransformError> {
    let document = to_xml_document(expr, config)?;
    let xml = write_xml(&document, config)?;
    let schema = SchemaCache::global().select(
        config.validation,
        config.schema.as_ref(),
        Some(vocab::XML_NAMESPACE),
    )?;
    if let Some(schema) = schema {
        debug!(schema = schema.id(), "validating XML output");
        schema.validate(&xml)?;
    }
    Ok(xml)
}

/// Write an expression tree to an XML file
pub fn to_xml_file(
    expr: &Expression,
    path: impl AsRef<Path>,
    config: &ToXmlConfig,
) -> Result<(), XmlTransformError> {
    let xml = to_xml(expr, config)?;
    std::fs::write(path, xml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::{BinaryOp, ParameterExpression, Type, Value};

    fn sum() -> Expression {
        let a = ParameterExpression::new(Type::int32(), Some("a"));
        let b = ParameterExpression::new(Type::int32(), Some("b"));
        let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
        Expression::lambda(None, body, vec![a, b], false, None).unwrap().into()
    }

    fn compact() -> ToXmlConfig {
        ToXmlConfig::builder().pretty(false).build()
    }

    #[test]
    fn test_envelope_and_ids() {
        let xml = to_xml(&sum(), &compact()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(&format!(r#"<expression xmlns="{}">"#, vocab::XML_NAMESPACE)));
        assert!(xml.contains(r#"<lambda type="Func&lt;int, int, int&gt;">"#));
        assert!(xml.contains(r#"<parameter id="P1" type="int" name="a"/>"#));
        assert!(xml.contains(r#"<operands><parameter idref="P1"/><parameter idref="P2"/></operands>"#));
    }

    #[test]
    fn test_comments() {
        let config = ToXmlConfig::builder().pretty(false).add_comments(true).build();
        let xml = to_xml(&sum(), &config).unwrap();
        assert!(xml.contains(r#"<lambda type="Func&lt;int, int, int&gt;"><!-- (a, b) => (a + b) -->"#));
    }

    #[test]
    fn test_comment_text_is_made_safe() {
        assert_eq!(comment_text("x--y"), " x- -y ");
        assert_eq!(comment_text("a---"), " a- - - ");
        assert!(!comment_text("----").contains("--"));
    }

    #[test]
    fn test_attribute_whitespace_is_escaped() {
        assert_eq!(escape_attribute("a\tb\nc"), "a&#9;b&#10;c");
        assert_eq!(escape_attribute("<\"&>"), "&lt;&quot;&amp;&gt;");
        assert_eq!(escape_text("a\r\nb"), "a&#13;\nb");
    }

    #[test]
    fn test_null_constant_is_nil() {
        let expr = Expression::constant(Value::Null, Type::string()).unwrap();
        let xml = to_xml(&expr, &compact()).unwrap();
        assert!(xml.contains(r#"<constant type="string"><value nil="true"/></constant>"#));
    }

    #[test]
    fn test_empty_string_constant() {
        let expr = Expression::constant_of(Value::String(String::new())).unwrap();
        let xml = to_xml(&expr, &ToXmlConfig::default()).unwrap();
        assert!(xml.contains("<value/>"));
    }

    #[test]
    fn test_indentation() {
        let expr = Expression::constant_of(Value::Bool(true)).unwrap();
        let four = to_xml(&expr, &ToXmlConfig::builder().indent(4).build()).unwrap();
        assert!(four.contains("\n    <constant type=\"bool\">"));
        let compact = to_xml(&expr, &compact()).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_full_type_names() {
        let config = ToXmlConfig::builder()
            .pretty(false)
            .type_names(TypeNameConvention::Full)
            .build();
        let xml = to_xml(&Expression::constant_of(Value::Int64(3)).unwrap(), &config).unwrap();
        assert!(xml.contains(r#"<constant type="System.Int64">"#));
    }

    #[test]
    fn test_reused_visitor_restarts_ids() {
        use exprdoc_core::ToDocVisitor;

        let registry = TypeRegistry::builtin();
        let mut visitor = ToDocVisitor::<XmlSink>::new(&registry, SerializeOptions::default());
        let expr = sum();
        let first = visitor.serialize(&expr).unwrap().into_document();
        let second = visitor.serialize(&expr).unwrap().into_document();
        let first = write_xml(&first, &compact()).unwrap();
        let second = write_xml(&second, &compact()).unwrap();
        assert_eq!(first, second);
        assert!(second.contains(r#"<parameter id="P1" type="int" name="a"/>"#));
        assert_eq!(visitor.symbol_counts(), (2, 0));
    }

    #[test]
    fn test_parameterless_lambda_writes_empty_list() {
        let body = Expression::constant_of(Value::Int32(1)).unwrap();
        let expr: Expression = Expression::lambda(None, body, vec![], false, None).unwrap().into();
        let xml = to_xml(&expr, &compact()).unwrap();
        assert!(xml.contains(r#"<parameters/><body>"#), "{}", xml);
    }
}
