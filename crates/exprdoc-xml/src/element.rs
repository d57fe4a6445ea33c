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

//! `roxmltree` views and an owned element tree for the document traits.
//!
//! A node is an element named by its tag. Scalar properties are attributes;
//! wrapped children, node arrays, fragments and constant payloads are child
//! elements. Whitespace between elements is ignored everywhere, but the text
//! of a scalar payload is kept verbatim.

use exprdoc_core::document::FromScalar;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::{
    DocElement, DocPath, DocValue, ElementSink, Scalar, SerializationError, ValueSource,
};
use roxmltree::Node;

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn has_text(node: Node<'_, '_>) -> bool {
    node.children()
        .any(|child| child.is_text() && child.text().map_or(false, |t| !t.trim().is_empty()))
}

fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|child| child.text())
        .collect()
}

/// The single child element named `name`.
fn child_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
    path: &DocPath,
) -> Result<Option<Node<'a, 'input>>, SerializationError> {
    let mut matches = element_children(node).filter(|child| child.tag_name().name() == name);
    match (matches.next(), matches.next()) {
        (None, _) => Ok(None),
        (Some(child), None) => Ok(Some(child)),
        (Some(_), Some(_)) => Err(SerializationError::invalid_value(
            &path.child(name),
            format!("element '{}' appears more than once", name),
        )),
    }
}

fn no_text(node: Node<'_, '_>, path: &DocPath, expected: &str) -> Result<(), SerializationError> {
    if has_text(node) {
        return Err(SerializationError::unexpected_node(path, expected, "text"));
    }
    Ok(())
}

/// Constant payload inside an XML document.
#[derive(Debug, Clone)]
pub struct XmlValueSource<'a, 'input> {
    node: Node<'a, 'input>,
    path: DocPath,
}

impl<'a, 'input> ValueSource for XmlValueSource<'a, 'input> {
    fn path(&self) -> &DocPath {
        &self.path
    }

    fn is_null(&self) -> bool {
        self.node
            .attribute(vocab::NIL)
            .and_then(|v| bool::from_scalar(&Scalar::from(v)))
            .unwrap_or(false)
    }

    fn scalar(&self) -> Result<Scalar, SerializationError> {
        if element_children(self.node).next().is_some() {
            return Err(SerializationError::invalid_value(
                &self.path,
                "expected a scalar value, found element content",
            ));
        }
        Ok(Scalar::Str(text_of(self.node)))
    }

    fn items(&self) -> Result<Vec<Self>, SerializationError> {
        no_text(self.node, &self.path, "a sequence of item elements")?;
        element_children(self.node)
            .enumerate()
            .map(|(i, child)| {
                let path = self.path.index(i);
                if child.tag_name().name() != vocab::ITEM {
                    return Err(SerializationError::unexpected_node(
                        &path,
                        vocab::ITEM,
                        child.tag_name().name(),
                    ));
                }
                Ok(XmlValueSource { node: child, path })
            })
            .collect()
    }

    fn field(&self, name: &str) -> Result<Option<Self>, SerializationError> {
        no_text(self.node, &self.path, "a map of named elements")?;
        Ok(child_named(self.node, name, &self.path)?.map(|node| XmlValueSource {
            node,
            path: self.path.child(name),
        }))
    }
}

/// A node or fragment of a parsed XML document.
#[derive(Debug, Clone)]
pub struct XmlElement<'a, 'input> {
    node: Node<'a, 'input>,
    tag: &'input str,
    path: DocPath,
}

impl<'a, 'input> XmlElement<'a, 'input> {
    /// The root node inside `<expression xmlns="...">`.
    ///
    /// A document without a namespace is accepted; any other namespace is not.
    pub fn root(document: &'a roxmltree::Document<'input>) -> Result<Self, SerializationError> {
        let envelope = document.root_element();
        let name = envelope.tag_name();
        if name.name() != vocab::EXPRESSION {
            return Err(SerializationError::unexpected_node(
                &DocPath::new(),
                vocab::EXPRESSION,
                name.name(),
            ));
        }
        if let Some(ns) = name.namespace() {
            if ns != vocab::XML_NAMESPACE {
                return Err(SerializationError::unexpected_node(
                    &DocPath::new(),
                    vocab::XML_NAMESPACE,
                    ns,
                ));
            }
        }
        if element_children(envelope).next().is_none() {
            return Err(SerializationError::missing_element(&DocPath::new(), vocab::EXPRESSION));
        }
        Self::wrapped(envelope, DocPath::root(vocab::EXPRESSION), vocab::EXPRESSION)
    }

    /// The one node element inside `wrapper`, found at `path`.
    fn wrapped(
        wrapper: Node<'a, 'input>,
        path: DocPath,
        parent_tag: &str,
    ) -> Result<Self, SerializationError> {
        no_text(wrapper, &path, "a node element")?;
        let mut nodes = element_children(wrapper);
        match (nodes.next(), nodes.next()) {
            (Some(node), None) => Ok(Self::at(node, &path)),
            _ => Err(SerializationError::operand_count(
                &path,
                parent_tag,
                1,
                element_children(wrapper).count(),
            )),
        }
    }

    /// Node element `node` below the wrapper or array slot at `base`.
    fn at(node: Node<'a, 'input>, base: &DocPath) -> Self {
        let tag = node.tag_name().name();
        XmlElement {
            node,
            tag,
            path: base.child(tag),
        }
    }

    fn container(&self, name: &str) -> Result<Option<Node<'a, 'input>>, SerializationError> {
        child_named(self.node, name, &self.path)
    }
}

impl<'a, 'input> DocElement for XmlElement<'a, 'input> {
    type Value = XmlValueSource<'a, 'input>;

    fn tag(&self) -> &str {
        self.tag
    }

    fn path(&self) -> &DocPath {
        &self.path
    }

    fn element(&self, name: &str) -> Result<Option<Self>, SerializationError> {
        match self.container(name)? {
            None => Ok(None),
            Some(wrapper) => Self::wrapped(wrapper, self.path.child(name), self.tag).map(Some),
        }
    }

    fn elements(&self, name: &str) -> Result<Option<Vec<Self>>, SerializationError> {
        let Some(list) = self.container(name)? else {
            return Ok(None);
        };
        let base = self.path.child(name);
        no_text(list, &base, "a list of node elements")?;
        Ok(Some(
            element_children(list)
                .enumerate()
                .map(|(i, node)| Self::at(node, &base.index(i)))
                .collect(),
        ))
    }

    fn object(&self, name: &str) -> Result<Option<Self>, SerializationError> {
        Ok(self.container(name)?.map(|node| XmlElement {
            node,
            tag: node.tag_name().name(),
            path: self.path.child(name),
        }))
    }

    fn objects(&self, name: &str) -> Result<Option<Vec<Self>>, SerializationError> {
        let Some(list) = self.container(name)? else {
            return Ok(None);
        };
        let base = self.path.child(name);
        no_text(list, &base, "a list of elements")?;
        Ok(Some(
            element_children(list)
                .enumerate()
                .map(|(i, node)| XmlElement {
                    node,
                    tag: node.tag_name().name(),
                    path: base.index(i),
                })
                .collect(),
        ))
    }

    fn scalar(&self, name: &str) -> Result<Option<Scalar>, SerializationError> {
        Ok(self.node.attribute(name).map(Scalar::from))
    }

    fn value(&self, name: &str) -> Result<Option<Self::Value>, SerializationError> {
        Ok(self.container(name)?.map(|node| XmlValueSource {
            node,
            path: self.path.child(name),
        }))
    }
}

/// Owned element built while serializing; written out by the XML writer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlSink {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) comment: Option<String>,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<XmlSink>,
}

impl XmlSink {
    fn named(name: &str) -> Self {
        XmlSink {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn with_children(name: &str, children: Vec<XmlSink>) -> Self {
        XmlSink {
            name: name.to_string(),
            children,
            ..Default::default()
        }
    }

    fn from_doc_value(name: &str, value: DocValue) -> Self {
        let mut element = XmlSink::named(name);
        match value {
            DocValue::Null | DocValue::Scalar(Scalar::Null) => {
                element.attributes.push((vocab::NIL.to_string(), "true".to_string()));
            }
            DocValue::Scalar(s) => element.text = Some(s.to_text()),
            DocValue::Seq(items) => {
                element.children = items
                    .into_iter()
                    .map(|item| XmlSink::from_doc_value(vocab::ITEM, item))
                    .collect();
            }
            DocValue::Map(entries) => {
                element.children = entries
                    .into_iter()
                    .map(|(key, item)| XmlSink::from_doc_value(&key, item))
                    .collect();
            }
        }
        element
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlSink> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children(&self) -> &[XmlSink] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Wrap a root node in the dialect envelope.
    pub fn into_document(self) -> XmlSink {
        XmlSink {
            name: vocab::EXPRESSION.to_string(),
            attributes: vec![("xmlns".to_string(), vocab::XML_NAMESPACE.to_string())],
            children: vec![self],
            ..Default::default()
        }
    }
}

impl ElementSink for XmlSink {
    fn node(tag: &str) -> Self {
        XmlSink::named(tag)
    }

    fn fragment(name: &str) -> Self {
        XmlSink::named(name)
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) {
        if value != Scalar::Null {
            self.attributes.push((name.to_string(), value.to_text()));
        }
    }

    fn set_element(&mut self, name: &str, node: Self) {
        self.children.push(XmlSink::with_children(name, vec![node]));
    }

    fn set_elements(&mut self, name: &str, nodes: Vec<Self>) {
        self.children.push(XmlSink::with_children(name, nodes));
    }

    fn set_object(&mut self, name: &str, mut fragment: Self) {
        fragment.name = name.to_string();
        self.children.push(fragment);
    }

    fn set_objects(&mut self, name: &str, fragments: Vec<Self>) {
        self.children.push(XmlSink::with_children(name, fragments));
    }

    fn set_value(&mut self, name: &str, value: DocValue) {
        self.children.push(XmlSink::from_doc_value(name, value));
    }

    fn set_comment(&mut self, text: &str) {
        self.comment = Some(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::SerializationErrorKind;

    fn parse(xml: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(xml).unwrap()
    }

    #[test]
    fn test_root_element_path() {
        let doc = parse(r#"<expression xmlns="urn:schemas-vm-com:Linq.Expressions.Serialization"><default type="int"/></expression>"#);
        let root = XmlElement::root(&doc).unwrap();
        assert_eq!(root.tag(), "default");
        assert_eq!(root.path().to_string(), "expression/default");
        assert_eq!(root.scalar("type").unwrap(), Some(Scalar::from("int")));
    }

    #[test]
    fn test_foreign_namespace_is_rejected() {
        let doc = parse(r#"<expression xmlns="urn:other"><default type="int"/></expression>"#);
        let err = XmlElement::root(&doc).unwrap_err();
        assert_eq!(err.kind, SerializationErrorKind::UnexpectedNodeKind);
    }

    #[test]
    fn test_empty_wrapper_is_operand_count() {
        let doc = parse(r#"<expression><not type="bool"><operand>
        </operand></not></expression>"#);
        let root = XmlElement::root(&doc).unwrap();
        let err = root.element("operand").unwrap_err();
        assert_eq!(err.kind, SerializationErrorKind::OperandCount);
        assert_eq!(err.path.to_string(), "expression/not/operand");
    }

    #[test]
    fn test_array_item_paths() {
        let doc = parse(
            r#"<expression><add><operands>
                <constant type="int"><value>1</value></constant>
                <!-- second -->
                <default type="int"/>
            </operands></add></expression>"#,
        );
        let root = XmlElement::root(&doc).unwrap();
        let items = root.get_elements("operands").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].path().to_string(), "expression/add/operands[1]/default");
    }

    #[test]
    fn test_text_in_wrapper_is_rejected() {
        let doc = parse(r#"<expression><not type="bool"><operand>oops</operand></not></expression>"#);
        let root = XmlElement::root(&doc).unwrap();
        let err = root.element("operand").unwrap_err();
        assert_eq!(err.kind, SerializationErrorKind::UnexpectedNodeKind);
    }

    #[test]
    fn test_value_text_is_verbatim() {
        let doc = parse("<expression><constant type=\"string\"><value>  two\nlines </value></constant></expression>");
        let root = XmlElement::root(&doc).unwrap();
        let value = root.get_value("value").unwrap();
        assert_eq!(value.scalar().unwrap(), Scalar::from("  two\nlines "));
        assert!(!value.is_null());
    }

    #[test]
    fn test_value_sequences_and_maps() {
        let doc = parse(
            r#"<expression><constant type="List&lt;int&gt;"><value>
                <length>2</length>
                <items><item>1</item><item nil="true"/></items>
            </value></constant></expression>"#,
        );
        let root = XmlElement::root(&doc).unwrap();
        let value = root.get_value("value").unwrap();
        let length = value.get_field("length").unwrap();
        assert_eq!(length.get::<u64>().unwrap(), 2);
        let items = value.get_field("items").unwrap().items().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[1].is_null());
        assert_eq!(items[1].path().to_string(), "expression/constant/value/items[1]");
        assert!(value.field("missing").unwrap().is_none());
    }

    #[test]
    fn test_sink_builds_envelope() {
        let mut node = XmlSink::node("constant");
        node.set_scalar("type", Scalar::from("int"));
        node.set_scalar("name", Scalar::Null);
        node.set_value("value", DocValue::Scalar(Scalar::Int(7)));
        node.set_comment("7");
        let doc = node.into_document();
        assert_eq!(doc.attribute("xmlns"), Some(vocab::XML_NAMESPACE));
        let constant = doc.child("constant").unwrap();
        assert_eq!(constant.attribute("name"), None);
        assert_eq!(constant.child("value").unwrap().text(), Some("7"));
        assert_eq!(constant.comment(), Some("7"));
    }

    #[test]
    fn test_sink_values() {
        let mut node = XmlSink::node("constant");
        node.set_value(
            "value",
            DocValue::map([
                ("length", DocValue::Scalar(Scalar::UInt(1))),
                ("items", DocValue::Seq(vec![DocValue::Null])),
            ]),
        );
        let value = node.child("value").unwrap();
        assert_eq!(value.child("length").unwrap().text(), Some("1"));
        let item = &value.child("items").unwrap().children()[0];
        assert_eq!(item.name(), "item");
        assert_eq!(item.attribute("nil"), Some("true"));
    }
}
