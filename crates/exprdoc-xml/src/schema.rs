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

//! XSD subset validation for XML documents
//!
//! Understands the parts of XML Schema 1.0 the dialect schema is written in:
//!
//! - top-level `element` declarations, named and inline `complexType`s
//! - `sequence`, `choice` and `all` compositors with `minOccurs`/`maxOccurs`
//! - named model groups (`group name=...` / `group ref=...`)
//! - `any` wildcards (content is not checked) and `anyAttribute`
//! - `attribute` declarations with `use="required"`
//! - `simpleType` restrictions with `enumeration`, `minLength` and `maxLength`
//! - the common built-in types (`string`, `boolean`, `int`, `decimal`, `ID`, ...)
//!
//! Content models are matched greedily, which is exact for deterministic
//! models (the only kind XSD permits). Every violation is collected with the
//! line and column of the offending element.
//!
//! # Examples
//!
//! ```rust
//! use exprdoc_xml::schema::XsdSchema;
//!
//! let schema = XsdSchema::parse(r#"<?xml version="1.0"?>
//! <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:people">
//!   <xs:element name="person">
//!     <xs:complexType>
//!       <xs:sequence>
//!         <xs:element name="age" type="xs:int"/>
//!       </xs:sequence>
//!     </xs:complexType>
//!   </xs:element>
//! </xs:schema>"#)?;
//!
//! assert!(schema.validate(r#"<person xmlns="urn:people"><age>30</age></person>"#).is_ok());
//! let err = schema.validate(r#"<person xmlns="urn:people"><age>thirty</age></person>"#).unwrap_err();
//! assert!(err.as_schema().unwrap().violations[0].message.contains("thirty"));
//! # Ok::<(), exprdoc_xml::XmlTransformError>(())
//! ```

use crate::error::XmlTransformError;
use exprdoc_core::vocabulary as vocab;
use exprdoc_core::{with_stack, SchemaValidationError, SchemaViolation};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// The dialect schema shipped with the crate.
pub const DIALECT_SCHEMA: &str = include_str!("../schemas/expression.xsd");

/// Namespace of the XML Schema language.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Limit on nested `group ref` expansion while matching one element's content.
const MAX_GROUP_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    String,
    Boolean,
    Integer,
    NonNegativeInteger,
    Decimal,
    Name,
    AnyUri,
    AnySimple,
}

impl Builtin {
    fn from_local_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" | "normalizedString" | "token" => Builtin::String,
            "boolean" => Builtin::Boolean,
            "int" | "integer" | "long" | "short" | "byte" => Builtin::Integer,
            "nonNegativeInteger" | "unsignedInt" | "unsignedLong" | "unsignedShort"
            | "unsignedByte" => Builtin::NonNegativeInteger,
            "decimal" | "double" | "float" => Builtin::Decimal,
            "ID" | "IDREF" | "NCName" | "Name" | "NMTOKEN" => Builtin::Name,
            "anyURI" => Builtin::AnyUri,
            "anySimpleType" => Builtin::AnySimple,
            _ => return None,
        })
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            Builtin::String | Builtin::AnySimple => true,
            Builtin::Boolean => matches!(value.trim(), "true" | "false" | "1" | "0"),
            Builtin::Integer => value.trim().parse::<i128>().is_ok(),
            Builtin::NonNegativeInteger => value.trim().parse::<u128>().is_ok(),
            Builtin::Decimal => {
                let v = value.trim();
                matches!(v, "INF" | "-INF" | "NaN") || v.parse::<f64>().is_ok()
            }
            Builtin::Name => {
                let mut chars = value.chars();
                chars
                    .next()
                    .map_or(false, |c| c.is_alphabetic() || c == '_')
                    && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
            }
            Builtin::AnyUri => !value.chars().any(char::is_whitespace),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Builtin::String => "xs:string",
            Builtin::Boolean => "xs:boolean",
            Builtin::Integer => "xs:integer",
            Builtin::NonNegativeInteger => "xs:nonNegativeInteger",
            Builtin::Decimal => "xs:decimal",
            Builtin::Name => "xs:NCName",
            Builtin::AnyUri => "xs:anyURI",
            Builtin::AnySimple => "xs:anySimpleType",
        }
    }
}

/// Restriction of a built-in or another simple type.
#[derive(Debug, Clone, PartialEq)]
struct SimpleType {
    base: String,
    enumeration: Vec<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum TypeRef {
    /// No type given: any content.
    AnyType,
    Named(String),
    Complex(Box<ComplexType>),
    Simple(Box<SimpleType>),
}

#[derive(Debug, Clone, PartialEq)]
struct ElementDecl {
    name: String,
    ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Element(ElementDecl),
    Sequence(Vec<Particle>),
    Choice(Vec<Particle>),
    All(Vec<Particle>),
    GroupRef(String),
    Any,
}

#[derive(Debug, Clone, PartialEq)]
struct Particle {
    term: Term,
    min: usize,
    max: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeDecl {
    name: String,
    ty: TypeRef,
    required: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ComplexType {
    content: Option<Particle>,
    attributes: Vec<AttributeDecl>,
    any_attribute: bool,
    mixed: bool,
}

/// A parsed XSD document.
#[derive(Debug, Clone, PartialEq)]
pub struct XsdSchema {
    id: String,
    target_namespace: Option<String>,
    elements: HashMap<String, ElementDecl>,
    complex_types: HashMap<String, ComplexType>,
    simple_types: HashMap<String, SimpleType>,
    groups: HashMap<String, Particle>,
}

fn invalid(message: impl Into<String>) -> XmlTransformError {
    XmlTransformError::InvalidSchema {
        message: message.into(),
    }
}

/// Local part of a possibly prefixed QName.
fn local(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

fn xsd_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XSD_NAMESPACE))
}

fn required_attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, XmlTransformError> {
    node.attribute(name).ok_or_else(|| {
        invalid(format!(
            "<xs:{}> requires a '{}' attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn occurs(node: Node<'_, '_>) -> Result<(usize, Option<usize>), XmlTransformError> {
    let min: usize = match node.attribute("minOccurs") {
        None => 1,
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid minOccurs '{}'", v)))?,
    };
    let max: Option<usize> = match node.attribute("maxOccurs") {
        None => Some(1),
        Some("unbounded") => None,
        Some(v) => Some(
            v.trim()
                .parse()
                .map_err(|_| invalid(format!("invalid maxOccurs '{}'", v)))?,
        ),
    };
    if max.map_or(false, |max| max < min) {
        return Err(invalid(format!(
            "maxOccurs is below minOccurs on <xs:{}>",
            node.tag_name().name()
        )));
    }
    Ok((min, max))
}

impl XsdSchema {
    /// Parse an XSD document; its `targetNamespace` becomes the cache key.
    pub fn parse(text: &str) -> Result<Self, XmlTransformError> {
        let doc = Document::parse(text).map_err(|e| invalid(e.to_string()))?;
        let root = doc.root_element();
        if root.tag_name().name() != "schema" || root.tag_name().namespace() != Some(XSD_NAMESPACE) {
            return Err(invalid("root element must be <xs:schema>"));
        }
        let target_namespace = root.attribute("targetNamespace").map(str::to_string);
        let id = target_namespace
            .clone()
            .or_else(|| root.attribute("id").map(str::to_string))
            .ok_or_else(|| invalid("schema has neither 'targetNamespace' nor 'id'"))?;

        let mut schema = XsdSchema {
            id,
            target_namespace,
            elements: HashMap::new(),
            complex_types: HashMap::new(),
            simple_types: HashMap::new(),
            groups: HashMap::new(),
        };
        for child in xsd_children(root) {
            match child.tag_name().name() {
                "element" => {
                    let decl = Self::parse_element_decl(child)?;
                    schema.elements.insert(decl.name.clone(), decl);
                }
                "complexType" => {
                    let name = required_attribute(child, "name")?;
                    schema
                        .complex_types
                        .insert(name.to_string(), Self::parse_complex_type(child)?);
                }
                "simpleType" => {
                    let name = required_attribute(child, "name")?;
                    schema
                        .simple_types
                        .insert(name.to_string(), Self::parse_simple_type(child)?);
                }
                "group" => {
                    let name = required_attribute(child, "name")?;
                    let model = xsd_children(child)
                        .next()
                        .ok_or_else(|| invalid(format!("group '{}' is empty", name)))?;
                    schema
                        .groups
                        .insert(name.to_string(), Self::parse_particle(model)?);
                }
                "annotation" | "import" | "include" => {}
                other => return Err(invalid(format!("unsupported top-level <xs:{}>", other))),
            }
        }
        schema.check_references()?;
        Ok(schema)
    }

    /// Read and parse an XSD file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, XmlTransformError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// The bundled schema of the expression dialect.
    pub fn dialect() -> Result<Self, XmlTransformError> {
        let schema = Self::parse(DIALECT_SCHEMA)?;
        if schema.target_namespace.as_deref() != Some(vocab::XML_NAMESPACE) {
            return Err(invalid(format!(
                "expected targetNamespace {}",
                vocab::XML_NAMESPACE
            )));
        }
        Ok(schema)
    }

    /// Cache key: the target namespace, or the schema `id` without one.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    fn parse_element_decl(node: Node<'_, '_>) -> Result<ElementDecl, XmlTransformError> {
        let name = required_attribute(node, "name")?.to_string();
        let ty = match node.attribute("type") {
            Some(ty) => TypeRef::Named(ty.to_string()),
            None => Self::parse_inline_type(node)?,
        };
        Ok(ElementDecl { name, ty })
    }

    fn parse_inline_type(node: Node<'_, '_>) -> Result<TypeRef, XmlTransformError> {
        for child in xsd_children(node) {
            match child.tag_name().name() {
                "complexType" => return Ok(TypeRef::Complex(Box::new(Self::parse_complex_type(child)?))),
                "simpleType" => return Ok(TypeRef::Simple(Box::new(Self::parse_simple_type(child)?))),
                _ => {}
            }
        }
        Ok(TypeRef::AnyType)
    }

    fn parse_complex_type(node: Node<'_, '_>) -> Result<ComplexType, XmlTransformError> {
        let mut ty = ComplexType {
            mixed: node.attribute("mixed").map_or(false, |m| m == "true" || m == "1"),
            ..Default::default()
        };
        for child in xsd_children(node) {
            match child.tag_name().name() {
                "sequence" | "choice" | "all" | "group" => {
                    if ty.content.is_some() {
                        return Err(invalid("complexType has more than one content model"));
                    }
                    ty.content = Some(Self::parse_particle(child)?);
                }
                "attribute" => {
                    let name = required_attribute(child, "name")?.to_string();
                    let attr_ty = match child.attribute("type") {
                        Some(t) => TypeRef::Named(t.to_string()),
                        None => Self::parse_inline_type(child)?,
                    };
                    ty.attributes.push(AttributeDecl {
                        name,
                        ty: attr_ty,
                        required: child.attribute("use") == Some("required"),
                    });
                }
                "anyAttribute" => ty.any_attribute = true,
                "annotation" => {}
                other => {
                    return Err(invalid(format!("unsupported <xs:{}> in complexType", other)))
                }
            }
        }
        Ok(ty)
    }

    fn parse_particle(node: Node<'_, '_>) -> Result<Particle, XmlTransformError> {
        let (min, max) = occurs(node)?;
        let term = match node.tag_name().name() {
            "element" => Term::Element(Self::parse_element_decl(node)?),
            "any" => Term::Any,
            "group" => Term::GroupRef(local(required_attribute(node, "ref")?).to_string()),
            compositor @ ("sequence" | "choice" | "all") => {
                let particles = xsd_children(node)
                    .filter(|c| c.tag_name().name() != "annotation")
                    .map(Self::parse_particle)
                    .collect::<Result<Vec<_>, _>>()?;
                match compositor {
                    "sequence" => Term::Sequence(particles),
                    "choice" => Term::Choice(particles),
                    _ => {
                        if particles
                            .iter()
                            .any(|p| !matches!(p.term, Term::Element(_)) || p.max != Some(1))
                        {
                            return Err(invalid("<xs:all> may only hold single elements"));
                        }
                        Term::All(particles)
                    }
                }
            }
            other => return Err(invalid(format!("unsupported particle <xs:{}>", other))),
        };
        Ok(Particle { term, min, max })
    }

    fn parse_simple_type(node: Node<'_, '_>) -> Result<SimpleType, XmlTransformError> {
        let restriction = xsd_children(node)
            .find(|c| c.tag_name().name() == "restriction")
            .ok_or_else(|| invalid("only simpleType restrictions are supported"))?;
        let mut ty = SimpleType {
            base: required_attribute(restriction, "base")?.to_string(),
            enumeration: Vec::new(),
            min_length: None,
            max_length: None,
        };
        for facet in xsd_children(restriction) {
            let value = required_attribute(facet, "value")?;
            let length = || {
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("invalid length facet '{}'", value)))
            };
            match facet.tag_name().name() {
                "enumeration" => ty.enumeration.push(value.to_string()),
                "minLength" => ty.min_length = Some(length()?),
                "maxLength" => ty.max_length = Some(length()?),
                "length" => {
                    ty.min_length = Some(length()?);
                    ty.max_length = ty.min_length;
                }
                // Facets outside the subset are accepted and not enforced.
                _ => {}
            }
        }
        Ok(ty)
    }

    fn check_references(&self) -> Result<(), XmlTransformError> {
        fn walk_type(schema: &XsdSchema, ty: &TypeRef) -> Result<(), XmlTransformError> {
            match ty {
                TypeRef::AnyType => Ok(()),
                TypeRef::Named(name) => {
                    let name = local(name);
                    if schema.complex_types.contains_key(name)
                        || schema.simple_types.contains_key(name)
                        || Builtin::from_local_name(name).is_some()
                        || name == "anyType"
                    {
                        Ok(())
                    } else {
                        Err(invalid(format!("unknown type '{}'", name)))
                    }
                }
                TypeRef::Complex(complex) => walk_complex(schema, complex),
                TypeRef::Simple(simple) => walk_type(schema, &TypeRef::Named(simple.base.clone())),
            }
        }
        fn walk_complex(schema: &XsdSchema, ty: &ComplexType) -> Result<(), XmlTransformError> {
            for attr in &ty.attributes {
                walk_type(schema, &attr.ty)?;
            }
            match &ty.content {
                Some(p) => walk_particle(schema, p),
                None => Ok(()),
            }
        }
        fn walk_particle(schema: &XsdSchema, p: &Particle) -> Result<(), XmlTransformError> {
            match &p.term {
                Term::Element(decl) => walk_type(schema, &decl.ty),
                Term::Sequence(ps) | Term::Choice(ps) | Term::All(ps) => {
                    ps.iter().try_for_each(|p| walk_particle(schema, p))
                }
                Term::GroupRef(name) if schema.groups.contains_key(name) => Ok(()),
                Term::GroupRef(name) => Err(invalid(format!("unknown group '{}'", name))),
                Term::Any => Ok(()),
            }
        }

        for decl in self.elements.values() {
            walk_type(self, &decl.ty)?;
        }
        for ty in self.complex_types.values() {
            walk_complex(self, ty)?;
        }
        for ty in self.simple_types.values() {
            walk_type(self, &TypeRef::Named(ty.base.clone()))?;
        }
        for group in self.groups.values() {
            walk_particle(self, group)?;
        }
        Ok(())
    }

    /// Parse and check XML text.
    pub fn validate(&self, xml: &str) -> Result<(), XmlTransformError> {
        let doc = Document::parse(xml)?;
        Ok(self.validate_document(&doc)?)
    }

    /// Check a parsed document, collecting every violation.
    pub fn validate_document(&self, doc: &Document<'_>) -> Result<(), SchemaValidationError> {
        let mut validator = Validator {
            schema: self,
            violations: Vec::new(),
        };
        validator.check_root(doc.root_element());
        if validator.violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError {
                schema: self.id.clone(),
                violations: validator.violations,
            })
        }
    }

    /// True when `xml` parses and conforms.
    pub fn is_valid(&self, xml: &str) -> bool {
        self.validate(xml).is_ok()
    }
}

fn text_content(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|c| c.text())
        .collect()
}

/// A resolved type, borrowed from the schema.
enum Resolved<'s> {
    Any,
    Complex(&'s ComplexType),
    Simple(&'s SimpleType),
    Builtin(Builtin),
}

/// One child element matched against the content model.
enum Matched<'s> {
    Element(&'s ElementDecl),
    Skip,
}

struct Validator<'s> {
    schema: &'s XsdSchema,
    violations: Vec<SchemaViolation>,
}

impl<'s> Validator<'s> {
    fn report(&mut self, node: Node<'_, '_>, message: String) {
        let pos = node.document().text_pos_at(node.range().start);
        self.violations.push(SchemaViolation::new(
            Some(pos.row as usize),
            Some(pos.col as usize),
            message,
        ));
    }

    fn resolve(&self, ty: &'s TypeRef) -> Resolved<'s> {
        match ty {
            TypeRef::AnyType => Resolved::Any,
            TypeRef::Complex(c) => Resolved::Complex(c),
            TypeRef::Simple(s) => Resolved::Simple(s),
            TypeRef::Named(name) => self.resolve_name(name),
        }
    }

    fn resolve_name(&self, name: &str) -> Resolved<'s> {
        let name = local(name);
        if let Some(c) = self.schema.complex_types.get(name) {
            Resolved::Complex(c)
        } else if let Some(s) = self.schema.simple_types.get(name) {
            Resolved::Simple(s)
        } else if let Some(b) = Builtin::from_local_name(name) {
            Resolved::Builtin(b)
        } else {
            Resolved::Any
        }
    }

    fn check_root(&mut self, root: Node<'_, '_>) {
        let name = root.tag_name();
        if name.namespace() != self.schema.target_namespace.as_deref() {
            self.report(
                root,
                format!(
                    "element '{}' is in namespace '{}', expected '{}'",
                    name.name(),
                    name.namespace().unwrap_or(""),
                    self.schema.target_namespace.as_deref().unwrap_or("")
                ),
            );
            return;
        }
        match self.schema.elements.get(name.name()) {
            Some(decl) => self.check_element(root, decl),
            None => self.report(root, format!("element '{}' is not declared", name.name())),
        }
    }

    fn check_element(&mut self, node: Node<'_, '_>, decl: &'s ElementDecl) {
        match self.resolve(&decl.ty) {
            Resolved::Any => {}
            Resolved::Complex(ty) => with_stack(|| self.check_complex(node, ty)),
            Resolved::Simple(ty) => {
                if self.no_elements(node) {
                    if let Err(message) = self.check_simple(&text_content(node), ty) {
                        self.report(node, format!("element '{}': {}", decl.name, message));
                    }
                }
            }
            Resolved::Builtin(b) => {
                if self.no_elements(node) {
                    let text = text_content(node);
                    if !b.accepts(&text) {
                        self.report(
                            node,
                            format!("element '{}': expected {}, found '{}'", decl.name, b.label(), text),
                        );
                    }
                }
            }
        }
    }

    fn no_elements(&mut self, node: Node<'_, '_>) -> bool {
        match node.children().find(|c| c.is_element()) {
            Some(child) => {
                self.report(
                    child,
                    format!(
                        "element '{}' is not allowed in simple content of '{}'",
                        child.tag_name().name(),
                        node.tag_name().name()
                    ),
                );
                false
            }
            None => true,
        }
    }

    fn check_simple(&self, value: &str, ty: &SimpleType) -> Result<(), String> {
        match self.resolve_name(&ty.base) {
            Resolved::Builtin(b) if !b.accepts(value) => {
                return Err(format!("expected {}, found '{}'", b.label(), value));
            }
            Resolved::Simple(base) => self.check_simple(value, base)?,
            _ => {}
        }
        if !ty.enumeration.is_empty() && !ty.enumeration.iter().any(|e| e == value) {
            return Err(format!(
                "'{}' is not one of {}",
                value,
                ty.enumeration.join(", ")
            ));
        }
        let length = value.chars().count();
        if let Some(min) = ty.min_length {
            if length < min {
                return Err(format!("'{}' is shorter than {} character(s)", value, min));
            }
        }
        if let Some(max) = ty.max_length {
            if length > max {
                return Err(format!("'{}' is longer than {} character(s)", value, max));
            }
        }
        Ok(())
    }

    fn check_attribute_value(&self, value: &str, ty: &'s TypeRef) -> Result<(), String> {
        match self.resolve(ty) {
            Resolved::Builtin(b) if !b.accepts(value) => {
                Err(format!("expected {}, found '{}'", b.label(), value))
            }
            Resolved::Simple(s) => self.check_simple(value, s),
            _ => Ok(()),
        }
    }

    fn check_complex(&mut self, node: Node<'_, '_>, ty: &'s ComplexType) {
        let element = node.tag_name().name();

        for attr in node.attributes() {
            if attr.namespace().is_some() {
                continue;
            }
            match ty.attributes.iter().find(|a| a.name == attr.name()) {
                Some(decl) => {
                    if let Err(message) = self.check_attribute_value(attr.value(), &decl.ty) {
                        self.report(node, format!("attribute '{}' of '{}': {}", attr.name(), element, message));
                    }
                }
                None if ty.any_attribute => {}
                None => self.report(
                    node,
                    format!("attribute '{}' is not allowed on '{}'", attr.name(), element),
                ),
            }
        }
        for decl in ty.attributes.iter().filter(|a| a.required) {
            if node.attribute(decl.name.as_str()).is_none() {
                self.report(
                    node,
                    format!("required attribute '{}' missing from '{}'", decl.name, element),
                );
            }
        }

        if !ty.mixed {
            if let Some(text) = node
                .children()
                .find(|c| c.is_text() && c.text().map_or(false, |t| !t.trim().is_empty()))
            {
                self.report(text, format!("text is not allowed in '{}'", element));
            }
        }

        let children: Vec<Node<'_, '_>> = node.children().filter(Node::is_element).collect();
        let Some(content) = &ty.content else {
            if let Some(child) = children.first() {
                self.report(
                    *child,
                    format!("element '{}' is not allowed in '{}'", child.tag_name().name(), element),
                );
            }
            return;
        };

        let mut matched = Vec::new();
        let matcher = Matcher { schema: self.schema, children: &children };
        match matcher.particle(content, 0, &mut matched, 0) {
            Some(end) if end == children.len() => {}
            Some(end) => {
                let child = children[end];
                self.report(
                    child,
                    format!("element '{}' is not allowed here in '{}'", child.tag_name().name(), element),
                );
            }
            None => {
                let expected = matcher.first_names(content, 0).join("', '");
                let found = children
                    .first()
                    .map_or("end of content".to_string(), |c| format!("'{}'", c.tag_name().name()));
                self.report(
                    node,
                    format!("content of '{}' is incomplete: expected '{}', found {}", element, expected, found),
                );
                return;
            }
        }
        for (child, m) in children.iter().zip(matched) {
            if let Matched::Element(decl) = m {
                self.check_element(*child, decl);
            }
        }
    }
}

/// Greedy content-model matcher over the element children of one node.
struct Matcher<'s, 'c, 'a, 'input> {
    schema: &'s XsdSchema,
    children: &'c [Node<'a, 'input>],
}

impl<'s, 'c, 'a, 'input> Matcher<'s, 'c, 'a, 'input> {
    /// Match `p` from `pos`; on success `out` holds one entry per consumed child.
    fn particle(
        &self,
        p: &'s Particle,
        pos: usize,
        out: &mut Vec<Matched<'s>>,
        depth: usize,
    ) -> Option<usize> {
        let mark = out.len();
        let mut pos = pos;
        let mut count = 0;
        while p.max.map_or(true, |max| count < max) {
            let before = out.len();
            match self.term(&p.term, pos, out, depth) {
                Some(next) if next > pos => {
                    pos = next;
                    count += 1;
                }
                Some(_) => {
                    // Matched empty; further repetitions cannot consume more.
                    out.truncate(before);
                    count = count.max(p.min);
                    break;
                }
                None => {
                    out.truncate(before);
                    break;
                }
            }
        }
        if count < p.min {
            out.truncate(mark);
            return None;
        }
        Some(pos)
    }

    fn term(
        &self,
        term: &'s Term,
        pos: usize,
        out: &mut Vec<Matched<'s>>,
        depth: usize,
    ) -> Option<usize> {
        match term {
            Term::Element(decl) => {
                let child = self.children.get(pos)?;
                if child.tag_name().name() == decl.name {
                    out.push(Matched::Element(decl));
                    Some(pos + 1)
                } else {
                    None
                }
            }
            Term::Any => {
                self.children.get(pos)?;
                out.push(Matched::Skip);
                Some(pos + 1)
            }
            Term::Sequence(particles) => {
                let mark = out.len();
                let mut at = pos;
                for p in particles {
                    match self.particle(p, at, out, depth) {
                        Some(next) => at = next,
                        None => {
                            out.truncate(mark);
                            return None;
                        }
                    }
                }
                Some(at)
            }
            Term::Choice(particles) => {
                let mut empty = None;
                for p in particles {
                    let mark = out.len();
                    match self.particle(p, pos, out, depth) {
                        Some(next) if next > pos => return Some(next),
                        Some(next) => {
                            out.truncate(mark);
                            if empty.is_none() {
                                empty = Some(next);
                            }
                        }
                        None => out.truncate(mark),
                    }
                }
                empty
            }
            Term::All(particles) => {
                let mut used = vec![false; particles.len()];
                let mut at = pos;
                while let Some(child) = self.children.get(at) {
                    let name = child.tag_name().name();
                    let slot = particles.iter().enumerate().position(|(i, p)| {
                        !used[i] && matches!(&p.term, Term::Element(d) if d.name == name)
                    });
                    let Some(i) = slot else { break };
                    if let Term::Element(decl) = &particles[i].term {
                        out.push(Matched::Element(decl));
                    }
                    used[i] = true;
                    at += 1;
                }
                let complete = particles.iter().zip(&used).all(|(p, used)| *used || p.min == 0);
                if complete {
                    Some(at)
                } else {
                    out.truncate(out.len() - (at - pos));
                    None
                }
            }
            Term::GroupRef(name) => {
                if depth >= MAX_GROUP_DEPTH {
                    return None;
                }
                let group = self.schema.groups.get(name)?;
                self.particle(group, pos, out, depth + 1)
            }
        }
    }

    /// Element names that may start `p`, for messages.
    fn first_names(&self, p: &'s Particle, depth: usize) -> Vec<String> {
        if depth >= MAX_GROUP_DEPTH {
            return Vec::new();
        }
        match &p.term {
            Term::Element(decl) => vec![decl.name.clone()],
            Term::Any => vec!["*".to_string()],
            Term::Sequence(ps) => ps
                .iter()
                .find(|p| p.min > 0)
                .or_else(|| ps.first())
                .map(|p| self.first_names(p, depth + 1))
                .unwrap_or_default(),
            Term::Choice(ps) | Term::All(ps) => ps
                .iter()
                .flat_map(|p| self.first_names(p, depth + 1))
                .take(8)
                .collect(),
            Term::GroupRef(name) => self
                .schema
                .groups
                .get(name)
                .map(|g| self.first_names(g, depth + 1))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEOPLE: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:people">
  <xs:element name="people">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="person" type="Person" minOccurs="1" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:complexType name="Person">
    <xs:sequence>
      <xs:element name="name" type="Name"/>
      <xs:choice minOccurs="0">
        <xs:element name="age" type="xs:nonNegativeInteger"/>
        <xs:element name="born" type="xs:string"/>
      </xs:choice>
    </xs:sequence>
    <xs:attribute name="id" type="xs:ID" use="required"/>
    <xs:attribute name="role" type="Role"/>
  </xs:complexType>
  <xs:simpleType name="Name">
    <xs:restriction base="xs:string">
      <xs:minLength value="1"/>
      <xs:maxLength value="10"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="Role">
    <xs:restriction base="xs:string">
      <xs:enumeration value="admin"/>
      <xs:enumeration value="user"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>"#;

    fn people() -> XsdSchema {
        XsdSchema::parse(PEOPLE).unwrap()
    }

    fn violations(schema: &XsdSchema, xml: &str) -> Vec<SchemaViolation> {
        match schema.validate(xml) {
            Ok(()) => Vec::new(),
            Err(err) => err.as_schema().expect("schema error").violations.clone(),
        }
    }

    #[test]
    fn test_valid_document() {
        let xml = r#"<people xmlns="urn:people">
            <person id="a" role="admin"><name>Ann</name><age>41</age></person>
            <person id="b"><name>Bob</name></person>
        </people>"#;
        assert!(people().is_valid(xml));
        assert_eq!(people().id(), "urn:people");
    }

    #[test]
    fn test_collects_every_violation_with_position() {
        let xml = "<people xmlns=\"urn:people\">\n  <person role=\"guest\"><name></name><age>-1</age></person>\n</people>";
        let found = violations(&people(), xml);
        assert_eq!(found.len(), 4, "{:?}", found);
        assert!(found.iter().all(|v| v.line == Some(2)));
        let messages: Vec<_> = found.iter().map(|v| v.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("'guest' is not one of admin, user")));
        assert!(messages.iter().any(|m| m.contains("required attribute 'id'")));
        assert!(messages.iter().any(|m| m.contains("shorter than 1")));
        assert!(messages.iter().any(|m| m.contains("xs:nonNegativeInteger")));
    }

    #[test]
    fn test_content_model_errors() {
        let schema = people();
        let empty = violations(&schema, r#"<people xmlns="urn:people"/>"#);
        assert!(empty[0].message.contains("expected 'person'"), "{:?}", empty);

        let extra = violations(
            &schema,
            r#"<people xmlns="urn:people"><person id="a"><name>A</name><age>1</age><born>x</born></person></people>"#,
        );
        assert!(extra[0].message.contains("'born' is not allowed here"), "{:?}", extra);

        let text = violations(&schema, r#"<people xmlns="urn:people">hello<person id="a"><name>A</name></person></people>"#);
        assert!(text[0].message.contains("text is not allowed"));
    }

    #[test]
    fn test_namespace_and_root() {
        let schema = people();
        let wrong_ns = violations(&schema, r#"<people><person id="a"><name>A</name></person></people>"#);
        assert!(wrong_ns[0].message.contains("expected 'urn:people'"));
        let undeclared = violations(&schema, r#"<person xmlns="urn:people" id="a"/>"#);
        assert!(undeclared[0].message.contains("not declared"));
    }

    #[test]
    fn test_all_and_groups() {
        let schema = XsdSchema::parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" id="shapes">
              <xs:element name="shape" type="Shape"/>
              <xs:complexType name="Shape">
                <xs:all>
                  <xs:element name="x" type="xs:int"/>
                  <xs:element name="y" type="xs:int" minOccurs="0"/>
                  <xs:element name="fill" type="Fill" minOccurs="0"/>
                </xs:all>
              </xs:complexType>
              <xs:complexType name="Fill">
                <xs:group ref="Colour" minOccurs="0" maxOccurs="unbounded"/>
              </xs:complexType>
              <xs:group name="Colour">
                <xs:choice>
                  <xs:element name="red"/>
                  <xs:element name="blue"/>
                </xs:choice>
              </xs:group>
            </xs:schema>"#,
        )
        .unwrap();
        assert_eq!(schema.id(), "shapes");
        assert!(schema.is_valid("<shape><y>2</y><x>1</x></shape>"));
        assert!(schema.is_valid("<shape><x>1</x><fill><red/><blue/><red/></fill></shape>"));
        assert!(!schema.is_valid("<shape><y>2</y></shape>"));
        assert!(!schema.is_valid("<shape><x>1</x><x>2</x></shape>"));
        assert!(!schema.is_valid("<shape><x>1</x><fill><green/></fill></shape>"));
    }

    #[test]
    fn test_any_and_mixed() {
        let schema = XsdSchema::parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" id="box">
              <xs:element name="box">
                <xs:complexType mixed="true">
                  <xs:sequence>
                    <xs:any processContents="skip" minOccurs="0" maxOccurs="unbounded"/>
                  </xs:sequence>
                  <xs:anyAttribute/>
                </xs:complexType>
              </xs:element>
            </xs:schema>"#,
        )
        .unwrap();
        assert!(schema.is_valid("<box>text</box>"));
        assert!(schema.is_valid(r#"<box a="1"><anything><deep/></anything>tail</box>"#));
    }

    #[test]
    fn test_invalid_schemas() {
        assert!(XsdSchema::parse("<schema/>").is_err());
        assert!(XsdSchema::parse(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#).is_err());
        let unknown_type = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" id="t">
            <xs:element name="a" type="Missing"/></xs:schema>"#;
        assert!(matches!(
            XsdSchema::parse(unknown_type),
            Err(XmlTransformError::InvalidSchema { .. })
        ));
        let bad_occurs = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" id="t">
            <xs:element name="a"><xs:complexType><xs:sequence>
            <xs:element name="b" minOccurs="2" maxOccurs="1"/>
            </xs:sequence></xs:complexType></xs:element></xs:schema>"#;
        assert!(XsdSchema::parse(bad_occurs).is_err());
    }

    #[test]
    fn test_dialect_schema_parses() {
        let schema = XsdSchema::dialect().unwrap();
        assert_eq!(schema.id(), vocab::XML_NAMESPACE);
        let ok = format!(
            r#"<expression xmlns="{}"><not type="bool"><operand><constant type="bool"><value>true</value></constant></operand></not></expression>"#,
            vocab::XML_NAMESPACE
        );
        assert!(schema.is_valid(&ok));
        let bad = format!(
            r#"<expression xmlns="{}"><mystery/></expression>"#,
            vocab::XML_NAMESPACE
        );
        assert!(!schema.is_valid(&bad));
    }
}
