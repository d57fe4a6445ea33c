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

//! Format-neutral document element abstraction.
//!
//! The transform visitors never touch JSON or XML directly. Input documents
//! are read through [`DocElement`] (node elements and member fragments) and
//! [`ValueSource`] (constant payloads); output documents are built through
//! [`ElementSink`]. Each format crate implements these traits once.
//!
//! Every accessor that fails reports a [`SerializationError`] carrying the
//! [`DocPath`] of the offending node.

use crate::error::SerializationError;
use crate::registry::TypeRegistry;
use crate::types::Type;
use crate::vocabulary as vocab;
use smallvec::SmallVec;
use std::fmt;

/// One step of a [`DocPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named child.
    Name(String),
    /// A position inside an array.
    Index(usize),
}

/// Location of a node, from the document root.
///
/// Displays as `expression/lambda/body/add/operands[1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocPath {
    segments: SmallVec<[PathSegment; 8]>,
}

impl DocPath {
    /// The empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// A path with a single named segment.
    pub fn root(name: &str) -> Self {
        Self::new().child(name)
    }

    /// This path extended by a named child.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Name(name.to_string()));
        Self { segments }
    }

    /// This path extended by an array position.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Name(name) => {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A scalar read from, or written to, a document.
///
/// XML attributes and text always arrive as [`Scalar::Str`]; the typed
/// conversions in [`FromScalar`] parse them.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Short description of the scalar kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) | Scalar::UInt(_) => "integer",
            Scalar::Float(_) => "number",
            Scalar::Str(_) => "string",
        }
    }

    /// Text form used by text-only formats.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::UInt(u) => u.to_string(),
            Scalar::Float(x) => format_float(*x),
            Scalar::Str(s) => s.clone(),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<u64> for Scalar {
    fn from(u: u64) -> Self {
        Scalar::UInt(u)
    }
}

impl From<usize> for Scalar {
    fn from(u: usize) -> Self {
        Scalar::UInt(u as u64)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

/// Float rendering shared by both formats: non-finite values use the
/// `NaN` / `Infinity` / `-Infinity` spellings.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{:?}", x)
    }
}

/// Inverse of [`format_float`].
pub fn parse_float(text: &str) -> Option<f64> {
    match text.trim() {
        "NaN" => Some(f64::NAN),
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

/// Typed extraction of a [`Scalar`].
pub trait FromScalar: Sized {
    /// Name of the target type for error messages.
    const EXPECTED: &'static str;

    fn from_scalar(scalar: &Scalar) -> Option<Self>;

    /// Convert, reporting a path-qualified error on mismatch.
    fn convert(scalar: &Scalar, path: &DocPath, name: &str) -> Result<Self, SerializationError> {
        Self::from_scalar(scalar).ok_or_else(|| {
            SerializationError::invalid_value(
                path,
                format!(
                    "property '{}' must be {}, found {} '{}'",
                    name,
                    Self::EXPECTED,
                    scalar.kind_name(),
                    scalar.to_text()
                ),
            )
        })
    }
}

impl FromScalar for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Bool(b) => Some(*b),
            Scalar::Str(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromScalar for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Int(i) => Some(*i),
            Scalar::UInt(u) => i64::try_from(*u).ok(),
            Scalar::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromScalar for u64 {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::UInt(u) => Some(*u),
            Scalar::Int(i) => u64::try_from(*i).ok(),
            Scalar::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromScalar for usize {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        u64::from_scalar(scalar).and_then(|u| usize::try_from(u).ok())
    }
}

impl FromScalar for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Float(x) => Some(*x),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::UInt(u) => Some(*u as f64),
            Scalar::Str(s) => parse_float(s),
            _ => None,
        }
    }
}

impl FromScalar for String {
    const EXPECTED: &'static str = "a string";

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Read access to the payload of a constant.
pub trait ValueSource: Sized {
    fn path(&self) -> &DocPath;

    fn is_null(&self) -> bool;

    /// The scalar payload; fails when the value is a sequence or map.
    fn scalar(&self) -> Result<Scalar, SerializationError>;

    /// The entries of a sequence payload.
    fn items(&self) -> Result<Vec<Self>, SerializationError>;

    /// A named entry of a map payload.
    fn field(&self, name: &str) -> Result<Option<Self>, SerializationError>;

    /// Typed scalar payload.
    fn get<T: FromScalar>(&self) -> Result<T, SerializationError> {
        let scalar = self.scalar()?;
        T::convert(&scalar, self.path(), "value")
    }

    /// A required map entry.
    fn get_field(&self, name: &str) -> Result<Self, SerializationError> {
        self.field(name)?
            .ok_or_else(|| SerializationError::missing_element(self.path(), name))
    }
}

/// A node element or member fragment of an input document.
///
/// Node elements carry a tag naming the expression kind (`add`, `lambda`,
/// ...). Fragments (`method`, `constructor`, parameter specs) are plain
/// property bags whose tag is the property they were read from.
pub trait DocElement: Sized {
    type Value: ValueSource;

    fn tag(&self) -> &str;

    fn path(&self) -> &DocPath;

    /// The single node wrapped by property `name`; `Ok(None)` when absent.
    fn element(&self, name: &str) -> Result<Option<Self>, SerializationError>;

    /// The ordered nodes of array property `name`; `Ok(None)` when absent.
    fn elements(&self, name: &str) -> Result<Option<Vec<Self>>, SerializationError>;

    /// The fragment stored under `name`; `Ok(None)` when absent.
    fn object(&self, name: &str) -> Result<Option<Self>, SerializationError>;

    /// The ordered fragments of array property `name`; `Ok(None)` when absent.
    fn objects(&self, name: &str) -> Result<Option<Vec<Self>>, SerializationError>;

    /// Scalar property `name`; `Ok(None)` when absent.
    fn scalar(&self, name: &str) -> Result<Option<Scalar>, SerializationError>;

    /// Constant payload `name`; `Ok(None)` when absent.
    fn value(&self, name: &str) -> Result<Option<Self::Value>, SerializationError>;

    fn get_element(&self, name: &str) -> Result<Self, SerializationError> {
        self.element(name)?
            .ok_or_else(|| SerializationError::missing_element(self.path(), name))
    }

    fn try_element(&self, name: &str) -> Option<Self> {
        self.element(name).ok().flatten()
    }

    fn get_elements(&self, name: &str) -> Result<Vec<Self>, SerializationError> {
        self.elements(name)?
            .ok_or_else(|| SerializationError::missing_element(self.path(), name))
    }

    fn try_elements(&self, name: &str) -> Option<Vec<Self>> {
        self.elements(name).ok().flatten()
    }

    /// Optional node array: empty when absent, error on a wrong container kind.
    fn elements_or_empty(&self, name: &str) -> Result<Vec<Self>, SerializationError> {
        Ok(self.elements(name)?.unwrap_or_default())
    }

    fn get_object(&self, name: &str) -> Result<Self, SerializationError> {
        self.object(name)?
            .ok_or_else(|| SerializationError::missing_element(self.path(), name))
    }

    fn try_object(&self, name: &str) -> Option<Self> {
        self.object(name).ok().flatten()
    }

    fn objects_or_empty(&self, name: &str) -> Result<Vec<Self>, SerializationError> {
        Ok(self.objects(name)?.unwrap_or_default())
    }

    fn get_value(&self, name: &str) -> Result<Self::Value, SerializationError> {
        self.value(name)?
            .ok_or_else(|| SerializationError::missing_element(self.path(), name))
    }

    /// Typed optional property; `None` when absent or null.
    fn property<T: FromScalar>(&self, name: &str) -> Result<Option<T>, SerializationError> {
        match self.scalar(name)? {
            None | Some(Scalar::Null) => Ok(None),
            Some(scalar) => T::convert(&scalar, self.path(), name).map(Some),
        }
    }

    fn get_property<T: FromScalar>(&self, name: &str) -> Result<T, SerializationError> {
        self.property(name)?
            .ok_or_else(|| SerializationError::missing_element(self.path(), name))
    }

    fn try_property<T: FromScalar>(&self, name: &str) -> Option<T> {
        self.property(name).ok().flatten()
    }

    fn property_or<T: FromScalar>(&self, name: &str, default: T) -> Result<T, SerializationError> {
        Ok(self.property(name)?.unwrap_or(default))
    }

    /// Resolve the type named by property `name`, if present.
    fn type_from_property(
        &self,
        registry: &TypeRegistry,
        name: &str,
    ) -> Result<Option<Type>, SerializationError> {
        match self.property::<String>(name)? {
            None => Ok(None),
            Some(type_name) => registry
                .resolve_type(&type_name)
                .map(Some)
                .map_err(|e| SerializationError::unresolved_type(self.path(), &type_name, e)),
        }
    }

    /// Resolve the type named by property `name`; fails when absent.
    fn get_type_from_property(
        &self,
        registry: &TypeRegistry,
        name: &str,
    ) -> Result<Type, SerializationError> {
        self.type_from_property(registry, name)?
            .ok_or_else(|| SerializationError::missing_element(self.path(), name))
    }

    /// Resolve the `type` property.
    fn get_type(&self, registry: &TypeRegistry) -> Result<Type, SerializationError> {
        self.get_type_from_property(registry, vocab::TYPE)
    }

    fn get_id(&self) -> Result<String, SerializationError> {
        self.get_property(vocab::ID)
    }

    fn try_id(&self) -> Option<String> {
        self.try_property(vocab::ID)
    }

    fn try_idref(&self) -> Option<String> {
        self.try_property(vocab::IDREF)
    }

    fn try_name(&self) -> Option<String> {
        self.try_property(vocab::NAME)
    }
}

/// Constant payload written by the serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Scalar(Scalar),
    Seq(Vec<DocValue>),
    Map(Vec<(String, DocValue)>),
}

impl DocValue {
    pub fn map(entries: impl IntoIterator<Item = (&'static str, DocValue)>) -> Self {
        DocValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

impl From<Scalar> for DocValue {
    fn from(value: Scalar) -> Self {
        DocValue::Scalar(value)
    }
}

/// Output-side node builder.
pub trait ElementSink: Sized {
    /// A node element tagged `tag`.
    fn node(tag: &str) -> Self;

    /// A fragment; `name` is the element name used by formats that need one.
    fn fragment(name: &str) -> Self;

    fn set_scalar(&mut self, name: &str, value: Scalar);

    /// Wrap a single node under `name`.
    fn set_element(&mut self, name: &str, node: Self);

    fn set_elements(&mut self, name: &str, nodes: Vec<Self>);

    fn set_object(&mut self, name: &str, fragment: Self);

    fn set_objects(&mut self, name: &str, fragments: Vec<Self>);

    fn set_value(&mut self, name: &str, value: DocValue);

    /// Attach a human-readable description of the node.
    fn set_comment(&mut self, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = DocPath::root("expression")
            .child("lambda")
            .child("body")
            .child("add")
            .child("operands")
            .index(1);
        assert_eq!(path.to_string(), "expression/lambda/body/add/operands[1]");
        assert_eq!(DocPath::new().to_string(), "/");
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_scalar_conversions_parse_strings() {
        assert_eq!(bool::from_scalar(&Scalar::Str("true".into())), Some(true));
        assert_eq!(i64::from_scalar(&Scalar::Str(" -42 ".into())), Some(-42));
        assert_eq!(u64::from_scalar(&Scalar::Int(-1)), None);
        assert_eq!(String::from_scalar(&Scalar::Int(1)), None);
        assert!(f64::from_scalar(&Scalar::Str("NaN".into())).unwrap().is_nan());
        assert_eq!(
            f64::from_scalar(&Scalar::Str("-Infinity".into())),
            Some(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_convert_reports_path() {
        let path = DocPath::root("expression").child("lambda");
        let err = bool::convert(&Scalar::Str("maybe".into()), &path, "tailCall").unwrap_err();
        assert_eq!(err.path, path);
        assert!(err.message.contains("tailCall"));
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(f64::INFINITY), "Infinity");
        assert_eq!(parse_float("2.5"), Some(2.5));
    }
}
