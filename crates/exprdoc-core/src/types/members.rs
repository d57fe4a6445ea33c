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

//! Member handles: constructors, methods, properties, fields and events.

use super::Type;
use crate::config::TypeNameConvention;
use crate::vocabulary as vocab;
use std::fmt;
use std::sync::Arc;

/// Accessibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    NonPublic,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => vocab::PUBLIC,
            Visibility::NonPublic => vocab::NON_PUBLIC,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            vocab::PUBLIC | "Public" => Some(Visibility::Public),
            vocab::NON_PUBLIC | "NonPublic" => Some(Visibility::NonPublic),
            _ => None,
        }
    }
}

/// One formal parameter of a method or constructor.
///
/// `ty` never is a [`Type::ByRef`]; by-ref parameters set `by_ref` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSpec {
    pub ty: Type,
    pub by_ref: bool,
}

impl ParameterSpec {
    pub fn new(ty: Type) -> Self {
        match ty {
            Type::ByRef(inner) => Self {
                ty: *inner,
                by_ref: true,
            },
            ty => Self { ty, by_ref: false },
        }
    }

    pub fn by_ref(ty: Type) -> Self {
        Self {
            ty: ty.non_ref().clone(),
            by_ref: true,
        }
    }

    /// The parameter type as seen by an argument expression.
    pub fn argument_type(&self) -> &Type {
        &self.ty
    }
}

impl From<Type> for ParameterSpec {
    fn from(ty: Type) -> Self {
        ParameterSpec::new(ty)
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_ref {
            write!(f, "ref {}", self.ty)
        } else {
            write!(f, "{}", self.ty)
        }
    }
}

fn write_parameters(f: &mut fmt::Formatter<'_>, parameters: &[ParameterSpec]) -> fmt::Result {
    f.write_str("(")?;
    for (i, p) in parameters.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", p)?;
    }
    f.write_str(")")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorInfo {
    pub declaring_type: Type,
    pub parameters: Vec<ParameterSpec>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub declaring_type: Type,
    pub name: String,
    pub parameters: Vec<ParameterSpec>,
    pub return_type: Type,
    pub is_static: bool,
    pub visibility: Visibility,
}

impl MethodInfo {
    pub fn parameter_types(&self) -> impl Iterator<Item = &Type> + '_ {
        self.parameters.iter().map(|p| &p.ty)
    }
}

/// A property; indexers carry their index parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub declaring_type: Type,
    pub name: String,
    pub ty: Type,
    pub index_parameters: Vec<Type>,
    pub is_static: bool,
    pub can_write: bool,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub declaring_type: Type,
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub is_read_only: bool,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    pub declaring_type: Type,
    pub name: String,
    pub handler_type: Type,
    pub is_static: bool,
    pub visibility: Visibility,
}

/// Discriminant of [`MemberInfo`], also the fragment `kind` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Constructor,
    Method,
    Property,
    Field,
    Event,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Constructor => vocab::CONSTRUCTOR,
            MemberKind::Method => vocab::METHOD,
            MemberKind::Property => vocab::PROPERTY,
            MemberKind::Field => vocab::FIELD,
            MemberKind::Event => vocab::EVENT,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            vocab::CONSTRUCTOR => Some(MemberKind::Constructor),
            vocab::METHOD => Some(MemberKind::Method),
            vocab::PROPERTY => Some(MemberKind::Property),
            vocab::FIELD => Some(MemberKind::Field),
            vocab::EVENT => Some(MemberKind::Event),
            _ => None,
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved member handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberInfo {
    Constructor(Arc<ConstructorInfo>),
    Method(Arc<MethodInfo>),
    Property(Arc<PropertyInfo>),
    Field(Arc<FieldInfo>),
    Event(Arc<EventInfo>),
}

impl MemberInfo {
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberInfo::Constructor(_) => MemberKind::Constructor,
            MemberInfo::Method(_) => MemberKind::Method,
            MemberInfo::Property(_) => MemberKind::Property,
            MemberInfo::Field(_) => MemberKind::Field,
            MemberInfo::Event(_) => MemberKind::Event,
        }
    }

    pub fn declaring_type(&self) -> &Type {
        match self {
            MemberInfo::Constructor(c) => &c.declaring_type,
            MemberInfo::Method(m) => &m.declaring_type,
            MemberInfo::Property(p) => &p.declaring_type,
            MemberInfo::Field(f) => &f.declaring_type,
            MemberInfo::Event(e) => &e.declaring_type,
        }
    }

    /// Member name; constructors are named `.ctor`.
    pub fn name(&self) -> &str {
        match self {
            MemberInfo::Constructor(_) => ".ctor",
            MemberInfo::Method(m) => &m.name,
            MemberInfo::Property(p) => &p.name,
            MemberInfo::Field(f) => &f.name,
            MemberInfo::Event(e) => &e.name,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            MemberInfo::Constructor(_) => false,
            MemberInfo::Method(m) => m.is_static,
            MemberInfo::Property(p) => p.is_static,
            MemberInfo::Field(f) => f.is_static,
            MemberInfo::Event(e) => e.is_static,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            MemberInfo::Constructor(c) => c.visibility,
            MemberInfo::Method(m) => m.visibility,
            MemberInfo::Property(p) => p.visibility,
            MemberInfo::Field(f) => f.visibility,
            MemberInfo::Event(e) => e.visibility,
        }
    }

    /// Value type of a property or field access.
    pub fn value_type(&self) -> Option<&Type> {
        match self {
            MemberInfo::Property(p) => Some(&p.ty),
            MemberInfo::Field(f) => Some(&f.ty),
            _ => None,
        }
    }
}

impl fmt::Display for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.ctor", self.declaring_type)?;
        write_parameters(f, &self.parameters)
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.return_type,
            self.declaring_type.name(TypeNameConvention::Short),
            self.name
        )?;
        write_parameters(f, &self.parameters)
    }
}

impl fmt::Display for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberInfo::Constructor(c) => write!(f, "{}", c),
            MemberInfo::Method(m) => write!(f, "{}", m),
            MemberInfo::Property(p) if !p.index_parameters.is_empty() => {
                write!(f, "{} {}.{}[", p.ty, p.declaring_type, p.name)?;
                for (i, t) in p.index_parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                f.write_str("]")
            }
            MemberInfo::Property(p) => write!(f, "{} {}.{}", p.ty, p.declaring_type, p.name),
            MemberInfo::Field(x) => write!(f, "{} {}.{}", x.ty, x.declaring_type, x.name),
            MemberInfo::Event(e) => write!(f, "event {} {}.{}", e.handler_type, e.declaring_type, e.name),
        }
    }
}

/// A member lookup request, as read from a member fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberQuery {
    pub declaring_type: Type,
    pub kind: MemberKind,
    pub name: Option<String>,
    pub is_static: bool,
    pub visibility: Visibility,
    pub parameters: Vec<ParameterSpec>,
    /// Property type, when the fragment records it.
    pub property_type: Option<Type>,
    pub index_parameters: Vec<Type>,
}

impl MemberQuery {
    pub fn new(declaring_type: Type, kind: MemberKind) -> Self {
        Self {
            declaring_type,
            kind,
            name: None,
            is_static: false,
            visibility: Visibility::Public,
            parameters: Vec::new(),
            property_type: None,
            index_parameters: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterSpec>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Readable signature of the requested member, used in error messages.
    pub fn signature(&self) -> String {
        let name = self.name.as_deref().unwrap_or(".ctor");
        match self.kind {
            MemberKind::Constructor | MemberKind::Method => {
                let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
                format!("{}({})", name, params.join(", "))
            }
            MemberKind::Property if !self.index_parameters.is_empty() => {
                let params: Vec<String> =
                    self.index_parameters.iter().map(|p| p.to_string()).collect();
                format!("{}[{}]", name, params.join(", "))
            }
            _ => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_spec_unwraps_by_ref() {
        let spec = ParameterSpec::new(Type::by_ref(Type::int32()));
        assert!(spec.by_ref);
        assert_eq!(spec.ty, Type::int32());
        assert_eq!(spec.to_string(), "ref int");
    }

    #[test]
    fn test_member_kind_tags() {
        for kind in [
            MemberKind::Constructor,
            MemberKind::Method,
            MemberKind::Property,
            MemberKind::Field,
            MemberKind::Event,
        ] {
            assert_eq!(MemberKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MemberKind::parse("indexer"), None);
    }

    #[test]
    fn test_query_signature() {
        let query = MemberQuery::new(Type::string(), MemberKind::Method)
            .named("Method3")
            .with_parameters(vec![Type::int32().into(), Type::double().into()]);
        assert_eq!(query.signature(), "Method3(int, double)");
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!(Visibility::parse("nonPublic"), Some(Visibility::NonPublic));
        assert_eq!(Visibility::parse("Public"), Some(Visibility::Public));
        assert_eq!(Visibility::parse("internal"), None);
    }
}
