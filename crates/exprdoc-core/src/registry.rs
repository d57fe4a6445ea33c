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

//! Closed type and member registry.
//!
//! Documents refer to types by name and to members by declaring type, name
//! and exact parameter signature. The registry is the single source of truth
//! for both lookups:
//!
//! - basic types, nullable wrappers, arrays, delegates, key/value pairs and the
//!   collection families are always known, and their members are synthesized
//!   on demand (`Count`, `Add`, `HasValue`, `Length`, `Invoke`, ...);
//! - a set of framework types (`System.Math`, `System.String` members, the
//!   exception hierarchy, `System.Console`, ...) is registered by
//!   [`TypeRegistry::builtin`];
//! - applications register their own types through [`TypeRegistry::register_type`].
//!
//! Member lookup never selects a near match: parameter types and by-ref
//! flags must match exactly.
//!
//! # Example
//!
//! ```
//! use exprdoc_core::{TypeRegistry, Type, TypeKind};
//!
//! let mut registry = TypeRegistry::new();
//! let point = registry
//!     .register_type("Acme.Point", TypeKind::Struct)
//!     .field("X", Type::int32())
//!     .field("Y", Type::int32())
//!     .build();
//! assert_eq!(registry.resolve_type("Acme.Point").unwrap(), point);
//! assert!(registry.find_field(&point, "X", false, Default::default()).is_some());
//! ```

use crate::collections;
use crate::types::{
    parse_type_name, BasicType, CollectionKind, ConstructorInfo, DelegateKind, EventInfo,
    FieldInfo, MemberInfo, MemberKind, MemberQuery, MethodInfo, ParameterSpec, PropertyInfo,
    Type, TypeDefinition, TypeKind, TypeNameError, Visibility,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A member fragment that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve {kind} '{signature}' on type '{declaring_type}'")]
pub struct ResolveError {
    pub kind: MemberKind,
    pub signature: String,
    pub declaring_type: String,
}

/// Members declared by one type.
#[derive(Debug, Clone, Default)]
pub struct TypeMembers {
    pub constructors: Vec<Arc<ConstructorInfo>>,
    pub methods: Vec<Arc<MethodInfo>>,
    pub properties: Vec<Arc<PropertyInfo>>,
    pub fields: Vec<Arc<FieldInfo>>,
    pub events: Vec<Arc<EventInfo>>,
}

impl TypeMembers {
    fn merge(&mut self, other: TypeMembers) {
        self.constructors.extend(other.constructors);
        self.methods.extend(other.methods);
        self.properties.extend(other.properties);
        self.fields.extend(other.fields);
        self.events.extend(other.events);
    }
}

/// Registry of named types and of the members documents may reference.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Type>,
    members: HashMap<Type, TypeMembers>,
}

static BUILTIN: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(TypeRegistry::with_builtins()));

impl TypeRegistry {
    /// A registry seeded with the built-in framework types.
    pub fn new() -> Self {
        (**BUILTIN).clone()
    }

    /// A registry that knows only the structural types (no framework members).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared instance of the built-in registry.
    pub fn builtin() -> Arc<TypeRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Start registering a new application type.
    #[must_use = "call build() to register the type"]
    pub fn register_type(&mut self, full_name: &str, kind: TypeKind) -> TypeBuilder<'_> {
        TypeBuilder {
            registry: self,
            target: Target::New {
                full_name: full_name.to_string(),
                kind,
                base: None,
            },
            members: Vec::new(),
        }
    }

    /// Add members to a type that already exists (basic or registered).
    #[must_use = "call build() to register the members"]
    pub fn extend_type(&mut self, ty: Type) -> TypeBuilder<'_> {
        TypeBuilder {
            registry: self,
            target: Target::Existing(ty),
            members: Vec::new(),
        }
    }

    /// Look up a registered type by full name.
    pub fn lookup_named(&self, full_name: &str) -> Option<Type> {
        self.types.get(full_name).cloned()
    }

    /// Resolve a type name in either naming convention.
    pub fn resolve_type(&self, name: &str) -> Result<Type, TypeNameError> {
        parse_type_name(name, &|n| self.lookup_named(n))
    }

    /// Registered application types, in no particular order.
    pub fn named_types(&self) -> impl Iterator<Item = &Type> + '_ {
        self.types.values()
    }

    /// Members declared by `ty` itself (registered plus synthesized).
    pub fn members_of(&self, ty: &Type) -> TypeMembers {
        let mut members = synthesized_members(ty);
        if let Some(registered) = self.members.get(ty) {
            members.merge(registered.clone());
        }
        members
    }

    /// `ty` followed by its base types.
    fn hierarchy(ty: &Type) -> impl Iterator<Item = Type> {
        std::iter::successors(Some(ty.clone()), |t| t.base_type())
    }

    pub fn find_constructor(
        &self,
        ty: &Type,
        parameters: &[ParameterSpec],
        visibility: Visibility,
    ) -> Option<Arc<ConstructorInfo>> {
        single(
            self.members_of(ty)
                .constructors
                .into_iter()
                .filter(|c| c.visibility == visibility && c.parameters == parameters),
        )
    }

    /// Walk `ty` and its bases; the first type with any candidate decides.
    ///
    /// An ambiguous match on that type is a failure, never a reason to look
    /// further up the hierarchy.
    fn nearest<T>(&self, ty: &Type, candidates: impl Fn(TypeMembers) -> Vec<T>) -> Option<T> {
        for t in Self::hierarchy(ty) {
            let found = candidates(self.members_of(&t));
            if !found.is_empty() {
                return single(found.into_iter());
            }
        }
        None
    }

    pub fn find_method(
        &self,
        ty: &Type,
        name: &str,
        parameters: &[ParameterSpec],
        is_static: bool,
        visibility: Visibility,
    ) -> Option<Arc<MethodInfo>> {
        self.nearest(ty, |members| {
            members
                .methods
                .into_iter()
                .filter(|m| {
                    m.name == name
                        && m.is_static == is_static
                        && m.visibility == visibility
                        && m.parameters == parameters
                })
                .collect()
        })
    }

    /// Find a property; `property_type` is checked when given.
    pub fn find_property(
        &self,
        ty: &Type,
        name: &str,
        property_type: Option<&Type>,
        index_parameters: &[Type],
        is_static: bool,
        visibility: Visibility,
    ) -> Option<Arc<PropertyInfo>> {
        self.nearest(ty, |members| {
            members
                .properties
                .into_iter()
                .filter(|p| {
                    p.name == name
                        && p.is_static == is_static
                        && p.visibility == visibility
                        && p.index_parameters == index_parameters
                        && property_type.map_or(true, |pt| &p.ty == pt)
                })
                .collect()
        })
    }

    pub fn find_field(
        &self,
        ty: &Type,
        name: &str,
        is_static: bool,
        visibility: Visibility,
    ) -> Option<Arc<FieldInfo>> {
        self.nearest(ty, |members| {
            members
                .fields
                .into_iter()
                .filter(|f| f.name == name && f.is_static == is_static && f.visibility == visibility)
                .collect()
        })
    }

    pub fn find_event(
        &self,
        ty: &Type,
        name: &str,
        is_static: bool,
        visibility: Visibility,
    ) -> Option<Arc<EventInfo>> {
        self.nearest(ty, |members| {
            members
                .events
                .into_iter()
                .filter(|e| e.name == name && e.is_static == is_static && e.visibility == visibility)
                .collect()
        })
    }

    /// Resolve a member fragment to exactly one member.
    pub fn resolve_member(&self, query: &MemberQuery) -> Result<MemberInfo, ResolveError> {
        let ty = &query.declaring_type;
        let name = query.name.as_deref().unwrap_or_default();
        let found = match query.kind {
            MemberKind::Constructor => self
                .find_constructor(ty, &query.parameters, query.visibility)
                .map(MemberInfo::Constructor),
            MemberKind::Method => self
                .find_method(ty, name, &query.parameters, query.is_static, query.visibility)
                .map(MemberInfo::Method),
            MemberKind::Property => self
                .find_property(
                    ty,
                    name,
                    query.property_type.as_ref(),
                    &query.index_parameters,
                    query.is_static,
                    query.visibility,
                )
                .map(MemberInfo::Property),
            MemberKind::Field => self
                .find_field(ty, name, query.is_static, query.visibility)
                .map(MemberInfo::Field),
            MemberKind::Event => self
                .find_event(ty, name, query.is_static, query.visibility)
                .map(MemberInfo::Event),
        };
        found.ok_or_else(|| {
            debug!(kind = %query.kind, signature = %query.signature(), declaring_type = %ty, "member lookup failed");
            ResolveError {
                kind: query.kind,
                signature: query.signature(),
                declaring_type: ty.to_string(),
            }
        })
    }

    fn with_builtins() -> Self {
        let mut registry = Self::empty();
        register_builtins(&mut registry);
        registry
    }
}

fn single<T>(mut candidates: impl Iterator<Item = T>) -> Option<T> {
    let first = candidates.next()?;
    match candidates.next() {
        Some(_) => None,
        None => Some(first),
    }
}

enum Target {
    New {
        full_name: String,
        kind: TypeKind,
        base: Option<Type>,
    },
    Existing(Type),
}

enum PendingMember {
    Constructor(Vec<ParameterSpec>, Visibility),
    Method {
        name: String,
        parameters: Vec<ParameterSpec>,
        return_type: Type,
        is_static: bool,
        visibility: Visibility,
    },
    Property {
        name: String,
        ty: Type,
        index_parameters: Vec<Type>,
        is_static: bool,
        can_write: bool,
    },
    Field {
        name: String,
        ty: Type,
        is_static: bool,
        is_read_only: bool,
        visibility: Visibility,
    },
    Event {
        name: String,
        handler_type: Type,
    },
}

/// Fluent registration of a type and its members.
pub struct TypeBuilder<'r> {
    registry: &'r mut TypeRegistry,
    target: Target,
    members: Vec<PendingMember>,
}

fn specs<P: Into<ParameterSpec>>(parameters: impl IntoIterator<Item = P>) -> Vec<ParameterSpec> {
    parameters.into_iter().map(Into::into).collect()
}

impl<'r> TypeBuilder<'r> {
    /// Set the base type of a new type.
    pub fn base(mut self, base: Type) -> Self {
        if let Target::New { base: b, .. } = &mut self.target {
            *b = Some(base);
        }
        self
    }

    pub fn constructor<P: Into<ParameterSpec>>(
        mut self,
        parameters: impl IntoIterator<Item = P>,
    ) -> Self {
        self.members
            .push(PendingMember::Constructor(specs(parameters), Visibility::Public));
        self
    }

    fn push_method<P: Into<ParameterSpec>>(
        mut self,
        name: &str,
        parameters: impl IntoIterator<Item = P>,
        return_type: Type,
        is_static: bool,
        visibility: Visibility,
    ) -> Self {
        self.members.push(PendingMember::Method {
            name: name.to_string(),
            parameters: specs(parameters),
            return_type,
            is_static,
            visibility,
        });
        self
    }

    pub fn method<P: Into<ParameterSpec>>(
        self,
        name: &str,
        parameters: impl IntoIterator<Item = P>,
        return_type: Type,
    ) -> Self {
        self.push_method(name, parameters, return_type, false, Visibility::Public)
    }

    pub fn static_method<P: Into<ParameterSpec>>(
        self,
        name: &str,
        parameters: impl IntoIterator<Item = P>,
        return_type: Type,
    ) -> Self {
        self.push_method(name, parameters, return_type, true, Visibility::Public)
    }

    pub fn non_public_method<P: Into<ParameterSpec>>(
        self,
        name: &str,
        parameters: impl IntoIterator<Item = P>,
        return_type: Type,
    ) -> Self {
        self.push_method(name, parameters, return_type, false, Visibility::NonPublic)
    }

    fn push_property(mut self, name: &str, ty: Type, is_static: bool, can_write: bool) -> Self {
        self.members.push(PendingMember::Property {
            name: name.to_string(),
            ty,
            index_parameters: Vec::new(),
            is_static,
            can_write,
        });
        self
    }

    /// Read/write instance property.
    pub fn property(self, name: &str, ty: Type) -> Self {
        self.push_property(name, ty, false, true)
    }

    pub fn readonly_property(self, name: &str, ty: Type) -> Self {
        self.push_property(name, ty, false, false)
    }

    pub fn static_property(self, name: &str, ty: Type) -> Self {
        self.push_property(name, ty, true, false)
    }

    /// Read/write indexer named `Item`.
    pub fn indexer(mut self, ty: Type, index_parameters: Vec<Type>) -> Self {
        self.members.push(PendingMember::Property {
            name: "Item".to_string(),
            ty,
            index_parameters,
            is_static: false,
            can_write: true,
        });
        self
    }

    pub fn readonly_indexer(mut self, name: &str, ty: Type, index_parameters: Vec<Type>) -> Self {
        self.members.push(PendingMember::Property {
            name: name.to_string(),
            ty,
            index_parameters,
            is_static: false,
            can_write: false,
        });
        self
    }

    fn push_field(
        mut self,
        name: &str,
        ty: Type,
        is_static: bool,
        is_read_only: bool,
        visibility: Visibility,
    ) -> Self {
        self.members.push(PendingMember::Field {
            name: name.to_string(),
            ty,
            is_static,
            is_read_only,
            visibility,
        });
        self
    }

    pub fn field(self, name: &str, ty: Type) -> Self {
        self.push_field(name, ty, false, false, Visibility::Public)
    }

    pub fn readonly_field(self, name: &str, ty: Type) -> Self {
        self.push_field(name, ty, false, true, Visibility::Public)
    }

    pub fn private_field(self, name: &str, ty: Type) -> Self {
        self.push_field(name, ty, false, false, Visibility::NonPublic)
    }

    /// Static read-only field (constants included).
    pub fn static_field(self, name: &str, ty: Type) -> Self {
        self.push_field(name, ty, true, true, Visibility::Public)
    }

    pub fn event(mut self, name: &str, handler_type: Type) -> Self {
        self.members.push(PendingMember::Event {
            name: name.to_string(),
            handler_type,
        });
        self
    }

    /// Register the type and its members; returns the type handle.
    pub fn build(self) -> Type {
        let ty = match self.target {
            Target::New {
                full_name,
                kind,
                base,
            } => {
                let ty = Type::Named(Arc::new(TypeDefinition::new(full_name.clone(), kind, base)));
                self.registry.types.insert(full_name, ty.clone());
                ty
            }
            Target::Existing(ty) => ty,
        };
        debug!(ty = %ty, members = self.members.len(), "registering type");
        let entry = self.registry.members.entry(ty.clone()).or_default();
        for member in self.members {
            match member {
                PendingMember::Constructor(parameters, visibility) => {
                    entry.constructors.push(Arc::new(ConstructorInfo {
                        declaring_type: ty.clone(),
                        parameters,
                        visibility,
                    }))
                }
                PendingMember::Method {
                    name,
                    parameters,
                    return_type,
                    is_static,
                    visibility,
                } => entry.methods.push(Arc::new(MethodInfo {
                    declaring_type: ty.clone(),
                    name,
                    parameters,
                    return_type,
                    is_static,
                    visibility,
                })),
                PendingMember::Property {
                    name,
                    ty: property_type,
                    index_parameters,
                    is_static,
                    can_write,
                } => entry.properties.push(Arc::new(PropertyInfo {
                    declaring_type: ty.clone(),
                    name,
                    ty: property_type,
                    index_parameters,
                    is_static,
                    can_write,
                    visibility: Visibility::Public,
                })),
                PendingMember::Field {
                    name,
                    ty: field_type,
                    is_static,
                    is_read_only,
                    visibility,
                } => entry.fields.push(Arc::new(FieldInfo {
                    declaring_type: ty.clone(),
                    name,
                    ty: field_type,
                    is_static,
                    is_read_only,
                    visibility,
                })),
                PendingMember::Event { name, handler_type } => {
                    entry.events.push(Arc::new(EventInfo {
                        declaring_type: ty.clone(),
                        name,
                        handler_type,
                        is_static: false,
                        visibility: Visibility::Public,
                    }))
                }
            }
        }
        ty
    }
}

/// Small helper for synthesizing members of structural types.
struct Synth<'a> {
    ty: &'a Type,
    members: TypeMembers,
}

impl<'a> Synth<'a> {
    fn new(ty: &'a Type) -> Self {
        Self {
            ty,
            members: TypeMembers::default(),
        }
    }

    fn ctor(&mut self, parameters: Vec<Type>) {
        self.members.constructors.push(Arc::new(ConstructorInfo {
            declaring_type: self.ty.clone(),
            parameters: specs(parameters),
            visibility: Visibility::Public,
        }));
    }

    fn method(&mut self, name: &str, parameters: Vec<Type>, return_type: Type) {
        self.members.methods.push(Arc::new(MethodInfo {
            declaring_type: self.ty.clone(),
            name: name.to_string(),
            parameters: specs(parameters),
            return_type,
            is_static: false,
            visibility: Visibility::Public,
        }));
    }

    fn property(&mut self, name: &str, ty: Type, index_parameters: Vec<Type>, can_write: bool) {
        self.members.properties.push(Arc::new(PropertyInfo {
            declaring_type: self.ty.clone(),
            name: name.to_string(),
            ty,
            index_parameters,
            is_static: false,
            can_write,
            visibility: Visibility::Public,
        }));
    }
}

fn synthesized_members(ty: &Type) -> TypeMembers {
    let mut s = Synth::new(ty);
    match ty {
        Type::Nullable(inner) => {
            let inner = (**inner).clone();
            s.ctor(vec![inner.clone()]);
            s.property("HasValue", Type::boolean(), vec![], false);
            s.property("Value", inner.clone(), vec![], false);
            s.method("GetValueOrDefault", vec![], inner);
        }
        Type::Array(_) => {
            s.property("Length", Type::int32(), vec![], false);
        }
        Type::KeyValuePair(k, v) => {
            s.ctor(vec![(**k).clone(), (**v).clone()]);
            s.property("Key", (**k).clone(), vec![], false);
            s.property("Value", (**v).clone(), vec![], false);
        }
        Type::Delegate(kind, args) => {
            let (parameters, ret) = match kind {
                DelegateKind::Func => match args.split_last() {
                    Some((ret, params)) => (params.to_vec(), ret.clone()),
                    None => (Vec::new(), Type::void()),
                },
                DelegateKind::Action => (args.clone(), Type::void()),
            };
            s.method("Invoke", parameters, ret);
        }
        Type::Collection(kind, _) => {
            if let Some(element) = ty.element_type() {
                collection_members(&mut s, *kind, &element);
            }
        }
        Type::Basic(_) | Type::ByRef(_) | Type::Named(_) => {}
    }
    s.members
}

fn collection_members(s: &mut Synth<'_>, kind: CollectionKind, element: &Type) {
    for shape in collections::constructor_shapes(kind) {
        match shape {
            None => s.ctor(vec![]),
            Some(shape) => s.ctor(vec![shape.parameter_type(element)]),
        }
    }
    if kind == CollectionKind::Enumerable {
        return;
    }
    s.property("Count", Type::int32(), vec![], false);
    s.method("Contains", vec![element.clone()], Type::boolean());

    let keyed_add_returns_bool = matches!(
        kind,
        CollectionKind::HashSet | CollectionKind::SortedSet | CollectionKind::ConcurrentDictionary
    );
    if let Some(adder) = collections::adder_name(kind) {
        let ret = if keyed_add_returns_bool {
            Type::boolean()
        } else {
            Type::void()
        };
        s.method(adder, vec![element.clone()], ret);
    }

    if let (true, Type::KeyValuePair(k, v)) = (kind.is_dictionary(), element) {
        let (k, v) = ((**k).clone(), (**v).clone());
        s.property("Item", v.clone(), vec![k.clone()], true);
        s.method("ContainsKey", vec![k.clone()], Type::boolean());
        if collections::adder_name(kind).is_some() && kind != CollectionKind::ConcurrentDictionary
        {
            s.method("Add", vec![k.clone(), v.clone()], Type::void());
        }
        if kind == CollectionKind::ConcurrentDictionary {
            s.method("TryAdd", vec![k, v], Type::boolean());
        }
        return;
    }

    match kind {
        CollectionKind::List
        | CollectionKind::Collection
        | CollectionKind::ObservableCollection => {
            s.property("Item", element.clone(), vec![Type::int32()], true);
            s.method("IndexOf", vec![element.clone()], Type::int32());
            s.method("Clear", vec![], Type::void());
        }
        CollectionKind::ReadOnlyCollection
        | CollectionKind::ImmutableArray
        | CollectionKind::ImmutableList => {
            s.property("Item", element.clone(), vec![Type::int32()], false);
        }
        CollectionKind::Queue | CollectionKind::ConcurrentQueue => {
            s.method("Peek", vec![], element.clone());
            if kind == CollectionKind::Queue {
                s.method("Dequeue", vec![], element.clone());
            }
        }
        CollectionKind::Stack | CollectionKind::ConcurrentStack => {
            s.method("Peek", vec![], element.clone());
            if kind == CollectionKind::Stack {
                s.method("Pop", vec![], element.clone());
            }
        }
        _ => {}
    }
}

fn register_builtins(registry: &mut TypeRegistry) {
    use BasicType as B;

    let int = Type::int32;
    let double = Type::double;
    let string = Type::string;
    let boolean = Type::boolean;
    let object = Type::object;
    let void = Type::void;
    let none: [Type; 0] = [];

    let _ = registry
        .extend_type(object())
        .constructor(none.clone())
        .method("ToString", none.clone(), string())
        .method("GetHashCode", none.clone(), int())
        .method("Equals", [object()], boolean())
        .static_method("ReferenceEquals", [object(), object()], boolean())
        .build();

    let _ = registry
        .extend_type(string())
        .readonly_property("Length", int())
        .readonly_indexer("Chars", Type::Basic(B::Char), vec![int()])
        .static_field("Empty", string())
        .method("Substring", [int()], string())
        .method("Substring", [int(), int()], string())
        .method("ToUpper", none.clone(), string())
        .method("ToLower", none.clone(), string())
        .method("Trim", none.clone(), string())
        .method("Contains", [string()], boolean())
        .method("StartsWith", [string()], boolean())
        .method("EndsWith", [string()], boolean())
        .method("IndexOf", [Type::Basic(B::Char)], int())
        .method("IndexOf", [string()], int())
        .method("Replace", [string(), string()], string())
        .method("ToString", none.clone(), string())
        .static_method("Concat", [string(), string()], string())
        .static_method("Concat", [string(), string(), string()], string())
        .static_method("Concat", [object(), object()], string())
        .static_method("IsNullOrEmpty", [string()], boolean())
        .static_method("Equals", [string(), string()], boolean())
        .static_method("Format", [string(), object()], string())
        .static_method("op_Equality", [string(), string()], boolean())
        .static_method("op_Inequality", [string(), string()], boolean())
        .build();
    for (basic, parse_name) in [
        (B::Int32, "Parse"),
        (B::Int64, "Parse"),
        (B::Double, "Parse"),
        (B::Boolean, "Parse"),
        (B::Decimal, "Parse"),
    ] {
        let ty = Type::Basic(basic);
        let mut builder = registry
            .extend_type(ty.clone())
            .static_method(parse_name, [string()], ty.clone())
            .method("ToString", none.clone(), string())
            .method("CompareTo", [ty.clone()], int());
        if basic.is_numeric() {
            builder = builder
                .static_field("MaxValue", ty.clone())
                .static_field("MinValue", ty.clone());
        }
        let _ = builder.build();
    }

    let _ = registry
        .extend_type(double())
        .static_field("NaN", double())
        .static_field("PositiveInfinity", double())
        .static_field("NegativeInfinity", double())
        .static_field("Epsilon", double())
        .static_method("IsNaN", [double()], boolean())
        .build();

    let decimal = Type::Basic(B::Decimal);
    let _ = registry
        .extend_type(decimal.clone())
        .static_method("op_Addition", [decimal.clone(), decimal.clone()], decimal.clone())
        .static_method("op_Subtraction", [decimal.clone(), decimal.clone()], decimal.clone())
        .static_method("op_Multiply", [decimal.clone(), decimal.clone()], decimal.clone())
        .static_method("op_Division", [decimal.clone(), decimal.clone()], decimal.clone())
        .static_method("op_UnaryNegation", [decimal.clone()], decimal.clone())
        .build();

    let date_time = Type::Basic(B::DateTime);
    let time_span = Type::Basic(B::TimeSpan);
    let _ = registry
        .extend_type(date_time.clone())
        .constructor([int(), int(), int()])
        .static_property("Now", date_time.clone())
        .static_property("Today", date_time.clone())
        .readonly_property("Year", int())
        .readonly_property("Month", int())
        .readonly_property("Day", int())
        .method("AddDays", [double()], date_time.clone())
        .static_method("op_Subtraction", [date_time.clone(), date_time.clone()], time_span.clone())
        .static_method("op_Addition", [date_time.clone(), time_span.clone()], date_time.clone())
        .static_method("op_LessThan", [date_time.clone(), date_time.clone()], boolean())
        .static_method("op_GreaterThan", [date_time.clone(), date_time.clone()], boolean())
        .static_method("op_Equality", [date_time.clone(), date_time.clone()], boolean())
        .build();
    let _ = registry
        .extend_type(time_span.clone())
        .static_field("Zero", time_span.clone())
        .static_method("FromSeconds", [double()], time_span.clone())
        .readonly_property("TotalSeconds", double())
        .static_method("op_Addition", [time_span.clone(), time_span.clone()], time_span.clone())
        .static_method("op_UnaryNegation", [time_span.clone()], time_span.clone())
        .build();
    let _ = registry
        .extend_type(Type::Basic(B::Guid))
        .static_method("NewGuid", none.clone(), Type::Basic(B::Guid))
        .static_field("Empty", Type::Basic(B::Guid))
        .build();
    let _ = registry
        .extend_type(Type::Basic(B::Uri))
        .constructor([string()])
        .readonly_property("Host", string())
        .build();

    let _ = registry
        .register_type("System.Math", TypeKind::StaticClass)
        .static_field("PI", double())
        .static_field("E", double())
        .static_method("Abs", [int()], int())
        .static_method("Abs", [double()], double())
        .static_method("Max", [int(), int()], int())
        .static_method("Max", [double(), double()], double())
        .static_method("Min", [int(), int()], int())
        .static_method("Min", [double(), double()], double())
        .static_method("Pow", [double(), double()], double())
        .static_method("Sqrt", [double()], double())
        .static_method("Floor", [double()], double())
        .static_method("Ceiling", [double()], double())
        .static_method("Round", [double()], double())
        .build();

    let _ = registry
        .register_type("System.Console", TypeKind::StaticClass)
        .static_method("WriteLine", none.clone(), void())
        .static_method("WriteLine", [string()], void())
        .static_method("WriteLine", [object()], void())
        .static_method("WriteLine", [int()], void())
        .static_method("Write", [string()], void())
        .build();

    let _ = registry
        .register_type("System.EventHandler", TypeKind::Class)
        .method("Invoke", [object(), object()], void())
        .build();

    let exception = registry
        .register_type("System.Exception", TypeKind::Class)
        .constructor(none.clone())
        .constructor([string()])
        .readonly_property("Message", string())
        .build();
    let _ = registry
        .extend_type(exception.clone())
        .readonly_property("InnerException", exception.clone())
        .build();

    let system = derived_exception(registry, "System.SystemException", &exception);
    let arithmetic = derived_exception(registry, "System.ArithmeticException", &system);
    let argument = derived_exception(registry, "System.ArgumentException", &system);
    for name in [
        "System.InvalidOperationException",
        "System.NotSupportedException",
        "System.IndexOutOfRangeException",
        "System.FormatException",
        "System.NullReferenceException",
        "System.InvalidCastException",
    ] {
        derived_exception(registry, name, &system);
    }
    derived_exception(registry, "System.DivideByZeroException", &arithmetic);
    derived_exception(registry, "System.OverflowException", &arithmetic);
    derived_exception(registry, "System.ArgumentNullException", &argument);
    derived_exception(registry, "System.ArgumentOutOfRangeException", &argument);
}

fn derived_exception(registry: &mut TypeRegistry, name: &str, base: &Type) -> Type {
    registry
        .register_type(name, TypeKind::Class)
        .base(base.clone())
        .constructor(Vec::<Type>::new())
        .constructor([Type::string()])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> (TypeRegistry, Type) {
        let mut registry = TypeRegistry::new();
        let sample = registry
            .register_type("Acme.Sample", TypeKind::Class)
            .constructor(Vec::<Type>::new())
            .method("Method3", [Type::int32(), Type::int32()], Type::int32())
            .method("Swap", [ParameterSpec::by_ref(Type::int32())], Type::void())
            .property("Name", Type::string())
            .field("Count", Type::int32())
            .event("Changed", Type::string())
            .build();
        (registry, sample)
    }

    #[test]
    fn test_exact_overload_required() {
        let (registry, sample) = sample_registry();
        let query = MemberQuery::new(sample.clone(), MemberKind::Method)
            .named("Method3")
            .with_parameters(vec![Type::int32().into(), Type::double().into()]);
        let err = registry.resolve_member(&query).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not resolve method 'Method3(int, double)' on type 'Acme.Sample'"
        );

        let query = query.with_parameters(vec![Type::int32().into(), Type::int32().into()]);
        let member = registry.resolve_member(&query).unwrap();
        assert_eq!(member.kind(), MemberKind::Method);
    }

    #[test]
    fn test_by_ref_flag_must_match() {
        let (registry, sample) = sample_registry();
        assert!(registry
            .find_method(&sample, "Swap", &[Type::int32().into()], false, Visibility::Public)
            .is_none());
        assert!(registry
            .find_method(
                &sample,
                "Swap",
                &[ParameterSpec::by_ref(Type::int32())],
                false,
                Visibility::Public
            )
            .is_some());
    }

    #[test]
    fn test_static_and_visibility_flags() {
        let registry = TypeRegistry::new();
        let math = registry.resolve_type("System.Math").unwrap();
        let max = [Type::int32().into(), Type::int32().into()];
        assert!(registry
            .find_method(&math, "Max", &max, true, Visibility::Public)
            .is_some());
        assert!(registry
            .find_method(&math, "Max", &max, false, Visibility::Public)
            .is_none());
        assert!(registry
            .find_method(&math, "Max", &max, true, Visibility::NonPublic)
            .is_none());
    }

    #[test]
    fn test_inherited_members_resolve() {
        let registry = TypeRegistry::new();
        let argument = registry.resolve_type("System.ArgumentException").unwrap();
        let message = registry
            .find_property(&argument, "Message", None, &[], false, Visibility::Public)
            .unwrap();
        assert_eq!(message.declaring_type.to_string(), "System.Exception");
        // constructors are not inherited
        assert!(registry
            .find_constructor(&argument, &[Type::string().into()], Visibility::Public)
            .is_some());
    }

    #[test]
    fn test_ambiguous_derived_member_does_not_fall_back_to_base() {
        let mut registry = TypeRegistry::new();
        let shape = registry
            .register_type("Acme.Shape", TypeKind::Class)
            .property("Size", Type::int32())
            .field("Tag", Type::string())
            .build();
        let boxed = registry
            .register_type("Acme.Box", TypeKind::Class)
            .base(shape.clone())
            .property("Size", Type::int32())
            .property("Size", Type::int64())
            .build();

        assert!(registry
            .find_property(&boxed, "Size", None, &[], false, Visibility::Public)
            .is_none());
        let size = registry
            .find_property(&boxed, "Size", Some(&Type::int64()), &[], false, Visibility::Public)
            .unwrap();
        assert_eq!(size.declaring_type, boxed);
        let size = registry
            .find_property(&shape, "Size", None, &[], false, Visibility::Public)
            .unwrap();
        assert_eq!(size.declaring_type, shape);

        // nothing named Tag on Box, so the base still answers
        let tag = registry.find_field(&boxed, "Tag", false, Visibility::Public).unwrap();
        assert_eq!(tag.declaring_type, shape);
    }

    #[test]
    fn test_synthesized_collection_members() {
        let registry = TypeRegistry::empty();
        let list = Type::list(Type::int32());
        assert!(registry
            .find_property(&list, "Count", Some(&Type::int32()), &[], false, Visibility::Public)
            .is_some());
        let item = registry
            .find_property(&list, "Item", None, &[Type::int32()], false, Visibility::Public)
            .unwrap();
        assert!(item.can_write);
        assert!(registry
            .find_constructor(
                &list,
                &[Type::enumerable(Type::int32()).into()],
                Visibility::Public
            )
            .is_some());
        let blocking = Type::collection(CollectionKind::BlockingCollection, vec![Type::int32()]);
        assert!(registry
            .find_constructor(
                &blocking,
                &[Type::enumerable(Type::int32()).into()],
                Visibility::Public
            )
            .is_none());
    }

    #[test]
    fn test_nullable_and_delegate_members() {
        let registry = TypeRegistry::empty();
        let nullable = Type::nullable(Type::int32());
        assert!(registry
            .find_property(&nullable, "HasValue", None, &[], false, Visibility::Public)
            .is_some());
        let f = Type::func(vec![Type::int32()], Type::string());
        let invoke = registry
            .find_method(&f, "Invoke", &[Type::int32().into()], false, Visibility::Public)
            .unwrap();
        assert_eq!(invoke.return_type, Type::string());
    }

    #[test]
    fn test_field_and_event_by_name() {
        let (registry, sample) = sample_registry();
        let q = MemberQuery::new(sample.clone(), MemberKind::Field).named("Count");
        assert!(matches!(registry.resolve_member(&q), Ok(MemberInfo::Field(_))));
        let q = MemberQuery::new(sample, MemberKind::Event).named("Changed");
        assert!(matches!(registry.resolve_member(&q), Ok(MemberInfo::Event(_))));
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = TypeRegistry::builtin();
        let b = TypeRegistry::builtin();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.lookup_named("System.Exception").is_some());
        assert!(TypeRegistry::empty().lookup_named("System.Exception").is_none());
    }
}
