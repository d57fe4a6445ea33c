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

//! The closed host type model.
//!
//! Expression nodes carry a [`Type`] for their result. The model covers the
//! basic types, nullable wrappers, single-dimensional arrays, by-ref types,
//! the generic collection families, key/value pairs, `Func`/`Action`
//! delegates and application types registered in a
//! [`TypeRegistry`](crate::TypeRegistry).

mod members;
mod names;

pub use members::{
    ConstructorInfo, EventInfo, FieldInfo, MemberInfo, MemberKind, MemberQuery, MethodInfo,
    ParameterSpec, PropertyInfo, Visibility,
};
pub use names::{format_type_name, parse_type_name, TypeNameError};

use crate::config::TypeNameConvention;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Primitive and well-known framework types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BasicType {
    Void,
    Object,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Guid,
    Uri,
}

impl BasicType {
    /// Every basic type, in declaration order.
    pub const ALL: [BasicType; 21] = [
        BasicType::Void,
        BasicType::Object,
        BasicType::Boolean,
        BasicType::Char,
        BasicType::SByte,
        BasicType::Byte,
        BasicType::Int16,
        BasicType::UInt16,
        BasicType::Int32,
        BasicType::UInt32,
        BasicType::Int64,
        BasicType::UInt64,
        BasicType::Single,
        BasicType::Double,
        BasicType::Decimal,
        BasicType::String,
        BasicType::DateTime,
        BasicType::DateTimeOffset,
        BasicType::TimeSpan,
        BasicType::Guid,
        BasicType::Uri,
    ];

    /// C#-style alias (`int`, `string`, ...) or the simple name when no alias exists.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Object => "object",
            Self::Boolean => "bool",
            Self::Char => "char",
            Self::SByte => "sbyte",
            Self::Byte => "byte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Single => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::TimeSpan => "TimeSpan",
            Self::Guid => "Guid",
            Self::Uri => "Uri",
        }
    }

    /// Namespace-qualified framework name.
    pub fn full_name(self) -> &'static str {
        match self {
            Self::Void => "System.Void",
            Self::Object => "System.Object",
            Self::Boolean => "System.Boolean",
            Self::Char => "System.Char",
            Self::SByte => "System.SByte",
            Self::Byte => "System.Byte",
            Self::Int16 => "System.Int16",
            Self::UInt16 => "System.UInt16",
            Self::Int32 => "System.Int32",
            Self::UInt32 => "System.UInt32",
            Self::Int64 => "System.Int64",
            Self::UInt64 => "System.UInt64",
            Self::Single => "System.Single",
            Self::Double => "System.Double",
            Self::Decimal => "System.Decimal",
            Self::String => "System.String",
            Self::DateTime => "System.DateTime",
            Self::DateTimeOffset => "System.DateTimeOffset",
            Self::TimeSpan => "System.TimeSpan",
            Self::Guid => "System.Guid",
            Self::Uri => "System.Uri",
        }
    }

    pub fn is_value_type(self) -> bool {
        !matches!(self, Self::Void | Self::Object | Self::String | Self::Uri)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, Self::Single | Self::Double)
    }

    /// Integral, floating point or decimal.
    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating() || self == Self::Decimal
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::Byte | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }
}

/// Generic collection families known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    /// `IEnumerable<T>`; usable as a parameter type, never reconstructed.
    Enumerable,
    List,
    LinkedList,
    Collection,
    ObservableCollection,
    ReadOnlyCollection,
    HashSet,
    SortedSet,
    Queue,
    Stack,
    ConcurrentQueue,
    ConcurrentStack,
    ConcurrentBag,
    BlockingCollection,
    ImmutableArray,
    ImmutableList,
    ImmutableHashSet,
    ImmutableSortedSet,
    ImmutableQueue,
    ImmutableStack,
    FrozenSet,
    Dictionary,
    SortedDictionary,
    SortedList,
    ConcurrentDictionary,
    ImmutableDictionary,
    FrozenDictionary,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 27] = [
        CollectionKind::Enumerable,
        CollectionKind::List,
        CollectionKind::LinkedList,
        CollectionKind::Collection,
        CollectionKind::ObservableCollection,
        CollectionKind::ReadOnlyCollection,
        CollectionKind::HashSet,
        CollectionKind::SortedSet,
        CollectionKind::Queue,
        CollectionKind::Stack,
        CollectionKind::ConcurrentQueue,
        CollectionKind::ConcurrentStack,
        CollectionKind::ConcurrentBag,
        CollectionKind::BlockingCollection,
        CollectionKind::ImmutableArray,
        CollectionKind::ImmutableList,
        CollectionKind::ImmutableHashSet,
        CollectionKind::ImmutableSortedSet,
        CollectionKind::ImmutableQueue,
        CollectionKind::ImmutableStack,
        CollectionKind::FrozenSet,
        CollectionKind::Dictionary,
        CollectionKind::SortedDictionary,
        CollectionKind::SortedList,
        CollectionKind::ConcurrentDictionary,
        CollectionKind::ImmutableDictionary,
        CollectionKind::FrozenDictionary,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            Self::Enumerable => "IEnumerable",
            Self::List => "List",
            Self::LinkedList => "LinkedList",
            Self::Collection => "Collection",
            Self::ObservableCollection => "ObservableCollection",
            Self::ReadOnlyCollection => "ReadOnlyCollection",
            Self::HashSet => "HashSet",
            Self::SortedSet => "SortedSet",
            Self::Queue => "Queue",
            Self::Stack => "Stack",
            Self::ConcurrentQueue => "ConcurrentQueue",
            Self::ConcurrentStack => "ConcurrentStack",
            Self::ConcurrentBag => "ConcurrentBag",
            Self::BlockingCollection => "BlockingCollection",
            Self::ImmutableArray => "ImmutableArray",
            Self::ImmutableList => "ImmutableList",
            Self::ImmutableHashSet => "ImmutableHashSet",
            Self::ImmutableSortedSet => "ImmutableSortedSet",
            Self::ImmutableQueue => "ImmutableQueue",
            Self::ImmutableStack => "ImmutableStack",
            Self::FrozenSet => "FrozenSet",
            Self::Dictionary => "Dictionary",
            Self::SortedDictionary => "SortedDictionary",
            Self::SortedList => "SortedList",
            Self::ConcurrentDictionary => "ConcurrentDictionary",
            Self::ImmutableDictionary => "ImmutableDictionary",
            Self::FrozenDictionary => "FrozenDictionary",
        }
    }

    pub fn namespace(self) -> &'static str {
        match self {
            Self::Collection | Self::ObservableCollection | Self::ReadOnlyCollection => {
                "System.Collections.ObjectModel"
            }
            Self::ConcurrentQueue
            | Self::ConcurrentStack
            | Self::ConcurrentBag
            | Self::BlockingCollection
            | Self::ConcurrentDictionary => "System.Collections.Concurrent",
            Self::ImmutableArray
            | Self::ImmutableList
            | Self::ImmutableHashSet
            | Self::ImmutableSortedSet
            | Self::ImmutableQueue
            | Self::ImmutableStack
            | Self::ImmutableDictionary => "System.Collections.Immutable",
            Self::FrozenSet | Self::FrozenDictionary => "System.Collections.Frozen",
            _ => "System.Collections.Generic",
        }
    }

    /// Look a family up by simple or namespace-qualified name.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| {
            k.short_name() == name
                || name
                    .strip_prefix(k.namespace())
                    .and_then(|rest| rest.strip_prefix('.'))
                    == Some(k.short_name())
        })
    }

    /// Number of generic arguments.
    pub fn arity(self) -> usize {
        if self.is_dictionary() {
            2
        } else {
            1
        }
    }

    pub fn is_dictionary(self) -> bool {
        matches!(
            self,
            Self::Dictionary
                | Self::SortedDictionary
                | Self::SortedList
                | Self::ConcurrentDictionary
                | Self::ImmutableDictionary
                | Self::FrozenDictionary
        )
    }

    /// `ImmutableArray<T>` is the only struct among the families.
    pub fn is_value_type(self) -> bool {
        self == Self::ImmutableArray
    }
}

/// `Func<..., TResult>` or `Action<...>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegateKind {
    Func,
    Action,
}

/// What kind of application type a [`TypeDefinition`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    StaticClass,
}

/// An application (or framework) type registered by name.
///
/// Identity is the full name; two definitions with the same name are equal.
#[derive(Debug)]
pub struct TypeDefinition {
    full_name: String,
    kind: TypeKind,
    base: Option<Type>,
}

impl TypeDefinition {
    pub fn new(full_name: impl Into<String>, kind: TypeKind, base: Option<Type>) -> Self {
        Self {
            full_name: full_name.into(),
            kind,
            base,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Name without namespace.
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit('.')
            .next()
            .unwrap_or(self.full_name.as_str())
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn base(&self) -> Option<&Type> {
        self.base.as_ref()
    }
}

impl PartialEq for TypeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

impl Eq for TypeDefinition {}

impl Hash for TypeDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name.hash(state);
    }
}

/// A type handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Basic(BasicType),
    Nullable(Box<Type>),
    Array(Box<Type>),
    ByRef(Box<Type>),
    Collection(CollectionKind, Vec<Type>),
    KeyValuePair(Box<Type>, Box<Type>),
    /// Generic arguments; for `Func` the last one is the return type.
    Delegate(DelegateKind, Vec<Type>),
    Named(Arc<TypeDefinition>),
}

impl Type {
    pub fn void() -> Self {
        Type::Basic(BasicType::Void)
    }

    pub fn object() -> Self {
        Type::Basic(BasicType::Object)
    }

    pub fn boolean() -> Self {
        Type::Basic(BasicType::Boolean)
    }

    pub fn int32() -> Self {
        Type::Basic(BasicType::Int32)
    }

    pub fn int64() -> Self {
        Type::Basic(BasicType::Int64)
    }

    pub fn double() -> Self {
        Type::Basic(BasicType::Double)
    }

    pub fn string() -> Self {
        Type::Basic(BasicType::String)
    }

    pub fn nullable(inner: Type) -> Self {
        Type::Nullable(Box::new(inner))
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn by_ref(inner: Type) -> Self {
        Type::ByRef(Box::new(inner))
    }

    /// A collection of `kind` over `element` (key/value for dictionaries).
    pub fn collection(kind: CollectionKind, args: Vec<Type>) -> Self {
        Type::Collection(kind, args)
    }

    pub fn list(element: Type) -> Self {
        Type::Collection(CollectionKind::List, vec![element])
    }

    pub fn enumerable(element: Type) -> Self {
        Type::Collection(CollectionKind::Enumerable, vec![element])
    }

    pub fn key_value_pair(key: Type, value: Type) -> Self {
        Type::KeyValuePair(Box::new(key), Box::new(value))
    }

    /// `Func<params..., ret>`.
    pub fn func(mut parameters: Vec<Type>, ret: Type) -> Self {
        parameters.push(ret);
        Type::Delegate(DelegateKind::Func, parameters)
    }

    /// `Action<params...>`.
    pub fn action(parameters: Vec<Type>) -> Self {
        Type::Delegate(DelegateKind::Action, parameters)
    }

    /// Delegate type for the given signature: `Action` when `ret` is void.
    pub fn delegate_for(parameters: Vec<Type>, ret: Type) -> Self {
        if ret.is_void() {
            Type::action(parameters)
        } else {
            Type::func(parameters, ret)
        }
    }

    pub fn as_basic(&self) -> Option<BasicType> {
        match self {
            Type::Basic(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Basic(BasicType::Void))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Type::Basic(BasicType::Object))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Basic(BasicType::Boolean))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    pub fn is_by_ref(&self) -> bool {
        matches!(self, Type::ByRef(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Type::Named(d) if d.kind() == TypeKind::Enum)
    }

    /// `T` for `Nullable<T>`, otherwise the type itself.
    pub fn non_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            other => other,
        }
    }

    /// `T` for `T&`, otherwise the type itself.
    pub fn non_ref(&self) -> &Type {
        match self {
            Type::ByRef(inner) => inner,
            other => other,
        }
    }

    pub fn is_value_type(&self) -> bool {
        match self {
            Type::Basic(b) => b.is_value_type(),
            Type::Nullable(_) | Type::KeyValuePair(..) => true,
            Type::Collection(kind, _) => kind.is_value_type(),
            Type::Named(d) => matches!(d.kind(), TypeKind::Struct | TypeKind::Enum),
            Type::Array(_) | Type::ByRef(_) | Type::Delegate(..) => false,
        }
    }

    /// Reference types (everything that is neither a value type nor void).
    pub fn is_reference_type(&self) -> bool {
        !self.is_void() && !self.is_value_type() && !self.is_by_ref()
    }

    /// Whether `null` is a valid value of the type.
    pub fn can_be_null(&self) -> bool {
        self.is_nullable() || self.is_reference_type()
    }

    /// Basic numeric type (not lifted).
    pub fn is_numeric(&self) -> bool {
        self.as_basic().map_or(false, BasicType::is_numeric)
    }

    pub fn is_integral(&self) -> bool {
        self.as_basic().map_or(false, BasicType::is_integral)
    }

    /// Integral or boolean, the operand domain of the bitwise operators.
    pub fn is_integral_or_bool(&self) -> bool {
        self.is_integral() || self.is_bool()
    }

    /// Element type of arrays and collections; `KeyValuePair<K, V>` for dictionaries.
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Type::Array(e) => Some((**e).clone()),
            Type::Collection(kind, args) if kind.is_dictionary() && args.len() == 2 => {
                Some(Type::key_value_pair(args[0].clone(), args[1].clone()))
            }
            Type::Collection(_, args) => args.first().cloned(),
            _ => None,
        }
    }

    /// Parameter types and return type of a delegate type.
    pub fn delegate_signature(&self) -> Option<(&[Type], Type)> {
        match self {
            Type::Delegate(DelegateKind::Func, args) => {
                let (ret, params) = args.split_last()?;
                Some((params, ret.clone()))
            }
            Type::Delegate(DelegateKind::Action, args) => Some((args.as_slice(), Type::void())),
            _ => None,
        }
    }

    /// Base type, following the definition chain for named types.
    pub fn base_type(&self) -> Option<Type> {
        match self {
            Type::Named(d) => match d.base() {
                Some(b) => Some(b.clone()),
                None if d.kind() == TypeKind::Interface => None,
                None => Some(Type::object()),
            },
            Type::Basic(BasicType::Object) | Type::Basic(BasicType::Void) => None,
            _ => Some(Type::object()),
        }
    }

    /// Whether a value of `source` can be used where `self` is expected without
    /// an explicit conversion (identity, boxing, base types, enumerable views).
    pub fn is_assignable_from(&self, source: &Type) -> bool {
        if self == source {
            return true;
        }
        if source.is_void() || source.is_by_ref() || self.is_by_ref() {
            return false;
        }
        if self.is_object() {
            return true;
        }
        if let Type::Collection(CollectionKind::Enumerable, args) = self {
            if let (Some(target), Some(element)) = (args.first(), source.element_type()) {
                return *target == element;
            }
            return false;
        }
        let mut current = source.base_type();
        while let Some(t) = current {
            if &t == self {
                return true;
            }
            current = t.base_type();
        }
        false
    }

    /// Whether an explicit conversion from `source` to `self` is defined.
    pub fn is_convertible_from(&self, source: &Type) -> bool {
        if self.is_void() || source.is_void() {
            return self.is_void() && source.is_void();
        }
        if self.is_assignable_from(source) || source.is_assignable_from(self) {
            return true;
        }
        let (t, s) = (self.non_nullable(), source.non_nullable());
        if t == s {
            return true;
        }
        let numeric_like = |ty: &Type| {
            ty.is_numeric() || ty.is_enum() || matches!(ty, Type::Basic(BasicType::Char))
        };
        if numeric_like(t) && numeric_like(s) {
            return true;
        }
        // unboxing and casts between reference types resolve at run time
        s.is_object() || t.is_object() || (self.is_reference_type() && source.is_reference_type())
    }

    /// Render the type name using the given convention.
    pub fn name(&self, convention: TypeNameConvention) -> String {
        format_type_name(self, convention)
    }
}

impl From<BasicType> for Type {
    fn from(b: BasicType) -> Self {
        Type::Basic(b)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_type_name(self, TypeNameConvention::Short))
    }
}
