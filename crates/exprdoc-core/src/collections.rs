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

//! Collection reconstruction.
//!
//! Every collection family is rebuilt with one of a handful of construction
//! rituals, chosen from a static table:
//!
//! | Strategy                          | Families                                             |
//! |-----------------------------------|------------------------------------------------------|
//! | enumerable constructor            | lists, sets, queues, immutable and frozen families   |
//! | array constructor                 | `ImmutableArray`                                     |
//! | list constructor                  | `Collection`, `ObservableCollection`, `ReadOnlyCollection` |
//! | reversed enumerable constructor   | stacks and `ConcurrentBag`                           |
//! | add loop                          | `BlockingCollection`, `SortedDictionary`, `SortedList` |
//!
//! Constructors and adders are looked up through the [`TypeRegistry`] with an
//! exact single match. A reported length that differs from the number of
//! elements actually constructed is an [`InternalTransformError`].

use crate::error::InternalTransformError;
use crate::registry::TypeRegistry;
use crate::types::{CollectionKind, ParameterSpec, Type, Visibility};
use crate::value::Value;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::trace;

/// How a collection family is rebuilt from a sequence of elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionStrategy {
    EnumerableConstructor,
    ArrayConstructor,
    ListConstructor,
    /// Enumerable constructor fed with the reversed sequence (LIFO families).
    ReversedEnumerableConstructor,
    /// Parameterless constructor, then one `Add` per element.
    AddLoop,
}

/// Shape of a single-parameter collection constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterShape {
    /// `IEnumerable<T>`.
    Enumerable,
    /// `T[]`.
    Array,
    /// `List<T>`.
    List,
    /// `int` initial capacity.
    Capacity,
}

impl ParameterShape {
    /// Concrete parameter type for element type `element`.
    pub fn parameter_type(self, element: &Type) -> Type {
        match self {
            ParameterShape::Enumerable => Type::enumerable(element.clone()),
            ParameterShape::Array => Type::array(element.clone()),
            ParameterShape::List => Type::list(element.clone()),
            ParameterShape::Capacity => Type::int32(),
        }
    }
}

static STRATEGIES: Lazy<HashMap<CollectionKind, ConstructionStrategy>> = Lazy::new(|| {
    use CollectionKind::*;
    use ConstructionStrategy::*;

    let mut map = HashMap::new();
    for kind in CollectionKind::ALL {
        let strategy = match kind {
            Enumerable => continue,
            Stack | ConcurrentStack | ConcurrentBag | ImmutableStack => {
                ReversedEnumerableConstructor
            }
            BlockingCollection | SortedDictionary | SortedList => AddLoop,
            ImmutableArray => ArrayConstructor,
            Collection | ObservableCollection | ReadOnlyCollection => ListConstructor,
            _ => EnumerableConstructor,
        };
        map.insert(kind, strategy);
    }
    map
});

/// The construction strategy of `kind`; `None` for `IEnumerable<T>`.
pub fn strategy_for(kind: CollectionKind) -> Option<ConstructionStrategy> {
    STRATEGIES.get(&kind).copied()
}

/// Constructors each family exposes. An empty entry is the parameterless one.
pub fn constructor_shapes(kind: CollectionKind) -> &'static [Option<ParameterShape>] {
    use CollectionKind::*;
    use ParameterShape as P;

    match kind {
        Enumerable => &[],
        List | HashSet | Queue | Stack | Dictionary => {
            &[None, Some(P::Capacity), Some(P::Enumerable)]
        }
        LinkedList | SortedSet | ConcurrentQueue | ConcurrentStack | ConcurrentBag
        | ConcurrentDictionary => &[None, Some(P::Enumerable)],
        Collection => &[None, Some(P::List)],
        ObservableCollection => &[None, Some(P::List), Some(P::Enumerable)],
        ReadOnlyCollection => &[Some(P::List)],
        BlockingCollection | SortedList => &[None, Some(P::Capacity)],
        SortedDictionary => &[None],
        ImmutableArray => &[Some(P::Array)],
        ImmutableList | ImmutableHashSet | ImmutableSortedSet | ImmutableQueue
        | ImmutableStack | FrozenSet | ImmutableDictionary | FrozenDictionary => {
            &[Some(P::Enumerable)]
        }
    }
}

/// Name of the single-argument method adding one element, if the family is mutable.
pub fn adder_name(kind: CollectionKind) -> Option<&'static str> {
    use CollectionKind::*;

    match kind {
        List | Collection | ObservableCollection | HashSet | SortedSet | ConcurrentBag
        | BlockingCollection | Dictionary | SortedDictionary | SortedList => Some("Add"),
        LinkedList => Some("AddLast"),
        Queue | ConcurrentQueue => Some("Enqueue"),
        Stack | ConcurrentStack => Some("Push"),
        ConcurrentDictionary => Some("TryAdd"),
        _ => None,
    }
}

fn is_lifo(kind: CollectionKind) -> bool {
    matches!(
        kind,
        CollectionKind::Stack
            | CollectionKind::ConcurrentStack
            | CollectionKind::ConcurrentBag
            | CollectionKind::ImmutableStack
    )
}

fn is_set(kind: CollectionKind) -> bool {
    matches!(
        kind,
        CollectionKind::HashSet
            | CollectionKind::SortedSet
            | CollectionKind::ImmutableHashSet
            | CollectionKind::ImmutableSortedSet
            | CollectionKind::FrozenSet
    )
}

fn is_sorted(kind: CollectionKind) -> bool {
    matches!(
        kind,
        CollectionKind::SortedSet
            | CollectionKind::ImmutableSortedSet
            | CollectionKind::SortedDictionary
            | CollectionKind::SortedList
    )
}

/// A reconstructed collection: element type plus items in iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInstance {
    kind: CollectionKind,
    element_type: Type,
    items: Vec<Value>,
}

impl CollectionInstance {
    /// An empty collection. For dictionaries `element_type` is the key/value pair type.
    pub fn new(kind: CollectionKind, element_type: Type) -> Self {
        Self {
            kind,
            element_type,
            items: Vec::new(),
        }
    }

    /// A collection filled by adding `items` in order.
    pub fn from_items(kind: CollectionKind, element_type: Type, items: Vec<Value>) -> Self {
        let mut instance = Self::new(kind, element_type);
        for item in items {
            instance.add(item);
        }
        instance
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    /// Items in iteration order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The closed collection type.
    pub fn collection_type(&self) -> Type {
        match (&self.element_type, self.kind.is_dictionary()) {
            (Type::KeyValuePair(k, v), true) => {
                Type::collection(self.kind, vec![(**k).clone(), (**v).clone()])
            }
            (element, _) => Type::collection(self.kind, vec![element.clone()]),
        }
    }

    fn key_of(item: &Value) -> &Value {
        match item {
            Value::Pair(k, _) => k,
            other => other,
        }
    }

    /// Add one element; `false` when the family rejects it (duplicate set
    /// element or dictionary key).
    pub fn add(&mut self, item: Value) -> bool {
        let keyed = is_set(self.kind) || self.kind.is_dictionary();
        if keyed {
            let key = Self::key_of(&item);
            if self.items.iter().any(|v| Self::key_of(v).equivalent(key)) {
                return false;
            }
        }
        if is_sorted(self.kind) {
            let key = Self::key_of(&item);
            let at = self
                .items
                .iter()
                .position(|v| Self::key_of(v).total_cmp(key).is_gt())
                .unwrap_or(self.items.len());
            self.items.insert(at, item);
        } else if is_lifo(self.kind) {
            self.items.insert(0, item);
        } else {
            self.items.push(item);
        }
        true
    }
}

fn check_length(
    ty: &Type,
    constructed: usize,
    expected_length: Option<usize>,
) -> Result<(), InternalTransformError> {
    match expected_length {
        Some(expected) if expected != constructed => Err(InternalTransformError::new(format!(
            "collection '{}' reported {} element(s) but {} were constructed",
            ty, expected, constructed
        ))),
        _ => Ok(()),
    }
}

/// Rebuild a collection of `kind` over `element_type` from `elements`.
///
/// `element_type` is the key/value pair type for dictionaries.
pub fn build_collection(
    registry: &TypeRegistry,
    kind: CollectionKind,
    element_type: &Type,
    elements: Vec<Value>,
    expected_length: Option<usize>,
) -> Result<CollectionInstance, InternalTransformError> {
    let strategy = strategy_for(kind).ok_or_else(|| {
        InternalTransformError::new(format!(
            "'{}' has no construction strategy",
            kind.short_name()
        ))
    })?;
    let empty = CollectionInstance::new(kind, element_type.clone());
    let ty = empty.collection_type();
    trace!(collection = %ty, ?strategy, count = elements.len(), "building collection");

    let bulk_shape = match strategy {
        ConstructionStrategy::EnumerableConstructor
        | ConstructionStrategy::ReversedEnumerableConstructor => ParameterShape::Enumerable,
        ConstructionStrategy::ArrayConstructor => ParameterShape::Array,
        ConstructionStrategy::ListConstructor => ParameterShape::List,
        ConstructionStrategy::AddLoop => {
            let instance = add_loop(registry, empty, &ty, elements)?;
            check_length(&ty, instance.len(), expected_length)?;
            return Ok(instance);
        }
    };

    let parameter = ParameterSpec::new(bulk_shape.parameter_type(element_type));
    registry
        .find_constructor(&ty, std::slice::from_ref(&parameter), Visibility::Public)
        .ok_or_else(|| {
            InternalTransformError::new(format!(
                "'{}' has no single constructor accepting '{}'",
                ty, parameter.ty
            ))
        })?;

    let mut sequence = elements;
    if strategy == ConstructionStrategy::ReversedEnumerableConstructor {
        sequence.reverse();
    }
    let mut instance = empty;
    for item in sequence {
        if !item.conforms_to(element_type) {
            return Err(InternalTransformError::new(format!(
                "element '{}' is not a valid '{}'",
                item, element_type
            )));
        }
        instance.add(item);
    }
    check_length(&ty, instance.len(), expected_length)?;
    Ok(instance)
}

fn add_loop(
    registry: &TypeRegistry,
    mut instance: CollectionInstance,
    ty: &Type,
    elements: Vec<Value>,
) -> Result<CollectionInstance, InternalTransformError> {
    registry
        .find_constructor(ty, &[], Visibility::Public)
        .ok_or_else(|| {
            InternalTransformError::new(format!("'{}' has no parameterless constructor", ty))
        })?;
    let adder = adder_name(instance.kind())
        .and_then(|name| {
            registry.find_method(
                ty,
                name,
                &[ParameterSpec::new(instance.element_type().clone())],
                false,
                Visibility::Public,
            )
        })
        .ok_or_else(|| {
            InternalTransformError::new(format!("'{}' has no single-argument add method", ty))
        })?;

    let mut added = 0usize;
    for item in elements {
        if item.conforms_to(instance.element_type()) && instance.add(item) {
            added += 1;
        }
    }
    trace!(collection = %ty, adder = %adder.name, added, "add loop finished");
    debug_assert_eq!(added, instance.len());
    Ok(instance)
}
