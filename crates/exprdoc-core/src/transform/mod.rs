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

//! Format-independent transform between expression trees and documents.
//!
//! The JSON and XML crates adapt their parsed trees to [`DocElement`] and
//! their builders to [`ElementSink`]; everything else happens here.

mod from_doc;
mod members;
mod to_doc;
mod values;

pub use from_doc::{FromDocVisitor, VisitState};
pub use to_doc::ToDocVisitor;

use crate::config::{DeserializeOptions, SerializeOptions};
use crate::document::{DocElement, ElementSink};
use crate::error::TransformError;
use crate::expression::Expression;
use crate::registry::TypeRegistry;
use tracing::debug;

/// Remaining stack below which a visitor moves to a new segment.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each additional stack segment.
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// Run one level of a recursive traversal with enough stack beneath it.
///
/// Moves to a fresh stack segment when the current one runs low, so
/// traversals deeper than the thread stack allows still complete.
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, f)
}

/// Rebuild the expression rooted at node element `root`.
///
/// Symbol tables are fresh for every call.
pub fn deserialize<E: DocElement>(
    root: &E,
    registry: &TypeRegistry,
    options: &DeserializeOptions,
) -> Result<Expression, TransformError> {
    debug!(root = root.tag(), "deserializing expression");
    let mut visitor = FromDocVisitor::new(registry, options.clone());
    let expr = visitor.visit(root)?;
    debug!(
        nodes = expr.node_count(),
        parameters = visitor.state().parameter_count(),
        labels = visitor.state().label_count(),
        "deserialized expression"
    );
    Ok(expr)
}

/// Emit the root node element for `expr`.
pub fn serialize<S: ElementSink>(
    expr: &Expression,
    registry: &TypeRegistry,
    options: &SerializeOptions,
) -> Result<S, TransformError> {
    debug!(root = expr.kind_name(), nodes = expr.node_count(), "serializing expression");
    let mut visitor = ToDocVisitor::new(registry, options.clone());
    let node = visitor.serialize(expr)?;
    let (parameters, labels) = visitor.symbol_counts();
    debug!(parameters, labels, "serialized expression");
    Ok(node)
}
