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

//! Canonical fixtures covering every node kind.
//!
//! - **expressions**: expression trees, one per feature area
//! - **documents**: hand-written documents for the failure scenarios
//! - **errors**: malformed documents and the error each one produces

pub mod documents;
pub mod errors;
mod expressions;

pub use expressions::*;

use crate::FixtureList;

/// Returns all expression fixtures for iteration.
///
/// Fixtures that reference the `Acme` types need
/// [`sample_registry`](crate::sample_registry) on both sides of a round trip.
pub fn all() -> FixtureList {
    vec![
        ("sum_lambda", sum_lambda),
        ("switch_with_default", switch_with_default),
        ("constants", constants),
        ("application_constants", application_constants),
        ("member_access", member_access),
        ("method_calls", method_calls),
        ("object_creation", object_creation),
        ("counting_loop", counting_loop),
        ("early_return", early_return),
        ("exception_handling", exception_handling),
        ("invocation", invocation),
        ("operators", operators),
        ("closures", closures),
    ]
}
