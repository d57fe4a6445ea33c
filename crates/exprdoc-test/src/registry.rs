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

//! Application types shared by the fixtures.
//!
//! The builtin registry is extended with three types:
//!
//! - `Acme.Sample`: a class with constructors, `Method3(int, int)`, a static
//!   factory, a property, a field and a string indexer;
//! - `Acme.Point`: a struct with `X` and `Y` fields;
//! - `Acme.Color`: an enum.

use exprdoc_core::{ExpressionError, Type, TypeKind, TypeRegistry};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Registry and type handles used by the fixtures.
#[derive(Debug)]
pub struct SampleModel {
    pub registry: Arc<TypeRegistry>,
    pub sample: Type,
    pub point: Type,
    pub color: Type,
}

static MODEL: Lazy<SampleModel> = Lazy::new(SampleModel::build);

impl SampleModel {
    fn build() -> Self {
        let mut registry = TypeRegistry::new();
        let int = Type::int32;
        let sample = registry
            .register_type("Acme.Sample", TypeKind::Class)
            .constructor(Vec::<Type>::new())
            .constructor([int()])
            .method("Method3", [int(), int()], int())
            .method("Describe", Vec::<Type>::new(), Type::string())
            .non_public_method("Reset", Vec::<Type>::new(), Type::void())
            .property("Name", Type::string())
            .readonly_property("Size", int())
            .field("Count", int())
            .indexer(int(), vec![Type::string()])
            .event("Changed", Type::action(vec![]))
            .build();
        let _ = registry
            .extend_type(sample.clone())
            .static_method("Create", [Type::string()], sample.clone())
            .static_field("Default", sample.clone())
            .build();
        let point = registry
            .register_type("Acme.Point", TypeKind::Struct)
            .constructor([int(), int()])
            .field("X", int())
            .field("Y", int())
            .build();
        let color = registry.register_type("Acme.Color", TypeKind::Enum).build();
        Self {
            registry: Arc::new(registry),
            sample,
            point,
            color,
        }
    }

    /// A registered type by full name.
    pub fn named(&self, full_name: &str) -> Result<Type, ExpressionError> {
        self.registry
            .lookup_named(full_name)
            .ok_or_else(|| missing(&format!("type '{}'", full_name)))
    }
}

/// The shared model.
pub fn sample_model() -> &'static SampleModel {
    &MODEL
}

/// The builtin registry plus the `Acme` types.
pub fn sample_registry() -> Arc<TypeRegistry> {
    MODEL.registry.clone()
}

pub(crate) fn missing(what: &str) -> ExpressionError {
    ExpressionError::InvalidMember(format!("{} is not registered", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::{ParameterSpec, Visibility};

    #[test]
    fn test_only_int_overload_of_method3() {
        let model = sample_model();
        let int_int = [ParameterSpec::new(Type::int32()), ParameterSpec::new(Type::int32())];
        let int_double = [ParameterSpec::new(Type::int32()), ParameterSpec::new(Type::double())];
        let find = |specs: &[ParameterSpec]| {
            model
                .registry
                .find_method(&model.sample, "Method3", specs, false, Visibility::Public)
        };
        assert!(find(&int_int).is_some());
        assert!(find(&int_double).is_none());
    }

    #[test]
    fn test_types_are_registered() {
        let model = sample_model();
        assert_eq!(model.named("Acme.Point").unwrap(), model.point);
        assert_eq!(model.named("Acme.Color").unwrap(), model.color);
        assert!(model.named("Acme.Missing").is_err());
        assert!(model.named("System.InvalidOperationException").is_ok());
    }
}
