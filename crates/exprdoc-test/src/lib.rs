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

//! Shared test fixtures and utilities for the expression document converters.
//!
//! # Quick Start
//!
//! ```rust
//! use exprdoc_test::{count_nodes, fixtures, sample_registry};
//!
//! let sum = fixtures::sum_lambda().unwrap();
//! assert_eq!(count_nodes(&sum), 4);
//!
//! // Every fixture, for round-trip loops
//! for (name, fixture) in fixtures::all() {
//!     let expr = fixture().unwrap();
//!     assert!(count_nodes(&expr) > 0, "{}", name);
//! }
//!
//! // Registry with the Acme.* types some fixtures use
//! let registry = sample_registry();
//! assert!(registry.lookup_named("Acme.Sample").is_some());
//! ```

use exprdoc_core::{Expression, ExpressionError};

/// Type alias for a list of fixture functions (name, generator).
pub type FixtureList = Vec<(&'static str, fn() -> Result<Expression, ExpressionError>)>;

/// Canonical fixtures.
pub mod fixtures;

/// Application types used by the fixtures.
pub mod registry;

/// Fixture counting utilities.
pub mod counts;

pub use counts::{count_labels, count_nodes, count_parameters, Counts, NodeCounter};
pub use registry::{sample_model, sample_registry, SampleModel};

#[cfg(test)]
mod tests {
    use super::*;
    use exprdoc_core::deep_eq;

    #[test]
    fn test_all_fixtures_build() {
        for (name, fixture) in fixtures::all() {
            let expr = fixture().unwrap_or_else(|e| panic!("fixture {} failed: {}", name, e));
            assert!(count_nodes(&expr) > 0, "fixture {} is empty", name);
        }
    }

    #[test]
    fn test_fixtures_are_deterministic() {
        for (name, fixture) in fixtures::all() {
            let a = fixture().unwrap();
            let b = fixture().unwrap();
            assert!(deep_eq(&a, &b), "fixture {} differs between calls", name);
            assert_eq!(a.to_string(), b.to_string());
        }
    }

    #[test]
    fn test_node_counter_matches_walk() {
        for (name, fixture) in fixtures::all() {
            let expr = fixture().unwrap();
            assert_eq!(count_nodes(&expr), expr.node_count(), "fixture {}", name);
        }
    }

    #[test]
    fn test_sum_lambda_counts() {
        let sum = fixtures::sum_lambda().unwrap();
        let counts = NodeCounter::new().count(&sum);
        assert_eq!(
            counts,
            Counts {
                nodes: 4,
                parameters: 2,
                labels: 0,
                max_depth: 3,
            }
        );
        assert_eq!(sum.to_string(), "(a, b) => (a + b)");
    }

    #[test]
    fn test_label_counts() {
        assert_eq!(count_labels(&fixtures::counting_loop().unwrap()), 2);
        assert_eq!(count_labels(&fixtures::early_return().unwrap()), 1);
        assert_eq!(count_parameters(&fixtures::counting_loop().unwrap()), 1);
    }

    #[test]
    fn test_catch_variable_counted() {
        let expr = fixtures::exception_handling().unwrap();
        assert_eq!(count_parameters(&expr), 1);
    }

    #[test]
    fn test_switch_cases() {
        let expr = fixtures::switch_with_default().unwrap();
        let lambda = expr.as_lambda().unwrap();
        match lambda.body() {
            Expression::Switch(s) => {
                assert_eq!(s.cases().len(), 2);
                assert_eq!(s.cases()[0].test_values().len(), 2);
                assert!(s.default_body().is_some());
            }
            other => panic!("expected a switch, found {}", other.kind_name()),
        }
    }

    #[test]
    fn test_scenario_documents_mention_their_paths() {
        use fixtures::documents::*;
        assert!(three_operand_add_json().contains("\"operands\""));
        assert!(three_operand_add_xml().contains("<operands>"));
        assert!(short_collection_json().contains(r#""length": 32"#));
        assert_eq!(short_collection_xml().matches("<item>").count(), 30);
        assert!(wrong_overload_json().contains("\"double\""));
        assert!(wrong_overload_xml().contains(r#"type="double""#));
    }

    #[test]
    fn test_error_samples_are_named_uniquely() {
        for samples in [
            fixtures::errors::invalid_json_samples(),
            fixtures::errors::invalid_xml_samples(),
        ] {
            let mut names: Vec<_> = samples.iter().map(|(name, _, _)| *name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), samples.len());
        }
    }

    #[test]
    fn test_nested_sum_depth() {
        let counts = NodeCounter::new().count(&fixtures::nested_sum(10).unwrap());
        assert_eq!(counts.parameters, 1);
        assert_eq!(counts.nodes, 1 + 8 + 9);
        assert_eq!(counts.max_depth, 10);
    }
}
