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

//! Property-based round-trip tests
//!
//! Random arithmetic and conditional trees over two parameters must survive
//! XML output and input unchanged.

use exprdoc_core::{deep_eq, BinaryOp, Expression, ParameterExpression, Type, UnaryOp, Value};
use exprdoc_test::count_nodes;
use exprdoc_xml::{from_xml, to_xml, FromXmlConfig, ToXmlConfig};
use proptest::prelude::*;

/// Characters XML 1.0 can carry, as text or as character references.
const XML_TEXT: &str = "[\\t\\n\\r\\x20-\\x{D7FF}\\x{E000}-\\x{FFFD}\\x{10000}-\\x{10FFFF}]*";

#[derive(Debug, Clone)]
enum Shape {
    A,
    B,
    Literal(i32),
    Op(BinaryOp, Box<Shape>, Box<Shape>),
    Negate(Box<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        Just(Shape::A),
        Just(Shape::B),
        any::<i32>().prop_map(Shape::Literal),
    ];
    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            (
                prop_oneof![
                    Just(BinaryOp::Add),
                    Just(BinaryOp::Subtract),
                    Just(BinaryOp::Multiply),
                    Just(BinaryOp::Modulo),
                    Just(BinaryOp::And),
                    Just(BinaryOp::Or),
                ],
                inner.clone(),
                inner.clone()
            )
                .prop_map(|(op, l, r)| Shape::Op(op, Box::new(l), Box::new(r))),
            inner.prop_map(|s| Shape::Negate(Box::new(s))),
        ]
    })
}

fn build(shape: &Shape, a: &ParameterExpression, b: &ParameterExpression) -> Expression {
    match shape {
        Shape::A => a.clone().into(),
        Shape::B => b.clone().into(),
        Shape::Literal(v) => Expression::constant_of(Value::Int32(*v)).unwrap(),
        Shape::Op(op, l, r) => Expression::binary(*op, build(l, a, b), build(r, a, b)).unwrap(),
        Shape::Negate(s) => Expression::unary(UnaryOp::Negate, build(s, a, b)).unwrap(),
    }
}

fn lambda(shape: &Shape) -> Expression {
    let a = ParameterExpression::new(Type::int32(), Some("a"));
    let b = ParameterExpression::new(Type::int32(), Some("b"));
    let body = build(shape, &a, &b);
    Expression::lambda(None, body, vec![a, b], false, None)
        .unwrap()
        .into()
}

fn roundtrip(expr: &Expression, config: &ToXmlConfig) -> Expression {
    let xml = to_xml(expr, config).unwrap();
    from_xml(&xml, &FromXmlConfig::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_generated_trees_roundtrip(shape in shape(), comments in any::<bool>()) {
        let expr = lambda(&shape);
        let config = ToXmlConfig::builder().add_comments(comments).build();
        let back = roundtrip(&expr, &config);
        prop_assert!(deep_eq(&expr, &back));
        prop_assert_eq!(count_nodes(&expr), count_nodes(&back));
    }

    #[test]
    fn prop_string_constants_roundtrip(text in XML_TEXT, pretty in any::<bool>()) {
        let expr = Expression::constant_of(Value::String(text.clone())).unwrap();
        let config = ToXmlConfig::builder().pretty(pretty).build();
        let back = roundtrip(&expr, &config);
        prop_assert!(deep_eq(&expr, &back), "lost {:?}", text);
    }

    #[test]
    fn prop_parameter_names_roundtrip(name in "[\\PC]{1,16}") {
        let p = ParameterExpression::new(Type::string(), Some(name.as_str()));
        let expr: Expression = Expression::lambda(None, p.clone().into(), vec![p], false, None)
            .unwrap()
            .into();
        let back = roundtrip(&expr, &ToXmlConfig::default());
        prop_assert!(deep_eq(&expr, &back), "lost {:?}", name);
    }

    #[test]
    fn prop_double_constants_roundtrip(x in any::<f64>()) {
        let expr = Expression::constant_of(Value::Double(x)).unwrap();
        let back = roundtrip(&expr, &ToXmlConfig::default());
        prop_assert!(deep_eq(&expr, &back), "lost {:?}", x);
    }

    #[test]
    fn prop_long_constants_roundtrip(v in any::<i64>(), u in any::<u64>()) {
        for value in [Value::Int64(v), Value::UInt64(u)] {
            let expr = Expression::constant_of(value).unwrap();
            prop_assert!(deep_eq(&expr, &roundtrip(&expr, &ToXmlConfig::default())));
        }
    }
}
