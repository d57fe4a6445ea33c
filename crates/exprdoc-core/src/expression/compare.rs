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

//! Structural equality of expression trees.

use super::*;
use std::collections::HashMap;

/// Structural equality up to renaming of symbols.
///
/// Parameters and labels of the two trees must correspond one-to-one: the
/// first time a symbol of `a` is met it is paired with the symbol at the same
/// position in `b`, and every later occurrence must respect that pairing.
/// Names, types and by-ref flags of paired symbols must agree. Constants are
/// compared with [`Value::equivalent`], so `NaN` equals `NaN`.
pub fn deep_eq(a: &Expression, b: &Expression) -> bool {
    Matcher::default().expr(a, b)
}

#[derive(Default)]
struct Matcher {
    params: HashMap<usize, usize>,
    params_back: HashMap<usize, usize>,
    labels: HashMap<usize, usize>,
    labels_back: HashMap<usize, usize>,
}

fn pair(forward: &mut HashMap<usize, usize>, back: &mut HashMap<usize, usize>, a: usize, b: usize) -> bool {
    match (forward.get(&a), back.get(&b)) {
        (None, None) => {
            forward.insert(a, b);
            back.insert(b, a);
            true
        }
        (Some(&fb), Some(&ba)) => fb == b && ba == a,
        _ => false,
    }
}

impl Matcher {
    fn param(&mut self, a: &ParameterExpression, b: &ParameterExpression) -> bool {
        a.name() == b.name()
            && a.ty() == b.ty()
            && a.is_by_ref() == b.is_by_ref()
            && pair(&mut self.params, &mut self.params_back, a.symbol_id(), b.symbol_id())
    }

    fn label(&mut self, a: &LabelTarget, b: &LabelTarget) -> bool {
        a.name() == b.name()
            && a.ty() == b.ty()
            && pair(&mut self.labels, &mut self.labels_back, a.symbol_id(), b.symbol_id())
    }

    fn opt_label(&mut self, a: Option<&LabelTarget>, b: Option<&LabelTarget>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.label(a, b),
            _ => false,
        }
    }

    fn opt(&mut self, a: Option<&Expression>, b: Option<&Expression>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.expr(a, b),
            _ => false,
        }
    }

    fn all(&mut self, a: &[Expression], b: &[Expression]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.expr(a, b))
    }

    fn params(&mut self, a: &[ParameterExpression], b: &[ParameterExpression]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.param(a, b))
    }

    fn lambda(&mut self, a: &LambdaExpression, b: &LambdaExpression) -> bool {
        a.ty == b.ty
            && a.name == b.name
            && a.tail_call == b.tail_call
            && self.params(&a.parameters, &b.parameters)
            && self.expr(&a.body, &b.body)
    }

    fn expr(&mut self, a: &Expression, b: &Expression) -> bool {
        if a.ty() != b.ty() {
            return false;
        }
        match (a, b) {
            (Expression::Constant(x), Expression::Constant(y)) => x.value.equivalent(&y.value),
            (Expression::Default(_), Expression::Default(_)) => true,
            (Expression::Parameter(x), Expression::Parameter(y)) => self.param(x, y),
            (Expression::Unary(x), Expression::Unary(y)) => {
                x.op == y.op && x.method == y.method && self.opt(x.operand(), y.operand())
            }
            (Expression::Binary(x), Expression::Binary(y)) => {
                x.op == y.op
                    && x.lifted_to_null == y.lifted_to_null
                    && x.method == y.method
                    && self.expr(&x.left, &y.left)
                    && self.expr(&x.right, &y.right)
                    && match (x.conversion(), y.conversion()) {
                        (None, None) => true,
                        (Some(cx), Some(cy)) => self.lambda(cx, cy),
                        _ => false,
                    }
            }
            (Expression::TypeBinary(x), Expression::TypeBinary(y)) => {
                x.op == y.op && x.type_operand == y.type_operand && self.expr(&x.operand, &y.operand)
            }
            (Expression::Index(x), Expression::Index(y)) => {
                x.indexer == y.indexer
                    && self.expr(&x.object, &y.object)
                    && self.all(&x.arguments, &y.arguments)
            }
            (Expression::Block(x), Expression::Block(y)) => {
                self.params(&x.variables, &y.variables) && self.all(&x.expressions, &y.expressions)
            }
            (Expression::Member(x), Expression::Member(y)) => {
                x.member == y.member && self.opt(x.object(), y.object())
            }
            (Expression::MethodCall(x), Expression::MethodCall(y)) => {
                x.method == y.method
                    && self.opt(x.object(), y.object())
                    && self.all(&x.arguments, &y.arguments)
            }
            (Expression::Invocation(x), Expression::Invocation(y)) => {
                self.expr(&x.delegate, &y.delegate) && self.all(&x.arguments, &y.arguments)
            }
            (Expression::Label(x), Expression::Label(y)) => {
                self.label(&x.target, &y.target) && self.opt(x.default_value(), y.default_value())
            }
            (Expression::Goto(x), Expression::Goto(y)) => {
                x.kind == y.kind && self.label(&x.target, &y.target) && self.opt(x.value(), y.value())
            }
            (Expression::Loop(x), Expression::Loop(y)) => {
                self.opt_label(x.break_label(), y.break_label())
                    && self.opt_label(x.continue_label(), y.continue_label())
                    && self.expr(&x.body, &y.body)
            }
            (Expression::Switch(x), Expression::Switch(y)) => {
                x.comparison == y.comparison
                    && self.expr(&x.switch_value, &y.switch_value)
                    && x.cases.len() == y.cases.len()
                    && x.cases.iter().zip(&y.cases).all(|(cx, cy)| {
                        self.all(&cx.test_values, &cy.test_values) && self.expr(&cx.body, &cy.body)
                    })
                    && self.opt(x.default_body(), y.default_body())
            }
            (Expression::Conditional(x), Expression::Conditional(y)) => {
                self.expr(&x.test, &y.test)
                    && self.expr(&x.if_true, &y.if_true)
                    && self.opt(x.if_false(), y.if_false())
            }
            (Expression::Try(x), Expression::Try(y)) => {
                self.expr(&x.body, &y.body)
                    && x.handlers.len() == y.handlers.len()
                    && x.handlers.iter().zip(&y.handlers).all(|(hx, hy)| {
                        hx.test == hy.test
                            && match (&hx.variable, &hy.variable) {
                                (None, None) => true,
                                (Some(vx), Some(vy)) => self.param(vx, vy),
                                _ => false,
                            }
                            && self.opt(hx.filter(), hy.filter())
                            && self.expr(&hx.body, &hy.body)
                    })
                    && self.opt(x.finally(), y.finally())
                    && self.opt(x.fault(), y.fault())
            }
            (Expression::New(x), Expression::New(y)) => {
                x.constructor == y.constructor
                    && x.members == y.members
                    && self.all(&x.arguments, &y.arguments)
            }
            (Expression::Lambda(x), Expression::Lambda(y)) => self.lambda(x, y),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_lambda() -> Expression {
        let a = ParameterExpression::new(Type::int32(), Some("a"));
        let b = ParameterExpression::new(Type::int32(), Some("b"));
        let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
        Expression::lambda(None, body, vec![a, b], false, None).unwrap().into()
    }

    #[test]
    fn test_independent_trees_are_equal() {
        assert!(deep_eq(&add_lambda(), &add_lambda()));
    }

    #[test]
    fn test_symbol_bijection() {
        // (a, b) => a + a  vs  (a, b) => a + b
        let a = ParameterExpression::new(Type::int32(), Some("a"));
        let b = ParameterExpression::new(Type::int32(), Some("b"));
        let body = Expression::binary(BinaryOp::Add, a.clone().into(), a.clone().into()).unwrap();
        let twice: Expression = Expression::lambda(None, body, vec![a, b], false, None).unwrap().into();
        assert!(!deep_eq(&twice, &add_lambda()));
    }

    #[test]
    fn test_nan_constants_compare_equal() {
        let nan = || Expression::constant(Value::Double(f64::NAN), Type::double()).unwrap();
        assert!(deep_eq(&nan(), &nan()));
    }
}
