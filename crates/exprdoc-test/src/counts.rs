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

//! Counting utilities for fixture verification.
//!
//! [`NodeCounter`] walks a tree once and records the number of nodes, the
//! distinct parameters and label targets, and the nesting depth. Round-trip
//! tests compare these before and after a transform: a broken id/idref
//! pairing changes the symbol counts even when the shapes agree.

use exprdoc_core::expression::{
    BinaryExpression, BlockExpression, ConditionalExpression, ConstantExpression, GotoExpression,
    IndexExpression, InvocationExpression, LabelExpression, LoopExpression, MemberExpression,
    MethodCallExpression, NewExpression, SwitchExpression, TryExpression, TypeBinaryExpression,
    UnaryExpression,
};
use exprdoc_core::{Expression, ExpressionVisitor, LabelTarget, LambdaExpression, ParameterExpression, Type};
use std::collections::HashSet;
use std::convert::Infallible;

/// Totals gathered by [`NodeCounter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub nodes: usize,
    pub parameters: usize,
    pub labels: usize,
    pub max_depth: usize,
}

/// Visitor that counts nodes and distinct symbols.
#[derive(Debug, Default)]
pub struct NodeCounter {
    nodes: usize,
    depth: usize,
    max_depth: usize,
    parameters: HashSet<usize>,
    labels: HashSet<usize>,
}

impl NodeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `expr` and everything below it.
    pub fn count(mut self, expr: &Expression) -> Counts {
        match self.visit(expr) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        Counts {
            nodes: self.nodes,
            parameters: self.parameters.len(),
            labels: self.labels.len(),
            max_depth: self.max_depth,
        }
    }

    fn enter(&mut self) {
        self.nodes += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn leave(&mut self) -> Result<(), Infallible> {
        self.depth -= 1;
        Ok(())
    }

    fn all<'a>(&mut self, exprs: impl IntoIterator<Item = &'a Expression>) -> Result<(), Infallible> {
        for expr in exprs {
            self.visit(expr)?;
        }
        Ok(())
    }

    fn declare(&mut self, parameters: &[ParameterExpression]) {
        self.parameters.extend(parameters.iter().map(ParameterExpression::symbol_id));
    }

    fn label(&mut self, target: Option<&LabelTarget>) {
        if let Some(target) = target {
            self.labels.insert(target.symbol_id());
        }
    }
}

impl ExpressionVisitor for NodeCounter {
    type Output = ();
    type Error = Infallible;

    fn visit_constant(&mut self, _: &ConstantExpression) -> Result<(), Infallible> {
        self.enter();
        self.leave()
    }

    fn visit_default(&mut self, _: &Type) -> Result<(), Infallible> {
        self.enter();
        self.leave()
    }

    fn visit_parameter(&mut self, p: &ParameterExpression) -> Result<(), Infallible> {
        self.enter();
        self.parameters.insert(p.symbol_id());
        self.leave()
    }

    fn visit_unary(&mut self, e: &UnaryExpression) -> Result<(), Infallible> {
        self.enter();
        self.all(e.operand())?;
        self.leave()
    }

    fn visit_binary(&mut self, e: &BinaryExpression) -> Result<(), Infallible> {
        self.enter();
        self.all([e.left(), e.right()])?;
        if let Some(conversion) = e.conversion() {
            self.visit_lambda(conversion)?;
        }
        self.leave()
    }

    fn visit_type_binary(&mut self, e: &TypeBinaryExpression) -> Result<(), Infallible> {
        self.enter();
        self.visit(e.operand())?;
        self.leave()
    }

    fn visit_index(&mut self, e: &IndexExpression) -> Result<(), Infallible> {
        self.enter();
        self.visit(e.object())?;
        self.all(e.arguments())?;
        self.leave()
    }

    fn visit_block(&mut self, e: &BlockExpression) -> Result<(), Infallible> {
        self.enter();
        self.declare(e.variables());
        self.all(e.expressions())?;
        self.leave()
    }

    fn visit_member(&mut self, e: &MemberExpression) -> Result<(), Infallible> {
        self.enter();
        self.all(e.object())?;
        self.leave()
    }

    fn visit_call(&mut self, e: &MethodCallExpression) -> Result<(), Infallible> {
        self.enter();
        self.all(e.object())?;
        self.all(e.arguments())?;
        self.leave()
    }

    fn visit_invocation(&mut self, e: &InvocationExpression) -> Result<(), Infallible> {
        self.enter();
        self.visit(e.delegate())?;
        self.all(e.arguments())?;
        self.leave()
    }

    fn visit_label(&mut self, e: &LabelExpression) -> Result<(), Infallible> {
        self.enter();
        self.label(Some(e.target()));
        self.all(e.default_value())?;
        self.leave()
    }

    fn visit_goto(&mut self, e: &GotoExpression) -> Result<(), Infallible> {
        self.enter();
        self.label(Some(e.target()));
        self.all(e.value())?;
        self.leave()
    }

    fn visit_loop(&mut self, e: &LoopExpression) -> Result<(), Infallible> {
        self.enter();
        self.label(e.break_label());
        self.label(e.continue_label());
        self.visit(e.body())?;
        self.leave()
    }

    fn visit_switch(&mut self, e: &SwitchExpression) -> Result<(), Infallible> {
        self.enter();
        self.visit(e.switch_value())?;
        for case in e.cases() {
            self.all(case.test_values())?;
            self.visit(case.body())?;
        }
        self.all(e.default_body())?;
        self.leave()
    }

    fn visit_conditional(&mut self, e: &ConditionalExpression) -> Result<(), Infallible> {
        self.enter();
        self.all([e.test(), e.if_true()])?;
        self.all(e.if_false())?;
        self.leave()
    }

    fn visit_try(&mut self, e: &TryExpression) -> Result<(), Infallible> {
        self.enter();
        self.visit(e.body())?;
        for handler in e.handlers() {
            if let Some(variable) = handler.variable() {
                self.parameters.insert(variable.symbol_id());
            }
            self.all(handler.filter())?;
            self.visit(handler.body())?;
        }
        self.all(e.finally())?;
        self.all(e.fault())?;
        self.leave()
    }

    fn visit_new(&mut self, e: &NewExpression) -> Result<(), Infallible> {
        self.enter();
        self.all(e.arguments())?;
        self.leave()
    }

    fn visit_lambda(&mut self, e: &LambdaExpression) -> Result<(), Infallible> {
        self.enter();
        self.declare(e.parameters());
        self.visit(e.body())?;
        self.leave()
    }
}

/// Count all nodes in a tree.
pub fn count_nodes(expr: &Expression) -> usize {
    NodeCounter::new().count(expr).nodes
}

/// Count distinct parameters, declared or referenced.
pub fn count_parameters(expr: &Expression) -> usize {
    NodeCounter::new().count(expr).parameters
}

/// Count distinct label targets.
pub fn count_labels(expr: &Expression) -> usize {
    NodeCounter::new().count(expr).labels
}
