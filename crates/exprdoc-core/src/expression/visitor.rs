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

use super::*;

/// Per-variant dispatch over an expression tree.
///
/// Implementors decide themselves whether and in which order to descend into
/// children; [`ExpressionVisitor::visit`] only routes a node to its handler.
pub trait ExpressionVisitor {
    type Output;
    type Error;

    fn visit(&mut self, expr: &Expression) -> Result<Self::Output, Self::Error> {
        match expr {
            Expression::Constant(e) => self.visit_constant(e),
            Expression::Default(ty) => self.visit_default(ty),
            Expression::Parameter(p) => self.visit_parameter(p),
            Expression::Unary(e) => self.visit_unary(e),
            Expression::Binary(e) => self.visit_binary(e),
            Expression::TypeBinary(e) => self.visit_type_binary(e),
            Expression::Index(e) => self.visit_index(e),
            Expression::Block(e) => self.visit_block(e),
            Expression::Member(e) => self.visit_member(e),
            Expression::MethodCall(e) => self.visit_call(e),
            Expression::Invocation(e) => self.visit_invocation(e),
            Expression::Label(e) => self.visit_label(e),
            Expression::Goto(e) => self.visit_goto(e),
            Expression::Loop(e) => self.visit_loop(e),
            Expression::Switch(e) => self.visit_switch(e),
            Expression::Conditional(e) => self.visit_conditional(e),
            Expression::Try(e) => self.visit_try(e),
            Expression::New(e) => self.visit_new(e),
            Expression::Lambda(e) => self.visit_lambda(e),
        }
    }

    fn visit_constant(&mut self, e: &ConstantExpression) -> Result<Self::Output, Self::Error>;
    fn visit_default(&mut self, ty: &Type) -> Result<Self::Output, Self::Error>;
    fn visit_parameter(&mut self, p: &ParameterExpression) -> Result<Self::Output, Self::Error>;
    fn visit_unary(&mut self, e: &UnaryExpression) -> Result<Self::Output, Self::Error>;
    fn visit_binary(&mut self, e: &BinaryExpression) -> Result<Self::Output, Self::Error>;
    fn visit_type_binary(&mut self, e: &TypeBinaryExpression) -> Result<Self::Output, Self::Error>;
    fn visit_index(&mut self, e: &IndexExpression) -> Result<Self::Output, Self::Error>;
    fn visit_block(&mut self, e: &BlockExpression) -> Result<Self::Output, Self::Error>;
    fn visit_member(&mut self, e: &MemberExpression) -> Result<Self::Output, Self::Error>;
    fn visit_call(&mut self, e: &MethodCallExpression) -> Result<Self::Output, Self::Error>;
    fn visit_invocation(&mut self, e: &InvocationExpression) -> Result<Self::Output, Self::Error>;
    fn visit_label(&mut self, e: &LabelExpression) -> Result<Self::Output, Self::Error>;
    fn visit_goto(&mut self, e: &GotoExpression) -> Result<Self::Output, Self::Error>;
    fn visit_loop(&mut self, e: &LoopExpression) -> Result<Self::Output, Self::Error>;
    fn visit_switch(&mut self, e: &SwitchExpression) -> Result<Self::Output, Self::Error>;
    fn visit_conditional(&mut self, e: &ConditionalExpression) -> Result<Self::Output, Self::Error>;
    fn visit_try(&mut self, e: &TryExpression) -> Result<Self::Output, Self::Error>;
    fn visit_new(&mut self, e: &NewExpression) -> Result<Self::Output, Self::Error>;
    fn visit_lambda(&mut self, e: &LambdaExpression) -> Result<Self::Output, Self::Error>;
}
