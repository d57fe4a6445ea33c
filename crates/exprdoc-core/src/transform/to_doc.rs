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

//! Expression tree to document.

use super::members::write_member;
use super::values::encode_value;
use crate::config::SerializeOptions;
use crate::document::{DocPath, ElementSink, Scalar};
use crate::error::SerializationError;
use crate::expression::*;
use crate::registry::TypeRegistry;
use crate::types::{MemberInfo, Type};
use crate::vocabulary::{self as vocab, tags};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::trace;

type Result<T> = std::result::Result<T, SerializationError>;

/// Emits one element per node.
///
/// The first occurrence of a parameter or label target carries an `id`
/// (`P1`, `P2`, ... and `L1`, `L2`, ... in emission order) together with its
/// type and name; every later occurrence carries only the matching `idref`.
pub struct ToDocVisitor<'r, S: ElementSink> {
    registry: &'r TypeRegistry,
    options: SerializeOptions,
    parameters: HashMap<usize, String>,
    labels: HashMap<usize, String>,
    path: DocPath,
    _sink: PhantomData<S>,
}

impl<'r, S: ElementSink> ToDocVisitor<'r, S> {
    pub fn new(registry: &'r TypeRegistry, options: SerializeOptions) -> Self {
        Self {
            registry,
            options,
            parameters: HashMap::new(),
            labels: HashMap::new(),
            path: DocPath::root(vocab::EXPRESSION),
            _sink: PhantomData,
        }
    }

    /// Serialize the root node as a self-contained document.
    ///
    /// Ids restart at `P1` and `L1` on every call.
    pub fn serialize(&mut self, expr: &Expression) -> Result<S> {
        self.reset_visit_state();
        self.emit(expr)
    }

    /// Forget all ids assigned by previous calls.
    pub fn reset_visit_state(&mut self) {
        self.parameters.clear();
        self.labels.clear();
        self.path = DocPath::root(vocab::EXPRESSION);
    }

    /// Number of distinct parameters and labels emitted so far.
    pub fn symbol_counts(&self) -> (usize, usize) {
        (self.parameters.len(), self.labels.len())
    }

    fn emit(&mut self, expr: &Expression) -> Result<S> {
        let saved = self.path.clone();
        self.path = saved.child(expr.kind_name());
        let result = super::with_stack(|| self.visit(expr)).map(|mut node| {
            if self.options.add_comments {
                node.set_comment(&expr.to_string());
            }
            node
        });
        self.path = saved;
        result
    }

    fn wrapped(&mut self, name: &str, expr: &Expression) -> Result<S> {
        let saved = self.path.clone();
        self.path = saved.child(name);
        let result = self.emit(expr);
        self.path = saved;
        result
    }

    fn array(&mut self, name: &str, exprs: &[&Expression]) -> Result<Vec<S>> {
        let saved = self.path.clone();
        let mut out = Vec::with_capacity(exprs.len());
        for (i, expr) in exprs.iter().enumerate() {
            self.path = saved.child(name).index(i);
            match self.emit(expr) {
                Ok(node) => out.push(node),
                Err(e) => {
                    self.path = saved;
                    return Err(e);
                }
            }
        }
        self.path = saved;
        Ok(out)
    }

    fn set_wrapped(&mut self, node: &mut S, name: &str, expr: &Expression) -> Result<()> {
        let child = self.wrapped(name, expr)?;
        node.set_element(name, child);
        Ok(())
    }

    fn set_opt(&mut self, node: &mut S, name: &str, expr: Option<&Expression>) -> Result<()> {
        match expr {
            Some(expr) => self.set_wrapped(node, name, expr),
            None => Ok(()),
        }
    }

    fn set_array(&mut self, node: &mut S, name: &str, exprs: &[Expression]) -> Result<()> {
        let refs: Vec<&Expression> = exprs.iter().collect();
        let children = self.array(name, &refs)?;
        node.set_elements(name, children);
        Ok(())
    }

    fn type_name(&self, ty: &Type) -> Scalar {
        Scalar::Str(ty.name(self.options.type_names))
    }

    fn set_type(&self, node: &mut S, name: &str, ty: &Type) {
        node.set_scalar(name, self.type_name(ty));
    }

    fn set_member(&self, node: &mut S, name: &str, member: MemberInfo, with_kind: bool) {
        node.set_object(name, write_member(name, &member, with_kind, self.options.type_names));
    }

    fn parameter_node(&mut self, p: &ParameterExpression) -> S {
        let mut node = S::node(tags::PARAMETER);
        if let Some(id) = self.parameters.get(&p.symbol_id()) {
            node.set_scalar(vocab::IDREF, Scalar::Str(id.clone()));
            return node;
        }
        let id = format!("P{}", self.parameters.len() + 1);
        trace!(id = %id, name = ?p.name(), "assigned parameter id");
        node.set_scalar(vocab::ID, Scalar::Str(id.clone()));
        self.set_type(&mut node, vocab::TYPE, p.ty());
        if let Some(name) = p.name() {
            node.set_scalar(vocab::NAME, Scalar::from(name));
        }
        if p.is_by_ref() {
            node.set_scalar(vocab::IS_BY_REF, Scalar::Bool(true));
        }
        self.parameters.insert(p.symbol_id(), id);
        node
    }

    fn parameter_list(&mut self, node: &mut S, name: &str, parameters: &[ParameterExpression]) {
        let nodes = parameters.iter().map(|p| self.parameter_node(p)).collect();
        node.set_elements(name, nodes);
    }

    fn label_node(&mut self, target: &LabelTarget) -> S {
        let mut node = S::node(tags::LABEL_TARGET);
        if let Some(id) = self.labels.get(&target.symbol_id()) {
            node.set_scalar(vocab::IDREF, Scalar::Str(id.clone()));
            return node;
        }
        let id = format!("L{}", self.labels.len() + 1);
        trace!(id = %id, name = ?target.name(), "assigned label id");
        node.set_scalar(vocab::ID, Scalar::Str(id.clone()));
        if !target.ty().is_void() {
            self.set_type(&mut node, vocab::TYPE, target.ty());
        }
        if let Some(name) = target.name() {
            node.set_scalar(vocab::NAME, Scalar::from(name));
        }
        self.labels.insert(target.symbol_id(), id);
        node
    }

    fn lambda_node(&mut self, l: &LambdaExpression) -> Result<S> {
        let mut node = S::node(tags::LAMBDA);
        self.set_type(&mut node, vocab::TYPE, &l.ty);
        if let Some(name) = l.name() {
            node.set_scalar(vocab::NAME, Scalar::from(name));
        }
        if l.tail_call {
            node.set_scalar(vocab::TAIL_CALL, Scalar::Bool(true));
        }
        // Written even when empty; readers require the list.
        self.parameter_list(&mut node, vocab::PARAMETERS, &l.parameters);
        self.set_wrapped(&mut node, vocab::BODY, &l.body)?;
        Ok(node)
    }
}

impl<'r, S: ElementSink> ExpressionVisitor for ToDocVisitor<'r, S> {
    type Output = S;
    type Error = SerializationError;

    fn visit_constant(&mut self, e: &ConstantExpression) -> Result<S> {
        let mut node = S::node(tags::CONSTANT);
        self.set_type(&mut node, vocab::TYPE, &e.ty);
        let path = self.path.child(vocab::VALUE);
        let payload = encode_value(self.registry, &e.value, &e.ty, &path)?;
        node.set_value(vocab::VALUE, payload);
        Ok(node)
    }

    fn visit_default(&mut self, ty: &Type) -> Result<S> {
        let mut node = S::node(tags::DEFAULT);
        self.set_type(&mut node, vocab::TYPE, ty);
        Ok(node)
    }

    fn visit_parameter(&mut self, p: &ParameterExpression) -> Result<S> {
        Ok(self.parameter_node(p))
    }

    fn visit_unary(&mut self, e: &UnaryExpression) -> Result<S> {
        let mut node = S::node(e.op.tag());
        self.set_opt(&mut node, vocab::OPERAND, e.operand())?;
        self.set_type(&mut node, vocab::TYPE, &e.ty);
        if let Some(method) = &e.method {
            self.set_member(&mut node, vocab::METHOD, MemberInfo::Method(method.clone()), false);
        }
        Ok(node)
    }

    fn visit_binary(&mut self, e: &BinaryExpression) -> Result<S> {
        let mut node = S::node(e.op.tag());
        let operands = self.array(vocab::OPERANDS, &[e.left(), e.right()])?;
        node.set_elements(vocab::OPERANDS, operands);
        if e.lifted_to_null {
            node.set_scalar(vocab::IS_LIFTED_TO_NULL, Scalar::Bool(true));
        }
        if let Some(method) = &e.method {
            self.set_member(&mut node, vocab::METHOD, MemberInfo::Method(method.clone()), false);
        }
        if let Some(conversion) = e.conversion() {
            let saved = self.path.clone();
            self.path = saved.child(vocab::CONVERT).child(tags::LAMBDA);
            let converted = self.lambda_node(conversion);
            self.path = saved;
            node.set_element(vocab::CONVERT, converted?);
        }
        Ok(node)
    }

    fn visit_type_binary(&mut self, e: &TypeBinaryExpression) -> Result<S> {
        let mut node = S::node(e.op.tag());
        self.set_wrapped(&mut node, vocab::OPERAND, &e.operand)?;
        self.set_type(&mut node, vocab::TYPE_OPERAND, &e.type_operand);
        Ok(node)
    }

    fn visit_index(&mut self, e: &IndexExpression) -> Result<S> {
        let mut node = S::node(tags::INDEX);
        self.set_wrapped(&mut node, vocab::OBJECT, &e.object)?;
        if let Some(indexer) = &e.indexer {
            self.set_member(&mut node, vocab::INDEXER, MemberInfo::Property(indexer.clone()), false);
        }
        self.set_array(&mut node, vocab::INDEXES, &e.arguments)?;
        Ok(node)
    }

    fn visit_block(&mut self, e: &BlockExpression) -> Result<S> {
        let mut node = S::node(tags::BLOCK);
        let last = e.expressions.last().map(Expression::ty);
        if last != Some(&e.ty) {
            self.set_type(&mut node, vocab::TYPE, &e.ty);
        }
        if !e.variables.is_empty() {
            self.parameter_list(&mut node, vocab::VARIABLES, &e.variables);
        }
        self.set_array(&mut node, vocab::EXPRESSIONS, &e.expressions)?;
        Ok(node)
    }

    fn visit_member(&mut self, e: &MemberExpression) -> Result<S> {
        let mut node = S::node(tags::MEMBER_ACCESS);
        self.set_member(&mut node, vocab::MEMBER, e.member.clone(), true);
        self.set_opt(&mut node, vocab::OBJECT, e.object())?;
        Ok(node)
    }

    fn visit_call(&mut self, e: &MethodCallExpression) -> Result<S> {
        let mut node = S::node(tags::CALL);
        self.set_member(&mut node, vocab::METHOD, MemberInfo::Method(e.method.clone()), false);
        self.set_opt(&mut node, vocab::OBJECT, e.object())?;
        self.set_array(&mut node, vocab::ARGUMENTS, &e.arguments)?;
        Ok(node)
    }

    fn visit_invocation(&mut self, e: &InvocationExpression) -> Result<S> {
        let mut node = S::node(tags::INVOKE);
        self.set_wrapped(&mut node, vocab::DELEGATE, &e.delegate)?;
        self.set_array(&mut node, vocab::ARGUMENTS, &e.arguments)?;
        Ok(node)
    }

    fn visit_label(&mut self, e: &LabelExpression) -> Result<S> {
        let mut node = S::node(tags::LABEL);
        let target = self.label_node(&e.target);
        node.set_element(vocab::LABEL_TARGET, target);
        self.set_opt(&mut node, vocab::DEFAULT_VALUE, e.default_value())?;
        Ok(node)
    }

    fn visit_goto(&mut self, e: &GotoExpression) -> Result<S> {
        let mut node = S::node(tags::GOTO);
        let target = self.label_node(&e.target);
        node.set_element(vocab::LABEL_TARGET, target);
        node.set_scalar(vocab::KIND, Scalar::from(e.kind.tag()));
        self.set_opt(&mut node, vocab::VALUE, e.value())?;
        Ok(node)
    }

    fn visit_loop(&mut self, e: &LoopExpression) -> Result<S> {
        let mut node = S::node(tags::LOOP);
        self.set_wrapped(&mut node, vocab::BODY, &e.body)?;
        if let Some(target) = &e.break_label {
            let label = self.label_node(target);
            node.set_element(vocab::BREAK_LABEL, label);
        }
        if let Some(target) = &e.continue_label {
            let label = self.label_node(target);
            node.set_element(vocab::CONTINUE_LABEL, label);
        }
        Ok(node)
    }

    fn visit_switch(&mut self, e: &SwitchExpression) -> Result<S> {
        let mut node = S::node(tags::SWITCH);
        self.set_type(&mut node, vocab::TYPE, &e.ty);
        self.set_wrapped(&mut node, vocab::VALUE, &e.switch_value)?;
        let saved = self.path.clone();
        let mut cases = Vec::with_capacity(e.cases.len());
        for (i, case) in e.cases.iter().enumerate() {
            self.path = saved.child(vocab::CASES).index(i).child(tags::CASE);
            let mut case_node = S::node(tags::CASE);
            let built = self
                .set_array(&mut case_node, vocab::CASE_VALUES, &case.test_values)
                .and_then(|()| self.set_wrapped(&mut case_node, vocab::BODY, &case.body));
            if let Err(err) = built {
                self.path = saved;
                return Err(err);
            }
            cases.push(case_node);
        }
        self.path = saved;
        if !cases.is_empty() {
            node.set_elements(vocab::CASES, cases);
        }
        self.set_opt(&mut node, vocab::DEFAULT_CASE, e.default_body())?;
        if let Some(method) = &e.comparison {
            self.set_member(&mut node, vocab::METHOD, MemberInfo::Method(method.clone()), false);
        }
        Ok(node)
    }

    fn visit_conditional(&mut self, e: &ConditionalExpression) -> Result<S> {
        let mut node = S::node(tags::CONDITIONAL);
        self.set_wrapped(&mut node, vocab::IF, &e.test)?;
        self.set_wrapped(&mut node, vocab::THEN, &e.if_true)?;
        if let Some(if_false) = e.if_false() {
            self.set_wrapped(&mut node, vocab::ELSE, if_false)?;
            if &e.ty != e.if_true.ty() || &e.ty != if_false.ty() {
                self.set_type(&mut node, vocab::TYPE, &e.ty);
            }
        }
        Ok(node)
    }

    fn visit_try(&mut self, e: &TryExpression) -> Result<S> {
        let mut node = S::node(tags::TRY);
        if &e.ty != e.body.ty() {
            self.set_type(&mut node, vocab::TYPE, &e.ty);
        }
        self.set_wrapped(&mut node, vocab::BODY, &e.body)?;
        let saved = self.path.clone();
        let mut catches = Vec::with_capacity(e.handlers.len());
        for (i, handler) in e.handlers.iter().enumerate() {
            self.path = saved.child(vocab::CATCHES).index(i).child(tags::CATCH);
            let mut catch_node = S::node(tags::CATCH);
            self.set_type(&mut catch_node, vocab::TYPE, &handler.test);
            if let Some(variable) = &handler.variable {
                let p = self.parameter_node(variable);
                catch_node.set_element(vocab::EXCEPTION, p);
            }
            let built = self
                .set_opt(&mut catch_node, vocab::FILTER, handler.filter())
                .and_then(|()| self.set_wrapped(&mut catch_node, vocab::BODY, &handler.body));
            if let Err(err) = built {
                self.path = saved;
                return Err(err);
            }
            catches.push(catch_node);
        }
        self.path = saved;
        if !catches.is_empty() {
            node.set_elements(vocab::CATCHES, catches);
        }
        self.set_opt(&mut node, vocab::FINALLY, e.finally())?;
        self.set_opt(&mut node, vocab::FAULT, e.fault())?;
        Ok(node)
    }

    fn visit_new(&mut self, e: &NewExpression) -> Result<S> {
        let mut node = S::node(tags::NEW);
        self.set_type(&mut node, vocab::TYPE, &e.ty);
        if let Some(ctor) = &e.constructor {
            self.set_member(&mut node, vocab::CONSTRUCTOR, MemberInfo::Constructor(ctor.clone()), false);
        }
        if !e.arguments.is_empty() {
            self.set_array(&mut node, vocab::ARGUMENTS, &e.arguments)?;
        }
        if !e.members.is_empty() {
            let convention = self.options.type_names;
            let fragments = e
                .members
                .iter()
                .map(|m| write_member(vocab::MEMBER, m, true, convention))
                .collect();
            node.set_objects(vocab::MEMBERS, fragments);
        }
        Ok(node)
    }

    fn visit_lambda(&mut self, e: &LambdaExpression) -> Result<S> {
        self.lambda_node(e)
    }
}
