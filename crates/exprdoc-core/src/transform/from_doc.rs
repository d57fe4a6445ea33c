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

//! Document to expression tree.

use super::members::{read_any_member, read_constructor, read_method, read_property};
use super::values::decode_value;
use crate::config::DeserializeOptions;
use crate::document::DocElement;
use crate::error::{ExpressionError, SerializationError, TransformError};
use crate::expression::{
    BinaryOp, CatchBlock, Expression, GotoKind, LabelTarget, LambdaExpression,
    ParameterExpression, SwitchCase, TypeBinaryOp, UnaryOp,
};
use crate::registry::TypeRegistry;
use crate::types::Type;
use crate::vocabulary::{self as vocab, tags};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::trace;

type Result<T> = std::result::Result<T, TransformError>;

/// Builder selected by a node tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Constant,
    Default,
    Parameter,
    Unary(UnaryOp),
    Rethrow,
    Binary(BinaryOp),
    TypeBinary(TypeBinaryOp),
    Index,
    Block,
    MemberAccess,
    Call,
    Invoke,
    Label,
    Goto,
    Loop,
    Switch,
    Conditional,
    Try,
    New,
    Lambda,
}

static NODE_KINDS: Lazy<HashMap<&'static str, NodeKind>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(UnaryOp::ALL.len() + BinaryOp::ALL.len() + 20);
    for op in UnaryOp::ALL {
        map.insert(op.tag(), NodeKind::Unary(*op));
    }
    for op in BinaryOp::ALL {
        map.insert(op.tag(), NodeKind::Binary(*op));
    }
    for op in TypeBinaryOp::ALL {
        map.insert(op.tag(), NodeKind::TypeBinary(*op));
    }
    map.insert("rethrow", NodeKind::Rethrow);
    map.insert(tags::CONSTANT, NodeKind::Constant);
    map.insert(tags::DEFAULT, NodeKind::Default);
    map.insert(tags::PARAMETER, NodeKind::Parameter);
    map.insert(tags::INDEX, NodeKind::Index);
    map.insert(tags::BLOCK, NodeKind::Block);
    map.insert(tags::MEMBER_ACCESS, NodeKind::MemberAccess);
    map.insert(tags::CALL, NodeKind::Call);
    map.insert(tags::INVOKE, NodeKind::Invoke);
    map.insert(tags::LABEL, NodeKind::Label);
    map.insert(tags::GOTO, NodeKind::Goto);
    map.insert(tags::LOOP, NodeKind::Loop);
    map.insert(tags::SWITCH, NodeKind::Switch);
    map.insert(tags::CONDITIONAL, NodeKind::Conditional);
    map.insert(tags::TRY, NodeKind::Try);
    map.insert(tags::NEW, NodeKind::New);
    map.insert(tags::LAMBDA, NodeKind::Lambda);
    map
});

/// Symbols seen during one traversal, keyed by document id.
#[derive(Debug, Default)]
pub struct VisitState {
    parameters: HashMap<String, ParameterExpression>,
    labels: HashMap<String, LabelTarget>,
}

impl VisitState {
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

/// Rebuilds expression trees from document elements.
///
/// Within one traversal every `idref` resolves to the symbol created for the
/// matching `id`. Call [`FromDocVisitor::reset_visit_state`] before reusing
/// the visitor for an unrelated document.
pub struct FromDocVisitor<'r> {
    registry: &'r TypeRegistry,
    options: DeserializeOptions,
    state: VisitState,
    depth: usize,
}

fn check<T>(element: &impl DocElement, result: std::result::Result<T, ExpressionError>) -> Result<T> {
    result.map_err(|e| SerializationError::invalid_expression(element.path(), e).into())
}

impl<'r> FromDocVisitor<'r> {
    pub fn new(registry: &'r TypeRegistry, options: DeserializeOptions) -> Self {
        Self {
            registry,
            options,
            state: VisitState::default(),
            depth: 0,
        }
    }

    /// Forget all symbols from previous traversals.
    pub fn reset_visit_state(&mut self) {
        self.state = VisitState::default();
        self.depth = 0;
    }

    pub fn state(&self) -> &VisitState {
        &self.state
    }

    /// Rebuild the node `element` and everything below it.
    pub fn visit<E: DocElement>(&mut self, element: &E) -> Result<Expression> {
        if self.depth >= self.options.max_depth {
            return Err(SerializationError::depth_limit(element.path(), self.options.max_depth).into());
        }
        self.depth += 1;
        let result = super::with_stack(|| self.dispatch(element));
        self.depth -= 1;
        result
    }

    fn dispatch<E: DocElement>(&mut self, e: &E) -> Result<Expression> {
        let kind = match NODE_KINDS.get(e.tag()) {
            Some(kind) => *kind,
            None => return Err(SerializationError::unknown_node_kind(e.path(), e.tag()).into()),
        };
        match kind {
            NodeKind::Constant => self.constant(e),
            NodeKind::Default => {
                let ty = e.get_type(self.registry)?;
                check(e, Expression::default_value(ty))
            }
            NodeKind::Parameter => Ok(self.parameter(e)?.into()),
            NodeKind::Unary(op) => self.unary(e, op),
            NodeKind::Rethrow => {
                let ty = self.type_or_void(e)?;
                check(e, Expression::throw(None, ty))
            }
            NodeKind::Binary(op) => self.binary(e, op),
            NodeKind::TypeBinary(op) => {
                let operand = self.child(e, vocab::OPERAND)?;
                let type_operand = e.get_type_from_property(self.registry, vocab::TYPE_OPERAND)?;
                check(e, Expression::make_type_binary(op, operand, type_operand))
            }
            NodeKind::Index => {
                let object = self.child(e, vocab::OBJECT)?;
                let indexer = match e.object(vocab::INDEXER)? {
                    Some(f) => Some(read_property(&f, self.registry)?),
                    None => None,
                };
                let arguments = self.children(e, vocab::INDEXES)?;
                check(e, Expression::make_index(object, indexer, arguments))
            }
            NodeKind::Block => {
                let ty = e.type_from_property(self.registry, vocab::TYPE)?;
                let variables = self.parameters(e, vocab::VARIABLES)?;
                let expressions = self.children(e, vocab::EXPRESSIONS)?;
                check(e, Expression::block(ty, variables, expressions))
            }
            NodeKind::MemberAccess => {
                let member = read_any_member(&e.get_object(vocab::MEMBER)?, self.registry)?;
                let object = self.opt_child(e, vocab::OBJECT)?;
                check(e, Expression::make_member_access(object, member))
            }
            NodeKind::Call => {
                let method = read_method(&e.get_object(vocab::METHOD)?, self.registry)?;
                let object = self.opt_child(e, vocab::OBJECT)?;
                let arguments = self.children_or_empty(e, vocab::ARGUMENTS)?;
                check(e, Expression::call(object, method, arguments))
            }
            NodeKind::Invoke => {
                let delegate = self.child(e, vocab::DELEGATE)?;
                let arguments = self.children_or_empty(e, vocab::ARGUMENTS)?;
                check(e, Expression::invoke(delegate, arguments))
            }
            NodeKind::Label => {
                let target = self.label_target(&e.get_element(vocab::LABEL_TARGET)?)?;
                let default_value = self.opt_child(e, vocab::DEFAULT_VALUE)?;
                check(e, Expression::label(target, default_value))
            }
            NodeKind::Goto => {
                let target = self.label_target(&e.get_element(vocab::LABEL_TARGET)?)?;
                let text = e.get_property::<String>(vocab::KIND)?;
                let kind = GotoKind::from_tag(&text).ok_or_else(|| {
                    SerializationError::invalid_value(e.path(), format!("'{}' is not a goto kind", text))
                })?;
                let value = self.opt_child(e, vocab::VALUE)?;
                check(e, Expression::make_goto(kind, target, value))
            }
            NodeKind::Loop => {
                let body = self.child(e, vocab::BODY)?;
                let break_label = self.opt_label(e, vocab::BREAK_LABEL)?;
                let continue_label = self.opt_label(e, vocab::CONTINUE_LABEL)?;
                check(e, Expression::make_loop(body, break_label, continue_label))
            }
            NodeKind::Switch => self.switch(e),
            NodeKind::Conditional => {
                let test = self.child(e, vocab::IF)?;
                let if_true = self.child(e, vocab::THEN)?;
                let if_false = self.opt_child(e, vocab::ELSE)?;
                let ty = e.type_from_property(self.registry, vocab::TYPE)?;
                check(e, Expression::condition(test, if_true, if_false, ty))
            }
            NodeKind::Try => self.try_expression(e),
            NodeKind::New => {
                let ty = e.get_type(self.registry)?;
                let constructor = match e.object(vocab::CONSTRUCTOR)? {
                    Some(f) => Some(read_constructor(&f, self.registry)?),
                    None => None,
                };
                let arguments = self.children_or_empty(e, vocab::ARGUMENTS)?;
                let mut members = Vec::new();
                for fragment in e.objects_or_empty(vocab::MEMBERS)? {
                    members.push(read_any_member(&fragment, self.registry)?);
                }
                check(e, Expression::new_object(ty, constructor, arguments, members))
            }
            NodeKind::Lambda => Ok(self.lambda(e)?.into()),
        }
    }

    fn child<E: DocElement>(&mut self, e: &E, name: &str) -> Result<Expression> {
        let child = e.get_element(name)?;
        self.visit(&child)
    }

    fn opt_child<E: DocElement>(&mut self, e: &E, name: &str) -> Result<Option<Expression>> {
        match e.element(name)? {
            Some(child) => Ok(Some(self.visit(&child)?)),
            None => Ok(None),
        }
    }

    fn visit_all<E: DocElement>(&mut self, elements: Vec<E>) -> Result<Vec<Expression>> {
        elements.iter().map(|child| self.visit(child)).collect()
    }

    fn children<E: DocElement>(&mut self, e: &E, name: &str) -> Result<Vec<Expression>> {
        let elements = e.get_elements(name)?;
        self.visit_all(elements)
    }

    fn children_or_empty<E: DocElement>(&mut self, e: &E, name: &str) -> Result<Vec<Expression>> {
        let elements = e.elements_or_empty(name)?;
        self.visit_all(elements)
    }

    fn type_or_void<E: DocElement>(&self, e: &E) -> Result<Type> {
        Ok(e.type_from_property(self.registry, vocab::TYPE)?
            .unwrap_or_else(Type::void))
    }

    fn constant<E: DocElement>(&mut self, e: &E) -> Result<Expression> {
        let ty = e.get_type(self.registry)?;
        let payload = e.get_value(vocab::VALUE)?;
        let value = decode_value(self.registry, &payload, &ty)?;
        check(e, Expression::constant(value, ty))
    }

    fn unary<E: DocElement>(&mut self, e: &E, op: UnaryOp) -> Result<Expression> {
        let operand = if op == UnaryOp::Throw {
            self.opt_child(e, vocab::OPERAND)?
        } else {
            Some(self.child(e, vocab::OPERAND)?)
        };
        let ty = if op == UnaryOp::Throw {
            self.type_or_void(e)?
        } else {
            e.get_type(self.registry)?
        };
        let method = match e.object(vocab::METHOD)? {
            Some(f) => Some(read_method(&f, self.registry)?),
            None => None,
        };
        check(e, Expression::make_unary(op, operand, ty, method))
    }

    fn binary<E: DocElement>(&mut self, e: &E, op: BinaryOp) -> Result<Expression> {
        let operands = e.get_elements(vocab::OPERANDS)?;
        if operands.len() != 2 {
            return Err(SerializationError::operand_count(
                &e.path().child(vocab::OPERANDS),
                e.tag(),
                2,
                operands.len(),
            )
            .into());
        }
        let mut operands = self.visit_all(operands)?.into_iter();
        let (left, right) = match (operands.next(), operands.next()) {
            (Some(left), Some(right)) => (left, right),
            _ => return Err(SerializationError::operand_count(e.path(), e.tag(), 2, 0).into()),
        };
        let lifted_to_null = e.property_or(vocab::IS_LIFTED_TO_NULL, false)?;
        let method = match e.object(vocab::METHOD)? {
            Some(f) => Some(read_method(&f, self.registry)?),
            None => None,
        };
        let conversion = match e.element(vocab::CONVERT)? {
            Some(c) => Some(self.lambda_node(&c)?),
            None => None,
        };
        check(e, Expression::make_binary(op, left, right, lifted_to_null, method, conversion))
    }

    fn switch<E: DocElement>(&mut self, e: &E) -> Result<Expression> {
        let ty = e.type_from_property(self.registry, vocab::TYPE)?;
        let value = self.child(e, vocab::VALUE)?;
        let mut cases = Vec::new();
        for case in e.elements_or_empty(vocab::CASES)? {
            cases.push(self.switch_case(&case)?);
        }
        let default_body = self.opt_child(e, vocab::DEFAULT_CASE)?;
        let comparison = match e.object(vocab::METHOD)? {
            Some(f) => Some(read_method(&f, self.registry)?),
            None => None,
        };
        check(e, Expression::switch(ty, value, default_body, comparison, cases))
    }

    fn switch_case<E: DocElement>(&mut self, e: &E) -> Result<SwitchCase> {
        expect_tag(e, tags::CASE)?;
        let test_values = self.children(e, vocab::CASE_VALUES)?;
        let body = self.child(e, vocab::BODY)?;
        check(e, Expression::switch_case(test_values, body))
    }

    fn try_expression<E: DocElement>(&mut self, e: &E) -> Result<Expression> {
        let ty = e.type_from_property(self.registry, vocab::TYPE)?;
        let body = self.child(e, vocab::BODY)?;
        let mut handlers = Vec::new();
        for handler in e.elements_or_empty(vocab::CATCHES)? {
            handlers.push(self.catch_block(&handler)?);
        }
        let finally = self.opt_child(e, vocab::FINALLY)?;
        let fault = self.opt_child(e, vocab::FAULT)?;
        check(e, Expression::make_try(ty, body, finally, fault, handlers))
    }

    fn catch_block<E: DocElement>(&mut self, e: &E) -> Result<CatchBlock> {
        expect_tag(e, tags::CATCH)?;
        let test = e.get_type(self.registry)?;
        let variable = match e.element(vocab::EXCEPTION)? {
            Some(p) => Some(self.parameter(&p)?),
            None => None,
        };
        let filter = self.opt_child(e, vocab::FILTER)?;
        let body = self.child(e, vocab::BODY)?;
        check(e, Expression::catch_block(test, variable, body, filter))
    }

    fn lambda<E: DocElement>(&mut self, e: &E) -> Result<LambdaExpression> {
        let list = e.get_elements(vocab::PARAMETERS)?;
        let mut parameters = Vec::with_capacity(list.len());
        for p in &list {
            parameters.push(self.parameter(p)?);
        }
        let body = self.child(e, vocab::BODY)?;
        let ty = e.type_from_property(self.registry, vocab::TYPE)?;
        let tail_call = e.property_or(vocab::TAIL_CALL, false)?;
        let name = e.property::<String>(vocab::NAME)?;
        check(e, Expression::lambda(ty, body, parameters, tail_call, name.as_deref()))
    }

    /// A wrapped node that must be a lambda.
    fn lambda_node<E: DocElement>(&mut self, e: &E) -> Result<LambdaExpression> {
        expect_tag(e, tags::LAMBDA)?;
        if self.depth >= self.options.max_depth {
            return Err(SerializationError::depth_limit(e.path(), self.options.max_depth).into());
        }
        self.depth += 1;
        let result = super::with_stack(|| self.lambda(e));
        self.depth -= 1;
        result
    }

    fn parameters<E: DocElement>(&mut self, e: &E, name: &str) -> Result<Vec<ParameterExpression>> {
        let mut out = Vec::new();
        for p in e.elements_or_empty(name)? {
            out.push(self.parameter(&p)?);
        }
        Ok(out)
    }

    fn parameter<E: DocElement>(&mut self, e: &E) -> Result<ParameterExpression> {
        expect_tag(e, tags::PARAMETER)?;
        if let Some(idref) = e.try_idref() {
            return self
                .state
                .parameters
                .get(&idref)
                .cloned()
                .ok_or_else(|| SerializationError::unresolved_reference(e.path(), &idref).into());
        }
        let id = e.try_id();
        if let Some(existing) = id.as_ref().and_then(|id| self.state.parameters.get(id)) {
            return Ok(existing.clone());
        }
        let ty = e.get_type(self.registry)?;
        let ty = if e.property_or(vocab::IS_BY_REF, false)? {
            Type::by_ref(ty)
        } else {
            ty
        };
        let name = e.try_name();
        let parameter = ParameterExpression::new(ty, name.as_deref());
        if let Some(id) = id {
            trace!(id = %id, name = ?name, "declared parameter");
            self.state.parameters.insert(id, parameter.clone());
        }
        Ok(parameter)
    }

    fn opt_label<E: DocElement>(&mut self, e: &E, name: &str) -> Result<Option<LabelTarget>> {
        match e.element(name)? {
            Some(target) => Ok(Some(self.label_target(&target)?)),
            None => Ok(None),
        }
    }

    fn label_target<E: DocElement>(&mut self, e: &E) -> Result<LabelTarget> {
        expect_tag(e, tags::LABEL_TARGET)?;
        if let Some(idref) = e.try_idref() {
            return self
                .state
                .labels
                .get(&idref)
                .cloned()
                .ok_or_else(|| SerializationError::unresolved_reference(e.path(), &idref).into());
        }
        let id = e.try_id();
        if let Some(existing) = id.as_ref().and_then(|id| self.state.labels.get(id)) {
            return Ok(existing.clone());
        }
        let ty = self.type_or_void(e)?;
        let name = e.try_name();
        let target = LabelTarget::new(ty, name.as_deref());
        if let Some(id) = id {
            trace!(id = %id, name = ?name, "declared label");
            self.state.labels.insert(id, target.clone());
        }
        Ok(target)
    }
}

fn expect_tag<E: DocElement>(e: &E, tag: &str) -> Result<()> {
    if e.tag() == tag {
        Ok(())
    } else {
        Err(SerializationError::unexpected_node(e.path(), &format!("'{}'", tag), &format!("'{}'", e.tag())).into())
    }
}
