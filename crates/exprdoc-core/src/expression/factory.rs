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

//! Validating node constructors.

use super::*;
use crate::error::ExpressionError;
use crate::types::{BasicType, ParameterSpec, TypeKind};

type Result<T> = std::result::Result<T, ExpressionError>;

fn mismatch(context: &str, expected: &Type, found: &Type) -> ExpressionError {
    ExpressionError::TypeMismatch {
        context: context.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn not_defined(op: impl std::fmt::Display, ty: &Type) -> ExpressionError {
    ExpressionError::OperatorNotDefined {
        operator: op.to_string(),
        operand_type: ty.to_string(),
    }
}

fn check_count(context: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ExpressionError::ArgumentCount {
            context: context.to_string(),
            expected,
            found,
        })
    }
}

fn check_assignable(context: &str, target: &Type, source: &Type) -> Result<()> {
    if target.is_assignable_from(source) {
        Ok(())
    } else {
        Err(mismatch(context, target, source))
    }
}

/// Arguments must match parameters exactly for by-ref slots and be
/// assignable otherwise.
fn check_arguments(context: &str, parameters: &[ParameterSpec], arguments: &[Expression]) -> Result<()> {
    check_count(context, parameters.len(), arguments.len())?;
    for (parameter, argument) in parameters.iter().zip(arguments) {
        if parameter.by_ref {
            if &parameter.ty != argument.ty() {
                return Err(mismatch(context, &parameter.ty, argument.ty()));
            }
        } else {
            check_assignable(context, &parameter.ty, argument.ty())?;
        }
    }
    Ok(())
}

/// Instance/static consistency between a member and its target object.
fn check_instance(
    context: &str,
    is_static: bool,
    declaring_type: &Type,
    object: Option<&Expression>,
) -> Result<()> {
    match (is_static, object) {
        (true, Some(_)) => Err(ExpressionError::InvalidMember(format!(
            "{}: static member used with an instance",
            context
        ))),
        (false, None) => Err(ExpressionError::InvalidMember(format!(
            "{}: instance member used without an instance",
            context
        ))),
        (false, Some(object)) => check_assignable(context, declaring_type, object.ty()),
        (true, None) => Ok(()),
    }
}

fn boxed(e: Expression) -> Box<Expression> {
    Box::new(e)
}

/// Whether both types are the same up to nullability, returning the lifted flag.
fn same_or_lifted(left: &Type, right: &Type) -> Option<bool> {
    if left.non_nullable() != right.non_nullable() {
        return None;
    }
    Some(left.is_nullable() || right.is_nullable())
}

fn lift(ty: Type, lifted: bool) -> Type {
    if lifted && ty.is_value_type() && !ty.is_nullable() {
        Type::nullable(ty)
    } else {
        ty
    }
}

impl Expression {
    /// A constant; `value` must be a valid instance of `ty`.
    pub fn constant(value: Value, ty: Type) -> Result<Expression> {
        if !value.conforms_to(&ty) {
            return Err(ExpressionError::TypeMismatch {
                context: "constant".to_string(),
                expected: ty.to_string(),
                found: value.to_string(),
            });
        }
        Ok(Expression::Constant(ConstantExpression { value, ty }))
    }

    /// A constant whose type follows from a scalar value.
    pub fn constant_of(value: Value) -> Result<Expression> {
        let ty = match value.basic_type() {
            Some(basic) => Type::Basic(basic),
            None => {
                return Err(ExpressionError::InvalidShape(format!(
                    "the type of constant '{}' must be given explicitly",
                    value
                )))
            }
        };
        Expression::constant(value, ty)
    }

    pub fn default_value(ty: Type) -> Result<Expression> {
        if ty.is_by_ref() {
            return Err(ExpressionError::InvalidShape(
                "default of a by-ref type".to_string(),
            ));
        }
        Ok(Expression::Default(ty))
    }

    pub fn parameter(ty: Type, name: Option<&str>) -> ParameterExpression {
        ParameterExpression::new(ty, name)
    }

    /// A unary node; `ty` is the declared result type.
    pub fn make_unary(
        op: UnaryOp,
        operand: Option<Expression>,
        ty: Type,
        method: Option<Arc<MethodInfo>>,
    ) -> Result<Expression> {
        let operand = match operand {
            Some(operand) => operand,
            None if op == UnaryOp::Throw => {
                return Ok(Expression::Unary(UnaryExpression {
                    op,
                    operand: None,
                    ty,
                    method: None,
                }))
            }
            None => {
                return Err(ExpressionError::InvalidShape(format!(
                    "'{}' requires an operand",
                    op
                )))
            }
        };
        let derived = unary_result_type(op, &operand, &ty, method.as_deref())?;
        if !op.has_explicit_type() && derived != ty {
            return Err(mismatch(op.tag(), &derived, &ty));
        }
        Ok(Expression::Unary(UnaryExpression {
            op,
            operand: Some(boxed(operand)),
            ty: derived,
            method,
        }))
    }

    /// A unary node whose result type is derived from the operand.
    pub fn unary(op: UnaryOp, operand: Expression) -> Result<Expression> {
        let ty = unary_result_type(op, &operand, &Type::void(), None)?;
        Expression::make_unary(op, Some(operand), ty, None)
    }

    pub fn convert(operand: Expression, ty: Type) -> Result<Expression> {
        Expression::make_unary(UnaryOp::Convert, Some(operand), ty, None)
    }

    pub fn throw(exception: Option<Expression>, ty: Type) -> Result<Expression> {
        Expression::make_unary(UnaryOp::Throw, exception, ty, None)
    }

    /// A binary node.
    pub fn make_binary(
        op: BinaryOp,
        left: Expression,
        right: Expression,
        lifted_to_null: bool,
        method: Option<Arc<MethodInfo>>,
        conversion: Option<LambdaExpression>,
    ) -> Result<Expression> {
        if conversion.is_some() && op != BinaryOp::Coalesce {
            return Err(ExpressionError::InvalidShape(format!(
                "a conversion lambda is only valid for coalesce, not '{}'",
                op
            )));
        }
        let ty = if op.is_assignment() {
            if !left.is_writable() {
                return Err(ExpressionError::NotWritable(left.to_string()));
            }
            match op.underlying() {
                None => {
                    check_assignable("assign", left.ty(), right.ty())?;
                    left.ty().clone()
                }
                Some(underlying) => {
                    let result =
                        binary_result_type(underlying, &left, &right, lifted_to_null, method.as_deref(), None)?;
                    check_assignable(op.tag(), left.ty(), &result)?;
                    left.ty().clone()
                }
            }
        } else {
            binary_result_type(op, &left, &right, lifted_to_null, method.as_deref(), conversion.as_ref())?
        };
        Ok(Expression::Binary(BinaryExpression {
            op,
            left: boxed(left),
            right: boxed(right),
            ty,
            lifted_to_null,
            method,
            conversion: conversion.map(Box::new),
        }))
    }

    /// A binary node without overload method or lifting to null.
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Result<Expression> {
        Expression::make_binary(op, left, right, false, None, None)
    }

    pub fn type_is(operand: Expression, type_operand: Type) -> Result<Expression> {
        Expression::make_type_binary(TypeBinaryOp::TypeIs, operand, type_operand)
    }

    pub fn type_equal(operand: Expression, type_operand: Type) -> Result<Expression> {
        Expression::make_type_binary(TypeBinaryOp::TypeEqual, operand, type_operand)
    }

    pub fn make_type_binary(
        op: TypeBinaryOp,
        operand: Expression,
        type_operand: Type,
    ) -> Result<Expression> {
        if operand.ty().is_void() || type_operand.is_by_ref() {
            return Err(not_defined(op, operand.ty()));
        }
        Ok(Expression::TypeBinary(TypeBinaryExpression {
            op,
            operand: boxed(operand),
            type_operand,
            ty: Type::boolean(),
        }))
    }

    /// Indexer access, or array element access when `indexer` is `None`.
    pub fn make_index(
        object: Expression,
        indexer: Option<Arc<PropertyInfo>>,
        arguments: Vec<Expression>,
    ) -> Result<Expression> {
        let ty = match &indexer {
            Some(property) => {
                if property.index_parameters.is_empty() {
                    return Err(ExpressionError::InvalidMember(format!(
                        "property '{}' is not an indexer",
                        property.name
                    )));
                }
                check_instance("index", property.is_static, &property.declaring_type, Some(&object))?;
                let specs: Vec<ParameterSpec> = property
                    .index_parameters
                    .iter()
                    .cloned()
                    .map(ParameterSpec::new)
                    .collect();
                check_arguments("index", &specs, &arguments)?;
                property.ty.clone()
            }
            None => {
                let element = match object.ty() {
                    Type::Array(element) => (**element).clone(),
                    other => return Err(not_defined("index", other)),
                };
                check_count("array index", 1, arguments.len())?;
                check_assignable("array index", &Type::int32(), arguments[0].ty())?;
                element
            }
        };
        Ok(Expression::Index(IndexExpression {
            object: boxed(object),
            indexer,
            arguments,
            ty,
        }))
    }

    /// A block; the value is the last expression unless `ty` is void.
    pub fn block(
        ty: Option<Type>,
        variables: Vec<ParameterExpression>,
        expressions: Vec<Expression>,
    ) -> Result<Expression> {
        let last = expressions.last().ok_or_else(|| {
            ExpressionError::InvalidShape("a block needs at least one expression".to_string())
        })?;
        let ty = match ty {
            None => last.ty().clone(),
            Some(ty) if ty.is_void() => ty,
            Some(ty) => {
                check_assignable("block", &ty, last.ty())?;
                ty
            }
        };
        for (i, v) in variables.iter().enumerate() {
            if v.is_by_ref() {
                return Err(ExpressionError::InvalidShape(
                    "block variables cannot be by-ref".to_string(),
                ));
            }
            if variables[..i].iter().any(|other| other == v) {
                return Err(ExpressionError::InvalidShape(format!(
                    "variable '{}' is declared twice in one block",
                    v.name().unwrap_or("?")
                )));
            }
        }
        Ok(Expression::Block(BlockExpression {
            variables,
            expressions,
            ty,
        }))
    }

    /// Property or field access; `object` is `None` for static members.
    pub fn make_member_access(object: Option<Expression>, member: MemberInfo) -> Result<Expression> {
        let ty = match &member {
            MemberInfo::Property(p) if p.index_parameters.is_empty() => p.ty.clone(),
            MemberInfo::Field(f) => f.ty.clone(),
            other => {
                return Err(ExpressionError::InvalidMember(format!(
                    "'{}' is not a property or field",
                    other
                )))
            }
        };
        check_instance(
            "member access",
            member.is_static(),
            member.declaring_type(),
            object.as_ref(),
        )?;
        Ok(Expression::Member(MemberExpression {
            object: object.map(boxed),
            member,
            ty,
        }))
    }

    /// Method call; `object` is `None` for static methods.
    pub fn call(
        object: Option<Expression>,
        method: Arc<MethodInfo>,
        arguments: Vec<Expression>,
    ) -> Result<Expression> {
        let context = format!("call to '{}'", method.name);
        check_instance(&context, method.is_static, &method.declaring_type, object.as_ref())?;
        check_arguments(&context, &method.parameters, &arguments)?;
        Ok(Expression::MethodCall(MethodCallExpression {
            object: object.map(boxed),
            method,
            arguments,
        }))
    }

    /// Delegate or lambda invocation.
    pub fn invoke(delegate: Expression, arguments: Vec<Expression>) -> Result<Expression> {
        let (parameters, ret) = match delegate.ty().delegate_signature() {
            Some((parameters, ret)) => (
                parameters.iter().cloned().map(ParameterSpec::new).collect::<Vec<_>>(),
                ret,
            ),
            None => return Err(not_defined("invoke", delegate.ty())),
        };
        check_arguments("invoke", &parameters, &arguments)?;
        Ok(Expression::Invocation(InvocationExpression {
            delegate: boxed(delegate),
            arguments,
            ty: ret,
        }))
    }

    pub fn label(target: LabelTarget, default_value: Option<Expression>) -> Result<Expression> {
        match (&default_value, target.ty().is_void()) {
            (Some(value), true) => {
                return Err(mismatch("label default value", target.ty(), value.ty()));
            }
            (Some(value), false) => check_assignable("label default value", target.ty(), value.ty())?,
            (None, false) => {
                return Err(ExpressionError::InvalidShape(format!(
                    "label of type '{}' requires a default value",
                    target.ty()
                )))
            }
            (None, true) => {}
        }
        Ok(Expression::Label(LabelExpression {
            target,
            default_value: default_value.map(boxed),
        }))
    }

    /// A jump; the node's type is the target's type.
    pub fn make_goto(kind: GotoKind, target: LabelTarget, value: Option<Expression>) -> Result<Expression> {
        match (&value, target.ty().is_void()) {
            (Some(v), true) => return Err(mismatch(kind.tag(), target.ty(), v.ty())),
            (Some(v), false) => check_assignable(kind.tag(), target.ty(), v.ty())?,
            (None, false) => {
                return Err(ExpressionError::InvalidShape(format!(
                    "'{}' to a label of type '{}' requires a value",
                    kind,
                    target.ty()
                )))
            }
            (None, true) => {}
        }
        Ok(Expression::Goto(GotoExpression {
            kind,
            target,
            value: value.map(boxed),
        }))
    }

    pub fn make_loop(
        body: Expression,
        break_label: Option<LabelTarget>,
        continue_label: Option<LabelTarget>,
    ) -> Result<Expression> {
        if let Some(label) = &continue_label {
            if !label.ty().is_void() {
                return Err(mismatch("loop continue label", &Type::void(), label.ty()));
            }
        }
        let ty = break_label
            .as_ref()
            .map_or_else(Type::void, |l| l.ty().clone());
        Ok(Expression::Loop(LoopExpression {
            body: boxed(body),
            break_label,
            continue_label,
            ty,
        }))
    }

    pub fn switch_case(test_values: Vec<Expression>, body: Expression) -> Result<SwitchCase> {
        if test_values.is_empty() {
            return Err(ExpressionError::InvalidShape(
                "a switch case needs at least one test value".to_string(),
            ));
        }
        Ok(SwitchCase { test_values, body })
    }

    /// A switch. Without explicit `ty` all bodies must share one type.
    pub fn switch(
        ty: Option<Type>,
        switch_value: Expression,
        default_body: Option<Expression>,
        comparison: Option<Arc<MethodInfo>>,
        cases: Vec<SwitchCase>,
    ) -> Result<Expression> {
        if switch_value.ty().is_void() {
            return Err(not_defined("switch", switch_value.ty()));
        }
        if cases.is_empty() && default_body.is_none() {
            return Err(ExpressionError::InvalidShape(
                "a switch needs at least one case or a default body".to_string(),
            ));
        }
        if let Some(method) = &comparison {
            if method.parameters.len() != 2 || !method.return_type.is_bool() {
                return Err(ExpressionError::InvalidMember(format!(
                    "'{}' is not a valid switch comparison",
                    method
                )));
            }
        }
        for case in &cases {
            for test in &case.test_values {
                match &comparison {
                    Some(method) => {
                        check_assignable("switch value", &method.parameters[0].ty, switch_value.ty())?;
                        check_assignable("switch case value", &method.parameters[1].ty, test.ty())?;
                    }
                    None if test.ty() != switch_value.ty() => {
                        return Err(mismatch("switch case value", switch_value.ty(), test.ty()))
                    }
                    None => {}
                }
            }
        }
        let bodies = cases
            .iter()
            .map(|c| &c.body)
            .chain(default_body.as_ref());
        let ty = match ty {
            Some(ty) if ty.is_void() => ty,
            Some(ty) => {
                for body in bodies {
                    check_assignable("switch body", &ty, body.ty())?;
                }
                ty
            }
            None => {
                let mut bodies = bodies;
                let first = bodies.next().map(|b| b.ty().clone()).unwrap_or_else(Type::void);
                for body in bodies {
                    if body.ty() != &first {
                        return Err(mismatch("switch body", &first, body.ty()));
                    }
                }
                first
            }
        };
        Ok(Expression::Switch(SwitchExpression {
            switch_value: boxed(switch_value),
            cases,
            default_body: default_body.map(boxed),
            comparison,
            ty,
        }))
    }

    /// `test ? if_true : if_false`, or an if-then statement when `if_false` is `None`.
    pub fn condition(
        test: Expression,
        if_true: Expression,
        if_false: Option<Expression>,
        ty: Option<Type>,
    ) -> Result<Expression> {
        if !test.ty().is_bool() {
            return Err(mismatch("condition test", &Type::boolean(), test.ty()));
        }
        let ty = match (&if_false, ty) {
            (None, _) => Type::void(),
            (Some(_), Some(ty)) if ty.is_void() => ty,
            (Some(if_false), Some(ty)) => {
                check_assignable("condition", &ty, if_true.ty())?;
                check_assignable("condition", &ty, if_false.ty())?;
                ty
            }
            (Some(if_false), None) => {
                if if_true.ty() != if_false.ty() {
                    return Err(mismatch("condition", if_true.ty(), if_false.ty()));
                }
                if_true.ty().clone()
            }
        };
        Ok(Expression::Conditional(ConditionalExpression {
            test: boxed(test),
            if_true: boxed(if_true),
            if_false: if_false.map(boxed),
            ty,
        }))
    }

    pub fn catch_block(
        test: Type,
        variable: Option<ParameterExpression>,
        body: Expression,
        filter: Option<Expression>,
    ) -> Result<CatchBlock> {
        if !test.is_reference_type() {
            return Err(mismatch("catch", &Type::object(), &test));
        }
        if let Some(variable) = &variable {
            if variable.is_by_ref() || variable.ty() != &test {
                return Err(mismatch("catch variable", &test, &variable.signature_type()));
            }
        }
        if let Some(filter) = &filter {
            if !filter.ty().is_bool() {
                return Err(mismatch("catch filter", &Type::boolean(), filter.ty()));
            }
        }
        Ok(CatchBlock {
            test,
            variable,
            body,
            filter,
        })
    }

    /// A try expression. A fault block excludes catch handlers and finally.
    pub fn make_try(
        ty: Option<Type>,
        body: Expression,
        finally: Option<Expression>,
        fault: Option<Expression>,
        handlers: Vec<CatchBlock>,
    ) -> Result<Expression> {
        if fault.is_some() && (finally.is_some() || !handlers.is_empty()) {
            return Err(ExpressionError::FaultWithHandlers);
        }
        if fault.is_none() && finally.is_none() && handlers.is_empty() {
            return Err(ExpressionError::InvalidShape(
                "a try expression needs a catch, finally or fault block".to_string(),
            ));
        }
        let ty = ty.unwrap_or_else(|| body.ty().clone());
        if !ty.is_void() {
            check_assignable("try body", &ty, body.ty())?;
            for handler in &handlers {
                check_assignable("catch body", &ty, handler.body.ty())?;
            }
        }
        Ok(Expression::Try(TryExpression {
            body: boxed(body),
            handlers,
            finally: finally.map(boxed),
            fault: fault.map(boxed),
            ty,
        }))
    }

    /// Object construction. Without `constructor` only parameterless
    /// construction of `ty` is possible.
    pub fn new_object(
        ty: Type,
        constructor: Option<Arc<ConstructorInfo>>,
        arguments: Vec<Expression>,
        members: Vec<MemberInfo>,
    ) -> Result<Expression> {
        match &constructor {
            None => {
                if !arguments.is_empty() || !members.is_empty() {
                    return Err(ExpressionError::InvalidShape(
                        "arguments require a constructor".to_string(),
                    ));
                }
                if let Type::Named(def) = &ty {
                    if matches!(def.kind(), TypeKind::Interface | TypeKind::StaticClass) {
                        return Err(not_defined("new", &ty));
                    }
                }
            }
            Some(ctor) => {
                if ctor.declaring_type != ty {
                    return Err(mismatch("new", &ty, &ctor.declaring_type));
                }
                check_arguments("constructor", &ctor.parameters, &arguments)?;
                if !members.is_empty() {
                    check_count("new members", arguments.len(), members.len())?;
                    for (member, argument) in members.iter().zip(&arguments) {
                        let member_type = match member {
                            MemberInfo::Property(p) => &p.ty,
                            MemberInfo::Field(f) => &f.ty,
                            MemberInfo::Method(m) if m.parameters.is_empty() => &m.return_type,
                            other => {
                                return Err(ExpressionError::InvalidMember(format!(
                                    "'{}' cannot be initialized by a constructor argument",
                                    other
                                )))
                            }
                        };
                        check_assignable("new member", member_type, argument.ty())?;
                    }
                }
            }
        }
        Ok(Expression::New(NewExpression {
            constructor,
            arguments,
            members,
            ty,
        }))
    }

    /// A lambda. The delegate type is inferred (`Func`/`Action`) when `ty` is `None`.
    pub fn lambda(
        ty: Option<Type>,
        body: Expression,
        parameters: Vec<ParameterExpression>,
        tail_call: bool,
        name: Option<&str>,
    ) -> Result<LambdaExpression> {
        for (i, p) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|other| other == p) {
                return Err(ExpressionError::InvalidShape(format!(
                    "parameter '{}' appears twice in the parameter list",
                    p.name().unwrap_or("?")
                )));
            }
        }
        let signature: Vec<Type> = parameters.iter().map(|p| p.signature_type()).collect();
        let ty = match ty {
            None => Type::delegate_for(signature, body.ty().clone()),
            Some(ty) => {
                let (params, ret) = ty
                    .delegate_signature()
                    .ok_or_else(|| mismatch("lambda", &Type::delegate_for(signature.clone(), body.ty().clone()), &ty))?;
                check_count("lambda", params.len(), signature.len())?;
                for (declared, actual) in params.iter().zip(&signature) {
                    if declared != actual {
                        return Err(mismatch("lambda parameter", declared, actual));
                    }
                }
                if !ret.is_void() {
                    check_assignable("lambda body", &ret, body.ty())?;
                }
                ty
            }
        };
        Ok(LambdaExpression {
            parameters,
            body: boxed(body),
            name: name.map(str::to_string),
            tail_call,
            ty,
        })
    }
}

fn is_arithmetic(ty: &Type) -> bool {
    ty.non_nullable().is_numeric()
}

fn is_signed_arithmetic(ty: &Type) -> bool {
    ty.non_nullable()
        .as_basic()
        .map_or(false, |b| b.is_numeric() && !b.is_unsigned())
}

fn unary_result_type(
    op: UnaryOp,
    operand: &Expression,
    declared: &Type,
    method: Option<&MethodInfo>,
) -> Result<Type> {
    let t = operand.ty();
    if let Some(method) = method {
        if !method.is_static || method.parameters.len() != 1 {
            return Err(ExpressionError::InvalidMember(format!(
                "'{}' is not a unary operator method",
                method
            )));
        }
        let param = &method.parameters[0].ty;
        let lifted = if param == t {
            false
        } else if t.is_nullable() && param == t.non_nullable() {
            true
        } else {
            return Err(mismatch(op.tag(), param, t));
        };
        if op.has_explicit_type() {
            return Ok(declared.clone());
        }
        return Ok(lift(method.return_type.clone(), lifted));
    }
    use UnaryOp::*;
    match op {
        ArrayLength => match t {
            Type::Array(_) => Ok(Type::int32()),
            _ => Err(not_defined(op, t)),
        },
        Convert | ConvertChecked => {
            if declared.is_convertible_from(t) {
                Ok(declared.clone())
            } else {
                Err(ExpressionError::OperatorNotDefined {
                    operator: format!("conversion to '{}'", declared),
                    operand_type: t.to_string(),
                })
            }
        }
        Negate | NegateChecked => {
            if is_signed_arithmetic(t) {
                Ok(t.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
        UnaryPlus | Increment | Decrement => {
            if is_arithmetic(t) {
                Ok(t.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
        PreIncrementAssign | PreDecrementAssign | PostIncrementAssign | PostDecrementAssign => {
            if !operand.is_writable() {
                return Err(ExpressionError::NotWritable(operand.to_string()));
            }
            if is_arithmetic(t) {
                Ok(t.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
        Not => {
            if t.non_nullable().is_integral_or_bool() {
                Ok(t.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
        OnesComplement => {
            if t.non_nullable().is_integral() {
                Ok(t.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
        IsTrue | IsFalse => {
            if t.non_nullable().is_bool() {
                Ok(t.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
        Quote => match operand {
            Expression::Lambda(_) => Ok(t.clone()),
            _ => Err(not_defined(op, t)),
        },
        TypeAs => {
            if declared.can_be_null() && !declared.is_void() {
                Ok(declared.clone())
            } else {
                Err(ExpressionError::OperatorNotDefined {
                    operator: format!("typeAs '{}'", declared),
                    operand_type: t.to_string(),
                })
            }
        }
        Unbox => {
            if (t.is_object() || matches!(t, Type::Named(d) if d.kind() == TypeKind::Interface))
                && declared.is_value_type()
            {
                Ok(declared.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
        Throw => {
            if t.is_reference_type() {
                Ok(declared.clone())
            } else {
                Err(not_defined(op, t))
            }
        }
    }
}

fn binary_result_type(
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    lifted_to_null: bool,
    method: Option<&MethodInfo>,
    conversion: Option<&LambdaExpression>,
) -> Result<Type> {
    let (l, r) = (left.ty(), right.ty());
    if let Some(method) = method {
        if !method.is_static || method.parameters.len() != 2 {
            return Err(ExpressionError::InvalidMember(format!(
                "'{}' is not a binary operator method",
                method
            )));
        }
        let mut lifted = false;
        for (param, actual) in [(&method.parameters[0].ty, l), (&method.parameters[1].ty, r)] {
            if param == actual || param.is_assignable_from(actual) {
                continue;
            }
            if actual.is_nullable() && param == actual.non_nullable() {
                lifted = true;
                continue;
            }
            return Err(mismatch(op.tag(), param, actual));
        }
        if lifted && op.is_comparison() && method.return_type.is_bool() {
            return Ok(lift(Type::boolean(), lifted_to_null));
        }
        return Ok(lift(method.return_type.clone(), lifted));
    }

    use BinaryOp::*;
    match op {
        Add | AddChecked | Subtract | SubtractChecked | Multiply | MultiplyChecked | Divide
        | Modulo => match same_or_lifted(l, r) {
            Some(lifted) if is_arithmetic(l) => Ok(lift(l.non_nullable().clone(), lifted)),
            _ => Err(not_defined(op, if is_arithmetic(l) { r } else { l })),
        },
        Power => match same_or_lifted(l, r) {
            Some(lifted) if l.non_nullable() == &Type::double() => Ok(lift(Type::double(), lifted)),
            _ => Err(not_defined(op, l)),
        },
        And | Or | ExclusiveOr => match same_or_lifted(l, r) {
            Some(lifted) if l.non_nullable().is_integral_or_bool() => {
                Ok(lift(l.non_nullable().clone(), lifted))
            }
            _ => Err(not_defined(op, l)),
        },
        LeftShift | RightShift => {
            if !l.non_nullable().is_integral() {
                return Err(not_defined(op, l));
            }
            if r.non_nullable() != &Type::int32() {
                return Err(mismatch(op.tag(), &Type::int32(), r));
            }
            Ok(lift(l.non_nullable().clone(), l.is_nullable() || r.is_nullable()))
        }
        AndAlso | OrElse => match same_or_lifted(l, r) {
            Some(lifted) if l.non_nullable().is_bool() => Ok(lift(Type::boolean(), lifted)),
            _ => Err(not_defined(op, l)),
        },
        Equal | NotEqual => {
            if let Some(lifted) = same_or_lifted(l, r) {
                let lifted = lifted && l.non_nullable().is_value_type();
                return Ok(lift(Type::boolean(), lifted && lifted_to_null));
            }
            if l.is_reference_type()
                && r.is_reference_type()
                && (l.is_assignable_from(r) || r.is_assignable_from(l))
            {
                return Ok(Type::boolean());
            }
            Err(mismatch(op.tag(), l, r))
        }
        LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => match same_or_lifted(l, r) {
            Some(lifted)
                if is_arithmetic(l)
                    || l.non_nullable() == &Type::Basic(BasicType::Char) =>
            {
                Ok(lift(Type::boolean(), lifted && lifted_to_null))
            }
            _ => Err(not_defined(op, l)),
        },
        Coalesce => {
            if !l.can_be_null() {
                return Err(not_defined(op, l));
            }
            if let Some(conversion) = conversion {
                let (params, ret) = conversion
                    .ty()
                    .delegate_signature()
                    .ok_or_else(|| not_defined(op, conversion.ty()))?;
                check_count("coalesce conversion", 1, params.len())?;
                check_assignable("coalesce conversion", &params[0], l.non_nullable())?;
                check_assignable("coalesce", &ret, r)?;
                return Ok(ret);
            }
            if l.is_nullable() && r == l.non_nullable() {
                Ok(r.clone())
            } else if l.is_assignable_from(r) {
                Ok(l.clone())
            } else if r.is_assignable_from(l.non_nullable()) {
                Ok(r.clone())
            } else {
                Err(mismatch("coalesce", l, r))
            }
        }
        ArrayIndex => match l {
            Type::Array(element) => {
                check_assignable("array index", &Type::int32(), r)?;
                Ok((**element).clone())
            }
            _ => Err(not_defined(op, l)),
        },
        Assign | AddAssign | AddAssignChecked | SubtractAssign | SubtractAssignChecked
        | MultiplyAssign | MultiplyAssignChecked | DivideAssign | ModuloAssign | PowerAssign
        | AndAssign | OrAssign | ExclusiveOrAssign | LeftShiftAssign | RightShiftAssign => {
            Err(ExpressionError::InvalidShape(format!(
                "'{}' is an assignment",
                op
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use crate::types::{MemberKind, MemberQuery};

    fn int(v: i32) -> Expression {
        Expression::constant(Value::Int32(v), Type::int32()).unwrap()
    }

    fn p(ty: Type, name: &str) -> ParameterExpression {
        Expression::parameter(ty, Some(name))
    }

    #[test]
    fn test_add_lambda_infers_func() {
        let a = p(Type::int32(), "a");
        let b = p(Type::int32(), "b");
        let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
        let lambda = Expression::lambda(None, body, vec![a, b], false, None).unwrap();
        assert_eq!(
            lambda.ty(),
            &Type::func(vec![Type::int32(), Type::int32()], Type::int32())
        );
    }

    #[test]
    fn test_binary_type_rules() {
        let err = Expression::binary(
            BinaryOp::Add,
            Expression::constant(Value::Bool(true), Type::boolean()).unwrap(),
            Expression::constant(Value::Bool(false), Type::boolean()).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "the add operator is not defined for 'bool'");

        let lt = Expression::binary(BinaryOp::LessThan, int(1), int(2)).unwrap();
        assert_eq!(lt.ty(), &Type::boolean());

        let mixed = Expression::binary(
            BinaryOp::Add,
            int(1),
            Expression::constant(Value::Int64(2), Type::int64()).unwrap(),
        );
        assert!(mixed.is_err());
    }

    #[test]
    fn test_lifted_arithmetic() {
        let x = p(Type::nullable(Type::int32()), "x");
        let e = Expression::binary(BinaryOp::Add, x.into(), int(1)).unwrap();
        assert_eq!(e.ty(), &Type::nullable(Type::int32()));
    }

    #[test]
    fn test_assignment_requires_writable_left() {
        let x = p(Type::int32(), "x");
        assert!(Expression::binary(BinaryOp::Assign, x.clone().into(), int(1)).is_ok());
        assert!(Expression::binary(BinaryOp::AddAssign, x.into(), int(1)).is_ok());
        let err = Expression::binary(BinaryOp::Assign, int(1), int(2)).unwrap_err();
        assert!(matches!(err, ExpressionError::NotWritable(_)));
    }

    #[test]
    fn test_unary_declared_type_must_match() {
        let err = Expression::make_unary(UnaryOp::Negate, Some(int(1)), Type::int64(), None)
            .unwrap_err();
        assert!(matches!(err, ExpressionError::TypeMismatch { .. }));
        let neg = Expression::unary(UnaryOp::Negate, int(1)).unwrap();
        assert_eq!(neg.ty(), &Type::int32());
        let conv = Expression::convert(int(1), Type::nullable(Type::int64())).unwrap();
        assert_eq!(conv.ty(), &Type::nullable(Type::int64()));
        assert!(Expression::make_unary(UnaryOp::Not, None, Type::boolean(), None).is_err());
        let rethrow = Expression::throw(None, Type::void()).unwrap();
        assert_eq!(rethrow.ty(), &Type::void());
    }

    #[test]
    fn test_try_fault_exclusivity() {
        let body = int(1);
        let fault = Expression::default_value(Type::void()).unwrap();
        let finally = Expression::default_value(Type::void()).unwrap();
        let err = Expression::make_try(None, body.clone(), Some(finally), Some(fault.clone()), vec![])
            .unwrap_err();
        assert_eq!(err, ExpressionError::FaultWithHandlers);
        assert!(Expression::make_try(None, body, None, Some(fault), vec![]).is_ok());
    }

    #[test]
    fn test_conditional_if_then_is_void() {
        let test = Expression::constant(Value::Bool(true), Type::boolean()).unwrap();
        let e = Expression::condition(test.clone(), int(1), None, None).unwrap();
        assert!(e.ty().is_void());
        let e = Expression::condition(test.clone(), int(1), Some(int(2)), None).unwrap();
        assert_eq!(e.ty(), &Type::int32());
        assert!(Expression::condition(int(0), int(1), Some(int(2)), None).is_err());
    }

    #[test]
    fn test_call_checks_static_and_arguments() {
        let registry = TypeRegistry::builtin();
        let math = registry.resolve_type("System.Math").unwrap();
        let max = registry
            .find_method(
                &math,
                "Max",
                &[ParameterSpec::new(Type::int32()), ParameterSpec::new(Type::int32())],
                true,
                Default::default(),
            )
            .unwrap();
        assert!(Expression::call(None, max.clone(), vec![int(1), int(2)]).is_ok());
        assert!(matches!(
            Expression::call(None, max.clone(), vec![int(1)]),
            Err(ExpressionError::ArgumentCount { .. })
        ));
        assert!(matches!(
            Expression::call(Some(int(0)), max, vec![int(1), int(2)]),
            Err(ExpressionError::InvalidMember(_))
        ));
    }

    #[test]
    fn test_member_access_rejects_methods() {
        let registry = TypeRegistry::builtin();
        let query = MemberQuery::new(Type::string(), MemberKind::Method)
            .named("Trim");
        let trim = registry.resolve_member(&query).unwrap();
        let s = p(Type::string(), "s");
        let err = Expression::make_member_access(Some(s.clone().into()), trim).unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidMember(_)));

        let length = registry
            .resolve_member(&MemberQuery::new(Type::string(), MemberKind::Property).named("Length"))
            .unwrap();
        let e = Expression::make_member_access(Some(s.into()), length).unwrap();
        assert_eq!(e.ty(), &Type::int32());
    }

    #[test]
    fn test_goto_type_follows_target() {
        let target = LabelTarget::new(Type::int32(), Some("ret"));
        let jump = Expression::make_goto(GotoKind::Return, target.clone(), Some(int(1))).unwrap();
        assert_eq!(jump.ty(), &Type::int32());
        assert!(Expression::make_goto(GotoKind::Return, target, None).is_err());
    }

    #[test]
    fn test_switch_body_types() {
        let x = p(Type::int32(), "x");
        let case = Expression::switch_case(vec![int(1), int(2)], int(10)).unwrap();
        let sw = Expression::switch(None, x.clone().into(), Some(int(0)), None, vec![case]).unwrap();
        assert_eq!(sw.ty(), &Type::int32());
        let bad = Expression::switch_case(
            vec![int(1)],
            Expression::constant(Value::String("s".into()), Type::string()).unwrap(),
        )
        .unwrap();
        assert!(Expression::switch(None, x.into(), Some(int(0)), None, vec![bad]).is_err());
    }

    #[test]
    fn test_lambda_explicit_type_checked() {
        let a = p(Type::int32(), "a");
        let wrong = Type::func(vec![Type::int64()], Type::int32());
        assert!(Expression::lambda(Some(wrong), a.clone().into(), vec![a.clone()], false, None).is_err());
        let action = Type::action(vec![Type::int32()]);
        let l = Expression::lambda(Some(action.clone()), a.clone().into(), vec![a], false, None).unwrap();
        assert_eq!(l.ty(), &action);
    }
}
