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

//! Human-readable rendering of expression trees, used for document comments
//! and error messages.

use super::*;
use std::fmt::{self, Display, Formatter, Write};

fn symbol(f: &mut Formatter<'_>, name: Option<&str>, prefix: &str, id: usize) -> fmt::Result {
    match name {
        Some(name) => f.write_str(name),
        None => write!(f, "{}{:x}", prefix, id & 0xffff),
    }
}

fn list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn binary_symbol(op: BinaryOp) -> Option<&'static str> {
    use BinaryOp::*;
    Some(match op {
        Add | AddChecked => "+",
        Subtract | SubtractChecked => "-",
        Multiply | MultiplyChecked => "*",
        Divide => "/",
        Modulo => "%",
        Power => "**",
        And => "&",
        Or => "|",
        ExclusiveOr => "^",
        LeftShift => "<<",
        RightShift => ">>",
        AndAlso => "&&",
        OrElse => "||",
        Equal => "==",
        NotEqual => "!=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        Coalesce => "??",
        Assign => "=",
        AddAssign | AddAssignChecked => "+=",
        SubtractAssign | SubtractAssignChecked => "-=",
        MultiplyAssign | MultiplyAssignChecked => "*=",
        DivideAssign => "/=",
        ModuloAssign => "%=",
        PowerAssign => "**=",
        AndAssign => "&=",
        OrAssign => "|=",
        ExclusiveOrAssign => "^=",
        LeftShiftAssign => "<<=",
        RightShiftAssign => ">>=",
        ArrayIndex => return None,
    })
}

impl Display for ParameterExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        symbol(f, self.name(), "Param_", self.symbol_id())
    }
}

impl Display for LabelTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        symbol(f, self.name(), "Label_", self.symbol_id())
    }
}

impl Display for LambdaExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.parameters.len() == 1 && !self.parameters[0].is_by_ref() {
            write!(f, "{} => {}", self.parameters[0], self.body)
        } else {
            f.write_char('(')?;
            for (i, p) in self.parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                if p.is_by_ref() {
                    f.write_str("ref ")?;
                }
                write!(f, "{}", p)?;
            }
            write!(f, ") => {}", self.body)
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(c) => write!(f, "{}", c.value),
            Expression::Default(ty) => write!(f, "default({})", ty),
            Expression::Parameter(p) => write!(f, "{}", p),
            Expression::Unary(e) => {
                let operand = match e.operand() {
                    Some(operand) => operand,
                    None => return f.write_str("rethrow"),
                };
                match e.op {
                    UnaryOp::ArrayLength => write!(f, "ArrayLength({})", operand),
                    UnaryOp::Convert | UnaryOp::ConvertChecked => {
                        write!(f, "Convert({}, {})", operand, e.ty)
                    }
                    UnaryOp::Negate | UnaryOp::NegateChecked => write!(f, "-{}", operand),
                    UnaryOp::UnaryPlus => write!(f, "+{}", operand),
                    UnaryOp::Not if e.ty.non_nullable().is_bool() => write!(f, "!{}", operand),
                    UnaryOp::Not | UnaryOp::OnesComplement => write!(f, "~{}", operand),
                    UnaryOp::TypeAs => write!(f, "({} as {})", operand, e.ty),
                    UnaryOp::PreIncrementAssign => write!(f, "++{}", operand),
                    UnaryOp::PreDecrementAssign => write!(f, "--{}", operand),
                    UnaryOp::PostIncrementAssign => write!(f, "{}++", operand),
                    UnaryOp::PostDecrementAssign => write!(f, "{}--", operand),
                    UnaryOp::Throw => write!(f, "throw({})", operand),
                    op => write!(f, "{}({})", capitalize(op.tag()), operand),
                }
            }
            Expression::Binary(e) => match binary_symbol(e.op) {
                Some(symbol) => write!(f, "({} {} {})", e.left, symbol, e.right),
                None => write!(f, "{}[{}]", e.left, e.right),
            },
            Expression::TypeBinary(e) => match e.op {
                TypeBinaryOp::TypeIs => write!(f, "({} is {})", e.operand, e.type_operand),
                TypeBinaryOp::TypeEqual => {
                    write!(f, "({} TypeEqual {})", e.operand, e.type_operand)
                }
            },
            Expression::Index(e) => {
                write!(f, "{}[", e.object)?;
                list(f, &e.arguments)?;
                f.write_char(']')
            }
            Expression::Block(e) => {
                f.write_str("{ ")?;
                for v in &e.variables {
                    write!(f, "var {}; ", v)?;
                }
                for x in &e.expressions {
                    write!(f, "{}; ", x)?;
                }
                f.write_char('}')
            }
            Expression::Member(e) => match e.object() {
                Some(object) => write!(f, "{}.{}", object, e.member.name()),
                None => write!(f, "{}.{}", e.member.declaring_type(), e.member.name()),
            },
            Expression::MethodCall(e) => {
                match e.object() {
                    Some(object) => write!(f, "{}.{}(", object, e.method.name)?,
                    None => write!(f, "{}.{}(", e.method.declaring_type, e.method.name)?,
                }
                list(f, &e.arguments)?;
                f.write_char(')')
            }
            Expression::Invocation(e) => {
                write!(f, "Invoke({}", e.delegate)?;
                for a in &e.arguments {
                    write!(f, ", {}", a)?;
                }
                f.write_char(')')
            }
            Expression::Label(e) => match e.default_value() {
                Some(value) => write!(f, "{}: {}", e.target, value),
                None => write!(f, "{}:", e.target),
            },
            Expression::Goto(e) => match e.value() {
                Some(value) => write!(f, "{} {} {}", e.kind, e.target, value),
                None => write!(f, "{} {}", e.kind, e.target),
            },
            Expression::Loop(e) => write!(f, "loop {{ {} }}", e.body),
            Expression::Switch(e) => {
                write!(f, "switch ({}) {{ ", e.switch_value)?;
                for case in &e.cases {
                    for value in &case.test_values {
                        write!(f, "case {}: ", value)?;
                    }
                    write!(f, "{}; ", case.body)?;
                }
                if let Some(body) = e.default_body() {
                    write!(f, "default: {}; ", body)?;
                }
                f.write_char('}')
            }
            Expression::Conditional(e) => match e.if_false() {
                Some(if_false) => write!(f, "IIF({}, {}, {})", e.test, e.if_true, if_false),
                None => write!(f, "if ({}) {{ {} }}", e.test, e.if_true),
            },
            Expression::Try(e) => {
                write!(f, "try {{ {} }}", e.body)?;
                for handler in &e.handlers {
                    match &handler.variable {
                        Some(v) => write!(f, " catch ({} {})", handler.test, v)?,
                        None => write!(f, " catch ({})", handler.test)?,
                    }
                    if let Some(filter) = &handler.filter {
                        write!(f, " when ({})", filter)?;
                    }
                    write!(f, " {{ {} }}", handler.body)?;
                }
                if let Some(finally) = e.finally() {
                    write!(f, " finally {{ {} }}", finally)?;
                }
                if let Some(fault) = e.fault() {
                    write!(f, " fault {{ {} }}", fault)?;
                }
                Ok(())
            }
            Expression::New(e) => {
                write!(f, "new {}(", e.ty)?;
                list(f, &e.arguments)?;
                f.write_char(')')
            }
            Expression::Lambda(l) => write!(f, "{}", l),
        }
    }
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lambda() {
        let a = ParameterExpression::new(Type::int32(), Some("a"));
        let b = ParameterExpression::new(Type::int32(), Some("b"));
        let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into()).unwrap();
        let lambda = Expression::lambda(None, body, vec![a, b], false, None).unwrap();
        assert_eq!(lambda.to_string(), "(a, b) => (a + b)");
    }

    #[test]
    fn test_render_unary_and_constants() {
        let x = ParameterExpression::new(Type::boolean(), Some("x"));
        let not = Expression::unary(UnaryOp::Not, x.into()).unwrap();
        assert_eq!(not.to_string(), "!x");
        let c = Expression::constant(Value::Int32(3), Type::int32()).unwrap();
        let t = Expression::constant(Value::Bool(true), Type::boolean()).unwrap();
        assert_eq!(Expression::unary(UnaryOp::IsTrue, t).unwrap().to_string(), "IsTrue(true)");
        assert_eq!(Expression::convert(c, Type::int64()).unwrap().to_string(), "Convert(3, long)");
    }
}
