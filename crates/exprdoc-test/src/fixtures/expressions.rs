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

//! Expression tree fixtures.
//!
//! Every fixture builds a fresh tree, so parameter and label identities are
//! never shared between two calls.

use crate::registry::{missing, sample_model};
use exprdoc_core::collections::CollectionInstance;
use exprdoc_core::{
    BinaryOp, CollectionKind, Expression, ExpressionError, GotoKind, LabelTarget, MemberInfo,
    ParameterExpression, ParameterSpec, Type, UnaryOp, Value, Visibility,
};

type Result<T> = std::result::Result<T, ExpressionError>;

fn int(value: i32) -> Result<Expression> {
    Expression::constant_of(Value::Int32(value))
}

fn text(value: &str) -> Result<Expression> {
    Expression::constant_of(Value::String(value.to_string()))
}

fn param(ty: Type, name: &str) -> ParameterExpression {
    ParameterExpression::new(ty, Some(name))
}

fn lambda(body: Expression, parameters: Vec<ParameterExpression>) -> Result<Expression> {
    Ok(Expression::lambda(None, body, parameters, false, None)?.into())
}

fn specs(types: &[Type]) -> Vec<ParameterSpec> {
    types.iter().cloned().map(ParameterSpec::new).collect()
}

/// `(a, b) => a + b` over two ints.
pub fn sum_lambda() -> Result<Expression> {
    let a = param(Type::int32(), "a");
    let b = param(Type::int32(), "b");
    let body = Expression::binary(BinaryOp::Add, a.clone().into(), b.clone().into())?;
    lambda(body, vec![a, b])
}

/// A string-valued switch with a two-value case, a one-value case and a default.
pub fn switch_with_default() -> Result<Expression> {
    let x = param(Type::int32(), "x");
    let low = Expression::switch_case(vec![int(1)?, int(2)?], text("low")?)?;
    let three = Expression::switch_case(vec![int(3)?], text("three")?)?;
    let body = Expression::switch(None, x.clone().into(), Some(text("other")?), None, vec![low, three])?;
    lambda(body, vec![x])
}

/// Constants of every basic type, nulls, arrays and collections.
pub fn constants() -> Result<Expression> {
    let list = CollectionInstance::from_items(
        CollectionKind::List,
        Type::int32(),
        (1..=5).map(Value::Int32).collect(),
    );
    let stack = CollectionInstance::from_items(
        CollectionKind::Stack,
        Type::string(),
        vec![Value::String("bottom".into()), Value::String("top".into())],
    );
    let dictionary = CollectionInstance::from_items(
        CollectionKind::Dictionary,
        Type::key_value_pair(Type::string(), Type::int32()),
        vec![
            Value::Pair(Box::new(Value::String("one".into())), Box::new(Value::Int32(1))),
            Value::Pair(Box::new(Value::String("two".into())), Box::new(Value::Int32(2))),
        ],
    );
    let scalars = [
        Value::Bool(true),
        Value::Char('\u{3bb}'),
        Value::SByte(-8),
        Value::Byte(200),
        Value::Int16(-300),
        Value::UInt16(60_000),
        Value::UInt32(4_000_000_000),
        Value::Int64(-9_007_199_254_740_993),
        Value::UInt64(u64::MAX),
        Value::Single(1.5),
        Value::Double(0.1),
        Value::Double(f64::NAN),
        Value::Double(f64::INFINITY),
        Value::Decimal("79228162514264337593543950335".into()),
        Value::String("line\nbreak \"quoted\" <tag> & more".into()),
        Value::String(String::new()),
        Value::DateTime("2024-02-29T12:34:56Z".into()),
        Value::DateTimeOffset("2024-02-29T12:34:56+01:00".into()),
        Value::TimeSpan("1.02:03:04.5000000".into()),
        Value::Guid("6f9619ff-8b86-d011-b42d-00c04fc964ff".into()),
        Value::Uri("https://example.com/a?b=c&d=e".into()),
    ];
    let mut expressions = scalars
        .into_iter()
        .map(Expression::constant_of)
        .collect::<Result<Vec<_>>>()?;
    expressions.extend([
        Expression::constant(Value::Null, Type::nullable(Type::int32()))?,
        Expression::constant(Value::Null, Type::string())?,
        Expression::constant(Value::Null, Type::object())?,
        Expression::constant(
            Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]),
            Type::array(Type::int32()),
        )?,
        Expression::constant(
            Value::Array(vec![Value::String("a".into()), Value::Null]),
            Type::array(Type::string()),
        )?,
        Expression::constant(Value::Collection(list.clone()), list.collection_type())?,
        Expression::constant(Value::Collection(stack.clone()), stack.collection_type())?,
        Expression::constant(Value::Collection(dictionary.clone()), dictionary.collection_type())?,
        Expression::constant(
            Value::Pair(Box::new(Value::String("pi".into())), Box::new(Value::Double(3.25))),
            Type::key_value_pair(Type::string(), Type::double()),
        )?,
        Expression::default_value(Type::int32())?,
        Expression::default_value(Type::string())?,
    ]);
    Expression::block(None, Vec::new(), expressions)
}

/// Struct, enum and class constants of the `Acme` types.
pub fn application_constants() -> Result<Expression> {
    let model = sample_model();
    let point = Value::Object(vec![
        ("X".to_string(), Value::Int32(3)),
        ("Y".to_string(), Value::Int32(-4)),
    ]);
    Expression::block(
        None,
        Vec::new(),
        vec![
            Expression::constant(point, model.point.clone())?,
            Expression::constant(Value::Enum(2), model.color.clone())?,
            Expression::constant(Value::Null, model.sample.clone())?,
        ],
    )
}

/// Property, field and indexer access on `Acme.Sample`, including an assignment.
pub fn member_access() -> Result<Expression> {
    let model = sample_model();
    let registry = &model.registry;
    let sample = &model.sample;
    let public = Visibility::Public;
    let name = registry
        .find_property(sample, "Name", None, &[], false, public)
        .ok_or_else(|| missing("Acme.Sample.Name"))?;
    let count = registry
        .find_field(sample, "Count", false, public)
        .ok_or_else(|| missing("Acme.Sample.Count"))?;
    let default = registry
        .find_field(sample, "Default", true, public)
        .ok_or_else(|| missing("Acme.Sample.Default"))?;
    let item = registry
        .find_property(sample, "Item", None, &[Type::string()], false, public)
        .ok_or_else(|| missing("Acme.Sample.Item"))?;

    let s = param(sample.clone(), "s");
    let name_of = |object: Expression| {
        Expression::make_member_access(Some(object), MemberInfo::Property(name.clone()))
    };
    let body = Expression::block(
        None,
        Vec::new(),
        vec![
            Expression::binary(BinaryOp::Assign, name_of(s.clone().into())?, text("renamed")?)?,
            name_of(Expression::make_member_access(None, MemberInfo::Field(default))?)?,
            Expression::binary(
                BinaryOp::AddAssign,
                Expression::make_member_access(Some(s.clone().into()), MemberInfo::Field(count))?,
                int(1)?,
            )?,
            Expression::make_index(s.clone().into(), Some(item), vec![text("key")?])?,
        ],
    )?;
    lambda(body, vec![s])
}

/// Instance, static and non-public calls, including `Method3(int, int)`.
pub fn method_calls() -> Result<Expression> {
    let model = sample_model();
    let registry = &model.registry;
    let sample = &model.sample;
    let console = model.named("System.Console")?;
    let method3 = registry
        .find_method(sample, "Method3", &specs(&[Type::int32(), Type::int32()]), false, Visibility::Public)
        .ok_or_else(|| missing("Acme.Sample.Method3(int, int)"))?;
    let create = registry
        .find_method(sample, "Create", &specs(&[Type::string()]), true, Visibility::Public)
        .ok_or_else(|| missing("Acme.Sample.Create(string)"))?;
    let reset = registry
        .find_method(sample, "Reset", &[], false, Visibility::NonPublic)
        .ok_or_else(|| missing("Acme.Sample.Reset()"))?;
    let write_line = registry
        .find_method(&console, "WriteLine", &specs(&[Type::string()]), true, Visibility::Public)
        .ok_or_else(|| missing("System.Console.WriteLine(string)"))?;

    let s = param(sample.clone(), "s");
    let x = param(Type::int32(), "x");
    let created = Expression::call(None, create, vec![text("made")?])?;
    let body = Expression::block(
        None,
        Vec::new(),
        vec![
            Expression::call(None, write_line, vec![text("calling")?])?,
            Expression::call(Some(s.clone().into()), reset, Vec::new())?,
            Expression::call(Some(created), method3, vec![x.clone().into(), int(2)?])?,
        ],
    )?;
    lambda(body, vec![s, x])
}

/// Constructor calls with and without arguments and member bindings.
pub fn object_creation() -> Result<Expression> {
    let model = sample_model();
    let registry = &model.registry;
    let (point, sample) = (&model.point, &model.sample);
    let public = Visibility::Public;
    let point_ctor = registry
        .find_constructor(point, &specs(&[Type::int32(), Type::int32()]), public)
        .ok_or_else(|| missing("Acme.Point(int, int)"))?;
    let x = registry
        .find_field(point, "X", false, public)
        .ok_or_else(|| missing("Acme.Point.X"))?;
    let y = registry
        .find_field(point, "Y", false, public)
        .ok_or_else(|| missing("Acme.Point.Y"))?;
    let sample_default = registry
        .find_constructor(sample, &[], public)
        .ok_or_else(|| missing("Acme.Sample()"))?;
    let sample_sized = registry
        .find_constructor(sample, &specs(&[Type::int32()]), public)
        .ok_or_else(|| missing("Acme.Sample(int)"))?;

    Expression::block(
        None,
        Vec::new(),
        vec![
            Expression::new_object(sample.clone(), Some(sample_default), Vec::new(), Vec::new())?,
            Expression::new_object(sample.clone(), Some(sample_sized), vec![int(7)?], Vec::new())?,
            Expression::new_object(point.clone(), None, Vec::new(), Vec::new())?,
            Expression::new_object(
                point.clone(),
                Some(point_ctor),
                vec![int(1)?, int(2)?],
                vec![MemberInfo::Field(x), MemberInfo::Field(y)],
            )?,
        ],
    )
}

/// A counting loop with break and continue labels inside a block with a variable.
pub fn counting_loop() -> Result<Expression> {
    let i = param(Type::int32(), "i");
    let done = LabelTarget::void(Some("done"));
    let next = LabelTarget::void(Some("next"));
    let test = Expression::binary(BinaryOp::LessThan, i.clone().into(), int(10)?)?;
    let step = Expression::unary(UnaryOp::PreIncrementAssign, i.clone().into())?;
    let stop = Expression::make_goto(GotoKind::Break, done.clone(), None)?;
    let body = Expression::condition(test, step, Some(stop), Some(Type::void()))?;
    let looped = Expression::make_loop(body, Some(done), Some(next))?;
    let block = Expression::block(
        None,
        vec![i.clone()],
        vec![
            Expression::binary(BinaryOp::Assign, i.clone().into(), int(0)?)?,
            looped,
            i.into(),
        ],
    )?;
    lambda(block, Vec::new())
}

/// An early return through a typed label.
pub fn early_return() -> Result<Expression> {
    let x = param(Type::int32(), "x");
    let exit = LabelTarget::new(Type::int32(), Some("exit"));
    let too_big = Expression::binary(BinaryOp::GreaterThan, x.clone().into(), int(100)?)?;
    let clamp = Expression::make_goto(GotoKind::Return, exit.clone(), Some(int(100)?))?;
    let body = Expression::block(
        None,
        Vec::new(),
        vec![
            Expression::condition(too_big, clamp, None, None)?,
            Expression::label(exit, Some(x.clone().into()))?,
        ],
    )?;
    lambda(body, vec![x])
}

/// Try with filtered and catch-all handlers and a finally block, plus a
/// try/fault.
pub fn exception_handling() -> Result<Expression> {
    let model = sample_model();
    let registry = &model.registry;
    let public = Visibility::Public;
    let invalid = model.named("System.InvalidOperationException")?;
    let exception = model.named("System.Exception")?;
    let console = model.named("System.Console")?;
    let ctor = registry
        .find_constructor(&invalid, &specs(&[Type::string()]), public)
        .ok_or_else(|| missing("System.InvalidOperationException(string)"))?;
    let message = registry
        .find_property(&exception, "Message", None, &[], false, public)
        .ok_or_else(|| missing("System.Exception.Message"))?;
    let write_line = registry
        .find_method(&console, "WriteLine", &specs(&[Type::string()]), true, public)
        .ok_or_else(|| missing("System.Console.WriteLine(string)"))?;
    let say = |what: &str| Expression::call(None, write_line.clone(), vec![text(what)?]);

    let e = param(invalid.clone(), "e");
    let raised = Expression::new_object(invalid.clone(), Some(ctor), vec![text("boom")?], Vec::new())?;
    let thrown = Expression::throw(Some(raised), Type::string())?;
    let filtered = Expression::catch_block(
        invalid,
        Some(e.clone()),
        Expression::make_member_access(Some(e.into()), MemberInfo::Property(message))?,
        Some(Expression::constant_of(Value::Bool(true))?),
    )?;
    let fallback = Expression::catch_block(exception, None, text("unknown")?, None)?;
    let guarded = Expression::make_try(None, thrown, Some(say("done")?), None, vec![filtered, fallback])?;
    let faulted = Expression::make_try(None, say("work")?, None, Some(say("cleanup")?), Vec::new())?;
    let rethrow = Expression::make_try(
        None,
        say("again")?,
        None,
        None,
        vec![Expression::catch_block(
            model.named("System.Exception")?,
            None,
            Expression::throw(None, Type::void())?,
            None,
        )?],
    )?;
    let body = Expression::block(None, Vec::new(), vec![faulted, rethrow, guarded])?;
    lambda(body, Vec::new())
}

/// Delegate invocation with array indexing and array length.
pub fn invocation() -> Result<Expression> {
    let f = param(Type::func(vec![Type::int32()], Type::int32()), "f");
    let values = param(Type::array(Type::int32()), "values");
    let first = Expression::make_index(values.clone().into(), None, vec![int(0)?])?;
    let length = Expression::unary(UnaryOp::ArrayLength, values.clone().into())?;
    let last_index = Expression::binary(BinaryOp::Subtract, length, int(1)?)?;
    let last = Expression::binary(BinaryOp::ArrayIndex, values.clone().into(), last_index)?;
    let body = Expression::binary(
        BinaryOp::Add,
        Expression::invoke(f.clone().into(), vec![first])?,
        Expression::invoke(f.clone().into(), vec![last])?,
    )?;
    lambda(body, vec![f, values])
}

/// Conversions, type tests, lifted comparison, coalesce and conditionals.
pub fn operators() -> Result<Expression> {
    let n = param(Type::nullable(Type::int32()), "n");
    let o = param(Type::object(), "o");
    let flag = param(Type::boolean(), "flag");
    let body = Expression::block(
        None,
        Vec::new(),
        vec![
            Expression::make_binary(BinaryOp::Coalesce, n.clone().into(), int(0)?, false, None, None)?,
            Expression::make_binary(BinaryOp::LessThan, n.clone().into(), int(3)?, true, None, None)?,
            Expression::type_is(o.clone().into(), Type::string())?,
            Expression::type_equal(o.clone().into(), Type::int32())?,
            Expression::make_unary(UnaryOp::TypeAs, Some(o.clone().into()), Type::string(), None)?,
            Expression::make_unary(UnaryOp::Unbox, Some(o.clone().into()), Type::int32(), None)?,
            Expression::convert(int(5)?, Type::double())?,
            Expression::make_unary(UnaryOp::ConvertChecked, Some(int(5)?), Type::int64(), None)?,
            Expression::unary(UnaryOp::Negate, int(3)?)?,
            Expression::unary(UnaryOp::OnesComplement, int(7)?)?,
            Expression::binary(BinaryOp::LeftShift, int(1)?, int(4)?)?,
            Expression::binary(
                BinaryOp::AndAlso,
                flag.clone().into(),
                Expression::unary(UnaryOp::Not, flag.clone().into())?,
            )?,
            Expression::condition(flag.clone().into(), text("yes")?, Some(text("no")?), None)?,
        ],
    )?;
    lambda(body, vec![n, o, flag])
}

/// A tail-call lambda returning a named closure over its parameter, next to
/// a quoted lambda.
pub fn closures() -> Result<Expression> {
    let x = param(Type::int32(), "x");
    let y = param(Type::int32(), "y");
    let z = param(Type::int32(), "z");
    let adder = Expression::lambda(
        None,
        Expression::binary(BinaryOp::Add, x.clone().into(), y.clone().into())?,
        vec![y],
        false,
        Some("adder"),
    )?;
    let scaled = Expression::lambda(
        None,
        Expression::binary(BinaryOp::Multiply, z.clone().into(), x.clone().into())?,
        vec![z],
        false,
        None,
    )?;
    let body = Expression::block(
        None,
        Vec::new(),
        vec![Expression::unary(UnaryOp::Quote, scaled.into())?, adder.into()],
    )?;
    Ok(Expression::lambda(None, body, vec![x], true, None)?.into())
}

/// `x => x + x + ... + x` nested `depth` nodes deep.
///
/// The lambda is level 1 and the innermost `x` is level `depth`; needs
/// `depth >= 3`.
pub fn nested_sum(depth: usize) -> Result<Expression> {
    let x = param(Type::int32(), "x");
    let mut body: Expression = x.clone().into();
    for _ in 0..depth.saturating_sub(2) {
        body = Expression::binary(BinaryOp::Add, body, x.clone().into())?;
    }
    lambda(body, vec![x])
}
