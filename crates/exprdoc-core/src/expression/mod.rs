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

//! Immutable, typed expression trees.
//!
//! Nodes are only created through the validating factory functions on
//! [`Expression`] (see the `factory` module), so every tree that exists is
//! consistent: operator, operand types, member handles and result type agree.
//!
//! Parameters and label targets are shared by reference. Two
//! [`ParameterExpression`] handles are equal only when they point at the same
//! symbol; a lambda's parameter list and its body therefore refer to the same
//! variable, not to two equal-looking copies.

mod compare;
mod display;
mod factory;
mod visitor;

pub use compare::deep_eq;
pub use visitor::ExpressionVisitor;

use crate::types::{ConstructorInfo, MemberInfo, MethodInfo, PropertyInfo, Type};
use crate::value::Value;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

macro_rules! operator_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $tag:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Document tag of the operator.
            pub fn tag(self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }

            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

operator_enum! {
    /// Unary operators.
    UnaryOp {
        ArrayLength => "arrayLength",
        Convert => "convert",
        ConvertChecked => "convertChecked",
        Negate => "negate",
        NegateChecked => "negateChecked",
        Not => "not",
        OnesComplement => "onesComplement",
        IsTrue => "isTrue",
        IsFalse => "isFalse",
        Quote => "quote",
        TypeAs => "typeAs",
        UnaryPlus => "unaryPlus",
        Unbox => "unbox",
        Increment => "increment",
        Decrement => "decrement",
        PreIncrementAssign => "preIncrementAssign",
        PreDecrementAssign => "preDecrementAssign",
        PostIncrementAssign => "postIncrementAssign",
        PostDecrementAssign => "postDecrementAssign",
        Throw => "throw",
    }
}

impl UnaryOp {
    /// Operators that write back to their operand.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrementAssign
                | UnaryOp::PreDecrementAssign
                | UnaryOp::PostIncrementAssign
                | UnaryOp::PostDecrementAssign
        )
    }

    /// Operators whose result type is given explicitly rather than derived.
    pub fn has_explicit_type(self) -> bool {
        matches!(
            self,
            UnaryOp::Convert
                | UnaryOp::ConvertChecked
                | UnaryOp::TypeAs
                | UnaryOp::Unbox
                | UnaryOp::Throw
        )
    }
}

operator_enum! {
    /// Binary operators, including assignments.
    BinaryOp {
        Add => "add",
        AddChecked => "addChecked",
        Subtract => "subtract",
        SubtractChecked => "subtractChecked",
        Multiply => "multiply",
        MultiplyChecked => "multiplyChecked",
        Divide => "divide",
        Modulo => "modulo",
        Power => "power",
        And => "and",
        Or => "or",
        ExclusiveOr => "exclusiveOr",
        LeftShift => "leftShift",
        RightShift => "rightShift",
        AndAlso => "andAlso",
        OrElse => "orElse",
        Equal => "equal",
        NotEqual => "notEqual",
        LessThan => "lessThan",
        LessThanOrEqual => "lessThanOrEqual",
        GreaterThan => "greaterThan",
        GreaterThanOrEqual => "greaterThanOrEqual",
        Coalesce => "coalesce",
        ArrayIndex => "arrayIndex",
        Assign => "assign",
        AddAssign => "addAssign",
        AddAssignChecked => "addAssignChecked",
        SubtractAssign => "subtractAssign",
        SubtractAssignChecked => "subtractAssignChecked",
        MultiplyAssign => "multiplyAssign",
        MultiplyAssignChecked => "multiplyAssignChecked",
        DivideAssign => "divideAssign",
        ModuloAssign => "moduloAssign",
        PowerAssign => "powerAssign",
        AndAssign => "andAssign",
        OrAssign => "orAssign",
        ExclusiveOrAssign => "exclusiveOrAssign",
        LeftShiftAssign => "leftShiftAssign",
        RightShiftAssign => "rightShiftAssign",
    }
}

impl BinaryOp {
    /// For compound assignments, the operator applied before storing.
    pub fn underlying(self) -> Option<BinaryOp> {
        use BinaryOp::*;
        Some(match self {
            AddAssign => Add,
            AddAssignChecked => AddChecked,
            SubtractAssign => Subtract,
            SubtractAssignChecked => SubtractChecked,
            MultiplyAssign => Multiply,
            MultiplyAssignChecked => MultiplyChecked,
            DivideAssign => Divide,
            ModuloAssign => Modulo,
            PowerAssign => Power,
            AndAssign => And,
            OrAssign => Or,
            ExclusiveOrAssign => ExclusiveOr,
            LeftShiftAssign => LeftShift,
            RightShiftAssign => RightShift,
            _ => return None,
        })
    }

    pub fn is_assignment(self) -> bool {
        self == BinaryOp::Assign || self.underlying().is_some()
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }
}

operator_enum! {
    /// Type tests.
    TypeBinaryOp {
        TypeIs => "typeIs",
        TypeEqual => "typeEqual",
    }
}

operator_enum! {
    /// Jump flavours; they differ only in intent.
    GotoKind {
        Goto => "goto",
        Return => "return",
        Break => "break",
        Continue => "continue",
    }
}

#[derive(Debug)]
struct ParameterData {
    ty: Type,
    name: Option<String>,
    is_by_ref: bool,
}

/// A parameter or block variable. Cloning shares the symbol.
#[derive(Debug, Clone)]
pub struct ParameterExpression(Arc<ParameterData>);

impl ParameterExpression {
    /// A new symbol; a [`Type::ByRef`] type yields a by-ref parameter of the inner type.
    pub fn new(ty: Type, name: Option<&str>) -> Self {
        let (ty, is_by_ref) = match ty {
            Type::ByRef(inner) => (*inner, true),
            ty => (ty, false),
        };
        Self(Arc::new(ParameterData {
            ty,
            name: name.map(str::to_string),
            is_by_ref,
        }))
    }

    /// Value type of the parameter (never by-ref).
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn is_by_ref(&self) -> bool {
        self.0.is_by_ref
    }

    /// Type as it appears in a delegate signature.
    pub fn signature_type(&self) -> Type {
        if self.is_by_ref() {
            Type::by_ref(self.ty().clone())
        } else {
            self.ty().clone()
        }
    }

    pub fn same_symbol(&self, other: &ParameterExpression) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared symbol, stable for its lifetime.
    pub fn symbol_id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for ParameterExpression {
    fn eq(&self, other: &Self) -> bool {
        self.same_symbol(other)
    }
}

impl Eq for ParameterExpression {}

impl Hash for ParameterExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol_id().hash(state);
    }
}

#[derive(Debug)]
struct LabelData {
    ty: Type,
    name: Option<String>,
}

/// Jump target shared between `label`, `goto` and `loop` nodes.
#[derive(Debug, Clone)]
pub struct LabelTarget(Arc<LabelData>);

impl LabelTarget {
    pub fn new(ty: Type, name: Option<&str>) -> Self {
        Self(Arc::new(LabelData {
            ty,
            name: name.map(str::to_string),
        }))
    }

    /// A void label.
    pub fn void(name: Option<&str>) -> Self {
        Self::new(Type::void(), name)
    }

    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn same_target(&self, other: &LabelTarget) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn symbol_id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for LabelTarget {
    fn eq(&self, other: &Self) -> bool {
        self.same_target(other)
    }
}

impl Eq for LabelTarget {}

impl Hash for LabelTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol_id().hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct ConstantExpression {
    pub(crate) value: Value,
    pub(crate) ty: Type,
}

impl ConstantExpression {
    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Debug, Clone)]
pub struct UnaryExpression {
    pub(crate) op: UnaryOp,
    pub(crate) operand: Option<Box<Expression>>,
    pub(crate) ty: Type,
    pub(crate) method: Option<Arc<MethodInfo>>,
}

impl UnaryExpression {
    pub fn op(&self) -> UnaryOp {
        self.op
    }

    /// Absent only for a rethrow.
    pub fn operand(&self) -> Option<&Expression> {
        self.operand.as_deref()
    }

    pub fn method(&self) -> Option<&Arc<MethodInfo>> {
        self.method.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct BinaryExpression {
    pub(crate) op: BinaryOp,
    pub(crate) left: Box<Expression>,
    pub(crate) right: Box<Expression>,
    pub(crate) ty: Type,
    pub(crate) lifted_to_null: bool,
    pub(crate) method: Option<Arc<MethodInfo>>,
    pub(crate) conversion: Option<Box<LambdaExpression>>,
}

impl BinaryExpression {
    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }

    pub fn is_lifted_to_null(&self) -> bool {
        self.lifted_to_null
    }

    pub fn method(&self) -> Option<&Arc<MethodInfo>> {
        self.method.as_ref()
    }

    /// Conversion applied to the left operand of a coalesce.
    pub fn conversion(&self) -> Option<&LambdaExpression> {
        self.conversion.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct TypeBinaryExpression {
    pub(crate) op: TypeBinaryOp,
    pub(crate) operand: Box<Expression>,
    pub(crate) type_operand: Type,
    pub(crate) ty: Type,
}

impl TypeBinaryExpression {
    pub fn op(&self) -> TypeBinaryOp {
        self.op
    }

    pub fn operand(&self) -> &Expression {
        &self.operand
    }

    pub fn type_operand(&self) -> &Type {
        &self.type_operand
    }
}

#[derive(Debug, Clone)]
pub struct IndexExpression {
    pub(crate) object: Box<Expression>,
    pub(crate) indexer: Option<Arc<PropertyInfo>>,
    pub(crate) arguments: Vec<Expression>,
    pub(crate) ty: Type,
}

impl IndexExpression {
    pub fn object(&self) -> &Expression {
        &self.object
    }

    /// `None` for array element access.
    pub fn indexer(&self) -> Option<&Arc<PropertyInfo>> {
        self.indexer.as_ref()
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }
}

#[derive(Debug, Clone)]
pub struct BlockExpression {
    pub(crate) variables: Vec<ParameterExpression>,
    pub(crate) expressions: Vec<Expression>,
    pub(crate) ty: Type,
}

impl BlockExpression {
    pub fn variables(&self) -> &[ParameterExpression] {
        &self.variables
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn result(&self) -> Option<&Expression> {
        self.expressions.last()
    }
}

#[derive(Debug, Clone)]
pub struct MemberExpression {
    pub(crate) object: Option<Box<Expression>>,
    pub(crate) member: MemberInfo,
    pub(crate) ty: Type,
}

impl MemberExpression {
    /// `None` for static members.
    pub fn object(&self) -> Option<&Expression> {
        self.object.as_deref()
    }

    /// A property or field.
    pub fn member(&self) -> &MemberInfo {
        &self.member
    }
}

#[derive(Debug, Clone)]
pub struct MethodCallExpression {
    pub(crate) object: Option<Box<Expression>>,
    pub(crate) method: Arc<MethodInfo>,
    pub(crate) arguments: Vec<Expression>,
}

impl MethodCallExpression {
    pub fn object(&self) -> Option<&Expression> {
        self.object.as_deref()
    }

    pub fn method(&self) -> &Arc<MethodInfo> {
        &self.method
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }
}

#[derive(Debug, Clone)]
pub struct InvocationExpression {
    pub(crate) delegate: Box<Expression>,
    pub(crate) arguments: Vec<Expression>,
    pub(crate) ty: Type,
}

impl InvocationExpression {
    pub fn delegate(&self) -> &Expression {
        &self.delegate
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }
}

#[derive(Debug, Clone)]
pub struct LabelExpression {
    pub(crate) target: LabelTarget,
    pub(crate) default_value: Option<Box<Expression>>,
}

impl LabelExpression {
    pub fn target(&self) -> &LabelTarget {
        &self.target
    }

    pub fn default_value(&self) -> Option<&Expression> {
        self.default_value.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct GotoExpression {
    pub(crate) kind: GotoKind,
    pub(crate) target: LabelTarget,
    pub(crate) value: Option<Box<Expression>>,
}

impl GotoExpression {
    pub fn kind(&self) -> GotoKind {
        self.kind
    }

    pub fn target(&self) -> &LabelTarget {
        &self.target
    }

    pub fn value(&self) -> Option<&Expression> {
        self.value.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct LoopExpression {
    pub(crate) body: Box<Expression>,
    pub(crate) break_label: Option<LabelTarget>,
    pub(crate) continue_label: Option<LabelTarget>,
    pub(crate) ty: Type,
}

impl LoopExpression {
    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn break_label(&self) -> Option<&LabelTarget> {
        self.break_label.as_ref()
    }

    pub fn continue_label(&self) -> Option<&LabelTarget> {
        self.continue_label.as_ref()
    }
}

/// One `case` of a switch: several test values may share a body.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub(crate) test_values: Vec<Expression>,
    pub(crate) body: Expression,
}

impl SwitchCase {
    pub fn test_values(&self) -> &[Expression] {
        &self.test_values
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }
}

#[derive(Debug, Clone)]
pub struct SwitchExpression {
    pub(crate) switch_value: Box<Expression>,
    pub(crate) cases: Vec<SwitchCase>,
    pub(crate) default_body: Option<Box<Expression>>,
    pub(crate) comparison: Option<Arc<MethodInfo>>,
    pub(crate) ty: Type,
}

impl SwitchExpression {
    pub fn switch_value(&self) -> &Expression {
        &self.switch_value
    }

    pub fn cases(&self) -> &[SwitchCase] {
        &self.cases
    }

    pub fn default_body(&self) -> Option<&Expression> {
        self.default_body.as_deref()
    }

    pub fn comparison(&self) -> Option<&Arc<MethodInfo>> {
        self.comparison.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct ConditionalExpression {
    pub(crate) test: Box<Expression>,
    pub(crate) if_true: Box<Expression>,
    pub(crate) if_false: Option<Box<Expression>>,
    pub(crate) ty: Type,
}

impl ConditionalExpression {
    pub fn test(&self) -> &Expression {
        &self.test
    }

    pub fn if_true(&self) -> &Expression {
        &self.if_true
    }

    /// `None` for an if-then statement.
    pub fn if_false(&self) -> Option<&Expression> {
        self.if_false.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct CatchBlock {
    pub(crate) test: Type,
    pub(crate) variable: Option<ParameterExpression>,
    pub(crate) body: Expression,
    pub(crate) filter: Option<Expression>,
}

impl CatchBlock {
    /// Exception type caught.
    pub fn test(&self) -> &Type {
        &self.test
    }

    pub fn variable(&self) -> Option<&ParameterExpression> {
        self.variable.as_ref()
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn filter(&self) -> Option<&Expression> {
        self.filter.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct TryExpression {
    pub(crate) body: Box<Expression>,
    pub(crate) handlers: Vec<CatchBlock>,
    pub(crate) finally: Option<Box<Expression>>,
    pub(crate) fault: Option<Box<Expression>>,
    pub(crate) ty: Type,
}

impl TryExpression {
    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn handlers(&self) -> &[CatchBlock] {
        &self.handlers
    }

    pub fn finally(&self) -> Option<&Expression> {
        self.finally.as_deref()
    }

    pub fn fault(&self) -> Option<&Expression> {
        self.fault.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct NewExpression {
    pub(crate) constructor: Option<Arc<ConstructorInfo>>,
    pub(crate) arguments: Vec<Expression>,
    pub(crate) members: Vec<MemberInfo>,
    pub(crate) ty: Type,
}

impl NewExpression {
    /// `None` for parameterless value-type construction.
    pub fn constructor(&self) -> Option<&Arc<ConstructorInfo>> {
        self.constructor.as_ref()
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }

    /// Members initialized by the arguments, positionally.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }
}

#[derive(Debug, Clone)]
pub struct LambdaExpression {
    pub(crate) parameters: Vec<ParameterExpression>,
    pub(crate) body: Box<Expression>,
    pub(crate) name: Option<String>,
    pub(crate) tail_call: bool,
    pub(crate) ty: Type,
}

impl LambdaExpression {
    pub fn parameters(&self) -> &[ParameterExpression] {
        &self.parameters
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tail_call(&self) -> bool {
        self.tail_call
    }

    /// Delegate type.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn return_type(&self) -> &Type {
        self.body.ty()
    }
}

/// An expression tree node.
#[derive(Debug, Clone)]
pub enum Expression {
    Constant(ConstantExpression),
    Default(Type),
    Parameter(ParameterExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    TypeBinary(TypeBinaryExpression),
    Index(IndexExpression),
    Block(BlockExpression),
    Member(MemberExpression),
    MethodCall(MethodCallExpression),
    Invocation(InvocationExpression),
    Label(LabelExpression),
    Goto(GotoExpression),
    Loop(LoopExpression),
    Switch(SwitchExpression),
    Conditional(ConditionalExpression),
    Try(TryExpression),
    New(NewExpression),
    Lambda(LambdaExpression),
}

impl Expression {
    /// Result type of the node.
    pub fn ty(&self) -> &Type {
        match self {
            Expression::Constant(e) => &e.ty,
            Expression::Default(ty) => ty,
            Expression::Parameter(p) => p.ty(),
            Expression::Unary(e) => &e.ty,
            Expression::Binary(e) => &e.ty,
            Expression::TypeBinary(e) => &e.ty,
            Expression::Index(e) => &e.ty,
            Expression::Block(e) => &e.ty,
            Expression::Member(e) => &e.ty,
            Expression::MethodCall(e) => &e.method.return_type,
            Expression::Invocation(e) => &e.ty,
            Expression::Label(e) => e.target.ty(),
            Expression::Goto(e) => e.target.ty(),
            Expression::Loop(e) => &e.ty,
            Expression::Switch(e) => &e.ty,
            Expression::Conditional(e) => &e.ty,
            Expression::Try(e) => &e.ty,
            Expression::New(e) => &e.ty,
            Expression::Lambda(e) => &e.ty,
        }
    }

    /// Short name of the node kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Constant(_) => "constant",
            Expression::Default(_) => "default",
            Expression::Parameter(_) => "parameter",
            Expression::Unary(e) => e.op.tag(),
            Expression::Binary(e) => e.op.tag(),
            Expression::TypeBinary(e) => e.op.tag(),
            Expression::Index(_) => "index",
            Expression::Block(_) => "block",
            Expression::Member(_) => "memberAccess",
            Expression::MethodCall(_) => "call",
            Expression::Invocation(_) => "invoke",
            Expression::Label(_) => "label",
            Expression::Goto(_) => "goto",
            Expression::Loop(_) => "loop",
            Expression::Switch(_) => "switch",
            Expression::Conditional(_) => "conditional",
            Expression::Try(_) => "try",
            Expression::New(_) => "new",
            Expression::Lambda(_) => "lambda",
        }
    }

    pub fn as_lambda(&self) -> Option<&LambdaExpression> {
        match self {
            Expression::Lambda(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterExpression> {
        match self {
            Expression::Parameter(p) => Some(p),
            _ => None,
        }
    }

    /// Direct child nodes, in document order.
    pub fn children(&self) -> Vec<&Expression> {
        let mut out: Vec<&Expression> = Vec::new();
        match self {
            Expression::Constant(_) | Expression::Default(_) | Expression::Parameter(_) => {}
            Expression::Unary(e) => out.extend(e.operand()),
            Expression::Binary(e) => {
                out.push(&e.left);
                out.push(&e.right);
            }
            Expression::TypeBinary(e) => out.push(&e.operand),
            Expression::Index(e) => {
                out.push(&e.object);
                out.extend(&e.arguments);
            }
            Expression::Block(e) => out.extend(&e.expressions),
            Expression::Member(e) => out.extend(e.object()),
            Expression::MethodCall(e) => {
                out.extend(e.object());
                out.extend(&e.arguments);
            }
            Expression::Invocation(e) => {
                out.push(&e.delegate);
                out.extend(&e.arguments);
            }
            Expression::Label(e) => out.extend(e.default_value()),
            Expression::Goto(e) => out.extend(e.value()),
            Expression::Loop(e) => out.push(&e.body),
            Expression::Switch(e) => {
                out.push(&e.switch_value);
                for case in &e.cases {
                    out.extend(&case.test_values);
                    out.push(&case.body);
                }
                out.extend(e.default_body());
            }
            Expression::Conditional(e) => {
                out.push(&e.test);
                out.push(&e.if_true);
                out.extend(e.if_false());
            }
            Expression::Try(e) => {
                out.push(&e.body);
                for handler in &e.handlers {
                    out.extend(handler.filter());
                    out.push(&handler.body);
                }
                out.extend(e.finally());
                out.extend(e.fault());
            }
            Expression::New(e) => out.extend(&e.arguments),
            Expression::Lambda(e) => out.push(&e.body),
        }
        out
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Expression)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Whether the node can appear on the left of an assignment.
    pub fn is_writable(&self) -> bool {
        match self {
            Expression::Parameter(_) => true,
            Expression::Member(m) => match &m.member {
                MemberInfo::Field(f) => !f.is_read_only,
                MemberInfo::Property(p) => p.can_write,
                _ => false,
            },
            Expression::Index(i) => match &i.indexer {
                Some(p) => p.can_write,
                None => true,
            },
            _ => false,
        }
    }
}

impl From<ParameterExpression> for Expression {
    fn from(p: ParameterExpression) -> Self {
        Expression::Parameter(p)
    }
}

impl From<LambdaExpression> for Expression {
    fn from(l: LambdaExpression) -> Self {
        Expression::Lambda(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tags_round_trip() {
        assert_eq!(UnaryOp::ALL.len(), 20);
        assert_eq!(BinaryOp::ALL.len(), 39);
        for op in UnaryOp::ALL {
            assert_eq!(UnaryOp::from_tag(op.tag()), Some(*op));
        }
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_tag(op.tag()), Some(*op));
        }
        assert_eq!(GotoKind::from_tag("break"), Some(GotoKind::Break));
        assert_eq!(TypeBinaryOp::from_tag("typeIs"), Some(TypeBinaryOp::TypeIs));
    }

    #[test]
    fn test_parameter_identity() {
        let a = ParameterExpression::new(Type::int32(), Some("a"));
        let a2 = a.clone();
        let other = ParameterExpression::new(Type::int32(), Some("a"));
        assert_eq!(a, a2);
        assert_ne!(a, other);
        assert_eq!(a.symbol_id(), a2.symbol_id());
    }

    #[test]
    fn test_by_ref_parameter() {
        let p = ParameterExpression::new(Type::by_ref(Type::int32()), Some("x"));
        assert!(p.is_by_ref());
        assert_eq!(p.ty(), &Type::int32());
        assert_eq!(p.signature_type(), Type::by_ref(Type::int32()));
    }

    #[test]
    fn test_compound_assignment_mapping() {
        assert_eq!(BinaryOp::AddAssign.underlying(), Some(BinaryOp::Add));
        assert!(BinaryOp::Assign.is_assignment());
        assert!(!BinaryOp::Add.is_assignment());
        assert!(BinaryOp::LessThan.is_comparison());
    }
}
