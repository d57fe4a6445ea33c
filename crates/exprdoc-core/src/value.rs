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

//! Constant payloads.

use crate::collections::CollectionInstance;
use crate::types::{BasicType, Type, TypeKind};
use std::cmp::Ordering;
use std::fmt;

/// The value carried by a constant node.
///
/// Decimal, date/time, guid and uri values are kept in their canonical text
/// form; the engine never computes with them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(String),
    String(String),
    DateTime(String),
    DateTimeOffset(String),
    TimeSpan(String),
    Guid(String),
    Uri(String),
    /// Underlying integral value of an enum member.
    Enum(i64),
    Array(Vec<Value>),
    Collection(CollectionInstance),
    Pair(Box<Value>, Box<Value>),
    /// Field values of a registered struct or class, in declaration order.
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value is a valid instance of `ty`.
    ///
    /// `object`-typed constants may only be null: the value itself does not
    /// record its runtime type.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        if let Value::Null = self {
            return ty.can_be_null();
        }
        match ty {
            Type::Nullable(inner) => self.conforms_to(inner),
            Type::Basic(basic) => self.basic_type() == Some(*basic),
            Type::Array(element) => match self {
                Value::Array(items) => items.iter().all(|v| v.conforms_to(element)),
                _ => false,
            },
            Type::Collection(kind, _) => match (self, ty.element_type()) {
                (Value::Collection(c), Some(element)) => {
                    c.kind() == *kind
                        && c.element_type() == &element
                        && c.items().iter().all(|v| v.conforms_to(&element))
                }
                _ => false,
            },
            Type::KeyValuePair(k, v) => match self {
                Value::Pair(key, value) => key.conforms_to(k) && value.conforms_to(v),
                _ => false,
            },
            Type::Named(def) => match (self, def.kind()) {
                (Value::Enum(_), TypeKind::Enum) => true,
                (Value::Object(_), TypeKind::Class | TypeKind::Struct) => true,
                _ => false,
            },
            Type::ByRef(_) | Type::Delegate(..) => false,
        }
    }

    /// The basic type of a scalar value.
    pub fn basic_type(&self) -> Option<BasicType> {
        Some(match self {
            Value::Bool(_) => BasicType::Boolean,
            Value::Char(_) => BasicType::Char,
            Value::SByte(_) => BasicType::SByte,
            Value::Byte(_) => BasicType::Byte,
            Value::Int16(_) => BasicType::Int16,
            Value::UInt16(_) => BasicType::UInt16,
            Value::Int32(_) => BasicType::Int32,
            Value::UInt32(_) => BasicType::UInt32,
            Value::Int64(_) => BasicType::Int64,
            Value::UInt64(_) => BasicType::UInt64,
            Value::Single(_) => BasicType::Single,
            Value::Double(_) => BasicType::Double,
            Value::Decimal(_) => BasicType::Decimal,
            Value::String(_) => BasicType::String,
            Value::DateTime(_) => BasicType::DateTime,
            Value::DateTimeOffset(_) => BasicType::DateTimeOffset,
            Value::TimeSpan(_) => BasicType::TimeSpan,
            Value::Guid(_) => BasicType::Guid,
            Value::Uri(_) => BasicType::Uri,
            _ => return None,
        })
    }

    /// Equality that treats NaN as equal to itself.
    pub fn equivalent(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Single(a), Value::Single(b)) => a.to_bits() == b.to_bits() || a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits() || a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
            }
            (Value::Collection(a), Value::Collection(b)) => {
                a.kind() == b.kind()
                    && a.element_type() == b.element_type()
                    && a.len() == b.len()
                    && a.items().iter().zip(b.items()).all(|(x, y)| x.equivalent(y))
            }
            (Value::Pair(ak, av), Value::Pair(bk, bv)) => ak.equivalent(bk) && av.equivalent(bv),
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((an, av), (bn, bv))| an == bn && av.equivalent(bv))
            }
            _ => self == other,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Char(_) => 2,
            Value::SByte(_)
            | Value::Byte(_)
            | Value::Int16(_)
            | Value::UInt16(_)
            | Value::Int32(_)
            | Value::UInt32(_)
            | Value::Int64(_)
            | Value::UInt64(_)
            | Value::Enum(_) => 3,
            Value::Single(_) | Value::Double(_) => 4,
            Value::Decimal(_) => 5,
            Value::String(_)
            | Value::DateTime(_)
            | Value::DateTimeOffset(_)
            | Value::TimeSpan(_)
            | Value::Guid(_)
            | Value::Uri(_) => 6,
            Value::Pair(..) => 7,
            Value::Array(_) | Value::Collection(_) | Value::Object(_) => 8,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        Some(match self {
            Value::SByte(v) => i128::from(*v),
            Value::Byte(v) => i128::from(*v),
            Value::Int16(v) => i128::from(*v),
            Value::UInt16(v) => i128::from(*v),
            Value::Int32(v) => i128::from(*v),
            Value::UInt32(v) => i128::from(*v),
            Value::Int64(v) | Value::Enum(v) => i128::from(*v),
            Value::UInt64(v) => i128::from(*v),
            _ => return None,
        })
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Single(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Value::String(s)
            | Value::Decimal(s)
            | Value::DateTime(s)
            | Value::DateTimeOffset(s)
            | Value::TimeSpan(s)
            | Value::Guid(s)
            | Value::Uri(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Total order used by sorted collections. Pairs order by key.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::Pair(a, _), Value::Pair(b, _)) => a.total_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.total_cmp(&y),
                _ => a.cmp(b),
            },
            _ => {
                if let (Some(a), Some(b)) = (self.as_i128(), other.as_i128()) {
                    a.cmp(&b)
                } else if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
                    a.total_cmp(&b)
                } else if let (Some(a), Some(b)) = (self.as_text(), other.as_text()) {
                    a.cmp(b)
                } else {
                    Ordering::Equal
                }
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str, quote: char) -> fmt::Result {
    for c in text.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\0' => f.write_str("\\0")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("{")?;
    for (i, item) in items.iter().enumerate() {
        f.write_str(if i == 0 { " " } else { ", " })?;
        write!(f, "{}", item)?;
    }
    f.write_str(if items.is_empty() { "}" } else { " }" })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => {
                f.write_str("'")?;
                write_escaped(f, &c.to_string(), '\'')?;
                f.write_str("'")
            }
            Value::SByte(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}U", v),
            Value::Int64(v) => write!(f, "{}L", v),
            Value::UInt64(v) => write!(f, "{}UL", v),
            Value::Single(v) => write!(f, "{}F", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Decimal(v) => write!(f, "{}M", v),
            Value::String(s) => {
                f.write_str("\"")?;
                write_escaped(f, s, '"')?;
                f.write_str("\"")
            }
            Value::DateTime(s) => write!(f, "DateTime({})", s),
            Value::DateTimeOffset(s) => write!(f, "DateTimeOffset({})", s),
            Value::TimeSpan(s) => write!(f, "TimeSpan({})", s),
            Value::Guid(s) => write!(f, "Guid({})", s),
            Value::Uri(s) => write!(f, "Uri({})", s),
            Value::Enum(v) => write!(f, "{}", v),
            Value::Array(items) => {
                f.write_str("new[] ")?;
                write_list(f, items)
            }
            Value::Collection(c) => {
                write!(f, "{} ", c.collection_type())?;
                write_list(f, c.items())
            }
            Value::Pair(k, v) => write!(f, "[{}, {}]", k, v),
            Value::Object(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { ", " })?;
                    write!(f, "{} = {}", name, value)?;
                }
                f.write_str(if fields.is_empty() { "}" } else { " }" })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CollectionKind, TypeDefinition};
    use std::sync::Arc;

    #[test]
    fn test_conforms_to_basic_and_nullable() {
        assert!(Value::Int32(5).conforms_to(&Type::int32()));
        assert!(!Value::Int64(5).conforms_to(&Type::int32()));
        assert!(Value::Int32(5).conforms_to(&Type::nullable(Type::int32())));
        assert!(Value::Null.conforms_to(&Type::nullable(Type::int32())));
        assert!(!Value::Null.conforms_to(&Type::int32()));
        assert!(Value::Null.conforms_to(&Type::string()));
    }

    #[test]
    fn test_object_constants_only_null() {
        assert!(Value::Null.conforms_to(&Type::object()));
        assert!(!Value::Int32(1).conforms_to(&Type::object()));
    }

    #[test]
    fn test_conforms_to_enum_and_array() {
        let color = Type::Named(Arc::new(TypeDefinition::new(
            "Acme.Color",
            TypeKind::Enum,
            None,
        )));
        assert!(Value::Enum(2).conforms_to(&color));
        let arr = Value::Array(vec![Value::Int32(1), Value::Int32(2)]);
        assert!(arr.conforms_to(&Type::array(Type::int32())));
        assert!(!arr.conforms_to(&Type::array(Type::string())));
        assert!(!arr.conforms_to(&Type::list(Type::int32())));
    }

    #[test]
    fn test_equivalent_treats_nan_as_equal() {
        assert!(Value::Double(f64::NAN).equivalent(&Value::Double(f64::NAN)));
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert!(!Value::Double(1.0).equivalent(&Value::Single(1.0)));
    }

    #[test]
    fn test_total_cmp_orders_numbers_and_strings() {
        assert_eq!(Value::Int32(2).total_cmp(&Value::Int32(10)), Ordering::Less);
        assert_eq!(
            Value::String("b".into()).total_cmp(&Value::String("a".into())),
            Ordering::Greater
        );
        let a = Value::Pair(Box::new(Value::Int32(1)), Box::new(Value::String("z".into())));
        let b = Value::Pair(Box::new(Value::Int32(2)), Box::new(Value::String("a".into())));
        assert_eq!(a.total_cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::String("a\"b".into()).to_string(), "\"a\\\"b\"");
        assert_eq!(Value::Int64(3).to_string(), "3L");
        assert_eq!(Value::Double(1.0).to_string(), "1.0");
        assert_eq!(
            Value::Array(vec![Value::Int32(1), Value::Int32(2)]).to_string(),
            "new[] { 1, 2 }"
        );
        let list = CollectionInstance::from_items(
            CollectionKind::List,
            Type::int32(),
            vec![Value::Int32(1)],
        );
        assert_eq!(Value::Collection(list).to_string(), "List<int> { 1 }");
    }
}
