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

//! Type-directed encoding of constant values.
//!
//! The declared type of a constant decides how its payload is read: the
//! same JSON number is an `int` under `type: "int"` and a `double` under
//! `type: "double"`, and XML text is parsed accordingly.

use crate::collections::build_collection;
use crate::document::{format_float, DocPath, DocValue, Scalar, ValueSource};
use crate::error::{SerializationError, TransformError};
use crate::registry::TypeRegistry;
use crate::types::{BasicType, Type, TypeKind};
use crate::value::Value;
use crate::vocabulary as vocab;

fn float_scalar(x: f64) -> Scalar {
    if x.is_finite() {
        Scalar::Float(x)
    } else {
        Scalar::Str(format_float(x))
    }
}

fn mismatch(path: &DocPath, ty: &Type, value: &Value) -> SerializationError {
    SerializationError::unsupported_value(
        path,
        format!("value '{}' is not an instance of '{}'", value, ty),
    )
}

/// Encode `value`, declared as `ty`, as a document payload.
pub(crate) fn encode_value(
    registry: &TypeRegistry,
    value: &Value,
    ty: &Type,
    path: &DocPath,
) -> Result<DocValue, SerializationError> {
    if value.is_null() {
        return Ok(DocValue::Null);
    }
    let scalar = |s: Scalar| Ok(DocValue::Scalar(s));
    match (ty, value) {
        (Type::Nullable(inner), _) => encode_value(registry, value, inner, path),
        (Type::Basic(_), Value::Bool(b)) => scalar(Scalar::Bool(*b)),
        (Type::Basic(_), Value::Char(c)) => scalar(Scalar::Str(c.to_string())),
        (Type::Basic(_), Value::SByte(v)) => scalar(Scalar::Int(i64::from(*v))),
        (Type::Basic(_), Value::Byte(v)) => scalar(Scalar::UInt(u64::from(*v))),
        (Type::Basic(_), Value::Int16(v)) => scalar(Scalar::Int(i64::from(*v))),
        (Type::Basic(_), Value::UInt16(v)) => scalar(Scalar::UInt(u64::from(*v))),
        (Type::Basic(_), Value::Int32(v)) => scalar(Scalar::Int(i64::from(*v))),
        (Type::Basic(_), Value::UInt32(v)) => scalar(Scalar::UInt(u64::from(*v))),
        (Type::Basic(_), Value::Int64(v)) => scalar(Scalar::Int(*v)),
        (Type::Basic(_), Value::UInt64(v)) => scalar(Scalar::UInt(*v)),
        (Type::Basic(_), Value::Single(v)) => scalar(float_scalar(f64::from(*v))),
        (Type::Basic(_), Value::Double(v)) => scalar(float_scalar(*v)),
        (Type::Basic(_), Value::Decimal(s))
        | (Type::Basic(_), Value::String(s))
        | (Type::Basic(_), Value::DateTime(s))
        | (Type::Basic(_), Value::DateTimeOffset(s))
        | (Type::Basic(_), Value::TimeSpan(s))
        | (Type::Basic(_), Value::Guid(s))
        | (Type::Basic(_), Value::Uri(s)) => scalar(Scalar::Str(s.clone())),
        (Type::Array(element), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(encode_value(registry, item, element, &path.index(i))?);
            }
            Ok(DocValue::Seq(out))
        }
        (Type::Collection(..), Value::Collection(c)) => {
            let items_path = path.child(vocab::ITEMS);
            let mut items = Vec::with_capacity(c.len());
            for (i, item) in c.items().iter().enumerate() {
                items.push(encode_value(registry, item, c.element_type(), &items_path.index(i))?);
            }
            Ok(DocValue::map([
                (vocab::LENGTH, DocValue::Scalar(Scalar::from(c.len()))),
                (vocab::ITEMS, DocValue::Seq(items)),
            ]))
        }
        (Type::KeyValuePair(k, v), Value::Pair(key, value)) => Ok(DocValue::map([
            (vocab::KEY, encode_value(registry, key, k, &path.child(vocab::KEY))?),
            (vocab::VALUE, encode_value(registry, value, v, &path.child(vocab::VALUE))?),
        ])),
        (Type::Named(def), Value::Enum(v)) if def.kind() == TypeKind::Enum => {
            scalar(Scalar::Int(*v))
        }
        (Type::Named(_), Value::Object(fields)) => {
            let declared = registry.members_of(ty).fields;
            let mut out = Vec::with_capacity(fields.len());
            for (name, field_value) in fields {
                let field = declared
                    .iter()
                    .find(|f| &f.name == name && !f.is_static)
                    .ok_or_else(|| {
                        SerializationError::unsupported_value(
                            path,
                            format!("type '{}' has no instance field '{}'", ty, name),
                        )
                    })?;
                out.push((
                    name.clone(),
                    encode_value(registry, field_value, &field.ty, &path.child(name))?,
                ));
            }
            Ok(DocValue::Map(out))
        }
        _ => Err(mismatch(path, ty, value)),
    }
}

fn integral<V: ValueSource, T: TryFrom<i64>>(source: &V, ty: &Type) -> Result<T, SerializationError> {
    let wide: i64 = source.get()?;
    T::try_from(wide).map_err(|_| {
        SerializationError::invalid_value(
            source.path(),
            format!("{} is out of range for '{}'", wide, ty),
        )
    })
}

fn unsigned<V: ValueSource, T: TryFrom<u64>>(source: &V, ty: &Type) -> Result<T, SerializationError> {
    let wide: u64 = source.get()?;
    T::try_from(wide).map_err(|_| {
        SerializationError::invalid_value(
            source.path(),
            format!("{} is out of range for '{}'", wide, ty),
        )
    })
}

/// Largest magnitude a `decimal` holds.
const DECIMAL_MAX: f64 = 79_228_162_514_264_337_593_543_950_335.0;

fn single<V: ValueSource>(source: &V, ty: &Type) -> Result<f32, SerializationError> {
    let wide: f64 = source.get()?;
    let narrow = wide as f32;
    if wide.is_finite() && !narrow.is_finite() {
        return Err(SerializationError::invalid_value(
            source.path(),
            format!("{} is out of range for '{}'", wide, ty),
        ));
    }
    Ok(narrow)
}

fn decimal<V: ValueSource>(source: &V) -> Result<String, SerializationError> {
    let s = text(source)?;
    match s.trim().parse::<f64>() {
        Ok(x) if x.is_finite() && x.abs() <= DECIMAL_MAX => Ok(s),
        Ok(_) => Err(SerializationError::invalid_value(
            source.path(),
            format!("'{}' is out of range for 'decimal'", s),
        )),
        Err(_) => Err(SerializationError::invalid_value(
            source.path(),
            format!("'{}' is not a decimal number", s),
        )),
    }
}

fn text<V: ValueSource>(source: &V) -> Result<String, SerializationError> {
    Ok(source.scalar()?.to_text())
}

fn decode_basic<V: ValueSource>(source: &V, basic: BasicType, ty: &Type) -> Result<Value, SerializationError> {
    Ok(match basic {
        BasicType::Boolean => Value::Bool(source.get()?),
        BasicType::Char => {
            let s = text(source)?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => {
                    return Err(SerializationError::invalid_value(
                        source.path(),
                        format!("'{}' is not a single character", s),
                    ))
                }
            }
        }
        BasicType::SByte => Value::SByte(integral(source, ty)?),
        BasicType::Byte => Value::Byte(unsigned(source, ty)?),
        BasicType::Int16 => Value::Int16(integral(source, ty)?),
        BasicType::UInt16 => Value::UInt16(unsigned(source, ty)?),
        BasicType::Int32 => Value::Int32(integral(source, ty)?),
        BasicType::UInt32 => Value::UInt32(unsigned(source, ty)?),
        BasicType::Int64 => Value::Int64(source.get()?),
        BasicType::UInt64 => Value::UInt64(source.get()?),
        BasicType::Single => Value::Single(single(source, ty)?),
        BasicType::Double => Value::Double(source.get()?),
        BasicType::Decimal => Value::Decimal(decimal(source)?),
        BasicType::String => Value::String(source.get()?),
        BasicType::DateTime => Value::DateTime(text(source)?),
        BasicType::DateTimeOffset => Value::DateTimeOffset(text(source)?),
        BasicType::TimeSpan => Value::TimeSpan(text(source)?),
        BasicType::Guid => Value::Guid(text(source)?),
        BasicType::Uri => Value::Uri(text(source)?),
        BasicType::Object | BasicType::Void => {
            return Err(SerializationError::unsupported_value(
                source.path(),
                format!("constants of type '{}' must be null", ty),
            ))
        }
    })
}

/// Decode a payload as a value of `ty`.
pub(crate) fn decode_value<V: ValueSource>(
    registry: &TypeRegistry,
    source: &V,
    ty: &Type,
) -> Result<Value, TransformError> {
    if source.is_null() {
        if ty.can_be_null() {
            return Ok(Value::Null);
        }
        return Err(SerializationError::invalid_value(
            source.path(),
            format!("null is not a valid '{}'", ty),
        )
        .into());
    }
    match ty {
        Type::Nullable(inner) => decode_value(registry, source, inner),
        Type::Basic(basic) => Ok(decode_basic(source, *basic, ty)?),
        Type::Array(element) => {
            let items = source.items()?;
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                out.push(decode_value(registry, item, element)?);
            }
            Ok(Value::Array(out))
        }
        Type::Collection(kind, _) => {
            let element = ty.element_type().ok_or_else(|| {
                SerializationError::unsupported_value(
                    source.path(),
                    format!("'{}' has no element type", ty),
                )
            })?;
            let length: usize = source.get_field(vocab::LENGTH)?.get()?;
            let items = source.get_field(vocab::ITEMS)?.items()?;
            let mut values = Vec::with_capacity(items.len());
            for item in &items {
                values.push(decode_value(registry, item, &element)?);
            }
            Ok(Value::Collection(build_collection(
                registry,
                *kind,
                &element,
                values,
                Some(length),
            )?))
        }
        Type::KeyValuePair(k, v) => {
            let key = decode_value(registry, &source.get_field(vocab::KEY)?, k)?;
            let value = decode_value(registry, &source.get_field(vocab::VALUE)?, v)?;
            Ok(Value::Pair(Box::new(key), Box::new(value)))
        }
        Type::Named(def) => match def.kind() {
            TypeKind::Enum => Ok(Value::Enum(source.get()?)),
            TypeKind::Class | TypeKind::Struct => {
                let mut fields = Vec::new();
                for field in registry.members_of(ty).fields.iter().filter(|f| !f.is_static) {
                    if let Some(entry) = source.field(&field.name)? {
                        fields.push((field.name.clone(), decode_value(registry, &entry, &field.ty)?));
                    }
                }
                Ok(Value::Object(fields))
            }
            TypeKind::Interface | TypeKind::StaticClass => Err(SerializationError::unsupported_value(
                source.path(),
                format!("constants of type '{}' must be null", ty),
            )
            .into()),
        },
        Type::ByRef(_) | Type::Delegate(..) => Err(SerializationError::unsupported_value(
            source.path(),
            format!("constants of type '{}' are not supported", ty),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CollectionKind;

    #[test]
    fn test_encode_non_finite_floats_as_strings() {
        let registry = TypeRegistry::builtin();
        let path = DocPath::root("value");
        let encoded = encode_value(&registry, &Value::Double(f64::NEG_INFINITY), &Type::double(), &path).unwrap();
        assert_eq!(encoded, DocValue::Scalar(Scalar::Str("-Infinity".to_string())));
        let encoded = encode_value(&registry, &Value::Double(1.5), &Type::double(), &path).unwrap();
        assert_eq!(encoded, DocValue::Scalar(Scalar::Float(1.5)));
    }

    #[test]
    fn test_encode_collection_records_length() {
        let registry = TypeRegistry::builtin();
        let list = crate::collections::CollectionInstance::from_items(
            CollectionKind::List,
            Type::int32(),
            vec![Value::Int32(1), Value::Int32(2)],
        );
        let ty = Type::list(Type::int32());
        let encoded = encode_value(&registry, &Value::Collection(list), &ty, &DocPath::root("value")).unwrap();
        assert_eq!(
            encoded,
            DocValue::map([
                (vocab::LENGTH, DocValue::Scalar(Scalar::UInt(2))),
                (
                    vocab::ITEMS,
                    DocValue::Seq(vec![
                        DocValue::Scalar(Scalar::Int(1)),
                        DocValue::Scalar(Scalar::Int(2)),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn test_encode_rejects_object_payload() {
        let registry = TypeRegistry::builtin();
        let err = encode_value(&registry, &Value::Int32(1), &Type::object(), &DocPath::root("value"))
            .unwrap_err();
        assert_eq!(err.kind, crate::error::SerializationErrorKind::UnsupportedValue);
    }
}
