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

//! Member fragments.
//!
//! A fragment names a member by declaring type, name, `static` flag,
//! `visibility` and the exact parameter signature (`parameterSpecs`).
//! Generic `member` fragments also carry a `kind`; properties may record
//! their own `type` and `indexParameters`.

use crate::config::TypeNameConvention;
use crate::document::{DocElement, ElementSink, Scalar};
use crate::error::SerializationError;
use crate::registry::TypeRegistry;
use crate::types::{
    ConstructorInfo, MemberInfo, MemberKind, MemberQuery, MethodInfo, ParameterSpec, PropertyInfo,
    Type, Visibility,
};
use crate::vocabulary as vocab;
use std::sync::Arc;

fn read_specs<E: DocElement>(
    fragment: &E,
    registry: &TypeRegistry,
    name: &str,
) -> Result<Vec<ParameterSpec>, SerializationError> {
    let mut specs = Vec::new();
    for spec in fragment.objects_or_empty(name)? {
        let ty = spec.get_type(registry)?;
        let by_ref = spec.property_or(vocab::IS_BY_REF, false)?;
        specs.push(if by_ref {
            ParameterSpec::by_ref(ty)
        } else {
            ParameterSpec::new(ty)
        });
    }
    Ok(specs)
}

fn read_query<E: DocElement>(
    fragment: &E,
    registry: &TypeRegistry,
    kind: MemberKind,
) -> Result<MemberQuery, SerializationError> {
    let declaring_type = fragment.get_type_from_property(registry, vocab::DECLARING_TYPE)?;
    let visibility = match fragment.property::<String>(vocab::VISIBILITY)? {
        None => Visibility::Public,
        Some(text) => Visibility::parse(&text).ok_or_else(|| {
            SerializationError::invalid_value(
                fragment.path(),
                format!("'{}' is not a visibility", text),
            )
        })?,
    };
    let mut query = MemberQuery::new(declaring_type, kind)
        .with_static(fragment.property_or(vocab::STATIC, false)?)
        .with_visibility(visibility)
        .with_parameters(read_specs(fragment, registry, vocab::PARAMETER_SPECS)?);
    if kind != MemberKind::Constructor {
        query = query.named(fragment.get_property::<String>(vocab::NAME)?);
    }
    if kind == MemberKind::Property {
        query.property_type = fragment.type_from_property(registry, vocab::TYPE)?;
        query.index_parameters = read_specs(fragment, registry, vocab::INDEX_PARAMETERS)?
            .into_iter()
            .map(|s| s.ty)
            .collect();
    }
    Ok(query)
}

/// Resolve a fragment of a known member kind.
pub(crate) fn read_member<E: DocElement>(
    fragment: &E,
    registry: &TypeRegistry,
    kind: MemberKind,
) -> Result<MemberInfo, SerializationError> {
    let query = read_query(fragment, registry, kind)?;
    registry
        .resolve_member(&query)
        .map_err(|e| SerializationError::unresolved_member(fragment.path(), e))
}

/// Resolve a generic `member` fragment whose `kind` property names the kind.
pub(crate) fn read_any_member<E: DocElement>(
    fragment: &E,
    registry: &TypeRegistry,
) -> Result<MemberInfo, SerializationError> {
    let text: String = fragment.get_property(vocab::KIND)?;
    let kind = MemberKind::parse(&text).ok_or_else(|| {
        SerializationError::invalid_value(fragment.path(), format!("'{}' is not a member kind", text))
    })?;
    read_member(fragment, registry, kind)
}

pub(crate) fn read_method<E: DocElement>(
    fragment: &E,
    registry: &TypeRegistry,
) -> Result<Arc<MethodInfo>, SerializationError> {
    match read_member(fragment, registry, MemberKind::Method)? {
        MemberInfo::Method(m) => Ok(m),
        other => Err(unexpected(fragment, MemberKind::Method, &other)),
    }
}

pub(crate) fn read_constructor<E: DocElement>(
    fragment: &E,
    registry: &TypeRegistry,
) -> Result<Arc<ConstructorInfo>, SerializationError> {
    match read_member(fragment, registry, MemberKind::Constructor)? {
        MemberInfo::Constructor(c) => Ok(c),
        other => Err(unexpected(fragment, MemberKind::Constructor, &other)),
    }
}

pub(crate) fn read_property<E: DocElement>(
    fragment: &E,
    registry: &TypeRegistry,
) -> Result<Arc<PropertyInfo>, SerializationError> {
    match read_member(fragment, registry, MemberKind::Property)? {
        MemberInfo::Property(p) => Ok(p),
        other => Err(unexpected(fragment, MemberKind::Property, &other)),
    }
}

fn unexpected<E: DocElement>(fragment: &E, expected: MemberKind, found: &MemberInfo) -> SerializationError {
    SerializationError::unexpected_node(fragment.path(), expected.as_str(), found.kind().as_str())
}

fn write_specs<S: ElementSink>(
    sink: &mut S,
    name: &str,
    specs: &[ParameterSpec],
    convention: TypeNameConvention,
) {
    if specs.is_empty() {
        return;
    }
    let fragments = specs
        .iter()
        .map(|spec| {
            let mut f = S::fragment(vocab::PARAMETER_SPEC);
            f.set_scalar(vocab::TYPE, Scalar::Str(spec.ty.name(convention)));
            if spec.by_ref {
                f.set_scalar(vocab::IS_BY_REF, Scalar::Bool(true));
            }
            f
        })
        .collect();
    sink.set_objects(name, fragments);
}

fn write_header<S: ElementSink>(
    sink: &mut S,
    declaring_type: &Type,
    name: Option<&str>,
    is_static: bool,
    visibility: Visibility,
    convention: TypeNameConvention,
) {
    sink.set_scalar(vocab::DECLARING_TYPE, Scalar::Str(declaring_type.name(convention)));
    if let Some(name) = name {
        sink.set_scalar(vocab::NAME, Scalar::from(name));
    }
    if is_static {
        sink.set_scalar(vocab::STATIC, Scalar::Bool(true));
    }
    if visibility != Visibility::Public {
        sink.set_scalar(vocab::VISIBILITY, Scalar::from(visibility.as_str()));
    }
}

/// Write `member` as a fragment named `name`; `with_kind` adds the `kind` discriminant.
pub(crate) fn write_member<S: ElementSink>(
    name: &str,
    member: &MemberInfo,
    with_kind: bool,
    convention: TypeNameConvention,
) -> S {
    let mut f = S::fragment(name);
    if with_kind {
        f.set_scalar(vocab::KIND, Scalar::from(member.kind().as_str()));
    }
    match member {
        MemberInfo::Constructor(c) => {
            write_header(&mut f, &c.declaring_type, None, false, c.visibility, convention);
            write_specs(&mut f, vocab::PARAMETER_SPECS, &c.parameters, convention);
        }
        MemberInfo::Method(m) => {
            write_header(&mut f, &m.declaring_type, Some(&m.name), m.is_static, m.visibility, convention);
            write_specs(&mut f, vocab::PARAMETER_SPECS, &m.parameters, convention);
        }
        MemberInfo::Property(p) => {
            write_header(&mut f, &p.declaring_type, Some(&p.name), p.is_static, p.visibility, convention);
            f.set_scalar(vocab::TYPE, Scalar::Str(p.ty.name(convention)));
            let index: Vec<ParameterSpec> =
                p.index_parameters.iter().cloned().map(ParameterSpec::new).collect();
            write_specs(&mut f, vocab::INDEX_PARAMETERS, &index, convention);
        }
        MemberInfo::Field(x) => {
            write_header(&mut f, &x.declaring_type, Some(&x.name), x.is_static, x.visibility, convention);
        }
        MemberInfo::Event(e) => {
            write_header(&mut f, &e.declaring_type, Some(&e.name), e.is_static, e.visibility, convention);
        }
    }
    f
}
